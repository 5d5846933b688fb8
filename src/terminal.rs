// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, BeginSynchronizedUpdate, EndSynchronizedUpdate},
    ExecutableCommand, QueueableCommand,
};

use crate::cell::{Cell, CellAttr};
use crate::frame::Frame;

/// Current terminal pen, so style escapes are only sent on change.
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    attr: CellAttr,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attr: CellAttr::Plain,
            pos: None,
        }
    }

    fn style(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.attr != self.attr {
            // SGR reset drops the colours as well.
            out.queue(SetAttribute(Attribute::Reset))?;
            if let Some(a) = cell.attr.attribute() {
                out.queue(SetAttribute(a))?;
            }
            self.attr = cell.attr;
            self.fg = None;
            self.bg = None;
        }
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        Ok(())
    }

    fn move_to(&mut self, out: &mut Stdout, x: u16, y: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<(u16, u16)>,
    run_buf: String,
    rows: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flushes the frame's changes inside one synchronized update.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        if !frame.is_dirty() && self.shown == Some((frame.width, frame.height)) {
            return Ok(());
        }
        queue!(self.stdout, BeginSynchronizedUpdate)?;

        let total = frame.width as usize * frame.height as usize;
        let full = self.shown != Some((frame.width, frame.height))
            || frame.is_dirty_all()
            || (total > 0 && frame.dirty_indices().len() >= total / 3);

        if full {
            self.draw_full(frame)?;
        } else {
            self.draw_dirty(frame)?;
        }

        queue!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            ResetColor,
            EndSynchronizedUpdate
        )?;
        self.stdout.flush()?;
        self.shown = Some((frame.width, frame.height));
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> Result<()> {
        let mut pen = Pen::new();
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        if self.shown != Some((frame.width, frame.height)) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.style(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
            }
        }
        Ok(())
    }

    /// Groups dirty cells into same-style runs per row.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let width = frame.width as usize;
        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::new();
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();

            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let first = frame.cell_at_index(start);
                self.run_buf.clear();
                self.run_buf.push(first.ch);

                let mut j = i + 1;
                while j < row.len() && row[j] == row[j - 1] + 1 {
                    let cell = frame.cell_at_index(row[j]);
                    if !cell.same_style(&first) {
                        break;
                    }
                    self.run_buf.push(cell.ch);
                    j += 1;
                }

                let x = (start % width) as u16;
                let y = y as u16;
                pen.move_to(&mut self.stdout, x, y)?;
                pen.style(&mut self.stdout, &first)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                let next = x.saturating_add((j - i) as u16);
                pen.pos = (next < frame.width).then_some((next, y));
                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
