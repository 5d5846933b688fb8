// Copyright (c) 2026 rezky_nightky

//! [`Surface`] backed by a terminal [`Frame`]. One surface unit is one
//! terminal cell; a glyph of size `n` occupies an `n`x`n` box with the
//! character in its top-left cell.

use crate::cell::{Cell, CellAttr};
use crate::frame::Frame;
use crate::glyph::Font;
use crate::palette::{ColorMode, Rgb};
use crate::surface::{Surface, SurfaceError};

/// Default cap on live glyph images.
pub const DEFAULT_IMAGE_BUDGET: usize = 16_384;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermGlyph {
    pub ch: char,
    pub color: Rgb,
    pub attr: CellAttr,
    pub size: u16,
}

pub struct FrameSurface {
    frame: Frame,
    mode: ColorMode,
    background: Rgb,
    live: usize,
    budget: usize,
}

impl FrameSurface {
    pub fn new(width: u16, height: u16, mode: ColorMode, budget: usize) -> Self {
        let background = Rgb::BLACK;
        Self {
            frame: Frame::new(width, height, background.to_term_color(mode)),
            mode,
            background,
            live: 0,
            budget,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn live_images(&self) -> usize {
        self.live
    }

    fn bg(&self) -> Option<crossterm::style::Color> {
        self.background.to_term_color(self.mode)
    }
}

impl Surface for FrameSurface {
    type Image = TermGlyph;

    fn resize(&mut self, width: u16, height: u16) {
        self.frame.resize(width, height);
    }

    fn clear(&mut self) {
        let bg = self.bg();
        self.frame.clear(bg);
    }

    fn set_background(&mut self, color: Rgb) {
        if color == self.background {
            return;
        }
        self.background = color;
        let bg = self.bg();
        self.frame.recolor_background(bg);
    }

    fn rasterize(&mut self, ch: char, font: &Font, color: Rgb) -> Result<TermGlyph, SurfaceError> {
        if self.live >= self.budget {
            return Err(SurfaceError::OutOfImages { limit: self.budget });
        }
        self.live += 1;
        Ok(TermGlyph {
            ch,
            color,
            attr: font.family.into(),
            size: font.size.max(1),
        })
    }

    fn release(&mut self, _image: TermGlyph) {
        self.live = self.live.saturating_sub(1);
    }

    fn draw_glyph(&mut self, image: &TermGlyph, col: u16, row: u16, alpha: f32, tint: Option<Rgb>) {
        let bg = self.bg();
        let size = image.size;
        let x0 = col.saturating_mul(size);
        let y0 = row.saturating_mul(size);

        let glyph = if image.ch == ' ' {
            Cell::blank(bg)
        } else {
            let color = self.background.lerp(tint.unwrap_or(image.color), alpha);
            Cell {
                ch: image.ch,
                fg: color.to_term_color(self.mode),
                bg,
                attr: image.attr,
            }
        };

        for dy in 0..size {
            for dx in 0..size {
                let cell = if dx == 0 && dy == 0 {
                    glyph
                } else {
                    Cell::blank(bg)
                };
                self.frame
                    .set(x0.saturating_add(dx), y0.saturating_add(dy), cell);
            }
        }
    }
}
