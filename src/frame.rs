// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Back buffer of terminal cells with change tracking.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Frame::new(width, height, self.blank.bg);
    }

    /// Blanks every cell with `bg` and marks the whole frame for redraw.
    pub fn clear(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank(bg);
        self.cells.fill(self.blank);
        self.dirty_map.fill(false);
        self.dirty.clear();
        self.dirty_all = true;
    }

    /// Swaps the background under every cell, keeping the glyphs.
    pub fn recolor_background(&mut self, bg: Option<Color>) {
        let old = self.blank.bg;
        self.blank = Cell::blank(bg);
        for cell in &mut self.cells {
            if cell.bg == old {
                cell.bg = bg;
            }
        }
        self.dirty_all = true;
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty_all = false;
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    /// Writes a cell; out-of-bounds and unchanged writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellAttr;

    fn glyph(ch: char) -> Cell {
        Cell {
            ch,
            fg: Some(Color::Green),
            bg: None,
            attr: CellAttr::Plain,
        }
    }

    #[test]
    fn unchanged_writes_are_not_dirty() {
        let mut f = Frame::new(3, 2, None);
        f.clear_dirty();
        f.set(1, 1, glyph('x'));
        f.set(1, 1, glyph('x'));
        f.set(0, 0, Cell::blank(None));
        assert_eq!(f.dirty_indices(), &[4]);
    }

    #[test]
    fn clear_blanks_and_redraws_everything() {
        let mut f = Frame::new(2, 2, None);
        f.set(0, 0, glyph('x'));
        f.clear_dirty();
        f.clear(Some(Color::Black));
        assert!(f.is_dirty_all());
        assert_eq!(f.get(0, 0), Some(&Cell::blank(Some(Color::Black))));
    }

    #[test]
    fn writes_outside_are_ignored() {
        let mut f = Frame::new(2, 2, None);
        f.clear_dirty();
        f.set(2, 0, glyph('x'));
        f.set(0, 9, glyph('x'));
        assert!(!f.is_dirty());
    }

    #[test]
    fn resize_keeps_the_background() {
        let mut f = Frame::new(2, 2, Some(Color::Blue));
        f.resize(4, 3);
        assert_eq!((f.width, f.height), (4, 3));
        assert_eq!(f.get(3, 2).map(|c| c.bg), Some(Some(Color::Blue)));
    }
}
