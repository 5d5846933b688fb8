// Copyright (c) 2026 rezky_nightky

//! In-memory surface for engine tests.

use std::collections::HashMap;

use crate::glyph::Font;
use crate::palette::Rgb;
use crate::surface::{Surface, SurfaceError};

#[derive(Clone, Debug, PartialEq)]
pub struct Img {
    pub ch: char,
    pub color: Rgb,
    pub font: Font,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawn {
    pub ch: char,
    pub color: Rgb,
    pub alpha: f32,
}

pub struct RecordingSurface {
    pub width: u16,
    pub height: u16,
    pub background: Rgb,
    pub cells: HashMap<(u16, u16), Drawn>,
    pub draws: usize,
    pub clears: usize,
    pub resizes: usize,
    live: usize,
    budget: Option<usize>,
}

impl RecordingSurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            background: Rgb::BLACK,
            cells: HashMap::new(),
            draws: 0,
            clears: 0,
            resizes: 0,
            live: 0,
            budget: None,
        }
    }

    pub fn with_image_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn live_images(&self) -> usize {
        self.live
    }

    pub fn glyph_at(&self, col: u16, row: u16) -> Option<char> {
        self.cells.get(&(col, row)).map(|d| d.ch).filter(|&ch| ch != ' ')
    }
}

impl Surface for RecordingSurface {
    type Image = Img;

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.resizes += 1;
        self.cells.clear();
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.cells.clear();
    }

    fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    fn rasterize(&mut self, ch: char, font: &Font, color: Rgb) -> Result<Img, SurfaceError> {
        if let Some(limit) = self.budget {
            if self.live >= limit {
                return Err(SurfaceError::OutOfImages { limit });
            }
        }
        self.live += 1;
        Ok(Img {
            ch,
            color,
            font: *font,
        })
    }

    fn release(&mut self, _image: Img) {
        self.live = self.live.saturating_sub(1);
    }

    fn draw_glyph(&mut self, image: &Img, col: u16, row: u16, alpha: f32, tint: Option<Rgb>) {
        self.draws += 1;
        self.cells.insert(
            (col, row),
            Drawn {
                ch: image.ch,
                color: tint.unwrap_or(image.color),
                alpha,
            },
        );
    }
}
