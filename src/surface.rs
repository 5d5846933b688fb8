// Copyright (c) 2026 rezky_nightky

//! Drawing surface contract consumed by the engine.
//!
//! Coordinates passed to [`Surface::draw_glyph`] are grid cells; the surface
//! maps them onto its own units using the glyph box size it rasterized the
//! image with.

use thiserror::Error;

use crate::glyph::Font;
use crate::palette::Rgb;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("image budget exhausted ({limit} images)")]
    OutOfImages { limit: usize },
}

pub trait Surface {
    type Image;

    fn resize(&mut self, width: u16, height: u16);

    fn clear(&mut self);

    fn set_background(&mut self, color: Rgb);

    /// Renders `ch` off-surface into a reusable image.
    fn rasterize(&mut self, ch: char, font: &Font, color: Rgb) -> Result<Self::Image, SurfaceError>;

    /// Returns an image to the surface once the cache drops it.
    fn release(&mut self, _image: Self::Image) {}

    /// `alpha` is in `0..=1`; `tint` replaces the colour baked into the image.
    fn draw_glyph(&mut self, image: &Self::Image, col: u16, row: u16, alpha: f32, tint: Option<Rgb>);
}
