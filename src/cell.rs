// Copyright (c) 2026 rezky_nightky

use crossterm::style::{Attribute, Color};

use crate::glyph::FontFamily;

/// Terminal rendition of a font family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellAttr {
    #[default]
    Plain,
    Bold,
    Italic,
    Underline,
}

impl CellAttr {
    pub fn attribute(self) -> Option<Attribute> {
        match self {
            CellAttr::Plain => None,
            CellAttr::Bold => Some(Attribute::Bold),
            CellAttr::Italic => Some(Attribute::Italic),
            CellAttr::Underline => Some(Attribute::Underlined),
        }
    }
}

impl From<FontFamily> for CellAttr {
    fn from(family: FontFamily) -> Self {
        match family {
            FontFamily::Regular => CellAttr::Plain,
            FontFamily::Bold => CellAttr::Bold,
            FontFamily::Italic => CellAttr::Italic,
            FontFamily::Underline => CellAttr::Underline,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attr: CellAttr,
}

impl Cell {
    pub fn blank(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            attr: CellAttr::Plain,
        }
    }

    /// Same terminal styling, so the two can share one print run.
    pub fn same_style(&self, other: &Cell) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attr == other.attr
    }
}
