// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;

/// Terminal colour capability used when converting RGB into terminal colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `0..=1`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgb {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
        }
    }

    pub fn to_term_color(self, mode: ColorMode) -> Option<Color> {
        match mode {
            ColorMode::Mono => None,
            ColorMode::Color16 => Some(rgb_to_color16(self.r, self.g, self.b)),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(self.r, self.g, self.b))),
            ColorMode::TrueColor => Some(Color::Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            }),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn hex_digit(c: char) -> Option<u8> {
    c.to_digit(16).map(|v| v as u8)
}

/// Accepts `#rgb`, `#rrggbb` and the wallpaper-host form `"r g b"` with
/// floats in `0..=1`.
impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(hex_digit)
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| format!("invalid hex colour: {}", s))?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
                [r1, r0, g1, g0, b1, b0] => {
                    Ok(Rgb::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
                }
                _ => Err(format!("invalid hex colour: {} (expected #rgb or #rrggbb)", s)),
            };
        }

        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(format!(
                "invalid colour: {} (expected #rgb, #rrggbb or \"r g b\")",
                s
            ));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(parts) {
            let v: f32 = part
                .parse()
                .map_err(|_| format!("invalid colour channel: {}", part))?;
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(format!("colour channel out of range: {} (min 0 max 1)", part));
            }
            *slot = (v * 255.0).round() as u8;
        }
        Ok(Rgb::new(channels[0], channels[1], channels[2]))
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    if avg < 8 || avg > 238 {
        return cube_idx;
    }
    let gray_idx = 232 + ((avg - 8) / 10).min(23);
    let v = 8 + 10 * (gray_idx - 232);
    if dist2(r, g, b, v, v, v) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

/// Body, highlight and tail colours of a named theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub body: Rgb,
    pub highlight: Rgb,
    pub tail: Rgb,
}

pub const THEMES: &[(&str, Theme)] = &[
    (
        "green",
        Theme {
            body: Rgb::new(0x33, 0xff, 0x22),
            highlight: Rgb::WHITE,
            tail: Rgb::new(0x77, 0x77, 0x77),
        },
    ),
    (
        "gold",
        Theme {
            body: Rgb::new(0xd7, 0xaf, 0x00),
            highlight: Rgb::new(0xff, 0xf5, 0xcc),
            tail: Rgb::new(0x87, 0x5f, 0x00),
        },
    ),
    (
        "red",
        Theme {
            body: Rgb::new(0xd7, 0x00, 0x00),
            highlight: Rgb::new(0xff, 0xd7, 0xd7),
            tail: Rgb::new(0x5f, 0x00, 0x00),
        },
    ),
    (
        "blue",
        Theme {
            body: Rgb::new(0x00, 0x5f, 0xff),
            highlight: Rgb::new(0xd7, 0xeb, 0xff),
            tail: Rgb::new(0x00, 0x00, 0x87),
        },
    ),
    (
        "cyan",
        Theme {
            body: Rgb::new(0x00, 0xd7, 0xd7),
            highlight: Rgb::WHITE,
            tail: Rgb::new(0x00, 0x5f, 0x5f),
        },
    ),
    (
        "purple",
        Theme {
            body: Rgb::new(0x87, 0x5f, 0xd7),
            highlight: Rgb::new(0xff, 0xd7, 0xff),
            tail: Rgb::new(0x3a, 0x1f, 0x5f),
        },
    ),
    (
        "gray",
        Theme {
            body: Rgb::new(0xa8, 0xa8, 0xa8),
            highlight: Rgb::WHITE,
            tail: Rgb::new(0x44, 0x44, 0x44),
        },
    ),
    (
        "snow",
        Theme {
            body: Rgb::new(0xc6, 0xe2, 0xff),
            highlight: Rgb::WHITE,
            tail: Rgb::new(0x5f, 0x87, 0xaf),
        },
    ),
];

pub fn theme_from_str(s: &str) -> Result<Theme, String> {
    let key = match s.trim().to_ascii_lowercase().as_str() {
        "grey" => "gray".to_string(),
        "ice" => "snow".to_string(),
        other => other.to_string(),
    };
    THEMES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, t)| *t)
        .ok_or_else(|| format!("invalid color: {} (see --list-colors)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!("#3f2".parse::<Rgb>().unwrap(), Rgb::new(0x33, 0xff, 0x22));
        assert_eq!("#0a0B0c".parse::<Rgb>().unwrap(), Rgb::new(10, 11, 12));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#ggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn parses_wallpaper_float_triplets() {
        assert_eq!("0 1 0.2".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 51));
        assert!("0 1".parse::<Rgb>().is_err());
        assert!("0 1.5 0".parse::<Rgb>().is_err());
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = Rgb::BLACK;
        let b = Rgb::new(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn downgrades_by_color_mode() {
        let c = Rgb::new(0, 255, 0);
        assert_eq!(c.to_term_color(ColorMode::Mono), None);
        assert_eq!(c.to_term_color(ColorMode::Color16), Some(Color::Green));
        assert_eq!(c.to_term_color(ColorMode::Color256), Some(Color::AnsiValue(46)));
        assert_eq!(
            c.to_term_color(ColorMode::TrueColor),
            Some(Color::Rgb { r: 0, g: 255, b: 0 })
        );
    }

    #[test]
    fn theme_lookup_accepts_aliases() {
        assert_eq!(theme_from_str("GREY").unwrap(), theme_from_str("gray").unwrap());
        assert!(theme_from_str("plaid").is_err());
    }
}
