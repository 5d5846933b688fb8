// Copyright (c) 2026 rezky_nightky

use std::fmt;

use crate::charset::{class_by_name, TextClasses, CHAR_CLASSES};
use crate::error::EngineError;
use crate::glyph::{Font, FontFamily, RoleColors};
use crate::palette::Rgb;
use crate::rain::{ColumnColoring, ColumnMode};

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Color(Rgb),
    Text(String),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Color(_) => "color",
            OptionValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Color(v) => write!(f, "{}", v),
            OptionValue::Text(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueKind {
    Bool,
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Color,
    Choice(&'static [&'static str]),
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int { .. } => "int",
            ValueKind::Float { .. } => "float",
            ValueKind::Color => "color",
            ValueKind::Choice(_) => "text",
        }
    }

    /// Parses a raw command-line value into the kind's value type.
    pub fn parse(&self, raw: &str) -> Result<OptionValue, String> {
        let raw = raw.trim();
        match self {
            ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(OptionValue::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(OptionValue::Bool(false)),
                _ => Err(format!("expected a boolean, got {:?}", raw)),
            },
            ValueKind::Int { .. } => raw
                .parse()
                .map(OptionValue::Int)
                .map_err(|_| format!("expected an integer, got {:?}", raw)),
            ValueKind::Float { .. } => raw
                .parse()
                .map(OptionValue::Float)
                .map_err(|_| format!("expected a number, got {:?}", raw)),
            ValueKind::Color => raw.parse().map(OptionValue::Color),
            ValueKind::Choice(_) => Ok(OptionValue::Text(raw.to_ascii_lowercase())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ValueKind::Bool => "bool".to_string(),
            ValueKind::Int { min, max } => format!("int {}..={}", min, max),
            ValueKind::Float { min, max } => format!("float {}..={}", min, max),
            ValueKind::Color => "color".to_string(),
            ValueKind::Choice(names) => names.join("|"),
        }
    }
}

/// How a write is handled by the reconfiguration controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Instant,
    CacheRebuild,
    Reinitialize,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Instant => "instant",
            ChangeKind::CacheRebuild => "cache",
            ChangeKind::Reinitialize => "structural",
        }
    }
}

#[derive(Debug)]
pub struct OptionSpec {
    pub path: &'static str,
    pub kind: ValueKind,
    pub change: ChangeKind,
}

const fn spec(path: &'static str, kind: ValueKind, change: ChangeKind) -> OptionSpec {
    OptionSpec { path, kind, change }
}

const SCREEN_MAX: i64 = 4096;

/// Dispatch table from option path to value kind and change class.
pub const OPTION_TABLE: &[OptionSpec] = &[
    spec("background.color", ValueKind::Color, ChangeKind::Instant),
    spec(
        "font.family",
        ValueKind::Choice(FontFamily::NAMES),
        ChangeKind::CacheRebuild,
    ),
    spec(
        "font.size",
        ValueKind::Int { min: 1, max: 8 },
        ChangeKind::Reinitialize,
    ),
    spec(
        "appearance.column.mode",
        ValueKind::Choice(ColumnMode::NAMES),
        ChangeKind::Instant,
    ),
    spec("appearance.column.color", ValueKind::Color, ChangeKind::CacheRebuild),
    spec("appearance.column.color1", ValueKind::Color, ChangeKind::Instant),
    spec("appearance.column.color2", ValueKind::Color, ChangeKind::Instant),
    spec("appearance.highlight.enabled", ValueKind::Bool, ChangeKind::Instant),
    spec("appearance.highlight.color", ValueKind::Color, ChangeKind::CacheRebuild),
    spec("appearance.tail.enabled", ValueKind::Bool, ChangeKind::Instant),
    spec("appearance.tail.color", ValueKind::Color, ChangeKind::CacheRebuild),
    spec(
        "screen.width",
        ValueKind::Int { min: 0, max: SCREEN_MAX },
        ChangeKind::Reinitialize,
    ),
    spec(
        "screen.height",
        ValueKind::Int { min: 0, max: SCREEN_MAX },
        ChangeKind::Reinitialize,
    ),
    spec(
        "screen.rain_drop_factor",
        ValueKind::Float { min: 0.0, max: 4.0 },
        ChangeKind::Reinitialize,
    ),
    spec(
        "movement.fps",
        ValueKind::Float { min: 1.0, max: 240.0 },
        ChangeKind::Instant,
    ),
    spec("movement.change_chars_randomly", ValueKind::Bool, ChangeKind::Instant),
    spec("movement.column_alpha_fade", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.numbers", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.letters_lower", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.letters_upper", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.cyrillic", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.special", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.binary", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.octal", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.hex", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.katakana", ValueKind::Bool, ChangeKind::Instant),
    spec("text_range.greek", ValueKind::Bool, ChangeKind::Instant),
];

pub const TEXT_RANGE_PREFIX: &str = "text_range.";

pub fn lookup(path: &str) -> Option<&'static OptionSpec> {
    OPTION_TABLE.iter().find(|s| s.path == path)
}

/// Checks `value` against the table without storing anything.
pub fn validate(path: &str, value: &OptionValue) -> Result<&'static OptionSpec, EngineError> {
    let spec = lookup(path).ok_or_else(|| EngineError::UnknownOption(path.to_string()))?;
    let mismatch = || EngineError::TypeMismatch {
        path: path.to_string(),
        expected: spec.kind.type_name(),
        found: value.type_name(),
    };

    match (&spec.kind, value) {
        (ValueKind::Bool, OptionValue::Bool(_)) | (ValueKind::Color, OptionValue::Color(_)) => {}
        (ValueKind::Int { min, max }, OptionValue::Int(v)) => {
            if v < min || v > max {
                return Err(EngineError::OutOfRange {
                    path: path.to_string(),
                    value: v.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        (ValueKind::Float { min, max }, OptionValue::Float(v)) => {
            if !v.is_finite() {
                return Err(EngineError::InvalidValue {
                    path: path.to_string(),
                    reason: format!("{} is not a finite number", v),
                });
            }
            if v < min || v > max {
                return Err(EngineError::OutOfRange {
                    path: path.to_string(),
                    value: v.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        (ValueKind::Choice(names), OptionValue::Text(v)) => {
            if !names.contains(&v.as_str()) {
                return Err(EngineError::InvalidChoice {
                    path: path.to_string(),
                    value: v.clone(),
                    allowed: names.join(", "),
                });
            }
        }
        _ => return Err(mismatch()),
    }
    Ok(spec)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStyle {
    pub mode: ColumnMode,
    pub color: Rgb,
    pub color1: Rgb,
    pub color2: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoleStyle {
    pub enabled: bool,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
    pub column: ColumnStyle,
    pub highlight: RoleStyle,
    pub tail: RoleStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    pub width: u16,
    pub height: u16,
    pub rain_drop_factor: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Movement {
    pub fps: f64,
    pub change_chars_randomly: bool,
    pub column_alpha_fade: bool,
}

/// The option tree. Writes go through [`crate::reconfig::Reconfigurator::set`].
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub background: Rgb,
    pub font: Font,
    pub appearance: Appearance,
    pub screen: Screen,
    pub movement: Movement,
    pub text_range: TextClasses,
}

impl Default for Options {
    fn default() -> Self {
        let body = Rgb::new(0x33, 0xff, 0x22);
        Self {
            background: Rgb::BLACK,
            font: Font {
                family: FontFamily::Regular,
                size: 1,
            },
            appearance: Appearance {
                column: ColumnStyle {
                    mode: ColumnMode::Solid,
                    color: body,
                    color1: body,
                    color2: Rgb::new(0x00, 0xaa, 0xff),
                },
                highlight: RoleStyle {
                    enabled: true,
                    color: Rgb::WHITE,
                },
                tail: RoleStyle {
                    enabled: true,
                    color: Rgb::new(0x77, 0x77, 0x77),
                },
            },
            screen: Screen {
                width: 80,
                height: 24,
                rain_drop_factor: 0.75,
            },
            movement: Movement {
                fps: 24.0,
                change_chars_randomly: true,
                column_alpha_fade: true,
            },
            text_range: TextClasses::DEFAULT,
        }
    }
}

impl Options {
    /// Stores an already validated value.
    pub(crate) fn apply(&mut self, path: &str, value: OptionValue) {
        match (path, value) {
            ("background.color", OptionValue::Color(c)) => self.background = c,
            ("font.family", OptionValue::Text(v)) => {
                if let Some(family) = FontFamily::from_name(&v) {
                    self.font.family = family;
                }
            }
            ("font.size", OptionValue::Int(v)) => self.font.size = v as u16,
            ("appearance.column.mode", OptionValue::Text(v)) => {
                if let Some(mode) = ColumnMode::from_name(&v) {
                    self.appearance.column.mode = mode;
                }
            }
            ("appearance.column.color", OptionValue::Color(c)) => self.appearance.column.color = c,
            ("appearance.column.color1", OptionValue::Color(c)) => {
                self.appearance.column.color1 = c
            }
            ("appearance.column.color2", OptionValue::Color(c)) => {
                self.appearance.column.color2 = c
            }
            ("appearance.highlight.enabled", OptionValue::Bool(b)) => {
                self.appearance.highlight.enabled = b
            }
            ("appearance.highlight.color", OptionValue::Color(c)) => {
                self.appearance.highlight.color = c
            }
            ("appearance.tail.enabled", OptionValue::Bool(b)) => self.appearance.tail.enabled = b,
            ("appearance.tail.color", OptionValue::Color(c)) => self.appearance.tail.color = c,
            ("screen.width", OptionValue::Int(v)) => self.screen.width = v as u16,
            ("screen.height", OptionValue::Int(v)) => self.screen.height = v as u16,
            ("screen.rain_drop_factor", OptionValue::Float(v)) => {
                self.screen.rain_drop_factor = v as f32
            }
            ("movement.fps", OptionValue::Float(v)) => self.movement.fps = v,
            ("movement.change_chars_randomly", OptionValue::Bool(b)) => {
                self.movement.change_chars_randomly = b
            }
            ("movement.column_alpha_fade", OptionValue::Bool(b)) => {
                self.movement.column_alpha_fade = b
            }
            (p, OptionValue::Bool(b)) if p.starts_with(TEXT_RANGE_PREFIX) => {
                if let Some(class) = class_by_name(&p[TEXT_RANGE_PREFIX.len()..]) {
                    self.text_range = self.text_range.with(class.flag, b);
                }
            }
            (p, v) => log::warn!("ignoring unvalidated write {} = {}", p, v),
        }
    }

    pub fn get(&self, path: &str) -> Result<OptionValue, EngineError> {
        let value = match path {
            "background.color" => OptionValue::Color(self.background),
            "font.family" => OptionValue::Text(self.font.family.name().to_string()),
            "font.size" => OptionValue::Int(self.font.size as i64),
            "appearance.column.mode" => {
                OptionValue::Text(self.appearance.column.mode.name().to_string())
            }
            "appearance.column.color" => OptionValue::Color(self.appearance.column.color),
            "appearance.column.color1" => OptionValue::Color(self.appearance.column.color1),
            "appearance.column.color2" => OptionValue::Color(self.appearance.column.color2),
            "appearance.highlight.enabled" => OptionValue::Bool(self.appearance.highlight.enabled),
            "appearance.highlight.color" => OptionValue::Color(self.appearance.highlight.color),
            "appearance.tail.enabled" => OptionValue::Bool(self.appearance.tail.enabled),
            "appearance.tail.color" => OptionValue::Color(self.appearance.tail.color),
            "screen.width" => OptionValue::Int(self.screen.width as i64),
            "screen.height" => OptionValue::Int(self.screen.height as i64),
            "screen.rain_drop_factor" => OptionValue::Float(self.screen.rain_drop_factor as f64),
            "movement.fps" => OptionValue::Float(self.movement.fps),
            "movement.change_chars_randomly" => {
                OptionValue::Bool(self.movement.change_chars_randomly)
            }
            "movement.column_alpha_fade" => OptionValue::Bool(self.movement.column_alpha_fade),
            p => {
                let class = p
                    .strip_prefix(TEXT_RANGE_PREFIX)
                    .and_then(|name| CHAR_CLASSES.iter().find(|c| c.name == name))
                    .ok_or_else(|| EngineError::UnknownOption(p.to_string()))?;
                OptionValue::Bool(self.text_range.contains(class.flag))
            }
        };
        Ok(value)
    }

    pub fn role_colors(&self) -> RoleColors {
        RoleColors {
            body: self.appearance.column.color,
            highlight: self.appearance.highlight.color,
            tail: self.appearance.tail.color,
        }
    }

    pub fn coloring(&self) -> ColumnColoring {
        ColumnColoring {
            mode: self.appearance.column.mode,
            color1: self.appearance.column.color1,
            color2: self.appearance.column.color2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_reads_back() {
        let opts = Options::default();
        for spec in OPTION_TABLE {
            let v = opts.get(spec.path).unwrap();
            assert!(validate(spec.path, &v).is_ok(), "{}", spec.path);
        }
    }

    #[test]
    fn every_class_has_a_text_range_option() {
        for class in CHAR_CLASSES {
            let path = format!("{}{}", TEXT_RANGE_PREFIX, class.name);
            assert!(lookup(&path).is_some(), "{}", path);
        }
    }

    #[test]
    fn rejects_wrong_types_instead_of_coercing() {
        let err = validate("movement.column_alpha_fade", &OptionValue::Int(1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::TypeMismatch {
                path: "movement.column_alpha_fade".to_string(),
                expected: "bool",
                found: "int",
            }
        );
        assert!(validate("movement.fps", &OptionValue::Int(30)).is_err());
    }

    #[test]
    fn rejects_out_of_range_and_unknown() {
        assert!(matches!(
            validate("font.size", &OptionValue::Int(0)),
            Err(EngineError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate("movement.fps", &OptionValue::Float(f64::NAN)),
            Err(EngineError::InvalidValue { .. })
        ));
        assert!(matches!(
            validate("font.family", &OptionValue::Text("comic sans".into())),
            Err(EngineError::InvalidChoice { .. })
        ));
        assert_eq!(
            validate("font.colour", &OptionValue::Bool(true)).err(),
            Some(EngineError::UnknownOption("font.colour".into()))
        );
    }

    #[test]
    fn apply_and_get_round_trip_through_paths() {
        let mut opts = Options::default();
        opts.apply("text_range.katakana", OptionValue::Bool(true));
        opts.apply("text_range.numbers", OptionValue::Bool(false));
        assert!(opts.text_range.contains(TextClasses::KATAKANA));
        assert!(!opts.text_range.contains(TextClasses::NUMBERS));

        opts.apply("appearance.column.mode", OptionValue::Text("random".into()));
        assert_eq!(opts.coloring().mode, ColumnMode::Random);
        assert_eq!(
            opts.get("appearance.column.mode").unwrap(),
            OptionValue::Text("random".into())
        );
    }

    #[test]
    fn parses_raw_values_by_kind() {
        assert_eq!(ValueKind::Bool.parse("off").unwrap(), OptionValue::Bool(false));
        assert_eq!(
            ValueKind::Int { min: 0, max: 9 }.parse(" 7 ").unwrap(),
            OptionValue::Int(7)
        );
        assert_eq!(
            ValueKind::Color.parse("#fff").unwrap(),
            OptionValue::Color(Rgb::WHITE)
        );
        assert!(ValueKind::Bool.parse("maybe").is_err());
    }
}
