// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::styling::{AnsiColor, Color, Effects, Style};
use clap::builder::Styles;
use clap::Parser;

use crate::charset::{classes_from_str, CHAR_CLASSES};
use crate::options::{self, OptionValue, OPTION_TABLE};
use crate::palette::{theme_from_str, ColorMode, Rgb, THEMES};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --fps 24 --color green --charset default --size 1 --font regular --drop-factor 0.75 --column-mode solid --host-hz 60";

pub fn color_enabled_stdout() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn clap_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .effects(Effects::BOLD)
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .usage(
            Style::new()
                .effects(Effects::BOLD)
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
}

fn heading(text: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", text);
    } else {
        println!("{}", text);
    }
}

/// One `--set PATH=VALUE` argument; the value is parsed against the option
/// table once the path is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetArg {
    pub path: String,
    pub raw: String,
}

impl FromStr for SetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, raw) = s
            .split_once('=')
            .ok_or_else(|| "expected: PATH=VALUE".to_string())?;
        let path = path.trim();
        if path.is_empty() {
            return Err("empty option path".to_string());
        }
        Ok(Self {
            path: path.to_string(),
            raw: raw.to_string(),
        })
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        help_heading = "APPEARANCE",
        help = "Colour preset for body, highlight and tail (see --list-colors)"
    )]
    pub color: Option<String>,

    #[arg(long = "bg", help_heading = "APPEARANCE", help = "Background colour (#rgb, #rrggbb or \"r g b\")")]
    pub bg: Option<Rgb>,

    #[arg(
        long = "column-mode",
        help_heading = "APPEARANCE",
        help = "Column colouring: solid, horizontal, vertical, random"
    )]
    pub column_mode: Option<String>,

    #[arg(long = "color1", help_heading = "APPEARANCE", help = "First gradient colour")]
    pub color1: Option<Rgb>,

    #[arg(long = "color2", help_heading = "APPEARANCE", help = "Second gradient colour")]
    pub color2: Option<Rgb>,

    #[arg(
        long = "font",
        help_heading = "APPEARANCE",
        help = "Font family: regular, bold, italic, underline"
    )]
    pub font: Option<String>,

    #[arg(
        long = "size",
        help_heading = "APPEARANCE",
        help = "Glyph box size in cells (min 1 max 8)"
    )]
    pub size: Option<i64>,

    #[arg(
        long = "no-fade",
        help_heading = "APPEARANCE",
        help = "Disable the alpha fade along each column"
    )]
    pub no_fade: bool,

    #[arg(
        long = "no-highlight",
        help_heading = "APPEARANCE",
        help = "Draw the head in the body colour"
    )]
    pub no_highlight: bool,

    #[arg(
        long = "no-tail",
        help_heading = "APPEARANCE",
        help = "Draw the tail in the body colour"
    )]
    pub no_tail: bool,

    #[arg(
        long = "charset",
        help_heading = "CHARSET",
        help = "Comma-separated character classes (see --list-charsets)"
    )]
    pub charset: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "MOVEMENT",
        help = "Simulation ticks per second (min 1 max 240)"
    )]
    pub fps: Option<f64>,

    #[arg(
        short = 'd',
        long = "drop-factor",
        help_heading = "MOVEMENT",
        help = "Drop length as a fraction of the rows (min 0 max 4)"
    )]
    pub drop_factor: Option<f64>,

    #[arg(
        long = "no-shimmer",
        help_heading = "MOVEMENT",
        help = "Keep characters fixed instead of changing them randomly"
    )]
    pub no_shimmer: bool,

    #[arg(
        long = "set",
        value_name = "PATH=VALUE",
        help_heading = "OPTIONS",
        help = "Write any option (repeatable, see --list-options)"
    )]
    pub set: Vec<SetArg>,

    #[arg(
        long = "host-hz",
        default_value_t = 60.0,
        help_heading = "GENERAL",
        help = "Host refresh callbacks per second (min 1 max 1000)"
    )]
    pub host_hz: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(long = "seed", help_heading = "GENERAL", help = "Seed the random generator")]
    pub seed: Option<u64>,

    #[arg(
        long = "colormode",
        help_heading = "GENERAL",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "perf-stats",
        help_heading = "GENERAL",
        help = "Print frame statistics on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "LOGGING",
        help = "Append log lines to this file"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value_t = LogLevel::Info,
        value_enum,
        help_heading = "LOGGING",
        help = "Minimum level written to --log-file"
    )]
    pub log_level: LogLevel,

    #[arg(
        long = "list-options",
        help_heading = "HELP",
        help = "List every option path and exit"
    )]
    pub list_options: bool,

    #[arg(
        long = "get",
        value_name = "PATH",
        help_heading = "HELP",
        help = "Print an option after applying the other flags and exit (repeatable)"
    )]
    pub get: Vec<String>,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List character classes and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List colour presets and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn text(v: &str) -> OptionValue {
    OptionValue::Text(v.trim().to_ascii_lowercase())
}

impl Args {
    /// Translates the flags into option writes, in the order they apply.
    /// `--set` comes last so it overrides the dedicated flags.
    pub fn option_writes(&self) -> Result<Vec<(String, OptionValue)>, String> {
        let mut out: Vec<(String, OptionValue)> = Vec::new();
        let mut push = |path: &str, value: OptionValue| out.push((path.to_string(), value));

        if let Some(name) = &self.color {
            let theme = theme_from_str(name)?;
            push("appearance.column.color", OptionValue::Color(theme.body));
            push("appearance.column.color1", OptionValue::Color(theme.body));
            push("appearance.highlight.color", OptionValue::Color(theme.highlight));
            push("appearance.tail.color", OptionValue::Color(theme.tail));
        }
        if let Some(bg) = self.bg {
            push("background.color", OptionValue::Color(bg));
        }
        if let Some(mode) = &self.column_mode {
            push("appearance.column.mode", text(mode));
        }
        if let Some(c) = self.color1 {
            push("appearance.column.color1", OptionValue::Color(c));
        }
        if let Some(c) = self.color2 {
            push("appearance.column.color2", OptionValue::Color(c));
        }
        if let Some(font) = &self.font {
            push("font.family", text(font));
        }
        if let Some(size) = self.size {
            push("font.size", OptionValue::Int(size));
        }
        if let Some(spec) = &self.charset {
            let classes = classes_from_str(spec)?;
            for class in CHAR_CLASSES {
                push(
                    &format!("{}{}", options::TEXT_RANGE_PREFIX, class.name),
                    OptionValue::Bool(classes.contains(class.flag)),
                );
            }
        }
        if let Some(fps) = self.fps {
            push("movement.fps", OptionValue::Float(fps));
        }
        if let Some(factor) = self.drop_factor {
            push("screen.rain_drop_factor", OptionValue::Float(factor));
        }
        if self.no_fade {
            push("movement.column_alpha_fade", OptionValue::Bool(false));
        }
        if self.no_shimmer {
            push("movement.change_chars_randomly", OptionValue::Bool(false));
        }
        if self.no_highlight {
            push("appearance.highlight.enabled", OptionValue::Bool(false));
        }
        if self.no_tail {
            push("appearance.tail.enabled", OptionValue::Bool(false));
        }

        for set in &self.set {
            let spec = options::lookup(&set.path)
                .ok_or_else(|| format!("unknown option: {} (see --list-options)", set.path))?;
            let value = spec
                .kind
                .parse(&set.raw)
                .map_err(|e| format!("failed to apply --set {}: {}", set.path, e))?;
            push(&set.path, value);
        }
        Ok(out)
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    ColorMode::Color16
}

pub fn color_mode_from_flag(m: u16) -> Result<ColorMode, String> {
    match m {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(format!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m)),
    }
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

pub fn print_list_options() {
    heading("AVAILABLE OPTIONS:");
    println!("PATH                             KIND                                  CHANGE");
    for spec in OPTION_TABLE {
        println!(
            "{:<32} {:<37} {}",
            spec.path,
            spec.kind.describe(),
            spec.change.label()
        );
    }
}

pub fn print_list_charsets() {
    heading("AVAILABLE CHARACTER CLASSES:");
    println!("NOTE: Combine with commas, e.g. --charset numbers,katakana (also: all, none, default).");
    println!();
    println!("VALUE          CHARACTERS");
    for class in CHAR_CLASSES {
        let sample: String = class.chars.chars().take(24).collect();
        println!("{:<14} {}", class.name, sample);
    }
}

pub fn print_list_colors() {
    heading("AVAILABLE COLOR PRESETS:");
    println!("NOTE: Use only the VALUE (left side) with --color.");
    println!();
    println!("VALUE        BODY     HIGHLIGHT TAIL");
    for (name, theme) in THEMES {
        println!(
            "{:<12} {}  {}   {}",
            name, theme.body, theme.highlight, theme.tail
        );
    }
}
