// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod compositor;
mod config;
mod engine;
mod error;
mod frame;
mod glyph;
mod logging;
mod observer;
mod options;
mod palette;
mod rain;
mod reconfig;
mod scheduler;
mod surface;
mod term_surface;
mod terminal;
#[cfg(test)]
mod testing;

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use rand::{rngs::StdRng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::charset::CHAR_CLASSES;
use crate::config::{
    clap_styles, color_enabled_stdout, color_mode_from_flag, color_mode_label,
    detect_color_mode_auto, print_list_charsets, print_list_colors, print_list_options, Args,
    DEFAULT_PARAMS_USAGE,
};
use crate::engine::Engine;
use crate::observer::{EngineObserver, FrameStats};
use crate::options::{OptionValue, Options, TEXT_RANGE_PREFIX};
use crate::term_surface::{FrameSurface, DEFAULT_IMAGE_BUDGET};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const MAX_SCREEN: u16 = 4096;

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

/// What a key press asks the host to do.
#[derive(Clone, Debug, PartialEq)]
enum KeyAction {
    Quit,
    TogglePause,
    Restart,
    Set(String, OptionValue),
    Ignore,
}

fn set(path: &str, value: OptionValue) -> KeyAction {
    KeyAction::Set(path.to_string(), value)
}

fn key_action(opts: &Options, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('p') => KeyAction::TogglePause,
        KeyCode::Char(' ') => KeyAction::Restart,
        KeyCode::Up => set(
            "movement.fps",
            OptionValue::Float((opts.movement.fps + 1.0).min(240.0)),
        ),
        KeyCode::Down => set(
            "movement.fps",
            OptionValue::Float((opts.movement.fps - 1.0).max(1.0)),
        ),
        KeyCode::Char('f') => set(
            "movement.column_alpha_fade",
            OptionValue::Bool(!opts.movement.column_alpha_fade),
        ),
        KeyCode::Char('c') => set(
            "movement.change_chars_randomly",
            OptionValue::Bool(!opts.movement.change_chars_randomly),
        ),
        KeyCode::Char('h') => set(
            "appearance.highlight.enabled",
            OptionValue::Bool(!opts.appearance.highlight.enabled),
        ),
        KeyCode::Char('t') => set(
            "appearance.tail.enabled",
            OptionValue::Bool(!opts.appearance.tail.enabled),
        ),
        KeyCode::Char('m') => set(
            "appearance.column.mode",
            OptionValue::Text(opts.appearance.column.mode.next().name().to_string()),
        ),
        KeyCode::Char('F') => set(
            "font.family",
            OptionValue::Text(opts.font.family.next().name().to_string()),
        ),
        KeyCode::Char('+') | KeyCode::Char('=') if opts.font.size < 8 => {
            set("font.size", OptionValue::Int(opts.font.size as i64 + 1))
        }
        KeyCode::Char('-') if opts.font.size > 1 => {
            set("font.size", OptionValue::Int(opts.font.size as i64 - 1))
        }
        KeyCode::Char(d @ '0'..='9') => {
            let n = d.to_digit(10).unwrap_or(0) as usize;
            let idx = if n == 0 { 9 } else { n - 1 };
            match CHAR_CLASSES.get(idx) {
                Some(class) => set(
                    &format!("{}{}", TEXT_RANGE_PREFIX, class.name),
                    OptionValue::Bool(!opts.text_range.contains(class.flag)),
                ),
                None => KeyAction::Ignore,
            }
        }
        _ => KeyAction::Ignore,
    }
}

#[derive(Default)]
struct PerfCounters {
    frames: u64,
    cells_drawn: u64,
    cells_cleared: u64,
    cache_misses: u64,
    max_columns: usize,
}

struct PerfObserver(Rc<RefCell<PerfCounters>>);

impl EngineObserver for PerfObserver {
    fn on_frame(&mut self, stats: &FrameStats) {
        let mut p = self.0.borrow_mut();
        p.frames = p.frames.saturating_add(1);
        p.cells_drawn += stats.cells_drawn as u64;
        p.cells_cleared += stats.cells_cleared as u64;
        p.cache_misses += stats.cache_misses as u64;
        p.max_columns = p.max_columns.max(stats.columns_drawn);
    }
}

fn resize(engine: &mut Engine<FrameSurface>, w: u16, h: u16) {
    for (path, v) in [("screen.width", w), ("screen.height", h)] {
        if let Err(e) = engine.set(path, OptionValue::Int(v.min(MAX_SCREEN) as i64)) {
            log::warn!("resize rejected: {}", e);
        }
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(DEFAULT_PARAMS_USAGE)
        .help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_options {
        print_list_options();
        return Ok(());
    }
    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }
    if args.list_colors {
        print_list_colors();
        return Ok(());
    }
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let color_mode = match args.colormode.map(color_mode_from_flag) {
        Some(Ok(m)) => m,
        Some(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        None => detect_color_mode_auto(),
    };

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() { "(unset)" } else { &colorterm }
        );
        println!("  TERM: {}", if term.is_empty() { "(unset)" } else { &term });
        println!("  auto_detected: {}", color_mode_label(detect_color_mode_auto()));
        println!("  effective: {}", color_mode_label(color_mode));
        return Ok(());
    }

    let host_hz = require_f64_range("--host-hz", args.host_hz, 1.0, 1000.0);
    let duration_s = match args.duration {
        Some(s) if !s.is_finite() => {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        Some(s) if s > 0.0 => Some(require_f64_range("--duration", s, 0.1, 86400.0)),
        _ => None,
    };

    if let Some(path) = &args.log_file {
        if let Err(e) = logging::init_file_log(args.log_level.filter(), path) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let writes = args.option_writes().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let surface = FrameSurface::new(0, 0, color_mode, DEFAULT_IMAGE_BUDGET);
    let mut engine = Engine::new(surface, Options::default(), rng);
    for (path, value) in writes {
        if let Err(e) = engine.set(&path, value) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    if !args.get.is_empty() {
        for path in &args.get {
            match engine.get(path) {
                Ok(value) => println!("{}={}", path, value),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        return Ok(());
    }

    let perf = Rc::new(RefCell::new(PerfCounters::default()));
    if args.perf_stats {
        engine.set_observer(Box::new(PerfObserver(Rc::clone(&perf))));
    }

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    resize(&mut engine, w, h);
    if let Err(e) = engine.start() {
        drop(term);
        eprintln!("failed to start: {}", e);
        std::process::exit(1);
    }
    log::info!(
        "running at {} fps, host {} Hz, {}",
        engine.options().movement.fps,
        host_hz,
        color_mode_label(color_mode)
    );

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let period = Duration::from_secs_f64(1.0 / host_hz);
    let mut next_callback = Instant::now();
    let mut callbacks: u64 = 0;
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => resize(&mut engine, nw, nh),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        let outcome = match key_action(engine.options(), k.code) {
                            KeyAction::Quit => {
                                running = false;
                                Ok(())
                            }
                            KeyAction::TogglePause => engine.toggle_pause().map(|_| ()),
                            KeyAction::Restart => engine.restart(),
                            KeyAction::Set(path, value) => engine.set(&path, value).map(|_| ()),
                            KeyAction::Ignore => Ok(()),
                        };
                        if let Err(e) = outcome {
                            log::warn!("key {:?} ignored: {}", k.code, e);
                        }
                    }
                    _ => {}
                }
            }

            if !running {
                break;
            }
            let now = Instant::now();
            if now >= next_callback {
                break;
            }
            let mut timeout = next_callback - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        let now = Instant::now();
        if let Err(e) = engine.on_frame(now) {
            drop(term);
            eprintln!("rendering stopped: {}", e);
            std::process::exit(1);
        }
        callbacks = callbacks.saturating_add(1);

        let frame = engine.surface_mut().frame_mut();
        if frame.is_dirty() {
            term.draw(frame)?;
        }

        next_callback += period;
        let now = Instant::now();
        if now > next_callback {
            next_callback = now;
        }
    }

    let status = engine.status();
    let live_images = engine.surface().live_images();
    if let Err(e) = engine.stop() {
        log::warn!("{}", e);
    }
    drop(term);

    if args.perf_stats {
        let p = perf.borrow();
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let ticks = p.frames.max(1);
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  host_callbacks: {}", callbacks);
        println!("  ticks: {}", p.frames);
        println!("  avg_tick_rate: {:.3}", p.frames as f64 / elapsed_s);
        println!("  reinits: {}", status.reinits);
        println!("  glyphs_cached: {}", status.cached_glyphs);
        println!("  live_images: {}", live_images);
        println!(
            "  avg_cells_drawn: {:.1}",
            p.cells_drawn as f64 / ticks as f64
        );
        println!("  cells_cleared: {}", p.cells_cleared);
        println!("  cache_misses: {}", p.cache_misses);
        println!("  max_columns_per_tick: {}", p.max_columns);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::TextClasses;

    #[test]
    fn quit_pause_and_restart_keys() {
        let opts = Options::default();
        assert_eq!(key_action(&opts, KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(key_action(&opts, KeyCode::Esc), KeyAction::Quit);
        assert_eq!(key_action(&opts, KeyCode::Char('p')), KeyAction::TogglePause);
        assert_eq!(key_action(&opts, KeyCode::Char(' ')), KeyAction::Restart);
        assert_eq!(key_action(&opts, KeyCode::Char('z')), KeyAction::Ignore);
    }

    #[test]
    fn fps_keys_stay_in_range() {
        let mut opts = Options::default();
        opts.movement.fps = 240.0;
        assert_eq!(
            key_action(&opts, KeyCode::Up),
            set("movement.fps", OptionValue::Float(240.0))
        );
        opts.movement.fps = 1.0;
        assert_eq!(
            key_action(&opts, KeyCode::Down),
            set("movement.fps", OptionValue::Float(1.0))
        );
    }

    #[test]
    fn size_keys_stop_at_the_limits() {
        let mut opts = Options::default();
        assert_eq!(key_action(&opts, KeyCode::Char('-')), KeyAction::Ignore);
        assert_eq!(
            key_action(&opts, KeyCode::Char('+')),
            set("font.size", OptionValue::Int(2))
        );
        opts.font.size = 8;
        assert_eq!(key_action(&opts, KeyCode::Char('+')), KeyAction::Ignore);
    }

    #[test]
    fn digit_keys_toggle_classes() {
        let opts = Options::default();
        assert_eq!(
            key_action(&opts, KeyCode::Char('1')),
            set("text_range.numbers", OptionValue::Bool(false))
        );
        assert!(!opts.text_range.contains(TextClasses::GREEK));
        assert_eq!(
            key_action(&opts, KeyCode::Char('0')),
            set("text_range.greek", OptionValue::Bool(true))
        );
    }

    #[test]
    fn every_key_write_is_accepted() {
        let opts = Options::default();
        let codes = "fchtmF+-0123456789"
            .chars()
            .map(KeyCode::Char)
            .chain([KeyCode::Up, KeyCode::Down]);
        for code in codes {
            if let KeyAction::Set(path, value) = key_action(&opts, code) {
                assert!(options::validate(&path, &value).is_ok(), "{:?}", code);
            }
        }
    }
}
