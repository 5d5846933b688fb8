// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use log::Level;
use rand::rngs::StdRng;

use crate::compositor::{self, DrawCtx};
use crate::error::EngineError;
use crate::glyph::{BuildProgress, GlyphCache, GlyphSpec, GLYPHS_PER_PUMP};
use crate::observer::{EngineObserver, FrameStats};
use crate::options::{ChangeKind, OptionValue, Options};
use crate::rain::{Grid, Rain};
use crate::reconfig::{Deferred, Pending, Reconfigurator};
use crate::scheduler::FrameScheduler;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
    Paused,
}

/// What a host callback ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Stopped; the engine takes no more ticks.
    Idle,
    /// Too early for the next tick.
    Waiting,
    Reinitialized,
    /// A glyph cache rebuild is in flight; the last frame stays on screen.
    Suspended,
    Paused,
    Drawn,
}

/// Observable engine state, comparable across instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineStatus {
    pub state: EngineState,
    pub pending: Pending,
    pub rebuilding: bool,
    pub rebuild_queued: bool,
    pub cached_glyphs: usize,
    pub grid: Grid,
    pub columns: usize,
    pub ticks: u64,
    pub reinits: u64,
}

pub struct Engine<S: Surface> {
    surface: S,
    config: Reconfigurator,
    scheduler: FrameScheduler,
    rain: Rain,
    cache: GlyphCache<S::Image>,
    state: EngineState,
    observer: Option<Box<dyn EngineObserver>>,
    ticks: u64,
    reinits: u64,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S, options: Options, rng: StdRng) -> Self {
        let scheduler = FrameScheduler::new(options.movement.fps);
        Self {
            surface,
            config: Reconfigurator::new(options),
            scheduler,
            rain: Rain::new(rng),
            cache: GlyphCache::new(),
            state: EngineState::Stopped,
            observer: None,
            ticks: 0,
            reinits: 0,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn EngineObserver>) {
        self.observer = Some(observer);
    }

    #[cfg(test)]
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> &Options {
        self.config.options()
    }

    #[cfg(test)]
    pub fn text(&self) -> &crate::charset::TextRange {
        self.config.text()
    }

    #[cfg(test)]
    pub fn rain(&self) -> &Rain {
        &self.rain
    }

    #[cfg(test)]
    pub fn cache(&self) -> &GlyphCache<S::Image> {
        &self.cache
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.state,
            pending: self.config.pending(),
            rebuilding: self.cache.is_building(),
            rebuild_queued: self.cache.has_queued(),
            cached_glyphs: self.cache.len(),
            grid: self.rain.grid(),
            columns: self.rain.columns().len(),
            ticks: self.ticks,
            reinits: self.reinits,
        }
    }

    fn note(&mut self, level: Level, message: String) {
        log::log!(level, "{}", message);
        if let Some(obs) = self.observer.as_mut() {
            obs.on_log(level, &message);
        }
    }

    pub fn get(&self, path: &str) -> Result<OptionValue, EngineError> {
        self.config.get(path)
    }

    /// Stores an option. Instant changes take effect here; structural and
    /// cache changes wait for the next tick.
    pub fn set(&mut self, path: &str, value: OptionValue) -> Result<ChangeKind, EngineError> {
        let change = self.config.set(path, value)?;
        match path {
            "movement.fps" => self.scheduler.set_fps(self.config.options().movement.fps),
            "background.color" => {
                let bg = self.config.options().background;
                self.surface.set_background(bg);
            }
            _ => {}
        }
        Ok(change)
    }

    /// Starts from scratch, or resumes when paused.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => Err(EngineError::AlreadyRunning),
            EngineState::Paused => self.resume(),
            EngineState::Stopped => {
                self.note(Level::Info, "starting renderer".to_string());
                self.config.request_reinit();
                self.scheduler.reset();
                self.state = EngineState::Running;
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Stopped => {
                self.note(Level::Warn, "cannot pause: renderer not initialized".to_string());
                Err(EngineError::NotInitialized)
            }
            EngineState::Paused => Err(EngineError::AlreadyPaused),
            EngineState::Running => {
                self.note(Level::Info, "pausing renderer".to_string());
                self.state = EngineState::Paused;
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Stopped => Err(EngineError::NotInitialized),
            EngineState::Running => Err(EngineError::NotPaused),
            EngineState::Paused => {
                self.note(Level::Info, "resuming renderer".to_string());
                self.scheduler.reset();
                self.state = EngineState::Running;
                Ok(())
            }
        }
    }

    pub fn toggle_pause(&mut self) -> Result<EngineState, EngineError> {
        match self.state {
            EngineState::Running => self.pause()?,
            _ => self.resume()?,
        }
        Ok(self.state)
    }

    pub fn stop(&mut self) -> Result<(), EngineError> {
        if self.state == EngineState::Stopped {
            self.note(Level::Warn, "cannot stop: renderer not initialized".to_string());
            return Err(EngineError::NotInitialized);
        }
        self.note(Level::Info, "stopping renderer".to_string());
        self.teardown();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.stop()?;
        self.start()
    }

    fn teardown(&mut self) {
        self.cache.release(&mut self.surface);
        self.surface.clear();
        self.rain.clear();
        self.config.clear_pending();
        self.scheduler.reset();
        self.state = EngineState::Stopped;
        self.ticks = 0;
        self.reinits = 0;
    }

    /// Entry point for every host callback.
    pub fn on_frame(&mut self, now: Instant) -> Result<FrameOutcome, EngineError> {
        if self.state == EngineState::Stopped {
            return Ok(FrameOutcome::Idle);
        }

        if self.cache.is_building() {
            match self.cache.pump(&mut self.surface, GLYPHS_PER_PUMP) {
                Err(e) => {
                    self.note(Level::Error, format!("glyph cache rebuild failed: {}", e));
                    self.teardown();
                    return Err(e.into());
                }
                Ok(BuildProgress::Finished) => {
                    let (n, build) = (self.cache.len(), self.cache.builds_finished());
                    self.note(
                        Level::Debug,
                        format!("glyph cache ready ({} glyphs, build {})", n, build),
                    );
                }
                Ok(_) => return Ok(FrameOutcome::Suspended),
            }
        }

        if !self.scheduler.poll(now) {
            return Ok(FrameOutcome::Waiting);
        }
        Ok(self.tick())
    }

    fn tick(&mut self) -> FrameOutcome {
        match self.config.take_deferred(self.cache.is_building()) {
            Some(Deferred::Reinitialize) => {
                self.reinitialize();
                return FrameOutcome::Reinitialized;
            }
            Some(Deferred::RebuildCache) => {
                self.request_rebuild();
                return FrameOutcome::Suspended;
            }
            None => {}
        }

        if !self.cache.is_ready() {
            return FrameOutcome::Suspended;
        }
        if self.state == EngineState::Paused {
            return FrameOutcome::Paused;
        }

        let opts = self.config.options();
        let coloring = opts.coloring();
        let shimmer = opts.movement.change_chars_randomly;
        let ctx = DrawCtx::from_options(opts);
        self.rain.advance(&self.config.text().active, &coloring, shimmer);
        let drawn = compositor::composite(&self.rain, &self.cache, &ctx, &mut self.surface);
        self.ticks += 1;

        if let Some(obs) = self.observer.as_mut() {
            obs.on_frame(&FrameStats {
                tick: self.ticks,
                grid: self.rain.grid(),
                columns_drawn: drawn.columns_drawn,
                cells_drawn: drawn.cells_drawn,
                cells_cleared: drawn.cells_cleared,
                cache_misses: drawn.cache_misses,
            });
        }
        FrameOutcome::Drawn
    }

    fn reinitialize(&mut self) {
        let opts = self.config.options();
        let (width, height) = (opts.screen.width, opts.screen.height);
        let grid = Grid::from_surface(width, height, opts.font.size);
        let drop_factor = opts.screen.rain_drop_factor;
        let coloring = opts.coloring();
        let bg = opts.background;

        self.surface.resize(width, height);
        self.surface.set_background(bg);
        self.surface.clear();
        self.config.refresh_text();
        self.rain
            .reset(grid, drop_factor, &self.config.text().active, &coloring);
        self.reinits += 1;
        self.note(
            Level::Info,
            format!(
                "initialized {}x{} grid on a {}x{} surface",
                grid.cols, grid.rows, width, height
            ),
        );
        self.request_rebuild();
    }

    fn request_rebuild(&mut self) {
        let opts = self.config.options();
        let spec = GlyphSpec {
            alphabet: self.config.text().superset.clone(),
            font: opts.font,
            roles: opts.role_colors(),
        };
        if self.cache.request(spec) {
            self.note(Level::Debug, "rebuilding glyph cache".to_string());
        } else {
            self.note(
                Level::Debug,
                "glyph cache rebuild already running; queued another".to_string(),
            );
        }
    }
}
