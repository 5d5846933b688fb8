// Copyright (c) 2026 rezky_nightky

use crate::rain::Grid;

/// Snapshot handed to the observer after every drawn tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub tick: u64,
    pub grid: Grid,
    pub columns_drawn: usize,
    pub cells_drawn: usize,
    pub cells_cleared: usize,
    pub cache_misses: usize,
}

/// Optional hook for debug overlays and telemetry. Both methods default to
/// doing nothing; the engine never depends on how they present anything.
pub trait EngineObserver {
    fn on_frame(&mut self, _stats: &FrameStats) {}

    fn on_log(&mut self, _level: log::Level, _message: &str) {}
}
