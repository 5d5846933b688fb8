// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

use crate::surface::SurfaceError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("renderer not initialized")]
    NotInitialized,
    #[error("renderer already running")]
    AlreadyRunning,
    #[error("renderer already paused")]
    AlreadyPaused,
    #[error("renderer is not paused")]
    NotPaused,

    #[error("unknown option: {0} (see --list-options)")]
    UnknownOption(String),
    #[error("failed to apply {path}: expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("failed to apply {path} {value} (min {min} max {max})")]
    OutOfRange {
        path: String,
        value: String,
        min: String,
        max: String,
    },
    #[error("failed to apply {path} {value:?} (allowed: {allowed})")]
    InvalidChoice {
        path: String,
        value: String,
        allowed: String,
    },
    #[error("failed to apply {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("glyph cache rebuild failed: {0}")]
    GlyphAllocation(#[from] SurfaceError),
}
