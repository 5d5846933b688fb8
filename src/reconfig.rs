// Copyright (c) 2026 rezky_nightky

use crate::charset::{build_text_range, TextRange};
use crate::error::EngineError;
use crate::options::{self, ChangeKind, OptionValue, Options, TEXT_RANGE_PREFIX};

/// Disruptive work waiting for the next tick boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pending {
    pub reinit: bool,
    pub rebuild: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    Reinitialize,
    RebuildCache,
}

/// Option store that classifies every write and batches disruptive ones.
pub struct Reconfigurator {
    options: Options,
    text: TextRange,
    pending: Pending,
}

impl Reconfigurator {
    pub fn new(options: Options) -> Self {
        let text = build_text_range(options.text_range);
        Self {
            options,
            text,
            pending: Pending::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn text(&self) -> &TextRange {
        &self.text
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn get(&self, path: &str) -> Result<OptionValue, EngineError> {
        self.options.get(path)
    }

    /// Validates and stores `value`, then records what the change needs.
    /// A rejected write leaves everything untouched.
    pub fn set(&mut self, path: &str, value: OptionValue) -> Result<ChangeKind, EngineError> {
        let spec = options::validate(path, &value)?;
        log::debug!("set {} = {} ({})", path, value, spec.change.label());
        self.options.apply(path, value);

        match spec.change {
            ChangeKind::Reinitialize => self.pending.reinit = true,
            ChangeKind::CacheRebuild => self.pending.rebuild = true,
            ChangeKind::Instant => {
                if path.starts_with(TEXT_RANGE_PREFIX) {
                    self.refresh_text();
                }
            }
        }
        Ok(spec.change)
    }

    pub fn refresh_text(&mut self) {
        self.text = build_text_range(self.options.text_range);
    }

    pub fn request_reinit(&mut self) {
        self.pending.reinit = true;
    }

    pub fn clear_pending(&mut self) {
        self.pending = Pending::default();
    }

    /// Hands out at most one deferred action. A re-initialize absorbs a
    /// pending cache rebuild; a rebuild waits while another is in flight.
    pub fn take_deferred(&mut self, rebuild_in_flight: bool) -> Option<Deferred> {
        if self.pending.reinit {
            self.pending = Pending::default();
            return Some(Deferred::Reinitialize);
        }
        if self.pending.rebuild && !rebuild_in_flight {
            self.pending.rebuild = false;
            return Some(Deferred::RebuildCache);
        }
        None
    }
}
