// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;
use std::mem;

use crate::palette::Rgb;
use crate::surface::{Surface, SurfaceError};

/// Glyphs rasterized per host callback while a rebuild is in flight.
pub const GLYPHS_PER_PUMP: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Regular,
    Bold,
    Italic,
    Underline,
}

impl FontFamily {
    pub const NAMES: &'static [&'static str] = &["regular", "bold", "italic", "underline"];

    pub fn from_name(s: &str) -> Option<FontFamily> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "monospace" => Some(FontFamily::Regular),
            "bold" => Some(FontFamily::Bold),
            "italic" => Some(FontFamily::Italic),
            "underline" | "underlined" => Some(FontFamily::Underline),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Regular => "regular",
            FontFamily::Bold => "bold",
            FontFamily::Italic => "italic",
            FontFamily::Underline => "underline",
        }
    }

    pub fn next(self) -> FontFamily {
        match self {
            FontFamily::Regular => FontFamily::Bold,
            FontFamily::Bold => FontFamily::Italic,
            FontFamily::Italic => FontFamily::Underline,
            FontFamily::Underline => FontFamily::Regular,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    pub family: FontFamily,
    /// Side of the glyph box in surface units.
    pub size: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Body,
    Highlight,
    Tail,
}

impl ColorRole {
    pub const ALL: [ColorRole; 3] = [ColorRole::Body, ColorRole::Highlight, ColorRole::Tail];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleColors {
    pub body: Rgb,
    pub highlight: Rgb,
    pub tail: Rgb,
}

impl RoleColors {
    pub fn get(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Body => self.body,
            ColorRole::Highlight => self.highlight,
            ColorRole::Tail => self.tail,
        }
    }
}

/// Everything a rebuild needs; the cache is consistent with exactly one spec.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphSpec {
    pub alphabet: Vec<char>,
    pub font: Font,
    pub roles: RoleColors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildProgress {
    Idle,
    Pending { done: usize, total: usize },
    Finished,
    /// Finished, and a coalesced request started right away.
    Restarted,
}

struct Build<I> {
    spec: GlyphSpec,
    todo: Vec<(char, ColorRole)>,
    next: usize,
    entries: HashMap<(char, ColorRole), I>,
    blank: Option<I>,
}

impl<I> Build<I> {
    fn new(spec: GlyphSpec) -> Self {
        let todo: Vec<(char, ColorRole)> = spec
            .alphabet
            .iter()
            .flat_map(|&ch| ColorRole::ALL.into_iter().map(move |role| (ch, role)))
            .collect();
        Self {
            spec,
            entries: HashMap::with_capacity(todo.len()),
            todo,
            next: 0,
            blank: None,
        }
    }

    fn total(&self) -> usize {
        self.todo.len() + 1
    }

    fn done(&self) -> usize {
        self.next + usize::from(self.blank.is_some())
    }
}

/// Pre-rendered glyph images keyed by (character, colour role).
pub struct GlyphCache<I> {
    entries: HashMap<(char, ColorRole), I>,
    blank: Option<I>,
    build: Option<Build<I>>,
    queued: Option<GlyphSpec>,
    builds_finished: u64,
}

impl<I> Default for GlyphCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> GlyphCache<I> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            blank: None,
            build: None,
            queued: None,
            builds_finished: 0,
        }
    }

    /// Starts a rebuild, or coalesces into the single "again" slot when one
    /// is already running. Returns true when a new build started.
    pub fn request(&mut self, spec: GlyphSpec) -> bool {
        if self.build.is_some() {
            self.queued = Some(spec);
            return false;
        }
        self.build = Some(Build::new(spec));
        true
    }

    pub fn is_building(&self) -> bool {
        self.build.is_some()
    }

    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// Complete and not being replaced.
    pub fn is_ready(&self) -> bool {
        self.build.is_none() && self.blank.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn builds_finished(&self) -> u64 {
        self.builds_finished
    }

    pub fn get(&self, ch: char, role: ColorRole) -> Option<&I> {
        self.entries.get(&(ch, role))
    }

    pub fn blank(&self) -> Option<&I> {
        self.blank.as_ref()
    }

    /// Rasterizes up to `budget` glyphs of the in-flight build. On failure the
    /// partial set and any queued request are dropped; the published set is
    /// left untouched for the caller to release.
    pub fn pump<S>(&mut self, surface: &mut S, budget: usize) -> Result<BuildProgress, SurfaceError>
    where
        S: Surface<Image = I>,
    {
        let Some(build) = self.build.as_mut() else {
            return Ok(BuildProgress::Idle);
        };

        let mut left = budget.max(1);
        if build.blank.is_none() {
            match surface.rasterize(' ', &build.spec.font, build.spec.roles.body) {
                Ok(img) => build.blank = Some(img),
                Err(e) => {
                    self.abort(surface);
                    return Err(e);
                }
            }
            left -= 1;
        }

        while left > 0 && build.next < build.todo.len() {
            let (ch, role) = build.todo[build.next];
            match surface.rasterize(ch, &build.spec.font, build.spec.roles.get(role)) {
                Ok(img) => {
                    build.entries.insert((ch, role), img);
                }
                Err(e) => {
                    self.abort(surface);
                    return Err(e);
                }
            }
            build.next += 1;
            left -= 1;
        }

        if build.next < build.todo.len() {
            return Ok(BuildProgress::Pending {
                done: build.done(),
                total: build.total(),
            });
        }

        self.publish(surface);
        match self.queued.take() {
            Some(spec) => {
                self.build = Some(Build::new(spec));
                Ok(BuildProgress::Restarted)
            }
            None => Ok(BuildProgress::Finished),
        }
    }

    fn publish<S>(&mut self, surface: &mut S)
    where
        S: Surface<Image = I>,
    {
        let Some(build) = self.build.take() else {
            return;
        };
        let old_entries = mem::replace(&mut self.entries, build.entries);
        let old_blank = mem::replace(&mut self.blank, build.blank);
        self.builds_finished += 1;

        for (_, img) in old_entries {
            surface.release(img);
        }
        if let Some(img) = old_blank {
            surface.release(img);
        }
    }

    fn abort<S>(&mut self, surface: &mut S)
    where
        S: Surface<Image = I>,
    {
        self.queued = None;
        if let Some(build) = self.build.take() {
            for (_, img) in build.entries {
                surface.release(img);
            }
            if let Some(img) = build.blank {
                surface.release(img);
            }
        }
    }

    /// Drops every image, in flight or published, and forgets queued work.
    pub fn release<S>(&mut self, surface: &mut S)
    where
        S: Surface<Image = I>,
    {
        self.abort(surface);
        for (_, img) in self.entries.drain() {
            surface.release(img);
        }
        if let Some(img) = self.blank.take() {
            surface.release(img);
        }
        self.builds_finished = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{build_text_range, TextClasses};
    use crate::testing::RecordingSurface;

    fn spec(alphabet: &str) -> GlyphSpec {
        GlyphSpec {
            alphabet: alphabet.chars().collect(),
            font: Font {
                family: FontFamily::Regular,
                size: 1,
            },
            roles: RoleColors {
                body: Rgb::new(0, 255, 0),
                highlight: Rgb::WHITE,
                tail: Rgb::new(0x77, 0x77, 0x77),
            },
        }
    }

    fn pump_to_end(cache: &mut GlyphCache<crate::testing::Img>, surface: &mut RecordingSurface) {
        for _ in 0..1000 {
            match cache.pump(surface, GLYPHS_PER_PUMP).unwrap() {
                BuildProgress::Finished | BuildProgress::Idle => return,
                _ => {}
            }
        }
        panic!("build never finished");
    }

    #[test]
    fn rebuild_covers_every_active_character() {
        let range = build_text_range(TextClasses::ALL);
        let mut surface = RecordingSurface::new(80, 24);
        let mut cache = GlyphCache::new();
        let alphabet: String = range.superset.iter().collect();
        assert!(cache.request(spec(&alphabet)));
        pump_to_end(&mut cache, &mut surface);

        assert!(cache.is_ready());
        for &ch in &range.active {
            for role in ColorRole::ALL {
                let img = cache.get(ch, role).expect("cached glyph");
                assert_eq!(img.ch, ch);
            }
        }
        assert_eq!(cache.blank().unwrap().ch, ' ');
    }

    #[test]
    fn nothing_is_visible_until_the_build_completes() {
        let mut surface = RecordingSurface::new(80, 24);
        let mut cache = GlyphCache::new();
        cache.request(spec("abcdefghij"));

        let p = cache.pump(&mut surface, 4).unwrap();
        assert_eq!(p, BuildProgress::Pending { done: 4, total: 31 });
        assert!(cache.get('a', ColorRole::Body).is_none());
        assert!(!cache.is_ready());

        pump_to_end(&mut cache, &mut surface);
        assert_eq!(cache.len(), 30);
        assert_eq!(cache.builds_finished(), 1);
    }

    #[test]
    fn requests_during_a_build_coalesce_into_one() {
        let mut surface = RecordingSurface::new(80, 24);
        let mut cache = GlyphCache::new();
        assert!(cache.request(spec("ab")));
        assert!(!cache.request(spec("cd")));
        assert!(!cache.request(spec("ef")));

        assert_eq!(cache.pump(&mut surface, 64).unwrap(), BuildProgress::Restarted);
        assert!(cache.is_building());
        assert!(!cache.has_queued());
        assert_eq!(cache.pump(&mut surface, 64).unwrap(), BuildProgress::Finished);

        assert_eq!(cache.builds_finished(), 2);
        assert!(cache.get('e', ColorRole::Tail).is_some());
        assert!(cache.get('a', ColorRole::Tail).is_none());
        assert_eq!(surface.live_images(), 7);
    }

    #[test]
    fn allocation_failure_drops_the_partial_set() {
        let mut surface = RecordingSurface::new(80, 24).with_image_budget(5);
        let mut cache = GlyphCache::new();
        cache.request(spec("abcdef"));
        let err = cache.pump(&mut surface, 64).unwrap_err();
        assert_eq!(err, SurfaceError::OutOfImages { limit: 5 });
        assert!(!cache.is_building());
        assert!(cache.is_empty());
        assert_eq!(surface.live_images(), 0);
    }

    #[test]
    fn release_returns_all_images() {
        let mut surface = RecordingSurface::new(80, 24);
        let mut cache = GlyphCache::new();
        cache.request(spec("xyz"));
        pump_to_end(&mut cache, &mut surface);
        assert_eq!(surface.live_images(), 10);
        cache.release(&mut surface);
        assert_eq!(surface.live_images(), 0);
        assert!(cache.is_empty());
        assert!(!cache.is_ready());
    }
}
