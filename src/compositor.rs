// Copyright (c) 2026 rezky_nightky

use crate::glyph::{ColorRole, GlyphCache};
use crate::options::Options;
use crate::rain::{classify, fade_alpha, CellClass, ColumnColoring, Rain};
use crate::surface::Surface;

/// Per-tick drawing switches, snapshotted from the options.
#[derive(Clone, Copy, Debug)]
pub struct DrawCtx {
    pub fade: bool,
    pub highlight: bool,
    pub tail: bool,
    pub coloring: ColumnColoring,
}

impl DrawCtx {
    pub fn from_options(opts: &Options) -> Self {
        Self {
            fade: opts.movement.column_alpha_fade,
            highlight: opts.appearance.highlight.enabled,
            tail: opts.appearance.tail.enabled,
            coloring: opts.coloring(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub columns_drawn: usize,
    pub cells_drawn: usize,
    pub cells_cleared: usize,
    pub cache_misses: usize,
}

/// Draws every column that fell on the last tick. Rows below a head are not
/// touched and keep whatever the surface last showed there.
pub fn composite<S: Surface>(
    rain: &Rain,
    cache: &GlyphCache<S::Image>,
    ctx: &DrawCtx,
    surface: &mut S,
) -> CompositeStats {
    let mut stats = CompositeStats::default();
    let rows = rain.grid().rows;
    let Some(blank) = cache.blank() else {
        return stats;
    };

    for column in rain.columns() {
        let Some(loops) = column.fell_at() else {
            continue;
        };
        stats.columns_drawn += 1;

        for row in 0..rows {
            let class = classify(loops, column.drop_length, rows, row);
            let role = match class {
                CellClass::Blank => {
                    surface.draw_glyph(blank, column.index, row, 1.0, None);
                    stats.cells_cleared += 1;
                    continue;
                }
                CellClass::Head if ctx.highlight => ColorRole::Highlight,
                CellClass::Tail if ctx.tail => ColorRole::Tail,
                _ => ColorRole::Body,
            };

            let ch = column.data[row as usize];
            match cache.get(ch, role) {
                Some(image) => {
                    let alpha = if ctx.fade {
                        fade_alpha(loops, column.drop_length, row)
                    } else {
                        1.0
                    };
                    let tint = if role == ColorRole::Body {
                        ctx.coloring.body_tint(column, row, rows)
                    } else {
                        None
                    };
                    surface.draw_glyph(image, column.index, row, alpha, tint);
                    stats.cells_drawn += 1;
                }
                None => stats.cache_misses += 1,
            }

            if class == CellClass::Head {
                break;
            }
        }
    }

    if stats.cache_misses > 0 {
        log::warn!("{} glyphs missing from the cache", stats.cache_misses);
    }
    stats
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::glyph::{BuildProgress, Font, FontFamily, GlyphSpec, RoleColors};
    use crate::palette::Rgb;
    use crate::rain::{ColumnMode, Grid};
    use crate::testing::{Img, RecordingSurface};

    const BODY: Rgb = Rgb::new(0, 255, 0);
    const HIGHLIGHT: Rgb = Rgb::WHITE;
    const TAIL: Rgb = Rgb::new(0x77, 0x77, 0x77);

    fn ready_cache(surface: &mut RecordingSurface, alphabet: &[char]) -> GlyphCache<Img> {
        let mut cache = GlyphCache::new();
        cache.request(GlyphSpec {
            alphabet: alphabet.to_vec(),
            font: Font {
                family: FontFamily::Regular,
                size: 1,
            },
            roles: RoleColors {
                body: BODY,
                highlight: HIGHLIGHT,
                tail: TAIL,
            },
        });
        while cache.pump(surface, 1024).unwrap() != BuildProgress::Finished {}
        cache
    }

    fn ctx(fade: bool) -> DrawCtx {
        DrawCtx {
            fade,
            highlight: true,
            tail: true,
            coloring: ColumnColoring {
                mode: ColumnMode::Solid,
                color1: BODY,
                color2: BODY,
            },
        }
    }

    /// One column of 20 rows with drop length 15, started immediately.
    fn single_column() -> Rain {
        let mut rain = Rain::new(StdRng::seed_from_u64(3));
        rain.reset(Grid { cols: 1, rows: 20 }, 0.75, &['a'], &ctx(true).coloring);
        while rain.columns()[0].fell_at().is_none() {
            rain.advance(&['a'], &ctx(true).coloring, false);
        }
        rain
    }

    fn run_to(rain: &mut Rain, loops: u32) {
        while rain.columns()[0].fell_at() != Some(loops) {
            rain.advance(&['a'], &ctx(true).coloring, false);
        }
    }

    #[test]
    fn head_is_highlighted_opaque_and_stops_the_column() {
        let mut surface = RecordingSurface::new(1, 20);
        let cache = ready_cache(&mut surface, &['a']);
        let mut rain = single_column();
        run_to(&mut rain, 5);

        let stats = composite(&rain, &cache, &ctx(true), &mut surface);
        assert_eq!(stats.cells_drawn, 6);
        let head = &surface.cells[&(0, 5)];
        assert_eq!(head.color, HIGHLIGHT);
        assert_eq!(head.alpha, 1.0);
        assert_eq!(surface.cells[&(0, 0)].color, BODY);
        assert!(!surface.cells.contains_key(&(0, 6)));
    }

    #[test]
    fn wraparound_tick_clears_the_top_row() {
        let mut surface = RecordingSurface::new(1, 20);
        let cache = ready_cache(&mut surface, &['a']);
        let mut rain = single_column();
        run_to(&mut rain, 20);

        let stats = composite(&rain, &cache, &ctx(false), &mut surface);
        assert_eq!(surface.glyph_at(0, 0), None);
        assert_eq!(surface.cells[&(0, 1)].color, TAIL);
        assert_eq!(surface.cells[&(0, 5)].color, BODY);
        assert_eq!(stats.cells_cleared, 1);
        assert_eq!(stats.cells_drawn, 19);
    }

    #[test]
    fn disabled_roles_fall_back_to_body() {
        let mut surface = RecordingSurface::new(1, 20);
        let cache = ready_cache(&mut surface, &['a']);
        let mut rain = single_column();
        run_to(&mut rain, 3);

        let plain = DrawCtx {
            highlight: false,
            tail: false,
            ..ctx(false)
        };
        composite(&rain, &cache, &plain, &mut surface);
        assert_eq!(surface.cells[&(0, 3)].color, BODY);
    }

    #[test]
    fn delayed_columns_draw_nothing() {
        let mut surface = RecordingSurface::new(4, 20);
        let cache = ready_cache(&mut surface, &['a']);
        let mut rain = Rain::new(StdRng::seed_from_u64(9));
        rain.reset(Grid { cols: 4, rows: 20 }, 0.75, &['a'], &ctx(true).coloring);

        let stats = composite(&rain, &cache, &ctx(true), &mut surface);
        assert_eq!(stats, CompositeStats::default());
        assert_eq!(surface.draws, 0);
    }

    #[test]
    fn vertical_gradient_tints_body_cells_only() {
        let mut surface = RecordingSurface::new(1, 20);
        let cache = ready_cache(&mut surface, &['a']);
        let mut rain = single_column();
        run_to(&mut rain, 19);

        let blue = Rgb::new(0, 0, 255);
        let gradient = DrawCtx {
            coloring: ColumnColoring {
                mode: ColumnMode::VerticalGradient,
                color1: blue,
                color2: BODY,
            },
            ..ctx(false)
        };
        composite(&rain, &cache, &gradient, &mut surface);
        assert_eq!(surface.cells[&(0, 0)].color, TAIL);
        assert_eq!(surface.cells[&(0, 19)].color, HIGHLIGHT);
        assert_eq!(surface.cells[&(0, 18)].color, blue.lerp(BODY, 18.0 / 19.0));
    }
}
