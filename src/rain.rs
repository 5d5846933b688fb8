// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

use crate::palette::Rgb;

/// Rows behind the drop that fade in the tail colour before clearing.
pub const TAIL_LENGTH: u32 = 4;
pub const INIT_DELAY_MAX: u32 = 134;
pub const RECYCLE_DELAY_MAX: u32 = 39;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Grid {
    pub cols: u16,
    pub rows: u16,
}

impl Grid {
    pub fn from_surface(width: u16, height: u16, glyph_size: u16) -> Self {
        let size = glyph_size.max(1);
        Self {
            cols: width / size,
            rows: height / size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellClass {
    Head,
    Tail,
    Body,
    Blank,
}

/// Classification of `row` in a column that has fallen `loops` cells.
pub fn classify(loops: u32, drop_length: u32, rows: u16, row: u16) -> CellClass {
    let rows = rows as u32;
    let row = row as u32;
    if rows > 0 && loops < rows && loops % rows == row {
        CellClass::Head
    } else if loops > drop_length + TAIL_LENGTH + row {
        CellClass::Blank
    } else if loops > drop_length + row {
        CellClass::Tail
    } else {
        CellClass::Body
    }
}

/// Fade factor of a drawn cell; 1 at the head, 0 where the cell blanks.
pub fn fade_alpha(loops: u32, drop_length: u32, row: u16) -> f32 {
    let dist = loops as f32 - row as f32;
    (1.0 - dist / (drop_length + TAIL_LENGTH) as f32).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnMode {
    Solid,
    HorizontalGradient,
    VerticalGradient,
    Random,
}

impl ColumnMode {
    pub const NAMES: &'static [&'static str] = &["solid", "horizontal", "vertical", "random"];

    pub fn from_name(s: &str) -> Option<ColumnMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(ColumnMode::Solid),
            "horizontal" | "horizontal-gradient" => Some(ColumnMode::HorizontalGradient),
            "vertical" | "vertical-gradient" => Some(ColumnMode::VerticalGradient),
            "random" => Some(ColumnMode::Random),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnMode::Solid => "solid",
            ColumnMode::HorizontalGradient => "horizontal",
            ColumnMode::VerticalGradient => "vertical",
            ColumnMode::Random => "random",
        }
    }

    pub fn next(self) -> ColumnMode {
        match self {
            ColumnMode::Solid => ColumnMode::HorizontalGradient,
            ColumnMode::HorizontalGradient => ColumnMode::VerticalGradient,
            ColumnMode::VerticalGradient => ColumnMode::Random,
            ColumnMode::Random => ColumnMode::Solid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnColoring {
    pub mode: ColumnMode,
    pub color1: Rgb,
    pub color2: Rgb,
}

fn gradient_at(from: Rgb, to: Rgb, pos: u16, len: u16) -> Rgb {
    if len <= 1 {
        return from;
    }
    from.lerp(to, pos as f32 / (len - 1) as f32)
}

impl ColumnColoring {
    /// Colour fixed for a column's lifetime, picked when it is (re)created.
    fn column_color(&self, index: u16, cols: u16, rng: &mut StdRng) -> Option<Rgb> {
        match self.mode {
            ColumnMode::Solid | ColumnMode::VerticalGradient => None,
            ColumnMode::HorizontalGradient => {
                Some(gradient_at(self.color1, self.color2, index, cols))
            }
            ColumnMode::Random => Some(Rgb::new(rng.random(), rng.random(), rng.random())),
        }
    }

    /// Tint for a body cell; `None` keeps the body role colour.
    pub fn body_tint(&self, column: &Column, row: u16, rows: u16) -> Option<Rgb> {
        match self.mode {
            ColumnMode::Solid => None,
            ColumnMode::VerticalGradient => Some(gradient_at(self.color1, self.color2, row, rows)),
            ColumnMode::HorizontalGradient | ColumnMode::Random => column.color,
        }
    }
}

/// What a column did on the last tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Waiting,
    Recycled,
    /// Drawn with this `loops` value, which has since been incremented.
    Fell(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnPhase {
    Delayed,
    Active,
    Expired,
}

#[derive(Clone, Debug)]
pub struct Column {
    pub index: u16,
    pub data: Vec<char>,
    pub loops: u32,
    pub delayed_loops: u32,
    pub drop_length: u32,
    pub color: Option<Rgb>,
    pub step: Step,
}

fn sample(alphabet: &[char], rng: &mut StdRng) -> char {
    if alphabet.is_empty() {
        return crate::charset::FALLBACK_CHAR;
    }
    alphabet[rng.random_range(0..alphabet.len())]
}

impl Column {
    fn fresh(
        index: u16,
        cfg: &Layout,
        alphabet: &[char],
        coloring: &ColumnColoring,
        init: bool,
        rng: &mut StdRng,
    ) -> Self {
        let max_delay = if init { INIT_DELAY_MAX } else { RECYCLE_DELAY_MAX };
        Self {
            index,
            data: (0..cfg.grid.rows).map(|_| sample(alphabet, rng)).collect(),
            loops: 0,
            delayed_loops: rng.random_range(0..=max_delay),
            drop_length: (cfg.grid.rows as f32 * cfg.drop_factor).floor().max(0.0) as u32,
            color: coloring.column_color(index, cfg.grid.cols, rng),
            step: Step::Waiting,
        }
    }

    pub fn phase(&self, rows: u16) -> ColumnPhase {
        if self.delayed_loops > 0 {
            ColumnPhase::Delayed
        } else if self.loops > self.drop_length + rows as u32 + TAIL_LENGTH {
            ColumnPhase::Expired
        } else {
            ColumnPhase::Active
        }
    }

    pub fn fell_at(&self) -> Option<u32> {
        match self.step {
            Step::Fell(loops) => Some(loops),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Layout {
    grid: Grid,
    drop_factor: f32,
}

/// Per-column drop simulation.
pub struct Rain {
    layout: Layout,
    columns: Vec<Column>,
    rng: StdRng,
}

impl Rain {
    pub fn new(rng: StdRng) -> Self {
        Self {
            layout: Layout {
                grid: Grid::default(),
                drop_factor: 0.75,
            },
            columns: Vec::new(),
            rng,
        }
    }

    pub fn grid(&self) -> Grid {
        self.layout.grid
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rebuilds every column with the large start-up delay.
    pub fn reset(
        &mut self,
        grid: Grid,
        drop_factor: f32,
        alphabet: &[char],
        coloring: &ColumnColoring,
    ) {
        self.layout = Layout { grid, drop_factor };
        let layout = self.layout;
        let rng = &mut self.rng;
        self.columns = (0..grid.cols)
            .map(|c| Column::fresh(c, &layout, alphabet, coloring, true, rng))
            .collect();
    }

    pub fn clear(&mut self) {
        self.layout.grid = Grid::default();
        self.columns.clear();
    }

    /// One simulation tick over every column.
    pub fn advance(&mut self, alphabet: &[char], coloring: &ColumnColoring, shimmer: bool) {
        let Self { layout, columns, rng } = self;
        let rows = layout.grid.rows;
        if rows == 0 {
            return;
        }

        let shimmer_max = (rows / 8) as usize;
        let shimmer_count = if shimmer && shimmer_max > 0 {
            rng.random_range(0..shimmer_max)
        } else {
            0
        };

        for column in columns.iter_mut() {
            match column.phase(rows) {
                ColumnPhase::Delayed => {
                    column.delayed_loops -= 1;
                    column.step = Step::Waiting;
                }
                ColumnPhase::Expired => {
                    *column = Column::fresh(column.index, layout, alphabet, coloring, false, rng);
                    column.step = Step::Recycled;
                }
                ColumnPhase::Active => {
                    column.step = Step::Fell(column.loops);
                    column.loops += 1;
                    for _ in 0..shimmer_count {
                        let pos = rng.random_range(0..column.data.len());
                        column.data[pos] = sample(alphabet, rng);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn coloring() -> ColumnColoring {
        ColumnColoring {
            mode: ColumnMode::Solid,
            color1: Rgb::new(0, 255, 0),
            color2: Rgb::new(0, 0, 255),
        }
    }

    fn rain(cols: u16, rows: u16) -> Rain {
        let mut rain = Rain::new(StdRng::seed_from_u64(7));
        rain.reset(Grid { cols, rows }, 0.75, &['a', 'b', 'c'], &coloring());
        rain
    }

    #[test]
    fn first_wraparound_tick_is_blank() {
        assert_eq!(classify(20, 15, 20, 0), CellClass::Blank);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify(5, 15, 20, 5), CellClass::Head);
        assert_eq!(classify(5, 15, 20, 4), CellClass::Body);
        assert_eq!(classify(16, 15, 20, 0), CellClass::Tail);
        assert_eq!(classify(19, 15, 20, 0), CellClass::Tail);
        assert_eq!(classify(15, 15, 20, 0), CellClass::Body);
        assert_eq!(classify(20, 15, 20, 1), CellClass::Tail);
        assert_eq!(classify(21, 15, 20, 1), CellClass::Blank);
        assert_eq!(classify(25, 15, 20, 19), CellClass::Body);
    }

    #[test]
    fn fade_is_opaque_at_head_and_transparent_at_blank_edge() {
        assert_eq!(fade_alpha(5, 15, 5), 1.0);
        assert_eq!(fade_alpha(19, 15, 0), 0.0);
        assert!((fade_alpha(10, 15, 0) - (1.0 - 10.0 / 19.0)).abs() < 1e-6);
    }

    #[test]
    fn grid_is_derived_from_surface_and_glyph_size() {
        assert_eq!(Grid::from_surface(80, 24, 1), Grid { cols: 80, rows: 24 });
        assert_eq!(Grid::from_surface(81, 25, 2), Grid { cols: 40, rows: 12 });
        assert_eq!(Grid::from_surface(3, 3, 4), Grid { cols: 0, rows: 0 });
    }

    #[test]
    fn data_length_tracks_rows_after_resize() {
        let mut r = rain(10, 20);
        assert!(r.columns().iter().all(|c| c.data.len() == 20));
        r.reset(Grid { cols: 4, rows: 7 }, 0.75, &['x'], &coloring());
        assert_eq!(r.columns().len(), 4);
        assert!(r.columns().iter().all(|c| c.data.len() == 7));
        for _ in 0..500 {
            r.advance(&['x', 'y'], &coloring(), true);
            assert!(r.columns().iter().all(|c| c.data.len() == 7));
        }
    }

    #[test]
    fn initial_delays_are_staggered_within_bounds() {
        let r = rain(200, 20);
        assert!(r.columns().iter().all(|c| c.delayed_loops <= INIT_DELAY_MAX));
        assert!(r.columns().iter().any(|c| c.delayed_loops > RECYCLE_DELAY_MAX));
        assert!(r.columns().iter().all(|c| c.loops == 0 && c.drop_length == 15));
    }

    #[test]
    fn column_recycles_exactly_past_the_exit() {
        let mut r = rain(1, 20);
        r.columns[0].delayed_loops = 0;
        let limit = 15 + 20 + TAIL_LENGTH;

        for expected in 0..=limit {
            r.advance(&['a'], &coloring(), false);
            assert_eq!(r.columns()[0].step, Step::Fell(expected));
        }
        assert_eq!(r.columns()[0].loops, limit + 1);
        assert_eq!(r.columns()[0].phase(20), ColumnPhase::Expired);

        r.advance(&['a'], &coloring(), false);
        let c = &r.columns()[0];
        assert_eq!(c.step, Step::Recycled);
        assert_eq!(c.loops, 0);
        assert!(c.delayed_loops <= RECYCLE_DELAY_MAX);
        assert_eq!(c.index, 0);
    }

    #[test]
    fn delayed_column_counts_down_without_falling() {
        let mut r = rain(1, 20);
        r.columns[0].delayed_loops = 2;
        r.advance(&['a'], &coloring(), false);
        assert_eq!(r.columns()[0].step, Step::Waiting);
        r.advance(&['a'], &coloring(), false);
        assert_eq!(r.columns()[0].step, Step::Waiting);
        assert_eq!(r.columns()[0].delayed_loops, 0);
        r.advance(&['a'], &coloring(), false);
        assert_eq!(r.columns()[0].step, Step::Fell(0));
    }

    #[test]
    fn shimmer_only_touches_characters() {
        let mut plain = rain(8, 64);
        let mut shimmer = rain(8, 64);
        for _ in 0..100 {
            plain.advance(&['a', 'b', 'c'], &coloring(), false);
            shimmer.advance(&['z'], &coloring(), true);
            for (p, s) in plain.columns().iter().zip(shimmer.columns()) {
                assert_eq!(p.loops, s.loops);
                assert_eq!(p.delayed_loops, s.delayed_loops);
                assert_eq!(p.drop_length, s.drop_length);
                assert_eq!(p.step, s.step);
            }
        }
        assert!(shimmer.columns().iter().any(|c| c.data.contains(&'z')));
        assert!(plain.columns().iter().all(|c| !c.data.contains(&'z')));
    }

    #[test]
    fn horizontal_gradient_spans_the_columns() {
        let mut r = Rain::new(StdRng::seed_from_u64(1));
        let coloring = ColumnColoring {
            mode: ColumnMode::HorizontalGradient,
            ..coloring()
        };
        r.reset(Grid { cols: 3, rows: 10 }, 0.5, &['a'], &coloring);
        assert_eq!(r.columns()[0].color, Some(Rgb::new(0, 255, 0)));
        assert_eq!(r.columns()[2].color, Some(Rgb::new(0, 0, 255)));
        let vertical = ColumnColoring {
            mode: ColumnMode::VerticalGradient,
            ..coloring
        };
        assert_eq!(vertical.body_tint(&r.columns()[1], 9, 10), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn empty_grid_is_inert() {
        let mut r = rain(0, 0);
        r.advance(&['a'], &coloring(), true);
        assert!(r.columns().is_empty());
    }
}
