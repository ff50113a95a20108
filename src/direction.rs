//! # Scan directions
//!
//! Semi-global matching sums the costs of independent 1-D paths through the image. This module
//! describes those paths: the step to the predecessor pixel, the order in which rows and columns
//! are visited, and the gradient axis used to adapt the jump penalty.
//!
//! Directions come in pairs (`2k`, `2k + 1`) which traverse the same line in opposite orders.
//! The first eight directions are the compass and diagonal lines. The eight extra directions of
//! the 16-direction set approximate the intermediate angles by alternating between two steps,
//! for example a horizontal and a diagonal one, on successive pixels or rows.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::gradient::GradientAxis;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Number of scan directions used by the smoothing engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum DirectionCount {
    Eight,
    Sixteen,
}

/// How a direction interleaves two steps to approximate a non-integer slope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alternation {
    /// Always use the full `(dx, dy)` step.
    None,

    /// Every other row uses `dx = 0`, starting with the first row.
    Rows,

    /// Every other pixel of a row uses `dy = 0`, starting with the first pixel.
    Columns,
}

/// Constant description of a scan direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Direction {
    /// Step from a pixel to its predecessor along the path.
    pub dx: i32,
    pub dy: i32,

    /// Traverse the axis in descending order when its step is zero.
    ///
    /// Axes with a non-zero step are always traversed away from the predecessor.
    pub reversed: bool,

    pub alternation: Alternation,

    /// Axis whose gradient modulates the jump penalty.
    pub axis: GradientAxis,
}

/// Inclusive traversal range of one image axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: i32,
    pub end: i32,
    pub step: i32,
}

/// Tracks the alternation phase of a direction while walking the image.
#[derive(Clone, Debug)]
pub struct PathWalker {
    dir: Direction,
    row_phase: bool,
    col_phase: bool,
}

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

const fn dir(
    dx: i32,
    dy: i32,
    reversed: bool,
    alternation: Alternation,
    axis: GradientAxis,
) -> Direction {
    Direction {
        dx,
        dy,
        reversed,
        alternation,
        axis,
    }
}

const DIRECTIONS: [Direction; 16] = [
    // Horizontal
    dir(-1, 0, false, Alternation::None, GradientAxis::X),
    dir(1, 0, true, Alternation::None, GradientAxis::X),
    // Main diagonal
    dir(-1, -1, false, Alternation::None, GradientAxis::Diagonal),
    dir(1, 1, true, Alternation::None, GradientAxis::Diagonal),
    // Vertical
    dir(0, -1, false, Alternation::None, GradientAxis::Y),
    dir(0, 1, true, Alternation::None, GradientAxis::Y),
    // Anti-diagonal
    dir(1, -1, false, Alternation::None, GradientAxis::AntiDiagonal),
    dir(-1, 1, true, Alternation::None, GradientAxis::AntiDiagonal),
    // Between horizontal and main diagonal
    dir(-1, -1, false, Alternation::Columns, GradientAxis::X),
    dir(1, 1, true, Alternation::Columns, GradientAxis::X),
    // Between vertical and main diagonal
    dir(-1, -1, false, Alternation::Rows, GradientAxis::Y),
    dir(1, 1, true, Alternation::Rows, GradientAxis::Y),
    // Between vertical and anti-diagonal
    dir(1, -1, false, Alternation::Rows, GradientAxis::Y),
    dir(-1, 1, true, Alternation::Rows, GradientAxis::Y),
    // Between horizontal and anti-diagonal
    dir(1, -1, false, Alternation::Columns, GradientAxis::X),
    dir(-1, 1, true, Alternation::Columns, GradientAxis::X),
];

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Default for DirectionCount {
    fn default() -> Self {
        DirectionCount::Eight
    }
}

impl DirectionCount {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            DirectionCount::Eight => &DIRECTIONS[..8],
            DirectionCount::Sixteen => &DIRECTIONS[..],
        }
    }
}

impl Direction {
    /// Column traversal for an image `width` pixels wide.
    pub fn x_span(&self, width: usize) -> Span {
        Span::for_axis(self.dx, self.reversed, width)
    }

    /// Row traversal for an image `height` pixels high.
    pub fn y_span(&self, height: usize) -> Span {
        Span::for_axis(self.dy, self.reversed, height)
    }
}

impl Span {
    /// Pixels with a predecessor at offset `step` are visited starting next to the edge the
    /// predecessor lies beyond. An axis without a step covers the whole range.
    fn for_axis(step: i32, reversed: bool, len: usize) -> Self {
        let n = len as i32;

        match step {
            s if s < 0 => Span {
                start: 1,
                end: n - 1,
                step: 1,
            },
            s if s > 0 => Span {
                start: n - 2,
                end: 0,
                step: -1,
            },
            _ if reversed => Span {
                start: n - 1,
                end: 0,
                step: -1,
            },
            _ => Span {
                start: 0,
                end: n - 1,
                step: 1,
            },
        }
    }

    /// Iterate the span in traversal order. Empty when the start lies past the end.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let Span { start, end, step } = *self;
        let count = if step > 0 { end - start + 1 } else { start - end + 1 };

        (0..count.max(0)).map(move |i| (start + i * step) as usize)
    }
}

impl PathWalker {
    pub fn new(dir: Direction) -> Self {
        Self {
            dir,
            row_phase: false,
            col_phase: false,
        }
    }

    /// Advance to the next row of the traversal.
    pub fn begin_row(&mut self) {
        if self.dir.alternation == Alternation::Rows {
            self.row_phase = !self.row_phase;
        }
        self.col_phase = false;
    }

    /// Advance to the next pixel of the row and return the step to its predecessor.
    ///
    /// Must be called for every pixel of the row, including skipped ones, to keep the
    /// alternation in phase.
    pub fn next_step(&mut self) -> (i32, i32) {
        if self.dir.alternation == Alternation::Columns {
            self.col_phase = !self.col_phase;
        }

        let dx = if self.row_phase { 0 } else { self.dir.dx };
        let dy = if self.col_phase { 0 } else { self.dir.dy };

        (dx, dy)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
