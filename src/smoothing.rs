//! # Directional smoothing
//!
//! The semi-global matching recurrence. Along every scan direction the accumulated cost of a
//! pixel at disparity `d` is
//!
//! ```text
//! L(p, d) = C(p, d) + min(L(q, d), L(q, d - 1) + P1, L(q, d + 1) + P1, min_k L(q, k) + P2)
//!           - min_k L(q, k)
//! ```
//!
//! where `q` is the predecessor of `p` along the path. Subtracting the predecessor minimum keeps
//! every `L` below `255 + P2`, so the sum over all directions fits a `u16` without changing
//! which disparity is cheapest.
//!
//! Directions are independent and run in parallel, each worker accumulating into its own total
//! volume; the partial totals are summed at the end.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rayon::prelude::*;

use crate::cost::COST_UNIT;
use crate::direction::{Direction, PathWalker};
use crate::gradient::EdgeStrength;
use crate::plane::Plane;
use crate::volume::CostVolume;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Largest allowed smoothness penalty. With appearance costs capped at 255, 64 directions of
/// `255 + MAX_PENALTY` still fit in a `u16`.
pub const MAX_PENALTY: u16 = 768;

/// Base P1 in cost units.
const P1_BASE: f32 = 1.0;

/// P2 in cost units on strong edges.
const P2_MIN_BASE: f32 = 1.0;

/// P2 in cost units on flat regions.
const P2_MAX_BASE: f32 = 8.0;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Smoothness penalties for small (P1) and large (P2) disparity changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penalties {
    pub p1: u16,
    pub p2_min: f32,
    pub p2_max: f32,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Penalties {
    /// Build penalties from user scale factors, clamping them to `[0, MAX_PENALTY]`.
    pub fn from_scales(p1_scale: f32, p2_scale: f32) -> Self {
        let clamp = |v: f32| v.max(0.0).min(MAX_PENALTY as f32);

        Self {
            p1: clamp(P1_BASE * COST_UNIT * p1_scale) as u16,
            p2_min: clamp(P2_MIN_BASE * COST_UNIT * p2_scale),
            p2_max: clamp(P2_MAX_BASE * COST_UNIT * p2_scale),
        }
    }

    /// Large-jump penalty for a pixel with the given edge strength in `[0, 1]`.
    ///
    /// Without edge information the flat-region penalty is used.
    #[inline]
    pub fn p2(&self, edge: Option<f32>) -> u16 {
        match edge {
            Some(e) => (self.p2_max + (self.p2_min - self.p2_max) * e) as u16,
            None => self.p2_max as u16,
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Run the recurrence along every direction and return the summed cost volume.
///
/// Invalid pixels are skipped; they contribute nothing and restart any path passing through
/// them. When `edges` is given, P2 is adapted to the local gradient.
pub fn aggregate(
    app_cost: &CostVolume<u8>,
    invalid: &Plane<bool>,
    edges: Option<&EdgeStrength>,
    directions: &[Direction],
    penalties: Penalties,
) -> CostVolume<u16> {
    let (w, h, nd) = (app_cost.width(), app_cost.height(), app_cost.num_disparities());

    directions
        .par_iter()
        .fold(
            || CostVolume::<u16>::new(w, h, nd),
            |mut total, &dir| {
                smooth_direction(app_cost, invalid, edges, dir, penalties, &mut total);
                total
            },
        )
        .reduce_with(|mut a, b| {
            a.accumulate(&b);
            a
        })
        .unwrap_or_else(|| CostVolume::new(w, h, nd))
}

/// Accumulate the path costs of a single direction into `total`.
pub fn smooth_direction(
    app_cost: &CostVolume<u8>,
    invalid: &Plane<bool>,
    edges: Option<&EdgeStrength>,
    dir: Direction,
    penalties: Penalties,
    total: &mut CostVolume<u16>,
) {
    let nd = app_cost.num_disparities();
    let row_len = app_cost.row_len();

    let mut prev = vec![0u16; row_len];
    let mut cur = vec![0u16; row_len];

    let mut walker = PathWalker::new(dir);
    let x_span = dir.x_span(app_cost.width());

    for y in dir.y_span(app_cost.height()).iter() {
        // Paths along the row restart from zero
        for v in cur.iter_mut() {
            *v = 0;
        }

        walker.begin_row();

        for x in x_span.iter() {
            let (dx, dy) = walker.next_step();

            if invalid.get(x, y) {
                continue;
            }

            let p2 = penalties.p2(edges.map(|e| e.get(dir.axis, x, y)));
            let px = (x as i32 + dx) as usize;

            if dy == 0 {
                let (pred, out) = split_pair(&mut cur, px * nd, x * nd, nd);
                step_cost(pred, app_cost.pixel(x, y), out, penalties.p1, p2);
            } else {
                step_cost(
                    &prev[px * nd..(px + 1) * nd],
                    app_cost.pixel(x, y),
                    &mut cur[x * nd..(x + 1) * nd],
                    penalties.p1,
                    p2,
                );
            }

            for (t, &c) in total
                .pixel_mut(x, y)
                .iter_mut()
                .zip(&cur[x * nd..(x + 1) * nd])
            {
                *t = t.saturating_add(c);
            }
        }

        std::mem::swap(&mut prev, &mut cur);
    }
}

/// One step of the recurrence: combine the predecessor's costs `prev` with the appearance costs
/// `app` of the current pixel into `cur`.
#[inline]
pub fn step_cost(prev: &[u16], app: &[u8], cur: &mut [u16], p1: u16, p2: u16) {
    let n = prev.len();
    let min_prev = prev.iter().copied().min().unwrap_or(0) as u32;
    let jump_cost = min_prev + p2 as u32;
    let p1 = p1 as u32;

    for d in 0..n {
        let mut best = (prev[d] as u32).min(jump_cost);

        if d > 0 {
            best = best.min(prev[d - 1] as u32 + p1);
        }
        if d + 1 < n {
            best = best.min(prev[d + 1] as u32 + p1);
        }

        // best >= min_prev, so this never underflows
        cur[d] = (app[d] as u32 + best - min_prev) as u16;
    }
}

/// Borrow the `n` samples at `from` immutably and the `n` samples at `to` mutably.
fn split_pair(buf: &mut [u16], from: usize, to: usize, n: usize) -> (&[u16], &mut [u16]) {
    if from < to {
        let (head, tail) = buf.split_at_mut(to);
        (&head[from..from + n], &mut tail[..n])
    } else {
        let (head, tail) = buf.split_at_mut(from);
        (&tail[..n], &mut head[to..to + n])
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
