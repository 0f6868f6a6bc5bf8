//! core/valuation.rs — smoothed, grid-interpolated valuations.
//!
//! Three layers sit on top of the exact trapezoid primitive:
//! - `v'`: half the exact value plus an ε width penalty, so every non-empty
//!   interval has positive measure;
//! - `v''`: `v'` interpolated on the ε-mesh of the normalized cake, the
//!   monotone form every search and condition check consumes;
//! - interval form: `v''` summed over unit-length raw sub-cells, normalized
//!   into a fraction of the agent's whole-cake smoothed value.
//!
//! Interval policy: an inverted interval (`start > end`) values to zero;
//! endpoints outside `[0, cake_size]` beyond the guard are an error.

use thiserror::Error;

use crate::core::grid::Grid;
use crate::core::segment::Segment;
use crate::core::value::value_of_interval;

/// Residue allowed when clamping a fraction back into `[0, 1]`.
const CLAMP_GUARD: f64 = 1e-7;

/// Absolute slack for interval bounds checks.
const BOUNDS_GUARD: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum ValuationError {
    #[error("interval [{start}, {end}] outside the cake [0, {cake_size}]")]
    OutOfRange { start: f64, end: f64, cake_size: f64 },
    #[error("fraction {value} exceeds [0, 1] beyond the guard")]
    NotAFraction { value: f64 },
}

/// `|a - b| <= tolerance`.
#[inline]
pub fn almost_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// `v'`: half-weighted, width-penalized valuation on raw coordinates.
#[inline]
pub fn smoothed_value(segments: &[Segment], epsilon: f64, a: f64, b: f64) -> f64 {
    value_of_interval(segments, a, b) / 2.0 + epsilon * (b - a).abs()
}

/// `v''` of a sub-interval lying inside one unit cake cell.
///
/// Endpoints are normalized, snapped to the ε-mesh, and `v'` is combined
/// over three grid corners. The two sub-cases are keyed by which endpoint
/// sits deeper inside its cell; in both, the corner weights sum to one.
fn cell_double_prime(
    segments: &[Segment],
    grid: &Grid,
    epsilon: f64,
    a_raw: f64,
    b_raw: f64,
    cake_size: f64,
) -> f64 {
    if b_raw - a_raw <= 0.0 {
        return 0.0;
    }
    let delta = grid.delta;
    let a = (a_raw / cake_size).clamp(0.0, 1.0);
    let b = (b_raw / cake_size).clamp(0.0, 1.0);
    let a_under = grid.snap_down(a);
    let a_over = grid.snap_up(a);
    let b_under = grid.snap_down(b);
    let b_over = grid.snap_up(b);

    // Corner evaluations happen on raw coordinates.
    let vp = |x: f64, y: f64| smoothed_value(segments, epsilon, x * cake_size, y * cake_size);

    let a_slack = a_over - a;
    let b_depth = b - b_under;
    if a_slack >= b_depth {
        ((a_slack - b_depth) / delta) * vp(a_under, b_under)
            + (b_depth / delta) * vp(a_under, b_over)
            + ((a - a_under) / delta) * vp(a_over, b_under)
    } else {
        ((b_depth - a_slack) / delta) * vp(a_over, b_over)
            + (a_slack / delta) * vp(a_under, b_over)
            + ((b_over - b) / delta) * vp(a_over, b_under)
    }
}

/// Raw (un-normalized) `v''` summed over the unit cells spanned by
/// `[start, end]`, with partial first and last cells.
fn double_prime_sum(
    segments: &[Segment],
    grid: &Grid,
    epsilon: f64,
    start: f64,
    end: f64,
    cake_size: f64,
) -> f64 {
    let mut total = 0.0;
    let mut a = start;
    while a < end - BOUNDS_GUARD {
        let b = (a.floor() + 1.0).min(end);
        total += cell_double_prime(segments, grid, epsilon, a, b, cake_size);
        a = b;
    }
    total
}

/// Fraction of the agent's whole-cake smoothed value held by
/// `[start, end]`. Always in `[0, 1]`; the whole cake is exactly 1.
pub fn grid_fraction(
    segments: &[Segment],
    epsilon: f64,
    start: f64,
    end: f64,
    cake_size: f64,
) -> Result<f64, ValuationError> {
    if start > end {
        return Ok(0.0);
    }
    if start < -BOUNDS_GUARD || end > cake_size + BOUNDS_GUARD {
        return Err(ValuationError::OutOfRange { start, end, cake_size });
    }
    let start = start.clamp(0.0, cake_size);
    let end = end.clamp(0.0, cake_size);

    let grid = Grid::new(epsilon);
    let numerator = double_prime_sum(segments, &grid, epsilon, start, end, cake_size);
    let denominator = double_prime_sum(segments, &grid, epsilon, 0.0, cake_size, cake_size);
    let fraction = numerator / denominator;

    if fraction > 1.0 + CLAMP_GUARD || fraction < -CLAMP_GUARD {
        return Err(ValuationError::NotAFraction { value: fraction });
    }
    Ok(fraction.clamp(0.0, 1.0))
}

/// Raw-scale `v''`: the fraction times the agent's exact total value.
pub fn grid_value_for_interval(
    segments: &[Segment],
    epsilon: f64,
    start: f64,
    end: f64,
    cake_size: f64,
) -> Result<f64, ValuationError> {
    let fraction = grid_fraction(segments, epsilon, start, end, cake_size)?;
    Ok(fraction * value_of_interval(segments, 0.0, cake_size))
}

/// Raw-scale values of the four pieces induced by three ordered cuts.
pub fn piece_values(
    segments: &[Segment],
    epsilon: f64,
    cuts: &[f64; 3],
    cake_size: f64,
) -> Result<[f64; 4], ValuationError> {
    let edges = [0.0, cuts[0], cuts[1], cuts[2], cake_size];
    let mut out = [0.0; 4];
    for k in 0..4 {
        out[k] = grid_value_for_interval(segments, epsilon, edges[k], edges[k + 1], cake_size)?;
    }
    Ok(out)
}
