//! core/search.rs — bounded bisection for cut points on the smoothed cake.
//!
//! Both directions rely on the cumulative grid valuation being non-decreasing
//! as the probed boundary sweeps; the searches do not verify it. A search
//! that exhausts its iteration cap returns the best midpoint found.

use crate::core::segment::Segment;
use crate::core::valuation::{grid_fraction, ValuationError};

/// Iteration/termination knobs threaded through every search.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

/// Find `x` in `[start, end]` with `fraction(start, x) ≈ target`, anchored at
/// the left boundary. Short-circuits to `end` when the whole interval cannot
/// reach the target.
pub fn cut_from_left(
    preference: &[Segment],
    epsilon: f64,
    start: f64,
    end: f64,
    target: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<f64, ValuationError> {
    let anchor = start;
    if grid_fraction(preference, epsilon, anchor, end, cake_size)? < target {
        return Ok(end);
    }
    let (mut lo, mut hi) = (start, end);
    let mut iteration = 0;
    while hi - lo > params.tolerance && iteration < params.max_iterations {
        let mid = (lo + hi) / 2.0;
        let searched = grid_fraction(preference, epsilon, anchor, mid, cake_size)?;
        if (searched - target).abs() < params.tolerance {
            return Ok(mid);
        }
        if searched < target {
            lo = mid;
        } else {
            hi = mid;
        }
        iteration += 1;
    }
    Ok((lo + hi) / 2.0)
}

/// Mirror image: find `x` with `fraction(x, end) ≈ target`, anchored at the
/// right boundary. Short-circuits to `start` when the target is out of reach.
pub fn cut_from_right(
    preference: &[Segment],
    epsilon: f64,
    start: f64,
    end: f64,
    target: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<f64, ValuationError> {
    let anchor = end;
    if grid_fraction(preference, epsilon, start, anchor, cake_size)? < target {
        return Ok(start);
    }
    let (mut lo, mut hi) = (start, end);
    let mut iteration = 0;
    while hi - lo > params.tolerance && iteration < params.max_iterations {
        let mid = (lo + hi) / 2.0;
        let searched = grid_fraction(preference, epsilon, mid, anchor, cake_size)?;
        if (searched - target).abs() < params.tolerance {
            return Ok(mid);
        }
        if searched < target {
            hi = mid;
        } else {
            lo = mid;
        }
        iteration += 1;
    }
    Ok((lo + hi) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn flat() -> Vec<Segment> {
        vec![Segment::flat(1, 0.0, 1.0, 10.0)]
    }

    #[test]
    fn left_search_chains_to_quarters() {
        let pref = flat();
        let p = SearchParams::default();
        let l = cut_from_left(&pref, EPSILON, 0.0, 1.0, 0.25, 1.0, &p).unwrap();
        assert!((l - 0.25).abs() < 1e-6, "l = {l}");
        let m = cut_from_left(&pref, EPSILON, l, 1.0, 0.25, 1.0, &p).unwrap();
        assert!((m - 0.5).abs() < 1e-6, "m = {m}");
        let r = cut_from_left(&pref, EPSILON, m, 1.0, 0.25, 1.0, &p).unwrap();
        assert!((r - 0.75).abs() < 1e-6, "r = {r}");
    }

    #[test]
    fn right_search_chains_to_quarters() {
        let pref = flat();
        let p = SearchParams::default();
        let r = cut_from_right(&pref, EPSILON, 0.0, 1.0, 0.25, 1.0, &p).unwrap();
        assert!((r - 0.75).abs() < 1e-6, "r = {r}");
        let m = cut_from_right(&pref, EPSILON, 0.0, r, 0.25, 1.0, &p).unwrap();
        assert!((m - 0.5).abs() < 1e-6, "m = {m}");
        let l = cut_from_right(&pref, EPSILON, 0.0, m, 0.25, 1.0, &p).unwrap();
        assert!((l - 0.25).abs() < 1e-6, "l = {l}");
    }

    #[test]
    fn left_search_is_monotone_in_target() {
        let pref = flat();
        let p = SearchParams::default();
        let mut last = 0.0;
        for i in 1..=9 {
            let target = i as f64 / 10.0;
            let x = cut_from_left(&pref, EPSILON, 0.0, 1.0, target, 1.0, &p).unwrap();
            assert!(x >= last, "target {target}: {x} < {last}");
            last = x;
        }
    }

    #[test]
    fn unreachable_target_short_circuits() {
        let pref = flat();
        let p = SearchParams::default();
        let x = cut_from_left(&pref, EPSILON, 0.0, 0.3, 0.9, 1.0, &p).unwrap();
        assert_eq!(x, 0.3);
        let x = cut_from_right(&pref, EPSILON, 0.4, 1.0, 0.9, 1.0, &p).unwrap();
        assert_eq!(x, 0.4);
    }

    #[test]
    fn seesaw_cut_matches_exact_half() {
        // density 10 on the left half: the 0.5 fraction sits left of center
        let pref = vec![
            Segment::flat(1, 0.0, 0.5, 10.0),
            Segment::flat(2, 0.5, 1.0, 5.0),
        ];
        let p = SearchParams::default();
        let x = cut_from_left(&pref, EPSILON, 0.0, 1.0, 0.5, 1.0, &p).unwrap();
        // half of 7.5 total is 3.75, reached at 0.375 under density 10
        assert!((x - 0.375).abs() < 1e-4, "x = {x}");
    }
}
