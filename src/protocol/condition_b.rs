//! protocol/condition_b.rs — the paired-piece certificate.
//!
//! For an agent `i` and a piece pair `(k, k')`, construct cuts under which
//! agent `i` values both pieces equally while agent 1 keeps them at or below
//! α, then cross-check that a second agent also weakly prefers both. Cut
//! construction dispatches through one table keyed by the pair: adjacent
//! pieces share a boundary, a pair with one piece between them needs a
//! nested search, and the outermost pair brackets the cake.

use tracing::debug;

use crate::core::search::{cut_from_left, cut_from_right, SearchParams};
use crate::core::segment::{Preferences, Segment};
use crate::core::valuation::{almost_equal, grid_fraction, ValuationError};
use crate::protocol::{piece_range, Cuts};

/// Certificate returned on success.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionB {
    pub cuts: Cuts,
    pub k: usize,
    pub k_prime: usize,
}

#[derive(Clone, Copy, Debug)]
enum Strategy {
    Adjacent,
    OneBetween,
    Bracket,
}

/// The six unordered pairs, their complement pieces, and the strategy that
/// constructs cuts for them.
const CASES: [(usize, usize, [usize; 2], Strategy); 6] = [
    (0, 1, [2, 3], Strategy::Adjacent),
    (0, 2, [1, 3], Strategy::OneBetween),
    (0, 3, [1, 2], Strategy::Bracket),
    (1, 2, [0, 3], Strategy::Adjacent),
    (1, 3, [0, 2], Strategy::OneBetween),
    (2, 3, [0, 1], Strategy::Adjacent),
];

/// Value-equality slack: searches terminate on position, so value checks get
/// three orders of magnitude more room than the position tolerance.
fn value_tolerance(params: &SearchParams) -> f64 {
    params.tolerance * 1e3
}

pub fn check_condition_b(
    alpha: f64,
    preferences: &Preferences,
    cake_size: f64,
    epsilon: f64,
    params: &SearchParams,
) -> Result<Option<ConditionB>, ValuationError> {
    let preference_1 = &preferences[0];

    for i in 1..preferences.len() {
        let preference_i = &preferences[i];
        for (k, k_prime, others, strategy) in CASES {
            let cuts = match build_cuts(
                strategy,
                k,
                k_prime,
                alpha,
                preference_1,
                preference_i,
                epsilon,
                cake_size,
                params,
            )? {
                Some(cuts) => cuts,
                None => continue,
            };
            if !cuts_ordered(&cuts, cake_size) {
                continue;
            }
            if validate(
                &cuts, k, k_prime, others, alpha, preferences, i, epsilon, cake_size, params,
            )? {
                debug!(i, k, k_prime, ?cuts, "condition B holds");
                return Ok(Some(ConditionB { cuts, k, k_prime }));
            }
        }
    }
    Ok(None)
}

fn cuts_ordered(cuts: &Cuts, cake_size: f64) -> bool {
    let slack = 1e-9;
    -slack <= cuts[0]
        && cuts[0] <= cuts[1] + slack
        && cuts[1] <= cuts[2] + slack
        && cuts[2] <= cake_size + slack
}

/// The four-part validation: (i) agent 1 keeps both pieces at or below α,
/// (ii) agent `i` values them equally and above the complement pieces,
/// (iii)/(iv) some other agent also weakly prefers both.
#[allow(clippy::too_many_arguments)]
fn validate(
    cuts: &Cuts,
    k: usize,
    k_prime: usize,
    others: [usize; 2],
    alpha: f64,
    preferences: &Preferences,
    i: usize,
    epsilon: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<bool, ValuationError> {
    let tol = value_tolerance(params);
    let value = |pref: &[Segment], piece: usize| -> Result<f64, ValuationError> {
        let (s, e) = piece_range(cuts, piece, cake_size);
        grid_fraction(pref, epsilon, s, e, cake_size)
    };

    let preference_i = &preferences[i];
    let k_value_i = value(preference_i, k)?;
    let k_prime_value_i = value(preference_i, k_prime)?;
    if !almost_equal(k_value_i, k_prime_value_i, tol) {
        return Ok(false);
    }
    let others_max_i = value(preference_i, others[0])?.max(value(preference_i, others[1])?);
    if k_value_i < others_max_i - tol || k_prime_value_i < others_max_i - tol {
        return Ok(false);
    }

    let preference_1 = &preferences[0];
    if value(preference_1, k)? > alpha + tol || value(preference_1, k_prime)? > alpha + tol {
        return Ok(false);
    }

    for j in 1..preferences.len() {
        if j == i {
            continue;
        }
        let preference_j = &preferences[j];
        let others_max_j = value(preference_j, others[0])?.max(value(preference_j, others[1])?);
        if value(preference_j, k)? >= others_max_j - tol
            && value(preference_j, k_prime)? >= others_max_j - tol
        {
            return Ok(true);
        }
    }
    Ok(false)
}

#[allow(clippy::too_many_arguments)]
fn build_cuts(
    strategy: Strategy,
    k: usize,
    k_prime: usize,
    alpha: f64,
    preference_1: &[Segment],
    preference_i: &[Segment],
    epsilon: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<Option<Cuts>, ValuationError> {
    match strategy {
        Strategy::Adjacent => {
            build_adjacent(k, alpha, preference_1, preference_i, epsilon, cake_size, params)
        }
        Strategy::OneBetween => {
            build_one_between(k, alpha, preference_1, preference_i, epsilon, cake_size, params)
        }
        Strategy::Bracket => {
            debug_assert_eq!((k, k_prime), (0, 3));
            build_bracket(alpha, preference_1, preference_i, epsilon, cake_size, params)
        }
    }
}

/// Adjacent pair `(k, k+1)`: agent 1's α-searches fix the boundaries outside
/// the pair, then the shared inner boundary balances agent `i`'s two halves.
fn build_adjacent(
    k: usize,
    alpha: f64,
    preference_1: &[Segment],
    preference_i: &[Segment],
    epsilon: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<Option<Cuts>, ValuationError> {
    let cuts = match k {
        // pieces 2 and 3 carved right-to-left, inner cut splits [0, m]
        0 => {
            let r = cut_from_right(preference_1, epsilon, 0.0, cake_size, alpha, cake_size, params)?;
            let m = cut_from_right(preference_1, epsilon, 0.0, r, alpha, cake_size, params)?;
            let l = balanced_cut(preference_i, epsilon, 0.0, m, cake_size, params)?;
            [l, m, r]
        }
        // outermost pieces carved from both ends, inner cut splits [l, r]
        1 => {
            let l = cut_from_left(preference_1, epsilon, 0.0, cake_size, alpha, cake_size, params)?;
            let r = cut_from_right(preference_1, epsilon, l, cake_size, alpha, cake_size, params)?;
            let m = balanced_cut(preference_i, epsilon, l, r, cake_size, params)?;
            [l, m, r]
        }
        // pieces 0 and 1 carved left-to-right, inner cut splits [m, cake]
        _ => {
            let l = cut_from_left(preference_1, epsilon, 0.0, cake_size, alpha, cake_size, params)?;
            let m = cut_from_left(preference_1, epsilon, l, cake_size, alpha, cake_size, params)?;
            let r = balanced_cut(preference_i, epsilon, m, cake_size, cake_size, params)?;
            [l, m, r]
        }
    };

    // The balanced cut must actually equalize agent i's halves.
    let (left, right) = match k {
        0 => ((0.0, cuts[0]), (cuts[0], cuts[1])),
        1 => ((cuts[0], cuts[1]), (cuts[1], cuts[2])),
        _ => ((cuts[1], cuts[2]), (cuts[2], cake_size)),
    };
    let first = grid_fraction(preference_i, epsilon, left.0, left.1, cake_size)?;
    let second = grid_fraction(preference_i, epsilon, right.0, right.1, cake_size)?;
    if !almost_equal(first, second, value_tolerance(params)) {
        return Ok(None);
    }
    Ok(Some(cuts))
}

/// Bisect for the point splitting `[left, right]` into two pieces of equal
/// value to the agent.
fn balanced_cut(
    preference: &[Segment],
    epsilon: f64,
    left: f64,
    right: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<f64, ValuationError> {
    let (mut lo, mut hi) = (left, right);
    let mut iteration = 0;
    while hi - lo > params.tolerance && iteration < params.max_iterations {
        let mid = (lo + hi) / 2.0;
        let first = grid_fraction(preference, epsilon, left, mid, cake_size)?;
        let second = grid_fraction(preference, epsilon, mid, right, cake_size)?;
        if almost_equal(first, second, params.tolerance) {
            return Ok(mid);
        }
        if first < second {
            lo = mid;
        } else {
            hi = mid;
        }
        iteration += 1;
    }
    Ok((lo + hi) / 2.0)
}

/// Pair with one piece between: sweep the outer boundary while an inner
/// α-search keeps the in-between piece at α for agent 1; stop when agent `i`
/// values the two target pieces equally.
fn build_one_between(
    k: usize,
    alpha: f64,
    preference_1: &[Segment],
    preference_i: &[Segment],
    epsilon: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<Option<Cuts>, ValuationError> {
    if k == 0 {
        // (0, 2): fix r so the last piece is α, sweep l, derive m from l
        let r = cut_from_right(preference_1, epsilon, 0.0, cake_size, alpha, cake_size, params)?;
        let m_for = |l: f64| cut_from_left(preference_1, epsilon, l, r, alpha, cake_size, params);

        let (mut lo, mut hi) = (0.0, r);
        let mut iteration = 0;
        let mut l = (lo + hi) / 2.0;
        while hi - lo > params.tolerance && iteration < params.max_iterations {
            l = (lo + hi) / 2.0;
            let m = m_for(l)?;
            let searched = grid_fraction(preference_i, epsilon, 0.0, l, cake_size)?;
            let desired = grid_fraction(preference_i, epsilon, m, r, cake_size)?;
            if almost_equal(searched, desired, params.tolerance) {
                break;
            }
            if searched < desired {
                lo = l;
            } else {
                hi = l;
            }
            iteration += 1;
        }
        let m = m_for(l)?;
        Ok(Some([l, m, r]))
    } else {
        // (1, 3): fix l so the first piece is α, sweep r, derive m from r
        let l = cut_from_left(preference_1, epsilon, 0.0, cake_size, alpha, cake_size, params)?;
        let m_for = |r: f64| cut_from_right(preference_1, epsilon, l, r, alpha, cake_size, params);

        let (mut lo, mut hi) = (l, cake_size);
        let mut iteration = 0;
        let mut r = (lo + hi) / 2.0;
        while hi - lo > params.tolerance && iteration < params.max_iterations {
            r = (lo + hi) / 2.0;
            let m = m_for(r)?;
            let searched = grid_fraction(preference_i, epsilon, r, cake_size, cake_size)?;
            let desired = grid_fraction(preference_i, epsilon, l, m, cake_size)?;
            if almost_equal(searched, desired, params.tolerance) {
                break;
            }
            if searched < desired {
                hi = r;
            } else {
                lo = r;
            }
            iteration += 1;
        }
        let m = m_for(r)?;
        Ok(Some([l, m, r]))
    }
}

/// Outermost pair `(0, 3)`: three independent range searches, one per cut,
/// each finding where agent `i` values the two end pieces equally while the
/// companion cuts keep the middle pieces at α for agent 1. The final triple
/// favors the upper bound for `l`, the midpoint for `m`, the lower bound
/// for `r`.
fn build_bracket(
    alpha: f64,
    preference_1: &[Segment],
    preference_i: &[Segment],
    epsilon: f64,
    cake_size: f64,
    params: &SearchParams,
) -> Result<Option<Cuts>, ValuationError> {
    // companions for a given l: middle pieces [l, m] and [m, r] at α
    let from_l = |l: f64| -> Result<(f64, f64), ValuationError> {
        let m = cut_from_left(preference_1, epsilon, l, cake_size, alpha, cake_size, params)?;
        let r = cut_from_left(preference_1, epsilon, m, cake_size, alpha, cake_size, params)?;
        Ok((m, r))
    };
    // companions for a given r, carved right-to-left
    let from_r = |r: f64| -> Result<(f64, f64), ValuationError> {
        let m = cut_from_right(preference_1, epsilon, 0.0, r, alpha, cake_size, params)?;
        let l = cut_from_right(preference_1, epsilon, 0.0, m, alpha, cake_size, params)?;
        Ok((l, m))
    };
    // companions for a given m: [l, m] and [m, r] both at α
    let from_m = |m: f64| -> Result<(f64, f64), ValuationError> {
        let l = cut_from_right(preference_1, epsilon, 0.0, m, alpha, cake_size, params)?;
        let r = cut_from_left(preference_1, epsilon, m, cake_size, alpha, cake_size, params)?;
        Ok((l, r))
    };

    let ends_balance = |first: f64, last: f64| -> Result<bool, ValuationError> {
        let searched = grid_fraction(preference_i, epsilon, 0.0, first, cake_size)?;
        let desired = grid_fraction(preference_i, epsilon, last, cake_size, cake_size)?;
        Ok(almost_equal(searched, desired, value_tolerance(params)))
    };

    // l sweep: compare the leftmost piece with the rightmost given (m, r)(l)
    let found_l = {
        let (mut lo, mut hi) = (0.0, cake_size);
        let mut iteration = 0;
        let mut l = (lo + hi) / 2.0;
        while hi - lo > params.tolerance && iteration < params.max_iterations {
            l = (lo + hi) / 2.0;
            let (_, r) = from_l(l)?;
            let searched = grid_fraction(preference_i, epsilon, 0.0, l, cake_size)?;
            let desired = grid_fraction(preference_i, epsilon, r, cake_size, cake_size)?;
            if almost_equal(searched, desired, params.tolerance) {
                break;
            }
            if searched < desired {
                lo = l;
            } else {
                hi = l;
            }
            iteration += 1;
        }
        l
    };
    let (lower_l, upper_l) = expand_range(found_l, epsilon, cake_size, |l| {
        let (_, r) = from_l(l)?;
        ends_balance(l, r)
    })?;

    // r sweep
    let found_r = {
        let (mut lo, mut hi) = (0.0, cake_size);
        let mut iteration = 0;
        let mut r = (lo + hi) / 2.0;
        while hi - lo > params.tolerance && iteration < params.max_iterations {
            r = (lo + hi) / 2.0;
            let (l, _) = from_r(r)?;
            let searched = grid_fraction(preference_i, epsilon, r, cake_size, cake_size)?;
            let desired = grid_fraction(preference_i, epsilon, 0.0, l, cake_size)?;
            if almost_equal(searched, desired, params.tolerance) {
                break;
            }
            if searched < desired {
                hi = r;
            } else {
                lo = r;
            }
            iteration += 1;
        }
        r
    };
    let (lower_r, _upper_r) = expand_range(found_r, epsilon, cake_size, |r| {
        let (l, _) = from_r(r)?;
        ends_balance(l, r)
    })?;

    // m sweep
    let found_m = {
        let (mut lo, mut hi) = (0.0, cake_size);
        let mut iteration = 0;
        let mut m = (lo + hi) / 2.0;
        while hi - lo > params.tolerance && iteration < params.max_iterations {
            m = (lo + hi) / 2.0;
            let (l, r) = from_m(m)?;
            let searched = grid_fraction(preference_i, epsilon, 0.0, l, cake_size)?;
            let desired = grid_fraction(preference_i, epsilon, r, cake_size, cake_size)?;
            if almost_equal(searched, desired, params.tolerance) {
                break;
            }
            if searched < desired {
                lo = m;
            } else {
                hi = m;
            }
            iteration += 1;
        }
        m
    };
    let (lower_m, upper_m) = expand_range(found_m, epsilon, cake_size, |m| {
        let (l, r) = from_m(m)?;
        ends_balance(l, r)
    })?;

    Ok(Some([upper_l, (lower_m + upper_m) / 2.0, lower_r]))
}

const MAX_EXPANSION_STEPS: u32 = 32;

/// Widen a satisfying point into an interval by ε-sized steps in each
/// direction while the predicate keeps holding. The step count is capped:
/// the range only feeds a tie-break, so a truncated range is still valid.
fn expand_range<F>(
    found: f64,
    epsilon: f64,
    cake_size: f64,
    mut holds: F,
) -> Result<(f64, f64), ValuationError>
where
    F: FnMut(f64) -> Result<bool, ValuationError>,
{
    let step = epsilon * cake_size;
    let mut lower = found;
    let mut steps = 0;
    while lower - step >= 0.0 && steps < MAX_EXPANSION_STEPS {
        if !holds(lower - step)? {
            break;
        }
        lower -= step;
        steps += 1;
    }
    let mut upper = found;
    steps = 0;
    while upper + step <= cake_size && steps < MAX_EXPANSION_STEPS {
        if !holds(upper + step)? {
            break;
        }
        upper += step;
        steps += 1;
    }
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::Segment;

    const EPSILON: f64 = 1e-6;

    fn flat(value: f64) -> Vec<Segment> {
        vec![Segment::flat(1, 0.0, 1.0, value)]
    }

    fn banded(lo: f64, hi: f64, value: f64) -> Vec<Segment> {
        vec![
            Segment::flat(1, 0.0, lo, 0.0),
            Segment::flat(2, lo, hi, value),
            Segment::flat(3, hi, 1.0, 0.0),
        ]
    }

    #[test]
    fn adjacent_cuts_on_flat_preferences() {
        let p1 = flat(10.0);
        let pi = flat(7.0);
        let params = SearchParams::default();
        for k in [0usize, 1, 2] {
            let cuts = build_adjacent(k, 0.25, &p1, &pi, EPSILON, 1.0, &params)
                .unwrap()
                .expect("flat preferences always balance");
            let expected = [0.25, 0.5, 0.75];
            for (cut, want) in cuts.iter().zip(expected) {
                assert!((cut - want).abs() < 1e-4, "k={k}: cut {cut}, want {want}");
            }
        }
    }

    #[test]
    fn one_between_keeps_middle_piece_at_alpha() {
        let p1 = flat(10.0);
        let pi = flat(7.0);
        let params = SearchParams::default();
        let cuts = build_one_between(0, 0.25, &p1, &pi, EPSILON, 1.0, &params)
            .unwrap()
            .unwrap();
        // r pins the last piece at alpha; the middle piece [l, m] is alpha too
        assert!((cuts[2] - 0.75).abs() < 1e-4, "r = {}", cuts[2]);
        let mid = grid_fraction(&p1, EPSILON, cuts[0], cuts[1], 1.0).unwrap();
        assert!((mid - 0.25).abs() < 1e-3, "middle piece {mid}");
    }

    #[test]
    fn condition_holds_for_shared_center_band() {
        // agents 2 and 3 care only about a symmetric center band that both
        // halves of the (1, 2) pair can split evenly
        let prefs: Preferences = vec![
            flat(10.0),
            banded(0.45, 0.55, 10.0),
            banded(0.45, 0.55, 10.0),
            flat(5.0),
        ];
        let got = check_condition_b(0.4, &prefs, 1.0, EPSILON, &SearchParams::default())
            .unwrap()
            .expect("condition B should hold");
        assert_eq!((got.k, got.k_prime), (1, 2));
        assert!((got.cuts[0] - 0.4).abs() < 1e-4, "l = {}", got.cuts[0]);
        assert!((got.cuts[1] - 0.5).abs() < 1e-3, "m = {}", got.cuts[1]);
        assert!((got.cuts[2] - 0.6).abs() < 1e-4, "r = {}", got.cuts[2]);
    }

    #[test]
    fn no_certificate_for_identical_flat_agents_at_high_alpha() {
        let prefs: Preferences = (0..4).map(|_| flat(10.0)).collect();
        let got = check_condition_b(0.45, &prefs, 1.0, EPSILON, &SearchParams::default()).unwrap();
        assert!(got.is_none());
    }
}
