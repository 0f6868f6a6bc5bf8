//! protocol/condition_a.rs — the single-piece certificate.
//!
//! For a candidate piece `k`, chain α-searches so the three other pieces are
//! worth exactly α to agent 1, leaving piece `k` as the remainder. The
//! condition holds when the remainder stays below α and at least two of
//! agents 2–4 weakly prefer it.

use tracing::debug;

use crate::core::search::{cut_from_left, cut_from_right, SearchParams};
use crate::core::segment::{Preferences, Segment};
use crate::core::valuation::{almost_equal, grid_fraction, ValuationError};
use crate::protocol::{piece_range, Cuts};

/// Certificate returned on success: the cuts and the remainder piece.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionA {
    pub cuts: Cuts,
    pub k: usize,
}

pub fn check_condition_a(
    alpha: f64,
    preferences: &Preferences,
    cake_size: f64,
    epsilon: f64,
    params: &SearchParams,
) -> Result<Option<ConditionA>, ValuationError> {
    let preference_1 = &preferences[0];
    let found = match find_cuts_and_k(alpha, preference_1, cake_size, epsilon, params)? {
        Some(found) => found,
        None => return Ok(None),
    };

    let (start_k, end_k) = piece_range(&found.cuts, found.k, cake_size);
    let mut weakly_preferring = Vec::new();
    for (i, preference) in preferences.iter().enumerate().skip(1) {
        if weakly_prefers_piece(preference, epsilon, start_k, end_k, alpha, cake_size)? {
            weakly_preferring.push(i);
        }
    }

    if weakly_preferring.len() >= 2 {
        debug!(k = found.k, agents = ?weakly_preferring, "condition A holds");
        Ok(Some(found))
    } else {
        Ok(None)
    }
}

/// Whether an agent values `[start, end]` at least α (both as fractions of
/// the agent's own total).
fn weakly_prefers_piece(
    preference: &[Segment],
    epsilon: f64,
    start: f64,
    end: f64,
    alpha: f64,
    cake_size: f64,
) -> Result<bool, ValuationError> {
    Ok(grid_fraction(preference, epsilon, start, end, cake_size)? >= alpha)
}

/// Enumerate `k = 0..=3` in order; accept the first whose remainder is
/// strictly below α. Remainders tolerance-equal to α are recorded, and only
/// when all four candidates tie is the last piece taken as `k = 3`.
fn find_cuts_and_k(
    alpha: f64,
    preference: &[Segment],
    cake_size: f64,
    epsilon: f64,
    params: &SearchParams,
) -> Result<Option<ConditionA>, ValuationError> {
    let start = 0.0;
    let end = cake_size;
    let mut equal_count = 0usize;
    let mut last: Option<ConditionA> = None;

    for k in 0..4 {
        // Search direction per piece: everything right of the remainder is
        // carved right-to-left, everything left of it left-to-right.
        let cuts: Cuts = match k {
            0 => {
                let r = cut_from_right(preference, epsilon, start, end, alpha, cake_size, params)?;
                let m = cut_from_right(preference, epsilon, start, r, alpha, cake_size, params)?;
                let l = cut_from_right(preference, epsilon, start, m, alpha, cake_size, params)?;
                [l, m, r]
            }
            1 => {
                let l = cut_from_left(preference, epsilon, start, end, alpha, cake_size, params)?;
                let r = cut_from_right(preference, epsilon, l, end, alpha, cake_size, params)?;
                let m = cut_from_right(preference, epsilon, l, r, alpha, cake_size, params)?;
                [l, m, r]
            }
            2 => {
                let l = cut_from_left(preference, epsilon, start, end, alpha, cake_size, params)?;
                let m = cut_from_left(preference, epsilon, l, end, alpha, cake_size, params)?;
                let r = cut_from_right(preference, epsilon, m, end, alpha, cake_size, params)?;
                [l, m, r]
            }
            _ => {
                let l = cut_from_left(preference, epsilon, start, end, alpha, cake_size, params)?;
                let m = cut_from_left(preference, epsilon, l, end, alpha, cake_size, params)?;
                let r = cut_from_left(preference, epsilon, m, end, alpha, cake_size, params)?;
                [l, m, r]
            }
        };

        let (rs, re) = piece_range(&cuts, k, cake_size);
        let remainder = grid_fraction(preference, epsilon, rs, re, cake_size)?;
        if remainder < alpha && !almost_equal(remainder, alpha, params.tolerance) {
            return Ok(Some(ConditionA { cuts, k }));
        }
        if almost_equal(remainder, alpha, params.tolerance) {
            equal_count += 1;
            last = Some(ConditionA { cuts, k });
        }
    }

    // All four remainders tie with α: treat the last piece as the remainder.
    if equal_count == 4 {
        debug!("all four remainders equal alpha, taking k = 3");
        return Ok(last);
    }
    Ok(None)
}
