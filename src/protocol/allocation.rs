//! protocol/allocation.rs — brute-force envy-free assignment of four pieces.

use crate::core::segment::{Preferences, NUM_AGENTS};
use crate::core::slice::{cut_cake, AssignedSlice};
use crate::core::valuation::{grid_fraction, ValuationError};
use crate::protocol::{piece_range, Cuts};

/// All 24 piece→agent assignments; `perm[piece]` is the owning agent.
fn permutations() -> Vec<[usize; 4]> {
    let mut out = Vec::with_capacity(24);
    for a in 0..4 {
        for b in 0..4 {
            if b == a {
                continue;
            }
            for c in 0..4 {
                if c == a || c == b {
                    continue;
                }
                let d = 6 - a - b - c;
                out.push([a, b, c, d]);
            }
        }
    }
    out
}

/// Try every assignment of the four pieces to the four agents and return the
/// first that is pairwise envy-free: each agent's own fraction is at least
/// every other piece's fraction minus the ε fudge. `None` when no assignment
/// qualifies.
pub fn find_envy_free_allocation(
    cuts: &Cuts,
    cake_size: f64,
    preferences: &Preferences,
    epsilon: f64,
) -> Result<Option<Vec<AssignedSlice>>, ValuationError> {
    // fractions[piece][agent], each agent's own normalized scale
    let mut fractions = [[0.0f64; NUM_AGENTS]; 4];
    for piece in 0..4 {
        let (start, end) = piece_range(cuts, piece, cake_size);
        for (agent, pref) in preferences.iter().enumerate() {
            fractions[piece][agent] = grid_fraction(pref, epsilon, start, end, cake_size)?;
        }
    }

    for perm in permutations() {
        if is_envy_free(&fractions, &perm, epsilon) {
            let slices = cut_cake(preferences, epsilon, cuts, cake_size)?;
            let assigned = slices
                .iter()
                .enumerate()
                .map(|(piece, slice)| slice.assign(perm[piece]))
                .collect();
            return Ok(Some(assigned));
        }
    }
    Ok(None)
}

fn is_envy_free(fractions: &[[f64; NUM_AGENTS]; 4], perm: &[usize; 4], fudge: f64) -> bool {
    // own_piece[agent] inverts perm[piece] = agent
    let mut own_piece = [0usize; NUM_AGENTS];
    for (piece, &agent) in perm.iter().enumerate() {
        own_piece[agent] = piece;
    }
    for agent in 0..NUM_AGENTS {
        let own = fractions[own_piece[agent]][agent];
        for piece in 0..4 {
            if fractions[piece][agent] - fudge > own {
                return false;
            }
        }
    }
    true
}
