//! core/slice.rs — owned and unowned cake slices, and the reporting form.

use serde::Serialize;

use crate::core::segment::{Preferences, NUM_AGENTS};
use crate::core::valuation::{grid_value_for_interval, ValuationError};
use crate::core::value::value_of_interval;

/// An interval with its grid value to every agent, not yet owned.
#[derive(Clone, Debug)]
pub struct UnassignedSlice {
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub values: [f64; NUM_AGENTS],
}

impl UnassignedSlice {
    pub fn assign(&self, owner: usize) -> AssignedSlice {
        AssignedSlice {
            id: self.id,
            owner,
            start: self.start,
            end: self.end,
            values: self.values,
        }
    }
}

/// A slice given to one agent, keeping its value to every agent.
#[derive(Clone, Debug, Serialize)]
pub struct AssignedSlice {
    pub id: usize,
    pub owner: usize,
    pub start: f64,
    pub end: f64,
    pub values: [f64; NUM_AGENTS],
}

/// Per-agent reporting form: fractional values and owned interval edges.
#[derive(Clone, Debug, Serialize)]
pub struct Portion {
    pub owner: usize,
    #[serde(rename = "percentValues")]
    pub percent_values: [f64; NUM_AGENTS],
    pub edges: Vec<(f64, f64)>,
}

/// Cut the cake at three ordered positions into four unowned slices, valuing
/// each slice under every agent's grid valuation (raw scale).
pub fn cut_cake(
    preferences: &Preferences,
    epsilon: f64,
    cuts: &[f64; 3],
    cake_size: f64,
) -> Result<Vec<UnassignedSlice>, ValuationError> {
    let edges = [0.0, cuts[0], cuts[1], cuts[2], cake_size];
    let mut slices = Vec::with_capacity(4);
    for k in 0..4 {
        let (start, end) = (edges[k], edges[k + 1]);
        let mut values = [0.0; NUM_AGENTS];
        for (agent, pref) in preferences.iter().enumerate() {
            values[agent] = grid_value_for_interval(pref, epsilon, start, end, cake_size)?;
        }
        slices.push(UnassignedSlice {
            id: k,
            start,
            end,
            values,
        });
    }
    Ok(slices)
}

/// Fold assigned slices into per-owner portions with percentage values.
pub fn build_portions(
    preferences: &Preferences,
    slices: &[AssignedSlice],
    cake_size: f64,
) -> Vec<Portion> {
    let totals: Vec<f64> = preferences
        .iter()
        .map(|pref| value_of_interval(pref, 0.0, cake_size))
        .collect();

    let mut portions: Vec<Portion> = (0..NUM_AGENTS)
        .map(|owner| Portion {
            owner,
            percent_values: [0.0; NUM_AGENTS],
            edges: Vec::new(),
        })
        .collect();

    for slice in slices {
        let portion = &mut portions[slice.owner];
        portion.edges.push((slice.start, slice.end));
        for agent in 0..NUM_AGENTS {
            if totals[agent] > 0.0 {
                portion.percent_values[agent] += slice.values[agent] / totals[agent];
            }
        }
    }
    for portion in &mut portions {
        portion.edges.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    portions
}
