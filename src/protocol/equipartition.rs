//! protocol/equipartition.rs — split the cake into four agent-1-equal pieces.

use crate::core::search::{cut_from_left, SearchParams};
use crate::core::segment::Segment;
use crate::core::valuation::{grid_fraction, ValuationError};
use crate::protocol::Cuts;

/// Three cuts giving four pieces of equal grid value to `preference`,
/// chained left to right, each search anchored at the previous cut.
pub fn equipartition(
    preference: &[Segment],
    cake_size: f64,
    epsilon: f64,
    start: f64,
    end: f64,
    params: &SearchParams,
) -> Result<Cuts, ValuationError> {
    let total = grid_fraction(preference, epsilon, start, end, cake_size)?;
    let target = total / 4.0;

    let first = cut_from_left(preference, epsilon, start, end, target, cake_size, params)?;
    let second = cut_from_left(preference, epsilon, first, end, target, cake_size, params)?;
    let third = cut_from_left(preference, epsilon, second, end, target, cake_size, params)?;

    Ok([first, second, third])
}
