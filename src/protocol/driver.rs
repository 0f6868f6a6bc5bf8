//! protocol/driver.rs — the outer α-bisection control loop.
//!
//! A direct equipartition attempt handles near-identical preferences; the
//! bisection then tightens α between agent 1's first-piece value and 1,
//! consulting Condition A on `[1/4, 1/3)` and Condition B on `[1/4, 1/2)`.
//! The terminal allocation re-derives cuts at the recorded α rather than
//! reusing cuts from an earlier round.

use tracing::{debug, info, warn};

use crate::config::ProtocolConfig;
use crate::core::search::SearchParams;
use crate::core::segment::{validate_preferences, Preferences};
use crate::core::valuation::grid_fraction;
use crate::protocol::allocation::find_envy_free_allocation;
use crate::protocol::condition_a::check_condition_a;
use crate::protocol::condition_b::check_condition_b;
use crate::protocol::equipartition::equipartition;
use crate::protocol::{Cuts, Division, DivisionError, Step};

/// Which structural condition last certified an α.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Matched {
    A,
    B,
}

/// Rounds sufficient to shrink a unit gap below `ε⁴/12`, with margin.
fn round_cap(epsilon: f64) -> u32 {
    let stop = stop_tolerance(epsilon);
    (1.0 / stop).log2().ceil() as u32 + 8
}

fn stop_tolerance(epsilon: f64) -> f64 {
    epsilon.powi(4) / 12.0
}

/// Divide the cake among four agents into an approximately envy-free
/// allocation, or report a typed failure.
pub fn divide(
    preferences: &Preferences,
    cake_size: f64,
    config: &ProtocolConfig,
) -> Result<Division, DivisionError> {
    validate_preferences(preferences, cake_size)?;
    config.validate()?;

    let epsilon = config.epsilon;
    let params = SearchParams {
        tolerance: config.tolerance,
        max_iterations: config.max_search_iterations,
    };
    let mut steps = Vec::new();

    // Happy path: agent 1's equipartition may already satisfy everyone.
    let cuts = equipartition(&preferences[0], cake_size, epsilon, 0.0, cake_size, &params)?;
    steps.push(Step {
        actor: 0,
        action: format!("equipartition at {cuts:?}"),
    });
    if let Some(slices) = find_envy_free_allocation(&cuts, cake_size, preferences, epsilon)? {
        info!("direct equipartition allocation is envy-free");
        steps.push(Step {
            actor: 0,
            action: "direct equipartition allocation accepted".into(),
        });
        return Ok(Division { slices, steps });
    }
    steps.push(Step {
        actor: 0,
        action: "direct equipartition allocation rejected, bisecting alpha".into(),
    });

    let mut alpha_underline =
        grid_fraction(&preferences[0], epsilon, 0.0, cuts[0], cake_size)?;
    let mut alpha_overline =
        grid_fraction(&preferences[0], epsilon, 0.0, cake_size, cake_size)?;

    let stop = stop_tolerance(epsilon);
    let cap = round_cap(epsilon);
    let mut matched: Option<Matched> = None;
    let mut round = 0u32;

    while alpha_overline - alpha_underline > stop && round < cap {
        let alpha = (alpha_underline + alpha_overline) / 2.0;
        let mut hit = false;

        if (0.25..1.0 / 3.0).contains(&alpha) {
            if check_condition_a(alpha, preferences, cake_size, epsilon, &params)?.is_some() {
                matched = Some(Matched::A);
                alpha_underline = alpha;
                hit = true;
                steps.push(Step {
                    actor: 0,
                    action: format!("condition A holds at alpha {alpha}"),
                });
            }
        }
        if !hit && (0.25..0.5).contains(&alpha) {
            if check_condition_b(alpha, preferences, cake_size, epsilon, &params)?.is_some() {
                matched = Some(Matched::B);
                alpha_underline = alpha;
                hit = true;
                steps.push(Step {
                    actor: 0,
                    action: format!("condition B holds at alpha {alpha}"),
                });
            }
        }
        if !hit {
            alpha_overline = alpha;
        }
        debug!(round, alpha, alpha_underline, alpha_overline, hit, "bisection round");
        round += 1;
    }

    let matched = match matched {
        Some(matched) => matched,
        None => {
            warn!("alpha search ended without meeting either condition");
            return Err(DivisionError::Exhausted);
        }
    };

    // Re-derive cuts at the final alpha; the engines are deterministic, so
    // the certificate that held during the loop holds here too.
    let alpha = alpha_underline;
    let cuts: Cuts = match matched {
        Matched::A => {
            match check_condition_a(alpha, preferences, cake_size, epsilon, &params)? {
                Some(cert) => cert.cuts,
                None => return Err(DivisionError::AllocationFailed { alpha }),
            }
        }
        Matched::B => {
            match check_condition_b(alpha, preferences, cake_size, epsilon, &params)? {
                Some(cert) => cert.cuts,
                None => return Err(DivisionError::AllocationFailed { alpha }),
            }
        }
    };
    steps.push(Step {
        actor: 0,
        action: format!("terminal cuts {cuts:?} at alpha {alpha}"),
    });

    match find_envy_free_allocation(&cuts, cake_size, preferences, epsilon)? {
        Some(slices) => {
            info!(?cuts, alpha, "allocation built from terminal cuts");
            Ok(Division { slices, steps })
        }
        None => Err(DivisionError::AllocationFailed { alpha }),
    }
}
