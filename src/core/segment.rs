//! core/segment.rs — piecewise-linear valuation segments.
//!
//! A preference is an ordered, contiguous run of segments covering the whole
//! cake `[0, cake_size]`. The value density at a point inside a segment is
//! the linear interpolation of `start_value`..`end_value`.

use serde::{Deserialize, Serialize};

use crate::protocol::DivisionError;

/// One linear valuation piece over `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "startValue")]
    pub start_value: f64,
    #[serde(rename = "endValue")]
    pub end_value: f64,
}

/// One agent's full preference: contiguous segments over the cake.
pub type Preference = Vec<Segment>;

/// All agents' preferences. The core protocol requires exactly four.
pub type Preferences = Vec<Preference>;

/// Number of agents the protocol divides between.
pub const NUM_AGENTS: usize = 4;

impl Segment {
    /// Constant-density segment.
    pub fn flat(id: u32, start: f64, end: f64, value: f64) -> Self {
        Self {
            id,
            start,
            end,
            start_value: value,
            end_value: value,
        }
    }

    /// Linearly sloped segment.
    pub fn sloped(id: u32, start: f64, end: f64, start_value: f64, end_value: f64) -> Self {
        Self {
            id,
            start,
            end,
            start_value,
            end_value,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Validate one agent's preference: contiguous, finite, non-negative,
/// covering `[0, cake_size]` with no gaps.
pub fn validate_preference(agent: usize, pref: &[Segment], cake_size: f64) -> Result<(), DivisionError> {
    let invalid = |reason: String| DivisionError::InvalidInput { agent, reason };

    if pref.is_empty() {
        return Err(invalid("empty preference".into()));
    }
    let mut cursor = 0.0f64;
    for seg in pref {
        if !(seg.start.is_finite() && seg.end.is_finite())
            || !(seg.start_value.is_finite() && seg.end_value.is_finite())
        {
            return Err(invalid(format!("non-finite segment {}", seg.id)));
        }
        if seg.start > seg.end {
            return Err(invalid(format!(
                "segment {} has start {} > end {}",
                seg.id, seg.start, seg.end
            )));
        }
        if seg.start_value < 0.0 || seg.end_value < 0.0 {
            return Err(invalid(format!("segment {} has negative value", seg.id)));
        }
        if (seg.start - cursor).abs() > 1e-9 {
            return Err(invalid(format!(
                "gap before segment {}: expected start {}, got {}",
                seg.id, cursor, seg.start
            )));
        }
        cursor = seg.end;
    }
    if (cursor - cake_size).abs() > 1e-9 {
        return Err(invalid(format!(
            "segments cover [0, {cursor}] but the cake is [0, {cake_size}]"
        )));
    }
    Ok(())
}

/// Validate the whole problem: agent count, cake size, per-agent coverage.
pub fn validate_preferences(prefs: &Preferences, cake_size: f64) -> Result<(), DivisionError> {
    if !(cake_size.is_finite() && cake_size > 0.0) {
        return Err(DivisionError::InvalidInput {
            agent: 0,
            reason: format!("cake size must be positive, got {cake_size}"),
        });
    }
    if prefs.len() != NUM_AGENTS {
        return Err(DivisionError::WrongAgentCount { got: prefs.len() });
    }
    for (agent, pref) in prefs.iter().enumerate() {
        validate_preference(agent, pref, cake_size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_preference_passes() {
        let pref = vec![Segment::flat(1, 0.0, 0.5, 10.0), Segment::flat(2, 0.5, 1.0, 5.0)];
        assert!(validate_preference(0, &pref, 1.0).is_ok());
    }

    #[test]
    fn gap_is_rejected() {
        let pref = vec![Segment::flat(1, 0.0, 0.4, 10.0), Segment::flat(2, 0.5, 1.0, 5.0)];
        assert!(validate_preference(0, &pref, 1.0).is_err());
    }

    #[test]
    fn short_coverage_is_rejected() {
        let pref = vec![Segment::flat(1, 0.0, 0.9, 10.0)];
        assert!(validate_preference(0, &pref, 1.0).is_err());
    }

    #[test]
    fn wrong_agent_count_is_rejected() {
        let prefs = vec![vec![Segment::flat(1, 0.0, 1.0, 10.0)]; 3];
        assert!(matches!(
            validate_preferences(&prefs, 1.0),
            Err(DivisionError::WrongAgentCount { got: 3 })
        ));
    }

    #[test]
    fn segment_serde_uses_camel_case_value_keys() {
        let seg = Segment::sloped(3, 0.0, 50.0, 0.0, 10.0);
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains("\"startValue\""));
        assert!(json.contains("\"endValue\""));
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seg);
    }
}
