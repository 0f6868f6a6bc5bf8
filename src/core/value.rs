//! core/value.rs — exact valuation of intervals under piecewise-linear
//! preferences.
//!
//! Trapezoid integration: the value of `[a, b]` inside one segment is the
//! average density over the clipped range times its width. Additive over
//! interval splits, zero outside segment coverage.

use crate::core::segment::Segment;

/// Exact value of `[start, end]` under a preference, across segment borders.
pub fn value_of_interval(segments: &[Segment], start: f64, end: f64) -> f64 {
    segments
        .iter()
        .filter(|seg| seg.end > start && seg.start < end)
        .map(|seg| measure_partial_segment(seg, start, end))
        .sum()
}

/// Whole-cake value of a preference.
pub fn total_value(segments: &[Segment]) -> f64 {
    segments.iter().map(|seg| measure_partial_segment(seg, seg.start, seg.end)).sum()
}

/// Value density at a single point, zero outside coverage.
pub fn value_at_point(segments: &[Segment], x: f64) -> f64 {
    for seg in segments {
        if x < seg.start || x > seg.end {
            continue;
        }
        if seg.start_value == seg.end_value || seg.width() == 0.0 {
            return seg.start_value;
        }
        let slope = (seg.end_value - seg.start_value) / seg.width();
        return seg.start_value + slope * (x - seg.start);
    }
    0.0
}

fn measure_partial_segment(seg: &Segment, start: f64, end: f64) -> f64 {
    let start_cap = start.max(seg.start);
    let end_cap = end.min(seg.end);
    let measuring_width = end_cap - start_cap;
    if measuring_width <= 0.0 {
        return 0.0;
    }
    if seg.start_value == seg.end_value {
        return seg.start_value * measuring_width;
    }
    let slope = (seg.end_value - seg.start_value) / seg.width();
    let start_val = seg.start_value + slope * (start_cap - seg.start);
    let end_val = seg.end_value - slope * (seg.end - end_cap);
    measuring_width * (start_val + end_val) / 2.0
}

/// Position `x` such that `value_of_interval(segments, 0, x) == target`.
///
/// Walks segments accumulating value; inside the segment holding the target
/// the cut line is solved exactly (linear for flat pieces, quadratic for
/// sloped ones). Returns `None` when the target exceeds the total value.
pub fn find_cut_line_by_value(segments: &[Segment], target: f64) -> Option<f64> {
    let mut running_total = 0.0f64;
    for seg in segments {
        let seg_value = measure_partial_segment(seg, seg.start, seg.end);
        if running_total + seg_value >= target {
            return Some(segment_cut_line(seg, target - running_total));
        }
        running_total += seg_value;
    }
    None
}

/// Position splitting off the given fraction of the total value.
pub fn find_cut_line_by_percent(segments: &[Segment], fraction: f64) -> Option<f64> {
    find_cut_line_by_value(segments, total_value(segments) * fraction)
}

fn segment_cut_line(seg: &Segment, target_area: f64) -> f64 {
    if seg.start_value == seg.end_value {
        let seg_value = measure_partial_segment(seg, seg.start, seg.end);
        if seg_value <= 0.0 {
            return seg.start;
        }
        return seg.start + seg.width() * (target_area / seg_value);
    }
    // Rectangle-plus-triangle area solved for the width; a negative slope
    // makes the triangle term negative and the same formula still holds.
    let slope = (seg.end_value - seg.start_value) / seg.width();
    let start_val = seg.start_value;
    let width = (-start_val + (start_val * start_val + 2.0 * slope * target_area).sqrt()) / slope;
    seg.start + width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_segment_value() {
        let segs = [Segment::flat(1, 0.0, 100.0, 10.0)];
        assert_eq!(value_of_interval(&segs, 0.0, 100.0), 1000.0);
    }

    #[test]
    fn two_flat_segments() {
        let segs = [Segment::flat(1, 0.0, 50.0, 10.0), Segment::flat(2, 50.0, 100.0, 5.0)];
        assert_eq!(value_of_interval(&segs, 0.0, 100.0), 750.0);
        // additive over a split
        let left = value_of_interval(&segs, 0.0, 30.0);
        let right = value_of_interval(&segs, 30.0, 100.0);
        assert!((left + right - 750.0).abs() < 1e-9);
    }

    #[test]
    fn seesaw_sloped_value() {
        let segs = [
            Segment::sloped(1, 0.0, 50.0, 0.0, 10.0),
            Segment::sloped(2, 50.0, 100.0, 5.0, 0.0),
        ];
        assert_eq!(value_of_interval(&segs, 0.0, 100.0), 375.0);
    }

    #[test]
    fn zero_outside_coverage() {
        let segs = [Segment::flat(1, 10.0, 20.0, 4.0)];
        assert_eq!(value_of_interval(&segs, 0.0, 10.0), 0.0);
        assert_eq!(value_of_interval(&segs, 20.0, 30.0), 0.0);
        assert_eq!(total_value(&segs), 40.0);
    }

    #[test]
    fn cut_line_flat_half() {
        let segs = [Segment::flat(1, 0.0, 100.0, 10.0)];
        let x = find_cut_line_by_percent(&segs, 0.5).unwrap();
        assert!((x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cut_line_sloped_triangle() {
        // triangle 0..10 density 0..10, total 50; half the area at x = sqrt(50)
        let segs = [Segment::sloped(1, 0.0, 10.0, 0.0, 10.0)];
        let x = find_cut_line_by_value(&segs, 25.0).unwrap();
        assert!((x - 50.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn cut_line_beyond_total_is_none() {
        let segs = [Segment::flat(1, 0.0, 1.0, 10.0)];
        assert!(find_cut_line_by_value(&segs, 11.0).is_none());
    }

    #[test]
    fn point_density_interpolates() {
        let segs = [Segment::sloped(1, 0.0, 10.0, 0.0, 10.0)];
        assert!((value_at_point(&segs, 5.0) - 5.0).abs() < 1e-12);
        assert_eq!(value_at_point(&segs, 11.0), 0.0);
    }
}
