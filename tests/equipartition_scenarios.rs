use fairslice::core::search::SearchParams;
use fairslice::core::segment::Segment;
use fairslice::core::valuation::piece_values;
use fairslice::protocol::equipartition::equipartition;

const EPSILON: f64 = 1e-6;

#[test]
fn flat_unit_cake_cuts_at_quarters() {
    let pref = vec![Segment::flat(1, 0.0, 1.0, 10.0)];
    let cuts = equipartition(&pref, 1.0, EPSILON, 0.0, 1.0, &SearchParams::default()).unwrap();
    for (cut, want) in cuts.iter().zip([0.25, 0.5, 0.75]) {
        assert!((cut - want).abs() < 1e-6, "cut {cut}, want {want}");
    }
}

#[test]
fn seesaw_cake_slices_average_to_quarter_of_total() {
    // density 10 on [0, 50], 5 on [50, 100]: total 750, each slice 187.5
    let pref = vec![
        Segment::flat(1, 0.0, 50.0, 10.0),
        Segment::flat(2, 50.0, 100.0, 5.0),
    ];
    let cuts = equipartition(&pref, 100.0, EPSILON, 0.0, 100.0, &SearchParams::default()).unwrap();
    let values = piece_values(&pref, EPSILON, &cuts, 100.0).unwrap();

    let sum: f64 = values.iter().sum();
    assert!((sum - 750.0).abs() < 1e-1, "sum {sum}");
    for v in values {
        assert!((v - 187.5).abs() < 1e-1, "slice value {v}");
    }
}

#[test]
fn sloped_seesaw_cake_slices_average_to_quarter_of_total() {
    // ramps 0→10 then 10→0 over [0, 100]: total 500, each slice 125
    let pref = vec![
        Segment::sloped(1, 0.0, 50.0, 0.0, 10.0),
        Segment::sloped(2, 50.0, 100.0, 10.0, 0.0),
    ];
    let cuts = equipartition(&pref, 100.0, EPSILON, 0.0, 100.0, &SearchParams::default()).unwrap();
    let values = piece_values(&pref, EPSILON, &cuts, 100.0).unwrap();

    let sum: f64 = values.iter().sum();
    assert!((sum - 500.0).abs() < 1e-1, "sum {sum}");
    for v in values {
        assert!((v - 125.0).abs() < 1e-1, "slice value {v}");
    }
}

#[test]
fn cuts_are_ordered_within_the_cake() {
    let pref = vec![
        Segment::flat(1, 0.0, 30.0, 1.0),
        Segment::flat(2, 30.0, 100.0, 9.0),
    ];
    let cuts = equipartition(&pref, 100.0, EPSILON, 0.0, 100.0, &SearchParams::default()).unwrap();
    assert!(0.0 <= cuts[0] && cuts[0] <= cuts[1] && cuts[1] <= cuts[2] && cuts[2] <= 100.0);
}
