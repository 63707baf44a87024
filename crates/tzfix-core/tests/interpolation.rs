mod common;

use chrono::{TimeZone, Utc};
use common::asset;
use tzfix_core::interpolation::select_anchor;
use tzfix_core::{interpolate, BatchView, Coordinates, InterpolationMethod};

const PARIS: (f64, f64) = (48.85, 2.35);
const LONDON: (f64, f64) = (51.5, -0.12);

#[test]
fn batch_view_orders_by_time_and_keeps_ties_stable() {
    let assets = vec![
        asset("late.jpg", Some("2024-06-01T12:00:00Z"), Some(PARIS)),
        asset("broken.jpg", Some("sometime"), Some(PARIS)),
        asset("tie_a.jpg", Some("2024-06-01T08:00:00Z"), Some(PARIS)),
        asset("tie_b.jpg", Some("2024-06-01T10:00:00+02:00"), Some(LONDON)),
        asset("no_gps.jpg", Some("2024-06-01T09:00:00Z"), None),
        asset("no_time.jpg", None, Some(PARIS)),
    ];

    let view = BatchView::build(&assets);

    let order: Vec<usize> = view.ordered().iter().map(|entry| entry.asset).collect();
    assert_eq!(order, [2, 3, 4, 0]);
    assert_eq!(view.unparseable(), &[1, 5]);
    assert_eq!(view.len(), assets.len());

    let anchors: Vec<usize> = view.anchors().iter().map(|a| a.asset).collect();
    assert_eq!(anchors, [2, 3, 0]);
    assert!(view.anchors().windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn nearest_neighbor_tie_prefers_predecessor() {
    let assets = vec![
        asset("anchor_7.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("target_9.jpg", Some("2024-06-01T09:00:00Z"), None),
        asset("anchor_11.jpg", Some("2024-06-01T11:00:00Z"), Some(LONDON)),
    ];

    let view = BatchView::build(&assets);
    let result = interpolate(&view, InterpolationMethod::NearestNeighbor);

    let inferred = result.get(1).expect("target should be interpolated");
    assert_eq!(inferred.coordinates, Coordinates::new(PARIS.0, PARIS.1));
    assert_eq!(inferred.method, InterpolationMethod::NearestNeighbor);
    assert_eq!(inferred.source_asset, 0);
    assert_eq!(result.len(), 1);
}

#[test]
fn nearest_neighbor_picks_closer_successor() {
    let assets = vec![
        asset("anchor_7.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("target_10.jpg", Some("2024-06-01T10:00:00Z"), None),
        asset("anchor_11.jpg", Some("2024-06-01T11:00:00Z"), Some(LONDON)),
    ];

    let view = BatchView::build(&assets);
    let result = interpolate(&view, InterpolationMethod::NearestNeighbor);

    assert_eq!(result.get(1).map(|i| i.source_asset), Some(2));
}

#[test]
fn nearest_neighbor_uses_the_only_side_available() {
    let assets = vec![
        asset("before_all.jpg", Some("2024-06-01T05:00:00Z"), None),
        asset("anchor.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("after_all.jpg", Some("2024-06-01T20:00:00Z"), None),
    ];

    let view = BatchView::build(&assets);
    let result = interpolate(&view, InterpolationMethod::NearestNeighbor);

    assert_eq!(result.get(0).map(|i| i.source_asset), Some(1));
    assert_eq!(result.get(2).map(|i| i.source_asset), Some(1));
}

#[test]
fn forward_fill_needs_a_strictly_earlier_anchor() {
    let assets = vec![
        asset("before_all.jpg", Some("2024-06-01T05:00:00Z"), None),
        asset("anchor_7.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("same_time.jpg", Some("2024-06-01T07:00:00Z"), None),
        asset("anchor_8.jpg", Some("2024-06-01T08:00:00Z"), Some(LONDON)),
        asset("target_10.jpg", Some("2024-06-01T10:00:00Z"), None),
    ];

    let view = BatchView::build(&assets);
    let result = interpolate(&view, InterpolationMethod::ForwardFill);

    assert!(result.get(0).is_none());
    // An anchor at exactly the same instant is not "before" the asset.
    assert!(result.get(2).is_none());
    let filled = result.get(4).expect("late asset is filled");
    assert_eq!(filled.source_asset, 3);
    assert_eq!(filled.method, InterpolationMethod::ForwardFill);

    for (idx, inferred) in result.iter() {
        let asset_time = view
            .ordered()
            .iter()
            .find(|entry| entry.asset == idx)
            .map(|entry| entry.time)
            .unwrap();
        assert!(inferred.source_time < asset_time);
    }
}

#[test]
fn nearest_neighbor_matches_anchor_at_same_instant() {
    let assets = vec![
        asset("anchor_6.jpg", Some("2024-06-01T06:59:00Z"), Some(LONDON)),
        asset("anchor_7.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("same_time.jpg", Some("2024-06-01T07:00:00Z"), None),
    ];

    let view = BatchView::build(&assets);
    let result = interpolate(&view, InterpolationMethod::NearestNeighbor);

    assert_eq!(result.get(2).map(|i| i.source_asset), Some(1));
}

#[test]
fn native_coordinates_are_never_interpolated() {
    let assets = vec![
        asset("anchor_a.jpg", Some("2024-06-01T07:00:00Z"), Some(PARIS)),
        asset("anchor_b.jpg", Some("2024-06-01T08:00:00Z"), Some(LONDON)),
    ];

    let view = BatchView::build(&assets);
    for method in [InterpolationMethod::NearestNeighbor, InterpolationMethod::ForwardFill] {
        assert!(interpolate(&view, method).is_empty());
    }
}

#[test]
fn no_anchors_means_no_inference() {
    let assets = vec![
        asset("a.jpg", Some("2024-06-01T07:00:00Z"), None),
        asset("b.jpg", Some("2024-06-01T08:00:00Z"), None),
    ];

    let view = BatchView::build(&assets);
    assert!(view.anchors().is_empty());
    assert!(interpolate(&view, InterpolationMethod::NearestNeighbor).is_empty());
    assert!(select_anchor(
        view.anchors(),
        Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap(),
        InterpolationMethod::ForwardFill
    )
    .is_none());
}

#[test]
fn method_tags_round_trip_through_strings() {
    assert_eq!("nn".parse::<InterpolationMethod>(), Ok(InterpolationMethod::NearestNeighbor));
    assert_eq!("FF".parse::<InterpolationMethod>(), Ok(InterpolationMethod::ForwardFill));
    assert!("linear".parse::<InterpolationMethod>().is_err());
    assert_eq!(InterpolationMethod::default().to_string(), "NN");
}
