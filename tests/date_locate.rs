use market_grid_wasm::domain::market_data::{Quote, SeriesPoint, TimeSeries, Timestamp};

fn series(times: &[u64]) -> TimeSeries {
    TimeSeries::new(
        times
            .iter()
            .map(|t| SeriesPoint::new(Timestamp::from_secs(*t), Quote::new(10.0)))
            .collect(),
    )
}

#[test]
fn locates_the_greatest_index_at_or_before_the_target() {
    let series = series(&[1, 5, 10]);
    assert_eq!(series.locate(Timestamp::from_secs(7)), 1);
}

#[test]
fn target_before_all_points_clamps_to_zero() {
    let series = series(&[1, 5, 10]);
    assert_eq!(series.locate(Timestamp::from_secs(0)), 0);
}

#[test]
fn target_after_all_points_clamps_to_last_index() {
    let series = series(&[1, 5, 10]);
    assert_eq!(series.locate(Timestamp::from_secs(100)), 2);
}

#[test]
fn exact_hits_land_on_their_own_index() {
    let series = series(&[1, 5, 10]);
    assert_eq!(series.locate(Timestamp::from_secs(1)), 0);
    assert_eq!(series.locate(Timestamp::from_secs(5)), 1);
    assert_eq!(series.locate(Timestamp::from_secs(10)), 2);
}

#[test]
fn single_point_series_always_locates_to_zero() {
    let series = series(&[42]);
    assert_eq!(series.locate(Timestamp::from_secs(0)), 0);
    assert_eq!(series.locate(Timestamp::from_secs(42)), 0);
    assert_eq!(series.locate(Timestamp::from_secs(10_000)), 0);
}

#[test]
fn unsorted_input_is_normalized_on_construction() {
    let series = series(&[10, 1, 5]);
    assert_eq!(series.points()[0].time.value(), 1);
    assert_eq!(series.locate(Timestamp::from_secs(6)), 1);
}
