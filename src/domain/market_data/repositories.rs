use crate::domain::errors::DataResult;
use crate::domain::market_data::{Granularity, SeriesPoint, Symbol};
use futures::future::LocalBoxFuture;

/// Interface to whatever produces time series data. The grid never retries
/// a failed fetch and never assumes the request can be cancelled; a late
/// response for a deselected symbol is discarded at application time.
pub trait TimeseriesRepository {
    fn fetch(
        &self,
        symbol: &Symbol,
        granularity: Granularity,
    ) -> LocalBoxFuture<'static, DataResult<Vec<SeriesPoint>>>;
}
