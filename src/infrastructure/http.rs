use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gloo::net::http::Request;
use serde_json::Value;

use crate::domain::errors::{DataResult, GridError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    Granularity, Quote, SeriesPoint, Symbol, TimeseriesRepository, Timestamp,
};

/// HTTP client for the timeseries endpoint. The endpoint owns provider
/// fallback, caching, and retry policy; this client only fetches and
/// converts. Upstream timestamps are epoch milliseconds and convert to
/// seconds here, at the service boundary.
#[derive(Clone)]
pub struct TimeseriesHttpClient {
    base_url: String,
}

impl TimeseriesHttpClient {
    /// Same-origin client, matching the dashboard deployment.
    pub fn new() -> Self {
        Self { base_url: String::new() }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    fn endpoint(&self, symbol: &Symbol, granularity: Granularity) -> String {
        format!(
            "{}/api/timeseries?symbol={}&gran={}",
            self.base_url,
            symbol.value(),
            granularity.as_query_str()
        )
    }
}

impl Default for TimeseriesHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeseriesRepository for TimeseriesHttpClient {
    fn fetch(
        &self,
        symbol: &Symbol,
        granularity: Granularity,
    ) -> LocalBoxFuture<'static, DataResult<Vec<SeriesPoint>>> {
        let url = self.endpoint(symbol, granularity);
        let symbol = symbol.clone();

        async move {
            get_logger().debug(
                LogComponent::Infrastructure("TimeseriesHttp"),
                &format!("fetching {} ({})", symbol.value(), url),
            );

            let response = Request::get(&url)
                .send()
                .await
                .map_err(|err| GridError::DataLoad(format!("request failed: {:?}", err)))?;

            let status = response.status();
            let payload: Value = response
                .json()
                .await
                .map_err(|err| GridError::DataLoad(format!("invalid JSON: {:?}", err)))?;

            if !(200..300).contains(&status) {
                return Err(GridError::DataLoad(error_message(&payload, status)));
            }

            parse_series_payload(&payload)
        }
        .boxed_local()
    }
}

/// Extract `{ "data": [ { "time": <ms>, "value": <f64> }, ... ] }`.
/// A missing `data` field is an empty series, as the dashboard treats it.
fn parse_series_payload(payload: &Value) -> DataResult<Vec<SeriesPoint>> {
    let rows = match payload.get("data") {
        Some(data) => data
            .as_array()
            .ok_or_else(|| GridError::DataLoad("`data` is not an array".to_string()))?,
        None => return Ok(Vec::new()),
    };

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let time = row
            .get("time")
            .and_then(Value::as_u64)
            .ok_or_else(|| GridError::DataLoad("point missing `time`".to_string()))?;
        let value = row
            .get("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| GridError::DataLoad("point missing `value`".to_string()))?;
        points.push(SeriesPoint::new(Timestamp::from_millis(time), Quote::new(value)));
    }
    Ok(points)
}

/// Error envelope: prefer `error.hint`, then `error.message`, then the
/// bare status.
fn error_message(payload: &Value, status: u16) -> String {
    let error = payload.get("error");
    error
        .and_then(|e| e.get("hint"))
        .or_else(|| error.and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Data error ({})", status))
}
