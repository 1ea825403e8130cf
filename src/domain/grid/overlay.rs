use strum::{AsRefStr, Display};

/// Derived per-symbol state driving a viewport's visual indicators. One
/// instance per visible symbol; destroyed together with its viewport, so
/// there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum OverlayState {
    /// Request outstanding: nothing rendered yet, or a refresh in flight.
    #[strum(serialize = "loading")]
    Loading,
    /// Last request failed. A prior successful render stays visible
    /// underneath the indicator.
    #[strum(serialize = "error")]
    Error,
    /// Request succeeded with zero points.
    #[strum(serialize = "empty")]
    EmptyReady,
    /// Request succeeded with a non-empty series.
    #[strum(serialize = "ready")]
    DataReady,
}

impl OverlayState {
    /// State after a successful resolution.
    pub fn resolved(point_count: usize) -> Self {
        if point_count == 0 {
            OverlayState::EmptyReady
        } else {
            OverlayState::DataReady
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, OverlayState::EmptyReady | OverlayState::DataReady)
    }

    /// CSS class hook for DOM bindings.
    pub fn css_class(&self) -> &str {
        self.as_ref()
    }
}
