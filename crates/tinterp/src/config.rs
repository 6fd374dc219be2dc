//! Interpolation session configuration

/// Configuration for an [`crate::Interpolator`] session.
#[derive(Debug, Clone)]
pub struct InterpolationConfig {
    /// Verify every interpolant against a reference solver, if one is set
    pub self_check: bool,
    /// Replace bounded-affine-term wrappers left in the final interpolants by
    /// their inner formula
    pub unfold_bounded: bool,
    /// Poll the termination callback every this many traversal steps
    pub cancel_poll_interval: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            self_check: cfg!(debug_assertions),
            unfold_bounded: true,
            cancel_poll_interval: 1,
        }
    }
}

impl InterpolationConfig {
    /// Defaults overridden by `TINTERP_SELF_CHECK` (`0`/`1`) and
    /// `TINTERP_CANCEL_POLL` (a positive step count).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("TINTERP_SELF_CHECK") {
            config.self_check = !matches!(value.trim(), "" | "0" | "false");
        }
        if let Ok(value) = std::env::var("TINTERP_CANCEL_POLL") {
            if let Ok(interval) = value.trim().parse::<usize>() {
                config.cancel_poll_interval = interval.max(1);
            }
        }
        config
    }

    /// Enable or disable the self-check.
    #[must_use]
    pub fn with_self_check(mut self, enabled: bool) -> Self {
        self.self_check = enabled;
        self
    }
}
