use std::sync::Arc;
use std::time::Duration;

use crate::transport::TransportError;

pub const DEFAULT_ATTEMPTS: u32 = 10;
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Hook run after every failed attempt with the attempt number and cause.
pub type FailureHook = Arc<dyn Fn(u32, &TransportError) + Send + Sync>;

/// Retry policy for one dispatch.
#[derive(Clone)]
pub struct DispatchPolicy {
    /// Total attempts including the first. Must be at least 1.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub interval_ms: u64,
    /// Log every failed attempt at `warn` instead of `debug`.
    pub verbose: bool,
    pub on_failure: Option<FailureHook>,
}

impl DispatchPolicy {
    pub fn new(attempts: u32, interval_ms: u64) -> Self {
        Self {
            attempts,
            interval_ms,
            ..Self::default()
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn on_failure(mut self, hook: impl Fn(u32, &TransportError) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            interval_ms: DEFAULT_INTERVAL_MS,
            verbose: false,
            on_failure: None,
        }
    }
}

impl std::fmt::Debug for DispatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPolicy")
            .field("attempts", &self.attempts)
            .field("interval_ms", &self.interval_ms)
            .field("verbose", &self.verbose)
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
