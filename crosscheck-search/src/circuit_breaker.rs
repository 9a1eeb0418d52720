//! Per-engine failure tracking for one orchestrator.
//!
//! An engine that errors `failure_threshold` times in a row is skipped
//! (treated as having returned nothing) until `cooldown_secs` have passed.
//! The next call after the cooldown is a trial call: success closes the circuit,
//! failure opens it again.
//!
//! ```text
//! Closed --N failures--> Open --cooldown--> HalfOpen
//!   ^                     ^                    |
//!   |                     +------failure-------+
//!   +--------------------success---------------+
//! ```
//!
//! Each [`crate::SearchOrchestrator`] owns its own breaker; nothing is
//! shared between orchestrators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::SearchEngine;

/// Circuit state for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls go through.
    Closed,
    /// Calls are skipped until the cooldown passes.
    Open,
    /// The cooldown passed; the next call decides.
    HalfOpen,
}

/// Thresholds for [`CircuitBreaker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit. `0` disables the breaker.
    pub failure_threshold: u32,
    /// Seconds an open circuit stays open.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct EngineHealth {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl Default for EngineHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

/// Engine health tracker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    engines: HashMap<SearchEngine, EngineHealth>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            engines: HashMap::new(),
        }
    }

    fn enabled(&self) -> bool {
        self.config.failure_threshold > 0
    }

    /// Whether `engine` may be called now. Moves Open to HalfOpen once the
    /// cooldown has elapsed.
    pub fn allows(&mut self, engine: SearchEngine) -> bool {
        if !self.enabled() {
            return true;
        }
        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        let health = self.engines.entry(engine).or_default();
        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                if health.opened_at.is_none_or(|t| t.elapsed() >= cooldown) {
                    health.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&mut self, engine: SearchEngine) {
        let health = self.engines.entry(engine).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
        health.opened_at = None;
    }

    /// Count a failure. A failed trial call reopens immediately.
    pub fn record_failure(&mut self, engine: SearchEngine) {
        if !self.enabled() {
            return;
        }
        let threshold = self.config.failure_threshold;
        let health = self.engines.entry(engine).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);

        if health.state == CircuitState::HalfOpen || health.consecutive_failures >= threshold {
            if health.state != CircuitState::Open {
                tracing::warn!(
                    engine = engine.name(),
                    failures = health.consecutive_failures,
                    "circuit opened"
                );
            }
            health.state = CircuitState::Open;
            health.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self, engine: SearchEngine) -> CircuitState {
        self.engines
            .get(&engine)
            .map_or(CircuitState::Closed, |h| h.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown_secs,
        })
    }

    #[test]
    fn starts_closed() {
        let mut b = breaker(3, 60);
        assert_eq!(b.state(SearchEngine::Bing), CircuitState::Closed);
        assert!(b.allows(SearchEngine::Bing));
    }

    #[test]
    fn opens_at_threshold() {
        let mut b = breaker(3, 600);
        b.record_failure(SearchEngine::SearX);
        b.record_failure(SearchEngine::SearX);
        assert!(b.allows(SearchEngine::SearX));
        b.record_failure(SearchEngine::SearX);
        assert_eq!(b.state(SearchEngine::SearX), CircuitState::Open);
        assert!(!b.allows(SearchEngine::SearX));
    }

    #[test]
    fn cooldown_moves_to_half_open() {
        let mut b = breaker(1, 0);
        b.record_failure(SearchEngine::Google);
        assert!(b.allows(SearchEngine::Google));
        assert_eq!(b.state(SearchEngine::Google), CircuitState::HalfOpen);
    }

    #[test]
    fn failed_trial_call_reopens() {
        let mut b = breaker(3, 0);
        for _ in 0..3 {
            b.record_failure(SearchEngine::Bing);
        }
        assert!(b.allows(SearchEngine::Bing));
        b.record_failure(SearchEngine::Bing);
        assert_eq!(b.state(SearchEngine::Bing), CircuitState::Open);
    }

    #[test]
    fn success_closes() {
        let mut b = breaker(1, 0);
        b.record_failure(SearchEngine::DuckDuckGo);
        let _ = b.allows(SearchEngine::DuckDuckGo);
        b.record_success(SearchEngine::DuckDuckGo);
        assert_eq!(b.state(SearchEngine::DuckDuckGo), CircuitState::Closed);
    }

    #[test]
    fn success_resets_failure_run() {
        let mut b = breaker(2, 600);
        b.record_failure(SearchEngine::Bing);
        b.record_success(SearchEngine::Bing);
        b.record_failure(SearchEngine::Bing);
        assert_eq!(b.state(SearchEngine::Bing), CircuitState::Closed);
    }

    #[test]
    fn engines_are_independent() {
        let mut b = breaker(1, 600);
        b.record_failure(SearchEngine::Bing);
        assert!(!b.allows(SearchEngine::Bing));
        assert!(b.allows(SearchEngine::SearX));
    }

    #[test]
    fn zero_threshold_disables() {
        let mut b = breaker(0, 600);
        for _ in 0..10 {
            b.record_failure(SearchEngine::Bing);
        }
        assert!(b.allows(SearchEngine::Bing));
        assert_eq!(b.state(SearchEngine::Bing), CircuitState::Closed);
    }
}
