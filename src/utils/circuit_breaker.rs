use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::retry::IsTransient;

// ============================================================================
// Circuit Breaker for Remote Collaborators
// ============================================================================
//
// Closed   - calls pass through
// Open     - calls fail fast until `open_for` has elapsed
// HalfOpen - probing; `close_after` successes close it, one failure reopens
//
// Only transient errors count as failures. A bank refusing a transfer for
// insufficient funds is a healthy bank.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures before opening
    pub open_after: u32,
    pub open_for: Duration,
    /// Successful probes needed to close from half-open
    pub close_after: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            open_after: 5,
            open_for: Duration::from_secs(30),
            close_after: 2,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failures: u32,
    probes: u32,
    opened_at: Option<Instant>,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("circuit '{0}' is open")]
    Open(&'static str),

    #[error(transparent)]
    Inner(E),
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                failures: 0,
                probes: 0,
                opened_at: None,
            })),
        }
    }

    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: IsTransient,
    {
        self.admit().await?;

        let result = operation.await;
        match &result {
            Err(error) if error.is_transient() => self.on_failure().await,
            _ => self.on_success().await,
        }
        result.map_err(CircuitBreakerError::Inner)
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    async fn admit<E>(&self) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.inner.lock().await;
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .opened_at
            .map(|at| at.elapsed() >= self.config.open_for)
            .unwrap_or(true);
        if !cooled_down {
            return Err(CircuitBreakerError::Open(self.name));
        }

        tracing::info!(circuit = self.name, "Circuit half-open, probing");
        inner.state = CircuitState::HalfOpen;
        inner.probes = 0;
        Ok(())
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.probes += 1;
                if inner.probes >= self.config.close_after {
                    tracing::info!(circuit = self.name, "Circuit closed");
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.opened_at = None;
                }
            }
            CircuitState::Closed => inner.failures = 0,
            CircuitState::Open => {}
        }
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.failures += 1;

        let trip = match inner.state {
            CircuitState::Closed => inner.failures >= self.config.open_after,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };

        if trip {
            tracing::warn!(circuit = self.name, failures = inner.failures, "Circuit opened");
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.probes = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum CallError {
        Unavailable,
        Rejected,
    }

    impl IsTransient for CallError {
        fn is_transient(&self) -> bool {
            matches!(self, CallError::Unavailable)
        }
    }

    fn breaker(open_for: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            "bank",
            CircuitBreakerConfig {
                open_after: 2,
                open_for,
                close_after: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_opens_after_transient_failures() {
        let cb = breaker(Duration::from_secs(60));

        for _ in 0..2 {
            let _ = cb.call(async { Err::<(), _>(CallError::Unavailable) }).await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        let result = cb.call(async { Ok::<_, CallError>(()) }).await;
        assert!(matches!(result, Err(CircuitBreakerError::Open("bank"))));
    }

    #[tokio::test]
    async fn test_rejections_do_not_open() {
        let cb = breaker(Duration::from_secs(60));

        for _ in 0..5 {
            let _ = cb.call(async { Err::<(), _>(CallError::Rejected) }).await;
        }

        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_probe_closes() {
        let cb = breaker(Duration::from_millis(20));

        for _ in 0..2 {
            let _ = cb.call(async { Err::<(), _>(CallError::Unavailable) }).await;
        }
        tokio::time::sleep(Duration::from_millis(40)).await;

        let result = cb.call(async { Ok::<_, CallError>(7) }).await;
        assert!(matches!(result, Ok(7)));
        assert_eq!(cb.state().await, CircuitState::Closed);
    }
}
