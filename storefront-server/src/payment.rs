//! Payment reconciliation
//!
//! After a wallet checkout redirects the customer to the gateway, the order's
//! payment is eventually confirmed by polling `checkPayment`. The poll loop is
//! an explicit cancellable task with an injected sleeper and a fixed attempt
//! budget (2 s × 15 ≈ 30 s), not a free-running timer chain. Terminal phases
//! are published to an in-memory registry keyed by order token so the status
//! page can read them.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use shared::error::AppError;
use shared::models::payment::PaymentPhase;

use crate::db;
use crate::gateway::{CheckOutcome, GatewayClient};
use crate::state::AppState;

/// Failure reason when the poll budget is exhausted
pub const TIMEOUT_MESSAGE: &str = "Payment verification timed out. Please contact support.";
/// Failure reason when the completion update matched no pending order
pub const CONFIRM_FAILED_MESSAGE: &str = "Payment confirmation matched no pending order";
/// Failure reason when the completion update itself errored
pub const CONFIRM_ERROR_MESSAGE: &str =
    "Failed to update order status. Please contact support.";

/// Source of payment status checks (the gateway in production, a script in tests)
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn check(&self, order_token: &str) -> Result<CheckOutcome, AppError>;
}

#[async_trait]
impl StatusSource for GatewayClient {
    async fn check(&self, order_token: &str) -> Result<CheckOutcome, AppError> {
        Ok(self.check_payment(order_token).await?.outcome())
    }
}

/// Injected delay between polls, so tests run without timers
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-interval, fixed-budget polling policy
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 15,
        }
    }
}

/// Outcome of a poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// A terminal phase was reached (Success or Failed)
    Terminal(PaymentPhase),
    /// The watcher was torn down; no further checks fire
    Cancelled,
}

/// Poll the status source until a terminal state, the budget runs out, or the
/// token is cancelled. At most one check is in flight at a time; the next
/// check is scheduled only after the previous response resolves.
///
/// `publish` receives intermediate `Pending` phases for observers.
pub async fn poll_until_terminal(
    source: &dyn StatusSource,
    sleeper: &dyn Sleeper,
    policy: PollPolicy,
    cancel: &CancellationToken,
    order_token: &str,
    mut publish: impl FnMut(PaymentPhase),
) -> PollResult {
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return PollResult::Cancelled;
        }

        let outcome = match source.check(order_token).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return PollResult::Terminal(PaymentPhase::Failed {
                    reason: err.message,
                });
            }
        };

        match outcome {
            CheckOutcome::Succeeded => return PollResult::Terminal(PaymentPhase::Success),
            CheckOutcome::Failed(reason) => {
                return PollResult::Terminal(PaymentPhase::Failed { reason });
            }
            CheckOutcome::Pending => {
                if attempt == policy.max_attempts {
                    return PollResult::Terminal(PaymentPhase::Failed {
                        reason: TIMEOUT_MESSAGE.to_string(),
                    });
                }
                publish(PaymentPhase::Pending);
                tokio::select! {
                    _ = cancel.cancelled() => return PollResult::Cancelled,
                    _ = sleeper.sleep(policy.interval) => {}
                }
            }
        }
    }

    // Zero-budget policy degenerates to an immediate timeout
    PollResult::Terminal(PaymentPhase::Failed {
        reason: TIMEOUT_MESSAGE.to_string(),
    })
}

/// Registry of payment phases and live watcher tasks, keyed by order token
#[derive(Clone)]
pub struct WatcherRegistry {
    phases: Arc<DashMap<String, PaymentPhase>>,
    watchers: Arc<DashMap<String, CancellationToken>>,
    root: CancellationToken,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self {
            phases: Arc::new(DashMap::new()),
            watchers: Arc::new(DashMap::new()),
            root: CancellationToken::new(),
        }
    }

    /// Last published phase for a token
    pub fn phase(&self, order_token: &str) -> Option<PaymentPhase> {
        self.phases.get(order_token).map(|p| p.clone())
    }

    /// Publish an intermediate or terminal phase
    pub fn publish(&self, order_token: &str, phase: PaymentPhase) {
        self.phases.insert(order_token.to_string(), phase);
    }

    /// True while a watcher task is live for this token
    pub fn is_watching(&self, order_token: &str) -> bool {
        self.watchers.contains_key(order_token)
    }

    /// Register a new watcher: any previous watcher for the token is cancelled
    /// and the phase resets to Loading. Returns the task's cancellation token.
    pub fn begin(&self, order_token: &str) -> CancellationToken {
        let token = self.root.child_token();
        if let Some((_, old)) = self.watchers.remove(order_token) {
            old.cancel();
        }
        self.watchers.insert(order_token.to_string(), token.clone());
        self.publish(order_token, PaymentPhase::Loading);
        token
    }

    /// Publish a terminal phase and drop the watcher entry
    pub fn finish(&self, order_token: &str, phase: PaymentPhase) {
        self.publish(order_token, phase);
        self.watchers.remove(order_token);
    }

    /// Tear down the watcher for a token; pending timers stop firing
    pub fn cancel(&self, order_token: &str) {
        if let Some((_, token)) = self.watchers.remove(order_token) {
            token.cancel();
        }
    }

    /// Cancel every live watcher (server shutdown)
    pub fn cancel_all(&self) {
        self.root.cancel();
        self.watchers.clear();
    }
}

impl Default for WatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a reconciliation watcher for an order token.
///
/// No-op when a watcher is already live for the token — one poll session per
/// token at a time. On gateway success the order is marked completed exactly
/// once; a zero-row update is surfaced as a confirmation failure.
pub fn spawn_watcher(state: &AppState, order_token: String) {
    let registry = state.watchers.clone();
    if registry.is_watching(&order_token) {
        return;
    }

    let cancel = registry.begin(&order_token);
    let gateway = state.gateway.clone();
    let pool = state.pool.clone();
    let policy = state.poll;

    tokio::spawn(async move {
        let result = {
            let registry = registry.clone();
            let token = order_token.clone();
            poll_until_terminal(
                &gateway,
                &TokioSleeper,
                policy,
                &cancel,
                &order_token,
                move |phase| registry.publish(&token, phase),
            )
            .await
        };

        match result {
            PollResult::Cancelled => {
                tracing::debug!(order_token = %order_token, "Payment watcher cancelled");
            }
            PollResult::Terminal(PaymentPhase::Success) => {
                match db::orders::mark_completed(&pool, &order_token).await {
                    Ok(rows) if rows > 0 => {
                        tracing::info!(order_token = %order_token, "Payment confirmed, order completed");
                        registry.finish(&order_token, PaymentPhase::Success);
                    }
                    Ok(_) => {
                        tracing::warn!(order_token = %order_token, "Completion update matched no pending order");
                        registry.finish(
                            &order_token,
                            PaymentPhase::Failed {
                                reason: CONFIRM_FAILED_MESSAGE.to_string(),
                            },
                        );
                    }
                    Err(err) => {
                        tracing::error!(order_token = %order_token, error = %err, "Completion update failed");
                        registry.finish(
                            &order_token,
                            PaymentPhase::Failed {
                                reason: CONFIRM_ERROR_MESSAGE.to_string(),
                            },
                        );
                    }
                }
            }
            PollResult::Terminal(phase) => {
                registry.finish(&order_token, phase);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted status source: pops outcomes front-to-back, repeating the last
    struct ScriptedSource {
        outcomes: Mutex<Vec<CheckOutcome>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<CheckOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn check(&self, _order_token: &str) -> Result<CheckOutcome, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                Ok(outcomes.remove(0))
            } else {
                Ok(outcomes[0].clone())
            }
        }
    }

    struct NoopSleeper;

    #[async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(0),
            max_attempts: 15,
        }
    }

    #[tokio::test]
    async fn test_success_on_final_attempt() {
        // Pending for the first 14 calls, success on the 15th
        let mut script = vec![CheckOutcome::Pending; 14];
        script.push(CheckOutcome::Succeeded);
        let source = ScriptedSource::new(script);
        let cancel = CancellationToken::new();
        let mut pending_seen = 0;

        let result = poll_until_terminal(&source, &NoopSleeper, policy(), &cancel, "tk", |phase| {
            assert_eq!(phase, PaymentPhase::Pending);
            pending_seen += 1;
        })
        .await;

        assert_eq!(result, PollResult::Terminal(PaymentPhase::Success));
        assert_eq!(source.calls(), 15);
        assert_eq!(pending_seen, 14);
    }

    #[tokio::test]
    async fn test_timeout_after_exact_budget() {
        let source = ScriptedSource::new(vec![CheckOutcome::Pending]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&source, &NoopSleeper, policy(), &cancel, "tk", |_| {}).await;

        assert_eq!(
            result,
            PollResult::Terminal(PaymentPhase::Failed {
                reason: TIMEOUT_MESSAGE.to_string()
            })
        );
        // Exactly 15 calls, never 16
        assert_eq!(source.calls(), 15);
    }

    #[tokio::test]
    async fn test_provider_failure_is_terminal() {
        let source = ScriptedSource::new(vec![
            CheckOutcome::Pending,
            CheckOutcome::Failed("Insufficient funds".into()),
        ]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&source, &NoopSleeper, policy(), &cancel, "tk", |_| {}).await;

        assert_eq!(
            result,
            PollResult::Terminal(PaymentPhase::Failed {
                reason: "Insufficient funds".to_string()
            })
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let source = ScriptedSource::new(vec![CheckOutcome::Succeeded]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&source, &NoopSleeper, policy(), &cancel, "tk", |_| {}).await;

        assert_eq!(result, PollResult::Terminal(PaymentPhase::Success));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_check() {
        let source = ScriptedSource::new(vec![CheckOutcome::Pending]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            poll_until_terminal(&source, &NoopSleeper, policy(), &cancel, "tk", |_| {}).await;

        assert_eq!(result, PollResult::Cancelled);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_during_sleep() {
        /// Sleeper that cancels the token on its first invocation
        struct CancellingSleeper(CancellationToken);

        #[async_trait]
        impl Sleeper for CancellingSleeper {
            async fn sleep(&self, _duration: Duration) {
                self.0.cancel();
                // Never resolves; cancellation must win the select
                futures::future::pending::<()>().await;
            }
        }

        let source = ScriptedSource::new(vec![CheckOutcome::Pending]);
        let cancel = CancellationToken::new();
        let sleeper = CancellingSleeper(cancel.clone());

        let result =
            poll_until_terminal(&source, &sleeper, policy(), &cancel, "tk", |_| {}).await;

        assert_eq!(result, PollResult::Cancelled);
        // One check fired, then the watcher was torn down mid-sleep
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_registry_begin_publish_finish() {
        let registry = WatcherRegistry::new();
        assert!(registry.phase("tk").is_none());

        let _cancel = registry.begin("tk");
        assert!(registry.is_watching("tk"));
        assert_eq!(registry.phase("tk"), Some(PaymentPhase::Loading));

        registry.publish("tk", PaymentPhase::Pending);
        assert_eq!(registry.phase("tk"), Some(PaymentPhase::Pending));

        registry.finish("tk", PaymentPhase::Success);
        assert!(!registry.is_watching("tk"));
        assert_eq!(registry.phase("tk"), Some(PaymentPhase::Success));
    }

    #[test]
    fn test_registry_begin_cancels_previous() {
        let registry = WatcherRegistry::new();
        let first = registry.begin("tk");
        assert!(!first.is_cancelled());

        let second = registry.begin("tk");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_registry_cancel_all() {
        let registry = WatcherRegistry::new();
        let a = registry.begin("a");
        let b = registry.begin("b");

        registry.cancel_all();
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(!registry.is_watching("a"));
        assert!(!registry.is_watching("b"));
    }
}
