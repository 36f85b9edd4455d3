//! Core environment context trait for Paddock agents.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so that agent loops and the
/// simulation runner work the same against the wall clock or a virtual one.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, entropy or a fixed seed
/// - **Simulation**: `SimContext` (in `paddock_sim`) - virtual clock, fixed seed
///
/// # Randomness
///
/// Every consumer asks for its own stream with [`PaddockContext::rng_stream`].
/// Streams never share generator state, so concurrent agents do not contend
/// on a common RNG.
#[async_trait]
pub trait PaddockContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// Callers that must react to cancellation race this against their
    /// stop signal; dropping the future is always safe.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task and returns its handle.
    ///
    /// The handle is used by the lifecycle manager to await or abort the task.
    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;

    /// Derives an independent RNG stream from the master seed.
    ///
    /// The same seed and `stream` always produce the same sequence;
    /// different streams are statistically independent.
    fn rng_stream(&self, stream: u64) -> ChaCha8Rng;

    /// Returns the context's master seed (for logging/debugging).
    fn seed(&self) -> u64;
}
