//! Production implementation of PaddockContext using Tokio.

use crate::seed::stream_rng;
use crate::PaddockContext;
use async_trait::async_trait;
use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Production context backed by Tokio and the system clock.
///
/// Randomness is derived from a master seed. [`TokioContext::new`] draws that
/// seed from OS entropy; [`TokioContext::seeded`] fixes it for reproducible
/// layouts.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Master seed for RNG streams
    seed: u64,
}

impl TokioContext {
    /// Creates a new TokioContext with an entropy-derived seed.
    pub fn new() -> Self {
        Self::seeded(rand::rngs::OsRng.next_u64())
    }

    /// Creates a new TokioContext with a fixed master seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            start: Instant::now(),
            seed,
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::seeded(seed))
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaddockContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn spawn<F>(&self, _name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(future)
    }

    fn rng_stream(&self, stream: u64) -> ChaCha8Rng {
        stream_rng(self.seed, stream)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[tokio::test]
    async fn test_tokio_context_time() {
        let ctx = TokioContext::seeded(1);
        let t1 = ctx.now();
        ctx.sleep(Duration::from_millis(10)).await;
        let t2 = ctx.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_tokio_context_spawn_returns_output() {
        let ctx = TokioContext::seeded(1);
        let handle = ctx.spawn("answer", async { 40 + 2 });

        assert_eq!(handle.await.ok(), Some(42));
    }

    #[test]
    fn test_tokio_context_seeded_streams() {
        let ctx1 = TokioContext::seeded(7);
        let ctx2 = TokioContext::seeded(7);

        let a: u64 = ctx1.rng_stream(5).gen();
        let b: u64 = ctx2.rng_stream(5).gen();
        assert_eq!(a, b);
        assert_eq!(ctx1.seed(), 7);
    }
}
