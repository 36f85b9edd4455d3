//! Paddock Environment Abstraction Layer
//!
//! This crate lets the herding simulation run against either the real clock
//! (**Production**, tokio) or a virtual one (**Simulation**, see
//! `paddock_sim::SimContext`).
//!
//! # Intercepted Effects
//!
//! - Time (`now()`, `sleep()`)
//! - Task spawning (`spawn()`)
//! - Randomness (`rng_stream()`)
//!
//! All randomness is derived from a single 64-bit master seed, so a layout
//! can be reproduced from its seed number.
//!
//! # Example
//!
//! ```ignore
//! use paddock_env::PaddockContext;
//!
//! async fn agent_loop<Ctx: PaddockContext>(ctx: &Ctx, index: u64) {
//!     let mut rng = ctx.rng_stream(index);
//!     loop {
//!         step(&mut rng);
//!         ctx.sleep(Duration::from_millis(200)).await;
//!     }
//! }
//! ```

mod context;
mod seed;
mod tokio_impl;

pub use context::PaddockContext;
pub use seed::{derive_seed, stream_rng, LAYOUT_STREAM};
pub use tokio_impl::TokioContext;
