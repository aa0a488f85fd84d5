//! # Time Wheel
//!
//! A single-level hashed timing wheel for large numbers of delayed one-shot
//! jobs, built on top of Tokio.
//!
//! Jobs are identified by a string key. Scheduling a key that is already
//! pending replaces the old job, cancelling removes it, and every job that is
//! not cancelled runs exactly once after its delay, rounded to the tick.
//! Insertion, cancellation and each tick cost O(1) per job touched.
//!
//! ## Features
//!
//! - **Lock-free core**: one Tokio task owns the slots, cursor and key index and applies commands one at a time
//! - **O(1) cancel**: the key index points straight at the job's list node
//! - **Laps**: delays longer than one rotation wait extra rotations instead of needing more levels
//! - **Fire-and-forget jobs**: blocking closures run on the blocking pool, futures as tasks; a slow or panicking job never stalls the wheel
//! - **Graceful Shutdown**: stop via the handle or a cancellation token; later calls fail with [`WheelError::Closed`]
//! - **Process-wide wheel**: optional [`global`] façade
//!
//! ## Quick Start
//!
//! ```rust
//! use time_wheel::{CancellationToken, TimeWheel, WheelConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WheelConfig::new(Duration::from_millis(10), 64).with_name("my_wheel");
//!     let (wheel, handle) = TimeWheel::new(config, CancellationToken::new())?;
//!
//!     // Spawn the command loop
//!     let task = wheel.start();
//!
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     handle
//!         .schedule(Duration::from_millis(50), "greeting", move || {
//!             let _ = tx.send("hello");
//!         })
//!         .await?;
//!
//!     assert_eq!(rx.await?, "hello");
//!
//!     // Shutdown; anything still pending is discarded
//!     handle.stop().await?;
//!     task.await?;
//!     Ok(())
//! }
//! ```

mod action;
mod config;
mod error;
pub mod global;
mod slots;
mod tw;
pub mod wheel;

pub use action::Action;
pub use config::WheelConfig;
pub use error::WheelError;
pub use tw::{TimeWheel, WheelCommand, WheelHandle};
pub use wheel::{Job, Location, Wheel};

// Re-export commonly used types for convenience
pub use std::time::Duration;
pub use tokio_util::sync::CancellationToken;
