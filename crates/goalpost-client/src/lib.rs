//! Goalpost Client SDK.
//!
//! This crate provides a client library for interacting with the goalpost
//! API, plus a local [`SessionTimer`] that mirrors a running session for
//! display and fires one-shot low-balance warnings.
//!
//! # Example
//!
//! ```no_run
//! use goalpost_client::GoalpostClient;
//!
//! # async fn example() -> Result<(), goalpost_client::ClientError> {
//! let client = GoalpostClient::new("http://goalpost:8080");
//!
//! let session = client.start_session("user-uuid").await?;
//! println!("session {} (adopted: {})", session.session_id, session.adopted);
//!
//! let receipt = client.stop_session(&session.session_id).await?;
//! println!("charged {} minutes", receipt.credits_charged);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod timer;
mod types;

pub use client::{ClientOptions, GoalpostClient};
pub use error::ClientError;
pub use timer::{SessionTimer, TimerState, Warning};
pub use types::*;
