#![deny(unsafe_code, missing_debug_implementations)]

//! A synchronous deferred result.
//!
//! [`Deferred`] holds a value that is already known, either a success or a
//! [`Failure`]. Callbacks and errbacks run the moment they are registered, so a
//! library can expose a deferred-shaped API while every operation below it
//! completes synchronously:
//!
//! ```
//! use std::convert::Infallible;
//!
//! use eager_deferred::{Deferred, ErrorKind, Failure};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("Division by zero")]
//! struct DivisionByZero;
//!
//! let mut deferred = Deferred::succeed(10);
//! deferred
//!     .on_success(|v: i32| v.checked_div(0).ok_or(DivisionByZero))
//!     .on_failure(|failure| -> Result<i32, Failure> {
//!         failure.trap(&[ErrorKind::of::<DivisionByZero>()])?;
//!
//!         Ok(0)
//!     })
//!     .on_success(|v| Ok::<_, Infallible>(v + 1));
//!
//! assert_eq!(deferred.finalize().ok(), Some(1));
//! ```

pub mod deferred;
pub mod error;
pub mod failure;

pub use deferred::Deferred;
pub use failure::{ErrorKind, Failure, FailureContext};
