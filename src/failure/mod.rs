mod context;
mod error_kind;
mod wrapper;

pub use context::FailureContext;
pub use error_kind::ErrorKind;
pub use wrapper::Failure;
