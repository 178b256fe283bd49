use std::{
    backtrace::{Backtrace, BacktraceStatus},
    fmt,
    panic::Location,
};

/// Where a [`Failure`](super::Failure) was captured.
#[derive(Debug)]
pub struct FailureContext {
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl FailureContext {
    /// Captures a backtrace now. Honours `RUST_BACKTRACE` and `RUST_LIB_BACKTRACE`.
    pub(crate) fn capture(location: &'static Location<'static>) -> Self {
        Self {
            location,
            backtrace: Backtrace::capture(),
        }
    }

    pub const fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub const fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for FailureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "captured at {}", self.location)?;

        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n{}", self.backtrace)?;
        }

        Ok(())
    }
}
