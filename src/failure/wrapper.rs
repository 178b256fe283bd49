use std::{any::Any, error::Error, fmt, panic::Location, sync::Arc};

use crate::error::{BoxError, HandlerPanic};

use super::{context::FailureContext, error_kind::ErrorKind};

/// A captured error, optionally with the place it was captured.
///
/// Clones share the same error and context and are considered the same failure.
#[derive(Clone)]
pub struct Failure {
    value: Arc<dyn Error + Send + Sync>,
    context: Option<Arc<FailureContext>>,
}

impl Failure {
    /// Wraps an explicit error value. No context is recorded.
    ///
    /// Wrapping a [`Failure`] nests it: the new failure's value is the old failure.
    pub fn new<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(err),
            context: None,
        }
    }

    /// Wraps the error currently being handled, recording the caller's location
    /// and a backtrace.
    ///
    /// Call it where the error is handled, e.g. in the `Err(err)` arm of a `match`.
    #[track_caller]
    pub fn capture<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(err),
            context: Some(Arc::new(FailureContext::capture(Location::caller()))),
        }
    }

    /// A handler returned `err`. An error that already is a [`Failure`] is kept as is.
    pub(crate) fn raised(err: BoxError, location: &'static Location<'static>) -> Self {
        match err.downcast::<Failure>() {
            Ok(failure) => *failure,
            Err(err) => Self {
                value: Arc::from(err),
                context: Some(Arc::new(FailureContext::capture(location))),
            },
        }
    }

    pub(crate) fn panicked(
        payload: Box<dyn Any + Send>,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            value: Arc::new(HandlerPanic::from_payload(payload)),
            context: Some(Arc::new(FailureContext::capture(location))),
        }
    }

    /// Returns the first kind in `kinds` that matches the wrapped error.
    pub fn check(&self, kinds: &[ErrorKind]) -> Option<ErrorKind> {
        kinds.iter().copied().find(|kind| kind.matches(self.error()))
    }

    /// Like [`check`](Self::check), but a miss returns this failure as the error,
    /// ready to be propagated with `?` and checked again further up.
    pub fn trap(&self, kinds: &[ErrorKind]) -> Result<ErrorKind, Failure> {
        self.check(kinds).ok_or_else(|| self.clone())
    }

    /// Raises this failure again, keeping its original context.
    pub fn raise_exception<T>(&self) -> Result<T, Failure> {
        Err(self.clone())
    }

    pub fn value(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.value
    }

    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.value.is::<E>()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.value.downcast_ref::<E>()
    }

    pub fn context(&self) -> Option<&FailureContext> {
        self.context.as_deref()
    }

    /// Where the failure was captured. `None` for failures built with [`Failure::new`].
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.context().map(FailureContext::location)
    }

    pub fn backtrace(&self) -> Option<&std::backtrace::Backtrace> {
        self.context().map(FailureContext::backtrace)
    }

    /// Whether both failures are clones of one another.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    fn error(&self) -> &(dyn Error + 'static) {
        &*self.value
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("value", &self.value)
            .field("location", &self.location())
            .finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.value.source()
    }
}

#[cfg(test)]
mod tests {
    use crate::test::{divide, init_tracing, RequestFailed, RuntimeError, ZeroDivisionError};

    use super::*;

    #[test]
    fn wraps_an_explicit_error() {
        init_tracing();

        let failure = Failure::new(RuntimeError("hello"));

        assert!(failure.check(&[ErrorKind::of::<RuntimeError>()]).is_some());
        assert!(failure.location().is_none());
        assert_eq!(failure.to_string(), "Runtime error: hello");
    }

    #[test]
    fn captures_the_error_being_handled() {
        init_tracing();

        let failure = match divide(1, 0) {
            Ok(_) => panic!("Division by zero succeeded"),
            Err(err) => Failure::capture(err),
        };

        assert!(failure.check(&[ErrorKind::of::<ZeroDivisionError>()]).is_some());
        assert!(failure.context().is_some());
    }

    #[test]
    fn check_returns_the_first_matching_kind() {
        init_tracing();

        let failure = Failure::new(RuntimeError("check"));

        assert_eq!(
            failure.check(&[
                ErrorKind::of::<ZeroDivisionError>(),
                ErrorKind::of::<RuntimeError>()
            ]),
            Some(ErrorKind::of::<RuntimeError>())
        );
        assert_eq!(failure.check(&[ErrorKind::of::<ZeroDivisionError>()]), None);
        assert_eq!(failure.check(&[]), None);
    }

    #[test]
    fn check_prefers_argument_order_when_kinds_overlap() {
        init_tracing();

        let failure = Failure::new(RequestFailed(ZeroDivisionError));
        let cause = ErrorKind::caused_by::<ZeroDivisionError>();
        let exact = ErrorKind::of::<RequestFailed>();

        assert_eq!(failure.check(&[cause, exact]), Some(cause));
        assert_eq!(failure.check(&[exact, cause]), Some(exact));
    }

    #[test]
    fn trap_returns_the_matching_kind() {
        init_tracing();

        let failure = Failure::new(RuntimeError("trap"));

        assert_eq!(
            failure.trap(&[
                ErrorKind::of::<ZeroDivisionError>(),
                ErrorKind::of::<RuntimeError>()
            ]),
            Ok(ErrorKind::of::<RuntimeError>())
        );
    }

    #[test]
    fn trap_raises_the_failure_itself_on_a_miss() {
        init_tracing();

        let failure = Failure::new(RuntimeError("trap"));

        let raised = failure
            .trap(&[ErrorKind::of::<ZeroDivisionError>()])
            .expect_err("Trap matched an unrelated kind");

        assert!(raised.ptr_eq(&failure));
        assert_eq!(
            raised.trap(&[ErrorKind::of::<RuntimeError>()]),
            Ok(ErrorKind::of::<RuntimeError>())
        );
    }

    #[test]
    fn raise_exception_keeps_the_original_capture_site() {
        init_tracing();

        let err = divide(1, 0).expect_err("Division by zero succeeded");
        let failure = Failure::capture(err);
        let capture_line = line!() - 1;

        let raised = failure
            .raise_exception::<()>()
            .expect_err("Raise returned a value");

        assert!(raised.is::<ZeroDivisionError>());
        assert!(raised.ptr_eq(&failure));

        let location = raised.location().expect("Captured failure has no location");

        assert_eq!(location.file(), file!());
        assert_eq!(location.line(), capture_line);
    }

    #[test]
    fn wrapping_a_failure_nests_it() {
        init_tracing();

        let inner = Failure::new(RuntimeError("inner"));
        let outer = Failure::new(inner.clone());

        assert_eq!(outer.check(&[ErrorKind::of::<RuntimeError>()]), None);
        assert_eq!(
            outer.check(&[ErrorKind::of::<Failure>()]),
            Some(ErrorKind::of::<Failure>())
        );
        assert!(!outer.ptr_eq(&inner));

        let unwrapped = outer
            .downcast_ref::<Failure>()
            .expect("Outer failure does not hold the inner one");

        assert!(unwrapped.ptr_eq(&inner));
        assert_eq!(outer.to_string(), inner.to_string());
    }

    #[test]
    fn source_is_transparent() {
        init_tracing();

        let failure = Failure::new(RequestFailed(ZeroDivisionError));

        let source = failure.source().expect("Failure has no source");

        assert!(source.is::<ZeroDivisionError>());
    }

    #[test]
    fn handler_failures_are_not_nested() {
        init_tracing();

        let failure = Failure::new(RuntimeError("raised"));

        let raised = Failure::raised(Box::new(failure.clone()), Location::caller());

        assert!(raised.ptr_eq(&failure));
        assert!(raised.location().is_none());
    }
}
