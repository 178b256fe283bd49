use std::{
    future::{ready, IntoFuture, Ready},
    mem,
    panic::{self, AssertUnwindSafe, Location},
};

use crate::{
    error::{BoxError, ResultInUse},
    failure::Failure,
};

/// A result that is already known, with callbacks and errbacks applied as soon
/// as they are registered.
///
/// Handlers never let an error escape: an `Err` (or a panic) from a handler
/// turns the current result into a [`Failure`]. Errors surface only through
/// [`finalize`](Self::finalize). A failed deferred that is dropped without
/// being finalized is dropped silently.
#[derive(Debug)]
pub struct Deferred<T> {
    current: Result<T, Failure>,
}

impl<T> Deferred<T> {
    pub const fn new(result: Result<T, Failure>) -> Self {
        Self { current: result }
    }

    pub const fn succeed(value: T) -> Self {
        Self::new(Ok(value))
    }

    pub const fn fail(failure: Failure) -> Self {
        Self::new(Err(failure))
    }

    /// Runs `f` now and wraps its outcome, capturing an error or a panic the
    /// same way a chained handler would.
    #[track_caller]
    pub fn execute<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<BoxError>,
    {
        Self::new(run_handler(Location::caller(), f))
    }

    /// Returns the value or raises the captured failure.
    ///
    /// Meant to be called once, at the top of an API, where every operation
    /// below is known to have completed synchronously.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn finalize(self) -> Result<T, Failure> {
        match self.current {
            Ok(value) => Ok(value),
            Err(failure) => failure.raise_exception(),
        }
    }

    pub fn result(&self) -> Result<&T, &Failure> {
        self.current.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.current.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.current.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.current.is_err()
    }

    /// Calls `callback` with the current value unless the current result is a failure.
    #[track_caller]
    pub fn on_success<F, E>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(T) -> Result<T, E>,
        E: Into<BoxError>,
    {
        if self.is_success() {
            self.call_callback(|current| -> Result<T, BoxError> {
                callback(current?).map_err(Into::into)
            });
        }

        self
    }

    #[track_caller]
    pub fn on_success_with<F, A, E>(&mut self, callback: F, args: A) -> &mut Self
    where
        F: FnOnce(T, A) -> Result<T, E>,
        E: Into<BoxError>,
    {
        self.on_success(move |value| callback(value, args))
    }

    /// Calls `errback` with the current failure if there is one.
    #[track_caller]
    pub fn on_failure<F, E>(&mut self, errback: F) -> &mut Self
    where
        F: FnOnce(Failure) -> Result<T, E>,
        E: Into<BoxError>,
    {
        if self.is_failure() {
            self.call_callback(|current| -> Result<T, BoxError> {
                match current {
                    Ok(value) => Ok(value),
                    Err(failure) => errback(failure).map_err(Into::into),
                }
            });
        }

        self
    }

    #[track_caller]
    pub fn on_failure_with<F, A, E>(&mut self, errback: F, args: A) -> &mut Self
    where
        F: FnOnce(Failure, A) -> Result<T, E>,
        E: Into<BoxError>,
    {
        self.on_failure(move |failure| errback(failure, args))
    }

    /// Calls exactly one of `callback` or `errback`, depending on the current result.
    ///
    /// If `callback` fails, `errback` is not called.
    #[track_caller]
    pub fn on_either<C, EC, F, EF>(&mut self, callback: C, errback: F) -> &mut Self
    where
        C: FnOnce(T) -> Result<T, EC>,
        EC: Into<BoxError>,
        F: FnOnce(Failure) -> Result<T, EF>,
        EF: Into<BoxError>,
    {
        self.call_callback(|current| -> Result<T, BoxError> {
            match current {
                Ok(value) => callback(value).map_err(Into::into),
                Err(failure) => errback(failure).map_err(Into::into),
            }
        });

        self
    }

    #[track_caller]
    pub fn on_either_with<C, CA, EC, F, FA, EF>(
        &mut self,
        callback: C,
        errback: F,
        callback_args: CA,
        errback_args: FA,
    ) -> &mut Self
    where
        C: FnOnce(T, CA) -> Result<T, EC>,
        EC: Into<BoxError>,
        F: FnOnce(Failure, FA) -> Result<T, EF>,
        EF: Into<BoxError>,
    {
        self.on_either(
            move |value| callback(value, callback_args),
            move |failure| errback(failure, errback_args),
        )
    }

    /// Calls `handler` with the current result, success or failure.
    #[track_caller]
    pub fn on_both<F, E>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Result<T, Failure>) -> Result<T, E>,
        E: Into<BoxError>,
    {
        self.call_callback(handler);

        self
    }

    #[track_caller]
    pub fn on_both_with<F, A, E>(&mut self, handler: F, args: A) -> &mut Self
    where
        F: FnOnce(Result<T, Failure>, A) -> Result<T, E>,
        E: Into<BoxError>,
    {
        self.on_both(move |current| handler(current, args))
    }

    /// Replaces the current result with whatever `handler` makes of it.
    #[track_caller]
    fn call_callback<F, E>(&mut self, handler: F)
    where
        F: FnOnce(Result<T, Failure>) -> Result<T, E>,
        E: Into<BoxError>,
    {
        let location = Location::caller();

        let current = mem::replace(&mut self.current, Err(Failure::new(ResultInUse)));

        self.current = run_handler(location, move || handler(current));
    }
}

fn run_handler<T, F, E>(location: &'static Location<'static>, handler: F) -> Result<T, Failure>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(value)) => {
            tracing::trace!(%location, "Handler returned a value");

            Ok(value)
        }
        Ok(Err(err)) => {
            tracing::trace!(%location, "Handler failed, result is now a failure");

            Err(Failure::raised(err.into(), location))
        }
        Err(payload) => {
            tracing::trace!(%location, "Handler panicked, result is now a failure");

            Err(Failure::panicked(payload, location))
        }
    }
}

impl<T> From<Failure> for Deferred<T> {
    fn from(failure: Failure) -> Self {
        Self::fail(failure)
    }
}

/// Resolves immediately to [`Deferred::finalize`].
impl<T> IntoFuture for Deferred<T> {
    type Output = Result<T, Failure>;

    type IntoFuture = Ready<Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.finalize())
    }
}
