use std::{
    any::{type_name, TypeId},
    error::Error,
    fmt,
};

type Matcher = fn(&(dyn Error + 'static)) -> bool;

#[derive(Clone, Copy)]
enum Identity {
    Exact(TypeId),
    CausedBy(TypeId),
    Predicate,
}

/// A kind of error a [`Failure`](super::Failure) can be checked against.
///
/// Several kinds may match the same error. [`Failure::check`](super::Failure::check)
/// and [`Failure::trap`](super::Failure::trap) return the first one in the order given.
#[derive(Clone, Copy)]
pub struct ErrorKind {
    name: &'static str,
    identity: Identity,
    matcher: Matcher,
}

impl ErrorKind {
    /// Matches when the error is exactly an `E`.
    pub fn of<E>() -> Self
    where
        E: Error + 'static,
    {
        Self {
            name: type_name::<E>(),
            identity: Identity::Exact(TypeId::of::<E>()),
            matcher: is::<E>,
        }
    }

    /// Matches when an `E` is the error itself or anywhere in its `source()` chain.
    pub fn caused_by<E>() -> Self
    where
        E: Error + 'static,
    {
        Self {
            name: type_name::<E>(),
            identity: Identity::CausedBy(TypeId::of::<E>()),
            matcher: caused_by::<E>,
        }
    }

    /// Matches with an arbitrary predicate. Predicate kinds are equal when their names are.
    pub const fn new(name: &'static str, matcher: Matcher) -> Self {
        Self {
            name,
            identity: Identity::Predicate,
            matcher,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        (self.matcher)(err)
    }
}

fn is<E>(err: &(dyn Error + 'static)) -> bool
where
    E: Error + 'static,
{
    err.is::<E>()
}

fn caused_by<E>(err: &(dyn Error + 'static)) -> bool
where
    E: Error + 'static,
{
    let mut current = Some(err);

    while let Some(err) = current {
        if err.is::<E>() {
            return true;
        }

        current = err.source();
    }

    false
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self.identity, other.identity) {
            (Identity::Exact(left), Identity::Exact(right)) => left == right,
            (Identity::CausedBy(left), Identity::CausedBy(right)) => left == right,
            (Identity::Predicate, Identity::Predicate) => self.name == other.name,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = match self.identity {
            Identity::Exact(_) => "of",
            Identity::CausedBy(_) => "caused_by",
            Identity::Predicate => "predicate",
        };

        write!(f, "ErrorKind::{identity}({})", self.name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
