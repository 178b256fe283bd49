mod chain;

pub use chain::Deferred;
