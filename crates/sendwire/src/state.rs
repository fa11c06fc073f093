//! Shared application state.

use sendwire_core::Dispatcher;
use sendwire_smtp::RustlsConnector;

/// State shared by every request.
#[derive(Debug)]
pub struct AppState<S, L, C = RustlsConnector> {
    /// Runs each send and records its outcome.
    pub dispatcher: Dispatcher<S, L, C>,
}

impl<S, L, C> AppState<S, L, C> {
    /// Creates the state.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher<S, L, C>) -> Self {
        Self { dispatcher }
    }
}
