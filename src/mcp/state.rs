//! MCP session lifecycle
//!
//! A client must send `initialize`, then the `notifications/initialized`
//! notification, before tools may be listed or called. Closing the
//! transport ends the session.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    /// Waiting for `initialize`
    Uninitialized,
    /// `initialize` answered, waiting for `notifications/initialized`
    Initializing,
    Ready,
    /// Transport closed after a completed handshake
    ShuttingDown,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::ShuttingDown => "shutting down",
        }
    }

    /// The only state reachable from `self`, if any
    fn successor(self) -> Option<SessionState> {
        match self {
            SessionState::Uninitialized => Some(SessionState::Initializing),
            SessionState::Initializing => Some(SessionState::Ready),
            SessionState::Ready => Some(SessionState::ShuttingDown),
            SessionState::ShuttingDown => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum SessionError {
    #[error("cannot move session from {from} to {to}")]
    OutOfOrder { from: SessionState, to: SessionState },

    #[error("session not initialized (state: {0})")]
    NotReady(SessionState),
}

/// Lifecycle of one client connection
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    pub fn current(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Step forward to `to`; the lifecycle never skips or rewinds
    pub fn advance(&self, to: SessionState) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;

        if from.successor() != Some(to) {
            return Err(SessionError::OutOfOrder { from, to });
        }

        *state = to;
        tracing::debug!(from = %from, to = %to, "MCP session state changed");
        Ok(())
    }

    pub fn require_ready(&self) -> Result<(), SessionError> {
        match self.current() {
            SessionState::Ready => Ok(()),
            other => Err(SessionError::NotReady(other)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.current() == SessionState::Ready
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let session = Session::new();
        assert_eq!(session.current(), SessionState::Uninitialized);

        for next in [
            SessionState::Initializing,
            SessionState::Ready,
            SessionState::ShuttingDown,
        ] {
            session.advance(next).unwrap();
            assert_eq!(session.current(), next);
        }

        assert!(session.advance(SessionState::Ready).is_err());
    }

    #[test]
    fn test_no_skipping_or_rewinding() {
        let session = Session::new();
        assert!(matches!(
            session.advance(SessionState::Ready),
            Err(SessionError::OutOfOrder {
                from: SessionState::Uninitialized,
                to: SessionState::Ready
            })
        ));

        session.advance(SessionState::Initializing).unwrap();
        assert!(session.advance(SessionState::Uninitialized).is_err());
        assert!(session.advance(SessionState::Initializing).is_err());
    }

    #[test]
    fn test_require_ready() {
        let session = Session::new();
        assert!(session.require_ready().is_err());

        session.advance(SessionState::Initializing).unwrap();
        assert!(matches!(
            session.require_ready(),
            Err(SessionError::NotReady(SessionState::Initializing))
        ));

        session.advance(SessionState::Ready).unwrap();
        assert!(session.require_ready().is_ok());
        assert!(session.is_ready());
    }
}
