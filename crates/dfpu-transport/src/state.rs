use std::sync::atomic::{AtomicU8, Ordering};

/// Whether the transport currently has a usable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Atomically observed [`ConnectionState`].
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

const DISCONNECTED: u8 = 0;
const CONNECTED: u8 = 1;

impl SharedState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(DISCONNECTED))
    }

    pub(crate) fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::Acquire) {
            CONNECTED => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Store `state` and return the previous one.
    pub(crate) fn swap(&self, state: ConnectionState) -> ConnectionState {
        let raw = match state {
            ConnectionState::Connected => CONNECTED,
            ConnectionState::Disconnected => DISCONNECTED,
        };
        match self.0.swap(raw, Ordering::AcqRel) {
            CONNECTED => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_and_swaps() {
        let state = SharedState::new();
        assert_eq!(state.load(), ConnectionState::Disconnected);
        assert_eq!(
            state.swap(ConnectionState::Connected),
            ConnectionState::Disconnected
        );
        assert_eq!(state.load(), ConnectionState::Connected);
        assert_eq!(
            state.swap(ConnectionState::Disconnected),
            ConnectionState::Connected
        );
    }
}
