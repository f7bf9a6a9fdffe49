/// Lifecycle state of a tracker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Engine instantiated, no target yet
    #[default]
    Created,
    /// Target region established, ready to track
    Initialized,
}

impl SessionState {
    #[inline]
    pub fn is_initialized(self) -> bool {
        self == SessionState::Initialized
    }
}
