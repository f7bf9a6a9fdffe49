//! Ordered collection of tracker sessions with an active index.

use crate::error::{CommandError, Result};
use crate::session::tracker_session::TrackerSession;

/// Sessions indexed by position, plus the index commands target by default.
///
/// The active index is always a valid position, or 0 when the registry is
/// empty.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<TrackerSession>,
    active: usize,
}

impl SessionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully constructed session and make it active.
    pub fn create(&mut self, session: TrackerSession) -> usize {
        self.sessions.push(session);
        self.active = self.sessions.len() - 1;
        self.active
    }

    /// Fail with an index error unless `index` names a session.
    pub fn check(&self, index: usize) -> Result<()> {
        if index >= self.sessions.len() {
            return Err(CommandError::Index {
                index,
                count: self.sessions.len(),
            });
        }
        Ok(())
    }

    /// The session at `index`.
    pub fn get(&self, index: usize) -> Result<&TrackerSession> {
        self.check(index)?;
        Ok(&self.sessions[index])
    }

    /// Mutable access to the session at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut TrackerSession> {
        self.check(index)?;
        Ok(&mut self.sessions[index])
    }

    /// Remove the session at `index`; later sessions shift down by one.
    ///
    /// The active index moves to the new last session, or 0 when empty.
    pub fn remove(&mut self, index: usize) -> Result<TrackerSession> {
        self.check(index)?;
        let session = self.sessions.remove(index);
        self.active = self.sessions.len().saturating_sub(1);
        Ok(session)
    }

    /// Make `index` the active session.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.active = index;
        Ok(())
    }

    /// Index targeted by calls that name no session.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// `true` when no session exists.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions in index order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackerSession> {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::engine::BuiltinFactory;

    fn session(tracker: &str) -> TrackerSession {
        let config = SessionConfig {
            tracker: tracker.to_string(),
            ..SessionConfig::default()
        };
        TrackerSession::create(&BuiltinFactory, config).unwrap()
    }

    #[test]
    fn test_create_assigns_sequential_indices() {
        let mut registry = SessionRegistry::new();
        for expected in 0..4 {
            assert_eq!(registry.create(session("static")), expected);
            assert_eq!(registry.active(), expected);
        }
        assert_eq!(registry.count(), 4);
    }

    #[test]
    fn test_remove_shifts_later_sessions() {
        let mut registry = SessionRegistry::new();
        registry.create(session("static"));
        registry.create(session("template"));
        registry.create(session("static"));

        let removed = registry.remove(0).unwrap();
        assert_eq!(removed.engine_name(), "static");
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.get(0).unwrap().engine_name(), "template");
        assert_eq!(registry.active(), 1);
    }

    #[test]
    fn test_remove_last_resets_active() {
        let mut registry = SessionRegistry::new();
        registry.create(session("static"));
        registry.remove(0).unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut registry = SessionRegistry::new();
        assert!(matches!(
            registry.remove(0),
            Err(CommandError::Index { index: 0, count: 0 })
        ));

        registry.create(session("static"));
        assert!(matches!(
            registry.get(1),
            Err(CommandError::Index { index: 1, count: 1 })
        ));
        assert!(registry.select(1).is_err());
        assert_eq!(registry.active(), 0);
    }
}
