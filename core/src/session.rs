use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::transport::UserId;

/// Position of a user in the selection/submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No voice selected, catalog not shown yet.
    #[default]
    Idle,
    /// Catalog shown, waiting for a pick.
    SelectingVoice,
    /// A voice is selected; free text triggers synthesis.
    Ready,
}

/// Per-user dialog state
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    /// Weak reference into the voice catalog, re-resolved on use.
    pub selected_voice_id: Option<String>,
    pub phase: Phase,
    pub last_seen: DateTime<Utc>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            selected_voice_id: None,
            phase: Phase::Idle,
            last_seen: Utc::now(),
        }
    }
}

impl ConversationState {
    pub fn reset(&mut self) {
        self.selected_voice_id = None;
        self.phase = Phase::Idle;
    }

    pub fn select_voice(&mut self, voice_id: impl Into<String>) {
        self.selected_voice_id = Some(voice_id.into());
        self.phase = Phase::Ready;
    }

    pub fn has_voice(&self) -> bool {
        self.selected_voice_id.is_some()
    }
}

/// Narrow store interface so the dialog never touches the map directly.
pub trait SessionStore: Send + Sync {
    /// Current state for the user; the default state when none exists.
    fn get(&self, user_id: UserId) -> ConversationState;

    /// Create-or-update in place and return the resulting state.
    fn upsert(
        &self,
        user_id: UserId,
        apply: &mut dyn FnMut(&mut ConversationState),
    ) -> ConversationState;

    fn contains(&self, user_id: UserId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions not seen for longer than `max_idle`. Returns how many were dropped.
    fn evict_idle(&self, max_idle: Duration) -> usize;
}

/// Process-lifetime in-memory store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<UserId, ConversationState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: UserId) -> ConversationState {
        self.sessions
            .get(&user_id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn upsert(
        &self,
        user_id: UserId,
        apply: &mut dyn FnMut(&mut ConversationState),
    ) -> ConversationState {
        let mut entry = self.sessions.entry(user_id).or_default();
        apply(entry.value_mut());
        entry.last_seen = Utc::now();
        entry.value().clone()
    }

    fn contains(&self, user_id: UserId) -> bool {
        self.sessions.contains_key(&user_id)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        // A window reaching past the representable past evicts nothing.
        let Some(cutoff) = Utc::now().checked_sub_signed(max_idle) else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_seen >= cutoff);
        before.saturating_sub(self.sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_user_reads_as_idle() {
        let store = InMemorySessionStore::new();
        let s = store.get(7);
        assert_eq!(s.phase, Phase::Idle);
        assert!(s.selected_voice_id.is_none());
        assert!(!store.contains(7));
    }

    #[test]
    fn upsert_creates_and_mutates() {
        let store = InMemorySessionStore::new();
        let s = store.upsert(1, &mut |s| s.select_voice("abc"));
        assert_eq!(s.phase, Phase::Ready);
        assert_eq!(store.get(1).selected_voice_id.as_deref(), Some("abc"));

        store.upsert(1, &mut |s| s.reset());
        assert!(!store.get(1).has_voice());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evict_idle_drops_stale_entries() {
        let store = InMemorySessionStore::new();
        store.upsert(1, &mut |_| {});
        store.upsert(2, &mut |_| {});
        // Age one entry by hand
        if let Some(mut s) = store.sessions.get_mut(&1) {
            s.last_seen = Utc::now() - Duration::hours(2);
        }

        let evicted = store.evict_idle(Duration::hours(1));
        assert_eq!(evicted, 1);
        assert!(!store.contains(1));
        assert!(store.contains(2));
    }

    #[test]
    fn evict_idle_with_huge_window_keeps_everything() {
        let store = InMemorySessionStore::new();
        store.upsert(1, &mut |_| {});
        if let Some(mut s) = store.sessions.get_mut(&1) {
            s.last_seen = Utc::now() - Duration::days(3650);
        }

        assert_eq!(store.evict_idle(Duration::days(1_000_000_000)), 0);
        assert!(store.contains(1));
    }
}
