/// Watch Registry
///
/// Bookkeeping for which session watches what, at the bridge's two
/// granularities: the room list (filtered by the session's identity and
/// the room visibility rule) and individual open rooms. Plain state so
/// teardown behavior is testable without actors.
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::modules::room::schema::{ParticipantRole, RoomEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watcher {
    pub participant_id: Uuid,
    pub role: ParticipantRole,
}

#[derive(Default)]
pub struct WatchRegistry {
    /// session_id -> declared identity
    identities: HashMap<Uuid, Watcher>,

    /// sessions watching their room list
    list_watchers: HashSet<Uuid>,

    /// room_id -> sessions with that room open
    room_watchers: HashMap<Uuid, HashSet<Uuid>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identify(&mut self, session_id: Uuid, watcher: Watcher) {
        self.identities.insert(session_id, watcher);
    }

    pub fn identity(&self, session_id: &Uuid) -> Option<&Watcher> {
        self.identities.get(session_id)
    }

    /// Returns false when the session never declared an identity.
    pub fn watch_rooms(&mut self, session_id: Uuid) -> bool {
        if !self.identities.contains_key(&session_id) {
            return false;
        }
        self.list_watchers.insert(session_id);
        true
    }

    pub fn unwatch_rooms(&mut self, session_id: &Uuid) {
        self.list_watchers.remove(session_id);
    }

    pub fn watch_room(&mut self, session_id: Uuid, room_id: Uuid) -> bool {
        if !self.identities.contains_key(&session_id) {
            return false;
        }
        self.room_watchers.entry(room_id).or_default().insert(session_id);
        true
    }

    pub fn unwatch_room(&mut self, session_id: &Uuid, room_id: &Uuid) {
        if let Some(watchers) = self.room_watchers.get_mut(room_id) {
            watchers.remove(session_id);
            if watchers.is_empty() {
                self.room_watchers.remove(room_id);
            }
        }
    }

    /// Full teardown on disconnect: after this returns, no lookup yields
    /// the session, so no further event can be routed to it.
    pub fn remove_session(&mut self, session_id: &Uuid) {
        self.identities.remove(session_id);
        self.list_watchers.remove(session_id);
        for watchers in self.room_watchers.values_mut() {
            watchers.remove(session_id);
        }
        self.room_watchers.retain(|_, watchers| !watchers.is_empty());
    }

    /// Sessions with this room open.
    pub fn room_sessions(&self, room_id: &Uuid) -> Vec<Uuid> {
        self.room_watchers.get(room_id).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    /// List-watching sessions whose identity may see the room.
    pub fn list_sessions_for(&self, room: &RoomEntity) -> Vec<Uuid> {
        self.list_watchers
            .iter()
            .filter(|session_id| {
                self.identities
                    .get(*session_id)
                    .is_some_and(|w| room.visible_to(&w.participant_id, &w.role))
            })
            .copied()
            .collect()
    }

    /// List-watching sessions belonging to one participant (multi-device).
    pub fn list_sessions_of(&self, participant_id: &Uuid) -> Vec<Uuid> {
        self.list_watchers
            .iter()
            .filter(|session_id| {
                self.identities
                    .get(*session_id)
                    .is_some_and(|w| w.participant_id == *participant_id)
            })
            .copied()
            .collect()
    }

    /// Every identified session of one participant, watching or not.
    /// Notifications are delivered here regardless of open views.
    pub fn sessions_of(&self, participant_id: &Uuid) -> Vec<Uuid> {
        self.identities
            .iter()
            .filter(|(_, w)| w.participant_id == *participant_id)
            .map(|(session_id, _)| *session_id)
            .collect()
    }

    /// Number of live watch registrations across both granularities.
    pub fn open_watch_count(&self) -> usize {
        self.list_watchers.len()
            + self.room_watchers.values().map(HashSet::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::room::schema::RoomType;

    fn watcher(role: ParticipantRole) -> Watcher {
        Watcher { participant_id: Uuid::now_v7(), role }
    }

    fn room_for_customer(customer_id: Uuid) -> RoomEntity {
        RoomEntity {
            id: Uuid::now_v7(),
            _type: RoomType::Direct,
            customer_id,
            teknisi_id: None,
            admin_id: None,
            order_id: None,
            booking_id: None,
            name: None,
            last_message: None,
            last_message_at: None,
            last_sender_name: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_watch_requires_identity() {
        let mut registry = WatchRegistry::new();
        let session = Uuid::now_v7();

        assert!(!registry.watch_rooms(session));
        assert!(!registry.watch_room(session, Uuid::now_v7()));
        assert_eq!(registry.open_watch_count(), 0);

        registry.identify(session, watcher(ParticipantRole::Customer));
        assert!(registry.watch_rooms(session));
        assert_eq!(registry.open_watch_count(), 1);
    }

    #[test]
    fn test_open_close_cycles_leave_no_leaked_watches() {
        let mut registry = WatchRegistry::new();
        let session = Uuid::now_v7();
        let room_id = Uuid::now_v7();
        registry.identify(session, watcher(ParticipantRole::Customer));

        for _ in 0..10 {
            assert!(registry.watch_room(session, room_id));
            registry.unwatch_room(&session, &room_id);
        }
        assert_eq!(registry.open_watch_count(), 0);
        assert!(registry.room_sessions(&room_id).is_empty());

        // a still-open view keeps exactly one registration
        registry.watch_room(session, room_id);
        assert_eq!(registry.open_watch_count(), 1);
    }

    #[test]
    fn test_no_routing_after_unwatch() {
        let mut registry = WatchRegistry::new();
        let session = Uuid::now_v7();
        let room_id = Uuid::now_v7();
        registry.identify(session, watcher(ParticipantRole::Admin));
        registry.watch_room(session, room_id);
        assert_eq!(registry.room_sessions(&room_id), vec![session]);

        registry.unwatch_room(&session, &room_id);
        assert!(registry.room_sessions(&room_id).is_empty());
    }

    #[test]
    fn test_disconnect_tears_down_everything() {
        let mut registry = WatchRegistry::new();
        let session = Uuid::now_v7();
        let w = watcher(ParticipantRole::Teknisi);
        registry.identify(session, w);
        registry.watch_rooms(session);
        registry.watch_room(session, Uuid::now_v7());
        registry.watch_room(session, Uuid::now_v7());

        registry.remove_session(&session);
        assert_eq!(registry.open_watch_count(), 0);
        assert!(registry.identity(&session).is_none());
        assert!(registry.sessions_of(&w.participant_id).is_empty());
    }

    #[test]
    fn test_list_routing_respects_visibility() {
        let mut registry = WatchRegistry::new();

        let owner = watcher(ParticipantRole::Customer);
        let other = watcher(ParticipantRole::Customer);
        let owner_session = Uuid::now_v7();
        let other_session = Uuid::now_v7();
        registry.identify(owner_session, owner);
        registry.identify(other_session, other);
        registry.watch_rooms(owner_session);
        registry.watch_rooms(other_session);

        let room = room_for_customer(owner.participant_id);
        assert_eq!(registry.list_sessions_for(&room), vec![owner_session]);
    }

    #[test]
    fn test_multi_device_sessions_of() {
        let mut registry = WatchRegistry::new();
        let w = watcher(ParticipantRole::Customer);
        let phone = Uuid::now_v7();
        let laptop = Uuid::now_v7();
        registry.identify(phone, w);
        registry.identify(laptop, w);
        registry.watch_rooms(phone);

        let mut all = registry.sessions_of(&w.participant_id);
        all.sort();
        let mut expected = vec![phone, laptop];
        expected.sort();
        assert_eq!(all, expected);

        assert_eq!(registry.list_sessions_of(&w.participant_id), vec![phone]);
    }
}
