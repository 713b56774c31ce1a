//! Optimistic-send reconciliation.
//!
//! On send, the UI inserts a pending entry keyed by a locally generated
//! `client_message_id`. Any later arrival of the same message — the
//! socket echo, an HTTP fallback response, or a history refetch — is
//! merged by [`ConversationView::apply`]:
//!
//! 1. matching `client_message_id` pending → replaced in place, position
//!    preserved;
//! 2. matching canonical id already shown → discarded (idempotent under
//!    at-least-once delivery);
//! 3. otherwise inserted in (created_at, id) order.
//!
//! A send timeout leaves the pending entry alone: a late echo must still
//! reconcile. Only a confirmed server rejection calls
//! [`ConversationView::roll_back`].

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tracing::debug;

use crewchat_core::types::MessageId;
use crewchat_entity::message::{DirectMessage, GroupMessage};

/// Default cap on the canonical-id dedup index.
const DEFAULT_ID_CAPACITY: usize = 1024;

/// A message shape the reconciliation layer can merge. Both direct and
/// group messages qualify.
pub trait ChatRecord {
    /// Canonical server-assigned id.
    fn id(&self) -> MessageId;
    /// Correlation token from the sending client, if any.
    fn client_message_id(&self) -> Option<&str>;
    /// Server persistence timestamp.
    fn created_at(&self) -> DateTime<Utc>;
}

impl ChatRecord for DirectMessage {
    fn id(&self) -> MessageId {
        self.id
    }
    fn client_message_id(&self) -> Option<&str> {
        self.client_message_id.as_deref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChatRecord for GroupMessage {
    fn id(&self) -> MessageId {
        self.id
    }
    fn client_message_id(&self) -> Option<&str> {
        self.client_message_id.as_deref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// An optimistic entry awaiting its canonical echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Locally generated correlation token.
    pub client_message_id: String,
    /// Text as the user typed it (already trimmed).
    pub body: String,
    /// Local clock when the send was queued.
    pub queued_at: DateTime<Utc>,
}

/// One display slot in the conversation.
#[derive(Debug, Clone)]
pub enum Slot<M> {
    /// Optimistic local entry, not yet confirmed.
    Pending(PendingMessage),
    /// Canonical server record.
    Confirmed(M),
}

impl<M> Slot<M> {
    /// Whether this slot is still awaiting confirmation.
    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending(_))
    }
}

/// Outcome of applying one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A pending entry was replaced in place.
    ReplacedPending,
    /// The canonical id was already present; the arrival was dropped.
    Duplicate,
    /// A new confirmed entry was inserted in timestamp order.
    Inserted,
}

/// Ordered view of one conversation, merging optimistic sends with
/// canonical messages.
///
/// Lookups go through two position indexes kept in sync with `entries`:
/// `pending_index` maps each outstanding `client_message_id` to its slot,
/// `confirmed_index` maps canonical ids to slots and doubles as the
/// duplicate filter. Both are bounded: pending entries are removed on
/// echo or roll-back, confirmed ids are evicted oldest-first past
/// `id_capacity`.
#[derive(Debug)]
pub struct ConversationView<M> {
    entries: Vec<Slot<M>>,
    /// client_message_id → slot position of the awaiting pending entry.
    pending_index: HashMap<String, usize>,
    /// Canonical id → slot position, capped at `id_capacity`.
    confirmed_index: HashMap<MessageId, usize>,
    /// Insertion order of `confirmed_index`, for bounded eviction.
    seen_order: VecDeque<MessageId>,
    id_capacity: usize,
}

impl<M: ChatRecord> ConversationView<M> {
    /// Creates an empty view with the default dedup-index capacity.
    pub fn new() -> Self {
        Self::with_id_capacity(DEFAULT_ID_CAPACITY)
    }

    /// Creates an empty view with an explicit dedup-index capacity.
    /// Ids older than the cap are evicted; a re-delivery that old would
    /// duplicate, which in practice history refetch resolves.
    pub fn with_id_capacity(id_capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            pending_index: HashMap::new(),
            confirmed_index: HashMap::new(),
            seen_order: VecDeque::new(),
            id_capacity: id_capacity.max(1),
        }
    }

    /// Inserts an optimistic pending entry at the end of the view.
    /// The `client_message_id` must be fresh per send.
    pub fn record_pending(&mut self, client_message_id: impl Into<String>, body: impl Into<String>) {
        let token = client_message_id.into();
        self.entries.push(Slot::Pending(PendingMessage {
            client_message_id: token.clone(),
            body: body.into(),
            queued_at: Utc::now(),
        }));
        self.pending_index.insert(token, self.entries.len() - 1);
    }

    /// Merges one incoming canonical message.
    pub fn apply(&mut self, incoming: M) -> Applied {
        if let Some(token) = incoming.client_message_id() {
            if let Some(pos) = self.pending_index.remove(token) {
                self.remember(incoming.id(), pos);
                self.entries[pos] = Slot::Confirmed(incoming);
                return Applied::ReplacedPending;
            }
        }

        if self.confirmed_index.contains_key(&incoming.id()) {
            debug!(message_id = %incoming.id(), "Dropping duplicate delivery");
            return Applied::Duplicate;
        }

        // Ordered insertion point; the indexes cannot answer an order
        // query, so this walks the display list. Pending slots never
        // block an insert.
        let key = (incoming.created_at(), incoming.id());
        let pos = self
            .entries
            .iter()
            .position(|slot| match slot {
                Slot::Confirmed(m) => (m.created_at(), m.id()) > key,
                Slot::Pending(_) => false,
            })
            .unwrap_or(self.entries.len());
        self.shift_up(pos);
        self.remember(incoming.id(), pos);
        self.entries.insert(pos, Slot::Confirmed(incoming));
        Applied::Inserted
    }

    /// Drops a pending entry after a confirmed server rejection. Returns
    /// the dropped entry, or `None` when no pending entry matches (the
    /// echo may have won the race).
    pub fn roll_back(&mut self, client_message_id: &str) -> Option<PendingMessage> {
        let pos = self.pending_index.remove(client_message_id)?;
        let slot = self.entries.remove(pos);
        self.shift_down(pos);
        match slot {
            Slot::Pending(pending) => Some(pending),
            Slot::Confirmed(_) => unreachable!("pending_index only maps pending slots"),
        }
    }

    /// All slots in display order.
    pub fn slots(&self) -> &[Slot<M>] {
        &self.entries
    }

    /// Confirmed messages in display order.
    pub fn confirmed(&self) -> impl Iterator<Item = &M> {
        self.entries.iter().filter_map(|slot| match slot {
            Slot::Confirmed(m) => Some(m),
            Slot::Pending(_) => None,
        })
    }

    /// Number of slots still awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending_index.len()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a canonical id at a slot position, evicting the oldest
    /// ids once the index exceeds its capacity.
    fn remember(&mut self, id: MessageId, pos: usize) {
        if self.confirmed_index.insert(id, pos).is_none() {
            self.seen_order.push_back(id);
            while self.seen_order.len() > self.id_capacity {
                if let Some(evicted) = self.seen_order.pop_front() {
                    self.confirmed_index.remove(&evicted);
                }
            }
        }
    }

    /// Bumps every indexed position at or after an insertion point.
    fn shift_up(&mut self, from: usize) {
        for pos in self.pending_index.values_mut() {
            if *pos >= from {
                *pos += 1;
            }
        }
        for pos in self.confirmed_index.values_mut() {
            if *pos >= from {
                *pos += 1;
            }
        }
    }

    /// Pulls back every indexed position after a removal point.
    fn shift_down(&mut self, removed: usize) {
        for pos in self.pending_index.values_mut() {
            if *pos > removed {
                *pos -= 1;
            }
        }
        for pos in self.confirmed_index.values_mut() {
            if *pos > removed {
                *pos -= 1;
            }
        }
    }
}

impl<M: ChatRecord> Default for ConversationView<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewchat_core::types::UserId;

    fn msg(from: UserId, to: UserId, body: &str, token: Option<&str>) -> DirectMessage {
        DirectMessage {
            id: MessageId::new(),
            from_user_id: from,
            to_user_id: to,
            body: body.to_string(),
            client_message_id: token.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn echo_replaces_pending_in_place() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        view.apply(msg(peer, me, "hi", None));
        view.record_pending("c1", "hello");
        view.apply(msg(peer, me, "how are you", None));

        let echo = msg(me, peer, "hello", Some("c1"));
        assert_eq!(view.apply(echo.clone()), Applied::ReplacedPending);
        assert_eq!(view.pending_count(), 0);

        // Position 1 is preserved even though later messages arrived.
        match &view.slots()[1] {
            Slot::Confirmed(m) => assert_eq!(m.id, echo.id),
            other => panic!("expected confirmed slot, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_delivery_is_idempotent() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        let m = msg(peer, me, "once", None);
        assert_eq!(view.apply(m.clone()), Applied::Inserted);
        assert_eq!(view.apply(m.clone()), Applied::Duplicate);
        assert_eq!(view.apply(m), Applied::Duplicate);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn echo_after_pending_replacement_is_still_duplicate() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        view.record_pending("c1", "hello");
        let echo = msg(me, peer, "hello", Some("c1"));
        assert_eq!(view.apply(echo.clone()), Applied::ReplacedPending);
        // Second delivery of the same canonical record (e.g. the HTTP
        // fallback response racing the socket echo).
        assert_eq!(view.apply(echo), Applied::Duplicate);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn late_echo_after_client_timeout_still_reconciles() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        view.record_pending("c9", "slow one");
        // Client-side timeout fired; the UI shows an error but keeps the
        // pending entry, so the late echo replaces rather than duplicates.
        assert_eq!(view.pending_count(), 1);

        assert_eq!(
            view.apply(msg(me, peer, "slow one", Some("c9"))),
            Applied::ReplacedPending
        );
        assert_eq!(view.pending_count(), 0);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn roll_back_removes_pending_only_once() {
        let mut view: ConversationView<DirectMessage> = ConversationView::new();

        view.record_pending("c2", "rejected");
        let dropped = view.roll_back("c2").expect("pending existed");
        assert_eq!(dropped.body, "rejected");
        assert!(view.roll_back("c2").is_none());
        assert!(view.is_empty());
    }

    #[test]
    fn history_merge_keeps_timestamp_order() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        let older = DirectMessage {
            created_at: Utc::now() - chrono::Duration::minutes(5),
            ..msg(peer, me, "older", None)
        };
        let newer = msg(peer, me, "newer", None);

        view.apply(newer.clone());
        // History refetch delivers the older message afterwards.
        view.apply(older.clone());

        let bodies: Vec<_> = view.confirmed().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["older", "newer"]);
    }

    #[test]
    fn seen_id_index_stays_bounded() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::with_id_capacity(4);

        for i in 0..20 {
            view.apply(msg(peer, me, &format!("m{i}"), None));
        }
        assert_eq!(view.len(), 20, "entries themselves are not evicted");
        assert!(view.confirmed_index.len() <= 4);
        assert_eq!(view.confirmed_index.len(), view.seen_order.len());
    }

    #[test]
    fn pending_index_follows_roll_back_shifts() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        view.record_pending("c1", "first");
        view.record_pending("c2", "second");
        // Rejecting the first send shifts the second pending slot left.
        assert!(view.roll_back("c1").is_some());

        let echo = msg(me, peer, "second", Some("c2"));
        assert_eq!(view.apply(echo.clone()), Applied::ReplacedPending);
        assert_eq!(view.pending_count(), 0);
        match &view.slots()[0] {
            Slot::Confirmed(m) => assert_eq!(m.id, echo.id),
            other => panic!("expected confirmed slot, got {other:?}"),
        }
    }

    #[test]
    fn pending_index_follows_history_insert_shifts() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        let old = DirectMessage {
            created_at: Utc::now() - chrono::Duration::minutes(10),
            ..msg(peer, me, "old", None)
        };
        let older = DirectMessage {
            created_at: Utc::now() - chrono::Duration::minutes(20),
            ..msg(peer, me, "older", None)
        };

        view.apply(old.clone());
        view.record_pending("c3", "typed just now");
        // History refetch inserts before both the confirmed entry and
        // the pending slot.
        assert_eq!(view.apply(older), Applied::Inserted);

        let echo = msg(me, peer, "typed just now", Some("c3"));
        assert_eq!(view.apply(echo.clone()), Applied::ReplacedPending);
        match &view.slots()[2] {
            Slot::Confirmed(m) => assert_eq!(m.id, echo.id),
            other => panic!("expected confirmed slot, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_detection_survives_out_of_order_inserts() {
        let me = UserId::new();
        let peer = UserId::new();
        let mut view = ConversationView::new();

        let newer = msg(peer, me, "newer", None);
        let older = DirectMessage {
            created_at: Utc::now() - chrono::Duration::minutes(5),
            ..msg(peer, me, "older", None)
        };

        assert_eq!(view.apply(newer.clone()), Applied::Inserted);
        // Inserting before the newer entry shifts its indexed position.
        assert_eq!(view.apply(older.clone()), Applied::Inserted);
        assert_eq!(view.apply(newer), Applied::Duplicate);
        assert_eq!(view.apply(older), Applied::Duplicate);
        assert_eq!(view.len(), 2);
    }
}
