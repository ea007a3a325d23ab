use std::collections::HashSet;

use crate::domain::email::{MessageDetail, MessageId, MessageSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyView {
    Loading,
    Loaded(MessageDetail),
    Failed(String),
}

/// What a refresh did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxChange {
    /// First listing after a session switch.
    Initial(usize),
    /// Same messages, same read state.
    Unchanged,
    /// Same messages; only `seen` flags moved.
    SeenUpdated(usize),
    /// The set of messages changed. `added` lists ids not shown before.
    Replaced { added: Vec<MessageId> },
}

/// The message list of the current session, independent of any toolkit.
#[derive(Debug, Default)]
pub struct InboxState {
    pub items: Vec<MessageSummary>,
    pub selected: Option<usize>,

    /// The message currently opened in the reading pane.
    pub opened_id: Option<MessageId>,
    pub body: Option<BodyView>,

    loaded: bool,
}

impl InboxState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything; called when a different session becomes current.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Merges a fresh listing. When the set of ids is unchanged only the read
    /// flags are touched, so the list is not rebuilt on every poll.
    pub fn apply_messages(&mut self, msgs: Vec<MessageSummary>) -> InboxChange {
        if !self.loaded {
            self.loaded = true;
            let n = msgs.len();
            self.replace_items(msgs);
            return InboxChange::Initial(n);
        }

        let existing: HashSet<&str> = self.items.iter().map(|m| m.id.as_str()).collect();
        let incoming: HashSet<&str> = msgs.iter().map(|m| m.id.as_str()).collect();

        if existing == incoming {
            let mut changed = 0;
            for m in &msgs {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == m.id)
                    && item.seen != m.seen
                {
                    item.seen = m.seen;
                    changed += 1;
                }
            }
            return if changed == 0 {
                InboxChange::Unchanged
            } else {
                InboxChange::SeenUpdated(changed)
            };
        }

        let added: Vec<MessageId> = msgs
            .iter()
            .filter(|m| !existing.contains(m.id.as_str()))
            .map(|m| m.id.clone())
            .collect();
        self.replace_items(msgs);
        InboxChange::Replaced { added }
    }

    fn replace_items(&mut self, msgs: Vec<MessageSummary>) {
        let keep = self.current_selected_id();
        self.items = msgs;
        self.selected = None;
        if let Some(id) = keep {
            self.try_select_id(&id);
        }
        if self.selected.is_none() && !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|m| !m.seen).count()
    }

    pub fn get(&self, id: &str) -> Option<&MessageSummary> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn current_selected_id(&self) -> Option<MessageId> {
        let idx = self.selected?;
        self.items.get(idx).map(|e| e.id.clone())
    }

    pub fn try_select_id(&mut self, id: &str) {
        if let Some(pos) = self.items.iter().position(|x| x.id == id) {
            self.selected = Some(pos);
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.items.is_empty() {
            self.selected = None;
            return;
        }
        let cur = self.selected.unwrap_or(0) as i32;
        let len = self.items.len() as i32;
        self.selected = Some((cur + delta).clamp(0, len - 1) as usize);
    }

    /// Opens a message: the pane shows "loading" until the body arrives.
    pub fn open(&mut self, id: &str) {
        self.try_select_id(id);
        self.opened_id = Some(id.to_string());
        self.body = Some(BodyView::Loading);
    }

    /// Applies a fetched body if it still belongs to the opened message.
    pub fn set_body(&mut self, id: &str, body: Result<MessageDetail, String>) -> bool {
        if self.opened_id.as_deref() != Some(id) {
            return false;
        }
        self.body = Some(match body {
            Ok(detail) => BodyView::Loaded(detail),
            Err(e) => BodyView::Failed(e),
        });
        true
    }

    pub fn close_email(&mut self) {
        self.opened_id = None;
        self.body = None;
    }

    /// Optimistically flips `seen`; returns the previous value for rollback.
    pub fn mark_seen_locally(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|m| m.id == id)?;
        let prev = item.seen;
        item.seen = true;
        Some(prev)
    }

    pub fn revert_seen(&mut self, id: &str, prev: bool) {
        if let Some(item) = self.items.iter_mut().find(|m| m.id == id) {
            item.seen = prev;
        }
    }
}
