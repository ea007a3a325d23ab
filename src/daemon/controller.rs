use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::auth::session::SessionManager;
use crate::domain::account::AccountSession;
use crate::domain::email::{MessageDetail, MessageId, MessageSummary};
use crate::error::{Error, Result};
use crate::inbox::state::{InboxChange, InboxState};
use crate::mail::provider::MailProvider;

/// Results reported back to the control thread by worker threads and the poller.
#[derive(Debug)]
pub enum WorkerEvent {
    Tick,
    SessionStarted(Result<AccountSession>),
    Messages {
        generation: u64,
        /// `None` when the listing was skipped because one was in flight.
        result: Option<Result<Vec<MessageSummary>>>,
    },
    Body {
        generation: u64,
        id: MessageId,
        result: Result<MessageDetail>,
    },
    Seen {
        generation: u64,
        id: MessageId,
        prev: bool,
        result: Result<()>,
    },
}

/// What handling one event did, for the front end to render.
#[derive(Debug)]
pub enum Outcome {
    Refreshing,
    Skipped,
    /// The result belonged to a session that is no longer current.
    Stale,
    SessionChanged(AccountSession),
    SessionFailed(Error),
    Inbox(InboxChange),
    PollFailed(Error),
    Body { id: MessageId, loaded: bool },
    Seen(MessageId),
    SeenReverted(MessageId),
}

/// Owns the inbox view and applies worker results on the control thread.
pub struct Controller<P> {
    sessions: Arc<SessionManager<P>>,
    inbox: InboxState,
    refreshing: Option<u64>,
    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,
}

impl<P: MailProvider + 'static> Controller<P> {
    pub fn new(sessions: Arc<SessionManager<P>>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            sessions,
            inbox: InboxState::new(),
            refreshing: None,
            tx,
            rx,
        }
    }

    pub fn sender(&self) -> Sender<WorkerEvent> {
        self.tx.clone()
    }

    pub fn sessions(&self) -> &Arc<SessionManager<P>> {
        &self.sessions
    }

    pub fn inbox(&self) -> &InboxState {
        &self.inbox
    }

    pub fn inbox_mut(&mut self) -> &mut InboxState {
        &mut self.inbox
    }

    pub fn next_event(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => None,
            // we hold a sender ourselves, so the channel never disconnects
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn spawn(&self, job: impl FnOnce(&SessionManager<P>) -> WorkerEvent + Send + 'static) {
        let sessions = Arc::clone(&self.sessions);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(job(&sessions));
        });
    }

    pub fn spawn_generate(&self) {
        self.spawn(|s| WorkerEvent::SessionStarted(s.create_new_account()));
    }

    pub fn spawn_login(&self, address: String, password: String) {
        self.spawn(move |s| WorkerEvent::SessionStarted(s.login(&address, &password)));
    }

    /// Starts a listing unless one for the current session is outstanding.
    pub fn spawn_refresh(&mut self) -> bool {
        let Some(session) = self.sessions.current() else {
            return false;
        };
        if self.refreshing == Some(session.generation) {
            log::debug!("refresh already in flight, skipping tick");
            return false;
        }
        self.refreshing = Some(session.generation);
        self.spawn(move |s| WorkerEvent::Messages {
            generation: session.generation,
            result: s.poll_messages(&session),
        });
        true
    }

    /// Shows the message right away and marks it read in the background.
    pub fn open_message(&mut self, id: &str) -> bool {
        let Some(session) = self.sessions.current() else {
            return false;
        };
        self.inbox.open(id);

        if let Some(prev) = self.inbox.mark_seen_locally(id) {
            let (seen_session, seen_id) = (session.clone(), id.to_string());
            self.spawn(move |s| WorkerEvent::Seen {
                generation: seen_session.generation,
                result: s.mark_seen(&seen_session, &seen_id),
                id: seen_id,
                prev,
            });
        }

        let id = id.to_string();
        self.spawn(move |s| WorkerEvent::Body {
            generation: session.generation,
            result: s.fetch_message(&session, &id),
            id,
        });
        true
    }

    pub fn handle(&mut self, event: WorkerEvent) -> Outcome {
        match event {
            WorkerEvent::Tick => {
                if self.spawn_refresh() {
                    Outcome::Refreshing
                } else {
                    Outcome::Skipped
                }
            }

            WorkerEvent::SessionStarted(Ok(session)) => {
                if !self.sessions.is_current(session.generation) {
                    return Outcome::Stale;
                }
                self.inbox.reset();
                self.refreshing = None;
                self.spawn_refresh();
                Outcome::SessionChanged(session)
            }
            WorkerEvent::SessionStarted(Err(e)) => Outcome::SessionFailed(e),

            WorkerEvent::Messages { generation, result } => {
                if self.refreshing == Some(generation) {
                    self.refreshing = None;
                }
                if !self.sessions.is_current(generation) {
                    return Outcome::Stale;
                }
                match result {
                    None => Outcome::Skipped,
                    Some(Ok(msgs)) => Outcome::Inbox(self.inbox.apply_messages(msgs)),
                    Some(Err(e)) => {
                        log::warn!("poll failed, will retry next tick: {e}");
                        Outcome::PollFailed(e)
                    }
                }
            }

            WorkerEvent::Body {
                generation,
                id,
                result,
            } => {
                if !self.sessions.is_current(generation) {
                    return Outcome::Stale;
                }
                let loaded = result.is_ok();
                self.inbox.set_body(&id, result.map_err(|e| e.to_string()));
                Outcome::Body { id, loaded }
            }

            WorkerEvent::Seen {
                generation,
                id,
                prev,
                result,
            } => {
                if !self.sessions.is_current(generation) {
                    return Outcome::Stale;
                }
                match result {
                    Ok(()) => Outcome::Seen(id),
                    Err(_) => {
                        self.inbox.revert_seen(&id, prev);
                        Outcome::SeenReverted(id)
                    }
                }
            }
        }
    }
}
