use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use crate::domain::account::AccountSession;
use crate::domain::email::{MessageDetail, MessageSummary};
use crate::error::{Error, Result};
use crate::mail::names::{generate_password, generate_username};
use crate::mail::provider::MailProvider;

/// Holds the one active mailbox and wraps every provider call so that no
/// failure escapes as anything but a value.
pub struct SessionManager<P> {
    provider: P,
    current: RwLock<Option<AccountSession>>,
    generation: AtomicU64,
    /// Generations with a listing in flight.
    listing: Mutex<HashSet<u64>>,
}

/// Clears the in-flight marker when the listing call returns.
struct ListingGuard<'a> {
    slot: &'a Mutex<HashSet<u64>>,
    generation: u64,
}

impl<'a> ListingGuard<'a> {
    fn acquire(slot: &'a Mutex<HashSet<u64>>, generation: u64) -> Option<Self> {
        let mut in_flight = slot.lock().unwrap_or_else(|p| p.into_inner());
        if !in_flight.insert(generation) {
            return None;
        }
        Some(Self { slot, generation })
    }
}

impl Drop for ListingGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.remove(&self.generation);
    }
}

impl<P: MailProvider> SessionManager<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            listing: Mutex::new(HashSet::new()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Registers a fresh random mailbox and makes it the current session.
    /// Nothing is written to the address store.
    pub fn create_new_account(&self) -> Result<AccountSession> {
        let domains = self
            .provider
            .domains()
            .map_err(|e| unavailable("domain lookup", e))?;
        let domain = domains
            .into_iter()
            .next()
            .ok_or_else(|| Error::ProviderUnavailable("no domains offered".into()))?;

        let (username, password) = {
            let mut rng = rand::thread_rng();
            (generate_username(&mut rng), generate_password(&mut rng))
        };
        let address = format!("{username}@{domain}");

        self.provider
            .register(&address, &password)
            .map_err(|e| unavailable("registration", e))?;
        let token = self
            .provider
            .token(&address, &password)
            .map_err(|e| unavailable("token exchange", e))?;

        log::info!("created mailbox {address}");
        Ok(self.activate(address, password, token))
    }

    /// Exchanges stored credentials for a bearer token.
    pub fn authenticate(&self, address: &str, password: &str) -> Result<String> {
        self.provider.token(address, password).map_err(|e| {
            if e.is_client_rejection() {
                Error::Auth {
                    address: address.to_string(),
                    reason: e.to_string(),
                }
            } else {
                unavailable("token exchange", e)
            }
        })
    }

    /// Authenticates a saved mailbox and makes it the current session.
    pub fn login(&self, address: &str, password: &str) -> Result<AccountSession> {
        let token = self.authenticate(address, password)?;
        Ok(self.activate(address.to_string(), password.to_string(), token))
    }

    /// Replaces the current session. Results started under older
    /// generations are stale from here on.
    pub fn activate(&self, address: String, password: String, token: String) -> AccountSession {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = AccountSession {
            address,
            password,
            token,
            generation,
        };
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = Some(session.clone());
        session
    }

    pub fn end_session(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn current(&self) -> Option<AccountSession> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        let current = self.current.read().unwrap_or_else(|p| p.into_inner());
        matches!(&*current, Some(s) if s.generation == generation)
    }

    /// `None` when a listing for this session is already in flight; otherwise
    /// the provider's answer, with failures kept distinct from an empty inbox.
    pub fn poll_messages(&self, session: &AccountSession) -> Option<Result<Vec<MessageSummary>>> {
        let _flight = ListingGuard::acquire(&self.listing, session.generation)?;
        Some(
            self.provider
                .messages(&session.token)
                .map_err(|e| Error::TransientFetch(format!("listing messages: {e}"))),
        )
    }

    /// `None` when a listing is already in flight. A failed call reads as an
    /// empty mailbox.
    pub fn list_messages(&self, session: &AccountSession) -> Option<Vec<MessageSummary>> {
        self.poll_messages(session).map(|r| {
            r.unwrap_or_else(|e| {
                log::warn!("{e}");
                Vec::new()
            })
        })
    }

    pub fn fetch_message(&self, session: &AccountSession, id: &str) -> Result<MessageDetail> {
        self.provider
            .message(&session.token, id)
            .map_err(|e| Error::TransientFetch(format!("fetching message {id}: {e}")))
    }

    /// Best effort. Callers show the message whether or not this succeeds.
    pub fn mark_seen(&self, session: &AccountSession, id: &str) -> Result<()> {
        self.provider.mark_seen(&session.token, id).map_err(|e| {
            log::debug!("mark seen {id} failed: {e}");
            Error::TransientFetch(format!("marking message {id} seen: {e}"))
        })
    }
}

fn unavailable(stage: &str, e: Error) -> Error {
    log::warn!("{stage} failed: {e}");
    Error::ProviderUnavailable(format!("{stage}: {e}"))
}
