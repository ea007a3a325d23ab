#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tempmail_client::domain::email::{MessageDetail, MessageSummary, Sender};
use tempmail_client::error::{Error, Result};
use tempmail_client::mail::MailProvider;

/// In-memory stand-in for the remote API.
#[derive(Default)]
pub struct FakeProvider {
    pub domains: Mutex<Vec<String>>,
    pub accounts: Mutex<HashMap<String, String>>,
    pub messages: Mutex<Vec<MessageSummary>>,
    pub seen: Mutex<HashSet<String>>,

    pub down: AtomicBool,
    pub reject_register: AtomicBool,
    pub messages_down: AtomicBool,
    pub seen_down: AtomicBool,
    /// Non-zero: `/token` answers with this status.
    pub token_status: AtomicU16,

    pub list_calls: AtomicUsize,
    hold: Mutex<bool>,
    released: Condvar,
}

impl FakeProvider {
    pub fn new() -> Self {
        let p = Self::default();
        p.domains.lock().unwrap().push("example.test".into());
        p
    }

    pub fn with_account(self, address: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(address.into(), password.into());
        self
    }

    pub fn push_message(&self, id: &str, seen: bool) {
        self.messages.lock().unwrap().push(summary(id, seen));
    }

    /// Makes every `messages` call block until [`release`](Self::release).
    pub fn hold_listing(&self) {
        *self.hold.lock().unwrap() = true;
    }

    pub fn release(&self) {
        *self.hold.lock().unwrap() = false;
        self.released.notify_all();
    }

    pub fn wait_for_list_calls(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.list_calls.load(Ordering::SeqCst) < n {
            assert!(Instant::now() < deadline, "listing never started");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn check_up(&self, endpoint: &str) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(status(endpoint, 503));
        }
        Ok(())
    }

    fn check_token(&self, token: &str) -> Result<()> {
        let address = token.strip_prefix("token-").unwrap_or_default();
        if self.accounts.lock().unwrap().contains_key(address) {
            Ok(())
        } else {
            Err(status("/messages", 401))
        }
    }
}

pub fn status(endpoint: &str, status: u16) -> Error {
    Error::Status {
        endpoint: endpoint.into(),
        status,
    }
}

pub fn summary(id: &str, seen: bool) -> MessageSummary {
    MessageSummary {
        id: id.into(),
        from: Sender {
            address: "noreply@site.test".into(),
            name: "Site".into(),
        },
        subject: format!("Subject {id}"),
        intro: format!("Intro {id}"),
        seen,
        created_at: "2024-05-01T10:22:33+00:00".into(),
    }
}

impl MailProvider for FakeProvider {
    fn domains(&self) -> Result<Vec<String>> {
        self.check_up("/domains")?;
        Ok(self.domains.lock().unwrap().clone())
    }

    fn register(&self, address: &str, password: &str) -> Result<()> {
        self.check_up("/accounts")?;
        let mut accounts = self.accounts.lock().unwrap();
        if self.reject_register.load(Ordering::SeqCst) || accounts.contains_key(address) {
            return Err(status("/accounts", 422));
        }
        accounts.insert(address.into(), password.into());
        Ok(())
    }

    fn token(&self, address: &str, password: &str) -> Result<String> {
        self.check_up("/token")?;
        let forced = self.token_status.load(Ordering::SeqCst);
        if forced != 0 {
            return Err(status("/token", forced));
        }
        match self.accounts.lock().unwrap().get(address) {
            Some(p) if p == password => Ok(format!("token-{address}")),
            _ => Err(status("/token", 401)),
        }
    }

    fn messages(&self, token: &str) -> Result<Vec<MessageSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut held = self.hold.lock().unwrap();
            while *held {
                held = self.released.wait(held).unwrap();
            }
        }
        if self.messages_down.load(Ordering::SeqCst) {
            return Err(status("/messages", 502));
        }
        self.check_token(token)?;
        Ok(self.messages.lock().unwrap().clone())
    }

    fn message(&self, token: &str, id: &str) -> Result<MessageDetail> {
        self.check_up("/messages/{id}")?;
        self.check_token(token)?;
        let list = self.messages.lock().unwrap();
        let m = list
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| status("/messages/{id}", 404))?;
        Ok(MessageDetail {
            id: m.id.clone(),
            from: m.from.clone(),
            subject: m.subject.clone(),
            intro: m.intro.clone(),
            seen: m.seen,
            created_at: m.created_at.clone(),
            text: format!("Body of {id}"),
            html: vec![],
        })
    }

    fn mark_seen(&self, token: &str, id: &str) -> Result<()> {
        if self.seen_down.load(Ordering::SeqCst) {
            return Err(status("/messages/{id}", 500));
        }
        self.check_token(token)?;
        self.seen.lock().unwrap().insert(id.into());
        Ok(())
    }
}
