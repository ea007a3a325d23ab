use crate::domain::email::{MessageDetail, MessageSummary};
use crate::error::Result;

/// The remote disposable-mail API. One method per endpoint, no retries.
pub trait MailProvider: Send + Sync {
    /// `GET /domains`
    fn domains(&self) -> Result<Vec<String>>;

    /// `POST /accounts`
    fn register(&self, address: &str, password: &str) -> Result<()>;

    /// `POST /token`
    fn token(&self, address: &str, password: &str) -> Result<String>;

    /// `GET /messages`
    fn messages(&self, token: &str) -> Result<Vec<MessageSummary>>;

    /// `GET /messages/{id}`
    fn message(&self, token: &str, id: &str) -> Result<MessageDetail>;

    /// `PATCH /messages/{id}` with `{"seen": true}`
    fn mark_seen(&self, token: &str, id: &str) -> Result<()>;
}

impl<P: MailProvider + ?Sized> MailProvider for std::sync::Arc<P> {
    fn domains(&self) -> Result<Vec<String>> {
        (**self).domains()
    }
    fn register(&self, address: &str, password: &str) -> Result<()> {
        (**self).register(address, password)
    }
    fn token(&self, address: &str, password: &str) -> Result<String> {
        (**self).token(address, password)
    }
    fn messages(&self, token: &str) -> Result<Vec<MessageSummary>> {
        (**self).messages(token)
    }
    fn message(&self, token: &str, id: &str) -> Result<MessageDetail> {
        (**self).message(token, id)
    }
    fn mark_seen(&self, token: &str, id: &str) -> Result<()> {
        (**self).mark_seen(token, id)
    }
}
