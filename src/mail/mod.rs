pub mod mailtm;
pub mod names;
pub mod provider;

pub use mailtm::MailTmClient;
pub use provider::MailProvider;
