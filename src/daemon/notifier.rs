use notify_rust::{Hint, Notification};

use crate::domain::email::MessageSummary;

pub struct Notifier {
    mailbox: String,
}

impl Notifier {
    pub fn new(mailbox: impl Into<String>) -> Self {
        Self {
            mailbox: mailbox.into(),
        }
    }

    /// Desktop notification for a newly arrived message. Failures are logged;
    /// a missing notification server must not stop polling.
    pub fn notify_email(&self, email: &MessageSummary) {
        let mut n = Notification::new();
        n.summary(&format!("{} — {}", email.from.display(), email.subject))
            .body(&format!("{}\n{}", self.mailbox, email.intro))
            .icon("mail-unread")
            .hint(Hint::Category("email.arrived".to_string()));

        if let Err(e) = n.show() {
            log::warn!("notification error: {e}");
        }
    }
}
