use serde::{Deserialize, Serialize};

pub type MessageId = String;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
}

impl Sender {
    /// Display name, falling back to the bare address.
    pub fn display(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.address
        } else {
            &self.name
        }
    }
}

/// One row of `GET /messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: MessageId,
    #[serde(default)]
    pub from: Sender,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub seen: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

impl MessageSummary {
    pub fn short_date(&self) -> String {
        short_date(&self.created_at)
    }

    /// One row of a message listing; unread rows are starred.
    pub fn list_line(&self) -> String {
        format!(
            "{} {:<16}  {:<28}  {}  [{}]",
            if self.seen { ' ' } else { '*' },
            self.short_date(),
            self.from.display(),
            self.subject,
            self.id
        )
    }
}

/// Full message from `GET /messages/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: MessageId,
    #[serde(default)]
    pub from: Sender,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub seen: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: Vec<String>,
}

const HTML_ONLY_PLACEHOLDER: &str =
    "(This email contains no readable text. Open it in a full email client to view.)";

impl MessageDetail {
    /// Plain text if present, then the intro, then the HTML parts flattened.
    pub fn display_text(&self) -> String {
        if !self.text.trim().is_empty() {
            return self.text.clone();
        }
        if !self.intro.trim().is_empty() {
            return self.intro.clone();
        }
        let html = self.html.concat();
        if !html.trim().is_empty() {
            match html2text::from_read(html.as_bytes(), 100) {
                Ok(rendered) if !rendered.trim().is_empty() => return rendered,
                Ok(_) => {}
                Err(e) => log::warn!("could not render html body of {}: {e}", self.id),
            }
        }
        HTML_ONLY_PLACEHOLDER.to_string()
    }

    pub fn short_date(&self) -> String {
        short_date(&self.created_at)
    }
}

/// `2024-05-01T10:22:33+00:00` -> `2024-05-01 10:22`
pub fn short_date(raw: &str) -> String {
    if raw.contains('T') {
        raw.replacen('T', " ", 1).chars().take(16).collect()
    } else {
        raw.to_string()
    }
}
