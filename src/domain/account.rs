use serde::{Deserialize, Serialize};
use std::fmt;

/// The active mailbox. Lives in memory only and is replaced on every switch.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountSession {
    pub address: String,
    pub password: String,
    pub token: String,
    /// Bumped each time a session becomes current; async results carry it.
    pub generation: u64,
}

impl fmt::Debug for AccountSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSession")
            .field("address", &self.address)
            .field("password", &"********")
            .field("token", &"<bearer>")
            .field("generation", &self.generation)
            .finish()
    }
}

/// One entry of the saved-address file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub address: String,
    pub password: String,
    #[serde(default)]
    pub stage_id: Option<String>,
    #[serde(default)]
    pub prod_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SavedAddress {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
            stage_id: None,
            prod_id: None,
            name: None,
        }
    }
}
