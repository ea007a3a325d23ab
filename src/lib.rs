//! Client core for a disposable-mail provider: account sessions, a polled
//! inbox, and a file-backed list of saved addresses.

pub mod auth;
pub mod config;
pub mod daemon;
pub mod domain;
pub mod error;
pub mod inbox;
pub mod mail;
pub mod store;

pub use error::{Error, Result};

use std::path::Path;

/// Opens the folder holding the saved-address file in the OS file browser.
pub fn open_storage_folder(store_file: &Path) -> Result<()> {
    let dir = match store_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir)?;
    open::that(&dir)?;
    Ok(())
}
