use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::domain::account::SavedAddress;
use crate::error::{Error, Result};
use crate::store::repo::AddressRepository;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    emails: Vec<SavedAddress>,
}

/// Saved addresses in a single JSON document, rewritten in full on every change.
pub struct JsonAddressStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonAddressStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Like [`open`](Self::open), but copies `template` into place first when
    /// the store file does not exist yet.
    pub fn open_seeded(path: impl Into<PathBuf>, template: Option<&Path>) -> Self {
        let store = Self::open(path);
        if let Some(template) = template
            && !store.path.exists()
        {
            match fs::copy(template, &store.path) {
                Ok(_) => log::info!(
                    "seeded {} from {}",
                    store.path.display(),
                    template.display()
                ),
                Err(e) => log::warn!("failed to seed initial data: {e}"),
            }
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // the guarded data is (), a poisoned lock carries no broken state
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn read_records(&self) -> Result<Vec<SavedAddress>> {
        let corrupt = |reason: String| Error::StoreCorrupt {
            path: self.path.display().to_string(),
            reason,
        };
        let raw = fs::read_to_string(&self.path).map_err(|e| corrupt(e.to_string()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: StoreDocument = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
        Ok(doc.emails)
    }

    fn load_unlocked(&self) -> Vec<SavedAddress> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.read_records() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("{e}; starting from an empty list");
                Vec::new()
            }
        }
    }

    /// Writes a sibling temp file and renames it over the store.
    fn write_unlocked(&self, records: &[SavedAddress]) -> Result<()> {
        let doc = StoreDocument {
            emails: records.to_vec(),
        };
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(Error::StoreWrite)?;
        }

        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(&buf)?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            log::error!("error saving {}: {e}", self.path.display());
            return Err(Error::StoreWrite(e));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl AddressRepository for JsonAddressStore {
    fn load(&self) -> Vec<SavedAddress> {
        let _g = self.guard();
        self.load_unlocked()
    }

    fn save(&self, address: &str, password: &str) -> Result<bool> {
        let _g = self.guard();
        let mut records = self.load_unlocked();
        if records.iter().any(|r| r.address == address) {
            return Ok(false);
        }
        records.push(SavedAddress::new(address, password));
        self.write_unlocked(&records)?;
        Ok(true)
    }

    fn update_metadata(
        &self,
        address: &str,
        stage_id: Option<&str>,
        prod_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<bool> {
        let _g = self.guard();
        let mut records = self.load_unlocked();
        let Some(record) = records.iter_mut().find(|r| r.address == address) else {
            return Ok(false);
        };
        record.stage_id = stage_id.map(str::to_string);
        record.prod_id = prod_id.map(str::to_string);
        record.name = name.map(str::to_string);
        self.write_unlocked(&records)?;
        Ok(true)
    }

    fn delete(&self, address: &str) -> Result<bool> {
        let _g = self.guard();
        let mut records = self.load_unlocked();
        let before = records.len();
        records.retain(|r| r.address != address);
        if records.len() == before {
            return Ok(false);
        }
        self.write_unlocked(&records)?;
        Ok(true)
    }

    fn replace_all(&self, records: &[SavedAddress]) -> Result<()> {
        let _g = self.guard();
        self.write_unlocked(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, JsonAddressStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAddressStore::open(dir.path().join("saved_emails.json"));
        (dir, store)
    }

    #[test]
    fn file_uses_emails_array_with_all_fields() {
        let (_dir, store) = store();
        store.save("a@x.com", "p1").unwrap();
        store
            .update_metadata("a@x.com", Some("s1"), None, Some("Alice"))
            .unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &v["emails"][0];
        assert_eq!(first["address"], "a@x.com");
        assert_eq!(first["password"], "p1");
        assert_eq!(first["stage_id"], "s1");
        assert!(first["prod_id"].is_null());
        assert_eq!(first["name"], "Alice");
        assert!(raw.contains("\n    \"emails\""));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (dir, store) = store();
        store.save("a@x.com", "p1").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("saved_emails.json")]);
    }

    #[test]
    fn seeding_copies_template_only_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("bundled.json");
        fs::write(
            &template,
            r#"{"emails": [{"address": "seed@x.com", "password": "s"}]}"#,
        )
        .unwrap();

        let path = dir.path().join("saved_emails.json");
        let store = JsonAddressStore::open_seeded(&path, Some(&template));
        assert_eq!(store.load(), vec![SavedAddress::new("seed@x.com", "s")]);

        store.delete("seed@x.com").unwrap();
        let again = JsonAddressStore::open_seeded(&path, Some(&template));
        assert!(again.load().is_empty());
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // the store path is a directory, so the rename cannot replace it
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let store = JsonAddressStore::open(&path);
        assert!(matches!(
            store.replace_all(&[SavedAddress::new("a@x.com", "p")]),
            Err(Error::StoreWrite(_))
        ));
    }
}
