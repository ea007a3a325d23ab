use crate::domain::account::SavedAddress;
use crate::error::Result;

/// Ordered, de-duplicated collection of saved mailboxes.
///
/// `Ok(false)` means "nothing to do" (duplicate or unknown address); an `Err`
/// means the change could not be persisted.
pub trait AddressRepository: Send + Sync {
    /// Never fails: an absent or unreadable backing file reads as empty.
    fn load(&self) -> Vec<SavedAddress>;

    fn save(&self, address: &str, password: &str) -> Result<bool>;

    /// Overwrites all three metadata fields.
    fn update_metadata(
        &self,
        address: &str,
        stage_id: Option<&str>,
        prod_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<bool>;

    /// Changes only the fields that are given. `Some("")` clears a field,
    /// `None` keeps what is stored.
    fn edit_metadata(
        &self,
        address: &str,
        stage_id: Option<&str>,
        prod_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<bool> {
        let Some(current) = self.find(address) else {
            return Ok(false);
        };
        let stage_id = merge_field(stage_id, current.stage_id.as_deref());
        let prod_id = merge_field(prod_id, current.prod_id.as_deref());
        let name = merge_field(name, current.name.as_deref());
        self.update_metadata(address, stage_id, prod_id, name)
    }

    fn delete(&self, address: &str) -> Result<bool>;

    /// Overwrites the whole collection. The caller guarantees it is a
    /// permutation of what was loaded.
    fn replace_all(&self, records: &[SavedAddress]) -> Result<()>;

    fn find(&self, address: &str) -> Option<SavedAddress> {
        self.load().into_iter().find(|r| r.address == address)
    }
}

fn merge_field<'a>(edit: Option<&'a str>, current: Option<&'a str>) -> Option<&'a str> {
    match edit {
        None => current,
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}
