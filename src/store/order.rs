//! Reconciling a user-arranged list with the canonical saved list.

use std::collections::HashMap;

use crate::domain::account::SavedAddress;
use crate::error::Result;
use crate::store::repo::AddressRepository;

/// Rebuilds the full records in the order the user arranged them.
///
/// Addresses unknown to `canonical` are dropped. Returns `None` when the result
/// would not contain every canonical record, so a partial view is never saved
/// over the full list.
pub fn reorder_by_addresses<S: AsRef<str>>(
    canonical: &[SavedAddress],
    displayed: &[S],
) -> Option<Vec<SavedAddress>> {
    let by_address: HashMap<&str, &SavedAddress> = canonical
        .iter()
        .map(|r| (r.address.as_str(), r))
        .collect();

    let mut out = Vec::with_capacity(canonical.len());
    for addr in displayed {
        if let Some(r) = by_address.get(addr.as_ref())
            && !out.iter().any(|o: &SavedAddress| o.address == r.address)
        {
            out.push((*r).clone());
        }
    }

    if out.len() == canonical.len() {
        Some(out)
    } else {
        log::warn!(
            "mismatch in count ({} of {}), not saving order",
            out.len(),
            canonical.len()
        );
        None
    }
}

/// Moves the record at `from` so it ends up at index `to`.
pub fn move_record(records: &mut Vec<SavedAddress>, from: usize, to: usize) -> bool {
    if from >= records.len() || to >= records.len() {
        return false;
    }
    if from != to {
        let r = records.remove(from);
        records.insert(to, r);
    }
    true
}

/// Saves the arrangement `displayed` over the stored list. `Ok(false)` when
/// it does not account for every saved record; nothing is written then.
pub fn commit_order<R, S>(store: &R, displayed: &[S]) -> Result<bool>
where
    R: AddressRepository + ?Sized,
    S: AsRef<str>,
{
    let canonical = store.load();
    match reorder_by_addresses(&canonical, displayed) {
        Some(records) => {
            store.replace_all(&records)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Moves one saved address to index `to` (clamped to the list) and saves the
/// new order. Returns the index it landed on, or `None` when nothing was saved.
pub fn move_address<R>(store: &R, address: &str, to: usize) -> Result<Option<usize>>
where
    R: AddressRepository + ?Sized,
{
    let mut records = store.load();
    let Some(from) = records.iter().position(|r| r.address == address) else {
        return Ok(None);
    };
    let to = to.min(records.len() - 1);
    move_record(&mut records, from, to);

    let displayed: Vec<&str> = records.iter().map(|r| r.address.as_str()).collect();
    Ok(commit_order(store, &displayed)?.then_some(to))
}

/// Case-insensitive substring match over the address and the metadata fields.
pub fn matches_filter(record: &SavedAddress, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    [
        Some(record.address.as_str()),
        record.stage_id.as_deref(),
        record.prod_id.as_deref(),
        record.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&q))
}

/// Reordering only makes sense on the unfiltered list.
pub fn reorder_allowed(filter: Option<&str>) -> bool {
    filter.is_none_or(|f| f.trim().is_empty())
}
