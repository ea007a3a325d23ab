use std::fs;
use std::sync::Arc;
use std::thread;

use tempmail_client::domain::account::SavedAddress;
use tempmail_client::store::order::{commit_order, move_address, reorder_by_addresses};
use tempmail_client::store::{AddressRepository, JsonAddressStore};

fn store() -> (tempfile::TempDir, JsonAddressStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonAddressStore::open(dir.path().join("saved_emails.json"));
    (dir, store)
}

fn addresses(records: &[SavedAddress]) -> Vec<&str> {
    records.iter().map(|r| r.address.as_str()).collect()
}

#[test]
fn duplicate_save_keeps_first_record() {
    let (_dir, store) = store();
    assert!(store.load().is_empty());
    assert!(store.save("a@x.com", "p1").unwrap());
    assert!(!store.save("a@x.com", "p2").unwrap());

    let records = store.load();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].password, "p1");
}

#[test]
fn dedup_is_exact_match() {
    let (_dir, store) = store();
    assert!(store.save("a@x.com", "p1").unwrap());
    assert!(store.save("A@x.com", "p2").unwrap());
    assert_eq!(store.load().len(), 2);
}

#[test]
fn save_appends_in_order() {
    let (_dir, store) = store();
    for a in ["a@x.com", "b@x.com", "c@x.com"] {
        store.save(a, "p").unwrap();
    }
    assert_eq!(addresses(&store.load()), ["a@x.com", "b@x.com", "c@x.com"]);
}

#[test]
fn replace_all_round_trips_order() {
    let (_dir, store) = store();
    for a in ["a@x.com", "b@x.com", "c@x.com"] {
        store.save(a, "p").unwrap();
    }
    let canonical = store.load();
    let reordered =
        reorder_by_addresses(&canonical, &["c@x.com", "a@x.com", "b@x.com"]).unwrap();
    store.replace_all(&reordered).unwrap();

    assert_eq!(store.load(), reordered);
    assert_eq!(addresses(&store.load()), ["c@x.com", "a@x.com", "b@x.com"]);
}

#[test]
fn delete_missing_address_changes_nothing() {
    let (_dir, store) = store();
    store.save("a@x.com", "p1").unwrap();
    store.save("b@x.com", "p2").unwrap();
    let before = store.load();
    let raw_before = fs::read_to_string(store.path()).unwrap();

    assert!(!store.delete("zzz@x.com").unwrap());
    assert_eq!(store.load(), before);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), raw_before);

    assert!(store.delete("a@x.com").unwrap());
    assert_eq!(addresses(&store.load()), ["b@x.com"]);
}

#[test]
fn update_metadata_only_touches_metadata() {
    let (_dir, store) = store();
    for a in ["a@x.com", "b@x.com", "c@x.com"] {
        store.save(a, &format!("pw-{a}")).unwrap();
    }

    assert!(
        store
            .update_metadata("b@x.com", Some("st-1"), Some("pr-9"), Some("Bob"))
            .unwrap()
    );
    assert!(
        !store
            .update_metadata("zzz@x.com", Some("x"), None, None)
            .unwrap()
    );

    let records = store.load();
    assert_eq!(addresses(&records), ["a@x.com", "b@x.com", "c@x.com"]);
    let b = &records[1];
    assert_eq!(b.password, "pw-b@x.com");
    assert_eq!(b.stage_id.as_deref(), Some("st-1"));
    assert_eq!(b.prod_id.as_deref(), Some("pr-9"));
    assert_eq!(b.name.as_deref(), Some("Bob"));
    assert_eq!(records[0], SavedAddress::new("a@x.com", "pw-a@x.com"));
}

#[test]
fn edit_metadata_keeps_fields_not_given() {
    let (_dir, store) = store();
    store.save("a@x.com", "p1").unwrap();
    store
        .update_metadata("a@x.com", Some("st-1"), Some("pr-9"), Some("Al"))
        .unwrap();

    assert!(store.edit_metadata("a@x.com", None, None, Some("Bob")).unwrap());
    let r = store.find("a@x.com").unwrap();
    assert_eq!(r.stage_id.as_deref(), Some("st-1"));
    assert_eq!(r.prod_id.as_deref(), Some("pr-9"));
    assert_eq!(r.name.as_deref(), Some("Bob"));

    assert!(store.edit_metadata("a@x.com", Some(""), None, None).unwrap());
    let r = store.find("a@x.com").unwrap();
    assert_eq!(r.stage_id, None);
    assert_eq!(r.prod_id.as_deref(), Some("pr-9"));
    assert_eq!(r.password, "p1");

    assert!(!store.edit_metadata("zzz@x.com", Some("x"), None, None).unwrap());
}

#[test]
fn move_address_saves_full_records_in_new_order() {
    let (_dir, store) = store();
    for a in ["a@x.com", "b@x.com", "c@x.com"] {
        store.save(a, &format!("pw-{a}")).unwrap();
    }
    store
        .update_metadata("c@x.com", None, None, Some("Carol"))
        .unwrap();

    assert_eq!(move_address(&store, "c@x.com", 0).unwrap(), Some(0));
    let records = store.load();
    assert_eq!(addresses(&records), ["c@x.com", "a@x.com", "b@x.com"]);
    assert_eq!(records[0].name.as_deref(), Some("Carol"));
    assert_eq!(records[0].password, "pw-c@x.com");

    // past the end lands last
    assert_eq!(move_address(&store, "c@x.com", 10).unwrap(), Some(2));
    assert_eq!(addresses(&store.load()), ["a@x.com", "b@x.com", "c@x.com"]);

    assert_eq!(move_address(&store, "zzz@x.com", 0).unwrap(), None);
}

#[test]
fn partial_order_is_not_saved() {
    let (_dir, store) = store();
    for a in ["a@x.com", "b@x.com", "c@x.com"] {
        store.save(a, "p").unwrap();
    }
    let raw_before = fs::read_to_string(store.path()).unwrap();

    assert!(!commit_order(&store, &["c@x.com", "a@x.com"]).unwrap());
    assert!(!commit_order(&store, &["c@x.com", "c@x.com", "a@x.com"]).unwrap());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), raw_before);

    assert!(commit_order(&store, &["b@x.com", "c@x.com", "a@x.com"]).unwrap());
    assert_eq!(addresses(&store.load()), ["b@x.com", "c@x.com", "a@x.com"]);
}

#[test]
fn unreadable_files_load_as_empty() {
    let (_dir, store) = store();
    assert!(store.load().is_empty());

    fs::write(store.path(), "").unwrap();
    assert!(store.load().is_empty());

    fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().is_empty());

    fs::write(store.path(), r#"{"emails": "nope"}"#).unwrap();
    assert!(store.load().is_empty());

    // a corrupt file is a cold start: the next save succeeds
    assert!(store.save("a@x.com", "p1").unwrap());
    assert_eq!(store.load().len(), 1);
}

#[test]
fn reads_files_written_without_metadata() {
    let (_dir, store) = store();
    fs::write(
        store.path(),
        r#"{"emails": [{"address": "a@x.com", "password": "p1"}]}"#,
    )
    .unwrap();
    assert_eq!(store.load(), vec![SavedAddress::new("a@x.com", "p1")]);
}

#[test]
fn concurrent_saves_are_serialized() {
    let (_dir, store) = store();
    let store = Arc::new(store);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..5 {
                    store.save(&format!("t{i}-{j}@x.com"), "p").unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.load().len(), 40);
}
