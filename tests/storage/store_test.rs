// Store Tests
// Tests for the sled-backed ledger snapshot store

use kwitter::fees::FeePolicy;
use kwitter::identity::Address;
use kwitter::ledger::{EntryId, Ledger, Slot};
use kwitter::storage::KwitterStore;
use tempfile::TempDir;

fn deployer() -> Address {
    Address::from_seed("deployer")
}

// ============================================================================
// STORE CREATION AND BASIC OPERATIONS
// ============================================================================

#[test]
fn test_store_open_new() {
    let temp_dir = TempDir::new().unwrap();
    let store = KwitterStore::open(temp_dir.path()).unwrap();

    assert!(store.is_empty());
    assert!(!store.has_ledger().unwrap());
    assert!(store.load_ledger().unwrap().is_none());
}

#[test]
fn test_store_save_marks_ledger_present() {
    let temp_dir = TempDir::new().unwrap();
    let store = KwitterStore::open(temp_dir.path()).unwrap();
    let ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();

    store.save_ledger(&ledger).unwrap();

    assert!(!store.is_empty());
    assert!(store.has_ledger().unwrap());
    assert_eq!(store.stats().key_count, 1);
}

// ============================================================================
// LEDGER ROUND TRIP
// ============================================================================

#[test]
fn test_store_preserves_full_ledger_state() {
    let temp_dir = TempDir::new().unwrap();
    let fees = FeePolicy::new().with_post_price(100).with_vote_price(7);
    let alice = Address::from_seed("alice");
    let bob = Address::from_seed("bob");

    let mut ledger = Ledger::new(deployer(), fees.clone()).unwrap();
    ledger.create_entry("one", 100, alice, 11).unwrap();
    ledger.create_entry("two", 150, bob, 12).unwrap();
    ledger.vote(EntryId::new(1), 7, bob).unwrap();
    ledger.delete_entry(EntryId::new(2), &deployer()).unwrap();
    ledger.withdraw(&deployer()).unwrap();

    {
        let store = KwitterStore::open(temp_dir.path()).unwrap();
        store.save_ledger(&ledger).unwrap();
        store.flush().unwrap();
    }

    let store = KwitterStore::open(temp_dir.path()).unwrap();
    let loaded = store.load_ledger().unwrap().unwrap();

    assert_eq!(loaded.owner(), &deployer());
    assert_eq!(loaded.fee_policy(), &fees);
    assert_eq!(loaded.total_entries(), 2);
    assert_eq!(loaded.get_entry(EntryId::new(2)), Slot::Tombstoned);
    assert_eq!(loaded.get_account_entries(&bob), &[EntryId::new(2)]);
    assert!(loaded.has_voted(&bob, EntryId::new(1)));
    assert_eq!(loaded.balance(), ledger.balance());
    assert_eq!(loaded.total_withdrawn(), ledger.total_withdrawn());
    assert_eq!(loaded.statistics(), ledger.statistics());

    let entry = loaded.entry(EntryId::new(1)).unwrap();
    assert_eq!(entry.content_str(), "one");
    assert_eq!(entry.vote_count(), 1);
    assert_eq!(entry.timestamp(), 11);
}

#[test]
fn test_loaded_ledger_continues_id_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let alice = Address::from_seed("alice");

    {
        let store = KwitterStore::open(temp_dir.path()).unwrap();
        let mut ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();
        let price = ledger.post_price();
        ledger.create_entry("before", price, alice, 1).unwrap();
        store.save_ledger(&ledger).unwrap();
        store.flush().unwrap();
    }

    let store = KwitterStore::open(temp_dir.path()).unwrap();
    let mut ledger = store.load_ledger().unwrap().unwrap();
    let price = ledger.post_price();
    let id = ledger.create_entry("after", price, alice, 2).unwrap();

    assert_eq!(id, EntryId::new(2));
    assert_eq!(ledger.get_account_entries(&alice), &[EntryId::new(1), id]);
}

#[test]
fn test_pending_events_are_not_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let store = KwitterStore::open(temp_dir.path()).unwrap();
    let mut ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();
    let price = ledger.post_price();
    ledger
        .create_entry("evented", price, Address::from_seed("alice"), 1)
        .unwrap();

    store.save_ledger(&ledger).unwrap();
    let mut loaded = store.load_ledger().unwrap().unwrap();

    assert!(loaded.poll_events().is_empty());
    assert_eq!(ledger.poll_events().len(), 1);
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let store = KwitterStore::open(temp_dir.path()).unwrap();
    let mut ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();
    store.save_ledger(&ledger).unwrap();

    let price = ledger.post_price();
    ledger
        .create_entry("newer", price, Address::from_seed("alice"), 1)
        .unwrap();
    store.save_ledger(&ledger).unwrap();

    assert_eq!(store.load_ledger().unwrap().unwrap().total_entries(), 1);
    assert_eq!(store.stats().key_count, 1);
}

#[test]
fn test_truncated_snapshot_rejected() {
    let ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();
    let mut bytes = ledger.to_bytes().unwrap();
    bytes.truncate(bytes.len() / 2);

    assert!(Ledger::from_bytes(&bytes).is_err());
}
