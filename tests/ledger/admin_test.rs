// Administrative Operation Tests
// Tests for owner-only deletion and fee withdrawal

use kwitter::fees::FeePolicy;
use kwitter::identity::Address;
use kwitter::ledger::{EntryId, Ledger, LedgerError, LedgerEvent, Slot};

fn deployer() -> Address {
    Address::from_seed("deployer")
}

/// Ledger with three entries: ids 1 and 3 by alice, id 2 by bob
fn populated_ledger() -> Ledger {
    let mut ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();
    let price = ledger.post_price();
    let alice = Address::from_seed("alice");
    let bob = Address::from_seed("bob");

    ledger.create_entry("one", price, alice, 1).unwrap();
    ledger.create_entry("two", price, bob, 2).unwrap();
    ledger.create_entry("three", price, alice, 3).unwrap();
    ledger.poll_events();
    ledger
}

// ============================================================================
// DELETE ENTRY
// ============================================================================

#[test]
fn test_owner_can_delete_entry() {
    let mut ledger = populated_ledger();
    let id = EntryId::new(1);
    assert_eq!(ledger.get_entry(id).id(), id);

    let deleted = ledger.delete_entry(id, &deployer()).unwrap();

    assert!(deleted);
    assert_eq!(ledger.get_entry(id), Slot::Tombstoned);
    assert_eq!(ledger.get_entry(id).id(), EntryId::TOMBSTONE);
    assert!(ledger.entry(id).is_none());
}

#[test]
fn test_delete_keeps_ids_and_account_index() {
    let mut ledger = populated_ledger();
    let alice = Address::from_seed("alice");

    ledger.delete_entry(EntryId::new(1), &deployer()).unwrap();

    assert_eq!(ledger.total_entries(), 3);
    assert_eq!(
        ledger.get_account_entries(&alice),
        &[EntryId::new(1), EntryId::new(3)]
    );

    // ids are never reused
    let id = ledger
        .create_entry("four", ledger.post_price(), alice, 4)
        .unwrap();
    assert_eq!(id, EntryId::new(4));
}

#[test]
fn test_only_owner_can_delete() {
    let mut ledger = populated_ledger();
    let alice = Address::from_seed("alice");

    // not even the author
    let result = ledger.delete_entry(EntryId::new(1), &alice);

    assert_eq!(result, Err(LedgerError::NotOwner));
    assert!(ledger.entry(EntryId::new(1)).is_some());
    assert!(ledger.poll_events().is_empty());
}

#[test]
fn test_non_owner_rejected_even_for_unknown_id() {
    let mut ledger = populated_ledger();

    let result = ledger.delete_entry(EntryId::new(99), &Address::from_seed("mallory"));

    assert_eq!(result, Err(LedgerError::NotOwner));
}

#[test]
fn test_delete_is_idempotent() {
    let mut ledger = populated_ledger();
    let id = EntryId::new(2);

    assert!(ledger.delete_entry(id, &deployer()).unwrap());
    assert!(!ledger.delete_entry(id, &deployer()).unwrap());
    assert_eq!(ledger.get_entry(id), Slot::Tombstoned);
}

#[test]
fn test_delete_out_of_range_is_noop() {
    let mut ledger = populated_ledger();

    assert!(!ledger.delete_entry(EntryId::new(0), &deployer()).unwrap());
    assert!(!ledger.delete_entry(EntryId::new(4), &deployer()).unwrap());
    assert_eq!(ledger.statistics().live_entries, 3);
    assert!(ledger.poll_events().is_empty());
}

#[test]
fn test_delete_emits_event() {
    let mut ledger = populated_ledger();

    ledger.delete_entry(EntryId::new(3), &deployer()).unwrap();

    assert_eq!(
        ledger.poll_events(),
        vec![LedgerEvent::EntryDeleted { id: EntryId::new(3) }]
    );
}

// ============================================================================
// WITHDRAW
// ============================================================================

#[test]
fn test_owner_can_withdraw() {
    let mut ledger = populated_ledger();
    let old_balance = ledger.balance();

    let split = ledger.withdraw(&deployer()).unwrap();

    assert_eq!(split.payout, old_balance / 100 * 95);
    assert_eq!(ledger.balance(), old_balance / 100 * 5);
    assert_eq!(split.payout + split.retained, old_balance);
    assert_eq!(ledger.total_withdrawn(), split.payout);
}

#[test]
fn test_only_owner_can_withdraw() {
    let mut ledger = populated_ledger();
    let balance = ledger.balance();

    let result = ledger.withdraw(&Address::from_seed("alice"));

    assert_eq!(result, Err(LedgerError::NotOwner));
    assert_eq!(ledger.balance(), balance);
    assert_eq!(ledger.total_withdrawn(), 0);
}

#[test]
fn test_withdraw_percent_is_configurable() {
    let fees = FeePolicy::new().with_post_price(1_000).with_withdraw_percent(50);
    let mut ledger = Ledger::new(deployer(), fees).unwrap();
    ledger.create_entry("x", 1_000, Address::from_seed("alice"), 1).unwrap();

    let split = ledger.withdraw(&deployer()).unwrap();

    assert_eq!(split.payout, 500);
    assert_eq!(ledger.balance(), 500);
}

#[test]
fn test_repeated_withdrawals_shrink_reserve() {
    let fees = FeePolicy::new().with_post_price(10_000);
    let mut ledger = Ledger::new(deployer(), fees).unwrap();
    ledger.create_entry("x", 10_000, Address::from_seed("alice"), 1).unwrap();

    ledger.withdraw(&deployer()).unwrap();
    ledger.withdraw(&deployer()).unwrap();

    assert_eq!(ledger.balance(), 25);
    assert_eq!(ledger.total_withdrawn(), 9_975);
}

#[test]
fn test_withdraw_empty_balance() {
    let mut ledger = Ledger::new(deployer(), FeePolicy::default()).unwrap();

    let split = ledger.withdraw(&deployer()).unwrap();

    assert_eq!(split.payout, 0);
    assert_eq!(split.retained, 0);
}

#[test]
fn test_withdraw_emits_event() {
    let fees = FeePolicy::new().with_post_price(100);
    let mut ledger = Ledger::new(deployer(), fees).unwrap();
    ledger.create_entry("x", 100, Address::from_seed("alice"), 1).unwrap();
    ledger.poll_events();

    ledger.withdraw(&deployer()).unwrap();

    assert_eq!(
        ledger.poll_events(),
        vec![LedgerEvent::Withdrawn {
            to: deployer(),
            amount: 95,
            retained: 5
        }]
    );
}

// ============================================================================
// STATISTICS
// ============================================================================

#[test]
fn test_statistics() {
    let mut ledger = populated_ledger();
    ledger
        .vote(EntryId::new(1), ledger.vote_price(), Address::from_seed("carol"))
        .unwrap();
    ledger.delete_entry(EntryId::new(2), &deployer()).unwrap();

    let stats = ledger.statistics();

    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.live_entries, 2);
    assert_eq!(stats.tombstoned_entries, 1);
    assert_eq!(stats.total_votes, 1);
    assert_eq!(stats.unique_authors, 2);
    assert_eq!(stats.balance, ledger.post_price() * 3 + ledger.vote_price());
}
