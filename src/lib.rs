//! Kwitter - a pay-to-post social feed ledger.
//!
//! Users publish short entries and vote on each other's entries, paying a
//! fixed fee for each. A single owner may tombstone entries and withdraw
//! collected fees. The `feed` module rebuilds ordered, per-viewer feeds
//! from independent (and individually fallible) ledger reads.

pub mod access;
pub mod feed;
pub mod fees;
pub mod identity;
pub mod ledger;
pub mod storage;
