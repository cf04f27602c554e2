// Feed module - THE READ SIDE
// Reconstructs ordered, per-viewer feeds from independent ledger reads

mod assembler;
mod model;
mod source;

pub use assembler::{FeedAssembler, FeedConfig, FeedError};
pub use model::{AccountProfile, Feed, FeedEntry, ReadFailure, SortBy};
pub use source::{LedgerSource, MockLedgerSource, SourceError};
