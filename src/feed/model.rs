// Feed model - what the assembler hands to a renderer

use crate::feed::source::SourceError;
use crate::identity::Address;
use crate::ledger::{Entry, EntryId};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Feed ordering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    /// Newest first
    #[default]
    Newest,
    /// Highest vote count first, newest first among ties
    MostVoted,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Newest => write!(f, "newest"),
            SortBy::MostVoted => write!(f, "most voted"),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortBy::Newest),
            "most voted" | "most-voted" | "most_voted" => Ok(SortBy::MostVoted),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

/// An entry annotated for a particular viewer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: EntryId,
    pub author: Address,
    /// Raw content bytes, exactly as stored
    pub content: Vec<u8>,
    pub vote_count: u64,
    pub timestamp: u64,
    /// Whether the viewer already voted on this entry
    pub has_voted: bool,
}

impl FeedEntry {
    pub fn from_entry(entry: &Entry, has_voted: bool) -> Self {
        Self {
            id: entry.id(),
            author: *entry.author(),
            content: entry.content().to_vec(),
            vote_count: entry.vote_count(),
            timestamp: entry.timestamp(),
            has_voted,
        }
    }

    /// Content decoded as UTF-8 (lossy), for display
    pub fn content_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Whether `viewer` may vote on this entry
    pub fn can_vote(&self, viewer: &Address) -> bool {
        &self.author != viewer && !self.has_voted
    }
}

/// A candidate that was dropped because a read failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadFailure {
    pub id: EntryId,
    pub error: SourceError,
}

/// An assembled feed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feed {
    /// Displayable entries in final order
    pub entries: Vec<FeedEntry>,
    /// Candidates left out because their reads failed
    pub failures: Vec<ReadFailure>,
}

impl Feed {
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An account's page: its entries plus a few facts about it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountProfile {
    pub account: Address,
    /// The account is the ledger owner
    pub is_owner: bool,
    /// Raw Account Index, tombstoned ids included
    pub entry_ids: Vec<EntryId>,
    pub feed: Feed,
    /// Timestamp of the earliest entry still visible
    pub first_entry_at: Option<u64>,
}
