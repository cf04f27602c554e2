// Access module - single-owner authority for administrative operations

use crate::identity::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccessError {
    #[error("Only the contract owner can perform this action")]
    NotOwner,
}

/// The owner identity, fixed when the ledger is created and never transferred
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        &self.owner == caller
    }

    /// Reject any caller other than the owner
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if !self.is_owner(caller) {
            return Err(AccessError::NotOwner);
        }
        Ok(())
    }
}
