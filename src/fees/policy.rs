// Fee Policy - price gates for posting and voting, and the withdrawal split

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monetary amount in the ledger's smallest unit (wei)
pub type Amount = u128;

/// 1 ether expressed in wei
pub const WEI_PER_ETHER: Amount = 1_000_000_000_000_000_000;

/// Default price to publish an entry (0.01 ether)
pub const DEFAULT_POST_PRICE: Amount = WEI_PER_ETHER / 100;

/// Default price to vote on an entry (0.002 ether)
pub const DEFAULT_VOTE_PRICE: Amount = WEI_PER_ETHER / 500;

/// Default share of the balance paid out on withdrawal
pub const DEFAULT_WITHDRAW_PERCENT: u8 = 95;

/// Errors from fee checks
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeeError {
    #[error("Not enough paid: paid {paid}, required {required}")]
    InsufficientPayment { paid: Amount, required: Amount },

    #[error("Invalid fee configuration: {0}")]
    InvalidConfig(String),
}

/// How a withdrawal divides the current balance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalSplit {
    /// Amount transferred to the owner
    pub payout: Amount,
    /// Amount left behind as reserve
    pub retained: Amount,
}

/// Fixed prices and withdrawal share, set once when the ledger is created
///
/// Payments are "at least" checks. Anything above the price is kept by the
/// ledger; there is no change-making.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Minimum payment to create an entry
    pub post_price: Amount,
    /// Minimum payment to vote
    pub vote_price: Amount,
    /// Percentage (0..=100) of the balance paid out by `withdraw`
    pub withdraw_percent: u8,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            post_price: DEFAULT_POST_PRICE,
            vote_price: DEFAULT_VOTE_PRICE,
            withdraw_percent: DEFAULT_WITHDRAW_PERCENT,
        }
    }
}

impl FeePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post_price(mut self, price: Amount) -> Self {
        self.post_price = price;
        self
    }

    pub fn with_vote_price(mut self, price: Amount) -> Self {
        self.vote_price = price;
        self
    }

    pub fn with_withdraw_percent(mut self, percent: u8) -> Self {
        self.withdraw_percent = percent;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FeeError> {
        if self.withdraw_percent > 100 {
            return Err(FeeError::InvalidConfig(format!(
                "withdraw_percent must be <= 100, got {}",
                self.withdraw_percent
            )));
        }
        Ok(())
    }

    /// Guard for `createEntry`
    pub fn check_post_payment(&self, paid: Amount) -> Result<(), FeeError> {
        Self::check_at_least(paid, self.post_price)
    }

    /// Guard for `vote`
    pub fn check_vote_payment(&self, paid: Amount) -> Result<(), FeeError> {
        Self::check_at_least(paid, self.vote_price)
    }

    fn check_at_least(paid: Amount, required: Amount) -> Result<(), FeeError> {
        if paid < required {
            return Err(FeeError::InsufficientPayment { paid, required });
        }
        Ok(())
    }

    /// Split a balance into owner payout and retained reserve
    pub fn split_withdrawal(&self, balance: Amount) -> WithdrawalSplit {
        let percent = Amount::from(self.withdraw_percent.min(100));
        // floor(balance * percent / 100) without overflowing on large balances
        let payout = (balance / 100) * percent + (balance % 100) * percent / 100;
        WithdrawalSplit {
            payout,
            retained: balance - payout,
        }
    }
}

/// Render a wei amount as a decimal ether string (e.g. `0.01`)
pub fn format_ether(amount: Amount) -> String {
    let whole = amount / WEI_PER_ETHER;
    let frac = amount % WEI_PER_ETHER;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
