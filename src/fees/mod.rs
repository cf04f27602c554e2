// Fees module - what posting and voting cost, and how the owner gets paid

mod policy;

pub use policy::{
    format_ether, Amount, FeeError, FeePolicy, WithdrawalSplit, DEFAULT_POST_PRICE,
    DEFAULT_VOTE_PRICE, DEFAULT_WITHDRAW_PERCENT, WEI_PER_ETHER,
};
