// Fee Policy Tests
// Tests for payment checks and the withdrawal split

use kwitter::fees::{
    format_ether, FeeError, FeePolicy, DEFAULT_POST_PRICE, DEFAULT_VOTE_PRICE, WEI_PER_ETHER,
};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_builder() {
    let policy = FeePolicy::new()
        .with_post_price(1_000)
        .with_vote_price(200)
        .with_withdraw_percent(80);

    assert_eq!(policy.post_price, 1_000);
    assert_eq!(policy.vote_price, 200);
    assert_eq!(policy.withdraw_percent, 80);
    assert!(policy.validate().is_ok());
}

#[test]
fn test_withdraw_percent_over_100_rejected() {
    let policy = FeePolicy::new().with_withdraw_percent(101);

    assert!(matches!(policy.validate(), Err(FeeError::InvalidConfig(_))));
}

#[test]
fn test_zero_prices_allowed() {
    let policy = FeePolicy::new().with_post_price(0).with_vote_price(0);

    assert!(policy.validate().is_ok());
    assert!(policy.check_post_payment(0).is_ok());
    assert!(policy.check_vote_payment(0).is_ok());
}

// ============================================================================
// PAYMENT CHECKS
// ============================================================================

#[test]
fn test_post_payment_at_least_price() {
    let policy = FeePolicy::default();

    assert!(policy.check_post_payment(DEFAULT_POST_PRICE).is_ok());
    assert!(policy.check_post_payment(DEFAULT_POST_PRICE * 3).is_ok());
    assert_eq!(
        policy.check_post_payment(DEFAULT_POST_PRICE - 1),
        Err(FeeError::InsufficientPayment {
            paid: DEFAULT_POST_PRICE - 1,
            required: DEFAULT_POST_PRICE
        })
    );
}

#[test]
fn test_vote_payment_at_least_price() {
    let policy = FeePolicy::default();

    assert!(policy.check_vote_payment(DEFAULT_VOTE_PRICE).is_ok());
    assert!(policy.check_vote_payment(0).is_err());
    // a vote payment is not enough to post
    assert!(policy.check_post_payment(DEFAULT_VOTE_PRICE).is_err());
}

// ============================================================================
// WITHDRAWAL SPLIT
// ============================================================================

#[test]
fn test_split_sums_to_balance() {
    let policy = FeePolicy::default();

    for balance in [0u128, 1, 99, 100, 101, 12_345, DEFAULT_POST_PRICE * 7] {
        let split = policy.split_withdrawal(balance);
        assert_eq!(split.payout + split.retained, balance);
    }
}

#[test]
fn test_split_floor_rounding() {
    let policy = FeePolicy::default();

    // 95% of 99 is 94.05
    let split = policy.split_withdrawal(99);
    assert_eq!(split.payout, 94);
    assert_eq!(split.retained, 5);
}

#[test]
fn test_split_extremes() {
    let everything = FeePolicy::new().with_withdraw_percent(100).split_withdrawal(500);
    let nothing = FeePolicy::new().with_withdraw_percent(0).split_withdrawal(500);

    assert_eq!(everything.payout, 500);
    assert_eq!(everything.retained, 0);
    assert_eq!(nothing.payout, 0);
    assert_eq!(nothing.retained, 500);
}

#[test]
fn test_format_ether_fractions() {
    assert_eq!(format_ether(0), "0");
    assert_eq!(format_ether(WEI_PER_ETHER + WEI_PER_ETHER / 2), "1.5");
    assert_eq!(format_ether(1), "0.000000000000000001");
}
