use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // VALIDATION ERRORS (20-39)
    // ============================================
    /// Payment token is not a 6-decimal token
    InvalidPaymentToken = 20,
    /// No producers given
    EmptyBatch = 21,
    /// Producers and cids differ in length
    ArrayLengthMismatch = 22,
    /// Batch size exceeds the configured maximum
    BatchTooLarge = 23,
    /// Content id longer than 100 characters
    CidTooLong = 24,
    /// Amount or quantity must be positive
    InvalidAmount = 25,
    /// Base price must be positive
    InvalidBasePrice = 26,
    /// Price floor must be positive
    InvalidPriceFloor = 27,
    /// Price floor cannot exceed the base price
    FloorAboveBase = 28,
    /// Base price must be at least the price floor
    BaseBelowFloor = 29,
    /// Platform share cannot exceed 50%
    InvalidPlatformShare = 30,
    /// Daily decay must be positive
    InvalidDecayRate = 31,
    /// Price delta must not be negative
    InvalidPriceDelta = 32,
    /// Increase threshold must be >= 1 and below the decrease threshold
    InvalidThresholds = 33,
    /// Max batch size must be between 1 and 100
    InvalidBatchLimit = 34,
    /// Iteration limit must be between 1 and 1000
    InvalidIterationLimit = 35,
    /// No token ids given
    EmptyTokenList = 36,

    // ============================================
    // STATE / PRECONDITION ERRORS (40-59)
    // ============================================
    /// Batch does not exist
    BatchNotFound = 40,
    /// Token does not exist
    TokenNotFound = 41,
    /// Not enough unsold tokens in the batch
    NotEnoughInBatch = 42,
    /// Slippage ceiling below the current total cost
    InsufficientFunds = 43,
    /// Not enough token units
    InsufficientBalance = 44,
    /// Caller does not hold the token
    NotTokenOwner = 45,
    /// Token already redeemed
    AlreadyRedeemed = 46,
    /// Tokens cannot be transferred back to the marketplace
    NoExternalReturns = 47,
    /// No funds to claim
    NoFundsToClaim = 48,
    /// No surplus to recover
    NoSurplus = 49,
    /// The payment token is recovered through the surplus path only
    CannotRecoverUsdc = 50,
    /// No foreign balance to recover
    NothingToRecover = 51,

    // ============================================
    // TRANSFER INTEGRITY ERRORS (60-69)
    // ============================================
    /// Received less than requested: fee-on-transfer not supported
    FeeOnTransferPayment = 60,
    /// Producer payout moved less than expected
    FeeOnTransferPayout = 61,
    /// Refund moved less than expected
    FeeOnTransferRefund = 62,
    /// Arithmetic overflow
    MathOverflow = 65,

    // ============================================
    // OPERATIONAL ERRORS (70-79)
    // ============================================
    /// Contract is paused
    ContractPaused = 70,
    /// Reentrant call rejected
    ReentrantCall = 71,
}
