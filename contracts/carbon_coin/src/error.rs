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
    // ROLE ERRORS (10-19)
    // ============================================
    /// Caller is not the minter
    NotMinter = 10,
    /// Admin role was renounced, minter can no longer change
    AdminRenounced = 11,
    /// No minter has been assigned
    MinterNotSet = 12,

    // ============================================
    // AMOUNT ERRORS (20-39)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 20,
    /// Mint would exceed MAX_SUPPLY
    ExceedsMaxSupply = 21,
    /// Expiration ledger is in the past for a live allowance
    InvalidExpiration = 22,

    // ============================================
    // BALANCE ERRORS (40-49)
    // ============================================
    /// Not enough balance
    InsufficientBalance = 40,
    /// Not enough allowance
    InsufficientAllowance = 41,
}
