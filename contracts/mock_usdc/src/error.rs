use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    /// Amount must be positive
    InvalidAmount = 20,
    /// Fee must not exceed 10,000 basis points
    InvalidFee = 21,
    /// Expiration ledger is in the past for a live allowance
    InvalidExpiration = 22,

    /// Not enough balance
    InsufficientBalance = 40,
    /// Not enough allowance
    InsufficientAllowance = 41,
}
