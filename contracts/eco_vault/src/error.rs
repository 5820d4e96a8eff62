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
    /// No token ids given
    EmptyTokenList = 20,
    /// More than the per-call limit of token ids
    TooManyTokens = 21,
    /// Arithmetic overflow
    MathOverflow = 22,

    // ============================================
    // LOAN STATE ERRORS (40-59)
    // ============================================
    /// No loan record for this token
    LoanNotFound = 40,
    /// A loan is already active for this token
    LoanActive = 41,
    /// No active loan for this token
    LoanNotActive = 42,
    /// Caller is not the borrower of this loan
    NotBorrower = 43,
    /// Redeemed assets cannot collateralize a loan
    RedeemedAsset = 44,
    /// Caller does not hold the token
    NotTokenOwner = 45,
    /// The vault does not hold this token
    NotInVault = 46,

    // ============================================
    // OPERATIONAL ERRORS (70-79)
    // ============================================
    /// Contract is paused
    ContractPaused = 70,
    /// Reentrant call rejected
    ReentrantCall = 71,
}
