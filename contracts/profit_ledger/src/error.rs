use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller does not hold the required role
    Unauthorized = 10,
    /// Address is not approved by the access gate
    NotAllowlisted = 11,

    // ============================================
    // PHASE ERRORS (20-29)
    // ============================================
    /// Operation not valid in the current phase
    InvalidPhase = 20,
    /// Ledger was decommissioned, every call fails
    Decommissioned = 21,

    // ============================================
    // BALANCE ERRORS (30-39)
    // ============================================
    /// Debited account holds less than the amount
    InsufficientBalance = 30,
    /// Spender allowance is lower than the amount
    InsufficientAllowance = 31,

    // ============================================
    // PARAMETER ERRORS (40-49)
    // ============================================
    /// Negative or zero amount, arithmetic overflow, or unusable address
    InvalidParameter = 40,
    /// One-way field was already assigned
    AlreadySet = 41,
}
