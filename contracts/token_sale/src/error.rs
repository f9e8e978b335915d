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
    /// Caller is not the owner, or buys on behalf of someone else
    Unauthorized = 10,
    /// Address is not approved by the ledger's access gate
    NotAllowlisted = 11,

    // ============================================
    // SALE STATE ERRORS (20-29)
    // ============================================
    /// Sale is not in the state the operation needs
    InvalidPhase = 20,

    // ============================================
    // CAPACITY ERRORS (30-39)
    // ============================================
    /// Purchase or distribution exceeds the remaining allotment
    CapacityExceeded = 30,

    // ============================================
    // PARAMETER ERRORS (40-49)
    // ============================================
    /// Malformed config, zero value, rate out of bounds or overflow
    InvalidParameter = 40,
    /// One-way field was already assigned
    AlreadySet = 41,
}
