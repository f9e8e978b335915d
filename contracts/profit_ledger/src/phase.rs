//! Lifecycle of the ledger and its one-way role slot.
//!
//! Every entry point consults this module instead of reading flags directly,
//! so the allowed transitions live in one table.

use crate::error::Error;
use crate::storage::DataKey;
use soroban_sdk::{contracttype, Address, Env};

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Units may be minted, nothing moves between holders
    Minting = 0,
    /// Supply is fixed, transfers and approvals are open
    Transferable = 1,
    /// Sale failed, the ledger is inert forever
    Decommissioned = 2,
}

impl Phase {
    fn may_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Minting, Phase::Transferable) | (Phase::Minting, Phase::Decommissioned)
        )
    }
}

pub fn current(env: &Env) -> Phase {
    env.storage()
        .instance()
        .get(&DataKey::Phase)
        .unwrap_or(Phase::Minting)
}

/// Fails once the ledger is decommissioned, returns the live phase otherwise.
pub fn require_live(env: &Env) -> Result<Phase, Error> {
    match current(env) {
        Phase::Decommissioned => Err(Error::Decommissioned),
        phase => Ok(phase),
    }
}

pub fn require(env: &Env, expected: Phase) -> Result<(), Error> {
    if require_live(env)? != expected {
        return Err(Error::InvalidPhase);
    }
    Ok(())
}

pub fn advance(env: &Env, next: Phase) -> Result<(), Error> {
    let phase = require_live(env)?;
    if !phase.may_advance_to(next) {
        return Err(Error::InvalidPhase);
    }
    env.storage().instance().set(&DataKey::Phase, &next);
    Ok(())
}

pub fn minter(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Minter)
}

/// Assigns the minter slot; it moves from unset to set exactly once.
pub fn assign_minter(env: &Env, minter: &Address) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::Minter) {
        return Err(Error::AlreadySet);
    }
    env.storage().instance().set(&DataKey::Minter, minter);
    Ok(())
}

pub fn require_minter(env: &Env, caller: &Address) -> Result<(), Error> {
    let minter = minter(env).ok_or(Error::Unauthorized)?;
    caller.require_auth();
    if *caller != minter {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert!(Phase::Minting.may_advance_to(Phase::Transferable));
        assert!(Phase::Minting.may_advance_to(Phase::Decommissioned));
        assert!(!Phase::Transferable.may_advance_to(Phase::Transferable));
        assert!(!Phase::Transferable.may_advance_to(Phase::Decommissioned));
        assert!(!Phase::Transferable.may_advance_to(Phase::Minting));
        assert!(!Phase::Decommissioned.may_advance_to(Phase::Minting));
        assert!(!Phase::Minting.may_advance_to(Phase::Minting));
    }
}
