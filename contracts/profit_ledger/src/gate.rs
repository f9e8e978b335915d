use crate::error::Error;
use crate::storage::DataKey;
use soroban_sdk::{vec, Address, Env, Symbol};

pub fn access_gate(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::AccessGate)
        .ok_or(Error::NotInitialized)
}

/// Ask the access gate whether `address` may hold or move ledger units.
pub fn require_approved(env: &Env, address: &Address) -> Result<(), Error> {
    let gate = access_gate(env)?;

    let approved: bool = env.invoke_contract(
        &gate,
        &Symbol::new(env, "is_approved"),
        vec![env, address.to_val()],
    );

    if !approved {
        return Err(Error::NotAllowlisted);
    }
    Ok(())
}
