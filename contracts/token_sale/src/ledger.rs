//! Calls into the profit ledger the sale mints on.

use crate::error::Error;
use soroban_sdk::{vec, Address, Env, IntoVal, Symbol, Vec};

/// Minter currently bound on the ledger, `None` while unbound
pub fn minter(env: &Env, token: &Address) -> Option<Address> {
    env.invoke_contract(token, &Symbol::new(env, "minter"), Vec::new(env))
}

/// Ask the ledger's access gate whether `address` may hold units.
pub fn require_approved(env: &Env, token: &Address, address: &Address) -> Result<(), Error> {
    let gate: Address =
        env.invoke_contract(token, &Symbol::new(env, "access_gate"), Vec::new(env));

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

pub fn mint(env: &Env, token: &Address, to: &Address, amount: i128) {
    env.invoke_contract::<()>(
        token,
        &Symbol::new(env, "mint"),
        vec![
            env,
            env.current_contract_address().to_val(),
            to.to_val(),
            amount.into_val(env),
        ],
    );
}

pub fn finish_minting(env: &Env, token: &Address) {
    env.invoke_contract::<()>(
        token,
        &Symbol::new(env, "finish_minting"),
        vec![env, env.current_contract_address().to_val()],
    );
}

pub fn decommission(env: &Env, token: &Address) {
    env.invoke_contract::<()>(
        token,
        &Symbol::new(env, "decommission"),
        vec![env, env.current_contract_address().to_val()],
    );
}
