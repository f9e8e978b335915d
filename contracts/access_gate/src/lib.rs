#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
use events::{AddedToAllowlistEvent, RemovedFromAllowlistEvent};
use storage::DataKey;

use soroban_sdk::{contract, contractimpl, Address, Env, Symbol, Vec};

#[contract]
pub struct AccessGate;

#[contractimpl]
impl AccessGate {
    /// Initialize the gate with its root admin
    ///
    /// The root admin is also a list admin.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::RootAdmin, &admin);
        env.storage()
            .persistent()
            .set(&DataKey::Admin(admin), &true);

        Ok(())
    }

    /// Grant list-admin rights (root admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the root admin
    pub fn add_admin(env: Env, caller: Address, admin: Address) -> Result<(), Error> {
        Self::require_root_admin(&env, &caller)?;

        env.storage()
            .persistent()
            .set(&DataKey::Admin(admin), &true);

        Ok(())
    }

    /// Revoke list-admin rights (root admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the root admin
    pub fn remove_admin(env: Env, caller: Address, admin: Address) -> Result<(), Error> {
        Self::require_root_admin(&env, &caller)?;

        env.storage().persistent().remove(&DataKey::Admin(admin));

        Ok(())
    }

    /// Approve a batch of addresses
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not a list admin
    pub fn add_to_allowlist(env: Env, caller: Address, addresses: Vec<Address>) -> Result<(), Error> {
        Self::require_admin(&env, &caller)?;

        for address in addresses.iter() {
            let key = DataKey::Approved(address.clone());
            if env.storage().persistent().has(&key) {
                continue;
            }
            env.storage().persistent().set(&key, &true);

            env.events().publish(
                (Symbol::new(&env, "AddedToAllowlist"), address.clone()),
                AddedToAllowlistEvent { address },
            );
        }

        Ok(())
    }

    /// Revoke approval for a batch of addresses
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not a list admin
    pub fn remove_from_allowlist(
        env: Env,
        caller: Address,
        addresses: Vec<Address>,
    ) -> Result<(), Error> {
        Self::require_admin(&env, &caller)?;

        for address in addresses.iter() {
            let key = DataKey::Approved(address.clone());
            if !env.storage().persistent().has(&key) {
                continue;
            }
            env.storage().persistent().remove(&key);

            env.events().publish(
                (Symbol::new(&env, "RemovedFromAllowlist"), address.clone()),
                RemovedFromAllowlistEvent { address },
            );
        }

        Ok(())
    }

    /// Check if address may hold or move ledger units
    pub fn is_approved(env: Env, address: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Approved(address))
            .unwrap_or(false)
    }

    /// Check if address is a list admin
    pub fn is_admin(env: Env, address: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Admin(address))
            .unwrap_or(false)
    }

    fn require_root_admin(env: &Env, caller: &Address) -> Result<(), Error> {
        let root: Address = env
            .storage()
            .instance()
            .get(&DataKey::RootAdmin)
            .ok_or(Error::NotInitialized)?;

        caller.require_auth();

        if *caller != root {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        caller.require_auth();

        if !Self::is_admin(env.clone(), caller.clone()) {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, vec, Address, Env};

    fn setup(env: &Env) -> (AccessGateClient<'_>, Address) {
        let contract_id = env.register(AccessGate, ());
        let client = AccessGateClient::new(env, &contract_id);
        let admin = Address::generate(env);
        client.initialize(&admin);
        (client, admin)
    }

    #[test]
    fn test_initialize() {
        let env = Env::default();
        env.mock_all_auths();

        let (client, admin) = setup(&env);

        assert!(client.is_admin(&admin));
        let result = client.try_initialize(&admin);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_allowlist_roundtrip() {
        let env = Env::default();
        env.mock_all_auths();

        let (client, admin) = setup(&env);
        let investor1 = Address::generate(&env);
        let investor2 = Address::generate(&env);

        assert!(!client.is_approved(&investor1));

        client.add_to_allowlist(&admin, &vec![&env, investor1.clone(), investor2.clone()]);
        assert!(client.is_approved(&investor1));
        assert!(client.is_approved(&investor2));

        client.remove_from_allowlist(&admin, &vec![&env, investor1.clone()]);
        assert!(!client.is_approved(&investor1));
        assert!(client.is_approved(&investor2));
    }

    #[test]
    fn test_non_admin_cannot_change_list() {
        let env = Env::default();
        env.mock_all_auths();

        let (client, _admin) = setup(&env);
        let anyone = Address::generate(&env);

        let result = client.try_add_to_allowlist(&anyone, &vec![&env, anyone.clone()]);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));
        assert!(!client.is_approved(&anyone));
    }

    #[test]
    fn test_delegated_admin() {
        let env = Env::default();
        env.mock_all_auths();

        let (client, admin) = setup(&env);
        let delegate = Address::generate(&env);
        let investor = Address::generate(&env);

        // only the root admin hands out admin rights
        let result = client.try_add_admin(&delegate, &delegate);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));

        client.add_admin(&admin, &delegate);
        client.add_to_allowlist(&delegate, &vec![&env, investor.clone()]);
        assert!(client.is_approved(&investor));

        client.remove_admin(&admin, &delegate);
        let result = client.try_remove_from_allowlist(&delegate, &vec![&env, investor.clone()]);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));
    }
}
