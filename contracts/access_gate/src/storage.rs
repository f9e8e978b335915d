use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    RootAdmin,
    Admin(Address),
    Approved(Address),
}
