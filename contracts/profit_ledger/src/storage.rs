use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const DECIMALS: u32 = 7;

/// Per-holder ledger record
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Account {
    /// Ledger units held
    pub balance: i128,
    /// `total_profits` at the last settlement of this account
    pub last_total_profits: i128,
    /// Settled profit not yet withdrawn
    pub profit_share: i128,
}

impl Account {
    /// Holds neither units nor profit. A baseline alone is not kept, it
    /// never changes what a zero balance is owed.
    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.profit_share == 0
    }
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Owner,
    AccessGate,
    ProfitDepositor,
    KeyRecoverer,
    Minter,
    ProfitAsset,
    TokenName,
    TokenSymbol,
    Phase,
    TotalSupply,
    TotalProfits,
    Account(Address),
    Allowance(Address, Address), // (owner, spender)
}

pub fn read_account(env: &Env, id: &Address) -> Account {
    env.storage()
        .persistent()
        .get::<DataKey, Account>(&DataKey::Account(id.clone()))
        .unwrap_or_default()
}

pub fn write_account(env: &Env, id: &Address, account: &Account) {
    let key = DataKey::Account(id.clone());
    if account.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, account);
    }
}

pub fn read_allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    env.storage()
        .persistent()
        .get::<DataKey, i128>(&DataKey::Allowance(owner.clone(), spender.clone()))
        .unwrap_or(0)
}

pub fn write_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = DataKey::Allowance(owner.clone(), spender.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}

pub fn read_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn write_total_supply(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::TotalSupply, &amount);
}

pub fn read_total_profits(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalProfits)
        .unwrap_or(0)
}

pub fn write_total_profits(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::TotalProfits, &amount);
}
