use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const RATE_CHANGE_FACTOR: i128 = 10; // a new rate stays within one order of magnitude

/// Deployment-time sale parameters
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Maximum ledger units the sale may ever mint, team share included
    pub token_cap: i128,
    /// Units that must be sold for the sale to succeed
    pub token_goal: i128,
    /// Unix timestamp when purchases open
    pub opening_time: u64,
    /// Unix timestamp when purchases close
    pub closing_time: u64,
    /// Ledger units per unit of the payment asset
    pub rate: i128,
    /// Units minted to the team account on success
    pub team_share: i128,
    /// Receives the raised funds on success
    pub wallet: Address,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SaleState {
    /// Before the opening time
    Pending = 0,
    /// Purchases accepted
    Open = 1,
    /// Past the closing time, waiting for finalization
    Closed = 2,
    /// Finalized with the goal reached, supply is fixed
    GoalMet = 3,
    /// Finalized with the goal missed, refunds are claimable
    GoalMissed = 4,
}

/// Result of finalization, stored once
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    GoalMet = 0,
    GoalMissed = 1,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Owner,
    Token,
    PaymentAsset,
    Config,
    TeamAccount,
    WeiRaised,
    TokensSold,
    Outcome,
    Contribution(Address),
}

pub fn read_config(env: &Env) -> Option<SaleConfig> {
    env.storage().instance().get(&DataKey::Config)
}

pub fn write_config(env: &Env, config: &SaleConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_outcome(env: &Env) -> Option<Outcome> {
    env.storage().instance().get(&DataKey::Outcome)
}

pub fn read_wei_raised(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::WeiRaised)
        .unwrap_or(0)
}

pub fn write_wei_raised(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::WeiRaised, &amount);
}

pub fn read_tokens_sold(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TokensSold)
        .unwrap_or(0)
}

pub fn write_tokens_sold(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::TokensSold, &amount);
}

pub fn read_contribution(env: &Env, investor: &Address) -> i128 {
    env.storage()
        .persistent()
        .get::<DataKey, i128>(&DataKey::Contribution(investor.clone()))
        .unwrap_or(0)
}

pub fn write_contribution(env: &Env, investor: &Address, amount: i128) {
    let key = DataKey::Contribution(investor.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}
