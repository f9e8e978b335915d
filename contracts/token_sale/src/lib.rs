#![no_std]

mod error;
mod events;
mod ledger;
mod storage;
mod validation;

pub use error::Error;
pub use storage::{SaleConfig, SaleState};

use events::*;
use storage::{
    read_config, read_contribution, read_outcome, read_tokens_sold, read_wei_raised,
    write_config, write_contribution, write_tokens_sold, write_wei_raised, DataKey, Outcome,
};
use validation::{
    calculate_token_amount, rate_change_allowed, remaining_allotment, sale_state,
    validate_config,
};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol, Vec};

#[contract]
pub struct TokenSale;

#[contractimpl]
impl TokenSale {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the sale over a ledger that has no minter yet
    ///
    /// The owner binds this contract as the ledger's minter afterwards.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidParameter`: Config violates the cap, goal, time or rate rules
    /// - `AlreadySet`: Ledger is already bound to a minter
    pub fn initialize(
        env: Env,
        owner: Address,
        token: Address,
        payment_asset: Address,
        config: SaleConfig,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();

        validate_config(&config, env.ledger().timestamp())?;

        if ledger::minter(&env, &token).is_some() {
            return Err(Error::AlreadySet);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage()
            .instance()
            .set(&DataKey::PaymentAsset, &payment_asset);
        write_config(&env, &config);
        write_wei_raised(&env, 0);
        write_tokens_sold(&env, 0);

        Ok(())
    }

    /// Change the purchase rate (owner only, before finalization)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    /// - `InvalidPhase`: Sale already finalized
    /// - `InvalidParameter`: New rate not within a factor of ten of the old one
    pub fn set_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        Self::require_not_finalized(&env)?;

        let mut config = Self::config(env.clone())?;
        let old_rate = config.rate;
        if !rate_change_allowed(old_rate, new_rate) {
            return Err(Error::InvalidParameter);
        }

        config.rate = new_rate;
        write_config(&env, &config);

        env.events().publish(
            (Symbol::new(&env, "RateChanged"),),
            RateChangedEvent { old_rate, new_rate },
        );

        Ok(())
    }

    /// Set the account receiving the team share (owner only, before finalization)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    /// - `InvalidPhase`: Sale already finalized
    pub fn set_team_account(env: Env, caller: Address, account: Address) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        Self::require_not_finalized(&env)?;

        env.storage().instance().set(&DataKey::TeamAccount, &account);

        Ok(())
    }

    // ============================================
    // PURCHASES
    // ============================================

    /// Buy ledger units with `value` of the payment asset
    ///
    /// Purchases on behalf of someone else are refused.
    ///
    /// Flow:
    /// 1. Check the sale is open and the buyer is approved
    /// 2. amount = value × rate, within the remaining allotment
    /// 3. Pull `value` from the purchaser
    /// 4. Mint `amount` on the ledger
    /// 5. Record raised funds, contribution and units sold
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidPhase`: Sale not open
    /// - `Unauthorized`: Purchaser differs from beneficiary
    /// - `InvalidParameter`: Value <= 0 or overflow
    /// - `NotAllowlisted`: Beneficiary not approved by the access gate
    /// - `CapacityExceeded`: Amount exceeds the remaining allotment
    pub fn buy_tokens(
        env: Env,
        purchaser: Address,
        beneficiary: Address,
        value: i128,
    ) -> Result<i128, Error> {
        let config = Self::config(env.clone())?;
        if sale_state(&config, env.ledger().timestamp(), read_outcome(&env)) != SaleState::Open {
            return Err(Error::InvalidPhase);
        }

        purchaser.require_auth();

        if purchaser != beneficiary {
            return Err(Error::Unauthorized);
        }
        if value <= 0 {
            return Err(Error::InvalidParameter);
        }

        let token = Self::token(env.clone())?;
        ledger::require_approved(&env, &token, &beneficiary)?;

        let amount = calculate_token_amount(value, config.rate).ok_or(Error::InvalidParameter)?;
        let tokens_sold = read_tokens_sold(&env);
        if amount > remaining_allotment(&config, tokens_sold) {
            return Err(Error::CapacityExceeded);
        }

        let wei_raised = read_wei_raised(&env)
            .checked_add(value)
            .ok_or(Error::InvalidParameter)?;
        let contribution = read_contribution(&env, &beneficiary)
            .checked_add(value)
            .ok_or(Error::InvalidParameter)?;

        let payment_asset = Self::payment_asset(env.clone())?;
        token::Client::new(&env, &payment_asset).transfer(
            &purchaser,
            &env.current_contract_address(),
            &value,
        );

        ledger::mint(&env, &token, &beneficiary, amount);

        write_wei_raised(&env, wei_raised);
        write_contribution(&env, &beneficiary, contribution);
        write_tokens_sold(&env, tokens_sold + amount);

        env.events().publish(
            (Symbol::new(&env, "TokenPurchase"), beneficiary.clone()),
            TokenPurchaseEvent {
                purchaser,
                beneficiary,
                value,
                amount,
            },
        );

        Ok(amount)
    }

    /// Mint off-chain settled allocations (owner only, before finalization)
    ///
    /// The whole batch is checked against the remaining allotment before
    /// anything is minted. Raised funds and contributions are not touched.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    /// - `InvalidPhase`: Sale already finalized
    /// - `InvalidParameter`: Length mismatch or negative amount
    /// - `CapacityExceeded`: Batch exceeds the remaining allotment
    pub fn distribute_tokens(
        env: Env,
        caller: Address,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;
        Self::require_not_finalized(&env)?;

        if recipients.len() != amounts.len() {
            return Err(Error::InvalidParameter);
        }

        let config = Self::config(env.clone())?;
        let mut tokens_sold = read_tokens_sold(&env);
        for amount in amounts.iter() {
            if amount < 0 {
                return Err(Error::InvalidParameter);
            }
            if amount > remaining_allotment(&config, tokens_sold) {
                return Err(Error::CapacityExceeded);
            }
            tokens_sold += amount;
        }

        let token = Self::token(env.clone())?;
        for (recipient, amount) in recipients.iter().zip(amounts.iter()) {
            ledger::mint(&env, &token, &recipient, amount);
        }

        write_tokens_sold(&env, tokens_sold);

        Ok(())
    }

    // ============================================
    // FINALIZATION & REFUNDS
    // ============================================

    /// Resolve the closed sale (owner only, once)
    ///
    /// Goal reached: mint the team share, fix the ledger supply and forward
    /// the raised funds to the wallet.
    /// Goal missed: decommission the ledger and open refunds.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    /// - `InvalidPhase`: Sale not closed yet
    /// - `AlreadySet`: Sale already finalized
    /// - `InvalidParameter`: Goal reached but no team account set
    /// - `NotAllowlisted`: Team account not approved by the access gate
    pub fn finalize(env: Env, caller: Address) -> Result<(), Error> {
        Self::require_owner(&env, &caller)?;

        if read_outcome(&env).is_some() {
            return Err(Error::AlreadySet);
        }
        if !Self::has_closed(env.clone())? {
            return Err(Error::InvalidPhase);
        }

        let token = Self::token(env.clone())?;
        let outcome = if Self::goal_reached(env.clone())? {
            let config = Self::config(env.clone())?;
            let team_account = Self::team_account(env.clone())?.ok_or(Error::InvalidParameter)?;
            ledger::require_approved(&env, &token, &team_account)?;

            if config.team_share > 0 {
                ledger::mint(&env, &token, &team_account, config.team_share);
            }
            ledger::finish_minting(&env, &token);

            let wei_raised = read_wei_raised(&env);
            if wei_raised > 0 {
                let payment_asset = Self::payment_asset(env.clone())?;
                token::Client::new(&env, &payment_asset).transfer(
                    &env.current_contract_address(),
                    &config.wallet,
                    &wei_raised,
                );
            }

            log!(&env, "sale finalized, goal met, funds forwarded", wei_raised);
            Outcome::GoalMet
        } else {
            ledger::decommission(&env, &token);

            log!(&env, "sale finalized, goal missed, ledger decommissioned");
            Outcome::GoalMissed
        };

        env.storage().instance().set(&DataKey::Outcome, &outcome);

        env.events().publish((Symbol::new(&env, "Finalized"),), ());

        Ok(())
    }

    /// Pay the investor back their whole contribution after a missed goal
    ///
    /// Nothing to refund is not an error: the call pays out zero.
    ///
    /// # Errors
    /// - `InvalidPhase`: Sale not finalized with the goal missed
    /// - `NotInitialized`: Contract not initialized
    pub fn claim_refund(env: Env, investor: Address) -> Result<i128, Error> {
        if read_outcome(&env) != Some(Outcome::GoalMissed) {
            return Err(Error::InvalidPhase);
        }

        investor.require_auth();

        let refund = read_contribution(&env, &investor);
        write_contribution(&env, &investor, 0);

        if refund > 0 {
            let payment_asset = Self::payment_asset(env.clone())?;
            token::Client::new(&env, &payment_asset).transfer(
                &env.current_contract_address(),
                &investor,
                &refund,
            );
        }

        Ok(refund)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn owner(env: Env) -> Result<Address, Error> {
        Self::read_address(&env, DataKey::Owner)
    }

    /// Ledger the sale mints on
    pub fn token(env: Env) -> Result<Address, Error> {
        Self::read_address(&env, DataKey::Token)
    }

    pub fn payment_asset(env: Env) -> Result<Address, Error> {
        Self::read_address(&env, DataKey::PaymentAsset)
    }

    pub fn config(env: Env) -> Result<SaleConfig, Error> {
        read_config(&env).ok_or(Error::NotInitialized)
    }

    pub fn token_cap(env: Env) -> Result<i128, Error> {
        Ok(Self::config(env)?.token_cap)
    }

    pub fn token_goal(env: Env) -> Result<i128, Error> {
        Ok(Self::config(env)?.token_goal)
    }

    pub fn opening_time(env: Env) -> Result<u64, Error> {
        Ok(Self::config(env)?.opening_time)
    }

    pub fn closing_time(env: Env) -> Result<u64, Error> {
        Ok(Self::config(env)?.closing_time)
    }

    pub fn rate(env: Env) -> Result<i128, Error> {
        Ok(Self::config(env)?.rate)
    }

    pub fn team_share(env: Env) -> Result<i128, Error> {
        Ok(Self::config(env)?.team_share)
    }

    pub fn team_account(env: Env) -> Result<Option<Address>, Error> {
        Self::config(env.clone())?;
        Ok(env.storage().instance().get(&DataKey::TeamAccount))
    }

    pub fn wallet(env: Env) -> Result<Address, Error> {
        Ok(Self::config(env)?.wallet)
    }

    /// Payment asset received from purchases
    pub fn wei_raised(env: Env) -> Result<i128, Error> {
        Self::config(env.clone())?;
        Ok(read_wei_raised(&env))
    }

    /// Units minted by purchases and distributions
    pub fn tokens_sold(env: Env) -> Result<i128, Error> {
        Self::config(env.clone())?;
        Ok(read_tokens_sold(&env))
    }

    /// Units still available to buyers and distributions
    pub fn token_remaining(env: Env) -> Result<i128, Error> {
        let config = Self::config(env.clone())?;
        Ok(remaining_allotment(&config, read_tokens_sold(&env)))
    }

    pub fn contribution_of(env: Env, investor: Address) -> i128 {
        read_contribution(&env, &investor)
    }

    pub fn has_closed(env: Env) -> Result<bool, Error> {
        Ok(env.ledger().timestamp() >= Self::config(env)?.closing_time)
    }

    /// Seconds until closing, zero once closed
    pub fn time_remaining(env: Env) -> Result<u64, Error> {
        let closing_time = Self::config(env.clone())?.closing_time;
        Ok(closing_time.saturating_sub(env.ledger().timestamp()))
    }

    pub fn goal_reached(env: Env) -> Result<bool, Error> {
        Ok(read_tokens_sold(&env) >= Self::config(env)?.token_goal)
    }

    pub fn is_finalized(env: Env) -> bool {
        read_outcome(&env).is_some()
    }

    pub fn sale_state(env: Env) -> Result<SaleState, Error> {
        let config = Self::config(env.clone())?;
        Ok(sale_state(
            &config,
            env.ledger().timestamp(),
            read_outcome(&env),
        ))
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
        let owner = Self::read_address(env, DataKey::Owner)?;
        caller.require_auth();
        if *caller != owner {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn require_not_finalized(env: &Env) -> Result<(), Error> {
        if read_outcome(env).is_some() {
            return Err(Error::InvalidPhase);
        }
        Ok(())
    }

    fn read_address(env: &Env, key: DataKey) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&key)
            .ok_or(Error::NotInitialized)
    }
}
