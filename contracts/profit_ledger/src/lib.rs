#![no_std]

mod dividends;
mod error;
mod events;
mod gate;
mod phase;
mod storage;

pub use error::Error;
pub use phase::Phase;
pub use storage::Account;

use dividends::calculate_owing;
use events::*;
use storage::{
    read_account, read_allowance, read_total_profits, read_total_supply, write_account,
    write_allowance, write_total_profits, write_total_supply, DataKey, DECIMALS,
};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, String, Symbol};

#[contract]
pub struct ProfitLedger;

#[contractimpl]
impl ProfitLedger {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the ledger in the minting phase with no minter
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        owner: Address,
        access_gate: Address,
        profit_depositor: Address,
        key_recoverer: Address,
        profit_asset: Address,
        name: String,
        symbol: String,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::AccessGate, &access_gate);
        env.storage()
            .instance()
            .set(&DataKey::ProfitDepositor, &profit_depositor);
        env.storage()
            .instance()
            .set(&DataKey::KeyRecoverer, &key_recoverer);
        env.storage()
            .instance()
            .set(&DataKey::ProfitAsset, &profit_asset);
        env.storage().instance().set(&DataKey::TokenName, &name);
        env.storage().instance().set(&DataKey::TokenSymbol, &symbol);
        env.storage().instance().set(&DataKey::Phase, &Phase::Minting);
        write_total_supply(&env, 0);
        write_total_profits(&env, 0);

        Ok(())
    }

    /// Point the ledger at another access gate (owner only)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    pub fn set_access_gate(env: Env, caller: Address, access_gate: Address) -> Result<(), Error> {
        phase::require_live(&env)?;
        Self::require_owner(&env, &caller)?;

        env.storage()
            .instance()
            .set(&DataKey::AccessGate, &access_gate);

        env.events().publish(
            (Symbol::new(&env, "WhitelistChanged"),),
            WhitelistChangedEvent {
                new_whitelist: access_gate,
            },
        );

        Ok(())
    }

    /// Replace the profit depositor (owner only)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    pub fn set_profit_depositor(
        env: Env,
        caller: Address,
        profit_depositor: Address,
    ) -> Result<(), Error> {
        phase::require_live(&env)?;
        Self::require_owner(&env, &caller)?;

        let previous: Address = env
            .storage()
            .instance()
            .get(&DataKey::ProfitDepositor)
            .ok_or(Error::NotInitialized)?;
        env.storage()
            .instance()
            .set(&DataKey::ProfitDepositor, &profit_depositor);

        env.events().publish(
            (Symbol::new(&env, "ProfitDepositorChanged"),),
            ProfitDepositorChangedEvent {
                previous,
                new_profit_depositor: profit_depositor,
            },
        );

        Ok(())
    }

    /// Replace the key recoverer (owner only)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    pub fn set_key_recoverer(
        env: Env,
        caller: Address,
        key_recoverer: Address,
    ) -> Result<(), Error> {
        phase::require_live(&env)?;
        Self::require_owner(&env, &caller)?;

        let previous: Address = env
            .storage()
            .instance()
            .get(&DataKey::KeyRecoverer)
            .ok_or(Error::NotInitialized)?;
        env.storage()
            .instance()
            .set(&DataKey::KeyRecoverer, &key_recoverer);

        env.events().publish(
            (Symbol::new(&env, "KeyRecovererChanged"),),
            KeyRecovererChangedEvent {
                previous,
                new_key_recoverer: key_recoverer,
            },
        );

        Ok(())
    }

    /// Bind the minter role (owner only, exactly once)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the owner
    /// - `AlreadySet`: Minter was bound before
    pub fn set_minter(env: Env, caller: Address, minter: Address) -> Result<(), Error> {
        phase::require_live(&env)?;
        Self::require_owner(&env, &caller)?;

        phase::assign_minter(&env, &minter)
    }

    // ============================================
    // MINTING INTERFACE (minter only)
    // ============================================

    /// Mint units to an approved account
    ///
    /// The beneficiary is settled first so fresh units never claim profits
    /// deposited before they existed.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `Unauthorized`: Caller is not the minter
    /// - `InvalidPhase`: Minting already finished
    /// - `InvalidParameter`: Negative amount or overflow
    /// - `NotAllowlisted`: Beneficiary not approved by the access gate
    pub fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), Error> {
        phase::require_live(&env)?;
        phase::require_minter(&env, &caller)?;
        phase::require(&env, Phase::Minting)?;

        if amount < 0 {
            return Err(Error::InvalidParameter);
        }

        gate::require_approved(&env, &to)?;

        let (mut account, owing) = Self::settle(&env, &to)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(Error::InvalidParameter)?;

        let total_supply = read_total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::InvalidParameter)?;

        write_account(&env, &to, &account);
        write_total_supply(&env, total_supply);

        if owing > 0 {
            Self::publish_share_update(&env, &to, owing);
        }
        env.events().publish(
            (Symbol::new(&env, "Minted"), to.clone()),
            MintedEvent { to, amount },
        );

        Ok(())
    }

    /// Fix the total supply and open transfers (minter only, once)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `Unauthorized`: Caller is not the minter
    /// - `InvalidPhase`: Minting already finished
    pub fn finish_minting(env: Env, caller: Address) -> Result<(), Error> {
        phase::require_live(&env)?;
        phase::require_minter(&env, &caller)?;
        phase::advance(&env, Phase::Transferable)?;

        env.events()
            .publish((Symbol::new(&env, "MintFinished"),), ());

        Ok(())
    }

    /// Retire the ledger for good after a failed sale (minter only)
    ///
    /// Profits held by the ledger go back to the owner. Afterwards every call,
    /// queries included, fails with `Decommissioned`.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `Unauthorized`: Caller is not the minter
    /// - `InvalidPhase`: Minting already finished
    pub fn decommission(env: Env, caller: Address) -> Result<(), Error> {
        phase::require_live(&env)?;
        phase::require_minter(&env, &caller)?;

        let owner = Self::read_address(&env, DataKey::Owner)?;
        let profit_asset = Self::read_address(&env, DataKey::ProfitAsset)?;

        phase::advance(&env, Phase::Decommissioned)?;

        let asset = token::Client::new(&env, &profit_asset);
        let held = asset.balance(&env.current_contract_address());
        if held > 0 {
            asset.transfer(&env.current_contract_address(), &owner, &held);
        }

        log!(&env, "ledger decommissioned, profits swept to owner", held);

        Ok(())
    }

    // ============================================
    // TRANSFERS
    // ============================================

    /// Move units between two approved accounts
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidPhase`: Minting not finished yet
    /// - `InvalidParameter`: Negative amount
    /// - `NotAllowlisted`: Sender or recipient not approved
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        phase::require(&env, Phase::Transferable)?;

        if amount < 0 {
            return Err(Error::InvalidParameter);
        }

        from.require_auth();

        gate::require_approved(&env, &from)?;
        gate::require_approved(&env, &to)?;

        Self::move_units(&env, &from, &to, amount)
    }

    /// Move units on behalf of `from` within the spender's allowance
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidPhase`: Minting not finished yet
    /// - `InvalidParameter`: Negative amount
    /// - `NotAllowlisted`: Sender or recipient not approved
    /// - `InsufficientAllowance`: Amount exceeds the allowance
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        phase::require(&env, Phase::Transferable)?;

        if amount < 0 {
            return Err(Error::InvalidParameter);
        }

        spender.require_auth();

        gate::require_approved(&env, &from)?;
        gate::require_approved(&env, &to)?;

        let allowance = read_allowance(&env, &from, &spender);
        if amount > allowance {
            return Err(Error::InsufficientAllowance);
        }

        Self::move_units(&env, &from, &to, amount)?;
        write_allowance(&env, &from, &spender, allowance - amount);

        Ok(())
    }

    /// Set the allowance of `spender` over the units of `from`
    ///
    /// The allowance is overwritten unconditionally. Holders changing a
    /// nonzero allowance should set it to zero first, otherwise a spender
    /// racing the change can use both the old and the new allowance.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidPhase`: Minting not finished yet
    /// - `InvalidParameter`: Negative amount
    /// - `NotAllowlisted`: Approver not approved by the access gate
    pub fn approve(env: Env, from: Address, spender: Address, amount: i128) -> Result<(), Error> {
        phase::require(&env, Phase::Transferable)?;

        if amount < 0 {
            return Err(Error::InvalidParameter);
        }

        from.require_auth();

        gate::require_approved(&env, &from)?;

        write_allowance(&env, &from, &spender, amount);

        env.events().publish(
            (Symbol::new(&env, "Approval"), from.clone(), spender.clone()),
            ApprovalEvent {
                owner: from,
                spender,
                value: amount,
            },
        );

        Ok(())
    }

    // ============================================
    // PROFIT SHARING
    // ============================================

    /// Deposit profit to be shared among holders (profit depositor only)
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidParameter`: Amount <= 0 or overflow
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the profit depositor
    pub fn deposit_profit(env: Env, depositor: Address, amount: i128) -> Result<(), Error> {
        phase::require_live(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidParameter);
        }

        let profit_depositor = Self::read_address(&env, DataKey::ProfitDepositor)?;
        depositor.require_auth();
        if depositor != profit_depositor {
            return Err(Error::Unauthorized);
        }

        let total_profits = read_total_profits(&env)
            .checked_add(amount)
            .ok_or(Error::InvalidParameter)?;

        let profit_asset = Self::read_address(&env, DataKey::ProfitAsset)?;
        token::Client::new(&env, &profit_asset).transfer(
            &depositor,
            &env.current_contract_address(),
            &amount,
        );

        write_total_profits(&env, total_profits);

        env.events().publish(
            (Symbol::new(&env, "ProfitDeposited"), depositor.clone()),
            ProfitDepositedEvent { depositor, amount },
        );

        Ok(())
    }

    /// Profit the investor is owed since their last settlement
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidParameter`: Arithmetic overflow
    pub fn profit_share_owing(env: Env, investor: Address) -> Result<i128, Error> {
        phase::require_live(&env)?;

        let account = read_account(&env, &investor);
        calculate_owing(
            &env,
            read_total_profits(&env),
            account.last_total_profits,
            account.balance,
            read_total_supply(&env),
        )
        .ok_or(Error::InvalidParameter)
    }

    /// Settle the investor's owing into their profit share
    ///
    /// Callable by anyone for anyone; it can only credit the investor.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `InvalidParameter`: Arithmetic overflow
    pub fn update_profit_share(env: Env, investor: Address) -> Result<(), Error> {
        phase::require_live(&env)?;

        let (account, owing) = Self::settle(&env, &investor)?;
        write_account(&env, &investor, &account);

        Self::publish_share_update(&env, &investor, owing);

        Ok(())
    }

    /// Settle and pay out the caller's whole profit share
    ///
    /// Nothing owed is not an error: the call pays out zero.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameter`: Arithmetic overflow
    pub fn withdraw_profit_share(env: Env, investor: Address) -> Result<i128, Error> {
        phase::require_live(&env)?;
        let profit_asset = Self::read_address(&env, DataKey::ProfitAsset)?;

        investor.require_auth();

        let (mut account, owing) = Self::settle(&env, &investor)?;
        let payout = account.profit_share;
        account.profit_share = 0;
        write_account(&env, &investor, &account);

        if payout > 0 {
            token::Client::new(&env, &profit_asset).transfer(
                &env.current_contract_address(),
                &investor,
                &payout,
            );
        }

        if owing > 0 {
            Self::publish_share_update(&env, &investor, owing);
        }
        env.events().publish(
            (Symbol::new(&env, "ProfitWithdrawal"), investor.clone()),
            ProfitWithdrawalEvent {
                investor,
                amount: payout,
            },
        );

        Ok(payout)
    }

    // ============================================
    // KEY RECOVERY
    // ============================================

    /// Move the whole account of a lost key to a fresh one (key recoverer only)
    ///
    /// Allowances granted by or to the old key are not carried over.
    ///
    /// # Errors
    /// - `Decommissioned`: Ledger was decommissioned
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the key recoverer
    /// - `NotAllowlisted`: Either address not approved
    /// - `InvalidParameter`: Same address, nothing to recover, or target in use
    pub fn recover_key(
        env: Env,
        caller: Address,
        old_address: Address,
        new_address: Address,
    ) -> Result<(), Error> {
        phase::require_live(&env)?;

        let key_recoverer = Self::read_address(&env, DataKey::KeyRecoverer)?;
        caller.require_auth();
        if caller != key_recoverer {
            return Err(Error::Unauthorized);
        }

        gate::require_approved(&env, &old_address)?;
        gate::require_approved(&env, &new_address)?;

        if old_address == new_address {
            return Err(Error::InvalidParameter);
        }

        let old_account = read_account(&env, &old_address);
        if old_account.is_empty() || !read_account(&env, &new_address).is_empty() {
            return Err(Error::InvalidParameter);
        }

        write_account(&env, &new_address, &old_account);
        write_account(&env, &old_address, &Account::default());

        log!(&env, "key recovered", old_address, new_address);

        env.events().publish(
            (Symbol::new(&env, "KeyRecovered"),),
            KeyRecoveredEvent {
                old_address,
                new_address,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn owner(env: Env) -> Result<Address, Error> {
        phase::require_live(&env)?;
        Self::read_address(&env, DataKey::Owner)
    }

    pub fn access_gate(env: Env) -> Result<Address, Error> {
        phase::require_live(&env)?;
        gate::access_gate(&env)
    }

    pub fn profit_depositor(env: Env) -> Result<Address, Error> {
        phase::require_live(&env)?;
        Self::read_address(&env, DataKey::ProfitDepositor)
    }

    pub fn key_recoverer(env: Env) -> Result<Address, Error> {
        phase::require_live(&env)?;
        Self::read_address(&env, DataKey::KeyRecoverer)
    }

    /// Minting contract, `None` until bound
    pub fn minter(env: Env) -> Result<Option<Address>, Error> {
        phase::require_live(&env)?;
        Ok(phase::minter(&env))
    }

    pub fn profit_asset(env: Env) -> Result<Address, Error> {
        phase::require_live(&env)?;
        Self::read_address(&env, DataKey::ProfitAsset)
    }

    pub fn name(env: Env) -> Result<String, Error> {
        phase::require_live(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::TokenName)
            .ok_or(Error::NotInitialized)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        phase::require_live(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::TokenSymbol)
            .ok_or(Error::NotInitialized)
    }

    pub fn decimals(env: Env) -> Result<u32, Error> {
        phase::require_live(&env)?;
        Ok(DECIMALS)
    }

    pub fn total_supply(env: Env) -> Result<i128, Error> {
        phase::require_live(&env)?;
        Ok(read_total_supply(&env))
    }

    /// Cumulative profit ever deposited
    pub fn total_profits(env: Env) -> Result<i128, Error> {
        phase::require_live(&env)?;
        Ok(read_total_profits(&env))
    }

    pub fn minting_finished(env: Env) -> Result<bool, Error> {
        Ok(phase::require_live(&env)? == Phase::Transferable)
    }

    pub fn phase(env: Env) -> Result<Phase, Error> {
        phase::require_live(&env)
    }

    pub fn balance_of(env: Env, id: Address) -> Result<i128, Error> {
        phase::require_live(&env)?;
        Ok(read_account(&env, &id).balance)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> Result<i128, Error> {
        phase::require_live(&env)?;
        Ok(read_allowance(&env, &owner, &spender))
    }

    /// Full account record: balance, settlement baseline and profit share
    pub fn account(env: Env, id: Address) -> Result<Account, Error> {
        phase::require_live(&env)?;
        Ok(read_account(&env, &id))
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

    fn read_address(env: &Env, key: DataKey) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&key)
            .ok_or(Error::NotInitialized)
    }

    /// Credit what the account is owed at its current balance and move its
    /// baseline to `total_profits`. Must run before any change of the balance.
    /// The caller writes the returned account back.
    fn settle(env: &Env, investor: &Address) -> Result<(Account, i128), Error> {
        let mut account = read_account(env, investor);
        let total_profits = read_total_profits(env);

        let owing = calculate_owing(
            env,
            total_profits,
            account.last_total_profits,
            account.balance,
            read_total_supply(env),
        )
        .ok_or(Error::InvalidParameter)?;

        account.profit_share = account
            .profit_share
            .checked_add(owing)
            .ok_or(Error::InvalidParameter)?;
        account.last_total_profits = total_profits;

        Ok((account, owing))
    }

    fn move_units(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        let (mut from_account, from_owing) = Self::settle(env, from)?;
        if from_account.balance < amount {
            return Err(Error::InsufficientBalance);
        }

        if from == to {
            write_account(env, from, &from_account);
        } else {
            let (mut to_account, to_owing) = Self::settle(env, to)?;

            from_account.balance -= amount;
            to_account.balance = to_account
                .balance
                .checked_add(amount)
                .ok_or(Error::InvalidParameter)?;

            write_account(env, from, &from_account);
            write_account(env, to, &to_account);

            if to_owing > 0 {
                Self::publish_share_update(env, to, to_owing);
            }
        }

        if from_owing > 0 {
            Self::publish_share_update(env, from, from_owing);
        }
        env.events().publish(
            (Symbol::new(env, "Transfer"), from.clone(), to.clone()),
            TransferEvent {
                from: from.clone(),
                to: to.clone(),
                value: amount,
            },
        );

        Ok(())
    }

    fn publish_share_update(env: &Env, investor: &Address, amount: i128) {
        env.events().publish(
            (Symbol::new(env, "ProfitShareUpdated"), investor.clone()),
            ProfitShareUpdatedEvent {
                investor: investor.clone(),
                amount,
            },
        );
    }
}
