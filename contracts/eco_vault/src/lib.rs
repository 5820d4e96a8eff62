//! Collateral vault for marketplace offset tokens.
//!
//! Depositing an owned, unredeemed token opens a loan and mints a fixed
//! amount of the stabilized coin to the borrower; withdrawing burns the same
//! amount and returns the token. There is deliberately no liquidation path:
//! coin destroyed outside the withdraw flow strands its collateral forever.
#![no_std]

mod error;
mod events;
mod storage;

#[cfg(test)]
mod test;

pub use error::Error;

use events::{
    AdminChangedEvent, LoanClosedEvent, LoanOpenedEvent, NftSweptEvent, PausedEvent, UnpausedEvent,
};
use storage::{DataKey, Loan, MAX_VAULT_BATCH, SCC_PER_ASSET};

use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, IntoVal, Symbol, Vec};

#[contract]
pub struct EcoVault;

#[contractimpl]
impl EcoVault {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the vault with its collaborator contracts.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        market: Address,
        coin: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Market, &market);
        env.storage().instance().set(&DataKey::Coin, &coin);
        env.storage().instance().set(&DataKey::Paused, &false);

        Ok(())
    }

    /// Pause deposits and withdrawals (emergency).
    pub fn pause(env: Env) -> Result<(), Error> {
        let admin = Self::require_admin(&env)?;
        env.storage().instance().set(&DataKey::Paused, &true);
        env.events()
            .publish((Symbol::new(&env, "paused"),), PausedEvent { admin });
        Ok(())
    }

    /// Unpause.
    pub fn unpause(env: Env) -> Result<(), Error> {
        let admin = Self::require_admin(&env)?;
        env.storage().instance().set(&DataKey::Paused, &false);
        env.events()
            .publish((Symbol::new(&env, "unpaused"),), UnpausedEvent { admin });
        Ok(())
    }

    /// Hand the admin role to a new address.
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        let previous = Self::require_admin(&env)?;
        env.storage().instance().set(&DataKey::Admin, &new_admin);
        env.events().publish(
            (Symbol::new(&env, "admin_changed"),),
            AdminChangedEvent {
                previous,
                current: new_admin,
            },
        );
        Ok(())
    }

    // ============================================
    // DEPOSIT
    // ============================================

    /// Deposit an owned, unredeemed token as collateral and receive
    /// `SCC_PER_ASSET` coins.
    ///
    /// # Errors
    /// - `LoanActive`: a loan is already open for this token
    /// - `NotTokenOwner`: caller holds no unit of the token
    /// - `RedeemedAsset`: the token was redeemed
    pub fn deposit(env: Env, user: Address, token_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        user.require_auth();

        Self::open_loan(&env, &user, token_id)?;
        Self::mint_coin(&env, &user, SCC_PER_ASSET)?;

        Self::release_lock(&env);
        Ok(())
    }

    /// Deposit several tokens in one call, all-or-nothing: any failing
    /// precondition reverts the whole call.
    ///
    /// # Errors
    /// - `EmptyTokenList` / `TooManyTokens` plus the per-token errors of
    ///   `deposit`
    pub fn deposit_batch(env: Env, user: Address, token_ids: Vec<u64>) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        user.require_auth();

        let count = token_ids.len();
        if count == 0 {
            return Err(Error::EmptyTokenList);
        }
        if count > MAX_VAULT_BATCH {
            return Err(Error::TooManyTokens);
        }

        for token_id in token_ids.iter() {
            Self::open_loan(&env, &user, token_id)?;
        }

        let minted = SCC_PER_ASSET
            .checked_mul(count as i128)
            .ok_or(Error::MathOverflow)?;
        Self::mint_coin(&env, &user, minted)?;

        Self::release_lock(&env);
        Ok(())
    }

    // ============================================
    // WITHDRAW
    // ============================================

    /// Close a loan: burn `SCC_PER_ASSET` from the caller (who must be the
    /// borrower and must have approved the vault for the burn) and return
    /// the token.
    ///
    /// # Errors
    /// - `LoanNotActive`: no open loan for this token
    /// - `NotBorrower`: the loan belongs to someone else; holding enough
    ///   coin does not substitute for borrower identity
    pub fn withdraw(env: Env, user: Address, token_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        user.require_auth();

        Self::close_loan(&env, &user, token_id)?;

        let coin = Self::coin(&env)?;
        token::Client::new(&env, &coin).burn_from(
            &env.current_contract_address(),
            &user,
            &SCC_PER_ASSET,
        );
        Self::return_token(&env, &user, token_id)?;

        env.events().publish(
            (Symbol::new(&env, "loan_closed"), token_id),
            LoanClosedEvent {
                token_id,
                borrower: user,
                burned: SCC_PER_ASSET,
            },
        );

        Self::release_lock(&env);
        Ok(())
    }

    /// Withdraw several tokens in one call, all-or-nothing.
    ///
    /// # Errors
    /// - `EmptyTokenList` / `TooManyTokens` plus the per-token errors of
    ///   `withdraw`
    pub fn withdraw_batch(env: Env, user: Address, token_ids: Vec<u64>) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        user.require_auth();

        let count = token_ids.len();
        if count == 0 {
            return Err(Error::EmptyTokenList);
        }
        if count > MAX_VAULT_BATCH {
            return Err(Error::TooManyTokens);
        }

        for token_id in token_ids.iter() {
            Self::close_loan(&env, &user, token_id)?;
        }

        let burned = SCC_PER_ASSET
            .checked_mul(count as i128)
            .ok_or(Error::MathOverflow)?;
        let coin = Self::coin(&env)?;
        token::Client::new(&env, &coin).burn_from(
            &env.current_contract_address(),
            &user,
            &burned,
        );

        for token_id in token_ids.iter() {
            Self::return_token(&env, &user, token_id)?;
            env.events().publish(
                (Symbol::new(&env, "loan_closed"), token_id),
                LoanClosedEvent {
                    token_id,
                    borrower: user.clone(),
                    burned: SCC_PER_ASSET,
                },
            );
        }

        Self::release_lock(&env);
        Ok(())
    }

    // ============================================
    // ADMIN RECOVERY
    // ============================================

    /// Return a token that reached the vault through a direct transfer
    /// instead of `deposit`. Refuses to touch collateralized tokens, so an
    /// admin can never seize an open loan's asset. Available while paused.
    ///
    /// # Errors
    /// - `LoanActive`: the token collateralizes an open loan
    /// - `NotInVault`: the vault holds no unit of the token
    pub fn admin_sweep_nft(env: Env, token_id: u64, to: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Self::acquire_lock(&env)?;

        if let Some(loan) = storage::get_loan(&env, token_id) {
            if loan.active {
                return Err(Error::LoanActive);
            }
        }

        let market = Self::market(&env)?;
        let me = env.current_contract_address();
        let held: i128 = env.invoke_contract(
            &market,
            &Symbol::new(&env, "balance_of"),
            vec![&env, me.into_val(&env), token_id.into_val(&env)],
        );
        if held < 1 {
            return Err(Error::NotInVault);
        }

        Self::market_transfer(&env, &me, &to, token_id)?;

        env.events().publish(
            (Symbol::new(&env, "nft_swept"), token_id),
            NftSweptEvent { token_id, to },
        );

        Self::release_lock(&env);
        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_loan(env: Env, token_id: u64) -> Result<Loan, Error> {
        storage::get_loan(&env, token_id).ok_or(Error::LoanNotFound)
    }

    /// Token ids currently collateralized by `user`.
    pub fn user_loans(env: Env, user: Address) -> Vec<u64> {
        storage::user_loans(&env, &user)
    }

    pub fn active_loan_count(env: Env) -> u64 {
        storage::active_loan_count(&env)
    }

    pub fn scc_per_asset(_env: Env) -> i128 {
        SCC_PER_ASSET
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Paused)
            .unwrap_or(false)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_not_paused(env: &Env) -> Result<(), Error> {
        if Self::is_paused(env.clone()) {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    fn require_admin(env: &Env) -> Result<Address, Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();
        Ok(admin)
    }

    fn market(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Market)
            .ok_or(Error::NotInitialized)
    }

    fn coin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Coin)
            .ok_or(Error::NotInitialized)
    }

    fn acquire_lock(env: &Env) -> Result<(), Error> {
        let locked = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::ReentrancyLock)
            .unwrap_or(false);
        if locked {
            return Err(Error::ReentrantCall);
        }
        env.storage().instance().set(&DataKey::ReentrancyLock, &true);
        Ok(())
    }

    fn release_lock(env: &Env) {
        env.storage()
            .instance()
            .set(&DataKey::ReentrancyLock, &false);
    }

    /// Validate preconditions for one token, record the loan, then pull the
    /// unit into custody. Ledger writes precede the cross-contract pull.
    fn open_loan(env: &Env, user: &Address, token_id: u64) -> Result<(), Error> {
        if let Some(loan) = storage::get_loan(env, token_id) {
            if loan.active {
                return Err(Error::LoanActive);
            }
        }

        let market = Self::market(env)?;
        let held: i128 = env.invoke_contract(
            &market,
            &Symbol::new(env, "balance_of"),
            vec![env, user.into_val(env), token_id.into_val(env)],
        );
        if held < 1 {
            return Err(Error::NotTokenOwner);
        }

        let redeemed: bool = env.invoke_contract(
            &market,
            &Symbol::new(env, "is_redeemed"),
            vec![env, token_id.into_val(env)],
        );
        if redeemed {
            return Err(Error::RedeemedAsset);
        }

        storage::set_loan(
            env,
            token_id,
            &Loan {
                borrower: user.clone(),
                active: true,
            },
        );
        let mut loans = storage::user_loans(env, user);
        loans.push_back(token_id);
        storage::set_user_loans(env, user, &loans);
        storage::set_active_loan_count(env, storage::active_loan_count(env) + 1);

        Self::market_transfer(env, user, &env.current_contract_address(), token_id)?;

        env.events().publish(
            (Symbol::new(env, "loan_opened"), token_id),
            LoanOpenedEvent {
                token_id,
                borrower: user.clone(),
                minted: SCC_PER_ASSET,
            },
        );
        Ok(())
    }

    /// Validate the borrower and mark the loan closed. The coin burn and the
    /// token return are the caller's responsibility, after all bookkeeping.
    fn close_loan(env: &Env, user: &Address, token_id: u64) -> Result<(), Error> {
        let mut loan = storage::get_loan(env, token_id).ok_or(Error::LoanNotActive)?;
        if !loan.active {
            return Err(Error::LoanNotActive);
        }
        if loan.borrower != *user {
            return Err(Error::NotBorrower);
        }

        loan.active = false;
        storage::set_loan(env, token_id, &loan);

        let mut loans = storage::user_loans(env, user);
        if let Some(index) = loans.first_index_of(token_id) {
            loans.remove(index);
        }
        storage::set_user_loans(env, user, &loans);
        storage::set_active_loan_count(env, storage::active_loan_count(env) - 1);

        Ok(())
    }

    fn return_token(env: &Env, user: &Address, token_id: u64) -> Result<(), Error> {
        Self::market_transfer(env, &env.current_contract_address(), user, token_id)
    }

    fn market_transfer(
        env: &Env,
        from: &Address,
        to: &Address,
        token_id: u64,
    ) -> Result<(), Error> {
        let market = Self::market(env)?;
        env.invoke_contract::<()>(
            &market,
            &Symbol::new(env, "transfer"),
            vec![
                env,
                from.into_val(env),
                to.into_val(env),
                token_id.into_val(env),
                1i128.into_val(env),
            ],
        );
        Ok(())
    }

    /// Traps if the vault is not the coin's minter; that is a deployment
    /// wiring failure, not a user error.
    fn mint_coin(env: &Env, to: &Address, amount: i128) -> Result<(), Error> {
        let coin = Self::coin(env)?;
        env.invoke_contract::<()>(
            &coin,
            &Symbol::new(env, "mint"),
            vec![env, to.into_val(env), amount.into_val(env)],
        );
        Ok(())
    }
}
