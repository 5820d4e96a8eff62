//! Fungible stabilized coin backed by vaulted offset tokens.
//!
//! Minting is restricted to a single minter address (the vault). The admin
//! role exists only to assign that minter and is expected to be renounced
//! immediately after deployment; once renounced, the minter assignment path
//! is permanently unreachable.
#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;

use events::{AdminRenouncedEvent, BurnEvent, MintEvent, MinterSetEvent, TransferEvent};
use storage::{
    read_allowance, read_allowance_expiration, read_balance, read_total_supply, write_allowance,
    write_balance, write_total_supply, DataKey, DECIMALS, MAX_SUPPLY,
};

use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, String, Symbol};
use soroban_sdk::token::TokenInterface;

#[contract]
pub struct CarbonCoin;

#[contractimpl]
impl CarbonCoin {
    /// Initialize the coin contract.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::AdminRenounced, &false);

        Ok(())
    }

    /// Assign the minter (the vault). Unreachable once the admin role has
    /// been renounced, for everyone including the former admin.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `AdminRenounced`: Admin role was renounced
    pub fn set_minter(env: Env, minter: Address) -> Result<(), Error> {
        // The renounce flag kills this path before any auth is even consulted.
        if Self::admin_renounced(env.clone()) {
            return Err(Error::AdminRenounced);
        }

        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Minter, &minter);

        env.events().publish(
            (Symbol::new(&env, "minter_set"),),
            MinterSetEvent {
                minter: minter.clone(),
            },
        );

        Ok(())
    }

    /// Renounce the admin role, one-way. After this the minter can never be
    /// reassigned and no further privileged path exists on this contract.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `AdminRenounced`: Already renounced
    pub fn renounce_admin(env: Env) -> Result<(), Error> {
        if Self::admin_renounced(env.clone()) {
            return Err(Error::AdminRenounced);
        }

        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::AdminRenounced, &true);

        env.events().publish(
            (Symbol::new(&env, "admin_renounced"),),
            AdminRenouncedEvent { admin },
        );

        Ok(())
    }

    /// Mint coins to `to` (minter only).
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `MinterNotSet`: No minter assigned
    /// - `NotMinter`: Caller is not the minter
    /// - `InvalidAmount`: Amount <= 0
    /// - `ExceedsMaxSupply`: Supply ceiling would be breached
    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        let minter: Address = env
            .storage()
            .instance()
            .get(&DataKey::Minter)
            .ok_or(Error::MinterNotSet)?;
        minter.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let new_supply = read_total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        if new_supply > MAX_SUPPLY {
            return Err(Error::ExceedsMaxSupply);
        }

        write_total_supply(&env, new_supply);
        let new_balance = read_balance(&env, &to)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        write_balance(&env, &to, new_balance);

        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent { to, amount },
        );

        Ok(())
    }

    pub fn total_supply(env: Env) -> i128 {
        read_total_supply(&env)
    }

    pub fn minter(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Minter)
    }

    pub fn admin_renounced(env: Env) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::AdminRenounced)
            .unwrap_or(false)
    }

    fn spend_balance(env: &Env, from: &Address, amount: i128) {
        if amount <= 0 {
            panic_with_error!(env, Error::InvalidAmount);
        }
        let balance = read_balance(env, from);
        if balance < amount {
            panic_with_error!(env, Error::InsufficientBalance);
        }
        write_balance(env, from, balance - amount);
    }

    fn spend_allowance(env: &Env, from: &Address, spender: &Address, amount: i128) {
        let allowance = read_allowance(env, from, spender);
        if allowance < amount {
            panic_with_error!(env, Error::InsufficientAllowance);
        }
        let expiration = read_allowance_expiration(env, from, spender);
        write_allowance(env, from, spender, allowance - amount, expiration);
    }

    fn burn_internal(env: &Env, from: &Address, amount: i128) {
        Self::spend_balance(env, from, amount);
        write_total_supply(env, read_total_supply(env) - amount);

        env.events().publish(
            (Symbol::new(env, "burn"), from.clone()),
            BurnEvent {
                from: from.clone(),
                amount,
            },
        );
    }
}

#[contractimpl]
impl token::TokenInterface for CarbonCoin {
    fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        read_allowance(&env, &from, &spender)
    }

    fn approve(env: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        from.require_auth();

        if amount < 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        if amount > 0 && expiration_ledger < env.ledger().sequence() {
            panic_with_error!(&env, Error::InvalidExpiration);
        }

        write_allowance(&env, &from, &spender, amount, expiration_ledger);
    }

    fn balance(env: Env, id: Address) -> i128 {
        read_balance(&env, &id)
    }

    fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();

        Self::spend_balance(&env, &from, amount);
        let to_balance = read_balance(&env, &to);
        write_balance(&env, &to, to_balance + amount);

        env.events().publish(
            (Symbol::new(&env, "transfer"), from.clone(), to.clone()),
            TransferEvent { from, to, amount },
        );
    }

    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();

        Self::spend_allowance(&env, &from, &spender, amount);
        Self::spend_balance(&env, &from, amount);
        let to_balance = read_balance(&env, &to);
        write_balance(&env, &to, to_balance + amount);

        env.events().publish(
            (Symbol::new(&env, "transfer"), from.clone(), to.clone()),
            TransferEvent { from, to, amount },
        );
    }

    /// Burning outside the vault's withdraw path is allowed and permanently
    /// strands the corresponding collateral; the vault does not compensate.
    fn burn(env: Env, from: Address, amount: i128) {
        from.require_auth();
        Self::burn_internal(&env, &from, amount);
    }

    fn burn_from(env: Env, spender: Address, from: Address, amount: i128) {
        spender.require_auth();
        Self::spend_allowance(&env, &from, &spender, amount);
        Self::burn_internal(&env, &from, amount);
    }

    fn decimals(_env: Env) -> u32 {
        DECIMALS
    }

    fn name(env: Env) -> String {
        String::from_str(&env, "Stabilized Carbon Coin")
    }

    fn symbol(env: Env) -> String {
        String::from_str(&env, "SCC")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::COIN_UNIT;

    use soroban_sdk::{testutils::Address as _, Address, Env};

    fn setup() -> (Env, Address, CarbonCoinClient<'static>) {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register_contract(None, CarbonCoin);
        let client = CarbonCoinClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        client.initialize(&admin);

        (env, admin, client)
    }

    #[test]
    fn test_minter_role_lifecycle() {
        let (env, _admin, client) = setup();

        let vault = Address::generate(&env);
        assert_eq!(client.minter(), None);

        client.set_minter(&vault);
        assert_eq!(client.minter(), Some(vault.clone()));

        client.renounce_admin();
        assert!(client.admin_renounced());

        // The assignment path is dead after renouncing, even for the admin.
        let other = Address::generate(&env);
        let result = client.try_set_minter(&other);
        assert_eq!(result, Err(Ok(Error::AdminRenounced)));
        assert_eq!(client.minter(), Some(vault));

        let result = client.try_renounce_admin();
        assert_eq!(result, Err(Ok(Error::AdminRenounced)));
    }

    #[test]
    fn test_mint_requires_minter() {
        let (env, _admin, client) = setup();

        let user = Address::generate(&env);
        let result = client.try_mint(&user, &(10 * COIN_UNIT));
        assert_eq!(result, Err(Ok(Error::MinterNotSet)));

        let vault = Address::generate(&env);
        client.set_minter(&vault);

        client.mint(&user, &(20 * COIN_UNIT));
        assert_eq!(client.balance(&user), 20 * COIN_UNIT);
        assert_eq!(client.total_supply(), 20 * COIN_UNIT);
        assert_eq!(client.decimals(), 18);
    }

    #[test]
    fn test_mint_respects_max_supply() {
        let (env, _admin, client) = setup();

        let vault = Address::generate(&env);
        let user = Address::generate(&env);
        client.set_minter(&vault);

        client.mint(&user, &MAX_SUPPLY);
        assert_eq!(client.total_supply(), MAX_SUPPLY);

        let result = client.try_mint(&user, &1);
        assert_eq!(result, Err(Ok(Error::ExceedsMaxSupply)));
    }

    #[test]
    fn test_burn_reduces_supply() {
        let (env, _admin, client) = setup();

        let vault = Address::generate(&env);
        let user = Address::generate(&env);
        client.set_minter(&vault);
        client.mint(&user, &(20 * COIN_UNIT));

        client.burn(&user, &(5 * COIN_UNIT));
        assert_eq!(client.balance(&user), 15 * COIN_UNIT);
        assert_eq!(client.total_supply(), 15 * COIN_UNIT);
    }

    #[test]
    fn test_burn_from_needs_allowance() {
        let (env, _admin, client) = setup();

        let vault = Address::generate(&env);
        let user = Address::generate(&env);
        client.set_minter(&vault);
        client.mint(&user, &(20 * COIN_UNIT));

        let result = client.try_burn_from(&vault, &user, &(20 * COIN_UNIT));
        assert_eq!(result, Err(Ok(Error::InsufficientAllowance)));

        client.approve(&user, &vault, &(20 * COIN_UNIT), &200u32);
        client.burn_from(&vault, &user, &(20 * COIN_UNIT));

        assert_eq!(client.balance(&user), 0);
        assert_eq!(client.total_supply(), 0);
    }

    #[test]
    fn test_transfer() {
        let (env, _admin, client) = setup();

        let vault = Address::generate(&env);
        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);
        client.set_minter(&vault);
        client.mint(&user1, &(40 * COIN_UNIT));

        client.transfer(&user1, &user2, &(15 * COIN_UNIT));
        assert_eq!(client.balance(&user1), 25 * COIN_UNIT);
        assert_eq!(client.balance(&user2), 15 * COIN_UNIT);

        let result = client.try_transfer(&user2, &user1, &(16 * COIN_UNIT));
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    }
}
