//! Test-network payment token. Mirrors the behavior of a 6-decimal USDC
//! plus an optional fee-on-transfer mode so the marketplace's transfer
//! integrity guards can be exercised against a misbehaving token.
#![no_std]

mod error;
mod storage;

pub use error::Error;

use storage::{
    read_allowance, read_allowance_expiration, read_balance, write_allowance, write_balance,
    DataKey, BPS, DECIMALS_DEFAULT,
};

use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, String};
use soroban_sdk::token::TokenInterface;

#[contract]
pub struct MockUsdc;

#[contractimpl]
impl MockUsdc {
    /// Initialize the token. `decimals` is configurable so tests can stand
    /// up a non-USDC-shaped token; real deployments use 6.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address, decimals: u32) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        env.storage().instance().set(&DataKey::FeeBps, &0i128);

        Ok(())
    }

    /// Mint tokens (admin only).
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let new_balance = read_balance(&env, &to)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        write_balance(&env, &to, new_balance);

        Ok(())
    }

    /// Turn the fee-on-transfer mode on or off (admin only). When nonzero,
    /// transfers debit the full amount but deliver `amount - fee`.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidFee`: fee_bps > 10,000
    pub fn set_fee_bps(env: Env, fee_bps: i128) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        if !(0..=BPS).contains(&fee_bps) {
            return Err(Error::InvalidFee);
        }

        env.storage().instance().set(&DataKey::FeeBps, &fee_bps);
        Ok(())
    }

    fn move_tokens(env: &Env, from: &Address, to: &Address, amount: i128) {
        if amount <= 0 {
            panic_with_error!(env, Error::InvalidAmount);
        }

        let from_balance = read_balance(env, from);
        if from_balance < amount {
            panic_with_error!(env, Error::InsufficientBalance);
        }

        let fee_bps: i128 = env
            .storage()
            .instance()
            .get(&DataKey::FeeBps)
            .unwrap_or(0);
        let fee = amount * fee_bps / BPS;
        let delivered = amount - fee;

        write_balance(env, from, from_balance - amount);
        let to_balance = read_balance(env, to);
        write_balance(env, to, to_balance + delivered);
    }
}

#[contractimpl]
impl token::TokenInterface for MockUsdc {
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
        Self::move_tokens(&env, &from, &to, amount);
    }

    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();

        let allowance = read_allowance(&env, &from, &spender);
        if allowance < amount {
            panic_with_error!(&env, Error::InsufficientAllowance);
        }
        let expiration = read_allowance_expiration(&env, &from, &spender);
        write_allowance(&env, &from, &spender, allowance - amount, expiration);

        Self::move_tokens(&env, &from, &to, amount);
    }

    fn burn(env: Env, from: Address, amount: i128) {
        from.require_auth();

        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        let balance = read_balance(&env, &from);
        if balance < amount {
            panic_with_error!(&env, Error::InsufficientBalance);
        }
        write_balance(&env, &from, balance - amount);
    }

    fn burn_from(env: Env, spender: Address, from: Address, amount: i128) {
        spender.require_auth();

        let allowance = read_allowance(&env, &from, &spender);
        if allowance < amount {
            panic_with_error!(&env, Error::InsufficientAllowance);
        }
        let expiration = read_allowance_expiration(&env, &from, &spender);
        write_allowance(&env, &from, &spender, allowance - amount, expiration);

        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        let balance = read_balance(&env, &from);
        if balance < amount {
            panic_with_error!(&env, Error::InsufficientBalance);
        }
        write_balance(&env, &from, balance - amount);
    }

    fn decimals(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .unwrap_or(DECIMALS_DEFAULT)
    }

    fn name(env: Env) -> String {
        String::from_str(&env, "Mock USDC")
    }

    fn symbol(env: Env) -> String {
        String::from_str(&env, "USDC")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    const UNIT: i128 = 1_000_000;

    fn setup() -> (Env, Address, MockUsdcClient<'static>) {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register_contract(None, MockUsdc);
        let client = MockUsdcClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        client.initialize(&admin, &6u32);

        (env, admin, client)
    }

    #[test]
    fn test_initialize_once() {
        let (env, admin, client) = setup();
        let _ = env;
        let result = client.try_initialize(&admin, &6u32);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_mint_and_transfer() {
        let (env, _admin, client) = setup();

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&user1, &(1000 * UNIT));
        client.transfer(&user1, &user2, &(400 * UNIT));

        assert_eq!(client.balance(&user1), 600 * UNIT);
        assert_eq!(client.balance(&user2), 400 * UNIT);
        assert_eq!(client.decimals(), 6);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (env, _admin, client) = setup();

        let owner = Address::generate(&env);
        let spender = Address::generate(&env);
        let recipient = Address::generate(&env);

        client.mint(&owner, &(100 * UNIT));
        client.approve(&owner, &spender, &(60 * UNIT), &200u32);

        client.transfer_from(&spender, &owner, &recipient, &(50 * UNIT));
        assert_eq!(client.balance(&recipient), 50 * UNIT);
        assert_eq!(client.allowance(&owner, &spender), 10 * UNIT);

        let result = client.try_transfer_from(&spender, &owner, &recipient, &(20 * UNIT));
        assert_eq!(result, Err(Ok(Error::InsufficientAllowance)));
    }

    #[test]
    fn test_fee_on_transfer_skims_recipient() {
        let (env, _admin, client) = setup();

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&user1, &(100 * UNIT));
        client.set_fee_bps(&100); // 1%

        client.transfer(&user1, &user2, &(100 * UNIT));

        // Sender is debited in full, recipient receives amount minus fee.
        assert_eq!(client.balance(&user1), 0);
        assert_eq!(client.balance(&user2), 99 * UNIT);
    }

    #[test]
    fn test_insufficient_balance() {
        let (env, _admin, client) = setup();

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&user1, &UNIT);
        let result = client.try_transfer(&user1, &user2, &(2 * UNIT));
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    }
}
