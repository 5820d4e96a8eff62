//! Dutch-auction marketplace for carbon-offset token batches.
//!
//! Batches of unique offset tokens are minted by the admin and sold at a
//! price that decays daily from a frozen start price down to a floor. Sale
//! proceeds are split between the platform and the producers through a
//! pull-payment accrual ledger, so no producer address can block a sale.
#![no_std]

mod error;
mod events;
mod pricing;
mod storage;


pub use error::Error;

use events::*;
use storage::{Batch, DataKey, PricingConfig, TokenInfo};
use storage::{
    MAX_BATCH_SIZE_LIMIT, MAX_CID_LENGTH, MAX_PLATFORM_SHARE_PCT, MAX_PRICE_ITERATIONS_LIMIT,
    SECONDS_PER_DAY, USDC_DECIMALS,
};

use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Symbol, Vec};

#[contract]
pub struct OffsetMarket;

#[contractimpl]
impl OffsetMarket {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the marketplace.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidPaymentToken`: `usdc_token` does not report 6 decimals
    pub fn initialize(env: Env, admin: Address, usdc_token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        // All internal arithmetic assumes a 6-decimal fixed-point base. A
        // non-contract address traps in the decimals() host call.
        let payment = token::Client::new(&env, &usdc_token);
        if payment.decimals() != USDC_DECIMALS {
            return Err(Error::InvalidPaymentToken);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::UsdcToken, &usdc_token);
        env.storage().instance().set(&DataKey::Paused, &false);
        storage::set_last_decay_at(&env, env.ledger().timestamp());

        Ok(())
    }

    /// Pause user entry points (emergency).
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
    // MINTING
    // ============================================

    /// Mint a batch of offset tokens, one per producer/cid pair. The batch
    /// freezes the current base price as its auction start price; the tokens
    /// are held by the contract until sold.
    ///
    /// Runs the bounded base-price sweep before the batch is created, so the
    /// frozen price reflects demand signals from earlier batches.
    ///
    /// # Errors
    /// - `EmptyBatch` / `ArrayLengthMismatch` / `BatchTooLarge` / `CidTooLong`
    pub fn mint_batch(
        env: Env,
        producers: Vec<Address>,
        cids: Vec<String>,
    ) -> Result<u64, Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if producers.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if producers.len() != cids.len() {
            return Err(Error::ArrayLengthMismatch);
        }
        if producers.len() > storage::max_batch_size(&env) {
            return Err(Error::BatchTooLarge);
        }
        for cid in cids.iter() {
            if cid.len() > MAX_CID_LENGTH {
                return Err(Error::CidTooLong);
            }
        }

        Self::run_price_sweep(&env)?;

        let now = env.ledger().timestamp();
        let size = producers.len();
        let batch_id = storage::batch_count(&env) + 1;
        let first_token_id = storage::token_count(&env) + 1;
        let me = env.current_contract_address();

        for i in 0..size {
            let token_id = first_token_id + i as u64;
            let info = TokenInfo {
                producer: producers.get_unchecked(i),
                cid: cids.get_unchecked(i),
                redeemed: false,
            };
            storage::set_token_info(&env, token_id, &info);
            storage::set_owner_balance(&env, token_id, &me, 1);
        }

        let cfg = storage::get_pricing(&env);
        let batch = Batch {
            id: batch_id,
            first_token_id,
            size,
            created_at: now,
            start_price: cfg.base_price,
            remaining: size,
            sold_out_at: 0,
            price_checked: false,
        };
        storage::set_batch(&env, &batch);

        env.storage().instance().set(&DataKey::BatchCount, &batch_id);
        env.storage()
            .instance()
            .set(&DataKey::TokenCount, &(first_token_id + size as u64 - 1));

        env.events().publish(
            (Symbol::new(&env, "batch_minted"), batch_id),
            BatchMintedEvent {
                batch_id,
                first_token_id,
                size,
                start_price: cfg.base_price,
            },
        );

        Ok(batch_id)
    }

    // ============================================
    // PURCHASE
    // ============================================

    /// Buy `quantity` units from a batch at the current decayed price.
    ///
    /// `max_cost` is the buyer's slippage ceiling; it is pulled in full and
    /// the excess over the actual total is refunded in the same call. Both
    /// transfer legs are verified to have moved the exact amount, so
    /// fee-on-transfer tokens are rejected rather than silently skimming.
    ///
    /// # Errors
    /// - `InvalidAmount`: quantity is zero
    /// - `BatchNotFound` / `NotEnoughInBatch`
    /// - `InsufficientFunds`: `max_cost` below the current total
    /// - `FeeOnTransferPayment` / `FeeOnTransferRefund`
    pub fn buy_batch(
        env: Env,
        buyer: Address,
        batch_id: u64,
        max_cost: i128,
        quantity: u32,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        buyer.require_auth();

        if quantity == 0 {
            return Err(Error::InvalidAmount);
        }
        let mut batch = storage::get_batch(&env, batch_id).ok_or(Error::BatchNotFound)?;
        if quantity > batch.remaining {
            return Err(Error::NotEnoughInBatch);
        }

        let cfg = storage::get_pricing(&env);
        let now = env.ledger().timestamp();
        let unit_price = pricing::current_price(&batch, &cfg, now);
        let total = unit_price
            .checked_mul(quantity as i128)
            .ok_or(Error::MathOverflow)?;
        if max_cost < total {
            return Err(Error::InsufficientFunds);
        }

        let usdc = Self::usdc(&env)?;
        Self::pull_exact(&env, &usdc, &buyer, max_cost)?;

        // Accrue the split before any outbound transfer. The units sold are
        // the lowest-id tokens the contract still holds, in batch order.
        let (platform_share, producer_share) =
            pricing::split_total(total, storage::platform_share_pct(&env))
                .ok_or(Error::MathOverflow)?;
        let (per_unit, remainder) = pricing::per_unit_share(producer_share, quantity);

        let me = env.current_contract_address();
        let mut allocated: u32 = 0;
        let mut first_producer: Option<Address> = None;
        let last_token = batch.first_token_id + batch.size as u64;
        let mut token_id = batch.first_token_id;
        while token_id < last_token && allocated < quantity {
            if storage::owner_balance(&env, token_id, &me) > 0 {
                let info =
                    storage::get_token_info(&env, token_id).ok_or(Error::TokenNotFound)?;
                Self::credit_producer(&env, &info.producer, per_unit)?;
                if first_producer.is_none() {
                    first_producer = Some(info.producer);
                }
                storage::set_owner_balance(&env, token_id, &me, 0);
                let buyer_balance = storage::owner_balance(&env, token_id, &buyer);
                storage::set_owner_balance(&env, token_id, &buyer, buyer_balance + 1);
                allocated += 1;
            }
            token_id += 1;
        }
        if allocated != quantity {
            return Err(Error::NotEnoughInBatch);
        }
        if remainder > 0 {
            let first = first_producer.ok_or(Error::NotEnoughInBatch)?;
            Self::credit_producer(&env, &first, remainder)?;
        }

        let platform = storage::platform_accrued(&env)
            .checked_add(platform_share)
            .ok_or(Error::MathOverflow)?;
        storage::set_platform_accrued(&env, platform);
        let producers_total = storage::total_producer_accrued(&env)
            .checked_add(producer_share)
            .ok_or(Error::MathOverflow)?;
        storage::set_total_producer_accrued(&env, producers_total);

        batch.remaining -= quantity;
        if batch.remaining == 0 {
            batch.sold_out_at = now;
        }
        storage::set_batch(&env, &batch);

        // Interactions last: refund after all bookkeeping is settled.
        let refund = max_cost - total;
        if refund > 0 {
            Self::push_exact(&env, &usdc, &buyer, refund, Error::FeeOnTransferRefund)?;
        }

        Self::run_price_sweep(&env)?;

        env.events().publish(
            (Symbol::new(&env, "batch_sold"), batch_id),
            BatchSoldEvent {
                batch_id,
                buyer,
                quantity,
                unit_price,
                total_cost: total,
            },
        );

        Self::release_lock(&env);
        Ok(())
    }

    // ============================================
    // REDEMPTION
    // ============================================

    /// Redeem (retire) a held offset token. Redemption is permanent; the
    /// token stays owned and transferable but can never collateralize a
    /// vault loan.
    ///
    /// # Errors
    /// - `TokenNotFound` / `NotTokenOwner` / `AlreadyRedeemed`
    pub fn redeem_token(env: Env, caller: Address, token_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        caller.require_auth();

        Self::do_redeem(&env, &caller, token_id)?;

        Self::release_lock(&env);
        Ok(())
    }

    /// Redeem several held tokens at once, all-or-nothing.
    ///
    /// # Errors
    /// - `EmptyTokenList` plus the per-token errors of `redeem_token`
    pub fn redeem_tokens(env: Env, caller: Address, token_ids: Vec<u64>) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::acquire_lock(&env)?;
        caller.require_auth();

        if token_ids.is_empty() {
            return Err(Error::EmptyTokenList);
        }
        for token_id in token_ids.iter() {
            Self::do_redeem(&env, &caller, token_id)?;
        }

        Self::release_lock(&env);
        Ok(())
    }

    // ============================================
    // TRANSFERS
    // ============================================

    /// Move token units between holders. Transfers back to the marketplace
    /// itself are rejected so tokens cannot be stranded in the selling
    /// contract.
    ///
    /// # Errors
    /// - `InvalidAmount` / `TokenNotFound` / `NoExternalReturns`
    /// - `InsufficientBalance`
    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        token_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        Self::check_not_paused(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        if to == env.current_contract_address() {
            return Err(Error::NoExternalReturns);
        }
        if storage::get_token_info(&env, token_id).is_none() {
            return Err(Error::TokenNotFound);
        }

        let from_balance = storage::owner_balance(&env, token_id, &from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }
        storage::set_owner_balance(&env, token_id, &from, from_balance - amount);
        let to_balance = storage::owner_balance(&env, token_id, &to);
        storage::set_owner_balance(&env, token_id, &to, to_balance + amount);

        env.events().publish(
            (Symbol::new(&env, "transfer"), token_id),
            TransferEvent {
                token_id,
                from,
                to,
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // CLAIMS & RECOVERY
    // ============================================

    /// Pay out a producer's accrued share. Available while paused: the only
    /// party a push can hurt is the recipient of their own funds.
    ///
    /// # Errors
    /// - `NoFundsToClaim` / `FeeOnTransferPayout`
    pub fn claim_producer_funds(env: Env, producer: Address) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        Self::acquire_lock(&env)?;
        producer.require_auth();

        let amount = storage::producer_accrued(&env, &producer);
        if amount == 0 {
            return Err(Error::NoFundsToClaim);
        }
        storage::set_producer_accrued(&env, &producer, 0);
        let total = storage::total_producer_accrued(&env)
            .checked_sub(amount)
            .ok_or(Error::MathOverflow)?;
        storage::set_total_producer_accrued(&env, total);

        let usdc = Self::usdc(&env)?;
        Self::push_exact(&env, &usdc, &producer, amount, Error::FeeOnTransferPayout)?;

        env.events().publish(
            (Symbol::new(&env, "producer_claimed"), producer.clone()),
            ProducerClaimedEvent { producer, amount },
        );

        Self::release_lock(&env);
        Ok(())
    }

    /// Pay out the platform's accrued share to `to`. Admin-only,
    /// available while paused.
    ///
    /// # Errors
    /// - `NoFundsToClaim` / `FeeOnTransferPayout`
    pub fn claim_platform_funds(env: Env, to: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Self::acquire_lock(&env)?;

        let amount = storage::platform_accrued(&env);
        if amount == 0 {
            return Err(Error::NoFundsToClaim);
        }
        storage::set_platform_accrued(&env, 0);

        let usdc = Self::usdc(&env)?;
        Self::push_exact(&env, &usdc, &to, amount, Error::FeeOnTransferPayout)?;

        env.events().publish(
            (Symbol::new(&env, "platform_claimed"),),
            PlatformClaimedEvent { to, amount },
        );

        Self::release_lock(&env);
        Ok(())
    }

    /// Recover payment tokens sent directly to the contract, i.e. whatever
    /// exceeds the accounted platform and producer balances. Never touches
    /// accounted funds. Admin-only, available while paused.
    ///
    /// # Errors
    /// - `NoSurplus`
    pub fn recover_surplus_usdc(env: Env, to: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;

        let usdc = Self::usdc(&env)?;
        let payment = token::Client::new(&env, &usdc);
        let held = payment.balance(&env.current_contract_address());
        let accounted = storage::platform_accrued(&env)
            .checked_add(storage::total_producer_accrued(&env))
            .ok_or(Error::MathOverflow)?;
        let surplus = held - accounted;
        if surplus <= 0 {
            return Err(Error::NoSurplus);
        }

        payment.transfer(&env.current_contract_address(), &to, &surplus);

        env.events().publish(
            (Symbol::new(&env, "surplus_recovered"),),
            SurplusRecoveredEvent {
                to,
                amount: surplus,
            },
        );

        Ok(())
    }

    /// Recover the full balance of a foreign token accidentally sent here.
    /// The payment token is excluded: accounted funds leave only through
    /// claims, and the surplus path handles the rest. Admin-only, available
    /// while paused.
    ///
    /// # Errors
    /// - `CannotRecoverUsdc` / `NothingToRecover`
    pub fn recover_token(env: Env, foreign: Address, to: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;

        if foreign == Self::usdc(&env)? {
            return Err(Error::CannotRecoverUsdc);
        }

        let client = token::Client::new(&env, &foreign);
        let held = client.balance(&env.current_contract_address());
        if held <= 0 {
            return Err(Error::NothingToRecover);
        }
        client.transfer(&env.current_contract_address(), &to, &held);

        env.events().publish(
            (Symbol::new(&env, "token_recovered"),),
            TokenRecoveredEvent {
                token: foreign,
                to,
                amount: held,
            },
        );

        Ok(())
    }

    // ============================================
    // PRICE ADMINISTRATION
    // ============================================

    /// Run one bounded price sweep without minting. Anyone may call; this is
    /// how a capped sweep is resumed.
    pub fn update_base_price(env: Env) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        Self::check_not_paused(&env)?;
        Self::run_price_sweep(&env)
    }

    pub fn set_base_price(env: Env, price: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if price <= 0 {
            return Err(Error::InvalidBasePrice);
        }
        let mut cfg = storage::get_pricing(&env);
        if price < cfg.price_floor {
            return Err(Error::BaseBelowFloor);
        }
        let previous = cfg.base_price;
        cfg.base_price = price;
        storage::set_pricing(&env, &cfg);

        env.events().publish(
            (Symbol::new(&env, "base_price_adjusted"),),
            BasePriceAdjustedEvent {
                previous,
                current: price,
            },
        );
        Ok(())
    }

    pub fn set_price_floor(env: Env, floor: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if floor <= 0 {
            return Err(Error::InvalidPriceFloor);
        }
        let mut cfg = storage::get_pricing(&env);
        if floor > cfg.base_price {
            return Err(Error::FloorAboveBase);
        }
        cfg.price_floor = floor;
        storage::set_pricing(&env, &cfg);
        Ok(())
    }

    pub fn set_platform_share_pct(env: Env, pct: u32) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if pct > MAX_PLATFORM_SHARE_PCT {
            return Err(Error::InvalidPlatformShare);
        }
        env.storage()
            .instance()
            .set(&DataKey::PlatformSharePct, &pct);
        Ok(())
    }

    pub fn set_daily_decay(env: Env, decay: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if decay <= 0 {
            return Err(Error::InvalidDecayRate);
        }
        let mut cfg = storage::get_pricing(&env);
        cfg.daily_decay = decay;
        storage::set_pricing(&env, &cfg);
        Ok(())
    }

    pub fn set_price_delta(env: Env, delta: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if delta < 0 {
            return Err(Error::InvalidPriceDelta);
        }
        let mut cfg = storage::get_pricing(&env);
        cfg.price_delta = delta;
        storage::set_pricing(&env, &cfg);
        Ok(())
    }

    pub fn set_auction_day_thresholds(env: Env, increase: u64, decrease: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if increase == 0 || decrease <= increase {
            return Err(Error::InvalidThresholds);
        }
        let mut cfg = storage::get_pricing(&env);
        cfg.day_increase_threshold = increase;
        cfg.day_decrease_threshold = decrease;
        storage::set_pricing(&env, &cfg);
        Ok(())
    }

    pub fn set_max_batch_size(env: Env, size: u32) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if size == 0 || size > MAX_BATCH_SIZE_LIMIT {
            return Err(Error::InvalidBatchLimit);
        }
        env.storage().instance().set(&DataKey::MaxBatchSize, &size);
        Ok(())
    }

    pub fn set_max_price_iterations(env: Env, iterations: u32) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Self::require_admin(&env)?;

        if iterations == 0 || iterations > MAX_PRICE_ITERATIONS_LIMIT {
            return Err(Error::InvalidIterationLimit);
        }
        env.storage()
            .instance()
            .set(&DataKey::MaxPriceIterations, &iterations);
        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_batch(env: Env, batch_id: u64) -> Result<Batch, Error> {
        storage::get_batch(&env, batch_id).ok_or(Error::BatchNotFound)
    }

    /// Current per-unit quote for a batch.
    pub fn current_batch_price(env: Env, batch_id: u64) -> Result<i128, Error> {
        let batch = storage::get_batch(&env, batch_id).ok_or(Error::BatchNotFound)?;
        let cfg = storage::get_pricing(&env);
        Ok(pricing::current_price(&batch, &cfg, env.ledger().timestamp()))
    }

    pub fn balance_of(env: Env, owner: Address, token_id: u64) -> i128 {
        storage::owner_balance(&env, token_id, &owner)
    }

    pub fn token_info(env: Env, token_id: u64) -> Result<TokenInfo, Error> {
        storage::get_token_info(&env, token_id).ok_or(Error::TokenNotFound)
    }

    pub fn is_redeemed(env: Env, token_id: u64) -> Result<bool, Error> {
        Ok(storage::get_token_info(&env, token_id)
            .ok_or(Error::TokenNotFound)?
            .redeemed)
    }

    pub fn producer_balance(env: Env, producer: Address) -> i128 {
        storage::producer_accrued(&env, &producer)
    }

    pub fn platform_balance(env: Env) -> i128 {
        storage::platform_accrued(&env)
    }

    pub fn total_producer_balance(env: Env) -> i128 {
        storage::total_producer_accrued(&env)
    }

    pub fn pricing_config(env: Env) -> PricingConfig {
        storage::get_pricing(&env)
    }

    pub fn batch_count(env: Env) -> u64 {
        storage::batch_count(&env)
    }

    pub fn token_count(env: Env) -> u64 {
        storage::token_count(&env)
    }

    pub fn price_check_cursor(env: Env) -> u64 {
        storage::price_cursor(&env)
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

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

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

    fn usdc(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::UsdcToken)
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

    fn credit_producer(env: &Env, producer: &Address, amount: i128) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        let balance = storage::producer_accrued(env, producer)
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        storage::set_producer_accrued(env, producer, balance);
        Ok(())
    }

    /// Pull `amount` from `from`, verifying the contract's balance grew by
    /// exactly that much.
    fn pull_exact(env: &Env, usdc: &Address, from: &Address, amount: i128) -> Result<(), Error> {
        let payment = token::Client::new(env, usdc);
        let me = env.current_contract_address();
        let before = payment.balance(&me);
        payment.transfer(from, &me, &amount);
        if payment.balance(&me) - before != amount {
            return Err(Error::FeeOnTransferPayment);
        }
        Ok(())
    }

    /// Push `amount` to `to`, verifying the recipient's balance grew by
    /// exactly that much. `err` names the leg that failed.
    fn push_exact(
        env: &Env,
        usdc: &Address,
        to: &Address,
        amount: i128,
        err: Error,
    ) -> Result<(), Error> {
        let payment = token::Client::new(env, usdc);
        let before = payment.balance(to);
        payment.transfer(&env.current_contract_address(), to, &amount);
        if payment.balance(to) - before != amount {
            return Err(err);
        }
        Ok(())
    }

    fn do_redeem(env: &Env, caller: &Address, token_id: u64) -> Result<(), Error> {
        let mut info = storage::get_token_info(env, token_id).ok_or(Error::TokenNotFound)?;
        if storage::owner_balance(env, token_id, caller) < 1 {
            return Err(Error::NotTokenOwner);
        }
        if info.redeemed {
            return Err(Error::AlreadyRedeemed);
        }
        info.redeemed = true;
        storage::set_token_info(env, token_id, &info);

        env.events().publish(
            (Symbol::new(env, "token_redeemed"), token_id),
            TokenRedeemedEvent {
                token_id,
                owner: caller.clone(),
            },
        );
        Ok(())
    }

    /// Bounded, resumable base-price sweep.
    ///
    /// Walks batches oldest-first from the persisted cursor, at most the
    /// configured iteration cap per call. A batch that sold out within the
    /// increase threshold bumps the base by one price delta; a batch still
    /// unsold past the decrease threshold triggers one downward step of
    /// `days since the last decay * daily_decay`, clamped to the floor.
    /// Examined batches are marked so each contributes its signal once; a
    /// young, still-selling batch stays unresolved and holds the cursor.
    /// Hitting the cap with batches left emits `price_sweep_capped`.
    fn run_price_sweep(env: &Env) -> Result<(), Error> {
        let total_batches = storage::batch_count(env);
        let mut cursor = storage::price_cursor(env);
        if cursor > total_batches {
            return Ok(());
        }

        let cap = storage::max_price_iterations(env);
        let mut cfg = storage::get_pricing(env);
        let now = env.ledger().timestamp();
        let outstanding = total_batches - cursor + 1;

        let mut examined: u32 = 0;
        let mut advance = true;
        let mut quick_sellouts: u32 = 0;
        let mut lingering: u32 = 0;

        let mut batch_id = cursor;
        while batch_id <= total_batches && examined < cap {
            examined += 1;
            let mut batch = storage::get_batch(env, batch_id).ok_or(Error::BatchNotFound)?;
            if !batch.price_checked {
                if batch.remaining == 0 {
                    let sale_window = batch.sold_out_at.saturating_sub(batch.created_at);
                    if sale_window <= cfg.day_increase_threshold * SECONDS_PER_DAY {
                        quick_sellouts += 1;
                    }
                    batch.price_checked = true;
                    storage::set_batch(env, &batch);
                } else if now.saturating_sub(batch.created_at)
                    >= cfg.day_decrease_threshold * SECONDS_PER_DAY
                {
                    lingering += 1;
                    batch.price_checked = true;
                    storage::set_batch(env, &batch);
                } else {
                    // Still live and young: unresolved until it sells out or
                    // crosses the decrease threshold.
                    advance = false;
                }
            }
            if advance && batch.price_checked {
                cursor = batch_id + 1;
            }
            batch_id += 1;
        }

        let old_base = cfg.base_price;
        if quick_sellouts > 0 {
            let bump = (quick_sellouts as i128)
                .checked_mul(cfg.price_delta)
                .ok_or(Error::MathOverflow)?;
            cfg.base_price = cfg
                .base_price
                .checked_add(bump)
                .ok_or(Error::MathOverflow)?;
        }
        if lingering > 0 {
            let decay_days = now.saturating_sub(storage::last_decay_at(env)) / SECONDS_PER_DAY;
            if decay_days > 0 {
                let cut = (decay_days as i128).saturating_mul(cfg.daily_decay);
                let lowered = cfg.base_price.saturating_sub(cut);
                cfg.base_price = if lowered > cfg.price_floor {
                    lowered
                } else {
                    cfg.price_floor
                };
                storage::set_last_decay_at(env, now);
            }
        }
        if cfg.base_price != old_base {
            storage::set_pricing(env, &cfg);
            env.events().publish(
                (Symbol::new(env, "base_price_adjusted"),),
                BasePriceAdjustedEvent {
                    previous: old_base,
                    current: cfg.base_price,
                },
            );
        }
        storage::set_price_cursor(env, cursor);

        if outstanding > examined as u64 {
            env.events().publish(
                (Symbol::new(env, "price_sweep_capped"),),
                PriceSweepCappedEvent {
                    processed: examined,
                    outstanding,
                },
            );
        }

        Ok(())
    }
}
