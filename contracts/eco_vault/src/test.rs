use crate::error::Error;
use crate::storage::SCC_PER_ASSET;
use crate::{EcoVault, EcoVaultClient};

use carbon_coin::{CarbonCoin, CarbonCoinClient};
use mock_usdc::{MockUsdc, MockUsdcClient};
use offset_market::{OffsetMarket, OffsetMarketClient};

use soroban_sdk::{testutils::Address as _, vec, Address, Env, String, Vec};

const UNIT: i128 = 1_000_000;

struct Ctx {
    env: Env,
    admin: Address,
    buyer: Address,
    usdc: MockUsdcClient<'static>,
    market_id: Address,
    market: OffsetMarketClient<'static>,
    coin: CarbonCoinClient<'static>,
    vault_id: Address,
    vault: EcoVaultClient<'static>,
}

/// Stand up the full three-contract system: market with a sold batch of
/// three tokens (ids 1-3 owned by `buyer`), coin with the vault as its
/// one-shot minter and the deployer admin renounced.
fn setup() -> Ctx {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let buyer = Address::generate(&env);
    let producer = Address::generate(&env);

    let usdc_id = env.register_contract(None, MockUsdc);
    let usdc = MockUsdcClient::new(&env, &usdc_id);
    usdc.initialize(&admin, &6u32);
    usdc.mint(&buyer, &(10_000 * UNIT));

    let market_id = env.register_contract(None, OffsetMarket);
    let market = OffsetMarketClient::new(&env, &market_id);
    market.initialize(&admin, &usdc_id);

    let coin_id = env.register_contract(None, CarbonCoin);
    let coin = CarbonCoinClient::new(&env, &coin_id);
    coin.initialize(&admin);

    let vault_id = env.register_contract(None, EcoVault);
    let vault = EcoVaultClient::new(&env, &vault_id);
    vault.initialize(&admin, &market_id, &coin_id);

    // One-shot role wiring, then burn the key.
    coin.set_minter(&vault_id);
    coin.renounce_admin();

    let producers = vec![
        &env,
        producer.clone(),
        producer.clone(),
        producer.clone(),
    ];
    let cids = vec![
        &env,
        String::from_str(&env, "QmA"),
        String::from_str(&env, "QmB"),
        String::from_str(&env, "QmC"),
    ];
    market.mint_batch(&producers, &cids);
    market.buy_batch(&buyer, &1, &(690 * UNIT), &3);

    Ctx {
        env,
        admin,
        buyer,
        usdc,
        market_id,
        market,
        coin,
        vault_id,
        vault,
    }
}

fn approve_coin(ctx: &Ctx, from: &Address, amount: i128) {
    ctx.coin.approve(from, &ctx.vault_id, &amount, &200u32);
}

// ============================================
// DEPOSIT
// ============================================

#[test]
fn test_deposit_opens_loan_and_mints() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);

    let loan = ctx.vault.get_loan(&1);
    assert!(loan.active);
    assert_eq!(loan.borrower, ctx.buyer);

    assert_eq!(ctx.coin.balance(&ctx.buyer), SCC_PER_ASSET);
    assert_eq!(ctx.coin.total_supply(), SCC_PER_ASSET);
    assert_eq!(ctx.market.balance_of(&ctx.vault_id, &1), 1);
    assert_eq!(ctx.market.balance_of(&ctx.buyer, &1), 0);
    assert_eq!(ctx.vault.user_loans(&ctx.buyer), vec![&ctx.env, 1u64]);
    assert_eq!(ctx.vault.active_loan_count(), 1);
}

#[test]
fn test_deposit_rejects_redeemed_asset() {
    let ctx = setup();

    ctx.market.redeem_token(&ctx.buyer, &1);

    let result = ctx.vault.try_deposit(&ctx.buyer, &1);
    assert_eq!(result, Err(Ok(Error::RedeemedAsset)));

    // No coin was minted, no loan recorded.
    assert_eq!(ctx.coin.total_supply(), 0);
    assert_eq!(ctx.vault.try_get_loan(&1), Err(Ok(Error::LoanNotFound)));

    // Redemption is permanent: the rejection holds for later owners too.
    let other = Address::generate(&ctx.env);
    ctx.market.transfer(&ctx.buyer, &other, &1, &1);
    let result = ctx.vault.try_deposit(&other, &1);
    assert_eq!(result, Err(Ok(Error::RedeemedAsset)));
}

#[test]
fn test_deposit_rejects_double_collateralization() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);
    let result = ctx.vault.try_deposit(&ctx.buyer, &1);
    assert_eq!(result, Err(Ok(Error::LoanActive)));

    // An intervening withdraw re-opens the path; a live loan never doubles.
    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    ctx.vault.withdraw(&ctx.buyer, &1);
    ctx.vault.deposit(&ctx.buyer, &1);
    let result = ctx.vault.try_deposit(&ctx.buyer, &1);
    assert_eq!(result, Err(Ok(Error::LoanActive)));
    assert_eq!(ctx.vault.active_loan_count(), 1);
}

#[test]
fn test_deposit_requires_ownership() {
    let ctx = setup();

    let stranger = Address::generate(&ctx.env);
    let result = ctx.vault.try_deposit(&stranger, &1);
    assert_eq!(result, Err(Ok(Error::NotTokenOwner)));
}

// ============================================
// WITHDRAW
// ============================================

#[test]
fn test_withdraw_round_trip() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);
    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    ctx.vault.withdraw(&ctx.buyer, &1);

    assert_eq!(ctx.market.balance_of(&ctx.buyer, &1), 1);
    assert_eq!(ctx.market.balance_of(&ctx.vault_id, &1), 0);
    assert_eq!(ctx.coin.balance(&ctx.buyer), 0);
    assert_eq!(ctx.coin.total_supply(), 0);
    assert!(!ctx.vault.get_loan(&1).active);
    assert_eq!(ctx.vault.user_loans(&ctx.buyer), Vec::<u64>::new(&ctx.env));
    assert_eq!(ctx.vault.active_loan_count(), 0);
}

#[test]
fn test_withdraw_requires_borrower_identity() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);

    // A third party with enough coin and an allowance is still not the
    // borrower.
    let stranger = Address::generate(&ctx.env);
    ctx.coin.transfer(&ctx.buyer, &stranger, &SCC_PER_ASSET);
    approve_coin(&ctx, &stranger, SCC_PER_ASSET);

    let result = ctx.vault.try_withdraw(&stranger, &1);
    assert_eq!(result, Err(Ok(Error::NotBorrower)));

    // The loan is untouched.
    assert!(ctx.vault.get_loan(&1).active);
    assert_eq!(ctx.coin.total_supply(), SCC_PER_ASSET);
}

#[test]
fn test_withdraw_requires_allowance() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);

    // No approval to the vault: the coin's burn_from refuses.
    let result = ctx.vault.try_withdraw(&ctx.buyer, &1);
    assert!(result.is_err());
    assert!(ctx.vault.get_loan(&1).active);
}

#[test]
fn test_withdraw_without_loan() {
    let ctx = setup();

    let result = ctx.vault.try_withdraw(&ctx.buyer, &1);
    assert_eq!(result, Err(Ok(Error::LoanNotActive)));
}

#[test]
fn test_ghost_collateral_stays_locked() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);

    // The borrower destroys part of the issue outside the withdraw path.
    ctx.coin.burn(&ctx.buyer, &(SCC_PER_ASSET / 2));

    // The supply invariant now reads low and nothing restores it.
    assert!(ctx.coin.total_supply() < SCC_PER_ASSET * ctx.vault.active_loan_count() as i128);

    // Withdrawal can no longer be paid for, and nobody can free the asset.
    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    let result = ctx.vault.try_withdraw(&ctx.buyer, &1);
    assert!(result.is_err());

    let result = ctx.vault.try_admin_sweep_nft(&1, &ctx.admin);
    assert_eq!(result, Err(Ok(Error::LoanActive)));

    assert!(ctx.vault.get_loan(&1).active);
    assert_eq!(ctx.market.balance_of(&ctx.vault_id, &1), 1);
}

// ============================================
// BATCH OPERATIONS
// ============================================

#[test]
fn test_batch_round_trip() {
    let ctx = setup();

    let ids = vec![&ctx.env, 1u64, 2u64, 3u64];
    ctx.vault.deposit_batch(&ctx.buyer, &ids);

    assert_eq!(ctx.coin.balance(&ctx.buyer), 3 * SCC_PER_ASSET);
    assert_eq!(ctx.coin.total_supply(), 3 * SCC_PER_ASSET);
    assert_eq!(ctx.vault.active_loan_count(), 3);
    assert_eq!(ctx.vault.user_loans(&ctx.buyer), ids);

    approve_coin(&ctx, &ctx.buyer, 3 * SCC_PER_ASSET);
    ctx.vault.withdraw_batch(&ctx.buyer, &ids);

    assert_eq!(ctx.coin.total_supply(), 0);
    assert_eq!(ctx.vault.active_loan_count(), 0);
    for id in 1..=3u64 {
        assert_eq!(ctx.market.balance_of(&ctx.buyer, &id), 1);
    }
}

#[test]
fn test_batch_bounds() {
    let ctx = setup();

    let none: Vec<u64> = vec![&ctx.env];
    let result = ctx.vault.try_deposit_batch(&ctx.buyer, &none);
    assert_eq!(result, Err(Ok(Error::EmptyTokenList)));
    let result = ctx.vault.try_withdraw_batch(&ctx.buyer, &none);
    assert_eq!(result, Err(Ok(Error::EmptyTokenList)));

    let mut too_many: Vec<u64> = vec![&ctx.env];
    for id in 1..=21u64 {
        too_many.push_back(id);
    }
    let result = ctx.vault.try_deposit_batch(&ctx.buyer, &too_many);
    assert_eq!(result, Err(Ok(Error::TooManyTokens)));
    let result = ctx.vault.try_withdraw_batch(&ctx.buyer, &too_many);
    assert_eq!(result, Err(Ok(Error::TooManyTokens)));
}

#[test]
fn test_batch_deposit_is_all_or_nothing() {
    let ctx = setup();

    ctx.market.redeem_token(&ctx.buyer, &2);

    let ids = vec![&ctx.env, 1u64, 2u64, 3u64];
    let result = ctx.vault.try_deposit_batch(&ctx.buyer, &ids);
    assert_eq!(result, Err(Ok(Error::RedeemedAsset)));

    // No partial deposit happened.
    assert_eq!(ctx.coin.total_supply(), 0);
    assert_eq!(ctx.vault.active_loan_count(), 0);
    assert_eq!(ctx.market.balance_of(&ctx.buyer, &1), 1);
    assert_eq!(ctx.vault.try_get_loan(&1), Err(Ok(Error::LoanNotFound)));
}

#[test]
fn test_batch_deposit_rejects_duplicates() {
    let ctx = setup();

    let ids = vec![&ctx.env, 1u64, 1u64];
    let result = ctx.vault.try_deposit_batch(&ctx.buyer, &ids);
    assert_eq!(result, Err(Ok(Error::LoanActive)));
    assert_eq!(ctx.vault.active_loan_count(), 0);
}

#[test]
fn test_supply_tracks_active_loans() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);
    assert_eq!(
        ctx.coin.total_supply(),
        SCC_PER_ASSET * ctx.vault.active_loan_count() as i128
    );

    ctx.vault.deposit_batch(&ctx.buyer, &vec![&ctx.env, 2u64, 3u64]);
    assert_eq!(
        ctx.coin.total_supply(),
        SCC_PER_ASSET * ctx.vault.active_loan_count() as i128
    );

    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    ctx.vault.withdraw(&ctx.buyer, &2);
    assert_eq!(ctx.vault.active_loan_count(), 2);
    assert_eq!(
        ctx.coin.total_supply(),
        SCC_PER_ASSET * ctx.vault.active_loan_count() as i128
    );
    assert_eq!(ctx.vault.user_loans(&ctx.buyer), vec![&ctx.env, 1u64, 3u64]);
}

// ============================================
// ADMIN SWEEP
// ============================================

#[test]
fn test_admin_sweep_recovers_side_channel_transfer() {
    let ctx = setup();

    // The token reaches the vault without a deposit, so no loan exists.
    ctx.market.transfer(&ctx.buyer, &ctx.vault_id, &1, &1);
    assert_eq!(ctx.vault.try_get_loan(&1), Err(Ok(Error::LoanNotFound)));

    let rescue = Address::generate(&ctx.env);
    ctx.vault.admin_sweep_nft(&1, &rescue);
    assert_eq!(ctx.market.balance_of(&rescue, &1), 1);
}

#[test]
fn test_admin_sweep_never_touches_collateral() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);
    let result = ctx.vault.try_admin_sweep_nft(&1, &ctx.admin);
    assert_eq!(result, Err(Ok(Error::LoanActive)));
}

#[test]
fn test_admin_sweep_requires_custody() {
    let ctx = setup();

    let result = ctx.vault.try_admin_sweep_nft(&1, &ctx.admin);
    assert_eq!(result, Err(Ok(Error::NotInVault)));
}

// ============================================
// PAUSE
// ============================================

#[test]
fn test_pause_blocks_vault_flows() {
    let ctx = setup();

    ctx.vault.deposit(&ctx.buyer, &1);
    ctx.market.transfer(&ctx.buyer, &ctx.vault_id, &2, &1);

    ctx.vault.pause();
    assert!(ctx.vault.is_paused());

    let result = ctx.vault.try_deposit(&ctx.buyer, &3);
    assert_eq!(result, Err(Ok(Error::ContractPaused)));

    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    let result = ctx.vault.try_withdraw(&ctx.buyer, &1);
    assert_eq!(result, Err(Ok(Error::ContractPaused)));

    let result = ctx
        .vault
        .try_deposit_batch(&ctx.buyer, &vec![&ctx.env, 3u64]);
    assert_eq!(result, Err(Ok(Error::ContractPaused)));

    // The administrative escape hatch stays available during an incident.
    let rescue = Address::generate(&ctx.env);
    ctx.vault.admin_sweep_nft(&2, &rescue);
    assert_eq!(ctx.market.balance_of(&rescue, &2), 1);

    ctx.vault.unpause();
    ctx.vault.withdraw(&ctx.buyer, &1);
    assert_eq!(ctx.market.balance_of(&ctx.buyer, &1), 1);
}

// ============================================
// ROLE WIRING
// ============================================

#[test]
fn test_minter_role_is_one_shot() {
    let ctx = setup();

    // The deploy procedure renounced the coin admin; nobody can redirect
    // minting away from the vault anymore.
    let result = ctx.coin.try_set_minter(&ctx.buyer);
    assert_eq!(
        result,
        Err(Ok(carbon_coin::Error::AdminRenounced))
    );
    assert_eq!(ctx.coin.minter(), Some(ctx.vault_id.clone()));

    // With real auth rules (not the test-wide mock), nobody but the vault
    // can satisfy the minter's auth requirement.
    ctx.env.set_auths(&[]);
    let result = ctx.coin.try_mint(&ctx.buyer, &SCC_PER_ASSET);
    assert!(result.is_err());
}

#[test]
fn test_initialize_once() {
    let ctx = setup();
    let result = ctx
        .vault
        .try_initialize(&ctx.admin, &ctx.market_id, &ctx.market_id);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_usdc_stays_out_of_vault_flows() {
    // The vault never moves the payment token; a buyer's USDC balance is
    // unchanged by deposit/withdraw cycles.
    let ctx = setup();
    let before = ctx.usdc.balance(&ctx.buyer);

    ctx.vault.deposit(&ctx.buyer, &1);
    approve_coin(&ctx, &ctx.buyer, SCC_PER_ASSET);
    ctx.vault.withdraw(&ctx.buyer, &1);

    assert_eq!(ctx.usdc.balance(&ctx.buyer), before);
}
