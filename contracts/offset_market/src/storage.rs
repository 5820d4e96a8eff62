use soroban_sdk::{contracttype, Address, Env, String};

// Constants
pub const USDC_DECIMALS: u32 = 6;
pub const USDC_UNIT: i128 = 1_000_000; // 6 decimals
pub const SECONDS_PER_DAY: u64 = 86_400;
pub const MAX_CID_LENGTH: u32 = 100;
pub const MAX_PLATFORM_SHARE_PCT: u32 = 50;
pub const MAX_BATCH_SIZE_LIMIT: u32 = 100;
pub const MAX_PRICE_ITERATIONS_LIMIT: u32 = 1000;

pub const DEFAULT_BASE_PRICE: i128 = 230 * USDC_UNIT;
pub const DEFAULT_PRICE_FLOOR: i128 = 40 * USDC_UNIT;
pub const DEFAULT_DAILY_DECAY: i128 = USDC_UNIT; // 1 USDC per day
pub const DEFAULT_PRICE_DELTA: i128 = 10 * USDC_UNIT;
pub const DEFAULT_DAY_INCREASE_THRESHOLD: u64 = 2;
pub const DEFAULT_DAY_DECREASE_THRESHOLD: u64 = 4;
pub const DEFAULT_PLATFORM_SHARE_PCT: u32 = 30;
pub const DEFAULT_MAX_BATCH_SIZE: u32 = 50;
pub const DEFAULT_MAX_PRICE_ITERATIONS: u32 = 100;

/// Global auction parameters. Every setter re-validates the
/// `base_price >= price_floor` ordering before persisting.
#[contracttype]
#[derive(Clone, Debug)]
pub struct PricingConfig {
    /// Start price frozen into batches at mint time
    pub base_price: i128,
    /// Lower bound for every quote and for base decay
    pub price_floor: i128,
    /// Per-day decrement applied to batch quotes and base decay
    pub daily_decay: i128,
    /// Step added to the base price per quick-sellout batch
    pub price_delta: i128,
    /// Sellouts at most this many days after mint raise the base
    pub day_increase_threshold: u64,
    /// Batches unsold for at least this many days push the base down
    pub day_decrease_threshold: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Batch {
    /// Sequential id, 1-indexed
    pub id: u64,
    /// First token id of the contiguous range
    pub first_token_id: u64,
    /// Number of tokens in the range
    pub size: u32,
    /// Mint timestamp
    pub created_at: u64,
    /// Base price snapshot taken at mint
    pub start_price: i128,
    /// Units still unsold; decrements on sale, never increments
    pub remaining: u32,
    /// Timestamp of the final sale, 0 while any unit is unsold
    pub sold_out_at: u64,
    /// Whether the price sweep has consumed this batch's signal
    pub price_checked: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokenInfo {
    /// Producer credited on sale; immutable after mint
    pub producer: Address,
    /// Off-chain metadata pointer; immutable after mint
    pub cid: String,
    /// One-way flag; a redeemed token is vault-ineligible forever
    pub redeemed: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    UsdcToken,
    Initialized,
    Paused,
    ReentrancyLock,
    Pricing,
    PlatformSharePct,
    MaxBatchSize,
    MaxPriceIterations,
    BatchCount,
    TokenCount,
    PlatformAccrued,
    TotalProducerAccrued,
    PriceCheckCursor,
    LastDecayAt,
    Batch(u64),
    TokenInfo(u64),
    OwnerBalance(u64, Address), // (token id, owner)
    ProducerAccrued(Address),
}

pub fn get_pricing(env: &Env) -> PricingConfig {
    env.storage()
        .instance()
        .get::<DataKey, PricingConfig>(&DataKey::Pricing)
        .unwrap_or(PricingConfig {
            base_price: DEFAULT_BASE_PRICE,
            price_floor: DEFAULT_PRICE_FLOOR,
            daily_decay: DEFAULT_DAILY_DECAY,
            price_delta: DEFAULT_PRICE_DELTA,
            day_increase_threshold: DEFAULT_DAY_INCREASE_THRESHOLD,
            day_decrease_threshold: DEFAULT_DAY_DECREASE_THRESHOLD,
        })
}

pub fn set_pricing(env: &Env, cfg: &PricingConfig) {
    env.storage().instance().set(&DataKey::Pricing, cfg);
}

pub fn platform_share_pct(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get::<DataKey, u32>(&DataKey::PlatformSharePct)
        .unwrap_or(DEFAULT_PLATFORM_SHARE_PCT)
}

pub fn max_batch_size(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get::<DataKey, u32>(&DataKey::MaxBatchSize)
        .unwrap_or(DEFAULT_MAX_BATCH_SIZE)
}

pub fn max_price_iterations(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get::<DataKey, u32>(&DataKey::MaxPriceIterations)
        .unwrap_or(DEFAULT_MAX_PRICE_ITERATIONS)
}

pub fn batch_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::BatchCount)
        .unwrap_or(0)
}

pub fn token_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::TokenCount)
        .unwrap_or(0)
}

pub fn platform_accrued(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get::<DataKey, i128>(&DataKey::PlatformAccrued)
        .unwrap_or(0)
}

pub fn set_platform_accrued(env: &Env, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::PlatformAccrued, &amount);
}

pub fn total_producer_accrued(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get::<DataKey, i128>(&DataKey::TotalProducerAccrued)
        .unwrap_or(0)
}

pub fn set_total_producer_accrued(env: &Env, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::TotalProducerAccrued, &amount);
}

pub fn price_cursor(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::PriceCheckCursor)
        .unwrap_or(1)
}

pub fn set_price_cursor(env: &Env, cursor: u64) {
    env.storage()
        .instance()
        .set(&DataKey::PriceCheckCursor, &cursor);
}

pub fn last_decay_at(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::LastDecayAt)
        .unwrap_or(0)
}

pub fn set_last_decay_at(env: &Env, at: u64) {
    env.storage().instance().set(&DataKey::LastDecayAt, &at);
}

pub fn get_batch(env: &Env, batch_id: u64) -> Option<Batch> {
    env.storage()
        .persistent()
        .get::<DataKey, Batch>(&DataKey::Batch(batch_id))
}

pub fn set_batch(env: &Env, batch: &Batch) {
    env.storage()
        .persistent()
        .set(&DataKey::Batch(batch.id), batch);
}

pub fn get_token_info(env: &Env, token_id: u64) -> Option<TokenInfo> {
    env.storage()
        .persistent()
        .get::<DataKey, TokenInfo>(&DataKey::TokenInfo(token_id))
}

pub fn set_token_info(env: &Env, token_id: u64, info: &TokenInfo) {
    env.storage()
        .persistent()
        .set(&DataKey::TokenInfo(token_id), info);
}

pub fn owner_balance(env: &Env, token_id: u64, owner: &Address) -> i128 {
    env.storage()
        .persistent()
        .get::<DataKey, i128>(&DataKey::OwnerBalance(token_id, owner.clone()))
        .unwrap_or(0)
}

pub fn set_owner_balance(env: &Env, token_id: u64, owner: &Address, amount: i128) {
    let key = DataKey::OwnerBalance(token_id, owner.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}

pub fn producer_accrued(env: &Env, producer: &Address) -> i128 {
    env.storage()
        .persistent()
        .get::<DataKey, i128>(&DataKey::ProducerAccrued(producer.clone()))
        .unwrap_or(0)
}

pub fn set_producer_accrued(env: &Env, producer: &Address, amount: i128) {
    let key = DataKey::ProducerAccrued(producer.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}
