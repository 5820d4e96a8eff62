use crate::storage::{Batch, PricingConfig, SECONDS_PER_DAY};

/// Quote for one unit of a batch.
///
/// Formula: `price(t) = max(floor, start_price - elapsed_days * daily_decay)`
///
/// Subtraction saturates: a batch of any age quotes at least the floor and
/// never underflows or traps, however much time has passed.
pub fn current_price(batch: &Batch, cfg: &PricingConfig, now: u64) -> i128 {
    let elapsed_days = now.saturating_sub(batch.created_at) / SECONDS_PER_DAY;
    let decay = (elapsed_days as i128).saturating_mul(cfg.daily_decay);
    let decayed = batch.start_price.saturating_sub(decay);
    if decayed > cfg.price_floor {
        decayed
    } else {
        cfg.price_floor
    }
}

/// Split a sale total into (platform share, producer share).
///
/// `platform = total * pct / 100`, producers get the rest, so the two
/// halves always sum to the total exactly.
pub fn split_total(total: i128, platform_pct: u32) -> Option<(i128, i128)> {
    let platform = total
        .checked_mul(platform_pct as i128)?
        .checked_div(100)?;
    Some((platform, total - platform))
}

/// Divide the producer share evenly per unit. The integer remainder is
/// credited in full to the producer of the first sold token in batch order.
pub fn per_unit_share(producer_share: i128, quantity: u32) -> (i128, i128) {
    let per_unit = producer_share / quantity as i128;
    let remainder = producer_share - per_unit * quantity as i128;
    (per_unit, remainder)
}
