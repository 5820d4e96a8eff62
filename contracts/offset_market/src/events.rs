use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct BatchMintedEvent {
    pub batch_id: u64,
    pub first_token_id: u64,
    pub size: u32,
    pub start_price: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BatchSoldEvent {
    pub batch_id: u64,
    pub buyer: Address,
    pub quantity: u32,
    pub unit_price: i128,
    pub total_cost: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokenRedeemedEvent {
    pub token_id: u64,
    pub owner: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TransferEvent {
    pub token_id: u64,
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProducerClaimedEvent {
    pub producer: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PlatformClaimedEvent {
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SurplusRecoveredEvent {
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokenRecoveredEvent {
    pub token: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BasePriceAdjustedEvent {
    pub previous: i128,
    pub current: i128,
}

/// Emitted when a price sweep hits the iteration cap with batches still
/// unexamined, so a later call can resume from the cursor.
#[contracttype]
#[derive(Clone, Debug)]
pub struct PriceSweepCappedEvent {
    pub processed: u32,
    pub outstanding: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PausedEvent {
    pub admin: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UnpausedEvent {
    pub admin: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AdminChangedEvent {
    pub previous: Address,
    pub current: Address,
}
