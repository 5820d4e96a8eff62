use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct LoanOpenedEvent {
    pub token_id: u64,
    pub borrower: Address,
    pub minted: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct LoanClosedEvent {
    pub token_id: u64,
    pub borrower: Address,
    pub burned: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct NftSweptEvent {
    pub token_id: u64,
    pub to: Address,
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
