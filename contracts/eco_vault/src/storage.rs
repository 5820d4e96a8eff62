use soroban_sdk::{contracttype, Address, Env, Vec};

/// Fixed issue per collateralized token: 20 coins at 18 decimals.
pub const SCC_PER_ASSET: i128 = 20_000_000_000_000_000_000;
/// Per-call bound for the batch entry points.
pub const MAX_VAULT_BATCH: u32 = 20;

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct Loan {
    pub borrower: Address,
    pub active: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Market,
    Coin,
    Initialized,
    Paused,
    ReentrancyLock,
    ActiveLoanCount,
    Loan(u64),
    UserLoans(Address),
}

pub fn get_loan(env: &Env, token_id: u64) -> Option<Loan> {
    env.storage()
        .persistent()
        .get::<DataKey, Loan>(&DataKey::Loan(token_id))
}

pub fn set_loan(env: &Env, token_id: u64, loan: &Loan) {
    env.storage()
        .persistent()
        .set(&DataKey::Loan(token_id), loan);
}

pub fn user_loans(env: &Env, user: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get::<DataKey, Vec<u64>>(&DataKey::UserLoans(user.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn set_user_loans(env: &Env, user: &Address, loans: &Vec<u64>) {
    let key = DataKey::UserLoans(user.clone());
    if loans.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, loans);
    }
}

pub fn active_loan_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::ActiveLoanCount)
        .unwrap_or(0)
}

pub fn set_active_loan_count(env: &Env, count: u64) {
    env.storage()
        .instance()
        .set(&DataKey::ActiveLoanCount, &count);
}
