use soroban_sdk::{Env, I256};

/// Calculate the profit an account is owed since its last settlement
///
/// Formula: owing = (total_profits - last_total_profits) × balance / total_supply
///
/// The quotient is floored; the remainder is dust that stays in the ledger.
/// The product is taken in 256 bits, so any `i128` supply and profit total is
/// accepted. The result never exceeds the delta, so it fits back into `i128`.
///
/// Example:
/// - total_profits: 10, last_total_profits: 2, balance: 3,000, total_supply: 8,000
/// - owing: 8 × 3,000 / 8,000 = 3
pub fn calculate_owing(
    env: &Env,
    total_profits: i128,
    last_total_profits: i128,
    balance: i128,
    total_supply: i128,
) -> Option<i128> {
    if total_supply == 0 || balance == 0 {
        return Some(0);
    }
    if total_supply < 0 || balance < 0 || balance > total_supply {
        return None;
    }

    let delta = total_profits.checked_sub(last_total_profits)?;
    if delta < 0 {
        return None;
    }

    I256::from_i128(env, delta)
        .mul(&I256::from_i128(env, balance))
        .div(&I256::from_i128(env, total_supply))
        .to_i128()
}
