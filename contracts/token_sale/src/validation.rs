use crate::error::Error;
use crate::storage::{Outcome, SaleConfig, SaleState, RATE_CHANGE_FACTOR};

/// Check deployment parameters against the current ledger time
///
/// Requirements:
/// - token_cap > 0
/// - 0 <= team_share <= token_cap
/// - 0 < token_goal <= token_cap - team_share
/// - now <= opening_time < closing_time
/// - rate > 0
pub fn validate_config(config: &SaleConfig, now: u64) -> Result<(), Error> {
    if config.token_cap <= 0 {
        return Err(Error::InvalidParameter);
    }
    if config.team_share < 0 || config.team_share > config.token_cap {
        return Err(Error::InvalidParameter);
    }
    if config.token_goal <= 0 || config.token_goal > config.token_cap - config.team_share {
        return Err(Error::InvalidParameter);
    }
    if config.opening_time < now || config.closing_time <= config.opening_time {
        return Err(Error::InvalidParameter);
    }
    if config.rate <= 0 {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}

/// A new rate must be positive and strictly within one order of magnitude
///
/// Example:
/// - old_rate: 100
/// - allowed: 11..=999
pub fn rate_change_allowed(old_rate: i128, new_rate: i128) -> bool {
    new_rate > 0
        && old_rate / RATE_CHANGE_FACTOR < new_rate
        && new_rate < old_rate.saturating_mul(RATE_CHANGE_FACTOR)
}

/// Ledger units bought with `value` of the payment asset
///
/// Formula: amount = value × rate
pub fn calculate_token_amount(value: i128, rate: i128) -> Option<i128> {
    value.checked_mul(rate)
}

/// Units still available to buyers and distributions
///
/// Formula: remaining = token_cap - team_share - tokens_sold
pub fn remaining_allotment(config: &SaleConfig, tokens_sold: i128) -> i128 {
    config.token_cap - config.team_share - tokens_sold
}

pub fn sale_state(config: &SaleConfig, now: u64, outcome: Option<Outcome>) -> SaleState {
    match outcome {
        Some(Outcome::GoalMet) => SaleState::GoalMet,
        Some(Outcome::GoalMissed) => SaleState::GoalMissed,
        None if now < config.opening_time => SaleState::Pending,
        None if now < config.closing_time => SaleState::Open,
        None => SaleState::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    fn config(env: &Env) -> SaleConfig {
        SaleConfig {
            token_cap: 100,
            token_goal: 20,
            opening_time: 2_000,
            closing_time: 3_000,
            rate: 2,
            team_share: 10,
            wallet: Address::generate(env),
        }
    }

    #[test]
    fn test_valid_config() {
        let env = Env::default();
        assert_eq!(validate_config(&config(&env), 1_000), Ok(()));
        // opening right now is fine
        assert_eq!(validate_config(&config(&env), 2_000), Ok(()));
    }

    #[test]
    fn test_invalid_configs() {
        let env = Env::default();
        let base = config(&env);

        let mut zero_cap = base.clone();
        zero_cap.token_cap = 0;
        zero_cap.token_goal = 0;
        zero_cap.team_share = 0;

        let mut team_over_cap = base.clone();
        team_over_cap.team_share = 101;

        let mut zero_goal = base.clone();
        zero_goal.token_goal = 0;

        let mut goal_over_allotment = base.clone();
        goal_over_allotment.token_goal = 91;

        let mut opened_in_past = base.clone();
        opened_in_past.opening_time = 999;

        let mut closes_at_opening = base.clone();
        closes_at_opening.closing_time = base.opening_time;

        let mut zero_rate = base.clone();
        zero_rate.rate = 0;

        for config in [
            zero_cap,
            team_over_cap,
            zero_goal,
            goal_over_allotment,
            opened_in_past,
            closes_at_opening,
            zero_rate,
        ] {
            assert_eq!(
                validate_config(&config, 1_000),
                Err(Error::InvalidParameter)
            );
        }
    }

    #[test]
    fn test_rate_change_bounds() {
        assert!(rate_change_allowed(100, 11));
        assert!(rate_change_allowed(100, 999));
        assert!(!rate_change_allowed(100, 10));
        assert!(!rate_change_allowed(100, 1_000));
        assert!(!rate_change_allowed(100, 0));

        // tiny rates keep a lower bound of one
        assert!(rate_change_allowed(2, 1));
        assert!(rate_change_allowed(2, 19));
        assert!(!rate_change_allowed(2, 20));
    }

    #[test]
    fn test_token_amount() {
        assert_eq!(calculate_token_amount(11, 2), Some(22));
        assert_eq!(calculate_token_amount(i128::MAX, 2), None);
    }

    #[test]
    fn test_state_follows_clock_until_finalized() {
        let env = Env::default();
        let config = config(&env);

        assert_eq!(sale_state(&config, 1_999, None), SaleState::Pending);
        assert_eq!(sale_state(&config, 2_000, None), SaleState::Open);
        assert_eq!(sale_state(&config, 2_999, None), SaleState::Open);
        assert_eq!(sale_state(&config, 3_000, None), SaleState::Closed);
        assert_eq!(
            sale_state(&config, 3_000, Some(Outcome::GoalMissed)),
            SaleState::GoalMissed
        );
        assert_eq!(
            sale_state(&config, 9_999, Some(Outcome::GoalMet)),
            SaleState::GoalMet
        );
    }

    #[test]
    fn test_remaining_allotment() {
        let env = Env::default();
        assert_eq!(remaining_allotment(&config(&env), 0), 90);
        assert_eq!(remaining_allotment(&config(&env), 22), 68);
    }
}
