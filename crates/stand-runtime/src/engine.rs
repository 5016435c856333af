//! Daily resolution: decision + weather -> financial result, applied to a stand.
//!
//! [`apply_result`] is the only place a player's cash, bankruptcy flag and
//! history change.

use rand::Rng;
use rust_decimal::Decimal;
use stand_core::{validate_decision, DailyDecision, DailyResult, DecisionError, Player, Weather};
use stand_econ::estimate_units_sold;
use tracing::{debug, info};

/// Per-unit and per-sign prices in force for one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayCosts {
    pub per_unit: Decimal,
    pub per_sign: Decimal,
}

/// Resolve one stand's day without touching any player.
///
/// Out-of-range decisions are rejected, never clamped.
pub fn resolve_day<R: Rng + ?Sized>(
    decision: &DailyDecision,
    weather: &Weather,
    costs: &DayCosts,
    day: u32,
    rng: &mut R,
) -> Result<DailyResult, DecisionError> {
    validate_decision(decision)?;
    let expenses = decision.expenses(costs.per_unit, costs.per_sign);
    let demand = estimate_units_sold(decision, weather, rng);

    let income = if demand.stormed_out() {
        Decimal::ZERO
    } else {
        Decimal::from(demand.units_sold) * decision.price()
    };

    Ok(DailyResult {
        day,
        weather: *weather,
        decision: *decision,
        units_sold: demand.units_sold,
        income,
        expenses,
        net_profit: income - expenses,
        events: demand.events,
    })
}

/// Book `result` against `player` and run the bankruptcy check.
///
/// Returns true when this result made the player bankrupt.
pub fn apply_result(player: &mut Player, result: DailyResult, cost_per_unit: Decimal) -> bool {
    player.cash += result.net_profit;
    player.history.push(result);
    if player.is_bankrupt || player.cash > cost_per_unit {
        return false;
    }
    player.is_bankrupt = true;
    info!(player = %player.id, name = %player.name, cash = %player.cash, "stand went bankrupt");
    true
}

/// Resolve and book a turn. Bankrupt stands sit the day out and `decision`
/// is ignored.
pub fn resolve_turn<R: Rng + ?Sized>(
    player: &mut Player,
    decision: &DailyDecision,
    weather: &Weather,
    costs: &DayCosts,
    day: u32,
    rng: &mut R,
) -> Result<DailyResult, DecisionError> {
    if player.is_bankrupt {
        return Ok(skip_turn(player, weather, day));
    }
    let result = resolve_day(decision, weather, costs, day, rng)?;
    debug!(
        player = %player.id,
        day,
        sold = result.units_sold,
        income = %result.income,
        expenses = %result.expenses,
        net = %result.net_profit,
        "turn resolved"
    );
    apply_result(player, result.clone(), costs.per_unit);
    Ok(result)
}

/// Record a zero-cost, zero-output day for a bankrupt stand.
pub fn skip_turn(player: &mut Player, weather: &Weather, day: u32) -> DailyResult {
    let result = DailyResult::skipped(day, *weather);
    player.history.push(result.clone());
    debug!(player = %player.id, day, "bankrupt stand skipped");
    result
}
