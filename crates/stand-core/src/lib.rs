#![deny(warnings)]

//! Core domain models and invariants for the lemonade stand simulation.
//!
//! This crate defines serializable types shared by the weather/demand models,
//! the resolution engine and any presentation layer, plus validation helpers
//! that guard the daily decision bounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Cash every stand opens with, in cents.
pub const STARTING_CASH_CENTS: i64 = 200;
/// Length of a full game in days.
pub const MAX_DAYS: u32 = 12;
/// Cost of making one glass, in cents.
pub const COST_PER_UNIT_CENTS: i64 = 2;
/// Cost of one advertising sign, in cents.
pub const COST_PER_SIGN_CENTS: i64 = 15;
/// Upper bound on glasses made per day.
pub const MAX_UNITS_PER_DAY: u32 = 1000;
/// Upper bound on signs per day.
pub const MAX_SIGNS_PER_DAY: u32 = 50;
/// Upper bound on the asking price per glass, in cents.
pub const MAX_PRICE_CENTS: u32 = 100;
/// Upper bound on players in one session.
pub const MAX_PLAYERS: usize = 30;

/// Broad weather category for a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherKind {
    /// Clear skies.
    Sunny,
    /// Overcast; the only kind that can turn stormy.
    Cloudy,
    /// Heat wave conditions, best for sales.
    HotAndDry,
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeatherKind::Sunny => "sunny",
            WeatherKind::Cloudy => "cloudy",
            WeatherKind::HotAndDry => "hot and dry",
        };
        f.write_str(s)
    }
}

/// The day's weather, shared by every stand that day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// Weather category.
    pub kind: WeatherKind,
    /// Temperature in °F, flavor only.
    pub temperature: i32,
    /// Thunderstorm; only ever set on cloudy days.
    pub is_stormy: bool,
}

impl Weather {
    /// A calm day of the given kind.
    pub fn calm(kind: WeatherKind, temperature: i32) -> Self {
        Self {
            kind,
            temperature,
            is_stormy: false,
        }
    }

    /// A thunderstorm (always cloudy).
    pub fn storm(temperature: i32) -> Self {
        Self {
            kind: WeatherKind::Cloudy,
            temperature,
            is_stormy: true,
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stormy {
            write!(f, "thunderstorms, {}°F", self.temperature)
        } else {
            write!(f, "{}, {}°F", self.kind, self.temperature)
        }
    }
}

/// Which decision field a validation error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionField {
    /// Glasses to make.
    Units,
    /// Advertising signs.
    Signs,
    /// Price per glass in cents.
    Price,
}

impl fmt::Display for DecisionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionField::Units => "glasses to make",
            DecisionField::Signs => "advertising signs",
            DecisionField::Price => "price per glass",
        };
        f.write_str(s)
    }
}

/// Validation errors for a player's daily decision.
#[derive(Debug, Error, PartialEq)]
pub enum DecisionError {
    /// A quantity was below zero.
    #[error("{field} cannot be negative (got {value})")]
    Negative { field: DecisionField, value: i64 },
    /// A quantity exceeded its daily maximum.
    #[error("{field} must be at most {max} (got {value})")]
    OutOfRange {
        field: DecisionField,
        value: u32,
        max: u32,
    },
    /// Raw input too large to be a quantity at all.
    #[error("{field} is far too large (got {value})")]
    TooLarge { field: DecisionField, value: i64 },
    /// The stand cannot pay for what it asked for.
    #[error("you need ${needed:.2} but only have ${available:.2}")]
    Unaffordable { needed: Decimal, available: Decimal },
}

/// A player's production, advertising and pricing choice for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDecision {
    /// Glasses of lemonade to make.
    pub units_to_make: u32,
    /// Advertising signs to put up.
    pub signs: u32,
    /// Asking price per glass in cents.
    pub price_cents: u32,
}

impl DailyDecision {
    pub fn new(units_to_make: u32, signs: u32, price_cents: u32) -> Self {
        Self {
            units_to_make,
            signs,
            price_cents,
        }
    }

    /// Build a decision from raw signed input and range-check it.
    pub fn from_signed(units: i64, signs: i64, price_cents: i64) -> Result<Self, DecisionError> {
        let decision = Self {
            units_to_make: non_negative(DecisionField::Units, units)?,
            signs: non_negative(DecisionField::Signs, signs)?,
            price_cents: non_negative(DecisionField::Price, price_cents)?,
        };
        validate_decision(&decision)?;
        Ok(decision)
    }

    /// Production plus advertising spend for this decision.
    pub fn expenses(&self, cost_per_unit: Decimal, cost_per_sign: Decimal) -> Decimal {
        Decimal::from(self.units_to_make) * cost_per_unit
            + Decimal::from(self.signs) * cost_per_sign
    }

    /// Price per glass in dollars.
    pub fn price(&self) -> Decimal {
        Decimal::new(i64::from(self.price_cents), 2)
    }
}

/// Parse one signed field, mapping negatives (and values past `u32`) to errors.
pub fn non_negative(field: DecisionField, value: i64) -> Result<u32, DecisionError> {
    if value < 0 {
        return Err(DecisionError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| DecisionError::TooLarge { field, value })
}

fn max_for(field: DecisionField) -> u32 {
    match field {
        DecisionField::Units => MAX_UNITS_PER_DAY,
        DecisionField::Signs => MAX_SIGNS_PER_DAY,
        DecisionField::Price => MAX_PRICE_CENTS,
    }
}

/// Check one already-parsed field against its daily maximum.
pub fn validate_field(field: DecisionField, value: u32) -> Result<(), DecisionError> {
    let max = max_for(field);
    if value > max {
        return Err(DecisionError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// Validate a decision against the daily maxima.
pub fn validate_decision(d: &DailyDecision) -> Result<(), DecisionError> {
    validate_field(DecisionField::Units, d.units_to_make)?;
    validate_field(DecisionField::Signs, d.signs)?;
    validate_field(DecisionField::Price, d.price_cents)?;
    Ok(())
}

/// Check that `cash` covers `cost`. Used by adapters before submitting.
pub fn validate_affordable(cost: Decimal, cash: Decimal) -> Result<(), DecisionError> {
    if cost > cash {
        return Err(DecisionError::Unaffordable {
            needed: cost,
            available: cash,
        });
    }
    Ok(())
}

/// Narrative events attached to a daily result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandEvent {
    /// Storm short-circuit: no customers at all.
    Thunderstorm,
    /// Street crew bought every glass made.
    StreetCrew,
    /// Wind took some signs; flavor only.
    Wind,
    /// Skipped turn for a bankrupt stand.
    Bankrupt,
}

impl StandEvent {
    pub fn message(self) -> &'static str {
        match self {
            StandEvent::Thunderstorm => "Thunderstorm! Nobody came to the stand.",
            StandEvent::StreetCrew => "Street crews bought all your lemonade!",
            StandEvent::Wind => "Wind blew away some of your signs!",
            StandEvent::Bankrupt => "You are bankrupt, no decisions for you to make.",
        }
    }
}

impl fmt::Display for StandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Financial outcome of one stand's day. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    /// 1-based day index.
    pub day: u32,
    pub weather: Weather,
    pub decision: DailyDecision,
    pub units_sold: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_profit: Decimal,
    /// Triggered events in roll order.
    pub events: Vec<StandEvent>,
}

impl DailyResult {
    /// A zero-output, zero-cost turn for a stand that sat the day out.
    pub fn skipped(day: u32, weather: Weather) -> Self {
        Self {
            day,
            weather,
            decision: DailyDecision::default(),
            units_sold: 0,
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            events: vec![StandEvent::Bankrupt],
        }
    }
}

/// Identifier for a player: 1-based join order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stand {}", self.0)
    }
}

/// A lemonade stand and its ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cash on hand; only the resolution engine changes it.
    pub cash: Decimal,
    /// Sticky once set.
    pub is_bankrupt: bool,
    /// One entry per day played, oldest first.
    pub history: Vec<DailyResult>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, cash: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            cash,
            is_bankrupt: false,
            history: Vec::new(),
        }
    }

    /// Sum of net profit over the recorded history.
    pub fn total_profit(&self) -> Decimal {
        self.history.iter().map(|r| r.net_profit).sum()
    }
}

/// Rule parameters for a session. Not environment-driven.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandConfig {
    /// Number of days before the game ends.
    pub max_days: u32,
    /// Cash each stand opens with.
    pub starting_cash: Decimal,
    /// Cost of one glass.
    pub cost_per_unit: Decimal,
    /// Cost of one sign.
    pub cost_per_sign: Decimal,
}

impl Default for StandConfig {
    fn default() -> Self {
        Self {
            max_days: MAX_DAYS,
            starting_cash: Decimal::new(STARTING_CASH_CENTS, 2),
            cost_per_unit: Decimal::new(COST_PER_UNIT_CENTS, 2),
            cost_per_sign: Decimal::new(COST_PER_SIGN_CENTS, 2),
        }
    }
}

impl StandConfig {
    /// Cost of one glass on `day`. Flat for the whole game.
    pub fn unit_cost(&self, _day: u32) -> Decimal {
        self.cost_per_unit
    }
}
