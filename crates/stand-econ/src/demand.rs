//! Customer demand: turns a decision and the day's weather into glasses sold.
//!
//! Interest starts from a per-weather base, falls off quadratically with
//! price (nobody pays a dollar or more), grows logarithmically with signs,
//! and is scaled by a uniform multiplier in [0.8, 1.2). Sales are capped by
//! the glasses made, then rare events may override the outcome.

use rand::Rng;
use stand_core::{DailyDecision, StandEvent, Weather, WeatherKind, MAX_PRICE_CENTS};
use tracing::debug;

/// Price at which the price factor equals one (100 - 75 = 25 cents).
const PRICE_SCALE: f64 = 75.0;
/// Weight of the advertising log term.
const SIGN_WEIGHT: f64 = 0.5;
const MULTIPLIER_LOW: f64 = 0.8;
const MULTIPLIER_HIGH: f64 = 1.2;
const STREET_CREW_CHANCE: f64 = 0.05;
const WIND_CHANCE: f64 = 0.10;

/// Glasses sold plus any events triggered while selling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandOutcome {
    pub units_sold: u32,
    pub events: Vec<StandEvent>,
}

impl DemandOutcome {
    /// True when the storm short-circuit fired.
    pub fn stormed_out(&self) -> bool {
        self.events.first() == Some(&StandEvent::Thunderstorm)
    }
}

/// Baseline customer interest for a weather kind.
pub fn base_interest(kind: WeatherKind) -> f64 {
    match kind {
        WeatherKind::Sunny => 60.0,
        WeatherKind::HotAndDry => 90.0,
        WeatherKind::Cloudy => 20.0,
    }
}

/// Quadratic price falloff; zero at or above the price ceiling.
///
/// Example: 25 cents gives 1.0, 10 cents gives 1.44, 100 cents gives 0.
pub fn price_factor(price_cents: u32) -> f64 {
    if price_cents >= MAX_PRICE_CENTS {
        return 0.0;
    }
    let f = (f64::from(MAX_PRICE_CENTS) - f64::from(price_cents)) / PRICE_SCALE;
    f * f
}

/// Advertising boost `1 + 0.5 ln(signs + 1)`; exactly 1 with no signs.
pub fn advertising_factor(signs: u32) -> f64 {
    1.0 + SIGN_WEIGHT * (f64::from(signs) + 1.0).ln()
}

/// Interest before the random multiplier is applied.
pub fn expected_interest(decision: &DailyDecision, weather: &Weather) -> f64 {
    if weather.is_stormy {
        return 0.0;
    }
    base_interest(weather.kind)
        * price_factor(decision.price_cents)
        * advertising_factor(decision.signs)
}

/// Estimate glasses sold for one stand on one day.
///
/// A stormy day returns zero sales with a single thunderstorm event and
/// draws nothing from `rng`. Otherwise exactly three draws are consumed:
/// the demand multiplier, the street-crew roll and the wind roll.
pub fn estimate_units_sold<R: Rng + ?Sized>(
    decision: &DailyDecision,
    weather: &Weather,
    rng: &mut R,
) -> DemandOutcome {
    if weather.is_stormy {
        return DemandOutcome {
            units_sold: 0,
            events: vec![StandEvent::Thunderstorm],
        };
    }

    let interest = expected_interest(decision, weather);
    let m: f64 = rng.gen_range(MULTIPLIER_LOW..MULTIPLIER_HIGH);
    let potential = (interest * m).floor();
    let potential = if potential.is_finite() && potential > 0.0 {
        potential.min(f64::from(u32::MAX)) as u32
    } else {
        0
    };
    let mut units_sold = potential.min(decision.units_to_make);
    let mut events = Vec::new();

    if rng.gen::<f64>() < STREET_CREW_CHANCE {
        units_sold = decision.units_to_make;
        events.push(StandEvent::StreetCrew);
    }
    // Always rolled so the draw count does not depend on the decision.
    let wind = rng.gen::<f64>() < WIND_CHANCE;
    if wind && decision.signs > 0 {
        events.push(StandEvent::Wind);
    }

    debug!(interest, multiplier = m, potential, units_sold, ?events, "demand resolved");
    DemandOutcome { units_sold, events }
}
