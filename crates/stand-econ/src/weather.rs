//! Daily weather generation.

use rand::Rng;
use stand_core::{Weather, WeatherKind};
use tracing::debug;

/// Share of days that are cloudy.
const CLOUDY_BELOW: f64 = 0.3;
/// Cloudy below this, sunny up to it, hot and dry above.
const SUNNY_BELOW: f64 = 0.6;
/// Chance that a cloudy day turns into a thunderstorm.
const STORM_CHANCE: f64 = 0.25;
/// Storms knock this much off the temperature.
const STORM_COOLING: i32 = 10;

/// Generate the weather for `day`.
///
/// Consumes one draw for the kind, one storm draw on cloudy days, and one
/// integer draw for the temperature.
pub fn generate<R: Rng + ?Sized>(day: u32, rng: &mut R) -> Weather {
    let r: f64 = rng.gen();
    let (kind, is_stormy) = if r < CLOUDY_BELOW {
        (WeatherKind::Cloudy, rng.gen::<f64>() < STORM_CHANCE)
    } else if r < SUNNY_BELOW {
        (WeatherKind::Sunny, false)
    } else {
        (WeatherKind::HotAndDry, false)
    };

    let mut temperature = match kind {
        WeatherKind::Sunny => 80 + rng.gen_range(0..10),
        WeatherKind::HotAndDry => 90 + rng.gen_range(0..15),
        WeatherKind::Cloudy => 60 + rng.gen_range(0..10),
    };
    if is_stormy {
        temperature -= STORM_COOLING;
    }

    let weather = Weather {
        kind,
        temperature,
        is_stormy,
    };
    debug!(day, ?weather, "weather generated");
    weather
}
