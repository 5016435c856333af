#![deny(warnings)]

//! Economic models for the lemonade stand: daily weather and customer demand.
//!
//! Both models draw from an injected [`rand::Rng`] in a fixed order so that a
//! seeded generator reproduces a whole session:
//! - [`weather::generate`]: kind, then storm roll (cloudy only), then temperature
//! - [`demand::estimate_units_sold`]: multiplier, street-crew roll, wind roll

pub mod demand;
pub mod weather;

pub use demand::{base_interest, estimate_units_sold, expected_interest, DemandOutcome};
pub use weather::generate as generate_weather;
