//! Game session: players, day/turn progression and the Setup → Playing →
//! Finished lifecycle.
//!
//! Turns are strictly sequential. Every stand plays the same day before the
//! day advances; a closed day waits for [`GameSession::open_next_day`] or
//! [`GameSession::end_early`] so a presentation layer can ask whether to go on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stand_core::{
    DailyDecision, DailyResult, DecisionError, Player, PlayerId, StandConfig, Weather,
    WeatherKind, MAX_PLAYERS,
};
use thiserror::Error;
use tracing::info;

use crate::engine::{self, DayCosts};

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Collecting player names.
    Setup,
    /// Days are being played.
    Playing,
    /// Terminal; rankings are available.
    Finished,
}

/// Errors from driving a session out of order or with bad input.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Operation invoked in the wrong lifecycle state.
    #[error("session is {found:?}, expected {expected:?}")]
    WrongState {
        expected: SessionStatus,
        found: SessionStatus,
    },
    /// Every stand has played today; open the next day or end the game.
    #[error("day {0} is closed")]
    DayClosed(u32),
    /// The day still has stands left to play.
    #[error("day {0} is still in progress")]
    DayInProgress(u32),
    #[error("at least one player is needed to start")]
    NoPlayers,
    #[error("at most {max} players can join")]
    TooManyPlayers { max: usize },
    #[error("player name cannot be blank")]
    EmptyName,
    /// Decision failed validation; the adapter should re-prompt.
    #[error("invalid decision: {0}")]
    InvalidDecision(#[from] DecisionError),
}

/// The stand whose decision is awaited, with the day's conditions.
#[derive(Clone, Copy, Debug)]
pub struct Turn<'a> {
    pub player: &'a Player,
    pub day: u32,
    pub weather: Weather,
    pub costs: DayCosts,
}

/// What one submitted decision produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// Stand that submitted.
    pub player: PlayerId,
    pub result: DailyResult,
    /// Bankrupt stands passed over while moving to the next turn.
    pub skipped: Vec<(PlayerId, DailyResult)>,
    /// True when this was the day's last turn.
    pub day_closed: bool,
}

/// One lemonade stand game. Owns its players and its randomness source.
#[derive(Debug)]
pub struct GameSession<R = ChaCha8Rng> {
    config: StandConfig,
    rng: R,
    day: u32,
    players: Vec<Player>,
    current: usize,
    weather: Weather,
    status: SessionStatus,
    day_closed: bool,
}

impl GameSession<ChaCha8Rng> {
    /// New session drawing from a ChaCha8 generator seeded with `seed`.
    pub fn seeded(config: StandConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSession<R> {
    pub fn new(config: StandConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            day: 1,
            players: Vec::new(),
            current: 0,
            weather: Weather::calm(WeatherKind::Sunny, 80),
            status: SessionStatus::Setup,
            day_closed: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn max_days(&self) -> u32 {
        self.config.max_days
    }

    /// Weather for the current day (a placeholder before `start`).
    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_day_closed(&self) -> bool {
        self.day_closed
    }

    /// Prices in force today.
    pub fn costs(&self) -> DayCosts {
        DayCosts {
            per_unit: self.config.unit_cost(self.day),
            per_sign: self.config.cost_per_sign,
        }
    }

    /// Register a stand. Names are trimmed; blank names are rejected.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, SessionError> {
        self.expect_status(SessionStatus::Setup)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(SessionError::TooManyPlayers { max: MAX_PLAYERS });
        }
        let id = PlayerId(self.players.len() as u32 + 1);
        self.players.push(Player::new(id, name, self.config.starting_cash));
        Ok(id)
    }

    /// Open day 1: generate its weather and hand the first turn out.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_status(SessionStatus::Setup)?;
        if self.players.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        self.status = SessionStatus::Playing;
        self.day = 1;
        self.current = 0;
        self.day_closed = false;
        self.weather = stand_econ::generate_weather(self.day, &mut self.rng);
        info!(
            players = self.players.len(),
            max_days = self.config.max_days,
            weather = %self.weather,
            "session started"
        );
        if self.config.max_days == 0 {
            self.finish("no days to play");
        }
        Ok(())
    }

    /// The stand to act next, or `None` when no decision is awaited.
    pub fn current_turn(&self) -> Option<Turn<'_>> {
        if self.status != SessionStatus::Playing || self.day_closed {
            return None;
        }
        Some(Turn {
            player: &self.players[self.current],
            day: self.day,
            weather: self.weather,
            costs: self.costs(),
        })
    }

    /// Resolve the current stand's decision and move to the next turn.
    ///
    /// An invalid decision is returned as an error and the turn stays with
    /// the same stand.
    pub fn submit(&mut self, decision: DailyDecision) -> Result<TurnReport, SessionError> {
        self.expect_status(SessionStatus::Playing)?;
        if self.day_closed {
            return Err(SessionError::DayClosed(self.day));
        }
        let costs = self.costs();
        let player = &mut self.players[self.current];
        let id = player.id;
        let result = engine::resolve_turn(
            player,
            &decision,
            &self.weather,
            &costs,
            self.day,
            &mut self.rng,
        )?;

        let skipped = self.advance_from(self.current + 1);
        Ok(TurnReport {
            player: id,
            result,
            skipped,
            day_closed: self.day_closed,
        })
    }

    /// Start the next day once the current one is closed.
    ///
    /// Returns skipped results for bankrupt stands at the head of the order.
    pub fn open_next_day(&mut self) -> Result<Vec<(PlayerId, DailyResult)>, SessionError> {
        self.expect_status(SessionStatus::Playing)?;
        if !self.day_closed {
            return Err(SessionError::DayInProgress(self.day));
        }
        self.day += 1;
        self.day_closed = false;
        self.weather = stand_econ::generate_weather(self.day, &mut self.rng);
        info!(day = self.day, weather = %self.weather, "day opened");
        Ok(self.advance_from(0))
    }

    /// Stop between days (the "continue?" gate answered no).
    pub fn end_early(&mut self) -> Result<(), SessionError> {
        self.expect_status(SessionStatus::Playing)?;
        if !self.day_closed {
            return Err(SessionError::DayInProgress(self.day));
        }
        self.finish("ended early");
        Ok(())
    }

    /// Players by cash, richest first; ties keep join order.
    pub fn standings(&self) -> Vec<&Player> {
        let mut sorted: Vec<&Player> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.cash.cmp(&a.cash));
        sorted
    }

    /// Final ranking, available once the session is finished.
    pub fn ranking(&self) -> Result<Vec<&Player>, SessionError> {
        self.expect_status(SessionStatus::Finished)?;
        Ok(self.standings())
    }

    fn expect_status(&self, expected: SessionStatus) -> Result<(), SessionError> {
        if self.status != expected {
            return Err(SessionError::WrongState {
                expected,
                found: self.status,
            });
        }
        Ok(())
    }

    /// Move the cursor to the first solvent stand at or after `idx`,
    /// recording skipped days for bankrupt stands on the way. Running off
    /// the end closes the day.
    fn advance_from(&mut self, mut idx: usize) -> Vec<(PlayerId, DailyResult)> {
        let mut skipped = Vec::new();
        while let Some(player) = self.players.get_mut(idx) {
            if !player.is_bankrupt {
                self.current = idx;
                return skipped;
            }
            let result = engine::skip_turn(player, &self.weather, self.day);
            skipped.push((player.id, result));
            idx += 1;
        }
        self.close_day();
        skipped
    }

    fn close_day(&mut self) {
        self.day_closed = true;
        if self.players.iter().all(|p| p.is_bankrupt) {
            self.finish("all stands bankrupt");
        } else if self.day >= self.config.max_days {
            self.finish("last day played");
        }
    }

    fn finish(&mut self, reason: &str) {
        self.status = SessionStatus::Finished;
        info!(day = self.day, reason, "session finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stand_core::StandEvent;

    fn session(names: &[&str], days: u32, seed: u64) -> GameSession {
        let cfg = StandConfig {
            max_days: days,
            ..StandConfig::default()
        };
        let mut s = GameSession::seeded(cfg, seed);
        for n in names {
            s.add_player(n).unwrap();
        }
        s
    }

    /// Plays modest, always-affordable decisions until the session stops.
    fn play_out(s: &mut GameSession) {
        while s.status() == SessionStatus::Playing {
            if s.is_day_closed() {
                s.open_next_day().unwrap();
                continue;
            }
            s.submit(DailyDecision::new(0, 0, 25)).unwrap();
        }
    }

    #[test]
    fn setup_rules() {
        let mut s = session(&[], 3, 1);
        assert_eq!(s.start(), Err(SessionError::NoPlayers));
        assert_eq!(s.add_player("   "), Err(SessionError::EmptyName));
        for i in 0..MAX_PLAYERS {
            s.add_player(&format!("P{i}")).unwrap();
        }
        assert_eq!(
            s.add_player("one too many"),
            Err(SessionError::TooManyPlayers { max: 30 })
        );
        assert_eq!(s.players()[29].id, PlayerId(30));
        assert_eq!(s.players()[0].cash, Decimal::new(200, 2));
    }

    #[test]
    fn wrong_state_is_reported() {
        let mut s = session(&["Ada"], 3, 1);
        assert!(s.current_turn().is_none());
        assert_eq!(
            s.submit(DailyDecision::default()),
            Err(SessionError::WrongState {
                expected: SessionStatus::Playing,
                found: SessionStatus::Setup
            })
        );
        assert!(s.ranking().is_err());
        s.start().unwrap();
        assert!(s.add_player("late").is_err());
        assert!(s.start().is_err());
        assert_eq!(s.open_next_day(), Err(SessionError::DayInProgress(1)));
    }

    #[test]
    fn runs_exactly_max_days_per_player() {
        let mut s = session(&["Ada", "Bob", "Cy"], 5, 42);
        s.start().unwrap();
        play_out(&mut s);
        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.day(), 5);
        for p in s.players() {
            assert_eq!(p.history.len(), 5);
            let days: Vec<u32> = p.history.iter().map(|r| r.day).collect();
            assert_eq!(days, vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn turns_rotate_within_a_day() {
        let mut s = session(&["Ada", "Bob"], 2, 7);
        s.start().unwrap();
        let first = s.current_turn().unwrap();
        assert_eq!(first.player.id, PlayerId(1));
        assert_eq!(first.day, 1);
        let r = s.submit(DailyDecision::new(10, 0, 20)).unwrap();
        assert_eq!(r.player, PlayerId(1));
        assert!(!r.day_closed);
        assert_eq!(s.current_turn().unwrap().player.id, PlayerId(2));
        let r = s.submit(DailyDecision::new(10, 0, 20)).unwrap();
        assert!(r.day_closed);
        assert!(s.current_turn().is_none());
        assert_eq!(
            s.submit(DailyDecision::default()),
            Err(SessionError::DayClosed(1))
        );
        s.open_next_day().unwrap();
        assert_eq!(s.day(), 2);
        assert_eq!(s.current_turn().unwrap().player.id, PlayerId(1));
    }

    #[test]
    fn weather_is_shared_within_a_day() {
        let mut s = session(&["Ada", "Bob"], 1, 9);
        s.start().unwrap();
        let a = s.submit(DailyDecision::new(5, 0, 20)).unwrap();
        let b = s.submit(DailyDecision::new(5, 0, 20)).unwrap();
        assert_eq!(a.result.weather, b.result.weather);
        assert_eq!(s.status(), SessionStatus::Finished);
    }

    #[test]
    fn weather_is_drawn_before_each_days_demand() {
        let d = DailyDecision::new(40, 2, 20);
        for seed in 0..50 {
            let mut s = session(&["Ada", "Bob"], 2, seed);
            s.start().unwrap();
            let mut replay = ChaCha8Rng::seed_from_u64(seed);
            for day in 1..=2 {
                let w = stand_econ::generate_weather(day, &mut replay);
                assert_eq!(*s.weather(), w, "seed {seed} day {day}");
                for _ in 0..2 {
                    let expected = stand_econ::estimate_units_sold(&d, &w, &mut replay);
                    let r = s.submit(d).unwrap().result;
                    assert_eq!(r.units_sold, expected.units_sold, "seed {seed} day {day}");
                    assert_eq!(r.events, expected.events, "seed {seed} day {day}");
                }
                if day == 1 {
                    s.open_next_day().unwrap();
                }
            }
            assert_eq!(s.status(), SessionStatus::Finished);
        }
    }

    #[test]
    fn invalid_decision_keeps_the_turn() {
        let mut s = session(&["Ada", "Bob"], 2, 3);
        s.start().unwrap();
        let err = s.submit(DailyDecision::new(2000, 0, 10)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidDecision(_)));
        assert_eq!(s.current_turn().unwrap().player.id, PlayerId(1));
        assert!(s.players()[0].history.is_empty());
    }

    fn poor_session(names: &[&str], days: u32) -> GameSession {
        let cfg = StandConfig {
            max_days: days,
            starting_cash: Decimal::new(10, 2),
            ..StandConfig::default()
        };
        let mut s = GameSession::seeded(cfg, 8);
        for n in names {
            s.add_player(n).unwrap();
        }
        s.start().unwrap();
        s
    }

    // Four glasses given away for free leave exactly one glass worth of cash.
    fn go_broke() -> DailyDecision {
        DailyDecision::new(4, 0, 0)
    }

    #[test]
    fn bankrupt_stand_is_skipped_and_flagged() {
        let mut s = poor_session(&["Ada", "Bob"], 4);
        let r = s.submit(go_broke()).unwrap();
        assert_eq!(r.result.net_profit, Decimal::new(-8, 2));
        assert!(s.players()[0].is_bankrupt);
        assert!(r.skipped.is_empty());
        s.submit(DailyDecision::new(0, 0, 25)).unwrap();

        let skipped = s.open_next_day().unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, PlayerId(1));
        assert_eq!(skipped[0].1.day, 2);
        assert_eq!(skipped[0].1.events, vec![StandEvent::Bankrupt]);
        assert_eq!(s.current_turn().unwrap().player.id, PlayerId(2));

        play_out(&mut s);
        let ada = &s.players()[0];
        assert_eq!(ada.history.len(), 4);
        assert_eq!(ada.cash, Decimal::new(2, 2));
        for r in &ada.history[1..] {
            assert_eq!(r.units_sold, 0);
            assert_eq!(r.expenses, Decimal::ZERO);
            assert_eq!(r.net_profit, Decimal::ZERO);
        }
        assert_eq!(s.players()[1].history.len(), 4);
        let ids: Vec<PlayerId> = s.ranking().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlayerId(2), PlayerId(1)]);
    }

    #[test]
    fn bankrupt_stand_mid_order_is_skipped_after_submit() {
        let mut s = poor_session(&["Ada", "Bob", "Cy"], 3);
        s.submit(DailyDecision::new(0, 0, 25)).unwrap();
        s.submit(go_broke()).unwrap();
        s.submit(DailyDecision::new(0, 0, 25)).unwrap();
        s.open_next_day().unwrap();
        let r = s.submit(DailyDecision::new(0, 0, 25)).unwrap();
        assert_eq!(r.skipped.len(), 1);
        assert_eq!(r.skipped[0].0, PlayerId(2));
        assert_eq!(s.current_turn().unwrap().player.id, PlayerId(3));
    }

    #[test]
    fn all_bankrupt_ends_the_game() {
        let mut s = poor_session(&["Ada", "Bob"], 12);
        s.submit(go_broke()).unwrap();
        assert_eq!(s.status(), SessionStatus::Playing);
        let r = s.submit(go_broke()).unwrap();
        assert!(r.day_closed);
        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.day(), 1);
        assert_eq!(s.ranking().unwrap().len(), 2);
        assert!(s.open_next_day().is_err());
    }

    #[test]
    fn end_early_only_between_days() {
        let mut s = session(&["Ada"], 5, 2);
        s.start().unwrap();
        assert_eq!(s.end_early(), Err(SessionError::DayInProgress(1)));
        s.submit(DailyDecision::new(3, 0, 20)).unwrap();
        s.end_early().unwrap();
        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.players()[0].history.len(), 1);
    }

    #[test]
    fn ranking_is_cash_desc_then_join_order() {
        let mut s = session(&["Ada", "Bob", "Cy"], 1, 4);
        s.start().unwrap();
        s.submit(DailyDecision::new(0, 0, 10)).unwrap();
        s.submit(DailyDecision::new(0, 1, 10)).unwrap();
        s.submit(DailyDecision::new(0, 0, 10)).unwrap();
        let ids: Vec<PlayerId> = s.ranking().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlayerId(1), PlayerId(3), PlayerId(2)]);
    }

    #[test]
    fn same_seed_same_game() {
        let mut a = session(&["Ada", "Bob"], 6, 77);
        let mut b = session(&["Ada", "Bob"], 6, 77);
        a.start().unwrap();
        b.start().unwrap();
        play_out(&mut a);
        play_out(&mut b);
        for (pa, pb) in a.players().iter().zip(b.players()) {
            assert_eq!(pa.history, pb.history);
            assert_eq!(pa.cash, pb.cash);
        }
    }
}
