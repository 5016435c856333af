//! Presentation adapter contract and the loop that drives a session with it.

use rand::Rng;
use stand_core::{DailyDecision, DailyResult, Player, PlayerId, Weather};
use tracing::debug;

use crate::engine::DayCosts;
use crate::session::{GameSession, SessionError, SessionStatus, Turn};

/// Collects decisions and shows outcomes. Implemented by front-ends.
///
/// `collect_decision` is the only suspension point of a session. A decision
/// that fails validation aborts [`play`] with `SessionError::InvalidDecision`,
/// so adapters are expected to validate and re-prompt before returning.
pub trait Presenter {
    type Error: From<SessionError>;

    /// Announce day `day` of `max_days` before any stand acts on it.
    fn present_day(
        &mut self,
        _day: u32,
        _max_days: u32,
        _weather: &Weather,
        _costs: &DayCosts,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn collect_decision(&mut self, turn: &Turn<'_>) -> Result<DailyDecision, Self::Error>;

    /// Show one stand's result; `player` already reflects it.
    fn present_result(&mut self, player: &Player, result: &DailyResult) -> Result<(), Self::Error>;

    /// Standings after a day closes with more days to come, richest first.
    fn present_standings(&mut self, _standings: &[&Player]) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Gate between days; `false` ends the game.
    fn confirm_next_day(&mut self, _next_day: u32) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Final ranking, richest first.
    fn present_game_over(&mut self, ranking: &[&Player]) -> Result<(), Self::Error>;
}

/// Run `session` to completion against `presenter`.
///
/// A session still in setup is started first. Errors from the presenter
/// abandon the session where it stands.
pub fn play<R, P>(session: &mut GameSession<R>, presenter: &mut P) -> Result<(), P::Error>
where
    R: Rng,
    P: Presenter,
{
    if session.status() == SessionStatus::Setup {
        session.start()?;
    }
    if session.status() == SessionStatus::Playing {
        announce_day(session, presenter)?;
    }

    while session.status() == SessionStatus::Playing {
        if session.is_day_closed() {
            presenter.present_standings(&session.standings())?;
            let next = session.day() + 1;
            if !presenter.confirm_next_day(next)? {
                debug!(day = session.day(), "players stopped between days");
                session.end_early()?;
                break;
            }
            let skipped = session.open_next_day()?;
            announce_day(session, presenter)?;
            present_all(session, presenter, &skipped)?;
            continue;
        }

        let decision = match session.current_turn() {
            Some(turn) => presenter.collect_decision(&turn)?,
            None => return Err(SessionError::DayClosed(session.day()).into()),
        };
        let report = session.submit(decision)?;
        present_all(session, presenter, &[(report.player, report.result)])?;
        present_all(session, presenter, &report.skipped)?;
    }

    let ranking = session.ranking()?;
    presenter.present_game_over(&ranking)
}

fn announce_day<R: Rng, P: Presenter>(
    session: &GameSession<R>,
    presenter: &mut P,
) -> Result<(), P::Error> {
    presenter.present_day(
        session.day(),
        session.max_days(),
        session.weather(),
        &session.costs(),
    )
}

fn present_all<R: Rng, P: Presenter>(
    session: &GameSession<R>,
    presenter: &mut P,
    results: &[(PlayerId, DailyResult)],
) -> Result<(), P::Error> {
    for (id, result) in results {
        if let Some(player) = session.player(*id) {
            presenter.present_result(player, result)?;
        }
    }
    Ok(())
}
