#![deny(warnings)]

//! Line-oriented console front-end for the lemonade stand game.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use stand_core::{
    non_negative, validate_affordable, validate_field, DailyDecision, DailyResult, DecisionError,
    DecisionField, Player, StandConfig, StandEvent, Weather, MAX_PLAYERS,
};
use stand_runtime::{play, DayCosts, GameSession, Presenter, Turn};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_args() -> Option<usize> {
    let mut players: Option<usize> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg.as_str() == "--players" {
            players = it.next().and_then(|s| s.parse().ok());
        }
    }
    players
}

/// Prompt/response console over any line source and sink.
struct Console<I, O> {
    input: I,
    out: O,
}

impl<I: BufRead, O: Write> Console<I, O> {
    fn new(input: I, out: O) -> Self {
        Self { input, out }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.out, "{question} ")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    /// Ask until the answer parses as an integer.
    fn ask_number(&mut self, question: &str) -> Result<i64> {
        let mut prompt = question.to_string();
        loop {
            let answer = self.ask(&prompt)?;
            match answer.parse::<i64>() {
                Ok(n) => return Ok(n),
                Err(_) => {
                    self.say("COME ON, BE REASONABLE!")?;
                    prompt = "TRY AGAIN:".to_string();
                }
            }
        }
    }

    /// Ask for one decision field until `check` accepts it.
    fn ask_field<F>(&mut self, question: &str, field: DecisionField, check: F) -> Result<u32>
    where
        F: Fn(u32) -> Result<(), DecisionError>,
    {
        let mut prompt = question.to_string();
        loop {
            let raw = self.ask_number(&prompt)?;
            let checked = non_negative(field, raw)
                .and_then(|v| validate_field(field, v).map(|_| v))
                .and_then(|v| check(v).map(|_| v));
            match checked {
                Ok(v) => return Ok(v),
                Err(e @ DecisionError::Unaffordable { .. }) => {
                    self.say(&format!("THINK AGAIN! {}", e.to_string().to_uppercase()))?
                }
                Err(e) => self.say(&format!("COME ON, BE REASONABLE! ({e})"))?,
            }
            prompt = "TRY AGAIN:".to_string();
        }
    }

    fn ask_names(&mut self, preset: Option<usize>) -> Result<Vec<String>> {
        let count = match preset {
            Some(n) => n,
            None => {
                let n = self.ask_number(&format!("HOW MANY PLAYERS (1-{MAX_PLAYERS})?"))?;
                usize::try_from(n).unwrap_or(0)
            }
        };
        let count = count.clamp(1, MAX_PLAYERS);
        let mut names = Vec::with_capacity(count);
        for i in 1..=count {
            let answer = self.ask(&format!("NAME FOR STAND {i} [Player {i}]:"))?;
            if answer.is_empty() {
                names.push(format!("Player {i}"));
            } else {
                names.push(answer);
            }
        }
        Ok(names)
    }
}

impl<I: BufRead, O: Write> Presenter for Console<I, O> {
    type Error = anyhow::Error;

    fn present_day(
        &mut self,
        day: u32,
        max_days: u32,
        weather: &Weather,
        costs: &DayCosts,
    ) -> Result<()> {
        self.say("")?;
        self.say(&format!("=== DAY {day} OF {max_days} ==="))?;
        self.say(&format!("WEATHER: {}", weather.to_string().to_uppercase()))?;
        self.say(&format!(
            "COST OF LEMONADE: ${:.2} PER GLASS, SIGNS ${:.2} EACH",
            costs.per_unit, costs.per_sign
        ))
    }

    fn collect_decision(&mut self, turn: &Turn<'_>) -> Result<DailyDecision> {
        let cash = turn.player.cash;
        let costs = turn.costs;
        self.say("")?;
        self.say(&format!(
            "LEMONADE STAND {} ({}) - ASSETS: ${:.2}",
            turn.player.id.0, turn.player.name, cash
        ))?;

        let units = self.ask_field(
            "HOW MANY GLASSES OF LEMONADE DO YOU WISH TO MAKE?",
            DecisionField::Units,
            |u| validate_affordable(Decimal::from(u) * costs.per_unit, cash),
        )?;
        let left = cash - Decimal::from(units) * costs.per_unit;
        let signs = self.ask_field(
            &format!(
                "HOW MANY ADVERTISING SIGNS ({} CENTS EACH)?",
                (costs.per_sign * Decimal::ONE_HUNDRED).normalize()
            ),
            DecisionField::Signs,
            |s| validate_affordable(Decimal::from(s) * costs.per_sign, left),
        )?;
        let price = self.ask_field(
            "WHAT PRICE (IN CENTS) DO YOU WISH TO CHARGE?",
            DecisionField::Price,
            |_| Ok(()),
        )?;
        Ok(DailyDecision::new(units, signs, price))
    }

    fn present_result(&mut self, player: &Player, result: &DailyResult) -> Result<()> {
        self.say("")?;
        self.say(&format!(
            "=== DAY {} - STAND {} ({}) ===",
            result.day, player.id.0, player.name
        ))?;
        for event in &result.events {
            self.say(&event.message().to_uppercase())?;
        }
        self.say(&format!("{} GLASSES SOLD", result.units_sold))?;
        self.say(&format!("${:.2} PER GLASS", result.decision.price()))?;
        self.say(&format!("INCOME: ${:.2}", result.income))?;
        self.say(&format!("{} GLASSES MADE", result.decision.units_to_make))?;
        self.say(&format!("{} SIGNS MADE", result.decision.signs))?;
        self.say(&format!("EXPENSES: ${:.2}", result.expenses))?;
        self.say(&format!("PROFIT: ${:.2}", result.net_profit))?;
        self.say(&format!("ASSETS: ${:.2}", player.cash))?;
        // Only a played turn can cause bankruptcy; skipped turns just repeat it.
        if player.is_bankrupt && !result.events.contains(&StandEvent::Bankrupt) {
            self.say("...YOU DON'T HAVE ENOUGH MONEY LEFT TO STAY IN BUSINESS. YOU'RE BANKRUPT!")?;
        }
        Ok(())
    }

    fn present_standings(&mut self, standings: &[&Player]) -> Result<()> {
        self.say("")?;
        self.say("STANDINGS SO FAR")?;
        for (place, p) in standings.iter().enumerate() {
            self.say(&format!(
                "{:>2}. {:<20} ${:>8.2}  (PROFIT ${:.2})",
                place + 1,
                p.name,
                p.cash,
                p.total_profit()
            ))?;
        }
        Ok(())
    }

    fn confirm_next_day(&mut self, _next_day: u32) -> Result<bool> {
        let answer = self.ask("CONTINUE TO NEXT DAY? (YES/NO)")?;
        Ok(answer.to_lowercase().starts_with('y'))
    }

    fn present_game_over(&mut self, ranking: &[&Player]) -> Result<()> {
        self.say("")?;
        if ranking.iter().all(|p| p.is_bankrupt) {
            self.say("GAME OVER - ALL PLAYERS ARE BANKRUPT!")?;
        }
        self.say("FINAL STANDINGS")?;
        for (place, p) in ranking.iter().enumerate() {
            self.say(&format!(
                "{:>2}. {:<20} ${:>8.2}{}",
                place + 1,
                p.name,
                p.cash,
                if p.is_bankrupt { "  (BANKRUPT)" } else { "" }
            ))?;
        }
        self.say("GAME OVER. THANKS FOR PLAYING!")
    }
}

fn run<I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    players: Option<usize>,
    seed: u64,
) -> Result<()> {
    console.say("LEMONADE STAND")?;
    let names = console.ask_names(players)?;
    let mut session = GameSession::seeded(StandConfig::default(), seed);
    for name in &names {
        session
            .add_player(name)
            .with_context(|| format!("adding player {name:?}"))?;
    }
    info!(players = names.len(), seed, "new game");
    play(&mut session, console)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let players = parse_args();
    let seed: u64 = rand::random();
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    run(&mut console, players, seed)
}
