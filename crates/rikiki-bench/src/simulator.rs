use rikiki_bot::BotStrategy;
use rikiki_core::game::{AdvanceError, GameState, SetStartError, SetupError, points};
use rikiki_core::model::player::{FairnessMarker, PlayerId, PlayerRef};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub players: usize,
    pub games: u32,
    pub seed: u64,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !points::supports(self.players) {
            return Err(ConfigError::PlayerCount(self.players));
        }
        if self.games == 0 {
            return Err(ConfigError::NoGames);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("player count {0} is outside the supported 2..=7 range")]
    PlayerCount(usize),
    #[error("at least one game is required")]
    NoGames,
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to seat the table: {0}")]
    Setup(#[from] SetupError),
    #[error("bot produced an illegal move: {0}")]
    Bot(#[from] AdvanceError),
    #[error("set progression broke: {0}")]
    Set(#[from] SetStartError),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeatReport {
    pub seat: u32,
    pub sets_played: u32,
    pub bids_hit: u32,
    pub closer_games: u32,
    pub points: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub players: usize,
    pub games: u32,
    pub sets: u32,
    pub seed: u64,
    pub seats: Vec<SeatReport>,
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} games, {} sets, {} players (seed {})",
            self.games, self.sets, self.players, self.seed
        )?;
        writeln!(f, "seat  sets  hit   hit%   closer  points")?;
        for seat in &self.seats {
            let rate = if seat.sets_played == 0 {
                0.0
            } else {
                100.0 * seat.bids_hit as f64 / seat.sets_played as f64
            };
            writeln!(
                f,
                "P{:<4} {:<5} {:<5} {:<6.1} {:<7} {:+.1}",
                seat.seat, seat.sets_played, seat.bids_hit, rate, seat.closer_games, seat.points
            )?;
        }
        Ok(())
    }
}

/// Seats `players` bots and plays `games` complete games, recording how
/// often each seat hits its bid and where the fairness rotation puts the
/// disadvantaged closer seat.
pub fn run(config: &SimConfig) -> Result<SimReport, SimError> {
    config.validate()?;

    let references: Vec<PlayerRef> = (0..config.players)
        .map(|index| PlayerRef::new(PlayerId(index as u32), true))
        .collect();
    let mut state = GameState::new(references, config.seed)?;
    let mut strategy = BotStrategy::with_seed(config.seed.rotate_left(17) ^ 0x9E37_79B9_7F4A_7C15);

    let mut seats: Vec<SeatReport> = (0..config.players)
        .map(|index| SeatReport {
            seat: index as u32,
            sets_played: 0,
            bids_hit: 0,
            closer_games: 0,
            points: 0.0,
        })
        .collect();
    let mut sets = 0u32;

    for game in 0..config.games {
        if game > 0 {
            state.start_game();
        }
        for player in state.players() {
            if player.marker() == FairnessMarker::Pending {
                seats[player.id().0 as usize].closer_games += 1;
            }
        }

        loop {
            state.advance_bots(&mut strategy)?;
            sets += 1;
            for player in state.players() {
                let report = &mut seats[player.id().0 as usize];
                report.sets_played += 1;
                if player.hit_bid() {
                    report.bids_hit += 1;
                }
            }
            if state.is_game_over() {
                break;
            }
            state.start_set()?;
        }

        info!(
            game = game + 1,
            sets,
            leader = %state
                .players()
                .max_by(|a, b| a.points().total_cmp(&b.points()))
                .map(|p| p.id())
                .expect("table is never empty"),
            "game finished"
        );
    }

    for player in state.players() {
        seats[player.id().0 as usize].points = player.points();
    }

    Ok(SimReport {
        players: config.players,
        games: config.games,
        sets,
        seed: config.seed,
        seats,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SimConfig, run};

    #[test]
    fn rejects_bad_configurations() {
        let config = SimConfig {
            players: 1,
            games: 5,
            seed: 0,
        };
        assert_eq!(config.validate(), Err(ConfigError::PlayerCount(1)));

        let config = SimConfig {
            players: 4,
            games: 0,
            seed: 0,
        };
        assert_eq!(config.validate(), Err(ConfigError::NoGames));
    }

    #[test]
    fn short_simulation_produces_a_consistent_report() {
        let config = SimConfig {
            players: 3,
            games: 3,
            seed: 7,
        };
        let report = run(&config).unwrap();

        assert_eq!(report.seats.len(), 3);
        assert_eq!(report.games, 3);
        // Ten sets per game with the short pack and three players.
        assert_eq!(report.sets, 30);
        for seat in &report.seats {
            assert_eq!(seat.sets_played, 30);
            assert!(seat.bids_hit <= seat.sets_played);
        }
        let closers: u32 = report.seats.iter().map(|s| s.closer_games).sum();
        assert_eq!(closers, 3, "every game nominates exactly one closer");
        let total: f32 = report.seats.iter().map(|s| s.points).sum();
        assert!(total.abs() < 1e-2, "self-play must stay zero-sum: {total}");
    }

    #[test]
    fn identical_seeds_reproduce_the_report() {
        let config = SimConfig {
            players: 4,
            games: 2,
            seed: 99,
        };
        let a = run(&config).unwrap();
        let b = run(&config).unwrap();
        let points_a: Vec<f32> = a.seats.iter().map(|s| s.points).collect();
        let points_b: Vec<f32> = b.seats.iter().map(|s| s.points).collect();
        assert_eq!(points_a, points_b);
    }
}
