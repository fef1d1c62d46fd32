// =============================================================================
// Random playouts
//
// Plays uniformly random legal moves from the starting layout and checks the
// engine's invariants after every step. Between moves it also fires a random
// (usually illegal) move attempt and confirms a rejection changes nothing.
// Used by the selfplay binary and by the tests below.
// =============================================================================

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::game::{Game, GameStatus};
use crate::moves::Move;
use crate::piece::Side;
use crate::square::{Square, COLS, ROWS};

#[derive(Clone, Debug)]
pub struct PlayoutConfig {
    /// Number of games to play.
    pub games: usize,
    /// Plies per game before giving up on a result.
    pub max_plies: u32,
    /// Fixed seed for reproducible runs; entropy when unset.
    pub seed: Option<u64>,
    /// Chance of choosing a pass when other legal moves exist.
    pub pass_probability: f64,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayoutConfig {
    pub fn new() -> Self {
        PlayoutConfig {
            games: 10,
            max_plies: 200,
            seed: None,
            pass_probability: 0.05,
        }
    }

    /// `pass_probability` forced into `0.0..=1.0`; NaN counts as never.
    fn pass_chance(&self) -> f64 {
        if self.pass_probability.is_nan() {
            0.0
        } else {
            self.pass_probability.clamp(0.0, 1.0)
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PlayoutReport {
    pub games: usize,
    pub plies: u64,
    pub passes: u64,
    pub captures: u64,
    pub checks: u64,
    pub rejected_probes: u64,
    pub blue_wins: usize,
    pub red_wins: usize,
    pub unfinished: usize,
    pub violations: Vec<String>,
}

pub fn run(config: &PlayoutConfig) -> PlayoutReport {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut report = PlayoutReport::default();
    for index in 0..config.games {
        let status = play_one(&mut rng, config, &mut report);
        debug!(game = index, ?status, "playout finished");
        match status.winner() {
            Some(Side::Blue) => report.blue_wins += 1,
            Some(Side::Red) => report.red_wins += 1,
            None => report.unfinished += 1,
        }
        report.games += 1;
    }
    report
}

fn play_one(rng: &mut StdRng, config: &PlayoutConfig, report: &mut PlayoutReport) -> GameStatus {
    let mut game = Game::new();
    for ply in 0..config.max_plies {
        if game.status().is_over() {
            break;
        }

        probe_rejection(rng, &game, report);

        let Some(mv) = choose_move(rng, game.legal_moves(), config.pass_chance()) else {
            record(report, format!("ply {ply}: no legal move while game in progress"));
            break;
        };

        let mover = game.turn();
        let capture = game.square(mv.to).is_some() && !mv.is_pass();
        if let Err(err) = game.try_move(mv.from, mv.to) {
            record(report, format!("ply {ply}: legal move {mv} rejected: {err}"));
            break;
        }

        report.plies += 1;
        if mv.is_pass() {
            report.passes += 1;
        }
        if capture {
            report.captures += 1;
        }
        if game.is_in_check(mover.opposite()) {
            report.checks += 1;
        }
        check_invariants(&game, mover, ply, report);
    }
    game.status()
}

/// Pick a random legal move, a pass with probability `pass_chance`. A side in
/// check has no pass, so it always gets one of the other moves.
fn choose_move(rng: &mut StdRng, legal: Vec<Move>, pass_chance: f64) -> Option<Move> {
    let (passes, moves): (Vec<Move>, Vec<Move>) = legal.into_iter().partition(|m| m.is_pass());
    let pass = !passes.is_empty() && (moves.is_empty() || rng.gen_bool(pass_chance));
    let pool = if pass { &passes } else { &moves };
    pool.choose(rng).copied()
}

/// Try a random move and make sure a rejection leaves the game as it was.
fn probe_rejection(rng: &mut StdRng, game: &Game, report: &mut PlayoutReport) {
    let from = random_square(rng);
    let to = random_square(rng);
    let mut probe = game.clone();
    match probe.try_move(from, to) {
        Ok(()) => {}
        Err(err) => {
            report.rejected_probes += 1;
            if probe != *game {
                record(report, format!("rejected {from}-{to} ({err}) changed the game"));
            }
        }
    }
}

fn check_invariants(game: &Game, mover: Side, ply: u32, report: &mut PlayoutReport) {
    if game.is_in_check(mover) {
        record(report, format!("ply {ply}: {mover} left in check by own move"));
    }
    for side in [Side::Blue, Side::Red] {
        let cached = game.general_square(side);
        let actual = game.board().find_general(side);
        if cached != actual {
            record(
                report,
                format!("ply {ply}: {side} general cached at {cached:?}, found at {actual:?}"),
            );
        }
    }
    if game.turn() != mover.opposite() {
        record(report, format!("ply {ply}: turn did not pass from {mover}"));
    }
}

fn random_square(rng: &mut StdRng) -> Square {
    let col = rng.gen_range(0..COLS as u8);
    let row = rng.gen_range(1..=ROWS as u8);
    Square::new(col, row).unwrap_or_else(|| Square::at(0, 1))
}

fn record(report: &mut PlayoutReport, violation: String) {
    warn!(%violation, "playout invariant violated");
    report.violations.push(violation);
}
