/*
puzzle_generator.rs

Copyright 2025 Hervé Quatremain

This file is part of Tentai.

Tentai is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Tentai is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Tentai. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Generate puzzles of the requested difficulty.
//!
//! Each attempt generates a random layout and classifies it:
//!
//! * The number of galaxies that grew beyond their center cells must stay in a band that
//!   depends on the board area. Below the band, the puzzle is too easy. Above, it is too hard.
//! * The [`PuzzleSolver`] object tries to solve the puzzle. Easy puzzles are the ones it
//!   solves, hard puzzles are the ones it cannot solve.
//!
//! The attempts can run in chunks (see [`PuzzleGenerator::start`],
//! [`PuzzleGenerator::step`], and [`PuzzleGenerator::finish`]) so that a host application
//! can keep its main loop responsive.

use clap::ValueEnum;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use strum_macros::FromRepr;

use super::algorithm::{GenerationAlgorithm, Strategy};
use super::connectivity::{ConnectivityMap, DifficultyScore};
use super::solver::PuzzleSolver;
use crate::board::Board;
use crate::puzzle::Puzzle;

/// Smallest board width or height.
pub const MIN_SIZE: usize = 2;

/// Largest board width or height.
pub const MAX_SIZE: usize = 64;

/// Default number of attempts before giving up on the requested difficulty.
pub const DEFAULT_MAX_ATTEMPTS: usize = 300;

/// Number of attempts run by each step of [`PuzzleGenerator::generate_report`].
const ATTEMPTS_PER_STEP: usize = 10;

/// Puzzle difficulty level.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialOrd,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    FromRepr,
    Default,
)]
#[repr(u8)]
pub enum Difficulty {
    /// Solvable by deduction only.
    #[default]
    Easy = 0,

    /// Requires guessing at some point.
    Hard = 1,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Invalid generator configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The width or the height is smaller than [`MIN_SIZE`].
    BoardTooSmall { width: usize, height: usize },

    /// The width or the height is larger than [`MAX_SIZE`].
    BoardTooLarge { width: usize, height: usize },

    /// The attempt budget is zero.
    NoAttempts,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeneratorError::BoardTooSmall { width, height } => write!(
                f,
                "board {width}x{height} is too small: the minimum size is {MIN_SIZE}x{MIN_SIZE}"
            ),
            GeneratorError::BoardTooLarge { width, height } => write!(
                f,
                "board {width}x{height} is too large: the maximum size is {MAX_SIZE}x{MAX_SIZE}"
            ),
            GeneratorError::NoAttempts => write!(f, "the number of attempts must be at least 1"),
        }
    }
}

impl Error for GeneratorError {}

/// Generator configuration.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub wrapping: bool,
    pub difficulty: Difficulty,
    pub strategy: Strategy,

    /// Maximum number of layouts to try before returning the best one found.
    pub max_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 7,
            wrapping: false,
            difficulty: Difficulty::Easy,
            strategy: Strategy::Expansion,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GeneratorConfig {
    /// Verify that puzzles can be generated with the configuration.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.width < MIN_SIZE || self.height < MIN_SIZE {
            return Err(GeneratorError::BoardTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_SIZE || self.height > MAX_SIZE {
            return Err(GeneratorError::BoardTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_attempts == 0 {
            return Err(GeneratorError::NoAttempts);
        }
        Ok(())
    }

    /// Return the minimum and maximum number of expanded galaxies for the board area.
    pub fn expansion_band(&self) -> (usize, usize) {
        let area: usize = self.width * self.height;
        (1 + area / 49, area / 3)
    }
}

/// How a layout compares to the requested difficulty.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    TooEasy,
    Correct,
    TooHard,
}

/// Classification of a generated layout.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Classification {
    /// Number of galaxies that grew beyond their center cells.
    pub expanded_galaxies: usize,

    /// Whether the solver could solve the puzzle by deduction.
    pub solvable: bool,

    /// Connectivity score, used to rank the layouts that do not match.
    pub score: DifficultyScore,

    pub outcome: Outcome,
}

/// Progress of a generation run in chunks.
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    /// Number of layouts tried so far.
    attempts: usize,

    /// Best layout so far, with its classification.
    best: Option<(Board, Classification)>,

    /// Whether the best layout has the requested difficulty.
    matched: bool,

    /// Time spent generating and classifying layouts.
    duration: Duration,
}

impl GenerationState {
    /// Number of layouts tried so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Whether a layout with the requested difficulty has been found.
    pub fn matched(&self) -> bool {
        self.matched
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Generated puzzle, with its reference solution.
    pub puzzle: Puzzle,

    /// Number of layouts tried.
    pub attempts: usize,

    /// Whether the puzzle has the requested difficulty. When `false`, the attempt budget was
    /// exhausted and the puzzle is the best layout found.
    pub matched: bool,

    /// Classification of the returned layout.
    pub classification: Classification,

    /// Time spent generating and classifying layouts.
    pub duration: Duration,
}

/// [`PuzzleGenerator`] object.
pub struct PuzzleGenerator<R: Rng = StdRng> {
    config: GeneratorConfig,
    rng: R,
}

impl PuzzleGenerator<StdRng> {
    /// Create a [`PuzzleGenerator`] object that uses a random number generator seeded by the
    /// operating system.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a [`PuzzleGenerator`] object that always generates the same puzzles for the
    /// same seed.
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Result<Self, GeneratorError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PuzzleGenerator<R> {
    /// Create a [`PuzzleGenerator`] object with the given random number generator.
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a puzzle.
    ///
    /// If no layout with the requested difficulty is found, the best layout is used.
    pub fn generate(&mut self) -> Puzzle {
        self.generate_report().puzzle
    }

    /// Generate a puzzle and return the details of the run.
    pub fn generate_report(&mut self) -> GenerationReport {
        let mut state: GenerationState = self.start();
        while !self.step(&mut state, ATTEMPTS_PER_STEP) {}
        self.finish(state)
    }

    /// Start a generation run.
    pub fn start(&self) -> GenerationState {
        GenerationState::default()
    }

    /// Run at most `attempts` attempts.
    ///
    /// Return `true` when the run is complete, either because a layout with the requested
    /// difficulty has been found, or because the attempt budget is exhausted.
    pub fn step(&mut self, state: &mut GenerationState, attempts: usize) -> bool {
        let start: Instant = Instant::now();
        for _ in 0..attempts {
            if self.is_done(state) {
                break;
            }
            self.attempt(state);
        }
        state.duration += start.elapsed();
        self.is_done(state)
    }

    fn is_done(&self, state: &GenerationState) -> bool {
        state.matched || state.attempts >= self.config.max_attempts
    }

    /// Complete the run and build the puzzle from the best layout.
    pub fn finish(&mut self, mut state: GenerationState) -> GenerationReport {
        let (layout, classification): (Board, Classification) = match state.best.take() {
            Some(best) => best,
            None => {
                // No attempt has run yet
                let start: Instant = Instant::now();
                let layout: Board = self.generate_layout();
                let classification: Classification = self.classify(&layout);
                state.attempts += 1;
                state.duration += start.elapsed();
                state.matched = classification.outcome == Outcome::Correct;
                (layout, classification)
            }
        };

        if state.matched {
            debug!(
                "{} puzzle found after {} attempts ({:.3}s)",
                self.config.difficulty,
                state.attempts,
                state.duration.as_secs_f32()
            );
        } else {
            warn!(
                "No {} puzzle found after {} attempts, using a {:?} layout",
                self.config.difficulty, state.attempts, classification.outcome
            );
        }

        GenerationReport {
            puzzle: Puzzle::with_rng(&layout, &mut self.rng),
            attempts: state.attempts,
            matched: state.matched,
            classification,
            duration: state.duration,
        }
    }

    /// Generate and classify a layout, and keep it if it is the best so far.
    fn attempt(&mut self, state: &mut GenerationState) {
        let layout: Board = self.generate_layout();
        let classification: Classification = self.classify(&layout);
        state.attempts += 1;
        debug!(
            "Attempt {}: {:?} (expanded galaxies = {}, solvable = {}, trivial cells = {:.2})",
            state.attempts,
            classification.outcome,
            classification.expanded_galaxies,
            classification.solvable,
            classification.score.trivial_cell_ratio
        );

        let better: bool = match &state.best {
            None => true,
            Some((_, best)) => self.is_better(&classification, best),
        };
        if better {
            state.matched = classification.outcome == Outcome::Correct;
            state.best = Some((layout, classification));
        }
    }

    fn generate_layout(&mut self) -> Board {
        GenerationAlgorithm::new(
            self.config.width,
            self.config.height,
            self.config.wrapping,
            self.config.strategy,
            &mut self.rng,
        )
        .generate()
    }

    /// Classify the layout against the requested difficulty.
    pub fn classify(&self, layout: &Board) -> Classification {
        let expanded_galaxies: usize = layout.galaxies().iter().filter(|g| g.is_expanded()).count();

        // The solver starts from the centers only
        let mut puzzle: Puzzle = Puzzle::new(layout);
        let solvable: bool = PuzzleSolver::new(&mut puzzle).solve();
        let score: DifficultyScore = ConnectivityMap::new(layout).score();

        let (minimum, maximum): (usize, usize) = self.config.expansion_band();
        let outcome: Outcome = if expanded_galaxies < minimum {
            Outcome::TooEasy
        } else if expanded_galaxies > maximum {
            Outcome::TooHard
        } else {
            match (solvable, self.config.difficulty) {
                (true, Difficulty::Easy) | (false, Difficulty::Hard) => Outcome::Correct,
                (true, Difficulty::Hard) => Outcome::TooEasy,
                (false, Difficulty::Easy) => Outcome::TooHard,
            }
        };

        Classification {
            expanded_galaxies,
            solvable,
            score,
            outcome,
        }
    }

    /// Whether the candidate layout is better than the current best one.
    ///
    /// A layout with the requested difficulty always wins. Otherwise, too easy layouts are
    /// preferred to too hard ones, and the connectivity score breaks the ties.
    fn is_better(&self, candidate: &Classification, best: &Classification) -> bool {
        let rank = |outcome: Outcome| -> u8 {
            match outcome {
                Outcome::Correct => 2,
                Outcome::TooEasy => 1,
                Outcome::TooHard => 0,
            }
        };
        if rank(candidate.outcome) != rank(best.outcome) {
            return rank(candidate.outcome) > rank(best.outcome);
        }
        match self.config.difficulty {
            Difficulty::Easy => {
                candidate.score.trivial_cell_ratio > best.score.trivial_cell_ratio
            }
            Difficulty::Hard => {
                candidate.score.trivial_cell_ratio < best.score.trivial_cell_ratio
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(difficulty: Difficulty) -> GeneratorConfig {
        GeneratorConfig {
            difficulty,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn configuration_errors() {
        let small: GeneratorConfig = GeneratorConfig {
            width: 1,
            ..GeneratorConfig::default()
        };
        assert_eq!(
            small.validate(),
            Err(GeneratorError::BoardTooSmall {
                width: 1,
                height: 7
            })
        );
        assert!(PuzzleGenerator::new(small).is_err());

        let large: GeneratorConfig = GeneratorConfig {
            height: MAX_SIZE + 1,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            large.validate(),
            Err(GeneratorError::BoardTooLarge { .. })
        ));

        let no_attempts: GeneratorConfig = GeneratorConfig {
            max_attempts: 0,
            ..GeneratorConfig::default()
        };
        assert_eq!(no_attempts.validate(), Err(GeneratorError::NoAttempts));
        assert_eq!(
            GeneratorError::NoAttempts.to_string(),
            "the number of attempts must be at least 1"
        );

        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn difficulty_values() {
        assert_eq!(Difficulty::from_repr(0), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_repr(1), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_repr(2), None);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn configuration_from_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"width": 9, "difficulty": "Hard"}"#).unwrap();
        assert_eq!(config.width, 9);
        assert_eq!(config.height, 7);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn expansion_band() {
        assert_eq!(GeneratorConfig::default().expansion_band(), (2, 16));
        let config: GeneratorConfig = GeneratorConfig {
            width: 10,
            height: 5,
            ..GeneratorConfig::default()
        };
        assert_eq!(config.expansion_band(), (2, 16));
    }

    #[test]
    fn classification_follows_the_solver() {
        for difficulty in [Difficulty::Easy, Difficulty::Hard] {
            let mut generator = PuzzleGenerator::with_seed(config(difficulty), 11).unwrap();
            let report: GenerationReport = generator.generate_report();

            assert!(report.matched);
            assert_eq!(report.classification.outcome, Outcome::Correct);
            assert_eq!(
                report.classification.solvable,
                difficulty == Difficulty::Easy
            );
            assert!(report.attempts >= 1 && report.attempts <= DEFAULT_MAX_ATTEMPTS);
        }
    }

    #[test]
    fn chunked_generation() {
        let mut generator = PuzzleGenerator::with_seed(config(Difficulty::Hard), 5).unwrap();
        let mut state: GenerationState = generator.start();
        let mut steps: usize = 0;
        while !generator.step(&mut state, 1) {
            steps += 1;
        }
        assert_eq!(state.attempts(), steps + 1);
        assert!(state.matched());

        let report: GenerationReport = generator.finish(state);
        assert_eq!(report.attempts, steps + 1);
        assert!(report.puzzle.has_solution());
    }

    #[test]
    fn exhausted_budget() {
        let single: GeneratorConfig = GeneratorConfig {
            max_attempts: 1,
            ..config(Difficulty::Hard)
        };
        let mut generator = PuzzleGenerator::with_seed(single, 1).unwrap();
        let report: GenerationReport = generator.generate_report();
        assert_eq!(report.attempts, 1);
        assert_eq!(
            report.matched,
            report.classification.outcome == Outcome::Correct
        );

        // Finishing without any step still produces a puzzle
        let state: GenerationState = generator.start();
        let report: GenerationReport = generator.finish(state);
        assert_eq!(report.attempts, 1);
    }

    #[test]
    fn fallback_ranking() {
        let generator = PuzzleGenerator::with_seed(config(Difficulty::Easy), 0).unwrap();
        let classification = |outcome: Outcome, ratio: f64| Classification {
            expanded_galaxies: 4,
            solvable: false,
            score: DifficultyScore {
                trivial_cell_ratio: ratio,
                trivial_galaxy_ratio: 0.0,
            },
            outcome,
        };

        let easy = classification(Outcome::TooEasy, 0.1);
        let hard = classification(Outcome::TooHard, 0.9);
        let correct = classification(Outcome::Correct, 0.0);
        assert!(generator.is_better(&easy, &hard));
        assert!(!generator.is_better(&hard, &easy));
        assert!(generator.is_better(&correct, &easy));
        assert!(generator.is_better(&classification(Outcome::TooHard, 0.95), &hard));
        assert!(!generator.is_better(&classification(Outcome::TooHard, 0.5), &hard));
    }
}
