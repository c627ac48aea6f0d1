/*
difficulty.rs

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


//! Generated puzzles have the requested difficulty.

use tentai::board::Board;
use tentai::generator::puzzle_generator::{
    DEFAULT_MAX_ATTEMPTS, Difficulty, GenerationReport, GeneratorConfig, PuzzleGenerator,
};
use tentai::generator::solver::PuzzleSolver;
use tentai::puzzle::Puzzle;

const CORPUS_SIZE: u64 = 50;

/// Generate the corpus and return the number of puzzles that the solver classifies as
/// requested.
fn matching_puzzles(difficulty: Difficulty) -> usize {
    let config: GeneratorConfig = GeneratorConfig {
        difficulty,
        ..GeneratorConfig::default()
    };

    (0..CORPUS_SIZE)
        .filter(|seed| {
            let report: GenerationReport = PuzzleGenerator::with_seed(config, *seed)
                .unwrap()
                .generate_report();
            assert!(report.attempts >= 1 && report.attempts <= DEFAULT_MAX_ATTEMPTS);

            let puzzle: &Puzzle = &report.puzzle;
            let board: &Board = puzzle.board();
            let mut fresh: Puzzle = Puzzle::from_centers(
                board.width(),
                board.height(),
                board.wrapping(),
                puzzle.centers(),
            );
            let solvable: bool = PuzzleSolver::new(&mut fresh).solve();
            assert_eq!(solvable, report.classification.solvable);

            match difficulty {
                Difficulty::Easy => solvable,
                Difficulty::Hard => !solvable,
            }
        })
        .count()
}

#[test]
fn easy_puzzles_are_solvable_by_deduction() {
    let count: usize = matching_puzzles(Difficulty::Easy);
    assert!(count * 100 >= CORPUS_SIZE as usize * 95, "only {count} easy puzzles");
}

#[test]
fn hard_puzzles_need_guessing() {
    let count: usize = matching_puzzles(Difficulty::Hard);
    assert!(count * 100 >= CORPUS_SIZE as usize * 95, "only {count} hard puzzles");
}

#[test]
fn generation_stops_at_the_attempt_budget() {
    let config: GeneratorConfig = GeneratorConfig {
        width: 2,
        height: 2,
        difficulty: Difficulty::Hard,
        max_attempts: 5,
        ..GeneratorConfig::default()
    };
    let report: GenerationReport = PuzzleGenerator::with_seed(config, 1)
        .unwrap()
        .generate_report();
    assert!(report.attempts <= 5);
    assert!(report.puzzle.has_solution());
}
