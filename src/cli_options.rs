/*
cli_options.rs

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

//! Process command-line options.
//!
//! These options are intended for developers tuning the generator.
//! Tentai generates random puzzles, prints them, and can save the last one in JSON format.
//!
//! # Examples
//!
//! Generate a hard 7x7 puzzle and print its solution:
//!
//! ```text
//! $ tentai -f hard --solution
//! Puzzle 1: 7x7 hard (3 attempts)
//! ...A...
//! B......
//! ..C..D.
//! .....D.
//! E..F...
//! .......
//! GG....H
//! Centers: (3.5, 0.5) (0.5, 1.5) (2.5, 2.5) (5.5, 3) (0.5, 4.5) (3.5, 4.5) (1, 6.5) (6.5, 6.5)
//! Solution:
//! ...
//! ```
//!
//! Generate twenty easy 10x10 puzzles on a wrapping board and print some statistics:
//!
//! ```text
//! $ tentai -W 10 -H 10 -w -c 20 --summary
//! ```

use chrono::{DateTime, Local};
use clap::Parser;
use log::debug;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tentai::generator::algorithm::Strategy;
use tentai::generator::puzzle_generator::{
    DEFAULT_MAX_ATTEMPTS, Difficulty, GenerationReport, GeneratorConfig, PuzzleGenerator,
};
use tentai::puzzle::Puzzle;
use tentai::saver::layout::{SavedPuzzle, SaverLayout};

/// Generate random Galaxies puzzles.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// Board width
    #[arg(short = 'W', long, default_value_t = 7)]
    width: usize,

    /// Board height
    #[arg(short = 'H', long, default_value_t = 7)]
    height: usize,

    /// Wrap the board around its edges
    #[arg(short, long, default_value_t = false)]
    wrapping: bool,

    /// Difficulty level for the puzzles
    #[arg(value_enum, short = 'f', long, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// Layout generation strategy
    #[arg(value_enum, long, default_value_t = Strategy::Expansion)]
    strategy: Strategy,

    /// Seed for the random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of puzzles to generate
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Maximum number of layouts to try for each puzzle
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: usize,

    /// Print the solution of the puzzles
    #[arg(long, default_value_t = false)]
    solution: bool,

    /// Print some statistics after generating the puzzles
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Save the last generated puzzle in that file
    #[arg(short = 'o', long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Load a puzzle from that file and print it instead of generating puzzles
    #[arg(short, long, value_name = "FILE", conflicts_with = "save")]
    load: Option<PathBuf>,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Print the puzzle, and its solution if requested.
fn print_puzzle(puzzle: &Puzzle, solution: bool) {
    print!("{puzzle}");
    let centers: Vec<String> = puzzle.centers().iter().map(|c| c.to_string()).collect();
    println!("Centers: {}", centers.join(" "));

    if solution {
        let mut solved: Puzzle = puzzle.clone();
        if solved.solve() {
            println!("Solution:");
            print!("{solved}");
        } else {
            println!("Solution: unknown");
        }
    }
}

/// Print a saved puzzle.
fn load(path: PathBuf, solution: bool) -> u8 {
    let saver: SaverLayout = SaverLayout::new(path);
    let saved: SavedPuzzle = match saver.get_saved_puzzle() {
        Ok(Some(saved)) => saved,
        Ok(None) => {
            eprintln!("No saved puzzle");
            return 1;
        }
        Err(error) => {
            eprintln!("Cannot read the saved puzzle: {error}");
            return 1;
        }
    };

    let dt: DateTime<Local> = DateTime::from(saved.saved_at);
    println!(
        "Puzzle {}x{}{} saved on {}",
        saved.width,
        saved.height,
        if saved.wrapping { " wrapping" } else { "" },
        dt.format("%Y-%m-%d %H:%M:%S")
    );
    match Puzzle::from_saved(saved) {
        Ok(puzzle) => {
            print_puzzle(&puzzle, solution);
            if puzzle.is_solved() {
                println!("The puzzle is solved");
            }
            0
        }
        Err(error) => {
            eprintln!("Invalid saved puzzle: {error}");
            1
        }
    }
}

/// Parse and process command-line options.
///
/// Return the exit code of the program.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        println!("DEBUG");
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    if let Some(path) = args.load {
        return load(path, args.solution);
    }

    let config: GeneratorConfig = GeneratorConfig {
        width: args.width,
        height: args.height,
        wrapping: args.wrapping,
        difficulty: args.difficulty,
        strategy: args.strategy,
        max_attempts: args.attempts,
    };
    let generator = match args.seed {
        Some(seed) => PuzzleGenerator::with_seed(config, seed),
        None => PuzzleGenerator::new(config),
    };
    let mut generator = match generator {
        Ok(g) => g,
        Err(error) => {
            eprintln!("Error: {error}");
            return 2;
        }
    };

    let mut total: Duration = Duration::ZERO;
    let mut max: Duration = Duration::ZERO;
    let mut attempts: usize = 0;
    let mut fallbacks: usize = 0;
    let mut last: Option<Puzzle> = None;
    for i in 0..args.count {
        debug!("Puzzle {i}");

        let report: GenerationReport = generator.generate_report();
        total += report.duration;
        max = max.max(report.duration);
        attempts += report.attempts;
        if !report.matched {
            fallbacks += 1;
        }

        println!(
            "Puzzle {}: {}x{}{} {} ({} attempts{})",
            i + 1,
            config.width,
            config.height,
            if config.wrapping { " wrapping" } else { "" },
            config.difficulty,
            report.attempts,
            if report.matched {
                ""
            } else {
                ", difficulty not reached"
            }
        );
        print_puzzle(&report.puzzle, args.solution);
        last = Some(report.puzzle);
    }

    if let Some(path) = args.save
        && let Some(puzzle) = &last
    {
        let saver: SaverLayout = SaverLayout::new(path);
        if let Err(error) = saver.save_puzzle(puzzle) {
            eprintln!("Cannot save the puzzle: {error}");
            return 1;
        }
    }

    // Print some stats
    if args.summary && args.count > 0 {
        println!(
            "
        total time = {:.3}s
      average time = {:.3}s
          max time = {:.3}s
  average attempts = {}
         fallbacks = {}",
            total.as_secs_f32(),
            total.as_secs_f32() / args.count as f32,
            max.as_secs_f32(),
            attempts / args.count,
            fallbacks
        );
    }
    0
}
