/*
lib.rs

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

//! Tentai generates and plays "Galaxies" (Tentai Show) puzzles.
//!
//! The board is a rectangular grid, optionally wrapping around its edges, that is divided into
//! galaxies. Every galaxy is a connected region of cells that is symmetric under a 180°
//! rotation around its center. The player only sees the galaxy centers and must find the
//! regions.
//!
//! * [`board`]: the grid of cells and the galaxies.
//! * [`generator`]: random layouts, the deductive solver, and the difficulty classification.
//! * [`puzzle`]: the puzzle presented to the player.
//! * [`saver`]: persistence of the puzzles in JSON format.
//!
//! # Examples
//!
//! ```
//! use tentai::generator::puzzle_generator::{Difficulty, GeneratorConfig, PuzzleGenerator};
//!
//! let config = GeneratorConfig {
//!     width: 5,
//!     height: 5,
//!     difficulty: Difficulty::Easy,
//!     ..GeneratorConfig::default()
//! };
//! let mut generator = PuzzleGenerator::with_seed(config, 42).unwrap();
//! let mut puzzle = generator.generate();
//!
//! assert!(!puzzle.is_solved());
//! assert!(puzzle.solve());
//! assert!(puzzle.is_solved());
//! ```

pub mod board;
pub mod generator;
pub mod puzzle;
pub mod saver;

#[cfg(test)]
pub(crate) mod fixtures;
