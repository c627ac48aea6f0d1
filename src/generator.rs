/*
generator.rs

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

//! Generate random galaxy layouts and classify their difficulty.
//!
//! A puzzle is produced in several steps:
//!
//! * A random layout is created by an [`algorithm::GenerationAlgorithm`] object.
//!   The algorithm grows galaxies on an empty [`crate::board::Board`] and then merges the
//!   galaxies reduced to a single cell (see [`singletons::merge_singletons`]).
//!
//! * The layout is classified.
//!   A [`crate::puzzle::Puzzle`] object is built from the galaxy centers only, and a
//!   [`solver::PuzzleSolver`] object tries to complete it with simple deduction rules.
//!   If the solver succeeds, then the puzzle is easy. Otherwise, the player needs to guess at
//!   some point and the puzzle is hard.
//!   A [`connectivity::ConnectivityMap`] object provides an additional score that is used to
//!   rank the layouts that do not have the requested difficulty.
//!
//! * The [`puzzle_generator::PuzzleGenerator`] object repeats these steps until a layout with
//!   the requested difficulty is found, or until its attempt budget is exhausted.
//!   In that later case, the best layout found so far is used.

pub mod algorithm;
pub mod connectivity;
pub mod puzzle_generator;
pub mod singletons;
pub mod solver;
