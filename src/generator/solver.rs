/*
solver.rs

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

//! Solve a puzzle by deduction only.
//!
//! The solver repeatedly applies two rules until all the cells are assigned, or until no rule
//! can assign a cell:
//!
//! * A cell is assigned to a galaxy if that galaxy is the only one for which the opposite cell
//!   exists and is empty.
//! * A cell is assigned to a galaxy if that galaxy is the only one that can reach the cell
//!   through empty cells which opposite cells are also empty.
//!
//! The solver never guesses, so a puzzle that it solves is considered easy.

use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::board::{Board, Pos};
use crate::puzzle::Puzzle;

/// [`PuzzleSolver`] object.
pub struct PuzzleSolver<'a> {
    /// Puzzle to solve, modified in place.
    puzzle: &'a mut Puzzle,

    /// Cells that are not assigned yet.
    cells_to_solve: BTreeSet<usize>,

    /// Number of rounds run by the last call to [`PuzzleSolver::solve`].
    rounds: usize,
}

impl<'a> PuzzleSolver<'a> {
    /// Create a [`PuzzleSolver`] object.
    pub fn new(puzzle: &'a mut Puzzle) -> Self {
        let cells_to_solve: BTreeSet<usize> = (0..puzzle.board().num_cells()).collect();
        Self {
            puzzle,
            cells_to_solve,
            rounds: 0,
        }
    }

    /// Number of rounds needed by the last resolution.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Try to solve the puzzle.
    ///
    /// Return `true` if all the cells could be assigned. Otherwise, the puzzle is left
    /// partially solved.
    pub fn solve(&mut self) -> bool {
        self.rounds = 0;
        loop {
            let board: &Board = self.puzzle.board();
            self.cells_to_solve.retain(|i| board.id_at(*i).is_none());
            if self.cells_to_solve.is_empty() {
                debug!("Puzzle solved in {} rounds", self.rounds);
                return true;
            }

            self.rounds += 1;
            if self.mark_trivial_cells() || self.mark_trivial_cells_by_visibility() {
                continue;
            }
            debug!(
                "Solver stuck after {} rounds with {} cells left",
                self.rounds,
                self.cells_to_solve.len()
            );
            return false;
        }
    }

    /// Assign the cells for which only one galaxy has a free opposite cell.
    fn mark_trivial_cells(&mut self) -> bool {
        let mut marked: bool = false;
        let cells: Vec<usize> = self.cells_to_solve.iter().copied().collect();

        for index in cells {
            let board: &Board = self.puzzle.board();
            if board.id_at(index).is_some() {
                continue;
            }
            let pos: Pos = board.pos_of(index);
            let candidates: Vec<usize> = (0..board.galaxies().len())
                .filter(|id| {
                    board
                        .get_opposite_index_from_id(pos, *id)
                        .is_some_and(|o| board.id_at(o).is_none())
                })
                .collect();

            if let [id] = candidates[..]
                && self.update_cell(index, id)
            {
                marked = true;
            }
        }
        marked
    }

    /// Assign the cells that only one galaxy can reach.
    fn mark_trivial_cells_by_visibility(&mut self) -> bool {
        let mut possible: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for id in 0..self.puzzle.board().galaxies().len() {
            for index in self.get_visible_unprocessed_cells(id) {
                possible.entry(index).or_default().push(id);
            }
        }

        let mut marked: bool = false;
        for (index, ids) in possible {
            if let [id] = ids[..]
                && self.update_cell(index, id)
            {
                marked = true;
            }
        }
        marked
    }

    /// Return the empty cells that the galaxy can reach through empty cells which opposite
    /// cells are also empty.
    fn get_visible_unprocessed_cells(&self, id: usize) -> BTreeSet<usize> {
        let board: &Board = self.puzzle.board();
        let mut visible: BTreeSet<usize> = BTreeSet::new();
        let Some(galaxy) = board.galaxy(id) else {
            return visible;
        };

        let mut processed: BTreeSet<usize> = galaxy.cells.clone();
        let mut to_process: Vec<usize> = galaxy.cells.iter().copied().collect();
        while let Some(index) = to_process.pop() {
            for neighbour in board.get_neighbouring_cells(board.pos_of(index)) {
                if processed.contains(&neighbour) || board.id_at(neighbour).is_some() {
                    continue;
                }
                let free_opposite: bool = board
                    .get_opposite_index(board.pos_of(neighbour), &galaxy.center)
                    .is_some_and(|o| board.id_at(o).is_none());
                if !free_opposite {
                    continue;
                }
                processed.insert(neighbour);
                visible.insert(neighbour);
                to_process.push(neighbour);
            }
        }
        visible
    }

    /// Assign the cell and its opposite cell to the galaxy, if they are both still empty.
    fn update_cell(&mut self, index: usize, id: usize) -> bool {
        let board: &Board = self.puzzle.board();
        let pos: Pos = board.pos_of(index);
        let Some(opposite) = board.get_opposite_index_from_id(pos, id) else {
            return false;
        };
        if board.id_at(index).is_some() || board.id_at(opposite).is_some() {
            return false;
        }

        if !self.puzzle.set_symmetrically_at(pos, id) {
            return false;
        }
        self.cells_to_solve.remove(&index);
        self.cells_to_solve.remove(&opposite);
        debug!("Solver: cell {pos} belongs to galaxy {id}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Center;
    use crate::fixtures;

    #[test]
    fn solves_the_reference_layout() {
        let reference: Board = fixtures::reference_board();
        let mut puzzle: Puzzle = Puzzle::new(&reference);

        let mut solver: PuzzleSolver = PuzzleSolver::new(&mut puzzle);
        assert!(solver.solve());
        assert!(solver.rounds() >= 1);

        assert!(puzzle.is_solved());
        assert_eq!(puzzle.board(), &reference);
    }

    #[test]
    fn single_galaxy() {
        let mut puzzle: Puzzle =
            Puzzle::from_centers(3, 3, false, &[Center::new(1.5, 1.5).unwrap()]);
        assert!(PuzzleSolver::new(&mut puzzle).solve());
        assert!(puzzle.is_solved());
    }

    #[test]
    fn already_solved() {
        let mut puzzle: Puzzle = Puzzle::new(&fixtures::reference_board());
        assert!(puzzle.solve());

        let mut solver: PuzzleSolver = PuzzleSolver::new(&mut puzzle);
        assert!(solver.solve());
        assert_eq!(solver.rounds(), 0);
    }

    #[test]
    fn unsolvable_layout() {
        // The two middle cells cannot be reflected through any center
        let centers: Vec<Center> = vec![Center::of_cell(0, 0), Center::of_cell(3, 0)];
        let mut puzzle: Puzzle = Puzzle::from_centers(4, 1, false, &centers);

        assert!(!PuzzleSolver::new(&mut puzzle).solve());
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.board().to_string(), "A..B\n");
    }

    #[test]
    fn visibility_rule() {
        let centers: Vec<Center> = [(2.0, 1.5), (2.5, 2.5), (0.5, 2.0), (3.5, 1.0), (1.5, 0.5)]
            .iter()
            .map(|(x, y)| Center::new(*x, *y).unwrap())
            .collect();
        let mut puzzle: Puzzle = Puzzle::from_centers(4, 3, false, &centers);

        // Every empty cell has a free opposite cell for at least two galaxies
        let mut solver: PuzzleSolver = PuzzleSolver::new(&mut puzzle);
        assert!(!solver.mark_trivial_cells());
        assert!(solver.mark_trivial_cells_by_visibility());
        assert!(solver.solve());
        assert_eq!(puzzle.board().to_string(), "EEED\nCAAD\nCBBB\n");
    }

    #[test]
    fn ambiguous_wrapping_layout() {
        // Cells 1 and 3 can go to either galaxy
        let centers: Vec<Center> = vec![Center::of_cell(0, 0), Center::of_cell(2, 0)];
        let mut puzzle: Puzzle = Puzzle::from_centers(4, 1, true, &centers);

        let mut solver: PuzzleSolver = PuzzleSolver::new(&mut puzzle);
        assert!(!solver.solve());
        assert_eq!(solver.rounds(), 1);
        assert_eq!(puzzle.board().to_string(), "A.B.\n");
    }
}
