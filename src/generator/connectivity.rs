/*
connectivity.rs

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

//! Compute, for every cell, the galaxies that could own it.
//!
//! A galaxy could own a cell if the cell can be reached from the galaxy through cells whose
//! opposite through the galaxy center is on the board, without crossing the center cells of
//! other galaxies.
//! Cells that only one galaxy can reach are trivial to solve, and so the proportion of trivial
//! cells gives an estimate of the difficulty of the layout.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::board::{Board, Pos};

/// Difficulty estimate of a layout.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct DifficultyScore {
    /// Proportion of the cells that only one galaxy can reach.
    pub trivial_cell_ratio: f64,

    /// Proportion of the galaxies that contain only trivial cells.
    pub trivial_galaxy_ratio: f64,
}

/// [`ConnectivityMap`] object.
#[derive(Debug, Clone)]
pub struct ConnectivityMap {
    /// For each cell, the IDs of the galaxies that can reach it.
    connectivity: Vec<BTreeSet<usize>>,

    /// For each galaxy, the cells that it owns in the analyzed layout.
    galaxy_cells: Vec<BTreeSet<usize>>,
}

impl ConnectivityMap {
    /// Create a [`ConnectivityMap`] object for the given layout.
    pub fn new(board: &Board) -> Self {
        let mut connectivity: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); board.num_cells()];

        // For each cell, the galaxy that has its center on it
        let mut center_owner: Vec<Option<usize>> = vec![None; board.num_cells()];
        for galaxy in board.galaxies() {
            for index in &galaxy.center_cells {
                center_owner[*index] = Some(galaxy.id);
            }
        }
        let is_foreign_center =
            |index: usize, id: usize| center_owner[index].is_some_and(|owner| owner != id);

        for galaxy in board.galaxies() {
            let mut done: BTreeSet<usize> = BTreeSet::new();
            let mut to_process: BTreeSet<usize> = galaxy.cells.clone();

            while let Some(index) = to_process.pop_first() {
                let pos: Pos = board.pos_of(index);
                if let Some(opposite) = board.get_opposite_index(pos, &galaxy.center) {
                    to_process.remove(&opposite);
                    done.insert(opposite);
                    connectivity[opposite].insert(galaxy.id);
                }
                done.insert(index);
                connectivity[index].insert(galaxy.id);

                for neighbour in board.get_neighbouring_cells(pos) {
                    if done.contains(&neighbour) || is_foreign_center(neighbour, galaxy.id) {
                        continue;
                    }
                    match board.get_opposite_index(board.pos_of(neighbour), &galaxy.center) {
                        Some(o) if !is_foreign_center(o, galaxy.id) => {
                            to_process.insert(neighbour);
                        }
                        _ => (),
                    }
                }
            }
        }

        let map: ConnectivityMap = Self {
            connectivity,
            galaxy_cells: board.galaxies().iter().map(|g| g.cells.clone()).collect(),
        };
        debug!(
            "Connectivity: {} trivial cells out of {}, {} trivial galaxies out of {}",
            map.trivial_cell_count(),
            map.connectivity.len(),
            map.trivial_galaxy_count(),
            map.galaxy_cells.len()
        );
        map
    }

    /// Return the IDs of the galaxies that can reach the cell.
    pub fn galaxies_at(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.connectivity.get(index)
    }

    /// Whether the galaxy can reach the cell.
    pub fn is_cell_accessible_from_galaxy(&self, index: usize, id: usize) -> bool {
        self.connectivity
            .get(index)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Number of cells that only one galaxy can reach.
    pub fn trivial_cell_count(&self) -> usize {
        self.connectivity.iter().filter(|ids| ids.len() == 1).count()
    }

    /// Number of galaxies for which all the cells are trivial.
    pub fn trivial_galaxy_count(&self) -> usize {
        self.galaxy_cells
            .iter()
            .filter(|cells| {
                cells
                    .iter()
                    .all(|i| self.connectivity.get(*i).is_some_and(|ids| ids.len() == 1))
            })
            .count()
    }

    /// Return the difficulty estimate of the layout.
    pub fn score(&self) -> DifficultyScore {
        let ratio = |count: usize, total: usize| -> f64 {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };
        DifficultyScore {
            trivial_cell_ratio: ratio(self.trivial_cell_count(), self.connectivity.len()),
            trivial_galaxy_ratio: ratio(self.trivial_galaxy_count(), self.galaxy_cells.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn cells_reached_by_galaxies() {
        let board: Board = fixtures::reference_board();
        let map: ConnectivityMap = ConnectivityMap::new(&board);

        // The middle of the board can only be reflected through the central galaxy
        let middle: usize = board.index_of(Pos::new(1, 1)).unwrap();
        assert_eq!(map.galaxies_at(middle), Some(&BTreeSet::from([3])));

        // The center cells of a galaxy are never reachable from another one
        let center: usize = board.index_of(Pos::new(2, 2)).unwrap();
        assert_eq!(map.galaxies_at(center), Some(&BTreeSet::from([3])));

        let corner: usize = board.index_of(Pos::new(0, 0)).unwrap();
        assert!(map.is_cell_accessible_from_galaxy(corner, 1));
        assert!(map.is_cell_accessible_from_galaxy(corner, 3));
        assert!(!map.is_cell_accessible_from_galaxy(corner, 7));
        assert!(!map.is_cell_accessible_from_galaxy(99, 1));
        assert_eq!(map.galaxies_at(99), None);
    }

    #[test]
    fn every_cell_is_reachable_by_its_owner() {
        let board: Board = fixtures::reference_board();
        let map: ConnectivityMap = ConnectivityMap::new(&board);

        for (index, cell) in board.cells().iter().enumerate() {
            let id: usize = cell.id.unwrap();
            assert!(map.is_cell_accessible_from_galaxy(index, id));
        }
    }

    #[test]
    fn scores() {
        let mut board: Board = Board::new(3, 3, false);
        let id: usize = board
            .add_galaxy_at(&crate::board::Center::new(1.5, 1.5).unwrap())
            .unwrap();
        for x in 0..3 {
            assert!(board.set_symmetrically_at(Pos::new(x, 0), id, false));
        }
        assert!(board.set_symmetrically_at(Pos::new(0, 1), id, false));

        let score: DifficultyScore = ConnectivityMap::new(&board).score();
        assert_eq!(score.trivial_cell_ratio, 1.0);
        assert_eq!(score.trivial_galaxy_ratio, 1.0);

        let score: DifficultyScore = ConnectivityMap::new(&fixtures::reference_board()).score();
        assert!(score.trivial_cell_ratio > 0.0 && score.trivial_cell_ratio < 1.0);
        // Only the central galaxy cannot be reached by the others
        assert_eq!(score.trivial_galaxy_ratio, 0.2);
    }
}
