/*
puzzle.rs

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

//! Puzzle presented to the player.
//!
//! The [`Puzzle`] object starts with only the galaxy centers set. The player then assigns cells
//! to galaxies, always two at a time (a cell and its opposite through the galaxy center).
//! After each change, the object recomputes which cells are connected to their galaxy center
//! and how each cell connects to its neighbours, for drawing.

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::board::{Board, Center, EMPTY, INVALID_POS, Pos};

/// Number of colors available for the galaxies.
pub const PALETTE_SIZE: usize = 6;

/// How a cell connects to its neighbours of the same galaxy.
///
/// Each field uses the same encoding:
///
/// * `0`: no connection.
/// * `-1`: connected on the negative side only (left, or bottom).
/// * `1`: connected on the positive side only (right, or top).
/// * `2`: connected on both sides.
///
/// The top of a cell is the neighbour with the higher Y coordinate.
/// The diagonals are connected only if the two cells that share the corner are also
/// connected.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ConnectionData {
    pub horizontal: i8,
    pub vertical: i8,

    /// Diagonal from the bottom left to the top right.
    pub diagonal_up: i8,

    /// Diagonal from the top left to the bottom right.
    pub diagonal_down: i8,
}

impl ConnectionData {
    /// Combine the connection states of the two sides of an axis.
    fn encode(negative: bool, positive: bool) -> i8 {
        match (negative, positive) {
            (true, true) => 2,
            (true, false) => -1,
            (false, true) => 1,
            (false, false) => 0,
        }
    }
}

/// [`Puzzle`] object.
#[derive(Debug, Clone)]
pub struct Puzzle {
    /// Current state of the game.
    board: Board,

    /// Centers of the galaxies, indexed by the galaxy ID.
    centers: Vec<Center>,

    /// Galaxy ID of each cell in the reference solution, when known.
    solution: Option<Vec<Option<usize>>>,

    /// Color index of each galaxy.
    color_ids: Vec<usize>,

    /// Cells that the player cannot change.
    locks: Vec<bool>,

    /// Cells that cannot be reached from the center of their galaxy (empty cells included).
    disconnected_cells: BTreeSet<usize>,

    /// Number of assigned cells that are connected to the center of their galaxy.
    connected_cell_count: usize,

    /// Drawing information for each cell.
    connection_data: Vec<ConnectionData>,
}

impl Puzzle {
    /// Create a [`Puzzle`] object from a solved layout.
    ///
    /// The layout is kept as the reference solution. The galaxy colors are assigned in order.
    pub fn new(layout: &Board) -> Self {
        let centers: Vec<Center> = layout.galaxies().iter().map(|g| g.center).collect();
        let solution: Vec<Option<usize>> = layout.cells().iter().map(|c| c.id).collect();
        let color_ids: Vec<usize> = (0..centers.len()).map(|i| i % PALETTE_SIZE).collect();

        Self::build(
            layout.width(),
            layout.height(),
            layout.wrapping(),
            centers,
            Some(solution),
            color_ids,
        )
    }

    /// Create a [`Puzzle`] object from a solved layout, with shuffled galaxy colors.
    pub fn with_rng<R: Rng + ?Sized>(layout: &Board, rng: &mut R) -> Self {
        let mut puzzle: Puzzle = Self::new(layout);

        let mut palette: Vec<usize> = (0..PALETTE_SIZE).collect();
        palette.shuffle(rng);
        for (id, color) in puzzle.color_ids.iter_mut().enumerate() {
            *color = palette[id % PALETTE_SIZE];
        }
        puzzle
    }

    /// Create a [`Puzzle`] object from the galaxy centers only, without reference solution.
    ///
    /// Centers that overlap a previous center are ignored.
    pub fn from_centers(width: usize, height: usize, wrapping: bool, centers: &[Center]) -> Self {
        let color_ids: Vec<usize> = (0..centers.len()).map(|i| i % PALETTE_SIZE).collect();
        Self::build(width, height, wrapping, centers.to_vec(), None, color_ids)
    }

    fn build(
        width: usize,
        height: usize,
        wrapping: bool,
        centers: Vec<Center>,
        solution: Option<Vec<Option<usize>>>,
        color_ids: Vec<usize>,
    ) -> Self {
        let mut puzzle: Puzzle = Self {
            board: Board::new(width, height, wrapping),
            centers,
            solution,
            color_ids,
            locks: Vec::new(),
            disconnected_cells: BTreeSet::new(),
            connected_cell_count: 0,
            connection_data: Vec::new(),
        };
        puzzle.reset();

        // Keep the centers aligned with the galaxy IDs
        if puzzle.board.galaxies().len() != puzzle.centers.len() {
            puzzle.centers = puzzle.board.galaxies().iter().map(|g| g.center).collect();
            puzzle.color_ids.truncate(puzzle.centers.len());
            puzzle.solution = None;
        }
        puzzle
    }

    /// Restart the game: only the galaxy centers are set and nothing is locked.
    pub fn reset(&mut self) {
        self.board.clear();
        for center in &self.centers {
            if self.board.add_galaxy_at(center).is_none() {
                warn!("Galaxy center {center} overlaps another center or the board edge");
            }
        }
        self.locks = vec![false; self.board.num_cells()];
        self.update_connections();
    }

    /// Replace the current state with the reference solution.
    ///
    /// Return `false` if the puzzle has no reference solution.
    pub fn solve(&mut self) -> bool {
        let Some(solution) = &self.solution else {
            return false;
        };
        for (index, id) in solution.iter().enumerate() {
            if let Some(id) = id {
                self.board.set_at(index, *id);
            }
        }
        self.update_connections();
        true
    }

    /// Whether all the cells are assigned and connected to the center of their galaxy.
    pub fn is_solved(&self) -> bool {
        self.disconnected_cells.is_empty() && self.board.cells().iter().all(|c| c.id.is_some())
    }

    /// Whether the cell is locked.
    pub fn is_locked_at(&self, pos: Pos) -> bool {
        self.board
            .index_of(pos)
            .is_some_and(|index| self.locks[index])
    }

    /// Lock or unlock the cell and its opposite cell.
    ///
    /// Empty cells and cells at a galaxy center cannot be locked.
    pub fn toggle_locked_at(&mut self, pos: Pos) -> bool {
        let Some(index) = self.board.index_of(pos) else {
            return false;
        };
        let Some(id) = self.board.id_at(index) else {
            return false;
        };
        if self.board.is_galaxy_center(index) {
            return false;
        }
        let Some(opposite) = self.board.get_opposite_index_from_id(pos, id) else {
            return false;
        };

        let locked: bool = !self.locks[index];
        self.locks[index] = locked;
        self.locks[opposite] = locked;
        true
    }

    /// Assign the cell and its opposite cell to the galaxy.
    ///
    /// Cells owned by another galaxy are taken from it, along with their own opposite cells.
    /// Return `false` if nothing changed.
    pub fn set_symmetrically_at(&mut self, pos: Pos, id: usize) -> bool {
        let Some(index) = self.board.index_of(pos) else {
            return false;
        };
        if self.board.id_at(index) == Some(id) {
            return false;
        }
        let Some(opposite) = self.board.get_opposite_index_from_id(pos, id) else {
            return false;
        };
        if self.locks[index] || self.locks[opposite] {
            return false;
        }

        if !self.board.set_symmetrically_at(pos, id, true) {
            return false;
        }
        self.update_connections();
        true
    }

    /// Empty the cell and its opposite cell.
    pub fn unset_symmetrically_at(&mut self, pos: Pos) -> bool {
        if !self.can_unset_at(pos) || self.is_locked_at(pos) {
            return false;
        }
        if !self.board.unset_symmetrically_at(pos) {
            return false;
        }
        self.update_connections();
        true
    }

    /// Whether the cell is assigned and is not at its galaxy center.
    pub fn can_unset_at(&self, pos: Pos) -> bool {
        match self.board.index_of(pos) {
            Some(index) => {
                self.board.id_at(index).is_some() && !self.board.is_galaxy_center(index)
            }
            None => false,
        }
    }

    /// Return the galaxy ID of the cell, [`EMPTY`] for an empty cell, or [`INVALID_POS`] for a
    /// position outside the board.
    pub fn get_id_at(&self, pos: Pos) -> i32 {
        match self.board.get_cell_at(pos) {
            Some(cell) => cell.id.map_or(EMPTY, |id| id as i32),
            None => INVALID_POS,
        }
    }

    /// Return the drawing information of the cell.
    pub fn get_shader_connection_data(&self, pos: Pos) -> Option<ConnectionData> {
        self.board
            .index_of(pos)
            .and_then(|index| self.connection_data.get(index).copied())
    }

    /// Whether the cell can be reached from the center of its galaxy.
    pub fn is_cell_connected_to_center(&self, pos: Pos) -> bool {
        self.board
            .index_of(pos)
            .is_some_and(|index| !self.disconnected_cells.contains(&index))
    }

    /// Whether the cell at the given position belongs to the galaxy `id`.
    fn is_connected_at(&self, id: Option<usize>, pos: Pos) -> bool {
        self.board.get_cell_at(pos).is_some_and(|c| c.id == id)
    }

    /// Recompute the connected cells and the drawing information.
    fn update_connections(&mut self) {
        let num_cells: usize = self.board.num_cells();

        let mut connected: Vec<bool> = vec![false; num_cells];
        let mut to_visit: Vec<usize> = self
            .board
            .galaxies()
            .iter()
            .flat_map(|g| g.center_cells.iter().copied())
            .collect();
        while let Some(index) = to_visit.pop() {
            if connected[index] {
                continue;
            }
            connected[index] = true;
            let id: Option<usize> = self.board.id_at(index);
            for neighbour in self.board.get_neighbouring_cells(self.board.pos_of(index)) {
                if !connected[neighbour] && self.board.id_at(neighbour) == id {
                    to_visit.push(neighbour);
                }
            }
        }

        self.disconnected_cells.clear();
        self.connected_cell_count = 0;
        self.connection_data = Vec::with_capacity(num_cells);
        for (index, is_connected) in connected.into_iter().enumerate() {
            if is_connected {
                self.connected_cell_count += 1;
            } else {
                self.disconnected_cells.insert(index);
            }

            let Pos { x, y } = self.board.pos_of(index);
            let id: Option<usize> = self.board.id_at(index);
            let left: bool = self.is_connected_at(id, Pos::new(x - 1, y));
            let right: bool = self.is_connected_at(id, Pos::new(x + 1, y));
            let down: bool = self.is_connected_at(id, Pos::new(x, y - 1));
            let up: bool = self.is_connected_at(id, Pos::new(x, y + 1));
            let up_left: bool = left && up && self.is_connected_at(id, Pos::new(x - 1, y + 1));
            let up_right: bool = right && up && self.is_connected_at(id, Pos::new(x + 1, y + 1));
            let down_left: bool =
                left && down && self.is_connected_at(id, Pos::new(x - 1, y - 1));
            let down_right: bool =
                right && down && self.is_connected_at(id, Pos::new(x + 1, y - 1));

            self.connection_data.push(ConnectionData {
                horizontal: ConnectionData::encode(left, right),
                vertical: ConnectionData::encode(down, up),
                diagonal_up: ConnectionData::encode(down_left, up_right),
                diagonal_down: ConnectionData::encode(down_right, up_left),
            });
        }
        debug!(
            "Connections updated: {} connected cells, {} disconnected",
            self.connected_cell_count,
            self.disconnected_cells.len()
        );
    }

    /// Current state of the game.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Centers of the galaxies, indexed by the galaxy ID.
    pub fn centers(&self) -> &[Center] {
        &self.centers[..]
    }

    /// Color index of each galaxy, in `0..PALETTE_SIZE`.
    pub fn color_ids(&self) -> &[usize] {
        &self.color_ids[..]
    }

    /// Number of assigned cells connected to the center of their galaxy.
    pub fn connected_cell_count(&self) -> usize {
        self.connected_cell_count
    }

    /// Cells that cannot be reached from the center of their galaxy.
    pub fn disconnected_cells(&self) -> &BTreeSet<usize> {
        &self.disconnected_cells
    }

    /// Whether the puzzle knows its reference solution.
    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    /// Galaxy ID of each cell in the reference solution.
    pub fn solution(&self) -> Option<&[Option<usize>]> {
        self.solution.as_deref()
    }

    /// State of the locks, indexed like the cells.
    pub fn locks(&self) -> &[bool] {
        &self.locks[..]
    }

    /// Rebuild a puzzle from its saved parts.
    ///
    /// The galaxy IDs of the cells must be valid and the galaxies must be symmetric.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        width: usize,
        height: usize,
        wrapping: bool,
        centers: Vec<Center>,
        solution: Option<Vec<Option<usize>>>,
        cells: &[Option<usize>],
        locks: Vec<bool>,
        color_ids: Vec<usize>,
    ) -> Result<Self, String> {
        let num_cells: usize = width * height;
        if num_cells == 0 {
            return Err(format!("Invalid board size: {width}x{height}"));
        }
        if cells.len() != num_cells || locks.len() != num_cells {
            return Err(format!(
                "Expected {num_cells} cells, got {} cells and {} locks",
                cells.len(),
                locks.len()
            ));
        }
        if solution.as_ref().is_some_and(|s| s.len() != num_cells) {
            return Err(format!("The solution does not have {num_cells} cells"));
        }
        let num_galaxies: usize = centers.len();
        if color_ids.len() != num_galaxies || color_ids.iter().any(|c| *c >= PALETTE_SIZE) {
            return Err("Invalid galaxy colors".to_string());
        }
        let valid_id = |id: &Option<usize>| id.is_none_or(|id| id < num_galaxies);
        if !cells.iter().all(valid_id)
            || !solution.as_ref().is_none_or(|s| s.iter().all(valid_id))
        {
            return Err("Invalid galaxy ID".to_string());
        }

        let mut puzzle: Puzzle = Self {
            board: Board::new(width, height, wrapping),
            centers,
            solution,
            color_ids,
            locks: Vec::new(),
            disconnected_cells: BTreeSet::new(),
            connected_cell_count: 0,
            connection_data: Vec::new(),
        };
        puzzle.reset();
        if puzzle.board.galaxies().len() != num_galaxies {
            return Err("Galaxy centers overlap or are outside the board".to_string());
        }

        for (index, id) in cells.iter().enumerate() {
            match id {
                Some(id) => puzzle.board.set_at(index, *id),
                None if puzzle.board.id_at(index).is_some() => {
                    return Err(format!("Galaxy center at cell {index} is empty"));
                }
                None => (),
            }
        }
        if !puzzle.board.is_symmetric() {
            return Err("Galaxies are not symmetric".to_string());
        }

        puzzle.locks = locks;
        puzzle.update_connections();
        Ok(puzzle)
    }
}

/// ASCII representation of the current state of the game.
impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reference_puzzle() -> Puzzle {
        Puzzle::new(&fixtures::reference_board())
    }

    #[test]
    fn starts_with_the_centers() {
        let puzzle: Puzzle = reference_puzzle();
        assert_eq!(puzzle.centers(), &fixtures::reference_centers()[..]);
        assert_eq!(puzzle.to_string(), "..A..\nB....\nB.D.E\n.....\n.CC..\n");
        assert_eq!(puzzle.connected_cell_count(), 7);
        assert_eq!(puzzle.disconnected_cells().len(), 18);
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.color_ids(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn ids_and_sentinels() {
        let puzzle: Puzzle = reference_puzzle();
        assert_eq!(puzzle.get_id_at(Pos::new(2, 0)), 0);
        assert_eq!(puzzle.get_id_at(Pos::new(0, 2)), 1);
        assert_eq!(puzzle.get_id_at(Pos::new(0, 0)), EMPTY);
        assert_eq!(puzzle.get_id_at(Pos::new(5, 0)), INVALID_POS);
        assert_eq!(puzzle.get_id_at(Pos::new(0, -1)), INVALID_POS);
    }

    #[test]
    fn solve_restores_the_reference() {
        let mut puzzle: Puzzle = reference_puzzle();
        assert!(puzzle.solve());
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.connected_cell_count(), 25);
        assert_eq!(puzzle.board(), &fixtures::reference_board());

        puzzle.reset();
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.connected_cell_count(), 7);

        let mut unknown: Puzzle = Puzzle::from_centers(5, 5, false, &fixtures::reference_centers());
        assert!(!unknown.has_solution());
        assert!(!unknown.solve());
    }

    #[test]
    fn overlapping_centers_are_ignored() {
        let center: Center = Center::new(1.5, 1.5).unwrap();
        let puzzle: Puzzle = Puzzle::from_centers(3, 3, false, &[center, center]);
        assert_eq!(puzzle.centers(), &[center]);
        assert_eq!(puzzle.color_ids().len(), 1);
    }

    #[test]
    fn player_moves() {
        let mut puzzle: Puzzle = reference_puzzle();

        assert!(puzzle.set_symmetrically_at(Pos::new(1, 1), 3));
        assert_eq!(puzzle.get_id_at(Pos::new(3, 3)), 3);
        assert!(!puzzle.is_cell_connected_to_center(Pos::new(1, 1)));
        assert!(!puzzle.is_cell_connected_to_center(Pos::new(3, 3)));

        // Nothing changes
        assert!(!puzzle.set_symmetrically_at(Pos::new(1, 1), 3));
        // The opposite cell through the left galaxy is outside the board
        assert!(!puzzle.set_symmetrically_at(Pos::new(1, 0), 1));
        // Centers cannot be taken
        assert!(!puzzle.set_symmetrically_at(Pos::new(0, 1), 3));

        assert!(puzzle.set_symmetrically_at(Pos::new(1, 2), 3));
        assert!(puzzle.is_cell_connected_to_center(Pos::new(1, 1)));
        assert!(puzzle.is_cell_connected_to_center(Pos::new(3, 3)));
        assert_eq!(puzzle.connected_cell_count(), 7 + 4);

        // Taking a cell from another galaxy empties its opposite cell in that galaxy
        assert!(puzzle.set_symmetrically_at(Pos::new(0, 0), 1));
        assert_eq!(puzzle.get_id_at(Pos::new(0, 3)), 1);
        assert!(puzzle.set_symmetrically_at(Pos::new(0, 3), 3));
        assert_eq!(puzzle.get_id_at(Pos::new(4, 1)), 3);
        assert_eq!(puzzle.get_id_at(Pos::new(0, 0)), EMPTY);

        assert!(!puzzle.can_unset_at(Pos::new(2, 2)));
        assert!(!puzzle.unset_symmetrically_at(Pos::new(2, 2)));
        assert!(!puzzle.unset_symmetrically_at(Pos::new(0, 0)));
        assert!(puzzle.unset_symmetrically_at(Pos::new(3, 3)));
        assert_eq!(puzzle.get_id_at(Pos::new(1, 1)), EMPTY);
    }

    #[test]
    fn locks() {
        let mut puzzle: Puzzle = reference_puzzle();
        assert!(puzzle.set_symmetrically_at(Pos::new(0, 0), 1));

        assert!(!puzzle.toggle_locked_at(Pos::new(2, 2)));
        assert!(!puzzle.toggle_locked_at(Pos::new(1, 1)));
        assert!(!puzzle.toggle_locked_at(Pos::new(9, 9)));

        assert!(puzzle.toggle_locked_at(Pos::new(0, 0)));
        assert!(puzzle.is_locked_at(Pos::new(0, 0)));
        assert!(puzzle.is_locked_at(Pos::new(0, 3)));
        assert!(!puzzle.set_symmetrically_at(Pos::new(0, 0), 3));
        assert!(!puzzle.unset_symmetrically_at(Pos::new(0, 3)));

        assert!(puzzle.toggle_locked_at(Pos::new(0, 3)));
        assert!(!puzzle.is_locked_at(Pos::new(0, 0)));
        assert!(puzzle.set_symmetrically_at(Pos::new(0, 0), 3));
        assert_eq!(puzzle.get_id_at(Pos::new(4, 4)), 3);
        assert_eq!(puzzle.get_id_at(Pos::new(0, 3)), EMPTY);
    }

    #[test]
    fn connection_data() {
        let mut puzzle: Puzzle = reference_puzzle();

        // Empty cells connect to other empty cells
        let data: ConnectionData = puzzle.get_shader_connection_data(Pos::new(0, 0)).unwrap();
        assert_eq!((data.horizontal, data.vertical), (1, 0));

        assert!(puzzle.solve());
        assert_eq!(
            puzzle.get_shader_connection_data(Pos::new(2, 2)),
            Some(ConnectionData {
                horizontal: 2,
                vertical: 2,
                diagonal_up: 2,
                diagonal_down: 2
            })
        );
        assert_eq!(
            puzzle.get_shader_connection_data(Pos::new(1, 1)),
            Some(ConnectionData {
                horizontal: 1,
                vertical: 1,
                diagonal_up: 1,
                diagonal_down: 0
            })
        );
        assert_eq!(
            puzzle.get_shader_connection_data(Pos::new(4, 4)),
            Some(ConnectionData {
                horizontal: 0,
                vertical: -1,
                diagonal_up: 0,
                diagonal_down: 0
            })
        );
        assert_eq!(puzzle.get_shader_connection_data(Pos::new(4, 5)), None);
    }

    #[test]
    fn shuffled_colors() {
        let mut rng: StdRng = StdRng::seed_from_u64(7);
        let puzzle: Puzzle = Puzzle::with_rng(&fixtures::reference_board(), &mut rng);

        let colors: BTreeSet<usize> = puzzle.color_ids().iter().copied().collect();
        assert_eq!(colors.len(), 5);
        assert!(colors.iter().all(|c| *c < PALETTE_SIZE));
    }

    #[test]
    fn restore_rejects_bad_input() {
        let restore = |cells: &[Option<usize>], color_ids: Vec<usize>| {
            Puzzle::restore(
                5,
                5,
                false,
                fixtures::reference_centers(),
                None,
                cells,
                vec![false; 25],
                color_ids,
            )
        };
        let empty: Vec<Option<usize>> = vec![None; 25];
        let current: Vec<Option<usize>> = fixtures::reference_board()
            .cells()
            .iter()
            .map(|c| c.id)
            .collect();

        assert!(restore(&current[1..], vec![0; 5]).is_err());
        assert!(restore(&current, vec![9; 5]).is_err());
        assert!(restore(&current, vec![0; 4]).is_err());

        // Galaxy centers must stay assigned
        assert!(restore(&empty, vec![0; 5]).is_err());

        let mut asymmetric: Vec<Option<usize>> = current.clone();
        asymmetric[0] = Some(0);
        assert!(restore(&asymmetric, vec![0; 5]).is_err());

        let mut unknown: Vec<Option<usize>> = current.clone();
        unknown[0] = Some(5);
        assert!(restore(&unknown, vec![0; 5]).is_err());

        let puzzle: Puzzle = restore(&current, vec![0; 5]).unwrap();
        assert!(puzzle.is_solved());
    }
}
