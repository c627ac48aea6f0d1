/*
board.rs

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

//! Grid of cells and the galaxies that partition it.
//!
//! The [`Board`] object owns a flat array of [`Cell`] objects, indexed by `x + y * width`, and
//! the list of [`Galaxy`] objects.
//! The ID of a galaxy is its index in that list.
//!
//! Galaxy centers are points on the grid that can be the middle of a cell, the middle of an
//! edge between two cells, or a corner shared by four cells.
//! The [`Center`] object stores these points with doubled coordinates so that they are always
//! integers.
//!
//! A cell at `(x, y)` covers the square from `(x, y)` to `(x + 1, y + 1)`, so the middle of the
//! cell is at `(x + 0.5, y + 0.5)`.
//! The point reflection of the cell through a center `c` is the cell at `2 * c - (x, y) - 1`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Value returned by [`crate::puzzle::Puzzle::get_id_at`] for a cell that is not part of any
/// galaxy.
pub const EMPTY: i32 = -1;

/// Value returned by [`crate::puzzle::Puzzle::get_id_at`] for a position outside a
/// non-wrapping board.
pub const INVALID_POS: i32 = -2;

/// Letters used to represent the galaxies in the ASCII output.
const MAPPING: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest doubled coordinate accepted when converting a floating point center.
const MAX_DOUBLED_COORDINATE: f64 = 1_000_000.0;

/// Integer position on the grid.
///
/// Positions are signed so that the coordinates outside the board can be expressed. On a
/// wrapping board, these coordinates are folded back into the board.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    /// Create a [`Pos`] object.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Where a center point lies relative to the cells.
///
/// - `Cell`: the middle of a cell (one cell touches the point).
/// - `EdgeH`: the middle of a horizontal edge, between two cells on top of each other.
/// - `EdgeV`: the middle of a vertical edge, between two cells side by side.
/// - `Corner`: a grid corner (four cells touch the point).
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CenterKind {
    Cell,
    EdgeH,
    EdgeV,
    Corner,
}

impl CenterKind {
    /// Number of cells that touch a center of this kind.
    pub fn arity(&self) -> usize {
        match self {
            CenterKind::Cell => 1,
            CenterKind::EdgeH | CenterKind::EdgeV => 2,
            CenterKind::Corner => 4,
        }
    }
}

/// Center of a galaxy.
///
/// The coordinates are stored doubled: the middle of the cell `(0, 0)`, which is the point
/// `(0.5, 0.5)`, is stored as `(1, 1)`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(into = "(f64, f64)", try_from = "(f64, f64)")]
pub struct Center {
    x2: i32,
    y2: i32,
}

impl Center {
    /// Create a [`Center`] object from its coordinates.
    ///
    /// Return [`None`] if the point is not aligned on a half-integer grid.
    pub fn new(x: f64, y: f64) -> Option<Self> {
        let x2: f64 = x * 2.0;
        let y2: f64 = y * 2.0;

        if !x2.is_finite()
            || !y2.is_finite()
            || x2.fract() != 0.0
            || y2.fract() != 0.0
            || x2.abs() > MAX_DOUBLED_COORDINATE
            || y2.abs() > MAX_DOUBLED_COORDINATE
        {
            return None;
        }
        Some(Self {
            x2: x2 as i32,
            y2: y2 as i32,
        })
    }

    /// Create a [`Center`] object from doubled coordinates.
    pub fn from_doubled(x2: i32, y2: i32) -> Self {
        Self { x2, y2 }
    }

    /// Create a [`Center`] object at the middle of the given cell.
    pub fn of_cell(x: i32, y: i32) -> Self {
        Self {
            x2: 2 * x + 1,
            y2: 2 * y + 1,
        }
    }

    /// Return the doubled coordinates.
    pub fn doubled(&self) -> (i32, i32) {
        (self.x2, self.y2)
    }

    /// Return the X coordinate.
    pub fn x(&self) -> f64 {
        f64::from(self.x2) / 2.0
    }

    /// Return the Y coordinate.
    pub fn y(&self) -> f64 {
        f64::from(self.y2) / 2.0
    }

    /// Return the alignment of the point.
    pub fn kind(&self) -> CenterKind {
        match (self.x2.rem_euclid(2) == 1, self.y2.rem_euclid(2) == 1) {
            (true, true) => CenterKind::Cell,
            (true, false) => CenterKind::EdgeH,
            (false, true) => CenterKind::EdgeV,
            (false, false) => CenterKind::Corner,
        }
    }

    /// Return the position of the point reflection of the given position through the center.
    pub fn reflect(&self, pos: Pos) -> Pos {
        Pos::new(self.x2 - pos.x - 1, self.y2 - pos.y - 1)
    }

    /// Return the positions of the cells that touch the center.
    ///
    /// The positions are not folded into any board: the caller does that.
    pub fn touching_positions(&self) -> Vec<Pos> {
        let xs: Vec<i32> = if self.x2.rem_euclid(2) == 1 {
            vec![(self.x2 - 1).div_euclid(2)]
        } else {
            vec![self.x2.div_euclid(2) - 1, self.x2.div_euclid(2)]
        };
        let ys: Vec<i32> = if self.y2.rem_euclid(2) == 1 {
            vec![(self.y2 - 1).div_euclid(2)]
        } else {
            vec![self.y2.div_euclid(2) - 1, self.y2.div_euclid(2)]
        };

        let mut positions: Vec<Pos> = Vec::with_capacity(xs.len() * ys.len());
        for y in &ys {
            for x in &xs {
                positions.push(Pos::new(*x, *y));
            }
        }
        positions
    }

    /// Fold the center into a wrapping board of the given size.
    pub fn wrapped(&self, width: usize, height: usize) -> Self {
        Self {
            x2: self.x2.rem_euclid(2 * width as i32),
            y2: self.y2.rem_euclid(2 * height as i32),
        }
    }
}

impl From<Center> for (f64, f64) {
    fn from(center: Center) -> Self {
        (center.x(), center.y())
    }
}

impl TryFrom<(f64, f64)> for Center {
    type Error = String;

    fn try_from(value: (f64, f64)) -> Result<Self, Self::Error> {
        Center::new(value.0, value.1)
            .ok_or_else(|| format!("({}, {}) is not a valid galaxy center", value.0, value.1))
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

/// Cell of the grid.
///
/// The `id` is the ID of the galaxy that the cell belongs to, or [`None`] if the cell is empty.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub id: Option<usize>,
}

/// Region of cells that is symmetric under a 180° rotation around its center.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Galaxy {
    /// Galaxy ID, which is also its index in the [`Board`] galaxy list.
    pub id: usize,

    /// Center of symmetry.
    pub center: Center,

    /// Indexes of the cells that belong to the galaxy.
    pub cells: BTreeSet<usize>,

    /// Indexes of the one, two, or four cells that touch the center.
    /// These cells cannot be taken by another galaxy.
    pub center_cells: BTreeSet<usize>,
}

impl Galaxy {
    /// Whether the galaxy grew beyond the cells that touch its center.
    pub fn is_expanded(&self) -> bool {
        self.cells.len() > self.center_cells.len()
    }
}

/// Rectangular grid of cells, optionally wrapping around (toroidal).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    wrapping: bool,
    cells: Vec<Cell>,
    galaxies: Vec<Galaxy>,
}

impl Board {
    /// Create a [`Board`] object with only empty cells and no galaxies.
    pub fn new(width: usize, height: usize, wrapping: bool) -> Self {
        let mut board: Board = Self {
            width,
            height,
            wrapping,
            cells: Vec::with_capacity(width * height),
            galaxies: Vec::new(),
        };
        board.clear();
        board
    }

    /// Remove all the galaxies and empty all the cells.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.galaxies.clear();
        for y in 0..self.height {
            for x in 0..self.width {
                self.cells.push(Cell { x, y, id: None });
            }
        }
    }

    /// Width of the board.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the board.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the coordinates wrap around the board edges.
    pub fn wrapping(&self) -> bool {
        self.wrapping
    }

    /// Number of cells.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// All the cells, indexed by `x + y * width`.
    pub fn cells(&self) -> &[Cell] {
        &self.cells[..]
    }

    /// All the galaxies, indexed by their ID.
    pub fn galaxies(&self) -> &[Galaxy] {
        &self.galaxies[..]
    }

    /// Return the galaxy with the given ID.
    pub fn galaxy(&self, id: usize) -> Option<&Galaxy> {
        self.galaxies.get(id)
    }

    /// Return the index of the cell at the given position.
    ///
    /// On a wrapping board, the position is folded into the board. Otherwise, [`None`] is
    /// returned for positions outside the board.
    pub fn index_of(&self, pos: Pos) -> Option<usize> {
        let width: i32 = self.width as i32;
        let height: i32 = self.height as i32;
        if width == 0 || height == 0 {
            return None;
        }

        let (x, y): (i32, i32) = if self.wrapping {
            (pos.x.rem_euclid(width), pos.y.rem_euclid(height))
        } else {
            if pos.x < 0 || pos.y < 0 || pos.x >= width || pos.y >= height {
                return None;
            }
            (pos.x, pos.y)
        };
        Some(x as usize + y as usize * self.width)
    }

    /// Return the position of the cell at the given index.
    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Return the cell at the given position.
    pub fn get_cell_at(&self, pos: Pos) -> Option<&Cell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Return the ID of the galaxy that owns the cell at the given index.
    pub fn id_at(&self, index: usize) -> Option<usize> {
        self.cells.get(index).and_then(|c| c.id)
    }

    /// Return the position opposite to `pos` through the given center, folded into the board
    /// when it wraps. The position might be outside a non-wrapping board.
    pub fn opposite_pos(&self, pos: Pos, center: &Center) -> Pos {
        let opposite: Pos = center.reflect(pos);
        match self.index_of(opposite) {
            Some(index) if self.wrapping => self.pos_of(index),
            _ => opposite,
        }
    }

    /// Return the index of the cell opposite to `pos` through the given center.
    pub fn get_opposite_index(&self, pos: Pos, center: &Center) -> Option<usize> {
        self.index_of(center.reflect(pos))
    }

    /// Return the cell opposite to `pos` through the given center.
    pub fn get_opposite_cell_from(&self, pos: Pos, center: &Center) -> Option<&Cell> {
        self.get_cell_at(center.reflect(pos))
    }

    /// Return the index of the cell opposite to `pos` through the center of the given galaxy.
    pub fn get_opposite_index_from_id(&self, pos: Pos, id: usize) -> Option<usize> {
        let center: Center = self.galaxies.get(id)?.center;
        self.get_opposite_index(pos, &center)
    }

    /// Return the indexes of the cells above, on the left, on the right, and below the given
    /// position.
    pub fn get_neighbouring_cells(&self, pos: Pos) -> Vec<usize> {
        let mut neighbours: Vec<usize> = Vec::with_capacity(4);
        for p in [
            Pos::new(pos.x, pos.y - 1),
            Pos::new(pos.x - 1, pos.y),
            Pos::new(pos.x + 1, pos.y),
            Pos::new(pos.x, pos.y + 1),
        ] {
            // Small wrapping boards can reach the same cell from two sides
            if let Some(i) = self.index_of(p)
                && !neighbours.contains(&i)
            {
                neighbours.push(i);
            }
        }
        neighbours
    }

    /// Return the neighbours of all the given cells, without duplicates.
    pub fn get_neighbours_for_multiple(&self, cells: &[usize]) -> Vec<usize> {
        let mut result: Vec<usize> = Vec::new();
        for index in cells {
            for neighbour in self.get_neighbouring_cells(self.pos_of(*index)) {
                if !result.contains(&neighbour) {
                    result.push(neighbour);
                }
            }
        }
        result
    }

    /// Return the indexes of the one, two, or four cells that touch the given center.
    ///
    /// Return [`None`] if one of these cells is outside the board.
    pub fn get_touching_cells(&self, center: &Center) -> Option<Vec<usize>> {
        let mut cells: Vec<usize> = Vec::with_capacity(4);
        for pos in center.touching_positions() {
            let index: usize = self.index_of(pos)?;
            if !cells.contains(&index) {
                cells.push(index);
            }
        }
        Some(cells)
    }

    /// Fold the center into the board when it wraps.
    fn normalize(&self, center: &Center) -> Center {
        if self.wrapping {
            center.wrapped(self.width, self.height)
        } else {
            *center
        }
    }

    /// Create a galaxy at the given center.
    ///
    /// Return the ID of the new galaxy, or [`None`] if a cell touching the center is outside
    /// the board or already belongs to a galaxy.
    pub fn add_galaxy_at(&mut self, center: &Center) -> Option<usize> {
        let touching: Vec<usize> = self.get_touching_cells(center)?;
        if touching.iter().any(|i| self.cells[*i].id.is_some()) {
            return None;
        }

        let id: usize = self.galaxies.len();
        self.galaxies.push(Galaxy {
            id,
            center: self.normalize(center),
            cells: BTreeSet::new(),
            center_cells: touching.iter().copied().collect(),
        });
        for index in touching {
            self.set_at(index, id);
        }
        Some(id)
    }

    /// Create a galaxy from a group of cells, taking them from the galaxies that own them.
    ///
    /// The cells touching the center must be part of the group. The galaxies that lose cells
    /// are left as they are: the caller is expected to remove them with
    /// [`Board::remove_galaxies`].
    pub fn push_galaxy(&mut self, center: &Center, cells: &[usize]) -> Option<usize> {
        let touching: Vec<usize> = self.get_touching_cells(center)?;
        if touching.iter().any(|i| !cells.contains(i)) {
            return None;
        }

        let id: usize = self.galaxies.len();
        self.galaxies.push(Galaxy {
            id,
            center: self.normalize(center),
            cells: BTreeSet::new(),
            center_cells: touching.into_iter().collect(),
        });
        for index in cells {
            self.set_at(*index, id);
        }
        Some(id)
    }

    /// Remove the given galaxies and renumber the remaining ones.
    ///
    /// Galaxy IDs are indexes in the galaxy list, so the galaxies are removed from the highest
    /// ID to the lowest. Cells still owned by a removed galaxy become empty.
    pub fn remove_galaxies(&mut self, ids: &[usize]) {
        let mut ids: Vec<usize> = ids.to_vec();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.dedup();

        for id in ids {
            if id >= self.galaxies.len() {
                continue;
            }
            let galaxy: Galaxy = self.galaxies.remove(id);
            for index in galaxy.cells {
                if self.cells[index].id == Some(id) {
                    self.cells[index].id = None;
                }
            }
        }

        for (id, galaxy) in self.galaxies.iter_mut().enumerate() {
            galaxy.id = id;
            for index in &galaxy.cells {
                self.cells[*index].id = Some(id);
            }
        }
    }

    /// Move the center of a galaxy. The cells of the galaxy are not updated.
    pub fn move_galaxy_center(&mut self, id: usize, center: &Center) -> bool {
        let Some(touching) = self.get_touching_cells(center) else {
            return false;
        };
        let center: Center = self.normalize(center);
        match self.galaxies.get_mut(id) {
            Some(galaxy) => {
                galaxy.center = center;
                galaxy.center_cells = touching.into_iter().collect();
                true
            }
            None => false,
        }
    }

    /// Return the ID of the galaxy for which the given cell touches the center.
    pub fn center_owner(&self, index: usize) -> Option<usize> {
        self.galaxies
            .iter()
            .find(|g| g.center_cells.contains(&index))
            .map(|g| g.id)
    }

    /// Whether the cell at the given index touches the center of the galaxy that owns it.
    pub fn is_galaxy_center(&self, index: usize) -> bool {
        match self.id_at(index) {
            Some(id) => self.galaxies[id].center_cells.contains(&index),
            None => false,
        }
    }

    /// Assign the cell to a galaxy, without any symmetry verification.
    pub fn set_at(&mut self, index: usize, id: usize) {
        if let Some(old) = self.cells[index].id
            && old != id
            && let Some(galaxy) = self.galaxies.get_mut(old)
        {
            galaxy.cells.remove(&index);
        }
        self.cells[index].id = Some(id);
        if let Some(galaxy) = self.galaxies.get_mut(id) {
            galaxy.cells.insert(index);
        }
    }

    /// Empty the cell, without any symmetry verification.
    fn clear_at(&mut self, index: usize) {
        if let Some(old) = self.cells[index].id.take()
            && let Some(galaxy) = self.galaxies.get_mut(old)
        {
            galaxy.cells.remove(&index);
        }
    }

    /// Whether the cell belongs to a galaxy other than `id`.
    fn is_claimed_by_other(&self, index: usize, id: usize) -> bool {
        matches!(self.cells[index].id, Some(other) if other != id)
    }

    /// Assign the cell at `pos` and its opposite cell to the given galaxy.
    ///
    /// The operation fails if one of the two cells is outside the board or touches the center
    /// of another galaxy.
    /// If one of the two cells belongs to another galaxy, then the operation fails unless
    /// `override_` is set. In that case, the conflicting cells and their own opposite cells
    /// are emptied first.
    pub fn set_symmetrically_at(&mut self, pos: Pos, id: usize, override_: bool) -> bool {
        let Some(index) = self.index_of(pos) else {
            return false;
        };
        let Some(opposite) = self.get_opposite_index_from_id(pos, id) else {
            return false;
        };

        // Galaxy centers cannot be changed
        for galaxy in self.galaxies.iter().filter(|g| g.id != id) {
            if galaxy.center_cells.contains(&index) || galaxy.center_cells.contains(&opposite) {
                return false;
            }
        }

        if self.is_claimed_by_other(index, id) || self.is_claimed_by_other(opposite, id) {
            if !override_ {
                return false;
            }
            let opposite_pos: Pos = self.pos_of(opposite);
            if self.is_claimed_by_other(index, id) {
                self.unset_symmetrically_at(pos);
            }
            if self.is_claimed_by_other(opposite, id) {
                self.unset_symmetrically_at(opposite_pos);
            }
        }

        self.set_at(index, id);
        self.set_at(opposite, id);
        true
    }

    /// Empty the cell at `pos` and its opposite cell through the center of the galaxy that
    /// owns it.
    ///
    /// Return `false` if the cell is outside the board or already empty.
    pub fn unset_symmetrically_at(&mut self, pos: Pos) -> bool {
        let Some(index) = self.index_of(pos) else {
            return false;
        };
        let Some(id) = self.cells[index].id else {
            return false;
        };

        let opposite: Option<usize> = self.get_opposite_index_from_id(pos, id);
        self.clear_at(index);
        if let Some(o) = opposite
            && self.cells[o].id == Some(id)
        {
            self.clear_at(o);
        }
        true
    }

    /// Whether every galaxy is symmetric around its center and owns the cells touching its
    /// center, and whether the cells and the galaxies agree on ownership.
    pub fn is_symmetric(&self) -> bool {
        for galaxy in &self.galaxies {
            if !galaxy.center_cells.is_subset(&galaxy.cells) {
                return false;
            }
            for index in &galaxy.cells {
                if self.cells[*index].id != Some(galaxy.id) {
                    return false;
                }
                match self.get_opposite_index(self.pos_of(*index), &galaxy.center) {
                    Some(o) if self.cells[o].id == Some(galaxy.id) => (),
                    _ => return false,
                }
            }
        }
        self.cells
            .iter()
            .enumerate()
            .all(|(i, c)| {
                c.id.is_none_or(|id| self.galaxies.get(id).is_some_and(|g| g.cells.contains(&i)))
            })
    }

    /// Whether all the cells of the galaxy can be reached from its center cells.
    pub fn is_galaxy_connected(&self, id: usize) -> bool {
        let Some(galaxy) = self.galaxies.get(id) else {
            return false;
        };
        let mut visited: BTreeSet<usize> = galaxy.center_cells.clone();
        let mut to_visit: Vec<usize> = galaxy.center_cells.iter().copied().collect();

        while let Some(index) = to_visit.pop() {
            for neighbour in self.get_neighbouring_cells(self.pos_of(index)) {
                if galaxy.cells.contains(&neighbour) && visited.insert(neighbour) {
                    to_visit.push(neighbour);
                }
            }
        }
        visited.len() == galaxy.cells.len()
    }
}

/// ASCII representation of the board: one letter per galaxy, `.` for empty cells.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height {
            let mut s: String = String::with_capacity(self.width);
            for x in 0..self.width {
                match self.cells[x + y * self.width].id {
                    Some(id) => s.push(MAPPING[id % MAPPING.len()] as char),
                    None => s.push('.'),
                }
            }
            writeln!(f, "{s}")?;
        }
        Ok(())
    }
}
