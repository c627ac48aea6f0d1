/*
algorithm.rs

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

//! Generate a random galaxy layout.
//!
//! Two strategies are available:
//!
//! * [`Strategy::Expansion`] visits all the possible center points in a random order.
//!   For each point, it first tries to extend a neighbouring galaxy over the cells touching the
//!   point, possibly by moving the center of that galaxy. If that is not possible, then a new
//!   galaxy is created at that point.
//!
//! * [`Strategy::Frontier`] picks a random center point, creates a galaxy, and grows it one
//!   symmetric pair of cells at a time until it reaches a random size.
//!
//! Both strategies end by merging the galaxies that are reduced to a single cell.

use clap::ValueEnum;
use log::{Level, debug, log_enabled};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::singletons;
use crate::board::{Board, Center, CenterKind, Pos};

/// Smallest target size for the galaxies grown by [`Strategy::Frontier`].
const MIN_GROWTH_SIZE: usize = 3;

/// Layout generation strategy.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Strategy {
    /// Shuffle the center points and expand or move the existing galaxies.
    #[default]
    Expansion,

    /// Grow each new galaxy from its frontier up to a random size.
    Frontier,
}

/// Possible galaxy center.
#[derive(Debug, Copy, Clone)]
struct Candidate {
    center: Center,
    kind: CenterKind,
}

/// [`GenerationAlgorithm`] object.
pub struct GenerationAlgorithm<'a, R: Rng> {
    /// Board being filled.
    board: Board,

    /// Galaxies do not expand beyond that number of cells.
    max_galaxy_size: usize,

    /// Generation strategy.
    strategy: Strategy,

    /// Source of all the random decisions.
    rng: &'a mut R,

    /// Number of center points processed during the last generation.
    pub iteration: usize,
}

impl<'a, R: Rng> GenerationAlgorithm<'a, R> {
    /// Create the object for an empty board.
    pub fn new(
        width: usize,
        height: usize,
        wrapping: bool,
        strategy: Strategy,
        rng: &'a mut R,
    ) -> Self {
        let min_side: usize = width.min(height);
        Self {
            board: Board::new(width, height, wrapping),
            max_galaxy_size: if wrapping {
                2 * min_side
            } else {
                (2 * min_side).saturating_sub(1)
            },
            strategy,
            rng,
            iteration: 0,
        }
    }

    /// Maximum number of cells a galaxy can reach by expansion.
    pub fn max_galaxy_size(&self) -> usize {
        self.max_galaxy_size
    }

    /// Generate the layout and return the completed board.
    pub fn generate(mut self) -> Board {
        self.iteration = 0;
        match self.strategy {
            Strategy::Expansion => self.generate_by_expansion(),
            Strategy::Frontier => self.generate_by_frontier(),
        }
        let merged: usize = singletons::merge_singletons(&mut self.board);

        debug!(
            "Layout generated: strategy = {:?}  iterations = {}  galaxies = {}  merged = {}",
            self.strategy,
            self.iteration,
            self.board.galaxies().len(),
            merged
        );
        if log_enabled!(Level::Debug) {
            for row in self.board.to_string().lines() {
                debug!("    {row}");
            }
        }
        self.board
    }

    /// Return all the points that can be galaxy centers.
    ///
    /// On a non-wrapping board, the points on the border are excluded because some of the
    /// cells they touch would be outside the board.
    fn candidate_points(&self) -> Vec<Candidate> {
        let start: i32 = if self.board.wrapping() { 0 } else { 1 };
        let end_x: i32 = 2 * self.board.width() as i32;
        let end_y: i32 = 2 * self.board.height() as i32;

        let mut candidates: Vec<Candidate> = Vec::new();
        for y2 in start..end_y {
            for x2 in start..end_x {
                let center: Center = Center::from_doubled(x2, y2);
                candidates.push(Candidate {
                    center,
                    kind: center.kind(),
                });
            }
        }
        candidates
    }

    /// Visit the candidate points in a random order, expanding galaxies or creating new ones.
    fn generate_by_expansion(&mut self) {
        let mut todo: Vec<Candidate> = self.candidate_points();
        todo.shuffle(&mut *self.rng);

        for (i, candidate) in todo.iter().enumerate() {
            self.iteration += 1;
            if candidate.kind != CenterKind::Corner && self.try_expand(&candidate.center) {
                continue;
            }

            // Corners are low priority seeds: only one in two becomes a galaxy
            if candidate.kind == CenterKind::Corner && i % 2 == 1 {
                continue;
            }

            if let Some(id) = self.board.add_galaxy_at(&candidate.center) {
                debug!("New galaxy {id} at {}", candidate.center);
            }
        }
    }

    /// Try to extend a neighbouring galaxy over the cells that touch the given point.
    fn try_expand(&mut self, center: &Center) -> bool {
        let Some(cells) = self.board.get_touching_cells(center) else {
            return false;
        };
        if cells.iter().any(|i| self.board.id_at(*i).is_some()) {
            return false;
        }

        let mut neighbours: Vec<usize> = self.board.get_neighbours_for_multiple(&cells);
        neighbours.shuffle(&mut *self.rng);

        let mut tried: Vec<usize> = Vec::with_capacity(neighbours.len());
        for neighbour in neighbours {
            let Some(id) = self.board.id_at(neighbour) else {
                continue;
            };
            if tried.contains(&id) {
                continue;
            }
            tried.push(id);

            if self.board.galaxies()[id].cells.len() < self.max_galaxy_size
                && self.try_expand_or_move_galaxy(id, &cells)
            {
                return true;
            }
        }
        false
    }

    /// Whether the cell opposite to the given cell exists and is free or already in the galaxy.
    fn is_valid_opposite(&self, index: usize, center: &Center, id: usize) -> bool {
        match self
            .board
            .get_opposite_index(self.board.pos_of(index), center)
        {
            Some(o) => self.board.id_at(o).is_none_or(|other| other == id),
            None => false,
        }
    }

    /// Add the cells to the galaxy, either around its current center or around a new center.
    fn try_expand_or_move_galaxy(&mut self, id: usize, cells: &[usize]) -> bool {
        let center: Center = self.board.galaxies()[id].center;

        if cells.iter().all(|i| self.is_valid_opposite(*i, &center, id)) {
            for index in cells {
                self.board
                    .set_symmetrically_at(self.board.pos_of(*index), id, false);
            }
            debug!("Galaxy {id} expanded around {center}");
            return true;
        }

        // Expanding failed, try moving the center to the centroid of the old and new cells
        let Some(new_center) = self.centroid(id, cells) else {
            return false;
        };
        if new_center == center {
            return false;
        }

        let mut new_cells: Vec<usize> = self.board.galaxies()[id].cells.iter().copied().collect();
        new_cells.extend_from_slice(cells);

        if !new_cells
            .iter()
            .all(|i| self.is_valid_opposite(*i, &new_center, id))
        {
            return false;
        }

        // The cells touching the new center must already be part of the galaxy
        match self.board.get_touching_cells(&new_center) {
            Some(touching) if touching.iter().all(|i| new_cells.contains(i)) => (),
            _ => return false,
        }

        if !self.board.move_galaxy_center(id, &new_center) {
            return false;
        }
        for index in new_cells {
            self.board
                .set_symmetrically_at(self.board.pos_of(index), id, false);
        }
        debug!("Galaxy {id} moved from {center} to {new_center}");
        true
    }

    /// Compute the centroid of the galaxy extended with the given cells.
    ///
    /// The galaxy is symmetric, so the centroid of its current cells is its center.
    /// Return [`None`] if the centroid is not a valid center point.
    fn centroid(&self, id: usize, cells: &[usize]) -> Option<Center> {
        let galaxy_size: i64 = self.board.galaxies()[id].cells.len() as i64;
        let (cx2, cy2): (i32, i32) = self.board.galaxies()[id].center.doubled();
        let width2: i64 = 2 * self.board.width() as i64;
        let height2: i64 = 2 * self.board.height() as i64;

        let mut sum_x: i64 = i64::from(cx2) * galaxy_size;
        let mut sum_y: i64 = i64::from(cy2) * galaxy_size;
        for index in cells {
            let pos: Pos = self.board.pos_of(*index);
            let x2: i64 = 2 * i64::from(pos.x) + 1;
            let y2: i64 = 2 * i64::from(pos.y) + 1;
            if self.board.wrapping() {
                sum_x += closest_modulo(i64::from(cx2), x2, width2);
                sum_y += closest_modulo(i64::from(cy2), y2, height2);
            } else {
                sum_x += x2;
                sum_y += y2;
            }
        }

        let count: i64 = galaxy_size + cells.len() as i64;
        if sum_x.rem_euclid(count) != 0 || sum_y.rem_euclid(count) != 0 {
            return None;
        }
        let new_center: Center = Center::from_doubled(
            sum_x.div_euclid(count) as i32,
            sum_y.div_euclid(count) as i32,
        );
        if self.board.wrapping() {
            Some(new_center.wrapped(self.board.width(), self.board.height()))
        } else {
            Some(new_center)
        }
    }

    /// Repeatedly create a galaxy at a random free point and grow it from its frontier.
    fn generate_by_frontier(&mut self) {
        let mut available: BTreeSet<Center> =
            self.candidate_points().iter().map(|c| c.center).collect();

        while !available.is_empty() {
            self.iteration += 1;
            let target_size: usize = self
                .rng
                .random_range(MIN_GROWTH_SIZE..=self.max_galaxy_size.max(MIN_GROWTH_SIZE));

            let points: Vec<Center> = available.iter().copied().collect();
            let Some(center) = points.choose(&mut *self.rng).copied() else {
                break;
            };
            available.remove(&center);

            let Some(id) = self.board.add_galaxy_at(&center) else {
                continue;
            };
            let center: Center = self.board.galaxies()[id].center;
            let center_cells: Vec<usize> = self.board.galaxies()[id]
                .center_cells
                .iter()
                .copied()
                .collect();
            for index in &center_cells {
                self.update_available_centers(&mut available, *index);
            }

            // Due to symmetry, only half of the center cells need processing:
            // the first cell of an edge center, the top row of a corner center.
            let mut to_process: Vec<usize> = center_cells;
            if to_process.len() >= 2 {
                to_process.pop();
            }
            if to_process.len() == 3 {
                to_process.pop();
            }

            while !to_process.is_empty() && self.board.galaxies()[id].cells.len() < target_size {
                let k: usize = self.rng.random_range(0..to_process.len());
                let potential: Vec<usize> = self
                    .board
                    .get_neighbouring_cells(self.board.pos_of(to_process[k]))
                    .into_iter()
                    .filter(|n| {
                        self.board.id_at(*n).is_none()
                            && self
                                .board
                                .get_opposite_index(self.board.pos_of(*n), &center)
                                .is_some_and(|o| self.board.id_at(o).is_none())
                    })
                    .collect();

                // All the neighbours are taken: this cell is done
                let Some(new_cell) = potential.choose(&mut *self.rng).copied() else {
                    to_process.remove(k);
                    continue;
                };
                let new_pos: Pos = self.board.pos_of(new_cell);
                let Some(opposite) = self.board.get_opposite_index(new_pos, &center) else {
                    to_process.remove(k);
                    continue;
                };

                self.board.set_symmetrically_at(new_pos, id, false);
                self.update_available_centers(&mut available, new_cell);
                self.update_available_centers(&mut available, opposite);
                to_process.push(new_cell);
            }
            debug!(
                "Galaxy {id} grown at {center}: {} cells (target {target_size})",
                self.board.galaxies()[id].cells.len()
            );
        }
    }

    /// Remove the points touching the given cell (its corners, edges, and middle) from the
    /// available centers.
    fn update_available_centers(&self, available: &mut BTreeSet<Center>, index: usize) {
        let pos: Pos = self.board.pos_of(index);
        for dy in 0..=2 {
            for dx in 0..=2 {
                let point: Center = Center::from_doubled(2 * pos.x + dx, 2 * pos.y + dy);
                if self.board.wrapping() {
                    available.remove(&point.wrapped(self.board.width(), self.board.height()));
                } else {
                    available.remove(&point);
                }
            }
        }
    }
}

/// Return the value congruent to `value` modulo `modulus` that is the closest to `reference`.
fn closest_modulo(reference: i64, value: i64, modulus: i64) -> i64 {
    let offset: i64 = (value - reference).rem_euclid(modulus);
    if offset * 2 > modulus {
        reference + offset - modulus
    } else {
        reference + offset
    }
}
