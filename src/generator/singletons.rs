/*
singletons.rs

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

//! Merge adjacent galaxies that are reduced to a single cell.
//!
//! Layouts with many one-cell galaxies are tedious to play, so groups of adjacent singletons
//! are replaced by a larger galaxy. The groups are searched in that order:
//!
//! 1. 2x2 squares, which become a galaxy centered on the shared corner.
//! 2. Horizontal runs, which become a galaxy centered on the middle of the run.
//! 3. Vertical runs.

use log::{debug, warn};

use crate::board::{Board, Center, Pos};

/// Group of singleton cells to merge, with the center of the resulting galaxy.
struct Cluster {
    center: Center,
    cells: Vec<usize>,
}

/// Replace the groups of adjacent singleton galaxies by larger galaxies.
///
/// Return the number of galaxies created.
pub fn merge_singletons(board: &mut Board) -> usize {
    let mut singletons: Vec<bool> = vec![false; board.num_cells()];
    for galaxy in board.galaxies() {
        if galaxy.cells.len() == 1
            && let Some(index) = galaxy.cells.first()
        {
            singletons[*index] = true;
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    find_squares(board, &mut singletons, &mut clusters);
    find_runs(board, &mut singletons, &mut clusters, true);
    find_runs(board, &mut singletons, &mut clusters, false);

    let mut to_remove: Vec<usize> = Vec::new();
    let mut merged: usize = 0;
    for cluster in &clusters {
        to_remove.extend(cluster.cells.iter().filter_map(|i| board.id_at(*i)));
        match board.push_galaxy(&cluster.center, &cluster.cells) {
            Some(id) => {
                debug!(
                    "Singletons merged into galaxy {id} at {} ({} cells)",
                    cluster.center,
                    cluster.cells.len()
                );
                merged += 1;
            }
            None => warn!("Cannot merge the singletons around {}", cluster.center),
        }
    }
    board.remove_galaxies(&to_remove);
    merged
}

/// Return the indexes of the cells at the given positions, if they are all singletons.
fn all_singletons(board: &Board, singletons: &[bool], positions: &[Pos]) -> Option<Vec<usize>> {
    let mut cells: Vec<usize> = Vec::with_capacity(positions.len());
    for pos in positions {
        let index: usize = board.index_of(*pos)?;
        if !singletons[index] || cells.contains(&index) {
            return None;
        }
        cells.push(index);
    }
    Some(cells)
}

/// Collect the 2x2 squares of singletons.
fn find_squares(board: &Board, singletons: &mut [bool], clusters: &mut Vec<Cluster>) {
    let width: i32 = board.width() as i32;
    let height: i32 = board.height() as i32;
    let (max_x, max_y): (i32, i32) = if board.wrapping() {
        (width, height)
    } else {
        (width - 1, height - 1)
    };

    for x in 0..max_x {
        for y in 0..max_y {
            let square: [Pos; 4] = [
                Pos::new(x, y),
                Pos::new(x + 1, y),
                Pos::new(x, y + 1),
                Pos::new(x + 1, y + 1),
            ];
            if let Some(cells) = all_singletons(board, singletons, &square) {
                for index in &cells {
                    singletons[*index] = false;
                }
                clusters.push(Cluster {
                    center: Center::from_doubled(2 * x + 2, 2 * y + 2),
                    cells,
                });
            }
        }
    }
}

/// Collect the runs of at least two singletons, horizontally or vertically.
fn find_runs(
    board: &Board,
    singletons: &mut [bool],
    clusters: &mut Vec<Cluster>,
    horizontal: bool,
) {
    // Work in (along, across) coordinates so that both directions share the code
    let (along_size, across_size): (i32, i32) = if horizontal {
        (board.width() as i32, board.height() as i32)
    } else {
        (board.height() as i32, board.width() as i32)
    };
    let to_pos = |along: i32, across: i32| -> Pos {
        if horizontal {
            Pos::new(along, across)
        } else {
            Pos::new(across, along)
        }
    };
    let max_start: i32 = if board.wrapping() {
        along_size
    } else {
        along_size - 1
    };

    for start in 0..max_start {
        for across in 0..across_size {
            let Some(first) = board.index_of(to_pos(start, across)) else {
                continue;
            };
            if !singletons[first] {
                continue;
            }

            let end: i32 = if board.wrapping() {
                start + along_size
            } else {
                along_size
            };
            let mut cells: Vec<usize> = vec![first];
            for along in start + 1..end {
                match board.index_of(to_pos(along, across)) {
                    Some(index) if singletons[index] && !cells.contains(&index) => {
                        cells.push(index)
                    }
                    _ => break,
                }
            }
            if cells.len() < 2 {
                continue;
            }

            for index in &cells {
                singletons[*index] = false;
            }
            let length: i32 = cells.len() as i32;
            let center: Center = if horizontal {
                Center::from_doubled(2 * start + length, 2 * across + 1)
            } else {
                Center::from_doubled(2 * across + 1, 2 * start + length)
            };
            clusters.push(Cluster { center, cells });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_of_singletons(width: usize, height: usize, wrapping: bool) -> Board {
        let mut board: Board = Board::new(width, height, wrapping);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                board.add_galaxy_at(&Center::of_cell(x, y)).unwrap();
            }
        }
        board
    }

    #[test]
    fn squares_first_then_runs() {
        let mut board: Board = board_of_singletons(5, 3, false);
        assert_eq!(merge_singletons(&mut board), 4);

        assert!(board.is_symmetric());
        let centers: Vec<Center> = board.galaxies().iter().map(|g| g.center).collect();
        assert_eq!(
            centers,
            vec![
                Center::new(1.0, 1.0).unwrap(),
                Center::new(3.0, 1.0).unwrap(),
                Center::new(2.5, 2.5).unwrap(),
                Center::new(4.5, 1.0).unwrap(),
            ]
        );
        let sizes: Vec<usize> = board.galaxies().iter().map(|g| g.cells.len()).collect();
        assert_eq!(sizes, vec![4, 4, 5, 2]);
        assert_eq!(board.to_string(), "AABBD\nAABBD\nCCCCC\n");
    }

    #[test]
    fn isolated_singletons_are_kept() {
        let mut board: Board = Board::new(3, 3, false);
        let big: usize = board.add_galaxy_at(&Center::new(1.5, 1.5).unwrap()).unwrap();
        for pos in [Pos::new(1, 0), Pos::new(0, 1)] {
            assert!(board.set_symmetrically_at(pos, big, false));
        }
        board.add_galaxy_at(&Center::of_cell(0, 0)).unwrap();
        board.add_galaxy_at(&Center::of_cell(2, 2)).unwrap();
        board.add_galaxy_at(&Center::of_cell(2, 0)).unwrap();
        board.add_galaxy_at(&Center::of_cell(0, 2)).unwrap();

        assert_eq!(merge_singletons(&mut board), 0);
        assert_eq!(board.galaxies().len(), 5);
    }

    #[test]
    fn runs_wrap_around() {
        let mut board: Board = Board::new(3, 2, true);
        let tall: usize = board.add_galaxy_at(&Center::new(1.5, 1.0).unwrap()).unwrap();
        assert_eq!(board.galaxies()[tall].cells.len(), 2);
        board.add_galaxy_at(&Center::of_cell(0, 0)).unwrap();
        board.add_galaxy_at(&Center::of_cell(2, 0)).unwrap();
        board.add_galaxy_at(&Center::of_cell(0, 1)).unwrap();
        board.add_galaxy_at(&Center::of_cell(2, 1)).unwrap();

        // The four corner cells form a 2x2 square across the border
        assert_eq!(merge_singletons(&mut board), 1);
        assert_eq!(board.galaxies().len(), 2);
        assert!(board.is_symmetric());
        assert_eq!(board.galaxies()[1].center, Center::new(0.0, 1.0).unwrap());
        assert_eq!(board.galaxies()[1].cells.len(), 4);
    }
}
