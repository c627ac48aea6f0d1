/*
fixtures.rs

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

//! Hand-made layouts shared by the unit tests.

use crate::board::{Board, Center, Pos};

/// Centers of the 5x5 reference layout.
pub(crate) const REFERENCE_CENTERS: [(f64, f64); 5] =
    [(2.5, 0.5), (0.5, 2.0), (2.0, 4.5), (2.5, 2.5), (4.5, 2.5)];

/// Solution of the 5x5 reference layout, one letter per galaxy.
pub(crate) const REFERENCE_SOLUTION: [&str; 5] = ["BAAAE", "BDDDE", "BDDDE", "BDDDE", "CCCCE"];

/// Return the centers of the reference layout.
pub(crate) fn reference_centers() -> Vec<Center> {
    REFERENCE_CENTERS
        .iter()
        .map(|(x, y)| Center::new(*x, *y).unwrap())
        .collect()
}

/// Build the solved reference layout.
pub(crate) fn reference_board() -> Board {
    let mut board: Board = Board::new(5, 5, false);
    for center in reference_centers() {
        board.add_galaxy_at(&center).unwrap();
    }
    for (y, row) in REFERENCE_SOLUTION.iter().enumerate() {
        for (x, letter) in row.bytes().enumerate() {
            let index: usize = board.index_of(Pos::new(x as i32, y as i32)).unwrap();
            board.set_at(index, usize::from(letter - b'A'));
        }
    }
    board
}
