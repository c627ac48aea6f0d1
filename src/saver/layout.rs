/*
layout.rs

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

//! Save and restore a puzzle, possibly in progress.
//!
//! The saved object is a [`SavedPuzzle`] object in JSON format, built with [`serde`].
//! It stores the galaxy centers, which are enough to start the puzzle again, and the galaxy
//! ID of every cell, so that a game in progress can continue exactly where it was.

use log::debug;
use std::error::Error;
use std::fs::{File, remove_file};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Center, EMPTY};
use crate::puzzle::Puzzle;

/// Serialized form of a [`Puzzle`] object.
///
/// Galaxy IDs are stored as integers, with [`EMPTY`] for the cells that are not assigned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedPuzzle {
    pub width: usize,
    pub height: usize,
    pub wrapping: bool,
    pub centers: Vec<Center>,

    /// Reference solution, when known.
    pub solution: Option<Vec<i32>>,

    /// Current galaxy ID of each cell.
    pub cells: Vec<i32>,
    pub locks: Vec<bool>,
    pub color_ids: Vec<usize>,

    /// When the puzzle was saved.
    pub saved_at: SystemTime,
}

/// Convert a galaxy ID to its saved form.
fn id_to_saved(id: &Option<usize>) -> i32 {
    id.map_or(EMPTY, |id| id as i32)
}

/// Convert a saved galaxy ID back. Negative values other than [`EMPTY`] are invalid.
fn id_from_saved(id: &i32) -> Result<Option<usize>, String> {
    match *id {
        EMPTY => Ok(None),
        id if id >= 0 => Ok(Some(id as usize)),
        id => Err(format!("Invalid galaxy ID: {id}")),
    }
}

impl Puzzle {
    /// Return the serializable form of the puzzle.
    pub fn to_saved(&self) -> SavedPuzzle {
        let board: &Board = self.board();
        SavedPuzzle {
            width: board.width(),
            height: board.height(),
            wrapping: board.wrapping(),
            centers: self.centers().to_vec(),
            solution: self
                .solution()
                .map(|s| s.iter().map(id_to_saved).collect()),
            cells: board.cells().iter().map(|c| id_to_saved(&c.id)).collect(),
            locks: self.locks().to_vec(),
            color_ids: self.color_ids().to_vec(),
            saved_at: SystemTime::now(),
        }
    }

    /// Rebuild a puzzle from its serializable form.
    pub fn from_saved(saved: SavedPuzzle) -> Result<Puzzle, String> {
        let cells: Vec<Option<usize>> = saved
            .cells
            .iter()
            .map(id_from_saved)
            .collect::<Result<_, _>>()?;
        let solution: Option<Vec<Option<usize>>> = match &saved.solution {
            Some(s) => Some(s.iter().map(id_from_saved).collect::<Result<_, _>>()?),
            None => None,
        };

        Puzzle::restore(
            saved.width,
            saved.height,
            saved.wrapping,
            saved.centers,
            solution,
            &cells,
            saved.locks,
            saved.color_ids,
        )
    }
}

/// Serialize a [`Puzzle`] object through its [`SavedPuzzle`] form.
impl Serialize for Puzzle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_saved().serialize(serializer)
    }
}

/// Deserialize a [`Puzzle`] object from its [`SavedPuzzle`] form.
impl<'de> Deserialize<'de> for Puzzle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let saved: SavedPuzzle = SavedPuzzle::deserialize(deserializer)?;
        Puzzle::from_saved(saved).map_err(de::Error::custom)
    }
}

/// Object to save and restore a puzzle.
pub struct SaverLayout {
    /// Path to the save file.
    save_file: PathBuf,
}

impl SaverLayout {
    /// Create a [`SaverLayout`] object for the given file.
    pub fn new(save_file: PathBuf) -> Self {
        debug!("Puzzle file: {save_file:?}");
        SaverLayout { save_file }
    }

    /// Retrieve the saved puzzle, with the time it was saved.
    ///
    /// Return None if there is no saved puzzle.
    pub fn get_saved_puzzle(&self) -> Result<Option<SavedPuzzle>, Box<dyn Error>> {
        let file: File = match File::open(&self.save_file) {
            Ok(f) => f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        };
        let reader: BufReader<File> = BufReader::new(file);
        let saved: SavedPuzzle = serde_json::from_reader(reader)?;
        Ok(Some(saved))
    }

    /// Retrieve the [`Puzzle`] object for the saved puzzle.
    ///
    /// Return the [`Puzzle`] object or None if there is no saved puzzle.
    pub fn get_puzzle(&self) -> Result<Option<Puzzle>, Box<dyn Error>> {
        match self.get_saved_puzzle()? {
            Some(saved) => Ok(Some(Puzzle::from_saved(saved)?)),
            None => Ok(None),
        }
    }

    /// Save the provided [`Puzzle`] object.
    pub fn save_puzzle(&self, puzzle: &Puzzle) -> Result<(), Box<dyn Error>> {
        let file: File = File::create(&self.save_file)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        serde_json::to_writer(&mut writer, puzzle)?;
        writer.flush()?;
        Ok(())
    }

    /// Delete the saved puzzle.
    pub fn delete_save(&self) {
        let _ = remove_file(&self.save_file);
    }
}
