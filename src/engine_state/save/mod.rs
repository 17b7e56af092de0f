//! # Save Module
//!
//! Persists the world as one JSON document: the player pose, inventory, game clock and
//! every resident chunk's voxel bytes.
//!
//! ## Format
//!
//! Field names are camelCase. Voxel data is stored as a plain array of block bytes in
//! chunk layout order; inventory slots store the block byte or `null`.
//!
//! ```json
//! {
//!   "playerPosition": { "x": 0.0, "y": 70.0, "z": 0.0 },
//!   "playerRotation": { "x": 0.0, "y": 0.0 },
//!   "inventory": [{ "blockType": 5, "count": 64 }, ...],
//!   "selectedSlot": 0,
//!   "gameTime": 1200.0,
//!   "chunks": [{ "x": 0, "z": -1, "voxelData": [3, 3, ...], "lastModified": 1700000000000 }],
//!   "worldSeed": 12345,
//!   "version": "1.0.0"
//! }
//! ```
//!
//! A document is only handed out after `WorldSave::validate` accepted it, so restoring a
//! loaded save cannot fail halfway.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::engine_state::{
    player_state::inventory::{Inventory, InventorySlot, HOTBAR_SIZE, INVENTORY_SIZE},
    voxels::{block::block_type::BlockType, chunk::ChunkDimensions},
};

/// Written into every save; older documents without it are still accepted.
pub const SAVE_FORMAT_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Camera rotation: `x` is pitch, `y` is yaw, both in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedRotation {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSlot {
    pub block_type: Option<u8>,
    pub count: u32,
}

impl From<&InventorySlot> for SavedSlot {
    fn from(slot: &InventorySlot) -> Self {
        SavedSlot {
            block_type: slot.block_type.map(BlockType::to_byte),
            count: slot.count,
        }
    }
}

impl From<&SavedSlot> for InventorySlot {
    fn from(slot: &SavedSlot) -> Self {
        InventorySlot {
            block_type: slot.block_type.map(BlockType::from_byte),
            count: slot.count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChunk {
    pub x: i32,
    pub z: i32,
    pub voxel_data: Vec<u8>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_modified: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSave {
    pub player_position: SavedPosition,
    pub player_rotation: SavedRotation,
    pub inventory: Vec<SavedSlot>,
    pub selected_slot: usize,
    pub game_time: f64,
    pub chunks: Vec<SavedChunk>,
    #[serde(default)]
    pub world_seed: u32,
    #[serde(default)]
    pub version: String,
}

impl WorldSave {
    /// Checks that the document can be restored into a world of `dimensions`.
    ///
    /// # Errors
    /// `SaveError::Corrupt` naming the first problem found.
    pub fn validate(&self, dimensions: &ChunkDimensions) -> Result<(), SaveError> {
        let position = self.player_position;
        if ![position.x, position.y, position.z].iter().all(|v| v.is_finite()) {
            return Err(SaveError::Corrupt("player position is not finite".to_string()));
        }
        if !self.game_time.is_finite() {
            return Err(SaveError::Corrupt("game time is not finite".to_string()));
        }
        if self.inventory.len() != INVENTORY_SIZE {
            return Err(SaveError::Corrupt(format!(
                "inventory has {} slots, expected {}",
                self.inventory.len(),
                INVENTORY_SIZE
            )));
        }
        if self.selected_slot >= HOTBAR_SIZE {
            return Err(SaveError::Corrupt(format!(
                "selected slot {} is outside the hotbar",
                self.selected_slot
            )));
        }

        let volume = dimensions.volume();
        let mut seen = HashSet::new();
        for chunk in &self.chunks {
            if chunk.voxel_data.len() != volume {
                return Err(SaveError::Corrupt(format!(
                    "chunk ({}, {}) holds {} voxels, expected {}",
                    chunk.x,
                    chunk.z,
                    chunk.voxel_data.len(),
                    volume
                )));
            }
            if !seen.insert((chunk.x, chunk.z)) {
                return Err(SaveError::Corrupt(format!(
                    "chunk ({}, {}) is stored twice",
                    chunk.x, chunk.z
                )));
            }
        }
        Ok(())
    }

    /// The saved inventory, or `None` if the slots do not form a valid one.
    pub fn inventory(&self) -> Option<Inventory> {
        let slots: Vec<InventorySlot> = self.inventory.iter().map(InventorySlot::from).collect();
        Inventory::from_slots(&slots, self.selected_slot)
    }
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
pub fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    Serialize(serde_json::Error),
    Deserialize(serde_json::Error),
    /// The document parsed but does not describe a valid world.
    Corrupt(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "save file I/O error: {e}"),
            SaveError::Serialize(e) => write!(f, "failed to encode save: {e}"),
            SaveError::Deserialize(e) => write!(f, "failed to decode save: {e}"),
            SaveError::Corrupt(reason) => write!(f, "save is corrupt: {reason}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Serialize(e) | SaveError::Deserialize(e) => Some(e),
            SaveError::Corrupt(_) => None,
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// A save slot on disk.
#[derive(Clone, Debug)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SaveFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `save`, replacing any previous document.
    ///
    /// The JSON goes to a sibling temporary file first and is then renamed over the
    /// target, so a crash mid-write leaves the old save intact.
    pub fn save(&self, save: &WorldSave) -> Result<(), SaveError> {
        let json = serde_json::to_vec(save).map_err(SaveError::Serialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        info!("Saved {} chunks to {}", save.chunks.len(), self.path.display());
        Ok(())
    }

    /// Reads and validates the document.
    ///
    /// # Errors
    /// `Io` if the file cannot be read (including when it does not exist),
    /// `Deserialize` if it is not a save document, `Corrupt` if it fails validation.
    pub fn load(&self, dimensions: &ChunkDimensions) -> Result<WorldSave, SaveError> {
        let text = fs::read_to_string(&self.path)?;
        let save: WorldSave = serde_json::from_str(&text).map_err(SaveError::Deserialize)?;
        save.validate(dimensions)?;
        info!("Loaded {} chunks from {}", save.chunks.len(), self.path.display());
        Ok(save)
    }

    /// Loads the save if there is a usable one.
    ///
    /// # Returns
    /// `None` when there is no save or it could not be used; the caller starts a new
    /// world in that case.
    pub fn load_or_new(&self, dimensions: &ChunkDimensions) -> Option<WorldSave> {
        if !self.exists() {
            info!("No save at {}, starting a new world", self.path.display());
            return None;
        }
        match self.load(dimensions) {
            Ok(save) => Some(save),
            Err(e) => {
                warn!("Ignoring save at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Removes the save. Deleting a save that does not exist is not an error.
    pub fn delete(&self) -> Result<(), SaveError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> ChunkDimensions {
        ChunkDimensions::new(2, 4, 2)
    }

    fn sample() -> WorldSave {
        WorldSave {
            player_position: SavedPosition { x: 1.5, y: 70.0, z: -3.25 },
            player_rotation: SavedRotation { x: -0.5, y: 1.0 },
            inventory: Inventory::starter().slots().iter().map(SavedSlot::from).collect(),
            selected_slot: 2,
            game_time: 1200.0,
            chunks: vec![SavedChunk { x: 0, z: -1, voxel_data: vec![3; 16], last_modified: 7 }],
            world_seed: 12345,
            version: SAVE_FORMAT_VERSION.to_string(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("buckland-save-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn json_uses_camel_case_and_byte_slots() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["selectedSlot"], 2);
        assert_eq!(json["chunks"][0]["voxelData"][0], 3);
        assert_eq!(json["inventory"][0]["blockType"], BlockType::WOOD_PLANK.to_byte());
        assert!(json["inventory"][5]["blockType"].is_null());
    }

    #[test]
    fn validation_rejects_broken_documents() {
        assert!(sample().validate(&dims()).is_ok());

        let mut short_chunk = sample();
        short_chunk.chunks[0].voxel_data.pop();
        assert!(matches!(short_chunk.validate(&dims()), Err(SaveError::Corrupt(_))));

        let mut duplicate = sample();
        duplicate.chunks.push(duplicate.chunks[0].clone());
        assert!(matches!(duplicate.validate(&dims()), Err(SaveError::Corrupt(_))));

        let mut bad_slot = sample();
        bad_slot.selected_slot = HOTBAR_SIZE;
        assert!(matches!(bad_slot.validate(&dims()), Err(SaveError::Corrupt(_))));

        let mut missing_slots = sample();
        missing_slots.inventory.truncate(10);
        assert!(matches!(missing_slots.validate(&dims()), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn saved_inventory_restores() {
        let inventory = sample().inventory().unwrap();
        assert_eq!(inventory.selected_block(), Some(BlockType::COBBLESTONE));
        assert_eq!(inventory.count_of(BlockType::DIRT), 64);
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let file = SaveFile::new(temp_path("round-trip"));
        file.save(&sample()).unwrap();
        assert_eq!(file.load(&dims()).unwrap(), sample());

        file.delete().unwrap();
        assert!(!file.exists());
        assert!(matches!(file.load(&dims()), Err(SaveError::Io(_))));
        assert_eq!(file.load_or_new(&dims()), None);
        file.delete().unwrap();
    }

    #[test]
    fn garbage_falls_back_to_a_new_world() {
        let path = temp_path("garbage");
        fs::write(&path, "{ not json").unwrap();
        let file = SaveFile::new(&path);
        assert!(matches!(file.load(&dims()), Err(SaveError::Deserialize(_))));
        assert_eq!(file.load_or_new(&dims()), None);
        file.delete().unwrap();
    }
}
