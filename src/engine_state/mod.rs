//! # Engine State Module
//!
//! The core engine module that owns the world and drives it one tick at a time.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Viewer position and orientation
//! * `orchestrator` - Chunk residency and the render list around the viewer
//! * `overlay` - Real-world footprints and the providers that supply them
//! * `player_state` - Player controller, inventory and crafting
//! * `rendering` - Chunk meshing and the per-chunk mesh cache
//! * `save` - The JSON save document
//! * `task_management` - Background workers for generation, overlay fetch and meshing
//! * `voxels` - Blocks, chunks, the world store, terrain and ray casting
//!
//! ## Architecture
//!
//! `EngineState` is the central coordinator. It is the only owner of the `World`;
//! background tasks work on snapshots and hand their results back through
//! `TaskContext`, so every chunk mutation happens on the thread that calls `tick`.
//!
//! ## Tick Order
//!
//! 1. Apply finished task results (generated chunks, overlay, meshes)
//! 2. Update the player: movement, ray cast, mining and placing
//! 3. Recompute residency if the viewer changed chunk
//! 4. Flush chunk change notifications
//! 5. Schedule mesh rebuilds for rendered chunks that are dirty or unmeshed
//! 6. Hand queued tasks to free workers
//! 7. Advance the game clock

use std::path::Path;

use cgmath::{Point2, Point3, Rad};
use log::{info, warn};
use web_time::Duration;

use overlay::{CachedOverlayProvider, OverlayConfig, OverlayProvider, StaticOverlayProvider};
use player_state::{BlockEdit, PlayerAction, PlayerConfig, PlayerState};
use rendering::meshing::{Mesh, MeshManager};
use save::{
    timestamp_millis, SaveError, SavedChunk, SavedPosition, SavedRotation, SavedSlot, WorldSave,
    SAVE_FORMAT_VERSION,
};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    generation::terrain::TerrainGenerator,
    tasks::overlay_fetch_task::{OverlayFetchTask, SharedOverlayProvider},
    world::World,
};

use crate::{config::EngineConfig, core::MtResource};

pub mod camera_state;
pub mod orchestrator;
pub mod overlay;
pub mod player_state;
pub mod rendering;
pub mod save;
pub mod task_management;
pub mod voxels;

use orchestrator::WorldOrchestrator;

/// Game time units per real second.
pub const TIME_SCALE: f64 = 100.0;
/// Length of one in-game day; the clock wraps here.
pub const DAY_LENGTH: f64 = 24000.0;

/// Time of day in game units, always in `[0, DAY_LENGTH)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameClock {
    time: f64,
}

impl GameClock {
    pub fn new(time: f64) -> Self {
        GameClock {
            time: time.rem_euclid(DAY_LENGTH),
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.time = (self.time + dt.as_secs_f64() * TIME_SCALE).rem_euclid(DAY_LENGTH);
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

/// The main state container for the voxel engine
///
/// # Examples
///
/// ```
/// use buckland_blocks::config::EngineConfig;
/// use buckland_blocks::engine_state::{player_state::PlayerAction, EngineState};
/// use web_time::Duration;
///
/// let config = EngineConfig {
///     view_distance: 1,
///     worker_threads: 0,
///     ..Default::default()
/// };
/// let mut engine = EngineState::new(&config);
///
/// for _ in 0..3 {
///     engine.tick(&PlayerAction::default(), Duration::from_millis(16));
/// }
/// assert_eq!(engine.world.chunk_count(), 9);
/// ```
pub struct EngineState {
    /// The voxel world containing all chunk data
    pub world: World,
    /// Cached chunk meshes and in-flight rebuilds
    pub mesh_manager: MeshManager,
    /// Residency around the viewer
    pub orchestrator: WorldOrchestrator,
    /// Task manager for background work
    pub task_manager: TaskManager,
    pub player: PlayerState,
    pub clock: GameClock,
    overlay_provider: Option<SharedOverlayProvider>,
    overlay_config: Option<OverlayConfig>,
    player_config: PlayerConfig,
    seed: u32,
}

impl EngineState {
    /// Creates an engine for `config`, building the overlay provider from the
    /// configured footprint file when there is one.
    pub fn new(config: &EngineConfig) -> Self {
        let provider = config
            .overlay
            .as_ref()
            .and_then(|overlay| overlay.footprints_file.as_deref())
            .and_then(|path| match StaticOverlayProvider::from_file(path) {
                Ok(provider) => Some(Box::new(provider) as Box<dyn OverlayProvider>),
                Err(e) => {
                    warn!("Overlay footprints unavailable, using terrain only: {}", e);
                    None
                }
            });
        Self::with_overlay_provider(config, provider)
    }

    /// Creates an engine with an explicit overlay provider.
    ///
    /// The provider is only used when `config.overlay` is set; the first overlay
    /// fetch is published immediately.
    pub fn with_overlay_provider(config: &EngineConfig, provider: Option<Box<dyn OverlayProvider>>) -> Self {
        let generator = TerrainGenerator::new(config.seed, config.terrain.clone());
        let overlay_config = config.overlay.clone();

        let overlay_provider = match (&overlay_config, provider) {
            (Some(overlay), Some(provider)) => {
                let cached = CachedOverlayProvider::new(
                    provider,
                    overlay.cache_capacity,
                    Duration::from_secs(overlay.cache_ttl_secs),
                );
                Some(MtResource::new(Box::new(cached) as Box<dyn OverlayProvider>))
            }
            _ => None,
        };

        let mut engine = EngineState {
            world: World::new(config.chunk),
            mesh_manager: MeshManager::new(config.view_distance),
            orchestrator: WorldOrchestrator::new(generator, config.chunk, config.view_distance),
            task_manager: TaskManager::new(config.worker_threads),
            player: PlayerState::new(config.player.clone()),
            clock: GameClock::default(),
            overlay_provider,
            overlay_config,
            player_config: config.player.clone(),
            seed: config.seed,
        };
        engine.request_overlay();
        engine
    }

    /// Publishes an overlay fetch, superseding any earlier one.
    ///
    /// # Returns
    /// `false` if no overlay is configured.
    pub fn request_overlay(&mut self) -> bool {
        let (Some(provider), Some(overlay)) = (&self.overlay_provider, &self.overlay_config) else {
            return false;
        };
        let request_id = self.orchestrator.begin_overlay_request();
        info!("Requesting overlay #{} for {:?}", request_id, overlay.address);
        self.task_manager.publish_task(Box::new(OverlayFetchTask::new(
            request_id,
            provider.clone(),
            overlay.address.clone(),
            overlay.radius_metres,
        )));
        true
    }

    /// Advances the engine by one tick.
    ///
    /// # Arguments
    /// * `actions` - Player input for this tick
    /// * `dt` - Simulated time since the previous tick
    ///
    /// # Returns
    /// The block the player mined or placed this tick, if any.
    pub fn tick(&mut self, actions: &PlayerAction, dt: Duration) -> Option<BlockEdit> {
        self.process_completed_tasks();

        let edit = self.player.update(actions, dt, &mut self.world);

        self.orchestrator
            .update(self.player.position(), &self.world, &mut self.task_manager);

        self.world.flush_changes();

        self.mesh_manager.schedule_rebuilds(
            self.orchestrator.rendered(),
            &mut self.world,
            &mut self.task_manager,
        );
        self.task_manager.process_queued_tasks();

        self.clock.advance(dt);
        edit
    }

    /// Applies every finished background result.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut context = TaskContext {
            world: &mut self.world,
            mesh_manager: &mut self.mesh_manager,
            orchestrator: &mut self.orchestrator,
        };
        self.task_manager.process_completed_tasks(&mut context)
    }

    /// `true` when no background work is queued, running or waiting to be applied.
    pub fn is_idle(&self) -> bool {
        self.task_manager.outstanding() == 0
    }

    /// The meshes to draw this frame with their chunk origins, nearest chunk first.
    /// Chunks without a mesh yet are skipped.
    pub fn render_list(&mut self) -> Vec<(Point3<i32>, &Mesh)> {
        self.mesh_manager.meshes_for(self.orchestrator.rendered())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Captures the player and every resident chunk as a save document.
    pub fn snapshot(&self) -> WorldSave {
        let camera = &self.player.camera_state.camera;
        let now = timestamp_millis();

        let mut chunks: Vec<SavedChunk> = self
            .world
            .chunks()
            .map(|chunk| SavedChunk {
                x: chunk.position.x,
                z: chunk.position.y,
                voxel_data: chunk.voxels().to_vec(),
                last_modified: now,
            })
            .collect();
        chunks.sort_by_key(|chunk| (chunk.x, chunk.z));

        WorldSave {
            player_position: SavedPosition {
                x: camera.position.x,
                y: camera.position.y,
                z: camera.position.z,
            },
            player_rotation: SavedRotation {
                x: camera.pitch.0,
                y: camera.yaw.0,
            },
            inventory: self.player.inventory.slots().iter().map(SavedSlot::from).collect(),
            selected_slot: self.player.inventory.selected_slot(),
            game_time: self.clock.time(),
            chunks,
            world_seed: self.seed,
            version: SAVE_FORMAT_VERSION.to_string(),
        }
    }

    /// Replaces the world and player with a save document.
    ///
    /// Nothing changes unless the whole document is valid. Cached meshes are dropped
    /// and residency is recomputed on the next tick.
    ///
    /// # Errors
    /// `SaveError::Corrupt` if the document does not fit this world.
    pub fn restore(&mut self, save: &WorldSave) -> Result<(), SaveError> {
        save.validate(self.world.dimensions())?;
        let inventory = save
            .inventory()
            .ok_or_else(|| SaveError::Corrupt("inventory cannot be restored".to_string()))?;
        if save.world_seed != 0 && save.world_seed != self.seed {
            warn!(
                "Save was made with seed {}, new chunks use seed {}",
                save.world_seed, self.seed
            );
        }

        self.world.clear();
        for chunk in &save.chunks {
            self.world
                .put_chunk(Point2::new(chunk.x, chunk.z), chunk.voxel_data.clone())
                .map_err(|e| SaveError::Corrupt(e.to_string()))?;
        }
        self.world.flush_changes();

        let position = save.player_position;
        self.player = PlayerState::with_pose(
            self.player_config.clone(),
            Point3::new(position.x, position.y, position.z),
            Rad(save.player_rotation.y),
            Rad(save.player_rotation.x),
            inventory,
        );
        self.clock = GameClock::new(save.game_time);
        self.mesh_manager.clear();
        self.orchestrator.invalidate();

        info!("Restored {} chunks", save.chunks.len());
        Ok(())
    }

    /// Restores from `path` if it holds a usable save.
    ///
    /// # Returns
    /// `true` if a save was restored.
    pub fn restore_from(&mut self, path: &Path) -> bool {
        let file = save::SaveFile::new(path);
        match file.load_or_new(self.world.dimensions()) {
            Some(save) => match self.restore(&save) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Could not restore {}: {}", path.display(), e);
                    false
                }
            },
            None => false,
        }
    }
}
