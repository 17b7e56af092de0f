//! # Player State
//!
//! The player controller: walking, jumping and gravity with simple vertical ground
//! snapping, the block the crosshair points at, and mining/placing against the world.
//!
//! ## Per-tick Order
//! 1. Hotbar selection
//! 2. Look and walk input from the camera controller
//! 3. Jump, gravity and integration
//! 4. Ground snapping against the block under the feet, or the fallback ground plane
//! 5. Ray cast from the eye along the view direction
//! 6. Mine, then place; both share one cooldown timestamp
//!
//! There is no horizontal collision.

pub mod crafting;
pub mod inventory;

use cgmath::{Point3, Rad, Vector3};
use log::info;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::engine_state::{
    camera_state::CameraState,
    voxels::{
        block::{self, block_side::BlockSide, block_type::BlockType},
        raycast::{self, RayHit},
        world::World,
    },
};

use inventory::Inventory;

pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_SPEED: f32 = 5.0;
pub const JUMP_FORCE: f32 = 8.0;
pub const GRAVITY: f32 = -20.0;
pub const REACH: f32 = 5.0;
pub const ACTION_COOLDOWN_MS: u64 = 200;
/// World Y of the ground plane the player stands on where no solid block is below.
pub const FALLBACK_GROUND: f32 = 64.0;
/// Where a new world puts the player's eye.
pub const SPAWN_POSITION: [f32; 3] = [0.0, 70.0, 0.0];
/// Half the player's width.
const HALF_WIDTH: f32 = 0.3;
/// Player box extent above the eye.
const HEAD_ROOM: f32 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Eye height above the feet
    pub height: f32,
    pub speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    /// Ray cast length for mining and placing
    pub reach: f32,
    /// Minimum time between two block actions, mine or place
    pub action_cooldown_ms: u64,
    pub fallback_ground: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            jump_force: JUMP_FORCE,
            gravity: GRAVITY,
            reach: REACH,
            action_cooldown_ms: ACTION_COOLDOWN_MS,
            fallback_ground: FALLBACK_GROUND,
        }
    }
}

/// Input for one tick, already resolved from whatever devices produced it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerAction {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub mine: bool,
    pub place: bool,
    /// Look delta (x right, y down)
    pub rotate_view: Option<(f64, f64)>,
    /// Hotbar slot to select
    pub select_slot: Option<usize>,
}

/// A block edit made by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockEdit {
    Mined {
        position: Point3<i32>,
        block_type: BlockType,
    },
    Placed {
        position: Point3<i32>,
        block_type: BlockType,
    },
}

pub struct PlayerState {
    pub camera_state: CameraState,
    pub velocity: Vector3<f32>,
    pub on_ground: bool,
    pub inventory: Inventory,
    /// Block under the crosshair as of the last tick
    pub target: Option<RayHit>,
    config: PlayerConfig,
    /// Time simulated so far; the cooldown is measured on this clock
    elapsed: Duration,
    last_action: Option<Duration>,
}

impl PlayerState {
    /// A player at the spawn point with the starter inventory.
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_pose(config, SPAWN_POSITION.into(), Rad(0.0), Rad(0.0), Inventory::starter())
    }

    pub fn with_pose(
        config: PlayerConfig,
        position: Point3<f32>,
        yaw: Rad<f32>,
        pitch: Rad<f32>,
        inventory: Inventory,
    ) -> Self {
        PlayerState {
            camera_state: CameraState::new(position, yaw, pitch),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            on_ground: false,
            inventory,
            target: None,
            config,
            elapsed: Duration::ZERO,
            last_action: None,
        }
    }

    /// Eye position.
    pub fn position(&self) -> Point3<f32> {
        self.camera_state.camera.position
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Advances the player by `dt` and applies its block actions to `world`.
    ///
    /// # Returns
    /// The block edit made this tick, if any.
    pub fn update(&mut self, actions: &PlayerAction, dt: Duration, world: &mut World) -> Option<BlockEdit> {
        self.elapsed += dt;
        let dt = dt.as_secs_f32();

        if let Some(slot) = actions.select_slot {
            self.inventory.select(slot);
        }

        self.camera_state.intake_actions(actions);
        let direction = self.camera_state.update() * self.config.speed;
        self.velocity.x = direction.x;
        self.velocity.z = direction.z;

        if actions.jump && self.on_ground {
            self.velocity.y = self.config.jump_force;
            self.on_ground = false;
        }

        self.velocity.y += self.config.gravity * dt;
        self.camera_state.camera.position += self.velocity * dt;
        self.snap_to_ground(world);

        let camera = &self.camera_state.camera;
        self.target = raycast::cast(camera.position, camera.get_view_vec(), self.config.reach, |x, y, z| {
            world.get_voxel(x, y, z)
        });

        let mut edit = None;
        if actions.mine {
            edit = self.mine(world);
        }
        if actions.place {
            edit = self.place(world).or(edit);
        }
        edit
    }

    fn snap_to_ground(&mut self, world: &World) {
        let height = self.config.height;
        let position = &mut self.camera_state.camera.position;
        let feet = (position.y - height).floor();
        let below = world.get_voxel(position.x.floor() as i32, feet as i32, position.z.floor() as i32);

        let rest = if block::is_solid(below) {
            feet + 1.0 + height
        } else {
            self.config.fallback_ground + height
        };
        if position.y < rest {
            position.y = rest;
            self.velocity.y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }
    }

    fn action_ready(&self) -> bool {
        let cooldown = Duration::from_millis(self.config.action_cooldown_ms);
        self.last_action
            .map_or(true, |last| self.elapsed.saturating_sub(last) > cooldown)
    }

    fn mine(&mut self, world: &mut World) -> Option<BlockEdit> {
        let hit = self.target?;
        if !self.action_ready() {
            return None;
        }
        self.last_action = Some(self.elapsed);

        let position = hit.position;
        if !world.set_voxel(position.x, position.y, position.z, BlockType::AIR) {
            return None;
        }
        for drop in block::get_drops(hit.block_type) {
            self.inventory.add(drop.block_type, drop.count);
        }
        info!("Mined {:?} at {:?}", hit.block_type, position);
        Some(BlockEdit::Mined {
            position,
            block_type: hit.block_type,
        })
    }

    fn place(&mut self, world: &mut World) -> Option<BlockEdit> {
        let hit = self.target?;
        if !self.action_ready() {
            return None;
        }
        let block_type = self.inventory.selected_block()?;
        self.last_action = Some(self.elapsed);

        let position = hit.adjacent();
        if self.intersects_block(position) {
            return None;
        }
        if !world.set_voxel(position.x, position.y, position.z, block_type) {
            return None;
        }
        self.inventory.remove(self.inventory.selected_slot(), 1);
        info!(
            "Placed {:?} at {:?} against the {:?} face of {:?}",
            block_type,
            position,
            BlockSide::from_normal(hit.normal),
            hit.position
        );
        Some(BlockEdit::Placed {
            position,
            block_type,
        })
    }

    /// `true` if the unit block at `voxel` touches or overlaps the player's box.
    fn intersects_block(&self, voxel: Point3<i32>) -> bool {
        let eye = self.position();
        let min = Point3::new(eye.x - HALF_WIDTH, eye.y - self.config.height, eye.z - HALF_WIDTH);
        let max = Point3::new(eye.x + HALF_WIDTH, eye.y + HEAD_ROOM, eye.z + HALF_WIDTH);
        let block_min = voxel.cast::<f32>().unwrap_or(Point3::new(f32::NAN, f32::NAN, f32::NAN));

        min.x <= block_min.x + 1.0
            && max.x >= block_min.x
            && min.y <= block_min.y + 1.0
            && max.y >= block_min.y
            && min.z <= block_min.z + 1.0
            && max.z >= block_min.z
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Point2};

    use super::*;
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    const TICK: Duration = Duration::from_millis(50);

    /// World Y of the top of the test floor.
    const FLOOR: f32 = 70.0;

    /// One chunk at the origin with a two-block stone floor whose top is at `FLOOR`.
    fn floor_world() -> World {
        let dims = ChunkDimensions::new(16, 96, 16);
        let mut world = World::new(dims);
        world.put_chunk(Point2::new(0, 0), dims.air_array()).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                world.set_voxel(x, 68, z, BlockType::STONE);
                world.set_voxel(x, 69, z, BlockType::STONE);
            }
        }
        world.flush_changes();
        world
    }

    fn player_at(position: Point3<f32>, pitch: Deg<f32>) -> PlayerState {
        PlayerState::with_pose(PlayerConfig::default(), position, Rad(0.0), pitch.into(), Inventory::starter())
    }

    #[test]
    fn falls_onto_the_block_below() {
        let mut world = floor_world();
        let mut player = player_at(Point3::new(8.5, FLOOR + 2.5, 8.5), Deg(0.0));

        for _ in 0..20 {
            player.update(&PlayerAction::default(), TICK, &mut world);
        }
        assert!(player.on_ground);
        assert!((player.position().y - (FLOOR + PLAYER_HEIGHT)).abs() < 1e-4);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn fallback_ground_catches_the_player_outside_the_world() {
        let mut world = World::new(ChunkDimensions::default());
        let mut player = PlayerState::new(PlayerConfig::default());

        for _ in 0..40 {
            player.update(&PlayerAction::default(), TICK, &mut world);
        }
        assert!(player.on_ground);
        assert!((player.position().y - (FALLBACK_GROUND + PLAYER_HEIGHT)).abs() < 1e-4);
    }

    #[test]
    fn jumping_needs_ground() {
        let mut world = World::new(ChunkDimensions::default());
        let mut player = PlayerState::new(PlayerConfig::default());
        let jump = PlayerAction { jump: true, ..Default::default() };

        player.update(&jump, TICK, &mut world);
        assert!(player.velocity.y < 0.0, "airborne players cannot jump");

        for _ in 0..40 {
            player.update(&PlayerAction::default(), TICK, &mut world);
        }
        player.update(&jump, TICK, &mut world);
        assert!(player.velocity.y > 0.0);
        assert!(!player.on_ground);
    }

    #[test]
    fn walking_moves_along_the_view() {
        let mut world = World::new(ChunkDimensions::default());
        let mut player = player_at(Point3::new(0.0, FALLBACK_GROUND + PLAYER_HEIGHT, 0.0), Deg(0.0));
        let forward = PlayerAction { move_forward: true, ..Default::default() };

        for _ in 0..20 {
            player.update(&forward, TICK, &mut world);
        }
        assert!((player.position().x - PLAYER_SPEED).abs() < 1e-3);
        assert!(player.position().z.abs() < 1e-4);
    }

    #[test]
    fn mining_removes_the_block_and_collects_drops() {
        let mut world = floor_world();
        let mut player = player_at(Point3::new(8.5, FLOOR + PLAYER_HEIGHT, 8.5), Deg(-89.0));
        let mine = PlayerAction { mine: true, ..Default::default() };

        let edit = player.update(&mine, TICK, &mut world);
        assert_eq!(
            edit,
            Some(BlockEdit::Mined { position: Point3::new(8, 69, 8), block_type: BlockType::STONE })
        );
        assert_eq!(world.get_voxel(8, 69, 8), BlockType::AIR);
        assert_eq!(player.inventory.count_of(BlockType::COBBLESTONE), 65);
    }

    #[test]
    fn mine_and_place_share_one_cooldown() {
        let mut world = floor_world();
        let mut player = player_at(Point3::new(8.5, FLOOR + PLAYER_HEIGHT, 8.5), Deg(-89.0));
        let mine = PlayerAction { mine: true, ..Default::default() };

        assert!(player.update(&mine, TICK, &mut world).is_some());
        // The block below is in reach again, but the cooldown has not run out.
        let mut edits = 1;
        for _ in 0..3 {
            if player.update(&mine, TICK, &mut world).is_some() {
                edits += 1;
            }
        }
        assert_eq!(edits, 1, "150 ms is inside the cooldown");

        let both = PlayerAction { mine: true, place: true, ..Default::default() };
        let mut player = player_at(Point3::new(8.5, FLOOR + PLAYER_HEIGHT, 8.5), Deg(-89.0));
        let mut world = floor_world();
        let edit = player.update(&both, TICK, &mut world);
        assert!(matches!(edit, Some(BlockEdit::Mined { .. })), "place is blocked by the mine");
    }

    #[test]
    fn placing_inside_the_player_is_refused() {
        let mut world = floor_world();
        let mut player = player_at(Point3::new(8.5, FLOOR + PLAYER_HEIGHT, 8.5), Deg(-89.0));
        let place = PlayerAction { place: true, ..Default::default() };

        // The face under the feet points up into the player's box.
        assert_eq!(player.update(&place, TICK, &mut world), None);
        assert_eq!(world.get_voxel(8, 70, 8), BlockType::AIR);
        assert_eq!(player.inventory.count_of(BlockType::WOOD_PLANK), 64);
    }

    #[test]
    fn placing_in_front_uses_the_selected_block() {
        let mut world = floor_world();
        // Looking down at the floor two blocks ahead.
        let mut player = player_at(Point3::new(6.5, FLOOR + PLAYER_HEIGHT, 8.5), Deg(-30.0));
        let place = PlayerAction { place: true, select_slot: Some(1), ..Default::default() };

        let edit = player.update(&place, TICK, &mut world);
        let Some(BlockEdit::Placed { position, block_type }) = edit else {
            panic!("expected a placement, got {edit:?}");
        };
        assert_eq!(block_type, BlockType::DIRT);
        assert_eq!(position, Point3::new(9, 70, 8));
        assert_eq!(world.get_voxel(position.x, position.y, position.z), BlockType::DIRT);
        assert_eq!(player.inventory.count_of(BlockType::DIRT), 63);
    }
}
