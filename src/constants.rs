use crate::types::{CutsceneKind, Difficulty, FruitKind, GhostKind};

pub const TICK_RATE: u32 = 60;
pub const STEP_MS: f32 = 1000.0 / TICK_RATE as f32;
pub const MAX_CATCHUP_STEPS: u32 = 8;

pub const TILE_SIZE: f32 = 16.0;
pub const GRID_COLS: i32 = 28;
pub const GRID_ROWS: i32 = 31;
pub const SAMPLE_INSET: f32 = 4.0;

pub const TUNNEL_ROW: i32 = 14;
pub const TUNNEL_WEST_END_COL: i32 = 6;
pub const TUNNEL_EAST_START_COL: i32 = 22;

pub const PLAYER_BASE_SPEED: f32 = 2.0;
pub const GHOST_BASE_SPEED: f32 = 2.0;
pub const FRIGHT_SPEED: f32 = 1.0;
pub const EATEN_SPEED: f32 = 4.0;
pub const TUNNEL_SPEED_FACTOR: f32 = 0.5;
pub const MOUTH_ANIM_RATE: f32 = 0.15;

pub const SCATTER_MS: f32 = 7_000.0;
pub const CHASE_MS: f32 = 20_000.0;
pub const FRIGHT_BLINK_MS: f32 = 2_000.0;

pub const STARTING_MS: f32 = 2_000.0;
pub const DYING_MS: f32 = 1_500.0;
pub const LEVEL_CLEAR_MS: f32 = 2_000.0;
pub const CUTSCENE_MS: f32 = 5_000.0;
pub const FRUIT_VISIBLE_MS: f32 = 10_000.0;

pub const DOT_SCORE: i32 = 10;
pub const POWER_PELLET_SCORE: i32 = 50;
pub const GHOST_BASE_SCORE: i32 = 200;
pub const MAX_LIVES: i32 = 5;
pub const KILL_SCREEN_LEVEL: u32 = 256;

pub const FRUIT_DOT_TRIGGERS: [i32; 2] = [70, 170];
pub const FRUIT_SPAWN_X: f32 = 14.0 * TILE_SIZE;
pub const FRUIT_SPAWN_Y: f32 = 17.5 * TILE_SIZE;

pub const PLAYER_SPAWN_X: f32 = 14.0 * TILE_SIZE;
pub const PLAYER_SPAWN_Y: f32 = 23.0 * TILE_SIZE;

pub const GHOST_HOUSE_DOOR_X: f32 = 14.0 * TILE_SIZE;
pub const GHOST_HOME_X: f32 = 14.0 * TILE_SIZE;
pub const GHOST_HOME_Y: f32 = 14.0 * TILE_SIZE;

pub const GHOST_UPDATE_ORDER: [GhostKind; 4] = [
    GhostKind::Blinky,
    GhostKind::Pinky,
    GhostKind::Inky,
    GhostKind::Clyde,
];

pub fn get_spawn_px(kind: GhostKind) -> (f32, f32) {
    match kind {
        GhostKind::Blinky => (14.0 * TILE_SIZE, 11.0 * TILE_SIZE),
        GhostKind::Pinky => (14.0 * TILE_SIZE, 14.0 * TILE_SIZE),
        GhostKind::Inky => (12.0 * TILE_SIZE, 14.0 * TILE_SIZE),
        GhostKind::Clyde => (16.0 * TILE_SIZE, 14.0 * TILE_SIZE),
    }
}

pub fn get_scatter_corner_px(kind: GhostKind) -> (f32, f32) {
    match kind {
        GhostKind::Blinky => (25.0 * TILE_SIZE, 0.0),
        GhostKind::Pinky => (0.0, 0.0),
        GhostKind::Inky => (27.0 * TILE_SIZE, 30.0 * TILE_SIZE),
        GhostKind::Clyde => (0.0, 30.0 * TILE_SIZE),
    }
}

pub fn get_exit_delay_ms(kind: GhostKind) -> f32 {
    match kind {
        GhostKind::Blinky => 0.0,
        GhostKind::Pinky => 3_000.0,
        GhostKind::Inky => 6_000.0,
        GhostKind::Clyde => 9_000.0,
    }
}

pub fn get_difficulty_multiplier(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 0.8,
        Difficulty::Normal => 1.0,
        Difficulty::Hard => 1.2,
    }
}

pub fn get_elroy_speed_factor(remaining_dots: i32) -> f32 {
    if remaining_dots <= 10 {
        return 1.3;
    }
    if remaining_dots <= 20 {
        return 1.15;
    }
    1.0
}

pub fn get_ghost_eat_score(streak: u32) -> i32 {
    GHOST_BASE_SCORE << streak.min(8)
}

pub fn get_fruit_for_level(level: u32) -> (FruitKind, i32) {
    match level {
        0 | 1 => (FruitKind::Cherry, 100),
        2 => (FruitKind::Strawberry, 300),
        3 | 4 => (FruitKind::Orange, 500),
        5 | 6 => (FruitKind::Apple, 700),
        7 | 8 => (FruitKind::Melon, 1_000),
        9 | 10 => (FruitKind::Galaxian, 2_000),
        11 | 12 => (FruitKind::Bell, 3_000),
        _ => (FruitKind::Key, 5_000),
    }
}

pub fn get_cutscene_for_level(level: u32) -> Option<CutsceneKind> {
    match level {
        2 => Some(CutsceneKind::BlinkyChase),
        5 => Some(CutsceneKind::NailGhost),
        9 => Some(CutsceneKind::GiantPackman),
        _ => None,
    }
}
