use crate::constants::{GRID_COLS, SAMPLE_INSET, TILE_SIZE, TUNNEL_ROW};
use crate::maze::{tile_coords, Maze};
use crate::types::Direction;

pub fn dir_offset(dir: Direction) -> (f32, f32) {
    match dir {
        Direction::Up => (0.0, -1.0),
        Direction::Down => (0.0, 1.0),
        Direction::Left => (-1.0, 0.0),
        Direction::Right => (1.0, 0.0),
        Direction::None => (0.0, 0.0),
    }
}

pub fn snap_to_tile(value: f32) -> f32 {
    (value / TILE_SIZE).round() * TILE_SIZE
}

pub fn at_decision_point(x: f32, y: f32, speed: f32) -> bool {
    (x - snap_to_tile(x)).abs() < speed && (y - snap_to_tile(y)).abs() < speed
}

pub fn position_clear(maze: &Maze, x: f32, y: f32, for_adversary: bool) -> bool {
    let near = SAMPLE_INSET;
    let far = TILE_SIZE - SAMPLE_INSET;
    let half = TILE_SIZE / 2.0;
    let samples = [
        (x + half, y + half),
        (x + near, y + near),
        (x + far, y + near),
        (x + near, y + far),
        (x + far, y + far),
    ];
    samples
        .iter()
        .all(|&(sx, sy)| !maze.is_wall(sx, sy, for_adversary))
}

pub fn try_advance(
    maze: &Maze,
    x: f32,
    y: f32,
    dir: Direction,
    speed: f32,
    for_adversary: bool,
) -> Option<(f32, f32)> {
    let (ox, oy) = dir_offset(dir);
    if ox == 0.0 && oy == 0.0 {
        return None;
    }
    let mut nx = x + ox * speed;
    let mut ny = y + oy * speed;
    if ox != 0.0 {
        let snapped = snap_to_tile(ny);
        if (ny - snapped).abs() <= speed {
            ny = snapped;
        }
    } else {
        let snapped = snap_to_tile(nx);
        if (nx - snapped).abs() <= speed {
            nx = snapped;
        }
    }
    if position_clear(maze, nx, ny, for_adversary) {
        Some((nx, ny))
    } else {
        None
    }
}

pub fn wrap_tunnel(x: f32, y: f32) -> f32 {
    let (_, row) = tile_coords(x + TILE_SIZE / 2.0, y + TILE_SIZE / 2.0);
    if row != TUNNEL_ROW {
        return x;
    }
    if x <= -TILE_SIZE {
        return (GRID_COLS - 1) as f32 * TILE_SIZE;
    }
    if x >= GRID_COLS as f32 * TILE_SIZE {
        return -TILE_SIZE;
    }
    x
}
