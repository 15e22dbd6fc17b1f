//! Heuristic steering for headless sessions: chase vulnerable adversaries
//! while a fright window is open, flee nearby hostiles, otherwise head for
//! the closest remaining dot.

use crate::constants::{STEP_MS, TILE_SIZE};
use crate::io::InputSource;
use crate::maze::Maze;
use crate::motion::try_advance;
use crate::rng::Rng;
use crate::types::{Direction, GhostMode, PlayerView, Snapshot, Vec2};

const DANGER_RANGE_TILES: f32 = 4.0;
const CHASE_MIN_FRIGHT_MS: f32 = 1_000.0;

pub struct Autopilot {
    rng: Rng,
    desired: Direction,
    think_in_ms: f32,
}

impl Autopilot {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed),
            desired: Direction::None,
            think_in_ms: 0.0,
        }
    }

    // Re-plans on a jittered cadence rather than every tick, so the steering
    // commits to corridors instead of dithering at intersections.
    pub fn observe(&mut self, snapshot: &Snapshot, maze: &Maze) {
        self.think_in_ms -= STEP_MS;
        if self.think_in_ms > 0.0 {
            return;
        }
        self.think_in_ms = self.rng.int(90, 190) as f32;
        self.desired = self.decide(snapshot, maze);
    }

    fn decide(&mut self, snapshot: &Snapshot, maze: &Maze) -> Direction {
        let player = &snapshot.player;

        if snapshot.fright_ms_left > CHASE_MIN_FRIGHT_MS {
            if let Some(prey) = nearest_ghost(snapshot, player, |mode| {
                matches!(mode, GhostMode::Frightened | GhostMode::Blinking)
            }) {
                return steer_toward(player, prey, maze);
            }
        }

        let hostile = nearest_ghost(snapshot, player, |mode| {
            matches!(mode, GhostMode::Scatter | GhostMode::Chase)
        });
        if let Some(threat) = hostile {
            let dist = distance(player.x, player.y, threat.x, threat.y);
            if dist <= DANGER_RANGE_TILES * TILE_SIZE {
                return steer_away(player, snapshot, maze);
            }
        }

        let half = TILE_SIZE / 2.0;
        match maze.nearest_dot(player.x + half, player.y + half) {
            Some((cx, cy)) => {
                let target = Vec2::new(cx - half, cy - half);
                steer_toward(player, target, maze)
            }
            None => Direction::None,
        }
    }
}

impl InputSource for Autopilot {
    fn next_direction(&mut self) -> Direction {
        self.desired
    }

    // Latched: the next think pass replaces it.
    fn clear_next_direction(&mut self) {}
}

fn nearest_ghost(
    snapshot: &Snapshot,
    player: &PlayerView,
    accept: impl Fn(GhostMode) -> bool,
) -> Option<Vec2> {
    snapshot
        .ghosts
        .iter()
        .filter(|ghost| accept(ghost.mode))
        .min_by(|a, b| {
            let da = distance(player.x, player.y, a.x, a.y);
            let db = distance(player.x, player.y, b.x, b.y);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|ghost| Vec2::new(ghost.x, ghost.y))
}

fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

fn open_moves(player: &PlayerView, maze: &Maze) -> Vec<(Direction, f32, f32)> {
    let speed = player.speed.max(1.0);
    let mut moves = Vec::with_capacity(4);
    for dir in [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ] {
        if let Some((nx, ny)) = try_advance(maze, player.x, player.y, dir, speed, false) {
            moves.push((dir, nx, ny));
        }
    }
    moves
}

fn steer_toward(player: &PlayerView, target: Vec2, maze: &Maze) -> Direction {
    let moves = open_moves(player, maze);
    pick_by(player, moves, |nx, ny| distance(nx, ny, target.x, target.y))
}

fn steer_away(player: &PlayerView, snapshot: &Snapshot, maze: &Maze) -> Direction {
    let moves = open_moves(player, maze);
    pick_by(player, moves, |nx, ny| {
        let closest = snapshot
            .ghosts
            .iter()
            .filter(|ghost| matches!(ghost.mode, GhostMode::Scatter | GhostMode::Chase))
            .map(|ghost| distance(nx, ny, ghost.x, ghost.y))
            .fold(f32::INFINITY, f32::min);
        -closest
    })
}

// Lowest cost wins; the reverse of the current direction is a last resort so
// the pilot does not ping-pong inside a corridor.
fn pick_by(
    player: &PlayerView,
    moves: Vec<(Direction, f32, f32)>,
    cost: impl Fn(f32, f32) -> f32,
) -> Direction {
    if moves.is_empty() {
        return player.dir;
    }
    let reverse = player.dir.reverse();
    let forward: Vec<(Direction, f32, f32)> = moves
        .iter()
        .copied()
        .filter(|entry| entry.0 != reverse)
        .collect();
    let pool = if forward.is_empty() { moves } else { forward };
    let mut best = pool[0];
    let mut best_cost = cost(best.1, best.2);
    for entry in pool.iter().skip(1) {
        let entry_cost = cost(entry.1, entry.2);
        if entry_cost < best_cost {
            best = *entry;
            best_cost = entry_cost;
        }
    }
    best.0
}
