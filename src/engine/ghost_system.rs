use super::*;

const DECISION_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl GhostInternal {
    pub(super) fn new(kind: GhostKind) -> Self {
        let (x, y) = get_spawn_px(kind);
        Self {
            view: GhostView {
                kind,
                x,
                y,
                dir: Direction::None,
                mode: GhostMode::Scatter,
                vulnerable: false,
            },
            in_scatter: true,
            clock_ms: 0.0,
            fright_ms: 0.0,
            exit_ms: get_exit_delay_ms(kind),
        }
    }

    pub(super) fn reset(&mut self) {
        *self = Self::new(self.view.kind);
    }

    fn clock_mode(&self) -> GhostMode {
        if self.in_scatter {
            GhostMode::Scatter
        } else {
            GhostMode::Chase
        }
    }

    // The scatter/chase alternation clock runs unconditionally; a flip only
    // takes effect (with the forced reversal) while the ghost is in a normal
    // mode. Fright expiry then adopts whatever the clock currently dictates.
    pub(super) fn tick_mode_timers(&mut self, dt_ms: f32) {
        self.clock_ms += dt_ms;
        let span = if self.in_scatter { SCATTER_MS } else { CHASE_MS };
        if self.clock_ms >= span {
            self.clock_ms -= span;
            self.in_scatter = !self.in_scatter;
            if matches!(self.view.mode, GhostMode::Scatter | GhostMode::Chase) {
                self.view.mode = self.clock_mode();
                self.view.dir = self.view.dir.reverse();
            }
        }

        if self.fright_ms > 0.0 {
            self.fright_ms = (self.fright_ms - dt_ms).max(0.0);
            if matches!(self.view.mode, GhostMode::Frightened | GhostMode::Blinking) {
                if self.fright_ms <= 0.0 {
                    self.view.mode = self.clock_mode();
                } else if self.fright_ms <= FRIGHT_BLINK_MS {
                    self.view.mode = GhostMode::Blinking;
                }
            }
        }
    }

    pub(super) fn set_frightened(&mut self, duration_ms: f32) {
        if self.view.mode == GhostMode::Eaten {
            return;
        }
        self.view.mode = GhostMode::Frightened;
        self.view.dir = self.view.dir.reverse();
        self.fright_ms = duration_ms;
    }

    pub(super) fn mark_eaten(&mut self) {
        self.view.mode = GhostMode::Eaten;
        self.fright_ms = 0.0;
    }

    pub(super) fn is_vulnerable(&self) -> bool {
        matches!(self.view.mode, GhostMode::Frightened | GhostMode::Blinking)
    }

    pub(super) fn render_view(&self) -> GhostView {
        GhostView {
            vulnerable: self.is_vulnerable(),
            ..self.view.clone()
        }
    }
}

impl GameSession {
    pub(super) fn activate_power_mode(&mut self) {
        self.ghost_eat_streak = 0;
        let fright_ms = self.config.fright_ms;
        for ghost in &mut self.ghosts {
            ghost.set_frightened(fright_ms);
        }
    }

    pub(super) fn ghost_speed(&self, idx: usize) -> f32 {
        let ghost = &self.ghosts[idx];
        match ghost.view.mode {
            GhostMode::Frightened | GhostMode::Blinking => FRIGHT_SPEED,
            GhostMode::Eaten => EATEN_SPEED,
            _ => {
                let mut speed = GHOST_BASE_SPEED
                    * self.config.ghost_speed_mult
                    * get_difficulty_multiplier(self.config.difficulty);
                if ghost.view.kind == GhostKind::Blinky {
                    speed *= get_elroy_speed_factor(self.maze.remaining_dots());
                }
                let cx = ghost.view.x + TILE_SIZE / 2.0;
                let cy = ghost.view.y + TILE_SIZE / 2.0;
                if self.maze.is_tunnel(cx, cy) {
                    speed *= TUNNEL_SPEED_FACTOR;
                }
                speed
            }
        }
    }

    // Pipeline per ghost: speed resolution, mode/exit timers, movement
    // (house exit or greedy decision + advance), tunnel wrap, eaten arrival.
    pub(super) fn update_ghosts(&mut self) {
        let player = (self.player.x, self.player.y, self.player.dir);
        let blinky = self
            .ghosts
            .iter()
            .find(|ghost| ghost.view.kind == GhostKind::Blinky)
            .map(|ghost| (ghost.view.x, ghost.view.y))
            .unwrap_or((player.0, player.1));

        for idx in 0..self.ghosts.len() {
            let speed = self.ghost_speed(idx);
            self.ghosts[idx].tick_mode_timers(STEP_MS);
            if self.ghosts[idx].exit_ms > 0.0 {
                self.ghosts[idx].exit_ms = (self.ghosts[idx].exit_ms - STEP_MS).max(0.0);
                continue;
            }

            let (gx, gy) = (self.ghosts[idx].view.x, self.ghosts[idx].view.y);
            let mode = self.ghosts[idx].view.mode;
            let cx = gx + TILE_SIZE / 2.0;
            let cy = gy + TILE_SIZE / 2.0;

            if mode != GhostMode::Eaten
                && (self.maze.is_ghost_house(cx, cy) || self.maze.is_door(cx, cy))
            {
                self.step_house_exit(idx, speed);
                continue;
            }

            if at_decision_point(gx, gy, speed) {
                let chosen = self.pick_ghost_direction(idx, player, blinky);
                self.ghosts[idx].view.dir = chosen;
            }
            let dir = self.ghosts[idx].view.dir;
            if let Some((nx, ny)) = try_advance(&self.maze, gx, gy, dir, speed, true) {
                self.ghosts[idx].view.x = wrap_tunnel(nx, ny);
                self.ghosts[idx].view.y = ny;
            }

            if mode == GhostMode::Eaten {
                let dx = self.ghosts[idx].view.x - GHOST_HOME_X;
                let dy = self.ghosts[idx].view.y - GHOST_HOME_Y;
                if dx * dx + dy * dy <= TILE_SIZE * TILE_SIZE {
                    self.ghosts[idx].reset();
                }
            }
        }
    }

    // Inside the house a ghost walks to the door column, then straight up
    // through the door; direction selection resumes outside.
    fn step_house_exit(&mut self, idx: usize, speed: f32) {
        let view = &mut self.ghosts[idx].view;
        if (view.x - GHOST_HOUSE_DOOR_X).abs() > speed {
            view.x += if view.x < GHOST_HOUSE_DOOR_X {
                speed
            } else {
                -speed
            };
        } else {
            view.x = GHOST_HOUSE_DOOR_X;
            view.y -= speed;
        }
        view.dir = Direction::Up;
    }

    fn pick_ghost_direction(
        &mut self,
        idx: usize,
        player: (f32, f32, Direction),
        blinky: (f32, f32),
    ) -> Direction {
        let (gx, gy, current, mode, kind) = {
            let view = &self.ghosts[idx].view;
            (view.x, view.y, view.dir, view.mode, view.kind)
        };

        let mut candidates: Vec<(Direction, f32, f32)> = Vec::with_capacity(4);
        for cand in DECISION_ORDER {
            let (ox, oy) = dir_offset(cand);
            let nx = gx + ox * TILE_SIZE;
            let ny = gy + oy * TILE_SIZE;
            if !self
                .maze
                .is_wall(nx + TILE_SIZE / 2.0, ny + TILE_SIZE / 2.0, true)
            {
                candidates.push((cand, nx, ny));
            }
        }
        if candidates.is_empty() {
            return current;
        }

        if matches!(mode, GhostMode::Frightened | GhostMode::Blinking) {
            return candidates[self.rng.pick_index(candidates.len())].0;
        }

        let reverse = current.reverse();
        let forward: Vec<(Direction, f32, f32)> = candidates
            .iter()
            .copied()
            .filter(|candidate| candidate.0 != reverse)
            .collect();
        let pool = if forward.is_empty() {
            candidates
        } else {
            forward
        };

        let target = match mode {
            GhostMode::Eaten => (GHOST_HOME_X, GHOST_HOME_Y),
            GhostMode::Chase => chase_target(kind, (gx, gy), player, blinky),
            _ => get_scatter_corner_px(kind),
        };

        let mut best = pool[0];
        let mut best_dist = dist_sq(best.1, best.2, target.0, target.1);
        for candidate in pool.iter().skip(1) {
            let dist = dist_sq(candidate.1, candidate.2, target.0, target.1);
            if dist < best_dist {
                best = *candidate;
                best_dist = dist;
            }
        }
        best.0
    }
}

fn dist_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

// The "faces up" sideways shift reproduces the arcade's pointer-overflow
// quirk in Pinky's and Inky's lead targeting.
fn lead_target(px: f32, py: f32, dir: Direction, tiles: f32) -> (f32, f32) {
    let span = tiles * TILE_SIZE;
    match dir {
        Direction::Up => (px - span, py - span),
        Direction::Down => (px, py + span),
        Direction::Left => (px - span, py),
        Direction::Right => (px + span, py),
        Direction::None => (px, py),
    }
}

fn chase_target(
    kind: GhostKind,
    ghost_pos: (f32, f32),
    player: (f32, f32, Direction),
    blinky: (f32, f32),
) -> (f32, f32) {
    let (px, py, pdir) = player;
    match kind {
        GhostKind::Blinky => (px, py),
        GhostKind::Pinky => lead_target(px, py, pdir, 4.0),
        GhostKind::Inky => {
            let (pivot_x, pivot_y) = lead_target(px, py, pdir, 2.0);
            (pivot_x * 2.0 - blinky.0, pivot_y * 2.0 - blinky.1)
        }
        GhostKind::Clyde => {
            let shy_range = 8.0 * TILE_SIZE;
            if dist_sq(ghost_pos.0, ghost_pos.1, px, py) >= shy_range * shy_range {
                (px, py)
            } else {
                get_scatter_corner_px(GhostKind::Clyde)
            }
        }
    }
}
