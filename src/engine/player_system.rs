use super::*;

impl GameSession {
    pub(super) fn update_player(&mut self, input: &mut dyn InputSource, audio: &mut dyn AudioSink) {
        self.player.mouth_phase = (self.player.mouth_phase + MOUTH_ANIM_RATE) % 1.0;
        self.apply_buffered_turn(input);

        if let Some((nx, ny)) = try_advance(
            &self.maze,
            self.player.x,
            self.player.y,
            self.player.dir,
            self.player.speed,
            false,
        ) {
            self.player.x = wrap_tunnel(nx, ny);
            self.player.y = ny;
        }

        self.collect_at_center(audio);
    }

    // Same-axis requests take effect immediately; perpendicular turns wait
    // until the player is within snap tolerance of the lane and the adjacent
    // tile is walkable. Unapplied requests stay buffered in the input source.
    fn apply_buffered_turn(&mut self, input: &mut dyn InputSource) {
        let desired = input.next_direction();
        if desired == Direction::None {
            return;
        }
        if desired == self.player.dir || desired == self.player.dir.reverse() {
            self.player.dir = desired;
            input.clear_next_direction();
            return;
        }

        let (ox, oy) = dir_offset(desired);
        let aligned = if ox != 0.0 {
            (self.player.y - snap_to_tile(self.player.y)).abs() <= self.player.speed
        } else {
            (self.player.x - snap_to_tile(self.player.x)).abs() <= self.player.speed
        };
        if !aligned {
            return;
        }
        let cx = self.player.x + TILE_SIZE / 2.0;
        let cy = self.player.y + TILE_SIZE / 2.0;
        if !self.maze.is_path(cx + ox * TILE_SIZE, cy + oy * TILE_SIZE) {
            return;
        }
        if ox != 0.0 {
            self.player.y = snap_to_tile(self.player.y);
        } else {
            self.player.x = snap_to_tile(self.player.x);
        }
        self.player.dir = desired;
        input.clear_next_direction();
    }

    fn collect_at_center(&mut self, audio: &mut dyn AudioSink) {
        let cx = self.player.x + TILE_SIZE / 2.0;
        let cy = self.player.y + TILE_SIZE / 2.0;
        let (col, row) = tile_coords(cx, cy);
        if self.maze.consume_dot(cx, cy) {
            self.add_score(DOT_SCORE);
            self.dots_eaten_level += 1;
            self.stats.dots_eaten += 1;
            audio.play(SoundCue::Chomp);
            self.events.push(RuntimeEvent::DotEaten { col, row });
        } else if self.maze.consume_power_pellet(cx, cy) {
            self.add_score(POWER_PELLET_SCORE);
            audio.play(SoundCue::PowerPellet);
            self.events.push(RuntimeEvent::PowerPelletEaten { col, row });
            self.activate_power_mode();
        }
    }
}
