use crate::constants::{
    get_cutscene_for_level, get_difficulty_multiplier, get_elroy_speed_factor, get_exit_delay_ms,
    get_fruit_for_level, get_ghost_eat_score, get_scatter_corner_px, get_spawn_px, CHASE_MS,
    CUTSCENE_MS, DOT_SCORE, DYING_MS, EATEN_SPEED, FRIGHT_BLINK_MS, FRIGHT_SPEED,
    FRUIT_DOT_TRIGGERS, FRUIT_SPAWN_X, FRUIT_SPAWN_Y, FRUIT_VISIBLE_MS, GHOST_BASE_SPEED,
    GHOST_HOME_X, GHOST_HOME_Y, GHOST_HOUSE_DOOR_X, GHOST_UPDATE_ORDER, KILL_SCREEN_LEVEL,
    LEVEL_CLEAR_MS, MAX_CATCHUP_STEPS, MAX_LIVES, MOUTH_ANIM_RATE, PLAYER_BASE_SPEED,
    PLAYER_SPAWN_X, PLAYER_SPAWN_Y, POWER_PELLET_SCORE, SCATTER_MS, STARTING_MS, STEP_MS,
    TILE_SIZE, TUNNEL_SPEED_FACTOR,
};
use crate::io::{AudioSink, InputSource};
use crate::maze::{tile_coords, Maze};
use crate::motion::{at_decision_point, dir_offset, snap_to_tile, try_advance, wrap_tunnel};
use crate::rng::Rng;
use crate::settings_store::CabinetSettings;
use crate::types::{
    BoardInit, Bounds, Direction, FruitView, GameConfig, GamePhase, GameSummary, GhostKind,
    GhostMode, GhostView, PlayerView, RuntimeEvent, Snapshot, SoundCue,
};

mod ghost_system;
mod player_system;

#[derive(Clone, Debug, Default)]
struct SessionStats {
    dots_eaten: i32,
    ghosts_eaten: i32,
    fruits_eaten: i32,
    deaths: i32,
}

#[derive(Clone, Debug)]
struct GhostInternal {
    view: GhostView,
    in_scatter: bool,
    clock_ms: f32,
    fright_ms: f32,
    exit_ms: f32,
}

#[derive(Clone, Debug)]
struct FruitInternal {
    view: FruitView,
    timer_ms: f32,
}

#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,

    maze: Maze,
    rng: Rng,
    player: PlayerView,
    ghosts: Vec<GhostInternal>,
    fruit: Option<FruitInternal>,
    phase: GamePhase,
    phase_timer_ms: f32,
    accumulator_ms: f32,
    score: i32,
    high_score: i32,
    high_score_beaten: bool,
    lives: i32,
    level: u32,
    ghost_eat_streak: u32,
    dots_eaten_level: i32,
    next_extra_life_at: i32,
    fruit_spawn_index: usize,
    events: Vec<RuntimeEvent>,
    tick_counter: u64,
    stats: SessionStats,
}

impl GameSession {
    pub fn new(settings: CabinetSettings, high_score: i32, seed: u32) -> Self {
        let settings = settings.sanitized();
        let config = GameConfig {
            step_ms: STEP_MS,
            lives: settings.lives,
            bonus_life_score: settings.bonus_life_score,
            ghost_speed_mult: settings.ghost_speed_mult,
            player_speed_mult: settings.player_speed_mult,
            fright_ms: settings.fright_ms,
            fruit_score_mult: settings.fruit_score_mult,
            difficulty: settings.difficulty,
        };
        Self {
            player: Self::spawned_player(config.player_speed_mult),
            ghosts: GHOST_UPDATE_ORDER
                .iter()
                .map(|&kind| GhostInternal::new(kind))
                .collect(),
            maze: Maze::new(),
            rng: Rng::new(seed),
            fruit: None,
            phase: GamePhase::TitleScreen,
            phase_timer_ms: 0.0,
            accumulator_ms: 0.0,
            score: 0,
            high_score: high_score.max(0),
            high_score_beaten: false,
            lives: config.lives,
            level: 1,
            ghost_eat_streak: 0,
            dots_eaten_level: 0,
            next_extra_life_at: config.bonus_life_score,
            fruit_spawn_index: 0,
            events: Vec::new(),
            tick_counter: 0,
            stats: SessionStats::default(),
            config,
        }
    }

    fn spawned_player(speed_mult: f32) -> PlayerView {
        PlayerView {
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
            dir: Direction::None,
            speed: PLAYER_BASE_SPEED * speed_mult,
            mouth_phase: 0.0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn high_score(&self) -> i32 {
        self.high_score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn board_init(&self) -> BoardInit {
        self.maze.board_init()
    }

    pub fn start_game(&mut self, audio: &mut dyn AudioSink) {
        if self.phase != GamePhase::TitleScreen {
            return;
        }
        self.maze = Maze::new();
        self.score = 0;
        self.level = 1;
        self.lives = self.config.lives;
        self.ghost_eat_streak = 0;
        self.dots_eaten_level = 0;
        self.next_extra_life_at = self.config.bonus_life_score;
        self.fruit_spawn_index = 0;
        self.high_score_beaten = false;
        self.tick_counter = 0;
        self.accumulator_ms = 0.0;
        self.stats = SessionStats::default();
        self.reset_level();
        audio.play(SoundCue::GameStart);
        self.set_phase(GamePhase::Starting);
    }

    pub fn pause(&mut self, audio: &mut dyn AudioSink) {
        if self.phase != GamePhase::Playing {
            return;
        }
        audio.stop_siren();
        self.set_phase(GamePhase::Paused);
    }

    pub fn resume(&mut self, audio: &mut dyn AudioSink) {
        if self.phase != GamePhase::Paused {
            return;
        }
        audio.start_siren();
        self.set_phase(GamePhase::Playing);
    }

    pub fn confirm(&mut self) {
        if self.phase != GamePhase::GameOver {
            return;
        }
        self.set_phase(GamePhase::TitleScreen);
    }

    pub fn advance(
        &mut self,
        elapsed_ms: f32,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
    ) -> u32 {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
            return 0;
        }
        self.accumulator_ms += elapsed_ms;
        let mut steps = 0;
        while self.accumulator_ms >= STEP_MS && steps < MAX_CATCHUP_STEPS {
            self.accumulator_ms -= STEP_MS;
            self.step_once(input, audio);
            steps += 1;
        }
        // Past the catch-up cap the backlog is dropped, not replayed.
        if steps == MAX_CATCHUP_STEPS && self.accumulator_ms >= STEP_MS {
            self.accumulator_ms = 0.0;
        }
        steps
    }

    fn step_once(&mut self, input: &mut dyn InputSource, audio: &mut dyn AudioSink) {
        self.tick_counter += 1;
        match self.phase {
            GamePhase::TitleScreen | GamePhase::Paused | GamePhase::GameOver => {}
            GamePhase::Starting => {
                self.phase_timer_ms -= STEP_MS;
                if self.phase_timer_ms <= 0.0 {
                    self.set_phase(GamePhase::Playing);
                    audio.start_siren();
                }
            }
            GamePhase::Dying => {
                self.phase_timer_ms -= STEP_MS;
                if self.phase_timer_ms <= 0.0 {
                    if self.lives > 0 {
                        self.reset_level();
                        self.set_phase(GamePhase::Starting);
                    } else {
                        self.set_phase(GamePhase::GameOver);
                    }
                }
            }
            GamePhase::LevelComplete => {
                self.phase_timer_ms -= STEP_MS;
                if self.phase_timer_ms <= 0.0 {
                    match get_cutscene_for_level(self.level) {
                        Some(kind) => {
                            audio.play(SoundCue::Intermission);
                            self.events.push(RuntimeEvent::CutsceneStarted { kind });
                            self.set_phase(GamePhase::Cutscene);
                        }
                        None => {
                            self.advance_level();
                            self.set_phase(GamePhase::Starting);
                        }
                    }
                }
            }
            GamePhase::Cutscene => {
                self.phase_timer_ms -= STEP_MS;
                if self.phase_timer_ms <= 0.0 {
                    self.advance_level();
                    self.set_phase(GamePhase::Starting);
                }
            }
            GamePhase::Playing => {
                self.update_player(input, audio);
                self.update_ghosts();
                self.resolve_collisions(audio);
                if self.phase != GamePhase::Playing {
                    return;
                }
                self.update_fruit(audio);
                self.check_extra_life(audio);
                self.check_level_complete(audio);
            }
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if phase == self.phase {
            return;
        }
        let from = self.phase;
        self.phase = phase;
        self.phase_timer_ms = match phase {
            GamePhase::Starting => STARTING_MS,
            GamePhase::Dying => DYING_MS,
            GamePhase::LevelComplete => LEVEL_CLEAR_MS,
            GamePhase::Cutscene => CUTSCENE_MS,
            _ => 0.0,
        };
        self.events.push(RuntimeEvent::PhaseChanged { from, to: phase });
    }

    fn reset_level(&mut self) {
        self.player = Self::spawned_player(self.config.player_speed_mult);
        for ghost in &mut self.ghosts {
            ghost.reset();
        }
        self.fruit = None;
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.maze = Maze::new();
        self.dots_eaten_level = 0;
        self.fruit_spawn_index = 0;
        if self.level == KILL_SCREEN_LEVEL {
            self.maze.apply_kill_screen_corruption();
            self.events.push(RuntimeEvent::KillScreen { level: self.level });
        }
        self.reset_level();
    }

    fn add_score(&mut self, points: i32) {
        self.score += points;
        if self.score > self.high_score {
            if !self.high_score_beaten {
                self.high_score_beaten = true;
                self.events.push(RuntimeEvent::HighScore { score: self.score });
            }
            self.high_score = self.score;
        }
    }

    fn resolve_collisions(&mut self, audio: &mut dyn AudioSink) {
        let player_box = Bounds::new(self.player.x, self.player.y, TILE_SIZE, TILE_SIZE);
        for idx in 0..self.ghosts.len() {
            if self.phase != GamePhase::Playing {
                return;
            }
            if self.ghosts[idx].view.mode == GhostMode::Eaten {
                continue;
            }
            let ghost_box = Bounds::new(
                self.ghosts[idx].view.x,
                self.ghosts[idx].view.y,
                TILE_SIZE,
                TILE_SIZE,
            );
            if !player_box.intersects(&ghost_box) {
                continue;
            }
            if self.ghosts[idx].is_vulnerable() {
                let points = get_ghost_eat_score(self.ghost_eat_streak);
                self.ghost_eat_streak += 1;
                self.stats.ghosts_eaten += 1;
                self.add_score(points);
                self.ghosts[idx].mark_eaten();
                audio.play(SoundCue::GhostEaten);
                self.events.push(RuntimeEvent::GhostEaten {
                    ghost: self.ghosts[idx].view.kind,
                    points,
                    streak: self.ghost_eat_streak,
                });
            } else {
                self.handle_player_death(audio);
            }
        }
    }

    fn handle_player_death(&mut self, audio: &mut dyn AudioSink) {
        self.lives -= 1;
        self.stats.deaths += 1;
        self.player.dir = Direction::None;
        audio.stop_siren();
        audio.play(SoundCue::Death);
        self.events.push(RuntimeEvent::LifeLost {
            lives_left: self.lives,
        });
        self.set_phase(GamePhase::Dying);
    }

    fn update_fruit(&mut self, audio: &mut dyn AudioSink) {
        if self.fruit.is_none()
            && self.fruit_spawn_index < FRUIT_DOT_TRIGGERS.len()
            && self.dots_eaten_level >= FRUIT_DOT_TRIGGERS[self.fruit_spawn_index]
        {
            let (kind, base_points) = get_fruit_for_level(self.level);
            let points = (base_points as f32 * self.config.fruit_score_mult).round() as i32;
            let view = FruitView {
                kind,
                x: FRUIT_SPAWN_X,
                y: FRUIT_SPAWN_Y,
                points,
            };
            self.events.push(RuntimeEvent::FruitSpawned {
                fruit: view.clone(),
            });
            self.fruit = Some(FruitInternal {
                view,
                timer_ms: FRUIT_VISIBLE_MS,
            });
            self.fruit_spawn_index += 1;
        }

        let Some(fruit) = self.fruit.as_mut() else {
            return;
        };
        fruit.timer_ms -= STEP_MS;
        let expired = fruit.timer_ms <= 0.0;
        let view = fruit.view.clone();
        if expired {
            self.fruit = None;
            return;
        }

        let player_box = Bounds::new(self.player.x, self.player.y, TILE_SIZE, TILE_SIZE);
        let fruit_box = Bounds::new(view.x, view.y, TILE_SIZE, TILE_SIZE);
        if player_box.intersects(&fruit_box) {
            self.fruit = None;
            self.stats.fruits_eaten += 1;
            self.add_score(view.points);
            audio.play(SoundCue::Fruit);
            self.events.push(RuntimeEvent::FruitEaten {
                fruit_type: view.kind,
                points: view.points,
            });
        }
    }

    fn check_extra_life(&mut self, audio: &mut dyn AudioSink) {
        while self.score >= self.next_extra_life_at {
            self.next_extra_life_at += self.config.bonus_life_score;
            if self.lives < MAX_LIVES {
                self.lives += 1;
                audio.play(SoundCue::Extend);
                self.events.push(RuntimeEvent::ExtraLife { lives: self.lives });
            }
        }
    }

    fn check_level_complete(&mut self, audio: &mut dyn AudioSink) {
        if !self.maze.is_complete() {
            return;
        }
        audio.stop_siren();
        self.events.push(RuntimeEvent::LevelCleared { level: self.level });
        self.set_phase(GamePhase::LevelComplete);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            phase: self.phase,
            phase_timer_ms: self.phase_timer_ms.max(0.0),
            score: self.score,
            high_score: self.high_score,
            level: self.level,
            lives: self.lives,
            remaining_dots: self.maze.remaining_dots(),
            fright_ms_left: self
                .ghosts
                .iter()
                .map(|ghost| ghost.fright_ms)
                .fold(0.0, f32::max),
            player: self.player.clone(),
            ghosts: self.ghosts.iter().map(|ghost| ghost.render_view()).collect(),
            fruit: self.fruit.as_ref().map(|fruit| fruit.view.clone()),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            final_score: self.score,
            high_score: self.high_score,
            level: self.level,
            ticks: self.tick_counter,
            dots_eaten: self.stats.dots_eaten,
            ghosts_eaten: self.stats.ghosts_eaten,
            fruits_eaten: self.stats.fruits_eaten,
            deaths: self.stats.deaths,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{IdleInput, NullAudio, QueuedInput, RecordingAudio};
    use crate::maze::{tile_center, Tile};
    use crate::types::{CutsceneKind, Difficulty, FruitKind};

    fn new_session(seed: u32) -> GameSession {
        GameSession::new(CabinetSettings::default(), 0, seed)
    }

    fn run_steps(
        session: &mut GameSession,
        steps: u32,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
    ) {
        for _ in 0..steps {
            session.advance(STEP_MS, input, audio);
        }
    }

    fn run_ms(
        session: &mut GameSession,
        ms: f32,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
    ) {
        let steps = (ms / STEP_MS).ceil() as u32 + 1;
        run_steps(session, steps, input, audio);
    }

    fn playing_session(seed: u32) -> GameSession {
        let mut session = new_session(seed);
        let mut audio = NullAudio;
        session.start_game(&mut audio);
        run_ms(&mut session, STARTING_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Playing);
        session
    }

    // Leaves the power pellets in place; only dots gate completion.
    fn clear_dots(session: &mut GameSession) {
        for row in 0..31 {
            for col in 0..28 {
                if session.maze.tile_at(col, row) == Tile::Dot {
                    session.maze.set_tile(col, row, Tile::Path);
                }
            }
        }
    }

    #[test]
    fn session_starts_on_the_title_screen() {
        let mut session = new_session(7);
        assert_eq!(session.phase(), GamePhase::TitleScreen);
        run_steps(&mut session, 10, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.phase(), GamePhase::TitleScreen);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn start_game_counts_down_then_plays() {
        let mut session = new_session(7);
        let mut audio = RecordingAudio::default();
        session.start_game(&mut audio);
        assert_eq!(session.phase(), GamePhase::Starting);
        assert!(audio.cues.contains(&SoundCue::GameStart));
        assert!(!audio.siren_on);

        run_ms(&mut session, STARTING_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(audio.siren_on);
    }

    #[test]
    fn advance_runs_whole_steps_and_caps_catchup() {
        let mut session = playing_session(1);
        assert_eq!(
            session.advance(STEP_MS / 2.0, &mut IdleInput, &mut NullAudio),
            0
        );
        assert_eq!(
            session.advance(STEP_MS / 2.0, &mut IdleInput, &mut NullAudio),
            1
        );
        assert_eq!(session.advance(1_000.0, &mut IdleInput, &mut NullAudio), 8);
        assert_eq!(session.advance(-5.0, &mut IdleInput, &mut NullAudio), 0);
        assert_eq!(session.advance(f32::NAN, &mut IdleInput, &mut NullAudio), 0);
    }

    #[test]
    fn player_eats_dots_and_scores() {
        let mut session = playing_session(3);
        let mut input = QueuedInput::new(&[Direction::Right]);
        let mut audio = RecordingAudio::default();
        run_steps(&mut session, 5, &mut input, &mut audio);

        assert_eq!(session.score(), 10);
        assert_eq!(session.maze().remaining_dots(), 239);
        assert!(audio.cues.contains(&SoundCue::Chomp));
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::DotEaten { col: 15, row: 23 })));
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::HighScore { score: 10 })));
    }

    #[test]
    fn power_pellet_frightens_and_reverses_adversaries() {
        let mut session = playing_session(3);
        run_steps(&mut session, 20, &mut IdleInput, &mut NullAudio);
        let blinky_dir = session.ghosts[0].view.dir;
        assert_ne!(blinky_dir, Direction::None);

        let (px, py) = tile_center(1, 3);
        session.player.x = px - TILE_SIZE / 2.0;
        session.player.y = py - TILE_SIZE / 2.0;
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);

        assert!(audio.cues.contains(&SoundCue::PowerPellet));
        assert_eq!(session.ghosts[0].view.dir, blinky_dir.reverse());
        for ghost in &session.ghosts {
            assert_eq!(ghost.view.mode, GhostMode::Frightened);
            assert!(ghost.is_vulnerable());
        }
        assert_eq!(session.ghost_eat_streak, 0);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot.fright_ms_left > 5_900.0);
        assert!(snapshot.ghosts.iter().all(|ghost| ghost.vulnerable));
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::PowerPelletEaten { col: 1, row: 3 })));
    }

    #[test]
    fn eating_a_ghost_chain_doubles_the_score() {
        let mut session = playing_session(9);
        for idx in 0..4 {
            session.ghosts[idx].view.x = session.player.x;
            session.ghosts[idx].view.y = session.player.y;
            session.ghosts[idx].set_frightened(6_000.0);
        }
        let before = session.score();
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);

        assert_eq!(session.score() - before, 200 + 400 + 800 + 1_600);
        assert_eq!(session.ghost_eat_streak, 4);
        assert!(session
            .ghosts
            .iter()
            .all(|ghost| ghost.view.mode == GhostMode::Eaten));
        assert_eq!(
            audio
                .cues
                .iter()
                .filter(|cue| **cue == SoundCue::GhostEaten)
                .count(),
            4
        );
        let snapshot = session.build_snapshot(true);
        let points: Vec<i32> = snapshot
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::GhostEaten { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![200, 400, 800, 1_600]);
    }

    #[test]
    fn eaten_adversaries_do_not_collide_and_return_home() {
        let mut session = playing_session(4);
        session.ghosts[0].view.x = session.player.x;
        session.ghosts[0].view.y = session.player.y;
        session.ghosts[0].mark_eaten();
        let lives = session.lives();
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.lives(), lives);
        assert_eq!(session.phase(), GamePhase::Playing);

        session.ghosts[0].view.x = GHOST_HOME_X;
        session.ghosts[0].view.y = GHOST_HOME_Y - 44.0;
        session.ghosts[0].view.dir = Direction::Down;
        for _ in 0..30 {
            session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
            if session.ghosts[0].view.mode != GhostMode::Eaten {
                break;
            }
        }
        let blinky = &session.ghosts[0];
        assert_eq!(blinky.view.mode, GhostMode::Scatter);
        assert_eq!(
            (blinky.view.x, blinky.view.y),
            get_spawn_px(GhostKind::Blinky)
        );
        assert_eq!(blinky.view.dir, Direction::None);
        assert_eq!(blinky.exit_ms, 0.0);
    }

    #[test]
    fn colliding_with_a_hostile_adversary_costs_a_life() {
        let mut session = playing_session(5);
        session.ghosts[0].view.x = session.player.x;
        session.ghosts[0].view.y = session.player.y;
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);

        assert_eq!(session.phase(), GamePhase::Dying);
        assert_eq!(session.build_snapshot(false).phase_timer_ms, DYING_MS);
        assert_eq!(session.lives(), 2);
        assert!(audio.cues.contains(&SoundCue::Death));
        assert!(!audio.siren_on);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LifeLost { lives_left: 2 })));

        run_ms(&mut session, DYING_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Starting);
        assert_eq!(session.player.x, PLAYER_SPAWN_X);
        assert_eq!(session.player.y, PLAYER_SPAWN_Y);
        assert_eq!(
            (session.ghosts[3].view.x, session.ghosts[3].view.y),
            get_spawn_px(GhostKind::Clyde)
        );
    }

    #[test]
    fn losing_the_last_life_ends_the_game() {
        let mut session = playing_session(6);
        session.lives = 1;
        session.ghosts[0].view.x = session.player.x;
        session.ghosts[0].view.y = session.player.y;
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.phase(), GamePhase::Dying);
        assert_eq!(session.lives(), 0);

        run_ms(&mut session, DYING_MS, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.build_summary().deaths, 1);

        session.confirm();
        assert_eq!(session.phase(), GamePhase::TitleScreen);
    }

    #[test]
    fn clearing_the_board_advances_the_level() {
        let mut session = playing_session(8);
        clear_dots(&mut session);
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::LevelComplete);
        assert_eq!(session.build_snapshot(false).phase_timer_ms, LEVEL_CLEAR_MS);
        assert!(!audio.siren_on);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LevelCleared { level: 1 })));

        run_ms(&mut session, LEVEL_CLEAR_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Starting);
        assert_eq!(session.level(), 2);
        assert_eq!(session.maze().remaining_dots(), 240);
    }

    #[test]
    fn uneaten_power_pellets_do_not_hold_the_level_open() {
        let mut session = playing_session(10);
        clear_dots(&mut session);
        assert_eq!(session.maze().remaining_power_pellets(), 4);
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.phase(), GamePhase::LevelComplete);
    }

    #[test]
    fn some_levels_end_with_a_cutscene() {
        let mut session = playing_session(8);
        session.level = 2;
        clear_dots(&mut session);
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);
        run_ms(&mut session, LEVEL_CLEAR_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Cutscene);
        assert!(audio.cues.contains(&SoundCue::Intermission));
        let snapshot = session.build_snapshot(true);
        assert!(snapshot.events.iter().any(|event| matches!(
            event,
            RuntimeEvent::CutsceneStarted {
                kind: CutsceneKind::BlinkyChase
            }
        )));

        run_ms(&mut session, CUTSCENE_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.phase(), GamePhase::Starting);
        assert_eq!(session.level(), 3);
    }

    #[test]
    fn level_256_garbles_the_board() {
        let mut session = playing_session(11);
        session.level = 255;
        clear_dots(&mut session);
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        run_ms(&mut session, LEVEL_CLEAR_MS, &mut IdleInput, &mut NullAudio);
        assert_eq!(session.level(), 256);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::KillScreen { level: 256 })));
        let fresh = Maze::new();
        assert_ne!(session.maze().render_rows(), fresh.render_rows());
        assert!(session.maze().remaining_dots() < 240);
    }

    #[test]
    fn fruit_spawns_on_dot_triggers_and_can_be_eaten() {
        let mut session = playing_session(12);
        session.dots_eaten_level = FRUIT_DOT_TRIGGERS[0];
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot.fruit.is_some());
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::FruitSpawned { .. })));

        session.player.x = FRUIT_SPAWN_X;
        session.player.y = FRUIT_SPAWN_Y - 8.0;
        let before = session.score();
        let mut audio = RecordingAudio::default();
        session.advance(STEP_MS, &mut IdleInput, &mut audio);
        assert_eq!(session.score() - before, 100);
        assert!(audio.cues.contains(&SoundCue::Fruit));
        let snapshot = session.build_snapshot(true);
        assert!(snapshot.fruit.is_none());
        assert!(snapshot.events.iter().any(|event| matches!(
            event,
            RuntimeEvent::FruitEaten {
                fruit_type: FruitKind::Cherry,
                points: 100
            }
        )));
    }

    #[test]
    fn unclaimed_fruit_expires() {
        let mut session = playing_session(13);
        session.dots_eaten_level = FRUIT_DOT_TRIGGERS[1];
        session.fruit_spawn_index = 1;
        session.advance(STEP_MS, &mut IdleInput, &mut NullAudio);
        assert!(session.fruit.is_some());
        run_ms(&mut session, FRUIT_VISIBLE_MS, &mut IdleInput, &mut NullAudio);
        assert!(session.fruit.is_none());
        assert_eq!(session.stats.fruits_eaten, 0);
    }

    #[test]
    fn bonus_life_thresholds_award_up_to_the_cap() {
        let mut session = playing_session(14);
        let mut audio = RecordingAudio::default();
        session.score = 9_990;
        session.add_score(DOT_SCORE);
        session.check_extra_life(&mut audio);
        assert_eq!(session.lives(), 4);
        assert!(audio.cues.contains(&SoundCue::Extend));

        session.add_score(30_000);
        session.check_extra_life(&mut audio);
        assert_eq!(session.lives(), MAX_LIVES);

        session.add_score(20_000);
        session.check_extra_life(&mut audio);
        assert_eq!(session.lives(), MAX_LIVES);
    }

    #[test]
    fn pause_freezes_the_simulation() {
        let mut session = playing_session(15);
        run_steps(&mut session, 30, &mut IdleInput, &mut NullAudio);
        let mut audio = RecordingAudio {
            siren_on: true,
            ..RecordingAudio::default()
        };
        session.pause(&mut audio);
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(!audio.siren_on);

        let frozen: Vec<(f32, f32)> = session
            .ghosts
            .iter()
            .map(|ghost| (ghost.view.x, ghost.view.y))
            .collect();
        run_steps(&mut session, 60, &mut IdleInput, &mut audio);
        let after: Vec<(f32, f32)> = session
            .ghosts
            .iter()
            .map(|ghost| (ghost.view.x, ghost.view.y))
            .collect();
        assert_eq!(frozen, after);

        session.resume(&mut audio);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(audio.siren_on);
    }

    #[test]
    fn tunnel_wraps_the_player_west_to_east() {
        let mut session = playing_session(16);
        session.player.x = 0.0;
        session.player.y = 224.0;
        session.player.dir = Direction::Left;
        run_steps(&mut session, 12, &mut IdleInput, &mut NullAudio);
        assert!(session.player.x > 400.0);
        assert_eq!(session.player.y, 224.0);
    }

    #[test]
    fn adversaries_leave_the_house_on_their_own_schedule() {
        let mut session = playing_session(17);
        let pinky_spawn = get_spawn_px(GhostKind::Pinky);
        let inky_spawn = get_spawn_px(GhostKind::Inky);
        assert_eq!(session.ghosts[0].exit_ms, 0.0);
        assert!(session.ghosts[3].exit_ms > session.ghosts[1].exit_ms);

        run_ms(&mut session, 1_000.0, &mut IdleInput, &mut NullAudio);
        assert_ne!(
            (session.ghosts[0].view.x, session.ghosts[0].view.y),
            get_spawn_px(GhostKind::Blinky)
        );
        assert_eq!(
            (session.ghosts[1].view.x, session.ghosts[1].view.y),
            pinky_spawn
        );
        assert_eq!(
            (session.ghosts[2].view.x, session.ghosts[2].view.y),
            inky_spawn
        );

        session.ghosts[2].exit_ms = 0.0;
        run_steps(&mut session, 40, &mut IdleInput, &mut NullAudio);
        assert_ne!(
            (session.ghosts[2].view.x, session.ghosts[2].view.y),
            inky_spawn
        );
        assert_eq!(
            (session.ghosts[1].view.x, session.ghosts[1].view.y),
            pinky_spawn
        );

        run_ms(&mut session, 2_000.0, &mut IdleInput, &mut NullAudio);
        assert_ne!(
            (session.ghosts[1].view.x, session.ghosts[1].view.y),
            pinky_spawn
        );
    }

    #[test]
    fn scatter_and_chase_alternate_with_a_reversal() {
        let mut ghost = GhostInternal::new(GhostKind::Blinky);
        ghost.view.dir = Direction::Right;
        let mut ticks = 0u32;
        while ghost.in_scatter {
            ghost.tick_mode_timers(STEP_MS);
            ticks += 1;
            assert!(ticks < 500);
        }
        assert_eq!(ghost.view.mode, GhostMode::Chase);
        assert_eq!(ghost.view.dir, Direction::Left);
        assert!((ticks as f32 * STEP_MS - SCATTER_MS).abs() < STEP_MS * 2.0);

        while !ghost.in_scatter {
            ghost.tick_mode_timers(STEP_MS);
            ticks += 1;
            assert!(ticks < 2_000);
        }
        assert_eq!(ghost.view.mode, GhostMode::Scatter);
        assert_eq!(ghost.view.dir, Direction::Right);
    }

    #[test]
    fn frightened_blinks_then_adopts_the_clock_mode() {
        let mut ghost = GhostInternal::new(GhostKind::Pinky);
        ghost.view.dir = Direction::Up;
        ghost.set_frightened(6_000.0);
        assert_eq!(ghost.view.mode, GhostMode::Frightened);
        assert_eq!(ghost.view.dir, Direction::Down);

        let mut blink_tick = None;
        for tick in 0..1_000u32 {
            ghost.tick_mode_timers(STEP_MS);
            if ghost.view.mode != GhostMode::Frightened {
                blink_tick = Some(tick);
                break;
            }
        }
        let blink_ms = blink_tick.expect("entered the blink window") as f32 * STEP_MS;
        assert_eq!(ghost.view.mode, GhostMode::Blinking);
        assert!((blink_ms - 4_000.0).abs() < STEP_MS * 2.0);

        while ghost.is_vulnerable() {
            ghost.tick_mode_timers(STEP_MS);
        }
        assert_eq!(ghost.view.mode, GhostMode::Scatter);
    }

    #[test]
    fn a_second_pellet_restarts_the_fright_window() {
        let mut ghost = GhostInternal::new(GhostKind::Clyde);
        ghost.set_frightened(6_000.0);
        for _ in 0..250 {
            ghost.tick_mode_timers(STEP_MS);
        }
        assert_eq!(ghost.view.mode, GhostMode::Blinking);
        ghost.set_frightened(6_000.0);
        assert_eq!(ghost.view.mode, GhostMode::Frightened);
        assert!(ghost.fright_ms > 5_900.0);
    }

    #[test]
    fn eaten_adversaries_ignore_new_fright_windows() {
        let mut ghost = GhostInternal::new(GhostKind::Inky);
        ghost.view.dir = Direction::Left;
        ghost.mark_eaten();
        ghost.set_frightened(6_000.0);
        assert_eq!(ghost.view.mode, GhostMode::Eaten);
        assert_eq!(ghost.view.dir, Direction::Left);
        assert!(!ghost.is_vulnerable());
    }

    #[test]
    fn frightened_speed_and_eaten_speed_are_fixed() {
        let mut session = playing_session(19);
        session.ghosts[0].set_frightened(6_000.0);
        assert_eq!(session.ghost_speed(0), FRIGHT_SPEED);
        session.ghosts[0].mark_eaten();
        assert_eq!(session.ghost_speed(0), EATEN_SPEED);
    }

    #[test]
    fn blinky_speeds_up_as_the_board_empties() {
        let mut session = playing_session(20);
        assert!((session.ghost_speed(0) - 2.0).abs() < 1e-5);

        let mut remaining = session.maze().remaining_dots();
        'thin: for row in 0..31 {
            for col in 0..28 {
                if remaining <= 15 {
                    break 'thin;
                }
                if session.maze.tile_at(col, row) == Tile::Dot {
                    session.maze.set_tile(col, row, Tile::Path);
                    remaining -= 1;
                }
            }
        }
        assert!((session.ghost_speed(0) - 2.0 * 1.15).abs() < 1e-5);
        assert!((session.ghost_speed(3) - 2.0).abs() < 1e-5);

        while remaining > 8 {
            'scan: for row in 0..31 {
                for col in 0..28 {
                    if session.maze.tile_at(col, row) == Tile::Dot {
                        session.maze.set_tile(col, row, Tile::Path);
                        remaining -= 1;
                        break 'scan;
                    }
                }
            }
        }
        assert!((session.ghost_speed(0) - 2.0 * 1.3).abs() < 1e-5);
    }

    #[test]
    fn tunnel_halves_normal_adversary_speed_only() {
        let mut session = playing_session(21);
        session.ghosts[0].view.x = 16.0;
        session.ghosts[0].view.y = 224.0;
        assert!((session.ghost_speed(0) - 1.0).abs() < 1e-5);
        session.ghosts[0].set_frightened(6_000.0);
        assert_eq!(session.ghost_speed(0), FRIGHT_SPEED);
    }

    #[test]
    fn difficulty_scales_adversary_speed() {
        let settings = CabinetSettings {
            difficulty: Difficulty::Hard,
            ..CabinetSettings::default()
        };
        let mut session = GameSession::new(settings, 0, 22);
        let mut audio = NullAudio;
        session.start_game(&mut audio);
        run_ms(&mut session, STARTING_MS, &mut IdleInput, &mut audio);
        assert!((session.ghost_speed(1) - 2.4).abs() < 1e-5);
        assert_eq!(session.player.speed, 2.0);
    }

    #[test]
    fn same_seed_and_script_replays_identically() {
        let script = [
            Direction::Right,
            Direction::Up,
            Direction::Left,
            Direction::Down,
            Direction::Left,
        ];
        let mut a = playing_session(23);
        let mut b = playing_session(23);
        let mut input_a = QueuedInput::new(&script);
        let mut input_b = QueuedInput::new(&script);
        for _ in 0..1_200 {
            a.advance(STEP_MS, &mut input_a, &mut NullAudio);
            b.advance(STEP_MS, &mut input_b, &mut NullAudio);
        }
        let snap_a = serde_json::to_string(&a.build_snapshot(true)).expect("serialize");
        let snap_b = serde_json::to_string(&b.build_snapshot(true)).expect("serialize");
        assert_eq!(snap_a, snap_b);
    }

    #[test]
    fn snapshot_reports_board_and_config() {
        let mut session = new_session(24);
        let init = session.board_init();
        assert_eq!(init.total_dots, 240);
        assert_eq!(session.config.lives, 3);
        let snapshot = session.build_snapshot(false);
        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.ghosts.len(), 4);
    }
}
