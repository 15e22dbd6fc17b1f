use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Blinking,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    TitleScreen,
    Starting,
    Playing,
    Paused,
    Dying,
    LevelComplete,
    Cutscene,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FruitKind {
    Cherry,
    Strawberry,
    Orange,
    Apple,
    Melon,
    Galaxian,
    Bell,
    Key,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutsceneKind {
    BlinkyChase,
    NailGhost,
    GiantPackman,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Chomp,
    PowerPellet,
    GhostEaten,
    Death,
    GameStart,
    Extend,
    Fruit,
    Intermission,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub speed: f32,
    #[serde(rename = "mouthPhase")]
    pub mouth_phase: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    #[serde(rename = "type")]
    pub kind: GhostKind,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub vulnerable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct FruitView {
    #[serde(rename = "type")]
    pub kind: FruitKind,
    pub x: f32,
    pub y: f32,
    pub points: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoardInit {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: i32,
    pub rows: Vec<String>,
    #[serde(rename = "totalDots")]
    pub total_dots: i32,
    #[serde(rename = "totalPowerPellets")]
    pub total_power_pellets: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    #[serde(rename = "stepMs")]
    pub step_ms: f32,
    pub lives: i32,
    #[serde(rename = "bonusLifeScore")]
    pub bonus_life_score: i32,
    #[serde(rename = "ghostSpeedMult")]
    pub ghost_speed_mult: f32,
    #[serde(rename = "playerSpeedMult")]
    pub player_speed_mult: f32,
    #[serde(rename = "frightMs")]
    pub fright_ms: f32,
    #[serde(rename = "fruitScoreMult")]
    pub fruit_score_mult: f32,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    DotEaten {
        col: i32,
        row: i32,
    },
    PowerPelletEaten {
        col: i32,
        row: i32,
    },
    GhostEaten {
        ghost: GhostKind,
        points: i32,
        streak: u32,
    },
    FruitSpawned {
        fruit: FruitView,
    },
    FruitEaten {
        #[serde(rename = "fruitType")]
        fruit_type: FruitKind,
        points: i32,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    ExtraLife {
        lives: i32,
    },
    LevelCleared {
        level: u32,
    },
    CutsceneStarted {
        kind: CutsceneKind,
    },
    KillScreen {
        level: u32,
    },
    HighScore {
        score: i32,
    },
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    #[serde(rename = "phaseTimerMs")]
    pub phase_timer_ms: f32,
    pub score: i32,
    #[serde(rename = "highScore")]
    pub high_score: i32,
    pub level: u32,
    pub lives: i32,
    #[serde(rename = "remainingDots")]
    pub remaining_dots: i32,
    #[serde(rename = "frightMsLeft")]
    pub fright_ms_left: f32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub fruit: Option<FruitView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    #[serde(rename = "finalScore")]
    pub final_score: i32,
    #[serde(rename = "highScore")]
    pub high_score: i32,
    pub level: u32,
    pub ticks: u64,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: i32,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: i32,
    #[serde(rename = "fruitsEaten")]
    pub fruits_eaten: i32,
    pub deaths: i32,
    pub phase: GamePhase,
}
