use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Difficulty;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CabinetSettings {
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

impl Default for CabinetSettings {
    fn default() -> Self {
        Self {
            lives: 3,
            bonus_life_score: 10_000,
            ghost_speed_mult: 1.0,
            player_speed_mult: 1.0,
            fright_ms: 6_000.0,
            fruit_score_mult: 1.0,
            difficulty: Difficulty::Normal,
        }
    }
}

impl CabinetSettings {
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            lives: self.lives.clamp(1, 5),
            bonus_life_score: self.bonus_life_score.clamp(5_000, 20_000),
            ghost_speed_mult: clamp_finite(self.ghost_speed_mult, 0.8, 1.2, defaults.ghost_speed_mult),
            player_speed_mult: clamp_finite(
                self.player_speed_mult,
                0.8,
                1.2,
                defaults.player_speed_mult,
            ),
            fright_ms: clamp_finite(self.fright_ms, 4_000.0, 8_000.0, defaults.fright_ms),
            fruit_score_mult: clamp_finite(self.fruit_score_mult, 0.5, 2.0, defaults.fruit_score_mult),
            difficulty: self.difficulty,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HighScoreRecord {
    pub score: i32,
    #[serde(rename = "achievedAtIso")]
    pub achieved_at_iso: String,
}

#[derive(Clone, Debug, Serialize)]
struct SettingsFile {
    version: u8,
    settings: CabinetSettings,
    #[serde(rename = "highScore")]
    high_score: Option<HighScoreRecord>,
}

#[derive(Clone, Debug, Deserialize)]
struct SettingsFileRaw {
    version: u8,
    #[serde(default)]
    settings: serde_json::Value,
    #[serde(rename = "highScore", alias = "high_score", default)]
    high_score: serde_json::Value,
}

pub struct SettingsStore {
    file_path: PathBuf,
    settings: CabinetSettings,
    high_score: Option<HighScoreRecord>,
}

impl SettingsStore {
    pub fn new(file_path: PathBuf) -> Self {
        let (settings, high_score) = load_file(&file_path);
        Self {
            file_path,
            settings,
            high_score,
        }
    }

    pub fn settings(&self) -> CabinetSettings {
        self.settings
    }

    pub fn high_score(&self) -> i32 {
        self.high_score.as_ref().map(|record| record.score).unwrap_or(0)
    }

    pub fn high_score_record(&self) -> Option<&HighScoreRecord> {
        self.high_score.as_ref()
    }

    pub fn update_settings(&mut self, settings: CabinetSettings) {
        self.settings = settings.sanitized();
        self.save();
    }

    pub fn record_high_score(&mut self, score: i32) -> bool {
        if score <= self.high_score() {
            return false;
        }
        self.high_score = Some(HighScoreRecord {
            score,
            achieved_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        self.save();
        true
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[settings-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let payload = SettingsFile {
            version: 1,
            settings: self.settings,
            high_score: self.high_score.clone(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[settings-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                }
            }
            Err(error) => {
                eprintln!(
                    "[settings-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
            }
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}

fn load_file(path: &Path) -> (CabinetSettings, Option<HighScoreRecord>) {
    let defaults = CabinetSettings::default();
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[settings-store] failed to read {}: {error}", path.display());
            }
            return (defaults, None);
        }
    };
    let parsed = match serde_json::from_str::<SettingsFileRaw>(&text) {
        Ok(value) if value.version == 1 => value,
        Ok(value) => {
            eprintln!(
                "[settings-store] unsupported version {} at {}",
                value.version,
                path.display()
            );
            return (defaults, None);
        }
        Err(error) => {
            eprintln!("[settings-store] failed to parse {}: {error}", path.display());
            return (defaults, None);
        }
    };

    let settings = settings_from_value(&parsed.settings, defaults);
    let high_score = high_score_from_value(&parsed.high_score, path);
    (settings, high_score)
}

fn settings_from_value(value: &serde_json::Value, defaults: CabinetSettings) -> CabinetSettings {
    let mut out = defaults;
    if let Some(lives) = value.get("lives").and_then(|v| v.as_i64()) {
        out.lives = lives as i32;
    }
    if let Some(bonus) = value.get("bonusLifeScore").and_then(|v| v.as_i64()) {
        out.bonus_life_score = bonus as i32;
    }
    if let Some(mult) = value.get("ghostSpeedMult").and_then(|v| v.as_f64()) {
        out.ghost_speed_mult = mult as f32;
    }
    if let Some(mult) = value.get("playerSpeedMult").and_then(|v| v.as_f64()) {
        out.player_speed_mult = mult as f32;
    }
    if let Some(ms) = value.get("frightMs").and_then(|v| v.as_f64()) {
        out.fright_ms = ms as f32;
    }
    if let Some(mult) = value.get("fruitScoreMult").and_then(|v| v.as_f64()) {
        out.fruit_score_mult = mult as f32;
    }
    if let Some(difficulty) = value
        .get("difficulty")
        .and_then(|v| v.as_str())
        .and_then(Difficulty::parse)
    {
        out.difficulty = difficulty;
    }
    out.sanitized()
}

fn high_score_from_value(value: &serde_json::Value, path: &Path) -> Option<HighScoreRecord> {
    if value.is_null() {
        return None;
    }
    let score = match value.get("score").and_then(|v| v.as_i64()) {
        Some(score) if score > 0 => score as i32,
        _ => {
            eprintln!(
                "[settings-store] ignoring malformed high score in {}",
                path.display()
            );
            return None;
        }
    };
    let achieved_at_iso = value
        .get("achievedAtIso")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    Some(HighScoreRecord {
        score,
        achieved_at_iso,
    })
}
