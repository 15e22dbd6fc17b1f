use std::collections::VecDeque;

use crate::types::{Direction, SoundCue};

pub trait InputSource {
    fn next_direction(&mut self) -> Direction;
    fn clear_next_direction(&mut self);
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
    fn start_siren(&mut self);
    fn stop_siren(&mut self);
}

pub struct IdleInput;

impl InputSource for IdleInput {
    fn next_direction(&mut self) -> Direction {
        Direction::None
    }

    fn clear_next_direction(&mut self) {}
}

#[derive(Clone, Debug, Default)]
pub struct QueuedInput {
    queue: VecDeque<Direction>,
}

impl QueuedInput {
    pub fn new(moves: &[Direction]) -> Self {
        Self {
            queue: moves.iter().copied().collect(),
        }
    }

    pub fn push(&mut self, dir: Direction) {
        self.queue.push_back(dir);
    }
}

impl InputSource for QueuedInput {
    fn next_direction(&mut self) -> Direction {
        self.queue.front().copied().unwrap_or(Direction::None)
    }

    fn clear_next_direction(&mut self) {
        self.queue.pop_front();
    }
}

pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}

    fn start_siren(&mut self) {}

    fn stop_siren(&mut self) {}
}

#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    pub cues: Vec<SoundCue>,
    pub siren_on: bool,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }

    fn start_siren(&mut self) {
        self.siren_on = true;
    }

    fn stop_siren(&mut self) {
        self.siren_on = false;
    }
}
