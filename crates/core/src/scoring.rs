//! Scoring module - line-clear points, level and gravity model
//!
//! Score, lines and level change together in one step
//! ([`ScoreState::apply_line_clear`]): lines first, then the level is recomputed
//! from lines, then points are awarded using that new level.

use crate::types::{
    BASE_GRAVITY_MS, GRAVITY_FLOOR_MS, GRAVITY_STEP_MS, LINES_PER_LEVEL, LINE_SCORES,
};

/// Points for clearing `lines` rows at `level` (0-based).
///
/// Counts outside 1..=4 score nothing.
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines >= LINE_SCORES.len() {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level.saturating_add(1))
}

/// Level reached after clearing `total_lines`
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL
}

/// Gravity interval for a level, in milliseconds: `max(100, 800 - level * 80)`.
pub fn gravity_interval_ms(level: u32) -> u32 {
    BASE_GRAVITY_MS
        .saturating_sub(level.saturating_mul(GRAVITY_STEP_MS))
        .max(GRAVITY_FLOOR_MS)
}

/// Result of a single line-clear update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub points: u32,
    pub level_before: u32,
    pub level_after: u32,
}

impl ScoreResult {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Score, cleared lines and level of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreState {
    score: u32,
    lines: u32,
    level: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Record `cleared` lines from one lock.
    ///
    /// The multiplier uses the level after the lines are added.
    pub fn apply_line_clear(&mut self, cleared: usize) -> ScoreResult {
        let level_before = self.level;
        if cleared == 0 {
            return ScoreResult {
                points: 0,
                level_before,
                level_after: level_before,
            };
        }

        self.lines = self.lines.saturating_add(cleared as u32);
        self.level = calculate_level(self.lines);
        let points = calculate_line_score(cleared, self.level);
        self.score = self.score.saturating_add(points);

        ScoreResult {
            points,
            level_before,
            level_after: self.level,
        }
    }

    /// Gravity interval for the current level
    pub fn gravity_interval_ms(&self) -> u32 {
        gravity_interval_ms(self.level)
    }
}
