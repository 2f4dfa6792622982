// Exercise definitions: per-exercise geometry, thresholds and phase labels

use crate::models::pose::JointId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    Pushup,
}

impl ExerciseType {
    pub fn all() -> Vec<ExerciseType> {
        vec![ExerciseType::Squat, ExerciseType::Pushup]
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            ExerciseType::Squat => "squat",
            ExerciseType::Pushup => "pushup",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "squat" | "squats" => Ok(ExerciseType::Squat),
            "pushup" | "pushups" | "push-up" | "push_up" => Ok(ExerciseType::Pushup),
            _ => Err(format!("Unknown exercise: {}", s)),
        }
    }

    /// Built-in profile row for this exercise
    pub fn default_profile(&self) -> ExerciseProfile {
        match self {
            ExerciseType::Squat => ExerciseProfile {
                exercise: ExerciseType::Squat,
                left_joints: [JointId::LeftHip, JointId::LeftKnee, JointId::LeftAnkle],
                right_joints: [JointId::RightHip, JointId::RightKnee, JointId::RightAnkle],
                down_threshold: 165.0,
                up_threshold: 175.0,
                cooldown_ms: 800,
                envelope_min: 50.0,
                envelope_max: 190.0,
            },
            ExerciseType::Pushup => ExerciseProfile {
                exercise: ExerciseType::Pushup,
                left_joints: [JointId::LeftShoulder, JointId::LeftElbow, JointId::LeftWrist],
                right_joints: [
                    JointId::RightShoulder,
                    JointId::RightElbow,
                    JointId::RightWrist,
                ],
                down_threshold: 90.0,
                up_threshold: 160.0,
                cooldown_ms: 700,
                envelope_min: 40.0,
                envelope_max: 180.0,
            },
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

// ==============================================================================
// Exercise Profile
// ==============================================================================

/// One row of the exercise table.
///
/// Each side is an `[outer, vertex, outer]` joint triple; the tracked angle is
/// the mean of the two vertex angles. The threshold values are empirically
/// tuned and kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    pub left_joints: [JointId; 3],
    pub right_joints: [JointId; 3],
    /// Below this angle the body counts as lowered
    pub down_threshold: f32,
    /// Above this angle the body counts as raised
    pub up_threshold: f32,
    /// Minimum time between two counted reps
    pub cooldown_ms: i64,
    /// Physiologically plausible angle range, inclusive
    pub envelope_min: f32,
    pub envelope_max: f32,
}

impl ExerciseProfile {
    pub fn required_joints(&self) -> impl Iterator<Item = JointId> + '_ {
        self.left_joints.iter().chain(self.right_joints.iter()).copied()
    }

    pub fn in_envelope(&self, angle: f32) -> bool {
        (self.envelope_min..=self.envelope_max).contains(&angle)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.down_threshold < self.up_threshold) {
            return Err(format!(
                "{}: down threshold {} must be below up threshold {}",
                self.exercise, self.down_threshold, self.up_threshold
            ));
        }
        if !(self.envelope_min < self.envelope_max) {
            return Err(format!(
                "{}: envelope [{}, {}] is empty",
                self.exercise, self.envelope_min, self.envelope_max
            ));
        }
        if self.cooldown_ms < 0 {
            return Err(format!(
                "{}: cooldown must not be negative, got {}",
                self.exercise, self.cooldown_ms
            ));
        }
        Ok(())
    }
}

// ==============================================================================
// Phase & Quality
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    #[default]
    Ready,
    Down,
    Up,
}

impl RepPhase {
    /// Display label, e.g. squats read SQUATTING/STANDING
    pub fn label(&self, exercise: ExerciseType) -> &'static str {
        match (self, exercise) {
            (RepPhase::Ready, _) => "ready",
            (RepPhase::Down, ExerciseType::Squat) => "squatting",
            (RepPhase::Up, ExerciseType::Squat) => "standing",
            (RepPhase::Down, ExerciseType::Pushup) => "down",
            (RepPhase::Up, ExerciseType::Pushup) => "up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Good,
    Poor,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Poor => "poor",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
