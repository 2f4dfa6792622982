// Quality gate - rejects frames whose measurement cannot be trusted

use crate::models::exercise::{ExerciseProfile, Quality};
use crate::models::pose::{Joint, JointId};
use serde::{Deserialize, Serialize};

/// Confidence at or below which a joint is treated as undetected
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    MissingJoint { joint: JointId },
    LowConfidence { joint: JointId, confidence: f32 },
    OutOfEnvelope { angle: f32 },
}

impl RejectReason {
    /// Every rejection is an input-quality problem and reads as "poor"
    pub fn quality(&self) -> Quality {
        Quality::Poor
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    min_confidence: f32,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

impl QualityGate {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Require every joint to be present and confidently detected.
    ///
    /// Returns the joints in the order given so callers can index them.
    pub fn check_joints(
        &self,
        joints: &[(JointId, Option<Joint>)],
    ) -> Result<Vec<Joint>, RejectReason> {
        joints
            .iter()
            .map(|(id, joint)| match joint {
                None => Err(RejectReason::MissingJoint { joint: *id }),
                Some(joint) if !joint.is_visible(self.min_confidence) => {
                    Err(RejectReason::LowConfidence {
                        joint: *id,
                        confidence: joint.confidence,
                    })
                }
                Some(joint) => Ok(*joint),
            })
            .collect()
    }

    /// Reject angles outside the exercise's plausible range (NaN included)
    pub fn check_angle(&self, profile: &ExerciseProfile, angle: f32) -> Result<f32, RejectReason> {
        if profile.in_envelope(angle) {
            Ok(angle)
        } else {
            Err(RejectReason::OutOfEnvelope { angle })
        }
    }
}
