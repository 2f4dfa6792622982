// Per-frame evaluation: resolve joints -> measure angle -> gate

use crate::core::angle::bilateral_angle;
use crate::core::keypoint_resolver::KeypointResolver;
use crate::core::quality_gate::{QualityGate, RejectReason};
use crate::models::exercise::{ExerciseProfile, Quality};
use crate::models::pose::{FrameKeypoints, Position};
use crate::models::session::AngleSample;

/// Result of evaluating one frame against an exercise profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvaluation {
    Accepted(AngleSample),
    Rejected {
        reason: RejectReason,
        /// Present when the joints were good but the angle was implausible
        angle: Option<f32>,
    },
}

impl FrameEvaluation {
    pub fn quality(&self) -> Quality {
        match self {
            FrameEvaluation::Accepted(_) => Quality::Good,
            FrameEvaluation::Rejected { reason, .. } => reason.quality(),
        }
    }

    /// Angle to display, if one could be measured
    pub fn angle(&self) -> Option<f32> {
        match self {
            FrameEvaluation::Accepted(sample) => Some(sample.value),
            FrameEvaluation::Rejected { angle, .. } => *angle,
        }
    }

    pub fn sample(&self) -> Option<AngleSample> {
        match self {
            FrameEvaluation::Accepted(sample) => Some(*sample),
            FrameEvaluation::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FramePipeline {
    profile: ExerciseProfile,
    resolver: KeypointResolver,
    gate: QualityGate,
}

impl FramePipeline {
    pub fn new(profile: ExerciseProfile, gate: QualityGate) -> Self {
        Self {
            profile,
            resolver: KeypointResolver::new(),
            gate,
        }
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn evaluate(&self, frame: &FrameKeypoints) -> FrameEvaluation {
        let resolved = self
            .resolver
            .resolve_all(frame, self.profile.required_joints());

        let joints = match self.gate.check_joints(&resolved) {
            Ok(joints) => joints,
            Err(reason) => return FrameEvaluation::Rejected { reason, angle: None },
        };

        // required_joints() yields the left triple then the right triple
        let side = |offset: usize| -> [Position; 3] {
            [
                joints[offset].position(),
                joints[offset + 1].position(),
                joints[offset + 2].position(),
            ]
        };
        let angle = bilateral_angle(side(0), side(3));

        match self.gate.check_angle(&self.profile, angle) {
            Ok(angle) => FrameEvaluation::Accepted(AngleSample::new(angle, frame.timestamp_ms)),
            Err(reason) => FrameEvaluation::Rejected {
                reason,
                angle: Some(angle),
            },
        }
    }
}
