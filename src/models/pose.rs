// Data models for body keypoints as delivered by the upstream pose estimator

use serde::{Deserialize, Serialize};

// ==============================================================================
// Canonical Joints (17 COCO keypoints)
// ==============================================================================

/// Canonical body joint ids shared by MoveNet, BlazePose (subset) and PoseNet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// Naming table: canonical id, modern flat name, legacy camel-case name.
/// New pose-model naming schemes only need a column here.
const JOINT_NAMES: [(JointId, &str, &str); 17] = [
    (JointId::Nose, "nose", "nose"),
    (JointId::LeftEye, "left_eye", "leftEye"),
    (JointId::RightEye, "right_eye", "rightEye"),
    (JointId::LeftEar, "left_ear", "leftEar"),
    (JointId::RightEar, "right_ear", "rightEar"),
    (JointId::LeftShoulder, "left_shoulder", "leftShoulder"),
    (JointId::RightShoulder, "right_shoulder", "rightShoulder"),
    (JointId::LeftElbow, "left_elbow", "leftElbow"),
    (JointId::RightElbow, "right_elbow", "rightElbow"),
    (JointId::LeftWrist, "left_wrist", "leftWrist"),
    (JointId::RightWrist, "right_wrist", "rightWrist"),
    (JointId::LeftHip, "left_hip", "leftHip"),
    (JointId::RightHip, "right_hip", "rightHip"),
    (JointId::LeftKnee, "left_knee", "leftKnee"),
    (JointId::RightKnee, "right_knee", "rightKnee"),
    (JointId::LeftAnkle, "left_ankle", "leftAnkle"),
    (JointId::RightAnkle, "right_ankle", "rightAnkle"),
];

impl JointId {
    pub fn all() -> impl Iterator<Item = JointId> {
        JOINT_NAMES.iter().map(|(id, _, _)| *id)
    }

    /// Modern flat name, e.g. `left_shoulder`
    pub fn canonical_name(&self) -> &'static str {
        Self::names(*self).0
    }

    /// Legacy PoseNet camel-case name, e.g. `leftShoulder`
    pub fn legacy_name(&self) -> &'static str {
        Self::names(*self).1
    }

    fn names(id: JointId) -> (&'static str, &'static str) {
        JOINT_NAMES
            .iter()
            .find(|(candidate, _, _)| *candidate == id)
            .map(|(_, canonical, legacy)| (*canonical, *legacy))
            .unwrap_or(("", ""))
    }
}

// ==============================================================================
// Raw upstream keypoints
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One keypoint exactly as the pose model emitted it.
///
/// Newer models (MoveNet, BlazePose) send `{name, x, y, score}`; legacy PoseNet
/// sends `{part, position: {x, y}, score}`. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl RawKeypoint {
    /// Modern flat keypoint
    pub fn named(name: &str, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: Some(name.to_string()),
            x: Some(x),
            y: Some(y),
            score: Some(score),
            ..Self::default()
        }
    }

    /// Legacy PoseNet keypoint with nested position
    pub fn legacy(part: &str, x: f32, y: f32, score: f32) -> Self {
        Self {
            part: Some(part.to_string()),
            position: Some(Position { x, y }),
            score: Some(score),
            ..Self::default()
        }
    }

    /// Nested position wins over flat coordinates
    pub fn position(&self) -> Option<Position> {
        if let Some(position) = self.position {
            return Some(position);
        }
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        }
    }

    pub fn confidence(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.name.as_deref() == Some(label) || self.part.as_deref() == Some(label)
    }
}

/// All keypoints of the single tracked body for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameKeypoints {
    pub timestamp_ms: i64,
    #[serde(default)]
    pub keypoints: Vec<RawKeypoint>,
}

impl FrameKeypoints {
    pub fn new(timestamp_ms: i64, keypoints: Vec<RawKeypoint>) -> Self {
        Self {
            timestamp_ms,
            keypoints,
        }
    }

    pub fn empty(timestamp_ms: i64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

// ==============================================================================
// Resolved joint
// ==============================================================================

/// A keypoint resolved to its canonical id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: JointId,
    pub x: f32,
    pub y: f32,
    pub confidence: f32, // Detection confidence [0, 1]
}

impl Joint {
    pub fn new(id: JointId, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            id,
            x,
            y,
            confidence,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }
}
