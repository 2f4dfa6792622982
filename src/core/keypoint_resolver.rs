// Keypoint resolution - maps upstream keypoints onto canonical joints

use crate::models::pose::{FrameKeypoints, Joint, JointId, RawKeypoint};

/// Resolves canonical joints out of a frame regardless of which pose model
/// produced it.
///
/// Lookup order is the canonical flat name first, then the legacy camel-case
/// name, each checked against both the `name` and `part` fields. Keypoints
/// without usable coordinates are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypointResolver;

impl KeypointResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, frame: &FrameKeypoints, id: JointId) -> Option<Joint> {
        Self::find(&frame.keypoints, id.canonical_name())
            .or_else(|| Self::find(&frame.keypoints, id.legacy_name()))
            .and_then(|raw| {
                let position = raw.position()?;
                Some(Joint::new(id, position.x, position.y, raw.confidence()))
            })
    }

    /// Resolve several joints at once, preserving the requested order
    pub fn resolve_all<I>(&self, frame: &FrameKeypoints, ids: I) -> Vec<(JointId, Option<Joint>)>
    where
        I: IntoIterator<Item = JointId>,
    {
        ids.into_iter()
            .map(|id| (id, self.resolve(frame, id)))
            .collect()
    }

    fn find<'a>(keypoints: &'a [RawKeypoint], label: &str) -> Option<&'a RawKeypoint> {
        keypoints
            .iter()
            .filter(|kp| kp.position().is_some())
            .find(|kp| kp.has_label(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::Position;

    #[test]
    fn test_resolves_modern_name() {
        let frame = FrameKeypoints::new(
            0,
            vec![RawKeypoint::named("left_knee", 0.3, 0.6, 0.9)],
        );
        let joint = KeypointResolver::new()
            .resolve(&frame, JointId::LeftKnee)
            .expect("left knee should resolve");
        assert_eq!(joint.id, JointId::LeftKnee);
        assert_eq!((joint.x, joint.y), (0.3, 0.6));
        assert_eq!(joint.confidence, 0.9);
    }

    #[test]
    fn test_resolves_legacy_posenet_shape() {
        let frame = FrameKeypoints::new(
            0,
            vec![RawKeypoint::legacy("rightWrist", 12.0, 34.0, 0.7)],
        );
        let joint = KeypointResolver::new()
            .resolve(&frame, JointId::RightWrist)
            .expect("legacy wrist should resolve");
        assert_eq!(joint.position(), Position { x: 12.0, y: 34.0 });
    }

    #[test]
    fn test_canonical_part_field_is_accepted() {
        let mut raw = RawKeypoint::legacy("left_hip", 1.0, 2.0, 0.5);
        raw.name = None;
        let frame = FrameKeypoints::new(0, vec![raw]);
        assert!(KeypointResolver::new().resolve(&frame, JointId::LeftHip).is_some());
    }

    #[test]
    fn test_canonical_match_takes_precedence_over_legacy() {
        let frame = FrameKeypoints::new(
            0,
            vec![
                RawKeypoint::legacy("leftAnkle", 9.0, 9.0, 0.9),
                RawKeypoint::named("left_ankle", 1.0, 1.0, 0.9),
            ],
        );
        let joint = KeypointResolver::new().resolve(&frame, JointId::LeftAnkle).unwrap();
        assert_eq!((joint.x, joint.y), (1.0, 1.0));
    }

    #[test]
    fn test_missing_joint_or_coordinates_is_not_found() {
        let resolver = KeypointResolver::new();
        assert!(resolver.resolve(&FrameKeypoints::empty(0), JointId::Nose).is_none());

        let no_coords = RawKeypoint {
            name: Some("nose".to_string()),
            score: Some(0.9),
            ..RawKeypoint::default()
        };
        let frame = FrameKeypoints::new(0, vec![no_coords]);
        assert!(resolver.resolve(&frame, JointId::Nose).is_none());
    }

    #[test]
    fn test_resolve_all_preserves_order() {
        let frame = FrameKeypoints::new(0, vec![RawKeypoint::named("right_hip", 0.0, 0.0, 1.0)]);
        let resolved = KeypointResolver::new()
            .resolve_all(&frame, [JointId::LeftHip, JointId::RightHip]);
        assert_eq!(resolved[0].0, JointId::LeftHip);
        assert!(resolved[0].1.is_none());
        assert!(resolved[1].1.is_some());
    }
}
