// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint names, catalogs, and skeleton definitions.
//!
//! A catalog fixes the channel order of every score and offset volume a
//! network produces, and the order of keypoints in every decoded [`Pose`].
//!
//! [`Pose`]: crate::results::Pose

use std::fmt;
use std::str::FromStr;

/// Body landmark identifier.
///
/// Covers the union of all supported catalogs; a given network only ever
/// produces the subset listed in its [`KeypointCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypointName {
    Nose,
    Neck,
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

impl KeypointName {
    /// Returns the camelCase part name (e.g. `leftShoulder`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Neck => "neck",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
        }
    }

    const ALL: [Self; 18] = [
        Self::Nose,
        Self::Neck,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];
}

impl fmt::Display for KeypointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeypointName {
    type Err = KeypointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| KeypointParseError(s.to_string()))
    }
}

/// Error returned when parsing an unknown keypoint name.
#[derive(Debug, Clone)]
pub struct KeypointParseError(String);

impl fmt::Display for KeypointParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown keypoint name '{}'", self.0)
    }
}

impl std::error::Error for KeypointParseError {}

/// 17-part catalog produced by the offset-capable networks (ResNet50, MobileNetV1).
pub const POSENET_PARTS: [KeypointName; 17] = [
    KeypointName::Nose,
    KeypointName::LeftEye,
    KeypointName::RightEye,
    KeypointName::LeftEar,
    KeypointName::RightEar,
    KeypointName::LeftShoulder,
    KeypointName::RightShoulder,
    KeypointName::LeftElbow,
    KeypointName::RightElbow,
    KeypointName::LeftWrist,
    KeypointName::RightWrist,
    KeypointName::LeftHip,
    KeypointName::RightHip,
    KeypointName::LeftKnee,
    KeypointName::RightKnee,
    KeypointName::LeftAnkle,
    KeypointName::RightAnkle,
];

/// 14-part catalog produced by the heatmap-only CPM network.
pub const CPM_PARTS: [KeypointName; 14] = [
    KeypointName::Nose,
    KeypointName::Neck,
    KeypointName::LeftShoulder,
    KeypointName::LeftElbow,
    KeypointName::LeftWrist,
    KeypointName::RightShoulder,
    KeypointName::RightElbow,
    KeypointName::RightWrist,
    KeypointName::LeftHip,
    KeypointName::LeftKnee,
    KeypointName::LeftAnkle,
    KeypointName::RightHip,
    KeypointName::RightKnee,
    KeypointName::RightAnkle,
];

/// Limbs drawn for the 17-part catalog.
const POSENET_SKELETON: [(KeypointName, KeypointName); 12] = [
    (KeypointName::LeftHip, KeypointName::LeftShoulder),
    (KeypointName::LeftElbow, KeypointName::LeftShoulder),
    (KeypointName::LeftElbow, KeypointName::LeftWrist),
    (KeypointName::LeftHip, KeypointName::LeftKnee),
    (KeypointName::LeftKnee, KeypointName::LeftAnkle),
    (KeypointName::RightHip, KeypointName::RightShoulder),
    (KeypointName::RightElbow, KeypointName::RightShoulder),
    (KeypointName::RightElbow, KeypointName::RightWrist),
    (KeypointName::RightHip, KeypointName::RightKnee),
    (KeypointName::RightKnee, KeypointName::RightAnkle),
    (KeypointName::LeftShoulder, KeypointName::RightShoulder),
    (KeypointName::LeftHip, KeypointName::RightHip),
];

/// Limbs drawn for the 14-part catalog.
const CPM_SKELETON: [(KeypointName, KeypointName); 13] = [
    (KeypointName::Nose, KeypointName::Neck),
    (KeypointName::Neck, KeypointName::LeftShoulder),
    (KeypointName::LeftShoulder, KeypointName::LeftElbow),
    (KeypointName::LeftElbow, KeypointName::LeftWrist),
    (KeypointName::Neck, KeypointName::RightShoulder),
    (KeypointName::RightShoulder, KeypointName::RightElbow),
    (KeypointName::RightElbow, KeypointName::RightWrist),
    (KeypointName::Neck, KeypointName::LeftHip),
    (KeypointName::LeftHip, KeypointName::LeftKnee),
    (KeypointName::LeftKnee, KeypointName::LeftAnkle),
    (KeypointName::Neck, KeypointName::RightHip),
    (KeypointName::RightHip, KeypointName::RightKnee),
    (KeypointName::RightKnee, KeypointName::RightAnkle),
];

/// An ordered keypoint catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypointCatalog {
    /// 17-part PoseNet catalog.
    PoseNet,
    /// 14-part CPM catalog.
    Cpm,
}

impl KeypointCatalog {
    /// Keypoint names in channel order.
    #[must_use]
    pub const fn parts(&self) -> &'static [KeypointName] {
        match self {
            Self::PoseNet => &POSENET_PARTS,
            Self::Cpm => &CPM_PARTS,
        }
    }

    /// Number of keypoints (and score volume channels).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parts().len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parts().is_empty()
    }

    /// Channel index of `name`, if this catalog contains it.
    #[must_use]
    pub fn index_of(&self, name: KeypointName) -> Option<usize> {
        self.parts().iter().position(|&part| part == name)
    }

    /// Pairs of keypoints connected by a limb.
    #[must_use]
    pub const fn skeleton(&self) -> &'static [(KeypointName, KeypointName)] {
        match self {
            Self::PoseNet => &POSENET_SKELETON,
            Self::Cpm => &CPM_SKELETON,
        }
    }
}
