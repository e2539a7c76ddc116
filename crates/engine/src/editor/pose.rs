use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assets::ImageAsset;

/// Closed set of sprite slots. Also used as the character's animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoseId {
    Standing,
    WalkingLeft,
    WalkingRight,
    Running,
    Jumping,
    Crouching,
    Sitting,
}

pub const POSE_COUNT: usize = 7;

impl PoseId {
    pub const ALL: [PoseId; POSE_COUNT] = [
        PoseId::Standing,
        PoseId::WalkingLeft,
        PoseId::WalkingRight,
        PoseId::Running,
        PoseId::Jumping,
        PoseId::Crouching,
        PoseId::Sitting,
    ];

    pub const fn index(self) -> usize {
        match self {
            PoseId::Standing => 0,
            PoseId::WalkingLeft => 1,
            PoseId::WalkingRight => 2,
            PoseId::Running => 3,
            PoseId::Jumping => 4,
            PoseId::Crouching => 5,
            PoseId::Sitting => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PoseId::Standing => "standing",
            PoseId::WalkingLeft => "walkingLeft",
            PoseId::WalkingRight => "walkingRight",
            PoseId::Running => "running",
            PoseId::Jumping => "jumping",
            PoseId::Crouching => "crouching",
            PoseId::Sitting => "sitting",
        }
    }

    /// Next slot in canonical order, wrapping around.
    pub fn next(self) -> PoseId {
        Self::ALL[(self.index() + 1) % POSE_COUNT]
    }
}

impl fmt::Display for PoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoseSet {
    slots: [Option<ImageAsset>; POSE_COUNT],
}

impl PoseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pose: PoseId) -> Option<&ImageAsset> {
        self.slots[pose.index()].as_ref()
    }

    pub fn contains(&self, pose: PoseId) -> bool {
        self.slots[pose.index()].is_some()
    }

    /// Stores `asset` in the slot and returns whatever it replaced.
    pub fn insert(&mut self, pose: PoseId, asset: ImageAsset) -> Option<ImageAsset> {
        self.slots[pose.index()].replace(asset)
    }

    pub fn remove(&mut self, pose: PoseId) -> Option<ImageAsset> {
        self.slots[pose.index()].take()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Absent poses in canonical order.
    pub fn missing(&self) -> Vec<PoseId> {
        PoseId::ALL
            .into_iter()
            .filter(|pose| !self.contains(*pose))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseId, &ImageAsset)> {
        PoseId::ALL
            .into_iter()
            .filter_map(|pose| self.get(pose).map(|asset| (pose, asset)))
    }
}

impl FromIterator<(PoseId, ImageAsset)> for PoseSet {
    fn from_iter<I: IntoIterator<Item = (PoseId, ImageAsset)>>(iter: I) -> Self {
        let mut set = PoseSet::new();
        for (pose, asset) in iter {
            set.insert(pose, asset);
        }
        set
    }
}

// Serialized as a `{poseId: dataUri}` map holding only the present slots.
impl Serialize for PoseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<PoseId, &ImageAsset> = self.iter().collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PoseSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<PoseId, ImageAsset>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelBuffer;

    fn asset(shade: u8) -> ImageAsset {
        let buffer = PixelBuffer::from_fn(2, 2, |_, _| [shade, shade, shade, 255]).expect("buffer");
        ImageAsset::from_buffer(buffer).expect("asset")
    }

    #[test]
    fn missing_lists_absent_poses_in_order() {
        let mut set = PoseSet::new();
        set.insert(PoseId::Running, asset(1));
        set.insert(PoseId::Standing, asset(2));

        assert_eq!(
            set.missing(),
            vec![
                PoseId::WalkingLeft,
                PoseId::WalkingRight,
                PoseId::Jumping,
                PoseId::Crouching,
                PoseId::Sitting,
            ]
        );
        assert!(!set.is_complete());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn complete_when_all_seven_present() {
        let set: PoseSet = PoseId::ALL.into_iter().map(|pose| (pose, asset(3))).collect();
        assert!(set.is_complete());
        assert!(set.missing().is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut set = PoseSet::new();
        set.insert(PoseId::WalkingLeft, asset(4));
        let json = serde_json::to_value(&set).expect("json");
        let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
        assert_eq!(keys, vec!["walkingLeft"]);

        let back: PoseSet = serde_json::from_value(json).expect("parse");
        assert_eq!(back, set);
    }

    #[test]
    fn next_cycles_through_every_pose() {
        let mut pose = PoseId::Standing;
        for expected in PoseId::ALL.iter().skip(1) {
            pose = pose.next();
            assert_eq!(pose, *expected);
        }
        assert_eq!(pose.next(), PoseId::Standing);
    }
}
