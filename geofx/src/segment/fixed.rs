use {
    super::Segment,
    crate::{
        error::Error,
        joint::{HumanBone, JointPose, JointSource},
    },
    nalgebra as na,
};

/// Authored bone: a pair of humanoid joints with a radius.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bone {
    pub from: HumanBone,
    pub to: HumanBone,
    pub radius: f32,
}

impl Bone {
    pub fn new(from: HumanBone, to: HumanBone, radius: f32) -> Self {
        Bone {
            from,
            to,
            radius: clamp_radius(radius),
        }
    }

    /// Returns copy of this bone with radius clamped to be non-negative.
    pub fn sanitized(self) -> Self {
        Bone::new(self.from, self.to, self.radius)
    }
}

fn clamp_radius(radius: f32) -> f32 {
    // `f32::max` also maps NaN to zero.
    radius.max(0.0)
}

/// Explicit bone list resolved against a humanoid joint source.
///
/// Bones whose joints fail to resolve collapse into zero-length,
/// zero-radius segments placed at the endpoint that did resolve
/// (origin if neither did). The segment count therefore always matches the
/// bone count and a missing joint never changes the mesh topology.
/// Every missing joint is reported once until the bone list is edited.
#[derive(Clone, Debug)]
pub struct FixedTopology {
    bones: Vec<Bone>,
    reported: u64,
}

impl Default for FixedTopology {
    fn default() -> Self {
        FixedTopology::humanoid()
    }
}

impl FixedTopology {
    pub fn new(bones: Vec<Bone>) -> Self {
        let mut topology = FixedTopology {
            bones: Vec::new(),
            reported: 0,
        };
        topology.set_bones(bones);
        topology
    }

    /// Legs, spine, head and arms of a humanoid, 17 bones.
    pub fn humanoid() -> Self {
        FixedTopology::new(humanoid_bones())
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn set_bones(&mut self, bones: Vec<Bone>) {
        self.bones = bones;
        for bone in &mut self.bones {
            *bone = bone.sanitized();
        }
        self.reported = 0;
    }

    pub fn push_bone(&mut self, bone: Bone) {
        self.bones.push(bone.sanitized());
        self.reported = 0;
    }

    /// Returns `false` if `index > len`.
    pub fn insert_bone(&mut self, index: usize, bone: Bone) -> bool {
        if index > self.bones.len() {
            return false;
        }

        self.bones.insert(index, bone.sanitized());
        self.reported = 0;
        true
    }

    pub fn remove_bone(&mut self, index: usize) -> Option<Bone> {
        if index < self.bones.len() {
            self.reported = 0;
            Some(self.bones.remove(index))
        } else {
            None
        }
    }

    /// Moves bone at `from` so that it ends up at `to`.
    /// Returns `false` if either index is out of bounds.
    pub fn move_bone(&mut self, from: usize, to: usize) -> bool {
        let len = self.bones.len();
        if from >= len || to >= len {
            return false;
        }

        let bone = self.bones.remove(from);
        self.bones.insert(to, bone);
        self.reported = 0;
        true
    }

    pub fn set_radius(&mut self, index: usize, radius: f32) -> bool {
        match self.bones.get_mut(index) {
            Some(bone) => {
                bone.radius = clamp_radius(radius);
                self.reported = 0;
                true
            }
            None => false,
        }
    }

    /// Checks that every joint referenced by the bone list resolves.
    /// Intended for configuration time, the per-frame path never fails.
    pub fn validate<S>(&self, source: &S) -> Result<(), Error>
    where
        S: JointSource<Joint = HumanBone>,
    {
        for bone in &self.bones {
            for &joint in &[bone.from, bone.to] {
                if source.joint_pose(joint).is_none() {
                    return Err(Error::UnboundJoint { joint });
                }
            }
        }
        Ok(())
    }

    /// Fills `out` with one segment per bone, in bone order.
    pub fn resolve<S>(&mut self, source: &S, out: &mut Vec<Segment>)
    where
        S: JointSource<Joint = HumanBone>,
    {
        out.clear();
        out.reserve(self.bones.len());

        for bone in &self.bones {
            let from = source.joint_pose(bone.from);
            let to = source.joint_pose(bone.to);

            let segment = match (&from, &to) {
                (Some(from), Some(to)) => Segment::between(from, to, bone.radius),
                (Some(pose), None) | (None, Some(pose)) => {
                    Segment::degenerate(pose)
                }
                (None, None) => {
                    Segment::degenerate(&JointPose::at(na::Point3::origin()))
                }
            };

            if from.is_none() {
                report_missing(&mut self.reported, bone.from);
            }
            if to.is_none() {
                report_missing(&mut self.reported, bone.to);
            }

            out.push(segment);
        }
    }
}

fn report_missing(reported: &mut u64, joint: HumanBone) {
    let bit = 1u64 << joint.index();
    if *reported & bit == 0 {
        *reported |= bit;
        tracing::warn!(
            "Joint {:?} is not bound to a transform, its bones collapse to zero length",
            joint
        );
    }
}

fn humanoid_bones() -> Vec<Bone> {
    use HumanBone::*;

    vec![
        Bone::new(Hips, LeftUpperLeg, 1.0),
        Bone::new(LeftUpperLeg, LeftLowerLeg, 1.0),
        Bone::new(LeftLowerLeg, LeftFoot, 1.0),
        Bone::new(LeftFoot, LeftToes, 1.0),
        Bone::new(Hips, RightUpperLeg, 1.0),
        Bone::new(RightUpperLeg, RightLowerLeg, 1.0),
        Bone::new(RightLowerLeg, RightFoot, 1.0),
        Bone::new(RightFoot, RightToes, 1.0),
        Bone::new(Hips, Chest, 1.0),
        Bone::new(Chest, Neck, 1.0),
        Bone::new(Neck, Head, 1.0),
        Bone::new(Neck, LeftUpperArm, 1.0),
        Bone::new(LeftUpperArm, LeftLowerArm, 1.0),
        Bone::new(LeftLowerArm, LeftHand, 1.0),
        Bone::new(Neck, RightUpperArm, 1.0),
        Bone::new(RightUpperArm, RightLowerArm, 1.0),
        Bone::new(RightLowerArm, RightHand, 1.0),
    ]
}
