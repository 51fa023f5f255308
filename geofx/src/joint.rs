use {
    crate::scene::scene_pose,
    hecs::{Entity, World},
    nalgebra as na,
    smallvec::SmallVec,
    std::fmt::Debug,
};

/// Sampled state of a single joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointPose {
    pub position: na::Point3<f32>,
    pub up: na::Vector3<f32>,
    pub right: na::Vector3<f32>,
}

impl JointPose {
    /// Unrotated joint at `position`.
    pub fn at(position: na::Point3<f32>) -> Self {
        JointPose {
            position,
            up: na::Vector3::y(),
            right: na::Vector3::x(),
        }
    }

    pub fn from_iso(iso: &na::Isometry3<f32>) -> Self {
        JointPose {
            position: na::Point3::from(iso.translation.vector),
            up: iso.rotation * na::Vector3::y(),
            right: iso.rotation * na::Vector3::x(),
        }
    }
}

/// Joint lookup capability.
/// Resolves a joint handle to its current pose.
pub trait JointSource {
    type Joint: Copy + Debug;

    /// Returns `None` if the joint is not bound to a transform.
    fn joint_pose(&self, joint: Self::Joint) -> Option<JointPose>;
}

/// Joint source that can also enumerate children of its joints.
pub trait Hierarchy: JointSource {
    /// Children of `node` in their stored order.
    fn children(&self, node: Self::Joint) -> SmallVec<[Self::Joint; 8]>;
}

impl<S> JointSource for &S
where
    S: JointSource + ?Sized,
{
    type Joint = S::Joint;

    fn joint_pose(&self, joint: S::Joint) -> Option<JointPose> {
        (**self).joint_pose(joint)
    }
}

impl<H> Hierarchy for &H
where
    H: Hierarchy + ?Sized,
{
    fn children(&self, node: H::Joint) -> SmallVec<[H::Joint; 8]> {
        (**self).children(node)
    }
}

/// Symbolic joints of a humanoid rig.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum HumanBone {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
}

impl HumanBone {
    pub const COUNT: usize = 25;

    pub const ALL: [HumanBone; HumanBone::COUNT] = [
        HumanBone::Hips,
        HumanBone::LeftUpperLeg,
        HumanBone::RightUpperLeg,
        HumanBone::LeftLowerLeg,
        HumanBone::RightLowerLeg,
        HumanBone::LeftFoot,
        HumanBone::RightFoot,
        HumanBone::Spine,
        HumanBone::Chest,
        HumanBone::UpperChest,
        HumanBone::Neck,
        HumanBone::Head,
        HumanBone::LeftShoulder,
        HumanBone::RightShoulder,
        HumanBone::LeftUpperArm,
        HumanBone::RightUpperArm,
        HumanBone::LeftLowerArm,
        HumanBone::RightLowerArm,
        HumanBone::LeftHand,
        HumanBone::RightHand,
        HumanBone::LeftToes,
        HumanBone::RightToes,
        HumanBone::LeftEye,
        HumanBone::RightEye,
        HumanBone::Jaw,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Binding of a skeleton to one animation source in a world.
///
/// Fixed topologies look joints up by [`HumanBone`],
/// hierarchy traversal starts at `root`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rig {
    root: Entity,
    joints: [Option<Entity>; HumanBone::COUNT],
}

impl Rig {
    pub fn new(root: Entity) -> Self {
        Rig {
            root,
            joints: [None; HumanBone::COUNT],
        }
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn set_root(&mut self, root: Entity) {
        self.root = root;
    }

    pub fn with(mut self, bone: HumanBone, entity: Entity) -> Self {
        self.bind(bone, entity);
        self
    }

    pub fn bind(&mut self, bone: HumanBone, entity: Entity) -> &mut Self {
        self.joints[bone.index()] = Some(entity);
        self
    }

    pub fn unbind(&mut self, bone: HumanBone) -> Option<Entity> {
        self.joints[bone.index()].take()
    }

    pub fn get(&self, bone: HumanBone) -> Option<Entity> {
        self.joints[bone.index()]
    }

    /// Bound joints in [`HumanBone`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HumanBone, Entity)> + '_ {
        HumanBone::ALL
            .iter()
            .filter_map(move |&bone| Some((bone, self.get(bone)?)))
    }
}

/// Humanoid joint lookup over a rig bound into a world.
#[derive(Clone, Copy)]
pub struct Avatar<'a> {
    world: &'a World,
    rig: &'a Rig,
}

impl<'a> Avatar<'a> {
    pub fn new(world: &'a World, rig: &'a Rig) -> Self {
        Avatar { world, rig }
    }
}

impl JointSource for Avatar<'_> {
    type Joint = HumanBone;

    fn joint_pose(&self, joint: HumanBone) -> Option<JointPose> {
        scene_pose(self.world, self.rig.get(joint)?)
    }
}
