mod fixed;
mod hierarchy;

pub use self::{
    fixed::{Bone, FixedTopology},
    hierarchy::HierarchyWalk,
};

use {
    crate::{
        joint::{Avatar, JointPose, Rig},
        scene::SceneJoints,
    },
    hecs::{Entity, World},
    nalgebra as na,
};

/// One line primitive of the skeleton mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: na::Point3<f32>,
    pub b: na::Point3<f32>,
    pub normal_a: na::Vector3<f32>,
    pub normal_b: na::Vector3<f32>,
    pub tangent_a: na::Vector4<f32>,
    pub tangent_b: na::Vector4<f32>,
    pub radius: f32,
}

impl Segment {
    pub fn between(from: &JointPose, to: &JointPose, radius: f32) -> Self {
        Segment {
            a: from.position,
            b: to.position,
            normal_a: from.up,
            normal_b: to.up,
            tangent_a: tangent(&from.right),
            tangent_b: tangent(&to.right),
            radius,
        }
    }

    /// Zero-length, zero-radius segment collapsed onto `at`.
    pub fn degenerate(at: &JointPose) -> Self {
        Segment::between(at, at, 0.0)
    }

    pub fn length(&self) -> f32 {
        na::distance(&self.a, &self.b)
    }
}

fn tangent(right: &na::Vector3<f32>) -> na::Vector4<f32> {
    let right = right.try_normalize(1e-6).unwrap_or_else(na::Vector3::x);
    na::Vector4::new(right.x, right.y, right.z, 1.0)
}

/// Strategy that turns the bound rig into segments.
pub enum SegmentResolver {
    /// Authored bone list looked up by humanoid joint.
    Fixed(FixedTopology),

    /// Distance-based walk of the transform tree below the rig root.
    Hierarchy(HierarchyWalk<Entity>),
}

impl SegmentResolver {
    /// Fills `out` with the current segments, replacing its content.
    pub fn resolve(&mut self, world: &World, rig: &Rig, out: &mut Vec<Segment>) {
        match self {
            SegmentResolver::Fixed(topology) => {
                topology.resolve(&Avatar::new(world, rig), out)
            }
            SegmentResolver::Hierarchy(walk) => {
                walk.resolve(&SceneJoints::new(world), rig.root(), out)
            }
        }
    }

    pub fn as_fixed(&self) -> Option<&FixedTopology> {
        match self {
            SegmentResolver::Fixed(topology) => Some(topology),
            SegmentResolver::Hierarchy(_) => None,
        }
    }

    pub fn as_fixed_mut(&mut self) -> Option<&mut FixedTopology> {
        match self {
            SegmentResolver::Fixed(topology) => Some(topology),
            SegmentResolver::Hierarchy(_) => None,
        }
    }

    pub fn as_hierarchy_mut(&mut self) -> Option<&mut HierarchyWalk<Entity>> {
        match self {
            SegmentResolver::Fixed(_) => None,
            SegmentResolver::Hierarchy(walk) => Some(walk),
        }
    }
}
