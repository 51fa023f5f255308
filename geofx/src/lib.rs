//! Skeleton-to-geometry pipeline for line-expanded skeletal effects.
//!
//! Every frame a [`Skeleton`] resolves its bones into [`Segment`]s, writes
//! them into a line-list mesh, pushes the uniforms the geometry-expansion
//! shader expects and submits a single draw.

pub mod clocks;
pub mod color;
pub mod config;
pub mod joint;
pub mod params;
pub mod renderer;
pub mod scene;
pub mod segment;
pub mod skeleton;

mod error;

pub use self::{
    clocks::{ClockIndex, Clocks, Playback, TimeControl, TimeControlled},
    error::Error,
    joint::{Avatar, HumanBone, JointPose, JointSource, Hierarchy, Rig},
    params::{Appearance, ShaderParams, ShaderProfile},
    renderer::{GeometryBuffers, RenderContext, Shader, UniformSink},
    scene::{Global3, Local3, SceneJoints},
    segment::{Bone, FixedTopology, HierarchyWalk, Segment, SegmentResolver},
    skeleton::{FrameReport, Skeleton},
};
