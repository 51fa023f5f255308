use {
    geofx::{
        scene::{spawn_node, spawn_root, Global3, Local3},
        HumanBone, Rig,
    },
    hecs::{NoSuchEntity, World},
    nalgebra as na,
};

use HumanBone::*;

/// Bone, its parent and offset from the parent, parents listed first.
const LAYOUT: [(HumanBone, Option<HumanBone>, [f32; 3]); HumanBone::COUNT] = [
    (Hips, None, [0.0, 1.0, 0.0]),
    (LeftUpperLeg, Some(Hips), [-0.1, -0.05, 0.0]),
    (LeftLowerLeg, Some(LeftUpperLeg), [0.0, -0.45, 0.0]),
    (LeftFoot, Some(LeftLowerLeg), [0.0, -0.45, 0.0]),
    (LeftToes, Some(LeftFoot), [0.0, -0.05, 0.15]),
    (RightUpperLeg, Some(Hips), [0.1, -0.05, 0.0]),
    (RightLowerLeg, Some(RightUpperLeg), [0.0, -0.45, 0.0]),
    (RightFoot, Some(RightLowerLeg), [0.0, -0.45, 0.0]),
    (RightToes, Some(RightFoot), [0.0, -0.05, 0.15]),
    (Spine, Some(Hips), [0.0, 0.1, 0.0]),
    (Chest, Some(Spine), [0.0, 0.15, 0.0]),
    (UpperChest, Some(Chest), [0.0, 0.15, 0.0]),
    (Neck, Some(UpperChest), [0.0, 0.15, 0.0]),
    (Head, Some(Neck), [0.0, 0.1, 0.0]),
    (LeftEye, Some(Head), [-0.03, 0.06, 0.08]),
    (RightEye, Some(Head), [0.03, 0.06, 0.08]),
    (Jaw, Some(Head), [0.0, -0.03, 0.05]),
    (LeftShoulder, Some(UpperChest), [-0.05, 0.12, 0.0]),
    (LeftUpperArm, Some(LeftShoulder), [-0.1, 0.0, 0.0]),
    (LeftLowerArm, Some(LeftUpperArm), [-0.3, 0.0, 0.0]),
    (LeftHand, Some(LeftLowerArm), [-0.25, 0.0, 0.0]),
    (RightShoulder, Some(UpperChest), [0.05, 0.12, 0.0]),
    (RightUpperArm, Some(RightShoulder), [0.1, 0.0, 0.0]),
    (RightLowerArm, Some(RightUpperArm), [0.3, 0.0, 0.0]),
    (RightHand, Some(RightLowerArm), [0.25, 0.0, 0.0]),
];

/// Procedural humanoid in a scene world.
pub struct Humanoid {
    rig: Rig,
}

impl Humanoid {
    pub fn spawn(
        world: &mut World,
        placement: na::Isometry3<f32>,
    ) -> Result<Self, NoSuchEntity> {
        let mut rig: Option<Rig> = None;

        for &(bone, parent, [x, y, z]) in LAYOUT.iter() {
            let offset = na::Isometry3::translation(x, y, z);

            let entity = match parent {
                None => {
                    spawn_root(world, Global3::from_iso(placement * offset))
                }
                Some(parent) => {
                    let parent = rig
                        .as_ref()
                        .and_then(|rig| rig.get(parent))
                        .ok_or(NoSuchEntity)?;
                    spawn_node(world, parent, offset)?
                }
            };
            tracing::trace!("Spawned {:?} as {:?}", bone, entity);

            rig.get_or_insert_with(|| Rig::new(entity))
                .bind(bone, entity);
        }

        let rig = rig.ok_or(NoSuchEntity)?;
        Ok(Humanoid { rig })
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Walk-like sway of legs, arms and spine.
    pub fn animate(&self, world: &World, time: f32) {
        let phase = (time * 2.0).sin();

        self.swing(world, Spine, na::Vector3::z_axis(), 0.1 * time.sin());
        self.swing(world, LeftUpperLeg, na::Vector3::x_axis(), 0.4 * phase);
        self.swing(world, RightUpperLeg, na::Vector3::x_axis(), -0.4 * phase);
        self.swing(world, LeftUpperArm, na::Vector3::x_axis(), -0.3 * phase);
        self.swing(world, RightUpperArm, na::Vector3::x_axis(), 0.3 * phase);
    }

    fn swing(
        &self,
        world: &World,
        bone: HumanBone,
        axis: na::Unit<na::Vector3<f32>>,
        angle: f32,
    ) {
        if let Some(entity) = self.rig.get(bone) {
            if let Ok(mut local) = world.get::<&mut Local3>(entity) {
                local.iso.rotation =
                    na::UnitQuaternion::from_axis_angle(&axis, angle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, geofx::scene::propagate};

    #[test]
    fn every_bone_is_bound() {
        let mut world = World::new();
        let humanoid =
            Humanoid::spawn(&mut world, na::Isometry3::identity()).unwrap();

        assert_eq!(humanoid.rig().iter().count(), HumanBone::COUNT);
        assert_eq!(humanoid.rig().get(Hips), Some(humanoid.rig().root()));
    }

    #[test]
    fn animation_moves_limbs() {
        let mut world = World::new();
        let humanoid =
            Humanoid::spawn(&mut world, na::Isometry3::identity()).unwrap();
        let foot = humanoid.rig().get(LeftFoot).unwrap();
        let rest = world.get::<&Global3>(foot).unwrap().iso.translation;

        humanoid.animate(&world, 0.5);
        propagate(&world);

        let moved = world.get::<&Global3>(foot).unwrap().iso.translation;
        assert_ne!(rest, moved);
    }
}
