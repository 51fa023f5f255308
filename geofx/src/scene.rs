use {
    crate::joint::{Hierarchy, JointPose, JointSource},
    hecs::{Entity, NoSuchEntity, World},
    nalgebra as na,
    smallvec::{smallvec, SmallVec},
};

/// Transform of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Local3 {
    pub parent: Entity,
    pub iso: na::Isometry3<f32>,
    pub scale: na::Vector3<f32>,
}

impl Local3 {
    pub fn identity(parent: Entity) -> Self {
        Local3::from_iso(parent, na::Isometry3::identity())
    }

    pub fn from_iso(parent: Entity, iso: na::Isometry3<f32>) -> Self {
        Local3 {
            parent,
            iso,
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(parent: Entity, tr: na::Translation3<f32>) -> Self {
        Local3::from_iso(
            parent,
            na::Isometry3::from_parts(tr, na::UnitQuaternion::identity()),
        )
    }
}

/// World-space transform of a node.
/// Root nodes carry only this component, the rest get it from
/// [`propagate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Global3 {
    pub iso: na::Isometry3<f32>,
    pub skew: na::Matrix3<f32>,
}

impl Global3 {
    pub fn identity() -> Self {
        Global3::from_iso(na::Isometry3::identity())
    }

    pub fn from_iso(iso: na::Isometry3<f32>) -> Self {
        Global3 {
            iso,
            skew: na::Matrix3::identity(),
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Global3 {
            iso: na::Isometry3::identity(),
            skew: na::Matrix3::from_diagonal(&na::Vector3::new(
                scale, scale, scale,
            )),
        }
    }

    pub fn append_local(&self, local: &Local3) -> Self {
        let total = self.to_homogeneous()
            * local.iso.to_homogeneous()
            * na::Matrix4::new_nonuniform_scaling(&local.scale);
        let rotation = self.iso.rotation * local.iso.rotation;
        let inv_rotation = rotation.inverse().to_rotation_matrix();
        let translation = total.column(3).xyz();
        let rotskew = total.remove_column(3).remove_row(3);
        let skew = inv_rotation * rotskew;

        Global3 {
            iso: na::Isometry3 {
                translation: na::Translation3 {
                    vector: translation,
                },
                rotation,
            },
            skew,
        }
    }

    pub fn to_homogeneous(&self) -> na::Matrix4<f32> {
        self.iso.to_homogeneous() * self.skew.to_homogeneous()
    }

    /// Samples this transform as a joint.
    /// Skew is ignored, directions are pure rotations of the unit axes.
    pub fn joint_pose(&self) -> JointPose {
        JointPose::from_iso(&self.iso)
    }
}

/// Ordered child list of a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Children(pub SmallVec<[Entity; 8]>);

/// Spawns a root node.
pub fn spawn_root(world: &mut World, global: Global3) -> Entity {
    world.spawn((global, Children::default()))
}

/// Spawns a node under `parent`, appending it to the parent's child list.
pub fn spawn_node(
    world: &mut World,
    parent: Entity,
    iso: na::Isometry3<f32>,
) -> Result<Entity, NoSuchEntity> {
    if !world.contains(parent) {
        return Err(NoSuchEntity);
    }

    let global = match world.get::<&Global3>(parent) {
        Ok(parent_global) => {
            parent_global.append_local(&Local3::from_iso(parent, iso))
        }
        Err(_) => Global3::from_iso(iso),
    };

    let entity = world.spawn((
        Local3::from_iso(parent, iso),
        global,
        Children::default(),
    ));

    let attached = match world.get::<&mut Children>(parent) {
        Ok(mut children) => {
            children.0.push(entity);
            true
        }
        Err(_) => false,
    };

    if !attached {
        world.insert_one(parent, Children(smallvec![entity]))?;
    }

    Ok(entity)
}

/// Despawns a node with its whole subtree and detaches it from its parent.
pub fn despawn_node(
    world: &mut World,
    entity: Entity,
) -> Result<(), NoSuchEntity> {
    let parent = world.get::<&Local3>(entity).ok().map(|local| local.parent);

    if let Some(parent) = parent {
        if let Ok(mut children) = world.get::<&mut Children>(parent) {
            children.0.retain(|child| *child != entity);
        }
    }

    let mut stack = vec![entity];
    while let Some(node) = stack.pop() {
        if let Ok(children) = world.get::<&Children>(node) {
            stack.extend(children.0.iter().copied());
        }
        world.despawn(node)?;
    }

    Ok(())
}

/// Updates `Global3` of every node from its `Local3`, parents first.
///
/// Nodes whose `Local3::parent` does not match the node listing them as a
/// child are skipped together with their subtree.
pub fn propagate(world: &World) {
    let roots: Vec<(Entity, Global3)> = world
        .query::<(&Global3, Option<&Local3>)>()
        .iter()
        .filter_map(|(entity, (global, local))| match local {
            None => Some((entity, *global)),
            Some(_) => None,
        })
        .collect();

    let mut stack = Vec::new();

    for (root, global) in roots {
        stack.push((root, global));

        while let Some((node, global)) = stack.pop() {
            let children = match world.get::<&Children>(node) {
                Ok(children) => children.0.clone(),
                Err(_) => continue,
            };

            for child in children {
                let local = match world.get::<&Local3>(child) {
                    Ok(local) if local.parent == node => *local,
                    Ok(_) => {
                        tracing::warn!(
                            "Node {:?} is listed as a child of {:?} but has another parent",
                            child,
                            node
                        );
                        continue;
                    }
                    Err(_) => continue,
                };

                let child_global = global.append_local(&local);
                if let Ok(mut slot) = world.get::<&mut Global3>(child) {
                    *slot = child_global;
                }
                stack.push((child, child_global));
            }
        }
    }
}

/// Exposes scene nodes of a world as a joint hierarchy.
#[derive(Clone, Copy)]
pub struct SceneJoints<'a> {
    world: &'a World,
}

impl<'a> SceneJoints<'a> {
    pub fn new(world: &'a World) -> Self {
        SceneJoints { world }
    }
}

impl JointSource for SceneJoints<'_> {
    type Joint = Entity;

    fn joint_pose(&self, joint: Entity) -> Option<JointPose> {
        scene_pose(self.world, joint)
    }
}

impl Hierarchy for SceneJoints<'_> {
    fn children(&self, node: Entity) -> SmallVec<[Entity; 8]> {
        match self.world.get::<&Children>(node) {
            Ok(children) => children.0.clone(),
            Err(_) => SmallVec::new(),
        }
    }
}

pub(crate) fn scene_pose(world: &World, entity: Entity) -> Option<JointPose> {
    world
        .get::<&Global3>(entity)
        .ok()
        .map(|global| global.joint_pose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn propagate_composes_parent_transforms() {
        let mut world = World::new();
        let root = spawn_root(
            &mut world,
            Global3::from_iso(na::Isometry3::translation(1.0, 0.0, 0.0)),
        );
        let a = spawn_node(
            &mut world,
            root,
            na::Isometry3::new(
                na::Vector3::new(0.0, 1.0, 0.0),
                na::Vector3::z() * std::f32::consts::FRAC_PI_2,
            ),
        )
        .unwrap();
        let b =
            spawn_node(&mut world, a, na::Isometry3::translation(1.0, 0.0, 0.0))
                .unwrap();

        propagate(&world);

        let pose = scene_pose(&world, b).unwrap();
        assert_relative_eq!(
            pose.position,
            na::Point3::new(1.0, 2.0, 0.0),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            pose.right,
            na::Vector3::new(0.0, 1.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn children_keep_spawn_order() {
        let mut world = World::new();
        let root = spawn_root(&mut world, Global3::identity());
        let first =
            spawn_node(&mut world, root, na::Isometry3::identity()).unwrap();
        let second =
            spawn_node(&mut world, root, na::Isometry3::identity()).unwrap();

        let joints = SceneJoints::new(&world);
        assert_eq!(&joints.children(root)[..], &[first, second]);
        assert!(joints.children(first).is_empty());
    }

    #[test]
    fn despawn_removes_subtree_and_detaches() {
        let mut world = World::new();
        let root = spawn_root(&mut world, Global3::identity());
        let a = spawn_node(&mut world, root, na::Isometry3::identity()).unwrap();
        let b = spawn_node(&mut world, a, na::Isometry3::identity()).unwrap();

        despawn_node(&mut world, a).unwrap();

        assert!(!world.contains(a));
        assert!(!world.contains(b));
        assert!(SceneJoints::new(&world).children(root).is_empty());
    }
}
