use {
    super::Segment,
    crate::joint::{Hierarchy, JointPose},
    nalgebra as na,
    smallvec::SmallVec,
    std::fmt::Debug,
};

/// Distance-based walk of a transform tree.
///
/// Starting with `head = root`, every child closer to the head than
/// `min_joint_distance` is absorbed into the head, otherwise a segment
/// `head -> child` is emitted and the child becomes the head of its subtree.
/// Segments come out in depth-first order, children in stored order.
///
/// With the topology cache enabled the discovered node pairs are kept and
/// only their poses are refreshed on later frames. The cache is dropped when
/// the root, the threshold or the child list of any visited node changes,
/// or when a cached node stops resolving.
#[derive(Debug)]
pub struct HierarchyWalk<J> {
    min_joint_distance: f32,
    radius: f32,
    cache_topology: bool,
    stack: Vec<Visit<J>>,
    cache: Option<TopologyCache<J>>,
    reported: bool,
}

#[derive(Clone, Copy, Debug)]
struct Visit<J> {
    head: J,
    head_pose: JointPose,
    node: J,
}

#[derive(Debug)]
struct TopologyCache<J> {
    root: J,
    pairs: Vec<(J, J)>,
    visited: Vec<(J, SmallVec<[J; 8]>)>,
}

impl<J> TopologyCache<J>
where
    J: Copy + PartialEq + Debug,
{
    fn is_valid<H>(&self, source: &H, root: J) -> bool
    where
        H: Hierarchy<Joint = J>,
    {
        self.root == root
            && self
                .visited
                .iter()
                .all(|(node, children)| source.children(*node) == *children)
    }

    /// Returns `false` if any cached node failed to resolve.
    fn refresh<H>(&self, source: &H, radius: f32, out: &mut Vec<Segment>) -> bool
    where
        H: Hierarchy<Joint = J>,
    {
        for &(head, node) in &self.pairs {
            match (source.joint_pose(head), source.joint_pose(node)) {
                (Some(head), Some(node)) => {
                    out.push(Segment::between(&head, &node, radius))
                }
                _ => return false,
            }
        }
        true
    }
}

impl<J> HierarchyWalk<J>
where
    J: Copy + PartialEq + Debug,
{
    pub fn new(min_joint_distance: f32) -> Self {
        HierarchyWalk {
            min_joint_distance: clamp_distance(min_joint_distance),
            radius: 1.0,
            cache_topology: false,
            stack: Vec::new(),
            cache: None,
            reported: false,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.set_radius(radius);
        self
    }

    pub fn with_topology_cache(mut self, enabled: bool) -> Self {
        self.set_topology_cache(enabled);
        self
    }

    pub fn min_joint_distance(&self) -> f32 {
        self.min_joint_distance
    }

    /// Negative and NaN thresholds are clamped to zero,
    /// which emits every parent-child edge.
    pub fn set_min_joint_distance(&mut self, distance: f32) {
        self.min_joint_distance = clamp_distance(distance);
        self.cache = None;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    pub fn topology_cache(&self) -> bool {
        self.cache_topology
    }

    pub fn set_topology_cache(&mut self, enabled: bool) {
        self.cache_topology = enabled;
        self.cache = None;
    }

    /// Returns `true` if the next resolve may reuse cached topology.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Fills `out` with segments found below `root`, replacing its content.
    pub fn resolve<H>(&mut self, source: &H, root: J, out: &mut Vec<Segment>)
    where
        H: Hierarchy<Joint = J>,
    {
        out.clear();

        if self.cache_topology {
            if let Some(cache) = &self.cache {
                if cache.is_valid(source, root)
                    && cache.refresh(source, self.radius, out)
                {
                    return;
                }
                tracing::debug!("Hierarchy changed, rediscovering segments");
                out.clear();
            }
        }

        self.walk(source, root, out);
    }

    fn walk<H>(&mut self, source: &H, root: J, out: &mut Vec<Segment>)
    where
        H: Hierarchy<Joint = J>,
    {
        let record = self.cache_topology;
        let mut complete = true;
        let mut pairs = Vec::new();
        let mut visited = Vec::new();

        self.cache = None;
        self.stack.clear();

        let root_pose = match source.joint_pose(root) {
            Some(pose) => pose,
            None => {
                self.report_missing(root);
                return;
            }
        };

        let children = source.children(root);
        self.stack.extend(children.iter().rev().map(|&node| Visit {
            head: root,
            head_pose: root_pose,
            node,
        }));
        if record {
            visited.push((root, children));
        }

        while let Some(Visit {
            head,
            head_pose,
            node,
        }) = self.stack.pop()
        {
            let pose = match source.joint_pose(node) {
                Some(pose) => pose,
                None => {
                    complete = false;
                    self.report_missing(node);
                    continue;
                }
            };

            let distance = na::distance(&head_pose.position, &pose.position);
            let (head, head_pose) = if distance < self.min_joint_distance {
                (head, head_pose)
            } else {
                out.push(Segment::between(&head_pose, &pose, self.radius));
                if record {
                    pairs.push((head, node));
                }
                (node, pose)
            };

            let children = source.children(node);
            self.stack.extend(children.iter().rev().map(|&node| Visit {
                head,
                head_pose,
                node,
            }));
            if record {
                visited.push((node, children));
            }
        }

        if record && complete {
            self.cache = Some(TopologyCache {
                root,
                pairs,
                visited,
            });
        }
    }

    fn report_missing(&mut self, node: J) {
        if !self.reported {
            self.reported = true;
            tracing::warn!(
                "Node {:?} has no transform, its subtree is skipped",
                node
            );
        }
    }
}

fn clamp_distance(distance: f32) -> f32 {
    distance.max(0.0)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::joint::{JointPose, JointSource},
    };

    /// Tree stored as flat arrays, node 0 is the root.
    struct Tree {
        positions: Vec<na::Point3<f32>>,
        children: Vec<Vec<usize>>,
    }

    impl Tree {
        fn new(nodes: &[(Option<usize>, [f32; 3])]) -> Self {
            let mut tree = Tree {
                positions: Vec::new(),
                children: Vec::new(),
            };
            for &(parent, [x, y, z]) in nodes {
                let index = tree.positions.len();
                tree.positions.push(na::Point3::new(x, y, z));
                tree.children.push(Vec::new());
                if let Some(parent) = parent {
                    tree.children[parent].push(index);
                }
            }
            tree
        }
    }

    impl JointSource for Tree {
        type Joint = usize;

        fn joint_pose(&self, joint: usize) -> Option<JointPose> {
            self.positions.get(joint).copied().map(JointPose::at)
        }
    }

    impl Hierarchy for Tree {
        fn children(&self, node: usize) -> SmallVec<[usize; 8]> {
            self.children[node].iter().copied().collect()
        }
    }

    fn ends(segments: &[Segment]) -> Vec<([f32; 3], [f32; 3])> {
        segments
            .iter()
            .map(|s| (s.a.coords.into(), s.b.coords.into()))
            .collect()
    }

    #[test]
    fn short_joints_are_absorbed_into_head() {
        let tree = Tree::new(&[
            (None, [0.0, 0.0, 0.0]),
            (Some(0), [0.0, 0.1, 0.0]),
            (Some(1), [0.0, 1.0, 0.0]),
        ]);

        let mut walk = HierarchyWalk::new(0.5);
        let mut segments = Vec::new();
        walk.resolve(&tree, 0, &mut segments);

        assert_eq!(ends(&segments), vec![([0.0; 3], [0.0, 1.0, 0.0])]);
    }

    #[test]
    fn emission_is_depth_first_left_to_right() {
        let tree = Tree::new(&[
            (None, [0.0, 0.0, 0.0]),
            (Some(0), [-1.0, 0.0, 0.0]),
            (Some(1), [-2.0, 0.0, 0.0]),
            (Some(0), [1.0, 0.0, 0.0]),
            (Some(3), [2.0, 0.0, 0.0]),
        ]);

        let mut walk = HierarchyWalk::new(0.5);
        let mut segments = Vec::new();
        walk.resolve(&tree, 0, &mut segments);

        assert_eq!(
            ends(&segments),
            vec![
                ([0.0, 0.0, 0.0], [-1.0, 0.0, 0.0]),
                ([-1.0, 0.0, 0.0], [-2.0, 0.0, 0.0]),
                ([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
                ([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            ]
        );
    }

    #[test]
    fn zero_threshold_emits_every_edge() {
        let tree = Tree::new(&[
            (None, [0.0, 0.0, 0.0]),
            (Some(0), [0.0, 0.0, 0.0]),
            (Some(1), [0.0, 0.0, 0.0]),
        ]);

        let mut walk = HierarchyWalk::new(-3.0);
        assert_eq!(walk.min_joint_distance(), 0.0);

        let mut segments = Vec::new();
        walk.resolve(&tree, 0, &mut segments);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn cache_refreshes_positions_without_rediscovery() {
        let mut tree = Tree::new(&[
            (None, [0.0, 0.0, 0.0]),
            (Some(0), [0.0, 1.0, 0.0]),
        ]);

        let mut walk = HierarchyWalk::new(0.5).with_topology_cache(true);
        let mut segments = Vec::new();
        walk.resolve(&tree, 0, &mut segments);
        assert!(walk.is_cached());

        // Moved closer than the threshold, cached pair still holds.
        tree.positions[1] = na::Point3::new(0.0, 0.2, 0.0);
        walk.resolve(&tree, 0, &mut segments);
        assert_eq!(ends(&segments), vec![([0.0; 3], [0.0, 0.2, 0.0])]);
    }

    #[test]
    fn cache_is_dropped_when_children_change() {
        let mut tree = Tree::new(&[
            (None, [0.0, 0.0, 0.0]),
            (Some(0), [0.0, 1.0, 0.0]),
        ]);

        let mut walk = HierarchyWalk::new(0.5).with_topology_cache(true);
        let mut segments = Vec::new();
        walk.resolve(&tree, 0, &mut segments);
        assert_eq!(segments.len(), 1);

        tree.positions.push(na::Point3::new(0.0, 2.0, 0.0));
        tree.children.push(Vec::new());
        tree.children[1].push(2);

        walk.resolve(&tree, 0, &mut segments);
        assert_eq!(segments.len(), 2);
        assert_eq!(walk.children_snapshot_len(), 3);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let tree = Tree::new(&[(None, [0.0; 3])]);

        let mut walk = HierarchyWalk::new(0.5);
        let mut segments = vec![Segment::degenerate(&JointPose::at(
            na::Point3::origin(),
        ))];
        walk.resolve(&tree, 7, &mut segments);
        assert!(segments.is_empty());
    }

    impl<J> HierarchyWalk<J> {
        fn children_snapshot_len(&self) -> usize {
            self.cache.as_ref().map_or(0, |cache| cache.visited.len())
        }
    }
}
