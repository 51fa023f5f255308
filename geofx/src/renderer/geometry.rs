use {
    super::vertex::{Normal3d, Position3d, Tangent3d, VertexStream, UV},
    crate::segment::Segment,
    nalgebra as na,
    std::sync::Arc,
};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: na::Point3<f32>,
    pub size: na::Vector3<f32>,
}

impl Bounds {
    /// Edge length of the box assigned to skeleton meshes.
    pub const EXPANDED_SIZE: f32 = 1000.0;

    /// Oversized box around the origin.
    /// Final geometry is produced by the shader, so CPU-side bounds
    /// must cover anything it can expand to.
    pub fn expanded() -> Self {
        Bounds {
            center: na::Point3::origin(),
            size: na::Vector3::repeat(Bounds::EXPANDED_SIZE),
        }
    }
}

/// CPU-side line-list geometry of a skeleton.
///
/// Vertices `2i` and `2i + 1` are the ends of segment `i`.
/// Index buffer and bounds are replaced only when the vertex count changes,
/// otherwise vertex streams are overwritten in place.
#[derive(Debug)]
pub struct GeometryBuffers {
    positions: Vec<Position3d>,
    normals: Vec<Normal3d>,
    tangents: Vec<Tangent3d>,
    texcoords: Vec<UV>,
    indices: Arc<[u32]>,
    bounds: Arc<Bounds>,
}

impl Default for GeometryBuffers {
    fn default() -> Self {
        GeometryBuffers::new()
    }
}

impl GeometryBuffers {
    pub fn new() -> Self {
        GeometryBuffers {
            positions: Vec::new(),
            normals: Vec::new(),
            tangents: Vec::new(),
            texcoords: Vec::new(),
            indices: Arc::from(Vec::new()),
            bounds: Arc::new(Bounds::expanded()),
        }
    }

    /// Writes segments into vertex streams.
    /// Returns `true` if buffers were resized and indices rebuilt.
    pub fn update(&mut self, segments: &[Segment]) -> bool {
        let count = segments.len() * 2;
        let rebuild = count != self.positions.len();

        if rebuild {
            tracing::debug!(
                "Rebuilding skeleton geometry for {} segments",
                segments.len()
            );

            self.positions.resize(count, Position3d([0.0; 3]));
            self.normals.resize(count, Normal3d([0.0; 3]));
            self.tangents.resize(count, Tangent3d([0.0; 4]));
            self.texcoords.resize(count, UV([0.0; 2]));
            self.indices = (0..count as u32).collect();
            self.bounds = Arc::new(Bounds::expanded());
        }

        for (i, segment) in segments.iter().enumerate() {
            let (a, b) = (i * 2, i * 2 + 1);

            self.positions[a] = Position3d(segment.a.coords.into());
            self.positions[b] = Position3d(segment.b.coords.into());

            self.normals[a] = Normal3d(segment.normal_a.into());
            self.normals[b] = Normal3d(segment.normal_b.into());

            self.tangents[a] = Tangent3d(segment.tangent_a.into());
            self.tangents[b] = Tangent3d(segment.tangent_b.into());

            let uv = UV([segment.radius; 2]);
            self.texcoords[a] = uv;
            self.texcoords[b] = uv;
        }

        rebuild
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Position3d] {
        &self.positions
    }

    pub fn normals(&self) -> &[Normal3d] {
        &self.normals
    }

    pub fn tangents(&self) -> &[Tangent3d] {
        &self.tangents
    }

    pub fn texcoords(&self) -> &[UV] {
        &self.texcoords
    }

    /// Line-list indices, `indices[i] == i`.
    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    pub fn bounds(&self) -> &Arc<Bounds> {
        &self.bounds
    }

    /// Raw views of the vertex streams in binding order:
    /// positions, normals, tangents, texcoords.
    pub fn streams(&self) -> [VertexStream<'_>; 4] {
        [
            VertexStream::new(&self.positions),
            VertexStream::new(&self.normals),
            VertexStream::new(&self.tangents),
            VertexStream::new(&self.texcoords),
        ]
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::joint::JointPose};

    fn segment(a: [f32; 3], b: [f32; 3], radius: f32) -> Segment {
        Segment::between(
            &JointPose::at(na::Point3::from(a)),
            &JointPose::at(na::Point3::from(b)),
            radius,
        )
    }

    #[test]
    fn radius_is_replicated_into_texcoords() {
        let mut buffers = GeometryBuffers::new();
        buffers.update(&[segment([0.0; 3], [1.0; 3], 0.25)]);

        assert_eq!(buffers.texcoords(), &[UV([0.25; 2]), UV([0.25; 2])]);
        assert_eq!(
            buffers.tangents()[1],
            Tangent3d([1.0, 0.0, 0.0, 1.0])
        );
    }

    #[test]
    fn shrinking_rebuilds_indices() {
        let mut buffers = GeometryBuffers::new();
        let segments = [
            segment([0.0; 3], [1.0; 3], 1.0),
            segment([1.0; 3], [2.0; 3], 1.0),
        ];

        assert!(buffers.update(&segments));
        assert_eq!(&buffers.indices()[..], &[0, 1, 2, 3]);

        assert!(buffers.update(&segments[..1]));
        assert_eq!(&buffers.indices()[..], &[0, 1]);
        assert_eq!(buffers.vertex_count(), 2);
    }

    #[test]
    fn empty_update_keeps_empty_buffers() {
        let mut buffers = GeometryBuffers::new();
        assert!(!buffers.update(&[]));
        assert!(buffers.is_empty());
        assert_eq!(buffers.index_count(), 0);
        assert_eq!(**buffers.bounds(), Bounds::expanded());
    }
}
