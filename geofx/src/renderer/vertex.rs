use {
    bytemuck::{Pod, Zeroable},
    std::mem::size_of,
};

/// Specifies how attribute data is interpreted by the shader.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

/// Trait for single-attribute vertex streams.
pub trait VertexType: Pod {
    const NAME: &'static str;
    const FORMAT: VertexFormat;

    fn stride() -> u32
    where
        Self: Sized,
    {
        size_of::<Self>() as u32
    }
}

/// Attribute for vertex position in 3d world.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Position3d(pub [f32; 3]);

unsafe impl Zeroable for Position3d {}
unsafe impl Pod for Position3d {}

impl VertexType for Position3d {
    const FORMAT: VertexFormat = VertexFormat::Float32x3;
    const NAME: &'static str = "Position3d";
}

/// Attribute for vertex normal in 3d world.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Normal3d(pub [f32; 3]);

unsafe impl Zeroable for Normal3d {}
unsafe impl Pod for Normal3d {}

impl VertexType for Normal3d {
    const FORMAT: VertexFormat = VertexFormat::Float32x3;
    const NAME: &'static str = "Normal3d";
}

/// Attribute for vertex tangent, `w` is handedness.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Tangent3d(pub [f32; 4]);

unsafe impl Zeroable for Tangent3d {}
unsafe impl Pod for Tangent3d {}

impl VertexType for Tangent3d {
    const FORMAT: VertexFormat = VertexFormat::Float32x4;
    const NAME: &'static str = "Tangent3d";
}

/// Attribute for texture coordinates.
/// Skeleton meshes store segment radius in both components.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct UV(pub [f32; 2]);

unsafe impl Zeroable for UV {}
unsafe impl Pod for UV {}

impl VertexType for UV {
    const FORMAT: VertexFormat = VertexFormat::Float32x2;
    const NAME: &'static str = "UV";
}

/// Raw view of one vertex stream.
#[derive(Clone, Copy, Debug)]
pub struct VertexStream<'a> {
    pub name: &'static str,
    pub format: VertexFormat,
    pub stride: u32,
    pub bytes: &'a [u8],
}

impl<'a> VertexStream<'a> {
    pub fn new<V: VertexType>(data: &'a [V]) -> Self {
        VertexStream {
            name: V::NAME,
            format: V::FORMAT,
            stride: V::stride(),
            bytes: bytemuck::cast_slice(data),
        }
    }
}
