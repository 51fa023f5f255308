mod geometry;
pub mod headless;
mod vertex;

pub use self::{geometry::*, vertex::*};

use {crate::error::Error, nalgebra as na, std::sync::Arc};

/// Named shader program a material is created from.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Shader {
    name: Arc<str>,
}

impl Shader {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Shader { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How a released resource is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Release {
    /// Destroy right away, nothing may be using it.
    Immediate,

    /// Queue destruction until in-flight frames are done.
    Deferred,
}

/// Write-only sink for shader uniforms.
pub trait UniformSink {
    fn set_vector(&mut self, name: &'static str, value: [f32; 4]);

    fn set_float(&mut self, name: &'static str, value: f32);

    fn set_keyword(&mut self, keyword: &'static str, enabled: bool);
}

/// Single line-list draw of a whole skeleton.
pub struct DrawLines<'a, M, T> {
    pub mesh: &'a M,
    pub material: &'a T,
    pub transform: &'a na::Matrix4<f32>,
    pub layer: u32,
    pub index_count: u32,
}

/// Resource creation and draw submission for skeleton meshes.
pub trait RenderContext {
    type Mesh;
    type Material: UniformSink;

    /// Returns `true` while the host is simulating frames.
    /// Decides whether released resources may still be in flight.
    fn is_running(&self) -> bool;

    fn create_mesh(&mut self) -> Result<Self::Mesh, Error>;

    /// Fails if the shader cannot be found.
    fn create_material(
        &mut self,
        shader: &Shader,
    ) -> Result<Self::Material, Error>;

    /// Copies vertex streams, indices and bounds into the mesh.
    fn upload_mesh(&mut self, mesh: &mut Self::Mesh, geometry: &GeometryBuffers);

    fn draw_lines(&mut self, draw: DrawLines<'_, Self::Mesh, Self::Material>);

    fn release_mesh(&mut self, mesh: Self::Mesh, release: Release);

    fn release_material(&mut self, material: Self::Material, release: Release);
}
