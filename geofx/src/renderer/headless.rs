//! Render context that keeps everything in memory.
//! Used by the preview tool and by tests to observe what a skeleton submits.

use {
    super::{
        Bounds, DrawLines, GeometryBuffers, Release, RenderContext, Shader,
        UniformSink,
    },
    crate::error::Error,
    nalgebra as na,
    std::{
        collections::{HashMap, HashSet},
        sync::Arc,
    },
};

pub type ResourceId = u64;

#[derive(Debug)]
pub struct HeadlessMesh {
    id: ResourceId,
    streams: [Vec<u8>; 4],
    indices: Arc<[u32]>,
    bounds: Arc<Bounds>,
    uploads: u64,
}

impl HeadlessMesh {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Uploaded bytes of positions, normals, tangents and texcoords.
    pub fn streams(&self) -> &[Vec<u8>; 4] {
        &self.streams
    }

    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    pub fn bounds(&self) -> &Arc<Bounds> {
        &self.bounds
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

#[derive(Debug)]
pub struct HeadlessMaterial {
    id: ResourceId,
    shader: Shader,
    vectors: HashMap<&'static str, [f32; 4]>,
    floats: HashMap<&'static str, f32>,
    keywords: HashSet<&'static str>,
}

impl HeadlessMaterial {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn vector(&self, name: &str) -> Option<[f32; 4]> {
        self.vectors.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn is_keyword_enabled(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }
}

impl UniformSink for HeadlessMaterial {
    fn set_vector(&mut self, name: &'static str, value: [f32; 4]) {
        self.vectors.insert(name, value);
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
    }

    fn set_keyword(&mut self, keyword: &'static str, enabled: bool) {
        if enabled {
            self.keywords.insert(keyword);
        } else {
            self.keywords.remove(keyword);
        }
    }
}

/// Recorded draw submission.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub mesh: ResourceId,
    pub material: ResourceId,
    pub transform: na::Matrix4<f32>,
    pub layer: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    running: bool,
    shaders: HashSet<Shader>,
    next_id: ResourceId,
    live: HashSet<ResourceId>,
    pending: Vec<ResourceId>,
    released: Vec<(ResourceId, Release)>,
    draws: Vec<DrawRecord>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        HeadlessContext::default()
    }

    /// Registers a shader materials may be created from.
    pub fn with_shader(mut self, name: &str) -> Self {
        self.shaders.insert(Shader::new(name));
        self
    }

    pub fn with_running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Draws submitted since the last call.
    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Number of created resources that are neither destroyed nor queued.
    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    /// Resources queued by deferred release.
    pub fn pending_releases(&self) -> &[ResourceId] {
        &self.pending
    }

    /// Every release call in order.
    pub fn released(&self) -> &[(ResourceId, Release)] {
        &self.released
    }

    /// Finishes a frame, destroying resources queued for deferred release.
    pub fn end_frame(&mut self) {
        for id in self.pending.drain(..) {
            tracing::trace!("Destroyed deferred resource {}", id);
        }
    }

    fn allocate(&mut self) -> ResourceId {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.next_id
    }

    fn release(&mut self, id: ResourceId, release: Release) {
        if !self.live.remove(&id) {
            tracing::error!("Resource {} released twice", id);
            return;
        }

        self.released.push((id, release));
        match release {
            Release::Immediate => {
                tracing::trace!("Destroyed resource {}", id)
            }
            Release::Deferred => self.pending.push(id),
        }
    }
}

impl RenderContext for HeadlessContext {
    type Mesh = HeadlessMesh;
    type Material = HeadlessMaterial;

    fn is_running(&self) -> bool {
        self.running
    }

    fn create_mesh(&mut self) -> Result<HeadlessMesh, Error> {
        Ok(HeadlessMesh {
            id: self.allocate(),
            streams: Default::default(),
            indices: Arc::from(Vec::new()),
            bounds: Arc::new(Bounds::expanded()),
            uploads: 0,
        })
    }

    fn create_material(
        &mut self,
        shader: &Shader,
    ) -> Result<HeadlessMaterial, Error> {
        if !self.shaders.contains(shader) {
            return Err(Error::UnknownShader {
                name: shader.name().to_owned(),
            });
        }

        Ok(HeadlessMaterial {
            id: self.allocate(),
            shader: shader.clone(),
            vectors: HashMap::new(),
            floats: HashMap::new(),
            keywords: HashSet::new(),
        })
    }

    fn upload_mesh(
        &mut self,
        mesh: &mut HeadlessMesh,
        geometry: &GeometryBuffers,
    ) {
        for (target, stream) in mesh.streams.iter_mut().zip(&geometry.streams())
        {
            target.clear();
            target.extend_from_slice(stream.bytes);
        }
        mesh.indices = geometry.indices().clone();
        mesh.bounds = geometry.bounds().clone();
        mesh.uploads += 1;
    }

    fn draw_lines(&mut self, draw: DrawLines<'_, HeadlessMesh, HeadlessMaterial>) {
        self.draws.push(DrawRecord {
            mesh: draw.mesh.id,
            material: draw.material.id,
            transform: *draw.transform,
            layer: draw.layer,
            index_count: draw.index_count,
        });
    }

    fn release_mesh(&mut self, mesh: HeadlessMesh, release: Release) {
        self.release(mesh.id, release);
    }

    fn release_material(&mut self, material: HeadlessMaterial, release: Release) {
        self.release(material.id, release);
    }
}
