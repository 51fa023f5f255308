use {
    crate::{
        clocks::{Playback, TimeControl, TimeControlled},
        config::SkeletonConfig,
        error::Error,
        joint::Rig,
        params::{Appearance, ShaderParams, ShaderProfile},
        renderer::{DrawLines, GeometryBuffers, Release, RenderContext, Shader},
        segment::{Segment, SegmentResolver},
    },
    hecs::World,
    nalgebra as na,
};

/// Outcome of one [`Skeleton::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub segments: usize,

    /// Index buffer and bounds were rebuilt this frame.
    pub rebuilt: bool,

    /// Draw was submitted. Skipped when there are no segments.
    pub drawn: bool,

    pub local_time: f32,
}

/// Skeleton effect instance.
///
/// Owns one mesh and one material, both created lazily by the first update
/// and released by [`Skeleton::teardown`].
pub struct Skeleton<C: RenderContext> {
    appearance: Appearance,
    profile: ShaderProfile,
    shader: Option<Shader>,
    stale_material: bool,
    layer: u32,
    transform: na::Matrix4<f32>,

    rig: Rig,
    resolver: SegmentResolver,
    time: TimeControl,

    segments: Vec<Segment>,
    geometry: GeometryBuffers,

    mesh: Option<C::Mesh>,
    material: Option<C::Material>,
}

impl<C> Skeleton<C>
where
    C: RenderContext,
{
    pub fn new(resolver: SegmentResolver, rig: Rig) -> Self {
        Skeleton {
            appearance: Appearance::default(),
            profile: ShaderProfile::default(),
            shader: None,
            stale_material: false,
            layer: 0,
            transform: na::Matrix4::identity(),
            rig,
            resolver,
            time: TimeControl::default(),
            segments: Vec::new(),
            geometry: GeometryBuffers::new(),
            mesh: None,
            material: None,
        }
    }

    #[tracing::instrument(skip(config))]
    pub fn from_config(config: &SkeletonConfig, rig: Rig) -> Self {
        let mut config = config.clone();
        config.sanitize();

        let mut skeleton = Skeleton::new(config.topology.build(), rig);
        skeleton.shader = config.shader();
        skeleton.appearance = config.appearance;
        skeleton.profile = config.profile;
        skeleton.layer = config.layer;
        skeleton
    }

    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.set_shader(Some(shader));
        self
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Replaces appearance, clamping every value into its range.
    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = appearance.sanitized();
    }

    pub fn profile(&self) -> ShaderProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: ShaderProfile) {
        self.profile = profile;
    }

    pub fn shader(&self) -> Option<&Shader> {
        self.shader.as_ref()
    }

    /// Material is recreated on next update if shader changes.
    pub fn set_shader(&mut self, shader: Option<Shader>) {
        if self.shader != shader {
            self.shader = shader;
            self.stale_material = self.material.is_some();
        }
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn set_layer(&mut self, layer: u32) {
        self.layer = layer;
    }

    pub fn transform(&self) -> &na::Matrix4<f32> {
        &self.transform
    }

    /// Sets world transform of the owner, used for draw submission.
    pub fn set_transform(&mut self, transform: na::Matrix4<f32>) {
        self.transform = transform;
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut Rig {
        &mut self.rig
    }

    pub fn resolver(&self) -> &SegmentResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut SegmentResolver {
        &mut self.resolver
    }

    pub fn set_resolver(&mut self, resolver: SegmentResolver) {
        self.resolver = resolver;
    }

    pub fn time_control(&self) -> &TimeControl {
        &self.time
    }

    pub fn local_time(&self, playback: &Playback) -> f32 {
        self.time
            .local_time_or(playback, self.profile.idle_time())
    }

    /// Segments resolved by the last update.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn geometry(&self) -> &GeometryBuffers {
        &self.geometry
    }

    pub fn mesh(&self) -> Option<&C::Mesh> {
        self.mesh.as_ref()
    }

    pub fn material(&self) -> Option<&C::Material> {
        self.material.as_ref()
    }

    pub fn has_resources(&self) -> bool {
        self.mesh.is_some() || self.material.is_some()
    }

    /// Resolves segments, refreshes the mesh and uniforms and submits
    /// a single draw.
    ///
    /// Fails only while acquiring the mesh or the material, in which case
    /// nothing is drawn and the next update retries.
    pub fn update(
        &mut self,
        world: &World,
        playback: &Playback,
        ctx: &mut C,
    ) -> Result<FrameReport, Error> {
        if self.stale_material {
            self.stale_material = false;
            if let Some(material) = self.material.take() {
                tracing::debug!("Shader changed, recreating material");
                ctx.release_material(material, release_mode(ctx));
            }
        }

        let material = match self.material.take() {
            Some(material) => material,
            None => {
                let shader =
                    self.shader.as_ref().ok_or(Error::MissingShader)?;
                let material = ctx.create_material(shader)?;
                tracing::debug!("Material created from '{}'", shader.name());
                material
            }
        };
        let material = self.material.insert(material);

        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => {
                let mesh = ctx.create_mesh()?;
                tracing::debug!("Mesh created");
                mesh
            }
        };
        let mesh = self.mesh.insert(mesh);

        self.resolver
            .resolve(world, &self.rig, &mut self.segments);

        let rebuilt = self.geometry.update(&self.segments);
        if rebuilt {
            tracing::debug!(
                "Skeleton topology changed to {} segments",
                self.segments.len()
            );
        }
        ctx.upload_mesh(mesh, &self.geometry);

        let local_time = self
            .time
            .local_time_or(playback, self.profile.idle_time());
        ShaderParams::assemble(self.profile, &self.appearance, local_time)
            .apply(material);

        let drawn = !self.segments.is_empty();
        if drawn {
            ctx.draw_lines(DrawLines {
                mesh: &*mesh,
                material: &*material,
                transform: &self.transform,
                layer: self.layer,
                index_count: self.geometry.index_count(),
            });
        }

        tracing::trace!(
            segments = self.segments.len(),
            local_time,
            "Skeleton updated"
        );

        Ok(FrameReport {
            segments: self.segments.len(),
            rebuilt,
            drawn,
            local_time,
        })
    }

    /// Releases mesh and material. Calling it again is a no-op.
    ///
    /// While the host is running, destruction is deferred until in-flight
    /// frames are done.
    pub fn teardown(&mut self, ctx: &mut C) {
        let release = release_mode(ctx);

        if let Some(mesh) = self.mesh.take() {
            ctx.release_mesh(mesh, release);
        }
        if let Some(material) = self.material.take() {
            ctx.release_material(material, release);
        }
        self.stale_material = false;
    }
}

fn release_mode<C: RenderContext>(ctx: &C) -> Release {
    if ctx.is_running() {
        Release::Deferred
    } else {
        Release::Immediate
    }
}

impl<C> TimeControlled for Skeleton<C>
where
    C: RenderContext,
{
    fn enter_control(&mut self) {
        self.time.enter_control();
    }

    fn exit_control(&mut self) {
        self.time.exit_control();
    }

    fn set_time(&mut self, time: f32) {
        self.time.set_time(time);
    }
}
