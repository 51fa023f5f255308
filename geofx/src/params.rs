use {
    crate::{color::hsvm, renderer::UniformSink},
    palette::LinSrgb,
    std::f32::consts::TAU,
};

/// Uniform and keyword names of the skeleton shaders.
pub mod uniform {
    pub const GEO_PARAMS: &str = "geo_params";
    pub const ANIM_PARAMS: &str = "anim_params";
    pub const MAT_PARAMS: &str = "mat_params";
    pub const BASE_HSVM: &str = "base_hsvm";
    pub const ADD_HSVM: &str = "add_hsvm";
    pub const DEBUG_KEYWORD: &str = "GEOFX_DEBUG";

    pub const COLOR: &str = "color";
    pub const METALLIC: &str = "metallic";
    pub const GLOSSINESS: &str = "glossiness";
    pub const LOCAL_TIME: &str = "local_time";
}

/// Added to local time before it reaches the shader,
/// keeps its trigonometry away from `t = 0`.
pub const TIME_OFFSET: f32 = 100.0;

/// Authored look of the effect.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub base_radius: f32,
    pub strip_width: f32,
    pub strip_speed: f32,
    pub strip_length: f32,

    pub wave_width: f32,
    pub wave_speed: f32,
    pub distortion: f32,

    #[serde(deserialize_with = "crate::config::serde_color::deserialize")]
    pub base_color: LinSrgb,
    pub hue_shift: f32,
    pub metallic: f32,
    pub smoothness: f32,
    #[serde(deserialize_with = "crate::config::serde_color::deserialize")]
    pub emissive_color: LinSrgb,
    pub highlight: f32,

    pub debug: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            base_radius: 0.25,
            strip_width: 0.015,
            strip_speed: 4.0,
            strip_length: 2.0,
            wave_width: 2.0,
            wave_speed: 2.0,
            distortion: 0.1,
            base_color: LinSrgb::new(1.0, 1.0, 1.0),
            hue_shift: 0.1,
            metallic: 0.0,
            smoothness: 0.5,
            emissive_color: LinSrgb::new(1.0, 1.0, 1.0),
            highlight: 0.1,
            debug: false,
        }
    }
}

impl Appearance {
    /// Clamps every parameter into its authoring range.
    pub fn sanitize(&mut self) {
        self.base_radius = clamp(self.base_radius, 0.5);
        self.strip_width = clamp(self.strip_width, 0.025);
        self.strip_speed = clamp(self.strip_speed, 10.0);
        self.strip_length = clamp(self.strip_length, 5.0);

        self.wave_width = clamp(self.wave_width, 10.0);
        self.wave_speed = clamp(self.wave_speed, 10.0);
        self.distortion = clamp(self.distortion, 1.0);

        // Base color is LDR, emissive may exceed one.
        self.base_color = LinSrgb::new(
            clamp(self.base_color.red, 1.0),
            clamp(self.base_color.green, 1.0),
            clamp(self.base_color.blue, 1.0),
        );
        self.hue_shift = clamp(self.hue_shift, 1.0);
        self.metallic = clamp(self.metallic, 1.0);
        self.smoothness = clamp(self.smoothness, 1.0);
        self.emissive_color = LinSrgb::new(
            clamp(self.emissive_color.red, f32::MAX),
            clamp(self.emissive_color.green, f32::MAX),
            clamp(self.emissive_color.blue, f32::MAX),
        );
        self.highlight = clamp(self.highlight, 1.0);
    }

    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}

fn clamp(value: f32, max: f32) -> f32 {
    // NaN turns into zero.
    value.max(0.0).min(max)
}

/// Set of uniforms a skeleton shader consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
pub enum ShaderProfile {
    /// Animated ribbons with wave distortion, HSVM colors and debug view.
    Ribbon,

    /// Plain tinted lines driven by local time only.
    Basic,
}

impl Default for ShaderProfile {
    fn default() -> Self {
        ShaderProfile::Ribbon
    }
}

impl ShaderProfile {
    /// Local time used while the host is idle.
    pub fn idle_time(&self) -> f32 {
        match self {
            ShaderProfile::Ribbon => 0.0,
            ShaderProfile::Basic => 10.0,
        }
    }
}

/// Uniform values for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaderParams {
    Ribbon {
        geo: [f32; 4],
        anim: [f32; 4],
        mat: [f32; 4],
        base_hsvm: [f32; 4],
        add_hsvm: [f32; 4],
        debug: bool,
    },
    Basic {
        color: [f32; 4],
        metallic: f32,
        glossiness: f32,
        local_time: f32,
    },
}

impl ShaderParams {
    pub fn assemble(
        profile: ShaderProfile,
        appearance: &Appearance,
        local_time: f32,
    ) -> Self {
        match profile {
            ShaderProfile::Ribbon => ShaderParams::Ribbon {
                geo: [
                    appearance.base_radius,
                    appearance.strip_width,
                    appearance.strip_speed * TAU,
                    appearance.strip_length * TAU,
                ],
                anim: [
                    local_time + TIME_OFFSET,
                    appearance.wave_width,
                    appearance.wave_speed,
                    appearance.distortion,
                ],
                mat: [
                    appearance.metallic,
                    appearance.smoothness,
                    appearance.hue_shift,
                    appearance.highlight,
                ],
                base_hsvm: hsvm(appearance.base_color),
                add_hsvm: hsvm(appearance.emissive_color),
                debug: appearance.debug,
            },
            ShaderProfile::Basic => {
                let color = appearance.base_color;
                ShaderParams::Basic {
                    color: [color.red, color.green, color.blue, 1.0],
                    metallic: appearance.metallic,
                    glossiness: appearance.smoothness,
                    local_time,
                }
            }
        }
    }

    /// Writes uniforms into `sink`.
    /// The debug keyword is written every time, enabled or not.
    pub fn apply<S>(&self, sink: &mut S)
    where
        S: UniformSink + ?Sized,
    {
        match *self {
            ShaderParams::Ribbon {
                geo,
                anim,
                mat,
                base_hsvm,
                add_hsvm,
                debug,
            } => {
                sink.set_vector(uniform::GEO_PARAMS, geo);
                sink.set_vector(uniform::ANIM_PARAMS, anim);
                sink.set_vector(uniform::MAT_PARAMS, mat);
                sink.set_vector(uniform::BASE_HSVM, base_hsvm);
                sink.set_vector(uniform::ADD_HSVM, add_hsvm);
                sink.set_keyword(uniform::DEBUG_KEYWORD, debug);
            }
            ShaderParams::Basic {
                color,
                metallic,
                glossiness,
                local_time,
            } => {
                sink.set_vector(uniform::COLOR, color);
                sink.set_float(uniform::METALLIC, metallic);
                sink.set_float(uniform::GLOSSINESS, glossiness);
                sink.set_float(uniform::LOCAL_TIME, local_time);
            }
        }
    }
}
