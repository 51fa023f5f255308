use {
    crate::{
        params::{Appearance, ShaderProfile},
        renderer::Shader,
        segment::{Bone, FixedTopology, HierarchyWalk, SegmentResolver},
    },
    color_eyre::Report,
    eyre::WrapErr,
    serde::de::DeserializeOwned,
    std::path::{Path, PathBuf},
};

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_VAR: &str = "GEOFX_CONFIG_PATH";

/// Path used when the environment variable is not set.
pub const DEFAULT_CONFIG_PATH: &str = "./geofx.ron";

#[derive(Clone, Debug, serde::Deserialize)]
pub enum TopologyConfig {
    Fixed {
        #[serde(default = "humanoid_bones")]
        bones: Vec<Bone>,
    },
    Hierarchy {
        #[serde(default = "default_min_joint_distance")]
        min_joint_distance: f32,

        #[serde(default = "default_radius")]
        radius: f32,

        #[serde(default)]
        cache_topology: bool,
    },
}

fn humanoid_bones() -> Vec<Bone> {
    FixedTopology::humanoid().bones().to_vec()
}

fn default_min_joint_distance() -> f32 {
    0.2
}

fn default_radius() -> f32 {
    1.0
}

impl Default for TopologyConfig {
    fn default() -> Self {
        TopologyConfig::Fixed {
            bones: humanoid_bones(),
        }
    }
}

impl TopologyConfig {
    pub fn build(&self) -> SegmentResolver {
        match self {
            TopologyConfig::Fixed { bones } => {
                SegmentResolver::Fixed(FixedTopology::new(bones.clone()))
            }
            TopologyConfig::Hierarchy {
                min_joint_distance,
                radius,
                cache_topology,
            } => SegmentResolver::Hierarchy(
                HierarchyWalk::new(*min_joint_distance)
                    .with_radius(*radius)
                    .with_topology_cache(*cache_topology),
            ),
        }
    }
}

/// Everything needed to set up a skeleton.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    pub appearance: Appearance,
    pub topology: TopologyConfig,
    pub shader: Option<String>,
    pub profile: ShaderProfile,
    pub layer: u32,
}

impl SkeletonConfig {
    pub fn sanitize(&mut self) {
        self.appearance.sanitize();
        if let TopologyConfig::Fixed { bones } = &mut self.topology {
            for bone in bones {
                *bone = bone.sanitized();
            }
        }
    }

    pub fn shader(&self) -> Option<Shader> {
        self.shader.as_deref().map(Shader::new)
    }
}

/// Loads config from path in [`CONFIG_PATH_VAR`], falling back to
/// [`DEFAULT_CONFIG_PATH`] and then to the default value.
pub fn load_default<T>() -> Result<T, Report>
where
    T: DeserializeOwned + Default,
{
    let path = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                tracing::info!(
                    "No config found at '{}', using defaults",
                    path.display()
                );
                return Ok(T::default());
            }
            path
        }
    };

    load(&path)
}

#[tracing::instrument]
pub fn load<T>(path: &Path) -> Result<T, Report>
where
    T: DeserializeOwned,
{
    let file = std::fs::File::open(path).wrap_err_with(|| {
        format!("Failed to open config '{}'", path.display())
    })?;

    ron::de::from_reader(file).wrap_err_with(|| {
        format!("Failed to parse config '{}'", path.display())
    })
}

pub fn parse<T>(source: &str) -> Result<T, Report>
where
    T: DeserializeOwned,
{
    Ok(ron::de::from_str(source)?)
}

pub(crate) mod serde_color {
    use {
        palette::{LinSrgb, Srgb},
        serde::de::*,
        std::fmt,
    };

    /// Hex codes are sRGB and get linearized.
    /// Arrays are taken as linear and may exceed one.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<LinSrgb, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColorVisitor;

        impl<'de> Visitor<'de> for ColorVisitor {
            type Value = LinSrgb;

            fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.write_str("Color HEX code or array of 3 elements")
            }

            fn visit_str<E>(self, s: &str) -> Result<LinSrgb, E>
            where
                E: Error,
            {
                if s.is_ascii() && s.len() == 7 && "#" == &s[0..1] {
                    let r = u8::from_str_radix(&s[1..3], 16);
                    let g = u8::from_str_radix(&s[3..5], 16);
                    let b = u8::from_str_radix(&s[5..7], 16);

                    if let (Ok(r), Ok(g), Ok(b)) = (r, g, b) {
                        let srgb = Srgb::new(
                            r as f32 / 255.0,
                            g as f32 / 255.0,
                            b as f32 / 255.0,
                        );
                        return Ok(srgb.into_linear());
                    }
                }

                Err(E::invalid_value(Unexpected::Str(s), &self))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<LinSrgb, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let r = seq
                    .next_element()?
                    .ok_or_else(|| Error::invalid_length(0, &self))?;
                let g = seq
                    .next_element()?
                    .ok_or_else(|| Error::invalid_length(1, &self))?;
                let b = seq
                    .next_element()?
                    .ok_or_else(|| Error::invalid_length(2, &self))?;

                Ok(LinSrgb::new(r, g, b))
            }
        }
        deserializer.deserialize_any(ColorVisitor)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::joint::HumanBone,
        approx::assert_abs_diff_eq,
        palette::LinSrgb,
    };

    #[test]
    fn empty_config_uses_defaults() {
        let config: SkeletonConfig = parse("()").unwrap();

        assert_eq!(config.appearance, Appearance::default());
        assert_eq!(config.profile, ShaderProfile::Ribbon);
        assert!(config.shader.is_none());
        assert!(matches!(
            config.topology,
            TopologyConfig::Fixed { ref bones } if bones.len() == 17
        ));
    }

    #[test]
    fn colors_accept_hex_and_arrays() {
        let appearance: Appearance = parse(
            r##"(
                base_color: "#ff0000",
                emissive_color: [4.0, 2.0, 1.0],
                debug: true,
            )"##,
        )
        .unwrap();

        assert_abs_diff_eq!(appearance.base_color.red, 1.0, epsilon = 1e-6);
        assert_eq!(appearance.base_color.green, 0.0);
        assert_eq!(appearance.emissive_color, LinSrgb::new(4.0, 2.0, 1.0));
        assert!(appearance.debug);
        assert_eq!(appearance.strip_speed, 4.0);
    }

    #[test]
    fn hex_colors_are_linearized() {
        let appearance: Appearance =
            parse(r##"(base_color: "#808080")"##).unwrap();
        assert_abs_diff_eq!(appearance.base_color.red, 0.2158, epsilon = 1e-3);
    }

    #[test]
    fn malformed_color_is_rejected() {
        assert!(parse::<Appearance>(r##"(base_color: "#12")"##).is_err());
        assert!(parse::<Appearance>("(base_color: [1.0, 0.5])").is_err());
    }

    #[test]
    fn topology_variants_parse() {
        let config: SkeletonConfig = parse(
            r#"(
                shader: Some("geofx/skeleton"),
                profile: Basic,
                topology: Hierarchy(min_joint_distance: 0.05),
            )"#,
        )
        .unwrap();

        assert_eq!(config.shader().unwrap().name(), "geofx/skeleton");
        assert_eq!(config.profile, ShaderProfile::Basic);

        let resolver = config.topology.build();
        assert!(resolver.as_fixed().is_none());

        let config: SkeletonConfig = parse(
            r#"(
                topology: Fixed(bones: [
                    (from: Hips, to: Spine, radius: -2.0),
                ]),
            )"#,
        )
        .unwrap();

        let mut config = config;
        config.sanitize();
        match &config.topology {
            TopologyConfig::Fixed { bones } => assert_eq!(
                bones,
                &[Bone::new(HumanBone::Hips, HumanBone::Spine, 0.0)]
            ),
            TopologyConfig::Hierarchy { .. } => panic!("expected fixed bones"),
        }
    }

    #[test]
    fn hierarchy_defaults_skip_short_joints() {
        let config: SkeletonConfig =
            parse("(topology: Hierarchy(radius: 0.5))").unwrap();

        let mut resolver = config.topology.build();
        let walk = resolver.as_hierarchy_mut().unwrap();
        assert_eq!(walk.min_joint_distance(), 0.2);
        assert_eq!(walk.radius(), 0.5);
        assert!(!walk.topology_cache());
    }

    #[test]
    fn sanitize_clamps_appearance() {
        let mut config: SkeletonConfig =
            parse("(appearance: (base_radius: 3.0, hue_shift: -1.0))").unwrap();
        config.sanitize();

        assert_eq!(config.appearance.base_radius, 0.5);
        assert_eq!(config.appearance.hue_shift, 0.0);
    }
}
