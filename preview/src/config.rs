use {color_eyre::Report, geofx::config::SkeletonConfig};

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub skeleton: SkeletonConfig,
    pub preview: PreviewConfig,
}

impl Config {
    pub fn load_default() -> Result<Self, Report> {
        let mut config: Config = geofx::config::load_default()?;
        config.skeleton.sanitize();
        Ok(config)
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Number of simulated frames.
    pub frames: u32,

    /// Simulated frames per second.
    pub frame_rate: f32,

    /// Times visited under external time control after the run.
    pub scrub: Vec<f32>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            frames: 120,
            frame_rate: 60.0,
            scrub: vec![0.0, 0.5, 1.0, 2.5],
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, geofx::config::TopologyConfig};

    #[test]
    fn sample_config_parses() {
        let config: Config =
            geofx::config::parse(include_str!("../../geofx.ron")).unwrap();

        assert_eq!(config.skeleton.shader.as_deref(), Some("geofx/skeleton"));
        assert_eq!(config.preview.frames, 120);
        assert!(matches!(
            config.skeleton.topology,
            TopologyConfig::Fixed { ref bones } if bones.len() == 17
        ));
    }
}
