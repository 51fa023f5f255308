mod config;
mod rig;

use {
    crate::{config::Config, rig::Humanoid},
    color_eyre::Report,
    eyre::WrapErr,
    geofx::{
        renderer::headless::HeadlessContext, scene::propagate, Avatar, Clocks,
        Playback, Shader, Skeleton, TimeControlled,
    },
    hecs::World,
    nalgebra as na,
    std::time::Duration,
};

/// Shader registered when config does not name one.
const DEFAULT_SHADER: &str = "geofx/skeleton";

fn main() -> Result<(), Report> {
    install_tracing();
    color_eyre::install()?;

    tracing::info!("Running at {}", std::env::current_dir()?.display());
    let config = Config::load_default()?;
    tracing::info!("Config loaded: {:?}", config);

    let mut world = World::new();
    let humanoid = Humanoid::spawn(&mut world, na::Isometry3::identity())
        .wrap_err("Failed to spawn humanoid")?;

    let mut skeleton =
        Skeleton::from_config(&config.skeleton, humanoid.rig().clone());

    if skeleton.shader().is_none() {
        tracing::warn!("No shader configured, using '{}'", DEFAULT_SHADER);
        skeleton.set_shader(Some(Shader::new(DEFAULT_SHADER)));
    }

    if let Some(topology) = skeleton.resolver().as_fixed() {
        topology
            .validate(&Avatar::new(&world, skeleton.rig()))
            .wrap_err("Humanoid rig does not cover the bone list")?;
    }

    let mut ctx = HeadlessContext::new().with_running(true);
    if let Some(shader) = skeleton.shader() {
        ctx = ctx.with_shader(shader.name());
    }

    let mut clocks = Clocks::new();
    let delta = Duration::from_secs_f32(
        1.0 / config.preview.frame_rate.max(1.0),
    );

    let mut drawn = 0;
    for frame in 0..config.preview.frames {
        let clock = clocks.advance(delta);

        humanoid.animate(&world, clock.elapsed().as_secs_f32());
        propagate(&world);

        match skeleton.update(&world, &Playback::Running(clock), &mut ctx) {
            Ok(report) => {
                tracing::debug!("Frame {}: {:?}", frame, report);
                if report.drawn {
                    drawn += 1;
                }
            }
            Err(err) => {
                tracing::error!("Frame {} failed: {}", frame, err);
            }
        }

        ctx.take_draws();
        ctx.end_frame();
    }

    tracing::info!(
        "Simulated {} frames, {} drawn",
        config.preview.frames,
        drawn
    );

    // Scrub like a paused sequencer would.
    ctx.set_running(false);
    skeleton.enter_control();
    for &time in &config.preview.scrub {
        skeleton.set_time(time);
        let report = skeleton
            .update(&world, &Playback::Idle, &mut ctx)
            .wrap_err_with(|| format!("Failed to scrub to {}", time))?;
        tracing::info!("Scrubbed to {}: {:?}", time, report);
        ctx.take_draws();
    }
    skeleton.exit_control();

    skeleton.teardown(&mut ctx);
    skeleton.teardown(&mut ctx);
    ctx.end_frame();

    tracing::info!(
        "Released {} resources, {} still alive",
        ctx.released().len(),
        ctx.live_resources()
    );

    Ok(())
}

fn install_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();
}
