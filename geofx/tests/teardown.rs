use {
    geofx::{
        renderer::{headless::HeadlessContext, Release},
        scene::{spawn_node, spawn_root, Global3},
        HierarchyWalk, Playback, Rig, SegmentResolver, Shader, Skeleton,
    },
    hecs::World,
    nalgebra as na,
};

const SHADER: &str = "geofx/skeleton";

fn setup(world: &mut World) -> Skeleton<HeadlessContext> {
    let root = spawn_root(world, Global3::identity());
    spawn_node(world, root, na::Isometry3::translation(0.0, 1.0, 0.0))
        .unwrap();

    Skeleton::new(
        SegmentResolver::Hierarchy(HierarchyWalk::new(0.1)),
        Rig::new(root),
    )
    .with_shader(Shader::new(SHADER))
}

#[test]
fn teardown_twice_is_harmless() {
    let mut world = World::new();
    let mut ctx = HeadlessContext::new().with_shader(SHADER);
    let mut skeleton = setup(&mut world);

    skeleton.update(&world, &Playback::Idle, &mut ctx).unwrap();
    assert!(skeleton.has_resources());

    skeleton.teardown(&mut ctx);
    assert!(skeleton.mesh().is_none());
    assert!(skeleton.material().is_none());
    assert_eq!(ctx.released().len(), 2);

    skeleton.teardown(&mut ctx);
    assert_eq!(ctx.released().len(), 2);
    assert_eq!(ctx.live_resources(), 0);
}

#[test]
fn teardown_before_update_does_nothing() {
    let mut world = World::new();
    let mut ctx = HeadlessContext::new().with_shader(SHADER);
    let mut skeleton = setup(&mut world);

    skeleton.teardown(&mut ctx);
    assert!(ctx.released().is_empty());
}

#[test]
fn release_is_deferred_while_running() {
    let mut world = World::new();
    let mut ctx = HeadlessContext::new().with_shader(SHADER).with_running(true);
    let mut skeleton = setup(&mut world);

    skeleton.update(&world, &Playback::Idle, &mut ctx).unwrap();
    skeleton.teardown(&mut ctx);

    assert!(ctx
        .released()
        .iter()
        .all(|&(_, release)| release == Release::Deferred));
    assert_eq!(ctx.pending_releases().len(), 2);

    ctx.end_frame();
    assert!(ctx.pending_releases().is_empty());
}

#[test]
fn release_is_immediate_when_idle() {
    let mut world = World::new();
    let mut ctx = HeadlessContext::new().with_shader(SHADER);
    let mut skeleton = setup(&mut world);

    skeleton.update(&world, &Playback::Idle, &mut ctx).unwrap();
    skeleton.teardown(&mut ctx);

    assert!(ctx
        .released()
        .iter()
        .all(|&(_, release)| release == Release::Immediate));
    assert!(ctx.pending_releases().is_empty());
}

#[test]
fn update_after_teardown_reacquires() {
    let mut world = World::new();
    let mut ctx = HeadlessContext::new().with_shader(SHADER);
    let mut skeleton = setup(&mut world);

    skeleton.update(&world, &Playback::Idle, &mut ctx).unwrap();
    skeleton.teardown(&mut ctx);

    let report = skeleton.update(&world, &Playback::Idle, &mut ctx).unwrap();
    assert!(report.drawn);
    assert_eq!(ctx.live_resources(), 2);
}
