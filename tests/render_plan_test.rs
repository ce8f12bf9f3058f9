mod common;

use batch_ngin::{
    batch::InstanceBatcher,
    builder::BufferBuilder,
    camera::CameraView,
    cgmath::{self, Transform as _},
    data_structures::{
        instance::{InstanceRaw, Transform},
        model::{Model, ModelId, TextureId, TextureSource, draw_index},
    },
    error::GpuError,
    geometry::{GeometryBuffer, HostStore},
    render::{DrawPlan, Frame, Renderer},
    scene::{Actor, Level},
};

use crate::common::test_utils::{RecordingRenderer, TestActor, journal, level_with, vertices};

const ASPECT: f32 = 1.5;

fn loaded(mut level: Level) -> Level {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    BufferBuilder::load_level(&mut geometry, &mut RecordingRenderer::new(), &mut level).unwrap();
    level
}

fn close(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> bool {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() < 1e-4)
}

fn plan_for(level: &Level, camera: CameraView) -> Result<DrawPlan, GpuError> {
    let mut batcher = InstanceBatcher::new();
    let batches = batcher.rebuild(&level.actors, level.models.len()).unwrap();
    let frame = Frame {
        camera,
        sky_block: &level.sky_block,
        terrain: &level.terrain,
        models: &level.models,
        actors: &level.actors,
        batches,
    };
    DrawPlan::build(&frame, ASPECT, 0.1, 100.0)
}

fn camera() -> CameraView {
    CameraView::new((0.0, 5.0, 10.0), (0.0, 0.0, 0.0))
}

#[test]
fn sky_and_terrain_come_first_with_identity_world() {
    let journal = journal();
    let mut level = level_with(4, 6, &[3]);
    level.spawn(TestActor::new("a", ModelId(0), &journal).at([2.0, 0.0, 0.0]));
    let level = loaded(level);

    let plan = plan_for(&level, camera()).unwrap();

    let view_proj = camera().view_projection(ASPECT, 0.1, 100.0);
    assert_eq!(plan.calls[0].model, "sky");
    assert_eq!(plan.calls[0].vertices, 0..4);
    assert_eq!(plan.calls[0].instances, 0..1);
    assert_eq!(plan.calls[1].model, "terrain");
    assert_eq!(plan.calls[1].vertices, 4..10);
    assert_eq!(plan.calls[1].instances, 1..2);
    assert!(close(plan.instances[0].mvp, view_proj.into()));
    assert!(close(plan.instances[1].mvp, view_proj.into()));
}

#[test]
fn each_group_is_one_call_starting_at_the_model_offset() {
    let journal = journal();
    let mut level = level_with(4, 6, &[3, 5, 2]);
    level.spawn(TestActor::new("a", ModelId(2), &journal));
    level.spawn(TestActor::new("b", ModelId(0), &journal));
    level.spawn(TestActor::new("c", ModelId(2), &journal));
    let level = loaded(level);

    let plan = plan_for(&level, camera()).unwrap();

    assert_eq!(plan.calls.len(), 4);
    assert_eq!(plan.calls[2].model, "model0");
    assert_eq!(plan.calls[2].vertices, 10..13);
    assert_eq!(plan.calls[2].instances, 2..3);
    assert_eq!(plan.calls[3].model, "model2");
    assert_eq!(plan.calls[3].vertices, 18..20);
    assert_eq!(plan.calls[3].instances, 3..5);
    assert_eq!(plan.instances.len(), 5);
}

#[test]
fn instance_matrix_is_view_projection_times_world() {
    let journal = journal();
    let mut level = level_with(1, 1, &[3]);
    let mut actor = TestActor::new("a", ModelId(0), &journal).at([1.0, 2.0, 3.0]);
    actor.transform.scale = cgmath::Vector3::new(2.0, 2.0, 2.0);
    actor.transform.set_euler(cgmath::Deg(0.0), cgmath::Deg(90.0), cgmath::Deg(0.0));
    let world = actor.transform().to_matrix();
    level.spawn(actor);
    let level = loaded(level);

    let plan = plan_for(&level, camera()).unwrap();

    let expected = camera().view_projection(ASPECT, 0.1, 100.0) * world;
    assert!(close(plan.instances[2].mvp, expected.into()));
    assert_eq!(InstanceRaw::from(expected).mvp, Into::<[[f32; 4]; 4]>::into(expected));
}

#[test]
fn world_matrix_rotates_then_scales_then_translates() {
    let mut transform = Transform::at(cgmath::Vector3::new(10.0, 0.0, 0.0));
    transform.scale = cgmath::Vector3::new(2.0, 1.0, 1.0);
    transform.set_euler(cgmath::Deg(0.0), cgmath::Deg(0.0), cgmath::Deg(90.0));

    let moved = transform
        .to_matrix()
        .transform_point(cgmath::Point3::new(0.0, 1.0, 0.0));

    // (0,1,0) rolls onto -x, is stretched to -2 and shifted to 8
    assert!((moved.x - 8.0).abs() < 1e-5);
    assert!(moved.y.abs() < 1e-5);
    assert!(moved.z.abs() < 1e-5);
}

#[test]
fn looked_at_point_lands_in_the_middle_of_the_screen() {
    let view = camera();
    let clip = view.view_projection(ASPECT, 0.1, 100.0) * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!((clip.x / clip.w).abs() < 1e-5);
    assert!((clip.y / clip.w).abs() < 1e-5);
    let depth = clip.z / clip.w;
    assert!((0.0..=1.0).contains(&depth));
}

#[test]
fn textured_models_carry_their_texture_id() {
    let journal = journal();
    let mut level = level_with(1, 1, &[]);
    let rock = level.add_texture(TextureSource::rgba("rock", 1, 1, vec![1, 2, 3, 255]));
    level.add_model(Model::new("boulder", vertices(3, 4.0)).with_texture(rock));
    level.spawn(TestActor::new("a", ModelId(0), &journal));
    let level = loaded(level);

    let plan = plan_for(&level, camera()).unwrap();

    assert_eq!(plan.calls[0].texture, None);
    assert_eq!(plan.calls[2].texture, Some(TextureId(0)));
}

#[test]
fn model_without_offset_cannot_be_planned() {
    let level = level_with(1, 1, &[3]);
    let result = plan_for(&level, camera());
    assert!(matches!(result, Err(GpuError::ModelNotLoaded(name)) if name == "sky"));
}

#[test]
fn draw_ranges_past_u32_are_rejected() {
    let last = u64::from(u32::MAX);
    assert_eq!(draw_index(last, "vertices").unwrap(), u32::MAX);
    assert!(matches!(
        draw_index(last + 1, "instances"),
        Err(GpuError::DrawRange { what: "instances", count }) if count == last + 1
    ));
}

#[test]
fn recording_renderer_refuses_an_uninitialized_buffer() {
    let level = loaded(level_with(1, 1, &[]));
    let batches = InstanceBatcher::new();
    let frame = Frame {
        camera: camera(),
        sky_block: &level.sky_block,
        terrain: &level.terrain,
        models: &level.models,
        actors: &level.actors,
        batches: batches.batches(),
    };
    let geometry = GeometryBuffer::new(HostStore::new());

    let result = RecordingRenderer::new().draw(&geometry, &frame);

    assert!(matches!(result, Err(GpuError::NotInitialized)));
}
