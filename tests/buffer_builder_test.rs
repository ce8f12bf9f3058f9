mod common;

use batch_ngin::{
    builder::{BufferBuilder, LevelLayout},
    data_structures::{
        model::{Model, TextureId, TextureSource},
        vertex::VERTEX_SIZE,
    },
    error::GpuError,
    geometry::{GeometryBuffer, HostStore},
};

use crate::common::test_utils::{RecordingRenderer, level_with, vertices};

#[test]
fn level_is_laid_out_sky_terrain_then_models() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut textures = RecordingRenderer::new();
    let mut level = level_with(4, 6, &[3]);

    let layout = BufferBuilder::load_level(&mut geometry, &mut textures, &mut level).unwrap();

    assert_eq!(level.sky_block.offset(), Some(0));
    assert_eq!(level.terrain.offset(), Some(4 * VERTEX_SIZE));
    assert_eq!(level.models[0].offset(), Some(10 * VERTEX_SIZE));
    assert_eq!(
        layout,
        LevelLayout {
            total_bytes: 13 * VERTEX_SIZE,
            stride: VERTEX_SIZE,
            model_count: 1,
        }
    );
    assert!(geometry.is_formatted());
    assert_eq!(level.models[0].vertex_range().unwrap(), 10..13);
}

#[test]
fn every_offset_is_the_sum_of_the_runs_before_it() {
    let counts = [5, 1, 7, 2];
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut level = level_with(3, 2, &counts);

    BufferBuilder::load_level(&mut geometry, &mut RecordingRenderer::new(), &mut level).unwrap();

    let mut before = 3 + 2;
    for (model, count) in level.models.iter().zip(counts) {
        assert_eq!(model.offset(), Some(before as u64 * VERTEX_SIZE));
        before += count;
    }
    assert_eq!(geometry.size(), before as u64 * VERTEX_SIZE);
}

#[test]
fn buffer_holds_the_vertices_in_load_order() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut level = level_with(2, 3, &[4, 1]);

    BufferBuilder::load_level(&mut geometry, &mut RecordingRenderer::new(), &mut level).unwrap();

    let expected: Vec<u8> = level
        .all_models()
        .flat_map(|model| bytemuck::cast_slice::<_, u8>(model.vertices.as_slice()).to_vec())
        .collect();
    let bytes = geometry.store().bytes().unwrap();
    assert_eq!(&bytes[..expected.len()], expected.as_slice());
}

#[test]
fn loading_the_same_level_twice_gives_the_same_layout() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut textures = RecordingRenderer::new();
    let mut level = level_with(4, 6, &[3, 8]);

    let first = BufferBuilder::load_level(&mut geometry, &mut textures, &mut level).unwrap();
    let offsets: Vec<_> = level.all_models().map(Model::offset).collect();
    let second = BufferBuilder::load_level(&mut geometry, &mut textures, &mut level).unwrap();

    assert_eq!(first, second);
    assert_eq!(level.all_models().map(Model::offset).collect::<Vec<_>>(), offsets);
    assert_eq!(geometry.size(), first.total_bytes);
}

#[test]
fn textures_are_reloaded_in_level_order() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut textures = RecordingRenderer::new();
    let mut level = level_with(1, 1, &[]);
    let grass = level.add_texture(TextureSource::rgba("grass", 1, 1, vec![0, 255, 0, 255]));
    let stone = level.add_texture(TextureSource::file("stone", "stone.png"));
    level.add_model(Model::new("rock", vertices(3, 1.0)).with_texture(stone));
    level.terrain.texture = Some(grass);

    BufferBuilder::load_level(&mut geometry, &mut textures, &mut level).unwrap();
    BufferBuilder::load_level(&mut geometry, &mut textures, &mut level).unwrap();

    assert_eq!(textures.unloads, 2);
    assert_eq!(
        textures.loaded,
        vec![(TextureId(0), "grass".to_string()), (TextureId(1), "stone".to_string())]
    );
}

#[test]
fn model_with_unknown_texture_fails_the_load() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut level = level_with(1, 1, &[]);
    level.add_model(Model::new("orphan", vertices(3, 1.0)).with_texture(TextureId(5)));

    let result = BufferBuilder::load_level(&mut geometry, &mut RecordingRenderer::new(), &mut level);

    assert!(matches!(result, Err(GpuError::MissingTexture(TextureId(5)))));
    assert!(!geometry.is_formatted());
}

#[test]
fn empty_models_share_the_offset_of_the_next_run() {
    let mut geometry = GeometryBuffer::new(HostStore::new());
    let mut level = level_with(2, 0, &[0, 3]);

    BufferBuilder::load_level(&mut geometry, &mut RecordingRenderer::new(), &mut level).unwrap();

    assert_eq!(level.terrain.offset(), Some(2 * VERTEX_SIZE));
    assert_eq!(level.models[0].offset(), Some(2 * VERTEX_SIZE));
    assert_eq!(level.models[1].offset(), Some(2 * VERTEX_SIZE));
    assert_eq!(level.models[0].vertex_range().unwrap(), 2..2);
}
