mod common;

use batch_ngin::{
    data_structures::vertex::{VERTEX_SIZE, Vertex},
    error::GpuError,
    geometry::{GeometryBuffer, HostStore},
};

use crate::common::test_utils::vertices;

fn buffer() -> GeometryBuffer<HostStore> {
    GeometryBuffer::new(HostStore::new())
}

#[test]
fn vertex_is_packed_into_24_bytes() {
    assert_eq!(VERTEX_SIZE, 24);
    let layout = Vertex::desc();
    assert_eq!(layout.array_stride, 24);
    let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![0, 12, 16]);
    assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Unorm8x4);
    assert_eq!(layout.attributes[2].format, wgpu::VertexFormat::Float32x2);
}

#[test]
fn uninitialized_buffer_rejects_every_operation() {
    let mut geometry = buffer();
    assert!(matches!(
        geometry.add_data(&vertices(3, 0.0)),
        Err(GpuError::NotInitialized)
    ));
    assert!(matches!(geometry.format_layout(), Err(GpuError::NotInitialized)));
    assert!(matches!(geometry.ensure_drawable(), Err(GpuError::NotInitialized)));
    assert_eq!(GpuError::NotInitialized.to_string(), "buffer not initialized");
}

#[test]
fn appends_are_placed_back_to_back() {
    let mut geometry = buffer();
    geometry.init(13 * VERTEX_SIZE).unwrap();

    assert_eq!(geometry.add_data(&vertices(4, 1.0)).unwrap(), 0);
    assert_eq!(geometry.add_data(&vertices(6, 2.0)).unwrap(), 4 * VERTEX_SIZE);
    assert_eq!(geometry.add_data(&vertices(3, 3.0)).unwrap(), 10 * VERTEX_SIZE);
    assert_eq!(geometry.size(), 13 * VERTEX_SIZE);
    assert_eq!(geometry.vertex_count(), 13);
}

#[test]
fn growing_past_the_reservation_keeps_earlier_bytes() {
    let mut geometry = buffer();
    geometry.init(VERTEX_SIZE).unwrap();
    let first = vertices(1, 5.0);
    let second = vertices(5, 6.0);

    geometry.add_data(&first).unwrap();
    let offset = geometry.add_data(&second).unwrap();

    assert_eq!(offset, VERTEX_SIZE);
    assert_eq!(geometry.size(), 6 * VERTEX_SIZE);
    let bytes = geometry.store().bytes().unwrap();
    let mut expected: Vec<u8> = bytemuck::cast_slice(first.as_slice()).to_vec();
    expected.extend_from_slice(bytemuck::cast_slice(second.as_slice()));
    assert_eq!(&bytes[..expected.len()], expected.as_slice());
}

#[test]
fn empty_append_writes_nothing() {
    let mut geometry = buffer();
    geometry.init(0).unwrap();
    geometry.add_data(&vertices(2, 1.0)).unwrap();

    assert_eq!(geometry.add_data(&[]).unwrap(), 2 * VERTEX_SIZE);
    assert_eq!(geometry.size(), 2 * VERTEX_SIZE);
}

#[test]
fn layout_is_formatted_exactly_once_and_seals_the_buffer() {
    let mut geometry = buffer();
    geometry.init(0).unwrap();
    geometry.add_data(&vertices(3, 1.0)).unwrap();
    assert!(matches!(geometry.ensure_drawable(), Err(GpuError::NotFormatted)));

    let layout = geometry.format_layout().unwrap();
    assert_eq!(layout.array_stride, VERTEX_SIZE);
    assert!(geometry.is_formatted());
    assert!(geometry.ensure_drawable().is_ok());

    assert!(matches!(geometry.format_layout(), Err(GpuError::AlreadyFormatted)));
    assert!(matches!(geometry.add_data(&vertices(1, 1.0)), Err(GpuError::Sealed)));
}

#[test]
fn delete_resets_the_buffer() {
    let mut geometry = buffer();
    geometry.delete();
    geometry.init(48).unwrap();
    geometry.add_data(&vertices(2, 1.0)).unwrap();
    geometry.format_layout().unwrap();

    geometry.delete();

    assert!(!geometry.is_initialized());
    assert!(!geometry.is_formatted());
    assert_eq!(geometry.size(), 0);
    assert!(geometry.store().bytes().is_none());
    assert!(matches!(
        geometry.add_data(&vertices(1, 1.0)),
        Err(GpuError::NotInitialized)
    ));
}

#[test]
fn reinit_starts_a_fresh_unformatted_buffer() {
    let mut geometry = buffer();
    geometry.init(24).unwrap();
    geometry.add_data(&vertices(1, 1.0)).unwrap();
    geometry.format_layout().unwrap();

    geometry.init(24).unwrap();

    assert_eq!(geometry.size(), 0);
    assert!(!geometry.is_formatted());
    assert_eq!(geometry.add_data(&vertices(1, 2.0)).unwrap(), 0);
}
