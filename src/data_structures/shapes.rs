//! Vertex generators for simple triangle-list shapes.

use crate::data_structures::vertex::Vertex;

/// Appends a quad `a b c d` (counter-clockwise) as two triangles.
fn push_quad(out: &mut Vec<Vertex>, corners: [[f32; 3]; 4], color: [u8; 4], uv_scale: f32) {
    let uvs = [[0.0, uv_scale], [uv_scale, uv_scale], [uv_scale, 0.0], [0.0, 0.0]];
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex::new(corners[i], color, uvs[i]));
    }
}

/// Unit cube centred on the origin, one colour per face. 36 vertices.
pub fn cube(colors: [[u8; 4]; 6]) -> Vec<Vertex> {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let faces = [
        [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]], // +Z
        [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]], // -Z
        [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]], // +X
        [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]], // -X
        [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]], // +Y
        [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]], // -Y
    ];
    let mut vertices = Vec::with_capacity(36);
    for (corners, color) in faces.into_iter().zip(colors) {
        push_quad(&mut vertices, corners, color, 1.0);
    }
    vertices
}

/// Inward-facing cube of edge `size`, shaded from `top` to `bottom`.
pub fn sky_box(size: f32, top: [u8; 4], bottom: [u8; 4]) -> Vec<Vertex> {
    let mut vertices = cube([top, top, top, top, top, bottom]);
    // flip winding so the faces point inwards
    for triangle in vertices.chunks_mut(3) {
        triangle.swap(1, 2);
    }
    for vertex in vertices.iter_mut() {
        let [x, y, z] = vertex.position;
        vertex.position = [x * size, y * size, z * size];
        if y < 0.0 {
            vertex.color = bottom;
        }
    }
    vertices
}

/// Flat square on the XZ plane, `size` wide, texture repeated `tiles` times.
pub fn plane(size: f32, tiles: f32, color: [u8; 4]) -> Vec<Vertex> {
    let h = size / 2.0;
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        [[-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h], [-h, 0.0, -h]],
        color,
        tiles,
    );
    vertices
}

/// Square-based pyramid of unit height standing on the origin. 18 vertices.
pub fn pyramid(color: [u8; 4], apex_color: [u8; 4]) -> Vec<Vertex> {
    let p = 0.5_f32;
    let apex = [0.0, 1.0, 0.0];
    let base = [[-p, 0.0, p], [p, 0.0, p], [p, 0.0, -p], [-p, 0.0, -p]];
    let mut vertices = Vec::with_capacity(18);
    for i in 0..4 {
        let a = base[i];
        let b = base[(i + 1) % 4];
        vertices.push(Vertex::new(a, color, [0.0, 1.0]));
        vertices.push(Vertex::new(b, color, [1.0, 1.0]));
        vertices.push(Vertex::new(apex, apex_color, [0.5, 0.0]));
    }
    // base, facing down
    push_quad(&mut vertices, [base[3], base[2], base[1], base[0]], color, 1.0);
    vertices
}
