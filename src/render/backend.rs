//! macroquad backend
//!
//! Uploads vertex buffers into macroquad meshes and keeps them per mesh
//! source until the buffer's revision changes or the source is released.

use std::collections::HashMap;
use macroquad::prelude::*;
use macroquad::models::{Mesh, Vertex as MqVertex};
use crate::mesh::{Primitive, Rgb, Vertex};
use crate::world::SegmentId;
use super::{DrawCall, Frame, MeshSource};

/// macroquad batches at most 5000 indices per draw call
const MAX_CHUNK_VERTICES: usize = 4998;

enum Uploaded {
    Triangles(Vec<Mesh>),
    Lines(Vec<(Vec3, Vec3, Color)>),
}

struct CacheEntry {
    revision: u64,
    geometry: Uploaded,
}

/// GPU-side copies of every drawn vertex buffer
#[derive(Default)]
pub struct GpuMeshCache {
    entries: HashMap<MeshSource, CacheEntry>,
}

fn to_color(rgb: Rgb) -> Color {
    Color::new(rgb[0], rgb[1], rgb[2], 1.0)
}

fn triangle_list(vertices: &[Vertex], primitive: Primitive) -> Vec<MqVertex> {
    let convert = |v: &Vertex| MqVertex::new(v.pos[0], v.pos[1], v.pos[2], 0.0, 0.0, to_color(v.col));

    match primitive {
        Primitive::TriangleStrip => {
            let mut out = Vec::with_capacity(vertices.len().saturating_sub(2) * 3);
            for i in 0..vertices.len().saturating_sub(2) {
                // Every other strip triangle is wound backwards
                let (a, b) = if i % 2 == 0 { (i, i + 1) } else { (i + 1, i) };
                out.extend([a, b, i + 2].iter().map(|&k| convert(&vertices[k])));
            }
            out
        }
        _ => vertices.iter().map(convert).collect(),
    }
}

/// The vertices a draw call asks for, clamped to what its buffer holds
fn call_vertices<'a>(call: &DrawCall<'a>) -> &'a [Vertex] {
    let all = call.mesh.vertices();
    all.get(..call.vertex_count).unwrap_or(all)
}

fn upload(vertices: &[Vertex], primitive: Primitive) -> Uploaded {
    match primitive {
        Primitive::Lines => Uploaded::Lines(
            vertices
                .chunks_exact(2)
                .map(|pair| (Vec3::from(pair[0].pos), Vec3::from(pair[1].pos), to_color(pair[0].col)))
                .collect(),
        ),
        Primitive::Triangles | Primitive::TriangleStrip => {
            let meshes = triangle_list(vertices, primitive)
                .chunks(MAX_CHUNK_VERTICES)
                .map(|chunk| Mesh {
                    vertices: chunk.to_vec(),
                    indices: (0..chunk.len() as u16).collect(),
                    texture: None,
                })
                .collect();
            Uploaded::Triangles(meshes)
        }
    }
}

impl GpuMeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Free the uploads of removed segments
    pub fn release(&mut self, ids: &[SegmentId]) {
        for &id in ids {
            if self.entries.remove(&MeshSource::Segment(id)).is_some() {
                log::trace!("released GPU mesh for {:?}, {} cached", id, self.len());
            }
        }
    }

    fn prepare(&mut self, call: &DrawCall<'_>) -> &Uploaded {
        let revision = call.mesh.revision();
        let entry = self
            .entries
            .entry(call.source)
            .and_modify(|entry| {
                if entry.revision != revision {
                    entry.geometry = upload(call_vertices(call), call.primitive);
                    entry.revision = revision;
                }
            })
            .or_insert_with(|| CacheEntry { revision, geometry: upload(call_vertices(call), call.primitive) });
        &entry.geometry
    }

    /// Upload anything stale and issue every draw in the frame.
    ///
    /// Expects a 3D camera to be active.
    pub fn draw(&mut self, frame: &Frame<'_>) {
        for call in &frame.draws {
            let model = Mat4::from_translation(Vec3::from(call.displacement))
                * Mat4::from_scale(Vec3::from(call.scale));

            // The model matrix applies to everything drawn until it is popped
            let gl = unsafe { get_internal_gl() }.quad_gl;
            gl.push_model_matrix(model);

            match self.prepare(call) {
                Uploaded::Triangles(meshes) => {
                    for mesh in meshes {
                        draw_mesh(mesh);
                    }
                }
                Uploaded::Lines(lines) => {
                    for &(start, end, color) in lines {
                        draw_line_3d(start, end, color);
                    }
                }
            }

            let gl = unsafe { get_internal_gl() }.quad_gl;
            gl.pop_model_matrix();
        }
    }
}

/// Clear colour of a frame as a macroquad colour
pub fn clear_color(frame: &Frame<'_>) -> Color {
    to_color(frame.clear_color)
}
