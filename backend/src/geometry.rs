use super::glutils::{BufferTarget, Gl};
use super::math::Vertex;
use std::mem::size_of;
use thiserror::Error;

pub const POSITION_CHANNEL: u32 = 0;
pub const COLOR_CHANNEL: u32 = 1;

pub const POSITION_COMPONENTS: usize = 3;
pub const COLOR_COMPONENTS: usize = 4;
pub const FLOAT_SIZE_BYTES: usize = size_of::<f32>();
/// Interleaved record size: 7 floats, 28 bytes.
pub const VERTEX_SIZE_BYTES: usize = (POSITION_COMPONENTS + COLOR_COMPONENTS) * FLOAT_SIZE_BYTES;
pub const COLOR_OFFSET_BYTES: usize = POSITION_COMPONENTS * FLOAT_SIZE_BYTES;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index count {0} is not a whole number of triangles")]
    PartialTriangle(usize),
    #[error("interleaved payload of {0} floats is not a whole number of 7-float records")]
    PartialVertex(usize),
}

/// Interleaved vertices plus counter-clockwise triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPayload {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryPayload {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<GeometryPayload, GeometryError> {
        if indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(indices.len()));
        }
        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertices.len())
        {
            return Err(GeometryError::IndexOutOfRange {
                position,
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(GeometryPayload { vertices, indices })
    }

    /// Builds a payload from raw interleaved floats (`x y z r g b a` per vertex).
    pub fn from_interleaved(floats: &[f32], indices: Vec<u32>) -> Result<GeometryPayload, GeometryError> {
        if floats.len() % (POSITION_COMPONENTS + COLOR_COMPONENTS) != 0 {
            return Err(GeometryError::PartialVertex(floats.len()));
        }
        let vertices: &[Vertex] = bytemuck::try_cast_slice(floats)
            .map_err(|_| GeometryError::PartialVertex(floats.len()))?;
        Self::new(vertices.to_vec(), indices)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// GPU-side handles for one uploaded payload. Created by `upload`, freed by
/// `release`; never shared between scenes.
#[derive(Debug, PartialEq, Eq)]
pub struct GpuBufferSet {
    vao: u32,
    vbo: u32,
    ebo: u32,
    index_count: i32,
}

impl GpuBufferSet {
    /// Uploads both arrays with a static-draw hint and declares the
    /// position/color channels against the vertex buffer.
    pub fn upload(gl: &mut dyn Gl, payload: &GeometryPayload) -> GpuBufferSet {
        let vao = gl.gen_vertex_array();
        gl.bind_vertex_array(vao);

        let vbo = gl.gen_buffer();
        gl.bind_buffer(BufferTarget::Array, vbo);
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&payload.vertices));

        let ebo = gl.gen_buffer();
        gl.bind_buffer(BufferTarget::ElementArray, ebo);
        gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&payload.indices));

        gl.vertex_attrib_pointer(
            POSITION_CHANNEL,
            POSITION_COMPONENTS as i32,
            VERTEX_SIZE_BYTES as i32,
            0,
        );
        gl.enable_vertex_attrib_array(POSITION_CHANNEL);

        gl.vertex_attrib_pointer(
            COLOR_CHANNEL,
            COLOR_COMPONENTS as i32,
            VERTEX_SIZE_BYTES as i32,
            COLOR_OFFSET_BYTES,
        );
        gl.enable_vertex_attrib_array(COLOR_CHANNEL);

        log::debug!(
            "uploaded {} vertices / {} indices (vao {}, vbo {}, ebo {})",
            payload.vertices.len(),
            payload.indices.len(),
            vao,
            vbo,
            ebo
        );

        GpuBufferSet {
            vao,
            vbo,
            ebo,
            index_count: payload.indices.len() as i32,
        }
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    /// Full bind / enable / draw / disable / unbind cycle. Nothing about the
    /// bound state is assumed to survive between calls.
    pub fn draw(&self, gl: &mut dyn Gl) {
        gl.bind_vertex_array(self.vao);
        gl.enable_vertex_attrib_array(POSITION_CHANNEL);
        gl.enable_vertex_attrib_array(COLOR_CHANNEL);

        gl.draw_elements(self.index_count);

        gl.disable_vertex_attrib_array(POSITION_CHANNEL);
        gl.disable_vertex_attrib_array(COLOR_CHANNEL);
        gl.bind_vertex_array(0);
    }

    pub fn release(self, gl: &mut dyn Gl) {
        gl.delete_buffer(self.ebo);
        gl.delete_buffer(self.vbo);
        gl.delete_vertex_array(self.vao);
        log::debug!("released vao {}", self.vao);
    }
}
