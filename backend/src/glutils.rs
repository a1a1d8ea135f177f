use gl::{types::*, *};
use std::ffi::c_void;
use std::marker::PhantomData;
use thiserror::Error;

use super::math::Vec4;
use super::shaders::Stage;

/// Buffer binding points used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Interleaved vertex records.
    Array,
    /// Triangle indices.
    ElementArray,
}

impl BufferTarget {
    fn as_gl(self) -> GLenum {
        match self {
            BufferTarget::Array => ARRAY_BUFFER,
            BufferTarget::ElementArray => ELEMENT_ARRAY_BUFFER,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("OpenGL reported error 0x{code:04x}")]
pub struct GlError {
    pub code: u32,
}

/// The subset of OpenGL the runtime talks to.
///
/// Every GPU side effect in the engine goes through this trait so shader,
/// geometry and scene code can run against an in-memory recorder in tests.
/// Handles are the raw GL object names; `0` is the "nothing bound" sentinel.
pub trait Gl {
    fn create_shader(&mut self, stage: Stage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compiled(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_linked(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&mut self, program: u32);
    fn delete_program(&mut self, program: u32);

    fn gen_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vao: u32);
    fn delete_vertex_array(&mut self, vao: u32);

    fn gen_buffer(&mut self) -> u32;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);
    /// Uploads `data` to the buffer bound at `target` with a static-draw hint.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&mut self, buffer: u32);

    /// Describes a float attribute channel against the bound array buffer.
    /// `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, stride: i32, offset: usize);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    /// Triangle list over `count` unsigned-int indices starting at offset 0.
    fn draw_elements(&mut self, count: i32);

    fn clear(&mut self, color: Vec4);
    fn get_error(&self) -> u32;
}

pub fn check_gl_err(gl: &dyn Gl) -> Result<(), GlError> {
    let code = gl.get_error();
    if code == NO_ERROR {
        return Ok(());
    }
    Err(GlError { code })
}

/// `Gl` backed by the loaded OpenGL function table.
///
/// The context is bound to the thread that created it, so this type is
/// deliberately neither `Send` nor `Sync`.
pub struct NativeGl {
    _not_send: PhantomData<*const ()>,
}

impl NativeGl {
    /// Loads the GL function table. Must run after the context is current.
    pub fn load<F>(loader: F) -> NativeGl
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        NativeGl {
            _not_send: PhantomData,
        }
    }

    pub fn log_gl_info(&self) {
        let mut mtu: i32 = 0;
        unsafe { gl::GetIntegerv(MAX_VERTEX_ATTRIBS, &mut mtu) };
        log::debug!("MAX_VERTEX_ATTRIBS = {}", mtu);

        unsafe { gl::GetIntegerv(MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut mtu) };
        log::debug!("MAX_COMBINED_TEXTURE_IMAGE_UNITS = {}", mtu);
    }
}

fn read_info_log(len: i32, fetch: impl FnOnce(i32, &mut i32, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut v = vec![0u8; len as usize];
    let mut written = 0_i32;
    fetch(len, &mut written, v.as_mut_ptr().cast());
    v.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&v).into_owned()
}

impl Gl for NativeGl {
    fn create_shader(&mut self, stage: Stage) -> u32 {
        let kind = match stage {
            Stage::Vertex => VERTEX_SHADER,
            Stage::Fragment => FRAGMENT_SHADER,
        };
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        unsafe {
            gl::ShaderSource(
                shader,
                1,
                &(source.as_bytes().as_ptr().cast()),
                &(source.len() as GLint),
            );
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, INFO_LOG_LENGTH, &mut len) };
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, cap, written, buf)
        })
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_linked(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, LINK_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, INFO_LOG_LENGTH, &mut len) };
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program, cap, written, buf)
        })
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&mut self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn gen_vertex_array(&mut self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        unsafe { gl::BindVertexArray(vao) };
    }

    fn delete_vertex_array(&mut self, vao: u32) {
        unsafe { gl::DeleteVertexArrays(1, &vao) };
    }

    fn gen_buffer(&mut self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(target.as_gl(), buffer) };
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                target.as_gl(),
                std::mem::size_of_val(data) as isize,
                data.as_ptr().cast(),
                STATIC_DRAW,
            )
        };
    }

    fn delete_buffer(&mut self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, stride: i32, offset: usize) {
        unsafe { gl::VertexAttribPointer(index, size, FLOAT, FALSE, stride, offset as *const _) };
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::DisableVertexAttribArray(index) };
    }

    fn draw_elements(&mut self, count: i32) {
        unsafe { gl::DrawElements(TRIANGLES, count, UNSIGNED_INT, std::ptr::null()) };
    }

    fn clear(&mut self, color: Vec4) {
        unsafe {
            gl::ClearColor(color.x, color.y, color.z, color.w);
            gl::Clear(COLOR_BUFFER_BIT);
        }
    }

    fn get_error(&self) -> u32 {
        unsafe { gl::GetError() }
    }
}
