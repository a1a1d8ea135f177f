//! In-memory `Gl` that records every call. Test-only.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::glutils::{BufferTarget, Gl};
use crate::math::Vec4;
use crate::shaders::Stage;

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(Stage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    GenVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    GenBuffer(u32),
    BindBuffer(BufferTarget, u32),
    BufferData(BufferTarget, usize),
    DeleteBuffer(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: usize,
    },
    EnableAttrib(u32),
    DisableAttrib(u32),
    DrawElements(i32),
    Clear(Vec4),
}

/// Attribute channel state as the driver would report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttribPointer {
    pub buffer: u32,
    pub size: i32,
    pub stride: i32,
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct RecordingGl {
    pub calls: Vec<GlCall>,
    /// Compilation of this stage reports failure.
    pub fail_stage: Option<Stage>,
    /// Caps how many compiles of `fail_stage` fail; `None` fails all of them.
    pub stage_failures: Option<usize>,
    /// Linking reports failure.
    pub fail_link: bool,
    pub error_code: u32,
    pub buffers: HashMap<u32, Vec<u8>>,
    pub attribs: HashMap<u32, AttribPointer>,
    /// Every recorded call, shared so a test can still read it after the
    /// owner of this `RecordingGl` is gone.
    pub journal: Rc<RefCell<Vec<GlCall>>>,
    next_id: u32,
    failed_shaders: HashSet<u32>,
    shader_stages: HashMap<u32, Stage>,
    shader_sources: HashMap<u32, String>,
    bound: HashMap<BufferTarget, u32>,
}

impl RecordingGl {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, call: GlCall) {
        self.journal.borrow_mut().push(call.clone());
        self.calls.push(call);
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Sources handed to shaders of `stage`, in creation order.
    pub fn sources_for(&self, stage: Stage) -> Vec<String> {
        let mut ids: Vec<_> = self
            .shader_stages
            .iter()
            .filter(|(_, s)| **s == stage)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| self.shader_sources.get(id).cloned())
            .collect()
    }
}

impl Gl for RecordingGl {
    fn create_shader(&mut self, stage: Stage) -> u32 {
        let id = self.next();
        self.shader_stages.insert(id, stage);
        self.record(GlCall::CreateShader(stage, id));
        id
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        self.shader_sources.insert(shader, source.to_string());
        self.record(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&mut self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
        let stage = self.shader_stages.get(&shader).copied();
        if stage.is_none() || stage != self.fail_stage {
            return;
        }
        match self.stage_failures.as_mut() {
            Some(0) => {}
            Some(left) => {
                *left -= 1;
                self.failed_shaders.insert(shader);
            }
            None => {
                self.failed_shaders.insert(shader);
            }
        }
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        !self.failed_shaders.contains(&shader)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        format!("0:1(1): error: syntax error in shader {shader}")
    }

    fn delete_shader(&mut self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> u32 {
        let id = self.next();
        self.record(GlCall::CreateProgram(id));
        id
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&mut self, program: u32) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_linked(&self, _program: u32) -> bool {
        !self.fail_link
    }

    fn program_info_log(&self, program: u32) -> String {
        format!("error: link failed for program {program}: unresolved varying")
    }

    fn use_program(&mut self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn gen_vertex_array(&mut self) -> u32 {
        let id = self.next();
        self.record(GlCall::GenVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&mut self, vao: u32) {
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn gen_buffer(&mut self) -> u32 {
        let id = self.next();
        self.record(GlCall::GenBuffer(id));
        id
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        self.bound.insert(target, buffer);
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        let buffer = self.bound.get(&target).copied().unwrap_or(0);
        self.buffers.insert(buffer, data.to_vec());
        self.record(GlCall::BufferData(target, data.len()));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, stride: i32, offset: usize) {
        let buffer = self.bound.get(&BufferTarget::Array).copied().unwrap_or(0);
        self.attribs.insert(
            index,
            AttribPointer {
                buffer,
                size,
                stride,
                offset,
            },
        );
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::EnableAttrib(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::DisableAttrib(index));
    }

    fn draw_elements(&mut self, count: i32) {
        self.record(GlCall::DrawElements(count));
    }

    fn clear(&mut self, color: Vec4) {
        self.record(GlCall::Clear(color));
    }

    fn get_error(&self) -> u32 {
        self.error_code
    }
}
