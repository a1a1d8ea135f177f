use super::config::FailurePolicy;
use super::glutils::Gl;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Line-start directive introducing a stage block, e.g. `#type vertex`.
const STAGE_DIRECTIVE: &str = "#type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn from_name(name: &str) -> Option<Stage> {
        match name {
            "vertex" => Some(Stage::Vertex),
            "fragment" => Some(Stage::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read shader file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}: unexpected stage name '{name}' (expected 'vertex' or 'fragment')")]
    UnknownStage { origin: String, name: String },
    #[error("{origin}: expected exactly two '#type' markers, found {found}")]
    MarkerCount { origin: String, found: usize },
    #[error("{origin}: stage '{stage}' is declared twice")]
    DuplicateStage { origin: String, stage: Stage },
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{origin}: {stage} shader compilation failed:\n{log}")]
    Compile {
        origin: String,
        stage: Stage,
        log: String,
    },
    #[error("{origin}: program link failed:\n{log}")]
    Link { origin: String, log: String },
}

/// The two stage bodies extracted from one annotated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub origin: String,
    pub vertex: String,
    pub fragment: String,
}

struct Marker<'a> {
    name: &'a str,
    /// Byte offset where the marker line starts.
    start: usize,
    /// Byte offset just past the marker line's terminator.
    body_start: usize,
}

/// Returns the stage name if `line` (terminator excluded) is a stage marker.
fn marker_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(STAGE_DIRECTIVE)?;
    if rest.is_empty() {
        return Some("");
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim())
}

impl ShaderSource {
    /// Reads `path` and splits it into its vertex and fragment bodies.
    pub fn load(path: impl AsRef<Path>) -> Result<ShaderSource, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Splits `text` at its two `#type <stage>` marker lines. The blocks
    /// may appear in either order; each body runs up to the next marker or
    /// the end of the text.
    pub fn parse(text: &str, origin: &str) -> Result<ShaderSource, ParseError> {
        let mut markers = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some(name) = marker_name(content) {
                markers.push(Marker {
                    name,
                    start: offset,
                    body_start: offset + line.len(),
                });
            }
            offset += line.len();
        }

        if markers.len() != 2 {
            return Err(ParseError::MarkerCount {
                origin: origin.to_string(),
                found: markers.len(),
            });
        }

        let mut vertex = None;
        let mut fragment = None;
        for (i, marker) in markers.iter().enumerate() {
            let stage = Stage::from_name(marker.name).ok_or_else(|| ParseError::UnknownStage {
                origin: origin.to_string(),
                name: marker.name.to_string(),
            })?;
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
            let body = text[marker.body_start..end].to_string();

            let slot = match stage {
                Stage::Vertex => &mut vertex,
                Stage::Fragment => &mut fragment,
            };
            if slot.replace(body).is_some() {
                return Err(ParseError::DuplicateStage {
                    origin: origin.to_string(),
                    stage,
                });
            }
        }

        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            return Err(ParseError::MarkerCount {
                origin: origin.to_string(),
                found: markers.len(),
            });
        };
        Ok(ShaderSource {
            origin: origin.to_string(),
            vertex,
            fragment,
        })
    }
}

/// Placeholder program with the standard attribute layout; paints magenta.
const FALLBACK_VERTEX: &str = "#version 330 core
layout (location=0) in vec3 aPos;
layout (location=1) in vec4 aColor;

void main()
{
    gl_Position = vec4(aPos, 1.0);
}
";

const FALLBACK_FRAGMENT: &str = "#version 330 core
out vec4 color;

void main()
{
    color = vec4(1.0, 0.0, 1.0, 1.0);
}
";

/// A linked GPU program. Owns its program object until `release`.
#[derive(Debug)]
pub struct ShaderProgram {
    program_id: u32,
    origin: String,
}

impl ShaderProgram {
    /// Parses `path` and compiles it. Parse failures happen before any GL call.
    pub fn from_file(gl: &mut dyn Gl, path: impl AsRef<Path>) -> Result<ShaderProgram, ShaderError> {
        let source = ShaderSource::load(path)?;
        Self::compile_and_link(gl, &source)
    }

    /// Like `from_file`, but under `FailurePolicy::Degrade` any shader error
    /// is logged and replaced by the fallback program.
    pub fn from_file_with_policy(
        gl: &mut dyn Gl,
        path: impl AsRef<Path>,
        policy: FailurePolicy,
    ) -> Result<ShaderProgram, ShaderError> {
        match Self::from_file(gl, path) {
            Err(e) if policy == FailurePolicy::Degrade => {
                log::error!("{e}");
                log::warn!("substituting the fallback shader");
                Self::fallback(gl)
            }
            other => other,
        }
    }

    pub fn fallback(gl: &mut dyn Gl) -> Result<ShaderProgram, ShaderError> {
        let source = ShaderSource {
            origin: "<fallback>".to_string(),
            vertex: FALLBACK_VERTEX.to_string(),
            fragment: FALLBACK_FRAGMENT.to_string(),
        };
        Self::compile_and_link(gl, &source)
    }

    /// Compiles both stages and links them. A failing vertex stage stops
    /// before the fragment stage is created, and nothing is linked unless
    /// both stages compiled.
    pub fn compile_and_link(
        gl: &mut dyn Gl,
        source: &ShaderSource,
    ) -> Result<ShaderProgram, ShaderError> {
        let vertex_shader = Self::compile(gl, source, Stage::Vertex, &source.vertex)?;

        let fragment_shader = match Self::compile(gl, source, Stage::Fragment, &source.fragment) {
            Ok(id) => id,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                return Err(e);
            }
        };

        let shader_program = gl.create_program();
        gl.attach_shader(shader_program, vertex_shader);
        gl.attach_shader(shader_program, fragment_shader);
        gl.link_program(shader_program);

        // not needed anymore, the program keeps what it linked
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.program_linked(shader_program) {
            let log = gl.program_info_log(shader_program);
            gl.delete_program(shader_program);
            return Err(ShaderError::Link {
                origin: source.origin.clone(),
                log,
            });
        }

        log::debug!("{}: program {} linked", source.origin, shader_program);
        Ok(ShaderProgram {
            program_id: shader_program,
            origin: source.origin.clone(),
        })
    }

    fn compile(
        gl: &mut dyn Gl,
        source: &ShaderSource,
        stage: Stage,
        code: &str,
    ) -> Result<u32, ShaderError> {
        let shader_id = gl.create_shader(stage);
        if shader_id == 0 {
            return Err(ShaderError::Compile {
                origin: source.origin.clone(),
                stage,
                log: "glCreateShader returned 0".to_string(),
            });
        }

        gl.shader_source(shader_id, code);
        gl.compile_shader(shader_id);

        if !gl.shader_compiled(shader_id) {
            let log = gl.shader_info_log(shader_id);
            gl.delete_shader(shader_id);
            return Err(ShaderError::Compile {
                origin: source.origin.clone(),
                stage,
                log,
            });
        }
        Ok(shader_id)
    }

    pub fn program_id(&self) -> u32 {
        self.program_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn use_program(&self, gl: &mut dyn Gl) {
        debug_assert!(self.program_id != 0, "use of a released shader program");
        gl.use_program(self.program_id);
    }

    /// Binds the "no program" sentinel.
    pub fn detach(&self, gl: &mut dyn Gl) {
        gl.use_program(0);
    }

    pub fn release(&mut self, gl: &mut dyn Gl) {
        if self.program_id == 0 {
            return;
        }
        gl.delete_program(self.program_id);
        log::debug!("{}: program {} released", self.origin, self.program_id);
        self.program_id = 0;
    }
}
