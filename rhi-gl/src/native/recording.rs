//! Headless `GlApi` implementation.
//!
//! `RecordingGl` needs no context: each call is appended to a log as `Name(arg, arg)` using the
//! native entry point name without the `gl` prefix, object names are handed out from a counter
//! and queries are answered from tables the caller can tweak before creating a backend.
use super::{GlApi, NativeContext, ProcAddressLoader, UniformValue};
use crate::api as gl;
use crate::api::types::*;
use crate::extensions::KNOWN_EXTENSIONS;
use fxhash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::os::raw::c_void;
use std::ptr::{self, NonNull};

const MAP_SCRATCH_SIZE: usize = 64 * 1024;
const TIMESTAMP_STEP: u64 = 1000;

macro_rules! record_entry_points {
    ($(fn $method:ident($($arg:ident: $ty:ty),*) => $gl:ident;)*) => {
        $(
            fn $method(&self, $($arg: $ty),*) {
                self.record(stringify!($gl), &[$(&$arg as &dyn fmt::Debug),*]);
            }
        )*
    };
}

pub struct RecordingGl {
    calls: RefCell<Vec<String>>,
    next_name: Cell<GLuint>,
    version: Cell<(GLint, GLint)>,
    core_profile: Cell<bool>,
    integers: RefCell<FxHashMap<GLenum, GLint>>,
    extensions: RefCell<Vec<String>>,
    platform_extensions: RefCell<String>,
    missing_entry_points: RefCell<FxHashSet<String>>,
    missing_uniforms: RefCell<FxHashSet<String>>,
    uniform_locations: RefCell<FxHashMap<String, GLint>>,
    uniform_block_indices: RefCell<FxHashMap<String, GLuint>>,
    fail_compile: Cell<bool>,
    fail_link: Cell<bool>,
    fail_validate: Cell<bool>,
    fail_map: Cell<bool>,
    framebuffer_status: Cell<GLenum>,
    query_available: Cell<bool>,
    samples_passed: Cell<u64>,
    active_queries: RefCell<FxHashMap<GLenum, GLuint>>,
    query_results: RefCell<FxHashMap<GLuint, u64>>,
    timestamp: Cell<u64>,
    map_scratch: RefCell<Vec<u8>>,
    framebuffer_size: Cell<(u32, u32)>,
}

impl RecordingGl {
    /// A 4.6 core profile context exposing every extension the backend knows about.
    pub fn new() -> RecordingGl {
        let mut integers = FxHashMap::default();
        integers.insert(gl::MAX_PATCH_VERTICES, 32);
        integers.insert(gl::MAX_VIEWPORTS, 16);
        integers.insert(gl::MAX_DRAW_BUFFERS, 8);
        integers.insert(gl::MAX_COLOR_ATTACHMENTS, 8);
        integers.insert(gl::MAX_TEXTURE_SIZE, 16384);
        integers.insert(gl::MAX_ARRAY_TEXTURE_LAYERS, 2048);
        integers.insert(gl::MAX_TEXTURE_BUFFER_SIZE, 134_217_728);
        integers.insert(gl::MAX_SHADER_STORAGE_BLOCK_SIZE, 134_217_728);
        integers.insert(gl::MAX_UNIFORM_BLOCK_SIZE, 65536);
        integers.insert(gl::MAX_VERTEX_ATTRIBS, 16);
        integers.insert(gl::MAX_SAMPLES, 8);
        integers.insert(gl::MAX_UNIFORM_BUFFER_BINDINGS, 84);
        integers.insert(gl::UNIFORM_BUFFER_OFFSET_ALIGNMENT, 256);
        integers.insert(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 192);

        RecordingGl {
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            version: Cell::new((4, 6)),
            core_profile: Cell::new(true),
            integers: RefCell::new(integers),
            extensions: RefCell::new(KNOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
            platform_extensions: RefCell::new(String::new()),
            missing_entry_points: RefCell::new(FxHashSet::default()),
            missing_uniforms: RefCell::new(FxHashSet::default()),
            uniform_locations: RefCell::new(FxHashMap::default()),
            uniform_block_indices: RefCell::new(FxHashMap::default()),
            fail_compile: Cell::new(false),
            fail_link: Cell::new(false),
            fail_validate: Cell::new(false),
            fail_map: Cell::new(false),
            framebuffer_status: Cell::new(gl::FRAMEBUFFER_COMPLETE),
            query_available: Cell::new(true),
            samples_passed: Cell::new(0),
            active_queries: RefCell::new(FxHashMap::default()),
            query_results: RefCell::new(FxHashMap::default()),
            timestamp: Cell::new(0),
            map_scratch: RefCell::new(vec![0; MAP_SCRATCH_SIZE]),
            framebuffer_size: Cell::new((1280, 720)),
        }
    }

    /// An old compatibility context (no `glGetStringi`, no core forcing) with the given
    /// extensions.
    pub fn legacy(major: GLint, minor: GLint, extensions: &[&str]) -> RecordingGl {
        let r = RecordingGl::new();
        r.set_version(major, minor);
        r.set_core_profile(false);
        r.set_extensions(extensions);
        r
    }

    //----------------------------------------------------------------------------------------------
    // configuration

    pub fn set_version(&self, major: GLint, minor: GLint) {
        self.version.set((major, minor));
    }

    pub fn set_core_profile(&self, core: bool) {
        self.core_profile.set(core);
    }

    pub fn set_integer(&self, pname: GLenum, value: GLint) {
        self.integers.borrow_mut().insert(pname, value);
    }

    pub fn set_extensions(&self, extensions: &[&str]) {
        *self.extensions.borrow_mut() = extensions.iter().map(|s| s.to_string()).collect();
    }

    pub fn remove_extension(&self, name: &str) {
        self.extensions.borrow_mut().retain(|e| e != name);
    }

    pub fn set_platform_extensions(&self, extensions: &str) {
        *self.platform_extensions.borrow_mut() = extensions.to_string();
    }

    /// Makes `get_proc_address` return null for `name` (`glBindTextureUnit`...).
    pub fn set_missing_entry_point(&self, name: &str) {
        self.missing_entry_points.borrow_mut().insert(name.to_string());
    }

    /// Makes uniform and uniform block lookups of `name` fail.
    pub fn set_missing_uniform(&self, name: &str) {
        self.missing_uniforms.borrow_mut().insert(name.to_string());
    }

    pub fn set_fail_compile(&self, fail: bool) {
        self.fail_compile.set(fail);
    }

    pub fn set_fail_link(&self, fail: bool) {
        self.fail_link.set(fail);
    }

    pub fn set_fail_validate(&self, fail: bool) {
        self.fail_validate.set(fail);
    }

    pub fn set_fail_map(&self, fail: bool) {
        self.fail_map.set(fail);
    }

    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.framebuffer_status.set(status);
    }

    pub fn set_query_available(&self, available: bool) {
        self.query_available.set(available);
    }

    /// Result stored by the next `EndQuery` on an occlusion or statistics query.
    pub fn set_samples_passed(&self, samples: u64) {
        self.samples_passed.set(samples);
    }

    pub fn set_framebuffer_size(&self, size: (u32, u32)) {
        self.framebuffer_size.set(size);
    }

    //----------------------------------------------------------------------------------------------
    // inspection

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<String> {
        self.calls.replace(Vec::new())
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Entry point names only, in call order.
    pub fn names(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| call_name(c).to_string())
            .collect()
    }

    /// Number of recorded calls to the entry point `name`.
    pub fn count(&self, name: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| call_name(c) == name)
            .count()
    }

    /// Whether the exact call `call` (`"BindTextureUnit(0, 3)"`) was recorded.
    pub fn contains(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }

    /// Contents of the buffer mapping scratch area.
    pub fn mapped_bytes(&self, len: usize) -> Vec<u8> {
        self.map_scratch.borrow()[..len.min(MAP_SCRATCH_SIZE)].to_vec()
    }

    //----------------------------------------------------------------------------------------------

    fn record(&self, name: &str, args: &[&dyn fmt::Debug]) {
        let args = args
            .iter()
            .map(|a| format!("{:?}", a))
            .collect::<Vec<_>>()
            .join(", ");
        self.push(format!("{}({})", name, args));
    }

    fn push(&self, call: String) {
        trace!("gl: {}", call);
        self.calls.borrow_mut().push(call);
    }

    fn new_name(&self, what: &str, args: &[&dyn fmt::Debug]) -> GLuint {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        let mut all: Vec<&dyn fmt::Debug> = args.to_vec();
        all.push(&name);
        self.record(what, &all);
        name
    }

    fn info_log(&self, failed: bool, what: &str) -> String {
        if failed {
            format!("0:1(1): error: {} failed", what)
        } else {
            String::new()
        }
    }

    fn uniform_location(&self, name: &str) -> GLint {
        if self.missing_uniforms.borrow().contains(name) {
            return -1;
        }
        let mut locations = self.uniform_locations.borrow_mut();
        let next = locations.len() as GLint;
        *locations.entry(name.to_string()).or_insert(next)
    }

    fn uniform_block_index(&self, name: &str) -> GLuint {
        if self.missing_uniforms.borrow().contains(name) {
            return gl::INVALID_INDEX;
        }
        let mut indices = self.uniform_block_indices.borrow_mut();
        let next = indices.len() as GLuint;
        *indices.entry(name.to_string()).or_insert(next)
    }

    fn map(&self, what: &str, args: &[&dyn fmt::Debug]) -> *mut c_void {
        self.record(what, args);
        if self.fail_map.get() {
            ptr::null_mut()
        } else {
            self.map_scratch.borrow_mut().as_mut_ptr() as *mut c_void
        }
    }
}

impl Default for RecordingGl {
    fn default() -> RecordingGl {
        RecordingGl::new()
    }
}

impl fmt::Debug for RecordingGl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RecordingGl")
            .field("version", &self.version.get())
            .field("core_profile", &self.core_profile.get())
            .field("calls", &self.calls.borrow().len())
            .finish()
    }
}

fn call_name(call: &str) -> &str {
    call.split('(').next().unwrap_or(call)
}

fn uniform_args(value: &UniformValue) -> String {
    match value {
        UniformValue::Int(v) => format!("{}", v),
        UniformValue::Float(v) => format!("{:?}", v),
        UniformValue::Vec2(v) => format!("{:?}", v),
        UniformValue::Vec3(v) => format!("{:?}", v),
        UniformValue::Vec4(v) => format!("{:?}", v),
        UniformValue::Mat3(v) => format!("{:?}", v),
        UniformValue::Mat4(v) => format!("{:?}", v),
    }
}

impl GlApi for RecordingGl {
    simple_entry_points!(record_entry_points);

    fn get_integer(&self, pname: GLenum) -> GLint {
        match pname {
            gl::MAJOR_VERSION => self.version.get().0,
            gl::MINOR_VERSION => self.version.get().1,
            gl::CONTEXT_PROFILE_MASK => {
                if self.core_profile.get() {
                    gl::CONTEXT_CORE_PROFILE_BIT as GLint
                } else {
                    gl::CONTEXT_COMPATIBILITY_PROFILE_BIT as GLint
                }
            }
            gl::NUM_EXTENSIONS => self.extensions.borrow().len() as GLint,
            _ => self.integers.borrow().get(&pname).cloned().unwrap_or(0),
        }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        match name {
            gl::VERSION => {
                let (major, minor) = self.version.get();
                Some(format!("{}.{}.0 RecordingGl", major, minor))
            }
            gl::VENDOR => Some("rhi-gl".to_string()),
            gl::RENDERER => Some("RecordingGl".to_string()),
            gl::SHADING_LANGUAGE_VERSION => Some("4.60".to_string()),
            gl::EXTENSIONS => Some(self.extensions.borrow().join(" ")),
            _ => None,
        }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        match name {
            gl::EXTENSIONS => self.extensions.borrow().get(index as usize).cloned(),
            _ => None,
        }
    }

    fn get_error(&self) -> GLenum {
        gl::NO_ERROR
    }

    //----------------------------------------------------------------------------------------------
    fn gen_buffer(&self) -> GLuint {
        self.new_name("GenBuffers", &[])
    }

    fn create_buffer(&self) -> GLuint {
        self.new_name("CreateBuffers", &[])
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record("DeleteBuffers", &[&buffer]);
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        self.record("BufferData", &[&target, &size, &data.is_some(), &usage]);
    }

    fn named_buffer_data(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum) {
        self.record("NamedBufferData", &[&buffer, &size, &data.is_some(), &usage]);
    }

    fn named_buffer_data_ext(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum) {
        self.record("NamedBufferDataEXT", &[&buffer, &size, &data.is_some(), &usage]);
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        self.record("BufferSubData", &[&target, &offset, &data.len()]);
    }

    fn named_buffer_sub_data(&self, buffer: GLuint, offset: usize, data: &[u8]) {
        self.record("NamedBufferSubData", &[&buffer, &offset, &data.len()]);
    }

    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: usize, data: &[u8]) {
        self.record("NamedBufferSubDataEXT", &[&buffer, &offset, &data.len()]);
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        self.map("MapBuffer", &[&target, &access])
    }

    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        self.map("MapNamedBuffer", &[&buffer, &access])
    }

    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        self.map("MapNamedBufferEXT", &[&buffer, &access])
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        self.record("UnmapBuffer", &[&target]);
        true
    }

    fn unmap_named_buffer(&self, buffer: GLuint) -> bool {
        self.record("UnmapNamedBuffer", &[&buffer]);
        true
    }

    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool {
        self.record("UnmapNamedBufferEXT", &[&buffer]);
        true
    }

    //----------------------------------------------------------------------------------------------
    fn gen_texture(&self) -> GLuint {
        self.new_name("GenTextures", &[])
    }

    fn create_texture(&self, target: GLenum) -> GLuint {
        self.new_name("CreateTextures", &[&target])
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record("DeleteTextures", &[&texture]);
    }

    fn tex_image_1d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TexImage1D", &[&target, &level, &internalformat, &width, &format, &type_, &data.is_some()]);
    }

    fn tex_image_2d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TexImage2D", &[&target, &level, &internalformat, &width, &height, &format, &type_, &data.is_some()]);
    }

    fn tex_image_3d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TexImage3D", &[&target, &level, &internalformat, &width, &height, &depth, &format, &type_, &data.is_some()]);
    }

    fn texture_image_1d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TextureImage1DEXT", &[&texture, &target, &level, &internalformat, &width, &format, &type_, &data.is_some()]);
    }

    fn texture_image_2d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TextureImage2DEXT", &[&texture, &target, &level, &internalformat, &width, &height, &format, &type_, &data.is_some()]);
    }

    fn texture_image_3d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        self.record("TextureImage3DEXT", &[&texture, &target, &level, &internalformat, &width, &height, &depth, &format, &type_, &data.is_some()]);
    }

    fn texture_sub_image_1d(&self, texture: GLuint, level: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        self.record("TextureSubImage1D", &[&texture, &level, &width, &format, &type_, &data.len()]);
    }

    fn texture_sub_image_2d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        self.record("TextureSubImage2D", &[&texture, &level, &width, &height, &format, &type_, &data.len()]);
    }

    fn texture_sub_image_3d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        self.record("TextureSubImage3D", &[&texture, &level, &width, &height, &depth, &format, &type_, &data.len()]);
    }

    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, params: &[f32]) {
        self.record("TexParameterfv", &[&target, &pname, &params]);
    }

    fn texture_parameter_fv(&self, texture: GLuint, pname: GLenum, params: &[f32]) {
        self.record("TextureParameterfv", &[&texture, &pname, &params]);
    }

    fn texture_parameter_fv_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, params: &[f32]) {
        self.record("TextureParameterfvEXT", &[&texture, &target, &pname, &params]);
    }

    //----------------------------------------------------------------------------------------------
    fn gen_sampler(&self) -> GLuint {
        self.new_name("GenSamplers", &[])
    }

    fn create_sampler(&self) -> GLuint {
        self.new_name("CreateSamplers", &[])
    }

    fn delete_sampler(&self, sampler: GLuint) {
        self.record("DeleteSamplers", &[&sampler]);
    }

    fn sampler_parameter_fv(&self, sampler: GLuint, pname: GLenum, params: &[f32]) {
        self.record("SamplerParameterfv", &[&sampler, &pname, &params]);
    }

    //----------------------------------------------------------------------------------------------
    fn gen_framebuffer(&self) -> GLuint {
        self.new_name("GenFramebuffers", &[])
    }

    fn create_framebuffer(&self) -> GLuint {
        self.new_name("CreateFramebuffers", &[])
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        self.record("DeleteFramebuffers", &[&framebuffer]);
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        self.record("CheckFramebufferStatus", &[&target]);
        self.framebuffer_status.get()
    }

    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        self.record("CheckNamedFramebufferStatus", &[&framebuffer, &target]);
        self.framebuffer_status.get()
    }

    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        self.record("CheckNamedFramebufferStatusEXT", &[&framebuffer, &target]);
        self.framebuffer_status.get()
    }

    fn draw_buffers(&self, bufs: &[GLenum]) {
        self.record("DrawBuffers", &[&bufs]);
    }

    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        self.record("NamedFramebufferDrawBuffers", &[&framebuffer, &bufs]);
    }

    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        self.record("FramebufferDrawBuffersEXT", &[&framebuffer, &bufs]);
    }

    //----------------------------------------------------------------------------------------------
    fn create_shader(&self, type_: GLenum) -> GLuint {
        self.new_name("CreateShader", &[&type_])
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.record("ShaderSource", &[&shader, &source.len()]);
    }

    fn shader_binary(&self, shader: GLuint, binary_format: GLenum, binary: &[u8]) {
        self.record("ShaderBinary", &[&shader, &binary_format, &binary.len()]);
    }

    fn specialize_shader(&self, shader: GLuint, entry_point: &str) {
        self.record("SpecializeShader", &[&shader, &entry_point]);
    }

    fn get_shader_iv(&self, _shader: GLuint, pname: GLenum) -> GLint {
        let failed = self.fail_compile.get();
        match pname {
            gl::COMPILE_STATUS => (!failed) as GLint,
            gl::INFO_LOG_LENGTH => {
                let len = self.info_log(failed, "compile").len();
                if len == 0 {
                    0
                } else {
                    len as GLint + 1
                }
            }
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, _shader: GLuint) -> String {
        self.info_log(self.fail_compile.get(), "compile")
    }

    fn create_program(&self) -> GLuint {
        self.new_name("CreateProgram", &[])
    }

    fn get_program_iv(&self, _program: GLuint, pname: GLenum) -> GLint {
        let failed = self.fail_link.get();
        match pname {
            gl::LINK_STATUS => (!failed) as GLint,
            gl::VALIDATE_STATUS => (!self.fail_validate.get()) as GLint,
            gl::INFO_LOG_LENGTH => {
                let len = self.info_log(failed, "link").len();
                if len == 0 {
                    0
                } else {
                    len as GLint + 1
                }
            }
            _ => 0,
        }
    }

    fn get_program_info_log(&self, _program: GLuint) -> String {
        self.info_log(self.fail_link.get(), "link")
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str) {
        self.record("BindAttribLocation", &[&program, &index, &name]);
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let location = self.uniform_location(name);
        self.record("GetUniformLocation", &[&program, &name, &location]);
        location
    }

    fn get_uniform_block_index(&self, program: GLuint, name: &str) -> GLuint {
        let index = self.uniform_block_index(name);
        self.record("GetUniformBlockIndex", &[&program, &name, &index]);
        index
    }

    fn uniform(&self, location: GLint, value: UniformValue) {
        self.push(format!("Uniform{}({}, {})", value.suffix(), location, uniform_args(&value)));
    }

    fn program_uniform(&self, program: GLuint, location: GLint, value: UniformValue) {
        self.push(format!(
            "ProgramUniform{}({}, {}, {})",
            value.suffix(),
            program,
            location,
            uniform_args(&value)
        ));
    }

    fn program_uniform_ext(&self, program: GLuint, location: GLint, value: UniformValue) {
        self.push(format!(
            "ProgramUniform{}EXT({}, {}, {})",
            value.suffix(),
            program,
            location,
            uniform_args(&value)
        ));
    }

    fn gen_program_pipeline(&self) -> GLuint {
        self.new_name("GenProgramPipelines", &[])
    }

    fn delete_program_pipeline(&self, pipeline: GLuint) {
        self.record("DeleteProgramPipelines", &[&pipeline]);
    }

    fn get_program_pipeline_iv(&self, _pipeline: GLuint, pname: GLenum) -> GLint {
        let failed = self.fail_validate.get();
        match pname {
            gl::VALIDATE_STATUS => (!failed) as GLint,
            gl::INFO_LOG_LENGTH => {
                let len = self.info_log(failed, "validation").len();
                if len == 0 {
                    0
                } else {
                    len as GLint + 1
                }
            }
            _ => 0,
        }
    }

    fn get_program_pipeline_info_log(&self, _pipeline: GLuint) -> String {
        self.info_log(self.fail_validate.get(), "validation")
    }

    //----------------------------------------------------------------------------------------------
    fn gen_vertex_array(&self) -> GLuint {
        self.new_name("GenVertexArrays", &[])
    }

    fn create_vertex_array(&self) -> GLuint {
        self.new_name("CreateVertexArrays", &[])
    }

    fn delete_vertex_array(&self, array: GLuint) {
        self.record("DeleteVertexArrays", &[&array]);
    }

    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, type_: GLenum, normalized: bool, stride: GLsizei, offset: usize) {
        self.record("VertexAttribPointer", &[&index, &size, &type_, &normalized, &stride, &offset]);
    }

    fn vertex_attrib_i_pointer(&self, index: GLuint, size: GLint, type_: GLenum, stride: GLsizei, offset: usize) {
        self.record("VertexAttribIPointer", &[&index, &size, &type_, &stride, &offset]);
    }

    //----------------------------------------------------------------------------------------------
    fn draw_elements(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize) {
        self.record("DrawElements", &[&mode, &count, &type_, &offset]);
    }

    fn draw_elements_instanced(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei) {
        self.record("DrawElementsInstanced", &[&mode, &count, &type_, &offset, &instancecount]);
    }

    fn draw_elements_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, basevertex: GLint) {
        self.record("DrawElementsBaseVertex", &[&mode, &count, &type_, &offset, &basevertex]);
    }

    fn draw_elements_instanced_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint) {
        self.record("DrawElementsInstancedBaseVertex", &[&mode, &count, &type_, &offset, &instancecount, &basevertex]);
    }

    fn draw_elements_instanced_base_vertex_base_instance(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint, baseinstance: GLuint) {
        self.record("DrawElementsInstancedBaseVertexBaseInstance", &[&mode, &count, &type_, &offset, &instancecount, &basevertex, &baseinstance]);
    }

    fn draw_arrays_indirect(&self, mode: GLenum, offset: usize) {
        self.record("DrawArraysIndirect", &[&mode, &offset]);
    }

    fn draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize) {
        self.record("DrawElementsIndirect", &[&mode, &type_, &offset]);
    }

    fn multi_draw_arrays_indirect(&self, mode: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei) {
        self.record("MultiDrawArraysIndirect", &[&mode, &offset, &drawcount, &stride]);
    }

    fn multi_draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei) {
        self.record("MultiDrawElementsIndirect", &[&mode, &type_, &offset, &drawcount, &stride]);
    }

    //----------------------------------------------------------------------------------------------
    fn viewport_array_v(&self, first: GLuint, v: &[f32]) {
        self.record("ViewportArrayv", &[&first, &(v.len() / 4), &v]);
    }

    fn depth_range_array_v(&self, first: GLuint, v: &[f64]) {
        self.record("DepthRangeArrayv", &[&first, &(v.len() / 2), &v]);
    }

    fn scissor_array_v(&self, first: GLuint, v: &[i32]) {
        self.record("ScissorArrayv", &[&first, &(v.len() / 4), &v]);
    }

    //----------------------------------------------------------------------------------------------
    fn gen_query(&self) -> GLuint {
        self.new_name("GenQueries", &[])
    }

    fn delete_query(&self, id: GLuint) {
        self.record("DeleteQueries", &[&id]);
    }

    fn begin_query(&self, target: GLenum, id: GLuint) {
        self.record("BeginQuery", &[&target, &id]);
        self.active_queries.borrow_mut().insert(target, id);
    }

    fn end_query(&self, target: GLenum) {
        self.record("EndQuery", &[&target]);
        if let Some(id) = self.active_queries.borrow_mut().remove(&target) {
            self.query_results
                .borrow_mut()
                .insert(id, self.samples_passed.get());
        }
    }

    fn query_counter(&self, id: GLuint, target: GLenum) {
        self.record("QueryCounter", &[&id, &target]);
        let t = self.timestamp.get() + TIMESTAMP_STEP;
        self.timestamp.set(t);
        self.query_results.borrow_mut().insert(id, t);
    }

    fn get_query_object_u32(&self, id: GLuint, pname: GLenum) -> GLuint {
        match pname {
            gl::QUERY_RESULT_AVAILABLE => self.query_available.get() as GLuint,
            _ => self.query_results.borrow().get(&id).cloned().unwrap_or(0) as GLuint,
        }
    }

    fn get_query_object_u64(&self, id: GLuint, pname: GLenum) -> GLuint64 {
        match pname {
            gl::QUERY_RESULT_AVAILABLE => self.query_available.get() as GLuint64,
            _ => self.query_results.borrow().get(&id).cloned().unwrap_or(0),
        }
    }

    //----------------------------------------------------------------------------------------------
    fn debug_message_callback(&self, callback: GLDEBUGPROC, _user_param: *const c_void) {
        self.record("DebugMessageCallback", &[&callback.is_some()]);
    }

    fn debug_message_control(&self, source: GLenum, type_: GLenum, severity: GLenum, enabled: bool) {
        self.record("DebugMessageControl", &[&source, &type_, &severity, &enabled]);
    }

    fn debug_message_insert(&self, source: GLenum, type_: GLenum, id: GLuint, severity: GLenum, message: &str) {
        self.record("DebugMessageInsert", &[&source, &type_, &id, &severity, &message]);
    }

    fn push_debug_group(&self, source: GLenum, id: GLuint, message: &str) {
        self.record("PushDebugGroup", &[&source, &id, &message]);
    }
}

impl ProcAddressLoader for RecordingGl {
    fn get_proc_address(&self, name: &str) -> *const c_void {
        if self.missing_entry_points.borrow().contains(name) {
            ptr::null()
        } else {
            NonNull::<c_void>::dangling().as_ptr() as *const c_void
        }
    }
}

impl NativeContext for RecordingGl {
    fn is_initialized(&self) -> bool {
        true
    }

    fn make_current(&self) -> bool {
        self.record("MakeCurrent", &[]);
        true
    }

    fn swap_buffers(&self) {
        self.record("SwapBuffers", &[]);
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer_size.get()
    }

    fn platform_extensions(&self) -> String {
        self.platform_extensions.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_are_logged_in_order() {
        let gl = RecordingGl::new();
        gl.bind_buffer(gl::ARRAY_BUFFER, 3);
        gl.draw_arrays(gl::TRIANGLES, 0, 3);
        assert_eq!(
            gl.calls(),
            vec![
                format!("BindBuffer({}, 3)", gl::ARRAY_BUFFER),
                format!("DrawArrays({}, 0, 3)", gl::TRIANGLES),
            ]
        );
        assert_eq!(gl.count("DrawArrays"), 1);
        assert_eq!(gl.take_calls().len(), 2);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn names_are_unique() {
        let gl = RecordingGl::new();
        let a = gl.create_buffer();
        let b = gl.gen_texture();
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert!(gl.contains(&format!("CreateBuffers({})", a)));
    }

    #[test]
    fn extension_strings() {
        let gl = RecordingGl::legacy(2, 1, &["GL_ARB_multitexture", "GL_EXT_texture3D"]);
        assert_eq!(gl.get_integer(gl::NUM_EXTENSIONS), 2);
        assert_eq!(
            gl.get_string(gl::EXTENSIONS).as_deref(),
            Some("GL_ARB_multitexture GL_EXT_texture3D")
        );
        assert_eq!(
            gl.get_string_i(gl::EXTENSIONS, 1).as_deref(),
            Some("GL_EXT_texture3D")
        );
        assert_eq!(gl.get_integer(gl::MAJOR_VERSION), 2);
    }

    #[test]
    fn timestamps_increase() {
        let gl = RecordingGl::new();
        gl.query_counter(4, gl::TIMESTAMP);
        let first = gl.get_query_object_u64(4, gl::QUERY_RESULT);
        gl.query_counter(4, gl::TIMESTAMP);
        let second = gl.get_query_object_u64(4, gl::QUERY_RESULT);
        assert!(second > first);
    }

    #[test]
    fn missing_entry_point() {
        let gl = RecordingGl::new();
        gl.set_missing_entry_point("glBindTextureUnit");
        assert!(!gl.has_proc_address("glBindTextureUnit"));
        assert!(gl.has_proc_address("glBindTexture"));
    }

    #[test]
    fn link_failure_log() {
        let gl = RecordingGl::new();
        gl.set_fail_link(true);
        assert_eq!(gl.get_program_iv(1, gl::LINK_STATUS), 0);
        assert!(!gl.get_program_info_log(1).is_empty());
    }
}
