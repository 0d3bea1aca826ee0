//! Binding state cache.
//!
//! Every native binding that the backend tracks goes through one of the setters below, which
//! compare against the cached value and skip the native call when nothing changes. Code that
//! changes one of these bindings by other means must go through the cache too (or call
//! `invalidate`), otherwise later calls are skipped wrongly.
//!
//! Bindings that are not tracked (buffer and texture targets, the active texture unit) are
//! saved and restored around bind-path operations with `Restore` when the backend is configured
//! to restore state.
use crate::api as gl;
use crate::api::types::*;
use crate::mapping::{blend_op_to_gl, blend_to_gl, comparison_func_to_gl};
use crate::native::GlApi;
use rhi::{
    BlendState, CullMode, DepthStencilState, DepthWriteMask, FillMode, RasterizerState,
    RenderTargetBlendDesc, ScissorRectangle, Viewport,
};
use smallvec::SmallVec;

pub trait CacheOptionExt<T: PartialEq> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, f: F);
}

impl<T: PartialEq> CacheOptionExt<T> for Option<T> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, f: F) {
        if self.as_ref().map_or(true, |v| *v != new) {
            self.replace(new);
            f();
        }
    }
}

fn gl_bool(b: bool) -> GLboolean {
    if b {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

fn set_capability(gl: &dyn GlApi, cap: GLenum, enabled: bool) {
    if enabled {
        gl.enable(cap)
    } else {
        gl.disable(cap)
    }
}

/// Viewport in native window coordinates (lower left origin).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportEntry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f64,
    pub max_depth: f64,
}

impl ViewportEntry {
    /// Converts a top-left-origin viewport for a render target of the given height.
    pub fn from_viewport(vp: &Viewport, render_target_height: u32) -> ViewportEntry {
        ViewportEntry {
            x: vp.top_left_x,
            y: render_target_height as f32 - vp.top_left_y - vp.height,
            width: vp.width,
            height: vp.height,
            min_depth: f64::from(vp.min_depth),
            max_depth: f64::from(vp.max_depth),
        }
    }
}

/// Scissor rectangle in native window coordinates (x, y, width, height).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScissorEntry(pub [GLint; 4]);

impl ScissorEntry {
    pub fn from_rectangle(rect: &ScissorRectangle, render_target_height: u32) -> ScissorEntry {
        let width = rect.bottom_right_x - rect.top_left_x;
        let height = rect.bottom_right_y - rect.top_left_y;
        ScissorEntry([
            rect.top_left_x,
            render_target_height as GLint - rect.top_left_y - height,
            width,
            height,
        ])
    }
}

type Viewports = SmallVec<[ViewportEntry; 4]>;
type Scissors = SmallVec<[ScissorEntry; 4]>;

#[derive(Clone, Debug, Default)]
pub struct StateCache {
    program: Option<GLuint>,
    program_pipeline: Option<GLuint>,
    vertex_array: Option<GLuint>,
    draw_framebuffer: Option<GLuint>,
    read_framebuffer: Option<GLuint>,
    indirect_buffer: Option<GLuint>,
    patch_vertices: Option<u32>,
    clip_control_origin: Option<GLenum>,
    rasterizer: Option<RasterizerState>,
    depth_stencil: Option<DepthStencilState>,
    blend: Option<BlendState>,
    viewports: Option<Viewports>,
    scissors: Option<Scissors>,
}

impl StateCache {
    pub fn new() -> StateCache {
        StateCache::default()
    }

    /// Forgets everything: the next call to each setter reaches the driver.
    pub fn invalidate(&mut self) {
        *self = StateCache::default();
    }

    //----------------------------------------------------------------------------------------------
    // accessors

    pub fn program(&self) -> Option<GLuint> {
        self.program
    }

    pub fn program_pipeline(&self) -> Option<GLuint> {
        self.program_pipeline
    }

    pub fn vertex_array(&self) -> Option<GLuint> {
        self.vertex_array
    }

    pub fn draw_framebuffer(&self) -> Option<GLuint> {
        self.draw_framebuffer
    }

    pub fn read_framebuffer(&self) -> Option<GLuint> {
        self.read_framebuffer
    }

    pub fn indirect_buffer(&self) -> Option<GLuint> {
        self.indirect_buffer
    }

    pub fn patch_vertices(&self) -> Option<u32> {
        self.patch_vertices
    }

    pub fn clip_control_origin(&self) -> Option<GLenum> {
        self.clip_control_origin
    }

    pub fn depth_write_enabled(&self) -> bool {
        self.depth_stencil
            .map_or(true, |ds| ds.depth_write_mask == DepthWriteMask::All)
    }

    //----------------------------------------------------------------------------------------------
    // objects

    pub fn use_program(&mut self, gl: &dyn GlApi, program: GLuint) {
        self.program.update_cached(program, || gl.use_program(program));
    }

    /// Binds a program pipeline. The current program has precedence over pipelines, so it is
    /// reset first.
    pub fn bind_program_pipeline(&mut self, gl: &dyn GlApi, pipeline: GLuint) {
        self.use_program(gl, 0);
        self.program_pipeline
            .update_cached(pipeline, || gl.bind_program_pipeline(pipeline));
    }

    pub fn bind_vertex_array(&mut self, gl: &dyn GlApi, vertex_array: GLuint) {
        self.vertex_array
            .update_cached(vertex_array, || gl.bind_vertex_array(vertex_array));
    }

    pub fn bind_draw_framebuffer(&mut self, gl: &dyn GlApi, framebuffer: GLuint) {
        self.draw_framebuffer.update_cached(framebuffer, || {
            gl.bind_framebuffer(gl::DRAW_FRAMEBUFFER, framebuffer)
        });
    }

    pub fn bind_read_framebuffer(&mut self, gl: &dyn GlApi, framebuffer: GLuint) {
        self.read_framebuffer.update_cached(framebuffer, || {
            gl.bind_framebuffer(gl::READ_FRAMEBUFFER, framebuffer)
        });
    }

    pub fn bind_indirect_buffer(&mut self, gl: &dyn GlApi, buffer: GLuint) {
        self.indirect_buffer.update_cached(buffer, || {
            gl.bind_buffer(gl::DRAW_INDIRECT_BUFFER, buffer)
        });
    }

    /// Clears cached names of a deleted object so that a recycled name is bound again.
    pub fn forget_program(&mut self, program: GLuint) {
        if self.program == Some(program) {
            self.program = None;
        }
    }

    pub fn forget_program_pipeline(&mut self, pipeline: GLuint) {
        if self.program_pipeline == Some(pipeline) {
            self.program_pipeline = None;
        }
    }

    pub fn forget_vertex_array(&mut self, vertex_array: GLuint) {
        if self.vertex_array == Some(vertex_array) {
            self.vertex_array = None;
        }
    }

    pub fn forget_framebuffer(&mut self, framebuffer: GLuint) {
        if self.draw_framebuffer == Some(framebuffer) {
            self.draw_framebuffer = None;
        }
        if self.read_framebuffer == Some(framebuffer) {
            self.read_framebuffer = None;
        }
    }

    pub fn forget_buffer(&mut self, buffer: GLuint) {
        if self.indirect_buffer == Some(buffer) {
            self.indirect_buffer = None;
        }
    }

    //----------------------------------------------------------------------------------------------
    // fixed function

    pub fn set_patch_vertices(&mut self, gl: &dyn GlApi, count: u32) {
        self.patch_vertices.update_cached(count, || {
            gl.patch_parameter_i(gl::PATCH_VERTICES, count as GLint)
        });
    }

    /// `origin` is `GL_LOWER_LEFT` or `GL_UPPER_LEFT`; depth is always [0, 1].
    pub fn set_clip_control_origin(&mut self, gl: &dyn GlApi, origin: GLenum) {
        self.clip_control_origin
            .update_cached(origin, || gl.clip_control(origin, gl::ZERO_TO_ONE));
    }

    pub fn set_rasterizer_state(&mut self, gl: &dyn GlApi, state: &RasterizerState) {
        self.rasterizer.update_cached(*state, || {
            gl.polygon_mode(
                gl::FRONT_AND_BACK,
                match state.fill_mode {
                    FillMode::Wireframe => gl::LINE,
                    FillMode::Solid => gl::FILL,
                },
            );
            match state.cull_mode {
                CullMode::None => gl.disable(gl::CULL_FACE),
                CullMode::Front => {
                    gl.enable(gl::CULL_FACE);
                    gl.cull_face(gl::FRONT);
                }
                CullMode::Back => {
                    gl.enable(gl::CULL_FACE);
                    gl.cull_face(gl::BACK);
                }
            }
            gl.front_face(if state.front_counter_clockwise {
                gl::CCW
            } else {
                gl::CW
            });
            let slope = state.slope_scaled_depth_bias.into_inner();
            let has_bias = state.depth_bias != 0 || slope != 0.0;
            set_capability(gl, gl::POLYGON_OFFSET_FILL, has_bias);
            if has_bias {
                gl.polygon_offset(slope, state.depth_bias as GLfloat);
            }
            // depth clip disabled means clamping
            set_capability(gl, gl::DEPTH_CLAMP, !state.depth_clip_enable);
            set_capability(gl, gl::MULTISAMPLE, state.multisample_enable);
            set_capability(gl, gl::LINE_SMOOTH, state.antialiased_line_enable);
            set_capability(gl, gl::SCISSOR_TEST, state.scissor_enable);
        });
    }

    pub fn set_depth_stencil_state(&mut self, gl: &dyn GlApi, state: &DepthStencilState) {
        self.depth_stencil.update_cached(*state, || {
            set_capability(gl, gl::DEPTH_TEST, state.depth_enable);
            gl.depth_mask(gl_bool(state.depth_write_mask == DepthWriteMask::All));
            gl.depth_func(comparison_func_to_gl(state.depth_func));
            set_capability(gl, gl::STENCIL_TEST, state.stencil_enable);
            if state.stencil_enable {
                gl.stencil_mask(GLuint::from(state.stencil_write_mask));
            }
        });
    }

    /// Applies a blend state. Per-target entry points are used only when independent blending
    /// is requested.
    pub fn set_blend_state(&mut self, gl: &dyn GlApi, state: &BlendState) {
        self.blend.update_cached(*state, || {
            set_capability(gl, gl::SAMPLE_ALPHA_TO_COVERAGE, state.alpha_to_coverage_enable);
            if state.independent_blend_enable {
                for (i, rt) in state.render_targets.iter().enumerate() {
                    apply_render_target_blend(gl, Some(i as GLuint), rt);
                }
            } else {
                apply_render_target_blend(gl, None, &state.render_targets[0]);
            }
        });
    }

    /// Sets viewports already converted to window coordinates.
    ///
    /// Viewport arrays are used when more than one viewport is given and the context supports
    /// them; otherwise only the first viewport is set.
    pub fn set_viewports(&mut self, gl: &dyn GlApi, viewports: &[ViewportEntry], array: bool) {
        let new: Viewports = viewports.iter().cloned().collect();
        self.viewports.update_cached(new, || {
            if array && viewports.len() > 1 {
                let mut rects: SmallVec<[f32; 16]> = SmallVec::new();
                let mut ranges: SmallVec<[f64; 8]> = SmallVec::new();
                for v in viewports {
                    rects.extend_from_slice(&[v.x, v.y, v.width, v.height]);
                    ranges.extend_from_slice(&[v.min_depth, v.max_depth]);
                }
                gl.viewport_array_v(0, &rects);
                gl.depth_range_array_v(0, &ranges);
            } else if let Some(v) = viewports.first() {
                gl.viewport(
                    v.x as GLint,
                    v.y as GLint,
                    v.width as GLsizei,
                    v.height as GLsizei,
                );
                gl.depth_range(v.min_depth, v.max_depth);
            }
        });
    }

    pub fn set_scissors(&mut self, gl: &dyn GlApi, scissors: &[ScissorEntry], array: bool) {
        let new: Scissors = scissors.iter().cloned().collect();
        self.scissors.update_cached(new, || {
            if array && scissors.len() > 1 {
                let mut rects: SmallVec<[GLint; 16]> = SmallVec::new();
                for s in scissors {
                    rects.extend_from_slice(&s.0);
                }
                gl.scissor_array_v(0, &rects);
            } else if let Some(ScissorEntry([x, y, w, h])) = scissors.first() {
                gl.scissor(*x, *y, *w, *h);
            }
        });
    }
}

fn apply_render_target_blend(gl: &dyn GlApi, index: Option<GLuint>, rt: &RenderTargetBlendDesc) {
    let mask = rt.render_target_write_mask;
    let (r, g, b, a) = (
        gl_bool(mask & 1 != 0),
        gl_bool(mask & 2 != 0),
        gl_bool(mask & 4 != 0),
        gl_bool(mask & 8 != 0),
    );
    match index {
        Some(i) => {
            if rt.blend_enable {
                gl.enablei(gl::BLEND, i);
                gl.blend_equation_separatei(
                    i,
                    blend_op_to_gl(rt.blend_op),
                    blend_op_to_gl(rt.blend_op_alpha),
                );
                gl.blend_func_separatei(
                    i,
                    blend_to_gl(rt.src_blend),
                    blend_to_gl(rt.dest_blend),
                    blend_to_gl(rt.src_blend_alpha),
                    blend_to_gl(rt.dest_blend_alpha),
                );
            } else {
                gl.disablei(gl::BLEND, i);
            }
            gl.color_maski(i, r, g, b, a);
        }
        None => {
            if rt.blend_enable {
                gl.enable(gl::BLEND);
                gl.blend_equation_separate(
                    blend_op_to_gl(rt.blend_op),
                    blend_op_to_gl(rt.blend_op_alpha),
                );
                gl.blend_func_separate(
                    blend_to_gl(rt.src_blend),
                    blend_to_gl(rt.dest_blend),
                    blend_to_gl(rt.src_blend_alpha),
                    blend_to_gl(rt.dest_blend_alpha),
                );
            } else {
                gl.disable(gl::BLEND);
            }
            gl.color_mask(r, g, b, a);
        }
    }
}

//--------------------------------------------------------------------------------------------------

/// An untracked native binding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Binding {
    /// Buffer bound to a target (`GL_ARRAY_BUFFER`...).
    Buffer(GLenum),
    /// Texture bound to a target of the active unit.
    Texture(GLenum),
    ActiveTexture,
}

impl Binding {
    /// `glGetIntegerv` parameter that returns the current value of this binding.
    fn query(self) -> GLenum {
        match self {
            Binding::Buffer(target) => match target {
                gl::ARRAY_BUFFER => gl::ARRAY_BUFFER_BINDING,
                gl::ELEMENT_ARRAY_BUFFER => gl::ELEMENT_ARRAY_BUFFER_BINDING,
                gl::UNIFORM_BUFFER => gl::UNIFORM_BUFFER_BINDING,
                gl::SHADER_STORAGE_BUFFER => gl::SHADER_STORAGE_BUFFER_BINDING,
                gl::DRAW_INDIRECT_BUFFER => gl::DRAW_INDIRECT_BUFFER_BINDING,
                gl::DISPATCH_INDIRECT_BUFFER => gl::DISPATCH_INDIRECT_BUFFER_BINDING,
                // COPY_READ/COPY_WRITE/TEXTURE_BUFFER share their value with the binding query
                other => other,
            },
            Binding::Texture(target) => match target {
                gl::TEXTURE_1D => gl::TEXTURE_BINDING_1D,
                gl::TEXTURE_1D_ARRAY => gl::TEXTURE_BINDING_1D_ARRAY,
                gl::TEXTURE_2D => gl::TEXTURE_BINDING_2D,
                gl::TEXTURE_2D_ARRAY => gl::TEXTURE_BINDING_2D_ARRAY,
                gl::TEXTURE_2D_MULTISAMPLE => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
                gl::TEXTURE_3D => gl::TEXTURE_BINDING_3D,
                gl::TEXTURE_CUBE_MAP => gl::TEXTURE_BINDING_CUBE_MAP,
                gl::TEXTURE_CUBE_MAP_ARRAY => gl::TEXTURE_BINDING_CUBE_MAP_ARRAY,
                gl::TEXTURE_BUFFER => gl::TEXTURE_BINDING_BUFFER,
                other => other,
            },
            Binding::ActiveTexture => gl::ACTIVE_TEXTURE,
        }
    }

    fn rebind(self, gl: &dyn GlApi, value: GLuint) {
        match self {
            Binding::Buffer(target) => gl.bind_buffer(target, value),
            Binding::Texture(target) => gl.bind_texture(target, value),
            Binding::ActiveTexture => gl.active_texture(value),
        }
    }
}

/// Saves an untracked binding and puts it back when dropped.
///
/// Does nothing, not even the query, when state restoration is disabled.
#[must_use]
pub struct Restore<'a> {
    gl: &'a dyn GlApi,
    binding: Binding,
    previous: Option<GLuint>,
}

impl<'a> Restore<'a> {
    pub fn save(gl: &'a dyn GlApi, binding: Binding, enabled: bool) -> Restore<'a> {
        let previous = if enabled {
            Some(gl.get_integer(binding.query()) as GLuint)
        } else {
            None
        };
        Restore {
            gl,
            binding,
            previous,
        }
    }
}

impl<'a> Drop for Restore<'a> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous {
            self.binding.rebind(self.gl, previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RecordingGl;

    #[test]
    fn program_binding_is_cached() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        cache.use_program(&gl, 3);
        cache.use_program(&gl, 3);
        cache.use_program(&gl, 4);
        assert_eq!(gl.names(), vec!["UseProgram", "UseProgram"]);
        cache.invalidate();
        cache.use_program(&gl, 4);
        assert_eq!(gl.count("UseProgram"), 3);
    }

    #[test]
    fn pipelines_reset_the_program() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        cache.use_program(&gl, 3);
        cache.bind_program_pipeline(&gl, 7);
        assert_eq!(
            gl.calls(),
            vec!["UseProgram(3)", "UseProgram(0)", "BindProgramPipeline(7)"]
        );
        assert_eq!(cache.program(), Some(0));
    }

    #[test]
    fn forgotten_names_are_bound_again() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        cache.bind_vertex_array(&gl, 2);
        cache.forget_vertex_array(2);
        cache.bind_vertex_array(&gl, 2);
        assert_eq!(gl.count("BindVertexArray"), 2);
    }

    #[test]
    fn fixed_function_state_is_cached_as_a_whole() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        let rs = RasterizerState::default();
        cache.set_rasterizer_state(&gl, &rs);
        let first = gl.take_calls();
        assert!(!first.is_empty());
        cache.set_rasterizer_state(&gl, &rs);
        assert!(gl.calls().is_empty());

        let mut blend = BlendState::default();
        cache.set_blend_state(&gl, &blend);
        assert_eq!(gl.count("Enablei") + gl.count("Disablei"), 0);
        blend.independent_blend_enable = true;
        cache.set_blend_state(&gl, &blend);
        assert_eq!(gl.count("ColorMaski"), rhi::MAX_RENDER_TARGETS);
    }

    #[test]
    fn viewport_arrays() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        let vps = [
            ViewportEntry::from_viewport(&Viewport::from((640, 480)), 480),
            ViewportEntry::from_viewport(&Viewport::from((320, 240)), 480),
        ];
        cache.set_viewports(&gl, &vps, true);
        assert_eq!(
            gl.calls(),
            vec![
                "ViewportArrayv(0, 2, [0.0, 0.0, 640.0, 480.0, 0.0, 240.0, 320.0, 240.0])",
                "DepthRangeArrayv(0, 2, [0.0, 1.0, 0.0, 1.0])",
            ]
        );
        gl.clear_calls();
        cache.set_viewports(&gl, &vps[..1], false);
        assert_eq!(gl.calls(), vec!["Viewport(0, 0, 640, 480)", "DepthRange(0.0, 1.0)"]);
    }

    #[test]
    fn scissor_arrays() {
        let gl = RecordingGl::new();
        let mut cache = StateCache::new();
        let scissors = [ScissorEntry([0, 0, 64, 32]), ScissorEntry([8, 16, 4, 2])];
        cache.set_scissors(&gl, &scissors, true);
        assert_eq!(
            gl.calls(),
            vec!["ScissorArrayv(0, 2, [0, 0, 64, 32, 8, 16, 4, 2])"]
        );
        gl.clear_calls();
        cache.set_scissors(&gl, &scissors, true);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn viewports_flip_to_lower_left_origin() {
        let vp = Viewport {
            top_left_x: 10.0,
            top_left_y: 20.0,
            width: 100.0,
            height: 50.0,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let e = ViewportEntry::from_viewport(&vp, 720);
        assert_eq!((e.x, e.y), (10.0, 650.0));
        let s = ScissorEntry::from_rectangle(
            &ScissorRectangle {
                top_left_x: 10,
                top_left_y: 20,
                bottom_right_x: 110,
                bottom_right_y: 70,
            },
            720,
        );
        assert_eq!(s, ScissorEntry([10, 650, 100, 50]));
    }

    #[test]
    fn restore_guard() {
        let gl = RecordingGl::new();
        gl.set_integer(gl::TEXTURE_BINDING_2D, 9);
        {
            let _r = Restore::save(&gl, Binding::Texture(gl::TEXTURE_2D), true);
            gl.bind_texture(gl::TEXTURE_2D, 4);
        }
        {
            let _r = Restore::save(&gl, Binding::Texture(gl::TEXTURE_2D), false);
            gl.bind_texture(gl::TEXTURE_2D, 5);
        }
        let t = gl::TEXTURE_2D;
        assert_eq!(
            gl.calls(),
            vec![
                format!("BindTexture({}, 4)", t),
                format!("BindTexture({}, 9)", t),
                format!("BindTexture({}, 5)", t),
            ]
        );
    }
}
