//! Implementation limits and feature summary of a context.
use crate::api as gl;
use crate::extensions::Extensions;
use crate::native::GlApi;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_VERSION: Regex =
        Regex::new(r"^(?:OpenGL ES (?:[A-Z-]+ )?)?(?P<major>\d+)\.(?P<minor>\d+)").unwrap();
}

/// Parses the `(major, minor)` version out of a `GL_VERSION` string ("4.6.0 NVIDIA 430.86").
pub fn parse_version(version: &str) -> Option<(u32, u32)> {
    let c = RE_VERSION.captures(version.trim())?;
    let major = c["major"].parse().ok()?;
    let minor = c["minor"].parse().ok()?;
    Some((major, minor))
}

const MAXIMUM_INDIRECT_BUFFER_SIZE: u32 = 128 * 1024;

#[derive(Clone, Debug)]
pub struct Capabilities {
    pub device_name: String,
    pub version: (u32, u32),
    pub maximum_number_of_viewports: u32,
    pub maximum_number_of_simultaneous_render_targets: u32,
    pub maximum_texture_dimension: u32,
    pub maximum_number_of_2d_texture_array_slices: u32,
    pub maximum_texture_buffer_size: u32,
    pub maximum_structured_buffer_size: u32,
    pub maximum_indirect_buffer_size: u32,
    pub maximum_uniform_buffer_size: u32,
    pub maximum_number_of_multisamples: u32,
    pub maximum_anisotropy: u32,
    pub maximum_number_of_patch_vertices: u32,
    pub maximum_number_of_vertex_attributes: u32,
    pub maximum_uniform_buffer_binding_points: u32,
    pub uniform_buffer_alignment: u32,
    /// Framebuffer origin is the upper left corner (requires clip control).
    pub upper_left_origin: bool,
    /// Clip space depth is [0, 1] (requires clip control).
    pub zero_to_one_clip_z: bool,
    pub individual_uniforms: bool,
    pub instanced_arrays: bool,
    pub draw_instanced: bool,
    pub base_vertex: bool,
    /// OpenGL contexts are single-threaded.
    pub native_multithreading: bool,
    pub shader_bytecode: bool,
    pub vertex_shader: bool,
    pub fragment_shader: bool,
    pub geometry_shader: bool,
    pub compute_shader: bool,
    pub mesh_shader: bool,
}

impl Capabilities {
    pub fn populate(gl: &dyn GlApi, ext: &Extensions) -> Capabilities {
        let getint = |pname| gl.get_integer(pname).max(0) as u32;

        let device_name = gl.get_string(gl::RENDERER).unwrap_or_default();
        let version = match (getint(gl::MAJOR_VERSION), getint(gl::MINOR_VERSION)) {
            (0, _) => gl
                .get_string(gl::VERSION)
                .and_then(|v| parse_version(&v))
                .unwrap_or((1, 0)),
            v => v,
        };

        let maximum_number_of_viewports = if ext.arb_viewport_array() {
            getint(gl::MAX_VIEWPORTS)
        } else {
            1
        };
        let maximum_number_of_simultaneous_render_targets = if ext.arb_draw_buffers() {
            getint(gl::MAX_DRAW_BUFFERS).max(1)
        } else {
            1
        };
        let maximum_number_of_2d_texture_array_slices = if ext.ext_texture_array() {
            getint(gl::MAX_ARRAY_TEXTURE_LAYERS)
        } else {
            0
        };
        let maximum_texture_buffer_size = if ext.arb_texture_buffer_object() {
            getint(gl::MAX_TEXTURE_BUFFER_SIZE)
        } else {
            0
        };
        let maximum_structured_buffer_size = if ext.arb_shader_storage_buffer_object() {
            getint(gl::MAX_SHADER_STORAGE_BLOCK_SIZE)
        } else {
            0
        };
        let maximum_indirect_buffer_size = if ext.arb_draw_indirect() {
            MAXIMUM_INDIRECT_BUFFER_SIZE
        } else {
            0
        };
        let (maximum_uniform_buffer_size, maximum_uniform_buffer_binding_points, alignment) =
            if ext.arb_uniform_buffer_object() {
                (
                    getint(gl::MAX_UNIFORM_BLOCK_SIZE),
                    getint(gl::MAX_UNIFORM_BUFFER_BINDINGS),
                    getint(gl::UNIFORM_BUFFER_OFFSET_ALIGNMENT).max(1),
                )
            } else {
                (0, 0, 1)
            };
        let maximum_number_of_multisamples = if ext.arb_texture_multisample() {
            getint(gl::MAX_SAMPLES).min(8).max(1)
        } else {
            1
        };
        let maximum_anisotropy = if ext.ext_texture_filter_anisotropic() {
            getint(gl::MAX_TEXTURE_MAX_ANISOTROPY_EXT).max(1)
        } else {
            1
        };
        let maximum_number_of_patch_vertices = if ext.arb_tessellation_shader() {
            getint(gl::MAX_PATCH_VERTICES)
        } else {
            0
        };

        Capabilities {
            device_name,
            version,
            maximum_number_of_viewports,
            maximum_number_of_simultaneous_render_targets,
            maximum_texture_dimension: getint(gl::MAX_TEXTURE_SIZE),
            maximum_number_of_2d_texture_array_slices,
            maximum_texture_buffer_size,
            maximum_structured_buffer_size,
            maximum_indirect_buffer_size,
            maximum_uniform_buffer_size,
            maximum_number_of_multisamples,
            maximum_anisotropy,
            maximum_number_of_patch_vertices,
            maximum_number_of_vertex_attributes: getint(gl::MAX_VERTEX_ATTRIBS),
            maximum_uniform_buffer_binding_points,
            uniform_buffer_alignment: alignment,
            upper_left_origin: ext.arb_clip_control(),
            zero_to_one_clip_z: ext.arb_clip_control(),
            individual_uniforms: true,
            instanced_arrays: ext.arb_instanced_arrays(),
            draw_instanced: ext.arb_draw_instanced(),
            base_vertex: ext.arb_draw_elements_base_vertex(),
            native_multithreading: false,
            shader_bytecode: ext.arb_gl_spirv(),
            vertex_shader: ext.arb_vertex_shader(),
            fragment_shader: ext.arb_fragment_shader(),
            geometry_shader: ext.arb_geometry_shader4() || version >= (3, 2),
            compute_shader: ext.arb_compute_shader(),
            mesh_shader: ext.nv_mesh_shader(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RecordingGl;

    #[test]
    fn version_strings() {
        assert_eq!(parse_version("4.6.0 NVIDIA 430.86"), Some((4, 6)));
        assert_eq!(parse_version("3.3 (Core Profile) Mesa 20.0.8"), Some((3, 3)));
        assert_eq!(parse_version("OpenGL ES 3.2 V@415.0"), Some((3, 2)));
        assert_eq!(parse_version("banana"), None);
    }

    #[test]
    fn limits_follow_extensions() {
        let gl = RecordingGl::new();
        let caps = Capabilities::populate(&gl, &Extensions::all());
        assert_eq!(caps.version, (4, 6));
        assert_eq!(caps.maximum_number_of_patch_vertices, 32);
        assert_eq!(caps.maximum_number_of_viewports, 16);
        assert!(caps.upper_left_origin);

        let caps = Capabilities::populate(&gl, &Extensions::none());
        assert_eq!(caps.maximum_number_of_patch_vertices, 0);
        assert_eq!(caps.maximum_number_of_viewports, 1);
        assert_eq!(caps.uniform_buffer_alignment, 1);
        assert!(!caps.mesh_shader);
    }
}
