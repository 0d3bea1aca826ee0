//! Texture objects.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::mapping::texture_format_to_gl;
use crate::native::GlApi;
use crate::strategy::DsaMode;
use rhi::{number_of_mipmaps, Error, ResourceType, Result, TextureFlags, TextureFormat, TextureUsage};
use std::fmt;
use std::rc::Rc;

/// Size and layout of a texture.
///
/// `number_of_slices` is the array size of array textures (in cubes for cube arrays) and 1 for
/// the others; `depth` is 1 except for 3D textures.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TextureDesc {
    pub resource_type: ResourceType,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub number_of_slices: u32,
    pub format: TextureFormat,
    pub flags: TextureFlags,
    pub usage: TextureUsage,
    pub number_of_multisamples: u8,
}

impl TextureDesc {
    fn new(resource_type: ResourceType, format: TextureFormat) -> TextureDesc {
        TextureDesc {
            resource_type,
            width: 1,
            height: 1,
            depth: 1,
            number_of_slices: 1,
            format,
            flags: TextureFlags::empty(),
            usage: TextureUsage::Default,
            number_of_multisamples: 1,
        }
    }

    fn is_multisample(&self) -> bool {
        self.number_of_multisamples > 1
    }

    fn is_cube(&self) -> bool {
        self.resource_type == ResourceType::TextureCube
            || self.resource_type == ResourceType::TextureCubeArray
    }

    fn target(&self) -> GLenum {
        match self.resource_type {
            ResourceType::Texture1D => gl::TEXTURE_1D,
            ResourceType::Texture1DArray => gl::TEXTURE_1D_ARRAY,
            ResourceType::Texture2D if self.is_multisample() => gl::TEXTURE_2D_MULTISAMPLE,
            ResourceType::Texture2DArray => gl::TEXTURE_2D_ARRAY,
            ResourceType::Texture3D => gl::TEXTURE_3D,
            ResourceType::TextureCube => gl::TEXTURE_CUBE_MAP,
            ResourceType::TextureCubeArray => gl::TEXTURE_CUBE_MAP_ARRAY,
            _ => gl::TEXTURE_2D,
        }
    }

    /// Number of dimensions of the native storage (array layers and cube faces count as one).
    fn dimensions(&self) -> u32 {
        match self.resource_type {
            ResourceType::Texture1D => 1,
            ResourceType::Texture1DArray | ResourceType::Texture2D | ResourceType::TextureCube => 2,
            _ => 3,
        }
    }

    fn full_mip_chain(&self) -> u32 {
        let depth = if self.resource_type == ResourceType::Texture3D {
            self.depth
        } else {
            1
        };
        number_of_mipmaps(self.width.max(self.height).max(depth))
    }

    /// Native extent of a mip level. Cube faces are not included, see `faces`.
    fn level_extent(&self, level: u32) -> (u32, u32, u32) {
        let w = (self.width >> level).max(1);
        let h = (self.height >> level).max(1);
        match self.resource_type {
            ResourceType::Texture1D => (w, 1, 1),
            ResourceType::Texture1DArray => (w, self.number_of_slices, 1),
            ResourceType::Texture2D | ResourceType::TextureCube => (w, h, 1),
            ResourceType::Texture3D => (w, h, (self.depth >> level).max(1)),
            ResourceType::TextureCubeArray => (w, h, self.number_of_slices * 6),
            _ => (w, h, self.number_of_slices),
        }
    }

    fn faces(&self) -> u32 {
        if self.resource_type == ResourceType::TextureCube {
            6
        } else {
            1
        }
    }

    /// Bytes of one mip level in the initial data, all faces included.
    fn level_size(&self, level: u32) -> usize {
        let (w, h, d) = self.level_extent(level);
        (w * h * d * self.faces()) as usize * self.format.bytes_per_element() as usize
    }
}

/// Texture operations along one of the update paths. On the bind path the texture must be
/// bound to `target` of the active unit.
struct TextureOps<'a> {
    gl: &'a dyn GlApi,
    dsa: DsaMode,
    name: GLuint,
    target: GLenum,
}

impl<'a> TextureOps<'a> {
    fn parameter_i(&self, pname: GLenum, value: GLint) {
        match self.dsa {
            DsaMode::Arb => self.gl.texture_parameter_i(self.name, pname, value),
            DsaMode::Ext => self
                .gl
                .texture_parameter_i_ext(self.name, self.target, pname, value),
            DsaMode::Bind => self.gl.tex_parameter_i(self.target, pname, value),
        }
    }

    fn generate_mipmap(&self) {
        match self.dsa {
            DsaMode::Arb => self.gl.generate_texture_mipmap(self.name),
            DsaMode::Ext => self.gl.generate_texture_mipmap_ext(self.name, self.target),
            DsaMode::Bind => self.gl.generate_mipmap(self.target),
        }
    }

    /// Allocates (and fills, if `data` is given) one level. Not used on the ARB path, which
    /// allocates immutable storage up front.
    fn image(&self, desc: &TextureDesc, level: u32, data: Option<&[u8]>) {
        let (internal_format, format, ty) = texture_format_to_gl(desc.format);
        let internal_format = internal_format as GLint;
        let (w, h, d) = desc.level_extent(level);
        let (w, h, d) = (w as GLsizei, h as GLsizei, d as GLsizei);
        let level = level as GLint;
        if desc.resource_type == ResourceType::TextureCube {
            let face_size = data.map(|d| d.len() / 6).unwrap_or(0);
            for face in 0..6 {
                let face_target = gl::TEXTURE_CUBE_MAP_POSITIVE_X + face as GLenum;
                let face_data = data.map(|d| &d[face * face_size..(face + 1) * face_size]);
                self.image_2d(face_target, level, internal_format, w, h, format, ty, face_data);
            }
            return;
        }
        match desc.dimensions() {
            1 => match self.dsa {
                DsaMode::Ext => self.gl.texture_image_1d_ext(
                    self.name,
                    self.target,
                    level,
                    internal_format,
                    w,
                    format,
                    ty,
                    data,
                ),
                _ => self
                    .gl
                    .tex_image_1d(self.target, level, internal_format, w, format, ty, data),
            },
            2 => self.image_2d(self.target, level, internal_format, w, h, format, ty, data),
            _ => match self.dsa {
                DsaMode::Ext => self.gl.texture_image_3d_ext(
                    self.name,
                    self.target,
                    level,
                    internal_format,
                    w,
                    h,
                    d,
                    format,
                    ty,
                    data,
                ),
                _ => self.gl.tex_image_3d(
                    self.target,
                    level,
                    internal_format,
                    w,
                    h,
                    d,
                    format,
                    ty,
                    data,
                ),
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        w: GLsizei,
        h: GLsizei,
        format: GLenum,
        ty: GLenum,
        data: Option<&[u8]>,
    ) {
        match self.dsa {
            DsaMode::Ext => self.gl.texture_image_2d_ext(
                self.name,
                target,
                level,
                internal_format,
                w,
                h,
                format,
                ty,
                data,
            ),
            _ => self
                .gl
                .tex_image_2d(target, level, internal_format, w, h, format, ty, data),
        }
    }
}

/// Any texture, from 1D to cube arrays.
pub struct Texture {
    ctx: Rc<GlContext>,
    name: GLuint,
    target: GLenum,
    desc: TextureDesc,
    number_of_mipmaps: u32,
    dsa: DsaMode,
}

impl Texture {
    fn new(ctx: &Rc<GlContext>, desc: TextureDesc, data: Option<&[u8]>) -> Result<Texture> {
        check_support(ctx, &desc)?;

        let number_of_mipmaps = if desc.is_multisample() {
            1
        } else if desc
            .flags
            .intersects(TextureFlags::DATA_CONTAINS_MIPMAPS | TextureFlags::GENERATE_MIPMAPS)
        {
            desc.full_mip_chain()
        } else {
            1
        };
        let uploaded_levels = if desc.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) {
            number_of_mipmaps
        } else {
            1
        };

        // split the initial data per level before creating anything
        let mut levels: Vec<Option<&[u8]>> = Vec::with_capacity(uploaded_levels as usize);
        match data {
            Some(data) => {
                if desc.is_multisample() {
                    return Err(Error::InvalidDescription(
                        "multisample textures cannot have initial data",
                    ));
                }
                let mut offset = 0;
                for level in 0..uploaded_levels {
                    let size = desc.level_size(level);
                    match data.get(offset..offset + size) {
                        Some(bytes) => levels.push(Some(bytes)),
                        None => {
                            error!(
                                "texture data too small: level {} needs {} bytes at offset {}, \
                                 got {}",
                                level,
                                size,
                                offset,
                                data.len()
                            );
                            return Err(Error::InvalidDescription("texture data too small"));
                        }
                    }
                    offset += size;
                }
            }
            None => levels.push(None),
        }
        let generate = desc.flags.contains(TextureFlags::GENERATE_MIPMAPS)
            && !desc.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS)
            && data.is_some();

        let target = desc.target();
        let mut dsa = ctx.strategies.dsa;
        // EXT direct state access has no multisample storage
        if desc.is_multisample() && dsa == DsaMode::Ext {
            dsa = DsaMode::Bind;
        }
        let gl = ctx.gl();
        let name = match dsa {
            DsaMode::Arb => gl.create_texture(target),
            _ => gl.gen_texture(),
        };
        let texture = Texture {
            ctx: ctx.clone(),
            name,
            target,
            desc,
            number_of_mipmaps,
            dsa,
        };

        texture.with_ops(dsa, |ops| {
            if desc.is_multisample() {
                texture.allocate_multisample(ops);
                return;
            }
            if ops.dsa == DsaMode::Arb {
                texture.allocate_storage(ops.gl);
                for (level, bytes) in levels.iter().enumerate() {
                    if let Some(bytes) = bytes {
                        texture.sub_image(ops.gl, level as u32, bytes);
                    }
                }
            } else {
                for (level, bytes) in levels.iter().enumerate() {
                    ops.image(&desc, level as u32, *bytes);
                }
            }
            let min_filter = if number_of_mipmaps > 1 {
                gl::LINEAR_MIPMAP_LINEAR
            } else {
                gl::LINEAR
            };
            ops.parameter_i(gl::TEXTURE_MIN_FILTER, min_filter as GLint);
            ops.parameter_i(gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            if generate && !texture.needs_bind_for_mipmaps() {
                ops.generate_mipmap();
            }
        });
        if generate && texture.needs_bind_for_mipmaps() {
            texture.with_ops(DsaMode::Bind, |ops| ops.generate_mipmap());
        }
        Ok(texture)
    }

    fn with_ops<R>(&self, dsa: DsaMode, f: impl FnOnce(&TextureOps) -> R) -> R {
        match dsa {
            DsaMode::Bind => self.ctx.with_bound_texture(self.target, self.name, |gl| {
                f(&TextureOps {
                    gl,
                    dsa,
                    name: self.name,
                    target: self.target,
                })
            }),
            _ => f(&TextureOps {
                gl: self.ctx.gl(),
                dsa,
                name: self.name,
                target: self.target,
            }),
        }
    }

    /// Direct state access mipmap generation of 1D and 2D array textures is broken in some
    /// Windows drivers; those go through the bind path.
    fn needs_bind_for_mipmaps(&self) -> bool {
        cfg!(windows)
            && self.dsa.is_dsa()
            && (self.desc.resource_type == ResourceType::Texture1DArray
                || self.desc.resource_type == ResourceType::Texture2DArray)
    }

    fn allocate_storage(&self, gl: &dyn GlApi) {
        let (internal_format, _, _) = texture_format_to_gl(self.desc.format);
        let levels = self.number_of_mipmaps as GLsizei;
        let (w, h, d) = self.desc.level_extent(0);
        match self.desc.dimensions() {
            1 => gl.texture_storage_1d(self.name, levels, internal_format, w as GLsizei),
            2 => gl.texture_storage_2d(
                self.name,
                levels,
                internal_format,
                w as GLsizei,
                h as GLsizei,
            ),
            _ => gl.texture_storage_3d(
                self.name,
                levels,
                internal_format,
                w as GLsizei,
                h as GLsizei,
                d as GLsizei,
            ),
        }
    }

    fn sub_image(&self, gl: &dyn GlApi, level: u32, bytes: &[u8]) {
        let (_, format, ty) = texture_format_to_gl(self.desc.format);
        let (w, h, d) = self.desc.level_extent(level);
        let (w, h, d) = (w as GLsizei, h as GLsizei, d as GLsizei);
        let level = level as GLint;
        if self.desc.resource_type == ResourceType::TextureCube {
            // faces are the layers of a cube map for the DSA entry points
            gl.texture_sub_image_3d(self.name, level, w, h, 6, format, ty, bytes);
            return;
        }
        match self.desc.dimensions() {
            1 => gl.texture_sub_image_1d(self.name, level, w, format, ty, bytes),
            2 => gl.texture_sub_image_2d(self.name, level, w, h, format, ty, bytes),
            _ => gl.texture_sub_image_3d(self.name, level, w, h, d, format, ty, bytes),
        }
    }

    fn allocate_multisample(&self, ops: &TextureOps) {
        let (internal_format, _, _) = texture_format_to_gl(self.desc.format);
        let samples = GLsizei::from(self.desc.number_of_multisamples);
        let (w, h) = (self.desc.width as GLsizei, self.desc.height as GLsizei);
        match ops.dsa {
            DsaMode::Arb => ops.gl.texture_storage_2d_multisample(
                self.name,
                samples,
                internal_format,
                w,
                h,
                gl::TRUE,
            ),
            _ => ops.gl.tex_image_2d_multisample(
                self.target,
                samples,
                internal_format,
                w,
                h,
                gl::TRUE,
            ),
        }
    }

    pub fn name(&self) -> GLuint {
        self.name
    }

    pub fn target(&self) -> GLenum {
        self.target
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn resource_type(&self) -> ResourceType {
        self.desc.resource_type
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn number_of_mipmaps(&self) -> u32 {
        self.number_of_mipmaps
    }

    pub fn is_multisample(&self) -> bool {
        self.desc.is_multisample()
    }

    /// Whether the texture has array layers (or cube faces) that can be attached one by one.
    pub fn is_layered(&self) -> bool {
        self.desc.dimensions() == 3 || self.desc.is_cube()
    }

    /// Native internal format, as needed to bind the texture as an image.
    pub fn internal_format(&self) -> GLenum {
        texture_format_to_gl(self.desc.format).0
    }

    /// Restricts sampling to the mip levels `minimum..=maximum`.
    pub fn set_minimum_maximum_mipmap_index(&self, minimum: u32, maximum: u32) {
        debug_assert!(minimum <= maximum, "minimum mip index above maximum");
        self.with_ops(self.dsa, |ops| {
            ops.parameter_i(gl::TEXTURE_BASE_LEVEL, minimum as GLint);
            ops.parameter_i(gl::TEXTURE_MAX_LEVEL, maximum as GLint);
        });
    }

    /// Regenerates the mip chain from the first level.
    pub fn generate_mipmaps(&self) {
        debug_assert!(
            self.desc.flags.contains(TextureFlags::GENERATE_MIPMAPS),
            "texture was not created with GENERATE_MIPMAPS"
        );
        if self.is_multisample() {
            return;
        }
        let dsa = if self.needs_bind_for_mipmaps() {
            DsaMode::Bind
        } else {
            self.dsa
        };
        self.with_ops(dsa, |ops| ops.generate_mipmap());
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.ctx.gl().delete_texture(self.name);
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Texture")
            .field("name", &self.name)
            .field("desc", &self.desc)
            .field("number_of_mipmaps", &self.number_of_mipmaps)
            .finish()
    }
}

fn check_support(ctx: &GlContext, desc: &TextureDesc) -> Result<()> {
    let ext = &ctx.extensions;
    let caps = &ctx.capabilities;
    let (feature, supported) = match desc.resource_type {
        ResourceType::Texture1D => ("1D textures", true),
        ResourceType::Texture2D if desc.is_multisample() => (
            "GL_ARB_texture_multisample",
            ext.arb_texture_multisample(),
        ),
        ResourceType::Texture2D => ("2D textures", true),
        ResourceType::Texture1DArray | ResourceType::Texture2DArray => {
            ("GL_EXT_texture_array", ext.ext_texture_array())
        }
        ResourceType::Texture3D => ("GL_EXT_texture3D", ext.ext_texture_3d()),
        ResourceType::TextureCube => (
            "GL_ARB_texture_cube_map",
            ext.arb_texture_cube_map() || caps.version >= (1, 3),
        ),
        ResourceType::TextureCubeArray => (
            "GL_ARB_texture_cube_map_array",
            ext.arb_texture_cube_map_array() || caps.version >= (4, 0),
        ),
        _ => return Err(Error::InvalidDescription("not a texture type")),
    };
    if !supported {
        error!("{:?} needs {}", desc.resource_type, feature);
        return Err(Error::unsupported(feature));
    }
    if desc.width == 0 || desc.height == 0 || desc.depth == 0 || desc.number_of_slices == 0 {
        return Err(Error::InvalidDescription("texture with a zero extent"));
    }
    if desc.is_multisample()
        && u32::from(desc.number_of_multisamples) > caps.maximum_number_of_multisamples
    {
        error!(
            "{} samples requested, {} supported",
            desc.number_of_multisamples, caps.maximum_number_of_multisamples
        );
        return Err(Error::unsupported("number of multisamples"));
    }
    debug_assert!(
        desc.width <= caps.maximum_texture_dimension
            && desc.height <= caps.maximum_texture_dimension,
        "texture larger than the maximum dimension"
    );
    Ok(())
}

/// Creates textures.
#[derive(Clone, Debug)]
pub struct TextureManager {
    ctx: Rc<GlContext>,
}

impl TextureManager {
    pub(crate) fn new(ctx: &Rc<GlContext>) -> TextureManager {
        TextureManager { ctx: ctx.clone() }
    }

    /// Creates a texture from a full description.
    pub fn create_texture(&self, desc: TextureDesc, data: Option<&[u8]>) -> Result<Rc<Texture>> {
        Texture::new(&self.ctx, desc, data).map(Rc::new)
    }

    pub fn create_texture_1d(
        &self,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::Texture1D, format)
        };
        self.create_texture(desc, data)
    }

    pub fn create_texture_1d_array(
        &self,
        width: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            number_of_slices,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::Texture1DArray, format)
        };
        self.create_texture(desc, data)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
        number_of_multisamples: u8,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            height,
            flags,
            usage,
            number_of_multisamples: number_of_multisamples.max(1),
            ..TextureDesc::new(ResourceType::Texture2D, format)
        };
        self.create_texture(desc, data)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_2d_array(
        &self,
        width: u32,
        height: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            height,
            number_of_slices,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::Texture2DArray, format)
        };
        self.create_texture(desc, data)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_3d(
        &self,
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            height,
            depth,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::Texture3D, format)
        };
        self.create_texture(desc, data)
    }

    /// Cube map; the initial data holds the six faces of each level in +X, -X, +Y, -Y, +Z, -Z
    /// order.
    pub fn create_texture_cube(
        &self,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            height: width,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::TextureCube, format)
        };
        self.create_texture(desc, data)
    }

    pub fn create_texture_cube_array(
        &self,
        width: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        usage: TextureUsage,
    ) -> Result<Rc<Texture>> {
        let desc = TextureDesc {
            width,
            height: width,
            number_of_slices,
            flags,
            usage,
            ..TextureDesc::new(ResourceType::TextureCubeArray, format)
        };
        self.create_texture(desc, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;

    fn manager(gl: &Rc<RecordingGl>) -> TextureManager {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        gl.clear_calls();
        TextureManager::new(&ctx)
    }

    #[test]
    fn immutable_storage_with_generated_mipmaps() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl);
        let data = vec![0u8; 4 * 4 * 4];
        let t = m
            .create_texture_2d(
                4,
                4,
                TextureFormat::R8G8B8A8,
                Some(&data),
                TextureFlags::GENERATE_MIPMAPS,
                TextureUsage::Default,
                1,
            )
            .unwrap();
        let n = t.name();
        assert_eq!(t.number_of_mipmaps(), 3);
        assert_eq!(
            gl.take_calls(),
            vec![
                format!("CreateTextures({}, {})", gl::TEXTURE_2D, n),
                format!("TextureStorage2D({}, 3, {}, 4, 4)", n, gl::RGBA8),
                format!(
                    "TextureSubImage2D({}, 0, 4, 4, {}, {}, 64)",
                    n,
                    gl::RGBA,
                    gl::UNSIGNED_BYTE
                ),
                format!(
                    "TextureParameteri({}, {}, {})",
                    n,
                    gl::TEXTURE_MIN_FILTER,
                    gl::LINEAR_MIPMAP_LINEAR
                ),
                format!(
                    "TextureParameteri({}, {}, {})",
                    n,
                    gl::TEXTURE_MAG_FILTER,
                    gl::LINEAR
                ),
                format!("GenerateTextureMipmap({})", n),
            ]
        );
    }

    #[test]
    fn full_mip_chain_upload() {
        let gl = Rc::new(RecordingGl::legacy(
            2,
            1,
            &["GL_ARB_vertex_buffer_object", "GL_EXT_direct_state_access"],
        ));
        let m = manager(&gl);
        // 4x2 + 2x1 + 1x1 texels
        let data = vec![0u8; 8 + 2 + 1];
        let t = m
            .create_texture_2d(
                4,
                2,
                TextureFormat::R8,
                Some(&data),
                TextureFlags::DATA_CONTAINS_MIPMAPS,
                TextureUsage::Immutable,
                1,
            )
            .unwrap();
        assert_eq!(t.number_of_mipmaps(), 3);
        assert_eq!(gl.count("TextureImage2DEXT"), 3);
        assert_eq!(gl.count("GenerateTextureMipmapEXT"), 0);

        assert_eq!(
            m.create_texture_2d(
                4,
                2,
                TextureFormat::R8,
                Some(&data[..9]),
                TextureFlags::DATA_CONTAINS_MIPMAPS,
                TextureUsage::Immutable,
                1,
            )
            .unwrap_err(),
            Error::InvalidDescription("texture data too small")
        );
    }

    #[test]
    fn cube_faces_on_the_bind_path() {
        let gl = Rc::new(RecordingGl::legacy(
            2,
            1,
            &["GL_ARB_vertex_buffer_object", "GL_ARB_texture_cube_map"],
        ));
        let m = manager(&gl);
        let data = vec![0u8; 6 * 2 * 2 * 4];
        let t = m
            .create_texture_cube(
                2,
                TextureFormat::R8G8B8A8,
                Some(&data),
                TextureFlags::empty(),
                TextureUsage::Default,
            )
            .unwrap();
        assert_eq!(gl.count("TexImage2D"), 6);
        assert!(gl.contains(&format!(
            "BindTexture({}, {})",
            gl::TEXTURE_CUBE_MAP,
            t.name()
        )));
        assert!(gl.contains(&format!(
            "TexImage2D({}, 0, {}, 2, 2, {}, {}, true)",
            gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
            gl::RGBA8,
            gl::RGBA,
            gl::UNSIGNED_BYTE
        )));
    }

    #[test]
    fn unsupported_kinds() {
        let gl = Rc::new(RecordingGl::legacy(2, 1, &["GL_ARB_vertex_buffer_object"]));
        let m = manager(&gl);
        assert_eq!(
            m.create_texture_2d_array(
                4,
                4,
                2,
                TextureFormat::R8,
                None,
                TextureFlags::empty(),
                TextureUsage::Default
            )
            .unwrap_err(),
            Error::unsupported("GL_EXT_texture_array")
        );
        assert!(m
            .create_texture_2d(
                4,
                4,
                TextureFormat::R8,
                None,
                TextureFlags::RENDER_TARGET,
                TextureUsage::Default,
                4
            )
            .is_err());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn multisample_storage() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl);
        let t = m
            .create_texture_2d(
                64,
                64,
                TextureFormat::R16G16B16A16F,
                None,
                TextureFlags::RENDER_TARGET,
                TextureUsage::Default,
                4,
            )
            .unwrap();
        assert_eq!(t.target(), gl::TEXTURE_2D_MULTISAMPLE);
        assert_eq!(
            gl.names(),
            vec!["CreateTextures", "TextureStorage2DMultisample"]
        );
    }

    #[test]
    fn mip_range() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl);
        let t = m
            .create_texture_3d(
                8,
                8,
                8,
                TextureFormat::R8,
                None,
                TextureFlags::GENERATE_MIPMAPS,
                TextureUsage::Default,
            )
            .unwrap();
        gl.clear_calls();
        t.set_minimum_maximum_mipmap_index(1, 2);
        assert_eq!(
            gl.take_calls(),
            vec![
                format!("TextureParameteri({}, {}, 1)", t.name(), gl::TEXTURE_BASE_LEVEL),
                format!("TextureParameteri({}, {}, 2)", t.name(), gl::TEXTURE_MAX_LEVEL),
            ]
        );
        t.generate_mipmaps();
        assert_eq!(gl.names(), vec!["GenerateTextureMipmap"]);
    }
}
