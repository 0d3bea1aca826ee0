//! Buffer objects.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::mapping::{buffer_usage_to_gl, map_type_to_gl, texture_format_to_gl};
use crate::resource::vertex_array::{VertexArray, VertexArrayVertexBuffer};
use crate::strategy::DsaMode;
use rhi::{
    BufferFlags, BufferUsage, DrawArguments, DrawIndexedArguments, DrawMeshTasksArguments, Error,
    IndexBufferFormat, IndirectBufferFlags, MapType, MappedSubresource, Result, TextureFormat,
    VertexAttribute,
};
use std::fmt;
use std::mem;
use std::rc::Rc;

/// A native buffer object.
///
/// The target is only used by the bind path; with direct state access the buffer is never bound
/// for uploads or mapping.
pub struct RawBuffer {
    ctx: Rc<GlContext>,
    name: GLuint,
    target: GLenum,
    size: usize,
    usage: BufferUsage,
    dsa: DsaMode,
}

impl RawBuffer {
    fn new(
        ctx: &Rc<GlContext>,
        target: GLenum,
        size: usize,
        data: Option<&[u8]>,
        usage: BufferUsage,
    ) -> RawBuffer {
        if let Some(data) = data {
            debug_assert!(data.len() >= size, "initial data smaller than the buffer");
        }
        let data = data.map(|d| &d[..size.min(d.len())]);
        let gl_usage = buffer_usage_to_gl(usage);
        let dsa = ctx.strategies.dsa;
        let gl = ctx.gl();
        let name = match dsa {
            DsaMode::Arb => {
                let name = gl.create_buffer();
                gl.named_buffer_data(name, size, data, gl_usage);
                name
            }
            DsaMode::Ext => {
                let name = gl.gen_buffer();
                gl.named_buffer_data_ext(name, size, data, gl_usage);
                name
            }
            DsaMode::Bind => {
                let name = gl.gen_buffer();
                ctx.with_bound_buffer(target, name, |gl| {
                    gl.buffer_data(target, size, data, gl_usage)
                });
                name
            }
        };
        RawBuffer {
            ctx: ctx.clone(),
            name,
            target,
            size,
            usage,
            dsa,
        }
    }

    pub fn name(&self) -> GLuint {
        self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Overwrites `data.len()` bytes starting at `offset`.
    pub fn copy_data_from(&self, offset: usize, data: &[u8]) {
        debug_assert!(offset + data.len() <= self.size, "write past the end of the buffer");
        match self.dsa {
            DsaMode::Arb => self.ctx.gl().named_buffer_sub_data(self.name, offset, data),
            DsaMode::Ext => self.ctx.gl().named_buffer_sub_data_ext(self.name, offset, data),
            DsaMode::Bind => {
                let target = self.target;
                self.ctx.with_bound_buffer(target, self.name, |gl| {
                    gl.buffer_sub_data(target, offset, data)
                })
            }
        }
    }

    /// Maps the whole buffer.
    pub fn map(&self, map_type: MapType) -> Result<MappedSubresource> {
        let access = map_type_to_gl(map_type);
        let ptr = match self.dsa {
            DsaMode::Arb => self.ctx.gl().map_named_buffer(self.name, access),
            DsaMode::Ext => self.ctx.gl().map_named_buffer_ext(self.name, access),
            DsaMode::Bind => {
                let target = self.target;
                self.ctx
                    .with_bound_buffer(target, self.name, |gl| gl.map_buffer(target, access))
            }
        };
        if ptr.is_null() {
            error!("failed to map buffer {} ({:?})", self.name, map_type);
            return Err(Error::MapFailed);
        }
        Ok(MappedSubresource {
            data: ptr as *mut u8,
            row_pitch: 0,
            depth_pitch: 0,
        })
    }

    /// Returns false if the contents were corrupted while mapped.
    pub fn unmap(&self) -> bool {
        let ok = match self.dsa {
            DsaMode::Arb => self.ctx.gl().unmap_named_buffer(self.name),
            DsaMode::Ext => self.ctx.gl().unmap_named_buffer_ext(self.name),
            DsaMode::Bind => {
                let target = self.target;
                self.ctx
                    .with_bound_buffer(target, self.name, |gl| gl.unmap_buffer(target))
            }
        };
        if !ok {
            warn!("buffer {} contents were lost while mapped", self.name);
        }
        ok
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        self.ctx.state().forget_buffer(self.name);
        self.ctx.gl().delete_buffer(self.name);
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("usage", &self.usage)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct VertexBuffer {
    raw: RawBuffer,
    flags: BufferFlags,
}

impl VertexBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }
}

#[derive(Debug)]
pub struct IndexBuffer {
    raw: RawBuffer,
    flags: BufferFlags,
    format: IndexBufferFormat,
}

impl IndexBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    pub fn format(&self) -> IndexBufferFormat {
        self.format
    }
}

#[derive(Debug)]
pub struct UniformBuffer {
    raw: RawBuffer,
}

impl UniformBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }
}

#[derive(Debug)]
pub struct StructuredBuffer {
    raw: RawBuffer,
    flags: BufferFlags,
    number_of_structure_bytes: u32,
}

impl StructuredBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    pub fn number_of_structure_bytes(&self) -> u32 {
        self.number_of_structure_bytes
    }
}

#[derive(Debug)]
pub struct IndirectBuffer {
    raw: RawBuffer,
    flags: IndirectBufferFlags,
}

impl IndirectBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }

    pub fn flags(&self) -> IndirectBufferFlags {
        self.flags
    }
}

/// A buffer viewed as a one-dimensional texture (`GL_TEXTURE_BUFFER`).
pub struct TextureBuffer {
    raw: RawBuffer,
    texture: GLuint,
    flags: BufferFlags,
    format: TextureFormat,
}

impl TextureBuffer {
    pub fn raw(&self) -> &RawBuffer {
        &self.raw
    }

    /// The texture object sampling the buffer.
    pub fn texture(&self) -> GLuint {
        self.texture
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for TextureBuffer {
    fn drop(&mut self) {
        self.raw.ctx.gl().delete_texture(self.texture);
    }
}

impl fmt::Debug for TextureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TextureBuffer")
            .field("raw", &self.raw)
            .field("texture", &self.texture)
            .field("format", &self.format)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------

/// Creates buffers and vertex arrays.
#[derive(Clone, Debug)]
pub struct BufferManager {
    ctx: Rc<GlContext>,
}

impl BufferManager {
    pub(crate) fn new(ctx: &Rc<GlContext>) -> Result<BufferManager> {
        if !ctx.extensions.arb_vertex_buffer_object() {
            error!("buffer objects are not supported by this context");
            return Err(Error::unsupported("GL_ARB_vertex_buffer_object"));
        }
        Ok(BufferManager { ctx: ctx.clone() })
    }

    pub fn create_vertex_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferFlags,
        usage: BufferUsage,
    ) -> Result<Rc<VertexBuffer>> {
        let raw = RawBuffer::new(&self.ctx, gl::ARRAY_BUFFER, size, data, usage);
        Ok(Rc::new(VertexBuffer { raw, flags }))
    }

    pub fn create_index_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferFlags,
        usage: BufferUsage,
        format: IndexBufferFormat,
    ) -> Result<Rc<IndexBuffer>> {
        debug_assert_eq!(
            size % format.bytes_per_element() as usize,
            0,
            "index buffer size is not a multiple of the index size"
        );
        // the element array binding belongs to the bound vertex array, upload through
        // GL_ARRAY_BUFFER instead
        let raw = RawBuffer::new(&self.ctx, gl::ARRAY_BUFFER, size, data, usage);
        Ok(Rc::new(IndexBuffer { raw, flags, format }))
    }

    /// Creates a vertex array; `vertex_buffers` are indexed by the attributes' input slots.
    pub fn create_vertex_array(
        &self,
        attributes: &[VertexAttribute],
        vertex_buffers: Vec<VertexArrayVertexBuffer>,
        index_buffer: Option<Rc<IndexBuffer>>,
    ) -> Result<Rc<VertexArray>> {
        VertexArray::new(&self.ctx, attributes, vertex_buffers, index_buffer).map(Rc::new)
    }

    pub fn create_texture_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferFlags,
        usage: BufferUsage,
        format: TextureFormat,
    ) -> Result<Rc<TextureBuffer>> {
        if !self.ctx.extensions.arb_texture_buffer_object() {
            error!("texture buffers are not supported by this context");
            return Err(Error::unsupported("GL_ARB_texture_buffer_object"));
        }
        debug_assert!(
            size / format.bytes_per_element() as usize
                <= self.ctx.capabilities.maximum_texture_buffer_size as usize,
            "texture buffer too large"
        );
        let raw = RawBuffer::new(&self.ctx, gl::TEXTURE_BUFFER, size, data, usage);
        let (internal_format, _, _) = texture_format_to_gl(format);
        let texture = match raw.dsa {
            DsaMode::Arb => {
                let gl = self.ctx.gl();
                let texture = gl.create_texture(gl::TEXTURE_BUFFER);
                gl.texture_buffer(texture, internal_format, raw.name);
                texture
            }
            DsaMode::Ext => {
                let gl = self.ctx.gl();
                let texture = gl.gen_texture();
                gl.texture_buffer_ext(texture, gl::TEXTURE_BUFFER, internal_format, raw.name);
                texture
            }
            DsaMode::Bind => {
                let texture = self.ctx.gl().gen_texture();
                self.ctx
                    .with_bound_texture(gl::TEXTURE_BUFFER, texture, |gl| {
                        gl.tex_buffer(gl::TEXTURE_BUFFER, internal_format, raw.name)
                    });
                texture
            }
        };
        Ok(Rc::new(TextureBuffer {
            raw,
            texture,
            flags,
            format,
        }))
    }

    pub fn create_structured_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferFlags,
        usage: BufferUsage,
        number_of_structure_bytes: u32,
    ) -> Result<Rc<StructuredBuffer>> {
        if !self.ctx.extensions.arb_shader_storage_buffer_object() {
            error!("structured buffers are not supported by this context");
            return Err(Error::unsupported("GL_ARB_shader_storage_buffer_object"));
        }
        if number_of_structure_bytes == 0 {
            return Err(Error::InvalidDescription("structure size is zero"));
        }
        debug_assert_eq!(
            size % number_of_structure_bytes as usize,
            0,
            "structured buffer size is not a multiple of the structure size"
        );
        let raw = RawBuffer::new(&self.ctx, gl::SHADER_STORAGE_BUFFER, size, data, usage);
        Ok(Rc::new(StructuredBuffer {
            raw,
            flags,
            number_of_structure_bytes,
        }))
    }

    pub fn create_indirect_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        flags: IndirectBufferFlags,
        usage: BufferUsage,
    ) -> Result<Rc<IndirectBuffer>> {
        if !self.ctx.extensions.arb_draw_indirect() {
            error!("indirect buffers are not supported by this context");
            return Err(Error::unsupported("GL_ARB_draw_indirect"));
        }
        let argument_size = if flags.contains(IndirectBufferFlags::DRAW_ARGUMENTS) {
            mem::size_of::<DrawArguments>()
        } else if flags.contains(IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS) {
            mem::size_of::<DrawIndexedArguments>()
        } else if flags.contains(IndirectBufferFlags::DRAW_MESH_TASKS_ARGUMENTS) {
            mem::size_of::<DrawMeshTasksArguments>()
        } else {
            return Err(Error::InvalidDescription(
                "indirect buffer flags name no argument type",
            ));
        };
        debug_assert_eq!(
            size % argument_size,
            0,
            "indirect buffer size is not a multiple of the argument size"
        );
        let raw = RawBuffer::new(&self.ctx, gl::DRAW_INDIRECT_BUFFER, size, data, usage);
        Ok(Rc::new(IndirectBuffer { raw, flags }))
    }

    pub fn create_uniform_buffer(
        &self,
        size: usize,
        data: Option<&[u8]>,
        usage: BufferUsage,
    ) -> Result<Rc<UniformBuffer>> {
        if !self.ctx.extensions.arb_uniform_buffer_object() {
            error!("uniform buffers are not supported by this context");
            return Err(Error::unsupported("GL_ARB_uniform_buffer_object"));
        }
        debug_assert!(
            size <= self.ctx.capabilities.maximum_uniform_buffer_size as usize,
            "uniform buffer too large"
        );
        let raw = RawBuffer::new(&self.ctx, gl::UNIFORM_BUFFER, size, data, usage);
        Ok(Rc::new(UniformBuffer { raw }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;

    fn manager(gl: &Rc<RecordingGl>, config: BackendConfig) -> BufferManager {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, config));
        gl.clear_calls();
        BufferManager::new(&ctx).unwrap()
    }

    #[test]
    fn dsa_creation_and_update() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl, BackendConfig::default());
        let vb = m
            .create_vertex_buffer(16, Some(&[0; 16]), BufferFlags::empty(), BufferUsage::StaticDraw)
            .unwrap();
        let name = vb.raw().name();
        vb.raw().copy_data_from(4, &[1, 2, 3, 4]);
        assert_eq!(
            gl.take_calls(),
            vec![
                format!("CreateBuffers({})", name),
                format!("NamedBufferData({}, 16, true, {})", name, gl::STATIC_DRAW),
                format!("NamedBufferSubData({}, 4, 4)", name),
            ]
        );
        drop(vb);
        assert_eq!(gl.take_calls(), vec![format!("DeleteBuffers({})", name)]);
    }

    #[test]
    fn bind_path_restores_the_previous_binding() {
        let gl = Rc::new(RecordingGl::legacy(
            2,
            1,
            &["GL_ARB_vertex_buffer_object", "GL_ARB_shader_objects"],
        ));
        gl.set_integer(gl::ARRAY_BUFFER_BINDING, 42);
        let config = BackendConfig {
            restore_state: true,
            ..BackendConfig::default()
        };
        let m = manager(&gl, config);
        let ib = m
            .create_index_buffer(
                6,
                None,
                BufferFlags::empty(),
                BufferUsage::DynamicDraw,
                IndexBufferFormat::UnsignedShort,
            )
            .unwrap();
        let name = ib.raw().name();
        assert_eq!(
            gl.take_calls(),
            vec![
                format!("GenBuffers({})", name),
                format!("BindBuffer({}, {})", gl::ARRAY_BUFFER, name),
                format!("BufferData({}, 6, false, {})", gl::ARRAY_BUFFER, gl::DYNAMIC_DRAW),
                format!("BindBuffer({}, 42)", gl::ARRAY_BUFFER),
            ]
        );
    }

    #[test]
    fn ext_path() {
        let gl = Rc::new(RecordingGl::legacy(
            2,
            1,
            &["GL_ARB_vertex_buffer_object", "GL_EXT_direct_state_access"],
        ));
        let m = manager(&gl, BackendConfig::default());
        let vb = m
            .create_vertex_buffer(8, None, BufferFlags::empty(), BufferUsage::StreamDraw)
            .unwrap();
        vb.raw().copy_data_from(0, &[0; 8]);
        assert_eq!(
            gl.names(),
            vec!["GenBuffers", "NamedBufferDataEXT", "NamedBufferSubDataEXT"]
        );
    }

    #[test]
    fn missing_capabilities() {
        let gl = Rc::new(RecordingGl::legacy(2, 1, &["GL_ARB_vertex_buffer_object"]));
        let m = manager(&gl, BackendConfig::default());
        assert_eq!(
            m.create_uniform_buffer(16, None, BufferUsage::DynamicDraw)
                .unwrap_err(),
            Error::unsupported("GL_ARB_uniform_buffer_object")
        );
        assert!(m
            .create_indirect_buffer(
                16,
                None,
                IndirectBufferFlags::DRAW_ARGUMENTS,
                BufferUsage::StaticDraw
            )
            .is_err());
        assert!(m
            .create_texture_buffer(
                16,
                None,
                BufferFlags::empty(),
                BufferUsage::StaticDraw,
                TextureFormat::R32Float
            )
            .is_err());
        assert!(gl.calls().is_empty());

        let none = Rc::new(RecordingGl::legacy(1, 1, &[]));
        let ext = Extensions::detect(&*none, &*none, "");
        let ctx = Rc::new(GlContext::new(none.clone(), ext, BackendConfig::default()));
        assert!(BufferManager::new(&ctx).is_err());
    }

    #[test]
    fn mapping() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl, BackendConfig::default());
        let ub = m
            .create_uniform_buffer(64, None, BufferUsage::DynamicDraw)
            .unwrap();
        let mapped = ub.raw().map(MapType::WriteDiscard).unwrap();
        unsafe {
            *mapped.data = 7;
        }
        assert!(ub.raw().unmap());
        assert_eq!(gl.mapped_bytes(1), vec![7]);

        gl.set_fail_map(true);
        assert_eq!(ub.raw().map(MapType::Read).unwrap_err(), Error::MapFailed);
    }

    #[test]
    fn texture_buffer_objects() {
        let gl = Rc::new(RecordingGl::new());
        let m = manager(&gl, BackendConfig::default());
        let tb = m
            .create_texture_buffer(
                64,
                None,
                BufferFlags::SHADER_RESOURCE,
                BufferUsage::StaticDraw,
                TextureFormat::R32G32B32A32F,
            )
            .unwrap();
        assert!(gl.contains(&format!(
            "TextureBuffer({}, {}, {})",
            tb.texture(),
            gl::RGBA32F,
            tb.raw().name()
        )));
        let (texture, buffer) = (tb.texture(), tb.raw().name());
        gl.clear_calls();
        drop(tb);
        assert_eq!(
            gl.take_calls(),
            vec![
                format!("DeleteTextures({})", texture),
                format!("DeleteBuffers({})", buffer),
            ]
        );
    }
}
