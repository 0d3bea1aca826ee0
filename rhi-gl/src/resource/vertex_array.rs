//! Vertex arrays: vertex attribute layout plus the buffers feeding it.
//!
//! Attribute `i` of the layout is bound to generic attribute location `i`; programs bind their
//! attribute names to the same locations before linking.
use crate::api as gl;
use crate::api::types::*;
use crate::context::{GlContext, IdKind};
use crate::mapping::vertex_attribute_format_to_gl;
use crate::native::GlApi;
use crate::resource::buffer::{IndexBuffer, VertexBuffer};
use crate::state::Binding;
use crate::strategy::VertexArrayMode;
use rhi::{Error, Result, VertexAttribute};
use std::fmt;
use std::rc::Rc;

/// Vertex buffer feeding one input slot of a vertex array.
#[derive(Clone, Debug)]
pub struct VertexArrayVertexBuffer {
    pub vertex_buffer: Rc<VertexBuffer>,
}

impl VertexArrayVertexBuffer {
    pub fn new(vertex_buffer: &Rc<VertexBuffer>) -> VertexArrayVertexBuffer {
        VertexArrayVertexBuffer {
            vertex_buffer: vertex_buffer.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct AttributeLayout {
    size: GLint,
    ty: GLenum,
    normalized: bool,
    integer: bool,
    input_slot: usize,
    offset: u32,
    stride: u32,
    divisor: u32,
}

pub struct VertexArray {
    ctx: Rc<GlContext>,
    id: u32,
    /// 0 when vertex array objects are not available.
    name: GLuint,
    mode: VertexArrayMode,
    attributes: Vec<AttributeLayout>,
    vertex_buffers: Vec<VertexArrayVertexBuffer>,
    index_buffer: Option<Rc<IndexBuffer>>,
}

impl VertexArray {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        attributes: &[VertexAttribute],
        vertex_buffers: Vec<VertexArrayVertexBuffer>,
        index_buffer: Option<Rc<IndexBuffer>>,
    ) -> Result<VertexArray> {
        if attributes.len() > ctx.capabilities.maximum_number_of_vertex_attributes as usize {
            error!(
                "{} vertex attributes, the context supports {}",
                attributes.len(),
                ctx.capabilities.maximum_number_of_vertex_attributes
            );
            return Err(Error::InvalidDescription("too many vertex attributes"));
        }

        let mut layout = Vec::with_capacity(attributes.len());
        for a in attributes {
            if a.input_slot as usize >= vertex_buffers.len() {
                error!(
                    "vertex attribute `{}` reads input slot {} but only {} vertex buffers are given",
                    a.name,
                    a.input_slot,
                    vertex_buffers.len()
                );
                return Err(Error::InvalidDescription(
                    "vertex attribute input slot has no vertex buffer",
                ));
            }
            if a.instances_per_element > 0 && !ctx.capabilities.instanced_arrays {
                return Err(Error::unsupported("GL_ARB_instanced_arrays"));
            }
            let (size, ty, normalized) = vertex_attribute_format_to_gl(a.format);
            layout.push(AttributeLayout {
                size,
                ty,
                normalized,
                integer: a.format.is_integer() && !normalized,
                input_slot: a.input_slot as usize,
                offset: a.aligned_byte_offset,
                stride: a.stride_in_bytes,
                divisor: a.instances_per_element,
            });
        }

        let id = ctx
            .create_id(IdKind::VertexArray)
            .ok_or(Error::InvalidDescription("out of vertex array IDs"))?;

        let mut vertex_array = VertexArray {
            ctx: ctx.clone(),
            id,
            name: 0,
            mode: ctx.strategies.vertex_array,
            attributes: layout,
            vertex_buffers,
            index_buffer,
        };

        let gl = ctx.gl();
        match vertex_array.mode {
            VertexArrayMode::NoVao => {}
            VertexArrayMode::Vao => {
                let name = gl.gen_vertex_array();
                vertex_array.name = name;
                let previous = {
                    let mut state = ctx.state();
                    let previous = state.vertex_array();
                    state.bind_vertex_array(gl, name);
                    previous
                };
                vertex_array.specify_attributes(gl);
                // part of the vertex array state, no restore
                gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, vertex_array.index_buffer_name());
                if let (true, Some(previous)) = (ctx.restore_state(), previous) {
                    ctx.state().bind_vertex_array(gl, previous);
                }
            }
            VertexArrayMode::VaoDsa => {
                let name = gl.create_vertex_array();
                vertex_array.name = name;
                for (i, a) in vertex_array.attributes.iter().enumerate() {
                    let i = i as GLuint;
                    let vb = vertex_array.vertex_buffers[a.input_slot]
                        .vertex_buffer
                        .raw()
                        .name();
                    gl.enable_vertex_array_attrib(name, i);
                    if a.integer {
                        gl.vertex_array_attrib_i_format(name, i, a.size, a.ty, 0);
                    } else {
                        gl.vertex_array_attrib_format(
                            name,
                            i,
                            a.size,
                            a.ty,
                            a.normalized as GLboolean,
                            0,
                        );
                    }
                    gl.vertex_array_attrib_binding(name, i, i);
                    gl.vertex_array_vertex_buffer(
                        name,
                        i,
                        vb,
                        a.offset as GLintptr,
                        a.stride as GLsizei,
                    );
                    if a.divisor > 0 {
                        gl.vertex_array_binding_divisor(name, i, a.divisor);
                    }
                }
                if vertex_array.index_buffer.is_some() {
                    gl.vertex_array_element_buffer(name, vertex_array.index_buffer_name());
                }
            }
        }

        Ok(vertex_array)
    }

    /// Compact ID, unique among live vertex arrays.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The vertex array object, 0 without vertex array objects.
    pub fn name(&self) -> GLuint {
        self.name
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn vertex_buffers(&self) -> &[VertexArrayVertexBuffer] {
        &self.vertex_buffers
    }

    pub fn index_buffer(&self) -> Option<&Rc<IndexBuffer>> {
        self.index_buffer.as_ref()
    }

    fn index_buffer_name(&self) -> GLuint {
        self.index_buffer
            .as_ref()
            .map(|ib| ib.raw().name())
            .unwrap_or(0)
    }

    /// Attribute pointers into the currently bound vertex array (or the default state).
    fn specify_attributes(&self, gl: &dyn GlApi) {
        let _restore = self.ctx.save_binding(Binding::Buffer(gl::ARRAY_BUFFER));
        let instanced_arrays = self.ctx.capabilities.instanced_arrays;
        for (i, a) in self.attributes.iter().enumerate() {
            let i = i as GLuint;
            let vb = self.vertex_buffers[a.input_slot].vertex_buffer.raw().name();
            gl.bind_buffer(gl::ARRAY_BUFFER, vb);
            if a.integer {
                gl.vertex_attrib_i_pointer(i, a.size, a.ty, a.stride as GLsizei, a.offset as usize);
            } else {
                gl.vertex_attrib_pointer(
                    i,
                    a.size,
                    a.ty,
                    a.normalized,
                    a.stride as GLsizei,
                    a.offset as usize,
                );
            }
            gl.enable_vertex_attrib_array(i);
            if instanced_arrays {
                gl.vertex_attrib_divisor(i, a.divisor);
            }
        }
    }

    /// Specifies and enables the attributes in the default vertex array state. Used when vertex
    /// array objects are not available.
    pub(crate) fn enable_attributes(&self) {
        debug_assert_eq!(self.mode, VertexArrayMode::NoVao);
        let gl = self.ctx.gl();
        self.specify_attributes(gl);
        gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, self.index_buffer_name());
    }

    /// Undoes `enable_attributes`.
    pub(crate) fn disable_attributes(&self) {
        debug_assert_eq!(self.mode, VertexArrayMode::NoVao);
        let gl = self.ctx.gl();
        let instanced_arrays = self.ctx.capabilities.instanced_arrays;
        for (i, a) in self.attributes.iter().enumerate() {
            gl.disable_vertex_attrib_array(i as GLuint);
            if instanced_arrays && a.divisor != 0 {
                gl.vertex_attrib_divisor(i as GLuint, 0);
            }
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        if self.name != 0 {
            self.ctx.state().forget_vertex_array(self.name);
            self.ctx.gl().delete_vertex_array(self.name);
        }
        self.ctx.destroy_id(IdKind::VertexArray, self.id);
    }
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VertexArray")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("attributes", &self.attributes)
            .field("vertex_buffers", &self.vertex_buffers)
            .field("index_buffer", &self.index_buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use crate::resource::BufferManager;
    use rhi::{BufferFlags, BufferUsage, IndexBufferFormat, VertexAttributeFormat};

    fn manager(gl: &Rc<RecordingGl>) -> (Rc<GlContext>, BufferManager) {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        let m = BufferManager::new(&ctx).unwrap();
        (ctx, m)
    }

    fn attributes() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute::new(VertexAttributeFormat::Float2, "Position", 0, 0, 16),
            VertexAttribute::new(VertexAttributeFormat::Float2, "TexCoord", 0, 8, 16),
        ]
    }

    fn buffers(m: &BufferManager) -> (Rc<VertexBuffer>, Rc<IndexBuffer>) {
        let vb = m
            .create_vertex_buffer(64, None, BufferFlags::empty(), BufferUsage::StaticDraw)
            .unwrap();
        let ib = m
            .create_index_buffer(
                12,
                None,
                BufferFlags::empty(),
                BufferUsage::StaticDraw,
                IndexBufferFormat::UnsignedShort,
            )
            .unwrap();
        (vb, ib)
    }

    #[test]
    fn dsa_vertex_arrays() {
        let gl = Rc::new(RecordingGl::new());
        let (ctx, m) = manager(&gl);
        let (vb, ib) = buffers(&m);
        gl.clear_calls();

        let va = m
            .create_vertex_array(
                &attributes(),
                vec![VertexArrayVertexBuffer::new(&vb)],
                Some(ib.clone()),
            )
            .unwrap();
        let name = va.name();
        let vbn = vb.raw().name();
        assert!(gl.contains(&format!("CreateVertexArrays({})", name)));
        assert!(gl.contains(&format!("VertexArrayAttribBinding({}, 1, 1)", name)));
        assert!(gl.contains(&format!("VertexArrayVertexBuffer({}, 1, {}, 8, 16)", name, vbn)));
        assert!(gl.contains(&format!(
            "VertexArrayElementBuffer({}, {})",
            name,
            ib.raw().name()
        )));
        assert_eq!(gl.count("BindVertexArray"), 0);

        // the vertex array holds a reference to its buffers
        assert_eq!(Rc::strong_count(&vb), 2);
        assert_eq!(Rc::strong_count(&ib), 2);
        let id = va.id();
        assert!(ctx.is_id(IdKind::VertexArray, id));
        drop(va);
        assert_eq!(Rc::strong_count(&vb), 1);
        assert!(!ctx.is_id(IdKind::VertexArray, id));
        assert!(gl.contains(&format!("DeleteVertexArrays({})", name)));
    }

    #[test]
    fn bound_vertex_arrays() {
        let gl = Rc::new(RecordingGl::new());
        gl.remove_extension("GL_ARB_direct_state_access");
        let (ctx, m) = manager(&gl);
        assert_eq!(ctx.strategies.vertex_array, VertexArrayMode::Vao);
        let (vb, ib) = buffers(&m);
        gl.clear_calls();

        let va = m
            .create_vertex_array(&attributes(), vec![VertexArrayVertexBuffer::new(&vb)], Some(ib))
            .unwrap();
        let name = va.name();
        let names = gl.names();
        assert_eq!(names[0], "GenVertexArrays");
        assert_eq!(names[1], "BindVertexArray");
        assert_eq!(gl.count("VertexAttribPointer"), 2);
        assert_eq!(gl.count("EnableVertexAttribArray"), 2);
        assert_eq!(ctx.state().vertex_array(), Some(name));
    }

    #[test]
    fn attributes_without_vertex_array_objects() {
        let gl = Rc::new(RecordingGl::legacy(2, 1, &["GL_ARB_vertex_buffer_object"]));
        let (ctx, m) = manager(&gl);
        assert_eq!(ctx.strategies.vertex_array, VertexArrayMode::NoVao);
        let (vb, ib) = buffers(&m);
        gl.clear_calls();

        let va = m
            .create_vertex_array(
                &attributes(),
                vec![VertexArrayVertexBuffer::new(&vb)],
                Some(ib.clone()),
            )
            .unwrap();
        assert_eq!(va.name(), 0);
        assert!(gl.calls().is_empty());

        va.enable_attributes();
        assert!(gl.contains(&format!(
            "VertexAttribPointer(1, 2, {}, false, 16, 8)",
            gl::FLOAT
        )));
        assert!(gl.contains(&format!(
            "BindBuffer({}, {})",
            gl::ELEMENT_ARRAY_BUFFER,
            ib.raw().name()
        )));
        gl.clear_calls();
        va.disable_attributes();
        assert_eq!(
            gl.names(),
            vec!["DisableVertexAttribArray", "DisableVertexAttribArray"]
        );
        drop(va);
        assert_eq!(gl.count("DeleteVertexArrays"), 0);
    }

    #[test]
    fn missing_vertex_buffer() {
        let gl = Rc::new(RecordingGl::new());
        let (_ctx, m) = manager(&gl);
        let mut attributes = attributes();
        attributes[1].input_slot = 1;
        let (vb, _) = buffers(&m);
        let err = m
            .create_vertex_array(&attributes, vec![VertexArrayVertexBuffer::new(&vb)], None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDescription(_)));
        assert_eq!(Rc::strong_count(&vb), 1);
    }
}
