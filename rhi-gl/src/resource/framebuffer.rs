//! Framebuffer objects with texture attachments.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::native::GlApi;
use crate::resource::render_pass::RenderPass;
use crate::resource::texture::Texture;
use crate::strategy::DsaMode;
use rhi::{Error, ResourceType, Result};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// A texture mip level, or one layer of it, used as a render target.
#[derive(Clone, Debug)]
pub struct FramebufferAttachment {
    pub texture: Rc<Texture>,
    pub mipmap_index: u32,
    /// Array layer or cube face; ignored for textures without layers.
    pub layer_index: u32,
}

impl FramebufferAttachment {
    pub fn new(texture: &Rc<Texture>) -> FramebufferAttachment {
        FramebufferAttachment {
            texture: texture.clone(),
            mipmap_index: 0,
            layer_index: 0,
        }
    }

    fn extent(&self) -> (u32, u32) {
        (
            (self.texture.width() >> self.mipmap_index).max(1),
            (self.texture.height() >> self.mipmap_index).max(1),
        )
    }
}

pub struct Framebuffer {
    ctx: Rc<GlContext>,
    name: GLuint,
    render_pass: Rc<RenderPass>,
    color_attachments: SmallVec<[FramebufferAttachment; 8]>,
    depth_stencil_attachment: Option<FramebufferAttachment>,
    width: u32,
    height: u32,
}

/// Attaches one texture to `point` of `framebuffer` (the bound draw framebuffer on the bind
/// path).
fn attach(
    gl: &dyn GlApi,
    dsa: DsaMode,
    framebuffer: GLuint,
    point: GLenum,
    a: &FramebufferAttachment,
) {
    let texture = a.texture.name();
    let level = a.mipmap_index as GLint;
    let layer = a.layer_index as GLint;
    let cube = a.texture.resource_type() == ResourceType::TextureCube;
    match dsa {
        DsaMode::Arb if a.texture.is_layered() => {
            gl.named_framebuffer_texture_layer(framebuffer, point, texture, level, layer)
        }
        DsaMode::Arb => gl.named_framebuffer_texture(framebuffer, point, texture, level),
        DsaMode::Ext if cube => gl.named_framebuffer_texture_2d_ext(
            framebuffer,
            point,
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + a.layer_index,
            texture,
            level,
        ),
        DsaMode::Ext if a.texture.is_layered() => {
            gl.named_framebuffer_texture_layer_ext(framebuffer, point, texture, level, layer)
        }
        DsaMode::Ext => gl.named_framebuffer_texture_2d_ext(
            framebuffer,
            point,
            a.texture.target(),
            texture,
            level,
        ),
        DsaMode::Bind if cube => gl.framebuffer_texture_2d(
            gl::DRAW_FRAMEBUFFER,
            point,
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + a.layer_index,
            texture,
            level,
        ),
        DsaMode::Bind if a.texture.is_layered() => {
            gl.framebuffer_texture_layer(gl::DRAW_FRAMEBUFFER, point, texture, level, layer)
        }
        DsaMode::Bind => gl.framebuffer_texture_2d(
            gl::DRAW_FRAMEBUFFER,
            point,
            a.texture.target(),
            texture,
            level,
        ),
    }
}

impl Framebuffer {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        render_pass: &Rc<RenderPass>,
        color_attachments: &[FramebufferAttachment],
        depth_stencil_attachment: Option<&FramebufferAttachment>,
    ) -> Result<Framebuffer> {
        if !ctx.extensions.arb_framebuffer_object() {
            error!("framebuffer objects are not supported by this context");
            return Err(Error::unsupported("GL_ARB_framebuffer_object"));
        }
        debug_assert_eq!(
            color_attachments.len(),
            render_pass.number_of_color_attachments(),
            "color attachment count does not match the render pass"
        );
        debug_assert_eq!(
            depth_stencil_attachment.is_some(),
            render_pass.depth_stencil_attachment_format().is_some(),
            "depth-stencil attachment does not match the render pass"
        );
        if color_attachments.is_empty() && depth_stencil_attachment.is_none() {
            return Err(Error::InvalidDescription("framebuffer without attachments"));
        }

        let (width, height) = color_attachments
            .iter()
            .chain(depth_stencil_attachment)
            .map(FramebufferAttachment::extent)
            .fold((u32::max_value(), u32::max_value()), |(w, h), (aw, ah)| {
                (w.min(aw), h.min(ah))
            });

        let mut draw_buffers: SmallVec<[GLenum; 8]> = (0..color_attachments.len())
            .map(|i| gl::COLOR_ATTACHMENT0 + i as GLenum)
            .collect();
        if draw_buffers.is_empty() {
            draw_buffers.push(gl::NONE);
        }

        let gl = ctx.gl();
        let dsa = ctx.strategies.dsa;
        let attach_all = |framebuffer: GLuint| {
            for (i, a) in color_attachments.iter().enumerate() {
                attach(gl, dsa, framebuffer, gl::COLOR_ATTACHMENT0 + i as GLenum, a);
            }
            if let Some(a) = depth_stencil_attachment {
                attach(gl, dsa, framebuffer, gl::DEPTH_ATTACHMENT, a);
            }
        };

        let (name, status) = match dsa {
            DsaMode::Arb => {
                let name = gl.create_framebuffer();
                attach_all(name);
                gl.named_framebuffer_draw_buffers(name, &draw_buffers);
                (
                    name,
                    gl.check_named_framebuffer_status(name, gl::DRAW_FRAMEBUFFER),
                )
            }
            DsaMode::Ext => {
                let name = gl.gen_framebuffer();
                attach_all(name);
                gl.framebuffer_draw_buffers_ext(name, &draw_buffers);
                (
                    name,
                    gl.check_named_framebuffer_status_ext(name, gl::DRAW_FRAMEBUFFER),
                )
            }
            DsaMode::Bind => {
                let name = gl.gen_framebuffer();
                let previous = {
                    let mut state = ctx.state();
                    let previous = state.draw_framebuffer();
                    state.bind_draw_framebuffer(gl, name);
                    previous
                };
                attach_all(name);
                gl.draw_buffers(&draw_buffers);
                let status = gl.check_framebuffer_status(gl::DRAW_FRAMEBUFFER);
                if let (true, Some(previous)) = (ctx.restore_state(), previous) {
                    ctx.state().bind_draw_framebuffer(gl, previous);
                }
                (name, status)
            }
        };

        if status != gl::FRAMEBUFFER_COMPLETE {
            error!("framebuffer {} is incomplete: 0x{:X}", name, status);
            ctx.state().forget_framebuffer(name);
            gl.delete_framebuffer(name);
            return Err(Error::IncompleteFramebuffer(status));
        }

        Ok(Framebuffer {
            ctx: ctx.clone(),
            name,
            render_pass: render_pass.clone(),
            color_attachments: color_attachments.iter().cloned().collect(),
            depth_stencil_attachment: depth_stencil_attachment.cloned(),
            width,
            height,
        })
    }

    pub fn name(&self) -> GLuint {
        self.name
    }

    pub fn render_pass(&self) -> &Rc<RenderPass> {
        &self.render_pass
    }

    pub fn color_attachments(&self) -> &[FramebufferAttachment] {
        &self.color_attachments
    }

    pub fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    /// Smallest extent of all attachments.
    pub fn width_and_height(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_multisample(&self) -> bool {
        self.color_attachments
            .iter()
            .chain(self.depth_stencil_attachment.as_ref())
            .any(|a| a.texture.is_multisample())
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.ctx.state().forget_framebuffer(self.name);
        self.ctx.gl().delete_framebuffer(self.name);
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_attachments", &self.color_attachments)
            .field("depth_stencil_attachment", &self.depth_stencil_attachment)
            .finish()
    }
}
