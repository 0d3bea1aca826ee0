//! Render passes: the attachment layout a framebuffer or swap chain renders into.
use crate::context::GlContext;
use rhi::{Error, Result, TextureFormat};
use smallvec::SmallVec;
use std::rc::Rc;

#[derive(Debug)]
pub struct RenderPass {
    color_attachment_formats: SmallVec<[TextureFormat; 8]>,
    depth_stencil_attachment_format: Option<TextureFormat>,
    number_of_multisamples: u8,
}

impl RenderPass {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        color_attachment_formats: &[TextureFormat],
        depth_stencil_attachment_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> Result<RenderPass> {
        let max = ctx.capabilities.maximum_number_of_simultaneous_render_targets as usize;
        if color_attachment_formats.len() > max {
            error!(
                "render pass with {} color attachments, the context supports {}",
                color_attachment_formats.len(),
                max
            );
            return Err(Error::InvalidDescription("too many color attachments"));
        }
        if color_attachment_formats.iter().any(|f| f.is_depth()) {
            return Err(Error::InvalidDescription(
                "depth format used as a color attachment",
            ));
        }
        if let Some(format) = depth_stencil_attachment_format {
            if !format.is_depth() {
                return Err(Error::InvalidDescription(
                    "color format used as the depth-stencil attachment",
                ));
            }
        }
        if number_of_multisamples == 0
            || u32::from(number_of_multisamples) > ctx.capabilities.maximum_number_of_multisamples
        {
            return Err(Error::InvalidDescription("unsupported number of multisamples"));
        }
        Ok(RenderPass {
            color_attachment_formats: color_attachment_formats.iter().cloned().collect(),
            depth_stencil_attachment_format,
            number_of_multisamples,
        })
    }

    pub fn number_of_color_attachments(&self) -> usize {
        self.color_attachment_formats.len()
    }

    pub fn color_attachment_formats(&self) -> &[TextureFormat] {
        &self.color_attachment_formats
    }

    pub fn depth_stencil_attachment_format(&self) -> Option<TextureFormat> {
        self.depth_stencil_attachment_format
    }

    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;

    fn context() -> Rc<GlContext> {
        let gl = Rc::new(RecordingGl::new());
        let ext = Extensions::detect(&*gl, &*gl, "");
        Rc::new(GlContext::new(gl, ext, BackendConfig::default()))
    }

    #[test]
    fn attachment_limits() {
        let ctx = context();
        let rp = RenderPass::new(
            &ctx,
            &[TextureFormat::R8G8B8A8, TextureFormat::R16G16B16A16F],
            Some(TextureFormat::D32Float),
            1,
        )
        .unwrap();
        assert_eq!(rp.number_of_color_attachments(), 2);
        assert_eq!(rp.depth_stencil_attachment_format(), Some(TextureFormat::D32Float));

        let too_many = [TextureFormat::R8; 9];
        assert!(RenderPass::new(&ctx, &too_many, None, 1).is_err());
        assert!(RenderPass::new(&ctx, &[TextureFormat::D32Float], None, 1).is_err());
        assert!(RenderPass::new(&ctx, &[TextureFormat::R8], None, 16).is_err());
    }
}
