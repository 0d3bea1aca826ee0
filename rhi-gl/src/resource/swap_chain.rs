//! Swap chains: the default framebuffer of a native context.
use crate::context::GlContext;
use crate::native::NativeContext;
use crate::resource::render_pass::RenderPass;
use std::fmt;
use std::rc::Rc;

pub struct SwapChain {
    ctx: Rc<GlContext>,
    render_pass: Rc<RenderPass>,
    context: Rc<dyn NativeContext>,
}

impl SwapChain {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        render_pass: Rc<RenderPass>,
        context: Rc<dyn NativeContext>,
    ) -> SwapChain {
        SwapChain {
            ctx: ctx.clone(),
            render_pass,
            context,
        }
    }

    pub fn render_pass(&self) -> &Rc<RenderPass> {
        &self.render_pass
    }

    /// Size of the back buffer in pixels.
    pub fn width_and_height(&self) -> (u32, u32) {
        self.context.framebuffer_size()
    }

    /// Swaps the front and back buffers. Does nothing with an external context, which is
    /// presented by its owner.
    pub fn present(&self) {
        if self.ctx.config.use_external_context {
            trace!("present: external context");
            return;
        }
        self.context.swap_buffers();
    }
}

impl fmt::Debug for SwapChain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SwapChain")
            .field("render_pass", &self.render_pass)
            .field("size", &self.width_and_height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use rhi::TextureFormat;

    #[test]
    fn present_swaps_unless_external() {
        for &external in &[false, true] {
            let gl = Rc::new(RecordingGl::new());
            let ext = Extensions::detect(&*gl, &*gl, "");
            let config = BackendConfig {
                use_external_context: external,
                ..BackendConfig::default()
            };
            let ctx = Rc::new(GlContext::new(gl.clone(), ext, config));
            let rp = Rc::new(RenderPass::new(&ctx, &[TextureFormat::R8G8B8A8], None, 1).unwrap());
            let sc = SwapChain::new(&ctx, rp.clone(), gl.clone());
            assert_eq!(Rc::strong_count(&rp), 2);
            assert_eq!(sc.width_and_height(), (1280, 720));
            sc.present();
            assert_eq!(gl.count("SwapBuffers"), if external { 0 } else { 1 });
        }
    }
}
