//! Objects created by the backend.
//!
//! Every object is held through an `Rc`; the `Rc` count is the reference count. Command buffers
//! store them as `GlResource`, which is the `Resource` type of the `OpenGl` backend.
use crate::pipeline::{ComputePipelineState, GraphicsPipelineState};
use crate::resource_group::ResourceGroup;
use crate::root_signature::RootSignature;
use crate::shader::{GraphicsProgram, Shader};
use rhi::ResourceType;
use std::rc::Rc;

pub mod buffer;
pub mod framebuffer;
pub mod query_pool;
pub mod render_pass;
pub mod sampler;
pub mod swap_chain;
pub mod texture;
pub mod vertex_array;

pub use self::buffer::{
    BufferManager, IndexBuffer, IndirectBuffer, RawBuffer, StructuredBuffer, TextureBuffer,
    UniformBuffer, VertexBuffer,
};
pub use self::framebuffer::{Framebuffer, FramebufferAttachment};
pub use self::query_pool::QueryPool;
pub use self::render_pass::RenderPass;
pub use self::sampler::SamplerState;
pub use self::swap_chain::SwapChain;
pub use self::texture::{Texture, TextureDesc, TextureManager};
pub use self::vertex_array::{VertexArray, VertexArrayVertexBuffer};

/// Reference to any backend object.
#[derive(Clone, Debug)]
pub enum GlResource {
    RootSignature(Rc<RootSignature>),
    ResourceGroup(Rc<ResourceGroup>),
    GraphicsProgram(Rc<GraphicsProgram>),
    VertexArray(Rc<VertexArray>),
    RenderPass(Rc<RenderPass>),
    QueryPool(Rc<QueryPool>),
    SwapChain(Rc<SwapChain>),
    Framebuffer(Rc<Framebuffer>),
    IndexBuffer(Rc<IndexBuffer>),
    VertexBuffer(Rc<VertexBuffer>),
    TextureBuffer(Rc<TextureBuffer>),
    StructuredBuffer(Rc<StructuredBuffer>),
    IndirectBuffer(Rc<IndirectBuffer>),
    UniformBuffer(Rc<UniformBuffer>),
    Texture(Rc<Texture>),
    GraphicsPipelineState(Rc<GraphicsPipelineState>),
    ComputePipelineState(Rc<ComputePipelineState>),
    SamplerState(Rc<SamplerState>),
    Shader(Rc<Shader>),
}

impl GlResource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            GlResource::RootSignature(_) => ResourceType::RootSignature,
            GlResource::ResourceGroup(_) => ResourceType::ResourceGroup,
            GlResource::GraphicsProgram(_) => ResourceType::GraphicsProgram,
            GlResource::VertexArray(_) => ResourceType::VertexArray,
            GlResource::RenderPass(_) => ResourceType::RenderPass,
            GlResource::QueryPool(_) => ResourceType::QueryPool,
            GlResource::SwapChain(_) => ResourceType::SwapChain,
            GlResource::Framebuffer(_) => ResourceType::Framebuffer,
            GlResource::IndexBuffer(_) => ResourceType::IndexBuffer,
            GlResource::VertexBuffer(_) => ResourceType::VertexBuffer,
            GlResource::TextureBuffer(_) => ResourceType::TextureBuffer,
            GlResource::StructuredBuffer(_) => ResourceType::StructuredBuffer,
            GlResource::IndirectBuffer(_) => ResourceType::IndirectBuffer,
            GlResource::UniformBuffer(_) => ResourceType::UniformBuffer,
            GlResource::Texture(t) => t.resource_type(),
            GlResource::GraphicsPipelineState(_) => ResourceType::GraphicsPipelineState,
            GlResource::ComputePipelineState(_) => ResourceType::ComputePipelineState,
            GlResource::SamplerState(_) => ResourceType::SamplerState,
            GlResource::Shader(s) => s.resource_type(),
        }
    }

    /// The underlying buffer object of the raw buffer kinds.
    pub fn raw_buffer(&self) -> Option<&RawBuffer> {
        match self {
            GlResource::IndexBuffer(b) => Some(b.raw()),
            GlResource::VertexBuffer(b) => Some(b.raw()),
            GlResource::TextureBuffer(b) => Some(b.raw()),
            GlResource::StructuredBuffer(b) => Some(b.raw()),
            GlResource::IndirectBuffer(b) => Some(b.raw()),
            GlResource::UniformBuffer(b) => Some(b.raw()),
            _ => None,
        }
    }

    /// Strong count of the referenced object.
    pub fn reference_count(&self) -> usize {
        match self {
            GlResource::RootSignature(r) => Rc::strong_count(r),
            GlResource::ResourceGroup(r) => Rc::strong_count(r),
            GlResource::GraphicsProgram(r) => Rc::strong_count(r),
            GlResource::VertexArray(r) => Rc::strong_count(r),
            GlResource::RenderPass(r) => Rc::strong_count(r),
            GlResource::QueryPool(r) => Rc::strong_count(r),
            GlResource::SwapChain(r) => Rc::strong_count(r),
            GlResource::Framebuffer(r) => Rc::strong_count(r),
            GlResource::IndexBuffer(r) => Rc::strong_count(r),
            GlResource::VertexBuffer(r) => Rc::strong_count(r),
            GlResource::TextureBuffer(r) => Rc::strong_count(r),
            GlResource::StructuredBuffer(r) => Rc::strong_count(r),
            GlResource::IndirectBuffer(r) => Rc::strong_count(r),
            GlResource::UniformBuffer(r) => Rc::strong_count(r),
            GlResource::Texture(r) => Rc::strong_count(r),
            GlResource::GraphicsPipelineState(r) => Rc::strong_count(r),
            GlResource::ComputePipelineState(r) => Rc::strong_count(r),
            GlResource::SamplerState(r) => Rc::strong_count(r),
            GlResource::Shader(r) => Rc::strong_count(r),
        }
    }
}

macro_rules! impl_from_rc {
    ($($variant:ident($ty:ty),)*) => {
        $(
            impl From<Rc<$ty>> for GlResource {
                fn from(r: Rc<$ty>) -> GlResource {
                    GlResource::$variant(r)
                }
            }

            impl<'a> From<&'a Rc<$ty>> for GlResource {
                fn from(r: &'a Rc<$ty>) -> GlResource {
                    GlResource::$variant(r.clone())
                }
            }
        )*
    };
}

impl_from_rc! {
    RootSignature(RootSignature),
    ResourceGroup(ResourceGroup),
    GraphicsProgram(GraphicsProgram),
    VertexArray(VertexArray),
    RenderPass(RenderPass),
    QueryPool(QueryPool),
    SwapChain(SwapChain),
    Framebuffer(Framebuffer),
    IndexBuffer(IndexBuffer),
    VertexBuffer(VertexBuffer),
    TextureBuffer(TextureBuffer),
    StructuredBuffer(StructuredBuffer),
    IndirectBuffer(IndirectBuffer),
    UniformBuffer(UniformBuffer),
    Texture(Texture),
    GraphicsPipelineState(GraphicsPipelineState),
    ComputePipelineState(ComputePipelineState),
    SamplerState(SamplerState),
    Shader(Shader),
}

impl<'a> From<&'a GlResource> for GlResource {
    fn from(r: &'a GlResource) -> GlResource {
        r.clone()
    }
}
