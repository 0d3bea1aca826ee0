//! Resource kinds.

/// Every kind of object a backend can create.
///
/// The binding engine dispatches on this to decide which native binding namespace
/// (texture unit, image unit, uniform buffer binding point, shader storage binding point) a
/// resource lands in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ResourceType {
    RootSignature,
    ResourceGroup,
    GraphicsProgram,
    VertexArray,
    RenderPass,
    QueryPool,
    SwapChain,
    Framebuffer,
    IndexBuffer,
    VertexBuffer,
    TextureBuffer,
    StructuredBuffer,
    IndirectBuffer,
    UniformBuffer,
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    GraphicsPipelineState,
    ComputePipelineState,
    SamplerState,
    VertexShader,
    TessellationControlShader,
    TessellationEvaluationShader,
    GeometryShader,
    FragmentShader,
    TaskShader,
    MeshShader,
    ComputeShader,
}

impl ResourceType {
    /// Texture-like resources, including buffer textures.
    pub fn is_texture(self) -> bool {
        match self {
            ResourceType::TextureBuffer
            | ResourceType::Texture1D
            | ResourceType::Texture1DArray
            | ResourceType::Texture2D
            | ResourceType::Texture2DArray
            | ResourceType::Texture3D
            | ResourceType::TextureCube
            | ResourceType::TextureCubeArray => true,
            _ => false,
        }
    }

    /// Buffers that are visible to shaders as raw bytes (shader storage buffers).
    pub fn is_raw_buffer(self) -> bool {
        match self {
            ResourceType::VertexBuffer
            | ResourceType::IndexBuffer
            | ResourceType::StructuredBuffer
            | ResourceType::IndirectBuffer
            | ResourceType::UniformBuffer => true,
            _ => false,
        }
    }

    /// Whether a sampler bound next to this texture has any effect.
    ///
    /// Buffer textures are fetched with `texelFetch` only.
    pub fn has_sampler(self) -> bool {
        self.is_texture() && self != ResourceType::TextureBuffer
    }

    pub fn is_shader(self) -> bool {
        match self {
            ResourceType::VertexShader
            | ResourceType::TessellationControlShader
            | ResourceType::TessellationEvaluationShader
            | ResourceType::GeometryShader
            | ResourceType::FragmentShader
            | ResourceType::TaskShader
            | ResourceType::MeshShader
            | ResourceType::ComputeShader => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_textures_have_no_sampler() {
        assert!(ResourceType::TextureBuffer.is_texture());
        assert!(!ResourceType::TextureBuffer.has_sampler());
        assert!(ResourceType::TextureCubeArray.has_sampler());
        assert!(!ResourceType::UniformBuffer.is_texture());
        assert!(ResourceType::UniformBuffer.is_raw_buffer());
        assert!(!ResourceType::SamplerState.is_raw_buffer());
    }
}
