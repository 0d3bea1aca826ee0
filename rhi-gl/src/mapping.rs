//! Description enums to OpenGL constants.
use crate::api as gl;
use crate::api::types::*;
use rhi::{
    Blend, BlendOp, BufferUsage, ComparisonFunc, FilterMode, IndexBufferFormat, MapType,
    PrimitiveTopology, TextureAddressMode, TextureFormat, VertexAttributeFormat,
};

pub fn comparison_func_to_gl(func: ComparisonFunc) -> GLenum {
    match func {
        ComparisonFunc::Never => gl::NEVER,
        ComparisonFunc::Less => gl::LESS,
        ComparisonFunc::Equal => gl::EQUAL,
        ComparisonFunc::LessEqual => gl::LEQUAL,
        ComparisonFunc::Greater => gl::GREATER,
        ComparisonFunc::NotEqual => gl::NOTEQUAL,
        ComparisonFunc::GreaterEqual => gl::GEQUAL,
        ComparisonFunc::Always => gl::ALWAYS,
    }
}

pub fn blend_to_gl(blend: Blend) -> GLenum {
    match blend {
        Blend::Zero => gl::ZERO,
        Blend::One => gl::ONE,
        Blend::SrcColor => gl::SRC_COLOR,
        Blend::InvSrcColor => gl::ONE_MINUS_SRC_COLOR,
        Blend::SrcAlpha => gl::SRC_ALPHA,
        Blend::InvSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        Blend::DestAlpha => gl::DST_ALPHA,
        Blend::InvDestAlpha => gl::ONE_MINUS_DST_ALPHA,
        Blend::DestColor => gl::DST_COLOR,
        Blend::InvDestColor => gl::ONE_MINUS_DST_COLOR,
        Blend::SrcAlphaSat => gl::SRC_ALPHA_SATURATE,
        Blend::BlendFactor => gl::CONSTANT_COLOR,
        Blend::InvBlendFactor => gl::ONE_MINUS_CONSTANT_COLOR,
        Blend::Src1Color => gl::SRC1_COLOR,
        Blend::InvSrc1Color => gl::ONE_MINUS_SRC1_COLOR,
        Blend::Src1Alpha => gl::SRC1_ALPHA,
        Blend::InvSrc1Alpha => gl::ONE_MINUS_SRC1_ALPHA,
    }
}

pub fn blend_op_to_gl(op: BlendOp) -> GLenum {
    match op {
        BlendOp::Add => gl::FUNC_ADD,
        BlendOp::Subtract => gl::FUNC_SUBTRACT,
        BlendOp::RevSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => gl::MIN,
        BlendOp::Max => gl::MAX,
    }
}

/// Primitive mode for draw calls. Patch lists map to `GL_PATCHES`, the number of control points
/// is set separately.
pub fn topology_to_gl(topology: PrimitiveTopology) -> GLenum {
    match topology {
        PrimitiveTopology::PointList => gl::POINTS,
        PrimitiveTopology::LineList => gl::LINES,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::TriangleList => gl::TRIANGLES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveTopology::PatchList(_) => gl::PATCHES,
    }
}

/// (minification filter, magnification filter)
pub fn filter_to_gl(filter: FilterMode, has_mipmaps: bool) -> (GLenum, GLenum) {
    use rhi::FilterMode::*;
    let (min_linear, mag_linear, mip_linear) = match filter {
        MinMagMipPoint | ComparisonMinMagMipPoint => (false, false, false),
        MinMagPointMipLinear | ComparisonMinMagPointMipLinear => (false, false, true),
        MinPointMagLinearMipPoint | ComparisonMinPointMagLinearMipPoint => (false, true, false),
        MinPointMagMipLinear | ComparisonMinPointMagMipLinear => (false, true, true),
        MinLinearMagMipPoint | ComparisonMinLinearMagMipPoint => (true, false, false),
        MinLinearMagPointMipLinear | ComparisonMinLinearMagPointMipLinear => (true, false, true),
        MinMagLinearMipPoint | ComparisonMinMagLinearMipPoint => (true, true, false),
        MinMagMipLinear | ComparisonMinMagMipLinear | Anisotropic | ComparisonAnisotropic => {
            (true, true, true)
        }
    };
    let min = match (min_linear, has_mipmaps, mip_linear) {
        (false, false, _) => gl::NEAREST,
        (true, false, _) => gl::LINEAR,
        (false, true, false) => gl::NEAREST_MIPMAP_NEAREST,
        (false, true, true) => gl::NEAREST_MIPMAP_LINEAR,
        (true, true, false) => gl::LINEAR_MIPMAP_NEAREST,
        (true, true, true) => gl::LINEAR_MIPMAP_LINEAR,
    };
    let mag = if mag_linear { gl::LINEAR } else { gl::NEAREST };
    (min, mag)
}

pub fn address_mode_to_gl(mode: TextureAddressMode) -> GLenum {
    match mode {
        TextureAddressMode::Wrap => gl::REPEAT,
        TextureAddressMode::Mirror => gl::MIRRORED_REPEAT,
        TextureAddressMode::Clamp => gl::CLAMP_TO_EDGE,
        TextureAddressMode::Border => gl::CLAMP_TO_BORDER,
        TextureAddressMode::MirrorOnce => gl::MIRROR_CLAMP_TO_EDGE,
    }
}

/// (internal format, pixel format, pixel type)
pub fn texture_format_to_gl(format: TextureFormat) -> (GLenum, GLenum, GLenum) {
    match format {
        TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        TextureFormat::R8G8B8A8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::R8G8B8A8Srgb => (gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::B8G8R8A8 => (gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
        TextureFormat::R11G11B10F => (
            gl::R11F_G11F_B10F,
            gl::RGB,
            gl::UNSIGNED_INT_10F_11F_11F_REV,
        ),
        TextureFormat::R16G16B16A16F => (gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
        TextureFormat::R32G32B32A32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
        TextureFormat::R16Unorm => (gl::R16, gl::RED, gl::UNSIGNED_SHORT),
        TextureFormat::R32Uint => (gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
        TextureFormat::R32Float => (gl::R32F, gl::RED, gl::FLOAT),
        TextureFormat::D32Float => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    }
}

pub fn index_format_to_gl(format: IndexBufferFormat) -> GLenum {
    match format {
        IndexBufferFormat::UnsignedChar => gl::UNSIGNED_BYTE,
        IndexBufferFormat::UnsignedShort => gl::UNSIGNED_SHORT,
        IndexBufferFormat::UnsignedInt => gl::UNSIGNED_INT,
    }
}

/// (component count, component type, normalized)
pub fn vertex_attribute_format_to_gl(format: VertexAttributeFormat) -> (GLint, GLenum, bool) {
    let ty = match format {
        VertexAttributeFormat::Float1
        | VertexAttributeFormat::Float2
        | VertexAttributeFormat::Float3
        | VertexAttributeFormat::Float4 => gl::FLOAT,
        VertexAttributeFormat::R8G8B8A8Unorm | VertexAttributeFormat::R8G8B8A8Uint => {
            gl::UNSIGNED_BYTE
        }
        VertexAttributeFormat::Short2 | VertexAttributeFormat::Short4 => gl::SHORT,
        VertexAttributeFormat::Uint1 => gl::UNSIGNED_INT,
    };
    (
        format.number_of_components() as GLint,
        ty,
        format.is_normalized(),
    )
}

pub fn buffer_usage_to_gl(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StreamDraw => gl::STREAM_DRAW,
        BufferUsage::StreamRead => gl::STREAM_READ,
        BufferUsage::StreamCopy => gl::STREAM_COPY,
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::StaticRead => gl::STATIC_READ,
        BufferUsage::StaticCopy => gl::STATIC_COPY,
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
        BufferUsage::DynamicRead => gl::DYNAMIC_READ,
        BufferUsage::DynamicCopy => gl::DYNAMIC_COPY,
    }
}

/// Access mode for `glMapBuffer`.
pub fn map_type_to_gl(map_type: MapType) -> GLenum {
    match map_type {
        MapType::Read => gl::READ_ONLY,
        MapType::Write | MapType::WriteDiscard | MapType::WriteNoOverwrite => gl::WRITE_ONLY,
        MapType::ReadWrite => gl::READ_WRITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters() {
        assert_eq!(
            filter_to_gl(FilterMode::MinMagMipLinear, true),
            (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR)
        );
        assert_eq!(
            filter_to_gl(FilterMode::MinMagMipLinear, false),
            (gl::LINEAR, gl::LINEAR)
        );
        assert_eq!(
            filter_to_gl(FilterMode::ComparisonMinPointMagLinearMipPoint, true),
            (gl::NEAREST_MIPMAP_NEAREST, gl::LINEAR)
        );
    }

    #[test]
    fn patches() {
        assert_eq!(topology_to_gl(PrimitiveTopology::PatchList(4)), gl::PATCHES);
        assert_eq!(topology_to_gl(PrimitiveTopology::TriangleStrip), gl::TRIANGLE_STRIP);
    }

    #[test]
    fn vertex_formats() {
        assert_eq!(
            vertex_attribute_format_to_gl(VertexAttributeFormat::R8G8B8A8Unorm),
            (4, gl::UNSIGNED_BYTE, true)
        );
        assert_eq!(
            vertex_attribute_format_to_gl(VertexAttributeFormat::Float3),
            (3, gl::FLOAT, false)
        );
    }
}
