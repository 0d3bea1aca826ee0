//! Fixed-function state descriptions, draw arguments and other plain description types.
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use ordered_float::NotNan;
use std::mem;

//--------------------------------------------------------------------------------------------------
// Rasterizer

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FillMode {
    Wireframe,
    Solid,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: NotNan<f32>,
    pub slope_scaled_depth_bias: NotNan<f32>,
    pub depth_clip_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
    pub scissor_enable: bool,
}

impl RasterizerState {
    pub const DEFAULT: RasterizerState = RasterizerState {
        fill_mode: FillMode::Solid,
        cull_mode: CullMode::Back,
        front_counter_clockwise: false,
        depth_bias: 0,
        depth_bias_clamp: unsafe { mem::transmute(0.0f32) },
        slope_scaled_depth_bias: unsafe { mem::transmute(0.0f32) },
        depth_clip_enable: true,
        multisample_enable: false,
        antialiased_line_enable: false,
        scissor_enable: false,
    };
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//--------------------------------------------------------------------------------------------------
// Depth-stencil

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ComparisonFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DepthWriteMask {
    Zero,
    All,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write_mask: DepthWriteMask,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        DepthStencilState {
            depth_enable: true,
            depth_write_mask: DepthWriteMask::All,
            depth_func: ComparisonFunc::Greater,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Blend

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Blend {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
    BlendFactor,
    InvBlendFactor,
    Src1Color,
    InvSrc1Color,
    Src1Alpha,
    InvSrc1Alpha,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    RevSubtract,
    Min,
    Max,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub src_blend: Blend,
    pub dest_blend: Blend,
    pub blend_op: BlendOp,
    pub src_blend_alpha: Blend,
    pub dest_blend_alpha: Blend,
    pub blend_op_alpha: BlendOp,
    pub render_target_write_mask: u8,
}

impl Default for RenderTargetBlendDesc {
    fn default() -> Self {
        RenderTargetBlendDesc {
            blend_enable: false,
            src_blend: Blend::One,
            dest_blend: Blend::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: Blend::One,
            dest_blend_alpha: Blend::Zero,
            blend_op_alpha: BlendOp::Add,
            render_target_write_mask: 0xf,
        }
    }
}

pub const MAX_RENDER_TARGETS: usize = 8;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlendDesc; MAX_RENDER_TARGETS],
}

//--------------------------------------------------------------------------------------------------
// Samplers

/// Texture filtering, in the Direct3D naming scheme (minification, magnification, mip).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilterMode {
    MinMagMipPoint,
    MinMagPointMipLinear,
    MinPointMagLinearMipPoint,
    MinPointMagMipLinear,
    MinLinearMagMipPoint,
    MinLinearMagPointMipLinear,
    MinMagLinearMipPoint,
    MinMagMipLinear,
    Anisotropic,
    ComparisonMinMagMipPoint,
    ComparisonMinMagPointMipLinear,
    ComparisonMinPointMagLinearMipPoint,
    ComparisonMinPointMagMipLinear,
    ComparisonMinLinearMagMipPoint,
    ComparisonMinLinearMagPointMipLinear,
    ComparisonMinMagLinearMipPoint,
    ComparisonMinMagMipLinear,
    ComparisonAnisotropic,
}

impl FilterMode {
    pub fn is_comparison(self) -> bool {
        match self {
            FilterMode::ComparisonMinMagMipPoint
            | FilterMode::ComparisonMinMagPointMipLinear
            | FilterMode::ComparisonMinPointMagLinearMipPoint
            | FilterMode::ComparisonMinPointMagMipLinear
            | FilterMode::ComparisonMinLinearMagMipPoint
            | FilterMode::ComparisonMinLinearMagPointMipLinear
            | FilterMode::ComparisonMinMagLinearMipPoint
            | FilterMode::ComparisonMinMagMipLinear
            | FilterMode::ComparisonAnisotropic => true,
            _ => false,
        }
    }

    pub fn is_anisotropic(self) -> bool {
        self == FilterMode::Anisotropic || self == FilterMode::ComparisonAnisotropic
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
    MirrorOnce,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SamplerStateDesc {
    pub filter: FilterMode,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: NotNan<f32>,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [NotNan<f32>; 4],
    pub min_lod: NotNan<f32>,
    pub max_lod: NotNan<f32>,
}

impl Default for SamplerStateDesc {
    fn default() -> Self {
        SamplerStateDesc {
            filter: FilterMode::MinMagMipLinear,
            address_u: TextureAddressMode::Clamp,
            address_v: TextureAddressMode::Clamp,
            address_w: TextureAddressMode::Clamp,
            mip_lod_bias: 0.0.into(),
            max_anisotropy: 16,
            comparison_func: ComparisonFunc::Never,
            border_color: [0.0.into(); 4],
            min_lod: (-std::f32::MAX).into(),
            max_lod: std::f32::MAX.into(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Primitive topology

/// Primitive topology of a graphics pipeline.
///
/// `PatchList(n)` is a tessellation patch with `n` control points (1 to 32).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    PatchList(u8),
}

impl PrimitiveTopology {
    pub const MAX_PATCH_CONTROL_POINTS: u8 = 32;

    /// Number of control points if this is a patch list.
    pub fn patch_vertices(self) -> Option<u32> {
        match self {
            PrimitiveTopology::PatchList(n) => Some(u32::from(n)),
            _ => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Viewports and scissors

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl From<(u32, u32)> for Viewport {
    fn from((w, h): (u32, u32)) -> Self {
        Viewport {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: w as f32,
            height: h as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
pub struct ScissorRectangle {
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub bottom_right_x: i32,
    pub bottom_right_y: i32,
}

bitflags! {
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const COLOR_DEPTH = Self::COLOR.bits | Self::DEPTH.bits;
    }
}

//--------------------------------------------------------------------------------------------------
// Draw arguments; the layouts match what indirect buffers contain.

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct DrawArguments {
    pub vertex_count_per_instance: u32,
    pub instance_count: u32,
    pub start_vertex_location: u32,
    pub start_instance_location: u32,
}

impl DrawArguments {
    pub fn new(vertex_count_per_instance: u32) -> DrawArguments {
        DrawArguments {
            vertex_count_per_instance,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

impl DrawIndexedArguments {
    pub fn new(index_count_per_instance: u32) -> DrawIndexedArguments {
        DrawIndexedArguments {
            index_count_per_instance,
            instance_count: 1,
            start_index_location: 0,
            base_vertex_location: 0,
            start_instance_location: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct DrawMeshTasksArguments {
    pub number_of_tasks: u32,
    pub first_task: u32,
}

//--------------------------------------------------------------------------------------------------
// Resource access

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapType {
    Read,
    Write,
    ReadWrite,
    WriteDiscard,
    WriteNoOverwrite,
}

/// CPU view of a mapped buffer or texture subresource.
#[derive(Copy, Clone, Debug)]
pub struct MappedSubresource {
    pub data: *mut u8,
    pub row_pitch: u32,
    pub depth_pitch: u32,
}

impl MappedSubresource {
    pub fn empty() -> MappedSubresource {
        MappedSubresource {
            data: std::ptr::null_mut(),
            row_pitch: 0,
            depth_pitch: 0,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Queries

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum QueryType {
    Occlusion,
    PipelineStatistics,
    Timestamp,
}

impl QueryType {
    /// Size of one query result as written by `get_query_pool_results`.
    pub fn result_size(self) -> usize {
        match self {
            QueryType::Occlusion | QueryType::Timestamp => mem::size_of::<u64>(),
            QueryType::PipelineStatistics => mem::size_of::<PipelineStatisticsQueryResult>(),
        }
    }
}

bitflags! {
    pub struct QueryResultFlags: u32 {
        /// Block until the results are available.
        const WAIT = 1 << 0;
    }
}

bitflags! {
    pub struct QueryControlFlags: u32 {
        const PRECISE_OCCLUSION = 1 << 0;
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct PipelineStatisticsQueryResult {
    pub input_assembler_vertices: u64,
    pub input_assembler_primitives: u64,
    pub vertex_shader_invocations: u64,
    pub geometry_shader_invocations: u64,
    pub geometry_shader_primitives: u64,
    pub clipping_input_primitives: u64,
    pub clipping_output_primitives: u64,
    pub fragment_shader_invocations: u64,
    pub hull_shader_invocations: u64,
    pub domain_shader_invocations: u64,
    pub compute_shader_invocations: u64,
}

//--------------------------------------------------------------------------------------------------
// Buffers and vertex input

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    StreamDraw,
    StreamRead,
    StreamCopy,
    StaticDraw,
    StaticRead,
    StaticCopy,
    DynamicDraw,
    DynamicRead,
    DynamicCopy,
}

impl Default for BufferUsage {
    fn default() -> Self {
        BufferUsage::StaticDraw
    }
}

bitflags! {
    #[derive(Default)]
    pub struct BufferFlags: u32 {
        const UNORDERED_ACCESS = 1 << 0;
        const SHADER_RESOURCE = 1 << 1;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct IndirectBufferFlags: u32 {
        const UNORDERED_ACCESS = 1 << 0;
        const SHADER_RESOURCE = 1 << 1;
        const DRAW_ARGUMENTS = 1 << 2;
        const DRAW_INDEXED_ARGUMENTS = 1 << 3;
        const DRAW_MESH_TASKS_ARGUMENTS = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IndexBufferFormat {
    UnsignedChar,
    UnsignedShort,
    UnsignedInt,
}

impl IndexBufferFormat {
    pub fn bytes_per_element(self) -> u32 {
        match self {
            IndexBufferFormat::UnsignedChar => 1,
            IndexBufferFormat::UnsignedShort => 2,
            IndexBufferFormat::UnsignedInt => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VertexAttributeFormat {
    Float1,
    Float2,
    Float3,
    Float4,
    R8G8B8A8Unorm,
    R8G8B8A8Uint,
    Short2,
    Short4,
    Uint1,
}

impl VertexAttributeFormat {
    pub fn number_of_components(self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 | VertexAttributeFormat::Uint1 => 1,
            VertexAttributeFormat::Float2 | VertexAttributeFormat::Short2 => 2,
            VertexAttributeFormat::Float3 => 3,
            VertexAttributeFormat::Float4
            | VertexAttributeFormat::R8G8B8A8Unorm
            | VertexAttributeFormat::R8G8B8A8Uint
            | VertexAttributeFormat::Short4 => 4,
        }
    }

    /// Whether the attribute reaches the shader as an integer (not converted to float).
    pub fn is_integer(self) -> bool {
        match self {
            VertexAttributeFormat::R8G8B8A8Uint | VertexAttributeFormat::Uint1 => true,
            _ => false,
        }
    }

    pub fn is_normalized(self) -> bool {
        self == VertexAttributeFormat::R8G8B8A8Unorm
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub format: VertexAttributeFormat,
    /// Name of the attribute in the vertex shader.
    pub name: String,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub stride_in_bytes: u32,
    /// 0 for per-vertex data, n to advance once every n instances.
    pub instances_per_element: u32,
}

impl VertexAttribute {
    pub fn new(
        format: VertexAttributeFormat,
        name: &str,
        input_slot: u32,
        aligned_byte_offset: u32,
        stride_in_bytes: u32,
    ) -> VertexAttribute {
        VertexAttribute {
            format,
            name: name.to_owned(),
            input_slot,
            aligned_byte_offset,
            stride_in_bytes,
            instances_per_element: 0,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Textures

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    R8,
    R8G8B8A8,
    R8G8B8A8Srgb,
    B8G8R8A8,
    R11G11B10F,
    R16G16B16A16F,
    R32G32B32A32F,
    R16Unorm,
    R32Uint,
    R32Float,
    D32Float,
}

impl TextureFormat {
    pub fn bytes_per_element(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::R16Unorm => 2,
            TextureFormat::R8G8B8A8
            | TextureFormat::R8G8B8A8Srgb
            | TextureFormat::B8G8R8A8
            | TextureFormat::R11G11B10F
            | TextureFormat::R32Uint
            | TextureFormat::R32Float
            | TextureFormat::D32Float => 4,
            TextureFormat::R16G16B16A16F => 8,
            TextureFormat::R32G32B32A32F => 16,
        }
    }

    pub fn is_depth(self) -> bool {
        self == TextureFormat::D32Float
    }
}

bitflags! {
    #[derive(Default)]
    pub struct TextureFlags: u32 {
        /// Initial data contains the whole mip chain.
        const DATA_CONTAINS_MIPMAPS = 1 << 0;
        /// Generate the mip chain from the first level after upload.
        const GENERATE_MIPMAPS = 1 << 1;
        const SHADER_RESOURCE = 1 << 2;
        const UNORDERED_ACCESS = 1 << 3;
        const RENDER_TARGET = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureUsage {
    Default,
    Immutable,
    Dynamic,
    Staging,
}

impl Default for TextureUsage {
    fn default() -> Self {
        TextureUsage::Default
    }
}

/// Number of mipmap levels of a full chain for a texture of the given largest dimension.
pub fn number_of_mipmaps(size: u32) -> u32 {
    32 - size.max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length() {
        assert_eq!(number_of_mipmaps(1), 1);
        assert_eq!(number_of_mipmaps(2), 2);
        assert_eq!(number_of_mipmaps(256), 9);
        assert_eq!(number_of_mipmaps(300), 9);
        assert_eq!(number_of_mipmaps(0), 1);
    }

    #[test]
    fn query_result_sizes() {
        assert_eq!(QueryType::Timestamp.result_size(), 8);
        assert_eq!(QueryType::Occlusion.result_size(), 8);
        assert_eq!(QueryType::PipelineStatistics.result_size(), 88);
    }

    #[test]
    fn patch_topology() {
        assert_eq!(PrimitiveTopology::PatchList(3).patch_vertices(), Some(3));
        assert_eq!(PrimitiveTopology::TriangleList.patch_vertices(), None);
    }
}
