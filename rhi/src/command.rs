//! Packed command buffers.
//!
//! Commands are recorded as a linked sequence of packets in a single byte buffer. Each packet is a
//! `PacketHeader` followed by a fixed-layout POD payload specific to the command kind and an
//! optional block of auxiliary bytes (viewport arrays, emulated draw arguments, debug names).
//! The header stores the offset of the next packet, or `END_OF_BUFFER` for the last one.
//!
//! Payloads cannot hold backend objects directly. Resources referenced by a command are pushed
//! into a side table owned by the command buffer (which keeps them alive until the buffer is
//! cleared or dropped) and the payload stores their index, or `NONE`. Nested command buffers live
//! in a second side table.
//!
//! Backends replay a buffer by walking `CommandBuffer::packets` and dispatching on
//! `CommandPacket::index`.
use crate::state::{
    ClearFlags, DrawArguments, DrawIndexedArguments, DrawMeshTasksArguments, QueryControlFlags,
    ScissorRectangle, Viewport,
};
use crate::Backend;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Resource index meaning "no resource".
pub const NONE: u32 = u32::MAX;
/// Next-packet offset of the last packet.
pub const END_OF_BUFFER: u32 = u32::MAX;

/// Tag of a command packet, used as an index into the backend's dispatch table.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CommandDispatchFunctionIndex {
    ExecuteCommandBuffer,
    // graphics
    SetGraphicsRootSignature,
    SetGraphicsPipelineState,
    SetGraphicsResourceGroup,
    SetGraphicsVertexArray,
    SetGraphicsViewports,
    SetGraphicsScissorRectangles,
    SetGraphicsRenderTarget,
    ClearGraphics,
    DrawGraphics,
    DrawIndexedGraphics,
    DrawMeshTasks,
    // compute
    SetComputeRootSignature,
    SetComputePipelineState,
    SetComputeResourceGroup,
    DispatchCompute,
    // resource
    SetTextureMinimumMaximumMipmapIndex,
    ResolveMultisampleFramebuffer,
    CopyResource,
    GenerateMipmaps,
    // query
    ResetQueryPool,
    BeginQuery,
    EndQuery,
    WriteTimestampQuery,
    // debug
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
}

pub const NUMBER_OF_FUNCTIONS: usize = 27;

impl CommandDispatchFunctionIndex {
    pub const ALL: [CommandDispatchFunctionIndex; NUMBER_OF_FUNCTIONS] = [
        CommandDispatchFunctionIndex::ExecuteCommandBuffer,
        CommandDispatchFunctionIndex::SetGraphicsRootSignature,
        CommandDispatchFunctionIndex::SetGraphicsPipelineState,
        CommandDispatchFunctionIndex::SetGraphicsResourceGroup,
        CommandDispatchFunctionIndex::SetGraphicsVertexArray,
        CommandDispatchFunctionIndex::SetGraphicsViewports,
        CommandDispatchFunctionIndex::SetGraphicsScissorRectangles,
        CommandDispatchFunctionIndex::SetGraphicsRenderTarget,
        CommandDispatchFunctionIndex::ClearGraphics,
        CommandDispatchFunctionIndex::DrawGraphics,
        CommandDispatchFunctionIndex::DrawIndexedGraphics,
        CommandDispatchFunctionIndex::DrawMeshTasks,
        CommandDispatchFunctionIndex::SetComputeRootSignature,
        CommandDispatchFunctionIndex::SetComputePipelineState,
        CommandDispatchFunctionIndex::SetComputeResourceGroup,
        CommandDispatchFunctionIndex::DispatchCompute,
        CommandDispatchFunctionIndex::SetTextureMinimumMaximumMipmapIndex,
        CommandDispatchFunctionIndex::ResolveMultisampleFramebuffer,
        CommandDispatchFunctionIndex::CopyResource,
        CommandDispatchFunctionIndex::GenerateMipmaps,
        CommandDispatchFunctionIndex::ResetQueryPool,
        CommandDispatchFunctionIndex::BeginQuery,
        CommandDispatchFunctionIndex::EndQuery,
        CommandDispatchFunctionIndex::WriteTimestampQuery,
        CommandDispatchFunctionIndex::SetDebugMarker,
        CommandDispatchFunctionIndex::BeginDebugEvent,
        CommandDispatchFunctionIndex::EndDebugEvent,
    ];

    pub fn from_u32(value: u32) -> Option<CommandDispatchFunctionIndex> {
        CommandDispatchFunctionIndex::ALL.get(value as usize).cloned()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Pod, Zeroable)]
pub struct PacketHeader {
    pub next_packet_offset: u32,
    pub dispatch_index: u32,
    pub payload_size: u32,
    pub auxiliary_size: u32,
}

const HEADER_SIZE: usize = mem::size_of::<PacketHeader>();

//--------------------------------------------------------------------------------------------------
// Payloads

/// Command payload layouts.
pub mod payload {
    use bytemuck::{Pod, Zeroable};

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct ExecuteCommandBuffer {
        pub command_buffer: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetRootSignature {
        pub root_signature: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetPipelineState {
        pub pipeline_state: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetResourceGroup {
        pub root_parameter_index: u32,
        pub resource_group: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetVertexArray {
        pub vertex_array: u32,
    }

    /// Followed by `number_of_viewports` viewports in the auxiliary bytes.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetViewports {
        pub number_of_viewports: u32,
    }

    /// Followed by `number_of_scissor_rectangles` rectangles in the auxiliary bytes.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetScissorRectangles {
        pub number_of_scissor_rectangles: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetRenderTarget {
        pub render_target: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct Clear {
        pub flags: u32,
        pub color: [f32; 4],
        pub z: f32,
        pub stencil: u32,
    }

    /// Draw payload shared by the three draw commands.
    ///
    /// When `indirect_buffer` is `NONE`, the auxiliary bytes hold `number_of_draws` emulated
    /// argument structs of the matching type.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct Draw {
        pub indirect_buffer: u32,
        pub indirect_buffer_offset: u32,
        pub number_of_draws: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct DispatchCompute {
        pub group_count_x: u32,
        pub group_count_y: u32,
        pub group_count_z: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct SetTextureMinimumMaximumMipmapIndex {
        pub texture: u32,
        pub minimum_mipmap_index: u32,
        pub maximum_mipmap_index: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct ResolveMultisampleFramebuffer {
        pub destination_render_target: u32,
        pub source_multisample_framebuffer: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct CopyResource {
        pub destination_resource: u32,
        pub source_resource: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct GenerateMipmaps {
        pub resource: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct ResetQueryPool {
        pub query_pool: u32,
        pub first_query_index: u32,
        pub number_of_queries: u32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct BeginQuery {
        pub query_pool: u32,
        pub query_index: u32,
        pub query_control_flags: u32,
    }

    /// Used by both `EndQuery` and `WriteTimestampQuery`.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct QueryIndex {
        pub query_pool: u32,
        pub query_index: u32,
    }

    /// Followed by `name_length` bytes of UTF-8 in the auxiliary bytes.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Pod, Zeroable)]
    pub struct DebugName {
        pub name_length: u32,
    }
}

//--------------------------------------------------------------------------------------------------
// Decoding

/// A decoded view of one packet.
#[derive(Copy, Clone, Debug)]
pub struct CommandPacket<'a> {
    pub index: CommandDispatchFunctionIndex,
    pub payload: &'a [u8],
    pub auxiliary: &'a [u8],
}

impl<'a> CommandPacket<'a> {
    /// Reads the payload as `T`. The payload must have been recorded as a `T`.
    pub fn payload<T: Pod>(&self) -> T {
        debug_assert_eq!(
            self.payload.len(),
            mem::size_of::<T>(),
            "payload size mismatch for {:?}",
            self.index
        );
        bytemuck::pod_read_unaligned(&self.payload[..mem::size_of::<T>()])
    }

    /// Auxiliary bytes interpreted as a UTF-8 debug name of the given length.
    pub fn auxiliary_str(&self, length: u32) -> &'a str {
        let bytes = &self.auxiliary[..(length as usize).min(self.auxiliary.len())];
        std::str::from_utf8(bytes).unwrap_or("")
    }
}

/// Reads consecutive `T`s out of an auxiliary block.
pub fn decode_arguments<T: Pod>(bytes: &[u8]) -> impl Iterator<Item = T> + '_ {
    bytes
        .chunks_exact(mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
}

pub fn decode_draw_arguments(bytes: &[u8]) -> impl Iterator<Item = DrawArguments> + '_ {
    decode_arguments(bytes)
}

pub fn decode_draw_indexed_arguments(
    bytes: &[u8],
) -> impl Iterator<Item = DrawIndexedArguments> + '_ {
    decode_arguments(bytes)
}

pub fn decode_draw_mesh_tasks_arguments(
    bytes: &[u8],
) -> impl Iterator<Item = DrawMeshTasksArguments> + '_ {
    decode_arguments(bytes)
}

/// Iterator over the packets of a command buffer, in recording order.
pub struct Packets<'a> {
    data: &'a [u8],
    offset: u32,
}

impl<'a> Iterator for Packets<'a> {
    type Item = CommandPacket<'a>;

    fn next(&mut self) -> Option<CommandPacket<'a>> {
        if self.offset == END_OF_BUFFER {
            return None;
        }
        let start = self.offset as usize;
        let header: PacketHeader =
            bytemuck::pod_read_unaligned(&self.data[start..start + HEADER_SIZE]);
        let index = match CommandDispatchFunctionIndex::from_u32(header.dispatch_index) {
            Some(index) => index,
            None => {
                debug_assert!(
                    false,
                    "invalid dispatch index {} at offset {}",
                    header.dispatch_index, start
                );
                self.offset = END_OF_BUFFER;
                return None;
            }
        };
        let payload_start = start + HEADER_SIZE;
        let auxiliary_start = payload_start + header.payload_size as usize;
        let auxiliary_end = auxiliary_start + header.auxiliary_size as usize;
        self.offset = header.next_packet_offset;
        Some(CommandPacket {
            index,
            payload: &self.data[payload_start..auxiliary_start],
            auxiliary: &self.data[auxiliary_start..auxiliary_end],
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Recording

/// A recorded sequence of commands for backend `B`.
pub struct CommandBuffer<B: Backend> {
    data: Vec<u8>,
    last_packet: Option<usize>,
    number_of_packets: u32,
    resources: Vec<B::Resource>,
    command_buffers: Vec<Rc<CommandBuffer<B>>>,
}

impl<B: Backend> Default for CommandBuffer<B> {
    fn default() -> Self {
        CommandBuffer::new()
    }
}

impl<B: Backend> fmt::Debug for CommandBuffer<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("number_of_packets", &self.number_of_packets)
            .field("bytes", &self.data.len())
            .field("resources", &self.resources)
            .field("command_buffers", &self.command_buffers.len())
            .finish()
    }
}

impl<B: Backend> CommandBuffer<B> {
    pub fn new() -> CommandBuffer<B> {
        CommandBuffer {
            data: Vec::new(),
            last_packet: None,
            number_of_packets: 0,
            resources: Vec::new(),
            command_buffers: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_packets == 0
    }

    /// Number of recorded packets.
    pub fn len(&self) -> usize {
        self.number_of_packets as usize
    }

    /// Removes every packet and releases every referenced resource.
    pub fn clear(&mut self) {
        self.data.clear();
        self.last_packet = None;
        self.number_of_packets = 0;
        self.resources.clear();
        self.command_buffers.clear();
    }

    pub fn packets(&self) -> Packets {
        Packets {
            data: &self.data,
            offset: if self.data.is_empty() {
                END_OF_BUFFER
            } else {
                0
            },
        }
    }

    /// Resource stored at `index` of the side table; `None` for `NONE`.
    pub fn resource(&self, index: u32) -> Option<&B::Resource> {
        if index == NONE {
            None
        } else {
            debug_assert!((index as usize) < self.resources.len(), "stale resource index");
            self.resources.get(index as usize)
        }
    }

    pub fn nested(&self, index: u32) -> &Rc<CommandBuffer<B>> {
        &self.command_buffers[index as usize]
    }

    fn push_resource(&mut self, resource: impl Into<B::Resource>) -> u32 {
        self.resources.push(resource.into());
        (self.resources.len() - 1) as u32
    }

    fn push_optional_resource<R: Into<B::Resource>>(&mut self, resource: Option<R>) -> u32 {
        match resource {
            Some(resource) => self.push_resource(resource),
            None => NONE,
        }
    }

    fn push_packet_raw(
        &mut self,
        index: CommandDispatchFunctionIndex,
        payload: &[u8],
        auxiliary: &[u8],
    ) {
        let offset = self.data.len();
        if let Some(last) = self.last_packet {
            self.data[last..last + 4].copy_from_slice(&(offset as u32).to_ne_bytes());
        }
        let header = PacketHeader {
            next_packet_offset: END_OF_BUFFER,
            dispatch_index: index as u32,
            payload_size: payload.len() as u32,
            auxiliary_size: auxiliary.len() as u32,
        };
        self.data.extend_from_slice(bytemuck::bytes_of(&header));
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(auxiliary);
        // keep packets 4-byte aligned
        let padded = (self.data.len() + 3) & !3;
        self.data.resize(padded, 0);
        self.last_packet = Some(offset);
        self.number_of_packets += 1;
    }

    fn push_packet<T: Pod>(&mut self, index: CommandDispatchFunctionIndex, payload: &T) {
        self.push_packet_raw(index, bytemuck::bytes_of(payload), &[]);
    }

    fn push_packet_with_auxiliary<T: Pod>(
        &mut self,
        index: CommandDispatchFunctionIndex,
        payload: &T,
        auxiliary: &[u8],
    ) {
        self.push_packet_raw(index, bytemuck::bytes_of(payload), auxiliary);
    }

    //----------------------------------------------------------------------------------------------
    // Composition

    /// Records the execution of another command buffer at this point.
    pub fn execute_command_buffer(&mut self, command_buffer: Rc<CommandBuffer<B>>) {
        self.command_buffers.push(command_buffer);
        let index = (self.command_buffers.len() - 1) as u32;
        self.push_packet(
            CommandDispatchFunctionIndex::ExecuteCommandBuffer,
            &payload::ExecuteCommandBuffer {
                command_buffer: index,
            },
        );
    }

    //----------------------------------------------------------------------------------------------
    // Graphics

    pub fn set_graphics_root_signature<R: Into<B::Resource>>(&mut self, root_signature: Option<R>) {
        let root_signature = self.push_optional_resource(root_signature);
        self.push_packet(
            CommandDispatchFunctionIndex::SetGraphicsRootSignature,
            &payload::SetRootSignature { root_signature },
        );
    }

    pub fn set_graphics_pipeline_state<R: Into<B::Resource>>(&mut self, pipeline_state: Option<R>) {
        let pipeline_state = self.push_optional_resource(pipeline_state);
        self.push_packet(
            CommandDispatchFunctionIndex::SetGraphicsPipelineState,
            &payload::SetPipelineState { pipeline_state },
        );
    }

    pub fn set_graphics_resource_group<R: Into<B::Resource>>(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<R>,
    ) {
        let resource_group = self.push_optional_resource(resource_group);
        self.push_packet(
            CommandDispatchFunctionIndex::SetGraphicsResourceGroup,
            &payload::SetResourceGroup {
                root_parameter_index,
                resource_group,
            },
        );
    }

    pub fn set_graphics_vertex_array<R: Into<B::Resource>>(&mut self, vertex_array: Option<R>) {
        let vertex_array = self.push_optional_resource(vertex_array);
        self.push_packet(
            CommandDispatchFunctionIndex::SetGraphicsVertexArray,
            &payload::SetVertexArray { vertex_array },
        );
    }

    pub fn set_graphics_viewports(&mut self, viewports: &[Viewport]) {
        debug_assert!(!viewports.is_empty(), "at least one viewport is required");
        self.push_packet_with_auxiliary(
            CommandDispatchFunctionIndex::SetGraphicsViewports,
            &payload::SetViewports {
                number_of_viewports: viewports.len() as u32,
            },
            bytemuck::cast_slice(viewports),
        );
    }

    pub fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) {
        debug_assert!(
            !scissor_rectangles.is_empty(),
            "at least one scissor rectangle is required"
        );
        self.push_packet_with_auxiliary(
            CommandDispatchFunctionIndex::SetGraphicsScissorRectangles,
            &payload::SetScissorRectangles {
                number_of_scissor_rectangles: scissor_rectangles.len() as u32,
            },
            bytemuck::cast_slice(scissor_rectangles),
        );
    }

    /// Sets the render target (swap chain or framebuffer).
    pub fn set_graphics_render_target<R: Into<B::Resource>>(&mut self, render_target: Option<R>) {
        let render_target = self.push_optional_resource(render_target);
        self.push_packet(
            CommandDispatchFunctionIndex::SetGraphicsRenderTarget,
            &payload::SetRenderTarget { render_target },
        );
    }

    pub fn clear_graphics(&mut self, flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) {
        self.push_packet(
            CommandDispatchFunctionIndex::ClearGraphics,
            &payload::Clear {
                flags: flags.bits(),
                color,
                z,
                stencil,
            },
        );
    }

    /// Non-indexed draws reading their arguments from an indirect buffer.
    pub fn draw_graphics(
        &mut self,
        indirect_buffer: impl Into<B::Resource>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        let indirect_buffer = self.push_resource(indirect_buffer);
        self.push_packet(
            CommandDispatchFunctionIndex::DrawGraphics,
            &payload::Draw {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            },
        );
    }

    /// Non-indexed draws with inline arguments, replayed one by one by the backend.
    pub fn draw_graphics_emulated(&mut self, arguments: &[DrawArguments]) {
        self.push_packet_with_auxiliary(
            CommandDispatchFunctionIndex::DrawGraphics,
            &payload::Draw {
                indirect_buffer: NONE,
                indirect_buffer_offset: 0,
                number_of_draws: arguments.len() as u32,
            },
            bytemuck::cast_slice(arguments),
        );
    }

    pub fn draw_indexed_graphics(
        &mut self,
        indirect_buffer: impl Into<B::Resource>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        let indirect_buffer = self.push_resource(indirect_buffer);
        self.push_packet(
            CommandDispatchFunctionIndex::DrawIndexedGraphics,
            &payload::Draw {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            },
        );
    }

    pub fn draw_indexed_graphics_emulated(&mut self, arguments: &[DrawIndexedArguments]) {
        self.push_packet_with_auxiliary(
            CommandDispatchFunctionIndex::DrawIndexedGraphics,
            &payload::Draw {
                indirect_buffer: NONE,
                indirect_buffer_offset: 0,
                number_of_draws: arguments.len() as u32,
            },
            bytemuck::cast_slice(arguments),
        );
    }

    pub fn draw_mesh_tasks(
        &mut self,
        indirect_buffer: impl Into<B::Resource>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        let indirect_buffer = self.push_resource(indirect_buffer);
        self.push_packet(
            CommandDispatchFunctionIndex::DrawMeshTasks,
            &payload::Draw {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            },
        );
    }

    pub fn draw_mesh_tasks_emulated(&mut self, arguments: &[DrawMeshTasksArguments]) {
        self.push_packet_with_auxiliary(
            CommandDispatchFunctionIndex::DrawMeshTasks,
            &payload::Draw {
                indirect_buffer: NONE,
                indirect_buffer_offset: 0,
                number_of_draws: arguments.len() as u32,
            },
            bytemuck::cast_slice(arguments),
        );
    }

    //----------------------------------------------------------------------------------------------
    // Compute

    pub fn set_compute_root_signature<R: Into<B::Resource>>(&mut self, root_signature: Option<R>) {
        let root_signature = self.push_optional_resource(root_signature);
        self.push_packet(
            CommandDispatchFunctionIndex::SetComputeRootSignature,
            &payload::SetRootSignature { root_signature },
        );
    }

    pub fn set_compute_pipeline_state<R: Into<B::Resource>>(&mut self, pipeline_state: Option<R>) {
        let pipeline_state = self.push_optional_resource(pipeline_state);
        self.push_packet(
            CommandDispatchFunctionIndex::SetComputePipelineState,
            &payload::SetPipelineState { pipeline_state },
        );
    }

    pub fn set_compute_resource_group<R: Into<B::Resource>>(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<R>,
    ) {
        let resource_group = self.push_optional_resource(resource_group);
        self.push_packet(
            CommandDispatchFunctionIndex::SetComputeResourceGroup,
            &payload::SetResourceGroup {
                root_parameter_index,
                resource_group,
            },
        );
    }

    pub fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) {
        self.push_packet(
            CommandDispatchFunctionIndex::DispatchCompute,
            &payload::DispatchCompute {
                group_count_x,
                group_count_y,
                group_count_z,
            },
        );
    }

    //----------------------------------------------------------------------------------------------
    // Resource

    pub fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: impl Into<B::Resource>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) {
        let texture = self.push_resource(texture);
        self.push_packet(
            CommandDispatchFunctionIndex::SetTextureMinimumMaximumMipmapIndex,
            &payload::SetTextureMinimumMaximumMipmapIndex {
                texture,
                minimum_mipmap_index,
                maximum_mipmap_index,
            },
        );
    }

    pub fn resolve_multisample_framebuffer(
        &mut self,
        destination_render_target: impl Into<B::Resource>,
        source_multisample_framebuffer: impl Into<B::Resource>,
    ) {
        let destination_render_target = self.push_resource(destination_render_target);
        let source_multisample_framebuffer = self.push_resource(source_multisample_framebuffer);
        self.push_packet(
            CommandDispatchFunctionIndex::ResolveMultisampleFramebuffer,
            &payload::ResolveMultisampleFramebuffer {
                destination_render_target,
                source_multisample_framebuffer,
            },
        );
    }

    pub fn copy_resource(
        &mut self,
        destination_resource: impl Into<B::Resource>,
        source_resource: impl Into<B::Resource>,
    ) {
        let destination_resource = self.push_resource(destination_resource);
        let source_resource = self.push_resource(source_resource);
        self.push_packet(
            CommandDispatchFunctionIndex::CopyResource,
            &payload::CopyResource {
                destination_resource,
                source_resource,
            },
        );
    }

    pub fn generate_mipmaps(&mut self, resource: impl Into<B::Resource>) {
        let resource = self.push_resource(resource);
        self.push_packet(
            CommandDispatchFunctionIndex::GenerateMipmaps,
            &payload::GenerateMipmaps { resource },
        );
    }

    //----------------------------------------------------------------------------------------------
    // Query

    pub fn reset_query_pool(
        &mut self,
        query_pool: impl Into<B::Resource>,
        first_query_index: u32,
        number_of_queries: u32,
    ) {
        let query_pool = self.push_resource(query_pool);
        self.push_packet(
            CommandDispatchFunctionIndex::ResetQueryPool,
            &payload::ResetQueryPool {
                query_pool,
                first_query_index,
                number_of_queries,
            },
        );
    }

    pub fn begin_query(
        &mut self,
        query_pool: impl Into<B::Resource>,
        query_index: u32,
        query_control_flags: QueryControlFlags,
    ) {
        let query_pool = self.push_resource(query_pool);
        self.push_packet(
            CommandDispatchFunctionIndex::BeginQuery,
            &payload::BeginQuery {
                query_pool,
                query_index,
                query_control_flags: query_control_flags.bits(),
            },
        );
    }

    pub fn end_query(&mut self, query_pool: impl Into<B::Resource>, query_index: u32) {
        let query_pool = self.push_resource(query_pool);
        self.push_packet(
            CommandDispatchFunctionIndex::EndQuery,
            &payload::QueryIndex {
                query_pool,
                query_index,
            },
        );
    }

    pub fn write_timestamp_query(&mut self, query_pool: impl Into<B::Resource>, query_index: u32) {
        let query_pool = self.push_resource(query_pool);
        self.push_packet(
            CommandDispatchFunctionIndex::WriteTimestampQuery,
            &payload::QueryIndex {
                query_pool,
                query_index,
            },
        );
    }

    //----------------------------------------------------------------------------------------------
    // Debug

    pub fn set_debug_marker(&mut self, name: &str) {
        self.push_debug_name(CommandDispatchFunctionIndex::SetDebugMarker, name);
    }

    pub fn begin_debug_event(&mut self, name: &str) {
        self.push_debug_name(CommandDispatchFunctionIndex::BeginDebugEvent, name);
    }

    pub fn end_debug_event(&mut self) {
        self.push_packet_raw(CommandDispatchFunctionIndex::EndDebugEvent, &[], &[]);
    }

    fn push_debug_name(&mut self, index: CommandDispatchFunctionIndex, name: &str) {
        self.push_packet_with_auxiliary(
            index,
            &payload::DebugName {
                name_length: name.len() as u32,
            },
            name.as_bytes(),
        );
    }
}
