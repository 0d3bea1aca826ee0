//! Command buffer replay.
//!
//! One function per command, in the order of `CommandDispatchFunctionIndex`. Each decodes its
//! payload, looks up the resources it names and forwards to the matching `OpenGlRhi` method.
use crate::backend::{OpenGl, OpenGlRhi, RenderTarget};
use crate::resource::GlResource;
use rhi::command::{
    decode_arguments, payload, CommandBuffer, CommandPacket, NONE, NUMBER_OF_FUNCTIONS,
};
use rhi::{ClearFlags, QueryControlFlags, ScissorRectangle, Viewport};
use smallvec::SmallVec;

pub type DispatchFunction = fn(&CommandPacket, &CommandBuffer<OpenGl>, &mut OpenGlRhi);

/// Looks up a resource of the given kind. A resource of another kind is a recording error.
macro_rules! expect_resource {
    ($cb:expr, $index:expr, $variant:ident) => {
        match $cb.resource($index) {
            Some(GlResource::$variant(r)) => Some(r),
            Some(other) => {
                debug_assert!(
                    false,
                    concat!("expected ", stringify!($variant), ", got {:?}"),
                    other.resource_type()
                );
                None
            }
            None => None,
        }
    };
}

pub static DISPATCH_FUNCTIONS: [DispatchFunction; NUMBER_OF_FUNCTIONS] = [
    execute_command_buffer,
    // graphics
    set_graphics_root_signature,
    set_graphics_pipeline_state,
    set_graphics_resource_group,
    set_graphics_vertex_array,
    set_graphics_viewports,
    set_graphics_scissor_rectangles,
    set_graphics_render_target,
    clear_graphics,
    draw_graphics,
    draw_indexed_graphics,
    draw_mesh_tasks,
    // compute
    set_compute_root_signature,
    set_compute_pipeline_state,
    set_compute_resource_group,
    dispatch_compute,
    // resource
    set_texture_minimum_maximum_mipmap_index,
    resolve_multisample_framebuffer,
    copy_resource,
    generate_mipmaps,
    // query
    reset_query_pool,
    begin_query,
    end_query,
    write_timestamp_query,
    // debug
    set_debug_marker,
    begin_debug_event,
    end_debug_event,
];

/// Replays every packet of `command_buffer` in recording order.
pub fn submit(command_buffer: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    for packet in command_buffer.packets() {
        DISPATCH_FUNCTIONS[packet.index as usize](&packet, command_buffer, rhi);
    }
}

fn execute_command_buffer(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::ExecuteCommandBuffer = packet.payload();
    submit(cb.nested(p.command_buffer), rhi);
}

//--------------------------------------------------------------------------------------------------
// graphics

fn set_graphics_root_signature(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetRootSignature = packet.payload();
    rhi.set_graphics_root_signature(expect_resource!(cb, p.root_signature, RootSignature));
}

fn set_graphics_pipeline_state(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetPipelineState = packet.payload();
    rhi.set_graphics_pipeline_state(expect_resource!(
        cb,
        p.pipeline_state,
        GraphicsPipelineState
    ));
}

fn set_graphics_resource_group(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetResourceGroup = packet.payload();
    rhi.set_graphics_resource_group(
        p.root_parameter_index,
        expect_resource!(cb, p.resource_group, ResourceGroup),
    );
}

fn set_graphics_vertex_array(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetVertexArray = packet.payload();
    rhi.set_graphics_vertex_array(expect_resource!(cb, p.vertex_array, VertexArray));
}

fn set_graphics_viewports(packet: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::SetViewports = packet.payload();
    let viewports: SmallVec<[Viewport; 8]> = decode_arguments(packet.auxiliary)
        .take(p.number_of_viewports as usize)
        .collect();
    rhi.set_graphics_viewports(&viewports);
}

fn set_graphics_scissor_rectangles(
    packet: &CommandPacket,
    _: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetScissorRectangles = packet.payload();
    let rectangles: SmallVec<[ScissorRectangle; 8]> = decode_arguments(packet.auxiliary)
        .take(p.number_of_scissor_rectangles as usize)
        .collect();
    rhi.set_graphics_scissor_rectangles(&rectangles);
}

fn set_graphics_render_target(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetRenderTarget = packet.payload();
    let render_target = cb.resource(p.render_target).and_then(|r| {
        let rt = RenderTarget::from_resource(r);
        debug_assert!(rt.is_some(), "{:?} is not a render target", r.resource_type());
        rt
    });
    rhi.set_graphics_render_target(render_target);
}

fn clear_graphics(packet: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::Clear = packet.payload();
    rhi.clear_graphics(
        ClearFlags::from_bits_truncate(p.flags),
        p.color,
        p.z,
        p.stencil,
    );
}

fn draw_graphics(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::Draw = packet.payload();
    if p.indirect_buffer == NONE {
        rhi.draw_graphics_emulated(packet.auxiliary, p.number_of_draws);
    } else if let Some(buffer) = expect_resource!(cb, p.indirect_buffer, IndirectBuffer) {
        rhi.draw_graphics(buffer, p.indirect_buffer_offset, p.number_of_draws);
    }
}

fn draw_indexed_graphics(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::Draw = packet.payload();
    if p.indirect_buffer == NONE {
        rhi.draw_indexed_graphics_emulated(packet.auxiliary, p.number_of_draws);
    } else if let Some(buffer) = expect_resource!(cb, p.indirect_buffer, IndirectBuffer) {
        rhi.draw_indexed_graphics(buffer, p.indirect_buffer_offset, p.number_of_draws);
    }
}

fn draw_mesh_tasks(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::Draw = packet.payload();
    if p.indirect_buffer == NONE {
        rhi.draw_mesh_tasks_emulated(packet.auxiliary, p.number_of_draws);
    } else if let Some(buffer) = expect_resource!(cb, p.indirect_buffer, IndirectBuffer) {
        rhi.draw_mesh_tasks(buffer, p.indirect_buffer_offset, p.number_of_draws);
    }
}

//--------------------------------------------------------------------------------------------------
// compute

fn set_compute_root_signature(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetRootSignature = packet.payload();
    rhi.set_compute_root_signature(expect_resource!(cb, p.root_signature, RootSignature));
}

fn set_compute_pipeline_state(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetPipelineState = packet.payload();
    rhi.set_compute_pipeline_state(expect_resource!(
        cb,
        p.pipeline_state,
        ComputePipelineState
    ));
}

fn set_compute_resource_group(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetResourceGroup = packet.payload();
    rhi.set_compute_resource_group(
        p.root_parameter_index,
        expect_resource!(cb, p.resource_group, ResourceGroup),
    );
}

fn dispatch_compute(packet: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::DispatchCompute = packet.payload();
    rhi.dispatch_compute(p.group_count_x, p.group_count_y, p.group_count_z);
}

//--------------------------------------------------------------------------------------------------
// resource

fn set_texture_minimum_maximum_mipmap_index(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::SetTextureMinimumMaximumMipmapIndex = packet.payload();
    if let Some(texture) = expect_resource!(cb, p.texture, Texture) {
        rhi.set_texture_minimum_maximum_mipmap_index(
            texture,
            p.minimum_mipmap_index,
            p.maximum_mipmap_index,
        );
    }
}

fn resolve_multisample_framebuffer(
    packet: &CommandPacket,
    cb: &CommandBuffer<OpenGl>,
    rhi: &mut OpenGlRhi,
) {
    let p: payload::ResolveMultisampleFramebuffer = packet.payload();
    let destination = cb
        .resource(p.destination_render_target)
        .and_then(RenderTarget::from_resource);
    let source = expect_resource!(cb, p.source_multisample_framebuffer, Framebuffer);
    match (destination, source) {
        (Some(destination), Some(source)) => {
            rhi.resolve_multisample_framebuffer(&destination, source)
        }
        _ => debug_assert!(false, "resolve needs a render target and a framebuffer"),
    }
}

fn copy_resource(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::CopyResource = packet.payload();
    match (
        cb.resource(p.destination_resource),
        cb.resource(p.source_resource),
    ) {
        (Some(destination), Some(source)) => rhi.copy_resource(destination, source),
        _ => debug_assert!(false, "copy needs a destination and a source"),
    }
}

fn generate_mipmaps(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::GenerateMipmaps = packet.payload();
    if let Some(texture) = expect_resource!(cb, p.resource, Texture) {
        rhi.generate_mipmaps(texture);
    }
}

//--------------------------------------------------------------------------------------------------
// query

fn reset_query_pool(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::ResetQueryPool = packet.payload();
    if let Some(pool) = expect_resource!(cb, p.query_pool, QueryPool) {
        rhi.reset_query_pool(pool, p.first_query_index, p.number_of_queries);
    }
}

fn begin_query(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::BeginQuery = packet.payload();
    if let Some(pool) = expect_resource!(cb, p.query_pool, QueryPool) {
        rhi.begin_query(
            pool,
            p.query_index,
            QueryControlFlags::from_bits_truncate(p.query_control_flags),
        );
    }
}

fn end_query(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::QueryIndex = packet.payload();
    if let Some(pool) = expect_resource!(cb, p.query_pool, QueryPool) {
        rhi.end_query(pool, p.query_index);
    }
}

fn write_timestamp_query(packet: &CommandPacket, cb: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::QueryIndex = packet.payload();
    if let Some(pool) = expect_resource!(cb, p.query_pool, QueryPool) {
        rhi.write_timestamp_query(pool, p.query_index);
    }
}

//--------------------------------------------------------------------------------------------------
// debug

fn set_debug_marker(packet: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::DebugName = packet.payload();
    rhi.set_debug_marker(packet.auxiliary_str(p.name_length));
}

fn begin_debug_event(packet: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    let p: payload::DebugName = packet.payload();
    rhi.begin_debug_event(packet.auxiliary_str(p.name_length));
}

fn end_debug_event(_: &CommandPacket, _: &CommandBuffer<OpenGl>, rhi: &mut OpenGlRhi) {
    rhi.end_debug_event();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api as gl;
    use crate::config::BackendConfig;
    use crate::native::RecordingGl;
    use crate::pipeline::{GraphicsPipelineState, GraphicsPipelineStateDesc};
    use crate::root_signature::RootSignature;
    use crate::shader::ShaderSourceCode;
    use rhi::{DrawArguments, Rhi, RootSignatureDesc, TextureFormat};
    use std::rc::Rc;

    fn rhi(gl: &Rc<RecordingGl>) -> OpenGlRhi {
        OpenGlRhi::new(gl.clone(), gl.clone(), BackendConfig::default()).unwrap()
    }

    fn pipeline_state(rhi: &OpenGlRhi) -> (Rc<RootSignature>, Rc<GraphicsPipelineState>) {
        let rs = rhi.create_root_signature(&RootSignatureDesc::new(Vec::new()));
        let lang = rhi.shader_language().unwrap();
        let vs = lang
            .create_vertex_shader_from_source(
                &[],
                &ShaderSourceCode::new("#version 450\nvoid main() {}\n"),
            )
            .unwrap();
        let program = lang
            .create_graphics_program(&rs, &[], Some(&vs), None, None, None, None)
            .unwrap();
        let rp = rhi
            .create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)
            .unwrap();
        let pso = rhi
            .create_graphics_pipeline_state(GraphicsPipelineStateDesc::new(&rs, &program, &rp, &[]))
            .unwrap();
        (rs, pso)
    }

    fn draw(first: u32, count: u32) -> DrawArguments {
        DrawArguments {
            vertex_count_per_instance: count,
            instance_count: 1,
            start_vertex_location: first,
            start_instance_location: 0,
        }
    }

    #[test]
    fn table_follows_the_command_order() {
        assert_eq!(DISPATCH_FUNCTIONS.len(), NUMBER_OF_FUNCTIONS);
        let gl = Rc::new(RecordingGl::new());
        let mut rhi = rhi(&gl);
        gl.clear_calls();
        let mut cb = CommandBuffer::<OpenGl>::new();
        cb.begin_debug_event("a");
        cb.set_debug_marker("b");
        cb.end_debug_event();
        rhi.submit_command_buffer(&cb);
        assert_eq!(
            gl.names(),
            vec!["PushDebugGroup", "DebugMessageInsert", "PopDebugGroup"]
        );
        assert!(gl.calls()[0].ends_with("\"a\")"));
        assert!(gl.calls()[1].ends_with("\"b\")"));
    }

    #[test]
    fn emulated_draws_replay_in_order() {
        let gl = Rc::new(RecordingGl::new());
        let mut rhi = rhi(&gl);
        let (rs, pso) = pipeline_state(&rhi);
        let mut cb = CommandBuffer::<OpenGl>::new();
        cb.set_graphics_root_signature(Some(&rs));
        cb.set_graphics_pipeline_state(Some(&pso));
        cb.draw_graphics_emulated(&[draw(0, 3), draw(3, 6)]);
        gl.clear_calls();
        rhi.submit_command_buffer(&cb);
        let draws: Vec<_> = gl
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("Draw"))
            .collect();
        assert_eq!(
            draws,
            vec![
                format!("DrawArrays({}, 0, 3)", gl::TRIANGLES),
                format!("DrawArrays({}, 3, 6)", gl::TRIANGLES),
            ]
        );

        // instancing only when asked for
        let mut cb = CommandBuffer::<OpenGl>::new();
        cb.draw_graphics_emulated(&[DrawArguments {
            instance_count: 4,
            ..draw(0, 3)
        }]);
        gl.clear_calls();
        rhi.submit_command_buffer(&cb);
        assert_eq!(
            gl.calls(),
            vec![format!("DrawArraysInstanced({}, 0, 3, 4)", gl::TRIANGLES)]
        );
    }

    #[test]
    fn nested_command_buffers_run_in_place() {
        let gl = Rc::new(RecordingGl::new());
        let mut rhi = rhi(&gl);
        let mut inner = CommandBuffer::<OpenGl>::new();
        inner.set_debug_marker("inner");
        let inner = Rc::new(inner);
        let mut outer = CommandBuffer::<OpenGl>::new();
        outer.set_debug_marker("before");
        outer.execute_command_buffer(inner.clone());
        outer.set_debug_marker("after");
        gl.clear_calls();
        rhi.submit_command_buffer(&outer);
        let calls = gl.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("\"before\""));
        assert!(calls[1].contains("\"inner\""));
        assert!(calls[2].contains("\"after\""));
        assert_eq!(Rc::strong_count(&inner), 2);
    }

    #[test]
    fn current_root_signature_holds_a_reference() {
        let gl = Rc::new(RecordingGl::new());
        let mut rhi = rhi(&gl);
        let rs = rhi.create_root_signature(&RootSignatureDesc::new(Vec::new()));
        let before = Rc::strong_count(&rs);
        let mut cb = CommandBuffer::<OpenGl>::new();
        cb.set_graphics_root_signature(Some(&rs));
        rhi.submit_command_buffer(&cb);
        drop(cb);
        assert_eq!(Rc::strong_count(&rs), before + 1);

        // setting the same one again keeps a single reference
        rhi.set_graphics_root_signature(Some(&rs));
        assert_eq!(Rc::strong_count(&rs), before + 1);
        rhi.set_graphics_root_signature(None);
        assert_eq!(Rc::strong_count(&rs), before);
    }

    #[test]
    fn clear_flags_are_decoded() {
        let gl = Rc::new(RecordingGl::new());
        let mut rhi = rhi(&gl);
        let mut cb = CommandBuffer::<OpenGl>::new();
        cb.clear_graphics(ClearFlags::COLOR | ClearFlags::STENCIL, [1.0, 0.0, 0.0, 1.0], 1.0, 7);
        gl.clear_calls();
        rhi.submit_command_buffer(&cb);
        assert_eq!(
            gl.calls(),
            vec![
                "ClearColor(1.0, 0.0, 0.0, 1.0)".to_string(),
                "ClearStencil(7)".to_string(),
                format!("Clear({})", gl::COLOR_BUFFER_BIT | gl::STENCIL_BUFFER_BIT),
            ]
        );
    }
}
