//! End-to-end tests of the OpenGL backend on a recording context.
use rhi::{
    BufferFlags, BufferUsage, ClearFlags, CommandBuffer, DescriptorRange, DescriptorRangeType,
    DrawArguments, IndirectBufferFlags, PrimitiveTopology, QueryResultFlags, QueryType,
    ResourceType, Rhi, RootParameter, RootSignatureDesc, ShaderVisibility, TextureFlags,
    TextureFormat, TextureUsage, VertexAttribute, VertexAttributeFormat,
};
use rhi_gl::api as gl;
use rhi_gl::{
    BackendConfig, FramebufferAttachment, GlResource, GraphicsPipelineState,
    GraphicsPipelineStateDesc, OpenGl, OpenGlRhi, RecordingGl, RootSignature, ShaderSourceCode,
    VertexArrayVertexBuffer,
};
use std::rc::Rc;

const VS: &str = "#version 450\nin vec3 Position;\nvoid main() {}\n";

fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

fn backend(gl: &Rc<RecordingGl>) -> OpenGlRhi {
    init_logger();
    OpenGlRhi::new(gl.clone(), gl.clone(), BackendConfig::default()).unwrap()
}

/// Bind-path factories leave the objects they create bound.
fn backend_without_restore(gl: &Rc<RecordingGl>) -> OpenGlRhi {
    init_logger();
    let config = BackendConfig {
        restore_state: false,
        ..BackendConfig::default()
    };
    OpenGlRhi::new(gl.clone(), gl.clone(), config).unwrap()
}

fn empty_root_signature(rhi: &OpenGlRhi) -> Rc<RootSignature> {
    rhi.create_root_signature(&RootSignatureDesc::new(Vec::new()))
}

fn pipeline_state(
    rhi: &OpenGlRhi,
    root_signature: &Rc<RootSignature>,
    topology: PrimitiveTopology,
) -> rhi::Result<Rc<GraphicsPipelineState>> {
    let lang = rhi.shader_language()?;
    let vs = lang.create_vertex_shader_from_source(&[], &ShaderSourceCode::new(VS))?;
    let program =
        lang.create_graphics_program(root_signature, &[], Some(&vs), None, None, None, None)?;
    let render_pass = rhi.create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)?;
    let mut desc = GraphicsPipelineStateDesc::new(root_signature, &program, &render_pass, &[]);
    desc.primitive_topology = topology;
    rhi.create_graphics_pipeline_state(desc)
}

fn draw(first: u32, count: u32) -> DrawArguments {
    DrawArguments {
        vertex_count_per_instance: count,
        instance_count: 1,
        start_vertex_location: first,
        start_instance_location: 0,
    }
}

fn position() -> Vec<VertexAttribute> {
    vec![VertexAttribute::new(
        VertexAttributeFormat::Float3,
        "Position",
        0,
        0,
        12,
    )]
}

fn position_of(calls: &[String], prefix: &str) -> usize {
    calls
        .iter()
        .position(|c| c.starts_with(prefix))
        .unwrap_or_else(|| panic!("no {} call in {:?}", prefix, calls))
}

#[test]
fn pipeline_state_ids_reuse_the_smallest_free_id() {
    let gl = Rc::new(RecordingGl::new());
    let rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let a = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let b = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let c = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    assert_eq!((a.id(), b.id(), c.id()), (0, 1, 2));
    drop(b);
    let d = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    assert_eq!(d.id(), 1);
}

#[test]
fn uniform_block_binding_of_a_mixed_descriptor_table() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = rhi.create_root_signature(&RootSignatureDesc::new(vec![
        RootParameter::descriptor_table(vec![
            DescriptorRange::new(
                DescriptorRangeType::Ubv,
                0,
                "PassUniforms",
                ResourceType::UniformBuffer,
                ShaderVisibility::All,
            ),
            DescriptorRange::new(
                DescriptorRangeType::Srv,
                0,
                "AlbedoMap",
                ResourceType::Texture2D,
                ShaderVisibility::Fragment,
            ),
        ]),
    ]));
    let buffers = rhi.create_buffer_manager().unwrap();
    let ub = buffers
        .create_uniform_buffer(64, None, BufferUsage::DynamicDraw)
        .unwrap();
    let textures = rhi.create_texture_manager();
    let texture = textures
        .create_texture_2d(
            4,
            4,
            TextureFormat::R8G8B8A8,
            None,
            TextureFlags::SHADER_RESOURCE,
            TextureUsage::Default,
            1,
        )
        .unwrap();

    let group = rs
        .create_resource_group(0, vec![(&ub).into(), (&texture).into()], None)
        .unwrap();
    assert_eq!(group.uniform_block_binding_index(0), Some(0));
    assert_eq!(group.uniform_block_binding_index(1), None);

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_root_signature(Some(&rs));
    cb.set_graphics_resource_group(0, Some(&group));
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert!(gl.contains(&format!(
        "BindBufferBase({}, 0, {})",
        gl::UNIFORM_BUFFER,
        ub.raw().name()
    )));
    assert!(gl.contains(&format!("BindTextureUnit(0, {})", texture.name())));
}

#[test]
fn resource_groups_hold_one_reference_per_resource() {
    let gl = Rc::new(RecordingGl::new());
    let rhi = backend(&gl);
    let rs = rhi.create_root_signature(&RootSignatureDesc::new(vec![
        RootParameter::descriptor_table(vec![
            DescriptorRange::new(
                DescriptorRangeType::Srv,
                0,
                "AlbedoMap",
                ResourceType::Texture2D,
                ShaderVisibility::Fragment,
            ),
            DescriptorRange::new(
                DescriptorRangeType::Ubv,
                0,
                "ObjectUniforms",
                ResourceType::UniformBuffer,
                ShaderVisibility::All,
            ),
        ]),
    ]));
    let texture = rhi
        .create_texture_manager()
        .create_texture_2d(
            4,
            4,
            TextureFormat::R8G8B8A8,
            None,
            TextureFlags::SHADER_RESOURCE,
            TextureUsage::Default,
            1,
        )
        .unwrap();
    let ub = rhi
        .create_buffer_manager()
        .unwrap()
        .create_uniform_buffer(16, None, BufferUsage::StaticDraw)
        .unwrap();
    let sampler = rhi.create_sampler_state(Default::default());

    for _ in 0..3 {
        let group = rs
            .create_resource_group(
                0,
                vec![GlResource::from(&texture), GlResource::from(&ub)],
                Some(vec![Some(sampler.clone()), None]),
            )
            .unwrap();
        assert_eq!(Rc::strong_count(&texture), 2);
        assert_eq!(Rc::strong_count(&ub), 2);
        assert_eq!(Rc::strong_count(&sampler), 2);
        drop(group);
    }
    assert_eq!(Rc::strong_count(&texture), 1);
    assert_eq!(Rc::strong_count(&ub), 1);
    assert_eq!(Rc::strong_count(&sampler), 1);
}

#[test]
fn commands_replay_in_recording_order() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);

    // an empty command buffer issues nothing
    gl.clear_calls();
    rhi.submit_command_buffer(&CommandBuffer::new());
    assert!(gl.calls().is_empty());

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.begin_debug_event("frame");
    cb.clear_graphics(ClearFlags::COLOR, [0.0, 0.0, 0.0, 1.0], 1.0, 0);
    cb.dispatch_compute(8, 4, 1);
    cb.set_debug_marker("done");
    cb.end_debug_event();
    rhi.submit_command_buffer(&cb);
    assert_eq!(
        gl.names(),
        vec![
            "PushDebugGroup",
            "ClearColor",
            "Clear",
            "DispatchCompute",
            "DebugMessageInsert",
            "PopDebugGroup",
        ]
    );
    assert!(gl.contains("DispatchCompute(8, 4, 1)"));
}

#[test]
fn nested_command_buffers_are_spliced_in() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let mut inner = CommandBuffer::<OpenGl>::new();
    inner.dispatch_compute(1, 1, 1);
    inner.dispatch_compute(2, 1, 1);
    let inner = Rc::new(inner);

    let mut outer = CommandBuffer::<OpenGl>::new();
    outer.dispatch_compute(0, 1, 1);
    outer.execute_command_buffer(inner.clone());
    outer.dispatch_compute(3, 1, 1);
    // the same nested buffer can be executed twice
    outer.execute_command_buffer(inner);

    gl.clear_calls();
    rhi.submit_command_buffer(&outer);
    assert_eq!(
        gl.calls(),
        vec![
            "DispatchCompute(0, 1, 1)",
            "DispatchCompute(1, 1, 1)",
            "DispatchCompute(2, 1, 1)",
            "DispatchCompute(3, 1, 1)",
            "DispatchCompute(1, 1, 1)",
            "DispatchCompute(2, 1, 1)",
        ]
    );
}

#[test]
fn emulated_draws_follow_pipeline_and_vertex_array() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let pso = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let buffers = rhi.create_buffer_manager().unwrap();
    let vb = buffers
        .create_vertex_buffer(36, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let va = buffers
        .create_vertex_array(&position(), vec![VertexArrayVertexBuffer::new(&vb)], None)
        .unwrap();

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_root_signature(Some(&rs));
    cb.set_graphics_pipeline_state(Some(&pso));
    cb.set_graphics_vertex_array(Some(&va));
    cb.draw_graphics_emulated(&[draw(0, 3), draw(12, 6)]);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);

    let calls = gl.calls();
    let bind_program = position_of(&calls, "BindProgramPipeline");
    let bind_vertex_array = position_of(&calls, "BindVertexArray");
    assert!(bind_program < bind_vertex_array);
    let draws: Vec<_> = calls[bind_vertex_array..]
        .iter()
        .filter(|c| c.starts_with("Draw"))
        .cloned()
        .collect();
    assert_eq!(
        draws,
        vec![
            format!("DrawArrays({}, 0, 3)", gl::TRIANGLES),
            format!("DrawArrays({}, 12, 6)", gl::TRIANGLES),
        ]
    );
    assert_eq!(gl.count("DrawArraysInstanced"), 0);
}

#[test]
fn single_instance_draws_take_the_plain_path() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let pso = pipeline_state(&rhi, &rs, PrimitiveTopology::LineList).unwrap();
    rhi.set_graphics_root_signature(Some(&rs));
    rhi.set_graphics_pipeline_state(Some(&pso));

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.draw_graphics_emulated(&[draw(5, 3)]);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(gl.calls(), vec![format!("DrawArrays({}, 5, 3)", gl::LINES)]);

    gl.clear_calls();
    rhi.draw_graphics_emulated(bytemuck::bytes_of(&draw(5, 3)), 1);
    assert_eq!(gl.calls(), vec![format!("DrawArrays({}, 5, 3)", gl::LINES)]);
}

#[test]
fn indirect_draws_use_multi_draw_when_available() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let pso = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let indirect = rhi
        .create_buffer_manager()
        .unwrap()
        .create_indirect_buffer(
            64,
            None,
            IndirectBufferFlags::DRAW_ARGUMENTS,
            BufferUsage::StaticDraw,
        )
        .unwrap();

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_root_signature(Some(&rs));
    cb.set_graphics_pipeline_state(Some(&pso));
    cb.draw_graphics(&indirect, 16, 3);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert!(gl.contains(&format!(
        "BindBuffer({}, {})",
        gl::DRAW_INDIRECT_BUFFER,
        indirect.raw().name()
    )));
    assert!(gl.contains(&format!(
        "MultiDrawArraysIndirect({}, 16, 3, 16)",
        gl::TRIANGLES
    )));
}

#[test]
fn setting_the_same_pipeline_state_binds_the_program_once() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let pso = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_root_signature(Some(&rs));
    cb.set_graphics_pipeline_state(Some(&pso));
    cb.set_graphics_pipeline_state(Some(&pso));
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(gl.count("BindProgramPipeline"), 1);
}

#[test]
fn root_signature_reference_survives_repeated_sets() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let before = Rc::strong_count(&rs);
    rhi.set_graphics_root_signature(Some(&rs));
    rhi.set_graphics_root_signature(Some(&rs));
    assert_eq!(Rc::strong_count(&rs), before + 1);

    // the backend's reference alone keeps it alive
    let weak = Rc::downgrade(&rs);
    drop(rs);
    let held = rhi.graphics_root_signature().cloned();
    rhi.set_graphics_root_signature(held.as_ref());
    drop(held);
    assert!(weak.upgrade().is_some());
    rhi.set_graphics_root_signature(None);
    assert!(weak.upgrade().is_none());
}

#[test]
fn timestamps_are_monotonic() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let pool = rhi.create_query_pool(QueryType::Timestamp, 4).unwrap();

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.reset_query_pool(&pool, 0, 4);
    cb.write_timestamp_query(&pool, 2);

    let mut previous = 0;
    for _ in 0..3 {
        gl.clear_calls();
        rhi.submit_command_buffer(&cb);
        // resetting issues nothing
        assert_eq!(gl.names(), vec!["QueryCounter"]);
        let mut data = [0u8; 8];
        assert!(rhi.get_query_pool_results(&pool, &mut data, 2, 1, 8, QueryResultFlags::WAIT));
        let timestamp = u64::from_ne_bytes(data);
        assert!(timestamp >= previous);
        previous = timestamp;
    }
    assert!(previous > 0);
}

#[test]
fn failed_factories_leave_references_alone() {
    let gl = Rc::new(RecordingGl::new());
    gl.remove_extension("GL_ARB_tessellation_shader");
    gl.remove_extension("GL_ARB_draw_indirect");
    let rhi = backend(&gl);
    let rs = empty_root_signature(&rhi);
    let lang = rhi.shader_language().unwrap();
    let vs = lang
        .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(VS))
        .unwrap();
    let program = lang
        .create_graphics_program(&rs, &[], Some(&vs), None, None, None, None)
        .unwrap();
    let render_pass = rhi
        .create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)
        .unwrap();
    let counts = |rs: &Rc<RootSignature>| {
        (
            Rc::strong_count(rs),
            Rc::strong_count(&program),
            Rc::strong_count(&render_pass),
        )
    };
    let before = counts(&rs);

    let mut desc = GraphicsPipelineStateDesc::new(&rs, &program, &render_pass, &[]);
    desc.primitive_topology = PrimitiveTopology::PatchList(3);
    assert_eq!(
        rhi.create_graphics_pipeline_state(desc).unwrap_err(),
        rhi::Error::unsupported("GL_ARB_tessellation_shader")
    );
    assert_eq!(counts(&rs), before);

    let buffers = rhi.create_buffer_manager().unwrap();
    assert!(buffers
        .create_indirect_buffer(
            16,
            None,
            IndirectBufferFlags::DRAW_ARGUMENTS,
            BufferUsage::StaticDraw
        )
        .is_err());
}

#[test]
fn framebuffers_need_framebuffer_objects() {
    init_logger();
    let gl = Rc::new(RecordingGl::legacy(
        2,
        1,
        &["GL_ARB_vertex_buffer_object", "GL_ARB_shader_objects"],
    ));
    let rhi = OpenGlRhi::new(gl.clone(), gl.clone(), BackendConfig::default()).unwrap();
    let texture = rhi
        .create_texture_manager()
        .create_texture_2d(
            16,
            16,
            TextureFormat::R8G8B8A8,
            None,
            TextureFlags::RENDER_TARGET,
            TextureUsage::Default,
            1,
        )
        .unwrap();
    let render_pass = rhi
        .create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)
        .unwrap();
    assert!(rhi
        .create_framebuffer(&render_pass, &[FramebufferAttachment::new(&texture)], None)
        .is_err());
    assert_eq!(Rc::strong_count(&texture), 1);
    assert_eq!(Rc::strong_count(&render_pass), 1);
}

#[test]
fn buffer_copies_with_and_without_direct_state_access() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let buffers = rhi.create_buffer_manager().unwrap();
    let a = buffers
        .create_vertex_buffer(64, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let b = buffers
        .create_vertex_buffer(32, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.copy_resource(&b, &a);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(
        gl.calls(),
        vec![format!(
            "CopyNamedBufferSubData({}, {}, 0, 0, 32)",
            a.raw().name(),
            b.raw().name()
        )]
    );

    let gl = Rc::new(RecordingGl::new());
    gl.remove_extension("GL_ARB_direct_state_access");
    gl.remove_extension("GL_EXT_direct_state_access");
    let mut rhi = backend(&gl);
    let buffers = rhi.create_buffer_manager().unwrap();
    let a = buffers
        .create_vertex_buffer(64, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let b = buffers
        .create_vertex_buffer(64, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.copy_resource(&b, &a);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert!(gl.contains(&format!(
        "CopyBufferSubData({}, {}, 0, 0, 64)",
        gl::COPY_READ_BUFFER,
        gl::COPY_WRITE_BUFFER
    )));
    assert!(gl.contains(&format!(
        "BindBuffer({}, {})",
        gl::COPY_READ_BUFFER,
        a.raw().name()
    )));
    assert_eq!(gl.count("CopyNamedBufferSubData"), 0);
}

#[test]
fn vertex_array_is_rebound_after_creating_another() {
    let gl = Rc::new(RecordingGl::new());
    // vertex array objects without direct state access
    gl.remove_extension("GL_ARB_direct_state_access");
    let mut rhi = backend_without_restore(&gl);
    let rs = empty_root_signature(&rhi);
    let pso = pipeline_state(&rhi, &rs, PrimitiveTopology::TriangleList).unwrap();
    let buffers = rhi.create_buffer_manager().unwrap();
    let vb = buffers
        .create_vertex_buffer(36, None, BufferFlags::empty(), BufferUsage::StaticDraw)
        .unwrap();
    let first = buffers
        .create_vertex_array(&position(), vec![VertexArrayVertexBuffer::new(&vb)], None)
        .unwrap();
    rhi.set_graphics_root_signature(Some(&rs));
    rhi.set_graphics_pipeline_state(Some(&pso));
    rhi.set_graphics_vertex_array(Some(&first));

    // leaves its own vertex array object bound
    let second = buffers
        .create_vertex_array(&position(), vec![VertexArrayVertexBuffer::new(&vb)], None)
        .unwrap();
    assert!(gl.contains(&format!("BindVertexArray({})", second.name())));

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_vertex_array(Some(&first));
    cb.draw_graphics_emulated(&[draw(0, 3)]);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(
        gl.calls(),
        vec![
            format!("BindVertexArray({})", first.name()),
            format!("DrawArrays({}, 0, 3)", gl::TRIANGLES),
        ]
    );

    // and only once
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(gl.count("BindVertexArray"), 0);
}

#[test]
fn render_target_is_rebound_after_creating_another_framebuffer() {
    let gl = Rc::new(RecordingGl::new());
    gl.remove_extension("GL_ARB_direct_state_access");
    gl.remove_extension("GL_EXT_direct_state_access");
    let mut rhi = backend_without_restore(&gl);
    let textures = rhi.create_texture_manager();
    let color_texture = || {
        textures
            .create_texture_2d(
                16,
                16,
                TextureFormat::R8G8B8A8,
                None,
                TextureFlags::RENDER_TARGET,
                TextureUsage::Default,
                1,
            )
            .unwrap()
    };
    let render_pass = rhi
        .create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)
        .unwrap();
    let first_color = color_texture();
    let first = rhi
        .create_framebuffer(&render_pass, &[FramebufferAttachment::new(&first_color)], None)
        .unwrap();
    rhi.set_graphics_render_target(Some(first.clone().into()));

    // the bind path leaves the new framebuffer bound for drawing
    let second_color = color_texture();
    let second = rhi
        .create_framebuffer(&render_pass, &[FramebufferAttachment::new(&second_color)], None)
        .unwrap();
    assert!(gl.contains(&format!(
        "BindFramebuffer({}, {})",
        gl::DRAW_FRAMEBUFFER,
        second.name()
    )));

    let mut cb = CommandBuffer::<OpenGl>::new();
    cb.set_graphics_render_target(Some(&first));
    cb.clear_graphics(ClearFlags::COLOR, [0.0, 0.0, 0.0, 1.0], 1.0, 0);
    gl.clear_calls();
    rhi.submit_command_buffer(&cb);
    assert_eq!(
        gl.names(),
        vec!["BindFramebuffer", "ClearColor", "Clear"]
    );
    assert_eq!(
        gl.calls()[0],
        format!("BindFramebuffer({}, {})", gl::DRAW_FRAMEBUFFER, first.name())
    );
    assert_eq!(Rc::strong_count(&first), 3);
}

#[test]
fn scene_with_a_swap_chain() {
    let gl = Rc::new(RecordingGl::new());
    let mut rhi = backend(&gl);
    let render_pass = rhi
        .create_render_pass(&[TextureFormat::R8G8B8A8], None, 1)
        .unwrap();
    let swap_chain = rhi.create_swap_chain(&render_pass).unwrap();
    assert!(rhi.begin_scene());
    rhi.submit_with(|cb| {
        cb.set_graphics_render_target(Some(&swap_chain));
        cb.clear_graphics(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0; 4], 1.0, 0);
    });
    rhi.end_scene();
    swap_chain.present();
    rhi.flush();
    let names = gl.names();
    assert_eq!(names.last().map(String::as_str), Some("Flush"));
    assert!(names.iter().any(|n| n == "SwapBuffers"));
    assert_eq!(Rc::strong_count(&swap_chain), 1);
}
