//! OpenGL backend of the render hardware interface.
//!
//! `OpenGlRhi` wraps a native context and creates backend objects through it. Command buffers
//! recorded against the `OpenGl` backend are replayed on submission, with redundant native
//! state changes filtered out by a per-context state cache.
//!
//! The same code runs on contexts from 2.1 with extensions up to 4.6 core: direct state access,
//! separate shader objects, vertex array objects and sampler objects are each used when the
//! context has them and emulated through the bind paths otherwise (see `strategy`).
#[macro_use]
extern crate log;

pub mod api;
pub mod backend;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod debug;
pub mod dispatch;
pub mod extensions;
pub mod mapping;
pub mod native;
pub mod pipeline;
pub mod resource;
pub mod resource_group;
pub mod root_signature;
pub mod shader;
pub mod state;
pub mod strategy;
#[cfg(feature = "glutin")]
pub mod window;

pub use crate::backend::{OpenGl, OpenGlRhi, RenderTarget};
pub use crate::capabilities::Capabilities;
pub use crate::config::BackendConfig;
pub use crate::context::GlContext;
pub use crate::extensions::Extensions;
pub use crate::native::{ExternalContext, GlApi, NativeContext, ProcAddressLoader, RecordingGl};
pub use crate::pipeline::{ComputePipelineState, GraphicsPipelineState, GraphicsPipelineStateDesc};
pub use crate::resource::*;
pub use crate::resource_group::ResourceGroup;
pub use crate::root_signature::RootSignature;
pub use crate::shader::{
    GeometryShaderParameters, GraphicsProgram, Shader, ShaderBytecode, ShaderCompiler,
    ShaderLanguage, ShaderSourceCode, ShaderStage, UniformHandle,
};
#[cfg(feature = "glutin")]
pub use crate::window::{create_rhi_and_window, GlutinContext};
