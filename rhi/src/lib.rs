//! Backend-agnostic render hardware interface.
//!
//! This crate holds everything a renderer and a backend need to agree on: binding layouts
//! (root signatures), fixed-function state descriptions, the packed command buffer format and
//! the traits backends implement. Backends create the actual objects.
#[macro_use]
extern crate log;

pub mod command;
pub mod error;
pub mod id;
pub mod resource;
pub mod root_signature;
pub mod state;

pub use crate::command::{CommandBuffer, CommandDispatchFunctionIndex, CommandPacket};
pub use crate::error::{Error, Result};
pub use crate::id::MakeId;
pub use crate::resource::ResourceType;
pub use crate::root_signature::{
    DescriptorRange, DescriptorRangeType, RootParameter, RootSignatureDesc, ShaderVisibility,
};
pub use crate::state::*;

use std::fmt;

/// A backend: defines the type that command buffers use to hold on to backend objects.
pub trait Backend: Sized + 'static {
    /// Any object created by the backend, reference-counted.
    type Resource: Clone + fmt::Debug;
}

/// Command submission interface of a backend instance.
pub trait Rhi<B: Backend> {
    fn name(&self) -> &'static str;

    fn is_initialized(&self) -> bool;

    /// Begins a scene. Returns false if the backend cannot render right now.
    fn begin_scene(&mut self) -> bool;

    fn end_scene(&mut self);

    /// Replays every packet of `command_buffer` in order.
    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer<B>);

    fn flush(&mut self);

    /// Blocks until all submitted work has completed.
    fn finish(&mut self);

    /// Records and submits a one-off command buffer.
    fn submit_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut CommandBuffer<B>),
        Self: Sized,
    {
        let mut command_buffer = CommandBuffer::new();
        f(&mut command_buffer);
        if command_buffer.is_empty() {
            trace!("submit_with: nothing recorded");
        }
        self.submit_command_buffer(&command_buffer);
    }
}
