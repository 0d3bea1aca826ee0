//! Resource groups and their binding.
//!
//! Textures are bound to the texture unit equal to the range's base register, images to the
//! image unit equal to it, and raw buffers to the shader storage binding equal to it. Uniform
//! buffer binding points are numbered separately: one flat sequence over every uniform buffer
//! range of the root signature, in declaration order.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::mapping::texture_format_to_gl;
use crate::resource::{GlResource, SamplerState};
use crate::state::Binding;
use crate::strategy::DsaMode;
use rhi::root_signature::uniform_block_binding_offset;
use rhi::{DescriptorRange, DescriptorRangeType, RootSignatureDesc};
use std::rc::Rc;

#[derive(Debug)]
pub struct ResourceGroup {
    root_parameter_index: u32,
    resources: Vec<GlResource>,
    sampler_states: Option<Vec<Option<Rc<SamplerState>>>>,
    /// Uniform block binding point of each resource, `None` for non uniform buffer ranges.
    /// Only allocated if the descriptor table has uniform buffer ranges.
    uniform_block_binding_indices: Option<Vec<Option<u32>>>,
}

impl ResourceGroup {
    pub(crate) fn new(
        desc: &RootSignatureDesc,
        root_parameter_index: u32,
        resources: Vec<GlResource>,
        sampler_states: Option<Vec<Option<Rc<SamplerState>>>>,
    ) -> ResourceGroup {
        let ranges = desc.parameters[root_parameter_index as usize].ranges();
        let uniform_block_binding_indices =
            if ranges.iter().any(|r| r.range_type == DescriptorRangeType::Ubv) {
                let mut next = uniform_block_binding_offset(&desc.parameters, root_parameter_index);
                Some(
                    ranges
                        .iter()
                        .map(|r| {
                            if r.range_type == DescriptorRangeType::Ubv {
                                let index = next;
                                next += 1;
                                Some(index)
                            } else {
                                None
                            }
                        })
                        .collect(),
                )
            } else {
                None
            };

        ResourceGroup {
            root_parameter_index,
            resources,
            sampler_states,
            uniform_block_binding_indices,
        }
    }

    pub fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    pub fn resources(&self) -> &[GlResource] {
        &self.resources
    }

    pub fn sampler_state(&self, index: usize) -> Option<&Rc<SamplerState>> {
        self.sampler_states
            .as_ref()
            .and_then(|s| s.get(index))
            .and_then(Option::as_ref)
    }

    /// Uniform block binding point of the resource at `index`, if it sits in a uniform buffer
    /// range.
    pub fn uniform_block_binding_index(&self, index: usize) -> Option<u32> {
        self.uniform_block_binding_indices
            .as_ref()
            .and_then(|m| m.get(index).cloned())
            .and_then(|i| i)
    }

    /// Binds every resource of the group. `ranges` are the ranges of the root parameter in the
    /// current root signature.
    pub(crate) fn bind(&self, ctx: &GlContext, ranges: &[DescriptorRange]) {
        debug_assert!(
            ranges.len() >= self.resources.len(),
            "resource group does not fit the current root signature"
        );
        let dsa = ctx.strategies.dsa;
        let _restore = if dsa == DsaMode::Bind {
            Some(ctx.save_binding(Binding::ActiveTexture))
        } else {
            None
        };
        for (i, (resource, range)) in self.resources.iter().zip(ranges).enumerate() {
            self.bind_resource(ctx, i, resource, range);
        }
    }

    fn bind_resource(
        &self,
        ctx: &GlContext,
        index: usize,
        resource: &GlResource,
        range: &DescriptorRange,
    ) {
        let gl = ctx.gl();
        let register = range.base_shader_register;
        match (range.range_type, resource) {
            (DescriptorRangeType::Sampler, _) => {}

            (DescriptorRangeType::Srv, GlResource::Texture(texture)) => {
                bind_texture_unit(ctx, register, texture.target(), texture.name());
                if let Some(sampler) = self.sampler_state(index) {
                    if sampler.native().is_some() {
                        sampler.bind_to_unit(register);
                    } else if !texture.is_multisample() {
                        sampler.apply_to_texture(
                            ctx.strategies.dsa,
                            texture.name(),
                            texture.target(),
                        );
                    }
                }
            }
            (DescriptorRangeType::Srv, GlResource::TextureBuffer(tb)) => {
                // buffer textures have no sampler
                bind_texture_unit(ctx, register, gl::TEXTURE_BUFFER, tb.texture());
            }

            (DescriptorRangeType::Uav, GlResource::Texture(texture)) => {
                if ctx.extensions.arb_shader_image_load_store() {
                    gl.bind_image_texture(
                        register,
                        texture.name(),
                        0,
                        texture.is_layered() as GLboolean,
                        0,
                        gl::READ_WRITE,
                        texture.internal_format(),
                    );
                }
            }
            (DescriptorRangeType::Uav, GlResource::TextureBuffer(tb)) => {
                if ctx.extensions.arb_shader_image_load_store() {
                    let (internal_format, _, _) = texture_format_to_gl(tb.format());
                    gl.bind_image_texture(
                        register,
                        tb.texture(),
                        0,
                        gl::FALSE,
                        0,
                        gl::READ_WRITE,
                        internal_format,
                    );
                }
            }

            (DescriptorRangeType::Ubv, GlResource::UniformBuffer(ub)) => {
                if !ctx.extensions.arb_uniform_buffer_object() {
                    return;
                }
                match self.uniform_block_binding_index(index) {
                    Some(binding) => {
                        gl.bind_buffer_base(gl::UNIFORM_BUFFER, binding, ub.raw().name())
                    }
                    None => debug_assert!(false, "uniform buffer range without a binding point"),
                }
            }

            (DescriptorRangeType::Srv, _) | (DescriptorRangeType::Uav, _)
                if resource.raw_buffer().is_some() =>
            {
                // shader storage needs uniform buffer support on the targeted contexts
                if !ctx.extensions.arb_uniform_buffer_object() {
                    return;
                }
                if let Some(raw) = resource.raw_buffer() {
                    gl.bind_buffer_base(gl::SHADER_STORAGE_BUFFER, register, raw.name());
                }
            }

            (range_type, resource) => {
                error!(
                    "cannot bind {:?} to a {:?} range (`{}`)",
                    resource.resource_type(),
                    range_type,
                    range.base_shader_register_name
                );
                debug_assert!(false, "resource does not match its descriptor range");
            }
        }
    }
}

/// Binds `texture` to texture unit `unit`.
fn bind_texture_unit(ctx: &GlContext, unit: u32, target: GLenum, texture: GLuint) {
    let gl = ctx.gl();
    match ctx.strategies.dsa {
        DsaMode::Arb => gl.bind_texture_unit(unit, texture),
        DsaMode::Ext => gl.bind_multi_texture_ext(gl::TEXTURE0 + unit, target, texture),
        DsaMode::Bind => {
            gl.active_texture(gl::TEXTURE0 + unit);
            gl.bind_texture(target, texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhi::{ResourceType, RootParameter, ShaderVisibility};

    fn range(range_type: DescriptorRangeType, register: u32, name: &str) -> DescriptorRange {
        let resource_type = match range_type {
            DescriptorRangeType::Ubv => ResourceType::UniformBuffer,
            DescriptorRangeType::Sampler => ResourceType::SamplerState,
            _ => ResourceType::Texture2D,
        };
        DescriptorRange::new(range_type, register, name, resource_type, ShaderVisibility::All)
    }

    #[test]
    fn binding_points_continue_across_root_parameters() {
        let desc = RootSignatureDesc::new(vec![
            RootParameter::descriptor_table(vec![
                range(DescriptorRangeType::Ubv, 0, "A"),
                range(DescriptorRangeType::Srv, 0, "TextureA"),
                range(DescriptorRangeType::Ubv, 1, "B"),
            ]),
            RootParameter::descriptor_table(vec![range(DescriptorRangeType::Sampler, 0, "")]),
            RootParameter::descriptor_table(vec![
                range(DescriptorRangeType::Srv, 1, "TextureB"),
                range(DescriptorRangeType::Ubv, 2, "C"),
            ]),
        ]);
        // resource lists are left empty, the map only depends on the layout
        let first = ResourceGroup::new(&desc, 0, Vec::new(), None);
        assert_eq!(
            first.uniform_block_binding_indices,
            Some(vec![Some(0), None, Some(1)])
        );
        let sampler_only = ResourceGroup::new(&desc, 1, Vec::new(), None);
        assert!(sampler_only.uniform_block_binding_indices.is_none());
        let third = ResourceGroup::new(&desc, 2, Vec::new(), None);
        assert_eq!(third.uniform_block_binding_index(0), None);
        assert_eq!(third.uniform_block_binding_index(1), Some(2));

        // same inputs, same map
        let again = ResourceGroup::new(&desc, 2, Vec::new(), None);
        assert_eq!(
            again.uniform_block_binding_indices,
            third.uniform_block_binding_indices
        );
    }
}
