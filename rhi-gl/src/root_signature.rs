//! Root signatures.
use crate::resource::{GlResource, SamplerState};
use crate::resource_group::ResourceGroup;
use rhi::{Error, Result, RootSignatureDesc};
use std::rc::Rc;

/// An immutable copy of a root signature description.
///
/// Pipeline states and the backend hold it through an `Rc`. Resource groups only remember the
/// root parameter they were created for.
#[derive(Debug)]
pub struct RootSignature {
    desc: RootSignatureDesc,
}

impl RootSignature {
    pub(crate) fn new(desc: &RootSignatureDesc) -> RootSignature {
        for (i, range) in desc.all_ranges() {
            debug_assert!(
                range.number_of_descriptors == 1,
                "root parameter {}: ranges hold exactly one descriptor",
                i
            );
        }
        RootSignature { desc: desc.clone() }
    }

    pub fn desc(&self) -> &RootSignatureDesc {
        &self.desc
    }

    /// Groups resources for the descriptor table at `root_parameter_index`; resource `i` goes to
    /// range `i`. `sampler_states`, if given, pairs a sampler with each texture.
    pub fn create_resource_group(
        &self,
        root_parameter_index: u32,
        resources: Vec<GlResource>,
        sampler_states: Option<Vec<Option<Rc<SamplerState>>>>,
    ) -> Result<Rc<ResourceGroup>> {
        let parameter = match self.desc.parameters.get(root_parameter_index as usize) {
            Some(p) if p.is_descriptor_table() => p,
            Some(_) => {
                return Err(Error::InvalidDescription(
                    "resource groups need a descriptor table root parameter",
                ))
            }
            None => return Err(Error::InvalidDescription("root parameter index out of range")),
        };
        debug_assert_eq!(
            resources.len(),
            parameter.ranges().len(),
            "resource count does not match the descriptor table"
        );
        if let Some(samplers) = &sampler_states {
            debug_assert_eq!(
                samplers.len(),
                resources.len(),
                "sampler state count does not match the resource count"
            );
        }
        Ok(Rc::new(ResourceGroup::new(
            &self.desc,
            root_parameter_index,
            resources,
            sampler_states,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhi::{DescriptorRange, DescriptorRangeType, ResourceType, RootParameter, ShaderVisibility};

    #[test]
    fn deep_copy_of_the_description() {
        let mut desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![
            DescriptorRange::new(
                DescriptorRangeType::Ubv,
                0,
                "UniformBlock",
                ResourceType::UniformBuffer,
                ShaderVisibility::All,
            ),
        ])]);
        let rs = RootSignature::new(&desc);
        desc.parameters.clear();
        assert_eq!(rs.desc().parameters.len(), 1);
        assert_eq!(
            rs.desc().range(0, 0).map(|r| r.base_shader_register_name.as_str()),
            Some("UniformBlock")
        );
    }

    #[test]
    fn resource_groups_need_a_descriptor_table() {
        let desc = RootSignatureDesc::new(vec![RootParameter::Constants {
            shader_register: 0,
            register_space: 0,
            number_of_32bit_values: 4,
            shader_visibility: ShaderVisibility::All,
        }]);
        let rs = RootSignature::new(&desc);
        assert!(rs.create_resource_group(0, Vec::new(), None).is_err());
        assert!(rs.create_resource_group(1, Vec::new(), None).is_err());
    }
}
