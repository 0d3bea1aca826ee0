//! Root signatures: the backend-independent description of a shader resource binding layout.
//!
//! A root signature is an ordered list of root parameters. Descriptor-table parameters
//! contain ranges of SRV/UAV/UBV/sampler slots; each range carries the shader register it starts
//! at and the name of the shader variable that backends without register semantics (OpenGL)
//! use to find the binding.

use crate::resource::ResourceType;
use crate::state::SamplerStateDesc;
use bitflags::bitflags;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DescriptorRangeType {
    /// Shader resource view: read-only texture or buffer.
    Srv,
    /// Unordered access view: read-write image or buffer.
    Uav,
    /// Uniform buffer view.
    Ubv,
    Sampler,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShaderVisibility {
    All,
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Task,
    Mesh,
    Compute,
    AllGraphics,
}

impl Default for ShaderVisibility {
    fn default() -> Self {
        ShaderVisibility::All
    }
}

/// A contiguous range of shader registers of one kind within a descriptor table.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DescriptorRange {
    pub range_type: DescriptorRangeType,
    pub number_of_descriptors: u32,
    pub base_shader_register: u32,
    pub register_space: u32,
    /// Name of the shader variable (uniform block, sampler, image...) bound by this range.
    pub base_shader_register_name: String,
    /// For SRV texture ranges: root parameter index of the matching sampler table, if any.
    pub sampler_root_parameter_index: u32,
    /// Kind of resource expected in this range.
    pub resource_type: ResourceType,
    pub shader_visibility: ShaderVisibility,
}

impl DescriptorRange {
    pub fn new(
        range_type: DescriptorRangeType,
        base_shader_register: u32,
        base_shader_register_name: &str,
        resource_type: ResourceType,
        shader_visibility: ShaderVisibility,
    ) -> DescriptorRange {
        DescriptorRange {
            range_type,
            number_of_descriptors: 1,
            base_shader_register,
            register_space: 0,
            base_shader_register_name: base_shader_register_name.to_owned(),
            sampler_root_parameter_index: 0,
            resource_type,
            shader_visibility,
        }
    }

    /// Sampler range; samplers have no resource kind of their own.
    pub fn sampler(
        base_shader_register: u32,
        shader_visibility: ShaderVisibility,
    ) -> DescriptorRange {
        DescriptorRange::new(
            DescriptorRangeType::Sampler,
            base_shader_register,
            "",
            ResourceType::SamplerState,
            shader_visibility,
        )
    }

    pub fn with_sampler_root_parameter_index(mut self, index: u32) -> DescriptorRange {
        self.sampler_root_parameter_index = index;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RootParameter {
    DescriptorTable {
        ranges: Vec<DescriptorRange>,
        shader_visibility: ShaderVisibility,
    },
    Constants {
        shader_register: u32,
        register_space: u32,
        number_of_32bit_values: u32,
        shader_visibility: ShaderVisibility,
    },
    Cbv {
        shader_register: u32,
        register_space: u32,
        shader_visibility: ShaderVisibility,
    },
    Srv {
        shader_register: u32,
        register_space: u32,
        shader_visibility: ShaderVisibility,
    },
    Uav {
        shader_register: u32,
        register_space: u32,
        shader_visibility: ShaderVisibility,
    },
}

impl RootParameter {
    pub fn descriptor_table(ranges: Vec<DescriptorRange>) -> RootParameter {
        RootParameter::DescriptorTable {
            ranges,
            shader_visibility: ShaderVisibility::All,
        }
    }

    /// Descriptor ranges of a descriptor table, empty for every other parameter kind.
    pub fn ranges(&self) -> &[DescriptorRange] {
        match self {
            RootParameter::DescriptorTable { ranges, .. } => ranges,
            _ => &[],
        }
    }

    pub fn is_descriptor_table(&self) -> bool {
        match self {
            RootParameter::DescriptorTable { .. } => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StaticSampler {
    pub desc: SamplerStateDesc,
    pub shader_register: u32,
    pub register_space: u32,
    pub shader_visibility: ShaderVisibility,
}

bitflags! {
    #[derive(Default)]
    pub struct RootSignatureFlags: u32 {
        const NONE = 0;
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 1 << 0;
        const DENY_VERTEX_SHADER_ROOT_ACCESS = 1 << 1;
        const DENY_HULL_SHADER_ROOT_ACCESS = 1 << 2;
        const DENY_DOMAIN_SHADER_ROOT_ACCESS = 1 << 3;
        const DENY_GEOMETRY_SHADER_ROOT_ACCESS = 1 << 4;
        const DENY_PIXEL_SHADER_ROOT_ACCESS = 1 << 5;
        const ALLOW_STREAM_OUTPUT = 1 << 6;
    }
}

/// Owned root signature description.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
    pub static_samplers: Vec<StaticSampler>,
    pub flags: RootSignatureFlags,
}

impl RootSignatureDesc {
    pub fn new(parameters: Vec<RootParameter>) -> RootSignatureDesc {
        RootSignatureDesc {
            parameters,
            static_samplers: Vec::new(),
            flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        }
    }

    /// Descriptor range `range_index` of root parameter `root_parameter_index`, if any.
    pub fn range(&self, root_parameter_index: u32, range_index: u32) -> Option<&DescriptorRange> {
        self.parameters
            .get(root_parameter_index as usize)
            .and_then(|p| p.ranges().get(range_index as usize))
    }

    /// Iterator over every descriptor range of every descriptor table, in declaration order.
    pub fn all_ranges(&self) -> impl Iterator<Item = (u32, &DescriptorRange)> {
        self.parameters
            .iter()
            .enumerate()
            .flat_map(|(i, p)| p.ranges().iter().map(move |r| (i as u32, r)))
    }
}

/// Number of uniform buffer ranges declared in descriptor tables before `root_parameter_index`.
///
/// Uniform buffer binding points form one flat namespace across the whole root signature, so
/// this is the first binding point available to the ranges of the given parameter.
pub fn uniform_block_binding_offset(parameters: &[RootParameter], root_parameter_index: u32) -> u32 {
    parameters
        .iter()
        .take(root_parameter_index as usize)
        .flat_map(|p| p.ranges())
        .filter(|r| r.range_type == DescriptorRangeType::Ubv)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ubv(register: u32, name: &str) -> DescriptorRange {
        DescriptorRange::new(
            DescriptorRangeType::Ubv,
            register,
            name,
            ResourceType::UniformBuffer,
            ShaderVisibility::All,
        )
    }

    fn srv(register: u32, name: &str) -> DescriptorRange {
        DescriptorRange::new(
            DescriptorRangeType::Srv,
            register,
            name,
            ResourceType::Texture2D,
            ShaderVisibility::Fragment,
        )
    }

    #[test]
    fn ubv_offset_counts_preceding_tables_only() {
        let params = vec![
            RootParameter::descriptor_table(vec![ubv(0, "A"), srv(0, "t0"), ubv(1, "B")]),
            RootParameter::Constants {
                shader_register: 0,
                register_space: 0,
                number_of_32bit_values: 4,
                shader_visibility: ShaderVisibility::All,
            },
            RootParameter::descriptor_table(vec![ubv(2, "C")]),
            RootParameter::descriptor_table(vec![DescriptorRange::sampler(0, ShaderVisibility::All)]),
        ];
        assert_eq!(uniform_block_binding_offset(&params, 0), 0);
        assert_eq!(uniform_block_binding_offset(&params, 1), 2);
        assert_eq!(uniform_block_binding_offset(&params, 2), 2);
        assert_eq!(uniform_block_binding_offset(&params, 3), 3);
        assert_eq!(uniform_block_binding_offset(&params, 10), 3);
    }

    #[test]
    fn range_lookup() {
        let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![
            ubv(0, "PassUniformBuffer"),
            srv(0, "AlbedoMap"),
        ])]);
        assert_eq!(desc.range(0, 1).unwrap().base_shader_register_name, "AlbedoMap");
        assert!(desc.range(0, 2).is_none());
        assert!(desc.range(1, 0).is_none());
        assert_eq!(desc.all_ranges().count(), 2);
    }
}
