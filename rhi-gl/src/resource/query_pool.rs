//! Query pools.
//!
//! Occlusion and timestamp queries use one native query per index. Pipeline statistics use one
//! native query per counter, eleven per index.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use rhi::{
    Error, PipelineStatisticsQueryResult, QueryControlFlags, QueryResultFlags, QueryType, Result,
};
use std::fmt;
use std::rc::Rc;

/// Native query targets, in `PipelineStatisticsQueryResult` field order.
const PIPELINE_STATISTICS_TARGETS: [GLenum; 11] = [
    gl::VERTICES_SUBMITTED,
    gl::PRIMITIVES_SUBMITTED,
    gl::VERTEX_SHADER_INVOCATIONS,
    gl::GEOMETRY_SHADER_INVOCATIONS,
    gl::GEOMETRY_SHADER_PRIMITIVES_EMITTED,
    gl::CLIPPING_INPUT_PRIMITIVES,
    gl::CLIPPING_OUTPUT_PRIMITIVES,
    gl::FRAGMENT_SHADER_INVOCATIONS,
    gl::TESS_CONTROL_SHADER_PATCHES,
    gl::TESS_EVALUATION_SHADER_INVOCATIONS,
    gl::COMPUTE_SHADER_INVOCATIONS,
];

pub struct QueryPool {
    ctx: Rc<GlContext>,
    query_type: QueryType,
    number_of_queries: u32,
    names: Vec<GLuint>,
}

impl QueryPool {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        query_type: QueryType,
        number_of_queries: u32,
    ) -> Result<QueryPool> {
        let ext = &ctx.extensions;
        let (feature, supported) = match query_type {
            QueryType::Occlusion => ("GL_ARB_occlusion_query", ext.arb_occlusion_query()),
            QueryType::PipelineStatistics => (
                "GL_ARB_pipeline_statistics_query",
                ext.arb_pipeline_statistics_query(),
            ),
            QueryType::Timestamp => ("GL_ARB_timer_query", ext.arb_timer_query()),
        };
        if !supported {
            error!("{:?} query pools need {}", query_type, feature);
            return Err(Error::unsupported(feature));
        }
        if number_of_queries == 0 {
            return Err(Error::InvalidDescription("empty query pool"));
        }

        let per_query = Self::natives_per_query(query_type);
        let gl = ctx.gl();
        let names = (0..number_of_queries as usize * per_query)
            .map(|_| gl.gen_query())
            .collect();
        Ok(QueryPool {
            ctx: ctx.clone(),
            query_type,
            number_of_queries,
            names,
        })
    }

    fn natives_per_query(query_type: QueryType) -> usize {
        match query_type {
            QueryType::PipelineStatistics => PIPELINE_STATISTICS_TARGETS.len(),
            _ => 1,
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn number_of_queries(&self) -> u32 {
        self.number_of_queries
    }

    /// Native queries backing the query at `index`.
    pub fn names(&self, index: u32) -> &[GLuint] {
        debug_assert!(index < self.number_of_queries, "query index out of range");
        let n = Self::natives_per_query(self.query_type);
        let start = index as usize * n;
        &self.names[start..start + n]
    }

    /// Queries need no reset.
    pub fn reset(&self, first_query_index: u32, number_of_queries: u32) {
        trace!(
            "reset_query_pool({}, {}): nothing to do",
            first_query_index,
            number_of_queries
        );
    }

    pub fn begin_query(&self, index: u32, _flags: QueryControlFlags) {
        let gl = self.ctx.gl();
        match self.query_type {
            QueryType::Occlusion => gl.begin_query(gl::SAMPLES_PASSED, self.names(index)[0]),
            QueryType::PipelineStatistics => {
                for (&target, &name) in PIPELINE_STATISTICS_TARGETS.iter().zip(self.names(index))
                {
                    gl.begin_query(target, name);
                }
            }
            QueryType::Timestamp => {
                debug_assert!(false, "timestamp queries are written, not begun");
            }
        }
    }

    pub fn end_query(&self, index: u32) {
        let gl = self.ctx.gl();
        match self.query_type {
            QueryType::Occlusion => gl.end_query(gl::SAMPLES_PASSED),
            QueryType::PipelineStatistics => {
                debug_assert!(index < self.number_of_queries, "query index out of range");
                for &target in PIPELINE_STATISTICS_TARGETS.iter() {
                    gl.end_query(target);
                }
            }
            QueryType::Timestamp => {
                debug_assert!(false, "timestamp queries are written, not ended");
            }
        }
    }

    pub fn write_timestamp(&self, index: u32) {
        debug_assert_eq!(self.query_type, QueryType::Timestamp);
        self.ctx
            .gl()
            .query_counter(self.names(index)[0], gl::TIMESTAMP);
    }

    /// Writes `number_of_queries` results starting at `first_query_index` into `data`, one every
    /// `stride` bytes (0 for tightly packed). Without `WAIT`, returns false and writes nothing if
    /// a result is not available yet.
    pub fn get_results(
        &self,
        data: &mut [u8],
        first_query_index: u32,
        number_of_queries: u32,
        stride: usize,
        flags: QueryResultFlags,
    ) -> bool {
        debug_assert!(
            first_query_index + number_of_queries <= self.number_of_queries,
            "query range out of bounds"
        );
        let result_size = self.query_type.result_size();
        let stride = if stride == 0 { result_size } else { stride };
        debug_assert!(stride >= result_size, "stride smaller than a query result");
        if number_of_queries == 0 {
            return true;
        }
        debug_assert!(
            data.len() >= (number_of_queries as usize - 1) * stride + result_size,
            "query result buffer too small"
        );

        let gl = self.ctx.gl();
        let range = first_query_index..first_query_index + number_of_queries;
        if !flags.contains(QueryResultFlags::WAIT) {
            let available = range.clone().all(|q| {
                self.names(q)
                    .iter()
                    .all(|&name| gl.get_query_object_u32(name, gl::QUERY_RESULT_AVAILABLE) != 0)
            });
            if !available {
                return false;
            }
        }

        for (i, q) in range.enumerate() {
            let out = &mut data[i * stride..i * stride + result_size];
            let values: Vec<u64> = self
                .names(q)
                .iter()
                .map(|&name| gl.get_query_object_u64(name, gl::QUERY_RESULT))
                .collect();
            match self.query_type {
                QueryType::PipelineStatistics => {
                    let result = PipelineStatisticsQueryResult {
                        input_assembler_vertices: values[0],
                        input_assembler_primitives: values[1],
                        vertex_shader_invocations: values[2],
                        geometry_shader_invocations: values[3],
                        geometry_shader_primitives: values[4],
                        clipping_input_primitives: values[5],
                        clipping_output_primitives: values[6],
                        fragment_shader_invocations: values[7],
                        hull_shader_invocations: values[8],
                        domain_shader_invocations: values[9],
                        compute_shader_invocations: values[10],
                    };
                    out.copy_from_slice(bytemuck::bytes_of(&result));
                }
                _ => out.copy_from_slice(&values[0].to_ne_bytes()),
            }
        }
        true
    }
}

impl Drop for QueryPool {
    fn drop(&mut self) {
        let gl = self.ctx.gl();
        for &name in &self.names {
            gl.delete_query(name);
        }
    }
}

impl fmt::Debug for QueryPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("QueryPool")
            .field("query_type", &self.query_type)
            .field("number_of_queries", &self.number_of_queries)
            .finish()
    }
}
