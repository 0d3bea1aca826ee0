//! OpenGL bindings generated by `gl_generator` (see `build.rs`).
#![allow(
    clippy::all,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    dead_code,
    unused_imports
)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
