use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::Path;

fn main() {
    let dest = env::var("OUT_DIR").unwrap();
    let mut file = File::create(&Path::new(&dest).join("bindings.rs")).unwrap();

    // Compatibility profile so that legacy entry points stay available to the bind paths.
    Registry::new(
        Api::Gl,
        (4, 6),
        Profile::Compatibility,
        Fallbacks::All,
        [
            "GL_EXT_direct_state_access",
            "GL_EXT_texture_filter_anisotropic",
            "GL_ARB_geometry_shader4",
            "GL_NV_mesh_shader",
        ],
    )
    .write_bindings(StructGenerator, &mut file)
    .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
