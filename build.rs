//! Build script for the node gRPC schema
//! Compiles proto definitions with the vendored protoc so no system install is needed

use std::env;

fn main() {
    let protoc = protoc_bin_vendored::protoc_bin_path()
        .expect("Vendored protoc not available for this platform");
    env::set_var("PROTOC", protoc);

    println!("cargo:rerun-if-changed=proto/");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/companion/v1/node.proto"], &["proto"])
        .expect("Failed to compile node.proto");
}
