//! Generated gRPC bindings for `proto/companion/v1/node.proto`

#![allow(clippy::all)]

pub mod v1 {
    tonic::include_proto!("companion.v1");
}
