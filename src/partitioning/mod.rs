//! Spatial partitioning tools.

pub use self::bvh::{
    build_bvh, refit_bvh, required_node_capacity, try_build_bvh, Bounded, Bvh, BvhBuildError,
    BvhBuildOptions, BvhNode, BvhWorkspace, PrimitiveSet, DEFAULT_BIN_COUNT, MAX_BINS,
    MAX_PRIMITIVES,
};

mod bvh;
