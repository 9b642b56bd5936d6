pub use bvh_bins::MAX_BINS;
pub use bvh_build::{
    build_bvh, required_node_capacity, try_build_bvh, BvhBuildError, MAX_PRIMITIVES,
};
pub use bvh_primitives::{Bounded, PrimitiveSet};
pub use bvh_refit::refit_bvh;
pub use bvh_tree::{Bvh, BvhBuildOptions, BvhNode, BvhWorkspace, DEFAULT_BIN_COUNT};

mod bvh_bins;
mod bvh_build;
mod bvh_primitives;
mod bvh_refit;
mod bvh_split;
mod bvh_tree;
mod bvh_validation;
