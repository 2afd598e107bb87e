//! Pathway enumeration: every end-to-end way of computing a target from the
//! measured leaves.
pub mod enumerator;
pub mod parameterization;
pub mod tree;

pub use enumerator::PathwayEnumerator;
pub use parameterization::{Branch, MergePoint, Parameterization, Segment};
pub use tree::PathTree;
