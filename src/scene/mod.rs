//! Scene graph module.
//!
//! Manages the avatar's node hierarchy and skeleton instances:
//! - Node: scene node (parent/child relationships, transform, joint flag)
//! - Transform: TRS component with matrix caching and dirty checking
//! - Scene: node container and hierarchy operations
//! - SkeletonInstance: a skeleton reconstructed from a loaded skin
//! - transform_system: decoupled world-matrix update

pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use node::Node;
pub use scene::Scene;
pub use skeleton::SkeletonInstance;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
