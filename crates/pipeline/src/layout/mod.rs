//! Spatial layout: position, size and colour for every node
//!
//! The root sits at the origin. Its children are spread over a Fibonacci
//! sphere; every deeper child heads in a blend of its own embedding
//! direction and its parent's branch direction. Radial distance comes from
//! modification time within the sibling group and shrinks geometrically
//! with depth.

mod distance;
mod sphere;
mod visuals;

pub use distance::sibling_distances;
pub use sphere::{fibonacci_sphere, reduce_to_3d, Vec3, REFERENCE_DIRECTION};
pub use visuals::{
    apply_visuals, extension_color, node_color, node_size, type_color, DEFAULT_FILE_COLOR,
    DEFAULT_TYPE_COLOR,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use repograph_core::config::LayoutConfig;
use repograph_core::node::Node;
use sphere::{add, normalize_or_reference, scale};
use tracing::debug;

/// Computes positions, sizes and colours
pub struct LayoutEngine {
    config: LayoutConfig,
    rng: StdRng,
}

impl LayoutEngine {
    /// Create an engine; a configured seed makes the root-level rotation,
    /// and therefore the whole layout, reproducible
    pub fn new(config: LayoutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Lay out the whole tree rooted at `root`
    pub fn apply(&mut self, root: &mut Node) {
        self.set_positions(root);
        apply_visuals(root, self.config.size_scale);
    }

    /// Position the root and, recursively, every descendant
    pub fn set_positions(&mut self, root: &mut Node) {
        root.position = [0.0; 3];
        if root.children.is_empty() {
            return;
        }

        let count = root.children.len();
        let rotation = self.rng.gen::<f64>() * count as f64;
        let directions = fibonacci_sphere(count, rotation);
        let distances = sibling_distances(&root.children, &self.config);
        let decay = self.config.decay_factor;

        for ((child, direction), d) in root.children.iter_mut().zip(directions).zip(distances) {
            child.position = scale(direction, d * decay);
            self.place_children(child, 1, direction);
        }

        debug!("Positioned {} nodes", root.count());
    }

    fn place_children(&self, node: &mut Node, depth: i32, branch: Vec3) {
        if node.children.is_empty() {
            return;
        }

        let distances = sibling_distances(&node.children, &self.config);
        let alpha = self.config.blend_alpha;
        let decay = self.config.decay_factor.powi(depth + 1);
        let origin = node.position;

        for (child, d) in node.children.iter_mut().zip(distances) {
            let own = reduce_to_3d(&child.embedding);
            let blended = add(scale(own, alpha), scale(branch, 1.0 - alpha));
            let direction = normalize_or_reference(blended);
            child.position = add(origin, scale(direction, d * decay));
            self.place_children(child, depth + 1, direction);
        }
    }
}
