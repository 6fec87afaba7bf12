use foundation::bounds::Aabb3;
use foundation::math::precision::stable_total_cmp_f64;

/// Bounding volume hierarchy over track point boxes.
///
/// Ordering contract:
/// - Every query returns point indices in ascending order, without duplicates.
///
/// Built once per structural edit by median splits on the longest axis.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        bounds: Aabb3,
        items: Vec<Item>,
    },
    Branch {
        bounds: Aabb3,
        left: usize,
        right: usize,
    },
}

impl Node {
    fn bounds(&self) -> &Aabb3 {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub point: usize,
    pub bounds: Aabb3,
}

const LEAF_MAX: usize = 8;

impl Bvh {
    pub fn build(mut items: Vec<Item>) -> Self {
        let mut nodes = Vec::new();
        if !items.is_empty() {
            build_node(&mut nodes, &mut items);
        }
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounds of everything in the tree.
    pub fn root_bounds(&self) -> Option<Aabb3> {
        self.nodes.first().map(|n| *n.bounds())
    }

    /// Points whose boxes intersect `query`.
    pub fn query_aabb(&self, query: &Aabb3) -> Vec<usize> {
        self.collect(|bounds| bounds.intersects(query))
    }

    /// Points whose boxes, grown by `radius`, are crossed by the ray.
    ///
    /// A point within `radius` of the ray always qualifies, so this is a
    /// conservative candidate set for nearest-to-ray searches.
    pub fn query_ray(&self, origin: [f64; 3], dir: [f64; 3], radius: f64) -> Vec<usize> {
        self.collect(|bounds| ray_hits_aabb(origin, dir, &bounds.inflate(radius)))
    }

    fn collect<F>(&self, mut accept: F) -> Vec<usize>
    where
        F: FnMut(&Aabb3) -> bool,
    {
        if self.nodes.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !accept(node.bounds()) {
                continue;
            }
            match node {
                Node::Leaf { items, .. } => {
                    hits.extend(
                        items
                            .iter()
                            .filter(|item| accept(&item.bounds))
                            .map(|item| item.point),
                    );
                }
                Node::Branch { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

fn build_node(nodes: &mut Vec<Node>, items: &mut [Item]) -> usize {
    let bounds = items[1..]
        .iter()
        .fold(items[0].bounds, |acc, item| acc.union(&item.bounds));

    let idx = nodes.len();
    if items.len() <= LEAF_MAX {
        nodes.push(Node::Leaf {
            bounds,
            items: items.to_vec(),
        });
        return idx;
    }

    let axis = longest_axis(&bounds);
    items.sort_by(|a, b| {
        stable_total_cmp_f64(centre(&a.bounds, axis), centre(&b.bounds, axis))
            .then_with(|| a.point.cmp(&b.point))
    });

    // Reserve the slot; children are appended after it.
    nodes.push(Node::Leaf {
        bounds,
        items: Vec::new(),
    });
    let (lo, hi) = items.split_at_mut(items.len() / 2);
    let left = build_node(nodes, lo);
    let right = build_node(nodes, hi);
    nodes[idx] = Node::Branch {
        bounds,
        left,
        right,
    };
    idx
}

fn centre(aabb: &Aabb3, axis: usize) -> f64 {
    (aabb.min[axis] + aabb.max[axis]) * 0.5
}

fn longest_axis(bounds: &Aabb3) -> usize {
    let extent = |axis: usize| bounds.max[axis] - bounds.min[axis];
    let (ex, ey, ez) = (extent(0), extent(1), extent(2));
    // Ties prefer x, then y: tracks are mostly planar.
    if ex >= ey && ex >= ez {
        0
    } else if ey >= ez {
        1
    } else {
        2
    }
}

/// Slab test for a ray starting at `origin` (t >= 0).
fn ray_hits_aabb(origin: [f64; 3], dir: [f64; 3], aabb: &Aabb3) -> bool {
    let mut t_min = 0.0f64;
    let mut t_max = f64::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (min, max) = (aabb.min[axis], aabb.max[axis]);

        if d.abs() < 1e-12 {
            if o < min || o > max {
                return false;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t1, t2) = {
            let a = (min - o) * inv;
            let b = (max - o) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return false;
        }
    }

    true
}
