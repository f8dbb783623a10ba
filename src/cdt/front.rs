//! The advancing front: the frontier of the already-triangulated region.
//!
//! A doubly-linked list of frontier nodes backed by a slab; removed nodes
//! are unlinked but keep their own link fields, which the sweep relies on
//! when it walks past a node it just filled.

use crate::cdt::point::PointId;
use crate::cdt::triangle::TriangleId;
use crate::float_types::Real;

/// Index into the front's node slab.
pub type NodeId = u32;

#[derive(Debug, Clone)]
pub struct FrontNode {
    pub point: PointId,
    /// x-coordinate of `point`; frontier values are ordered left to right.
    pub value: Real,
    /// A triangle touching the frontier edge to the right of this node.
    pub triangle: Option<TriangleId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Debug)]
pub struct AdvancingFront {
    nodes: Vec<FrontNode>,
    head: NodeId,
    tail: NodeId,
    search: NodeId,
}

impl AdvancingFront {
    /// Build the initial three-node front from the synthetic bounding
    /// triangle: left bound, the lowest sweep point, right bound.
    pub fn new(
        left: (PointId, Real),
        middle: (PointId, Real),
        right: (PointId, Real),
        triangle: TriangleId,
    ) -> Self {
        let nodes = vec![
            FrontNode {
                point: left.0,
                value: left.1,
                triangle: Some(triangle),
                prev: None,
                next: Some(1),
            },
            FrontNode {
                point: middle.0,
                value: middle.1,
                triangle: Some(triangle),
                prev: Some(0),
                next: Some(2),
            },
            FrontNode {
                point: right.0,
                value: right.1,
                triangle: None,
                prev: Some(1),
                next: None,
            },
        ];
        AdvancingFront { nodes, head: 0, tail: 2, search: 0 }
    }

    pub fn node(&self, id: NodeId) -> &FrontNode {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FrontNode {
        &mut self.nodes[id as usize]
    }

    pub const fn head(&self) -> NodeId {
        self.head
    }

    pub const fn tail(&self) -> NodeId {
        self.tail
    }

    /// Splice a new node in directly after `after`.
    pub fn insert_after(&mut self, after: NodeId, point: PointId, value: Real) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let next = self.nodes[after as usize].next;
        self.nodes.push(FrontNode { point, value, triangle: None, prev: Some(after), next });
        self.nodes[after as usize].next = Some(id);
        if let Some(next) = next {
            self.nodes[next as usize].prev = Some(id);
        }
        id
    }

    /// Unlink `id` from the frontier. Its own `prev`/`next` fields are left
    /// intact so a caller holding the id can still continue a walk from it.
    pub fn remove(&mut self, id: NodeId) {
        let prev = self.nodes[id as usize].prev;
        let next = self.nodes[id as usize].next;
        if let Some(prev) = prev {
            self.nodes[prev as usize].next = next;
        }
        if let Some(next) = next {
            self.nodes[next as usize].prev = prev;
        }
        if self.search == id {
            self.search = prev.or(next).unwrap_or(self.head);
        }
    }

    /// The frontier node immediately left of `x` (node.value <= x <
    /// next.value), starting from the last search hint.
    pub fn locate_node(&mut self, x: Real) -> Option<NodeId> {
        let mut node = self.search;
        if x < self.nodes[node as usize].value {
            while let Some(prev) = self.nodes[node as usize].prev {
                node = prev;
                if x >= self.nodes[node as usize].value {
                    self.search = node;
                    return Some(node);
                }
            }
            None
        } else {
            while let Some(next) = self.nodes[node as usize].next {
                node = next;
                if x < self.nodes[node as usize].value {
                    let found = self.nodes[node as usize].prev?;
                    self.search = found;
                    return Some(found);
                }
            }
            None
        }
    }

    /// Find the frontier node holding exactly `point`, walking out from the
    /// search hint by x-coordinate.
    pub fn locate_point(&mut self, point: PointId, px: Real) -> Option<NodeId> {
        let mut node = self.search;
        let nx = self.nodes[node as usize].value;

        if px == nx {
            if self.nodes[node as usize].point != point {
                // equal x: the node can only be an immediate neighbor
                let prev = self.nodes[node as usize].prev;
                let next = self.nodes[node as usize].next;
                if prev.is_some_and(|p| self.nodes[p as usize].point == point) {
                    node = prev?;
                } else if next.is_some_and(|n| self.nodes[n as usize].point == point) {
                    node = next?;
                } else {
                    return None;
                }
            }
        } else if px < nx {
            loop {
                node = self.nodes[node as usize].prev?;
                if self.nodes[node as usize].point == point {
                    break;
                }
            }
        } else {
            loop {
                node = self.nodes[node as usize].next?;
                if self.nodes[node as usize].point == point {
                    break;
                }
            }
        }

        self.search = node;
        Some(node)
    }
}
