//! The sweep itself: point events over an advancing front, constrained-edge
//! enforcement by flip and flip-scan, hole/basin filling, finalization.

use crate::cdt::front::{AdvancingFront, NodeId};
use crate::cdt::point::{Edge, PointId, SweepPoint, cmp_sweep};
use crate::cdt::predicates::{Orientation, in_circle, in_scan_area, orient2d};
use crate::cdt::triangle::{Triangle, TriangleId};
use crate::errors::TriangulationError;
use crate::float_types::{FRAC_PI_2, ORIENT_EPSILON, PI, Real};

/// Margin factor for the synthetic bounding points, relative to the point
/// cloud's extents.
const ALPHA: Real = 0.3;

const PI_3DIV4: Real = 3.0 * PI / 4.0;

#[derive(Debug, Default)]
struct Basin {
    left: Option<NodeId>,
    right: Option<NodeId>,
    width: Real,
    left_highest: bool,
}

#[derive(Debug, Default)]
struct EdgeEventState {
    constrained: Option<Edge>,
    right: bool,
}

pub(crate) struct Sweep {
    points: Vec<SweepPoint>,
    /// Ids below this index are caller points; the two synthetic bounding
    /// points sit above it.
    user_points: usize,
    order: Vec<PointId>,
    triangles: Vec<Triangle>,
    front: AdvancingFront,
    basin: Basin,
    edge_event: EdgeEventState,
    skipped: Vec<[PointId; 2]>,
    flip_steps: usize,
    flip_limit: usize,
}

impl Sweep {
    /// Sort the points, add the synthetic bounding pair and seed the front
    /// with the initial triangle.
    pub fn new(mut points: Vec<SweepPoint>) -> Result<Self, TriangulationError> {
        let n = points.len();
        if n < 3 {
            return Err(TriangulationError::TooFewPoints(n));
        }

        let mut xmin = points[0].x;
        let mut xmax = points[0].x;
        let mut ymin = points[0].y;
        let mut ymax = points[0].y;
        for p in &points {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
            ymin = ymin.min(p.y);
            ymax = ymax.max(p.y);
        }
        let dx = ALPHA * (xmax - xmin);
        let dy = ALPHA * (ymax - ymin);

        let head = n as PointId;
        let tail = (n + 1) as PointId;
        points.push(SweepPoint::new(xmax + dx, ymin - dy));
        points.push(SweepPoint::new(xmin - dx, ymin - dy));

        let mut order: Vec<PointId> = (0..n as PointId).collect();
        order.sort_by(|&a, &b| cmp_sweep(&points[a as usize], &points[b as usize]));

        let lowest = order[0];
        let triangles = vec![Triangle::new(lowest, tail, head)];
        let front = AdvancingFront::new(
            (tail, points[tail as usize].x),
            (lowest, points[lowest as usize].x),
            (head, points[head as usize].x),
            0,
        );

        Ok(Sweep {
            points,
            user_points: n,
            order,
            triangles,
            front,
            basin: Basin::default(),
            edge_event: EdgeEventState::default(),
            skipped: Vec::new(),
            flip_steps: 0,
            flip_limit: 0,
        })
    }

    /// Process every point (and its constraint edges) in sweep order.
    pub fn sweep_points(&mut self) -> Result<(), TriangulationError> {
        for i in 1..self.order.len() {
            let point = self.order[i];
            let node = self.point_event(point)?;
            let edges = self.points[point as usize].edges.clone();
            for edge in edges {
                self.process_edge(edge, node)?;
            }
        }
        Ok(())
    }

    /// Interior triangles of the constrained boundary, as index triples.
    pub fn finalize_polygon(&mut self) -> Result<Vec<[PointId; 3]>, TriangulationError> {
        let first = self
            .front
            .node(self.front.head())
            .next
            .ok_or(TriangulationError::BrokenTopology("empty advancing front"))?;
        let p = self.front.node(first).point;
        let mut t = self
            .front
            .node(first)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("front node lost its triangle"))?;

        // Walk around `p` to a triangle bordered by a constrained edge; that
        // triangle seeds the interior flood.
        let mut guard = 0usize;
        while !self.tri(t).constrained_cw(p) {
            guard += 1;
            if guard > self.triangles.len() {
                // A skipped boundary edge leaves the interior unseedable.
                return Err(if self.skipped.is_empty() {
                    TriangulationError::BrokenTopology("no constrained edge borders the front")
                } else {
                    TriangulationError::PointOnConstrainedEdge
                });
            }
            t = self
                .tri(t)
                .neighbor_ccw(p)
                .ok_or(TriangulationError::BrokenTopology("missing neighbor in seed walk"))?;
        }

        self.mesh_clean(t);

        // A skipped boundary edge lets the flood escape to the synthetic
        // frame; surface that instead of returning a partial interior.
        let user = self.user_points;
        let mut out = Vec::new();
        for t in self.triangles.iter().filter(|t| t.interior) {
            if t.points.iter().any(|&p| (p as usize) >= user) {
                return Err(if self.skipped.is_empty() {
                    TriangulationError::BrokenTopology("interior flood escaped the boundary")
                } else {
                    TriangulationError::PointOnConstrainedEdge
                });
            }
            out.push(t.points);
        }
        Ok(out)
    }

    /// Convex-hull triangulation of a free point set: close the remaining
    /// front concavities, then drop every triangle attached to the two
    /// synthetic bounding points.
    pub fn finalize_point_set(&mut self) -> Result<Vec<[PointId; 3]>, TriangulationError> {
        loop {
            let mut changed = false;
            let mut cursor = self.front.node(self.front.head()).next;
            while let Some(id) = cursor {
                let node = self.front.node(id);
                let (Some(prev), Some(next)) = (node.prev, node.next) else {
                    break;
                };
                let o = self.orient(
                    self.front.node(prev).point,
                    self.front.node(id).point,
                    self.front.node(next).point,
                );
                if o == Orientation::Ccw {
                    self.fill(id)?;
                    changed = true;
                }
                cursor = Some(next);
            }
            if !changed {
                break;
            }
        }

        let user = self.user_points;
        Ok(self
            .triangles
            .iter()
            .filter(|t| t.points.iter().all(|&p| (p as usize) < user))
            .map(|t| t.points)
            .collect())
    }

    pub fn skipped_edges(&self) -> &[[PointId; 2]] {
        &self.skipped
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Point events
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    fn point_event(&mut self, point: PointId) -> Result<NodeId, TriangulationError> {
        let node = self
            .front
            .locate_node(self.px(point))
            .ok_or(TriangulationError::BrokenTopology("point outside the front"))?;
        let node_point = self.front.node(node).point;
        let new_node = self.new_front_triangle(point, node)?;

        // A point (almost) directly above the located node closes the slot
        // beneath it immediately.
        if self.front.node(node).prev.is_some()
            && self.px(point) <= self.px(node_point) + ORIENT_EPSILON
        {
            self.fill(node)?;
        }

        self.fill_advancing_front(new_node)?;
        Ok(new_node)
    }

    fn new_front_triangle(
        &mut self,
        point: PointId,
        node: NodeId,
    ) -> Result<NodeId, TriangulationError> {
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("point beyond front tail"))?;
        let node_point = self.front.node(node).point;
        let next_point = self.front.node(next).point;

        let t = self.add_triangle(Triangle::new(point, node_point, next_point));
        let below = self
            .front
            .node(node)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("front node lost its triangle"))?;
        self.mark_neighbor(t, below);

        let new_node = self.front.insert_after(node, point, self.px(point));

        if !self.legalize(t) {
            self.map_triangle_to_nodes(t);
        }
        Ok(new_node)
    }

    /// Close the slot at `node`: one triangle over (prev, node, next), then
    /// unlink the node from the frontier.
    fn fill(&mut self, node: NodeId) -> Result<(), TriangulationError> {
        let prev = self
            .front
            .node(node)
            .prev
            .ok_or(TriangulationError::BrokenTopology("fill at front head"))?;
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("fill at front tail"))?;

        let t = self.add_triangle(Triangle::new(
            self.front.node(prev).point,
            self.front.node(node).point,
            self.front.node(next).point,
        ));
        let prev_tri = self
            .front
            .node(prev)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("front node lost its triangle"))?;
        let node_tri = self
            .front
            .node(node)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("front node lost its triangle"))?;
        self.mark_neighbor(t, prev_tri);
        self.mark_neighbor(t, node_tri);

        self.front.remove(node);

        if !self.legalize(t) {
            self.map_triangle_to_nodes(t);
        }
        Ok(())
    }

    /// After a point event: fill small holes left and right of the new node
    /// (corner angle at most 90°), then check for a basin to the right.
    fn fill_advancing_front(&mut self, n: NodeId) -> Result<(), TriangulationError> {
        // fill right holes
        let mut cursor = self.front.node(n).next;
        while let Some(id) = cursor {
            if self.front.node(id).next.is_none() {
                break;
            }
            let angle = self.hole_angle(id)?;
            if angle > FRAC_PI_2 || angle < -FRAC_PI_2 {
                break;
            }
            self.fill(id)?;
            cursor = self.front.node(id).next;
        }

        // fill left holes
        let mut cursor = self.front.node(n).prev;
        while let Some(id) = cursor {
            if self.front.node(id).prev.is_none() {
                break;
            }
            let angle = self.hole_angle(id)?;
            if angle > FRAC_PI_2 || angle < -FRAC_PI_2 {
                break;
            }
            self.fill(id)?;
            cursor = self.front.node(id).prev;
        }

        // fill right basins
        if let Some(next) = self.front.node(n).next {
            if self.front.node(next).next.is_some() {
                let angle = self.basin_angle(n)?;
                if angle < PI_3DIV4 {
                    self.fill_basin(n)?;
                }
            }
        }
        Ok(())
    }

    /// Angle of the corner the frontier turns at `node`, measured between
    /// the edges to its successor and predecessor.
    fn hole_angle(&self, node: NodeId) -> Result<Real, TriangulationError> {
        let n = self.front.node(node);
        let next = n
            .next
            .ok_or(TriangulationError::BrokenTopology("hole angle at front tail"))?;
        let prev = n
            .prev
            .ok_or(TriangulationError::BrokenTopology("hole angle at front head"))?;
        let [px, py] = self.coords(n.point);
        let [ax, ay] = self.coords(self.front.node(next).point);
        let [bx, by] = self.coords(self.front.node(prev).point);
        let (ax, ay) = (ax - px, ay - py);
        let (bx, by) = (bx - px, by - py);
        Ok((ax * by - ay * bx).atan2(ax * bx + ay * by))
    }

    /// Downward slope of the frontier two nodes ahead of `node`.
    fn basin_angle(&self, node: NodeId) -> Result<Real, TriangulationError> {
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("basin angle at front tail"))?;
        let nextnext = self
            .front
            .node(next)
            .next
            .ok_or(TriangulationError::BrokenTopology("basin angle at front tail"))?;
        let [x0, y0] = self.coords(self.front.node(node).point);
        let [x2, y2] = self.coords(self.front.node(nextnext).point);
        Ok((y0 - y2).atan2(x0 - x2))
    }

    /// Locate the left, bottom and right nodes of a concave basin starting
    /// at `node` and fill it bottom-up while it stays deeper than wide.
    fn fill_basin(&mut self, node: NodeId) -> Result<(), TriangulationError> {
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("basin at front tail"))?;
        let nextnext = self
            .front
            .node(next)
            .next
            .ok_or(TriangulationError::BrokenTopology("basin at front tail"))?;

        let o = self.orient(
            self.front.node(node).point,
            self.front.node(next).point,
            self.front.node(nextnext).point,
        );
        let left = if o == Orientation::Ccw { nextnext } else { next };

        // descend to the bottom of the basin
        let mut bottom = left;
        while let Some(n) = self.front.node(bottom).next {
            if self.py(self.front.node(bottom).point) >= self.py(self.front.node(n).point) {
                bottom = n;
            } else {
                break;
            }
        }
        if bottom == left {
            return Ok(()); // no valid basin
        }

        // climb to the right rim
        let mut right = bottom;
        while let Some(n) = self.front.node(right).next {
            if self.py(self.front.node(right).point) < self.py(self.front.node(n).point) {
                right = n;
            } else {
                break;
            }
        }
        if right == bottom {
            return Ok(());
        }

        self.basin.width =
            self.px(self.front.node(right).point) - self.px(self.front.node(left).point);
        self.basin.left_highest =
            self.py(self.front.node(left).point) > self.py(self.front.node(right).point);
        self.basin.left = Some(left);
        self.basin.right = Some(right);

        self.fill_basin_req(bottom)
    }

    fn fill_basin_req(&mut self, mut node: NodeId) -> Result<(), TriangulationError> {
        loop {
            if self.is_shallow(node) {
                return Ok(());
            }
            self.fill(node)?;

            // the just-filled node keeps its stale links for this walk
            let prev = self
                .front
                .node(node)
                .prev
                .ok_or(TriangulationError::BrokenTopology("basin fill at front head"))?;
            let next = self
                .front
                .node(node)
                .next
                .ok_or(TriangulationError::BrokenTopology("basin fill at front tail"))?;

            if Some(prev) == self.basin.left && Some(next) == self.basin.right {
                return Ok(());
            } else if Some(prev) == self.basin.left {
                let nextnext = self
                    .front
                    .node(next)
                    .next
                    .ok_or(TriangulationError::BrokenTopology("basin fill at front tail"))?;
                let o = self.orient(
                    self.front.node(node).point,
                    self.front.node(next).point,
                    self.front.node(nextnext).point,
                );
                if o == Orientation::Cw {
                    return Ok(());
                }
                node = next;
            } else if Some(next) == self.basin.right {
                let prevprev = self
                    .front
                    .node(prev)
                    .prev
                    .ok_or(TriangulationError::BrokenTopology("basin fill at front head"))?;
                let o = self.orient(
                    self.front.node(node).point,
                    self.front.node(prev).point,
                    self.front.node(prevprev).point,
                );
                if o == Orientation::Ccw {
                    return Ok(());
                }
                node = prev;
            } else {
                node = if self.py(self.front.node(prev).point)
                    < self.py(self.front.node(next).point)
                {
                    prev
                } else {
                    next
                };
            }
        }
    }

    /// A basin stops being filled once the remaining depth at `node` is
    /// smaller than the basin's width.
    fn is_shallow(&self, node: NodeId) -> bool {
        let rim = if self.basin.left_highest { self.basin.left } else { self.basin.right };
        let Some(rim) = rim else { return true };
        let height =
            self.py(self.front.node(rim).point) - self.py(self.front.node(node).point);
        self.basin.width > height
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Edge events
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Enforce one constraint edge ending at the point whose front node is
    /// `node`. A point exactly on the edge makes that edge unenforceable;
    /// it is recorded as skipped and the sweep carries on.
    fn process_edge(&mut self, edge: Edge, node: NodeId) -> Result<(), TriangulationError> {
        self.edge_event = EdgeEventState {
            constrained: Some(edge),
            right: self.px(edge.p) > self.px(edge.q),
        };
        self.flip_steps = 0;
        self.flip_limit = self.triangles.len() * 2 + 64;

        let t = self
            .front
            .node(node)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("edge event without a triangle"))?;
        if self.is_edge_side_of_triangle(t, edge.p, edge.q) {
            return Ok(());
        }

        self.fill_edge_event(edge, node)?;

        let t = self
            .front
            .node(node)
            .triangle
            .ok_or(TriangulationError::BrokenTopology("edge event without a triangle"))?;
        match self.edge_event_walk(edge.p, edge.q, t, edge.q) {
            Err(TriangulationError::PointOnConstrainedEdge) => {
                self.skipped.push([edge.p, edge.q]);
                Ok(())
            },
            other => other,
        }
    }

    /// If (`p`, `q`) already is a side of `t`, mark it (and its mirror on
    /// the neighbor) constrained.
    fn is_edge_side_of_triangle(&mut self, t: TriangleId, p: PointId, q: PointId) -> bool {
        let Some(i) = self.tri(t).edge_index(p, q) else {
            return false;
        };
        self.tri_mut(t).constrained[i] = true;
        if let Some(n) = self.tri(t).neighbors[i] {
            self.tri_mut(n).mark_constrained_edge(p, q);
        }
        true
    }

    /// Walk from `point` toward the far endpoint `ep`, rotating through
    /// triangles until the constrained edge materializes.
    fn edge_event_walk(
        &mut self,
        ep: PointId,
        eq: PointId,
        mut t: TriangleId,
        point: PointId,
    ) -> Result<(), TriangulationError> {
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > self.triangles.len() + 16 {
                return Err(TriangulationError::IntersectingConstraints);
            }

            if self.is_edge_side_of_triangle(t, ep, eq) {
                return Ok(());
            }

            let p1 = self
                .tri(t)
                .point_ccw(point)
                .ok_or(TriangulationError::BrokenTopology("walk lost its pivot point"))?;
            let o1 = self.orient(eq, p1, ep);
            if o1 == Orientation::Collinear {
                return Err(TriangulationError::PointOnConstrainedEdge);
            }

            let p2 = self
                .tri(t)
                .point_cw(point)
                .ok_or(TriangulationError::BrokenTopology("walk lost its pivot point"))?;
            let o2 = self.orient(eq, p2, ep);
            if o2 == Orientation::Collinear {
                return Err(TriangulationError::PointOnConstrainedEdge);
            }

            if o1 == o2 {
                // need to cross to the neighbor facing the edge
                t = if o1 == Orientation::Cw {
                    self.tri(t).neighbor_ccw(point)
                } else {
                    self.tri(t).neighbor_cw(point)
                }
                .ok_or(TriangulationError::BrokenTopology("missing neighbor in edge walk"))?;
            } else {
                return self.flip_edge_event(ep, eq, t, point);
            }
        }
    }

    fn flip_edge_event(
        &mut self,
        ep: PointId,
        eq: PointId,
        t: TriangleId,
        p: PointId,
    ) -> Result<(), TriangulationError> {
        self.flip_steps += 1;
        if self.flip_steps > self.flip_limit {
            return Err(TriangulationError::IntersectingConstraints);
        }

        let ot = self
            .tri(t)
            .neighbor_across(p)
            .ok_or(TriangulationError::BrokenTopology("missing neighbor for flip"))?;
        let op = self
            .opposite_point(ot, t, p)
            .ok_or(TriangulationError::BrokenTopology("flip pair out of sync"))?;

        let p_ccw = self
            .tri(t)
            .point_ccw(p)
            .ok_or(TriangulationError::BrokenTopology("flip lost its pivot point"))?;
        let p_cw = self
            .tri(t)
            .point_cw(p)
            .ok_or(TriangulationError::BrokenTopology("flip lost its pivot point"))?;

        if in_scan_area(self.coords(p), self.coords(p_ccw), self.coords(p_cw), self.coords(op)) {
            self.rotate_triangle_pair(t, p, ot, op);
            self.map_triangle_to_nodes(t);
            self.map_triangle_to_nodes(ot);

            if p == eq && op == ep {
                let ce = self.edge_event.constrained;
                if ce.is_some_and(|ce| eq == ce.q && ep == ce.p) {
                    self.tri_mut(t).mark_constrained_edge(ep, eq);
                    self.tri_mut(ot).mark_constrained_edge(ep, eq);
                    self.legalize(t);
                    self.legalize(ot);
                }
            } else {
                let o = self.orient(eq, op, ep);
                let t = self.next_flip_triangle(o, t, ot, p, op)?;
                self.flip_edge_event(ep, eq, t, p)?;
            }
        } else {
            let new_p = self.next_flip_point(ep, eq, ot, op)?;
            self.flip_scan_edge_event(ep, eq, t, ot, new_p)?;
            self.edge_event_walk(ep, eq, t, p)?;
        }
        Ok(())
    }

    /// After a flip, pick which triangle of the pair keeps chasing the
    /// constrained edge; the other is legalized and released.
    fn next_flip_triangle(
        &mut self,
        o: Orientation,
        t: TriangleId,
        ot: TriangleId,
        p: PointId,
        op: PointId,
    ) -> Result<TriangleId, TriangulationError> {
        if o == Orientation::Ccw {
            let i = self
                .tri(ot)
                .edge_index(p, op)
                .ok_or(TriangulationError::BrokenTopology("flip pair out of sync"))?;
            self.tri_mut(ot).delaunay[i] = true;
            self.legalize(ot);
            self.tri_mut(ot).clear_delaunay_edges();
            return Ok(t);
        }
        let i = self
            .tri(t)
            .edge_index(p, op)
            .ok_or(TriangulationError::BrokenTopology("flip pair out of sync"))?;
        self.tri_mut(t).delaunay[i] = true;
        self.legalize(t);
        self.tri_mut(t).clear_delaunay_edges();
        Ok(ot)
    }

    /// The point the scan advances to when the immediate pair is not
    /// flip-safe. A collinear configuration means the opposing point sits
    /// on the constrained edge.
    fn next_flip_point(
        &self,
        ep: PointId,
        eq: PointId,
        ot: TriangleId,
        op: PointId,
    ) -> Result<PointId, TriangulationError> {
        match self.orient(eq, op, ep) {
            Orientation::Cw => self
                .tri(ot)
                .point_ccw(op)
                .ok_or(TriangulationError::BrokenTopology("scan lost its pivot point")),
            Orientation::Ccw => self
                .tri(ot)
                .point_cw(op)
                .ok_or(TriangulationError::BrokenTopology("scan lost its pivot point")),
            Orientation::Collinear => Err(TriangulationError::PointOnConstrainedEdge),
        }
    }

    /// Scan along neighboring triangles for the next flip-safe
    /// configuration when the immediate pair cannot rotate.
    fn flip_scan_edge_event(
        &mut self,
        ep: PointId,
        eq: PointId,
        flip_triangle: TriangleId,
        t: TriangleId,
        p: PointId,
    ) -> Result<(), TriangulationError> {
        self.flip_steps += 1;
        if self.flip_steps > self.flip_limit {
            return Err(TriangulationError::IntersectingConstraints);
        }

        let ot = self
            .tri(t)
            .neighbor_across(p)
            .ok_or(TriangulationError::BrokenTopology("missing neighbor in flip scan"))?;
        let op = self
            .opposite_point(ot, t, p)
            .ok_or(TriangulationError::BrokenTopology("flip scan pair out of sync"))?;

        let eq_ccw = self
            .tri(flip_triangle)
            .point_ccw(eq)
            .ok_or(TriangulationError::BrokenTopology("flip scan lost its pivot point"))?;
        let eq_cw = self
            .tri(flip_triangle)
            .point_cw(eq)
            .ok_or(TriangulationError::BrokenTopology("flip scan lost its pivot point"))?;

        if in_scan_area(
            self.coords(eq),
            self.coords(eq_ccw),
            self.coords(eq_cw),
            self.coords(op),
        ) {
            // flip with the new edge op -> eq
            self.flip_edge_event(eq, op, ot, op)
        } else {
            let new_p = self.next_flip_point(ep, eq, ot, op)?;
            self.flip_scan_edge_event(ep, eq, flip_triangle, ot, new_p)
        }
    }

    /// Fill the front nodes tucked under the constrained edge before the
    /// triangle walk starts.
    fn fill_edge_event(&mut self, edge: Edge, node: NodeId) -> Result<(), TriangulationError> {
        if self.edge_event.right {
            self.fill_right_above_edge_event(edge, node)
        } else {
            self.fill_left_above_edge_event(edge, node)
        }
    }

    fn fill_right_above_edge_event(
        &mut self,
        edge: Edge,
        mut node: NodeId,
    ) -> Result<(), TriangulationError> {
        loop {
            let next = self
                .front
                .node(node)
                .next
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            if self.px(self.front.node(next).point) >= self.px(edge.p) {
                break;
            }
            if self.orient(edge.q, self.front.node(next).point, edge.p) == Orientation::Ccw {
                self.fill_right_below_edge_event(edge, node)?;
            } else {
                node = next;
            }
        }
        Ok(())
    }

    fn fill_right_below_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        if self.px(self.front.node(node).point) < self.px(edge.p) {
            let next = self
                .front
                .node(node)
                .next
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            let nextnext = self
                .front
                .node(next)
                .next
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            let o = self.orient(
                self.front.node(node).point,
                self.front.node(next).point,
                self.front.node(nextnext).point,
            );
            if o == Orientation::Ccw {
                self.fill_right_concave_edge_event(edge, node)?;
            } else {
                self.fill_right_convex_edge_event(edge, node)?;
                self.fill_right_below_edge_event(edge, node)?;
            }
        }
        Ok(())
    }

    fn fill_right_concave_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        self.fill(next)?;

        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        if self.front.node(next).point != edge.p {
            // below the edge?
            if self.orient(edge.q, self.front.node(next).point, edge.p) == Orientation::Ccw {
                let nextnext = self
                    .front
                    .node(next)
                    .next
                    .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
                let o = self.orient(
                    self.front.node(node).point,
                    self.front.node(next).point,
                    self.front.node(nextnext).point,
                );
                if o == Orientation::Ccw {
                    self.fill_right_concave_edge_event(edge, node)?;
                }
            }
        }
        Ok(())
    }

    fn fill_right_convex_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        let next = self
            .front
            .node(node)
            .next
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        let nextnext = self
            .front
            .node(next)
            .next
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        let nextnextnext = self
            .front
            .node(nextnext)
            .next
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;

        let o = self.orient(
            self.front.node(next).point,
            self.front.node(nextnext).point,
            self.front.node(nextnextnext).point,
        );
        if o == Orientation::Ccw {
            self.fill_right_concave_edge_event(edge, next)?;
        } else if self.orient(edge.q, self.front.node(nextnext).point, edge.p)
            == Orientation::Ccw
        {
            self.fill_right_convex_edge_event(edge, next)?;
        }
        Ok(())
    }

    fn fill_left_above_edge_event(
        &mut self,
        edge: Edge,
        mut node: NodeId,
    ) -> Result<(), TriangulationError> {
        loop {
            let prev = self
                .front
                .node(node)
                .prev
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            if self.px(self.front.node(prev).point) <= self.px(edge.p) {
                break;
            }
            if self.orient(edge.q, self.front.node(prev).point, edge.p) == Orientation::Cw {
                self.fill_left_below_edge_event(edge, node)?;
            } else {
                node = prev;
            }
        }
        Ok(())
    }

    fn fill_left_below_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        if self.px(self.front.node(node).point) > self.px(edge.p) {
            let prev = self
                .front
                .node(node)
                .prev
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            let prevprev = self
                .front
                .node(prev)
                .prev
                .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
            let o = self.orient(
                self.front.node(node).point,
                self.front.node(prev).point,
                self.front.node(prevprev).point,
            );
            if o == Orientation::Cw {
                self.fill_left_concave_edge_event(edge, node)?;
            } else {
                self.fill_left_convex_edge_event(edge, node)?;
                self.fill_left_below_edge_event(edge, node)?;
            }
        }
        Ok(())
    }

    fn fill_left_concave_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        let prev = self
            .front
            .node(node)
            .prev
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        self.fill(prev)?;

        let prev = self
            .front
            .node(node)
            .prev
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        if self.front.node(prev).point != edge.p {
            if self.orient(edge.q, self.front.node(prev).point, edge.p) == Orientation::Cw {
                let prevprev = self
                    .front
                    .node(prev)
                    .prev
                    .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
                let o = self.orient(
                    self.front.node(node).point,
                    self.front.node(prev).point,
                    self.front.node(prevprev).point,
                );
                if o == Orientation::Cw {
                    self.fill_left_concave_edge_event(edge, node)?;
                }
            }
        }
        Ok(())
    }

    fn fill_left_convex_edge_event(
        &mut self,
        edge: Edge,
        node: NodeId,
    ) -> Result<(), TriangulationError> {
        let prev = self
            .front
            .node(node)
            .prev
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        let prevprev = self
            .front
            .node(prev)
            .prev
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;
        let prevprevprev = self
            .front
            .node(prevprev)
            .prev
            .ok_or(TriangulationError::BrokenTopology("edge fill ran off the front"))?;

        let o = self.orient(
            self.front.node(prev).point,
            self.front.node(prevprev).point,
            self.front.node(prevprevprev).point,
        );
        if o == Orientation::Cw {
            self.fill_left_concave_edge_event(edge, prev)?;
        } else if self.orient(edge.q, self.front.node(prevprev).point, edge.p)
            == Orientation::Cw
        {
            self.fill_left_convex_edge_event(edge, prev)?;
        }
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Legalization and shared plumbing
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Restore the Delaunay property around `t`. Returns true when at least
    /// one flip was performed (the caller then skips re-mapping, which the
    /// recursion already did).
    fn legalize(&mut self, t: TriangleId) -> bool {
        for i in 0..3 {
            if self.tri(t).delaunay[i] {
                continue;
            }
            let Some(ot) = self.tri(t).neighbors[i] else {
                continue;
            };
            let p = self.tri(t).points[i];
            let Some(op) = self.opposite_point(ot, t, p) else {
                continue;
            };
            let Some(oi) = self.tri(ot).index_of(op) else {
                continue;
            };

            // Constrained and delaunay-fixed edges never flip; the
            // constrained flag carries over.
            if self.tri(ot).constrained[oi] || self.tri(ot).delaunay[oi] {
                let carried = self.tri(ot).constrained[oi];
                self.tri_mut(t).constrained[i] = carried;
                continue;
            }

            let (Some(p_ccw), Some(p_cw)) =
                (self.tri(t).point_ccw(p), self.tri(t).point_cw(p))
            else {
                continue;
            };
            let inside = in_circle(
                self.coords(p),
                self.coords(p_ccw),
                self.coords(p_cw),
                self.coords(op),
            );
            if inside {
                self.tri_mut(t).delaunay[i] = true;
                self.tri_mut(ot).delaunay[oi] = true;

                self.rotate_triangle_pair(t, p, ot, op);

                if !self.legalize(t) {
                    self.map_triangle_to_nodes(t);
                }
                if !self.legalize(ot) {
                    self.map_triangle_to_nodes(ot);
                }

                self.tri_mut(t).delaunay[i] = false;
                self.tri_mut(ot).delaunay[oi] = false;
                return true;
            }
        }
        false
    }

    /// Rotate a triangle pair around their shared edge, remapping the six
    /// outer neighbor links and edge flags.
    fn rotate_triangle_pair(&mut self, t: TriangleId, p: PointId, ot: TriangleId, op: PointId) {
        let n1 = self.tri(t).neighbor_ccw(p);
        let n2 = self.tri(t).neighbor_cw(p);
        let n3 = self.tri(ot).neighbor_ccw(op);
        let n4 = self.tri(ot).neighbor_cw(op);

        let ce1 = self.tri(t).constrained_ccw(p);
        let ce2 = self.tri(t).constrained_cw(p);
        let ce3 = self.tri(ot).constrained_ccw(op);
        let ce4 = self.tri(ot).constrained_cw(op);

        let de1 = self.tri(t).delaunay_ccw(p);
        let de2 = self.tri(t).delaunay_cw(p);
        let de3 = self.tri(ot).delaunay_ccw(op);
        let de4 = self.tri(ot).delaunay_cw(op);

        self.tri_mut(t).rotate(p, op);
        self.tri_mut(ot).rotate(op, p);

        self.tri_mut(ot).set_delaunay_ccw(p, de1);
        self.tri_mut(t).set_delaunay_cw(p, de2);
        self.tri_mut(t).set_delaunay_ccw(op, de3);
        self.tri_mut(ot).set_delaunay_cw(op, de4);

        self.tri_mut(ot).set_constrained_ccw(p, ce1);
        self.tri_mut(t).set_constrained_cw(p, ce2);
        self.tri_mut(t).set_constrained_ccw(op, ce3);
        self.tri_mut(ot).set_constrained_cw(op, ce4);

        self.tri_mut(t).clear_neighbors();
        self.tri_mut(ot).clear_neighbors();
        if let Some(n1) = n1 {
            self.mark_neighbor(ot, n1);
        }
        if let Some(n2) = n2 {
            self.mark_neighbor(t, n2);
        }
        if let Some(n3) = n3 {
            self.mark_neighbor(t, n3);
        }
        if let Some(n4) = n4 {
            self.mark_neighbor(ot, n4);
        }
        self.mark_neighbor(t, ot);
    }

    /// Point every front node whose frontier edge borders `t` back at `t`.
    fn map_triangle_to_nodes(&mut self, t: TriangleId) {
        for i in 0..3 {
            if self.tri(t).neighbors[i].is_some() {
                continue;
            }
            let p = self.tri(t).points[(i + 2) % 3];
            if let Some(node) = self.front.locate_point(p, self.px(p)) {
                self.front.node_mut(node).triangle = Some(t);
            }
        }
    }

    /// Link `a` and `b` across their shared edge, both directions at once.
    fn mark_neighbor(&mut self, a: TriangleId, b: TriangleId) {
        let pa = self.tri(a).points;
        for i in 0..3 {
            let e1 = pa[(i + 1) % 3];
            let e2 = pa[(i + 2) % 3];
            if let Some(j) = self.tri(b).edge_index(e1, e2) {
                self.tri_mut(a).neighbors[i] = Some(b);
                self.tri_mut(b).neighbors[j] = Some(a);
                return;
            }
        }
    }

    /// Flood from `seed` across unconstrained edges, marking the enclosed
    /// triangles interior. Hole interiors stay unmarked because their
    /// boundaries are constrained.
    fn mesh_clean(&mut self, seed: TriangleId) {
        let mut stack = vec![seed];
        while let Some(t) = stack.pop() {
            if self.tri(t).interior {
                continue;
            }
            self.tri_mut(t).interior = true;
            for i in 0..3 {
                if !self.tri(t).constrained[i] {
                    if let Some(n) = self.tri(t).neighbors[i] {
                        stack.push(n);
                    }
                }
            }
        }
    }

    fn add_triangle(&mut self, t: Triangle) -> TriangleId {
        self.triangles.push(t);
        (self.triangles.len() - 1) as TriangleId
    }

    fn tri(&self, t: TriangleId) -> &Triangle {
        &self.triangles[t as usize]
    }

    fn tri_mut(&mut self, t: TriangleId) -> &mut Triangle {
        &mut self.triangles[t as usize]
    }

    fn opposite_point(&self, of: TriangleId, other: TriangleId, p: PointId) -> Option<PointId> {
        self.tri(of).opposite_point(self.tri(other), p)
    }

    fn coords(&self, p: PointId) -> [Real; 2] {
        self.points[p as usize].coords()
    }

    fn px(&self, p: PointId) -> Real {
        self.points[p as usize].x
    }

    fn py(&self, p: PointId) -> Real {
        self.points[p as usize].y
    }

    fn orient(&self, a: PointId, b: PointId, c: PointId) -> Orientation {
        orient2d(self.coords(a), self.coords(b), self.coords(c))
    }
}
