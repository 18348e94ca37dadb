use std::cmp::Ordering;

use num_traits::NumCast;
use smallvec::SmallVec;

use crate::{Bounds, Real, TriangleWinding, Vertex, errors::KernelError, geometry, idx::{Idx, VecExt}, inputs::is_finite};

use super::{DIMENSIONS, Kernel, KernelOutput, overlay::{self, Piece, Point}};

/// Winding the outer ring is linked with internally. Holes are linked the opposite way.
const OUTER_WINDING: TriangleWinding = TriangleWinding::Counterclockwise;

/// The default [Kernel]: ear clipping, with each hole first bridged into the outer ring.
///
/// Before clipping, the rings are overlaid so that only the area inside the outer ring and
/// outside every hole remains. Holes outside the outer ring are ignored, overlapping and nested
/// holes act as their union, and a hole crossing the outer boundary cuts a notch into it. Where
/// two rings cross, a vertex is added and reported in [KernelOutput::added_vertices]. A hole
/// enclosing the whole outer ring produces an empty triangulation.
///
/// Triangles are emitted with the same winding as the outer ring.
#[derive(Debug, Clone)]
pub struct EarcutKernel {
    hash_threshold: usize,
}

impl EarcutKernel {
    /// Vertex count above which ear tests are accelerated with a z-order curve
    pub const DEFAULT_HASH_THRESHOLD: usize = 80;

    pub fn new() -> Self {
        Self {
            hash_threshold: Self::DEFAULT_HASH_THRESHOLD,
        }
    }

    /// Use the z-order curve when the rings contain more than `vertex_count` vertices
    pub fn hash_threshold(mut self, vertex_count: usize) -> Self {
        self.hash_threshold = vertex_count;
        self
    }
}

impl Default for EarcutKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for EarcutKernel {
    type Error = KernelError;

    fn triangulate_rings<V: Vertex>(&mut self, rings: &[&[V]], dimensions: usize) -> Result<KernelOutput<V::Coordinate>, Self::Error> {
        if dimensions != DIMENSIONS {
            return Err(KernelError::UnsupportedDimensions(dimensions));
        }

        let outer = match rings.first() {
            Some(&outer) => outer,
            None => return Ok(KernelOutput::default()),
        };
        if outer.len() < 3 {
            return Err(KernelError::NotEnoughVertices { ring: 0, count: outer.len() });
        }

        for (ring, vertices) in rings.iter().enumerate() {
            if let Some(vertex) = vertices.iter().position(|v| !is_finite(v.x()) || !is_finite(v.y())) {
                return Err(KernelError::NonFiniteCoordinate { ring, vertex });
            }
        }

        let winding = match geometry::winding(outer) {
            Some(winding) => winding,
            None => {
                tracing::debug!("outer ring encloses no area, nothing to triangulate");
                return Ok(KernelOutput::default());
            }
        };

        let overlay = overlay::overlay(rings)?;
        let vertex_count = overlay.pieces.iter().map(Piece::vertex_count).sum::<usize>();
        let mut earcut = Earcut::<V::Coordinate>::new(vertex_count, winding);
        for piece in &overlay.pieces {
            earcut.run(piece, piece.vertex_count() > self.hash_threshold)?;
        }
        Ok(KernelOutput {
            indices: earcut.triangles,
            added_vertices: overlay.added,
        })
    }
}

type NodeIdx<C> = Idx<Node<C>>;

#[derive(Debug, Clone)]
struct Node<C: Real> {
    /// Index of the vertex in the concatenated rings. Split nodes share the index of their original.
    vi: usize,
    x: C,
    y: C,
    prev: NodeIdx<C>,
    next: NodeIdx<C>,
    z: u32,
    prev_z: Option<NodeIdx<C>>,
    next_z: Option<NodeIdx<C>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Pass {
    Initial,
    Filtered,
    Cured,
}

/// Maps coordinates within the outer ring's bounds onto a 15-bit Morton curve
#[derive(Debug, Clone, Copy)]
struct ZCurve<C: Real> {
    x_min: C,
    y_min: C,
    inv_size: C,
}

impl<C: Real> ZCurve<C> {
    fn new<V: Vertex<Coordinate=C>>(outer: &[V]) -> Result<Option<Self>, KernelError> {
        let bounds = Bounds::of(outer).ok_or_else(|| KernelError::internal("Outer ring has no bounds"))?;
        let size = bounds.width().max(bounds.height());
        if size == C::zero() {
            return Ok(None);
        }
        let scale: C = <C as NumCast>::from(32767.0)
            .ok_or_else(|| KernelError::internal("Coordinate type cannot represent the z-order scale"))?;
        Ok(Some(Self {
            x_min: bounds.x_min,
            y_min: bounds.y_min,
            inv_size: scale / size,
        }))
    }

    fn z_order(&self, x: C, y: C) -> u32 {
        // Every bridged vertex lies within the outer bounds, so both values fit in 15 bits
        let x = ((x - self.x_min) * self.inv_size).to_u32().unwrap_or(0);
        let y = ((y - self.y_min) * self.inv_size).to_u32().unwrap_or(0);
        spread_bits(x) | (spread_bits(y) << 1)
    }
}

fn spread_bits(mut v: u32) -> u32 {
    v = (v | (v << 8)) & 0x00FF00FF;
    v = (v | (v << 4)) & 0x0F0F0F0F;
    v = (v | (v << 2)) & 0x33333333;
    (v | (v << 1)) & 0x55555555
}

/// Node arena and output for a single kernel invocation
struct Earcut<C: Real> {
    nodes: Vec<Node<C>>,
    triangles: Vec<usize>,
    winding: TriangleWinding,
    curve: Option<ZCurve<C>>,
}

impl<C: Real> Earcut<C> {
    fn new(vertex_count: usize, winding: TriangleWinding) -> Self {
        Self {
            // Splitting adds two nodes per bridge and diagonal
            nodes: Vec::with_capacity(vertex_count * 3 / 2),
            triangles: Vec::with_capacity(vertex_count.saturating_sub(2) * 3),
            winding,
            curve: None,
        }
    }

    /// Clips `piece`, appending to the triangles of the pieces before it
    fn run(&mut self, piece: &Piece<C>, hashed: bool) -> Result<(), KernelError> {
        self.nodes.clear();
        self.curve = None;

        let mut outer_node = match self.link_ring(&piece.shell, OUTER_WINDING) {
            Some(node) => node,
            None => return Ok(()),
        };
        if self.nodes[outer_node].next == self.nodes[outer_node].prev {
            return Ok(());
        }

        if !piece.holes.is_empty() {
            outer_node = self.eliminate_holes(&piece.holes, outer_node);
        }

        if hashed {
            self.curve = ZCurve::new(&piece.shell)?;
        }

        self.earcut_linked(outer_node, Pass::Initial)
    }

    // Linked list construction

    fn create_node(&mut self, vi: usize, x: C, y: C) -> NodeIdx<C> {
        let i = self.nodes.next_index();
        self.nodes.push_get_index(Node {
            vi,
            x,
            y,
            prev: i,
            next: i,
            z: 0,
            prev_z: None,
            next_z: None,
        })
    }

    fn insert_node(&mut self, vi: usize, x: C, y: C, last: Option<NodeIdx<C>>) -> NodeIdx<C> {
        let p = self.create_node(vi, x, y);
        if let Some(last) = last {
            let next = self.nodes[last].next;
            self.nodes[p].next = next;
            self.nodes[p].prev = last;
            self.nodes[next].prev = p;
            self.nodes[last].next = p;
        }
        p
    }

    fn remove_node(&mut self, p: NodeIdx<C>) {
        let Node { prev, next, prev_z, next_z, .. } = self.nodes[p];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        if let Some(prev_z) = prev_z {
            self.nodes[prev_z].next_z = next_z;
        }
        if let Some(next_z) = next_z {
            self.nodes[next_z].prev_z = prev_z;
        }
    }

    /// Links `ring` into a circular list with the requested winding, returning its last node
    fn link_ring(&mut self, ring: &[Point<C>], winding: TriangleWinding) -> Option<NodeIdx<C>> {
        let forward = geometry::winding(ring).unwrap_or(winding) == winding;

        let mut last = None;
        if forward {
            for p in ring {
                last = Some(self.insert_node(p.vi, p.x, p.y, last));
            }
        } else {
            for p in ring.iter().rev() {
                last = Some(self.insert_node(p.vi, p.x, p.y, last));
            }
        }

        let last = last?;
        let next = self.nodes[last].next;
        if self.equals(last, next) {
            self.remove_node(last);
            Some(next)
        } else {
            Some(last)
        }
    }

    /// Joins `b` to `a` with a two-way diagonal, splitting the list in two. Returns the copy of `b`
    /// which starts the second list.
    fn split_polygon(&mut self, a: NodeIdx<C>, b: NodeIdx<C>) -> NodeIdx<C> {
        let (a_vi, a_x, a_y) = (self.nodes[a].vi, self.nodes[a].x, self.nodes[a].y);
        let (b_vi, b_x, b_y) = (self.nodes[b].vi, self.nodes[b].x, self.nodes[b].y);
        let a2 = self.create_node(a_vi, a_x, a_y);
        let b2 = self.create_node(b_vi, b_x, b_y);
        let an = self.nodes[a].next;
        let bp = self.nodes[b].prev;

        self.nodes[a].next = b;
        self.nodes[b].prev = a;

        self.nodes[a2].next = an;
        self.nodes[an].prev = a2;

        self.nodes[b2].next = a2;
        self.nodes[a2].prev = b2;

        self.nodes[bp].next = b2;
        self.nodes[b2].prev = bp;

        b2
    }

    /// Removes duplicate and collinear points between `start` and `end`
    fn filter_points(&mut self, start: NodeIdx<C>, end: Option<NodeIdx<C>>) -> NodeIdx<C> {
        let mut end = end.unwrap_or(start);
        let mut p = start;
        loop {
            let Node { prev, next, .. } = self.nodes[p];
            let again = if self.equals(p, next) || self.turn(prev, p, next) == C::zero() {
                self.remove_node(p);
                p = prev;
                end = prev;
                if p == self.nodes[p].next {
                    break;
                }
                true
            } else {
                p = next;
                false
            };

            if !again && p == end {
                break;
            }
        }
        end
    }

    // Clipping

    fn emit(&mut self, a: NodeIdx<C>, b: NodeIdx<C>, c: NodeIdx<C>) {
        let (a, b, c) = (self.nodes[a].vi, self.nodes[b].vi, self.nodes[c].vi);
        match self.winding {
            TriangleWinding::Counterclockwise => self.triangles.extend_from_slice(&[a, b, c]),
            TriangleWinding::Clockwise => self.triangles.extend_from_slice(&[a, c, b]),
        }
    }

    fn earcut_linked(&mut self, ear: NodeIdx<C>, pass: Pass) -> Result<(), KernelError> {
        let mut ear = ear;
        if pass == Pass::Initial {
            if let Some(curve) = self.curve {
                self.index_curve(ear, curve);
            }
        }

        let mut stop = ear;
        while self.nodes[ear].prev != self.nodes[ear].next {
            let Node { prev, next, .. } = self.nodes[ear];

            let is_ear = match self.curve {
                Some(curve) => self.is_ear_hashed(ear, curve),
                None => self.is_ear(ear),
            };
            if is_ear {
                self.emit(prev, ear, next);
                self.remove_node(ear);

                // Skipping the next vertex leads to less sliver triangles
                ear = self.nodes[next].next;
                stop = ear;
                continue;
            }

            ear = next;

            // A full loop without finding an ear
            if ear == stop {
                match pass {
                    Pass::Initial => {
                        let ear = self.filter_points(ear, None);
                        self.earcut_linked(ear, Pass::Filtered)?;
                    }
                    Pass::Filtered => {
                        let ear = self.filter_points(ear, None);
                        let ear = self.cure_local_intersections(ear);
                        self.earcut_linked(ear, Pass::Cured)?;
                    }
                    Pass::Cured => self.split_earcut(ear)?,
                }
                break;
            }
        }
        Ok(())
    }

    fn ear_bounds(&self, a: NodeIdx<C>, b: NodeIdx<C>, c: NodeIdx<C>) -> Bounds<C> {
        let (a, b, c) = (&self.nodes[a], &self.nodes[b], &self.nodes[c]);
        Bounds::point(a.x, a.y).extend(b.x, b.y).extend(c.x, c.y)
    }

    /// Whether node `p` prevents `(a, b, c)` from being clipped as an ear
    fn blocks_ear(&self, p: NodeIdx<C>, a: NodeIdx<C>, b: NodeIdx<C>, c: NodeIdx<C>, bounds: &Bounds<C>) -> bool {
        let node = &self.nodes[p];
        let (na, nb, nc) = (&self.nodes[a], &self.nodes[b], &self.nodes[c]);
        p != a && p != c &&
            node.x >= bounds.x_min && node.x <= bounds.x_max && node.y >= bounds.y_min && node.y <= bounds.y_max &&
            !(na.x == node.x && na.y == node.y) &&
            point_in_triangle(na.x, na.y, nb.x, nb.y, nc.x, nc.y, node.x, node.y) &&
            self.turn(node.prev, p, node.next) >= C::zero()
    }

    fn is_ear(&self, ear: NodeIdx<C>) -> bool {
        let Node { prev: a, next: c, .. } = self.nodes[ear];
        if self.turn(a, ear, c) >= C::zero() {
            // Reflex
            return false;
        }

        let bounds = self.ear_bounds(a, ear, c);
        let mut p = self.nodes[c].next;
        while p != a {
            if self.blocks_ear(p, a, ear, c, &bounds) {
                return false;
            }
            p = self.nodes[p].next;
        }
        true
    }

    fn is_ear_hashed(&self, ear: NodeIdx<C>, curve: ZCurve<C>) -> bool {
        let Node { prev: a, next: c, prev_z, next_z, .. } = self.nodes[ear];
        if self.turn(a, ear, c) >= C::zero() {
            return false;
        }

        let bounds = self.ear_bounds(a, ear, c);
        let z_min = curve.z_order(bounds.x_min, bounds.y_min);
        let z_max = curve.z_order(bounds.x_max, bounds.y_max);

        // Search both directions along the curve at once, then finish whichever remains
        let mut p = prev_z;
        let mut n = next_z;
        while let (Some(pi), Some(ni)) = (p, n) {
            if self.nodes[pi].z < z_min || self.nodes[ni].z > z_max {
                break;
            }
            if self.blocks_ear(pi, a, ear, c, &bounds) {
                return false;
            }
            p = self.nodes[pi].prev_z;

            if self.blocks_ear(ni, a, ear, c, &bounds) {
                return false;
            }
            n = self.nodes[ni].next_z;
        }

        while let Some(pi) = p {
            if self.nodes[pi].z < z_min {
                break;
            }
            if self.blocks_ear(pi, a, ear, c, &bounds) {
                return false;
            }
            p = self.nodes[pi].prev_z;
        }

        while let Some(ni) = n {
            if self.nodes[ni].z > z_max {
                break;
            }
            if self.blocks_ear(ni, a, ear, c, &bounds) {
                return false;
            }
            n = self.nodes[ni].next_z;
        }

        true
    }

    /// Clips the small self-intersections left at `a - p - p.next - b`
    fn cure_local_intersections(&mut self, start: NodeIdx<C>) -> NodeIdx<C> {
        let mut start = start;
        let mut p = start;
        loop {
            let Node { prev: a, next: p_next, .. } = self.nodes[p];
            let b = self.nodes[p_next].next;

            if !self.equals(a, b) && self.intersects(a, p, p_next, b) && self.locally_inside(a, b) && self.locally_inside(b, a) {
                self.emit(a, p, b);
                self.remove_node(p);
                self.remove_node(p_next);

                start = b;
                p = b;
            }

            p = self.nodes[p].next;
            if p == start {
                break;
            }
        }
        self.filter_points(p, None)
    }

    /// Splits the remaining polygon along a valid diagonal and clips both halves
    fn split_earcut(&mut self, start: NodeIdx<C>) -> Result<(), KernelError> {
        let mut a = start;
        loop {
            let mut b = self.nodes[self.nodes[a].next].next;
            while b != self.nodes[a].prev {
                if self.nodes[a].vi != self.nodes[b].vi && self.is_valid_diagonal(a, b) {
                    let c = self.split_polygon(a, b);

                    let a_next = self.nodes[a].next;
                    let a = self.filter_points(a, Some(a_next));
                    let c_next = self.nodes[c].next;
                    let c = self.filter_points(c, Some(c_next));

                    self.earcut_linked(a, Pass::Initial)?;
                    return self.earcut_linked(c, Pass::Initial);
                }
                b = self.nodes[b].next;
            }

            a = self.nodes[a].next;
            if a == start {
                break;
            }
        }

        let remaining = self.loop_len(start);
        if self.loop_area(start) == C::zero() {
            tracing::debug!("dropping {remaining} vertices enclosing no area");
            Ok(())
        } else {
            Err(KernelError::Untriangulable { remaining })
        }
    }

    // Holes

    fn eliminate_holes(&mut self, holes: &[Vec<Point<C>>], outer_node: NodeIdx<C>) -> NodeIdx<C> {
        let mut queue: SmallVec<[NodeIdx<C>; 8]> = SmallVec::with_capacity(holes.len());
        for ring in holes {
            if let Some(list) = self.link_ring(ring, OUTER_WINDING.reversed()) {
                queue.push(self.leftmost(list));
            }
        }

        let nodes = &self.nodes;
        queue.sort_by(|&a, &b| {
            let (a, b) = (&nodes[a], &nodes[b]);
            a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal)
                .then_with(|| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        });

        let mut outer_node = outer_node;
        for hole in queue {
            outer_node = self.eliminate_hole(hole, outer_node);
        }
        outer_node
    }

    fn eliminate_hole(&mut self, hole: NodeIdx<C>, outer_node: NodeIdx<C>) -> NodeIdx<C> {
        let bridge = match self.find_hole_bridge(hole, outer_node) {
            Some(bridge) => bridge,
            None => {
                tracing::debug!("no bridge found for hole vertex {}, hole ignored", self.nodes[hole].vi);
                return outer_node;
            }
        };

        let bridge_reverse = self.split_polygon(bridge, hole);
        let next = self.nodes[bridge_reverse].next;
        self.filter_points(bridge_reverse, Some(next));
        let next = self.nodes[bridge].next;
        self.filter_points(bridge, Some(next))
    }

    /// Finds an outer node visible from the hole's leftmost node `hole`
    fn find_hole_bridge(&self, hole: NodeIdx<C>, outer_node: NodeIdx<C>) -> Option<NodeIdx<C>> {
        let (hx, hy) = (self.nodes[hole].x, self.nodes[hole].y);

        if self.equals(hole, outer_node) {
            return Some(outer_node);
        }

        // Cast a ray left from the hole and find the nearest intersecting segment
        let mut p = outer_node;
        let mut nearest: Option<(C, NodeIdx<C>)> = None;
        loop {
            let next = self.nodes[p].next;
            if self.equals(hole, next) {
                return Some(next);
            }

            let (pn, nn) = (&self.nodes[p], &self.nodes[next]);
            if hy <= pn.y && hy >= nn.y && nn.y != pn.y {
                let x = pn.x + (hy - pn.y) * (nn.x - pn.x) / (nn.y - pn.y);
                if x <= hx && nearest.map_or(true, |(qx, _)| x > qx) {
                    let m = if pn.x < nn.x { p } else { next };
                    if x == hx {
                        // The hole touches the segment
                        return Some(m);
                    }
                    nearest = Some((x, m));
                }
            }

            p = next;
            if p == outer_node {
                break;
            }
        }

        let (qx, mut m) = nearest?;

        // Look for points inside the triangle (hole, intersection, m); the bridge goes to the one
        // with the smallest angle to the ray, or `m` if there are none
        let stop = m;
        let (mx, my) = (self.nodes[m].x, self.nodes[m].y);
        let mut tan_min: Option<C> = None;
        let mut p = m;
        loop {
            let (px, py) = (self.nodes[p].x, self.nodes[p].y);
            let (ax, cx) = if hy < my { (hx, qx) } else { (qx, hx) };
            if hx >= px && px >= mx && hx != px && point_in_triangle(ax, hy, mx, my, cx, hy, px, py) {
                let tan = (hy - py).abs() / (hx - px);
                let better = match tan_min {
                    None => true,
                    Some(tan_min) => {
                        let m_x = self.nodes[m].x;
                        tan < tan_min || (tan == tan_min && (px > m_x || (px == m_x && self.sector_contains_sector(m, p))))
                    }
                };
                if self.locally_inside(p, hole) && better {
                    m = p;
                    tan_min = Some(tan);
                }
            }

            p = self.nodes[p].next;
            if p == stop {
                break;
            }
        }

        Some(m)
    }

    /// Whether the sector at `m` contains the sector at `p` (both at the same position)
    fn sector_contains_sector(&self, m: NodeIdx<C>, p: NodeIdx<C>) -> bool {
        let (m_prev, m_next) = (self.nodes[m].prev, self.nodes[m].next);
        let (p_prev, p_next) = (self.nodes[p].prev, self.nodes[p].next);
        self.turn(m_prev, m, p_prev) < C::zero() && self.turn(p_next, m, m_next) < C::zero()
    }

    fn leftmost(&self, start: NodeIdx<C>) -> NodeIdx<C> {
        let mut p = start;
        let mut leftmost = start;
        loop {
            let (n, l) = (&self.nodes[p], &self.nodes[leftmost]);
            if n.x < l.x || (n.x == l.x && n.y < l.y) {
                leftmost = p;
            }
            p = n.next;
            if p == start {
                break;
            }
        }
        leftmost
    }

    // Z-order curve

    fn index_curve(&mut self, start: NodeIdx<C>, curve: ZCurve<C>) {
        let mut p = start;
        loop {
            let node = &mut self.nodes[p];
            node.z = curve.z_order(node.x, node.y);
            node.prev_z = Some(node.prev);
            node.next_z = Some(node.next);
            p = node.next;
            if p == start {
                break;
            }
        }

        if let Some(tail) = self.nodes[start].prev_z {
            self.nodes[tail].next_z = None;
        }
        self.nodes[start].prev_z = None;

        self.sort_linked(start);
    }

    /// Merge sorts the `z` list starting at `list`
    fn sort_linked(&mut self, list: NodeIdx<C>) {
        let mut list = Some(list);
        let mut in_size = 1;
        loop {
            let mut p = list;
            list = None;
            let mut tail: Option<NodeIdx<C>> = None;
            let mut merges = 0;

            while let Some(p_start) = p {
                merges += 1;

                let mut q = Some(p_start);
                let mut p_size = 0;
                for _ in 0..in_size {
                    p_size += 1;
                    q = q.and_then(|qi| self.nodes[qi].next_z);
                    if q.is_none() {
                        break;
                    }
                }
                let mut q_size = in_size;

                loop {
                    let e = match (p, q) {
                        (Some(pi), Some(qi)) if p_size > 0 && q_size > 0 => {
                            if self.nodes[pi].z <= self.nodes[qi].z {
                                p = self.nodes[pi].next_z;
                                p_size -= 1;
                                pi
                            } else {
                                q = self.nodes[qi].next_z;
                                q_size -= 1;
                                qi
                            }
                        }
                        (Some(pi), _) if p_size > 0 => {
                            p = self.nodes[pi].next_z;
                            p_size -= 1;
                            pi
                        }
                        (_, Some(qi)) if q_size > 0 => {
                            q = self.nodes[qi].next_z;
                            q_size -= 1;
                            qi
                        }
                        _ => break,
                    };

                    match tail {
                        Some(tail) => self.nodes[tail].next_z = Some(e),
                        None => list = Some(e),
                    }
                    self.nodes[e].prev_z = tail;
                    tail = Some(e);
                }

                p = q;
            }

            if let Some(tail) = tail {
                self.nodes[tail].next_z = None;
            }
            in_size *= 2;

            if merges <= 1 {
                break;
            }
        }
    }

    // Predicates

    fn equals(&self, a: NodeIdx<C>, b: NodeIdx<C>) -> bool {
        let (a, b) = (&self.nodes[a], &self.nodes[b]);
        a.x == b.x && a.y == b.y
    }

    /// Twice the signed area of `(p, q, r)`, negative when the turn is counter-clockwise
    fn turn(&self, p: NodeIdx<C>, q: NodeIdx<C>, r: NodeIdx<C>) -> C {
        let (p, q, r) = (&self.nodes[p], &self.nodes[q], &self.nodes[r]);
        (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
    }

    /// Whether `q` lies within the bounding box of segment `p - r`
    fn on_segment(&self, p: NodeIdx<C>, q: NodeIdx<C>, r: NodeIdx<C>) -> bool {
        let (p, q, r) = (&self.nodes[p], &self.nodes[q], &self.nodes[r]);
        q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
    }

    fn intersects(&self, p1: NodeIdx<C>, q1: NodeIdx<C>, p2: NodeIdx<C>, q2: NodeIdx<C>) -> bool {
        let o1 = sign(self.turn(p1, q1, p2));
        let o2 = sign(self.turn(p1, q1, q2));
        let o3 = sign(self.turn(p2, q2, p1));
        let o4 = sign(self.turn(p2, q2, q1));

        (o1 != o2 && o3 != o4) ||
            (o1 == 0 && self.on_segment(p1, p2, q1)) ||
            (o2 == 0 && self.on_segment(p1, q2, q1)) ||
            (o3 == 0 && self.on_segment(p2, p1, q2)) ||
            (o4 == 0 && self.on_segment(p2, q1, q2))
    }

    /// Whether the diagonal `a - b` crosses any edge of the list
    fn intersects_polygon(&self, a: NodeIdx<C>, b: NodeIdx<C>) -> bool {
        let (a_vi, b_vi) = (self.nodes[a].vi, self.nodes[b].vi);
        let mut p = a;
        loop {
            let next = self.nodes[p].next;
            let (p_vi, next_vi) = (self.nodes[p].vi, self.nodes[next].vi);
            if p_vi != a_vi && next_vi != a_vi && p_vi != b_vi && next_vi != b_vi && self.intersects(p, next, a, b) {
                return true;
            }
            p = next;
            if p == a {
                return false;
            }
        }
    }

    /// Whether the diagonal `a - b` starts inside the polygon at `a`
    fn locally_inside(&self, a: NodeIdx<C>, b: NodeIdx<C>) -> bool {
        let Node { prev, next, .. } = self.nodes[a];
        if self.turn(prev, a, next) < C::zero() {
            self.turn(a, b, next) >= C::zero() && self.turn(a, prev, b) >= C::zero()
        } else {
            self.turn(a, b, prev) < C::zero() || self.turn(a, next, b) < C::zero()
        }
    }

    /// Whether the midpoint of the diagonal `a - b` is inside the polygon
    fn middle_inside(&self, a: NodeIdx<C>, b: NodeIdx<C>) -> bool {
        let two = C::one() + C::one();
        let px = (self.nodes[a].x + self.nodes[b].x) / two;
        let py = (self.nodes[a].y + self.nodes[b].y) / two;

        let mut inside = false;
        let mut p = a;
        loop {
            let (n, next) = (&self.nodes[p], &self.nodes[self.nodes[p].next]);
            if (n.y > py) != (next.y > py) && next.y != n.y && px < (next.x - n.x) * (py - n.y) / (next.y - n.y) + n.x {
                inside = !inside;
            }
            p = n.next;
            if p == a {
                return inside;
            }
        }
    }

    fn is_valid_diagonal(&self, a: NodeIdx<C>, b: NodeIdx<C>) -> bool {
        let Node { prev: a_prev, next: a_next, .. } = self.nodes[a];
        let Node { prev: b_prev, next: b_next, .. } = self.nodes[b];
        let b_vi = self.nodes[b].vi;

        // Does not share an edge, and does not cross any
        self.nodes[a_next].vi != b_vi && self.nodes[a_prev].vi != b_vi && !self.intersects_polygon(a, b) &&
            (
                // Locally visible, and does not create a zero-area fold
                (self.locally_inside(a, b) && self.locally_inside(b, a) && self.middle_inside(a, b) &&
                    (self.turn(a_prev, a, b_prev) != C::zero() || self.turn(a, b_prev, b) != C::zero())) ||
                // Zero-length diagonal between two convex corners
                (self.equals(a, b) && self.turn(a_prev, a, a_next) > C::zero() && self.turn(b_prev, b, b_next) > C::zero())
            )
    }

    fn loop_len(&self, start: NodeIdx<C>) -> usize {
        let mut len = 0;
        let mut p = start;
        loop {
            len += 1;
            p = self.nodes[p].next;
            if p == start {
                return len;
            }
        }
    }

    fn loop_area(&self, start: NodeIdx<C>) -> C {
        let mut sum = C::zero();
        let mut p = start;
        loop {
            let (n, next) = (&self.nodes[p], &self.nodes[self.nodes[p].next]);
            sum = sum + (n.x * next.y - next.x * n.y);
            p = n.next;
            if p == start {
                return sum;
            }
        }
    }
}

fn sign<C: Real>(v: C) -> i8 {
    if v > C::zero() {
        1
    } else if v < C::zero() {
        -1
    } else {
        0
    }
}

/// Whether `p` is inside the counter-clockwise triangle `(a, b, c)`, boundary included
#[allow(clippy::too_many_arguments)]
fn point_in_triangle<C: Real>(ax: C, ay: C, bx: C, by: C, cx: C, cy: C, px: C, py: C) -> bool {
    (cx - px) * (ay - py) >= (ax - px) * (cy - py) &&
        (ax - px) * (by - py) >= (bx - px) * (ay - py) &&
        (bx - px) * (cy - py) >= (cx - px) * (by - py)
}
