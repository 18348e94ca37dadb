//! Planar overlay of an outer ring and its holes.
//!
//! Every ring is split wherever it meets another ring. A piece of edge is kept when the filled
//! area (inside the outer ring and outside every hole) lies on exactly one side of it, and the
//! kept pieces are chained into counter-clockwise shells and the clockwise gaps inside them.
//! Holes which overlap, nest, touch, or cross the outer boundary all reduce to this.

use std::{cmp::Ordering, iter};

use num_traits::NumCast;
use smallvec::SmallVec;

use crate::{Bounds, Real, TriangleWinding, Vertex, errors::KernelError, geometry::{self, Location}};

/// A vertex of the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point<C: Real> {
    /// Index in the concatenated rings, or past their end for a vertex added where two rings cross
    pub vi: usize,
    pub x: C,
    pub y: C,
}

impl<C: Real> Vertex for Point<C> {
    type Coordinate = C;

    #[inline(always)]
    fn x(&self) -> C {
        self.x
    }

    #[inline(always)]
    fn y(&self) -> C {
        self.y
    }
}

/// A connected piece of the filled area
#[derive(Debug, Clone)]
pub(crate) struct Piece<C: Real> {
    /// Counter-clockwise outline
    pub shell: Vec<Point<C>>,
    /// Clockwise outlines of the gaps within the shell
    pub holes: Vec<Vec<Point<C>>>,
}

impl<C: Real> Piece<C> {
    pub fn vertex_count(&self) -> usize {
        self.shell.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Overlay<C: Real> {
    pub pieces: Vec<Piece<C>>,
    /// Vertices added where two rings cross. The first has the index following the last input vertex.
    pub added: Vec<[C; 2]>,
}

/// Splits `rings` against each other and extracts the area inside `rings[0]` and outside the others.
///
/// Holes which enclose no area are ignored. A ring crossing itself is rejected with
/// [KernelError::SelfIntersecting].
pub(crate) fn overlay<V: Vertex>(rings: &[&[V]]) -> Result<Overlay<V::Coordinate>, KernelError> {
    let mut builder = Builder::new(rings)?;
    builder.split_edges()?;
    let boundary = builder.boundary();
    Ok(builder.assemble(&boundary))
}

struct Ring<C: Real> {
    points: Vec<Point<C>>,
    winding: Option<TriangleWinding>,
    bounds: Option<Bounds<C>>,
}

/// An input edge between two nodes
#[derive(Debug, Clone, Copy)]
struct Edge {
    ring: usize,
    from: usize,
    to: usize,
}

/// The part of an [Edge] between two consecutive split nodes, keyed with `lo < hi`
#[derive(Debug, Clone, Copy)]
struct Span {
    lo: usize,
    hi: usize,
    ring: usize,
    /// The ring runs from `lo` to `hi`
    forward: bool,
}

struct Builder<C: Real> {
    rings: Vec<Ring<C>>,
    /// Distinct positions. Input vertices sharing a position share the node of the lowest index.
    nodes: Vec<Point<C>>,
    input_count: usize,
    added: Vec<[C; 2]>,
    edges: Vec<Edge>,
    /// Crossing parameter and node of every split point of each edge
    splits: Vec<SmallVec<[(C, usize); 2]>>,
    full_turn: C,
}

fn compare<C: Real>(a: C, b: C) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn opposite<C: Real>(a: C, b: C) -> bool {
    let zero = C::zero();
    (a > zero && b < zero) || (a < zero && b > zero)
}

impl<C: Real> Builder<C> {
    fn new<V: Vertex<Coordinate=C>>(rings: &[&[V]]) -> Result<Self, KernelError> {
        let full_turn = <C as NumCast>::from(std::f64::consts::TAU)
            .ok_or_else(|| KernelError::internal("Coordinate type cannot represent a full turn"))?;

        let positions: Vec<(C, C)> = rings.iter()
            .flat_map(|ring| ring.iter().map(|v| (v.x(), v.y())))
            .collect();
        let input_count = positions.len();

        let mut order: Vec<usize> = (0..input_count).collect();
        order.sort_by(|&a, &b| {
            compare(positions[a].0, positions[b].0)
                .then_with(|| compare(positions[a].1, positions[b].1))
                .then(a.cmp(&b))
        });
        let mut node_of = vec![0; input_count];
        let mut nodes: Vec<Point<C>> = Vec::with_capacity(input_count);
        for vi in order {
            let (x, y) = positions[vi];
            match nodes.last() {
                Some(last) if last.x == x && last.y == y => node_of[vi] = nodes.len() - 1,
                _ => {
                    node_of[vi] = nodes.len();
                    nodes.push(Point { vi, x, y });
                }
            }
        }

        let mut ring_list = Vec::with_capacity(rings.len());
        let mut edges = Vec::with_capacity(input_count);
        let mut offset = 0;
        for (ring, &vertices) in rings.iter().enumerate() {
            let count = vertices.len();
            let points: Vec<Point<C>> = vertices.iter()
                .enumerate()
                .map(|(i, v)| Point { vi: offset + i, x: v.x(), y: v.y() })
                .collect();
            let winding = if count >= 3 { geometry::winding(&points) } else { None };
            if winding.is_none() && ring > 0 {
                tracing::debug!("hole ring {ring} encloses no area, ignored");
            }

            if count >= 3 {
                for i in 0..count {
                    let (from, to) = (node_of[offset + i], node_of[offset + (i + 1) % count]);
                    if from != to {
                        edges.push(Edge { ring, from, to });
                    }
                }
            }

            ring_list.push(Ring {
                bounds: Bounds::of(&points),
                points,
                winding,
            });
            offset += count;
        }

        Ok(Self {
            rings: ring_list,
            nodes,
            input_count,
            added: Vec::new(),
            splits: vec![SmallVec::new(); edges.len()],
            edges,
            full_turn,
        })
    }

    fn edge_bounds(&self, edge: Edge) -> Bounds<C> {
        let (a, b) = (self.nodes[edge.from], self.nodes[edge.to]);
        Bounds::point(a.x, a.y).extend(b.x, b.y)
    }

    /// Twice the signed area of the triangle `(a, b, c)`
    fn orient(&self, a: usize, b: usize, c: usize) -> C {
        let (a, b, c) = (self.nodes[a], self.nodes[b], self.nodes[c]);
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    /// Finds every point where edges of different rings meet, sweeping edges by `x_min`
    fn split_edges(&mut self) -> Result<(), KernelError> {
        let bounds: Vec<Bounds<C>> = self.edges.iter().map(|&edge| self.edge_bounds(edge)).collect();
        let mut order: Vec<usize> = (0..self.edges.len()).collect();
        order.sort_by(|&a, &b| compare(bounds[a].x_min, bounds[b].x_min));

        for (k, &e) in order.iter().enumerate() {
            for &f in &order[k + 1..] {
                if bounds[f].x_min > bounds[e].x_max {
                    break;
                }
                if !bounds[e].intersects(&bounds[f]) {
                    continue;
                }

                let (a, b) = (self.edges[e], self.edges[f]);
                if a.ring == b.ring {
                    if self.crosses(a, b) {
                        return Err(KernelError::SelfIntersecting { ring: a.ring });
                    }
                } else if self.rings[a.ring].winding.is_some() && self.rings[b.ring].winding.is_some() {
                    self.intersect(e, f);
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if two edges of the same ring cross at a point interior to both
    fn crosses(&self, a: Edge, b: Edge) -> bool {
        if a.from == b.from || a.from == b.to || a.to == b.from || a.to == b.to {
            return false;
        }
        opposite(self.orient(b.from, b.to, a.from), self.orient(b.from, b.to, a.to)) &&
        opposite(self.orient(a.from, a.to, b.from), self.orient(a.from, a.to, b.to))
    }

    fn intersect(&mut self, e: usize, f: usize) {
        let (a, b) = (self.edges[e], self.edges[f]);
        let d1 = self.orient(b.from, b.to, a.from);
        let d2 = self.orient(b.from, b.to, a.to);
        let d3 = self.orient(a.from, a.to, b.from);
        let d4 = self.orient(a.from, a.to, b.to);

        if opposite(d1, d2) && opposite(d3, d4) {
            let t = d1 / (d1 - d2);
            let s = d3 / (d3 - d4);
            let (p, q) = (self.nodes[a.from], self.nodes[a.to]);
            let node = self.crossing_node(p.x + t * (q.x - p.x), p.y + t * (q.y - p.y));
            self.splits[e].push((t, node));
            self.splits[f].push((s, node));
            return;
        }

        // Touching or collinear: split each edge at the other's endpoints lying within it
        let zero = C::zero();
        for (node, d) in [(b.from, d3), (b.to, d4)] {
            if d == zero {
                if let Some(t) = self.interior_parameter(a, node) {
                    self.splits[e].push((t, node));
                }
            }
        }
        for (node, d) in [(a.from, d1), (a.to, d2)] {
            if d == zero {
                if let Some(s) = self.interior_parameter(b, node) {
                    self.splits[f].push((s, node));
                }
            }
        }
    }

    /// Position of collinear `node` along `edge`, if strictly between its endpoints
    fn interior_parameter(&self, edge: Edge, node: usize) -> Option<C> {
        if node == edge.from || node == edge.to {
            return None;
        }
        let (p, q, r) = (self.nodes[edge.from], self.nodes[edge.to], self.nodes[node]);
        let (dx, dy) = (q.x - p.x, q.y - p.y);
        let t = ((r.x - p.x) * dx + (r.y - p.y) * dy) / (dx * dx + dy * dy);
        (t > C::zero() && t < C::one()).then(|| t)
    }

    fn crossing_node(&mut self, x: C, y: C) -> usize {
        if let Some(node) = self.nodes.iter().position(|n| n.x == x && n.y == y) {
            return node;
        }
        let vi = self.input_count + self.added.len();
        self.added.push([x, y]);
        self.nodes.push(Point { vi, x, y });
        self.nodes.len() - 1
    }

    fn spans(&self) -> Vec<Span> {
        let mut spans = Vec::with_capacity(self.edges.len());
        for (edge, splits) in self.edges.iter().zip(&self.splits) {
            if self.rings[edge.ring].winding.is_none() {
                continue;
            }
            let mut splits = splits.clone();
            splits.sort_by(|a, b| compare(a.0, b.0));

            let mut from = edge.from;
            for to in splits.iter().map(|&(_, node)| node).chain(iter::once(edge.to)) {
                if to == from {
                    continue;
                }
                spans.push(Span {
                    lo: from.min(to),
                    hi: from.max(to),
                    ring: edge.ring,
                    forward: from < to,
                });
                from = to;
            }
        }
        spans.sort_by_key(|span| (span.lo, span.hi));
        spans
    }

    /// The directed edges with the filled area on their left
    fn boundary(&self) -> Vec<(usize, usize)> {
        let spans = self.spans();
        let mut boundary = Vec::new();

        let mut start = 0;
        while start < spans.len() {
            let (lo, hi) = (spans[start].lo, spans[start].hi);
            let end = start + spans[start..].iter().take_while(|span| span.lo == lo && span.hi == hi).count();
            match self.filled_sides(lo, hi, &spans[start..end]) {
                (true, false) => boundary.push((lo, hi)),
                (false, true) => boundary.push((hi, lo)),
                _ => { }
            }
            start = end;
        }
        boundary
    }

    /// Whether the filled area lies left and right of `lo -> hi`. `coincident` holds every
    /// ring's span along that segment.
    fn filled_sides(&self, lo: usize, hi: usize, coincident: &[Span]) -> (bool, bool) {
        let (a, b) = (self.nodes[lo], self.nodes[hi]);
        let two = C::one() + C::one();
        let (x, y) = ((a.x + b.x) / two, (a.y + b.y) / two);
        let midpoint = Bounds::point(x, y);

        let mut filled = (false, false);
        for (index, ring) in self.rings.iter().enumerate() {
            let winding = match ring.winding {
                Some(winding) => winding,
                None => continue,
            };
            let sides = match coincident.iter().find(|span| span.ring == index) {
                Some(span) => {
                    let left = (winding == TriangleWinding::Counterclockwise) == span.forward;
                    (left, !left)
                }
                None => match ring.bounds {
                    Some(bounds) if bounds.contains(&midpoint) => {
                        let inside = geometry::locate(&ring.points, x, y) == Location::Inside;
                        (inside, inside)
                    }
                    _ => (false, false),
                },
            };

            if index == 0 {
                filled = sides;
            } else {
                filled.0 &= !sides.0;
                filled.1 &= !sides.1;
            }
            if !filled.0 && !filled.1 {
                break;
            }
        }
        filled
    }

    /// Clockwise angle from `via -> from` round to `via -> to`, in `(0, 2π]`
    fn clockwise_angle(&self, from: usize, via: usize, to: usize) -> C {
        let (a, b, c) = (self.nodes[from], self.nodes[via], self.nodes[to]);
        let angle = (a.y - b.y).atan2(a.x - b.x) - (c.y - b.y).atan2(c.x - b.x);
        if angle > C::zero() {
            angle
        } else {
            angle + self.full_turn
        }
    }

    /// Chains `boundary` into outlines. At a shared node the walk takes the first edge clockwise
    /// from the one it arrived on, which keeps to the boundary of a single face. Faces which
    /// pinch at a node are then split into one outline per side.
    fn assemble(self, boundary: &[(usize, usize)]) -> Overlay<C> {
        let mut outgoing: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); self.nodes.len()];
        for (i, &(from, _)) in boundary.iter().enumerate() {
            outgoing[from].push(i);
        }

        let mut used = vec![false; boundary.len()];
        let mut position = vec![None; self.nodes.len()];
        let mut shells: Vec<(C, Vec<Point<C>>)> = Vec::new();
        let mut gaps: Vec<Vec<Point<C>>> = Vec::new();
        for start in 0..boundary.len() {
            if used[start] {
                continue;
            }

            let mut outline = Vec::new();
            let mut current = start;
            loop {
                used[current] = true;
                let (from, to) = boundary[current];
                outline.push(from);

                let next = outgoing[to].iter()
                    .copied()
                    .filter(|&edge| !used[edge] || edge == start)
                    .min_by(|&a, &b| compare(
                        self.clockwise_angle(from, to, boundary[a].1),
                        self.clockwise_angle(from, to, boundary[b].1),
                    ));
                match next {
                    Some(next) if next != start => current = next,
                    _ => break,
                }
            }

            for outline in split_pinches(outline, &mut position) {
                let outline: Vec<Point<C>> = outline.into_iter().map(|node| self.nodes[node]).collect();
                let area = geometry::signed_area(&outline);
                if area > C::zero() {
                    shells.push((area, outline));
                } else if area < C::zero() {
                    gaps.push(outline);
                } else {
                    tracing::debug!("outline of {} vertices encloses no area, dropped", outline.len());
                }
            }
        }

        // Smallest first, so each gap goes to the innermost shell around it
        shells.sort_by(|a, b| compare(a.0, b.0));
        let mut pieces: Vec<Piece<C>> = shells.into_iter()
            .map(|(_, shell)| Piece { shell, holes: Vec::new() })
            .collect();
        for gap in gaps {
            match pieces.iter().position(|piece| encloses(&piece.shell, &gap)) {
                Some(piece) => pieces[piece].holes.push(gap),
                None => tracing::debug!("gap outline of {} vertices lies outside every shell, dropped", gap.len()),
            }
        }

        tracing::debug!("overlay has {} pieces and {} added vertices", pieces.len(), self.added.len());
        Overlay {
            pieces,
            added: self.added,
        }
    }
}

/// Splits a closed walk over nodes into simple loops wherever it revisits a node. `position` is
/// scratch space indexed by node, and is left cleared.
fn split_pinches(walk: Vec<usize>, position: &mut [Option<usize>]) -> Vec<Vec<usize>> {
    let mut loops = Vec::new();
    let mut stack: Vec<usize> = Vec::with_capacity(walk.len());
    for node in walk {
        if let Some(at) = position[node] {
            let pinched = stack.split_off(at);
            for &n in &pinched {
                position[n] = None;
            }
            loops.push(pinched);
        }
        position[node] = Some(stack.len());
        stack.push(node);
    }
    for &n in &stack {
        position[n] = None;
    }
    loops.push(stack);
    loops
}

/// Returns `true` if `outline`, which does not cross `shell`, lies inside it
fn encloses<C: Real>(shell: &[Point<C>], outline: &[Point<C>]) -> bool {
    geometry::samples(outline)
        .map(|(x, y)| geometry::locate(shell, x, y))
        .find(|&location| location != Location::Boundary)
        == Some(Location::Inside)
}
