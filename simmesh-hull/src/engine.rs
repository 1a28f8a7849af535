//! Incremental convex hull construction.
//!
//! The engine aborts through [`fault`] on degenerate input or a broken
//! internal invariant; see the crate docs for the escape protocol.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::error::HullFault;

/// One triangular hull facet.
#[derive(Debug, Clone, Copy)]
pub struct HullFacet {
    /// Input point indices of the three corners, in stored order.
    pub points: [usize; 3],
    /// True when the stored order winds clockwise around the outward
    /// normal; swapping the first two corners restores outward winding.
    pub toporient: bool,
}

/// A finished convex hull.
#[derive(Debug, Clone)]
pub struct Hull {
    /// Input point indices of the hull corners, in ascending order.
    pub vertices: Vec<usize>,
    /// Triangular facets.
    pub facets: Vec<HullFacet>,
    /// Indices into `facets` of the facets incident to each hull vertex,
    /// parallel to `vertices`.
    pub vertex_facets: Vec<Vec<usize>>,
}

/// Escape with a fault payload. The bridge is the only landing pad.
fn fault(f: HullFault) -> ! {
    std::panic::panic_any(f)
}

struct Facet {
    verts: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
    toporient: bool,
    alive: bool,
}

struct Engine<'a> {
    points: &'a [Point3<f64>],
    eps: f64,
    min_norm: f64,
    interior: Point3<f64>,
    facets: Vec<Facet>,
}

/// Build the hull of `points`. Escapes with a [`HullFault`] on failure.
pub(crate) fn build(points: &[Point3<f64>]) -> Hull {
    if points.len() < 4 {
        fault(HullFault::TooFewPoints(points.len()));
    }

    let scale = points
        .iter()
        .map(|p| p.coords.amax())
        .fold(1.0f64, f64::max);
    let eps = 1e-10 * scale;

    let seed = initial_simplex(points, eps);
    let interior = Point3::from(
        (points[seed[0]].coords
            + points[seed[1]].coords
            + points[seed[2]].coords
            + points[seed[3]].coords)
            / 4.0,
    );

    let mut engine = Engine {
        points,
        eps,
        min_norm: 1e-14 * scale * scale,
        interior,
        facets: Vec::new(),
    };

    for tri in [
        [seed[0], seed[1], seed[2]],
        [seed[0], seed[1], seed[3]],
        [seed[0], seed[2], seed[3]],
        [seed[1], seed[2], seed[3]],
    ] {
        let facet = engine.make_facet(tri);
        engine.facets.push(facet);
    }

    for pid in 0..points.len() {
        if seed.contains(&pid) {
            continue;
        }
        engine.insert(pid);
    }

    engine.finish()
}

/// Pick four affinely independent seed points, or escape.
fn initial_simplex(points: &[Point3<f64>], eps: f64) -> [usize; 4] {
    // widest axis-aligned spread
    let mut best = (0usize, 0usize, 0.0f64);
    for axis in 0..3 {
        let (mut lo, mut hi) = (0usize, 0usize);
        for (i, p) in points.iter().enumerate() {
            if p[axis] < points[lo][axis] {
                lo = i;
            }
            if p[axis] > points[hi][axis] {
                hi = i;
            }
        }
        let spread = points[hi][axis] - points[lo][axis];
        if spread > best.2 {
            best = (lo, hi, spread);
        }
    }
    let (i0, i1, spread) = best;
    if spread <= eps {
        fault(HullFault::Degenerate("all coincident"));
    }

    // furthest from the line through i0, i1
    let dir = (points[i1] - points[i0]).normalize();
    let line_dist = |p: &Point3<f64>| {
        let rel = p - points[i0];
        (rel - dir * rel.dot(&dir)).norm()
    };
    let Some((i2, d2)) = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, line_dist(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    else {
        fault(HullFault::Degenerate("all coincident"));
    };
    if d2 <= eps {
        fault(HullFault::Degenerate("collinear"));
    }

    // furthest from the plane through i0, i1, i2
    let normal = (points[i1] - points[i0])
        .cross(&(points[i2] - points[i0]))
        .normalize();
    let plane_dist = |p: &Point3<f64>| (p - points[i0]).dot(&normal).abs();
    let Some((i3, d3)) = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, plane_dist(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    else {
        fault(HullFault::Degenerate("all coincident"));
    };
    if d3 <= eps {
        fault(HullFault::Degenerate("coplanar"));
    }

    [i0, i1, i2, i3]
}

impl Engine<'_> {
    /// Create a facet over `verts` with its outward normal. The stored
    /// corner order is kept; `toporient` records when it winds the wrong
    /// way around the outward normal.
    fn make_facet(&self, verts: [usize; 3]) -> Facet {
        let [a, b, c] = verts.map(|v| self.points[v]);
        let raw = (b - a).cross(&(c - a));
        if raw.norm() < self.min_norm {
            fault(HullFault::DegenerateFacet);
        }
        let mut normal = raw.normalize();
        let mut offset = normal.dot(&a.coords);
        let mut toporient = false;
        if normal.dot(&self.interior.coords) > offset {
            normal = -normal;
            offset = -offset;
            toporient = true;
        }
        Facet {
            verts,
            normal,
            offset,
            toporient,
            alive: true,
        }
    }

    /// Add one point: find the facets it sees, replace them with a cone
    /// over the horizon.
    fn insert(&mut self, pid: usize) {
        let p = self.points[pid];

        let visible: Vec<usize> = self
            .facets
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && f.normal.dot(&p.coords) - f.offset > self.eps)
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            return;
        }

        // horizon = undirected edges of the visible region used exactly once
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for &fi in &visible {
            let [a, b, c] = self.facets[fi].verts;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let key = if u < v { (u, v) } else { (v, u) };
                *edge_count.entry(key).or_insert(0) += 1;
            }
        }

        // a convex visible region always leaves a closed horizon; an
        // empty one means the construction lost convexity
        if edge_count.values().all(|&count| count != 1) {
            fault(HullFault::DegenerateFacet);
        }

        for &fi in &visible {
            self.facets[fi].alive = false;
        }

        for (&(u, v), &count) in &edge_count {
            if count == 1 {
                let facet = self.make_facet([u, v, pid]);
                self.facets.push(facet);
            }
        }
    }

    /// Compact live facets and derive the vertex list and incidences.
    fn finish(self) -> Hull {
        let facets: Vec<HullFacet> = self
            .facets
            .into_iter()
            .filter(|f| f.alive)
            .map(|f| HullFacet {
                points: f.verts,
                toporient: f.toporient,
            })
            .collect();

        let mut vertices: Vec<usize> = facets.iter().flat_map(|f| f.points).collect();
        vertices.sort_unstable();
        vertices.dedup();

        let local: HashMap<usize, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, &pid)| (pid, i))
            .collect();

        let mut vertex_facets = vec![Vec::new(); vertices.len()];
        for (fi, facet) in facets.iter().enumerate() {
            for pid in facet.points {
                vertex_facets[local[&pid]].push(fi);
            }
        }

        Hull {
            vertices,
            facets,
            vertex_facets,
        }
    }
}

impl HullFacet {
    /// Corner order wound counter-clockwise around the outward normal.
    #[must_use]
    pub fn outward(&self) -> [usize; 3] {
        let [a, b, c] = self.points;
        if self.toporient {
            [b, a, c]
        } else {
            [a, b, c]
        }
    }
}
