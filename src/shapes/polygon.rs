use crate::bodies::area_for_polygon;
use crate::error::PhysicsError;
use crate::math::{Aabb, Vector2};
use crate::Result;

/// An edge of a polygon as a half-plane: points `p` with `n·p <= d` are inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonAxis {
    /// Outward unit normal
    pub n: Vector2,

    /// Distance of the edge from the origin along `n`
    pub d: f32,
}

/// A convex polygon.
///
/// Vertices are wound so that `perpendicular(v[i+1] - v[i])` points out of
/// the polygon (clockwise with the y axis pointing up).
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in body space, offset already applied
    verts: Vec<Vector2>,

    /// Edge axes in body space
    axes: Vec<PolygonAxis>,

    /// World-space vertices, refreshed by `update`
    t_verts: Vec<Vector2>,

    /// World-space edge axes, refreshed by `update`
    t_axes: Vec<PolygonAxis>,
}

impl Polygon {
    /// Creates a polygon, validating that it is convex, wound correctly and has area
    pub fn new(vertices: &[Vector2], offset: Vector2) -> Result<Self> {
        let count = vertices.len();
        if count < 3 {
            return Err(PhysicsError::InvalidParameter(format!(
                "polygon needs at least 3 vertices, got {}",
                count
            )));
        }

        let verts: Vec<Vector2> = vertices.iter().map(|v| *v + offset).collect();

        for i in 0..count {
            let a = verts[i];
            let b = verts[(i + 1) % count];
            let c = verts[(i + 2) % count];

            if (b - a).is_zero() {
                return Err(PhysicsError::InvalidParameter(format!(
                    "polygon edge {} has zero length",
                    i
                )));
            }
            if (b - a).cross(&(c - b)) > 0.0 {
                return Err(PhysicsError::InvalidParameter(format!(
                    "polygon is concave or wound the wrong way at vertex {}",
                    (i + 1) % count
                )));
            }
        }

        if area_for_polygon(&verts) <= 0.0 {
            return Err(PhysicsError::InvalidParameter(
                "polygon has no area".to_string(),
            ));
        }

        let axes: Vec<PolygonAxis> = (0..count)
            .map(|i| {
                let a = verts[i];
                let b = verts[(i + 1) % count];
                let n = (b - a).normalize().perpendicular();
                PolygonAxis { n, d: n.dot(&a) }
            })
            .collect();

        Ok(Self {
            t_verts: verts.clone(),
            t_axes: axes.clone(),
            verts,
            axes,
        })
    }

    /// Returns the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Returns the body-space vertices
    pub fn get_vertices(&self) -> &[Vector2] {
        &self.verts
    }

    /// Returns the body-space edge axes
    pub fn get_axes(&self) -> &[PolygonAxis] {
        &self.axes
    }

    /// Returns the world-space vertices
    pub fn world_vertices(&self) -> &[Vector2] {
        &self.t_verts
    }

    /// Returns the world-space edge axes
    pub fn world_axes(&self) -> &[PolygonAxis] {
        &self.t_axes
    }

    pub(crate) fn update(&mut self, position: Vector2, rotation: Vector2) -> Aabb {
        for (t, v) in self.t_verts.iter_mut().zip(&self.verts) {
            *t = position + v.rotate(&rotation);
        }

        for (t, axis) in self.t_axes.iter_mut().zip(&self.axes) {
            let n = axis.n.rotate(&rotation);
            *t = PolygonAxis {
                n,
                d: position.dot(&n) + axis.d,
            };
        }

        let mut bb = Aabb::new(self.t_verts[0], self.t_verts[0]);
        for v in &self.t_verts[1..] {
            bb.expand_to_include_point(*v);
        }
        bb
    }

    /// Smallest signed distance of any world vertex from the half-plane `(n, d)`
    pub fn value_on_axis(&self, n: Vector2, d: f32) -> f32 {
        self.t_verts
            .iter()
            .map(|v| n.dot(v))
            .fold(f32::INFINITY, f32::min)
            - d
    }

    /// Returns true if the world-space point is inside every edge half-plane
    pub fn contains_vertex(&self, v: Vector2) -> bool {
        self.t_axes.iter().all(|axis| axis.n.dot(&v) - axis.d <= 0.0)
    }
}
