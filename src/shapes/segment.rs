use crate::math::{Aabb, Vector2};

/// A line segment thickened by a radius (a capsule)
#[derive(Debug, Clone)]
pub struct Segment {
    /// First endpoint in body space
    a: Vector2,

    /// Second endpoint in body space
    b: Vector2,

    /// Unit normal in body space
    normal: Vector2,

    /// Thickness radius
    radius: f32,

    /// World-space endpoints and normal, refreshed by `update`
    ta: Vector2,
    tb: Vector2,
    tn: Vector2,
}

impl Segment {
    /// Creates a new segment. A zero-length segment gets an arbitrary unit
    /// normal so it behaves like a circle of `radius` instead of producing NaNs.
    pub fn new(a: Vector2, b: Vector2, radius: f32) -> Self {
        let tangent = b - a;
        let normal = if tangent.is_zero() {
            Vector2::unit_y()
        } else {
            tangent.normalize().perpendicular()
        };

        Self {
            a,
            b,
            normal,
            radius: radius.max(0.0),
            ta: a,
            tb: b,
            tn: normal,
        }
    }

    /// Returns the body-space endpoints
    pub fn get_endpoints(&self) -> (Vector2, Vector2) {
        (self.a, self.b)
    }

    /// Returns the thickness radius
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Returns the world-space first endpoint
    pub fn world_a(&self) -> Vector2 {
        self.ta
    }

    /// Returns the world-space second endpoint
    pub fn world_b(&self) -> Vector2 {
        self.tb
    }

    /// Returns the world-space unit normal
    pub fn world_normal(&self) -> Vector2 {
        self.tn
    }

    pub(crate) fn update(&mut self, position: Vector2, rotation: Vector2) -> Aabb {
        self.ta = position + self.a.rotate(&rotation);
        self.tb = position + self.b.rotate(&rotation);
        self.tn = self.normal.rotate(&rotation);

        let r = self.radius;
        Aabb::from_edges(
            self.ta.x.min(self.tb.x) - r,
            self.ta.y.min(self.tb.y) - r,
            self.ta.x.max(self.tb.x) + r,
            self.ta.y.max(self.tb.y) + r,
        )
    }

    /// Signed distance of a point from the segment's center line along the normal
    #[inline]
    pub(crate) fn normal_distance(&self, point: Vector2) -> f32 {
        self.tn.dot(&point) - self.ta.dot(&self.tn)
    }

    /// Tangential coordinates of a point and of both endpoints, `(dt, dt_min, dt_max)`
    #[inline]
    pub(crate) fn tangent_coordinates(&self, point: Vector2) -> (f32, f32, f32) {
        (
            -self.tn.cross(&point),
            -self.tn.cross(&self.ta),
            -self.tn.cross(&self.tb),
        )
    }

    pub(crate) fn contains_point(&self, point: Vector2) -> bool {
        let r = self.radius;
        if self.normal_distance(point).abs() - r > 0.0 {
            return false;
        }

        let (dt, dt_min, dt_max) = self.tangent_coordinates(point);
        if dt <= dt_min {
            dt >= dt_min - r && self.ta.distance_squared(&point) < r * r
        } else if dt < dt_max {
            true
        } else {
            dt < dt_max + r && self.tb.distance_squared(&point) < r * r
        }
    }
}
