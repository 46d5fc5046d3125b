use std::f32::consts::TAU;
use std::iter;

use crate::{GeometryError, Mesh, Point3};

use super::Triangle;

/// Regular polygon approximation of a circle on the XY plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: Point3,
    pub radius: f32,
    sides: u16,
}

impl Circle {
    /// Fewest sides that still enclose an area.
    pub const MIN_SIDES: u16 = 3;

    /// Creates a circle; `sides` is raised to [`Circle::MIN_SIDES`] if smaller
    /// and capped so that every boundary sample stays addressable by a `u16` index.
    pub fn new(center: Point3, radius: f32, sides: u16) -> Self {
        Self {
            center,
            radius,
            sides: sides.clamp(Self::MIN_SIDES, u16::MAX - 1),
        }
    }

    #[inline]
    pub fn sides(&self) -> u16 {
        self.sides
    }

    /// Angle between two consecutive boundary samples, in radians.
    #[inline]
    pub fn angle_step(&self) -> f32 {
        TAU / self.sides as f32
    }

    /// Boundary samples at `i * angle_step` for `i` in `0..=sides`.
    ///
    /// The last sample lands on the first one again.
    pub fn boundary(&self) -> Vec<Point3> {
        let step = self.angle_step();
        (0..=self.sides)
            .map(|i| {
                let a = step * i as f32;
                self.center + Point3::new(a.cos(), a.sin(), 0.0) * self.radius
            })
            .collect()
    }

    /// Outline for line-strip drawing: indices `0..sides` followed by a closing `0`.
    pub fn as_line_loop(&self, offset: u16) -> Result<Mesh, GeometryError> {
        let local = (0..self.sides).chain(iter::once(0));
        Mesh::indexed(self.boundary(), local, offset)
    }

    /// Fan triangulation anchored at the first boundary sample.
    pub fn trianglize(&self) -> Vec<Triangle> {
        let v = self.boundary();
        (2..=self.sides as usize)
            .map(|i| Triangle::new(v[0], v[i - 1], v[i]))
            .collect()
    }

    /// Indexed form of [`Circle::trianglize`] over the `sides + 1` boundary vertices.
    pub fn as_triangles(&self, offset: u16) -> Result<Mesh, GeometryError> {
        let local = (2..=self.sides).flat_map(|i| [0, i - 1, i]);
        Mesh::indexed(self.boundary(), local, offset)
    }
}
