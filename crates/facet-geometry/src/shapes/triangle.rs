use crate::{GeometryError, Mesh, Point3};

/// Triangle over three (copied) points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl Triangle {
    #[inline]
    pub const fn new(p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p1, p2, p3 }
    }

    #[inline]
    pub const fn points(&self) -> [Point3; 3] {
        [self.p1, self.p2, self.p3]
    }

    /// Numerizes the triangle: vertices `[p1, p2, p3]`, indices `[0, 1, 2]` shifted by `offset`.
    ///
    /// Fails with `IndexOverflow` if `offset + 2` exceeds `u16::MAX`.
    pub fn to_geometry(&self, offset: u16) -> Result<Mesh, GeometryError> {
        Mesh::indexed(self.points().to_vec(), [0, 1, 2], offset)
    }
}
