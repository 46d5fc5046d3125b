use crate::{GeometryError, Mesh, Point3};

use super::Triangle;

/// Index layout used when numerizing a [`Quad`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QuadTopology {
    /// Two triangles sharing the `p1`–`p3` diagonal: `[0, 1, 2, 0, 3, 2]`.
    Triangles,
    /// Closed outline drawn as a line strip: `[0, 1, 2, 3, 0]`.
    LineLoop,
}

impl QuadTopology {
    pub const fn pattern(self) -> &'static [u16] {
        match self {
            QuadTopology::Triangles => &[0, 1, 2, 0, 3, 2],
            QuadTopology::LineLoop => &[0, 1, 2, 3, 0],
        }
    }
}

/// Four-cornered planar patch.
///
/// Corner order: bottom-left, top-left, top-right, bottom-right.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
    pub p4: Point3,
}

impl Quad {
    #[inline]
    pub const fn new(p1: Point3, p2: Point3, p3: Point3, p4: Point3) -> Self {
        Self { p1, p2, p3, p4 }
    }

    /// Axis-aligned rectangle on the XY plane (`width` along X, `height` along Y).
    pub fn xy(center: Point3, width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let Point3 { x, y, z } = center;
        Self::new(
            Point3::new(x - hw, y - hh, z),
            Point3::new(x - hw, y + hh, z),
            Point3::new(x + hw, y + hh, z),
            Point3::new(x + hw, y - hh, z),
        )
    }

    /// Axis-aligned rectangle on the YZ plane (`width` along Z, `height` along Y).
    pub fn yz(center: Point3, width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let Point3 { x, y, z } = center;
        Self::new(
            Point3::new(x, y - hh, z - hw),
            Point3::new(x, y + hh, z - hw),
            Point3::new(x, y + hh, z + hw),
            Point3::new(x, y - hh, z + hw),
        )
    }

    /// Axis-aligned rectangle on the XZ plane (`width` along X, `height` along Z).
    pub fn xz(center: Point3, width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let Point3 { x, y, z } = center;
        Self::new(
            Point3::new(x - hw, y, z - hh),
            Point3::new(x - hw, y, z + hh),
            Point3::new(x + hw, y, z + hh),
            Point3::new(x + hw, y, z - hh),
        )
    }

    #[inline]
    pub const fn corners(&self) -> [Point3; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }

    /// Splits the quad along the `p1`–`p3` diagonal.
    pub fn trianglize(&self) -> [Triangle; 2] {
        [
            Triangle::new(self.p1, self.p2, self.p3),
            Triangle::new(self.p1, self.p4, self.p3),
        ]
    }

    /// Corners plus `topology`'s pattern shifted by `offset`.
    ///
    /// Fails with `IndexOverflow` if a shifted index exceeds `u16::MAX`.
    pub fn to_geometry(&self, offset: u16, topology: QuadTopology) -> Result<Mesh, GeometryError> {
        Mesh::indexed(self.corners().to_vec(), topology.pattern().iter().copied(), offset)
    }

    #[inline]
    pub fn as_triangles(&self, offset: u16) -> Result<Mesh, GeometryError> {
        self.to_geometry(offset, QuadTopology::Triangles)
    }

    #[inline]
    pub fn as_line_loop(&self, offset: u16) -> Result<Mesh, GeometryError> {
        self.to_geometry(offset, QuadTopology::LineLoop)
    }
}
