use crate::{GeometryError, Mesh, Point3};

use super::{Quad, QuadTopology};

/// Axis-aligned box assembled from six [`Quad`] faces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cuboid {
    pub center: Point3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Cuboid {
    #[inline]
    pub const fn new(center: Point3, width: f32, height: f32, depth: f32) -> Self {
        Self { center, width, height, depth }
    }

    #[inline]
    pub const fn cube(center: Point3, size: f32) -> Self {
        Self::new(center, size, size, size)
    }

    /// Faces in the order front, back, left, right, top, bottom.
    pub fn faces(&self) -> [Quad; 6] {
        let (hw, hh, hd) = (self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        let c = self.center;
        [
            Quad::xy(c + Point3::new(0.0, 0.0, hd), self.width, self.height),
            Quad::xy(c - Point3::new(0.0, 0.0, hd), self.width, self.height),
            Quad::yz(c - Point3::new(hw, 0.0, 0.0), self.depth, self.height),
            Quad::yz(c + Point3::new(hw, 0.0, 0.0), self.depth, self.height),
            Quad::xz(c + Point3::new(0.0, hh, 0.0), self.width, self.depth),
            Quad::xz(c - Point3::new(0.0, hh, 0.0), self.width, self.depth),
        ]
    }

    /// Merges the six faces into one mesh (24 vertices).
    pub fn to_geometry(&self, topology: QuadTopology) -> Result<Mesh, GeometryError> {
        let faces = self
            .faces()
            .iter()
            .map(|f| f.to_geometry(0, topology))
            .collect::<Result<Vec<_>, _>>()?;
        Mesh::merge(faces)
    }
}
