use std::f32::consts::TAU;

use crate::{Mesh, Point3};

use super::Quad;

/// Local indices for one pair of side quads, see [`Cylinder::to_geometry`].
const PAIR_PATTERN: [u16; 6] = [1, 0, 2, 3, 2, 3];

/// Open cylinder side wall around the Y axis.
///
/// The ring lies in the XZ plane; `top` and `bottom` are Y heights.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cylinder {
    pub radius: f32,
    pub top: f32,
    pub bottom: f32,
    sides: u16,
}

impl Cylinder {
    pub const DEFAULT_TOP: f32 = 0.0;
    pub const DEFAULT_BOTTOM: f32 = -0.2;

    /// Largest side count whose numerized forms stay within `u16` indices.
    pub const MAX_SIDES: u16 = u16::MAX / 2;

    pub fn new(radius: f32, sides: u16) -> Self {
        Self::with_heights(radius, sides, Self::DEFAULT_TOP, Self::DEFAULT_BOTTOM)
    }

    pub fn with_heights(radius: f32, sides: u16, top: f32, bottom: f32) -> Self {
        Self {
            radius,
            top,
            bottom,
            sides: sides.min(Self::MAX_SIDES),
        }
    }

    #[inline]
    pub fn sides(&self) -> u16 {
        self.sides
    }

    fn ring(&self, i: u16, height: f32) -> Point3 {
        let a = TAU / self.sides as f32 * i as f32;
        Point3::new(self.radius * a.cos(), height, self.radius * a.sin())
    }

    /// One quad per angular step, ordered around the circumference.
    ///
    /// Quad `i` spans angles `i` to `i + 1`; its left edge (`p1`, `p2`) is the
    /// right edge (`p4`, `p3`) of quad `i - 1`.
    pub fn quads(&self) -> Vec<Quad> {
        (0..self.sides)
            .map(|i| {
                Quad::new(
                    self.ring(i, self.bottom),
                    self.ring(i, self.top),
                    self.ring(i + 1, self.top),
                    self.ring(i + 1, self.bottom),
                )
            })
            .collect()
    }

    /// Numerizes the side quads pairwise.
    ///
    /// Quads `2k` and `2k + 1` contribute only their left edges (bottom, top,
    /// bottom, top), since each right edge is the next quad's left edge. Every
    /// pair uses the local pattern `[1, 0, 2, 3, 2, 3]` shifted by `4k`, which is
    /// `4 * pairs` vertices and `6 * pairs` indices. A trailing unpaired quad
    /// (odd `sides`) is not emitted.
    pub fn to_geometry(&self) -> Mesh {
        let quads = self.quads();
        let pairs = quads.len() / 2;

        let mut mesh = Mesh {
            vertices: Vec::with_capacity(pairs * 4),
            indices: Vec::with_capacity(pairs * 6),
        };

        for (k, pair) in quads.chunks_exact(2).enumerate() {
            let (even, odd) = (&pair[0], &pair[1]);
            mesh.vertices.extend([even.p1, even.p2, odd.p1, odd.p2]);

            let base = (k * 4) as u16;
            mesh.indices.extend(PAIR_PATTERN.iter().map(|i| i + base));
        }

        mesh
    }

    /// Closed side wall: one bottom and one top vertex per angle, every seam
    /// shared by its two neighbouring quads (`2 * sides` vertices, `6 * sides`
    /// indices, triangle list).
    pub fn to_surface(&self) -> Mesh {
        let n = self.sides;
        let vertices = (0..n)
            .flat_map(|i| [self.ring(i, self.bottom), self.ring(i, self.top)])
            .collect();
        let indices = (0..n)
            .flat_map(|i| {
                let j = (i + 1) % n;
                let (b0, t0, b1, t1) = (2 * i, 2 * i + 1, 2 * j, 2 * j + 1);
                [b0, t0, t1, b0, b1, t1]
            })
            .collect();
        Mesh { vertices, indices }
    }
}
