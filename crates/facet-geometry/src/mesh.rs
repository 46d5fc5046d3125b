use crate::{GeometryError, Point3};

/// Primitive topology a mesh's index list is meant to be drawn with.
///
/// There is no separate line-loop or triangle-fan mode: closed outlines carry an
/// explicit closing index and are drawn as [`Topology::LineStrip`], fans are
/// expanded to [`Topology::Triangles`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl Topology {
    /// Returns `true` if `count` indices form whole primitives under this topology.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Topology::Points => true,
            Topology::Lines => count % 2 == 0,
            Topology::LineStrip => count != 1,
            Topology::Triangles => count % 3 == 0,
            Topology::TriangleStrip => count == 0 || count >= 3,
        }
    }
}

/// Numerized geometry: vertices plus 0-based `u16` indices into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub indices: Vec<u16>,
}

impl Mesh {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_parts(vertices: Vec<Point3>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a mesh from a local index pattern shifted by `offset`.
    ///
    /// Fails with `IndexOverflow` when a shifted index no longer fits in `u16`.
    pub(crate) fn indexed(
        vertices: Vec<Point3>,
        local: impl IntoIterator<Item = u16>,
        offset: u16,
    ) -> Result<Self, GeometryError> {
        let indices = local
            .into_iter()
            .map(|i| {
                i.checked_add(offset).ok_or(GeometryError::IndexOverflow {
                    required: i as usize + offset as usize,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { vertices, indices })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Appends `other`, shifting its indices by the current vertex count.
    ///
    /// On error `self` is left unchanged.
    pub fn append(&mut self, other: Mesh) -> Result<(), GeometryError> {
        if other.is_empty() {
            return Ok(());
        }
        let base = self.vertices.len();

        let highest = other
            .indices
            .iter()
            .map(|&i| base + i as usize)
            .max()
            .unwrap_or(0)
            .max((base + other.vertices.len()).saturating_sub(1));
        let base = u16::try_from(base)
            .map_err(|_| GeometryError::IndexOverflow { required: base })?;
        if highest > u16::MAX as usize {
            return Err(GeometryError::IndexOverflow { required: highest });
        }

        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
        Ok(())
    }

    /// Concatenates meshes in order into a single mesh.
    pub fn merge<I>(meshes: I) -> Result<Mesh, GeometryError>
    where
        I: IntoIterator<Item = Mesh>,
    {
        meshes.into_iter().try_fold(Mesh::new(), |mut acc, m| {
            acc.append(m)?;
            Ok(acc)
        })
    }

    /// Returns vertex positions as a contiguous `[x, y, z, x, y, z, ...]` list.
    pub fn flatten(&self) -> Vec<f32> {
        bytemuck::cast_slice::<Point3, f32>(&self.vertices).to_vec()
    }

    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Checks index bounds and that the index count fits `topology`.
    pub fn validate(&self, topology: Topology) -> Result<(), GeometryError> {
        let vertices = self.vertices.len();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertices)
        {
            return Err(GeometryError::IndexOutOfBounds { index, position, vertices });
        }
        if !topology.accepts(self.indices.len()) {
            return Err(GeometryError::TopologyMismatch { topology, count: self.indices.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32) -> Point3 {
        Point3::new(x, 0.0, 0.0)
    }

    // ── append ────────────────────────────────────────────────────────────

    #[test]
    fn append_shifts_by_vertex_count() {
        let mut a = Mesh::from_parts(vec![p(0.0), p(1.0), p(2.0)], vec![0, 1, 2]);
        let b = Mesh::from_parts(vec![p(3.0), p(4.0), p(5.0)], vec![0, 2, 1]);
        a.append(b).unwrap();
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 5, 4]);
    }

    #[test]
    fn append_to_empty_is_identity() {
        let b = Mesh::from_parts(vec![p(0.0), p(1.0)], vec![1, 0]);
        let mut a = Mesh::new();
        a.append(b.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn append_overflow_leaves_mesh_untouched() {
        let mut a = Mesh::from_parts(vec![Point3::zero(); u16::MAX as usize], vec![]);
        let b = Mesh::from_parts(vec![p(1.0), p(2.0)], vec![0, 1]);
        let err = a.append(b).unwrap_err();
        assert!(matches!(err, GeometryError::IndexOverflow { .. }));
        assert_eq!(a.vertex_count(), u16::MAX as usize);
        assert!(a.indices.is_empty());
    }

    #[test]
    fn appending_nothing_to_a_full_mesh_succeeds() {
        let mut full = Mesh::from_parts(vec![Point3::zero(); u16::MAX as usize + 1], Vec::new());
        assert_eq!(full.append(Mesh::new()), Ok(()));
        assert_eq!(full.vertex_count(), 65536);

        let err = full.append(Mesh::from_parts(vec![p(1.0)], Vec::new()));
        assert!(matches!(err, Err(GeometryError::IndexOverflow { .. })));
    }

    // ── indexed ───────────────────────────────────────────────────────────

    #[test]
    fn indexed_reports_first_overflowing_index() {
        let m = Mesh::indexed(vec![p(0.0); 3], [0, 1, 2], u16::MAX - 2).unwrap();
        assert_eq!(m.indices, vec![65533, 65534, 65535]);

        let err = Mesh::indexed(vec![p(0.0); 3], [0, 1, 2], u16::MAX - 1).unwrap_err();
        assert_eq!(err, GeometryError::IndexOverflow { required: 65536 });
    }

    #[test]
    fn merge_folds_in_order() {
        let tri = || Mesh::from_parts(vec![p(0.0), p(1.0), p(2.0)], vec![0, 1, 2]);
        let m = Mesh::merge([tri(), tri(), tri()]).unwrap();
        assert_eq!(m.vertex_count(), 9);
        assert_eq!(m.indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    // ── flatten ───────────────────────────────────────────────────────────

    #[test]
    fn flatten_is_xyz_interleaved() {
        let m = Mesh::from_parts(vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)], vec![]);
        assert_eq!(m.flatten(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.vertex_bytes().len(), 24);
    }

    // ── validate ──────────────────────────────────────────────────────────

    #[test]
    fn validate_rejects_out_of_bounds_index() {
        let m = Mesh::from_parts(vec![p(0.0), p(1.0), p(2.0)], vec![0, 1, 3]);
        assert_eq!(
            m.validate(Topology::Triangles),
            Err(GeometryError::IndexOutOfBounds { index: 3, position: 2, vertices: 3 })
        );
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let m = Mesh::from_parts(vec![p(0.0), p(1.0), p(2.0)], vec![0, 1]);
        assert!(matches!(
            m.validate(Topology::Triangles),
            Err(GeometryError::TopologyMismatch { count: 2, .. })
        ));
        assert!(m.validate(Topology::Lines).is_ok());
    }

    #[test]
    fn topology_accepts_counts() {
        assert!(Topology::LineStrip.accepts(0));
        assert!(!Topology::LineStrip.accepts(1));
        assert!(Topology::TriangleStrip.accepts(4));
        assert!(!Topology::TriangleStrip.accepts(2));
        assert!(!Topology::Lines.accepts(3));
    }
}
