//! Parametric geometry for the **facet** rendering harness.
//!
//! Shapes are built from plain numeric parameters and *numerized* into a
//! [`Mesh`]: a vertex list plus `u16` indices ready for indexed drawing.
//! Nothing here touches a GPU, so meshes can be produced and checked anywhere.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`point`] | `Point3` |
//! | [`mesh`] | `Mesh`, `Topology` |
//! | [`shapes`] | `Triangle`, `Quad`, `Circle`, `Cylinder`, `Cuboid` |
//! | [`error`] | `GeometryError` |
//!
//! # Quick start
//!
//! ```rust
//! use facet_geometry::{Mesh, Point3, Topology};
//! use facet_geometry::shapes::{Circle, Quad};
//!
//! let quad = Quad::xy(Point3::zero(), 0.2, 0.2).as_triangles(0)?;
//! let ring = Circle::new(Point3::zero(), 0.5, 24).as_triangles(0)?;
//!
//! let scene = Mesh::merge([quad, ring])?;
//! assert!(scene.validate(Topology::Triangles).is_ok());
//! # Ok::<(), facet_geometry::GeometryError>(())
//! ```

pub mod error;
pub mod mesh;
pub mod point;
pub mod shapes;

pub use error::GeometryError;
pub use mesh::{Mesh, Topology};
pub use point::Point3;
