//! Parametric primitives. Each shape numerizes itself into a [`Mesh`](crate::Mesh).

mod circle;
mod cuboid;
mod cylinder;
mod quad;
mod triangle;

pub use circle::Circle;
pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use quad::{Quad, QuadTopology};
pub use triangle::Triangle;
