//! Geometry generators, one per primitive subtype.

pub mod box_shape;
pub mod cylinder;
pub mod nurbs;
pub mod plane;
pub mod polygon;
pub mod sphere;
pub mod triangle;

pub use box_shape::{BoxOptions, create_box};
pub use cylinder::{CylinderOptions, create_cylinder};
pub use nurbs::{NurbsSurface, create_nurbs};
pub use plane::{PlaneOptions, create_plane};
pub use polygon::{PolygonOptions, create_polygon};
pub use sphere::{SphereOptions, create_sphere};
pub use triangle::create_triangle;
