mod bbox;
mod feature;
mod geojson;
mod geometry;

pub use feature::Feature;
pub use geometry::GeometrySource;
