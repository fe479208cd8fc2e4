mod geometry;
mod io;

pub use geometry::{check_bounds, check_ring, power_of_two_bounds, quadrants, rect_to_polygon, rect_to_ring};
pub use io::{parse_polygons, read_polygons};
