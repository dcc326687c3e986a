mod hit_testing;
mod transform;

pub use hit_testing::{
    bounds_of, distance_to_segment, point_in_polygon, polyline_distance, translate_points,
};
pub use transform::ViewTransform;
