pub mod base;
pub mod macros;
pub mod marker;
pub mod vector;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use marker::{Marker, MarkerKind};
pub use vector::{LineStyle, Polyline, SerializableColor};
