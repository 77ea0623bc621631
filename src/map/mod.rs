//! Map module - projection, paint rules, data source and the viewport widget

pub mod color;
pub mod projection;
pub mod source;
pub mod tooltip;
pub mod view;

pub use source::BoundarySource;
pub use view::MapView;
