pub mod frame;
pub mod located;
pub mod point;
pub mod rect;

pub use frame::FrameView;
pub use located::{Corners, LocatedCode};
pub use point::Point;
pub use rect::Rect;
