pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{ClipperError, Result};
pub use math::{IntPoint, IntRect, Path, Paths, PointOrigin};
pub use operations::boolean::{ClipOptions, ClipType, Clipper, PolyFillType, PolyType};
pub use operations::offset::{ClipperOffset, EndType, JoinType, OffsetOptions};
pub use topology::{PolyNode, PolyNodeId, PolyTree};
