mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from fruitscan for tests
pub use fruitscan::{
    BoundingBox, Detection, FruitDetector, FruitFilter, Locale, Mask, Region, RipenessAssignment,
};
