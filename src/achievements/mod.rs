//! Score-range achievements
//!
//! Each achievement covers an inclusive score range. Ranges may overlap; the
//! registry walks them in declaration order and the first locked match wins.

mod definitions;
mod registry;

pub use definitions::{default_definitions, AchievementDefinition, AchievementId};
pub use registry::{Achievement, AchievementRegistry};
