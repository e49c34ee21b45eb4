//! Pedagogical roles.
//!
//! ## Module Structure
//!
//! - `model` - Role enum, scores, assignments, statistics
//! - `template` - Prompt and keyword registry for the five roles
//! - `scorer` - Multi-factor unit/role suitability scoring
//! - `assigner` - Greedy and balanced assignment, role queue

pub mod assigner;
pub mod model;
pub mod scorer;
pub mod template;

pub use assigner::RoleAssigner;
pub use model::{AssignmentStatistics, PedagogicalRole, RoleAssignment, RoleScore};
pub use scorer::RoleScorer;
pub use template::{RoleLibrary, RoleTemplate};
