//! In-memory registries shared between event handlers and timers.
//!
//! Each registry guards its map with a single lock and never holds it
//! across an `.await`.

pub mod grace_registry;
pub mod member_directory;
pub mod vote_registry;

pub use grace_registry::GraceRegistry;
pub use member_directory::{DEFAULT_REFRESH_INTERVAL, MemberDirectory};
pub use vote_registry::{CastResult, VoteRegistry};
