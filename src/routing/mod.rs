//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route compilation (at startup):
//!     route filenames
//!     → pattern.rs (segments + method suffix)
//!     → table.rs (duplicate checks, middleware ordering)
//!     → Freeze as immutable RouteTable
//!
//! Incoming request (method, path):
//!     → router.rs (priority matching, parameter binding)
//!     → Return: Matched, MethodMismatch, or NoMatch
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, immutable at runtime
//! - Deterministic: same table and request always match the same route
//! - Rebuilds replace the whole table atomically

pub mod pattern;
pub mod router;
pub mod table;

pub use pattern::{InvalidPattern, SegmentSpec};
pub use router::{resolve, MatchResult, CATCH_ALL_PARAM};
pub use table::{BuildError, RouteDescriptor, RouteTable, RouteTableBuilder, SharedRouteTable};
