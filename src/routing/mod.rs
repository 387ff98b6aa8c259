//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (configuration time):
//!     RouteSpec + Handler
//!     → route.rs (validate, normalise methods)
//!     → template.rs (compile pattern)
//!     → registry.rs (append to snapshot)
//!
//! Incoming Request (method, path)
//!     → registry.rs (ordered scan)
//!     → template.rs / route.rs (path and method predicates)
//!     → Return: first accepting Route, or nothing
//! ```
//!
//! # Design Decisions
//! - Templates compiled once at registration, immutable afterwards
//! - First match wins, in registration order
//! - Deterministic: same table and input always select the same route
//! - Lookups are lock-free against an append-only snapshot

pub mod matcher;
pub mod registry;
pub mod route;
pub mod template;

pub use matcher::{Matcher, PathSpec};
pub use registry::RouteRegistry;
pub use route::{MethodSet, Route, RouteSpec};
pub use template::{PathParams, PathTemplate, Segment};
