//! Filter subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (path)
//!     → chain.rs (each filter whose PathSpec matches, in order)
//!         → true     : next filter
//!         → response : ShortCircuit(Some)
//!         → error    : error handler → ShortCircuit(Some)
//!         → other    : ShortCircuit(None)
//!     → Continue
//! ```

pub mod chain;

pub use chain::{ChainResult, Filter, FilterChain};
