//! Graph search and property negotiation for blockflow block graphs.
//!
//! - [`search`]: bounded capability search with port scoping, active-only
//!   filtering, cycle avoidance and pass-through port correlation.
//! - [`negotiate`]: agreement on a single chain-wide property value across the
//!   blocks a search discovers.
//!
//! Both work on anything implementing [`blockflow_core::NodeGraph`] and only
//! ever borrow the graph immutably.

pub mod negotiate;
pub mod search;

pub use negotiate::{property_getter, NegotiationConfig, NegotiationError, Negotiator};
pub use search::{GraphSearch, SearchConfig, SearchError, SearchOutcome, SearchStatus};
