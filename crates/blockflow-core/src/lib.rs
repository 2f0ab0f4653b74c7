pub mod capability;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod port;
pub mod property;
pub mod traits;

// Re-export commonly used types
pub use capability::{Capability, CapabilitySet};
pub use edge::{Connection, Link};
pub use error::CoreError;
pub use graph::BlockGraph;
pub use id::{BlockId, BlockRef, EdgeId};
pub use node::BlockNode;
pub use port::{Direction, Port};
pub use property::{PropertyTable, PropertyValue};
pub use traits::NodeGraph;
