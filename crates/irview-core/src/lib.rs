pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod names;
pub mod node;
pub mod props;
pub mod value;

// Re-export commonly used types
pub use edge::Edge;
pub use error::CoreError;
pub use graph::{Block, Graph, GraphSummary, Rank};
pub use id::{EdgeId, GraphIndex, NodeId};
pub use node::Node;
pub use props::{EdgeKind, NodeKind};
pub use value::{PropValue, Props};
