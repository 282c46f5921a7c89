pub mod client;
pub mod config;
pub mod crud;
pub mod error;
pub mod model;
pub mod session;

pub use config::Config;
pub use error::{GraphlensError, Result};
pub use model::{GraphAction, GraphEdge, GraphNode, NodeLabel, SessionState};
