pub mod connection;
pub mod queries;

pub use connection::{close_session, Neo4jSession};
