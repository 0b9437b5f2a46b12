use anyhow::Result;

use crate::config::Config;
use crate::neo4j::{close_session, Neo4jSession};

pub async fn handle_ping(config: Config) -> Result<()> {
    println!("Testing Neo4j connectivity at {}...", config.neo4j_uri);

    let mut session = Neo4jSession::connect(&config).await;
    let outcome = match &session {
        Ok(_) => {
            println!("Neo4j connection successful");
            Ok(())
        }
        Err(e) => {
            println!("Neo4j connection failed ({})", e.kind());
            Err(anyhow::anyhow!("{}", e))
        }
    };

    close_session(session.as_mut().ok());
    outcome
}
