use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Row};
use serde_json::Value;
use tracing::{debug, info};

use crate::analytics::QueryRunner;
use crate::config::Config;
use crate::error::{ConnectionError, QueryError};
use crate::models::{FieldKind, MetricQuery, OutputField, QueryParam, ResultRow};

/// An authenticated handle to the graph store, owned by one reporting run.
///
/// The driver's `Graph` is a connection pool, so concurrent queries run on
/// separate pooled connections behind the same credentials.
pub struct Neo4jSession {
    graph: Option<Graph>,
    uri: String,
}

impl Neo4jSession {
    /// Opens the pool and proves it with a round trip, so bad credentials or a
    /// stopped server surface here rather than on the first metric.
    pub async fn connect(config: &Config) -> Result<Self, ConnectionError> {
        let attempt = tokio::time::timeout(config.connect_timeout(), Self::open(config)).await;

        match attempt {
            Ok(Ok(graph)) => {
                info!(uri = %config.neo4j_uri, "Connected to graph database");
                Ok(Self {
                    graph: Some(graph),
                    uri: config.neo4j_uri.clone(),
                })
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ConnectionError::ServiceUnreachable {
                uri: config.neo4j_uri.clone(),
                detail: format!("no response within {:?}", config.connect_timeout()),
            }),
        }
    }

    async fn open(config: &Config) -> Result<Graph, ConnectionError> {
        let mut config_builder = ConfigBuilder::default()
            .uri(&config.neo4j_uri)
            .user(&config.neo4j_user)
            .password(&config.neo4j_password)
            .max_connections(config.max_concurrent_queries.max(1));

        if let Some(ref db_name) = config.neo4j_database {
            config_builder = config_builder.db(db_name.as_str());
        }

        let neo4j_config = config_builder.build().map_err(|e| {
            ConnectionError::UnknownFailure(format!("invalid driver configuration: {}", e))
        })?;

        let classify = |e: neo4rs::Error| {
            ConnectionError::classify(&e, &config.neo4j_uri, &config.neo4j_user)
        };

        let graph = Graph::connect(neo4j_config).await.map_err(classify)?;

        debug!("Verifying connectivity");
        let mut result = graph
            .execute(Query::new("RETURN 1 AS ok".to_string()))
            .await
            .map_err(classify)?;
        while result.next().await.map_err(classify)?.is_some() {}

        Ok(graph)
    }

    /// Releases the pool. Safe to call more than once.
    pub fn close(&mut self) {
        if self.graph.take().is_some() {
            info!(uri = %self.uri, "Closed graph database session");
        }
    }
}

impl Drop for Neo4jSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Releases a session that may never have been opened.
pub fn close_session(session: Option<&mut Neo4jSession>) {
    if let Some(session) = session {
        session.close();
    }
}

#[async_trait]
impl QueryRunner for Neo4jSession {
    async fn run(&self, query: &MetricQuery) -> Result<Vec<ResultRow>, QueryError> {
        let graph = self.graph.as_ref().ok_or_else(|| QueryError::SessionClosed {
            query: query.text.to_string(),
        })?;

        let failed = |e: neo4rs::Error| QueryError::ExecutionFailed {
            query: query.text.to_string(),
            detail: e.to_string(),
        };

        let mut result = graph.execute(build_query(query)).await.map_err(failed)?;
        let mut rows = Vec::new();

        while let Some(row) = result.next().await.map_err(failed)? {
            rows.push(convert_row(&row, query.fields));
        }

        Ok(rows)
    }
}

fn build_query(query: &MetricQuery) -> Query {
    let mut cypher = Query::new(query.text.to_string());
    for (key, value) in &query.params {
        cypher = match *value {
            QueryParam::Integer(i) => cypher.param(key, i),
            QueryParam::Float(f) => cypher.param(key, f),
        };
    }
    cypher
}

/// Reads the declared fields; anything null or of another type becomes `Null`.
fn convert_row(row: &Row, fields: &[OutputField]) -> ResultRow {
    let mut converted = ResultRow::new();

    for field in fields {
        let value = match field.kind {
            FieldKind::Integer => row.get::<i64>(field.name).ok().map(Value::from),
            FieldKind::Float => row
                .get::<f64>(field.name)
                .ok()
                .or_else(|| row.get::<i64>(field.name).ok().map(|i| i as f64))
                .map(Value::from),
            FieldKind::Text => row.get::<String>(field.name).ok().map(Value::from),
            FieldKind::TextList => row.get::<Vec<String>>(field.name).ok().map(Value::from),
        };
        converted = converted.with(field.name, value.unwrap_or(Value::Null));
    }

    converted
}
