pub mod reporter;
pub mod similarity;

pub use reporter::{ReportOptions, StatisticsReporter};

use async_trait::async_trait;

use crate::error::QueryError;
use crate::models::{MetricQuery, ResultRow};

/// Executes one read-only query and returns its rows in store order.
/// Zero rows is a valid answer.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, query: &MetricQuery) -> Result<Vec<ResultRow>, QueryError>;
}
