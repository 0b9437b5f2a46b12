use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::similarity::{top_host_pairs, HostAmenities};
use super::QueryRunner;
use crate::config::Config;
use crate::error::QueryError;
use crate::models::{
    AveragePrice, LabelCount, ListingLocation, Metric, MetricQuery, MetricValue, Report,
    ResultRow,
};
use crate::neo4j::queries::{query_for, GeoReference};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub query_timeout: Duration,
    pub max_concurrent_queries: usize,
    pub reference: GeoReference,
}

impl ReportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            query_timeout: config.query_timeout(),
            max_concurrent_queries: config.max_concurrent_queries,
            reference: GeoReference {
                latitude: config.reference_latitude,
                longitude: config.reference_longitude,
                radius_meters: config.radius_meters,
            },
        }
    }
}

/// Runs the fixed battery of metric queries over one session.
pub struct StatisticsReporter<'a, R: QueryRunner + ?Sized> {
    runner: &'a R,
    options: ReportOptions,
}

impl<'a, R: QueryRunner + ?Sized> StatisticsReporter<'a, R> {
    pub fn new(runner: &'a R, options: ReportOptions) -> Self {
        Self { runner, options }
    }

    /// The ten-metric graph statistics report.
    pub async fn generate_report(&self) -> Report {
        self.generate(&Metric::STANDARD).await
    }

    pub async fn generate_host_summary(&self) -> Report {
        self.generate(&Metric::HOST_SUMMARY).await
    }

    /// Collects `metrics` concurrently. A failed metric is recorded in the
    /// report's failures and does not affect the others.
    pub async fn generate(&self, metrics: &[Metric]) -> Report {
        let workers = self.options.max_concurrent_queries.max(1);
        info!(metrics = metrics.len(), workers, "Collecting graph statistics");

        let outcomes: Vec<_> = stream::iter(metrics.iter().copied())
            .map(|metric| async move { (metric, self.collect(metric).await) })
            .buffer_unordered(workers)
            .collect()
            .await;

        let report = Report::from_outcomes(outcomes);
        info!(
            collected = report.metric_names().count(),
            failed = report.failures().len(),
            "Graph statistics collected"
        );
        report
    }

    pub async fn collect(&self, metric: Metric) -> Result<MetricValue, QueryError> {
        let query = query_for(metric, &self.options.reference);
        let rows = self.run(&query).await;

        match &rows {
            Ok(rows) => debug!(%metric, rows = rows.len(), "Metric query finished"),
            Err(e) => warn!(%metric, kind = e.kind(), error = %e, "Metric query failed"),
        }

        interpret(&query, rows?)
    }

    async fn run(&self, query: &MetricQuery) -> Result<Vec<ResultRow>, QueryError> {
        let timeout = self.options.query_timeout;
        match tokio::time::timeout(timeout, self.runner.run(query)).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout {
                query: query.text.to_string(),
                timeout,
            }),
        }
    }
}

/// Turns raw rows into the metric's typed value, enforcing its ordering and
/// row limit.
fn interpret(query: &MetricQuery, rows: Vec<ResultRow>) -> Result<MetricValue, QueryError> {
    let metric = query.metric;
    let field = |i: usize| query.fields[i].name;

    if metric.is_scalar() {
        return match first_scalar(query, &rows, field(0)) {
            Ok(count) => Ok(MetricValue::Count(count)),
            // An aggregate over nothing: a count of zero.
            Err(QueryError::EmptyResultUnexpected { .. }) => Ok(MetricValue::Count(0)),
            Err(e) => Err(e),
        };
    }

    let value = match metric {
        Metric::NodesByLabel | Metric::RelationshipsByType => {
            MetricValue::Counts(label_counts(query, &rows, field(0), field(1))?)
        }
        Metric::TopAmenities | Metric::TopHosts => {
            let mut counts = label_counts(query, &rows, field(0), field(1))?;
            counts.sort_by(|a, b| b.count.cmp(&a.count));
            counts.truncate(metric.limit().unwrap_or(usize::MAX));
            MetricValue::Counts(counts)
        }
        Metric::AveragePriceByPropertyType => {
            let mut prices = rows
                .iter()
                .map(|row| {
                    Ok(AveragePrice {
                        property_type: text_or_unknown(row, field(0)),
                        average_price: require_f64(query, row, field(1))?,
                    })
                })
                .collect::<Result<Vec<_>, QueryError>>()?;
            prices.sort_by(|a, b| b.average_price.total_cmp(&a.average_price));
            MetricValue::AveragePrices(prices)
        }
        Metric::ListingsNearReference => MetricValue::Listings(
            rows.iter()
                .map(|row| {
                    Ok(ListingLocation {
                        name: text_or_unknown(row, field(0)),
                        latitude: require_f64(query, row, field(1))?,
                        longitude: require_f64(query, row, field(2))?,
                    })
                })
                .collect::<Result<Vec<_>, QueryError>>()?,
        ),
        Metric::HostPairSimilarity => {
            let hosts = rows
                .iter()
                .map(|row| {
                    let key = row.get_str(field(0)).ok_or_else(|| {
                        unexpected(query, format!("'{}' is not a string", field(0)))
                    })?;
                    let amenities = row.get_str_list(field(2)).ok_or_else(|| {
                        unexpected(query, format!("'{}' is not a list of strings", field(2)))
                    })?;
                    Ok(HostAmenities::new(key, &text_or_unknown(row, field(1)), amenities))
                })
                .collect::<Result<Vec<_>, QueryError>>()?;
            MetricValue::HostPairs(top_host_pairs(
                &hosts,
                metric.limit().unwrap_or(usize::MAX),
            ))
        }
        _ => return Err(unexpected(query, format!("no interpretation for {}", metric))),
    };

    Ok(value)
}

/// The integer in the first row. Zero rows is reported as
/// `EmptyResultUnexpected` for the caller to resolve.
fn first_scalar(query: &MetricQuery, rows: &[ResultRow], field: &str) -> Result<i64, QueryError> {
    let row = rows.first().ok_or_else(|| QueryError::EmptyResultUnexpected {
        query: query.text.to_string(),
    })?;
    row.get_i64(field)
        .ok_or_else(|| unexpected(query, format!("'{}' is not an integer", field)))
}

fn label_counts(
    query: &MetricQuery,
    rows: &[ResultRow],
    label_field: &str,
    count_field: &str,
) -> Result<Vec<LabelCount>, QueryError> {
    rows.iter()
        .map(|row| {
            let count = row
                .get_i64(count_field)
                .ok_or_else(|| unexpected(query, format!("'{}' is not an integer", count_field)))?;
            Ok(LabelCount {
                label: text_or_unknown(row, label_field),
                count,
            })
        })
        .collect()
}

fn require_f64(query: &MetricQuery, row: &ResultRow, field: &str) -> Result<f64, QueryError> {
    row.get_f64(field)
        .ok_or_else(|| unexpected(query, format!("'{}' is not a number", field)))
}

fn text_or_unknown(row: &ResultRow, field: &str) -> String {
    row.get_str(field).unwrap_or("(none)").to_string()
}

fn unexpected(query: &MetricQuery, detail: String) -> QueryError {
    QueryError::UnexpectedShape {
        query: query.text.to_string(),
        detail,
    }
}
