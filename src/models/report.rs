use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::QueryError;
use crate::models::Metric;

/// A (name, count) pair: node labels, relationship types, amenities, hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragePrice {
    pub property_type: String,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostPairSimilarity {
    pub host1: String,
    pub host2: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(i64),
    Counts(Vec<LabelCount>),
    AveragePrices(Vec<AveragePrice>),
    Listings(Vec<ListingLocation>),
    HostPairs(Vec<HostPairSimilarity>),
}

impl MetricValue {
    pub fn len(&self) -> usize {
        match self {
            MetricValue::Count(_) => 1,
            MetricValue::Counts(rows) => rows.len(),
            MetricValue::AveragePrices(rows) => rows.len(),
            MetricValue::Listings(rows) => rows.len(),
            MetricValue::HostPairs(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFailure {
    pub metric: Metric,
    pub kind: &'static str,
    pub query: String,
    pub error: String,
}

impl MetricFailure {
    pub fn new(metric: Metric, err: &QueryError) -> Self {
        Self {
            metric,
            kind: err.kind(),
            query: err.query().to_string(),
            error: err.to_string(),
        }
    }
}

/// Outcome of one reporting run. A metric is either present in `metrics`
/// or listed in `failures`, never both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    metrics: BTreeMap<Metric, MetricValue>,
    failures: Vec<MetricFailure>,
}

impl Report {
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (Metric, Result<MetricValue, QueryError>)>,
    {
        let mut report = Report::default();
        for (metric, outcome) in outcomes {
            match outcome {
                Ok(value) => {
                    report.metrics.insert(metric, value);
                }
                Err(err) => report.failures.push(MetricFailure::new(metric, &err)),
            }
        }
        report.failures.sort_by_key(|failure| failure.metric);
        report
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.metrics.get(&metric)
    }

    pub fn count(&self, metric: Metric) -> Option<i64> {
        match self.metrics.get(&metric)? {
            MetricValue::Count(count) => Some(*count),
            _ => None,
        }
    }

    pub fn counts(&self, metric: Metric) -> Option<&[LabelCount]> {
        match self.metrics.get(&metric)? {
            MetricValue::Counts(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn average_prices(&self) -> Option<&[AveragePrice]> {
        match self.metrics.get(&Metric::AveragePriceByPropertyType)? {
            MetricValue::AveragePrices(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn listings_near_reference(&self) -> Option<&[ListingLocation]> {
        match self.metrics.get(&Metric::ListingsNearReference)? {
            MetricValue::Listings(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn host_pairs(&self) -> Option<&[HostPairSimilarity]> {
        match self.metrics.get(&Metric::HostPairSimilarity)? {
            MetricValue::HostPairs(rows) => Some(rows),
            _ => None,
        }
    }

    /// Collected metrics, in `Metric` order.
    pub fn metric_names(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.keys().copied()
    }

    pub fn failures(&self) -> &[MetricFailure] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
