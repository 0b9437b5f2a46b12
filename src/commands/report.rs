use anyhow::Result;

use crate::analytics::{ReportOptions, StatisticsReporter};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::models::{Metric, MetricValue, Report};
use crate::neo4j::Neo4jSession;

#[derive(Debug, Clone, Copy)]
enum ReportKind {
    Statistics,
    HostSummary,
}

pub async fn handle_report(config: Config, format: OutputFormat) -> Result<()> {
    let report = collect(&config, ReportKind::Statistics).await?;
    render(&report, format)
}

pub async fn handle_hosts(config: Config, format: OutputFormat) -> Result<()> {
    let report = collect(&config, ReportKind::HostSummary).await?;
    render(&report, format)
}

/// Connection failures abort here; past a successful connect the session is
/// released whatever the metrics did.
async fn collect(config: &Config, kind: ReportKind) -> Result<Report> {
    let mut session = Neo4jSession::connect(config).await?;

    let reporter = StatisticsReporter::new(&session, ReportOptions::from_config(config));
    let report = match kind {
        ReportKind::Statistics => reporter.generate_report().await,
        ReportKind::HostSummary => reporter.generate_host_summary().await,
    };

    session.close();
    Ok(report)
}

fn render(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => print_table(report),
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} metric(s) failed: {}",
            report.failures().len(),
            report
                .failures()
                .iter()
                .map(|f| f.metric.name())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

fn print_table(report: &Report) {
    for metric in report.metric_names() {
        if let Some(count) = report.count(metric) {
            println!("{:<32} {}", title(metric), count);
            continue;
        }

        println!("\n{}:", title(metric));
        if report.get(metric).map_or(true, MetricValue::is_empty) {
            println!("  (none)");
            continue;
        }

        match metric {
            Metric::AveragePriceByPropertyType => {
                for row in report.average_prices().unwrap_or_default() {
                    println!("  {:<40} {:>10.2}", row.property_type, row.average_price);
                }
            }
            Metric::ListingsNearReference => {
                let rows = report.listings_near_reference().unwrap_or_default();
                println!("  {} found", rows.len());
                println!("  {:<40} {:>12} {:>12}", "Name", "Latitude", "Longitude");
                println!("  {}", "-".repeat(66));
                for row in rows {
                    println!(
                        "  {:<40} {:>12.6} {:>12.6}",
                        row.name, row.latitude, row.longitude
                    );
                }
            }
            Metric::HostPairSimilarity => {
                println!("  {:<30} {:<30} {:>8}", "Host", "Similar host", "Ratio");
                println!("  {}", "-".repeat(70));
                for row in report.host_pairs().unwrap_or_default() {
                    println!("  {:<30} {:<30} {:>8.3}", row.host1, row.host2, row.ratio);
                }
            }
            _ => {
                for row in report.counts(metric).unwrap_or_default() {
                    println!("  {:<40} {:>10}", row.label, row.count);
                }
            }
        }
    }

    if !report.is_complete() {
        println!("\nFailed metrics:");
        for failure in report.failures() {
            println!("  {} [{}]: {}", failure.metric, failure.kind, failure.error);
            println!("    query: {}", collapse_whitespace(&failure.query));
        }
    }
}

fn title(metric: Metric) -> &'static str {
    match metric {
        Metric::TotalNodes => "Total nodes",
        Metric::TotalRelationships => "Total relationships",
        Metric::IsolatedNodes => "Isolated nodes",
        Metric::NodesByLabel => "Nodes by label",
        Metric::RelationshipsByType => "Relationships by type",
        Metric::TopAmenities => "Top amenities by listings",
        Metric::AveragePriceByPropertyType => "Average price by property type",
        Metric::TopHosts => "Top hosts by listings",
        Metric::ListingsNearReference => "Listings near reference point",
        Metric::HostPairSimilarity => "Most similar host pairs",
        Metric::TotalHosts => "Total hosts",
        Metric::TotalListings => "Total listings",
        Metric::Superhosts => "Superhosts",
        Metric::MaxListingsPerHost => "Max listings by a single host",
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[test]
    fn test_render_fails_when_metrics_failed() {
        let report = Report::from_outcomes(vec![
            (Metric::TotalNodes, Ok(MetricValue::Count(1))),
            (
                Metric::TopHosts,
                Err(QueryError::Timeout {
                    query: "MATCH (h:Host) RETURN h".to_string(),
                    timeout: std::time::Duration::from_secs(1),
                }),
            ),
        ]);

        let err = render(&report, OutputFormat::Json).unwrap_err().to_string();
        assert!(err.contains("top_hosts"));
    }

    #[test]
    fn test_render_complete_report() {
        let report = Report::from_outcomes(vec![(Metric::TotalNodes, Ok(MetricValue::Count(0)))]);
        assert!(render(&report, OutputFormat::Table).is_ok());
    }

    #[test]
    fn test_table_renders_every_value_kind() {
        use crate::models::{AveragePrice, HostPairSimilarity, LabelCount, ListingLocation};

        let report = Report::from_outcomes(vec![
            (Metric::TotalNodes, Ok(MetricValue::Count(4))),
            (
                Metric::TopHosts,
                Ok(MetricValue::Counts(vec![LabelCount {
                    label: "Maya".to_string(),
                    count: 3,
                }])),
            ),
            (Metric::RelationshipsByType, Ok(MetricValue::Counts(Vec::new()))),
            (
                Metric::AveragePriceByPropertyType,
                Ok(MetricValue::AveragePrices(vec![AveragePrice {
                    property_type: "Loft".to_string(),
                    average_price: 120.0,
                }])),
            ),
            (
                Metric::ListingsNearReference,
                Ok(MetricValue::Listings(vec![ListingLocation {
                    name: "Soho loft".to_string(),
                    latitude: 40.72,
                    longitude: -74.0,
                }])),
            ),
            (
                Metric::HostPairSimilarity,
                Ok(MetricValue::HostPairs(vec![HostPairSimilarity {
                    host1: "Maya".to_string(),
                    host2: "Ravi".to_string(),
                    ratio: 0.5,
                }])),
            ),
        ]);

        assert!(render(&report, OutputFormat::Table).is_ok());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("MATCH (n)\n     RETURN n"),
            "MATCH (n) RETURN n"
        );
    }
}
