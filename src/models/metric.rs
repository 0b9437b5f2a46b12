use serde::{Deserialize, Serialize};

/// Every statistic the reporter knows how to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalNodes,
    TotalRelationships,
    IsolatedNodes,
    NodesByLabel,
    RelationshipsByType,
    TopAmenities,
    AveragePriceByPropertyType,
    TopHosts,
    ListingsNearReference,
    HostPairSimilarity,
    TotalHosts,
    TotalListings,
    Superhosts,
    MaxListingsPerHost,
}

pub const TOP_AMENITIES_LIMIT: usize = 5;
pub const TOP_HOSTS_LIMIT: usize = 10;
pub const TOP_HOST_PAIRS_LIMIT: usize = 10;

impl Metric {
    /// The ten metrics of the graph statistics report.
    pub const STANDARD: [Metric; 10] = [
        Metric::TotalNodes,
        Metric::TotalRelationships,
        Metric::IsolatedNodes,
        Metric::NodesByLabel,
        Metric::RelationshipsByType,
        Metric::TopAmenities,
        Metric::AveragePriceByPropertyType,
        Metric::TopHosts,
        Metric::ListingsNearReference,
        Metric::HostPairSimilarity,
    ];

    /// Host and listing totals.
    pub const HOST_SUMMARY: [Metric; 4] = [
        Metric::TotalHosts,
        Metric::TotalListings,
        Metric::Superhosts,
        Metric::MaxListingsPerHost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::TotalNodes => "total_nodes",
            Metric::TotalRelationships => "total_relationships",
            Metric::IsolatedNodes => "isolated_nodes",
            Metric::NodesByLabel => "nodes_by_label",
            Metric::RelationshipsByType => "relationships_by_type",
            Metric::TopAmenities => "top_amenities",
            Metric::AveragePriceByPropertyType => "average_price_by_property_type",
            Metric::TopHosts => "top_hosts",
            Metric::ListingsNearReference => "listings_near_reference",
            Metric::HostPairSimilarity => "host_pair_similarity",
            Metric::TotalHosts => "total_hosts",
            Metric::TotalListings => "total_listings",
            Metric::Superhosts => "superhosts",
            Metric::MaxListingsPerHost => "max_listings_per_host",
        }
    }

    /// Maximum number of rows a metric may report, for top-K metrics.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Metric::TopAmenities => Some(TOP_AMENITIES_LIMIT),
            Metric::TopHosts => Some(TOP_HOSTS_LIMIT),
            Metric::HostPairSimilarity => Some(TOP_HOST_PAIRS_LIMIT),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Metric::TotalNodes
                | Metric::TotalRelationships
                | Metric::IsolatedNodes
                | Metric::TotalHosts
                | Metric::TotalListings
                | Metric::Superhosts
                | Metric::MaxListingsPerHost
        )
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
