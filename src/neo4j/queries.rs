use crate::models::{
    FieldKind, Metric, MetricQuery, OutputField, QueryParam, TOP_AMENITIES_LIMIT, TOP_HOSTS_LIMIT,
};

/// Centre and radius of the proximity metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoReference {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

const TOTAL_NODES: &str = "MATCH (n) RETURN count(n) AS total_nodes";

// Directed pattern so each stored relationship is counted once.
const TOTAL_RELATIONSHIPS: &str = "MATCH ()-[r]->() RETURN count(r) AS total_relationships";

const ISOLATED_NODES: &str = "MATCH (n) WHERE NOT (n)--() RETURN count(n) AS isolated_nodes";

const NODES_BY_LABEL: &str = "MATCH (n) RETURN labels(n)[0] AS label, count(n) AS count";

const RELATIONSHIPS_BY_TYPE: &str = "MATCH ()-[r]->() RETURN type(r) AS type, count(r) AS count";

const TOP_AMENITIES: &str = "MATCH (l:Listing)-[:HAS_AMENITY]->(a:Amenity)
     RETURN a.name AS amenity, count(DISTINCT l) AS listing_count
     ORDER BY listing_count DESC
     LIMIT $limit";

const AVERAGE_PRICE_BY_PROPERTY_TYPE: &str = "MATCH (l:Listing)
     WHERE l.price IS NOT NULL
     RETURN l.property_type AS property_type, avg(toFloat(l.price)) AS average_price
     ORDER BY average_price DESC";

// Grouped on the node: host names are not unique.
const TOP_HOSTS: &str = "MATCH (h:Host)-[:HOSTS]->(l:Listing)
     WITH h, count(l) AS listing_count
     RETURN coalesce(h.host_name, toString(h.host_id)) AS host, listing_count
     ORDER BY listing_count DESC
     LIMIT $limit";

const LISTINGS_NEAR_REFERENCE: &str = "MATCH (l:Listing)
     WHERE l.latitude IS NOT NULL AND l.longitude IS NOT NULL
       AND point.distance(
             point({latitude: toFloat(l.latitude), longitude: toFloat(l.longitude)}),
             point({latitude: $latitude, longitude: $longitude})) <= $radius
     RETURN l.name AS name, toFloat(l.latitude) AS latitude, toFloat(l.longitude) AS longitude";

// Hosts without amenities come back with an empty list.
const HOST_AMENITY_SETS: &str = "MATCH (h:Host)
     OPTIONAL MATCH (h)-[:HOSTS]->(:Listing)-[:HAS_AMENITY]->(a:Amenity)
     WITH h, collect(DISTINCT a.name) AS amenities
     RETURN elementId(h) AS host_key, coalesce(h.host_name, toString(h.host_id)) AS host, amenities";

const TOTAL_HOSTS: &str = "MATCH (h:Host) RETURN count(h) AS total_hosts";

const TOTAL_LISTINGS: &str = "MATCH (l:Listing) RETURN count(l) AS total_listings";

const SUPERHOSTS: &str =
    "MATCH (h:Host) WHERE h.host_is_superhost = true RETURN count(h) AS superhosts";

const MAX_LISTINGS_PER_HOST: &str = "MATCH (h:Host)-[:HOSTS]->(l:Listing)
     WITH h, count(l) AS listing_count
     RETURN listing_count
     ORDER BY listing_count DESC
     LIMIT 1";

const TOTAL_NODES_FIELDS: &[OutputField] = &[OutputField::new("total_nodes", FieldKind::Integer)];
const TOTAL_RELATIONSHIPS_FIELDS: &[OutputField] =
    &[OutputField::new("total_relationships", FieldKind::Integer)];
const ISOLATED_NODES_FIELDS: &[OutputField] =
    &[OutputField::new("isolated_nodes", FieldKind::Integer)];
const LABEL_COUNT_FIELDS: &[OutputField] = &[
    OutputField::new("label", FieldKind::Text),
    OutputField::new("count", FieldKind::Integer),
];
const TYPE_COUNT_FIELDS: &[OutputField] = &[
    OutputField::new("type", FieldKind::Text),
    OutputField::new("count", FieldKind::Integer),
];
const AMENITY_FIELDS: &[OutputField] = &[
    OutputField::new("amenity", FieldKind::Text),
    OutputField::new("listing_count", FieldKind::Integer),
];
const PRICE_FIELDS: &[OutputField] = &[
    OutputField::new("property_type", FieldKind::Text),
    OutputField::new("average_price", FieldKind::Float),
];
const HOST_FIELDS: &[OutputField] = &[
    OutputField::new("host", FieldKind::Text),
    OutputField::new("listing_count", FieldKind::Integer),
];
const LOCATION_FIELDS: &[OutputField] = &[
    OutputField::new("name", FieldKind::Text),
    OutputField::new("latitude", FieldKind::Float),
    OutputField::new("longitude", FieldKind::Float),
];
const AMENITY_SET_FIELDS: &[OutputField] = &[
    OutputField::new("host_key", FieldKind::Text),
    OutputField::new("host", FieldKind::Text),
    OutputField::new("amenities", FieldKind::TextList),
];
const TOTAL_HOSTS_FIELDS: &[OutputField] = &[OutputField::new("total_hosts", FieldKind::Integer)];
const TOTAL_LISTINGS_FIELDS: &[OutputField] =
    &[OutputField::new("total_listings", FieldKind::Integer)];
const SUPERHOSTS_FIELDS: &[OutputField] = &[OutputField::new("superhosts", FieldKind::Integer)];
const MAX_LISTINGS_FIELDS: &[OutputField] =
    &[OutputField::new("listing_count", FieldKind::Integer)];

/// Builds the read-only query backing `metric`.
pub fn query_for(metric: Metric, reference: &GeoReference) -> MetricQuery {
    match metric {
        Metric::TotalNodes => MetricQuery::new(metric, TOTAL_NODES, TOTAL_NODES_FIELDS),
        Metric::TotalRelationships => {
            MetricQuery::new(metric, TOTAL_RELATIONSHIPS, TOTAL_RELATIONSHIPS_FIELDS)
        }
        Metric::IsolatedNodes => MetricQuery::new(metric, ISOLATED_NODES, ISOLATED_NODES_FIELDS),
        Metric::NodesByLabel => MetricQuery::new(metric, NODES_BY_LABEL, LABEL_COUNT_FIELDS),
        Metric::RelationshipsByType => {
            MetricQuery::new(metric, RELATIONSHIPS_BY_TYPE, TYPE_COUNT_FIELDS)
        }
        Metric::TopAmenities => MetricQuery::new(metric, TOP_AMENITIES, AMENITY_FIELDS)
            .param("limit", QueryParam::Integer(TOP_AMENITIES_LIMIT as i64)),
        Metric::AveragePriceByPropertyType => {
            MetricQuery::new(metric, AVERAGE_PRICE_BY_PROPERTY_TYPE, PRICE_FIELDS)
        }
        Metric::TopHosts => MetricQuery::new(metric, TOP_HOSTS, HOST_FIELDS)
            .param("limit", QueryParam::Integer(TOP_HOSTS_LIMIT as i64)),
        Metric::ListingsNearReference => {
            MetricQuery::new(metric, LISTINGS_NEAR_REFERENCE, LOCATION_FIELDS)
                .param("latitude", QueryParam::Float(reference.latitude))
                .param("longitude", QueryParam::Float(reference.longitude))
                .param("radius", QueryParam::Float(reference.radius_meters))
        }
        Metric::HostPairSimilarity => {
            MetricQuery::new(metric, HOST_AMENITY_SETS, AMENITY_SET_FIELDS)
        }
        Metric::TotalHosts => MetricQuery::new(metric, TOTAL_HOSTS, TOTAL_HOSTS_FIELDS),
        Metric::TotalListings => MetricQuery::new(metric, TOTAL_LISTINGS, TOTAL_LISTINGS_FIELDS),
        Metric::Superhosts => MetricQuery::new(metric, SUPERHOSTS, SUPERHOSTS_FIELDS),
        Metric::MaxListingsPerHost => {
            MetricQuery::new(metric, MAX_LISTINGS_PER_HOST, MAX_LISTINGS_FIELDS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> GeoReference {
        GeoReference {
            latitude: 52.37,
            longitude: 4.89,
            radius_meters: 500.0,
        }
    }

    #[test]
    fn test_every_metric_has_a_read_only_query() {
        for metric in Metric::STANDARD.iter().chain(Metric::HOST_SUMMARY.iter()) {
            let query = query_for(*metric, &reference());
            assert_eq!(query.metric, *metric);
            assert!(query.text.trim_start().starts_with("MATCH"));
            for keyword in ["CREATE", "MERGE", "DELETE", "SET ", "REMOVE"] {
                assert!(!query.text.contains(keyword), "{metric} contains {keyword}");
            }
            assert!(!query.fields.is_empty());
        }
    }

    #[test]
    fn test_declared_fields_are_returned() {
        for metric in Metric::STANDARD.iter().chain(Metric::HOST_SUMMARY.iter()) {
            let query = query_for(*metric, &reference());
            for field in query.fields {
                assert!(
                    query.text.contains(&format!("AS {}", field.name)),
                    "{metric} does not return {}",
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_top_k_queries_are_ordered_and_limited() {
        for metric in [Metric::TopAmenities, Metric::TopHosts] {
            let query = query_for(metric, &reference());
            assert!(query.text.contains("DESC"));
            assert_eq!(
                query.params,
                vec![("limit", QueryParam::Integer(metric.limit().unwrap() as i64))]
            );
        }
    }

    #[test]
    fn test_host_metrics_group_on_the_node() {
        for metric in [Metric::TopHosts, Metric::HostPairSimilarity, Metric::MaxListingsPerHost] {
            let query = query_for(metric, &reference());
            assert!(query.text.contains("WITH h,"), "{metric} does not group on the host node");
        }
        let similarity = query_for(Metric::HostPairSimilarity, &reference());
        assert!(similarity.text.contains("OPTIONAL MATCH"));
        assert_eq!(similarity.fields[0].name, "host_key");
    }

    #[test]
    fn test_proximity_query_uses_reference() {
        let query = query_for(Metric::ListingsNearReference, &reference());
        assert_eq!(
            query.params,
            vec![
                ("latitude", QueryParam::Float(52.37)),
                ("longitude", QueryParam::Float(4.89)),
                ("radius", QueryParam::Float(500.0)),
            ]
        );
    }
}
