use crate::models::Metric;

/// How a declared output field is read from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    TextList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl OutputField {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryParam {
    Integer(i64),
    Float(f64),
}

/// An immutable, read-only query together with the fields it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub metric: Metric,
    pub text: &'static str,
    pub params: Vec<(&'static str, QueryParam)>,
    pub fields: &'static [OutputField],
}

impl MetricQuery {
    pub fn new(metric: Metric, text: &'static str, fields: &'static [OutputField]) -> Self {
        Self {
            metric,
            text,
            params: Vec::new(),
            fields,
        }
    }

    pub fn param(mut self, key: &'static str, value: QueryParam) -> Self {
        self.params.push((key, value));
        self
    }
}
