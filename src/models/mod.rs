pub mod metric;
pub mod query;
pub mod report;
pub mod row;

pub use metric::*;
pub use query::*;
pub use report::*;
pub use row::*;
