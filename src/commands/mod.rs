pub mod database;
pub mod report;
