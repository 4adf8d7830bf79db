pub mod groups;
pub mod query;
pub mod scan;
pub mod serve;
