pub mod aggregation;
pub mod periods;

pub use aggregation::{aggregate_by_period, AuthorBuckets, PeriodBuckets};
pub use periods::Granularity;
