//! Resolver Facades
//!
//! Purpose-specific wrappers around the `GraphWalker`, one per consumer
//! concern:
//!
//! - `CommunityResolver` - Community / Space of content (authorization, notifications)
//! - `StorageAggregatorResolver` - Quota boundary of content
//! - `StorageBucketResolver` - Concrete upload bucket
//! - `TimelineResolver` - Calendar and event containment
//! - `ContributionResolver` - Callout / contribution of a post
//! - `LicenseResolver` - Governing license and entitlements
//!
//! Each facade fixes the target kind, wraps walker failures with its own
//! context and, where asked, loads the resolved aggregate with one eager
//! fetch.

pub mod community_resolver;
pub mod contribution_resolver;
pub mod error;
pub mod license_resolver;
mod load;
pub mod storage_aggregator_resolver;
pub mod storage_bucket_resolver;
pub mod timeline_resolver;

pub use community_resolver::{CommunityResolver, COMMUNITY_JOINS};
pub use contribution_resolver::ContributionResolver;
pub use error::ResolverError;
pub use license_resolver::{LicenseResolver, LICENSE_JOINS};
pub use storage_aggregator_resolver::{AggregatorResolution, StorageAggregatorResolver};
pub use storage_bucket_resolver::StorageBucketResolver;
pub use timeline_resolver::TimelineResolver;
