pub mod anchors;
pub mod asset;
pub mod catalog;
pub mod classifier;
pub mod decision;
pub mod error;
pub mod filter;
#[cfg(feature = "runtime")]
pub mod immich;
pub mod interpolation;
pub mod pipeline;
pub mod resolver;

pub use anchors::{Anchor, BatchView, TimedAsset};
pub use asset::{Asset, Coordinates, ExifInfo};
pub use catalog::{AssetUpdate, Catalog, UserInfo};
pub use classifier::{BatchClassifier, BatchSummary, DispatchMode, Outcome, Tally, TrailingLog};
pub use decision::{decide, CoordinateSource, Decision, DecisionError, PendingUpdate, SkipReason};
pub use error::CatalogError;
pub use filter::{SearchFilter, TimeBound};
pub use interpolation::{interpolate, Interpolation, InterpolationMethod, Interpolations};
pub use pipeline::{classify_batch, fetch_batch, run, FetchedBatch, RunOptions, RunReport};
pub use resolver::TimezoneResolver;

#[cfg(feature = "runtime")]
pub use immich::{ImmichClient, ImmichConfig};
#[cfg(feature = "runtime")]
pub use resolver::PolygonResolver;
