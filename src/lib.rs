mod client;
mod errors;
mod merge;
mod normalize;
mod paginate;
mod query;
mod resolve;
mod retry;
pub mod types;

pub use self::client::Client;
pub use self::errors::{Error, TransportError};
pub use self::merge::{merge, MergedRow};
pub use self::normalize::{normalize_item, normalize_page, NormalizedRecord};
pub use self::paginate::{LogProgress, Page, PageCursor, ProgressObserver};
pub use self::query::{BoundingBox, FetchSpec, DEFAULT_PAGE_LIMIT};
pub use self::resolve::{
    normalize_key, resolve, resolve_or_fallback, Candidate, FallbackPolicy, PreferenceList,
};
pub use self::retry::RetryPolicy;
