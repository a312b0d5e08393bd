mod spec;
pub use self::spec::{BoundingBox, FetchSpec, DEFAULT_PAGE_LIMIT};
