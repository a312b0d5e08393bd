mod envelope;
pub use self::envelope::{CountResponse, ErrorBody, RowsetResponse};

mod metadata;
pub use self::metadata::{DatasetMetadata, FacetValuesResponse, FieldInfo};
