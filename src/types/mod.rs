//! Public types for the nominatim-cli API.

mod format;
mod query;
mod request;
mod response;

pub use format::OutputFormat;
pub use query::{
    CommonOptions, LookupQuery, MAX_LOOKUP_IDS, MAX_SEARCH_LIMIT, MAX_ZOOM, ReverseQuery,
    SearchQuery, StatusQuery, StructuredQuery,
};
pub use request::RequestDescriptor;
pub use response::Response;
