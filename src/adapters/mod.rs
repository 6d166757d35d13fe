// Adapters layer: concrete implementations for external formats (export JSON, boundary GeoJSON).

pub mod boundaries;
pub mod timeline_json;

pub use boundaries::BoundaryIndex;
pub use timeline_json::decode_timeline;
