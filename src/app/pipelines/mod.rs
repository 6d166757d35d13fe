pub mod timeline_pipeline;
