pub use crate::app::pipelines::timeline_pipeline::{
    render_days_csv, render_days_json, resolve_days, TimelinePipeline,
};
