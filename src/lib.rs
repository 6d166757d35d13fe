pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{decode_timeline, BoundaryIndex};
pub use config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::TimelinePipeline,
};
pub use domain::model::{CustomRegion, DaySlot, LatLng, Summary, UNKNOWN_COUNTRY};
pub use utils::error::{Result, TimelineError};
