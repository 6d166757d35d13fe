use crate::core::{Pipeline, RunStats, Summary};
use crate::utils::error::Result;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: Summary,
    pub stats: RunStats,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting country timeline run");

        // Extract
        let events = self.pipeline.extract().await?;

        // Transform
        let timeline = self.pipeline.transform(events).await?;
        tracing::info!(
            "🔧 Resolved {} days ({} recorded observations, {} filled, {} future days trimmed)",
            timeline.days.len(),
            timeline.stats.observations_recorded,
            timeline.stats.days_filled,
            timeline.stats.future_days_trimmed
        );
        let summary = timeline.summary.clone();
        let stats = timeline.stats.clone();

        // Load
        let output_path = self.pipeline.load(timeline).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            summary,
            stats,
        })
    }
}
