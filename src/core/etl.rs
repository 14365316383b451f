use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct SnapshotEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SnapshotEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting snapshot run");

        // Extract
        let records = self.pipeline.extract().await?;
        let available = records
            .iter()
            .filter(|r| r.row.observation.is_available())
            .count();
        tracing::info!("Fetched {} metrics ({} available)", records.len(), available);
        if available < records.len() {
            tracing::warn!(
                "{} metrics degraded to N/A",
                records.len() - available
            );
        }

        // Transform
        let snapshot = self.pipeline.transform(records).await?;
        tracing::debug!("Snapshot stamped {}", snapshot.last_updated);

        // Load
        let output_path = self.pipeline.load(snapshot).await?;
        tracing::info!("Snapshot saved to {} in {:?}", output_path, started.elapsed());

        Ok(output_path)
    }
}
