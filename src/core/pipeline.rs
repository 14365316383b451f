use crate::domain::model::{MetricRecord, MetricRow, Section, Snapshot};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::sources::SourceClient;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::validation::parse_utc_offset;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Write;

pub struct SnapshotPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    sources: SourceClient,
}

impl<S: Storage, C: ConfigProvider> SnapshotPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let sources = SourceClient::new(config.http(), config.endpoints(), config.credentials())?;
        Ok(Self {
            storage,
            config,
            sources,
        })
    }

    fn timestamp(&self) -> Result<String> {
        let report = self.config.report();
        let offset = parse_utc_offset("report.utc_offset", &report.utc_offset)?;
        let now = Utc::now().with_timezone(&offset);

        let mut stamp = String::new();
        write!(
            stamp,
            "{} {}",
            now.format(&report.timestamp_format),
            report.timezone_label
        )
        .map_err(|_| SnapshotError::ConfigError {
            message: format!(
                "report.timestamp_format '{}' cannot be rendered",
                report.timestamp_format
            ),
        })?;
        Ok(stamp)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SnapshotPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<MetricRecord>> {
        let mut records = Vec::new();

        // 依序呼叫，每個指標獨立處理錯誤
        for section in self.config.sections() {
            for metric in &section.metrics {
                tracing::debug!(
                    "Fetching {}/{} from {}",
                    section.name,
                    metric.label,
                    metric.source.describe()
                );
                let observation = self.sources.observe(&metric.source).await;
                records.push(MetricRecord {
                    section: section.name.clone(),
                    row: MetricRow {
                        metric: metric.label.clone(),
                        observation,
                    },
                });
            }
        }

        Ok(records)
    }

    async fn transform(&self, records: Vec<MetricRecord>) -> Result<Snapshot> {
        let mut sections: Vec<Section> = self
            .config
            .sections()
            .iter()
            .map(|s| Section {
                name: s.name.clone(),
                rows: Vec::new(),
            })
            .collect();

        for record in records {
            match sections.iter_mut().find(|s| s.name == record.section) {
                Some(section) => section.rows.push(record.row),
                None => sections.push(Section {
                    name: record.section,
                    rows: vec![record.row],
                }),
            }
        }

        Ok(Snapshot {
            last_updated: self.timestamp()?,
            sections,
        })
    }

    async fn load(&self, snapshot: Snapshot) -> Result<String> {
        let indent = " ".repeat(self.config.output_indent());
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut json = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        snapshot.serialize(&mut serializer)?;

        let file_name = self.config.output_file_name();
        tracing::debug!("Writing snapshot ({} bytes) to storage", json.len());
        self.storage.write_file(file_name, &json).await?;

        Ok(self.storage.location(file_name))
    }
}
