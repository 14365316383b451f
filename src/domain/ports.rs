use crate::config::toml_config::{
    CredentialsConfig, EndpointsConfig, HttpConfig, ReportConfig, SectionConfig,
};
use crate::domain::model::{MetricRecord, Snapshot};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Location a file written under `path` ends up at, for reporting.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn output_file_name(&self) -> &str;
    fn output_indent(&self) -> usize;
    fn http(&self) -> &HttpConfig;
    fn report(&self) -> &ReportConfig;
    fn endpoints(&self) -> &EndpointsConfig;
    fn credentials(&self) -> &CredentialsConfig;
    fn sections(&self) -> &[SectionConfig];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MetricRecord>>;
    async fn transform(&self, records: Vec<MetricRecord>) -> Result<Snapshot>;
    async fn load(&self, snapshot: Snapshot) -> Result<String>;
}
