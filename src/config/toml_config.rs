use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub file_name: String,
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_name: "data.json".to_string(),
            indent: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    /// PDFs are larger and served slowly, so they get their own budget.
    pub pdf_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            pdf_timeout_seconds: 20,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub utc_offset: String,
    pub timezone_label: String,
    pub timestamp_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset: "+05:30".to_string(),
            timezone_label: "IST".to_string(),
            timestamp_format: "%Y-%m-%d %I:%M %p".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub worldbank: String,
    pub eodhd: String,
    pub yahoo: String,
    pub metalprice: String,
    pub mospi: String,
    pub tradingeconomics: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            worldbank: "https://api.worldbank.org".to_string(),
            eodhd: "https://eodhd.com".to_string(),
            yahoo: "https://query1.finance.yahoo.com".to_string(),
            metalprice: "https://api.metalpriceapi.com".to_string(),
            mospi: "https://www.mospi.gov.in".to_string(),
            tradingeconomics: "https://tradingeconomics.com".to_string(),
        }
    }
}

impl EndpointsConfig {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("endpoints.worldbank", &self.worldbank),
            ("endpoints.eodhd", &self.eodhd),
            ("endpoints.yahoo", &self.yahoo),
            ("endpoints.metalprice", &self.metalprice),
            ("endpoints.mospi", &self.mospi),
            ("endpoints.tradingeconomics", &self.tradingeconomics),
        ]
    }
}

pub const EODHD_KEY_VAR: &str = "EODHD_API_KEY";
pub const METALPRICE_KEY_VAR: &str = "METALPRICE_API_KEY";
const EODHD_DEMO_KEY: &str = "demo";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub eodhd_api_key: Option<String>,
    pub metalprice_api_key: Option<String>,
}

impl CredentialsConfig {
    /// Drops unusable values, then fills the gaps from `lookup` (normally the process env).
    pub fn resolve_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (slot, var) in [
            (&mut self.eodhd_api_key, EODHD_KEY_VAR),
            (&mut self.metalprice_api_key, METALPRICE_KEY_VAR),
        ] {
            if !slot.as_deref().is_some_and(is_usable_key) {
                *slot = lookup(var).filter(|v| is_usable_key(v));
            }
        }
    }

    pub fn eodhd_api_key(&self) -> &str {
        self.eodhd_api_key.as_deref().unwrap_or(EODHD_DEMO_KEY)
    }

    pub fn metalprice_api_key(&self) -> Option<&str> {
        self.metalprice_api_key.as_deref()
    }
}

// A `${VAR}` left behind by substitution means the variable was unset.
fn is_usable_key(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !(value.starts_with("${") && value.ends_with('}'))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub label: String,
    #[serde(flatten)]
    pub source: MetricSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MetricSource {
    WorldBank {
        country: String,
        indicator: String,
        #[serde(default)]
        unit: WorldBankUnit,
    },
    BondYield {
        ticker: String,
    },
    Quote {
        ticker: String,
        #[serde(default)]
        prefix: String,
    },
    Metal {
        symbol: String,
        fallback_ticker: String,
    },
    MospiCpi,
    BrentCrude {
        #[serde(default = "default_brent_ticker")]
        ticker: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldBankUnit {
    #[default]
    Percent,
    UsdBillions,
}

fn default_brent_ticker() -> String {
    "BZ=F".to_string()
}

impl MetricSource {
    /// Short human description, used by dry runs and logs.
    pub fn describe(&self) -> String {
        match self {
            MetricSource::WorldBank {
                country, indicator, ..
            } => format!("World Bank {} {}", country, indicator),
            MetricSource::BondYield { ticker } => format!("EODHD {}.GBOND", ticker),
            MetricSource::Quote { ticker, .. } => format!("Yahoo Finance {}", ticker),
            MetricSource::Metal {
                symbol,
                fallback_ticker,
            } => format!("MetalPriceAPI {} (fallback {})", symbol, fallback_ticker),
            MetricSource::MospiCpi => "MoSPI CPI release".to_string(),
            MetricSource::BrentCrude { ticker } => {
                format!("Yahoo Finance {} (fallback Trading Economics)", ticker)
            }
        }
    }
}

fn world_bank(label: &str, country: &str, indicator: &str, unit: WorldBankUnit) -> MetricConfig {
    MetricConfig {
        label: label.to_string(),
        source: MetricSource::WorldBank {
            country: country.to_string(),
            indicator: indicator.to_string(),
            unit,
        },
    }
}

fn bond_yield(ticker: &str) -> MetricConfig {
    MetricConfig {
        label: "10 yr bond yield".to_string(),
        source: MetricSource::BondYield {
            ticker: ticker.to_string(),
        },
    }
}

fn quote(label: &str, ticker: &str) -> MetricConfig {
    MetricConfig {
        label: label.to_string(),
        source: MetricSource::Quote {
            ticker: ticker.to_string(),
            prefix: String::new(),
        },
    }
}

fn metal(label: &str, symbol: &str, fallback_ticker: &str) -> MetricConfig {
    MetricConfig {
        label: label.to_string(),
        source: MetricSource::Metal {
            symbol: symbol.to_string(),
            fallback_ticker: fallback_ticker.to_string(),
        },
    }
}

const GDP: &str = "NY.GDP.MKTP.CD";
const DEBT: &str = "GC.DOD.TOTL.GD.ZS";
const FISCAL_BALANCE: &str = "GC.NLD.TOTL.GD.ZS";

pub fn default_sections() -> Vec<SectionConfig> {
    use WorldBankUnit::{Percent, UsdBillions};

    vec![
        SectionConfig {
            name: "india".to_string(),
            metrics: vec![
                world_bank("GDP", "IN", GDP, UsdBillions),
                world_bank("Debt", "IN", DEBT, Percent),
                world_bank("Fiscal deficit (% of GDP)", "IN", FISCAL_BALANCE, Percent),
                MetricConfig {
                    label: "CPI".to_string(),
                    source: MetricSource::MospiCpi,
                },
                bond_yield("IN10Y"),
                quote("Mkt Cap NSE", "^NSEI"),
            ],
        },
        SectionConfig {
            name: "us".to_string(),
            metrics: vec![
                world_bank("GDP", "US", GDP, UsdBillions),
                world_bank("Debt", "US", DEBT, Percent),
                bond_yield("US10Y"),
                quote("Mkt Cap (Index proxy)", "^GSPC"),
            ],
        },
        SectionConfig {
            name: "china".to_string(),
            metrics: vec![
                world_bank("GDP", "CN", GDP, UsdBillions),
                world_bank("Debt", "CN", DEBT, Percent),
                bond_yield("CN10Y"),
                quote("Mkt Cap (Index proxy)", "000001.SS"),
            ],
        },
        SectionConfig {
            name: "commodities".to_string(),
            metrics: vec![
                metal("Gold price", "XAU", "GC=F"),
                metal("Silver price", "XAG", "SI=F"),
                MetricConfig {
                    label: "Brent crude".to_string(),
                    source: MetricSource::BrentCrude {
                        ticker: default_brent_ticker(),
                    },
                },
            ],
        },
    ]
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            http: HttpConfig::default(),
            report: ReportConfig::default(),
            endpoints: EndpointsConfig::default(),
            credentials: CredentialsConfig::default(),
            sections: default_sections(),
        }
    }
}

impl SnapshotConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn metric_count(&self) -> usize {
        self.sections.iter().map(|s| s.metrics.len()).sum()
    }
}

impl Validate for SnapshotConfig {
    fn validate(&self) -> Result<()> {
        for (field, url) in self.endpoints.entries() {
            validation::validate_url(field, url)?;
        }

        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_path("output.file_name", &self.output.file_name)?;
        validation::validate_range("output.indent", self.output.indent, 0, 16)?;

        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 300)?;
        validation::validate_range(
            "http.pdf_timeout_seconds",
            self.http.pdf_timeout_seconds,
            1,
            300,
        )?;
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;

        validation::parse_utc_offset("report.utc_offset", &self.report.utc_offset)?;
        validation::validate_strftime("report.timestamp_format", &self.report.timestamp_format)?;

        if self.sections.is_empty() {
            return Err(SnapshotError::MissingConfigError {
                field: "sections".to_string(),
            });
        }
        for section in &self.sections {
            validation::validate_non_empty_string("sections.name", &section.name)?;
            if section.name == "last_updated" {
                return Err(SnapshotError::InvalidConfigValueError {
                    field: "sections.name".to_string(),
                    value: section.name.clone(),
                    reason: "Reserved for the snapshot timestamp".to_string(),
                });
            }
            for metric in &section.metrics {
                validation::validate_non_empty_string("sections.metrics.label", &metric.label)?;
            }
        }
        validation::validate_unique("sections.name", self.sections.iter().map(|s| s.name.as_str()))?;

        Ok(())
    }
}

impl ConfigProvider for SnapshotConfig {
    fn output_file_name(&self) -> &str {
        &self.output.file_name
    }

    fn output_indent(&self) -> usize {
        self.output.indent
    }

    fn http(&self) -> &HttpConfig {
        &self.http
    }

    fn report(&self) -> &ReportConfig {
        &self.report
    }

    fn endpoints(&self) -> &EndpointsConfig {
        &self.endpoints
    }

    fn credentials(&self) -> &CredentialsConfig {
        &self.credentials
    }

    fn sections(&self) -> &[SectionConfig] {
        &self.sections
    }
}
