use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Placeholder written when a provider could not deliver a value.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct Observation {
    pub value: String,
    pub date: String,
}

impl Observation {
    pub fn new(value: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            date: date.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(UNAVAILABLE, UNAVAILABLE)
    }

    pub fn is_available(&self) -> bool {
        self.value != UNAVAILABLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: String,
    #[serde(flatten)]
    pub observation: Observation,
}

/// One extracted metric, tagged with the section it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub section: String,
    pub row: MetricRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub rows: Vec<MetricRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub last_updated: String,
    pub sections: Vec<Section>,
}

impl Snapshot {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

// `last_updated` first, then sections as top-level keys in their configured order.
impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + 1))?;
        map.serialize_entry("last_updated", &self.last_updated)?;
        for section in &self.sections {
            map.serialize_entry(&section.name, &section.rows)?;
        }
        map.end()
    }
}
