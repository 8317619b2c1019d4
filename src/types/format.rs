//! Output formats understood by the geocoding service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Serialization format requested from the service via the `format` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xml,
    Json,
    /// Richer JSON with `category`/`type` split out.
    #[default]
    Jsonv2,
    Geojson,
    Geocodejson,
}

impl OutputFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
            OutputFormat::Jsonv2 => "jsonv2",
            OutputFormat::Geojson => "geojson",
            OutputFormat::Geocodejson => "geocodejson",
        }
    }

    /// Whether the format produces a JSON document.
    pub fn is_json(&self) -> bool {
        !matches!(self, OutputFormat::Xml)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
