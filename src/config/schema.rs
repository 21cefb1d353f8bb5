//! KDL schema for carepath.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::models::Locale;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in carepath.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// data-file "dashacompanhamento_formatado.xlsx"
/// locale "pt"               // headers for new sheets: "en" or "pt"
/// export-filename "tarefas_filtradas.csv"
/// output-format "human"     // or "json"
/// host "127.0.0.1"
/// port 3030
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarepathConfig {
    /// Path of the tracking sheet (.xlsx or .csv)
    pub data_file: Option<String>,

    /// Header and status localization used when creating a sheet
    pub locale: Option<Locale>,

    /// File name offered for the filtered CSV download
    pub export_filename: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Address the web page binds to
    pub host: Option<String>,

    /// Port the web page listens on (0 picks a free port)
    pub port: Option<u16>,
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn push_string(doc: &mut KdlDocument, name: &str, value: &str) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    doc.nodes_mut().push(node);
}

impl CarepathConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref file) = self.data_file {
            if file.trim().is_empty() {
                return Err("data-file must not be empty".to_string());
            }
        }
        if let Some(ref name) = self.export_filename {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(format!(
                    "export-filename must be a bare file name, got {:?}",
                    name
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored; values of the wrong type are skipped.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.data_file = first_string(doc, "data-file").map(str::to_string);
        config.locale = first_string(doc, "locale").and_then(Locale::parse);
        config.export_filename = first_string(doc, "export-filename").map(str::to_string);
        config.output_format = first_string(doc, "output-format").and_then(OutputFormat::parse);
        config.host = first_string(doc, "host").map(str::to_string);

        if let Some(node) = doc.get("port") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    config.port = u16::try_from(i).ok();
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref file) = self.data_file {
            push_string(&mut doc, "data-file", file);
        }
        if let Some(locale) = self.locale {
            push_string(&mut doc, "locale", locale.as_str());
        }
        if let Some(ref name) = self.export_filename {
            push_string(&mut doc, "export-filename", name);
        }
        if let Some(ref format) = self.output_format {
            push_string(&mut doc, "output-format", format.as_str());
        }
        if let Some(ref host) = self.host {
            push_string(&mut doc, "host", host);
        }
        if let Some(port) = self.port {
            let mut node = KdlNode::new("port");
            node.push(KdlEntry::new(KdlValue::Integer(port as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }
}
