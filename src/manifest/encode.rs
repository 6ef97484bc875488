//! Serializing resources back into manifest text.

use crate::error::{Result, UninjectError};
use crate::uninject::WorkloadResource;
use serde::{Deserialize, Serialize};

/// Turns a (possibly uninjected) resource into manifest bytes.
pub trait ManifestEncoder {
    fn encode(&self, resource: &WorkloadResource) -> Result<Vec<u8>>;
}

/// Encodes a single YAML document, without a leading `---`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl ManifestEncoder for YamlEncoder {
    fn encode(&self, resource: &WorkloadResource) -> Result<Vec<u8>> {
        serde_yaml::to_string(resource)
            .map(String::into_bytes)
            .map_err(|e| UninjectError::Encode(e.to_string()))
    }
}

/// Encodes pretty-printed JSON terminated by a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl ManifestEncoder for JsonEncoder {
    fn encode(&self, resource: &WorkloadResource) -> Result<Vec<u8>> {
        let mut bytes =
            serde_json::to_vec_pretty(resource).map_err(|e| UninjectError::Encode(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Manifest output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn encoder(&self) -> &'static dyn ManifestEncoder {
        match self {
            Self::Yaml => &YamlEncoder,
            Self::Json => &JsonEncoder,
        }
    }

    /// Assemble encoded documents into one manifest.
    ///
    /// YAML documents are separated by `---`. A single JSON document is
    /// written as is; several are wrapped in one JSON array, which
    /// [`decode_documents`](crate::manifest::decode_documents) reads back
    /// as the same documents.
    pub fn join(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>> {
        match (self, documents) {
            (_, []) => Ok(Vec::new()),
            (Self::Json, [single]) => Ok(single.clone()),
            (Self::Yaml, _) => Ok(documents.join(&b"---\n"[..])),
            (Self::Json, _) => {
                let values = documents
                    .iter()
                    .map(|bytes| serde_json::from_slice::<serde_json::Value>(bytes))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| UninjectError::Encode(e.to_string()))?;
                let mut bytes = serde_json::to_vec_pretty(&values)
                    .map_err(|e| UninjectError::Encode(e.to_string()))?;
                bytes.push(b'\n');
                Ok(bytes)
            }
        }
    }
}
