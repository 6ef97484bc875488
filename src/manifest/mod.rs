//! Manifest decoding, encoding and stream processing.
//!
//! These are the collaborators around the uninjection core: they turn raw
//! YAML or JSON into [`WorkloadResource`](crate::uninject::WorkloadResource)
//! values and back.

pub mod decode;
pub mod encode;
pub mod stream;

pub use decode::decode_documents;
pub use encode::{JsonEncoder, ManifestEncoder, OutputFormat, YamlEncoder};
pub use stream::{ManifestProcessor, ProcessedManifest};
