//! Uninjecting whole manifest streams.

use crate::error::Result;
use crate::manifest::decode::decode_documents;
use crate::manifest::encode::{ManifestEncoder, OutputFormat};
use crate::uninject::{Report, Uninjector, WorkloadResource};
use log::{debug, info};
use serde_yaml::Value;

/// Result of processing one manifest input.
#[derive(Debug, Clone, Default)]
pub struct ProcessedManifest {
    /// Encoded documents, one per input document, in input order.
    pub documents: Vec<Vec<u8>>,
    /// One report per resource, list items included.
    pub reports: Vec<Report>,
}

impl ProcessedManifest {
    /// The documents assembled into a single manifest in `format`.
    pub fn output(&self, format: OutputFormat) -> Result<Vec<u8>> {
        format.join(&self.documents)
    }
}

/// Runs every document of a manifest through an [`Uninjector`].
pub struct ManifestProcessor<'a> {
    uninjector: &'a Uninjector,
    format: OutputFormat,
}

impl<'a> ManifestProcessor<'a> {
    pub fn new(uninjector: &'a Uninjector, format: OutputFormat) -> Self {
        Self { uninjector, format }
    }

    /// Decode `content`, uninject each resource and re-encode it.
    ///
    /// Every input document yields exactly one output document; resources
    /// without a pod spec come out unchanged.
    pub fn process(&self, content: &str) -> Result<ProcessedManifest> {
        let encoder = self.format.encoder();
        let mut processed = ProcessedManifest::default();

        for (index, document) in decode_documents(content)?.into_iter().enumerate() {
            debug!("Processing document {}", index + 1);
            let bytes = self.process_document(document, encoder, &mut processed.reports)?;
            processed.documents.push(bytes);
        }

        Ok(processed)
    }

    fn process_document(
        &self,
        document: Value,
        encoder: &dyn ManifestEncoder,
        reports: &mut Vec<Report>,
    ) -> Result<Vec<u8>> {
        if is_list(&document) {
            let list = self.process_list(document, reports)?;
            return encoder.encode(&WorkloadResource::Other(list));
        }

        let mut resource = WorkloadResource::from_value(document)?;
        let mut report = Report::new(resource.kind(), resource.name());

        let bytes = match self.uninjector.uninject(&mut resource, &mut report, encoder)? {
            Some(bytes) => {
                log_outcome(&report);
                bytes
            }
            None => {
                debug!("{} has no pod spec, leaving it unchanged", report.resource_name());
                encoder.encode(&resource)?
            }
        };

        reports.push(report);
        Ok(bytes)
    }

    fn process_list(&self, mut list: Value, reports: &mut Vec<Report>) -> Result<Value> {
        let Some(items) = list.get_mut("items").and_then(Value::as_sequence_mut) else {
            return Ok(list);
        };

        for item in items.iter_mut() {
            let mut resource = WorkloadResource::from_value(std::mem::take(item))?;
            let mut report = Report::new(resource.kind(), resource.name());
            if let Some(found) = self.uninjector.strip(&mut resource) {
                report.uninjected.merge(found);
                log_outcome(&report);
            }
            *item = resource.to_value()?;
            reports.push(report);
        }

        Ok(list)
    }
}

fn is_list(document: &Value) -> bool {
    document.get("kind").and_then(Value::as_str) == Some("List")
}

fn log_outcome(report: &Report) {
    if report.uninjected.any() {
        info!(
            "{} uninjected (proxy: {}, proxy-init: {})",
            report.resource_name(),
            report.uninjected.proxy,
            report.uninjected.proxy_init
        );
    } else {
        debug!("{} had nothing injected", report.resource_name());
    }
}
