//! JSON formatter.

use crate::uninject::report::Report;
use serde::Serialize;

/// Format reports as JSON.
pub fn format(reports: &[Report]) -> String {
    let output = JsonOutput::from(reports);
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Serialize)]
struct JsonOutput {
    reports: Vec<JsonReport>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonReport {
    kind: String,
    name: String,
    proxy: bool,
    proxy_init: bool,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    uninjected: usize,
}

impl From<&[Report]> for JsonOutput {
    fn from(reports: &[Report]) -> Self {
        Self {
            reports: reports.iter().map(JsonReport::from).collect(),
            summary: JsonSummary {
                total: reports.len(),
                uninjected: reports.iter().filter(|r| r.uninjected.any()).count(),
            },
        }
    }
}

impl From<&Report> for JsonReport {
    fn from(r: &Report) -> Self {
        Self {
            kind: r.kind.clone(),
            name: r.name.clone(),
            proxy: r.uninjected.proxy,
            proxy_init: r.uninjected.proxy_init,
        }
    }
}
