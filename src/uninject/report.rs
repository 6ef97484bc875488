//! What an uninjection pass found and removed.

use serde::Serialize;

/// Injected containers removed from a single pod spec.
///
/// Volume removal is deliberately absent: only container removal is
/// reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Uninjected {
    /// The proxy sidecar container was removed.
    pub proxy: bool,
    /// The proxy-init container was removed.
    pub proxy_init: bool,
}

impl Uninjected {
    /// True if anything was removed.
    pub fn any(&self) -> bool {
        self.proxy || self.proxy_init
    }

    /// Fold another pass's findings into this one. Flags are never cleared.
    pub fn merge(&mut self, other: Uninjected) {
        self.proxy |= other.proxy;
        self.proxy_init |= other.proxy_init;
    }
}

/// Per-resource report, owned by the caller and filled in by the uninjector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Lower-cased resource kind, e.g. `deployment`.
    pub kind: String,
    /// Resource name, empty when the manifest has none.
    pub name: String,
    pub uninjected: Uninjected,
}

impl Report {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_lowercase(),
            name: name.into(),
            uninjected: Uninjected::default(),
        }
    }

    /// `kind "name"`, the way the resource is referred to in output.
    pub fn resource_name(&self) -> String {
        format!("{} \"{}\"", self.kind, self.name)
    }
}
