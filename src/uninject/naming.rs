//! Reserved names that identify injected artifacts.
//!
//! Every name the uninjector matches against lives in [`NamingPolicy`], so the
//! core can be pointed at any mesh's conventions. The defaults are Linkerd's.

use serde::{Deserialize, Serialize};

/// Names, keys and prefixes written into a manifest by the injector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamingPolicy {
    /// Name of the injected proxy sidecar container.
    pub proxy_container_name: String,
    /// Name of the injected init container.
    pub proxy_init_container_name: String,
    /// Name of the identity end-entity volume.
    pub identity_volume_name: String,
    /// Pod annotation recording that the automount flag was overridden.
    pub automount_annotation: String,
    /// Value of [`Self::automount_annotation`] that triggers the reset.
    pub automount_enabled_value: String,
    /// Prefix shared by every injected annotation and label key.
    pub prefix: String,
    /// Annotation recording the inject decision; survives prefix stripping.
    pub proxy_inject_annotation: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            proxy_container_name: "linkerd-proxy".to_string(),
            proxy_init_container_name: "linkerd-init".to_string(),
            identity_volume_name: "linkerd-identity-end-entity".to_string(),
            automount_annotation: "linkerd.io/automount-service-account-token".to_string(),
            automount_enabled_value: "enabled".to_string(),
            prefix: "linkerd.io".to_string(),
            proxy_inject_annotation: "linkerd.io/inject".to_string(),
        }
    }
}

impl NamingPolicy {
    /// Whether an annotation key should be kept after uninjection.
    pub fn keeps_annotation(&self, key: &str) -> bool {
        !key.starts_with(&self.prefix) || key == self.proxy_inject_annotation
    }

    /// Whether a label key should be kept after uninjection.
    pub fn keeps_label(&self, key: &str) -> bool {
        !key.starts_with(&self.prefix)
    }
}
