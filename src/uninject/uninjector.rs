//! The uninjection core.

use crate::error::Result;
use crate::manifest::ManifestEncoder;
use crate::uninject::naming::NamingPolicy;
use crate::uninject::report::{Report, Uninjected};
use crate::uninject::resource::{PodTemplateMut, WorkloadResource};
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Strips injected sidecars, volumes and marker metadata from workloads.
///
/// Resources are mutated in place; clone first if the injected form is still
/// needed afterwards.
#[derive(Debug, Clone, Default)]
pub struct Uninjector {
    policy: NamingPolicy,
}

impl Uninjector {
    pub fn new(policy: NamingPolicy) -> Self {
        Self { policy }
    }

    /// Uninject `resource` and encode the result.
    ///
    /// Returns `Ok(None)` without touching `report` or calling the encoder
    /// when the resource has no pod spec.
    pub fn uninject<E>(
        &self,
        resource: &mut WorkloadResource,
        report: &mut Report,
        encoder: &E,
    ) -> Result<Option<Vec<u8>>>
    where
        E: ManifestEncoder + ?Sized,
    {
        let Some(found) = self.strip(resource) else {
            return Ok(None);
        };
        report.uninjected.merge(found);
        encoder.encode(resource).map(Some)
    }

    /// Remove injected artifacts in place and return what was found.
    ///
    /// Returns `None` when the resource has no pod spec.
    pub fn strip(&self, resource: &mut WorkloadResource) -> Option<Uninjected> {
        let parts = resource.pod_template_mut()?;
        Some(self.strip_parts(parts))
    }

    fn strip_parts(&self, parts: PodTemplateMut<'_>) -> Uninjected {
        let PodTemplateMut {
            object_meta,
            pod_meta,
            pod_spec,
        } = parts;

        let automount_reset = pod_meta
            .as_deref()
            .and_then(|meta| meta.annotations.as_ref())
            .and_then(|annotations| annotations.get(&self.policy.automount_annotation))
            .is_some_and(|value| *value == self.policy.automount_enabled_value);

        let found = self.strip_pod_spec(pod_spec, automount_reset);

        if let Some(meta) = object_meta {
            self.strip_object_meta(meta);
        }
        if let Some(meta) = pod_meta {
            self.strip_object_meta(meta);
        }

        found
    }

    fn strip_pod_spec(&self, spec: &mut PodSpec, automount_reset: bool) -> Uninjected {
        let mut found = Uninjected::default();

        if automount_reset {
            spec.automount_service_account_token = Some(false);
        }

        if let Some(init_containers) = spec.init_containers.take() {
            let before = init_containers.len();
            let kept: Vec<_> = init_containers
                .into_iter()
                .filter(|c| c.name != self.policy.proxy_init_container_name)
                .collect();
            found.proxy_init = kept.len() != before;
            spec.init_containers = non_empty(kept);
        }

        let before = spec.containers.len();
        spec.containers.retain(|c| c.name != self.policy.proxy_container_name);
        found.proxy = spec.containers.len() != before;

        if let Some(volumes) = spec.volumes.take() {
            let kept: Vec<_> = volumes
                .into_iter()
                .filter(|v| v.name != self.policy.identity_volume_name)
                .collect();
            spec.volumes = non_empty(kept);
        }

        found
    }

    fn strip_object_meta(&self, meta: &mut ObjectMeta) {
        meta.annotations = meta.annotations.take().and_then(|annotations| {
            non_empty_map(
                annotations
                    .into_iter()
                    .filter(|(key, _)| self.policy.keeps_annotation(key))
                    .collect(),
            )
        });
        meta.labels = meta.labels.take().and_then(|labels| {
            non_empty_map(
                labels
                    .into_iter()
                    .filter(|(key, _)| self.policy.keeps_label(key))
                    .collect(),
            )
        });
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn non_empty_map(map: BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then_some(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UninjectError;
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
    use k8s_openapi::api::core::v1::{Container, Pod, PodTemplateSpec, Volume};
    use std::cell::Cell;

    fn container(name: &str) -> Container {
        Container {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn volume(name: &str) -> Volume {
        Volume {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn deployment(pod_meta: ObjectMeta, spec: PodSpec) -> WorkloadResource {
        WorkloadResource::from(Deployment {
            metadata: ObjectMeta {
                name: Some("web".to_string()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                template: PodTemplateSpec {
                    metadata: Some(pod_meta),
                    spec: Some(spec),
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn injected_spec() -> PodSpec {
        PodSpec {
            init_containers: Some(vec![container("linkerd-init"), container("migrate")]),
            containers: vec![container("web"), container("linkerd-proxy"), container("sidecar")],
            volumes: Some(vec![volume("data"), volume("linkerd-identity-end-entity")]),
            ..Default::default()
        }
    }

    fn names(containers: &[Container]) -> Vec<&str> {
        containers.iter().map(|c| c.name.as_str()).collect()
    }

    struct CountingEncoder {
        calls: Cell<usize>,
    }

    impl ManifestEncoder for CountingEncoder {
        fn encode(&self, resource: &WorkloadResource) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(resource.name().as_bytes().to_vec())
        }
    }

    struct FailingEncoder;

    impl ManifestEncoder for FailingEncoder {
        fn encode(&self, _resource: &WorkloadResource) -> Result<Vec<u8>> {
            Err(UninjectError::Encode("disk full".to_string()))
        }
    }

    #[test]
    fn test_removes_proxy_and_init() {
        let mut resource = deployment(ObjectMeta::default(), injected_spec());
        let found = Uninjector::default().strip(&mut resource).unwrap();

        assert!(found.proxy);
        assert!(found.proxy_init);

        let spec = resource.pod_spec().unwrap();
        assert_eq!(names(&spec.containers), vec!["web", "sidecar"]);
        assert_eq!(names(spec.init_containers.as_ref().unwrap()), vec!["migrate"]);
        let volumes: Vec<_> = spec
            .volumes
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(volumes, vec!["data"]);
    }

    #[test]
    fn test_preserves_container_order() {
        let spec = PodSpec {
            containers: vec![container("a"), container("linkerd-proxy"), container("b")],
            ..Default::default()
        };
        let mut resource = deployment(ObjectMeta::default(), spec);
        Uninjector::default().strip(&mut resource);

        assert_eq!(names(&resource.pod_spec().unwrap().containers), vec!["a", "b"]);
    }

    #[test]
    fn test_near_miss_names_survive() {
        let spec = PodSpec {
            init_containers: Some(vec![container("linkerd-init-v2")]),
            containers: vec![
                container("linkerd-proxy-extra"),
                container("my-linkerd-proxy"),
                container("Linkerd-Proxy"),
            ],
            ..Default::default()
        };
        let mut resource = deployment(ObjectMeta::default(), spec);
        let found = Uninjector::default().strip(&mut resource).unwrap();

        assert_eq!(found, Uninjected::default());
        let spec = resource.pod_spec().unwrap();
        assert_eq!(spec.containers.len(), 3);
        assert_eq!(spec.init_containers.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_removes_every_duplicate() {
        let spec = PodSpec {
            containers: vec![
                container("linkerd-proxy"),
                container("app"),
                container("linkerd-proxy"),
            ],
            ..Default::default()
        };
        let mut resource = deployment(ObjectMeta::default(), spec);
        let found = Uninjector::default().strip(&mut resource).unwrap();

        assert!(found.proxy);
        assert_eq!(names(&resource.pod_spec().unwrap().containers), vec!["app"]);
    }

    #[test]
    fn test_emptied_lists_become_absent() {
        let spec = PodSpec {
            init_containers: Some(vec![container("linkerd-init")]),
            containers: vec![container("app")],
            volumes: Some(vec![volume("linkerd-identity-end-entity")]),
            ..Default::default()
        };
        let mut resource = deployment(ObjectMeta::default(), spec);
        Uninjector::default().strip(&mut resource);

        let spec = resource.pod_spec().unwrap();
        assert!(spec.init_containers.is_none());
        assert!(spec.volumes.is_none());
    }

    #[test]
    fn test_annotation_exemption() {
        let pod_meta = ObjectMeta {
            annotations: Some(map(&[
                ("linkerd.io/foo", "x"),
                ("linkerd.io/inject", "disabled"),
                ("other", "y"),
            ])),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, injected_spec());
        let mut parts_check = resource.clone();
        Uninjector::default().strip(&mut resource);

        let parts = resource.pod_template_mut().unwrap();
        let annotations = parts.pod_meta.unwrap().annotations.clone().unwrap();
        assert_eq!(
            annotations,
            map(&[("linkerd.io/inject", "disabled"), ("other", "y")])
        );

        // The input clone is unaffected.
        let untouched = parts_check.pod_template_mut().unwrap();
        assert_eq!(untouched.pod_meta.unwrap().annotations.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_label_has_no_exemption() {
        let pod_meta = ObjectMeta {
            labels: Some(map(&[
                ("linkerd.io/foo", "x"),
                ("linkerd.io/inject", "enabled"),
                ("other", "y"),
            ])),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, injected_spec());
        Uninjector::default().strip(&mut resource);

        let parts = resource.pod_template_mut().unwrap();
        assert_eq!(parts.pod_meta.unwrap().labels.clone(), Some(map(&[("other", "y")])));
    }

    #[test]
    fn test_strips_top_level_metadata() {
        let mut resource = deployment(ObjectMeta::default(), injected_spec());
        if let WorkloadResource::Deployment(d) = &mut resource {
            d.metadata.annotations = Some(map(&[
                ("linkerd.io/created-by", "linkerd/cli"),
                ("linkerd.io/inject", "enabled"),
            ]));
            d.metadata.labels = Some(map(&[("linkerd.io/control-plane-ns", "linkerd")]));
        }

        Uninjector::default().strip(&mut resource);

        let parts = resource.pod_template_mut().unwrap();
        let meta = parts.object_meta.unwrap();
        assert_eq!(meta.annotations, Some(map(&[("linkerd.io/inject", "enabled")])));
        assert_eq!(meta.labels, None);
    }

    #[test]
    fn test_automount_reset() {
        let pod_meta = ObjectMeta {
            annotations: Some(map(&[("linkerd.io/automount-service-account-token", "enabled")])),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, injected_spec());
        Uninjector::default().strip(&mut resource);

        let spec = resource.pod_spec().unwrap();
        assert_eq!(spec.automount_service_account_token, Some(false));
    }

    #[test]
    fn test_automount_untouched_without_annotation() {
        for flag in [None, Some(true), Some(false)] {
            let spec = PodSpec {
                automount_service_account_token: flag,
                ..injected_spec()
            };
            let mut resource = deployment(ObjectMeta::default(), spec);
            Uninjector::default().strip(&mut resource);
            assert_eq!(resource.pod_spec().unwrap().automount_service_account_token, flag);
        }
    }

    #[test]
    fn test_automount_other_value_is_ignored() {
        let pod_meta = ObjectMeta {
            annotations: Some(map(&[("linkerd.io/automount-service-account-token", "disabled")])),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, injected_spec());
        Uninjector::default().strip(&mut resource);

        assert_eq!(resource.pod_spec().unwrap().automount_service_account_token, None);
    }

    #[test]
    fn test_idempotent() {
        let pod_meta = ObjectMeta {
            annotations: Some(map(&[("linkerd.io/proxy-version", "stable"), ("app", "web")])),
            labels: Some(map(&[("linkerd.io/workload-ns", "default"), ("app", "web")])),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, injected_spec());
        let uninjector = Uninjector::default();

        uninjector.strip(&mut resource);
        let once = resource.clone();
        let found = uninjector.strip(&mut resource).unwrap();

        assert_eq!(found, Uninjected::default());
        assert_eq!(resource, once);
    }

    #[test]
    fn test_bare_pod() {
        let mut resource = WorkloadResource::from(Pod {
            metadata: ObjectMeta {
                name: Some("solo".to_string()),
                annotations: Some(map(&[("linkerd.io/proxy-version", "stable")])),
                ..Default::default()
            },
            spec: Some(injected_spec()),
            ..Default::default()
        });

        let found = Uninjector::default().strip(&mut resource).unwrap();
        assert!(found.any());
        let parts = resource.pod_template_mut().unwrap();
        assert_eq!(parts.pod_meta.unwrap().annotations, None);
    }

    #[test]
    fn test_uninject_fills_report_and_encodes() {
        let mut resource = deployment(ObjectMeta::default(), injected_spec());
        let mut report = Report::new("Deployment", "web");
        let encoder = CountingEncoder { calls: Cell::new(0) };

        let output = Uninjector::default()
            .uninject(&mut resource, &mut report, &encoder)
            .unwrap();

        assert_eq!(output, Some(b"web".to_vec()));
        assert_eq!(encoder.calls.get(), 1);
        assert!(report.uninjected.proxy);
        assert!(report.uninjected.proxy_init);
        // Mutated in place.
        assert_eq!(resource.pod_spec().unwrap().containers.len(), 2);
    }

    #[test]
    fn test_uninject_non_workload_is_noop() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n").unwrap();
        let mut resource = WorkloadResource::Other(value);
        let before = resource.clone();
        let mut report = Report::new("ConfigMap", "cfg");
        let encoder = CountingEncoder { calls: Cell::new(0) };

        let output = Uninjector::default()
            .uninject(&mut resource, &mut report, &encoder)
            .unwrap();

        assert!(output.is_none());
        assert_eq!(encoder.calls.get(), 0);
        assert_eq!(report, Report::new("ConfigMap", "cfg"));
        assert_eq!(resource, before);
    }

    #[test]
    fn test_uninject_propagates_encoder_error() {
        let mut resource = deployment(ObjectMeta::default(), injected_spec());
        let mut report = Report::default();

        let err = Uninjector::default()
            .uninject(&mut resource, &mut report, &FailingEncoder)
            .unwrap_err();

        assert!(matches!(err, UninjectError::Encode(ref msg) if msg == "disk full"));
    }

    #[test]
    fn test_report_accumulates_across_calls() {
        let uninjector = Uninjector::default();
        let encoder = CountingEncoder { calls: Cell::new(0) };
        let mut report = Report::default();

        let mut with_proxy = deployment(
            ObjectMeta::default(),
            PodSpec {
                containers: vec![container("linkerd-proxy")],
                ..Default::default()
            },
        );
        let mut clean = deployment(
            ObjectMeta::default(),
            PodSpec {
                containers: vec![container("app")],
                ..Default::default()
            },
        );

        uninjector.uninject(&mut with_proxy, &mut report, &encoder).unwrap();
        uninjector.uninject(&mut clean, &mut report, &encoder).unwrap();

        assert!(report.uninjected.proxy);
        assert!(!report.uninjected.proxy_init);
    }

    #[test]
    fn test_custom_policy() {
        let policy = NamingPolicy {
            proxy_container_name: "istio-proxy".to_string(),
            proxy_init_container_name: "istio-init".to_string(),
            identity_volume_name: "istio-envoy".to_string(),
            prefix: "sidecar.istio.io".to_string(),
            proxy_inject_annotation: "sidecar.istio.io/inject".to_string(),
            ..Default::default()
        };
        let pod_meta = ObjectMeta {
            annotations: Some(map(&[
                ("sidecar.istio.io/status", "{}"),
                ("sidecar.istio.io/inject", "true"),
                ("linkerd.io/proxy-version", "stable"),
            ])),
            ..Default::default()
        };
        let spec = PodSpec {
            init_containers: Some(vec![container("istio-init")]),
            containers: vec![container("app"), container("istio-proxy"), container("linkerd-proxy")],
            volumes: Some(vec![volume("istio-envoy")]),
            ..Default::default()
        };
        let mut resource = deployment(pod_meta, spec);

        let found = Uninjector::new(policy).strip(&mut resource).unwrap();

        assert!(found.proxy && found.proxy_init);
        assert_eq!(
            names(&resource.pod_spec().unwrap().containers),
            vec!["app", "linkerd-proxy"]
        );
        let parts = resource.pod_template_mut().unwrap();
        assert_eq!(
            parts.pod_meta.unwrap().annotations,
            Some(map(&[
                ("linkerd.io/proxy-version", "stable"),
                ("sidecar.istio.io/inject", "true"),
            ]))
        );
    }
}
