//! Workload resources the uninjector can act on.
//!
//! Known workload kinds are decoded into their `k8s-openapi` types so the pod
//! template can be reached in a typed way. Anything else is carried through
//! untouched as a raw YAML value.

use crate::error::{Result, UninjectError};
use k8s_openapi::Resource;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, PodSpec, PodTemplateSpec, ReplicationController};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_yaml::Value;

/// A decoded manifest document.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadResource {
    Deployment(Box<Deployment>),
    DaemonSet(Box<DaemonSet>),
    StatefulSet(Box<StatefulSet>),
    ReplicaSet(Box<ReplicaSet>),
    ReplicationController(Box<ReplicationController>),
    Job(Box<Job>),
    CronJob(Box<CronJob>),
    Pod(Box<Pod>),
    /// Non-workloads, CRDs and unsupported API versions.
    Other(Value),
}

/// Mutable view of the parts of a workload touched by uninjection.
///
/// `object_meta` is `None` for a bare Pod, whose only metadata is the pod
/// metadata. `pod_meta` is `None` when the template carries no metadata block.
#[derive(Debug)]
pub struct PodTemplateMut<'a> {
    pub object_meta: Option<&'a mut ObjectMeta>,
    pub pod_meta: Option<&'a mut ObjectMeta>,
    pub pod_spec: &'a mut PodSpec,
}

impl<'a> PodTemplateMut<'a> {
    fn from_template(
        object_meta: &'a mut ObjectMeta,
        template: &'a mut PodTemplateSpec,
    ) -> Option<Self> {
        let PodTemplateSpec { metadata, spec } = template;
        Some(Self {
            object_meta: Some(object_meta),
            pod_meta: metadata.as_mut(),
            pod_spec: spec.as_mut()?,
        })
    }
}

impl WorkloadResource {
    /// Decode a document, dispatching on its `kind`.
    ///
    /// A known kind under a different `apiVersion` is passed through as
    /// [`WorkloadResource::Other`]; a known kind that does not match its
    /// schema is a decode error.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value.get("kind").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "Deployment" => decode_typed(value, Self::Deployment),
            "DaemonSet" => decode_typed(value, Self::DaemonSet),
            "StatefulSet" => decode_typed(value, Self::StatefulSet),
            "ReplicaSet" => decode_typed(value, Self::ReplicaSet),
            "ReplicationController" => decode_typed(value, Self::ReplicationController),
            "Job" => decode_typed(value, Self::Job),
            "CronJob" => decode_typed(value, Self::CronJob),
            "Pod" => decode_typed(value, Self::Pod),
            _ => Ok(Self::Other(value)),
        }
    }

    /// Convert back into a raw YAML value.
    pub fn to_value(&self) -> Result<Value> {
        serde_yaml::to_value(self).map_err(|e| UninjectError::Encode(e.to_string()))
    }

    /// The resource kind as written in the manifest; empty if missing.
    pub fn kind(&self) -> &str {
        match self {
            Self::Deployment(_) => Deployment::KIND,
            Self::DaemonSet(_) => DaemonSet::KIND,
            Self::StatefulSet(_) => StatefulSet::KIND,
            Self::ReplicaSet(_) => ReplicaSet::KIND,
            Self::ReplicationController(_) => ReplicationController::KIND,
            Self::Job(_) => Job::KIND,
            Self::CronJob(_) => CronJob::KIND,
            Self::Pod(_) => Pod::KIND,
            Self::Other(v) => v.get("kind").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    /// The resource name; empty if missing.
    pub fn name(&self) -> &str {
        let name = match self {
            Self::Deployment(d) => d.metadata.name.as_deref(),
            Self::DaemonSet(d) => d.metadata.name.as_deref(),
            Self::StatefulSet(s) => s.metadata.name.as_deref(),
            Self::ReplicaSet(r) => r.metadata.name.as_deref(),
            Self::ReplicationController(r) => r.metadata.name.as_deref(),
            Self::Job(j) => j.metadata.name.as_deref(),
            Self::CronJob(c) => c.metadata.name.as_deref(),
            Self::Pod(p) => p.metadata.name.as_deref(),
            Self::Other(v) => v
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str),
        };
        name.unwrap_or_default()
    }

    /// The pod spec, if this resource has one.
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Self::Deployment(d) => d.spec.as_ref()?.template.spec.as_ref(),
            Self::DaemonSet(d) => d.spec.as_ref()?.template.spec.as_ref(),
            Self::StatefulSet(s) => s.spec.as_ref()?.template.spec.as_ref(),
            Self::ReplicaSet(r) => r.spec.as_ref()?.template.as_ref()?.spec.as_ref(),
            Self::ReplicationController(r) => {
                r.spec.as_ref()?.template.as_ref()?.spec.as_ref()
            }
            Self::Job(j) => j.spec.as_ref()?.template.spec.as_ref(),
            Self::CronJob(c) => c
                .spec
                .as_ref()?
                .job_template
                .spec
                .as_ref()?
                .template
                .spec
                .as_ref(),
            Self::Pod(p) => p.spec.as_ref(),
            Self::Other(_) => None,
        }
    }

    /// Split the resource into the mutable parts uninjection touches.
    ///
    /// Returns `None` when there is no pod spec.
    pub fn pod_template_mut(&mut self) -> Option<PodTemplateMut<'_>> {
        match self {
            Self::Deployment(d) => {
                let Deployment { metadata, spec, .. } = &mut **d;
                PodTemplateMut::from_template(metadata, &mut spec.as_mut()?.template)
            }
            Self::DaemonSet(d) => {
                let DaemonSet { metadata, spec, .. } = &mut **d;
                PodTemplateMut::from_template(metadata, &mut spec.as_mut()?.template)
            }
            Self::StatefulSet(s) => {
                let StatefulSet { metadata, spec, .. } = &mut **s;
                PodTemplateMut::from_template(metadata, &mut spec.as_mut()?.template)
            }
            Self::ReplicaSet(r) => {
                let ReplicaSet { metadata, spec, .. } = &mut **r;
                PodTemplateMut::from_template(metadata, spec.as_mut()?.template.as_mut()?)
            }
            Self::ReplicationController(r) => {
                let ReplicationController { metadata, spec, .. } = &mut **r;
                PodTemplateMut::from_template(metadata, spec.as_mut()?.template.as_mut()?)
            }
            Self::Job(j) => {
                let Job { metadata, spec, .. } = &mut **j;
                PodTemplateMut::from_template(metadata, &mut spec.as_mut()?.template)
            }
            Self::CronJob(c) => {
                let CronJob { metadata, spec, .. } = &mut **c;
                let job_spec = spec.as_mut()?.job_template.spec.as_mut()?;
                PodTemplateMut::from_template(metadata, &mut job_spec.template)
            }
            Self::Pod(p) => {
                let Pod { metadata, spec, .. } = &mut **p;
                Some(PodTemplateMut {
                    object_meta: None,
                    pod_meta: Some(metadata),
                    pod_spec: spec.as_mut()?,
                })
            }
            Self::Other(_) => None,
        }
    }
}

impl Serialize for WorkloadResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Deployment(d) => d.serialize(serializer),
            Self::DaemonSet(d) => d.serialize(serializer),
            Self::StatefulSet(s) => s.serialize(serializer),
            Self::ReplicaSet(r) => r.serialize(serializer),
            Self::ReplicationController(r) => r.serialize(serializer),
            Self::Job(j) => j.serialize(serializer),
            Self::CronJob(c) => c.serialize(serializer),
            Self::Pod(p) => p.serialize(serializer),
            Self::Other(v) => v.serialize(serializer),
        }
    }
}

macro_rules! impl_from_workload {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for WorkloadResource {
                fn from(obj: $kind) -> Self {
                    Self::$kind(Box::new(obj))
                }
            }
        )*
    };
}

impl_from_workload!(
    Deployment,
    DaemonSet,
    StatefulSet,
    ReplicaSet,
    ReplicationController,
    Job,
    CronJob,
    Pod,
);

fn decode_typed<K>(
    value: Value,
    wrap: impl FnOnce(Box<K>) -> WorkloadResource,
) -> Result<WorkloadResource>
where
    K: Resource + DeserializeOwned,
{
    let api_version = value
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let name = value
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if api_version != K::API_VERSION {
        log::warn!(
            "{} \"{}\" uses apiVersion {:?} (expected {}), passing it through unchanged",
            K::KIND,
            name,
            api_version,
            K::API_VERSION
        );
        return Ok(WorkloadResource::Other(value));
    }

    serde_yaml::from_value::<K>(value)
        .map(|obj| wrap(Box::new(obj)))
        .map_err(|e| UninjectError::decode(format!("{} \"{}\"", K::KIND, name), e))
}
