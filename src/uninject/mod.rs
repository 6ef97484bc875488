//! Sidecar uninjection for Kubernetes workloads.
//!
//! Reverses a proxy injection: removes the proxy and proxy-init containers,
//! the identity volume, and every annotation or label carrying the mesh's
//! reserved prefix (except the inject-policy annotation, which records the
//! injection decision and stays).
//!
//! # Example
//!
//! ```rust,ignore
//! use mesh_uninject::manifest::YamlEncoder;
//! use mesh_uninject::uninject::{Report, Uninjector, WorkloadResource};
//!
//! let value = serde_yaml::from_str(manifest)?;
//! let mut resource = WorkloadResource::from_value(value)?;
//! let mut report = Report::new(resource.kind(), resource.name());
//!
//! if let Some(bytes) = Uninjector::default().uninject(&mut resource, &mut report, &YamlEncoder)? {
//!     std::io::Write::write_all(&mut std::io::stdout(), &bytes)?;
//! }
//! ```

pub mod formatter;
pub mod naming;
pub mod report;
pub mod resource;
pub mod uninjector;

pub use formatter::{ReportFormat, format_reports};
pub use naming::NamingPolicy;
pub use report::{Report, Uninjected};
pub use resource::{PodTemplateMut, WorkloadResource};
pub use uninjector::Uninjector;
