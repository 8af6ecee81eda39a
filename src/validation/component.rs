use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::error::{
    AnnotationType, GitObjectType, MissingVolumeMount, ResourceKind, ValidationError,
    ValidationReport,
};
use super::project::validate_single_remote_git_src;
use super::provenance::{ImportProvenance, resolve_import_attributes};
use super::quantity::Quantity;
use super::uri::validate_uri;
use crate::models::{
    Annotation, Component, ComponentVariant, ContainerComponent, Endpoint, find_duplicate_key,
};

/// Environment variables injected by the platform into every container
pub const RESERVED_ENV_VARS: [&str; 2] = ["PROJECT_SOURCE", "PROJECTS_ROOT"];

/// Validate the component list.
///
/// A duplicate name stops validation immediately. Every other problem is
/// collected, and unresolved volume mounts are reported together at the end.
pub fn validate_components(components: &[Component]) -> Result<(), ValidationReport> {
    if let Some(duplicate) = find_duplicate_key(components) {
        return Err(ValidationReport::single(ValidationError::DuplicateKey {
            key: duplicate.name.clone(),
        }));
    }

    let mut report = ValidationReport::new();
    let mut volumes: HashSet<&str> = HashSet::new();
    let mut mounts: Vec<(&Component, &str)> = Vec::new();
    let mut endpoints = SeenEndpoints::default();
    let mut annotations = SeenAnnotations::default();

    for component in components {
        let variant = component
            .variant()
            .map_err(|reason| {
                ValidationReport::single(ValidationError::InvalidUnion {
                    entity: format!("component \"{}\"", component.name),
                    reason,
                })
            })?;

        let Some(variant) = variant else {
            continue;
        };

        match variant {
            ComponentVariant::Container(container) => {
                mounts.extend(
                    container
                        .volume_mounts
                        .iter()
                        .map(|mount| (component, mount.name.as_str())),
                );

                for env in &container.env {
                    if RESERVED_ENV_VARS.contains(&env.name.as_str()) {
                        report.push(ValidationError::ReservedEnv {
                            env: env.name.clone(),
                            component: component.name.clone(),
                        });
                    }
                }

                for error in validate_resources(&component.name, container) {
                    report.push(error);
                }

                if container.dedicated_pod == Some(false) {
                    if let Some(annotation) = &container.annotation {
                        for error in annotations.record(annotation) {
                            report.push(resolve_import_attributes(error, &component.attributes));
                        }
                    }
                }

                for error in validate_endpoints(&component.name, &container.endpoints, &mut endpoints)
                {
                    report.push(resolve_import_attributes(error, &component.attributes));
                }
            }
            ComponentVariant::Volume(volume) => {
                volumes.insert(component.name.as_str());
                if !volume.size.is_empty() {
                    if let Err(err) = Quantity::parse(&volume.size) {
                        report.push(resolve_import_attributes(
                            ValidationError::InvalidVolume {
                                name: component.name.clone(),
                                size: volume.size.clone(),
                                reason: err.to_string(),
                            },
                            &component.attributes,
                        ));
                    }
                }
            }
            ComponentVariant::Kubernetes(manifest) | ComponentVariant::Openshift(manifest) => {
                let uri = &manifest.location.uri;
                if !uri.is_empty() {
                    if let Err(err) = validate_uri(uri) {
                        report.push(resolve_import_attributes(
                            ValidationError::InvalidComponent {
                                name: component.name.clone(),
                                reason: err.to_string(),
                            },
                            &component.attributes,
                        ));
                    }
                }

                for error in validate_endpoints(&component.name, &manifest.endpoints, &mut endpoints)
                {
                    report.push(resolve_import_attributes(error, &component.attributes));
                }
            }
            ComponentVariant::Image(image) => {
                let git = image
                    .image
                    .dockerfile
                    .as_ref()
                    .and_then(|dockerfile| dockerfile.src.git.as_ref());
                if let Some(git) = git {
                    if let Err(error) = validate_single_remote_git_src(
                        GitObjectType::Component,
                        &component.name,
                        &git.source,
                    ) {
                        report.push(resolve_import_attributes(error, &component.attributes));
                    }
                }
            }
            ComponentVariant::Plugin(plugin) => {
                if !plugin.registry_url.is_empty() {
                    if let Err(err) = validate_uri(&plugin.registry_url) {
                        report.push(resolve_import_attributes(
                            ValidationError::InvalidComponent {
                                name: component.name.clone(),
                                reason: err.to_string(),
                            },
                            &component.attributes,
                        ));
                    }
                }
            }
            ComponentVariant::Custom(_) => {}
        }
    }

    let missing: Vec<MissingVolumeMount> = mounts
        .into_iter()
        .filter(|(_, volume)| !volumes.contains(volume))
        .map(|(component, volume)| MissingVolumeMount {
            volume: volume.to_string(),
            component: component.name.clone(),
            provenance: ImportProvenance::from_attributes(&component.attributes),
        })
        .collect();
    if !missing.is_empty() {
        report.push(ValidationError::MissingVolumeMounts { mounts: missing });
    }

    debug!(
        "Checked {} components ({} violations)",
        components.len(),
        report.len()
    );
    report.into_result()
}

/// Endpoint names and target ports recorded so far across all components
#[derive(Debug, Default)]
pub struct SeenEndpoints {
    names: HashSet<String>,
    ports: HashSet<u32>,
}

/// Check one component's endpoints against everything recorded so far, then record them
pub fn validate_endpoints(
    component: &str,
    endpoints: &[Endpoint],
    seen: &mut SeenEndpoints,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for endpoint in endpoints {
        if seen.names.contains(&endpoint.name) {
            errors.push(ValidationError::DuplicateEndpointName {
                name: endpoint.name.clone(),
                component: component.to_string(),
            });
        }
        if seen.ports.contains(&endpoint.target_port) {
            errors.push(ValidationError::DuplicateEndpointPort {
                port: endpoint.target_port,
                component: component.to_string(),
            });
        }

        seen.names.insert(endpoint.name.clone());
        seen.ports.insert(endpoint.target_port);
    }

    errors
}

/// Parse the container's resource settings and compare each request to its limit
fn validate_resources(component: &str, container: &ContainerComponent) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut parse = |resource: ResourceKind, value: &str| -> Option<Quantity> {
        if value.is_empty() {
            return None;
        }
        match Quantity::parse(value) {
            Ok(quantity) => Some(quantity),
            Err(err) => {
                errors.push(ValidationError::ResourceRequirement {
                    component: component.to_string(),
                    resource,
                    reason: err.to_string(),
                });
                None
            }
        }
    };

    let memory_limit = parse(ResourceKind::MemoryLimit, &container.memory_limit);
    let cpu_limit = parse(ResourceKind::CpuLimit, &container.cpu_limit);
    let memory_request = parse(ResourceKind::MemoryRequest, &container.memory_request);
    let cpu_request = parse(ResourceKind::CpuRequest, &container.cpu_request);

    let pairs = [
        (ResourceKind::MemoryRequest, memory_request, ResourceKind::MemoryLimit, memory_limit),
        (ResourceKind::CpuRequest, cpu_request, ResourceKind::CpuLimit, cpu_limit),
    ];
    for (request_kind, request, limit_kind, limit) in pairs {
        // Unset or zero limits accept any request
        let (Some(request), Some(limit)) = (request, limit) else {
            continue;
        };
        if !limit.is_zero() && request > limit {
            errors.push(ValidationError::InvalidResourceRequest {
                component: component.to_string(),
                request: request_kind,
                limit: limit_kind,
            });
        }
    }

    errors
}

/// Annotation values declared by containers that share the default pod
#[derive(Debug, Default)]
struct SeenAnnotations {
    values: BTreeMap<(AnnotationType, String), String>,
    reported: HashSet<(AnnotationType, String)>,
}

impl SeenAnnotations {
    fn record(&mut self, annotation: &Annotation) -> Vec<ValidationError> {
        let entries = annotation
            .deployment
            .iter()
            .map(|entry| (AnnotationType::Deployment, entry))
            .chain(
                annotation
                    .service
                    .iter()
                    .map(|entry| (AnnotationType::Service, entry)),
            );

        let mut errors = Vec::new();
        for (annotation_type, (key, value)) in entries {
            let slot = (annotation_type, key.clone());
            match self.values.get(&slot) {
                Some(existing) if existing != value => {
                    if self.reported.insert(slot) {
                        errors.push(ValidationError::AnnotationConflict {
                            annotation_type,
                            key: key.clone(),
                        });
                    }
                }
                Some(_) => {}
                None => {
                    self.values.insert(slot, value.clone());
                }
            }
        }
        errors
    }
}
