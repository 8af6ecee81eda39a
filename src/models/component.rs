use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attributes::Attributes;
use super::keyed::Keyed;
use super::project::GitLikeProjectSource;
use super::union::{Union, UnionError, impl_union, visit_union};

/// A devfile component: a name plus exactly one component body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(flatten)]
    pub union: ComponentUnion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUnion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openshift: Option<OpenshiftComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomComponent>,
}

impl_union!(ComponentUnion, "ComponentUnion", component_type, {
    "Container" => container,
    "Kubernetes" => kubernetes,
    "Openshift" => openshift,
    "Volume" => volume,
    "Image" => image,
    "Plugin" => plugin,
    "Custom" => custom,
});

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerComponent {
    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_limit: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_request: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_limit: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_request: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_sources: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_mapping: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_pod: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,

    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeMount {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployment: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub service: BTreeMap<String, String>,
}

/// A named, ported network surface exposed by a component
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,

    pub target_port: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

/// Shared shape of kubernetes and openshift components
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct K8sLikeComponent {
    #[serde(flatten)]
    pub location: K8sLikeComponentLocation,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,
}

pub type KubernetesComponent = K8sLikeComponent;
pub type OpenshiftComponent = K8sLikeComponent;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct K8sLikeComponentLocation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inlined: String,
}

impl_union!(K8sLikeComponentLocation, "K8sLikeComponentLocation", location_type, {
    "Uri" => uri,
    "Inlined" => inlined,
});

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeComponent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageComponent {
    #[serde(default)]
    pub image_name: String,

    #[serde(flatten)]
    pub image: ImageUnion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageUnion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<DockerfileImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_build: Option<bool>,
}

impl_union!(ImageUnion, "ImageUnion", image_type, {
    "Dockerfile" => dockerfile,
    "AutoBuild" => auto_build,
});

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileImage {
    #[serde(flatten)]
    pub src: DockerfileSrc,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_context: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_required: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileSrc {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub src_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devfile_registry: Option<DockerfileDevfileRegistrySource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<DockerfileGitProjectSource>,
}

impl_union!(DockerfileSrc, "DockerfileSrc", src_type, {
    "Uri" => uri,
    "DevfileRegistry" => devfile_registry,
    "Git" => git,
});

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileDevfileRegistrySource {
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registry_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileGitProjectSource {
    #[serde(flatten)]
    pub source: GitLikeProjectSource,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginComponent {
    #[serde(flatten)]
    pub reference: ImportReferenceUnion,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registry_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReferenceUnion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub import_reference_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesCustomResourceImportReference>,
}

impl_union!(ImportReferenceUnion, "ImportReferenceUnion", import_reference_type, {
    "Uri" => uri,
    "Id" => id,
    "Kubernetes" => kubernetes,
});

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KubernetesCustomResourceImportReference {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomComponent {
    #[serde(default)]
    pub component_class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_resource: Option<serde_json::Value>,
}

/// Borrowed view of the populated component body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentVariant<'a> {
    Container(&'a ContainerComponent),
    Kubernetes(&'a KubernetesComponent),
    Openshift(&'a OpenshiftComponent),
    Volume(&'a VolumeComponent),
    Image(&'a ImageComponent),
    Plugin(&'a PluginComponent),
    Custom(&'a CustomComponent),
}

impl Component {
    pub fn container(name: impl Into<String>, container: ContainerComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                container: Some(container),
                ..Default::default()
            },
        )
    }

    pub fn kubernetes(name: impl Into<String>, kubernetes: KubernetesComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                kubernetes: Some(kubernetes),
                ..Default::default()
            },
        )
    }

    pub fn openshift(name: impl Into<String>, openshift: OpenshiftComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                openshift: Some(openshift),
                ..Default::default()
            },
        )
    }

    pub fn volume(name: impl Into<String>, volume: VolumeComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                volume: Some(volume),
                ..Default::default()
            },
        )
    }

    pub fn image(name: impl Into<String>, image: ImageComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                image: Some(image),
                ..Default::default()
            },
        )
    }

    pub fn plugin(name: impl Into<String>, plugin: PluginComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                plugin: Some(plugin),
                ..Default::default()
            },
        )
    }

    pub fn custom(name: impl Into<String>, custom: CustomComponent) -> Self {
        Self::from_union(
            name,
            ComponentUnion {
                custom: Some(custom),
                ..Default::default()
            },
        )
    }

    fn from_union(name: impl Into<String>, mut union: ComponentUnion) -> Self {
        let _ = union.normalize();
        Self {
            name: name.into(),
            attributes: Attributes::default(),
            union,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The populated component body, or `None` for an empty union
    pub fn variant(&self) -> Result<Option<ComponentVariant<'_>>, UnionError> {
        let union = &self.union;
        let variant = match visit_union(union, ComponentUnion::MEMBERS)? {
            Some("Container") => union.container.as_ref().map(ComponentVariant::Container),
            Some("Kubernetes") => union.kubernetes.as_ref().map(ComponentVariant::Kubernetes),
            Some("Openshift") => union.openshift.as_ref().map(ComponentVariant::Openshift),
            Some("Volume") => union.volume.as_ref().map(ComponentVariant::Volume),
            Some("Image") => union.image.as_ref().map(ComponentVariant::Image),
            Some("Plugin") => union.plugin.as_ref().map(ComponentVariant::Plugin),
            Some("Custom") => union.custom.as_ref().map(ComponentVariant::Custom),
            _ => None,
        };
        Ok(variant)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.variant(), Ok(Some(ComponentVariant::Container(_))))
    }
}

impl ContainerComponent {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(EnvVar {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_volume_mount(mut self, name: impl Into<String>) -> Self {
        self.volume_mounts.push(VolumeMount {
            name: name.into(),
            path: String::new(),
        });
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }
}

impl Endpoint {
    pub fn new(name: impl Into<String>, target_port: u32) -> Self {
        Self {
            name: name.into(),
            target_port,
            ..Default::default()
        }
    }
}

impl K8sLikeComponent {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let mut location = K8sLikeComponentLocation {
            uri: uri.into(),
            ..Default::default()
        };
        let _ = location.normalize();
        Self {
            location,
            endpoints: Vec::new(),
        }
    }

    pub fn inlined(definition: impl Into<String>) -> Self {
        let mut location = K8sLikeComponentLocation {
            inlined: definition.into(),
            ..Default::default()
        };
        let _ = location.normalize();
        Self {
            location,
            endpoints: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }
}

impl VolumeComponent {
    pub fn sized(size: impl Into<String>) -> Self {
        Self {
            size: size.into(),
            ephemeral: None,
        }
    }
}

impl Keyed for Component {
    fn key(&self) -> &str {
        &self.name
    }
}
