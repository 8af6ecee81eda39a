pub mod attributes;
pub mod command;
pub mod component;
pub mod devfile;
pub mod events;
pub mod keyed;
pub mod project;
pub mod union;

// Re-export commonly used types
pub use attributes::{
    Attributes, IMPORT_SOURCE_ATTRIBUTE, PARENT_OVERRIDE_ATTRIBUTE, PLUGIN_OVERRIDE_ATTRIBUTE,
};
pub use command::{
    ApplyCommand, Command, CommandGroup, CommandUnion, CommandVariant, CompositeCommand,
    CustomCommand, ExecCommand, GroupKind,
};
pub use component::{
    Annotation, Component, ComponentUnion, ComponentVariant, ContainerComponent, CustomComponent,
    DockerfileGitProjectSource, DockerfileImage, DockerfileSrc, Endpoint, EnvVar, ImageComponent,
    ImageUnion,
    ImportReferenceUnion, K8sLikeComponent, K8sLikeComponentLocation, KubernetesComponent,
    OpenshiftComponent, PluginComponent, VolumeComponent, VolumeMount,
};
pub use devfile::{Devfile, Metadata, NormalizeError};
pub use events::{EventPhase, Events};
pub use keyed::{Keyed, find_duplicate_key};
pub use project::{
    CheckoutFrom, CustomProjectSource, GitLikeProjectSource, GitProjectSource, Project,
    ProjectSource, ProjectSourceVariant, StarterProject, ZipProjectSource,
};
pub use union::{Union, UnionError};

#[cfg(test)]
mod tests;
