use super::*;

const DEVFILE: &str = r#"
schemaVersion: 2.2.0
metadata:
  name: nodejs
components:
  - name: runtime
    container:
      image: node:18
      endpoints:
        - name: http
          targetPort: 3000
      volumeMounts:
        - name: cache
          path: /cache
  - name: cache
    volume:
      size: 1Gi
  - name: deploy
    kubernetes:
      uri: deploy/k8s.yaml
commands:
  - id: install
    exec:
      component: runtime
      commandLine: npm install
      group:
        kind: build
        isDefault: true
  - id: all
    composite:
      commands: [install]
events:
  postStart: [install]
projects:
  - name: app
    git:
      remotes:
        origin: https://github.com/example/app.git
      checkoutFrom:
        remote: origin
"#;

#[test]
fn test_decode_devfile() {
    let devfile = Devfile::from_yaml(DEVFILE).unwrap();

    assert_eq!(devfile.schema_version, "2.2.0");
    assert_eq!(devfile.components.len(), 3);
    assert_eq!(devfile.commands.len(), 2);
    assert_eq!(devfile.events().post_start, vec!["install"]);

    let container = devfile.components[0].union.container.as_ref().unwrap();
    assert_eq!(container.endpoints[0].target_port, 3000);
    assert_eq!(container.volume_mounts[0].name, "cache");

    let kubernetes = devfile.components[2].union.kubernetes.as_ref().unwrap();
    assert_eq!(kubernetes.location.uri, "deploy/k8s.yaml");

    let group = devfile.commands[0].group().unwrap();
    assert_eq!(group.kind, GroupKind::Build);
    assert!(group.is_default);
}

#[test]
fn test_normalize_sets_discriminators() {
    let mut devfile = Devfile::from_yaml(DEVFILE).unwrap();
    devfile.normalize().unwrap();

    assert_eq!(devfile.commands[0].union.command_type, "Exec");
    assert_eq!(devfile.commands[1].union.command_type, "Composite");
    assert_eq!(devfile.components[0].union.component_type, "Container");
    assert_eq!(devfile.components[1].union.component_type, "Volume");
    let kubernetes = devfile.components[2].union.kubernetes.as_ref().unwrap();
    assert_eq!(kubernetes.location.location_type, "Uri");
    assert_eq!(devfile.projects[0].source.source_type, "Git");
}

#[test]
fn test_normalize_rejects_ambiguous_command() {
    let yaml = r#"
commands:
  - id: broken
    exec:
      component: runtime
    apply:
      component: runtime
"#;
    let mut devfile = Devfile::from_yaml(yaml).unwrap();
    let err = devfile.normalize().unwrap_err();
    assert_eq!(
        err.to_string(),
        "command \"broken\": only one union member should be set: CommandUnion"
    );
}

#[test]
fn test_normalize_tolerates_empty_union() {
    let yaml = r#"
commands:
  - id: nothing
"#;
    let mut devfile = Devfile::from_yaml(yaml).unwrap();
    devfile.normalize().unwrap();
    assert!(devfile.commands[0].variant().unwrap().is_none());
}

#[test]
fn test_normalize_with_preset_discriminator_drops_other_members() {
    let yaml = r#"
components:
  - name: mixed
    componentType: Volume
    volume: {}
    container:
      image: busybox
"#;
    let mut devfile = Devfile::from_yaml(yaml).unwrap();
    devfile.normalize().unwrap();
    let component = &devfile.components[0];
    assert!(component.union.container.is_none());
    assert!(matches!(
        component.variant(),
        Ok(Some(ComponentVariant::Volume(_)))
    ));
}

#[test]
fn test_factories_populate_single_member() {
    let command = Command::exec("run", ExecCommand::new("tools", "make run"));
    assert_eq!(command.union.command_type, "Exec");
    assert!(command.is_exec());
    assert!(!command.is_apply());

    let component = Component::volume("data", VolumeComponent::sized("2Gi"));
    assert_eq!(component.union.component_type, "Volume");
    assert!(!component.is_container());

    let project = Project::git(
        "app",
        GitProjectSource::new([("origin", "https://example.com/app.git")]),
    );
    assert!(matches!(
        project.source.variant(),
        Ok(Some(ProjectSourceVariant::Git(_)))
    ));
}

#[test]
fn test_command_keys_compare_case_insensitively() {
    let commands = vec![
        Command::exec("Build", ExecCommand::new("tools", "make")),
        Command::exec("build", ExecCommand::new("tools", "make")),
    ];
    assert_eq!(
        find_duplicate_key(&commands).map(|c| c.id.as_str()),
        Some("build")
    );

    let components = vec![
        Component::volume("Data", VolumeComponent::default()),
        Component::volume("data", VolumeComponent::default()),
    ];
    assert!(find_duplicate_key(&components).is_none());
}

#[test]
fn test_attributes_render_strings_and_json() {
    let attributes = Attributes::new()
        .with(IMPORT_SOURCE_ATTRIBUTE, "uri: http://example.com/devfile.yaml")
        .with("count", 3);
    assert_eq!(
        attributes.get_string(IMPORT_SOURCE_ATTRIBUTE).as_deref(),
        Some("uri: http://example.com/devfile.yaml")
    );
    assert_eq!(attributes.get_string("count").as_deref(), Some("3"));
    assert!(attributes.get_string("missing").is_none());
}
