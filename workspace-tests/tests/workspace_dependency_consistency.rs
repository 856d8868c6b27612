use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Every member that uses a shared dependency inherits it from the root
/// manifest with `workspace = true`.
#[cfg(test)]
mod workspace_dependency_tests {
    use super::*;

    fn get_workspace_dependencies() -> Vec<&'static str> {
        vec![
            "tokio",
            "axum",
            "tower",
            "tower-http",
            "async-trait",
            "url",
            "serde",
            "serde_json",
            "thiserror",
            "anyhow",
            "tracing",
            "tracing-subscriber",
            "uuid",
            "clap",
            "proptest",
            "reqwest",
        ]
    }

    fn read_manifest(path: &str) -> anyhow::Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    // Dependency name -> whether it inherits from the workspace
    fn parse_cargo_toml_dependencies(content: &str) -> HashMap<String, bool> {
        let mut dependencies = HashMap::new();
        let mut in_dependencies_section = false;

        for line in content.lines() {
            let line = line.trim();

            if line.starts_with('[') && line.ends_with(']') {
                in_dependencies_section = matches!(
                    line,
                    "[dependencies]" | "[dev-dependencies]" | "[build-dependencies]"
                );
                continue;
            }

            if in_dependencies_section && !line.is_empty() && !line.starts_with('#') {
                if let Some(eq_pos) = line.find('=') {
                    let dep_name = line[..eq_pos].trim().to_string();
                    let dep_value = line[eq_pos + 1..].trim();
                    dependencies.insert(dep_name, dep_value.contains("workspace = true"));
                }
            }
        }

        dependencies
    }

    proptest! {
        #[test]
        fn test_workspace_dependency_consistency(
            crate_name in prop::sample::select(vec!["lab-common", "lab-core", "vuln-lab", "workspace-tests"])
        ) {
            let cargo_toml_path = format!("../{}/Cargo.toml", crate_name);
            prop_assume!(Path::new(&cargo_toml_path).exists());

            let content = read_manifest(&cargo_toml_path)
                .map_err(|e| proptest::test_runner::TestCaseError::fail(
                    format!("Failed to read {}: {}", cargo_toml_path, e)
                ))?;
            let crate_deps = parse_cargo_toml_dependencies(&content);

            for dep_name in get_workspace_dependencies() {
                if let Some(&uses_workspace) = crate_deps.get(dep_name) {
                    prop_assert!(
                        uses_workspace,
                        "Crate '{}' uses dependency '{}' without 'workspace = true'",
                        crate_name,
                        dep_name
                    );
                }
            }
        }
    }

    #[test]
    fn test_parser_distinguishes_inherited_versions() {
        let manifest = r#"
[package]
name = "test-crate"

[dependencies]
tokio = "1.0"
axum = { workspace = true }

[dev-dependencies]
proptest = { workspace = true }
"#;
        let parsed = parse_cargo_toml_dependencies(manifest);
        assert_eq!(parsed.get("tokio"), Some(&false));
        assert_eq!(parsed.get("axum"), Some(&true));
        assert_eq!(parsed.get("proptest"), Some(&true));
        assert!(!parsed.contains_key("name"));
    }
}
