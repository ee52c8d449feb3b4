use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use thiserror::Error;
use crate::executor;
use crate::model::{Entry, Group, InputField, SearchMode};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("group '{group}': invalid entry name type (expected a string or a list of strings)")]
    InvalidEntryName { group: String },
    #[error("group '{group}': bad command template {template:?}: {reason}")]
    Template { group: String, template: String, reason: String },
    #[error("group '{group}': unsupported input field command {command:?}")]
    UnsupportedSearch { group: String, command: String },
    #[error("group '{group}': failed to run generator {command:?}: {source}")]
    Generator { group: String, command: String, source: io::Error },
}

#[derive(Deserialize, Debug)]
struct CatalogFile {
    #[serde(default)]
    group: Vec<GroupDecl>,
}

#[derive(Deserialize, Debug)]
struct GroupDecl {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    entry: Option<OneOrMany<EntryDecl>>,
    input_field: Option<InputFieldDecl>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize, Debug)]
struct EntryDecl {
    name: toml::Value,
    #[serde(default)]
    name_is_command: bool,
    command: String,
}

#[derive(Deserialize, Debug)]
struct InputFieldDecl {
    name: String,
    command: String,
    #[serde(default)]
    display_text: String,
}

/// Every loaded group plus the single active search box.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub groups: Vec<Group>,
    pub input_field: InputField,
}

impl Catalog {
    /// All entries, in group order and then generation order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.groups.into_iter().flat_map(|g| g.entries).collect()
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&content)?;
    info!(
        "Catalog {:?}: {} groups, {} entries",
        path,
        catalog.groups.len(),
        catalog.entries().count()
    );
    Ok(catalog)
}

pub fn parse_catalog(content: &str) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;

    let mut groups = Vec::with_capacity(file.group.len());
    let mut input_field: Option<InputField> = None;

    for decl in file.group {
        if let Some(field) = decl.input_field {
            let mode = SearchMode::parse(&field.command).ok_or_else(|| {
                CatalogError::UnsupportedSearch {
                    group: decl.name.clone(),
                    command: field.command.clone(),
                }
            })?;
            if let Some(previous) = &input_field {
                warn!(
                    "Input field of group '{}' replaces the one from group '{}'",
                    decl.name,
                    previous.group.as_deref().unwrap_or("?")
                );
            }
            input_field = Some(InputField {
                name: field.name,
                mode,
                display_text: field.display_text,
                group: Some(decl.name.clone()),
            });
        }

        let mut entries = Vec::new();
        for entry in decl.entry.map(OneOrMany::into_vec).unwrap_or_default() {
            for name in entry_names(&decl.name, &entry)? {
                let command = render_command(&entry.command, &name).map_err(|reason| {
                    CatalogError::Template {
                        group: decl.name.clone(),
                        template: entry.command.clone(),
                        reason,
                    }
                })?;
                entries.push(Entry::new(name, command, decl.name.clone()));
            }
        }
        debug!("Group '{}' ({}): {} entries", decl.name, decl.description, entries.len());

        groups.push(Group {
            name: decl.name,
            description: decl.description,
            entries,
        });
    }

    Ok(Catalog {
        groups,
        input_field: input_field.unwrap_or_default(),
    })
}

fn entry_names(group: &str, entry: &EntryDecl) -> Result<Vec<String>, CatalogError> {
    let invalid = || CatalogError::InvalidEntryName { group: group.to_string() };

    match &entry.name {
        toml::Value::String(command) if entry.name_is_command => executor::generate_names(command)
            .map_err(|source| CatalogError::Generator {
                group: group.to_string(),
                command: command.clone(),
                source,
            }),
        _ if entry.name_is_command => Err(invalid()),
        toml::Value::String(name) => Ok(vec![name.clone()]),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

/// Substitutes `{name}` in a command template. `{{` and `}}` produce literal braces.
pub fn render_command(template: &str, name: &str) -> Result<String, String> {
    let mut out = String::with_capacity(template.len() + name.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => return Err("unterminated '{'".to_string()),
                    }
                }
                if key != "name" {
                    return Err(format!("unknown placeholder '{{{}}}'", key));
                }
                out.push_str(name);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err("single '}' in template".to_string()),
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.entries().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn substitutes_name_into_command() {
        assert_eq!(render_command("echo {name}", "foo").unwrap(), "echo foo");
        assert_eq!(render_command("open {name} --as {name}", "x").unwrap(), "open x --as x");
    }

    #[test]
    fn doubled_braces_are_literal() {
        assert_eq!(
            render_command("awk '{{print}}' {name}", "f").unwrap(),
            "awk '{print}' f"
        );
    }

    #[test]
    fn rejects_unknown_or_unbalanced_placeholders() {
        assert!(render_command("echo {other}", "x").is_err());
        assert!(render_command("echo {name", "x").is_err());
        assert!(render_command("echo }", "x").is_err());
    }

    #[test]
    fn string_and_list_names() {
        let catalog = parse_catalog(
            r#"
            [[group]]
            name = "apps"
            description = "Applications"

            [[group.entry]]
            name = "firefox"
            command = "{name}"

            [[group.entry]]
            name = ["alpha", "beta"]
            command = "echo {name}"
            "#,
        )
        .unwrap();

        assert_eq!(names(&catalog), vec!["firefox", "alpha", "beta"]);
        let beta = catalog.entries().last().unwrap();
        assert_eq!(beta.command, "echo beta");
        assert_eq!(beta.group, "apps");
        assert_eq!(catalog.groups[0].description, "Applications");
    }

    #[test]
    fn single_entry_table_is_accepted() {
        let catalog = parse_catalog(
            r#"
            [[group]]
            name = "one"
            [group.entry]
            name = "solo"
            command = "run {name}"
            "#,
        )
        .unwrap();
        assert_eq!(names(&catalog), vec!["solo"]);
    }

    #[test]
    fn groups_concatenate_in_declaration_order() {
        let catalog = parse_catalog(
            r#"
            [[group]]
            name = "first"
            [[group.entry]]
            name = ["b", "a"]
            command = "{name}"

            [[group]]
            name = "second"
            [[group.entry]]
            name = "c"
            command = "{name}"
            "#,
        )
        .unwrap();
        assert_eq!(names(&catalog), vec!["b", "a", "c"]);
        assert_eq!(catalog.groups.len(), 2);
    }

    #[test]
    fn generator_command_produces_one_entry_per_line() {
        let catalog = parse_catalog(
            r#"
            [[group]]
            name = "gen"
            [[group.entry]]
            name = "printf 'x\ny\n'"
            name_is_command = true
            command = "echo {name}"
            "#,
        )
        .unwrap();
        assert_eq!(names(&catalog), vec!["x", "y"]);
        assert_eq!(catalog.entries().next().unwrap().command, "echo x");
    }

    #[test]
    fn invalid_name_shape_is_a_config_error() {
        let err = parse_catalog(
            r#"
            [[group]]
            name = "bad"
            [[group.entry]]
            name = 42
            command = "{name}"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntryName { ref group } if group == "bad"));

        let err = parse_catalog(
            r#"
            [[group]]
            name = "bad"
            [[group.entry]]
            name = ["ls"]
            name_is_command = true
            command = "{name}"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntryName { .. }));

        let err = parse_catalog(
            r#"
            [[group]]
            name = "bad"
            [[group.entry]]
            name = ["ok", 1]
            command = "{name}"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntryName { .. }));
    }

    #[test]
    fn last_input_field_wins() {
        let catalog = parse_catalog(
            r#"
            [[group]]
            name = "a"
            [group.input_field]
            name = "first"
            command = "BUILD_IN_fuzzy"
            display_text = "First"

            [[group]]
            name = "b"
            [group.input_field]
            name = "second"
            command = "BUILD_IN_fuzzy"
            display_text = "Second"
            "#,
        )
        .unwrap();
        assert_eq!(catalog.input_field.name, "second");
        assert_eq!(catalog.input_field.display_text, "Second");
        assert_eq!(catalog.input_field.group.as_deref(), Some("b"));
    }

    #[test]
    fn missing_input_field_uses_default() {
        let catalog = parse_catalog("[[group]]\nname = \"empty\"\n").unwrap();
        assert_eq!(catalog.input_field, InputField::default());
        assert_eq!(catalog.entries().count(), 0);
    }

    #[test]
    fn unsupported_search_command_is_rejected() {
        let err = parse_catalog(
            r#"
            [[group]]
            name = "a"
            [group.input_field]
            name = "x"
            command = "grep"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedSearch { ref command, .. } if command == "grep"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        fs::write(&path, "[[group]]\nname = \"g\"\n[[group.entry]]\nname = \"n\"\ncommand = \"{name}\"\n").unwrap();
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.into_entries().len(), 1);
    }
}
