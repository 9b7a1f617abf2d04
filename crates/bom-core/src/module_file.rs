//! TOML format for module definition files.
//!
//! ```toml
//! [[modules]]
//! name = "3 Inch Thermal Printer"
//! version = "V3 R1"            # optional, defaults to "V1 R1"
//!
//! [[modules.items]]
//! component = "Thermal Head"
//! value = "FTP-628"            # optional, defaults to ""
//! total_quantity = 1           # optional, defaults to 0
//! pcb_quantity = 1             # optional, defaults to 0
//! selected = false             # optional
//! ```
//!
//! Ids are not part of the format. Loading assigns fresh ids and numbers
//! items in file order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::items::ItemList;
use crate::model::{DEFAULT_VERSION, Item, Module, NewItem};

#[derive(Debug, Error)]
pub enum ModuleFileError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize modules: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("module #{index} has an empty name")]
    NameRequired { index: usize },

    #[error("item #{index} of module {module:?} has an empty component")]
    ComponentRequired { module: String, index: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level structure of a module definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFile {
    #[serde(default)]
    pub modules: Vec<ModuleToml>,
}

/// A single `[[modules]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleToml {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub items: Vec<ItemToml>,
}

/// A single `[[modules.items]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemToml {
    pub component: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub pcb_quantity: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ModuleFile {
    /// Describe existing modules in file form.
    pub fn from_modules<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Self {
        let modules = modules
            .into_iter()
            .map(|m| ModuleToml {
                name: m.name.clone(),
                version: m.version.clone(),
                items: m
                    .items
                    .iter()
                    .map(|i| ItemToml {
                        component: i.component.clone(),
                        value: i.value.clone(),
                        total_quantity: i.total_quantity,
                        pcb_quantity: i.pcb_quantity,
                        selected: i.selected,
                    })
                    .collect(),
            })
            .collect();
        Self { modules }
    }

    pub fn to_toml_string(&self) -> Result<String, ModuleFileError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate and convert into modules, preserving file order.
    pub fn into_modules(self) -> Result<Vec<Module>, ModuleFileError> {
        self.modules
            .into_iter()
            .enumerate()
            .map(|(index, m)| m.into_module(index + 1))
            .collect()
    }
}

impl ModuleToml {
    fn into_module(self, index: usize) -> Result<Module, ModuleFileError> {
        if self.name.trim().is_empty() {
            return Err(ModuleFileError::NameRequired { index });
        }

        let mut items: Vec<Item> = Vec::with_capacity(self.items.len());
        for (pos, raw) in self.items.into_iter().enumerate() {
            if raw.component.trim().is_empty() {
                return Err(ModuleFileError::ComponentRequired {
                    module: self.name,
                    index: pos + 1,
                });
            }
            let selected = raw.selected;
            let mut item = NewItem {
                component: raw.component,
                value: raw.value,
                total_quantity: raw.total_quantity,
                pcb_quantity: raw.pcb_quantity,
            }
            .into_item(0);
            item.selected = selected;
            items.push(item);
        }

        Module::new(self.name, self.version, ItemList::from(items))
            .map_err(|_| ModuleFileError::NameRequired { index })
    }
}

/// Parse and validate module definitions from a TOML string.
pub fn parse_module_file(content: &str) -> Result<Vec<Module>, ModuleFileError> {
    let file: ModuleFile = toml::from_str(content)?;
    let modules = file.into_modules()?;
    debug!(count = modules.len(), "parsed module file");
    Ok(modules)
}

/// Read and parse a module definition file.
pub fn load_module_file(path: &Path) -> Result<Vec<Module>, ModuleFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModuleFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module_file(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINTER: &str = r#"
[[modules]]
name = "3 Inch Thermal Printer"
version = "V3 R1"

[[modules.items]]
component = "Thermal Head"
value = "FTP-628"
total_quantity = 1
pcb_quantity = 1

[[modules.items]]
component = "Stepper Motor"
value = "NEMA 14"
total_quantity = 1
pcb_quantity = 1
selected = true

[[modules]]
name = "Bluetooth Module Adapter"
"#;

    #[test]
    fn parses_modules_in_file_order() {
        let modules = parse_module_file(PRINTER).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "3 Inch Thermal Printer");
        assert_eq!(modules[0].version, "V3 R1");
        assert_eq!(modules[0].items.len(), 2);
        assert_eq!(modules[1].version, "V1 R1");
        assert!(modules[1].items.is_empty());
        assert_ne!(modules[0].id, modules[1].id);
    }

    #[test]
    fn items_are_numbered_and_keep_selection() {
        let modules = parse_module_file(PRINTER).unwrap();
        let items = modules[0].items.as_slice();
        assert_eq!(items[0].serial_no, 1);
        assert_eq!(items[1].serial_no, 2);
        assert!(!items[0].selected);
        assert!(items[1].selected);
    }

    #[test]
    fn optional_item_fields_default() {
        let content = r#"
[[modules]]
name = "Adapter"

[[modules.items]]
component = "Header"
"#;
        let modules = parse_module_file(content).unwrap();
        let item = &modules[0].items.as_slice()[0];
        assert_eq!(item.value, "");
        assert_eq!(item.total_quantity, 0);
        assert_eq!(item.pcb_quantity, 0);
    }

    #[test]
    fn blank_module_name_is_rejected() {
        let content = r#"
[[modules]]
name = "Ok"

[[modules]]
name = "  "
"#;
        let err = parse_module_file(content).unwrap_err();
        assert!(matches!(err, ModuleFileError::NameRequired { index: 2 }));
    }

    #[test]
    fn blank_component_is_rejected() {
        let content = r#"
[[modules]]
name = "Hub"

[[modules.items]]
component = "MCU"

[[modules.items]]
component = ""
"#;
        let err = parse_module_file(content).unwrap_err();
        match err {
            ModuleFileError::ComponentRequired { module, index } => {
                assert_eq!(module, "Hub");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_quantity_is_a_parse_error() {
        let content = r#"
[[modules]]
name = "Hub"

[[modules.items]]
component = "MCU"
total_quantity = -1
"#;
        assert!(matches!(
            parse_module_file(content).unwrap_err(),
            ModuleFileError::Toml(_)
        ));
    }

    #[test]
    fn written_file_reads_back() {
        let modules = parse_module_file(PRINTER).unwrap();
        let text = ModuleFile::from_modules(&modules).to_toml_string().unwrap();
        let again = parse_module_file(&text).unwrap();

        assert_eq!(again.len(), modules.len());
        for (a, b) in again.iter().zip(&modules) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.version, b.version);
            let a_rows: Vec<_> = a.items.iter().map(|i| (&i.component, i.selected)).collect();
            let b_rows: Vec<_> = b.items.iter().map(|i| (&i.component, i.selected)).collect();
            assert_eq!(a_rows, b_rows);
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_module_file(&path).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
