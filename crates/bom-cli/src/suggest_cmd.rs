//! `bom suggest` command: one suggestion fetch, printed.

use std::fmt::Write as _;

use anyhow::{Result, bail};
use clap::ValueEnum;
use tracing::{info, warn};

use bom_core::export;
use bom_core::module_file::ModuleFile;
use bom_core::suggest::{FAILURE_MESSAGE, Suggester, SuggestionRequest};
use bom_core::{DEFAULT_VERSION, Item, ItemList, Module};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading
    Table,
    /// The same CSV the editor exports
    Csv,
    /// A module definition file
    Toml,
}

/// Run the suggest command.
pub async fn run_suggest(
    suggester: &dyn Suggester,
    name: &str,
    context: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("module name is required");
    }

    let request = SuggestionRequest {
        module_name: name.to_string(),
        context: context.map(str::to_string),
    };

    let items = match suggester.suggest(&request).await {
        Ok(items) => items,
        Err(e) => {
            warn!(backend = suggester.name(), error = %e, "suggestion fetch failed");
            return Err(anyhow::Error::new(e).context(FAILURE_MESSAGE));
        }
    };
    info!(count = items.len(), "received suggestions");

    print!("{}", render(name, items, format)?);
    Ok(())
}

/// Format fetched suggestions for output.
pub fn render(name: &str, items: Vec<Item>, format: OutputFormat) -> Result<String> {
    let list = ItemList::from(items);
    match format {
        OutputFormat::Table => Ok(render_table(&list)),
        OutputFormat::Csv => Ok(export::to_csv(&list)),
        OutputFormat::Toml => {
            let module = Module::new(name, DEFAULT_VERSION, list)?;
            Ok(ModuleFile::from_modules([&module]).to_toml_string()?)
        }
    }
}

fn render_table(list: &ItemList) -> String {
    if list.is_empty() {
        return "No suggestions returned.\n".to_string();
    }

    let component_width = list
        .iter()
        .map(|i| i.component.chars().count())
        .max()
        .unwrap_or(0)
        .max("Component".len());
    let value_width = list
        .iter()
        .map(|i| i.value.chars().count())
        .max()
        .unwrap_or(0)
        .max("Value".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<cw$}  {:<vw$}  {:>5}  {:>3}",
        "S.NO",
        "Component",
        "Value",
        "Total",
        "PCB",
        cw = component_width,
        vw = value_width
    );
    for item in list {
        let _ = writeln!(
            out,
            "{:>4}  {:<cw$}  {:<vw$}  {:>5}  {:>3}",
            item.serial_no,
            item.component,
            item.value,
            item.total_quantity,
            item.pcb_quantity,
            cw = component_width,
            vw = value_width
        );
    }
    out
}
