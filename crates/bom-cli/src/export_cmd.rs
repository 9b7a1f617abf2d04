//! `bom export` command: write module BOMs as CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use bom_core::export;
use bom_core::module_file::load_module_file;
use bom_core::{ItemList, Module};

/// Write one module's CSV into `dir` under its export file name.
///
/// Returns the path written.
pub fn write_export(dir: &Path, name: &str, version: &str, items: &ItemList) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(export::file_name(name, version));

    let file = File::create(&path)
        .with_context(|| format!("cannot create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    export::write_csv(&mut writer, items)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), items = items.len(), "exported BOM");
    Ok(path)
}

/// Pick the modules to export, by exact name when `only` is given.
fn select_modules<'a>(modules: &'a [Module], only: Option<&str>) -> Result<Vec<&'a Module>> {
    match only {
        Some(name) => {
            let matched: Vec<&Module> = modules.iter().filter(|m| m.name == name).collect();
            if matched.is_empty() {
                bail!("no module named {name:?} in definition file");
            }
            Ok(matched)
        }
        None => Ok(modules.iter().collect()),
    }
}

/// Run the export command.
pub fn run_export(file: &Path, module: Option<&str>, output_dir: &Path, stdout: bool) -> Result<()> {
    let modules = load_module_file(file)
        .with_context(|| format!("failed to load modules from {}", file.display()))?;
    let selected = select_modules(&modules, module)?;

    if stdout {
        let [only] = selected.as_slice() else {
            bail!(
                "--stdout writes a single module but {} matched; use --module to pick one",
                selected.len()
            );
        };
        let mut out = std::io::stdout().lock();
        export::write_csv(&mut out, &only.items)?;
        return Ok(());
    }

    for m in &selected {
        let path = write_export(output_dir, &m.name, &m.version, &m.items)?;
        println!("Exported {} items to {}", m.items.len(), path.display());
    }

    if selected.is_empty() {
        println!("No modules in {}", file.display());
    }

    Ok(())
}
