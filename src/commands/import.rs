//! Import command: compute (and optionally apply) the edit importing one
//! symbol into a file.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::open_engine;
use crate::paths;
use crate::symbol::{MatchMode, Symbol};

pub async fn run(file: &Path, name: &str, from: Option<&Path>, write: bool) -> Result<()> {
    let (root, engine) = open_engine(false).await?;
    let document = root.join(file);

    let text = fs::read_to_string(&document)
        .with_context(|| format!("Failed to read {}", document.display()))?;

    let candidates = engine
        .index()
        .get_symbols(name, false, MatchMode::Exact);
    let symbol = pick_symbol(candidates, name, from)?;

    let edit = engine.import_symbol(&document, &text, &symbol)?;
    if edit.is_noop() {
        println!("'{}' is already imported from \"{}\"", name, edit.specifier);
        return Ok(());
    }

    if write {
        fs::write(&document, edit.apply(&text))
            .with_context(|| format!("Failed to write {}", document.display()))?;
        println!("✓ Imported '{}' from \"{}\" in {}", name, edit.specifier, file.display());
    } else {
        let start = edit.edit.start_position;
        println!(
            "{}:{}:{} {:?}",
            file.display(),
            start.line + 1,
            start.character + 1,
            edit.edit.new_text
        );
    }

    Ok(())
}

fn pick_symbol(candidates: Vec<Symbol>, name: &str, from: Option<&Path>) -> Result<Symbol> {
    let wanted: Option<PathBuf> = from.map(paths::normalize);
    let mut matching: Vec<Symbol> = candidates
        .into_iter()
        .filter(|s| wanted.as_ref().map_or(true, |w| &s.module_path == w))
        .collect();

    match matching.len() {
        0 => bail!("No exported symbol named '{}' in the index", name),
        1 => Ok(matching.remove(0)),
        _ => {
            let locations: Vec<String> = matching
                .iter()
                .map(|s| format!("  {}", s.module_path.display()))
                .collect();
            bail!(
                "'{}' is exported from several files; pick one with --from:\n{}",
                name,
                locations.join("\n")
            )
        }
    }
}
