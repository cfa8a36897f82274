use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;
use wikisearch_core::{CorpusDoc, IndexBuilder, IndexMeta, SledStore, INDEX_VERSION};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the wiki search index from a directory of HTML files", long_about = None)]
struct Args {
    /// Web root; documents are read from `<www>/wiki`
    #[arg(long)]
    www: PathBuf,
    /// Index directory
    #[arg(long, default_value = "./index")]
    index: PathBuf,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    build_index(&args.www, &args.index)
}

fn build_index(www: &Path, index: &Path) -> Result<()> {
    let wiki_dir = www.join("wiki");
    anyhow::ensure!(
        wiki_dir.is_dir(),
        "document directory {} does not exist",
        wiki_dir.display()
    );

    // Build into a staging directory and swap it in once complete, so the
    // previous index stays intact if this run dies halfway and no reader
    // ever observes a partially built index.
    let staging = sibling(index, "building");
    if staging.exists() {
        tracing::warn!(path = %staging.display(), "removing leftover staging directory");
        fs::remove_dir_all(&staging)
            .with_context(|| format!("removing stale {}", staging.display()))?;
    }

    {
        let mut store = SledStore::open(&staging)
            .with_context(|| format!("opening staging index at {}", staging.display()))?;

        let corpus = html_corpus(&wiki_dir);
        tracing::info!(entries = corpus.len(), dir = %wiki_dir.display(), "scanned corpus");

        // Skipped entries are logged by the builder as they happen and the
        // totals when it finishes.
        let report = IndexBuilder::new().build(&mut store, corpus)?;

        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::new());
        store.set_meta(&IndexMeta {
            num_docs: report.indexed,
            created_at,
            version: INDEX_VERSION,
        })?;
        store.flush()?;
    }

    swap_into_place(&staging, index)?;
    tracing::info!(index = %index.display(), "index published");
    Ok(())
}

/// Scan `wiki_dir` (one level, the way the documents are laid out) for
/// `.html` files. Each file is served under the fixed `/wiki/<filename>`
/// prefix. Unreadable entries stay in the sequence as errors so the builder
/// can skip and report them.
fn html_corpus(wiki_dir: &Path) -> Vec<io::Result<CorpusDoc>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(wiki_dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                entries.push(Err(err.into()));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("html") {
            continue;
        }
        let name = match path.file_name().and_then(|s| s.to_str()) {
            Some(name) => name,
            None => continue,
        };
        let url = format!("/wiki/{name}");
        entries.push(match fs::read_to_string(path) {
            Ok(html) => Ok(CorpusDoc { url, html }),
            Err(err) => Err(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            )),
        });
    }
    entries
}

// Replace `target` with `staging`, keeping the displaced index around only
// until the rename has succeeded.
fn swap_into_place(staging: &Path, target: &Path) -> Result<()> {
    let displaced = sibling(target, "old");
    if displaced.exists() {
        fs::remove_dir_all(&displaced)
            .with_context(|| format!("removing stale {}", displaced.display()))?;
    }
    if target.exists() {
        fs::rename(target, &displaced)
            .with_context(|| format!("setting aside previous index {}", target.display()))?;
    }
    fs::rename(staging, target)
        .with_context(|| format!("publishing index to {}", target.display()))?;
    if displaced.exists() {
        fs::remove_dir_all(&displaced)
            .with_context(|| format!("removing previous index {}", displaced.display()))?;
    }
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
