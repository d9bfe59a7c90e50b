//! Seed loading: reads graph documents from `.json`, `.yaml` and `.yml`
//! files in one directory.

use std::path::{Path, PathBuf};

use storyflow_graph::GraphDocument;
use storyflow_graph::domain::editor;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading seed documents.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("graph {graph_id} is defined twice (second copy in {path})")]
    DuplicateGraph { graph_id: String, path: PathBuf },
}

#[derive(Debug, Clone, Copy)]
enum SeedFormat {
    Json,
    Yaml,
}

fn seed_format(path: &Path) -> Option<SeedFormat> {
    match path.extension()?.to_str()? {
        "json" => Some(SeedFormat::Json),
        "yaml" | "yml" => Some(SeedFormat::Yaml),
        _ => None,
    }
}

fn parse_document(
    path: &Path,
    format: SeedFormat,
    content: &str,
) -> Result<GraphDocument, SeedError> {
    let parsed = match format {
        SeedFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        SeedFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| SeedError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Loads every seed document in `dir`, in file-name order.
///
/// Each document is reconciled so its edges and pointers agree before it is
/// returned. Files with other extensions are ignored.
///
/// # Errors
///
/// Returns `SeedError::Io` when the directory or a file cannot be read,
/// `SeedError::Parse` for a malformed document and
/// `SeedError::DuplicateGraph` when two files define the same graph id.
pub async fn load_seed_dir(dir: &Path) -> Result<Vec<GraphDocument>, SeedError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| SeedError::Io { path, source }
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error(dir))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error(dir))? {
        let path = entry.path();
        if let Some(format) = seed_format(&path) {
            files.push((path, format));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut graphs: Vec<GraphDocument> = Vec::with_capacity(files.len());
    for (path, format) in files {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(io_error(&path))?;
        let graph = editor::reconcile(&parse_document(&path, format, &content)?);
        if graphs.iter().any(|g| g.id == graph.id) {
            return Err(SeedError::DuplicateGraph {
                graph_id: graph.id,
                path,
            });
        }
        debug!(path = %path.display(), graph_id = %graph.id, "seed graph loaded");
        graphs.push(graph);
    }

    info!(dir = %dir.display(), count = graphs.len(), "seed directory loaded");
    Ok(graphs)
}
