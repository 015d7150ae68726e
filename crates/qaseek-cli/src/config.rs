//! Configuration and path resolution for the CLI.
//!
//! All data files live in one directory:
//! - `raw_<model>.json` - documents (question, answer, link)
//! - `dataset_<model>.json` - chunk embeddings
//! - `rag_prompt.txt` - instruction used for answer synthesis
//! - `qa.log` - append-only question log
//!
//! `<model>` is the embedding model id made file-name safe, so indexes built
//! with different models sit side by side.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use qaseek_core::corpus::{chunks_file_name, documents_file_name};
use std::path::{Path, PathBuf};

/// Generation instruction file name
const PROMPT_FILENAME: &str = "rag_prompt.txt";

/// Question log file name
const LOG_FILENAME: &str = "qa.log";

/// Returns the data directory.
///
/// Uses `custom_dir` when given, otherwise the platform data location:
/// - macOS: `~/Library/Application Support/dev.qaseek.Qaseek/`
/// - Linux: `~/.local/share/qaseek/`
/// - Windows: `%APPDATA%\qaseek\Qaseek\data\`
pub fn get_data_dir(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.clone());
    }

    ProjectDirs::from("dev", "qaseek", "Qaseek")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

/// Paths of every data file for one embedding model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub documents: PathBuf,
    pub chunks: PathBuf,
    pub prompt: PathBuf,
    pub log: PathBuf,
}

impl DataFiles {
    pub fn new(data_dir: &Path, model: &str) -> Self {
        Self {
            documents: data_dir.join(documents_file_name(model)),
            chunks: data_dir.join(chunks_file_name(model)),
            prompt: data_dir.join(PROMPT_FILENAME),
            log: data_dir.join(LOG_FILENAME),
        }
    }

    /// Fails with a hint when the index has not been built yet.
    pub fn ensure_index_exists(&self) -> Result<()> {
        for path in [&self.documents, &self.chunks] {
            if !path.exists() {
                return Err(anyhow!(
                    "No index found at {}.\n\
                     Build one first with `qs build --source <dir>`.",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

/// Loads the generation instruction.
pub fn load_instruction(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file: {}", path.display()))
}
