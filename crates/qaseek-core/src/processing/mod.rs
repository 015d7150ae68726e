//! Index building: source parsing, chunking and chunk embedding.
//!
//! # Example
//!
//! ```ignore
//! use qaseek_core::chunking::WordWindowChunker;
//! use qaseek_core::processing::{parse_source, IndexingPipeline};
//!
//! let documents = parse_source(&source_text);
//! let pipeline = IndexingPipeline::new(embedder, Arc::new(WordWindowChunker::default()));
//!
//! let result = pipeline.build_chunks(&documents, 32, |progress| {
//!     println!("{:.0}% complete", progress.percent_complete());
//! })?;
//!
//! write_documents(&raw_path, &documents)?;
//! write_chunks(&dataset_path, &result.chunks)?;
//! ```

mod pipeline;
mod progress;
mod source;

pub use pipeline::{IndexingPipeline, IndexingResult};
pub use progress::IndexingProgress;
pub use source::parse_source;
