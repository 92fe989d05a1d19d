//! Audio Chunker: splits long text on sentence boundaries for per-chunk
//! TTS synthesis, then recombines the results into one playable
//! container. WAV header rebuilding lives in the `wavglue` submodule per
//! the Design Notes.

mod chunker;
pub mod wavglue;

pub use chunker::{split_into_chunks, synthesize_chunked, DEFAULT_MAX_CHARS};
