//! Semantic shortlisting: ranks consultants against a free-text query by the cosine
//! similarity of their resume embeddings.
//!
//! Embeddings come from an `EmbeddingProvider` (in production, the Gemini embedding
//! fallback chain). Nothing here touches the database; handlers load candidates.

pub mod handlers;
pub mod shortlister;
pub mod similarity;
