// Resume intake and analysis.
// Extraction and keyword screening are local; skill extraction and feedback go
// through the inference fallback chain.

pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod screening;
pub mod skills;
