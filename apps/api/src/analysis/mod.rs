// Profile synthesis and resume analysis.
// All model calls go through llm_client; this module owns prompts and result types.

pub mod comparison;
pub mod handlers;
pub mod insights;
pub mod profile;
pub mod prompts;
