// Coaching: prompt synthesis and bounded, cancellable generation.
// All model calls go through llm_client via the CoachingModel trait.

pub mod generator;
pub mod handlers;
pub mod jobs;
pub mod prompts;
pub mod synthesizer;
