// Interview recording. Append-only.

pub mod handlers;
pub mod recorder;
