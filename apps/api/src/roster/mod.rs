// Roster: schema normalization, relationship index, history ordering, snapshot.

pub mod handlers;
pub mod history;
pub mod index;
pub mod schema;
pub mod snapshot;
