//! User account persistence.
//!
//! [`UserStore`] is the seam the services depend on. [`TursoClient`] implements
//! it over libsql, either in memory or against a local SQLite file.

pub mod traits;
pub mod turso;

pub use traits::{DatabaseProvider, NewUser, StoredIdentity, UpdateUser, UserStore};
pub use turso::TursoClient;
