pub mod escrowdb;
pub mod gigdb;
pub mod profiledb;

#[cfg(test)]
pub mod memdb;

use sqlx::{Pool, Postgres};

pub use escrowdb::EscrowExt;
pub use gigdb::GigExt;
pub use profiledb::ProfileExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Everything the services need from persistence. `DBClient` is the
/// Postgres implementation; tests swap in an in-memory one.
pub trait Store: ProfileExt + GigExt + EscrowExt + Send + Sync + std::fmt::Debug {}

impl<T> Store for T where T: ProfileExt + GigExt + EscrowExt + Send + Sync + std::fmt::Debug {}
