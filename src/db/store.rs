use anyhow::Result;

use crate::db::Database;
use crate::models::RunRecord;

/// Key-value boundary the session controller persists through.
#[allow(async_fn_in_trait)]
pub trait RunStore {
    async fn load_run(&self, run_id: &str) -> Result<Option<RunRecord>>;
    async fn save_run(&self, run_id: &str, record: &RunRecord) -> Result<()>;
}

impl RunStore for Database {
    async fn load_run(&self, run_id: &str) -> Result<Option<RunRecord>> {
        Database::load_run(self, run_id).await
    }

    async fn save_run(&self, run_id: &str, record: &RunRecord) -> Result<()> {
        Database::save_run(self, run_id, record).await
    }
}
