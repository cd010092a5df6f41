use anyhow::Result;

use crate::infrastructure::database::{DbHandle, QuerySubmitter};

/// Reads a progress counter; a missing or null row reads as -1.
pub async fn retrieve(db: &DbHandle, key: &str) -> Result<i64> {
    let count: Option<Option<i64>> =
        sqlx::query_scalar("select `count` from osu_counts where `name` = ?")
            .bind(key)
            .fetch_optional(db.as_ref())
            .await?;

    Ok(count.flatten().unwrap_or(-1))
}

/// Persists a progress counter on the background lane.
pub fn store(submitter: &QuerySubmitter, key: &str, value: i64) {
    submitter.submit(format!(
        "INSERT INTO `osu_counts`(`name`,`count`) VALUES('{key}',{value}) \
         ON DUPLICATE KEY UPDATE `count`=VALUES(`count`)"
    ));
}
