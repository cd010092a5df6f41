use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use sqlx::{mysql::MySqlPoolOptions, MySql, Pool};
use tokio::sync::mpsc;

use crate::config::DatabaseConfig;

pub type DbPool = Pool<MySql>;
pub type DbHandle = Arc<DbPool>;

/// Opens a pool against one endpoint (master or replica). The processor is a
/// long-running daemon whose workers hold connections for whole user batches,
/// so connections are allowed to live for an hour but idle ones are pruned
/// quickly.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbHandle> {
    let url = format!(
        "mysql://{}:{}@{}:{}/{}",
        config.username, config.password, config.host, config.port, config.database
    );

    let pool = MySqlPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(5 * 60))
        .max_lifetime(Duration::from_secs(60 * 60))
        .after_connect(|conn, _| {
            Box::pin(async move {
                // The inactivity CASE and the approved_date watermark both do
                // their date arithmetic server-side; every session must agree
                // on UTC for those comparisons to hold.
                sqlx::query("set time_zone = '+00:00'").execute(conn).await?;

                Ok(())
            })
        })
        .connect(&url)
        .await?;

    Ok(Arc::new(pool))
}

/// A serialized background write lane. Statements submitted here execute in
/// submission order on the owning pool, which is what keeps per-score updates
/// ahead of the user update they belong to.
#[derive(Clone)]
pub struct QuerySubmitter {
    tx: mpsc::UnboundedSender<String>,
    pending: Arc<AtomicUsize>,
}

impl QuerySubmitter {
    pub fn new(db: DbHandle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let pending = Arc::new(AtomicUsize::new(0));

        let counter = pending.clone();
        tokio::spawn(async move {
            while let Some(statement) = rx.recv().await {
                if let Err(e) = sqlx::query(&statement).execute(db.as_ref()).await {
                    tracing::error!("background query failed: {e}");
                }

                counter.fetch_sub(1, Ordering::SeqCst);
            }
        });

        Self { tx, pending }
    }

    pub fn submit(&self, statement: String) {
        self.pending.fetch_add(1, Ordering::SeqCst);

        if self.tx.send(statement).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    pub fn num_pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Blocks until every submitted statement has been executed.
    pub async fn quiesce(&self) {
        while self.num_pending() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
