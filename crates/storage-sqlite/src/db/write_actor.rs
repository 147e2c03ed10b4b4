use std::any::Any;

use diesel::SqliteConnection;
use pricewatch_core::errors::{DatabaseError, Error, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::DbPool;
use crate::errors::StorageError;

// Job executed by the writer actor against its dedicated connection.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type BoxedValue = Box<dyn Any + Send + 'static>;
type Envelope = (Job<BoxedValue>, oneshot::Sender<Result<BoxedValue>>);

/// Bounded queue depth between callers and the writer.
const WRITER_QUEUE_CAPACITY: usize = 1024;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    // Each job is type-erased to `Box<dyn Any>` and answered over a oneshot.
    tx: mpsc::Sender<Envelope>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an `Err` from the job
    /// rolls it back. Fails with [`DatabaseError::WriterUnavailable`] if the
    /// actor has stopped.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as BoxedValue)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_unavailable("writer queue is closed"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_unavailable("writer dropped the reply"))??;

        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Database(DatabaseError::Internal("unexpected writer result type".to_string())))
    }
}

fn writer_unavailable(reason: &str) -> Error {
    Error::Database(DatabaseError::WriterUnavailable(reason.to_string()))
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor holds one pooled connection for its lifetime and processes jobs
/// serially. It stops when every [`WriteHandle`] has been dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(WRITER_QUEUE_CAPACITY);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                // Dropping `rx` makes every later exec fail with WriterUnavailable
                error!(error = %e, "Writer actor could not acquire a database connection");
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<BoxedValue> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Into::into);

            // The caller may have gone away (cancelled poll); nothing to report to.
            let _ = reply_tx.send(result);
        }

        debug!("Writer actor stopped");
    });

    WriteHandle { tx }
}
