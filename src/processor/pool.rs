use std::future::Future;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::{sync::mpsc, task::JoinHandle};

/// Fixed-size task executor. Each worker drains its own FIFO queue; the
/// dispatcher hands out jobs round-robin so every worker keeps its own
/// database lane busy. The in-flight counter lets the coordinator wait for
/// quiescence between batches.
pub struct WorkerPool<T> {
    senders: Vec<mpsc::UnboundedSender<T>>,
    inflight: Arc<AtomicUsize>,
    next: usize,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new<F, Fut>(size: usize, handler: F) -> Self
    where
        F: Fn(usize, T) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let inflight = Arc::new(AtomicUsize::new(0));
        let mut senders = Vec::with_capacity(size);
        let mut workers = Vec::with_capacity(size);

        for index in 0..size {
            let (tx, mut rx) = mpsc::unbounded_channel::<T>();
            let handler = handler.clone();
            let inflight = inflight.clone();

            workers.push(tokio::spawn(async move {
                while let Some(job) = rx.recv().await {
                    handler(index, job).await;
                    inflight.fetch_sub(1, Ordering::SeqCst);
                }
            }));

            senders.push(tx);
        }

        Self {
            senders,
            inflight,
            next: 0,
            workers,
        }
    }

    pub fn enqueue(&mut self, job: T) {
        self.inflight.fetch_add(1, Ordering::SeqCst);

        if self.senders[self.next].send(job).is_err() {
            self.inflight.fetch_sub(1, Ordering::SeqCst);
        }

        self.next = (self.next + 1) % self.senders.len();
    }

    pub fn num_tasks_in_system(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Closes the queues and waits for the workers to drain them.
    pub async fn join(self) {
        drop(self.senders);

        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
