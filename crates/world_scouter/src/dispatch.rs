//! Hand-off onto the host's designated client context.
//!
//! Network completions and timers run on worker threads, but the detector,
//! the view and the host's location lookup may only be touched from the one
//! context that delivers ticks. Work is queued through a [`ClientThread`]
//! handle and executed when the owner of the [`ClientQueue`] drains it.

use tokio::sync::mpsc;
use tracing::{debug, trace};

type Task<S> = Box<dyn FnMut(&mut S) -> bool + Send>;

/// Creates a connected handle/queue pair.
pub fn client_thread<S>() -> (ClientThread<S>, ClientQueue<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ClientThread { tx: tx.clone() };
    let queue = ClientQueue { rx, requeue: tx };
    (handle, queue)
}

/// Cloneable, thread-safe handle for scheduling work on the client context.
pub struct ClientThread<S> {
    tx: mpsc::UnboundedSender<Task<S>>,
}

impl<S> Clone for ClientThread<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> ClientThread<S> {
    /// Runs `f` once on the next drain.
    ///
    /// Returns `false` if the queue has been dropped and the task discarded.
    pub fn invoke_later(&self, f: impl FnOnce(&mut S) + Send + 'static) -> bool {
        let mut f = Some(f);
        self.invoke_until(move |state| {
            if let Some(f) = f.take() {
                f(state);
            }
            true
        })
    }

    /// Runs `f` on every drain until it returns `true`.
    pub fn invoke_until(&self, f: impl FnMut(&mut S) -> bool + Send + 'static) -> bool {
        match self.tx.send(Box::new(f)) {
            Ok(()) => true,
            Err(_) => {
                debug!("Client queue closed, dropping task");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving end, owned by whoever runs the client context.
pub struct ClientQueue<S> {
    rx: mpsc::UnboundedReceiver<Task<S>>,
    requeue: mpsc::UnboundedSender<Task<S>>,
}

impl<S> ClientQueue<S> {
    /// Runs every task queued before this call, in order.
    ///
    /// Tasks queued while draining, and tasks asking to be retried, run on
    /// the next drain. Returns the number of tasks executed.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut batch = Vec::new();
        while let Ok(task) = self.rx.try_recv() {
            batch.push(task);
        }

        let ran = batch.len();
        for mut task in batch {
            if !task(state) {
                // The queue holds its own sender, so this cannot fail.
                let _ = self.requeue.send(task);
            }
        }

        if ran > 0 {
            trace!("Ran {} client tasks", ran);
        }
        ran
    }
}
