use std::sync::mpsc;

#[derive(Debug)]
pub(crate) enum WorkerPoll<T> {
    Ready(T),
    Pending,
    /// The worker thread ended without reporting, e.g. it panicked.
    Lost,
}

/// Receiving end of a background job. Dropping it discards whatever the job produces.
#[derive(Debug)]
pub(crate) struct WorkerHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> WorkerHandle<T> {
    pub(crate) fn try_take(&self) -> WorkerPoll<T> {
        match self.rx.try_recv() {
            Ok(result) => WorkerPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => WorkerPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => WorkerPoll::Lost,
        }
    }

    /// Blocks until the job reports or its thread goes away.
    pub(crate) fn wait(&self) -> WorkerPoll<T> {
        match self.rx.recv() {
            Ok(result) => WorkerPoll::Ready(result),
            Err(mpsc::RecvError) => WorkerPoll::Lost,
        }
    }
}

pub(crate) fn spawn_worker<T, W>(work: W) -> WorkerHandle<T>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });
    WorkerHandle { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

    #[test]
    fn worker_result_is_delivered_once() {
        let handle = spawn_worker(|| 21 * 2);
        assert!(matches!(handle.wait(), WorkerPoll::Ready(42)));
        assert!(matches!(handle.try_take(), WorkerPoll::Lost));
    }

    #[test]
    fn try_take_reports_pending_until_work_finishes() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let handle = spawn_worker(move || {
            let _ = release_rx.recv();
            "done"
        });
        assert!(matches!(handle.try_take(), WorkerPoll::Pending));
        release_tx.send(()).unwrap();

        loop {
            match handle.try_take() {
                WorkerPoll::Ready(value) => {
                    assert_eq!(value, "done");
                    break;
                }
                WorkerPoll::Pending => std::thread::sleep(RESULT_POLL_INTERVAL),
                WorkerPoll::Lost => panic!("worker should report"),
            }
        }
    }

    #[test]
    fn panicking_worker_is_reported_lost() {
        let handle: WorkerHandle<u8> = spawn_worker(|| panic!("boom"));
        assert!(matches!(handle.wait(), WorkerPoll::Lost));
    }
}
