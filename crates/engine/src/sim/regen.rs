use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::assets::{GenerationError, ImageAsset, ImageGenerator};

pub type RegenResult = Result<ImageAsset, GenerationError>;

/// Asynchronous background generation as seen by the world tick: start a request, then poll
/// once per tick until a result arrives. Callers keep at most one request outstanding.
pub trait BackgroundService {
    fn request(&mut self, description: String);

    /// Non-blocking. Yields the result of the outstanding request exactly once.
    fn poll(&mut self) -> Option<RegenResult>;
}

/// Runs each request on its own thread and hands the result back over a channel. Dropping the
/// worker drops the receiver, so a result arriving afterwards is discarded.
pub struct RegenWorker {
    generator: Arc<dyn ImageGenerator>,
    pending: Option<Receiver<RegenResult>>,
    ready: Option<RegenResult>,
}

impl RegenWorker {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            pending: None,
            ready: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.ready.is_some()
    }
}

impl BackgroundService for RegenWorker {
    fn request(&mut self, description: String) {
        if self.is_busy() {
            warn!("regen_request_ignored_while_busy");
            return;
        }
        let (sender, receiver) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        let spawned = thread::Builder::new()
            .name("background-regen".to_string())
            .spawn(move || {
                let result = generator
                    .generate_background(&description)
                    .and_then(|buffer| ImageAsset::from_buffer(buffer).map_err(GenerationError::from));
                if sender.send(result).is_err() {
                    debug!("regen_result_discarded");
                }
            });

        match spawned {
            Ok(_) => self.pending = Some(receiver),
            Err(error) => {
                self.ready = Some(Err(GenerationError::failed(format!(
                    "could not start generation thread: {error}"
                ))));
            }
        }
    }

    fn poll(&mut self) -> Option<RegenResult> {
        if let Some(result) = self.ready.take() {
            return Some(result);
        }
        let receiver = self.pending.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.pending = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err(GenerationError::failed(
                    "generation thread stopped without a result",
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::assets::ProceduralGenerator;

    fn wait_for(worker: &mut RegenWorker) -> RegenResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = worker.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "worker never answered");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn worker() -> RegenWorker {
        let generator = ProceduralGenerator::new(16, 8, 6).with_blocked_terms(["lava"]);
        RegenWorker::new(Arc::new(generator))
    }

    #[test]
    fn delivers_generated_background_once() {
        let mut worker = worker();
        worker.request("green hills".to_string());
        assert!(worker.is_busy());

        let asset = wait_for(&mut worker).expect("background");
        assert_eq!((asset.width(), asset.height()), (16, 8));
        assert!(worker.poll().is_none());
        assert!(!worker.is_busy());
    }

    #[test]
    fn failures_are_delivered_as_results() {
        let mut worker = worker();
        worker.request("lava lake".to_string());
        let error = wait_for(&mut worker).expect_err("blocked");
        assert!(error.is_content_blocked());
    }

    #[test]
    fn idle_worker_polls_nothing() {
        let mut worker = worker();
        assert!(worker.poll().is_none());
    }
}
