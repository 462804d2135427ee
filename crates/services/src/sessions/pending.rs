use tokio::task::JoinHandle;

/// The single deferred transition a controller may have outstanding.
///
/// Aborting the task is best effort: the timer may already be running when
/// `cancel` is called, so the task re-checks `generation` before acting.
#[derive(Debug)]
pub(crate) struct PendingTransition {
    generation: u64,
    handle: JoinHandle<()>,
}

impl PendingTransition {
    pub(crate) fn new(generation: u64, handle: JoinHandle<()>) -> Self {
        Self { generation, handle }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn cancel(self) {
        self.handle.abort();
    }
}
