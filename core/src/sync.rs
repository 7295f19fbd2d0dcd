use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{FutureExt, StreamExt};
use sweep_protocol::MineSnapshot;

use crate::*;

/// A session behind a mutex so player moves and remote reconciliation never
/// interleave. Clones share the same session.
#[derive(Debug)]
pub struct SharedSession<G = RandomMineGenerator> {
    inner: Arc<Mutex<GameSession<G>>>,
}

impl<G> Clone for SharedSession<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: MineGenerator> SharedSession<G> {
    pub fn new(session: GameSession<G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameSession<G>> {
        // operations validate before mutating, a poisoned session is still consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameSession<G>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn setup(&self, width: Coord, height: Coord) -> Result<()> {
        self.lock().setup(width, height)
    }

    pub fn reveal(&self, coords: Coord2) -> Result<RevealOutcome> {
        self.lock().reveal(coords)
    }

    pub fn toggle_flag(&self, coords: Coord2) -> Result<MarkOutcome> {
        self.lock().toggle_flag(coords)
    }

    pub fn surrender(&self) -> Result<()> {
        self.lock().surrender()
    }

    pub fn state(&self) -> GameState {
        self.lock().state()
    }

    pub fn observe(&self) -> Observation {
        self.lock().observe()
    }

    /// Reconciles and re-evaluates under a single lock.
    pub fn apply_snapshot(&self, snapshot: &MineSnapshot) -> Result<GameState> {
        let mut session = self.lock();
        session.reconcile(&snapshot.mine_indices)?;
        Ok(session.evaluate())
    }
}

/// Producer half of a remote mine-layout feed.
#[derive(Clone, Debug)]
pub struct FeedSender {
    sender: UnboundedSender<MineSnapshot>,
}

impl FeedSender {
    /// Returns `false` once the receiving feed is gone.
    pub fn push(&self, snapshot: MineSnapshot) -> bool {
        self.sender.unbounded_send(snapshot).is_ok()
    }
}

/// Consumer half of a remote mine-layout feed.
#[derive(Debug)]
pub struct RemoteFeed {
    receiver: UnboundedReceiver<MineSnapshot>,
}

pub fn feed_channel() -> (FeedSender, RemoteFeed) {
    let (sender, receiver) = mpsc::unbounded();
    (FeedSender { sender }, RemoteFeed { receiver })
}

impl RemoteFeed {
    /// Applies every snapshot already queued without waiting for more.
    /// Returns how many were accepted.
    pub fn drain<G: MineGenerator>(&mut self, session: &SharedSession<G>) -> usize {
        let mut applied = 0;
        while let Some(Some(snapshot)) = self.receiver.next().now_or_never() {
            applied += usize::from(apply_logged(session, &snapshot));
        }
        applied
    }

    /// Applies snapshots as they arrive until every sender is dropped.
    pub async fn run<G: MineGenerator>(mut self, session: SharedSession<G>) -> usize {
        let mut applied = 0;
        while let Some(snapshot) = self.receiver.next().await {
            applied += usize::from(apply_logged(&session, &snapshot));
        }
        log::debug!("Remote feed closed after {} snapshots", applied);
        applied
    }
}

fn apply_logged<G: MineGenerator>(session: &SharedSession<G>, snapshot: &MineSnapshot) -> bool {
    match session.apply_snapshot(snapshot) {
        Ok(state) => {
            log::debug!(
                "Applied remote layout with {} mines, state {:?}",
                snapshot.mine_indices.len(),
                state
            );
            true
        }
        Err(err) => {
            log::warn!("Rejected remote mine layout: {}", err);
            false
        }
    }
}
