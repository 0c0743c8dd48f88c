// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference count guarding a mesh's render-side peer.

use core::fmt;

use parking_lot::Mutex;

use crate::peer::MeshPeer;

#[derive(Default)]
struct RefState {
    count: usize,
    peer: Option<Box<dyn MeshPeer>>,
}

/// Counts how many displaying nodes reference a mesh, and owns the mesh peer.
///
/// The peer is released exactly when the count returns to zero. Increment,
/// decrement and release all happen under one lock, so a rendering thread
/// holding a clone of the surrounding `Arc` may drop its reference while the
/// application thread mutates unrelated state.
#[derive(Default)]
pub struct PeerRefCount {
    state: Mutex<RefState>,
}

impl PeerRefCount {
    /// Creates a count of zero with no peer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference. Returns the new count.
    pub fn inc_ref(&self) -> usize {
        let mut state = self.state.lock();
        state.count += 1;
        state.count
    }

    /// Drops a reference, releasing the peer when the count reaches zero.
    /// Returns the new count.
    ///
    /// Dropping a reference at zero is ignored.
    pub fn dec_ref(&self) -> usize {
        let mut state = self.state.lock();
        if state.count == 0 {
            tracing::warn!("mesh reference count decremented below zero");
            return 0;
        }
        state.count -= 1;
        if state.count == 0
            && let Some(mut peer) = state.peer.take()
        {
            tracing::debug!("releasing mesh peer");
            peer.release();
        }
        state.count
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.state.lock().count
    }

    /// Whether a peer currently exists.
    #[must_use]
    pub fn has_peer(&self) -> bool {
        self.state.lock().peer.is_some()
    }

    /// Runs `f` against the peer while holding the lock.
    ///
    /// Returns `None` without calling anything when nothing references the
    /// mesh. Otherwise the peer is created through `create` if absent, and
    /// `f` receives it along with whether it was just created.
    pub(crate) fn with_peer<R>(
        &self,
        create: impl FnOnce() -> Box<dyn MeshPeer>,
        f: impl FnOnce(&mut dyn MeshPeer, bool) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        if state.count == 0 {
            return None;
        }
        let fresh = state.peer.is_none();
        let peer = state.peer.get_or_insert_with(create);
        Some(f(peer.as_mut(), fresh))
    }
}

impl fmt::Debug for PeerRefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PeerRefCount")
            .field("count", &state.count)
            .field("has_peer", &state.peer.is_some())
            .finish()
    }
}
