//! Single-flight ledger: per-permission waiter sets sharing one prompt.
//!
//! A key present in the ledger means a prompt for it has been launched and
//! not yet answered. The key is removed the moment its waiters are resolved
//! or the last of them withdraws, so the next caller launches afresh.
//!
//! Each opening of a key is a distinct round, identified by the id of the
//! waiter that opened it. A prompt's reply only resolves its own round.

use std::collections::HashMap;
use tokio::sync::oneshot;

use crate::permission::Permission;

pub(crate) type WaiterId = u64;

/// Identifies one prompt round for a key.
pub(crate) type RoundId = u64;

/// One caller's pending interest in a permission's outcome.
pub(crate) struct Waiter {
    id: WaiterId,
    tx: oneshot::Sender<bool>,
}

impl Waiter {
    pub(crate) fn new(id: WaiterId, tx: oneshot::Sender<bool>) -> Self {
        Self { id, tx }
    }
}

/// Result of adding a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// First waiter; the caller must launch the prompt for `round`.
    Opened { round: RoundId },
    /// Joined an in-flight prompt; `waiters` includes the new one.
    Joined { waiters: usize },
}

struct Entry {
    round: RoundId,
    waiters: Vec<Waiter>,
}

#[derive(Default)]
pub(crate) struct SingleFlightLedger {
    entries: HashMap<Permission, Entry>,
}

impl SingleFlightLedger {
    pub(crate) fn admit(&mut self, permission: &Permission, waiter: Waiter) -> Admission {
        match self.entries.get_mut(permission) {
            Some(entry) => {
                entry.waiters.push(waiter);
                Admission::Joined {
                    waiters: entry.waiters.len(),
                }
            }
            None => {
                let round = waiter.id;
                self.entries.insert(
                    permission.clone(),
                    Entry {
                        round,
                        waiters: vec![waiter],
                    },
                );
                Admission::Opened { round }
            }
        }
    }

    /// Remove one waiter. Returns the number left on the entry, or `None`
    /// if the waiter was no longer registered (already resolved or drained).
    pub(crate) fn withdraw(&mut self, permission: &str, id: WaiterId) -> Option<usize> {
        let entry = self.entries.get_mut(permission)?;
        let position = entry.waiters.iter().position(|w| w.id == id)?;
        entry.waiters.remove(position);

        let remaining = entry.waiters.len();
        if remaining == 0 {
            self.entries.remove(permission);
        }
        Some(remaining)
    }

    /// Detach the whole waiter set for `permission`, whatever its round.
    pub(crate) fn take(&mut self, permission: &str) -> Option<Vec<Waiter>> {
        self.entries.remove(permission).map(|entry| entry.waiters)
    }

    /// Detach the waiter set for `permission` only if it is still `round`.
    pub(crate) fn take_if(&mut self, permission: &str, round: RoundId) -> Option<Vec<Waiter>> {
        if self.entries.get(permission)?.round != round {
            return None;
        }
        self.take(permission)
    }

    /// Detach every waiter set. Dropping the result cancels every waiter.
    pub(crate) fn drain(&mut self) -> Vec<Waiter> {
        self.entries
            .drain()
            .flat_map(|(_, entry)| entry.waiters)
            .collect()
    }

    pub(crate) fn waiter_count(&self, permission: &str) -> usize {
        self.entries.get(permission).map_or(0, |e| e.waiters.len())
    }

    pub(crate) fn iter_counts(&self) -> impl Iterator<Item = (&Permission, usize)> {
        self.entries.iter().map(|(p, e)| (p, e.waiters.len()))
    }
}

/// Hand the same outcome to every waiter. Returns how many were still listening.
pub(crate) fn deliver(waiters: Vec<Waiter>, granted: bool) -> usize {
    waiters
        .into_iter()
        .filter(|w| !w.tx.is_closed())
        .map(|w| w.tx.send(granted))
        .filter(Result::is_ok)
        .count()
}
