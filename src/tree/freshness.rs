//! Freshness tracking.
//!
//! Every unit's effective freshness is at least the maximum modification time
//! found anywhere in its subtree. That lets the artifact gate decide whether a
//! stored artifact for a subtree is current by comparing one timestamp.
//!
//! A unit whose own freshness is `None` (inline blocks) is *derived*: it reports
//! the effective freshness of its parent. [`UnitTree::mark_fresh`] passes
//! through derived ancestors without storing anything on them, so a block always
//! reports exactly what its owning file reports.

use std::time::{SystemTime, UNIX_EPOCH};

use super::{UnitId, UnitTree};

impl UnitTree {
    /// Records that `id` reflects source modified at `timestamp` and raises
    /// stored ancestors that are older.
    ///
    /// Propagation stops at the first ancestor whose own freshness is already
    /// at least `timestamp`; everything above it was raised when that
    /// ancestor was. A derived root is the exception: it has nothing to defer
    /// to, so it stores the timestamp.
    pub fn mark_fresh(&mut self, id: UnitId, timestamp: SystemTime) {
        self.unit_mut(id).own_freshness = Some(timestamp);

        let mut current = self.unit(id).parent;
        while let Some(ancestor) = current {
            let unit = self.unit_mut(ancestor);
            match unit.own_freshness {
                Some(existing) if existing >= timestamp => break,
                Some(_) => unit.own_freshness = Some(timestamp),
                None if unit.parent.is_none() => unit.own_freshness = Some(timestamp),
                None => {}
            }
            current = unit.parent;
        }
    }

    /// Own freshness if stored, else the parent's effective freshness.
    ///
    /// A root without own freshness reports [`UNIX_EPOCH`].
    pub fn effective_freshness(&self, id: UnitId) -> SystemTime {
        let mut current = Some(id);
        while let Some(unit_id) = current {
            let unit = self.unit(unit_id);
            if let Some(timestamp) = unit.own_freshness {
                return timestamp;
            }
            current = unit.parent;
        }
        UNIX_EPOCH
    }
}
