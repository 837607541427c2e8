//! Epoch-gated timer queue for the mini-game's recurring processes.

use std::time::Duration;

/// Work a timer performs when it comes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Job {
    SpawnObstacle,
    ScoreTick,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: Duration,
    sequence: u64,
    epoch: u64,
    job: Job,
}

/// Pending timers ordered by due time, then by insertion.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scheduler {
    entries: Vec<Entry>,
    next_sequence: u64,
}

impl Scheduler {
    pub(crate) fn schedule(&mut self, due: Duration, epoch: u64, job: Job) {
        self.entries.push(Entry {
            due,
            sequence: self.next_sequence,
            epoch,
            job,
        });
        self.next_sequence = self.next_sequence.wrapping_add(1);
    }

    /// Removes and returns the earliest entry due at or before `now`.
    ///
    /// Entries scheduled under any epoch other than `epoch` are dropped first.
    pub(crate) fn pop_due(&mut self, now: Duration, epoch: u64) -> Option<(Duration, Job)> {
        self.entries.retain(|entry| entry.epoch == epoch);
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.sequence))
            .map(|(index, _)| index)?;
        let entry = self.entries.swap_remove(index);
        Some((entry.due, entry.job))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn pending(&self, epoch: u64) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.epoch == epoch)
            .count()
    }
}
