//! Per-poll statistics.
//!
//! A [`ScanTally`] counts what one tend + scan cycle did. Sessions log it at
//! debug level after every poll.

use serde::{Deserialize, Serialize};

use crate::scan::FileOutcome;

/// Counts of what happened during one poll.
///
/// # Examples
///
/// ```
/// use pw_scanner::ScanTally;
///
/// let mut tally = ScanTally::default();
/// tally.created += 2;
/// tally.destroyed += 1;
/// assert_eq!(tally.events(), 3);
/// assert!(!tally.is_quiet());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTally {
    /// Files seen for the first time.
    pub created: usize,
    /// Files whose modification time changed.
    pub modified: usize,
    /// Files reported destroyed, by pruning or by the scanner.
    pub destroyed: usize,
    /// Files examined and found unchanged.
    pub unchanged: usize,
}

impl ScanTally {
    /// Counts one `scan_file` outcome.
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Created => self.created += 1,
            FileOutcome::Modified => self.modified += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Gone { destroyed, .. } => {
                if destroyed {
                    self.destroyed += 1;
                }
            }
        }
    }

    /// Returns the number of events emitted.
    #[inline]
    #[must_use]
    pub const fn events(&self) -> usize {
        self.created + self.modified + self.destroyed
    }

    /// Returns `true` if no event was emitted.
    #[inline]
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.events() == 0
    }
}

impl std::ops::AddAssign for ScanTally {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.modified += rhs.modified;
        self.destroyed += rhs.destroyed;
        self.unchanged += rhs.unchanged;
    }
}
