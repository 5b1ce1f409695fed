use super::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Approval tally for one round. `yes_count <= total_count` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeStats {
    pub yes_count: usize,
    pub total_count: usize,
}

impl SwipeStats {
    /// Rounded share of right swipes, `None` when nobody answered.
    pub fn approval_percent(&self) -> Option<u8> {
        if self.total_count == 0 {
            return None;
        }
        let percent = (self.yes_count * 100 + self.total_count / 2) / self.total_count;
        u8::try_from(percent.min(100)).ok()
    }
}

pub fn aggregate(verdicts: &[Verdict]) -> SwipeStats {
    SwipeStats {
        yes_count: verdicts.iter().filter(|v| v.swipe_right).count(),
        total_count: verdicts.len(),
    }
}
