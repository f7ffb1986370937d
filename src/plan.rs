//! Turning clip placements into an edit request.
//!
//! A clip that starts at frame `f` is seamed in by dropping frame `f - 1`
//! and suppressing keyframes from `lead` frames before that seam to `trail`
//! frames after it.

use crate::config::MoshConfig;
use datamosh_avi::{EditRequest, EditWindow};
use std::collections::BTreeSet;

/// Windows and transitions accumulated from clip starts and explicit input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    pub windows: Vec<EditWindow>,
    pub transitions: BTreeSet<u32>,
    pub duplication_count: u32,
}

impl EditPlan {
    /// Derive a plan from clip start frames.
    pub fn from_clip_starts(starts: &[u32], mosh: &MoshConfig) -> Self {
        let mut plan = Self {
            duplication_count: mosh.duplication_count,
            ..Default::default()
        };

        for &start in starts {
            if start <= mosh.min_clip_frame {
                tracing::debug!(
                    "ignoring clip at frame {} (at or below {})",
                    start,
                    mosh.min_clip_frame
                );
                continue;
            }
            let seam = start - 1;
            plan.transitions.insert(seam);
            plan.windows.push(EditWindow::new(
                seam.saturating_sub(mosh.lead_frames),
                seam.saturating_add(mosh.trail_frames),
            ));
        }

        plan
    }

    /// Add explicitly requested windows.
    pub fn with_windows(mut self, windows: impl IntoIterator<Item = EditWindow>) -> Self {
        self.windows.extend(windows);
        self
    }

    /// Add explicitly requested transition frames.
    pub fn with_transitions(mut self, frames: impl IntoIterator<Item = u32>) -> Self {
        self.transitions.extend(frames);
        self
    }

    pub fn with_duplication_count(mut self, count: u32) -> Self {
        self.duplication_count = count;
        self
    }

    pub fn into_request(self) -> EditRequest {
        EditRequest {
            windows: self.windows,
            transitions: self.transitions,
            duplication_count: self.duplication_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_start_derivation() {
        let plan = EditPlan::from_clip_starts(&[120], &MoshConfig::default());
        assert_eq!(plan.transitions, BTreeSet::from([119]));
        assert_eq!(plan.windows, vec![EditWindow::new(109, 179)]);
        assert_eq!(plan.duplication_count, 0);
    }

    #[test]
    fn test_early_clips_ignored() {
        let plan = EditPlan::from_clip_starts(&[0, 5, 11], &MoshConfig::default());
        assert!(plan.into_request().is_identity());

        let plan = EditPlan::from_clip_starts(&[12], &MoshConfig::default());
        assert_eq!(plan.transitions, BTreeSet::from([11]));
        assert_eq!(plan.windows, vec![EditWindow::new(1, 71)]);
    }

    #[test]
    fn test_window_start_saturates() {
        let mosh = MoshConfig {
            lead_frames: 50,
            min_clip_frame: 0,
            ..Default::default()
        };
        let plan = EditPlan::from_clip_starts(&[20], &mosh);
        assert_eq!(plan.windows, vec![EditWindow::new(0, 79)]);
    }

    #[test]
    fn test_merge_explicit_input() {
        let request = EditPlan::from_clip_starts(&[100, 300], &MoshConfig::default())
            .with_windows([EditWindow::new(5, 8)])
            .with_transitions([42, 99])
            .with_duplication_count(2)
            .into_request();

        assert_eq!(request.windows.len(), 3);
        assert_eq!(
            request.transitions.iter().copied().collect::<Vec<_>>(),
            vec![42, 99, 299]
        );
        assert_eq!(request.duplication_count, 2);
    }
}
