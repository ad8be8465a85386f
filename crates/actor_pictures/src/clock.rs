use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationProfileError {
    #[error("an animation needs at least one pattern")]
    NoPatterns,
    #[error("an animation needs at least one repeat phase")]
    NoRepeats,
    #[error("pattern {position} has a zero tick count")]
    ZeroPatternCount { position: usize },
    #[error("repeat phase {phase} has a zero duration")]
    ZeroRepeatDuration { phase: usize },
}

/// Timing for a sprite sheet of horizontal frames.
///
/// Within repeat phase `p` one tick lasts `repeat_durations[p]` frames and
/// pattern `i` is held for `pattern_counts[i]` ticks. A phase ends after one
/// full pattern cycle; the loop ends after the last phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationProfile {
    pattern_counts: Vec<u32>,
    repeat_durations: Vec<u32>,
}

impl Default for AnimationProfile {
    fn default() -> Self {
        Self::static_frame()
    }
}

impl AnimationProfile {
    pub fn new(
        pattern_counts: Vec<u32>,
        repeat_durations: Vec<u32>,
    ) -> Result<Self, AnimationProfileError> {
        if pattern_counts.is_empty() {
            return Err(AnimationProfileError::NoPatterns);
        }
        if repeat_durations.is_empty() {
            return Err(AnimationProfileError::NoRepeats);
        }
        if let Some(position) = pattern_counts.iter().position(|count| *count == 0) {
            return Err(AnimationProfileError::ZeroPatternCount { position });
        }
        if let Some(phase) = repeat_durations.iter().position(|duration| *duration == 0) {
            return Err(AnimationProfileError::ZeroRepeatDuration { phase });
        }
        Ok(Self {
            pattern_counts,
            repeat_durations,
        })
    }

    pub fn static_frame() -> Self {
        Self {
            pattern_counts: vec![1],
            repeat_durations: vec![1],
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_counts.len()
    }

    pub fn repeat_count(&self) -> usize {
        self.repeat_durations.len()
    }

    pub fn pattern_counts(&self) -> &[u32] {
        &self.pattern_counts
    }

    pub fn repeat_durations(&self) -> &[u32] {
        &self.repeat_durations
    }

    pub fn is_animated(&self) -> bool {
        self.pattern_count() > 1
    }

    fn ticks_per_cycle(&self) -> u64 {
        self.pattern_counts
            .iter()
            .fold(0u64, |total, count| total.saturating_add(u64::from(*count)))
    }

    pub fn phase_frames(&self, phase: usize) -> u64 {
        self.repeat_durations
            .get(phase)
            .map(|duration| u64::from(*duration).saturating_mul(self.ticks_per_cycle()))
            .unwrap_or(0)
    }

    /// Frames in one full loop over every repeat phase. Saturates at
    /// `u64::MAX` and is never zero.
    pub fn loop_frames(&self) -> u64 {
        (0..self.repeat_count())
            .fold(0u64, |total, phase| total.saturating_add(self.phase_frames(phase)))
            .max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockPosition {
    pub phase: usize,
    pub pattern: usize,
}

pub fn position_at(profile: &AnimationProfile, elapsed_frames: u64) -> ClockPosition {
    if !profile.is_animated() {
        return ClockPosition::default();
    }

    let mut remaining = elapsed_frames % profile.loop_frames();
    for (phase, duration) in profile.repeat_durations.iter().enumerate() {
        let phase_frames = profile.phase_frames(phase);
        if remaining >= phase_frames {
            remaining -= phase_frames;
            continue;
        }

        let mut tick = remaining / u64::from(*duration);
        for (pattern, count) in profile.pattern_counts.iter().enumerate() {
            let count = u64::from(*count);
            if tick < count {
                return ClockPosition { phase, pattern };
            }
            tick -= count;
        }
    }
    ClockPosition::default()
}

/// Horizontal frame index to sample after `elapsed_frames`.
pub fn frame_at(profile: &AnimationProfile, elapsed_frames: u64) -> usize {
    position_at(profile, elapsed_frames).pattern
}

/// Elapsed-frame counter shared by every picture drawn with it. It does not
/// hold a profile, so the resolved picture may change between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationClock {
    elapsed_frames: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    pub fn tick(&mut self) {
        self.elapsed_frames = self.elapsed_frames.wrapping_add(1);
    }

    pub fn reset(&mut self) {
        self.elapsed_frames = 0;
    }

    pub fn frame(&self, profile: &AnimationProfile) -> usize {
        frame_at(profile, self.elapsed_frames)
    }

    pub fn position(&self, profile: &AnimationProfile) -> ClockPosition {
        position_at(profile, self.elapsed_frames)
    }
}
