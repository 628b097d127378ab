use game_types::AttemptOutcome;

/// Seconds over which a correct answer's reward decays from full value to zero.
pub const DECAY_WINDOW_SECONDS: f64 = 15.0;

pub struct ClueScorer;

impl ClueScorer {
    /// Points lost to think-time, clamped to the clue's value.
    pub fn points_lost(value: i32, elapsed_seconds: f64) -> f64 {
        let value = f64::from(value);
        let elapsed = Self::sanitize_elapsed(elapsed_seconds);
        let points_per_second = value / DECAY_WINDOW_SECONDS;
        (elapsed * points_per_second).min(value)
    }

    /// Signed integer delta for one clue attempt.
    ///
    /// `value` is the face value, or the wager for a daily double.
    pub fn score(value: i32, elapsed_seconds: f64, outcome: AttemptOutcome) -> i32 {
        match outcome {
            AttemptOutcome::Correct => {
                let remaining = f64::from(value) - Self::points_lost(value, elapsed_seconds);
                remaining.max(0.0).round() as i32
            }
            // Misses cost the full value no matter how quickly they came
            AttemptOutcome::Incorrect => value.saturating_neg(),
            AttemptOutcome::Skipped => 0,
        }
    }

    fn sanitize_elapsed(elapsed_seconds: f64) -> f64 {
        if elapsed_seconds.is_nan() || elapsed_seconds < 0.0 {
            0.0
        } else {
            elapsed_seconds
        }
    }
}
