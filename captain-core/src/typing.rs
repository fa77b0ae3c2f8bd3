use std::time::Duration;

/// Standard typing-test convention: five characters make one word.
pub const CHARS_PER_WORD: f64 = 5.0;

// Floor for the elapsed time so an instant finish doesn't divide by zero.
const MIN_MINUTES: f64 = 0.001;

pub const MAX_ACCURACY: u8 = 100;

pub fn words_per_minute(chars_typed: u32, elapsed: Duration) -> u32 {
    let words = f64::from(chars_typed) / CHARS_PER_WORD;
    let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_MINUTES);

    (words / minutes).round().min(f64::from(u32::MAX)) as u32
}

pub fn is_valid_accuracy(accuracy: u8) -> bool {
    accuracy <= MAX_ACCURACY
}
