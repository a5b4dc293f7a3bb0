//! Identifier generation for stored entities.
//!
//! Identifiers have the shape `{prefix}{unix_millis:013}{suffix}` where the
//! suffix is four uppercase alphanumerics. They sort by creation time when
//! generated at least a millisecond apart. Uniqueness is not guaranteed: the
//! storage layer conditions every write on the key not existing, so a
//! collision surfaces as a failed write rather than an overwrite.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

pub const SERVICE_ID_PREFIX: &str = "SVC";
pub const FORM_ID_PREFIX: &str = "FRM";
pub const APPLICATION_ID_PREFIX: &str = "APP";

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 4;

/// Source of entity identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier starting with `prefix`.
    fn generate(&self, prefix: &str) -> String;
}

/// Time-ordered identifiers with a random suffix.
///
/// The millisecond component never goes backwards within one generator, even
/// if the wall clock does.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    last_millis: AtomicI64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last_millis.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let millis = self.next_millis();
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
            .collect();

        format!("{prefix}{millis:013}{suffix}")
    }
}

/// Deterministic identifiers for tests: `{prefix}{counter:013}TEST`.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}{n:013}TEST")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = TimestampIdGenerator::new().generate(SERVICE_ID_PREFIX);

        assert!(id.starts_with("SVC"));
        assert_eq!(id.len(), 3 + 13 + SUFFIX_LEN);

        let (millis, suffix) = id[3..].split_at(13);
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_ids_increase_across_milliseconds() {
        let generator = TimestampIdGenerator::new();
        let mut previous = generator.generate(FORM_ID_PREFIX);

        for _ in 0..5 {
            std::thread::sleep(Duration::from_millis(2));
            let next = generator.generate(FORM_ID_PREFIX);
            assert!(next > previous, "{next} should sort after {previous}");
            previous = next;
        }
    }

    #[test]
    fn test_millis_never_go_backwards() {
        let generator = TimestampIdGenerator::new();
        let future = Utc::now().timestamp_millis() + 60_000;
        generator.last_millis.store(future, Ordering::SeqCst);

        let id = generator.generate(APPLICATION_ID_PREFIX);

        assert_eq!(&id[3..16], format!("{future:013}"));
    }

    #[test]
    fn test_sequential_generator_is_deterministic() {
        let generator = SequentialIdGenerator::new();

        assert_eq!(generator.generate("SVC"), "SVC0000000000001TEST");
        assert_eq!(generator.generate("FRM"), "FRM0000000000002TEST");
    }
}
