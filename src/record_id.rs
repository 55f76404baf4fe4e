use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;
use uuid::Builder;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a record identifier.
///
/// Prefers a v4 UUID from the OS cryptographic source. When that source is
/// unavailable the id is `<epoch millis>_<hex suffix>` built from the clock and a
/// process-wide counter.
pub fn new_record_id() -> String {
    let mut bytes = [0u8; 16];
    match getrandom::fill(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(e) => {
            warn!("OS random source unavailable, using timestamp id: {e}");
            fallback_id()
        }
    }
}

fn fallback_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = (now.subsec_nanos() as u64) ^ count.rotate_left(32);
    format!("{}_{:x}", now.as_millis(), suffix)
}

/// Generates an id that is not already in `taken`.
pub fn unique_record_id<'a, I>(taken: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    loop {
        let id = new_record_id();
        if !taken.clone().into_iter().any(|existing| existing == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn generated_ids_are_uuids() {
        let id = new_record_id();
        assert!(Uuid::parse_str(&id).is_ok(), "expected uuid, got {id}");
    }

    #[test]
    fn fallback_ids_are_distinct() {
        let a = fallback_id();
        let b = fallback_id();
        assert_ne!(a, b);
        assert!(a.contains('_'));
    }

    #[test]
    fn unique_id_skips_taken_values() {
        let taken = vec![new_record_id(), new_record_id()];
        let id = unique_record_id(taken.iter().map(String::as_str));
        assert!(!taken.contains(&id));
    }
}
