use serde::{Deserialize, Serialize};

/// Numeric budgets the host hands to an [`Inspector`](crate::inspect::Inspector).
///
/// All fields have conservative defaults, and deserialization fills missing
/// fields from those defaults, so hosts can override a single knob in a JSON
/// config fragment without restating the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum container nesting depth before descent is cut off.
    pub max_depth: usize,
    /// Wall-clock budget for one top-level call, in seconds.
    pub max_seconds: f64,
    /// Traversal stops when available memory drops below this floor.
    pub memory_floor_bytes: u64,
    /// Process-lifetime cap on top-level inspection calls.
    pub max_calls: usize,
    /// Sequences longer than this render entries in simplified form.
    pub seq_threshold: usize,
    /// Rendered blocks larger than this many bytes go through the chunk store.
    pub chunk_threshold: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_seconds: 30.0,
            memory_floor_bytes: 16 * 1024 * 1024,
            max_calls: 500,
            seq_threshold: 100,
            chunk_threshold: 8192,
        }
    }
}

impl Limits {
    /// Parses limits from a JSON object, falling back to defaults for any
    /// field the object omits.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 10);
        assert_eq!(limits.max_calls, 500);
        assert!(limits.max_seconds > 0.0);
        assert!(limits.memory_floor_bytes > 0);
        assert!(limits.seq_threshold > 0);
        assert!(limits.chunk_threshold > 0);
    }

    #[test]
    fn partial_json_keeps_defaults_for_the_rest() {
        let limits = Limits::from_json_str(r#"{"max_depth": 3, "max_calls": 7}"#).unwrap();
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.max_calls, 7);
        assert_eq!(limits.seq_threshold, Limits::default().seq_threshold);
        assert_eq!(limits.chunk_threshold, Limits::default().chunk_threshold);
    }

    #[test]
    fn json_round_trip() {
        let mut limits = Limits::default();
        limits.max_seconds = 1.25;
        let text = serde_json::to_string(&limits).unwrap();
        let back = Limits::from_json_str(&text).unwrap();
        assert_eq!(back, limits);
    }
}
