//! Wire model for the transcription bridge.
//!
//! Exactly one envelope goes to stdout per run: a bare array of segments on
//! success, or an object with a single `error` field on failure. The two
//! shapes are structurally distinguishable, so no discriminant is added.

use serde::Serialize;

/// One transcribed span, in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<murmur_stt::Segment> for Segment {
    fn from(segment: murmur_stt::Segment) -> Self {
        Self {
            start: segment.start_ms as f64 / 1000.0,
            end: segment.end_ms as f64 / 1000.0,
            text: segment.text,
        }
    }
}

/// The single top-level JSON value written per run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutputEnvelope {
    Success(Vec<Segment>),
    Failure { error: String },
}

impl OutputEnvelope {
    /// Build a success envelope, preserving segment order exactly.
    pub fn success(segments: impl IntoIterator<Item = murmur_stt::Segment>) -> Self {
        Self::Success(segments.into_iter().map(Segment::from).collect())
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Serialize the envelope. Total: the envelope holds only finite floats,
    /// strings and sequences, and text passes through as raw UTF-8.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"failed to encode output"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stt_segment(start_ms: u64, end_ms: u64, text: &str) -> murmur_stt::Segment {
        murmur_stt::Segment {
            text: text.to_string(),
            start_ms,
            end_ms,
        }
    }

    #[test]
    fn success_is_a_bare_array_in_seconds() {
        let envelope = OutputEnvelope::success(vec![
            stt_segment(0, 2800, " hello world"),
            stt_segment(2800, 5100, " good bye"),
        ]);
        assert_eq!(
            envelope.to_json(),
            r#"[{"start":0.0,"end":2.8,"text":" hello world"},{"start":2.8,"end":5.1,"text":" good bye"}]"#
        );
    }

    #[test]
    fn empty_success_is_an_empty_array() {
        assert_eq!(OutputEnvelope::success(vec![]).to_json(), "[]");
    }

    #[test]
    fn failure_is_a_bare_error_object() {
        let envelope = OutputEnvelope::failure("download failed: HTTP 404");
        assert_eq!(
            envelope.to_json(),
            r#"{"error":"download failed: HTTP 404"}"#
        );
    }

    #[test]
    fn segment_order_is_preserved_verbatim() {
        // The formatter must never re-sort what the engine produced.
        let envelope = OutputEnvelope::success(vec![
            stt_segment(5000, 6000, "b"),
            stt_segment(0, 1000, "a"),
        ]);
        let json = envelope.to_json();
        assert!(json.find("\"b\"").unwrap() < json.find("\"a\"").unwrap());
    }

    #[test]
    fn text_stays_raw_utf8() {
        let envelope = OutputEnvelope::success(vec![stt_segment(0, 1000, " càfé ∞ 你好")]);
        let json = envelope.to_json();
        assert!(json.contains(" càfé ∞ 你好"));
        assert!(!json.contains("\\u"));
    }
}
