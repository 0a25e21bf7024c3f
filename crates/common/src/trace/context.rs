//! Trace and span identifiers.
//!
//! A trace id is 128 bits and shared by every span in one logical request
//! flow; a span id is 64 bits and unique within its trace. Both are
//! rendered as fixed-width lowercase hex for log correlation, zero-padded
//! regardless of magnitude.

use rand::Rng;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// 128-bit trace identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Mint a fresh trace id from a v4 UUID.
    ///
    /// A v4 UUID carries fixed version/variant bits, so the value is
    /// guaranteed non-zero.
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_u128())
    }

    /// Construct from a raw value. Intended for tests and for continuing
    /// a trace from a decoded inbound context.
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Canonical rendering: 32 lowercase hex characters, zero-padded.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

/// 64-bit span identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Mint a fresh span id from the thread RNG, rerolling the
    /// (vanishingly unlikely) zero value.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let value = rng.gen::<u64>();
            if value != 0 {
                return Self(value);
            }
        }
    }

    /// Construct from a raw value. Intended for tests.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Canonical rendering: 16 lowercase hex characters, zero-padded.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl Serialize for TraceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl Serialize for SpanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Identifies one unit of traced work within a trace hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpanContext {
    /// Identifier shared by all spans in the same request flow.
    pub trace_id: TraceId,
    /// Identifier unique to this span within the trace.
    pub span_id: SpanId,
    /// Identifier of the enclosing span, if any.
    pub parent_span_id: Option<SpanId>,
}

impl SpanContext {
    /// Start a brand-new trace: fresh trace id, no parent.
    pub fn root() -> Self {
        Self {
            trace_id: TraceId::random(),
            span_id: SpanId::random(),
            parent_span_id: None,
        }
    }

    /// Derive a child context: the trace id is inherited unchanged and
    /// the parent's span id is recorded.
    pub fn child_of(parent: &SpanContext) -> Self {
        Self {
            trace_id: parent.trace_id,
            span_id: SpanId::random(),
            parent_span_id: Some(parent.span_id),
        }
    }

    /// Canonical hex rendering of the trace id.
    #[must_use]
    pub fn trace_id_hex(&self) -> String {
        self.trace_id.to_hex()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_id_hex_is_zero_padded_and_lowercase() {
        let id = TraceId::from_u128(0xdead_beef);
        assert_eq!(id.to_hex(), "000000000000000000000000deadbeef");
        assert_eq!(id.to_hex().len(), 32);
    }

    #[test]
    fn test_trace_id_hex_is_deterministic() {
        let id = TraceId::from_u128(42);
        assert_eq!(id.to_hex(), id.to_hex());
        assert_eq!(id.to_hex(), "0000000000000000000000000000002a");
    }

    #[test]
    fn test_trace_id_hex_full_width_value() {
        let id = TraceId::from_u128(u128::MAX);
        assert_eq!(id.to_hex(), "f".repeat(32));
    }

    #[test]
    fn test_span_id_hex_is_zero_padded() {
        let id = SpanId::from_u64(0xabc);
        assert_eq!(id.to_hex(), "0000000000000abc");
        assert_eq!(id.to_hex().len(), 16);
    }

    #[test]
    fn test_root_context_has_no_parent() {
        let ctx = SpanContext::root();
        assert!(ctx.parent_span_id.is_none());
    }

    #[test]
    fn test_distinct_roots_get_distinct_traces() {
        let a = SpanContext::root();
        let b = SpanContext::root();
        assert_ne!(a.trace_id, b.trace_id);
        assert_ne!(a.span_id, b.span_id);
    }

    #[test]
    fn test_child_inherits_trace_id_and_records_parent() {
        let parent = SpanContext::root();
        let child = SpanContext::child_of(&parent);
        assert_eq!(child.trace_id, parent.trace_id);
        assert_ne!(child.span_id, parent.span_id);
        assert_eq!(child.parent_span_id, Some(parent.span_id));
    }

    #[test]
    fn test_grandchild_keeps_the_root_trace_id() {
        let root = SpanContext::root();
        let child = SpanContext::child_of(&root);
        let grandchild = SpanContext::child_of(&child);
        assert_eq!(grandchild.trace_id, root.trace_id);
        assert_eq!(grandchild.parent_span_id, Some(child.span_id));
    }

    #[test]
    fn test_ids_serialize_as_hex_strings() {
        let ctx = SpanContext {
            trace_id: TraceId::from_u128(1),
            span_id: SpanId::from_u64(2),
            parent_span_id: None,
        };
        let json = serde_json::to_value(ctx).unwrap();
        assert_eq!(
            json["trace_id"],
            "00000000000000000000000000000001".to_string()
        );
        assert_eq!(json["span_id"], "0000000000000002".to_string());
    }
}
