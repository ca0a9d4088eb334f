//! Analytics event types.
//!
//! Events are written by the page instrumentation and never mutated
//! afterwards. The `variantId` is kept as the raw string that was recorded so
//! both aggregation views (defaulting and strict) can be derived from it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::{Error, InputErrorCode, Result};
use crate::limits::{MAX_EVENT_PAYLOAD_BYTES, MAX_INGEST_BATCH};

/// Recognized A/B variant identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariantId {
    A,
    B,
}

impl VariantId {
    /// Fixed iteration order used for scoring and tie-breaking.
    pub const ALL: [VariantId; 2] = [VariantId::A, VariantId::B];

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    /// Parses an exact identifier. Anything else is unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket an event lands in under the strict view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantBucket {
    A,
    B,
    #[serde(rename = "unknown")]
    Unknown,
}

impl VariantBucket {
    pub const ALL: [VariantBucket; 3] = [VariantBucket::A, VariantBucket::B, VariantBucket::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a bucket name as used in query strings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl From<VariantId> for VariantBucket {
    fn from(id: VariantId) -> Self {
        match id {
            VariantId::A => Self::A,
            VariantId::B => Self::B,
        }
    }
}

/// Event kinds the aggregator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Pageview,
    Click,
    Scroll,
    Other,
}

impl EventKind {
    pub fn of(event_type: &str) -> Self {
        match event_type {
            "pageview" => Self::Pageview,
            "click" => Self::Click,
            "scroll" => Self::Scroll,
            _ => Self::Other,
        }
    }
}

/// A single analytics event as stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    /// Store-assigned document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub session_id: String,
    pub event_type: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// ISO-8601 timestamp
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl AnalyticsEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::of(&self.event_type)
    }

    /// Variant with unrecognized or missing ids folded into `A`.
    pub fn variant_or_default(&self) -> VariantId {
        self.variant_id
            .as_deref()
            .and_then(VariantId::parse)
            .unwrap_or(VariantId::A)
    }

    /// Variant with unrecognized or missing ids kept apart.
    pub fn bucket(&self) -> VariantBucket {
        self.variant_id
            .as_deref()
            .and_then(VariantId::parse)
            .map(VariantBucket::from)
            .unwrap_or(VariantBucket::Unknown)
    }

    /// Numeric `payload.scrollPercent`, if present.
    pub fn scroll_percent(&self) -> Option<f64> {
        self.payload.get("scrollPercent").and_then(Value::as_f64)
    }
}

/// Validates the serialized payload size.
fn validate_payload_size(payload: &Map<String, Value>) -> std::result::Result<(), ValidationError> {
    if payload.is_empty() {
        return Ok(());
    }

    let size = serde_json::to_vec(payload).map(|v| v.len()).unwrap_or(0);

    if size > MAX_EVENT_PAYLOAD_BYTES {
        let mut err = ValidationError::new("payload_too_large");
        err.message = Some(
            format!(
                "payload {}B exceeds {}B limit",
                size, MAX_EVENT_PAYLOAD_BYTES
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Event as posted by the instrumentation, before it is stamped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEvent {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    #[serde(default)]
    #[validate(custom(function = "validate_payload_size"))]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
}

impl IncomingEvent {
    /// Validates the event and turns it into a storable record.
    ///
    /// A missing `ts` is stamped with `now`; a present one must be RFC 3339.
    ///
    /// Stored timestamps are always UTC with millisecond precision, so string
    /// order matches time order.
    pub fn into_event(self, now: DateTime<Utc>) -> Result<AnalyticsEvent> {
        self.validate()
            .map_err(|e| Error::input(InputErrorCode::InvalidFields, e.to_string()))?;

        let ts = match self.ts {
            Some(ts) => DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| Error::validation(format!("invalid ts '{}': {}", ts, e)))?
                .with_timezone(&Utc),
            None => now,
        }
        .to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(AnalyticsEvent {
            id: None,
            session_id: self.session_id,
            event_type: self.event_type,
            payload: self.payload,
            ts,
            variant_id: self.variant_id.filter(|v| !v.is_empty()),
        })
    }
}

/// Parsed ingestion payload: a single event or an array of events.
#[derive(Debug, Clone)]
pub struct IngestBatch {
    pub events: Vec<IncomingEvent>,
}

impl IngestBatch {
    /// Parse an ingestion body.
    /// Supports:
    /// 1. Array: `[event, event, ...]`
    /// 2. Object with events: `{ "events": [...] }`
    /// 3. Single event: `{ "sessionId": "...", "eventType": "...", ... }`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::validation(format!("invalid JSON: {}", e)))?;

        let events: Vec<IncomingEvent> = match value {
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| Error::validation(format!("invalid event array: {}", e)))?,
            Value::Object(ref obj) if obj.contains_key("events") => {
                #[derive(Deserialize)]
                struct Wrapper {
                    events: Vec<IncomingEvent>,
                }
                let wrapper: Wrapper = serde_json::from_value(value)
                    .map_err(|e| Error::validation(format!("invalid batch object: {}", e)))?;
                wrapper.events
            }
            Value::Object(_) => {
                let event: IncomingEvent = serde_json::from_value(value)
                    .map_err(|e| Error::validation(format!("invalid event: {}", e)))?;
                vec![event]
            }
            _ => {
                return Err(Error::validation(
                    "expected an event object or an array of events",
                ))
            }
        };

        if events.is_empty() {
            return Err(Error::input(
                InputErrorCode::InvalidFields,
                "no events in request",
            ));
        }
        if events.len() > MAX_INGEST_BATCH {
            return Err(Error::input(
                InputErrorCode::InvalidFields,
                format!(
                    "batch has {} events, exceeds {} limit",
                    events.len(),
                    MAX_INGEST_BATCH
                ),
            ));
        }

        Ok(Self { events })
    }
}
