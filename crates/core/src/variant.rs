//! Persisted hero variants and the promotion state machine.
//!
//! States: `testing → live → archived`. Promotion is planned here as a full
//! set of status writes and applied by the store as one atomic batch, so the
//! collection never holds more than one `live` variant.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, InputErrorCode, Result};
use crate::suggestion::{AgentVariantSuggestion, SuggestionCopy, SuggestionMeta};

/// Lifecycle status of a persisted variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantStatus {
    Testing,
    Live,
    Archived,
}

impl VariantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Live => "live",
            Self::Archived => "archived",
        }
    }
}

/// A persisted hero variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Store-assigned document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from_variant: String,
    #[serde(flatten)]
    pub copy: SuggestionCopy,
    pub status: VariantStatus,
    pub created_by: String,
    pub meta: SuggestionMeta,
    pub created_at: String,
}

/// Request body for saving a suggestion as a new variant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    #[validate(length(min = 1, max = 64))]
    pub from_variant: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub copy: SuggestionCopy,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub meta: Option<SuggestionMeta>,
}

impl NewVariant {
    /// Wrap an agent suggestion for saving.
    pub fn from_suggestion(suggestion: AgentVariantSuggestion, created_by: impl Into<String>) -> Self {
        Self {
            from_variant: suggestion.from_variant,
            copy: suggestion.copy,
            created_by: Some(created_by.into()),
            meta: Some(suggestion.meta),
        }
    }

    /// Validate and build the stored record. New variants always enter `testing`.
    pub fn into_variant(self, now: DateTime<Utc>) -> Result<Variant> {
        self.validate()
            .map_err(|e| Error::input(InputErrorCode::InvalidFields, e.to_string()))?;

        Ok(Variant {
            id: None,
            from_variant: self.from_variant,
            copy: self.copy,
            status: VariantStatus::Testing,
            created_by: self
                .created_by
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "operator".to_string()),
            meta: self.meta.unwrap_or(SuggestionMeta {
                based_on: None,
                explanation: "Saved manually".to_string(),
            }),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// One status write in a promotion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusWrite {
    pub id: String,
    pub status: VariantStatus,
}

/// Plan `promote(target)`: the target becomes `live`, every other variant
/// `archived`.
///
/// Writes cover the whole collection, not just the variants whose status
/// changes, so a batch applied after a concurrent insert still archives
/// everything it read. Archived variants may be promoted again explicitly.
pub fn plan_promotion(variants: &[Variant], target: &str) -> Result<Vec<StatusWrite>> {
    if target.trim().is_empty() {
        return Err(Error::missing_field("id"));
    }

    if !variants.iter().any(|v| v.id.as_deref() == Some(target)) {
        return Err(Error::not_found(format!("variant '{}'", target)));
    }

    Ok(variants
        .iter()
        .filter_map(|v| v.id.as_ref())
        .map(|id| StatusWrite {
            id: id.clone(),
            status: if id == target {
                VariantStatus::Live
            } else {
                VariantStatus::Archived
            },
        })
        .collect())
}

/// Result of planning `disable-all-live`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisableOutcome {
    /// No variant was live; nothing to write
    NoOp,
    /// These variants go from `live` to `archived`
    Archive(Vec<StatusWrite>),
}

/// Plan `disable-all-live`: every `live` variant becomes `archived`.
pub fn plan_disable_live(variants: &[Variant]) -> DisableOutcome {
    let writes: Vec<StatusWrite> = variants
        .iter()
        .filter(|v| v.status == VariantStatus::Live)
        .filter_map(|v| v.id.clone())
        .map(|id| StatusWrite {
            id,
            status: VariantStatus::Archived,
        })
        .collect();

    if writes.is_empty() {
        DisableOutcome::NoOp
    } else {
        DisableOutcome::Archive(writes)
    }
}

/// The current `live` variant, if any.
pub fn live_variant(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().find(|v| v.status == VariantStatus::Live)
}
