use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::super::domain::{parse_date, AuditEntry, Requisition};
use super::policy::SlaPolicy;
use super::SlaError;

/// How a requisition deadline is pushed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionMode {
    /// Re-apply the layer offset on top of the current target date.
    Policy,
    /// Add a fixed number of days to the current target date.
    Days(i64),
    /// Replace the target date outright.
    Date(NaiveDate),
}

impl FromStr for ExtensionMode {
    type Err = SlaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("policy") {
            return Ok(Self::Policy);
        }
        if let Ok(days) = trimmed.parse::<i64>() {
            return Ok(Self::Days(days));
        }
        parse_date(trimmed)
            .map(Self::Date)
            .map_err(|_| SlaError::InvalidExtensionMode(raw.to_string()))
    }
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy => f.write_str("policy"),
            Self::Days(days) => write!(f, "{days}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

impl Serialize for ExtensionMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Days(days) => serializer.serialize_i64(*days),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for ExtensionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Days(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Days(days) => Ok(Self::Days(days)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Caller input for an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRequest {
    pub mode: ExtensionMode,
    pub reason: String,
    pub actor: String,
}

/// Updated requisition and the audit entry that must be recorded alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionOutcome {
    pub requisition: Requisition,
    pub audit: AuditEntry,
}

/// Resolve the date an extension would produce. Zero or negative day counts and
/// requisitions without a target date resolve to nothing.
pub fn preview_extension(
    requisition: &Requisition,
    mode: ExtensionMode,
    policy: &SlaPolicy,
) -> Option<NaiveDate> {
    let current = requisition.target_date?;
    match mode {
        ExtensionMode::Policy => {
            Some(current + Duration::days(policy.extension_days(requisition.layer.as_ref())))
        }
        ExtensionMode::Days(days) if days > 0 => Some(current + Duration::days(days)),
        ExtensionMode::Days(_) => None,
        ExtensionMode::Date(date) => Some(date),
    }
}

/// Extend a requisition deadline. Either the date, the counter, and the audit entry
/// all change together, or the input is returned untouched through an error.
pub fn apply_extension(
    requisition: &Requisition,
    request: &ExtensionRequest,
    policy: &SlaPolicy,
    now: NaiveDateTime,
) -> Result<ExtensionOutcome, SlaError> {
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(SlaError::MissingReason);
    }

    if requisition.target_date.is_none() && !matches!(request.mode, ExtensionMode::Date(_)) {
        return Err(SlaError::MissingTargetDate(requisition.req_id.to_string()));
    }

    let new_target = match request.mode {
        ExtensionMode::Date(date) => date,
        mode => preview_extension(requisition, mode, policy)
            .ok_or(SlaError::UnresolvedExtensionDate)?,
    };

    let mut updated = requisition.clone();
    updated.target_date = Some(new_target);
    updated.extension_count += 1;

    let audit = AuditEntry::new(
        now,
        request.actor.clone(),
        format!(
            "Extended SLA for {}. Reason: {}",
            requisition.req_id, reason
        ),
    );

    Ok(ExtensionOutcome {
        requisition: updated,
        audit,
    })
}
