use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Title and department recorded on an employee hired without a matching requisition.
pub const UNASSIGNED: &str = "Unassigned";
/// Manager recorded on an employee hired without a matching requisition.
pub const NO_MANAGER: &str = "-";
/// Employment status stamped on freshly hired employees.
pub const ACTIVE_EMPLOYEE: &str = "Active";

const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifier wrapper for job requisitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequisitionId(pub String);

/// Identifier wrapper for pipeline candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

/// Master-data code assigned to hired employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeCode(pub String);

macro_rules! impl_identifier {
    ($($name:ident),+) => {
        $(
            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

impl_identifier!(RequisitionId, CandidateId, EmployeeCode);

/// Seniority band that drives the SLA offset of a requisition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    Manager,
    Staff,
    BlueCollar,
    Other(String),
}

impl Layer {
    /// Parse a raw layer value. Blank input means the layer is undetermined.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match trimmed {
            "" => None,
            "Manager" => Some(Self::Manager),
            "Staff" => Some(Self::Staff),
            "Blue Collar" => Some(Self::BlueCollar),
            other => Some(Self::Other(other.to_string())),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Manager => "Manager",
            Self::Staff => "Staff",
            Self::BlueCollar => "Blue Collar",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Layer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Approval and fill lifecycle of a requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequisitionStatus {
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Filled,
    Rejected,
}

impl RequisitionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Filled => "Filled",
            Self::Rejected => "Rejected",
        }
    }

    /// Requisitions still being recruited against.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::PendingApproval | Self::Approved)
    }
}

impl FromStr for RequisitionStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "Pending Approval" => Ok(Self::PendingApproval),
            "Approved" => Ok(Self::Approved),
            "Filled" => Ok(Self::Filled),
            "Rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Candidate pipeline stage. `Rejected` sits outside the forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateStage {
    #[serde(rename = "Phone Screen")]
    PhoneScreen,
    #[serde(rename = "HR Interview")]
    HrInterview,
    #[serde(rename = "Technical Interview")]
    TechnicalInterview,
    #[serde(rename = "Job Offer Phase")]
    JobOfferPhase,
    Hired,
    Rejected,
}

impl CandidateStage {
    /// Forward pipeline order, screening through hire.
    pub const fn ordered() -> [Self; 5] {
        [
            Self::PhoneScreen,
            Self::HrInterview,
            Self::TechnicalInterview,
            Self::JobOfferPhase,
            Self::Hired,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PhoneScreen => "Phone Screen",
            Self::HrInterview => "HR Interview",
            Self::TechnicalInterview => "Technical Interview",
            Self::JobOfferPhase => "Job Offer Phase",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    /// Position in the forward order; `None` for `Rejected`.
    pub fn index(self) -> Option<usize> {
        Self::ordered().iter().position(|stage| *stage == self)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Candidates still moving through the pipeline.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Stage reached by a plain advance. `Hired` is never reachable this way.
    pub fn next(self) -> Option<Self> {
        let ordered = Self::ordered();
        let idx = self.index()?;
        if idx + 2 < ordered.len() {
            Some(ordered[idx + 1])
        } else {
            None
        }
    }

    /// Transition table for status edits arriving from outside the command layer.
    /// Hiring is excluded because it must run through the hire transaction.
    pub fn can_transition_to(self, to: Self) -> bool {
        if self == to {
            return true;
        }
        match to {
            Self::Rejected => !self.is_terminal(),
            Self::Hired => false,
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for CandidateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CandidateStage {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "Phone Screen" => Ok(Self::PhoneScreen),
            "HR Interview" => Ok(Self::HrInterview),
            "Technical Interview" => Ok(Self::TechnicalInterview),
            "Job Offer Phase" => Ok(Self::JobOfferPhase),
            "Hired" => Ok(Self::Hired),
            "Rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Raised when a status string does not name a known state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized status '{0}'")]
pub struct UnknownStatus(pub String);

/// Open job position with an SLA target fill date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    /// Left blank on creation to have the next `REQ-` id assigned.
    #[serde(default)]
    pub req_id: RequisitionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub dept: String,
    #[serde(default)]
    pub recruiter: String,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub requester_code: String,
    #[serde(
        default,
        deserialize_with = "deserialize_layer",
        skip_serializing_if = "Option::is_none"
    )]
    pub layer: Option<Layer>,
    pub status: RequisitionStatus,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub filled_date: Option<NaiveDate>,
    #[serde(default)]
    pub extension_count: u32,
    #[serde(default)]
    pub responsibilities: String,
    #[serde(default)]
    pub skills: String,
}

impl Requisition {
    /// `filled_date` is present exactly when the requisition is filled.
    pub fn fill_state_consistent(&self) -> bool {
        self.filled_date.is_some() == (self.status == RequisitionStatus::Filled)
    }
}

/// Person moving through the hiring pipeline for a requisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: CandidateId,
    #[serde(default)]
    pub req_id: RequisitionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub recruiter: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub interview_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub applied_date: Option<NaiveDate>,
    pub status: CandidateStage,
    #[serde(default)]
    pub hr_score: u8,
    #[serde(default)]
    pub tech_score: u8,
    #[serde(default)]
    pub notes: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
}

/// Master-data record created as a side effect of hiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub code: EmployeeCode,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub dept: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub recruiter: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_employee_status")]
    pub status: String,
}

fn default_employee_status() -> String {
    ACTIVE_EMPLOYEE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_training_status")]
    pub status: String,
}

fn default_training_status() -> String {
    "Planned".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReview {
    pub id: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub recruiter: String,
    #[serde(default)]
    pub referral_by: String,
    #[serde(default)]
    pub hr_score: u8,
    #[serde(default)]
    pub tech_score: u8,
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub notes: String,
}

/// Immutable audit-log line. New entries are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(with = "audit_timestamp")]
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub action: String,
}

impl AuditEntry {
    pub fn new(timestamp: NaiveDateTime, user: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            timestamp,
            user: user.into(),
            action: action.into(),
        }
    }
}

/// Snapshot collections addressable by delete and export operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Requisitions,
    Candidates,
    Employees,
    Trainings,
    PerformanceReviews,
    Referrals,
    AuditLog,
}

impl RecordKind {
    /// Resolve either the singular resource name or the collection name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "requisition" | "requisitions" => Some(Self::Requisitions),
            "candidate" | "candidates" => Some(Self::Candidates),
            "employee" | "employees" => Some(Self::Employees),
            "training" | "trainings" => Some(Self::Trainings),
            "performance" | "performance_reviews" => Some(Self::PerformanceReviews),
            "referral" | "referrals" => Some(Self::Referrals),
            "audit_log" => Some(Self::AuditLog),
            _ => None,
        }
    }

    pub const fn collection(self) -> &'static str {
        match self {
            Self::Requisitions => "requisitions",
            Self::Candidates => "candidates",
            Self::Employees => "employees",
            Self::Trainings => "trainings",
            Self::PerformanceReviews => "performance_reviews",
            Self::Referrals => "referrals",
            Self::AuditLog => "audit_log",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Requisitions => "Requisition",
            Self::Candidates => "Candidate",
            Self::Employees => "Employee",
            Self::Trainings => "Training",
            Self::PerformanceReviews => "Performance review",
            Self::Referrals => "Referral",
            Self::AuditLog => "Audit entry",
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Blank strings are treated as absent dates.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

fn deserialize_layer<'de, D>(deserializer: D) -> Result<Option<Layer>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|value| Layer::parse(&value)))
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

mod audit_timestamp {
    use super::AUDIT_TIMESTAMP_FORMAT;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(AUDIT_TIMESTAMP_FORMAT).to_string())
    }

    /// Older entries carry only a date; those are pinned to midnight.
    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, AUDIT_TIMESTAMP_FORMAT) {
            return Ok(value);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid audit timestamp '{raw}'")))
    }
}
