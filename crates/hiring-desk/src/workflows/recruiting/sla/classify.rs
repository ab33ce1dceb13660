use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{Requisition, RequisitionStatus};

/// Lateness state of a single requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    Cancelled,
    OnTime,
    Late,
    Upcoming,
    Overdue,
    /// Open requisition without a target date.
    Undetermined,
}

impl SlaState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::OnTime => "On Time",
            Self::Late => "Late",
            Self::Upcoming => "Upcoming",
            Self::Overdue => "Overdue",
            Self::Undetermined => "Undetermined",
        }
    }
}

/// Classification result; `days` is always the absolute distance to the target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaStatus {
    pub state: SlaState,
    pub days: i64,
}

impl SlaStatus {
    const fn new(state: SlaState, days: i64) -> Self {
        Self { state, days }
    }

    /// Signed days left before the target: negative once late.
    pub fn days_remaining(&self) -> Option<i64> {
        match self.state {
            SlaState::Upcoming | SlaState::OnTime => Some(self.days),
            SlaState::Overdue | SlaState::Late => Some(-self.days),
            SlaState::Cancelled | SlaState::Undetermined => None,
        }
    }

    pub fn summary(&self) -> String {
        match self.state {
            SlaState::Cancelled => "Cancelled".to_string(),
            SlaState::OnTime => "On Time".to_string(),
            SlaState::Late => format!("Late by {} Days", self.days),
            SlaState::Upcoming => format!("{} Days Left", self.days),
            SlaState::Overdue => format!("Overdue {} Days", self.days),
            SlaState::Undetermined => "-".to_string(),
        }
    }
}

/// Classify a requisition against its target date. Filled requisitions freeze at
/// their fill date; open ones are measured against `today`.
pub fn classify_sla(requisition: &Requisition, today: NaiveDate) -> SlaStatus {
    if requisition.status == RequisitionStatus::Rejected {
        return SlaStatus::new(SlaState::Cancelled, 0);
    }

    let Some(target) = requisition.target_date else {
        return SlaStatus::new(SlaState::Undetermined, 0);
    };

    match (requisition.status, requisition.filled_date) {
        (RequisitionStatus::Filled, Some(filled)) => {
            let delta = (target - filled).num_days();
            let state = if filled <= target {
                SlaState::OnTime
            } else {
                SlaState::Late
            };
            SlaStatus::new(state, delta.abs())
        }
        _ => {
            let remaining = (target - today).num_days();
            let state = if remaining >= 0 {
                SlaState::Upcoming
            } else {
                SlaState::Overdue
            };
            SlaStatus::new(state, remaining.abs())
        }
    }
}

/// Dashboard aging category for a requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    OnTrack,
    AtRisk,
    LateLow,
    LateHigh,
}

impl AgingBucket {
    pub const AT_RISK_WINDOW_DAYS: i64 = 10;
    pub const LATE_LOW_MAX_DAYS: i64 = 14;

    pub const fn ordered() -> [Self; 4] {
        [Self::OnTrack, Self::AtRisk, Self::LateLow, Self::LateHigh]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::AtRisk => "At Risk",
            Self::LateLow => "Late (1-14 Days)",
            Self::LateHigh => "Late (15+ Days)",
        }
    }

    /// Bucket a signed day count (negative means late).
    pub const fn from_days_remaining(days: i64) -> Self {
        if days < -Self::LATE_LOW_MAX_DAYS {
            Self::LateHigh
        } else if days < 0 {
            Self::LateLow
        } else if days <= Self::AT_RISK_WINDOW_DAYS {
            Self::AtRisk
        } else {
            Self::OnTrack
        }
    }

    /// Requisitions that are cancelled or lack start/target dates are not charted.
    pub fn for_requisition(requisition: &Requisition, today: NaiveDate) -> Option<Self> {
        requisition.start_date?;
        let status = classify_sla(requisition, today);
        match status.state {
            SlaState::OnTime => Some(Self::OnTrack),
            SlaState::Late | SlaState::Upcoming | SlaState::Overdue => status
                .days_remaining()
                .map(Self::from_days_remaining),
            SlaState::Cancelled | SlaState::Undetermined => None,
        }
    }
}

/// Population counts per aging bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgingBuckets {
    pub on_track: usize,
    pub at_risk: usize,
    pub late_low: usize,
    pub late_high: usize,
}

impl AgingBuckets {
    pub fn tally<'a, I>(requisitions: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Requisition>,
    {
        let mut buckets = Self::default();
        for bucket in requisitions
            .into_iter()
            .filter_map(|requisition| AgingBucket::for_requisition(requisition, today))
        {
            buckets.add(bucket);
        }
        buckets
    }

    fn add(&mut self, bucket: AgingBucket) {
        match bucket {
            AgingBucket::OnTrack => self.on_track += 1,
            AgingBucket::AtRisk => self.at_risk += 1,
            AgingBucket::LateLow => self.late_low += 1,
            AgingBucket::LateHigh => self.late_high += 1,
        }
    }

    pub fn count(&self, bucket: AgingBucket) -> usize {
        match bucket {
            AgingBucket::OnTrack => self.on_track,
            AgingBucket::AtRisk => self.at_risk,
            AgingBucket::LateLow => self.late_low,
            AgingBucket::LateHigh => self.late_high,
        }
    }

    pub fn total(&self) -> usize {
        self.on_track + self.at_risk + self.late_low + self.late_high
    }
}
