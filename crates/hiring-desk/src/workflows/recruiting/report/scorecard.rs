use chrono::Datelike;
use serde::Serialize;

use super::super::domain::{Candidate, CandidateStage, Requisition, RequisitionStatus};
use super::percent;

/// Minimum percentages a recruiter is expected to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScorecardTargets {
    pub hiring_plan: u32,
    pub time_to_fill: u32,
    pub offer_acceptance: u32,
    pub interview_ratio: u32,
}

impl ScorecardTargets {
    pub const STANDARD: Self = Self {
        hiring_plan: 90,
        time_to_fill: 85,
        offer_acceptance: 90,
        interview_ratio: 10,
    };
}

/// Fills landing in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyFills {
    pub month: u32,
    pub hires: usize,
    pub titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_days_to_fill: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecruiterScorecard {
    pub recruiter: String,
    pub hiring_plan_rate: u32,
    pub time_to_fill_rate: u32,
    pub offer_acceptance_rate: u32,
    pub interview_ratio: u32,
    pub meets_targets: bool,
    /// Twelve entries, January first.
    pub monthly: Vec<MonthlyFills>,
}

impl RecruiterScorecard {
    pub fn build(recruiter: &str, requisitions: &[&Requisition], candidates: &[&Candidate]) -> Self {
        let owned: Vec<&Requisition> = requisitions
            .iter()
            .copied()
            .filter(|r| r.recruiter == recruiter)
            .collect();
        let sourced: Vec<&Candidate> = candidates
            .iter()
            .copied()
            .filter(|c| c.recruiter == recruiter)
            .collect();

        let filled = owned
            .iter()
            .filter(|r| r.status == RequisitionStatus::Filled)
            .count();

        // Only fills with both dates count towards the on-time rate.
        let dated_fills: Vec<&Requisition> = owned
            .iter()
            .copied()
            .filter(|r| {
                r.status == RequisitionStatus::Filled
                    && r.filled_date.is_some()
                    && r.target_date.is_some()
            })
            .collect();
        let on_time = dated_fills
            .iter()
            .filter(|r| r.filled_date <= r.target_date)
            .count();

        let hired = sourced
            .iter()
            .filter(|c| c.status == CandidateStage::Hired)
            .count();
        let offers = hired
            + sourced
                .iter()
                .filter(|c| c.status == CandidateStage::JobOfferPhase)
                .count();
        let interviewed = sourced
            .iter()
            .filter(|c| c.status != CandidateStage::PhoneScreen)
            .count();

        let hiring_plan_rate = percent(filled, owned.len());
        let time_to_fill_rate = percent(on_time, dated_fills.len());
        let offer_acceptance_rate = percent(hired, offers);
        let interview_ratio = percent(hired, interviewed);
        let targets = ScorecardTargets::STANDARD;

        Self {
            recruiter: recruiter.to_string(),
            hiring_plan_rate,
            time_to_fill_rate,
            offer_acceptance_rate,
            interview_ratio,
            meets_targets: hiring_plan_rate >= targets.hiring_plan
                && time_to_fill_rate >= targets.time_to_fill
                && offer_acceptance_rate >= targets.offer_acceptance
                && interview_ratio >= targets.interview_ratio,
            monthly: monthly_fills(&owned),
        }
    }
}

fn monthly_fills(requisitions: &[&Requisition]) -> Vec<MonthlyFills> {
    (1..=12)
        .map(|month| {
            let fills: Vec<&Requisition> = requisitions
                .iter()
                .copied()
                .filter(|r| r.status == RequisitionStatus::Filled)
                .filter(|r| r.filled_date.is_some_and(|date| date.month() == month))
                .collect();

            let durations: Vec<i64> = fills
                .iter()
                .filter_map(|r| Some((r.filled_date? - r.start_date?).num_days()))
                .collect();
            let avg_days_to_fill = (!durations.is_empty())
                .then(|| durations.iter().sum::<i64>() as f64 / durations.len() as f64);

            MonthlyFills {
                month,
                hires: fills.len(),
                titles: fills.iter().map(|r| r.title.clone()).collect(),
                avg_days_to_fill,
            }
        })
        .collect()
}
