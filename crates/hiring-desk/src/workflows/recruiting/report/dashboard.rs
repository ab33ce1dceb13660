use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{
    Candidate, CandidateStage, Requisition, RequisitionId, RequisitionStatus,
};
use super::super::sla::{classify_sla, AgingBuckets, SlaState, SlaStatus};
use super::super::snapshot::Snapshot;
use super::filter::DashboardFilter;
use super::percent;
use super::scorecard::RecruiterScorecard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub open_requisitions: usize,
    pub closed_requisitions: usize,
    pub active_candidates: usize,
    pub pending_offers: usize,
    pub accepted_offers: usize,
    pub issued_offers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelEntry {
    pub stage: CandidateStage,
    pub stage_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub source: String,
    pub count: usize,
}

/// Filled requisitions split by whether they met their target date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlaOutcomes {
    pub on_time: usize,
    pub late: usize,
}

/// Headline rates, as whole percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Gauges {
    pub plan_rate: u32,
    pub offer_acceptance_rate: u32,
    pub sla_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenRequisitionEntry {
    pub req_id: RequisitionId,
    pub title: String,
    pub sla: SlaStatus,
    pub sla_summary: String,
}

/// Performance ratings grouped into the four review bands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    pub needs_improvement: usize,
    pub developing: usize,
    pub proficient: usize,
    pub excellent: usize,
}

impl RatingDistribution {
    fn add(&mut self, rating: f32) {
        if rating < 2.0 {
            self.needs_improvement += 1;
        } else if rating < 3.0 {
            self.developing += 1;
        } else if rating < 4.0 {
            self.proficient += 1;
        } else {
            self.excellent += 1;
        }
    }
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub as_of: NaiveDate,
    pub filter: DashboardFilter,
    pub headline: Headline,
    pub funnel: Vec<FunnelEntry>,
    pub sources: Vec<SourceEntry>,
    pub aging: AgingBuckets,
    pub sla_outcomes: SlaOutcomes,
    pub gauges: Gauges,
    pub scorecards: Vec<RecruiterScorecard>,
    pub open_requisitions: Vec<OpenRequisitionEntry>,
    pub ratings: RatingDistribution,
    pub training_spend: f64,
}

impl DashboardReport {
    pub fn build(snapshot: &Snapshot, filter: &DashboardFilter, today: NaiveDate) -> Self {
        let (requisitions, candidates) = filter.scope(snapshot);

        let recruiters = match filter.selected_recruiter() {
            Some(recruiter) => vec![recruiter.to_string()],
            None => snapshot.recruiters(),
        };
        let scorecards = recruiters
            .iter()
            .map(|recruiter| RecruiterScorecard::build(recruiter, &requisitions, &candidates))
            .collect();

        let open_requisitions = requisitions
            .iter()
            .filter(|requisition| requisition.status.is_open())
            .map(|requisition| {
                let sla = classify_sla(requisition, today);
                OpenRequisitionEntry {
                    req_id: requisition.req_id.clone(),
                    title: requisition.title.clone(),
                    sla,
                    sla_summary: sla.summary(),
                }
            })
            .collect();

        let mut ratings = RatingDistribution::default();
        for review in &snapshot.performance_reviews {
            ratings.add(review.rating);
        }

        Self {
            as_of: today,
            filter: filter.clone(),
            headline: headline(&requisitions, &candidates),
            funnel: funnel(&candidates),
            sources: sources(&candidates),
            aging: AgingBuckets::tally(requisitions.iter().copied(), today),
            sla_outcomes: sla_outcomes(&requisitions, today),
            gauges: gauges(&requisitions, &candidates, today),
            scorecards,
            open_requisitions,
            ratings,
            training_spend: snapshot.trainings.iter().map(|training| training.cost).sum(),
        }
    }
}

fn count_stage(candidates: &[&Candidate], stage: CandidateStage) -> usize {
    candidates
        .iter()
        .filter(|candidate| candidate.status == stage)
        .count()
}

fn headline(requisitions: &[&Requisition], candidates: &[&Candidate]) -> Headline {
    let pending_offers = count_stage(candidates, CandidateStage::JobOfferPhase);
    let accepted_offers = count_stage(candidates, CandidateStage::Hired);
    Headline {
        open_requisitions: requisitions.iter().filter(|r| r.status.is_open()).count(),
        closed_requisitions: requisitions
            .iter()
            .filter(|r| r.status == RequisitionStatus::Filled)
            .count(),
        active_candidates: candidates.iter().filter(|c| c.status.is_active()).count(),
        pending_offers,
        accepted_offers,
        issued_offers: pending_offers + accepted_offers,
    }
}

fn funnel(candidates: &[&Candidate]) -> Vec<FunnelEntry> {
    CandidateStage::ordered()
        .into_iter()
        .map(|stage| FunnelEntry {
            stage,
            stage_label: stage.label(),
            count: count_stage(candidates, stage),
        })
        .collect()
}

fn sources(candidates: &[&Candidate]) -> Vec<SourceEntry> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in candidates {
        let source = candidate.source.trim();
        let source = if source.is_empty() { "Unknown" } else { source };
        *counts.entry(source).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(source, count)| SourceEntry {
            source: source.to_string(),
            count,
        })
        .collect()
}

fn sla_outcomes(requisitions: &[&Requisition], today: NaiveDate) -> SlaOutcomes {
    let mut outcomes = SlaOutcomes::default();
    for requisition in requisitions {
        match classify_sla(requisition, today).state {
            SlaState::OnTime => outcomes.on_time += 1,
            SlaState::Late => outcomes.late += 1,
            _ => {}
        }
    }
    outcomes
}

fn gauges(requisitions: &[&Requisition], candidates: &[&Candidate], today: NaiveDate) -> Gauges {
    let filled = requisitions
        .iter()
        .filter(|r| r.status == RequisitionStatus::Filled && r.filled_date.is_some())
        .count();
    let hired = count_stage(candidates, CandidateStage::Hired);
    let offers = hired + count_stage(candidates, CandidateStage::JobOfferPhase);
    let on_time = sla_outcomes(requisitions, today).on_time;

    Gauges {
        plan_rate: percent(
            requisitions
                .iter()
                .filter(|r| r.status == RequisitionStatus::Filled)
                .count(),
            requisitions.len(),
        ),
        offer_acceptance_rate: percent(hired, offers),
        sla_rate: percent(on_time, filled),
    }
}
