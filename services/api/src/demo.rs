use crate::infra::{load_snapshot, InMemorySnapshotGateway};
use chrono::{Local, NaiveDate};
use clap::Args;
use hiring_desk::error::AppError;
use hiring_desk::workflows::recruiting::domain::parse_date;
use hiring_desk::workflows::recruiting::report::PositionStatusRow;
use hiring_desk::workflows::recruiting::sla::compute_target_date;
use hiring_desk::workflows::recruiting::{
    write_csv, CandidateId, DashboardFilter, DashboardReport, ExtensionMode, ExtensionRequest,
    Layer, RecordKind, RecruitingService, RequisitionId, ServiceError, Snapshot,
};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SlaTargetArgs {
    /// Requisition start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: NaiveDate,
    /// Job layer: Manager, Staff, or Blue Collar
    #[arg(long)]
    pub(crate) layer: String,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// JSON snapshot to report on
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Only requisitions started in this year
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Only requisitions started in this month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub(crate) month: Option<u32>,
    #[arg(long)]
    pub(crate) dept: Option<String>,
    #[arg(long)]
    pub(crate) recruiter: Option<String>,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON snapshot to export from
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Collection name, e.g. candidates or audit_log
    #[arg(long)]
    pub(crate) kind: String,
    /// Output file (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_sla_target(args: SlaTargetArgs) -> Result<(), AppError> {
    let layer = Layer::parse(&args.layer);
    let target =
        compute_target_date(Some(args.start), layer.as_ref()).map_err(ServiceError::from)?;
    println!("{target}");
    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let snapshot = load_snapshot(Some(&args.snapshot))?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let filter = DashboardFilter {
        year: args.year,
        month: args.month,
        dept: args.dept,
        recruiter: args.recruiter,
    };
    let report = DashboardReport::build(&snapshot, &filter, today);

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::InvalidRequest(err.to_string()))?;
        println!("{rendered}");
    } else {
        render_dashboard(&report);
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let kind = RecordKind::parse(&args.kind)
        .ok_or_else(|| AppError::UnknownCollection(args.kind.clone()))?;
    let snapshot = load_snapshot(Some(&args.snapshot))?;
    match args.output {
        Some(path) => write_csv(&snapshot, kind, BufWriter::new(File::create(path)?))?,
        None => write_csv(&snapshot, kind, io::stdout().lock())?,
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = Local::now().naive_local();
    let actor = "Demo (Admin)";

    let gateway = Arc::new(InMemorySnapshotGateway::seeded(sample_snapshot(today)?));
    let service = RecruitingService::connect(gateway)?;

    println!("Hiring desk demo ({today})");
    println!("\nOpen requisitions");
    for row in service.positions(None, today) {
        print_position(&row);
    }

    let req_id = RequisitionId::new("REQ-0001");
    let extension = ExtensionRequest {
        mode: ExtensionMode::Policy,
        reason: "Hiring freeze lifted late".to_string(),
        actor: actor.to_string(),
    };
    let extended = service.extend_requisition(&req_id, &extension, now)?;
    println!(
        "\nExtended {} to {} (extension #{})",
        extended.req_id,
        extended
            .target_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string()),
        extended.extension_count
    );

    let candidate_id = CandidateId::new("CAND-0001");
    let advanced = service.advance_candidate(&candidate_id, actor)?;
    println!("{} moved to {}", advanced.name, advanced.status);

    let report = service.hire_candidate(&CandidateId::new("CAND-0002"), today, actor)?;
    let steps: Vec<&str> = report.completed.iter().map(|step| step.label()).collect();
    println!(
        "Hired {} as {} ({})",
        report.candidate_id,
        report.employee_code,
        steps.join(" -> ")
    );

    let dashboard = service.dashboard(&DashboardFilter::default(), today);
    println!();
    render_dashboard(&dashboard);

    println!("\nAudit trail");
    for entry in service.snapshot().audit_log.iter().take(5) {
        println!(
            "  {} | {} | {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.user,
            entry.action
        );
    }
    Ok(())
}

fn render_dashboard(report: &DashboardReport) {
    let headline = &report.headline;
    println!("Dashboard as of {}", report.as_of);
    println!(
        "- {} open / {} closed requisitions | {} active candidates",
        headline.open_requisitions, headline.closed_requisitions, headline.active_candidates
    );
    println!(
        "- offers: {} issued, {} pending, {} accepted",
        headline.issued_offers, headline.pending_offers, headline.accepted_offers
    );
    println!(
        "- plan {}% | offer acceptance {}% | SLA {}%",
        report.gauges.plan_rate, report.gauges.offer_acceptance_rate, report.gauges.sla_rate
    );
    println!(
        "- aging: {} on track, {} at risk, {} late (1-14), {} late (15+)",
        report.aging.on_track, report.aging.at_risk, report.aging.late_low, report.aging.late_high
    );
    println!("Funnel:");
    for entry in &report.funnel {
        println!("  - {}: {}", entry.stage_label, entry.count);
    }
    for scorecard in &report.scorecards {
        println!(
            "Recruiter {}: plan {}% | offers {}% | targets {}",
            scorecard.recruiter,
            scorecard.hiring_plan_rate,
            scorecard.offer_acceptance_rate,
            if scorecard.meets_targets { "met" } else { "missed" }
        );
    }
}

fn print_position(row: &PositionStatusRow) {
    println!(
        "  - {} {} [{}] {} candidate(s) | {} | {}",
        row.req_id,
        row.title,
        row.status.label(),
        row.candidate_count,
        row.time_to_fill.summary(),
        row.sla_summary
    );
}

/// Small data set anchored on `today` so every SLA state shows up.
fn sample_snapshot(today: NaiveDate) -> Result<Snapshot, AppError> {
    let days_ago = |days: i64| (today - chrono::Duration::days(days)).to_string();
    let days_ahead = |days: i64| (today + chrono::Duration::days(days)).to_string();

    let seed = json!({
        "requisitions": [
            {
                "req_id": "REQ-0001",
                "title": "Site Engineer",
                "dept": "Engineering",
                "layer": "Staff",
                "recruiter": "Sara",
                "requester_name": "Omar Ali",
                "status": "Approved",
                "start_date": days_ago(80),
                "target_date": days_ago(5),
            },
            {
                "req_id": "REQ-0002",
                "title": "Plant Manager",
                "dept": "Operations",
                "layer": "Manager",
                "recruiter": "Hassan",
                "requester_name": "Omar Ali",
                "status": "Approved",
                "start_date": days_ago(30),
                "target_date": days_ahead(75),
            },
        ],
        "candidates": [
            {
                "id": "CAND-0001",
                "req_id": "REQ-0001",
                "name": "Lina",
                "source": "LinkedIn",
                "recruiter": "Sara",
                "status": "Phone Screen",
                "applied_date": days_ago(20),
            },
            {
                "id": "CAND-0002",
                "req_id": "REQ-0002",
                "name": "Karim",
                "source": "Referral",
                "recruiter": "Hassan",
                "status": "Job Offer Phase",
                "applied_date": days_ago(25),
            },
        ],
    });

    serde_json::from_value(seed).map_err(|err| AppError::Seed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_snapshot_covers_open_requisitions() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        let snapshot = sample_snapshot(today).expect("sample parses");
        assert_eq!(snapshot.requisitions.len(), 2);
        assert_eq!(snapshot.candidates.len(), 2);
        assert!(snapshot
            .requisitions
            .iter()
            .all(|requisition| requisition.status.is_open()));
    }

    #[test]
    fn demo_runs_end_to_end() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        run_demo(DemoArgs { today: Some(today) }).expect("demo completes");
    }
}
