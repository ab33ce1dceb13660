//! Requisition SLA scenarios driven through the public policy functions: target dates,
//! classification, aging, and the three extension modes.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use hiring_desk::workflows::recruiting::sla::{apply_extension, classify_sla, compute_target_date};
use hiring_desk::workflows::recruiting::{
    AgingBucket, AgingBuckets, ExtensionMode, ExtensionRequest, Layer, Requisition,
    RequisitionStatus, SlaError, SlaPolicy, SlaState,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn noon(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(12, 0, 0).expect("valid time")
}

fn requisition(layer: &str, status: &str, start: &str, target: &str, filled: &str) -> Requisition {
    serde_json::from_value(json!({
        "req_id": "REQ-0042",
        "title": "Maintenance Lead",
        "dept": "Operations",
        "layer": layer,
        "recruiter": "Hassan",
        "status": status,
        "start_date": start,
        "target_date": target,
        "filled_date": filled,
    }))
    .expect("requisition payload parses")
}

#[test]
fn target_dates_follow_layer_offsets() {
    let start = Some(date(2024, 1, 1));
    assert_eq!(
        compute_target_date(start, Some(&Layer::Manager)),
        Ok(date(2024, 4, 15))
    );
    assert_eq!(
        compute_target_date(start, Some(&Layer::Staff)),
        Ok(date(2024, 3, 16))
    );
    assert_eq!(
        compute_target_date(start, Some(&Layer::BlueCollar)),
        Ok(date(2024, 1, 31))
    );
    assert_eq!(
        compute_target_date(None, Some(&Layer::Staff)),
        Err(SlaError::MissingStartDate)
    );
    assert_eq!(compute_target_date(start, None), Err(SlaError::MissingLayer));
}

#[test]
fn open_requisition_ages_from_upcoming_to_late_high() {
    let open = requisition("Staff", "Approved", "2024-01-01", "2024-03-16", "");
    let policy = SlaPolicy::standard();
    assert_eq!(policy.extension_days(open.layer.as_ref()), 75);

    let checkpoints = [
        (date(2024, 3, 1), SlaState::Upcoming, AgingBucket::OnTrack),
        (date(2024, 3, 10), SlaState::Upcoming, AgingBucket::AtRisk),
        (date(2024, 3, 20), SlaState::Overdue, AgingBucket::LateLow),
        (date(2024, 4, 10), SlaState::Overdue, AgingBucket::LateHigh),
    ];
    for (today, state, bucket) in checkpoints {
        let status = classify_sla(&open, today);
        assert_eq!(status.state, state, "state on {today}");
        assert_eq!(
            AgingBucket::for_requisition(&open, today),
            Some(bucket),
            "bucket on {today}"
        );
    }
}

#[test]
fn cancelled_and_filled_requisitions_tally_separately() {
    let today = date(2024, 3, 10);
    let cancelled = requisition("Staff", "Rejected", "2024-01-01", "2024-03-16", "");
    let on_time = requisition("Manager", "Filled", "2024-01-01", "2024-04-15", "2024-04-01");
    let late = requisition("Blue Collar", "Filled", "2024-01-01", "2024-01-31", "2024-02-20");
    assert_eq!(late.status, RequisitionStatus::Filled);

    let buckets = AgingBuckets::tally([&cancelled, &on_time, &late], today);
    assert_eq!(buckets.on_track, 1);
    assert_eq!(buckets.late_high, 1);
    assert_eq!(buckets.at_risk + buckets.late_low, 0);
}

#[test]
fn extensions_compound_and_leave_an_audit_trail() {
    let now = noon(date(2024, 3, 1));
    let policy = SlaPolicy::standard();
    let mut current = requisition("Staff", "Approved", "2024-01-01", "2024-03-16", "");

    let modes = [
        (ExtensionMode::Policy, date(2024, 5, 30)),
        (ExtensionMode::Days(10), date(2024, 6, 9)),
        (ExtensionMode::Date(date(2024, 7, 1)), date(2024, 7, 1)),
    ];
    for (round, (mode, expected)) in modes.into_iter().enumerate() {
        let request = ExtensionRequest {
            mode,
            reason: format!("round {}", round + 1),
            actor: "Hassan".to_string(),
        };
        let outcome = apply_extension(&current, &request, &policy, now).expect("extension applies");
        assert_eq!(outcome.requisition.target_date, Some(expected));
        assert_eq!(outcome.requisition.extension_count, round as u32 + 1);
        assert_eq!(outcome.audit.user, "Hassan");
        assert!(outcome.audit.action.contains(&format!("round {}", round + 1)));
        current = outcome.requisition;
    }
}

#[test]
fn blank_reason_leaves_requisition_untouched() {
    let original = requisition("Staff", "Approved", "2024-01-01", "2024-03-16", "");
    let request = ExtensionRequest {
        mode: ExtensionMode::Days(5),
        reason: "   ".to_string(),
        actor: "Hassan".to_string(),
    };
    let result = apply_extension(
        &original,
        &request,
        &SlaPolicy::standard(),
        noon(date(2024, 3, 1)),
    );
    assert_eq!(result.map(|outcome| outcome.requisition), Err(SlaError::MissingReason));
    assert_eq!(original.extension_count, 0);
}
