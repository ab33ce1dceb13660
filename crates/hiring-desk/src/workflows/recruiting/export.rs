use std::fmt;
use std::io::Write;

use chrono::NaiveDate;

use super::domain::RecordKind;
use super::snapshot::Snapshot;

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Csv(err) => write!(f, "failed to write csv: {}", err),
            ExportError::Io(err) => write!(f, "failed to flush export: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Csv(err) => Some(err),
            ExportError::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

/// Download name for an exported collection, e.g. `candidates_2024-03-01.csv`.
pub fn export_file_name(kind: RecordKind, today: NaiveDate) -> String {
    format!("{}_{}.csv", kind.collection(), today)
}

/// Write one snapshot collection as CSV with a header row. Blank optional values are
/// written as empty cells.
pub fn write_csv<W: Write>(
    snapshot: &Snapshot,
    kind: RecordKind,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers(kind))?;
    for row in rows(snapshot, kind) {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(snapshot: &Snapshot, kind: RecordKind) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(snapshot, kind, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn headers(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Requisitions => &[
            "req_id",
            "title",
            "dept",
            "layer",
            "recruiter",
            "requester_name",
            "requester_code",
            "status",
            "start_date",
            "target_date",
            "filled_date",
            "extension_count",
        ],
        RecordKind::Candidates => &[
            "id",
            "req_id",
            "name",
            "email",
            "phone",
            "recruiter",
            "source",
            "applied_date",
            "interview_date",
            "status",
            "hr_score",
            "tech_score",
            "rejection_reason",
            "notes",
        ],
        RecordKind::Employees => &[
            "code",
            "name",
            "title",
            "dept",
            "manager",
            "recruiter",
            "email",
            "phone",
            "start_date",
            "status",
        ],
        RecordKind::Trainings => &[
            "id",
            "course_name",
            "type",
            "provider",
            "date",
            "cost",
            "status",
        ],
        RecordKind::PerformanceReviews => {
            &["id", "employee_name", "period", "rating", "comment"]
        }
        RecordKind::Referrals => &[
            "id",
            "name",
            "position",
            "recruiter",
            "referral_by",
            "hr_score",
            "tech_score",
            "decision",
            "notes",
        ],
        RecordKind::AuditLog => &["timestamp", "user", "action"],
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|date| date.to_string()).unwrap_or_default()
}

fn rows(snapshot: &Snapshot, kind: RecordKind) -> Vec<Vec<String>> {
    match kind {
        RecordKind::Requisitions => snapshot
            .requisitions
            .iter()
            .map(|r| {
                vec![
                    r.req_id.to_string(),
                    r.title.clone(),
                    r.dept.clone(),
                    r.layer.as_ref().map(|layer| layer.to_string()).unwrap_or_default(),
                    r.recruiter.clone(),
                    r.requester_name.clone(),
                    r.requester_code.clone(),
                    r.status.label().to_string(),
                    date(r.start_date),
                    date(r.target_date),
                    date(r.filled_date),
                    r.extension_count.to_string(),
                ]
            })
            .collect(),
        RecordKind::Candidates => snapshot
            .candidates
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.req_id.to_string(),
                    c.name.clone(),
                    c.email.clone(),
                    c.phone.clone(),
                    c.recruiter.clone(),
                    c.source.clone(),
                    date(c.applied_date),
                    date(c.interview_date),
                    c.status.label().to_string(),
                    c.hr_score.to_string(),
                    c.tech_score.to_string(),
                    c.rejection_reason.clone().unwrap_or_default(),
                    c.notes.clone(),
                ]
            })
            .collect(),
        RecordKind::Employees => snapshot
            .employees
            .iter()
            .map(|e| {
                vec![
                    e.code.to_string(),
                    e.name.clone(),
                    e.title.clone(),
                    e.dept.clone(),
                    e.manager.clone(),
                    e.recruiter.clone(),
                    e.email.clone(),
                    e.phone.clone(),
                    date(e.start_date),
                    e.status.clone(),
                ]
            })
            .collect(),
        RecordKind::Trainings => snapshot
            .trainings
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.course_name.clone(),
                    t.kind.clone(),
                    t.provider.clone(),
                    date(t.date),
                    t.cost.to_string(),
                    t.status.clone(),
                ]
            })
            .collect(),
        RecordKind::PerformanceReviews => snapshot
            .performance_reviews
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.employee_name.clone(),
                    p.period.clone(),
                    p.rating.to_string(),
                    p.comment.clone(),
                ]
            })
            .collect(),
        RecordKind::Referrals => snapshot
            .referrals
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.position.clone(),
                    r.recruiter.clone(),
                    r.referral_by.clone(),
                    r.hr_score.to_string(),
                    r.tech_score.to_string(),
                    r.decision.clone(),
                    r.notes.clone(),
                ]
            })
            .collect(),
        RecordKind::AuditLog => snapshot
            .audit_log
            .iter()
            .map(|entry| {
                vec![
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    entry.user.clone(),
                    entry.action.clone(),
                ]
            })
            .collect(),
    }
}
