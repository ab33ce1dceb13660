//! Read-only aggregations over a snapshot backing the dashboard and the positions
//! status table.

mod dashboard;
mod filter;
mod positions;
mod scorecard;

pub use dashboard::{
    DashboardReport, FunnelEntry, Gauges, Headline, OpenRequisitionEntry, RatingDistribution,
    SlaOutcomes, SourceEntry,
};
pub use filter::DashboardFilter;
pub use positions::{PositionStatusRow, TimeToFill};
pub use scorecard::{MonthlyFills, RecruiterScorecard, ScorecardTargets};

/// Whole percentage of `part` over `whole`; zero when there is nothing to divide by.
pub(crate) fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
