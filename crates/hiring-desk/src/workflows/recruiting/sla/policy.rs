use chrono::{Duration, NaiveDate};

use super::super::domain::Layer;
use super::SlaError;

/// Calendar-day offsets from requisition start date to target fill date, per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaPolicy {
    pub manager_days: i64,
    pub staff_days: i64,
    pub blue_collar_days: i64,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl SlaPolicy {
    pub const fn standard() -> Self {
        Self {
            manager_days: 105,
            staff_days: 75,
            blue_collar_days: 30,
        }
    }

    /// Offset applied when computing a target date. Unknown layers get no grace period.
    pub fn offset_days(&self, layer: &Layer) -> i64 {
        match layer {
            Layer::Manager => self.manager_days,
            Layer::Staff => self.staff_days,
            Layer::BlueCollar => self.blue_collar_days,
            Layer::Other(_) => 0,
        }
    }

    /// Days granted by a policy extension. Layers outside the table fall back to the
    /// blue-collar window so an extension always moves the deadline.
    pub fn extension_days(&self, layer: Option<&Layer>) -> i64 {
        match layer {
            Some(Layer::Manager) => self.manager_days,
            Some(Layer::Staff) => self.staff_days,
            _ => self.blue_collar_days,
        }
    }

    pub fn target_date(
        &self,
        start_date: Option<NaiveDate>,
        layer: Option<&Layer>,
    ) -> Result<NaiveDate, SlaError> {
        let start_date = start_date.ok_or(SlaError::MissingStartDate)?;
        let layer = layer.ok_or(SlaError::MissingLayer)?;
        Ok(start_date + Duration::days(self.offset_days(layer)))
    }
}

/// Target fill date under the standard offset table.
pub fn compute_target_date(
    start_date: Option<NaiveDate>,
    layer: Option<&Layer>,
) -> Result<NaiveDate, SlaError> {
    SlaPolicy::standard().target_date(start_date, layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    #[test]
    fn offsets_follow_layer_table() {
        let cases = [
            (Layer::Manager, NaiveDate::from_ymd_opt(2024, 4, 15)),
            (Layer::Staff, NaiveDate::from_ymd_opt(2024, 3, 16)),
            (Layer::BlueCollar, NaiveDate::from_ymd_opt(2024, 1, 31)),
            (Layer::Other("Intern".to_string()), NaiveDate::from_ymd_opt(2024, 1, 1)),
        ];

        for (layer, expected) in cases {
            assert_eq!(
                compute_target_date(Some(jan_first()), Some(&layer)).ok(),
                expected,
                "layer {layer}"
            );
        }
    }

    #[test]
    fn missing_inputs_leave_target_undetermined() {
        assert_eq!(
            compute_target_date(None, Some(&Layer::Manager)),
            Err(SlaError::MissingStartDate)
        );
        assert_eq!(
            compute_target_date(Some(jan_first()), None),
            Err(SlaError::MissingLayer)
        );
    }

    #[test]
    fn extension_days_fall_back_to_blue_collar_window() {
        let policy = SlaPolicy::standard();
        assert_eq!(policy.extension_days(Some(&Layer::Staff)), 75);
        assert_eq!(policy.extension_days(Some(&Layer::Other("Intern".into()))), 30);
        assert_eq!(policy.extension_days(None), 30);
    }
}
