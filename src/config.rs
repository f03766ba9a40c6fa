use crate::forecast::CalendarEvent;
use chrono::NaiveDate;

/// Configuration for one analysis session.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Inclusive start of the analysis window (default: 2015-01-01).
    pub start_date: NaiveDate,
    /// Trailing window length, in rows, for the short realized price
    /// (default: 155). A plain row count: no calendar-day meaning is
    /// attached to it.
    pub short_window: usize,
    /// Forecast horizon in days beyond the last observation (default: 365).
    pub forecast_horizon_days: u32,
    /// Named calendar events handed to the forecasting model.
    pub events: Vec<CalendarEvent>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid default date"),
            short_window: 155,
            forecast_horizon_days: 365,
            events: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Returns the default configuration with the given events attached.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        AnalysisConfig {
            events,
            ..AnalysisConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.start_date,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
        );
        assert_eq!(config.short_window, 155);
        assert_eq!(config.forecast_horizon_days, 365);
        assert!(config.events.is_empty());
    }

    #[test]
    fn test_with_events() {
        let events = vec![CalendarEvent::symmetric(
            "halving",
            NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            60,
        )];
        let config = AnalysisConfig::with_events(events);
        assert_eq!(config.events.len(), 1);
        assert_eq!(config.short_window, 155);
    }
}
