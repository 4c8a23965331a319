use chrono::{Datelike, Duration, NaiveDate};

use crate::models::Allocation;

/// Inclusive date range, normalized to whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The week containing `reference`: most recent Sunday through the
    /// following Saturday, both inclusive.
    pub fn week_of(reference: NaiveDate) -> Self {
        let start =
            reference - Duration::days(i64::from(reference.weekday().num_days_from_sunday()));
        DateRange {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }
}

/// ISO-style week index: shift to the Thursday of the date's week (Sunday
/// counted as day 7), then count weeks from January 1st.
pub fn week_number(date: NaiveDate) -> u32 {
    let day_of_week = i64::from(date.weekday().number_from_monday());
    let thursday = date + Duration::days(4 - day_of_week);
    (thursday.ordinal() + 6) / 7
}

/// Whether an allocation is in force during `range`. Records missing either
/// date are never in force.
pub fn in_force(allocation: &Allocation, range: &DateRange) -> bool {
    match (allocation.start_date, allocation.end_date) {
        (Some(start), Some(end)) => range.overlaps(start, end),
        _ => false,
    }
}

/// Whether an allocation is in force during any of `ranges`. An empty list
/// matches everything.
pub fn in_force_any(allocation: &Allocation, ranges: &[DateRange]) -> bool {
    if ranges.is_empty() {
        return true;
    }
    ranges.iter().any(|range| in_force(allocation, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_allocation(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Allocation {
        Allocation {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            allocation_percentage: 50.0,
            status: "Active".to_string(),
            start_date: start,
            end_date: end,
            role: None,
            billable: None,
        }
    }

    #[test]
    fn week_starts_on_the_most_recent_sunday() {
        let week = DateRange::week_of(date(2024, 3, 6));
        assert_eq!(week.start, date(2024, 3, 3));
        assert_eq!(week.end, date(2024, 3, 9));
    }

    #[test]
    fn week_of_a_sunday_starts_that_day() {
        let week = DateRange::week_of(date(2024, 3, 3));
        assert_eq!(week.start, date(2024, 3, 3));
        assert_eq!(week.end, date(2024, 3, 9));
    }

    #[test]
    fn week_numbers_match_iso_weeks() {
        assert_eq!(week_number(date(2024, 1, 1)), 1);
        assert_eq!(week_number(date(2024, 3, 6)), 10);
        assert_eq!(week_number(date(2024, 12, 31)), 1);
        assert_eq!(week_number(date(2023, 12, 31)), 52);
    }

    #[test]
    fn allocation_overlapping_the_week_is_in_force() {
        let week = DateRange {
            start: date(2024, 3, 3),
            end: date(2024, 3, 9),
        };
        let allocation = sample_allocation(Some(date(2024, 3, 4)), Some(date(2024, 3, 10)));
        assert!(in_force(&allocation, &week));
    }

    #[test]
    fn allocation_outside_the_week_is_not_in_force() {
        let week = DateRange {
            start: date(2024, 3, 3),
            end: date(2024, 3, 9),
        };
        let allocation = sample_allocation(Some(date(2024, 3, 10)), Some(date(2024, 3, 20)));
        assert!(!in_force(&allocation, &week));
    }

    #[test]
    fn missing_dates_are_never_in_force() {
        let week = DateRange::week_of(date(2024, 3, 6));
        assert!(!in_force(&sample_allocation(None, Some(date(2024, 3, 9))), &week));
        assert!(!in_force(&sample_allocation(Some(date(2024, 3, 4)), None), &week));
    }

    #[test]
    fn empty_range_list_matches_everything() {
        let allocation = sample_allocation(None, None);
        assert!(in_force_any(&allocation, &[]));
    }

    #[test]
    fn range_list_matches_if_any_range_overlaps() {
        let allocation = sample_allocation(Some(date(2024, 3, 4)), Some(date(2024, 3, 10)));
        let ranges = [
            DateRange {
                start: date(2024, 1, 7),
                end: date(2024, 1, 13),
            },
            DateRange {
                start: date(2024, 3, 3),
                end: date(2024, 3, 9),
            },
        ];
        assert!(in_force_any(&allocation, &ranges));

        let outside = [DateRange {
            start: date(2024, 1, 7),
            end: date(2024, 1, 13),
        }];
        assert!(!in_force_any(&allocation, &outside));
    }
}
