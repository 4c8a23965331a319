use uuid::Uuid;

use crate::models::Allocation;
use crate::period::{self, DateRange};

/// Active allocations for one employee that are in force during any of
/// `ranges`, in input order.
pub fn in_force_for(
    employee_id: Uuid,
    allocations: &[Allocation],
    ranges: &[DateRange],
) -> Vec<Allocation> {
    allocations
        .iter()
        .filter(|allocation| {
            allocation.employee_id == employee_id
                && allocation.is_active()
                && period::in_force_any(allocation, ranges)
        })
        .cloned()
        .collect()
}

/// Collapses revisions of the same project down to one effective record.
///
/// Stable fold over input order: the first record for a project is kept
/// until a record with a strictly later start date replaces it, so equal
/// start dates keep the first-seen record.
pub fn consolidate(allocations: &[Allocation]) -> Vec<Allocation> {
    let mut effective: Vec<Allocation> = Vec::new();

    for allocation in allocations {
        match effective
            .iter_mut()
            .find(|kept| kept.project_id == allocation.project_id)
        {
            None => effective.push(allocation.clone()),
            Some(kept) => {
                if let (Some(candidate), Some(existing)) = (allocation.start_date, kept.start_date)
                {
                    if candidate > existing {
                        *kept = allocation.clone();
                    }
                }
            }
        }
    }

    effective
}

/// Ranks a consolidated list for display slots, highest percentage first.
/// Ties keep consolidation order.
pub fn rank_by_percentage(mut consolidated: Vec<Allocation>) -> Vec<Allocation> {
    consolidated.sort_by(|a, b| {
        b.allocation_percentage
            .partial_cmp(&a.allocation_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_allocation(
        employee_id: Uuid,
        project_id: Uuid,
        percentage: f64,
        start: NaiveDate,
    ) -> Allocation {
        Allocation {
            id: Uuid::new_v4(),
            employee_id,
            project_id,
            allocation_percentage: percentage,
            status: "Active".to_string(),
            start_date: Some(start),
            end_date: Some(date(2024, 12, 31)),
            role: None,
            billable: None,
        }
    }

    #[test]
    fn consolidation_keeps_one_record_per_project() {
        let employee = Uuid::new_v4();
        let project_a = Uuid::new_v4();
        let project_b = Uuid::new_v4();
        let allocations = vec![
            sample_allocation(employee, project_a, 40.0, date(2024, 1, 1)),
            sample_allocation(employee, project_b, 30.0, date(2024, 1, 15)),
            sample_allocation(employee, project_a, 60.0, date(2024, 2, 1)),
            sample_allocation(employee, project_b, 20.0, date(2024, 1, 10)),
        ];

        let consolidated = consolidate(&allocations);
        assert_eq!(consolidated.len(), 2);

        let mut seen = std::collections::HashSet::new();
        for allocation in &consolidated {
            assert!(seen.insert(allocation.project_id));
        }
    }

    #[test]
    fn latest_start_date_wins() {
        let employee = Uuid::new_v4();
        let project = Uuid::new_v4();
        let allocations = vec![
            sample_allocation(employee, project, 40.0, date(2024, 1, 1)),
            sample_allocation(employee, project, 60.0, date(2024, 2, 1)),
        ];

        let consolidated = consolidate(&allocations);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].allocation_percentage, 60.0);
        assert_eq!(consolidated[0].start_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn earlier_revision_never_replaces_a_later_one() {
        let employee = Uuid::new_v4();
        let project = Uuid::new_v4();
        let allocations = vec![
            sample_allocation(employee, project, 60.0, date(2024, 2, 1)),
            sample_allocation(employee, project, 40.0, date(2024, 1, 1)),
        ];

        let consolidated = consolidate(&allocations);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].allocation_percentage, 60.0);
    }

    #[test]
    fn equal_start_dates_keep_the_first_seen_record() {
        let employee = Uuid::new_v4();
        let project = Uuid::new_v4();
        let allocations = vec![
            sample_allocation(employee, project, 40.0, date(2024, 1, 1)),
            sample_allocation(employee, project, 60.0, date(2024, 1, 1)),
        ];

        let consolidated = consolidate(&allocations);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].allocation_percentage, 40.0);
    }

    #[test]
    fn record_without_start_date_never_replaces() {
        let employee = Uuid::new_v4();
        let project = Uuid::new_v4();
        let mut undated = sample_allocation(employee, project, 90.0, date(2024, 1, 1));
        undated.start_date = None;
        let allocations = vec![
            sample_allocation(employee, project, 40.0, date(2024, 1, 1)),
            undated,
        ];

        let consolidated = consolidate(&allocations);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].allocation_percentage, 40.0);
    }

    #[test]
    fn in_force_for_keeps_only_active_in_range_records() {
        let employee = Uuid::new_v4();
        let other = Uuid::new_v4();
        let project = Uuid::new_v4();
        let week = DateRange {
            start: date(2024, 3, 3),
            end: date(2024, 3, 9),
        };

        let mut closed = sample_allocation(employee, project, 50.0, date(2024, 1, 1));
        closed.status = "Closed".to_string();
        let mut stale = sample_allocation(employee, project, 50.0, date(2024, 1, 1));
        stale.end_date = Some(date(2024, 2, 1));

        let allocations = vec![
            sample_allocation(employee, project, 40.0, date(2024, 1, 1)),
            sample_allocation(other, project, 70.0, date(2024, 1, 1)),
            closed,
            stale,
        ];

        let in_force = in_force_for(employee, &allocations, &[week]);
        assert_eq!(in_force.len(), 1);
        assert_eq!(in_force[0].allocation_percentage, 40.0);
    }

    #[test]
    fn ranking_sorts_descending_and_is_stable_on_ties() {
        let employee = Uuid::new_v4();
        let first_tie = Uuid::new_v4();
        let second_tie = Uuid::new_v4();
        let consolidated = vec![
            sample_allocation(employee, first_tie, 30.0, date(2024, 1, 1)),
            sample_allocation(employee, Uuid::new_v4(), 60.0, date(2024, 1, 1)),
            sample_allocation(employee, second_tie, 30.0, date(2024, 1, 1)),
        ];

        let ranked = rank_by_percentage(consolidated);
        assert_eq!(ranked[0].allocation_percentage, 60.0);
        assert_eq!(ranked[1].project_id, first_tie);
        assert_eq!(ranked[2].project_id, second_tie);
    }
}
