use std::fmt::Write;

use crate::allocation;
use crate::models::{Allocation, Employee, Project};
use crate::period::{self, DateRange};
use crate::utilization;

/// Static display slots in the matrix export. Allocations beyond the last
/// slot are dropped from the columns but still count toward the total.
pub const PROJECT_SLOTS: usize = 4;

pub fn build_report(
    scope: Option<&str>,
    week: &DateRange,
    employees: &[Employee],
    allocations: &[Allocation],
    projects: &[Project],
) -> String {
    let ranges = [*week];
    let stats = utilization::summary_stats(employees, allocations, &ranges);
    let departments = utilization::department_summaries(employees, allocations, &ranges);
    let demand = utilization::project_summaries(employees, allocations, projects, &ranges);

    let mut utilizations: Vec<_> = employees
        .iter()
        .map(|employee| utilization::employee_utilization(employee, allocations, &ranges))
        .collect();
    utilizations.sort_by(|a, b| {
        b.total_allocation
            .partial_cmp(&a.total_allocation)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all departments");

    let _ = writeln!(output, "# Resource Utilization Report");
    let _ = writeln!(
        output,
        "Generated for {} (week {}, {} to {})",
        scope_label,
        period::week_number(week.start),
        week.start,
        week.end
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Utilization Mix");

    if stats.total_employees == 0 {
        let _ = writeln!(output, "No employees in scope for this week.");
    } else {
        let _ = writeln!(
            output,
            "- {} employees, {} active allocations",
            stats.total_employees, stats.total_allocations
        );
        let _ = writeln!(
            output,
            "- available {}, low {}, medium {}, over-allocated {}, fully allocated {}",
            stats.available_employees,
            stats.low_utilization_employees,
            stats.medium_utilization_employees,
            stats.over_allocated_employees,
            stats.fully_allocated_employees
        );
        let _ = writeln!(
            output,
            "- average utilization {}%, average available capacity {}%",
            stats.average_utilization, stats.average_available_capacity
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Department Utilization");

    if departments.is_empty() {
        let _ = writeln!(output, "No departments in scope for this week.");
    } else {
        for department in departments.iter() {
            let _ = writeln!(
                output,
                "- {}: avg {:.1}% across {} employees (capacity {:.1}%)",
                department.department,
                department.avg_utilization,
                department.employee_count,
                department.avg_available_capacity
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Utilized Employees");

    if utilizations.is_empty() {
        let _ = writeln!(output, "No employees with allocations this week.");
    } else {
        for summary in utilizations.iter().take(10) {
            let mut flags = String::new();
            if summary.over_allocated {
                flags.push_str(" [over-allocated]");
            } else if summary.fully_allocated {
                flags.push_str(" [fully allocated]");
            }
            let _ = writeln!(
                output,
                "- {} ({}, {}) {}% across {} projects{}",
                summary.name,
                summary.department.as_deref().unwrap_or("Unassigned"),
                summary.designation.as_deref().unwrap_or("N/A"),
                format_percentage(summary.total_allocation),
                summary.project_count,
                flags
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Project Demand");

    if demand.is_empty() {
        let _ = writeln!(output, "No project allocations this week.");
    } else {
        for project in demand.iter().take(10) {
            let _ = writeln!(
                output,
                "- {}: {}% across {} employees (avg {:.1}%)",
                project.project_name,
                format_percentage(project.total_allocation),
                project.employee_count,
                project.avg_allocation
            );
        }
    }

    output
}

/// The allocation matrix as a flat CSV table: one row per employee, grouped
/// by department, string fields quoted, fixed slot columns.
pub fn matrix_csv(
    employees: &[Employee],
    allocations: &[Allocation],
    projects: &[Project],
    ranges: &[DateRange],
) -> String {
    let mut output = String::new();

    let _ = write!(output, "Employee,Department,Designation");
    for slot in 1..=PROJECT_SLOTS {
        let _ = write!(output, ",Project {slot}");
    }
    let _ = writeln!(output, ",Total Allocation");

    for (_, members) in utilization::group_by_department(employees) {
        for employee in members {
            let ranked = allocation::rank_by_percentage(allocation::consolidate(
                &allocation::in_force_for(employee.id, allocations, ranges),
            ));
            let total: f64 = ranked
                .iter()
                .map(|allocation| allocation.allocation_percentage)
                .sum();

            let _ = write!(
                output,
                "\"{}\",\"{}\",\"{}\"",
                employee.full_name(),
                employee.department.as_deref().unwrap_or("N/A"),
                employee.designation.as_deref().unwrap_or("N/A")
            );

            for slot in 0..PROJECT_SLOTS {
                match ranked.get(slot) {
                    Some(entry) if entry.allocation_percentage > 0.0 => {
                        let project_name = projects
                            .iter()
                            .find(|project| project.id == entry.project_id)
                            .map(|project| project.name.as_str())
                            .unwrap_or("Unknown Project");
                        let _ = write!(
                            output,
                            ",\"{}% ({})\"",
                            format_percentage(entry.allocation_percentage),
                            project_name
                        );
                    }
                    _ => {
                        let _ = write!(output, ",\"-\"");
                    }
                }
            }

            let _ = writeln!(output, ",\"{}%\"", format_percentage(total));
        }
    }

    output
}

/// Whole percentages print without a decimal point.
fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_week() -> DateRange {
        DateRange {
            start: date(2024, 3, 3),
            end: date(2024, 3, 9),
        }
    }

    fn sample_employee(first: &str, last: &str, department: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            department: Some(department.to_string()),
            parent_department: None,
            designation: Some("Consultant".to_string()),
            employee_status: Some("Active".to_string()),
            total_experience_months: 48,
            city: None,
        }
    }

    fn sample_project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            project_type: Some("Billable".to_string()),
            practice: None,
            customer_id: None,
            status: "Active".to_string(),
        }
    }

    fn sample_allocation(employee_id: Uuid, project_id: Uuid, percentage: f64) -> Allocation {
        Allocation {
            id: Uuid::new_v4(),
            employee_id,
            project_id,
            allocation_percentage: percentage,
            status: "Active".to_string(),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 12, 31)),
            role: None,
            billable: None,
        }
    }

    #[test]
    fn matrix_rows_show_slots_and_total() {
        let employee = sample_employee("Avery", "Lee", "Engineering");
        let apollo = sample_project("Apollo Replatform");
        let atlas = sample_project("Atlas Data Migration");
        let allocations = vec![
            sample_allocation(employee.id, apollo.id, 60.0),
            sample_allocation(employee.id, atlas.id, 30.0),
        ];

        let csv = matrix_csv(
            &[employee],
            &allocations,
            &[apollo, atlas],
            &[test_week()],
        );
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Employee,Department,Designation,Project 1,Project 2,Project 3,Project 4,Total Allocation"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "\"Avery Lee\",\"Engineering\",\"Consultant\",\"60% (Apollo Replatform)\",\"30% (Atlas Data Migration)\",\"-\",\"-\",\"90%\""
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn fifth_allocation_drops_from_slots_but_counts_in_total() {
        let employee = sample_employee("Avery", "Lee", "Engineering");
        let projects: Vec<Project> = (1..=5)
            .map(|n| sample_project(&format!("Project {n}")))
            .collect();
        let allocations: Vec<Allocation> = projects
            .iter()
            .map(|project| sample_allocation(employee.id, project.id, 20.0))
            .collect();

        let csv = matrix_csv(&[employee], &allocations, &projects, &[test_week()]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row.matches("20%").count(), PROJECT_SLOTS);
        assert!(row.ends_with("\"100%\""));
    }

    #[test]
    fn matrix_groups_departments_alphabetically() {
        let engineer = sample_employee("Avery", "Lee", "Engineering");
        let designer = sample_employee("Mei", "Tanaka", "Design");

        let csv = matrix_csv(&[engineer, designer], &[], &[], &[test_week()]);
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert!(rows[0].contains("Mei Tanaka"));
        assert!(rows[1].contains("Avery Lee"));
    }

    #[test]
    fn report_has_all_sections_even_when_empty() {
        let report = build_report(None, &test_week(), &[], &[], &[]);
        assert!(report.contains("# Resource Utilization Report"));
        assert!(report.contains("## Utilization Mix"));
        assert!(report.contains("## Department Utilization"));
        assert!(report.contains("## Most Utilized Employees"));
        assert!(report.contains("## Project Demand"));
        assert!(report.contains("No employees in scope"));
    }

    #[test]
    fn report_flags_over_allocation() {
        let employee = sample_employee("Daniel", "Osei", "Engineering");
        let apollo = sample_project("Apollo Replatform");
        let tooling = sample_project("Internal Tooling");
        let allocations = vec![
            sample_allocation(employee.id, apollo.id, 50.0),
            sample_allocation(employee.id, tooling.id, 60.0),
        ];

        let report = build_report(
            Some("Engineering"),
            &test_week(),
            &[employee],
            &allocations,
            &[apollo, tooling],
        );
        assert!(report.contains("Generated for Engineering"));
        assert!(report.contains("Daniel Osei (Engineering, Consultant) 110% across 2 projects [over-allocated]"));
    }

    #[test]
    fn fractional_percentages_keep_their_decimals() {
        assert_eq!(format_percentage(62.5), "62.5");
        assert_eq!(format_percentage(60.0), "60");
        assert_eq!(format_percentage(0.0), "0");
    }
}
