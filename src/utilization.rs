use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use uuid::Uuid;

use crate::allocation;
use crate::models::{
    Allocation, DepartmentSummary, Employee, EmployeeUtilization, Project, ProjectSummary,
    SummaryStats,
};
use crate::period::{self, DateRange};

pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Fixed utilization buckets. Exactly one applies to any total >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UtilizationBucket {
    Available,
    Low,
    Medium,
    High,
}

impl UtilizationBucket {
    pub fn classify(total: f64) -> Self {
        if total <= 0.0 {
            UtilizationBucket::Available
        } else if total <= 50.0 {
            UtilizationBucket::Low
        } else if total <= 100.0 {
            UtilizationBucket::Medium
        } else {
            UtilizationBucket::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UtilizationBucket::Available => "available",
            UtilizationBucket::Low => "low",
            UtilizationBucket::Medium => "medium",
            UtilizationBucket::High => "high",
        }
    }
}

impl fmt::Display for UtilizationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn is_over_allocated(total: f64) -> bool {
    total > 100.0
}

pub fn is_fully_allocated(total: f64) -> bool {
    total == 100.0
}

pub fn available_capacity(total: f64) -> f64 {
    (100.0 - total).max(0.0)
}

/// Sum of effective allocation percentages for one employee over `ranges`.
pub fn total_allocation(employee_id: Uuid, allocations: &[Allocation], ranges: &[DateRange]) -> f64 {
    allocation::consolidate(&allocation::in_force_for(employee_id, allocations, ranges))
        .iter()
        .map(|allocation| allocation.allocation_percentage)
        .sum()
}

/// Mean over the full group, zero allocations included. Empty group is 0.
pub fn avg_utilization(totals: &[f64]) -> f64 {
    if totals.is_empty() {
        return 0.0;
    }
    totals.iter().sum::<f64>() / totals.len() as f64
}

pub fn employee_utilization(
    employee: &Employee,
    allocations: &[Allocation],
    ranges: &[DateRange],
) -> EmployeeUtilization {
    let consolidated =
        allocation::consolidate(&allocation::in_force_for(employee.id, allocations, ranges));
    let total: f64 = consolidated
        .iter()
        .map(|allocation| allocation.allocation_percentage)
        .sum();

    EmployeeUtilization {
        employee_id: employee.id,
        name: employee.full_name(),
        department: employee.department.clone(),
        designation: employee.designation.clone(),
        total_allocation: total,
        bucket: UtilizationBucket::classify(total),
        over_allocated: is_over_allocated(total),
        fully_allocated: is_fully_allocated(total),
        available_capacity: available_capacity(total),
        project_count: consolidated.len(),
    }
}

fn department_of(employee: &Employee) -> String {
    match employee.department.as_deref() {
        Some(department) if !department.is_empty() => department.to_string(),
        _ => UNASSIGNED_DEPARTMENT.to_string(),
    }
}

/// Employees grouped by department, alphabetical with Unassigned last,
/// input order preserved within each group.
pub fn group_by_department(employees: &[Employee]) -> Vec<(String, Vec<Employee>)> {
    let mut groups: Vec<(String, Vec<Employee>)> = Vec::new();

    for employee in employees {
        let department = department_of(employee);
        match groups.iter_mut().find(|(name, _)| *name == department) {
            Some((_, members)) => members.push(employee.clone()),
            None => groups.push((department, vec![employee.clone()])),
        }
    }

    groups.sort_by(|(a, _), (b, _)| {
        let a_unassigned = a == UNASSIGNED_DEPARTMENT;
        let b_unassigned = b == UNASSIGNED_DEPARTMENT;
        a_unassigned.cmp(&b_unassigned).then_with(|| a.cmp(b))
    });
    groups
}

pub fn department_summaries(
    employees: &[Employee],
    allocations: &[Allocation],
    ranges: &[DateRange],
) -> Vec<DepartmentSummary> {
    group_by_department(employees)
        .into_iter()
        .map(|(department, members)| {
            let totals: Vec<f64> = members
                .iter()
                .map(|employee| total_allocation(employee.id, allocations, ranges))
                .collect();
            let capacities: Vec<f64> = totals
                .iter()
                .map(|total| available_capacity(*total))
                .collect();

            DepartmentSummary {
                department,
                employee_count: members.len(),
                total_allocation: totals.iter().sum(),
                avg_utilization: avg_utilization(&totals),
                avg_available_capacity: avg_utilization(&capacities),
            }
        })
        .collect()
}

/// Effective allocations grouped by target project, most demanded first.
/// Allocations pointing at unknown projects are skipped.
pub fn project_summaries(
    employees: &[Employee],
    allocations: &[Allocation],
    projects: &[Project],
    ranges: &[DateRange],
) -> Vec<ProjectSummary> {
    let mut groups: HashMap<Uuid, (usize, f64)> = HashMap::new();

    for employee in employees {
        let consolidated =
            allocation::consolidate(&allocation::in_force_for(employee.id, allocations, ranges));
        for allocation in consolidated {
            let entry = groups.entry(allocation.project_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += allocation.allocation_percentage;
        }
    }

    let mut summaries = Vec::new();
    for (project_id, (employee_count, total)) in groups {
        if let Some(project) = projects.iter().find(|project| project.id == project_id) {
            summaries.push(ProjectSummary {
                project_id,
                project_name: project.name.clone(),
                employee_count,
                total_allocation: total,
                avg_allocation: if employee_count == 0 {
                    0.0
                } else {
                    total / employee_count as f64
                },
            });
        }
    }

    summaries.sort_by(|a, b| {
        b.total_allocation
            .partial_cmp(&a.total_allocation)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

pub fn summary_stats(
    employees: &[Employee],
    allocations: &[Allocation],
    ranges: &[DateRange],
) -> SummaryStats {
    let totals: Vec<f64> = employees
        .iter()
        .map(|employee| total_allocation(employee.id, allocations, ranges))
        .collect();
    let capacities: Vec<f64> = totals
        .iter()
        .map(|total| available_capacity(*total))
        .collect();

    let count_bucket = |bucket: UtilizationBucket| {
        totals
            .iter()
            .filter(|total| UtilizationBucket::classify(**total) == bucket)
            .count()
    };

    SummaryStats {
        total_employees: employees.len(),
        total_allocations: allocations
            .iter()
            .filter(|allocation| allocation.is_active() && period::in_force_any(allocation, ranges))
            .count(),
        available_employees: count_bucket(UtilizationBucket::Available),
        low_utilization_employees: count_bucket(UtilizationBucket::Low),
        medium_utilization_employees: count_bucket(UtilizationBucket::Medium),
        over_allocated_employees: count_bucket(UtilizationBucket::High),
        fully_allocated_employees: totals.iter().filter(|total| **total == 100.0).count(),
        average_utilization: avg_utilization(&totals).round() as i64,
        average_available_capacity: avg_utilization(&capacities).round() as i64,
    }
}
