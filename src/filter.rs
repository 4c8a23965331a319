use clap::ValueEnum;
use uuid::Uuid;

use crate::allocation;
use crate::models::{Allocation, Employee, Project};
use crate::period::DateRange;
use crate::utilization::{self, UtilizationBucket};

/// Experience tiers derived from total experience in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkillLevel {
    Junior,
    Mid,
    Senior,
}

impl SkillLevel {
    pub fn of(experience_years: f64) -> Self {
        if experience_years < 2.0 {
            SkillLevel::Junior
        } else if experience_years < 5.0 {
            SkillLevel::Mid
        } else {
            SkillLevel::Senior
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AllocationStatus {
    Available,
    Allocated,
}

/// Independent optional criteria, AND-composed. Absent criteria pass.
/// Multi-select criteria match when any selected value matches.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub search_term: Option<String>,
    pub resource_type: Option<String>,
    pub skill_level: Option<SkillLevel>,
    pub utilization: Option<UtilizationBucket>,
    pub allocation_status: Option<AllocationStatus>,
    pub department: Option<String>,
    pub parent_department: Option<String>,
    pub location: Option<String>,
    pub project: Option<Uuid>,
    pub selected_projects: Vec<Uuid>,
    pub project_type: Option<String>,
    pub selected_project_types: Vec<String>,
    pub practice: Option<String>,
    pub selected_practices: Vec<String>,
    pub customer: Option<Uuid>,
}

impl FilterConfig {
    pub fn matches(
        &self,
        employee: &Employee,
        allocations: &[Allocation],
        projects: &[Project],
        ranges: &[DateRange],
    ) -> bool {
        // Inactive employees never pass, regardless of configured criteria.
        if !employee.is_active() {
            return false;
        }

        if let Some(term) = self.search_term.as_deref() {
            if !term.is_empty() {
                let needle = term.to_lowercase();
                let haystack_hit = employee.full_name().to_lowercase().contains(&needle)
                    || field_contains(employee.department.as_deref(), &needle)
                    || field_contains(employee.designation.as_deref(), &needle);
                if !haystack_hit {
                    return false;
                }
            }
        }

        if let Some(resource_type) = self.resource_type.as_deref() {
            if employee.designation.as_deref() != Some(resource_type) {
                return false;
            }
        }

        if let Some(level) = self.skill_level {
            if SkillLevel::of(employee.experience_years()) != level {
                return false;
            }
        }

        if let Some(department) = self.department.as_deref() {
            if employee.department.as_deref() != Some(department) {
                return false;
            }
        }

        if let Some(parent) = self.parent_department.as_deref() {
            if employee.parent_department.as_deref() != Some(parent) {
                return false;
            }
        }

        if let Some(location) = self.location.as_deref() {
            if employee.city.as_deref() != Some(location) {
                return false;
            }
        }

        if let Some(bucket) = self.utilization {
            let total = utilization::total_allocation(employee.id, allocations, ranges);
            if UtilizationBucket::classify(total) != bucket {
                return false;
            }
        }

        if let Some(status) = self.allocation_status {
            let total = utilization::total_allocation(employee.id, allocations, ranges);
            let passes = match status {
                AllocationStatus::Available => total == 0.0,
                AllocationStatus::Allocated => total > 0.0,
            };
            if !passes {
                return false;
            }
        }

        if !self.wants_project_join() {
            return true;
        }

        let in_force = allocation::in_force_for(employee.id, allocations, ranges);

        if let Some(project_id) = self.project {
            if !in_force.iter().any(|a| a.project_id == project_id) {
                return false;
            }
        }

        if !self.selected_projects.is_empty()
            && !in_force
                .iter()
                .any(|a| self.selected_projects.contains(&a.project_id))
        {
            return false;
        }

        let joined: Vec<&Project> = in_force
            .iter()
            .filter_map(|a| projects.iter().find(|project| project.id == a.project_id))
            .collect();

        if let Some(project_type) = self.project_type.as_deref() {
            if !joined
                .iter()
                .any(|project| project.project_type.as_deref() == Some(project_type))
            {
                return false;
            }
        }

        if !self.selected_project_types.is_empty()
            && !joined.iter().any(|project| {
                project
                    .project_type
                    .as_ref()
                    .map_or(false, |t| self.selected_project_types.contains(t))
            })
        {
            return false;
        }

        if let Some(practice) = self.practice.as_deref() {
            if !joined
                .iter()
                .any(|project| project.practice.as_deref() == Some(practice))
            {
                return false;
            }
        }

        if !self.selected_practices.is_empty()
            && !joined.iter().any(|project| {
                project
                    .practice
                    .as_ref()
                    .map_or(false, |p| self.selected_practices.contains(p))
            })
        {
            return false;
        }

        if let Some(customer_id) = self.customer {
            if !joined
                .iter()
                .any(|project| project.customer_id == Some(customer_id))
            {
                return false;
            }
        }

        true
    }

    pub fn apply(
        &self,
        employees: &[Employee],
        allocations: &[Allocation],
        projects: &[Project],
        ranges: &[DateRange],
    ) -> Vec<Employee> {
        employees
            .iter()
            .filter(|employee| self.matches(employee, allocations, projects, ranges))
            .cloned()
            .collect()
    }

    fn wants_project_join(&self) -> bool {
        self.project.is_some()
            || !self.selected_projects.is_empty()
            || self.project_type.is_some()
            || !self.selected_project_types.is_empty()
            || self.practice.is_some()
            || !self.selected_practices.is_empty()
            || self.customer.is_some()
    }
}

fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.map_or(false, |value| value.to_lowercase().contains(needle))
}
