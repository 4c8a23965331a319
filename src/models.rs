use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub parent_department: Option<String>,
    pub designation: Option<String>,
    pub employee_status: Option<String>,
    pub total_experience_months: i32,
    pub city: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Missing status counts as Active.
    pub fn is_active(&self) -> bool {
        self.employee_status
            .as_deref()
            .map_or(true, |status| status == "Active")
    }

    pub fn experience_years(&self) -> f64 {
        f64::from(self.total_experience_months) / 12.0
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub project_type: Option<String>,
    pub practice: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Allocation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub project_id: Uuid,
    pub allocation_percentage: f64,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub role: Option<String>,
    pub billable: Option<bool>,
}

impl Allocation {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeUtilization {
    pub employee_id: Uuid,
    pub name: String,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub total_allocation: f64,
    pub bucket: crate::utilization::UtilizationBucket,
    pub over_allocated: bool,
    pub fully_allocated: bool,
    pub available_capacity: f64,
    pub project_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub employee_count: usize,
    pub total_allocation: f64,
    pub avg_utilization: f64,
    pub avg_available_capacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub project_name: String,
    pub employee_count: usize,
    pub total_allocation: f64,
    pub avg_allocation: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_employees: usize,
    pub total_allocations: usize,
    pub available_employees: usize,
    pub low_utilization_employees: usize,
    pub medium_utilization_employees: usize,
    pub over_allocated_employees: usize,
    pub fully_allocated_employees: usize,
    /// Rounded for display; accumulation stays unrounded.
    pub average_utilization: i64,
    pub average_available_capacity: i64,
}
