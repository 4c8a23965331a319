use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Allocation, Customer, Employee, Project};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let customers = vec![
        (
            Uuid::parse_str("7b1e2a90-54c6-4f5e-9a3d-2f8b1c6d4e01")?,
            "Northwind Retail",
        ),
        (
            Uuid::parse_str("9c4f8d12-3b7a-4c2e-8f1d-6a5b3e9c7d02")?,
            "Aster Health",
        ),
    ];

    for (id, name) in &customers {
        sqlx::query(
            r#"
            INSERT INTO resource_tracker.customers (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    let employees = vec![
        (
            "Priya",
            "Nair",
            "priya.nair@example.com",
            "Engineering",
            "Delivery",
            "Senior Consultant",
            "Active",
            84,
            "Bangalore",
        ),
        (
            "Daniel",
            "Osei",
            "daniel.osei@example.com",
            "Engineering",
            "Delivery",
            "Consultant",
            "Active",
            30,
            "Accra",
        ),
        (
            "Mei",
            "Tanaka",
            "mei.tanaka@example.com",
            "Design",
            "Delivery",
            "UX Designer",
            "Active",
            58,
            "Osaka",
        ),
        (
            "Liam",
            "Murphy",
            "liam.murphy@example.com",
            "Engineering",
            "Delivery",
            "Consultant",
            "Inactive",
            14,
            "Dublin",
        ),
    ];

    for (first, last, email, department, parent, designation, status, months, city) in employees {
        sqlx::query(
            r#"
            INSERT INTO resource_tracker.employees
            (id, first_name, last_name, email, department, parent_department,
             designation, employee_status, total_experience_months, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email) DO UPDATE
            SET department = EXCLUDED.department,
                designation = EXCLUDED.designation,
                employee_status = EXCLUDED.employee_status,
                total_experience_months = EXCLUDED.total_experience_months
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(department)
        .bind(parent)
        .bind(designation)
        .bind(status)
        .bind(months)
        .bind(city)
        .execute(pool)
        .await?;
    }

    let projects = vec![
        (
            "Apollo Replatform",
            "Billable",
            "Retail",
            Some("Northwind Retail"),
        ),
        (
            "Atlas Data Migration",
            "Billable",
            "Data",
            Some("Aster Health"),
        ),
        ("Internal Tooling", "Internal", "Platform", None),
    ];

    for (name, project_type, practice, customer_name) in projects {
        let customer_id: Option<Uuid> = match customer_name {
            Some(customer) => Some(
                sqlx::query("SELECT id FROM resource_tracker.customers WHERE name = $1")
                    .bind(customer)
                    .fetch_one(pool)
                    .await?
                    .get("id"),
            ),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO resource_tracker.projects (id, name, project_type, practice, customer_id, status)
            VALUES ($1, $2, $3, $4, $5, 'Active')
            ON CONFLICT (name) DO UPDATE
            SET project_type = EXCLUDED.project_type,
                practice = EXCLUDED.practice,
                customer_id = EXCLUDED.customer_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(project_type)
        .bind(practice)
        .bind(customer_id)
        .execute(pool)
        .await?;
    }

    // Apollo carries a revision for Priya; the later start date is the one
    // that counts toward utilization.
    let allocations = vec![
        (
            "seed-001",
            "priya.nair@example.com",
            "Apollo Replatform",
            40.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 1, 5).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 12, 27).context("invalid date")?,
            "Tech Lead",
        ),
        (
            "seed-002",
            "priya.nair@example.com",
            "Apollo Replatform",
            60.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 7, 6).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 12, 27).context("invalid date")?,
            "Tech Lead",
        ),
        (
            "seed-003",
            "priya.nair@example.com",
            "Atlas Data Migration",
            30.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 2, 2).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 11, 29).context("invalid date")?,
            "Reviewer",
        ),
        (
            "seed-004",
            "daniel.osei@example.com",
            "Apollo Replatform",
            50.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 1, 5).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 12, 27).context("invalid date")?,
            "Developer",
        ),
        (
            "seed-005",
            "daniel.osei@example.com",
            "Internal Tooling",
            60.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 3, 2).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 12, 27).context("invalid date")?,
            "Developer",
        ),
        (
            "seed-006",
            "mei.tanaka@example.com",
            "Atlas Data Migration",
            100.0,
            "Active",
            NaiveDate::from_ymd_opt(2026, 2, 2).context("invalid date")?,
            NaiveDate::from_ymd_opt(2026, 11, 29).context("invalid date")?,
            "Designer",
        ),
    ];

    for (source_key, email, project_name, percentage, status, start, end, role) in allocations {
        let employee_id: Uuid =
            sqlx::query("SELECT id FROM resource_tracker.employees WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?
                .get("id");
        let project_id: Uuid =
            sqlx::query("SELECT id FROM resource_tracker.projects WHERE name = $1")
                .bind(project_name)
                .fetch_one(pool)
                .await?
                .get("id");

        sqlx::query(
            r#"
            INSERT INTO resource_tracker.allocations
            (id, employee_id, project_id, allocation_percentage, status,
             start_date, end_date, role, billable, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(project_id)
        .bind(percentage)
        .bind(status)
        .bind(start)
        .bind(end)
        .bind(role)
        .bind(true)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_employees(
    pool: &PgPool,
    department: Option<&str>,
    email: Option<&str>,
) -> anyhow::Result<Vec<Employee>> {
    let mut query = String::from(
        "SELECT id, first_name, last_name, email, department, parent_department, \
         designation, employee_status, total_experience_months, city \
         FROM resource_tracker.employees",
    );

    if department.is_some() {
        query.push_str(" WHERE department = $1");
    } else if email.is_some() {
        query.push_str(" WHERE email = $1");
    }
    query.push_str(" ORDER BY last_name, first_name");

    let mut rows = sqlx::query(&query);

    if let Some(value) = department {
        rows = rows.bind(value);
    } else if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut employees = Vec::new();

    for row in records {
        employees.push(Employee {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            department: row.get("department"),
            parent_department: row.get("parent_department"),
            designation: row.get("designation"),
            employee_status: row.get("employee_status"),
            total_experience_months: row.get("total_experience_months"),
            city: row.get("city"),
        });
    }

    Ok(employees)
}

pub async fn fetch_projects(pool: &PgPool) -> anyhow::Result<Vec<Project>> {
    let records = sqlx::query(
        "SELECT id, name, project_type, practice, customer_id, status \
         FROM resource_tracker.projects ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut projects = Vec::new();
    for row in records {
        projects.push(Project {
            id: row.get("id"),
            name: row.get("name"),
            project_type: row.get("project_type"),
            practice: row.get("practice"),
            customer_id: row.get("customer_id"),
            status: row.get("status"),
        });
    }

    Ok(projects)
}

pub async fn fetch_customers(pool: &PgPool) -> anyhow::Result<Vec<Customer>> {
    let records = sqlx::query("SELECT id, name FROM resource_tracker.customers ORDER BY name")
        .fetch_all(pool)
        .await?;

    let mut customers = Vec::new();
    for row in records {
        customers.push(Customer {
            id: row.get("id"),
            name: row.get("name"),
        });
    }

    Ok(customers)
}

pub async fn fetch_allocations(pool: &PgPool) -> anyhow::Result<Vec<Allocation>> {
    let records = sqlx::query(
        "SELECT id, employee_id, project_id, allocation_percentage, status, \
         start_date, end_date, role, billable \
         FROM resource_tracker.allocations",
    )
    .fetch_all(pool)
    .await?;

    let mut allocations = Vec::new();
    for row in records {
        allocations.push(Allocation {
            id: row.get("id"),
            employee_id: row.get("employee_id"),
            project_id: row.get("project_id"),
            allocation_percentage: row.get("allocation_percentage"),
            status: row.get("status"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            role: row.get("role"),
            billable: row.get("billable"),
        });
    }

    Ok(allocations)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        first_name: String,
        last_name: String,
        email: String,
        department: Option<String>,
        designation: Option<String>,
        project: String,
        project_type: Option<String>,
        practice: Option<String>,
        allocation_percentage: f64,
        status: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        role: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;

        let employee_id: Uuid = sqlx::query(
            r#"
            INSERT INTO resource_tracker.employees
            (id, first_name, last_name, email, department, designation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                department = EXCLUDED.department,
                designation = EXCLUDED.designation
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.email)
        .bind(&row.department)
        .bind(&row.designation)
        .fetch_one(pool)
        .await?
        .get("id");

        let project_id: Uuid = sqlx::query(
            r#"
            INSERT INTO resource_tracker.projects (id, name, project_type, practice)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET project_type = EXCLUDED.project_type,
                practice = EXCLUDED.practice
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.project)
        .bind(&row.project_type)
        .bind(&row.practice)
        .fetch_one(pool)
        .await?
        .get("id");

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO resource_tracker.allocations
            (id, employee_id, project_id, allocation_percentage, status,
             start_date, end_date, role, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(project_id)
        .bind(row.allocation_percentage)
        .bind(row.status.as_deref().unwrap_or("Active"))
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(&row.role)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
