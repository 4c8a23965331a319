use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod allocation;
mod db;
mod filter;
mod models;
mod period;
mod report;
mod utilization;

use filter::FilterConfig;
use period::DateRange;

#[derive(Parser)]
#[command(name = "utilization-tracker")]
#[command(about = "Weekly resource utilization tracker for delivery staffing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import allocation records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Rank employees by utilization for a week
    #[command(group(
        ArgGroup::new("scope")
            .args(["department", "employee"])
            .multiple(false)
    ))]
    Utilization {
        #[arg(long)]
        department: Option<String>,
        /// Scope to a single employee by email
        #[arg(long)]
        employee: Option<String>,
        /// Reference date; defaults to today
        #[arg(long)]
        week_of: Option<NaiveDate>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        bucket: Option<utilization::UtilizationBucket>,
        /// Keep only employees staffed on this customer's projects
        #[arg(long)]
        customer: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Export the weekly allocation matrix as CSV
    Matrix {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        week_of: Option<NaiveDate>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "matrix.csv")]
        out: PathBuf,
    },
    /// Generate a markdown utilization report
    #[command(group(
        ArgGroup::new("scope")
            .args(["department", "employee"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        employee: Option<String>,
        #[arg(long)]
        week_of: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} allocations from {}.", csv.display());
        }
        Commands::Utilization {
            department,
            employee,
            week_of,
            search,
            bucket,
            customer,
            limit,
            json,
        } => {
            let week = resolve_week(week_of);
            let employees =
                db::fetch_employees(&pool, department.as_deref(), employee.as_deref()).await?;
            let projects = db::fetch_projects(&pool).await?;
            let allocations = db::fetch_allocations(&pool).await?;

            let customer_id = match customer.as_deref() {
                Some(name) => {
                    let customers = db::fetch_customers(&pool).await?;
                    Some(
                        customers
                            .iter()
                            .find(|candidate| candidate.name == name)
                            .map(|candidate| candidate.id)
                            .with_context(|| format!("unknown customer {name}"))?,
                    )
                }
                None => None,
            };

            let config = FilterConfig {
                search_term: search,
                utilization: bucket,
                customer: customer_id,
                ..FilterConfig::default()
            };
            let ranges = [week];
            let in_scope = config.apply(&employees, &allocations, &projects, &ranges);

            let mut summaries: Vec<_> = in_scope
                .iter()
                .map(|employee| utilization::employee_utilization(employee, &allocations, &ranges))
                .collect();
            summaries.sort_by(|a, b| {
                b.total_allocation
                    .partial_cmp(&a.total_allocation)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            if json {
                let stats = utilization::summary_stats(&in_scope, &allocations, &ranges);
                let document = serde_json::json!({
                    "week_start": week.start,
                    "week_end": week.end,
                    "summary": stats,
                    "employees": summaries,
                });
                println!("{}", serde_json::to_string_pretty(&document)?);
                return Ok(());
            }

            if summaries.is_empty() {
                println!("No active employees matched this week.");
                return Ok(());
            }

            println!(
                "Top employees by utilization (week {}, {} to {}):",
                period::week_number(week.start),
                week.start,
                week.end
            );
            for summary in summaries.iter().take(limit) {
                println!(
                    "- {} ({}, {}) {:.0}% across {} projects, bucket {}",
                    summary.name,
                    summary.department.as_deref().unwrap_or("Unassigned"),
                    summary.designation.as_deref().unwrap_or("N/A"),
                    summary.total_allocation,
                    summary.project_count,
                    summary.bucket
                );
            }

            let stats = utilization::summary_stats(&in_scope, &allocations, &ranges);
            println!(
                "Summary: {} employees, {} active allocations, avg utilization {}% (capacity {}%)",
                stats.total_employees,
                stats.total_allocations,
                stats.average_utilization,
                stats.average_available_capacity
            );
        }
        Commands::Matrix {
            department,
            week_of,
            search,
            out,
        } => {
            let week = resolve_week(week_of);
            let employees = db::fetch_employees(&pool, department.as_deref(), None).await?;
            let projects = db::fetch_projects(&pool).await?;
            let allocations = db::fetch_allocations(&pool).await?;

            let config = FilterConfig {
                search_term: search,
                ..FilterConfig::default()
            };
            let ranges = [week];
            let in_scope = config.apply(&employees, &allocations, &projects, &ranges);

            let csv = report::matrix_csv(&in_scope, &allocations, &projects, &ranges);
            std::fs::write(&out, csv)?;
            println!("Matrix written to {}.", out.display());
        }
        Commands::Report {
            department,
            employee,
            week_of,
            out,
        } => {
            let week = resolve_week(week_of);
            let employees =
                db::fetch_employees(&pool, department.as_deref(), employee.as_deref()).await?;
            let projects = db::fetch_projects(&pool).await?;
            let allocations = db::fetch_allocations(&pool).await?;

            let config = FilterConfig::default();
            let ranges = [week];
            let in_scope = config.apply(&employees, &allocations, &projects, &ranges);

            let scope = department.as_deref().or(employee.as_deref());
            let report = report::build_report(scope, &week, &in_scope, &allocations, &projects);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// The only clock read in the program; everything downstream takes the
/// resolved week explicitly.
fn resolve_week(week_of: Option<NaiveDate>) -> DateRange {
    DateRange::week_of(week_of.unwrap_or_else(|| Utc::now().date_naive()))
}
