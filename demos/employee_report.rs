//! Employee Report: department histogram as a standalone HTML page
//!
//! Parses the bundled employee dataset, prints the per-department counts,
//! and writes `employee_performance_analysis.html` to the temp directory.
//!
//! Run with: cargo run --example employee_report

use relationship_explorer::config::ChartConfig;
use relationship_explorer::report::{
    department_counts, frequency, parse_employees, write_html_report, EMPLOYEE_CSV,
    HIGHLIGHT_DEPARTMENT,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Employee Performance Analysis ===\n");

    let employees = parse_employees(EMPLOYEE_CSV)?;
    println!("Employees: {}", employees.len());
    for (department, count) in department_counts(&employees) {
        println!("  {department:<10} {count:>3}  {}", "█".repeat(count));
    }
    println!(
        "\nFrequency count of {HIGHLIGHT_DEPARTMENT} department: {}",
        frequency(&employees, HIGHLIGHT_DEPARTMENT)
    );

    let path = std::env::temp_dir().join("employee_performance_analysis.html");
    write_html_report(&path, &ChartConfig::default())?;
    println!("HTML file '{}' generated successfully.", path.display());

    Ok(())
}
