//! Employee department report
//!
//! Parses the bundled employee dataset, counts employees per department, and
//! renders a standalone HTML page with the HR frequency count and a
//! department histogram embedded as a base64 data URI.

use std::collections::BTreeMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ChartConfig;
use crate::render::chart::bar_chart_svg;
use crate::{Error, Result};

/// Contact line printed in the report header
pub const CONTACT_EMAIL: &str = "23f2002133@ds.study.iitm.ac.in";

/// Department whose frequency the report highlights
pub const HIGHLIGHT_DEPARTMENT: &str = "HR";

/// Bundled sample of the employee performance dataset.
pub const EMPLOYEE_CSV: &str = "\
employee_id,department,region,performance_score,years_experience,satisfaction_rating
EMP001,Marketing,Asia Pacific,82.1,14,3.1
EMP002,IT,Europe,86.18,6,4.2
EMP003,HR,Middle East,83.22,13,4.1
EMP004,IT,Asia Pacific,75.85,8,3.3
EMP005,IT,Africa,83.25,9,4.9
EMP006,HR,Europe,79.4,11,3.8
EMP007,Marketing,Asia Pacific,91.5,5,4.5
EMP008,Finance,North America,87.3,7,4.7
EMP009,HR,Africa,81.6,10,4.0
EMP010,Finance,Europe,84.2,9,3.9
";

const EXPECTED_HEADER: [&str; 6] = [
    "employee_id",
    "department",
    "region",
    "performance_score",
    "years_experience",
    "satisfaction_rating",
];

/// One row of the employee dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee identifier
    pub employee_id: String,
    /// Department name
    pub department: String,
    /// Region name
    pub region: String,
    /// Performance score (0-100)
    pub performance_score: f64,
    /// Years of experience
    pub years_experience: u32,
    /// Satisfaction rating (1-5)
    pub satisfaction_rating: f64,
}

fn field<T: std::str::FromStr>(line: usize, name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::InvalidInput(format!("line {line}: cannot parse {name} from '{raw}'"))
    })
}

/// Parse employee rows from CSV text with the standard header.
///
/// # Errors
///
/// Returns `Error::InvalidInput` naming the line for a wrong header, a
/// wrong column count, or an unparsable number
pub fn parse_employees(csv: &str) -> Result<Vec<Employee>> {
    let mut lines = csv.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::InvalidInput("employee CSV is empty".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns != EXPECTED_HEADER {
        return Err(Error::InvalidInput(format!(
            "unexpected employee CSV header: {header}"
        )));
    }

    lines
        .map(|(index, line)| {
            let number = index + 1;
            let cells: Vec<&str> = line.split(',').collect();
            if cells.len() != EXPECTED_HEADER.len() {
                return Err(Error::InvalidInput(format!(
                    "line {number}: expected {} columns, found {}",
                    EXPECTED_HEADER.len(),
                    cells.len()
                )));
            }
            Ok(Employee {
                employee_id: cells[0].trim().to_string(),
                department: cells[1].trim().to_string(),
                region: cells[2].trim().to_string(),
                performance_score: field(number, "performance_score", cells[3])?,
                years_experience: field(number, "years_experience", cells[4])?,
                satisfaction_rating: field(number, "satisfaction_rating", cells[5])?,
            })
        })
        .collect()
}

/// Employees per department, sorted by department name.
#[must_use]
pub fn department_counts(employees: &[Employee]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for employee in employees {
        *counts.entry(employee.department.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of employees in `department`.
#[must_use]
pub fn frequency(employees: &[Employee], department: &str) -> usize {
    employees
        .iter()
        .filter(|e| e.department == department)
        .count()
}

/// Standalone HTML report for the given employees.
///
/// # Errors
///
/// Returns error if the histogram cannot be rendered (e.g. no employees)
pub fn html_report(employees: &[Employee], chart: &ChartConfig) -> Result<String> {
    let hr_count = frequency(employees, HIGHLIGHT_DEPARTMENT);
    let bars: Vec<(String, usize)> = department_counts(employees).into_iter().collect();
    let svg = bar_chart_svg(
        "Department Distribution of Employees",
        "Department",
        &bars,
        chart,
    )?;
    let encoded = STANDARD.encode(svg.as_bytes());

    Ok(format!(
        "<html>\n\
         <head><title>Employee Performance Analysis</title></head>\n\
         <body>\n\
         <h2>Employee Performance Analysis</h2>\n\
         <p><b>Email:</b> {CONTACT_EMAIL}</p>\n\
         <p><b>Frequency count of {HIGHLIGHT_DEPARTMENT} department:</b> {hr_count}</p>\n\
         <img src=\"data:image/svg+xml;base64,{encoded}\" alt=\"Department Histogram\"/>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Render the bundled dataset's report and write it to `path`.
///
/// Returns the HR frequency count written into the page.
///
/// # Errors
///
/// Returns error if parsing, rendering or writing fails
pub fn write_html_report(path: impl AsRef<Path>, chart: &ChartConfig) -> Result<usize> {
    let employees = parse_employees(EMPLOYEE_CSV)?;
    let html = html_report(&employees, chart)?;
    std::fs::write(path.as_ref(), html)?;

    let hr_count = frequency(&employees, HIGHLIGHT_DEPARTMENT);
    info!(path = %path.as_ref().display(), hr_count, "employee report written");
    Ok(hr_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> Vec<Employee> {
        parse_employees(EMPLOYEE_CSV).unwrap()
    }

    #[test]
    fn test_parse_bundled_dataset() {
        let rows = employees();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].employee_id, "EMP001");
        assert_eq!(rows[1].department, "IT");
        assert!((rows[1].performance_score - 86.18).abs() < 1e-12);
        assert_eq!(rows[0].years_experience, 14);
    }

    #[test]
    fn test_department_counts() {
        let counts = department_counts(&employees());
        assert_eq!(counts["HR"], 3);
        assert_eq!(counts["IT"], 3);
        assert_eq!(counts["Marketing"], 2);
        assert_eq!(counts["Finance"], 2);
        assert_eq!(counts.values().sum::<usize>(), 10);
    }

    #[test]
    fn test_frequency() {
        let rows = employees();
        assert_eq!(frequency(&rows, "HR"), 3);
        assert_eq!(frequency(&rows, "Legal"), 0);
    }

    #[test]
    fn test_bad_header() {
        assert!(parse_employees("a,b,c\n1,2,3\n").is_err());
        assert!(parse_employees("").is_err());
    }

    #[test]
    fn test_bad_row() {
        let csv = format!("{}\nEMP011,HR,Europe,not-a-number,3,4.0\n", EXPECTED_HEADER.join(","));
        let err = parse_employees(&csv).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let csv = format!("{}\nEMP011,HR\n", EXPECTED_HEADER.join(","));
        assert!(parse_employees(&csv).is_err());
    }

    #[test]
    fn test_html_report() {
        let html = html_report(&employees(), &ChartConfig::default()).unwrap();
        assert!(html.contains("<b>Frequency count of HR department:</b> 3</p>"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains(CONTACT_EMAIL));
    }

    #[test]
    fn test_html_report_image_decodes() {
        let html = html_report(&employees(), &ChartConfig::default()).unwrap();
        let start = html.find("base64,").unwrap() + "base64,".len();
        let end = start + html[start..].find('"').unwrap();
        let svg = String::from_utf8(STANDARD.decode(&html[start..end]).unwrap()).unwrap();
        assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    }

    #[test]
    fn test_empty_report_fails() {
        assert!(html_report(&[], &ChartConfig::default()).is_err());
    }
}
