use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{
    city_rule::CityRule,
    salary::SalaryRecord,
    upload::{Cell, CityUpload, SalaryUpload},
};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("static regex"));
static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("static regex"));

/// Row 1 of an uploaded sheet is the header, so the first data row is row 2.
const FIRST_DATA_ROW: usize = 2;

fn text_of(cell: &Option<Cell>) -> Option<String> {
    cell.as_ref().map(|c| c.as_text()).filter(|s| !s.is_empty())
}

fn number_of(cell: &Option<Cell>) -> Option<f64> {
    cell.as_ref().and_then(|c| c.as_number())
}

fn row_message(index: usize, problems: &[&str]) -> String {
    format!("Row {}: {}", index + FIRST_DATA_ROW, problems.join("; "))
}

/// Validates every uploaded city row and converts the batch into rules.
///
/// Problems are collected for the whole sheet (one message per offending row)
/// and any problem rejects the batch.
pub fn validate_city_rows(rows: &[CityUpload]) -> Result<Vec<CityRule>, Vec<String>> {
    let mut rules = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let mut problems = Vec::new();

        let city_name = text_of(&row.city_name);
        if city_name.is_none() {
            problems.push("city_name must not be empty");
        }

        let year = text_of(&row.year).filter(|y| YEAR_RE.is_match(y));
        if year.is_none() {
            problems.push("year must be 4 digits (YYYY)");
        }

        let base_min = number_of(&row.base_min).filter(|v| *v >= 0.0);
        if base_min.is_none() {
            problems.push("base_min must be a number >= 0");
        }

        let base_max = number_of(&row.base_max).filter(|v| *v >= 0.0);
        if base_max.is_none() {
            problems.push("base_max must be a number >= 0");
        }

        if let (Some(min), Some(max)) = (base_min, base_max) {
            if min > max {
                problems.push("base_min must not exceed base_max");
            }
        }

        let rate = number_of(&row.rate).filter(|r| (0.0..=1.0).contains(r));
        if rate.is_none() {
            problems.push("rate must be between 0 and 1");
        }

        match (city_name, year, base_min, base_max, rate) {
            (Some(city_name), Some(year), Some(base_min), Some(base_max), Some(rate))
                if problems.is_empty() =>
            {
                rules.push(CityRule {
                    city_name,
                    year,
                    base_min,
                    base_max,
                    rate,
                })
            }
            _ => errors.push(row_message(index, &problems)),
        }
    }

    if errors.is_empty() { Ok(rules) } else { Err(errors) }
}

/// Validates every uploaded salary row and converts the batch into records.
pub fn validate_salary_rows(rows: &[SalaryUpload]) -> Result<Vec<SalaryRecord>, Vec<String>> {
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let mut problems = Vec::new();

        let employee_id = text_of(&row.employee_id);
        if employee_id.is_none() {
            problems.push("employee_id must not be empty");
        }

        let employee_name = text_of(&row.employee_name);
        if employee_name.is_none() {
            problems.push("employee_name must not be empty");
        }

        let month = text_of(&row.month).filter(|m| MONTH_RE.is_match(m));
        if month.is_none() {
            problems.push("month must be 6 digits (YYYYMM)");
        }

        let salary_amount = number_of(&row.salary_amount).filter(|v| *v > 0.0);
        if salary_amount.is_none() {
            problems.push("salary_amount must be a number > 0");
        }

        match (employee_id, employee_name, month, salary_amount) {
            (Some(employee_id), Some(employee_name), Some(month), Some(salary_amount)) => {
                records.push(SalaryRecord {
                    employee_id,
                    employee_name,
                    month,
                    salary_amount,
                })
            }
            _ => errors.push(row_message(index, &problems)),
        }
    }

    if errors.is_empty() { Ok(records) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, year: Cell, min: f64, max: f64, rate: f64) -> CityUpload {
        CityUpload {
            city_name: Some(name.into()),
            year: Some(year),
            base_min: Some(min.into()),
            base_max: Some(max.into()),
            rate: Some(rate.into()),
        }
    }

    fn salary(id: &str, name: &str, month: &str, amount: Cell) -> SalaryUpload {
        SalaryUpload {
            employee_id: Some(id.into()),
            employee_name: Some(name.into()),
            month: Some(month.into()),
            salary_amount: Some(amount),
        }
    }

    #[test]
    fn accepts_valid_city_rows() {
        let rows = vec![
            city("佛山", Cell::Number(2024.0), 5284.0, 26421.0, 0.15),
            city("广州", "2024".into(), 0.0, 0.0, 0.0),
        ];
        let rules = validate_city_rows(&rows).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].year, "2024");
        assert_eq!(rules[1].base_min, 0.0);
    }

    #[test]
    fn rejects_inverted_band_with_row_number() {
        let rows = vec![
            city("佛山", "2024".into(), 5284.0, 26421.0, 0.15),
            city("广州", "2024".into(), 30000.0, 28074.0, 0.155),
        ];
        let errors = validate_city_rows(&rows).unwrap_err();
        assert_eq!(errors, vec!["Row 3: base_min must not exceed base_max".to_string()]);
    }

    #[test]
    fn collects_every_problem_on_a_row() {
        let rows = vec![CityUpload {
            city_name: Some("".into()),
            year: Some("24".into()),
            base_min: Some((-1.0).into()),
            base_max: Some("lots".into()),
            rate: Some(1.5.into()),
        }];
        let errors = validate_city_rows(&rows).unwrap_err();
        assert_eq!(errors.len(), 1);
        let message = &errors[0];
        assert!(message.starts_with("Row 2: "));
        assert!(message.contains("city_name"));
        assert!(message.contains("year"));
        assert!(message.contains("base_min"));
        assert!(message.contains("base_max"));
        assert!(message.contains("rate"));
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        let rows = vec![
            city("佛山", "٢٠٢٤".into(), 5284.0, 26421.0, 0.15),
            city("广州", "２０２４".into(), 5500.0, 28074.0, 0.155),
        ];
        let errors = validate_city_rows(&rows).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Row 2: year must be 4 digits (YYYY)".to_string(),
                "Row 3: year must be 4 digits (YYYY)".to_string(),
            ]
        );

        let rows = vec![salary("EMP001", "张三", "２０２４０１", Cell::Number(8000.0))];
        let errors = validate_salary_rows(&rows).unwrap_err();
        assert_eq!(errors, vec!["Row 2: month must be 6 digits (YYYYMM)".to_string()]);
    }

    #[test]
    fn accepts_valid_salary_rows() {
        let rows = vec![
            salary("EMP001", "张三", "202401", Cell::Number(8000.0)),
            salary("EMP001", "张三", "202402", "8000.50".into()),
        ];
        let records = validate_salary_rows(&rows).unwrap();
        assert_eq!(records[1].salary_amount, 8000.5);
    }

    #[test]
    fn rejects_bad_salary_rows_and_keeps_going() {
        let rows = vec![
            salary("EMP001", "张三", "2024-01", Cell::Number(8000.0)),
            salary("EMP001", "张三", "202402", Cell::Number(8000.0)),
            salary("", "李四", "202401", Cell::Number(0.0)),
            SalaryUpload::default(),
        ];
        let errors = validate_salary_rows(&rows).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "Row 2: month must be 6 digits (YYYYMM)");
        assert!(errors[1].starts_with("Row 4: employee_id"));
        assert!(errors[1].contains("salary_amount"));
        assert!(errors[2].starts_with("Row 5: "));
    }

    #[test]
    fn empty_batch_is_valid() {
        assert!(validate_salary_rows(&[]).unwrap().is_empty());
        assert!(validate_city_rows(&[]).unwrap().is_empty());
    }
}
