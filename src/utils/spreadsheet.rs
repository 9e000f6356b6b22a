//! CSV import/export for the operator-facing spreadsheets.
//!
//! Headers may be in Chinese or English; every accepted alias maps to one
//! field. Unknown columns are ignored.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::model::{
    calculation_result::CalculationResult,
    upload::{Cell, CityUpload, SalaryUpload},
};
use crate::utils::money::format_amount;

const CITY_NAME: &[&str] = &["城市名", "city_name", "城市名称"];
const YEAR: &[&str] = &["年份", "year"];
const BASE_MIN: &[&str] = &["基数下限", "base_min", "社保基数下限"];
const BASE_MAX: &[&str] = &["基数上限", "base_max", "社保基数上限"];
const RATE: &[&str] = &["缴纳比例", "rate", "综合缴纳比例"];

const EMPLOYEE_ID: &[&str] = &["员工工号", "employee_id", "工号"];
const EMPLOYEE_NAME: &[&str] = &["员工姓名", "employee_name", "姓名"];
const MONTH: &[&str] = &["年月", "month", "年份月份"];
const SALARY_AMOUNT: &[&str] = &["工资金额", "salary_amount", "工资"];

const EXPORT_HEADERS: [&str; 7] = [
    "员工姓名",
    "城市",
    "年份",
    "月平均工资",
    "缴费基数",
    "公司缴纳金额",
    "计算时间",
];

/// Header name → column index, BOM stripped.
struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let map = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        HeaderIndex(map)
    }

    /// First alias present in the header row wins.
    fn cell(&self, record: &csv::StringRecord, aliases: &[&str]) -> Option<Cell> {
        aliases
            .iter()
            .find_map(|alias| self.0.get(*alias))
            .and_then(|i| record.get(*i))
            .and_then(Cell::from_raw)
    }
}

fn read_rows<T>(
    data: &[u8],
    build: impl Fn(&HeaderIndex, &csv::StringRecord) -> T,
) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = HeaderIndex::new(reader.headers().context("Failed to read CSV header row")?);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at row {}", i + 2))?;
        rows.push(build(&headers, &record));
    }
    Ok(rows)
}

pub fn parse_cities_csv(data: &[u8]) -> Result<Vec<CityUpload>> {
    read_rows(data, |h, r| CityUpload {
        city_name: h.cell(r, CITY_NAME),
        year: h.cell(r, YEAR),
        base_min: h.cell(r, BASE_MIN),
        base_max: h.cell(r, BASE_MAX),
        rate: h.cell(r, RATE),
    })
}

pub fn parse_salaries_csv(data: &[u8]) -> Result<Vec<SalaryUpload>> {
    read_rows(data, |h, r| SalaryUpload {
        employee_id: h.cell(r, EMPLOYEE_ID),
        employee_name: h.cell(r, EMPLOYEE_NAME),
        month: h.cell(r, MONTH),
        salary_amount: h.cell(r, SALARY_AMOUNT),
    })
}

fn write_csv(headers: &[&str], rows: Vec<Vec<String>>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
}

pub fn export_results_csv(results: &[CalculationResult]) -> Result<Vec<u8>> {
    let rows = results
        .iter()
        .map(|r| {
            vec![
                r.employee_name.clone(),
                r.city_name.clone(),
                r.year.clone(),
                format_amount(r.avg_salary),
                format_amount(r.contribution_base),
                format_amount(r.company_fee),
                r.calculated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    write_csv(&EXPORT_HEADERS, rows)
}

pub fn cities_template() -> Result<Vec<u8>> {
    write_csv(
        &[CITY_NAME[0], YEAR[0], BASE_MIN[0], BASE_MAX[0], RATE[0]],
        vec![vec![
            "佛山".into(),
            "2024".into(),
            "5284".into(),
            "26421".into(),
            "0.15".into(),
        ]],
    )
}

pub fn salaries_template() -> Result<Vec<u8>> {
    let rows = [
        ("EMP001", "张三", "202401", "8000"),
        ("EMP001", "张三", "202402", "8000"),
        ("EMP002", "李四", "202401", "15000"),
    ]
    .iter()
    .map(|(id, name, month, amount)| {
        vec![id.to_string(), name.to_string(), month.to_string(), amount.to_string()]
    })
    .collect();
    write_csv(
        &[EMPLOYEE_ID[0], EMPLOYEE_NAME[0], MONTH[0], SALARY_AMOUNT[0]],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::{validate_city_rows, validate_salary_rows};
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_chinese_city_headers() {
        let csv = "\u{feff}城市名,年份,基数下限,基数上限,缴纳比例\n佛山,2024,5284,26421,0.15\n";
        let rows = parse_cities_csv(csv.as_bytes()).unwrap();
        let rules = validate_city_rows(&rows).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].city_name, "佛山");
        assert_eq!(rules[0].year, "2024");
        assert_eq!(rules[0].base_max, 26421.0);
        assert_eq!(rules[0].rate, 0.15);
    }

    #[test]
    fn parses_english_salary_headers_and_blanks() {
        let csv = "employee_id,employee_name,month,salary_amount,note\n\
                   EMP001,张三,202401,8000,x\n\
                   EMP002,,202401,15000,\n";
        let rows = parse_salaries_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].employee_name.is_none());

        let errors = validate_salary_rows(&rows).unwrap_err();
        assert_eq!(errors, vec!["Row 3: employee_name must not be empty".to_string()]);
    }

    #[test]
    fn alternate_aliases_are_accepted() {
        let csv = "工号,姓名,年份月份,工资\n007,王五,202403,5000\n";
        let rows = parse_salaries_csv(csv.as_bytes()).unwrap();
        let records = validate_salary_rows(&rows).unwrap();
        assert_eq!(records[0].employee_id, "007");
        assert_eq!(records[0].salary_amount, 5000.0);
    }

    #[test]
    fn templates_round_trip_through_validation() {
        let cities = parse_cities_csv(&cities_template().unwrap()).unwrap();
        assert_eq!(validate_city_rows(&cities).unwrap().len(), 1);

        let salaries = parse_salaries_csv(&salaries_template().unwrap()).unwrap();
        let records = validate_salary_rows(&salaries).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].employee_name, "李四");
    }

    #[test]
    fn exports_results_with_two_decimals() {
        let results = vec![CalculationResult {
            employee_name: "王五".into(),
            city_name: "佛山".into(),
            year: "2024".into(),
            avg_salary: 5000.0,
            contribution_base: 5284.0,
            company_fee: 792.6,
            calculated_at: Utc.with_ymd_and_hms(2024, 7, 1, 8, 30, 0).unwrap(),
        }];
        let text = String::from_utf8(export_results_csv(&results).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "员工姓名,城市,年份,月平均工资,缴费基数,公司缴纳金额,计算时间"
        );
        assert_eq!(
            lines.next().unwrap(),
            "王五,佛山,2024,5000.00,5284.00,792.60,2024-07-01 08:30:00"
        );
    }
}
