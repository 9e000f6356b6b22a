use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::MySqlPool;
use tracing::debug;

use super::{ContributionStore, ResultFilter, StoreResult, TableCounts};
use crate::model::{
    calculation_result::CalculationResult, city_rule::CityRule, salary::SalaryRecord,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        city_name VARCHAR(64) NOT NULL,
        year CHAR(4) NOT NULL,
        base_min DOUBLE NOT NULL,
        base_max DOUBLE NOT NULL,
        rate DOUBLE NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE KEY uq_cities_city_year (city_name, year)
    ) DEFAULT CHARSET = utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS salaries (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(64) NOT NULL,
        employee_name VARCHAR(128) NOT NULL,
        month CHAR(6) NOT NULL,
        salary_amount DOUBLE NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE KEY uq_salaries_employee_month (employee_id, month),
        KEY idx_salaries_month (month)
    ) DEFAULT CHARSET = utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS results (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_name VARCHAR(128) NOT NULL,
        city_name VARCHAR(64) NOT NULL,
        year CHAR(4) NOT NULL,
        avg_salary DOUBLE NOT NULL,
        contribution_base DOUBLE NOT NULL,
        company_fee DOUBLE NOT NULL,
        calculated_at TIMESTAMP NOT NULL,
        UNIQUE KEY uq_results_employee_city_year (employee_name, city_name, year)
    ) DEFAULT CHARSET = utf8mb4
    "#,
];

const RESULT_COLUMNS: &str =
    "employee_name, city_name, year, avg_salary, contribution_base, company_fee, calculated_at";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates the three tables when they are missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn count(&self, table: &str) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

/// Escapes LIKE wildcards so the name filter matches literally, with `!` as the escape character.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// WHERE clause and bind values for a result filter.
fn result_where(filter: &ResultFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut bindings = Vec::new();

    if !filter.cities.is_empty() {
        conditions.push(format!("city_name IN ({})", placeholders(filter.cities.len())));
        bindings.extend(filter.cities.iter().cloned());
    }

    if !filter.years.is_empty() {
        conditions.push(format!("year IN ({})", placeholders(filter.years.len())));
        bindings.extend(filter.years.iter().cloned());
    }

    if let Some(name) = &filter.employee_name {
        conditions.push("LOWER(employee_name) LIKE ? ESCAPE '!'".to_string());
        bindings.push(format!("%{}%", escape_like(&name.to_lowercase())));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, bindings)
}

#[async_trait]
impl ContributionStore for MySqlStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn fetch_city_rule(&self, city_name: &str, year: &str) -> StoreResult<Option<CityRule>> {
        let rule = sqlx::query_as::<_, CityRule>(
            r#"
            SELECT city_name, year, base_min, base_max, rate
            FROM cities
            WHERE city_name = ? AND year = ?
            "#,
        )
        .bind(city_name)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rule)
    }

    async fn fetch_salaries(&self, year: &str) -> StoreResult<Vec<SalaryRecord>> {
        let records = sqlx::query_as::<_, SalaryRecord>(
            r#"
            SELECT employee_id, employee_name, month, salary_amount
            FROM salaries
            WHERE month LIKE ?
            ORDER BY employee_name ASC, month ASC
            "#,
        )
        .bind(format!("{}%", year))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn upsert_result(&self, result: &CalculationResult) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO results
            (employee_name, city_name, year, avg_salary, contribution_base, company_fee, calculated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                avg_salary = VALUES(avg_salary),
                contribution_base = VALUES(contribution_base),
                company_fee = VALUES(company_fee),
                calculated_at = VALUES(calculated_at)
            "#,
        )
        .bind(&result.employee_name)
        .bind(&result.city_name)
        .bind(&result.year)
        .bind(result.avg_salary)
        .bind(result.contribution_base)
        .bind(result.company_fee)
        .bind(result.calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_city_rules(&self) -> StoreResult<Vec<CityRule>> {
        let rules = sqlx::query_as::<_, CityRule>(
            r#"
            SELECT city_name, year, base_min, base_max, rate
            FROM cities
            ORDER BY city_name ASC, year ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    async fn upsert_city_rules(&self, rules: &[CityRule]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for rule in rules {
            sqlx::query(
                r#"
                INSERT INTO cities (city_name, year, base_min, base_max, rate)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    base_min = VALUES(base_min),
                    base_max = VALUES(base_max),
                    rate = VALUES(rate)
                "#,
            )
            .bind(&rule.city_name)
            .bind(&rule.year)
            .bind(rule.base_min)
            .bind(rule.base_max)
            .bind(rule.rate)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(rows = rules.len(), "City rules upserted");
        Ok(())
    }

    async fn upsert_salaries(&self, records: &[SalaryRecord]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                r#"
                INSERT INTO salaries (employee_id, employee_name, month, salary_amount)
                VALUES (?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    employee_name = VALUES(employee_name),
                    salary_amount = VALUES(salary_amount)
                "#,
            )
            .bind(&record.employee_id)
            .bind(&record.employee_name)
            .bind(&record.month)
            .bind(record.salary_amount)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(rows = records.len(), "Salaries upserted");
        Ok(())
    }

    async fn salary_years(&self) -> StoreResult<Vec<String>> {
        let mut stream = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT DISTINCT LEFT(month, 4) AS year
            FROM salaries
            ORDER BY year DESC
            "#,
        )
        .fetch(&self.pool);

        let mut years = Vec::new();
        while let Some(row) = stream.next().await {
            let (year,) = row?;
            years.push(year);
        }
        Ok(years)
    }

    async fn list_results(&self, filter: &ResultFilter) -> StoreResult<Vec<CalculationResult>> {
        let (where_clause, bindings) = result_where(filter);
        let sql = format!(
            "SELECT {} FROM results {} ORDER BY calculated_at DESC, employee_name ASC",
            RESULT_COLUMNS, where_clause
        );
        debug!(sql = %sql, bindings = ?bindings, "Fetching results");

        let mut query = sqlx::query_as::<_, CalculationResult>(&sql);
        for b in &bindings {
            query = query.bind(b);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn result_cities(&self) -> StoreResult<Vec<String>> {
        let cities = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT city_name FROM results ORDER BY city_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cities)
    }

    async fn result_years(&self) -> StoreResult<Vec<String>> {
        let years = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT year FROM results ORDER BY year DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }

    async fn table_counts(&self) -> StoreResult<TableCounts> {
        Ok(TableCounts {
            cities: self.count("cities").await?,
            salaries: self.count("salaries").await?,
            results: self.count("results").await?,
        })
    }
}
