//! Filtered gross-margin aggregation over sales records

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

use super::{InterpretError, RuleResult};

/// Sat Mar 12 2022 10:02:11 GMT+0530 (India Standard Time)
const GAMMA_BRAZIL_CUTOFF: &str = "2022-03-12T10:02:11+05:30";

/// Filter applied before summing sales and cost
#[derive(Debug, Clone)]
pub struct MarginQuery {
    /// Product name, compared case-insensitively after normalization
    pub product: String,
    /// Accepted country spellings, uppercase
    pub countries: Vec<String>,
    /// Inclusive upper bound on the transaction date
    pub cutoff: DateTime<FixedOffset>,
}

impl MarginQuery {
    /// The known "Gamma sold in BR" question
    pub fn gamma_brazil() -> Result<Self, InterpretError> {
        let cutoff = DateTime::parse_from_rfc3339(GAMMA_BRAZIL_CUTOFF)
            .map_err(|e| InterpretError::malformed(format!("invalid cutoff: {}", e)))?;

        Ok(Self {
            product: "Gamma".to_string(),
            countries: ["BR", "BRA", "BRAZIL", "BRASIL"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            cutoff,
        })
    }

    fn matches_product(&self, raw: &str) -> bool {
        let name = raw.split('/').next().unwrap_or(raw).trim();
        name.eq_ignore_ascii_case(self.product.trim())
    }

    fn matches_country(&self, raw: &str) -> bool {
        let country = raw.trim().to_uppercase();
        self.countries.iter().any(|c| *c == country)
    }
}

/// Compute `(sales - cost) / sales` over matching rows, to 4 decimals.
///
/// Fails with `MalformedInput` when no sales survive the filter.
pub fn compute_margin(data: &[u8], query: &MarginQuery) -> RuleResult {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, InterpretError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| InterpretError::malformed(format!("missing column '{}'", name)))
    };

    let product_idx = column("Product")?;
    let country_idx = column("Country")?;
    let sales_idx = column("Sales")?;
    let date_idx = column("Date")?;
    let cost_idx = column("Cost").ok();

    let mut total_sales = 0.0_f64;
    let mut total_cost = 0.0_f64;
    let mut matched = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        if !query.matches_product(field(product_idx)) || !query.matches_country(field(country_idx)) {
            continue;
        }

        let date = parse_date(field(date_idx), *query.cutoff.offset())
            .map_err(|e| InterpretError::malformed(format!("line {}: {}", line, e)))?;
        if date > query.cutoff {
            continue;
        }

        let sales = parse_amount(field(sales_idx))
            .map_err(|e| InterpretError::malformed(format!("line {}: Sales {}", line, e)))?;
        let cost = match cost_idx.map(field).map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => parse_amount(raw)
                .map_err(|e| InterpretError::malformed(format!("line {}: Cost {}", line, e)))?,
            None => sales * 0.5,
        };

        total_sales += sales;
        total_cost += cost;
        matched += 1;
    }

    tracing::debug!(
        "Margin over {} rows: sales={}, cost={}",
        matched,
        total_sales,
        total_cost
    );

    if total_sales == 0.0 {
        return Err(InterpretError::malformed(format!(
            "total sales for {} is zero across {} matching rows; margin is undefined",
            query.product, matched
        )));
    }

    Ok(format!("{:.4}", (total_sales - total_cost) / total_sales))
}

/// Parse a currency amount such as `"100USD"` or `" 20.5 usd "`
fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let number = match trimmed.len().checked_sub(3).and_then(|at| trimmed.get(at..).map(|s| (at, s))) {
        Some((at, suffix)) if suffix.eq_ignore_ascii_case("usd") => trimmed[..at].trim(),
        _ => trimmed,
    };

    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{}' is not a number", raw))
}

/// Parse a transaction date; naive values are read in `offset`
fn parse_date(raw: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }

    // JavaScript Date.toString(): "Sat Mar 12 2022 10:02:11 GMT+0530 (India Standard Time)"
    let js = raw.split(" (").next().unwrap_or(raw);
    if let Ok(dt) = DateTime::parse_from_str(js, "%a %b %d %Y %H:%M:%S GMT%z") {
        return Ok(dt);
    }

    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%m/%d/%Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("unrecognised date '{}'", raw))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous date '{}'", raw))
}
