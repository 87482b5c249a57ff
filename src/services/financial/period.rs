use crate::services::errors::ServiceError;
use std::fmt;
use std::str::FromStr;

/// Column granularity of the financial statement table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Yearly,
    Quarterly,
}

impl Period {
    /// Column key of a report, e.g. `2023` or `2023Q2`.
    /// Quarterly keys need a `Qn` quarter; other reports have no quarterly column.
    pub fn report_key(&self, year: i32, quarter: Option<&str>) -> Option<String> {
        match self {
            Period::Yearly => Some(year.to_string()),
            Period::Quarterly => {
                let n = quarter?.strip_prefix('Q')?.chars().next()?;
                Some(format!("{}Q{}", year, n))
            }
        }
    }

    /// Every column key between the two years, in display order.
    pub fn keys(&self, first_year: i32, last_year: i32) -> Vec<String> {
        match self {
            Period::Yearly => (first_year..=last_year).map(|y| y.to_string()).collect(),
            Period::Quarterly => (first_year..=last_year)
                .flat_map(|y| (1..=4).map(move |q| format!("{}Q{}", y, q)))
                .collect(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Yearly => write!(f, "yearly"),
            Period::Quarterly => write!(f, "quarterly"),
        }
    }
}

impl FromStr for Period {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yearly" => Ok(Period::Yearly),
            "quarterly" => Ok(Period::Quarterly),
            other => Err(ServiceError::BadRequest(format!(
                "Invalid period '{}', expected 'yearly' or 'quarterly'",
                other
            ))),
        }
    }
}
