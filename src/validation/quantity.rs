//! Kubernetes resource quantities ("512Mi", "1.5", "500m", "1e3")

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

const SPLIT_PATTERN: &str = r"^([+-]?[0-9.]+)([eEinumkKMGTP]*[-+]?[0-9]*)$";

static SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(SPLIT_PATTERN).expect("quantity pattern is valid"));

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("number pattern is valid")
});

static EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[eE]([+-]?[0-9]+)$").expect("exponent pattern is valid"));

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantities must match the regular expression '{}'", SPLIT_PATTERN)]
    FormatWrong,

    #[error("unable to parse numeric part of quantity")]
    Numeric,

    #[error("unable to parse quantity's suffix")]
    Suffix,
}

/// A parsed quantity, scaled to base units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    value: f64,
}

impl Quantity {
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let captures = SPLIT.captures(input).ok_or(QuantityError::FormatWrong)?;
        let number = &captures[1];
        let suffix = &captures[2];

        if !NUMBER.is_match(number) {
            return Err(QuantityError::Numeric);
        }
        let base: f64 = number.parse().map_err(|_| QuantityError::Numeric)?;

        Ok(Self {
            value: base * multiplier(suffix)?,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

fn multiplier(suffix: &str) -> Result<f64, QuantityError> {
    let factor = match suffix {
        "" => 1.0,
        "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        other => {
            let exponent = EXPONENT
                .captures(other)
                .and_then(|c| c[1].parse::<i32>().ok())
                .ok_or(QuantityError::Suffix)?;
            10f64.powi(exponent)
        }
    };
    Ok(factor)
}
