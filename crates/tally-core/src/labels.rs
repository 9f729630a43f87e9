//! Label vocabulary and series identity.
//!
//! A [`LabelSet`] is the fixed, ordered list of label keys declared when an
//! instrument is created. Resolving a list of values against it yields a
//! [`SeriesKey`]: the owned value tuple itself, so equal value sequences are
//! always the same key and unequal ones never collide.

use std::sync::Arc;

use crate::error::{MetricsError, Result};

/// Ordered label keys of one instrument. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    keys: Arc<[String]>,
}

impl LabelSet {
    /// Declare a key vocabulary. Keys must be valid label names and unique.
    pub fn declare<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        let mut out: Vec<String> = Vec::new();
        out.try_reserve_exact(keys.len())?;

        for k in keys {
            let k = k.as_ref();
            validate_label_name(k)?;
            if out.iter().any(|seen| seen == k) {
                return Err(MetricsError::InvalidArity(format!(
                    "duplicate label key: {k}"
                )));
            }
            out.push(k.to_string());
        }

        Ok(Self { keys: out.into() })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn arity(&self) -> usize {
        self.keys.len()
    }

    /// Check arity only, without allocating a key.
    pub fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.keys.len() {
            return Err(MetricsError::ArityMismatch {
                expected: self.keys.len(),
                got,
            });
        }
        Ok(())
    }

    /// Resolve positional values to the series identity.
    pub fn resolve<S: AsRef<str>>(&self, values: &[S]) -> Result<SeriesKey> {
        self.check_arity(values.len())?;

        let mut out: Vec<String> = Vec::new();
        out.try_reserve_exact(values.len())?;
        out.extend(values.iter().map(|v| v.as_ref().to_string()));

        Ok(SeriesKey(out.into_boxed_slice()))
    }
}

/// Identity of one series: label values in declared key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey(Box<[String]>);

impl SeriesKey {
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// Label keys: `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn validate_label_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !ok {
        return Err(MetricsError::InvalidName(format!("label key {name:?}")));
    }
    Ok(())
}

/// Metric name segments: `[a-zA-Z_:][a-zA-Z0-9_:]*`, empty allowed.
pub fn validate_metric_segment(segment: &str) -> Result<()> {
    let mut chars = segment.chars();
    let ok = match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if !ok {
        return Err(MetricsError::InvalidName(format!("metric segment {segment:?}")));
    }
    Ok(())
}
