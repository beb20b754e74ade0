//! Root-cause classification catalog.
//!
//! Which root causes count as customer-caused and which as vendor-caused is
//! data, not logic: the catalog is read from a JSON document when one is
//! supplied and falls back to the built-in lists otherwise.

use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootCauseCatalog {
    /// Label used for the vendor-caused KPI.
    #[serde(default = "default_vendor_name")]
    pub vendor_name: String,
    #[serde(default)]
    pub customer_caused: Vec<String>,
    #[serde(default)]
    pub vendor_caused: Vec<String>,
}

fn default_vendor_name() -> String {
    "Vodacom".to_string()
}

static DEFAULT_CATALOG: Lazy<RootCauseCatalog> = Lazy::new(|| RootCauseCatalog {
    vendor_name: default_vendor_name(),
    customer_caused: [
        "Power failure – Customer site",
        "Client power issue",
        "Customer Caused Interruptions",
        "Power",
        "Power Failure",
        "Fault Is On Customer Side",
        "Power disconnect – Cust Edge d",
        "disconnect – Customer Edge dev",
        "Customer Interruption",
        "Customer Interruption – Mainte",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect(),
    vendor_caused: [
        "Source site Power failure",
        "Power failure – Vodacom site",
        "Database outage",
        "Power failure - Vodacom site",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect(),
});

impl Default for RootCauseCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

/// Lower-cased lookup sets built from a catalog.
#[derive(Debug, Clone)]
pub struct Classifier {
    pub vendor_name: String,
    customer: HashSet<String>,
    vendor: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Customer,
    Vendor,
    Unclassified,
}

impl Classifier {
    /// Exact match after lower-casing; no substring matching.
    pub fn classify(&self, root_cause: &str) -> Cause {
        let key = root_cause.to_lowercase();
        if self.customer.contains(&key) {
            Cause::Customer
        } else if self.vendor.contains(&key) {
            Cause::Vendor
        } else {
            Cause::Unclassified
        }
    }
}

impl RootCauseCatalog {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&text)?;
        info!(
            "Loaded root-cause catalog from {} ({} customer, {} vendor entries)",
            path.display(),
            catalog.customer_caused.len(),
            catalog.vendor_caused.len()
        );
        Ok(catalog)
    }

    /// Build the lookup sets, rejecting catalogs whose lists overlap.
    pub fn classifier(&self) -> Result<Classifier> {
        let customer: HashSet<String> =
            self.customer_caused.iter().map(|s| s.to_lowercase()).collect();
        let vendor: HashSet<String> =
            self.vendor_caused.iter().map(|s| s.to_lowercase()).collect();
        let mut overlap: Vec<&String> = customer.intersection(&vendor).collect();
        if !overlap.is_empty() {
            overlap.sort();
            let names: Vec<&str> = overlap.iter().map(|s| s.as_str()).collect();
            return Err(ReportError::Config(format!(
                "root causes listed as both customer- and vendor-caused: {}",
                names.join(", ")
            )));
        }
        debug!(
            "Classifier ready: {} customer, {} vendor root causes",
            customer.len(),
            vendor.len()
        );
        Ok(Classifier {
            vendor_name: self.vendor_name.clone(),
            customer,
            vendor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_disjoint() {
        let classifier = RootCauseCatalog::default().classifier().unwrap();
        assert_eq!(classifier.vendor.len(), 4);
        assert_eq!(classifier.vendor_name, "Vodacom");
    }

    #[test]
    fn classify_is_case_insensitive_and_exact() {
        let classifier = RootCauseCatalog::default().classifier().unwrap();
        assert_eq!(classifier.classify("POWER"), Cause::Customer);
        assert_eq!(classifier.classify("database OUTAGE"), Cause::Vendor);
        assert_eq!(classifier.classify("Power surge"), Cause::Unclassified);
    }

    #[test]
    fn json_catalog_overrides_lists() {
        let catalog = RootCauseCatalog::from_json(
            r#"{"vendor_name": "Acme", "customer_caused": ["Cable cut"], "vendor_caused": ["Router crash"]}"#,
        )
        .unwrap();
        let classifier = catalog.classifier().unwrap();
        assert_eq!(classifier.vendor_name, "Acme");
        assert_eq!(classifier.classify("cable cut"), Cause::Customer);
        assert_eq!(classifier.classify("Power"), Cause::Unclassified);
    }

    #[test]
    fn vendor_name_defaults_when_omitted() {
        let catalog = RootCauseCatalog::from_json(r#"{"customer_caused": ["x"]}"#).unwrap();
        assert_eq!(catalog.vendor_name, "Vodacom");
        assert!(catalog.vendor_caused.is_empty());
    }

    #[test]
    fn overlapping_lists_are_rejected() {
        let catalog = RootCauseCatalog::from_json(
            r#"{"customer_caused": ["Power"], "vendor_caused": ["power"]}"#,
        )
        .unwrap();
        match catalog.classifier() {
            Err(ReportError::Config(msg)) => assert!(msg.contains("power")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            RootCauseCatalog::from_json("{not json"),
            Err(ReportError::Json(_))
        ));
    }
}
