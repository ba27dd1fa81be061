//! Configuration types for statutory rulesets and ingestion.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::CanonicalField;

/// One progressive tax band.
///
/// Bands are applied cumulatively from the lowest upward. `width` is the size
/// of the income slice taxed at `rate`; an absent width means the band is
/// unbounded and must be the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    /// Width of the income slice, or `None` for the open top band.
    #[serde(default)]
    pub width: Option<Decimal>,
    /// Marginal rate for the slice.
    pub rate: Decimal,
}

/// Which statutory contributions are subtracted from gross before tax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxableDeductions {
    /// Pension contribution is tax deductible.
    #[serde(default)]
    pub pension: bool,
    /// Health contribution is tax deductible.
    #[serde(default)]
    pub health: bool,
    /// Housing levy is tax deductible.
    #[serde(default)]
    pub levy: bool,
}

/// The income tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    /// Fixed monthly personal relief subtracted from computed tax.
    pub personal_relief: Decimal,
    /// Ordered progressive bands.
    pub bands: Vec<TaxBand>,
    /// Contributions deducted from gross to obtain the taxable base.
    #[serde(default)]
    pub deductible: TaxableDeductions,
}

/// One pension contribution tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTier {
    /// Width of the pensionable earnings slice covered by the tier.
    pub width: Decimal,
    /// Contribution rate on the slice.
    pub rate: Decimal,
}

/// The tiered pension schedule. Earnings above the last tier are not
/// pensionable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionSchedule {
    /// Ordered tiers.
    pub tiers: Vec<PensionTier>,
}

/// One row of a banded health contribution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBand {
    /// Inclusive upper bound of gross income, or `None` for the top band.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Flat contribution for gross incomes in this band.
    pub amount: Decimal,
}

/// The health contribution schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthSchedule {
    /// A flat percentage of gross, with an optional minimum contribution.
    Percentage {
        /// Contribution rate.
        rate: Decimal,
        /// Minimum contribution for any positive gross income.
        #[serde(default)]
        minimum: Option<Decimal>,
    },
    /// A flat fee looked up by gross income band.
    Banded {
        /// Bands ordered by ascending upper bound.
        bands: Vec<HealthBand>,
    },
}

/// The housing levy schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevySchedule {
    /// Levy rate on gross income.
    pub rate: Decimal,
}

/// Plausibility thresholds used when validating ingested records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryCaps {
    /// Largest plausible pension contribution.
    pub pension: Decimal,
    /// Largest plausible health contribution.
    pub health: Decimal,
    /// Largest plausible housing levy.
    pub levy: Decimal,
}

/// A complete, versioned set of statutory deduction rules.
///
/// Different rule generations coexist as separate rulesets; callers always
/// say which one applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Version label, unique among loaded rulesets.
    pub version: String,
    /// First date on which the ruleset applies.
    pub effective_date: NaiveDate,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Income tax schedule.
    pub tax: TaxSchedule,
    /// Pension schedule.
    pub pension: PensionSchedule,
    /// Health contribution schedule.
    pub health: HealthSchedule,
    /// Housing levy schedule.
    pub levy: LevySchedule,
    /// Plausibility thresholds for validation.
    pub caps: StatutoryCaps,
}

impl Ruleset {
    /// Checks the ruleset for internal consistency.
    ///
    /// Tax bands must be non-empty with only the last band unbounded, all
    /// rates must lie in `[0, 1]`, and tier widths and band bounds must be
    /// positive. Contributions deducted before tax must be percentage based
    /// with marginal rates summing below 1.
    pub fn validate(&self) -> PayrollResult<()> {
        let invalid = |message: String| PayrollError::InvalidRuleset {
            version: self.version.clone(),
            message,
        };
        let unit_interval = |rate: Decimal| rate >= Decimal::ZERO && rate <= Decimal::ONE;

        if self.tax.bands.is_empty() {
            return Err(invalid("tax bands are empty".to_string()));
        }
        let last_band = self.tax.bands.len() - 1;
        for (index, band) in self.tax.bands.iter().enumerate() {
            if !unit_interval(band.rate) {
                return Err(invalid(format!("tax band {} rate {} is outside 0..1", index + 1, band.rate)));
            }
            match band.width {
                Some(width) if width <= Decimal::ZERO => {
                    return Err(invalid(format!("tax band {} width must be positive", index + 1)));
                }
                None if index != last_band => {
                    return Err(invalid(format!(
                        "tax band {} is unbounded but is not the last band",
                        index + 1
                    )));
                }
                _ => {}
            }
        }
        if self.tax.personal_relief < Decimal::ZERO {
            return Err(invalid("personal relief is negative".to_string()));
        }

        for (index, tier) in self.pension.tiers.iter().enumerate() {
            if tier.width <= Decimal::ZERO {
                return Err(invalid(format!("pension tier {} width must be positive", index + 1)));
            }
            if !unit_interval(tier.rate) {
                return Err(invalid(format!("pension tier {} rate {} is outside 0..1", index + 1, tier.rate)));
            }
        }

        match &self.health {
            HealthSchedule::Percentage { rate, .. } if !unit_interval(*rate) => {
                return Err(invalid(format!("health rate {} is outside 0..1", rate)));
            }
            HealthSchedule::Banded { bands } if bands.is_empty() => {
                return Err(invalid("health bands are empty".to_string()));
            }
            _ => {}
        }

        if !unit_interval(self.levy.rate) {
            return Err(invalid(format!("levy rate {} is outside 0..1", self.levy.rate)));
        }

        // Deducting contributions must never shrink the taxable base as gross grows.
        let deductible = &self.tax.deductible;
        let mut marginal = Decimal::ZERO;
        if deductible.pension {
            marginal += self
                .pension
                .tiers
                .iter()
                .map(|tier| tier.rate)
                .max()
                .unwrap_or(Decimal::ZERO);
        }
        if deductible.health {
            match &self.health {
                HealthSchedule::Percentage { rate, .. } => marginal += *rate,
                HealthSchedule::Banded { .. } => {
                    return Err(invalid(
                        "banded health fees cannot be deductible before tax".to_string(),
                    ));
                }
            }
        }
        if deductible.levy {
            marginal += self.levy.rate;
        }
        if marginal >= Decimal::ONE {
            return Err(invalid(format!(
                "deductible contribution rates sum to {} (must stay below 1)",
                marginal
            )));
        }

        Ok(())
    }
}

/// Fixed ratios used to estimate statutory amounts when a sheet carries no
/// deduction columns at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateRatios {
    /// Share of gross estimated as income tax.
    pub tax_rate: Decimal,
    /// Share of gross estimated as pension, capped by the ruleset cap.
    pub pension_rate: Decimal,
    /// Share of gross estimated as health contribution, capped by the ruleset cap.
    pub health_rate: Decimal,
    /// Share of gross estimated as housing levy.
    pub levy_rate: Decimal,
}

impl Default for EstimateRatios {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(30, 2),
            pension_rate: Decimal::new(15, 3),
            health_rate: Decimal::new(1, 2),
            levy_rate: Decimal::new(15, 3),
        }
    }
}

/// Tunable thresholds of the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// How many leading rows are searched for an embedded header.
    pub header_scan_rows: usize,
    /// Minimum number of mapped fields for a row to be accepted.
    pub min_mapped_fields: usize,
    /// Alias hits needed for the first data row to count as a repeated header.
    pub header_echo_min_matches: usize,
    /// Share of net income available as an earned-wage advance.
    pub advance_ratio: Decimal,
    /// Ratios for estimated statutory amounts in pattern mode.
    pub estimates: EstimateRatios,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            min_mapped_fields: 3,
            header_echo_min_matches: 2,
            advance_ratio: Decimal::new(5, 1),
            estimates: EstimateRatios::default(),
        }
    }
}

/// Extra header aliases per canonical field, merged after the built-in ones.
pub type AliasOverrides = HashMap<CanonicalField, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_ruleset() -> Ruleset {
        Ruleset {
            version: "test".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: String::new(),
            tax: TaxSchedule {
                personal_relief: dec("2400"),
                bands: vec![
                    TaxBand {
                        width: Some(dec("24000")),
                        rate: dec("0.10"),
                    },
                    TaxBand {
                        width: None,
                        rate: dec("0.30"),
                    },
                ],
                deductible: TaxableDeductions::default(),
            },
            pension: PensionSchedule {
                tiers: vec![
                    PensionTier {
                        width: dec("6000"),
                        rate: dec("0.06"),
                    },
                    PensionTier {
                        width: dec("12000"),
                        rate: dec("0.06"),
                    },
                ],
            },
            health: HealthSchedule::Percentage {
                rate: dec("0.0275"),
                minimum: None,
            },
            levy: LevySchedule { rate: dec("0.015") },
            caps: StatutoryCaps {
                pension: dec("1080"),
                health: dec("5000"),
                levy: dec("5000"),
            },
        }
    }

    #[test]
    fn test_valid_ruleset_passes() {
        assert!(sample_ruleset().validate().is_ok());
    }

    #[test]
    fn test_empty_bands_rejected() {
        let mut ruleset = sample_ruleset();
        ruleset.tax.bands.clear();
        match ruleset.validate() {
            Err(PayrollError::InvalidRuleset { version, message }) => {
                assert_eq!(version, "test");
                assert!(message.contains("empty"));
            }
            other => panic!("Expected InvalidRuleset, got {:?}", other),
        }
    }

    #[test]
    fn test_unbounded_band_must_be_last() {
        let mut ruleset = sample_ruleset();
        ruleset.tax.bands.swap(0, 1);
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_rate_above_one_rejected() {
        let mut ruleset = sample_ruleset();
        ruleset.levy.rate = dec("1.5");
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_zero_width_tier_rejected() {
        let mut ruleset = sample_ruleset();
        ruleset.pension.tiers[1].width = Decimal::ZERO;
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_banded_health_cannot_be_deductible() {
        let mut ruleset = sample_ruleset();
        ruleset.health = HealthSchedule::Banded {
            bands: vec![HealthBand {
                up_to: None,
                amount: dec("500"),
            }],
        };
        assert!(ruleset.validate().is_ok());

        ruleset.tax.deductible.health = true;
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_deductible_rates_must_stay_below_one() {
        let mut ruleset = sample_ruleset();
        ruleset.tax.deductible = TaxableDeductions {
            pension: true,
            health: true,
            levy: true,
        };
        assert!(ruleset.validate().is_ok());

        ruleset.levy.rate = dec("0.95");
        match ruleset.validate() {
            Err(PayrollError::InvalidRuleset { message, .. }) => {
                assert!(message.contains("below 1"));
            }
            other => panic!("Expected InvalidRuleset, got {:?}", other),
        }
    }

    #[test]
    fn test_health_schedule_deserializes_tagged() {
        let yaml = "type: banded\nbands:\n  - { up_to: 5999, amount: 150 }\n  - { amount: 1700 }\n";
        let schedule: HealthSchedule = serde_yaml::from_str(yaml).unwrap();
        match schedule {
            HealthSchedule::Banded { bands } => {
                assert_eq!(bands.len(), 2);
                assert_eq!(bands[0].up_to, Some(dec("5999")));
                assert_eq!(bands[1].up_to, None);
                assert_eq!(bands[1].amount, dec("1700"));
            }
            other => panic!("Expected banded schedule, got {:?}", other),
        }
    }

    #[test]
    fn test_ingest_settings_defaults_fill_missing_keys() {
        let settings: IngestSettings = serde_yaml::from_str("header_scan_rows: 5\n").unwrap();
        assert_eq!(settings.header_scan_rows, 5);
        assert_eq!(settings.min_mapped_fields, 3);
        assert_eq!(settings.advance_ratio, dec("0.5"));
        assert_eq!(settings.estimates.tax_rate, dec("0.30"));
    }
}
