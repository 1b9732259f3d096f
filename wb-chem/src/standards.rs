use crate::{
    error::{BalanceError, Result},
    sample::{PoolType, WaterSample},
};
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// Readings a jurisdiction may regulate.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Ph,
    Alkalinity,
    Calcium,
    Cya,
    FreeChlorine,
    CombinedChlorine,
}

impl Reading {
    pub fn label(&self) -> &'static str {
        match self {
            Reading::Ph => "pH",
            Reading::Alkalinity => "Total Alkalinity",
            Reading::Calcium => "Calcium Hardness",
            Reading::Cya => "Cyanuric Acid",
            Reading::FreeChlorine => "Free Chlorine",
            Reading::CombinedChlorine => "Combined Chlorine",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Reading::Ph => "",
            _ => " ppm",
        }
    }

    /// The sample's value for this reading; chlorine is optional.
    pub fn value_in(&self, sample: &WaterSample) -> Option<f64> {
        match self {
            Reading::Ph => Some(sample.ph),
            Reading::Alkalinity => Some(sample.alkalinity),
            Reading::Calcium => Some(sample.calcium),
            Reading::Cya => Some(sample.cya),
            Reading::FreeChlorine => sample.free_chlorine,
            Reading::CombinedChlorine => sample.combined_chlorine(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a standards table. Either bound may be absent.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Rule {
    pub jurisdiction: String,
    pub pool_type: PoolType,
    #[serde(rename = "parameter")]
    pub reading: Reading,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Breach {
    Below,
    Above,
}

/// A reading outside a jurisdiction's limits.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub reading: Reading,
    pub value: f64,
    pub limit: f64,
    pub breach: Breach,
    pub message: String,
}

/// Regulatory min/max limits per jurisdiction and pool type, as supplied by the caller.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Standards {
    rules: Vec<Rule>,
}

impl Standards {
    /// Parse a standards table.
    ///
    /// Expected CSV columns: jurisdiction, pool_type, parameter, min, max
    pub fn from_csv(csv_object: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        let rules = rdr
            .deserialize()
            .collect::<std::result::Result<Vec<Rule>, csv::Error>>()?;
        debug!("Loaded {} standards rules", rules.len());
        Ok(Standards { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Distinct jurisdiction names, sorted.
    pub fn jurisdictions(&self) -> Vec<&str> {
        self.rules
            .iter()
            .map(|rule| rule.jurisdiction.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every reading in `sample` outside the limits for `jurisdiction` and
    /// `pool_type`, in table order. Missing chlorine readings are skipped.
    pub fn check(
        &self,
        jurisdiction: &str,
        pool_type: PoolType,
        sample: &WaterSample,
    ) -> Result<Vec<Violation>> {
        let rules: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| {
                rule.pool_type == pool_type && rule.jurisdiction.eq_ignore_ascii_case(jurisdiction)
            })
            .collect();
        if rules.is_empty() {
            return Err(BalanceError::Configuration(format!(
                "no standards for {pool_type} in '{jurisdiction}'"
            )));
        }

        let mut violations = Vec::new();
        for rule in rules {
            let Some(value) = rule.reading.value_in(sample) else {
                debug!("No {} reading to check", rule.reading);
                continue;
            };
            let breach = match (rule.min, rule.max) {
                (Some(min), _) if value < min => Some((Breach::Below, min, "minimum")),
                (_, Some(max)) if value > max => Some((Breach::Above, max, "maximum")),
                _ => None,
            };
            if let Some((breach, limit, bound)) = breach {
                let unit = rule.reading.unit();
                violations.push(Violation {
                    reading: rule.reading,
                    value,
                    limit,
                    breach,
                    message: format!(
                        "{} {}{} is {} the {} {} {} of {}{}",
                        rule.reading,
                        value,
                        unit,
                        if breach == Breach::Below { "below" } else { "above" },
                        rule.jurisdiction,
                        pool_type,
                        bound,
                        limit,
                        unit
                    ),
                });
            }
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARDS: &str = "\
jurisdiction,pool_type,parameter,min,max
Texas,pool,ph,7.2,7.8
Texas,pool,free_chlorine,1,8
Texas,pool,combined_chlorine,,0.5
Texas,pool,cya,,100
Texas,spa,ph,7.2,7.8
Texas,spa,free_chlorine,2,10
Florida,pool,ph,7.2,7.8
";

    #[test]
    fn test_parse_standards_csv() {
        let standards = Standards::from_csv(STANDARDS).unwrap();
        assert_eq!(standards.rules().len(), 7);
        assert_eq!(standards.rules()[2].reading, Reading::CombinedChlorine);
        assert_eq!(standards.rules()[2].min, None);
        assert_eq!(standards.rules()[2].max, Some(0.5));
        assert_eq!(standards.jurisdictions(), vec!["Florida", "Texas"]);
    }

    #[test]
    fn test_compliant_sample() {
        let standards = Standards::from_csv(STANDARDS).unwrap();
        let sample = WaterSample {
            free_chlorine: Some(3.0),
            total_chlorine: Some(3.2),
            ..Default::default()
        };
        let violations = standards.check("texas", PoolType::Pool, &sample).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_violations_in_table_order() {
        let standards = Standards::from_csv(STANDARDS).unwrap();
        let sample = WaterSample {
            ph: 8.0,
            cya: 120.0,
            free_chlorine: Some(0.5),
            total_chlorine: Some(1.5),
            ..Default::default()
        };
        let violations = standards.check("Texas", PoolType::Pool, &sample).unwrap();
        let readings: Vec<Reading> = violations.iter().map(|v| v.reading).collect();
        assert_eq!(
            readings,
            vec![
                Reading::Ph,
                Reading::FreeChlorine,
                Reading::CombinedChlorine,
                Reading::Cya
            ]
        );
        assert_eq!(violations[0].breach, Breach::Above);
        assert_eq!(violations[0].message, "pH 8 is above the Texas pool maximum of 7.8");
        assert_eq!(violations[1].breach, Breach::Below);
        assert_eq!(
            violations[1].message,
            "Free Chlorine 0.5 ppm is below the Texas pool minimum of 1 ppm"
        );
    }

    #[test]
    fn test_missing_chlorine_is_skipped() {
        let standards = Standards::from_csv(STANDARDS).unwrap();
        let violations = standards
            .check("Texas", PoolType::Spa, &WaterSample::default())
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_unknown_jurisdiction() {
        let standards = Standards::from_csv(STANDARDS).unwrap();
        let result = standards.check("Florida", PoolType::Spa, &WaterSample::default());
        assert!(matches!(result, Err(BalanceError::Configuration(_))));
    }

    #[test]
    fn test_unknown_parameter_fails_to_parse() {
        let csv = "jurisdiction,pool_type,parameter,min,max\nTexas,pool,bromine,1,3\n";
        assert!(matches!(
            Standards::from_csv(csv),
            Err(BalanceError::CsvParse(_))
        ));
    }
}
