//! Rating engine options.
//!
//! [`EngineOptions`] is both the configuration passed to the rating engine and the
//! hyperparameter vector searched by the optimizer. Only the three target
//! probabilities are part of the search space; the two integer fields are held at
//! their defaults.
//!
//! The engine reads options as camelCase JSON where every decimal is a string with
//! exactly four fractional digits:
//!
//! ```text
//! {
//!   "fakeMatchMaxDays": 99999,
//!   "maxEloHistory": 0,
//!   "evenMatchTargetProbability": "0.7500",
//!   "advantageMatchTargetProbability": "0.8500",
//!   "pwnageMatchTargetProbability": "0.9500"
//! }
//! ```
//!
//! Reading rejects probabilities outside [`PROBABILITY_RANGE`].

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

/// Valid range of every target probability.
pub const PROBABILITY_RANGE: RangeInclusive<f64> = 0.5..=1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub fake_match_max_days: i64,
    pub max_elo_history: i64,
    #[serde(with = "probability")]
    pub even_match_target_probability: f64,
    #[serde(with = "probability")]
    pub advantage_match_target_probability: f64,
    #[serde(with = "probability")]
    pub pwnage_match_target_probability: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fake_match_max_days: 99999,
            max_elo_history: 0,
            even_match_target_probability: 0.75,
            advantage_match_target_probability: 0.85,
            pwnage_match_target_probability: 0.95,
        }
    }
}

impl EngineOptions {
    /// Serializes the options in the engine's options-file format.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Field names and rendered values, in wire order.
    #[must_use]
    pub fn described(&self) -> [(&'static str, String); 5] {
        [
            ("fakeMatchMaxDays", self.fake_match_max_days.to_string()),
            ("maxEloHistory", self.max_elo_history.to_string()),
            (
                "evenMatchTargetProbability",
                probability::format(self.even_match_target_probability),
            ),
            (
                "advantageMatchTargetProbability",
                probability::format(self.advantage_match_target_probability),
            ),
            (
                "pwnageMatchTargetProbability",
                probability::format(self.pwnage_match_target_probability),
            ),
        ]
    }
}

impl fmt::Display for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.described().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Probabilities as four-digit decimal strings.
mod probability {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::PROBABILITY_RANGE;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(f64),
    }

    pub(super) fn format(value: f64) -> String {
        format!("{value:.4}")
    }

    pub(super) fn serialize<S>(value: &f64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format(*value))
    }

    pub(super) fn deserialize<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Repr::deserialize(d)? {
            Repr::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|e| de::Error::custom(format!("invalid decimal '{text}': {e}")))?,
            Repr::Number(n) => n,
        };
        if PROBABILITY_RANGE.contains(&value) {
            Ok(value)
        } else {
            Err(de::Error::custom(format!(
                "probability {value} is outside [{}, {}]",
                PROBABILITY_RANGE.start(),
                PROBABILITY_RANGE.end()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_file() {
        let json = EngineOptions::default().to_json_pretty().unwrap();
        assert_eq!(
            json,
            r#"{
  "fakeMatchMaxDays": 99999,
  "maxEloHistory": 0,
  "evenMatchTargetProbability": "0.7500",
  "advantageMatchTargetProbability": "0.8500",
  "pwnageMatchTargetProbability": "0.9500"
}"#
        );
    }

    #[test]
    fn decimals_are_rounded_to_four_digits() {
        let options = EngineOptions {
            even_match_target_probability: 0.612_345_6,
            ..EngineOptions::default()
        };
        let value = serde_json::to_value(options).unwrap();
        assert_eq!(value["evenMatchTargetProbability"], "0.6123");
    }

    #[test]
    fn reads_strings_numbers_and_missing_fields() {
        let options: EngineOptions = serde_json::from_str(
            r#"{"evenMatchTargetProbability": "0.6000", "pwnageMatchTargetProbability": 0.99}"#,
        )
        .unwrap();
        assert!((options.even_match_target_probability - 0.6).abs() < 1e-12);
        assert!((options.pwnage_match_target_probability - 0.99).abs() < 1e-12);
        assert!((options.advantage_match_target_probability - 0.85).abs() < 1e-12);
        assert_eq!(options.fake_match_max_days, 99999);
    }

    #[test]
    fn rejects_malformed_decimal() {
        let result: Result<EngineOptions, _> =
            serde_json::from_str(r#"{"evenMatchTargetProbability": "abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        for json in [
            r#"{"evenMatchTargetProbability": "0.2000"}"#,
            r#"{"advantageMatchTargetProbability": 1.5}"#,
            r#"{"pwnageMatchTargetProbability": "NaN"}"#,
        ] {
            let err = serde_json::from_str::<EngineOptions>(json).unwrap_err();
            assert!(err.to_string().contains("outside [0.5, 1]"), "{err}");
        }
        let bounds: EngineOptions = serde_json::from_str(
            r#"{"evenMatchTargetProbability": 0.5, "pwnageMatchTargetProbability": "1.0000"}"#,
        )
        .unwrap();
        assert!((bounds.pwnage_match_target_probability - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            EngineOptions::default().to_string(),
            "{fakeMatchMaxDays: 99999, maxEloHistory: 0, evenMatchTargetProbability: 0.7500, \
             advantageMatchTargetProbability: 0.8500, pwnageMatchTargetProbability: 0.9500}"
        );
    }

    #[test]
    fn described_follows_wire_order() {
        let described = EngineOptions::default().described();
        assert_eq!(described[0], ("fakeMatchMaxDays", "99999".to_owned()));
        assert_eq!(
            described[2],
            ("evenMatchTargetProbability", "0.7500".to_owned())
        );
    }
}
