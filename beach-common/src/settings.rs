use derivative::Derivative;
use displaydoc::Display;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::{str::FromStr, time::Duration};

/// How a match is brought to an end.
#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FinishCondition {
    /// Points keep being awarded to the last scorer whenever the per-point time runs out
    #[derivative(Default)]
    #[serde(rename = "Tempo Esgotado")]
    TimeExpired,
    /// Only explicit points count toward the set target
    #[serde(rename = "Número de Sets")]
    SetCount,
}

impl FinishCondition {
    pub fn label(self) -> &'static str {
        match self {
            Self::TimeExpired => "Tempo Esgotado",
            Self::SetCount => "Número de Sets",
        }
    }
}

impl core::fmt::Display for FinishCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FinishCondition {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum_iterator::all::<FinishCondition>()
            .find(|c| c.label() == s.trim())
            .ok_or_else(|| SettingsError::UnknownFinishCondition(s.to_string()))
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Score a team has to reach to win the match
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub number_of_sets: u32,
    /// Seconds before the last scorer is awarded another point
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub duration: u32,
    pub finish_conditions: FinishCondition,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            number_of_sets: 3,
            duration: 90,
            finish_conditions: FinishCondition::TimeExpired,
        }
    }
}

impl GameSettings {
    pub fn is_winning_score(&self, score: u32) -> bool {
        score >= self.number_of_sets
    }

    /// The delay before an automatic point, if the finish condition uses one
    pub fn auto_point_delay(&self) -> Option<Duration> {
        match self.finish_conditions {
            FinishCondition::TimeExpired => Some(Duration::from_secs(self.duration.into())),
            FinishCondition::SetCount => None,
        }
    }

    /// Checks values that came from outside the settings form (stored data, config files)
    pub fn validated(self) -> Result<Self, SettingsError> {
        check_positive(SettingsField::NumberOfSets, self.number_of_sets.into())?;
        check_positive(SettingsField::Duration, self.duration.into())?;
        Ok(self)
    }

    /// Produces the settings that result from merging `patch` into `self`. Nothing is merged
    /// unless every field in the patch is valid.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<Self, SettingsError> {
        let mut new = self.clone();

        if let Some(ref raw) = patch.number_of_sets {
            new.number_of_sets = parse_positive(SettingsField::NumberOfSets, raw)?;
        }
        if let Some(ref raw) = patch.duration {
            new.duration = parse_positive(SettingsField::Duration, raw)?;
        }
        if let Some(ref raw) = patch.finish_conditions {
            new.finish_conditions = raw.parse()?;
        }

        Ok(new)
    }
}

/// Raw values as typed into the settings form. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub number_of_sets: Option<String>,
    pub duration: Option<String>,
    pub finish_conditions: Option<String>,
}

impl SettingsPatch {
    pub fn number_of_sets(raw: impl Into<String>) -> Self {
        Self {
            number_of_sets: Some(raw.into()),
            ..Default::default()
        }
    }

    pub fn duration(raw: impl Into<String>) -> Self {
        Self {
            duration: Some(raw.into()),
            ..Default::default()
        }
    }

    pub fn finish_conditions(raw: impl Into<String>) -> Self {
        Self {
            finish_conditions: Some(raw.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    NumberOfSets,
    Duration,
}

impl core::fmt::Display for SettingsField {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::NumberOfSets => write!(f, "Número de Sets"),
            Self::Duration => write!(f, "Duração (s)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SettingsError {
    /// {field} must be a number, got `{value}`
    NotANumber { field: SettingsField, value: String },
    /// {field} must be greater than zero, got {value}
    NotPositive { field: SettingsField, value: i64 },
    /// {field} is too large: {value}
    TooLarge { field: SettingsField, value: i64 },
    /// Unknown finish condition `{0}`
    UnknownFinishCondition(String),
}

impl std::error::Error for SettingsError {}

fn check_positive(field: SettingsField, value: i64) -> Result<(), SettingsError> {
    if value <= 0 {
        Err(SettingsError::NotPositive { field, value })
    } else {
        Ok(())
    }
}

/// Fractional input is rounded up to the next whole number
fn parse_positive(field: SettingsField, raw: &str) -> Result<u32, SettingsError> {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.ceil() as i64)
            .ok_or_else(|| SettingsError::NotANumber {
                field,
                value: raw.to_string(),
            })?,
    };
    check_positive(field, value)?;
    u32::try_from(value).map_err(|_| SettingsError::TooLarge { field, value })
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.number_of_sets, 3);
        assert_eq!(settings.duration, 90);
        assert_eq!(settings.finish_conditions, FinishCondition::TimeExpired);
        assert_eq!(settings.auto_point_delay(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_stored_format() {
        let settings = GameSettings {
            number_of_sets: 5,
            duration: 30,
            finish_conditions: FinishCondition::SetCount,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(
            json,
            r#"{"numberOfSets":5,"duration":30,"finishConditions":"Número de Sets"}"#
        );
        assert_eq!(serde_json::from_str::<GameSettings>(&json).unwrap(), settings);
    }

    #[test]
    fn test_deser_form_strings() {
        // The settings form writes its numeric inputs back as strings
        let json = r#"{"numberOfSets":"7","duration":"45","finishConditions":"Tempo Esgotado"}"#;
        let settings: GameSettings = serde_json::from_str(json).unwrap();
        assert_eq!(
            settings,
            GameSettings {
                number_of_sets: 7,
                duration: 45,
                finish_conditions: FinishCondition::TimeExpired,
            }
        );
    }

    #[test]
    fn test_deser_toml() {
        const SETTINGS_STRING: &str = indoc!(
            r#"numberOfSets = 3
               duration = 90
               finishConditions = "Tempo Esgotado""#
        );
        let deser = toml::from_str(SETTINGS_STRING);
        assert_eq!(deser, Ok(GameSettings::default()));
    }

    #[test]
    fn test_apply() {
        let settings = GameSettings::default();

        let patch = SettingsPatch {
            number_of_sets: Some(" 6 ".to_string()),
            duration: Some("12".to_string()),
            finish_conditions: Some("Número de Sets".to_string()),
        };
        assert_eq!(
            settings.apply(&patch),
            Ok(GameSettings {
                number_of_sets: 6,
                duration: 12,
                finish_conditions: FinishCondition::SetCount,
            })
        );

        assert_eq!(settings.apply(&SettingsPatch::default()), Ok(settings));
    }

    #[test]
    fn test_apply_fractional() {
        let settings = GameSettings::default();

        let patch = SettingsPatch {
            number_of_sets: Some("2.0".to_string()),
            duration: Some("1.5".to_string()),
            ..Default::default()
        };
        let applied = settings.apply(&patch).unwrap();
        assert_eq!(applied.number_of_sets, 2);
        assert_eq!(applied.duration, 2);

        assert_eq!(
            settings.apply(&SettingsPatch::number_of_sets("0.25")).unwrap().number_of_sets,
            1
        );
        assert_eq!(
            settings.apply(&SettingsPatch::duration("-0.5")),
            Err(SettingsError::NotPositive {
                field: SettingsField::Duration,
                value: 0
            })
        );
        assert_eq!(
            settings.apply(&SettingsPatch::duration("inf")),
            Err(SettingsError::NotANumber {
                field: SettingsField::Duration,
                value: "inf".to_string()
            })
        );
    }

    #[test]
    fn test_apply_rejections() {
        let settings = GameSettings::default();

        assert_eq!(
            settings.apply(&SettingsPatch::number_of_sets("abc")),
            Err(SettingsError::NotANumber {
                field: SettingsField::NumberOfSets,
                value: "abc".to_string()
            })
        );
        assert_eq!(
            settings.apply(&SettingsPatch::duration("-4")),
            Err(SettingsError::NotPositive {
                field: SettingsField::Duration,
                value: -4
            })
        );
        assert_eq!(
            settings.apply(&SettingsPatch::number_of_sets("0")),
            Err(SettingsError::NotPositive {
                field: SettingsField::NumberOfSets,
                value: 0
            })
        );
        assert_eq!(
            settings.apply(&SettingsPatch::duration("99999999999")),
            Err(SettingsError::TooLarge {
                field: SettingsField::Duration,
                value: 99_999_999_999
            })
        );
        assert_eq!(
            settings.apply(&SettingsPatch::finish_conditions("Sudden Death")),
            Err(SettingsError::UnknownFinishCondition(
                "Sudden Death".to_string()
            ))
        );
    }

    #[test]
    fn test_partial_patch_is_atomic() {
        let settings = GameSettings::default();
        let patch = SettingsPatch {
            number_of_sets: Some("9".to_string()),
            duration: Some("soon".to_string()),
            finish_conditions: None,
        };
        assert!(settings.apply(&patch).is_err());
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn test_validated() {
        assert!(GameSettings::default().validated().is_ok());
        let zero_sets = GameSettings {
            number_of_sets: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_sets.validated(),
            Err(SettingsError::NotPositive {
                field: SettingsField::NumberOfSets,
                value: 0
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = SettingsError::NotPositive {
            field: SettingsField::Duration,
            value: -1,
        };
        assert_eq!(err.to_string(), "Duração (s) must be greater than zero, got -1");
    }
}
