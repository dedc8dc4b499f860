use std::fmt;

/// A value a [`Setting`] can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SettingValue {
    True,
    False,
    Basic,
    Advanced,
    NextTo,
}

impl SettingValue {
    /// The name of the value, as written in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            SettingValue::True => "true",
            SettingValue::False => "false",
            SettingValue::Basic => "basic",
            SettingValue::Advanced => "advanced",
            SettingValue::NextTo => "nextTo",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set of values a [`Setting`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    /// `true` or `false`; `false` by default.
    Boolean,

    /// How to balance an equation: `basic`, `advanced` or `nextTo`; `basic` by default.
    BalancingMode,
}

impl SettingKind {
    /// The values of this kind.
    pub fn values(&self) -> &'static [SettingValue] {
        match self {
            SettingKind::Boolean => &[SettingValue::True, SettingValue::False],
            SettingKind::BalancingMode => {
                &[SettingValue::Basic, SettingValue::Advanced, SettingValue::NextTo]
            },
        }
    }

    /// The value used when the setting is not set.
    pub fn default_value(&self) -> SettingValue {
        match self {
            SettingKind::Boolean => SettingValue::False,
            SettingKind::BalancingMode => SettingValue::Basic,
        }
    }

    /// Returns true if `value` belongs to this kind.
    pub fn allows(&self, value: SettingValue) -> bool {
        self.values().contains(&value)
    }
}

/// A configuration key that changes how some strategies present their steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Setting {
    PreferDecimals,
    DontAddClarifyingBrackets,
    MoveTermsOneByOne,
    BalancingMode,
    QuickAddLikeFraction,
    QuickAddLikeTerms,
    AddMixedNumbersWithoutConvertingToImproperFractions,
    CopySumSignsWhenDistributing,
}

impl Setting {
    /// Every setting.
    pub const ALL: [Setting; 8] = [
        Setting::PreferDecimals,
        Setting::DontAddClarifyingBrackets,
        Setting::MoveTermsOneByOne,
        Setting::BalancingMode,
        Setting::QuickAddLikeFraction,
        Setting::QuickAddLikeTerms,
        Setting::AddMixedNumbersWithoutConvertingToImproperFractions,
        Setting::CopySumSignsWhenDistributing,
    ];

    /// The values the setting accepts.
    pub fn kind(&self) -> SettingKind {
        match self {
            Setting::BalancingMode => SettingKind::BalancingMode,
            _ => SettingKind::Boolean,
        }
    }

    /// A one-line description of the setting.
    pub fn description(&self) -> &'static str {
        match self {
            Setting::PreferDecimals => "Use decimals instead of fractions whenever possible",
            Setting::DontAddClarifyingBrackets => {
                "Do not add clarifying brackets to ambiguous expressions"
            },
            Setting::MoveTermsOneByOne => {
                "Move terms in an equation one by one instead of all at once"
            },
            Setting::BalancingMode => {
                "How to balance an equation: explicitly, by cancelling directly, or next to the \
                 original term"
            },
            Setting::QuickAddLikeFraction => "Add like integer fractions in a single step",
            Setting::QuickAddLikeTerms => {
                "Add like terms with integer coefficients in a single step"
            },
            Setting::AddMixedNumbersWithoutConvertingToImproperFractions => {
                "Add mixed numbers by splitting them and adding the integers and fractions \
                 separately"
            },
            Setting::CopySumSignsWhenDistributing => {
                "Keep the signs of a sum when distributing a factor over it"
            },
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A curriculum a [`Context`](super::Context) can be tailored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curriculum {
    #[cfg_attr(feature = "serde", serde(rename = "US"))]
    Us,

    #[cfg_attr(feature = "serde", serde(rename = "EU"))]
    Eu,
}

impl fmt::Display for Curriculum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curriculum::Us => write!(f, "US"),
            Curriculum::Eu => write!(f, "EU"),
        }
    }
}

/// A named bundle of settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preset {
    /// Every setting at its default value.
    Default,

    /// The way concepts are usually taught in the USA.
    UsCurriculum,

    /// The way concepts are usually taught in Europe.
    EuCurriculum,

    /// Steps compatible with Graspable Math.
    GmFriendly,
}

impl Preset {
    /// The settings the preset assigns.
    pub fn settings(&self) -> Vec<(Setting, SettingValue)> {
        match self {
            Preset::Default | Preset::EuCurriculum => Vec::new(),
            Preset::UsCurriculum => vec![(
                Setting::AddMixedNumbersWithoutConvertingToImproperFractions,
                SettingValue::True,
            )],
            Preset::GmFriendly => vec![
                (Setting::DontAddClarifyingBrackets, SettingValue::True),
                (Setting::BalancingMode, SettingValue::NextTo),
                (Setting::MoveTermsOneByOne, SettingValue::True),
                (Setting::QuickAddLikeFraction, SettingValue::True),
                (Setting::QuickAddLikeTerms, SettingValue::True),
                (Setting::CopySumSignsWhenDistributing, SettingValue::True),
            ],
        }
    }

    /// The curriculum the preset selects, if any.
    pub fn curriculum(&self) -> Option<Curriculum> {
        match self {
            Preset::UsCurriculum => Some(Curriculum::Us),
            Preset::EuCurriculum => Some(Curriculum::Eu),
            Preset::Default | Preset::GmFriendly => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_value_is_allowed() {
        for preset in [Preset::Default, Preset::UsCurriculum, Preset::EuCurriculum, Preset::GmFriendly] {
            for (setting, value) in preset.settings() {
                assert!(setting.kind().allows(value), "{} = {}", setting, value);
            }
        }
    }

    #[test]
    fn defaults_belong_to_their_kind() {
        for setting in Setting::ALL {
            let kind = setting.kind();
            assert!(kind.allows(kind.default_value()));
        }
        assert!(!SettingKind::Boolean.allows(SettingValue::NextTo));
    }
}
