use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::db::StoreError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Frequency {
    OnceDaily => "Once daily",
    TwiceDaily => "Twice daily",
    ThreeTimesDaily => "Three times daily",
    FourTimesDaily => "Four times daily",
    AsNeeded => "As needed",
});

str_enum!(DurationLabel {
    SevenDays => "7 days",
    FourteenDays => "14 days",
    ThirtyDays => "30 days",
    NinetyDays => "90 days",
    Ongoing => "Ongoing",
});

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time literal")
}

impl Frequency {
    /// Default time-of-day slots offered when this frequency is selected.
    /// The medication's `times` list remains the source of truth afterwards;
    /// these only pre-fill the editing form.
    pub fn default_times(&self) -> Vec<NaiveTime> {
        match self {
            Self::OnceDaily => vec![hm(9, 0)],
            Self::TwiceDaily => vec![hm(9, 0), hm(21, 0)],
            Self::ThreeTimesDaily => vec![hm(9, 0), hm(15, 0), hm(21, 0)],
            Self::FourTimesDaily => vec![hm(9, 0), hm(13, 0), hm(17, 0), hm(21, 0)],
            Self::AsNeeded => Vec::new(),
        }
    }

    /// "As needed" medications never participate in scheduling.
    pub fn is_scheduled(&self) -> bool {
        !matches!(self, Self::AsNeeded)
    }
}

impl DurationLabel {
    /// Signed day count; `-1` denotes an unbounded schedule.
    pub fn days(&self) -> i32 {
        match self {
            Self::SevenDays => 7,
            Self::FourteenDays => 14,
            Self::ThirtyDays => 30,
            Self::NinetyDays => 90,
            Self::Ongoing => -1,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Ongoing)
    }
}
