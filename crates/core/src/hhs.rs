//! Harris Hip Score assessment model and scoring.
//!
//! The Harris Hip Score grades a hip on a 0-100 scale from four parts:
//! eight weighted single-choice categories (pain and function), an
//! all-or-nothing absence-of-deformity bonus, and a range-of-motion bonus
//! derived from the summed joint angles.
//!
//! Each weighted category is an enum whose variants are the clinically
//! defined answers; on the wire and on disk a category is its point value
//! (`"pain": 44`), and deserialisation rejects integers outside the
//! enumerated set. Scoring itself is a pure computation with no error
//! conditions: range-of-motion fields are free text and coerce leniently
//! to degrees, contributing 0 when unparseable.

use serde::{Deserialize, Serialize};

/// A point value outside a category's enumerated set.
#[derive(Debug, thiserror::Error)]
#[error("{value} is not a valid {category} score")]
pub struct OutOfSetScore {
    category: &'static str,
    value: u8,
}

macro_rules! weighted_category {
    (
        $(#[$doc:meta])*
        $name:ident, $label:literal {
            $($(#[$vdoc:meta])* $variant:ident = $points:literal),+ $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $($(#[$vdoc])* $variant),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $points),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = OutOfSetScore;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($points => Ok($name::$variant),)+
                    other => Err(OutOfSetScore {
                        category: $label,
                        value: other,
                    }),
                }
            }
        }

        impl $name {
            /// Point value this answer contributes to the total.
            pub fn points(self) -> u32 {
                u8::from(self) as u32
            }
        }
    };
}

weighted_category! {
    /// Pain severity, the heaviest-weighted category.
    Pain, "pain" {
        /// Totally disabled, bedridden
        Disabled = 0,
        /// Marked pain, serious limitation
        Marked = 10,
        /// Moderate pain, tolerable, requires analgesia
        Moderate = 20,
        /// Mild pain, no effect on average activity
        Mild = 30,
        /// Slight, occasional, no compromise
        Slight = 40,
        /// None or ignores it
        None = 44,
    }
}

weighted_category! {
    /// Limp severity while walking.
    Limp, "limp" {
        Severe = 0,
        Moderate = 5,
        Slight = 8,
        None = 11,
    }
}

weighted_category! {
    /// Walking support required.
    Support, "support" {
        /// Two crutches or not able to walk
        TwoCrutches = 0,
        TwoCanes = 2,
        OneCrutch = 3,
        /// Cane most of the time
        CaneMostly = 5,
        /// Cane for long walks only
        CaneLongWalks = 7,
        None = 11,
    }
}

weighted_category! {
    /// Distance the patient can walk.
    Distance, "distance" {
        /// Bed and chair only
        BedAndChair = 0,
        IndoorsOnly = 2,
        TwoThreeBlocks = 5,
        SixBlocks = 8,
        Unlimited = 11,
    }
}

weighted_category! {
    /// Ability to sit comfortably.
    Sitting, "sitting" {
        Unable = 0,
        /// High chair for half an hour
        HighChair = 3,
        /// Ordinary chair for an hour
        OrdinaryChair = 5,
    }
}

weighted_category! {
    /// Ability to use public transport.
    Transport, "transport" {
        Unable = 0,
        Able = 1,
    }
}

weighted_category! {
    /// Stair climbing.
    Stairs, "stairs" {
        Unable = 0,
        /// In any manner
        AnyManner = 1,
        /// Using a railing
        WithRailing = 2,
        WithoutRailing = 4,
    }
}

weighted_category! {
    /// Putting on socks and shoes.
    Socks, "socks" {
        Unable = 0,
        WithDifficulty = 2,
        WithEase = 4,
    }
}

/// Absence-of-deformity criteria.
///
/// Each flag records the *absence* of one deformity: less than 30 degrees
/// fixed flexion contracture, less than 10 degrees fixed abduction, less
/// than 10 degrees fixed internal rotation, and limb length discrepancy
/// under 3.2 cm. The bonus is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deformity {
    pub flexion: bool,
    pub abduction: bool,
    pub rotation: bool,
    pub discrepancy: bool,
}

impl Deformity {
    /// 4 points if all four criteria hold, otherwise 0. No partial credit.
    pub fn bonus(&self) -> u32 {
        if self.flexion && self.abduction && self.rotation && self.discrepancy {
            4
        } else {
            0
        }
    }
}

impl Default for Deformity {
    fn default() -> Self {
        Self {
            flexion: true,
            abduction: true,
            rotation: true,
            discrepancy: true,
        }
    }
}

/// Range-of-motion measurements in degrees, one per plane.
///
/// Fields are free text exactly as captured on the form; scoring coerces
/// each leniently to a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomDegrees {
    pub flexion: String,
    pub abduction: String,
    pub adduction: String,
    #[serde(rename = "extRotation")]
    pub ext_rotation: String,
    #[serde(rename = "intRotation")]
    pub int_rotation: String,
}

impl RomDegrees {
    /// Sum of the five planes after lenient coercion.
    pub fn total_degrees(&self) -> i64 {
        [
            &self.flexion,
            &self.abduction,
            &self.adduction,
            &self.ext_rotation,
            &self.int_rotation,
        ]
        .into_iter()
        .map(|field| coerce_degrees(field))
        .sum()
    }

    /// Range-of-motion bonus: total degrees bucketed into 0-5 points.
    pub fn bonus(&self) -> u32 {
        match self.total_degrees() {
            t if t >= 211 => 5,
            t if t >= 161 => 4,
            t if t >= 101 => 3,
            t if t >= 61 => 2,
            t if t >= 31 => 1,
            _ => 0,
        }
    }
}

impl Default for RomDegrees {
    fn default() -> Self {
        Self {
            flexion: "140".to_owned(),
            abduction: "40".to_owned(),
            adduction: "40".to_owned(),
            ext_rotation: "40".to_owned(),
            int_rotation: "40".to_owned(),
        }
    }
}

/// Lenient text-to-degrees coercion.
///
/// Takes an optional sign and leading digits after trimming whitespace, so
/// `"140"`, `" 140 "` and `"140 deg"` all read as 140, while `""` and
/// `"n/a"` read as 0. Never fails.
fn coerce_degrees(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let len = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return 0;
    }

    digits[..len].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// A complete structured Harris Hip Score assessment.
///
/// The default value is the fully healthy assessment: best answer in every
/// category, all deformity criteria met, and 300 degrees total range of
/// motion, for a total of 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HhsAssessment {
    pub pain: Pain,
    pub limp: Limp,
    pub support: Support,
    pub distance: Distance,
    pub sitting: Sitting,
    pub transport: Transport,
    pub stairs: Stairs,
    pub socks: Socks,
    pub deformity: Deformity,
    pub rom: RomDegrees,
}

impl HhsAssessment {
    /// Computes the Harris Hip Score total.
    ///
    /// Sum of the eight weighted category values, plus the all-or-nothing
    /// deformity bonus, plus the range-of-motion bonus. Pure and total:
    /// no I/O, no error conditions, no clamping.
    pub fn total(&self) -> u32 {
        let categories = self.pain.points()
            + self.limp.points()
            + self.support.points()
            + self.distance.points()
            + self.sitting.points()
            + self.transport.points()
            + self.stairs.points()
            + self.socks.points();

        categories + self.deformity.bonus() + self.rom.bonus()
    }
}

impl Default for HhsAssessment {
    fn default() -> Self {
        Self {
            pain: Pain::None,
            limp: Limp::None,
            support: Support::None,
            distance: Distance::Unlimited,
            sitting: Sitting::OrdinaryChair,
            transport: Transport::Able,
            stairs: Stairs::WithoutRailing,
            socks: Socks::WithEase,
            deformity: Deformity::default(),
            rom: RomDegrees::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Worst answer in every category, no deformity credit, custom ROM.
    fn floor_assessment(rom: [&str; 5]) -> HhsAssessment {
        HhsAssessment {
            pain: Pain::Disabled,
            limp: Limp::Severe,
            support: Support::TwoCrutches,
            distance: Distance::BedAndChair,
            sitting: Sitting::Unable,
            transport: Transport::Unable,
            stairs: Stairs::Unable,
            socks: Socks::Unable,
            deformity: Deformity {
                flexion: false,
                abduction: false,
                rotation: false,
                discrepancy: false,
            },
            rom: RomDegrees {
                flexion: rom[0].to_owned(),
                abduction: rom[1].to_owned(),
                adduction: rom[2].to_owned(),
                ext_rotation: rom[3].to_owned(),
                int_rotation: rom[4].to_owned(),
            },
        }
    }

    #[test]
    fn default_assessment_scores_100() {
        // 44+11+11+11+5+1+4+4 categories, +4 deformity, +5 for 300 degrees
        assert_eq!(HhsAssessment::default().total(), 100);
    }

    #[test]
    fn deformity_bonus_is_all_or_nothing() {
        let mut assessment = HhsAssessment::default();
        assert_eq!(assessment.total(), 100);

        assessment.deformity.discrepancy = false;
        assert_eq!(assessment.total(), 96);

        assessment.deformity.discrepancy = true;
        assessment.deformity.flexion = false;
        assert_eq!(assessment.total(), 96);

        assessment.deformity = Deformity {
            flexion: false,
            abduction: false,
            rotation: false,
            discrepancy: false,
        };
        assert_eq!(assessment.total(), 96);
    }

    #[test]
    fn rom_bonus_boundaries() {
        let cases = [
            (30, 0),
            (31, 1),
            (60, 1),
            (61, 2),
            (100, 2),
            (101, 3),
            (160, 3),
            (161, 4),
            (210, 4),
            (211, 5),
        ];

        for (degrees, bonus) in cases {
            let text = degrees.to_string();
            let assessment = floor_assessment([&text, "0", "0", "0", "0"]);
            assert_eq!(
                assessment.total(),
                bonus,
                "total of {} degrees should score {}",
                degrees,
                bonus
            );
        }
    }

    #[test]
    fn rom_degrees_sum_across_planes() {
        let assessment = floor_assessment(["50", "50", "50", "5", "6"]);
        assert_eq!(assessment.rom.total_degrees(), 161);
        assert_eq!(assessment.total(), 4);
    }

    #[test]
    fn non_numeric_rom_text_coerces_to_zero() {
        let assessment = floor_assessment(["", "n/a", "unknown", " ", "-"]);
        assert_eq!(assessment.rom.total_degrees(), 0);
        assert_eq!(assessment.total(), 0);
    }

    #[test]
    fn coerce_degrees_takes_leading_digits() {
        assert_eq!(coerce_degrees("140"), 140);
        assert_eq!(coerce_degrees(" 140 "), 140);
        assert_eq!(coerce_degrees("140 deg"), 140);
        assert_eq!(coerce_degrees("-10"), -10);
        assert_eq!(coerce_degrees("+25"), 25);
        assert_eq!(coerce_degrees(""), 0);
        assert_eq!(coerce_degrees("abc"), 0);
        assert_eq!(coerce_degrees("deg 140"), 0);
    }

    #[test]
    fn negative_degrees_never_push_the_bonus_up() {
        let assessment = floor_assessment(["-100", "0", "0", "0", "0"]);
        assert_eq!(assessment.rom.total_degrees(), -100);
        assert_eq!(assessment.rom.bonus(), 0);
    }

    #[test]
    fn categories_serialise_as_point_values() {
        let json = serde_json::to_string(&HhsAssessment::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pain"], 44);
        assert_eq!(value["limp"], 11);
        assert_eq!(value["support"], 11);
        assert_eq!(value["distance"], 11);
        assert_eq!(value["sitting"], 5);
        assert_eq!(value["transport"], 1);
        assert_eq!(value["stairs"], 4);
        assert_eq!(value["socks"], 4);
        assert_eq!(value["rom"]["extRotation"], "40");
        assert_eq!(value["rom"]["intRotation"], "40");
    }

    #[test]
    fn categories_reject_out_of_set_values() {
        assert!(serde_json::from_str::<Pain>("43").is_err());
        assert!(serde_json::from_str::<Limp>("12").is_err());
        assert!(serde_json::from_str::<Transport>("2").is_err());

        let pain: Pain = serde_json::from_str("30").unwrap();
        assert_eq!(pain, Pain::Mild);
    }

    #[test]
    fn assessment_round_trips_through_json() {
        let assessment = HhsAssessment {
            pain: Pain::Moderate,
            limp: Limp::Slight,
            support: Support::CaneLongWalks,
            distance: Distance::SixBlocks,
            sitting: Sitting::HighChair,
            transport: Transport::Unable,
            stairs: Stairs::WithRailing,
            socks: Socks::WithDifficulty,
            deformity: Deformity {
                flexion: true,
                abduction: false,
                rotation: true,
                discrepancy: true,
            },
            rom: RomDegrees {
                flexion: "90".to_owned(),
                abduction: "20".to_owned(),
                adduction: "15".to_owned(),
                ext_rotation: "".to_owned(),
                int_rotation: "10".to_owned(),
            },
        };

        let json = serde_json::to_string(&assessment).unwrap();
        let back: HhsAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assessment);
    }
}
