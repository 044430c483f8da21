use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-decimal display rounding used in rendered reports:
/// `Int(10*x + 0.5) / 10`. Stored values stay exact.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    NotAvailable,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::NotAvailable => "N/A",
        }
    }

    pub fn parse(s: &str) -> Option<Grade> {
        match s {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            "N/A" => Some(Grade::NotAvailable),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Grade::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown grade letter: {}", s)))
    }
}

/// Letter grade as a step function of percentage, inclusive at the lower edge.
pub fn letter_grade(percentage: f64) -> Grade {
    if percentage >= 90.0 {
        Grade::A
    } else if percentage >= 80.0 {
        Grade::B
    } else if percentage >= 70.0 {
        Grade::C
    } else if percentage >= 60.0 {
        Grade::D
    } else {
        Grade::F
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeSummary {
    pub total_marks: f64,
    pub percentage: f64,
    pub grade: Grade,
}

/// Derive total, percentage, and letter grade from a set of subject marks.
///
/// Each mark is out of 100, so the percentage is the total over the maximum
/// obtainable (`count * 100`). An empty set yields zeros and the "N/A"
/// sentinel rather than an F.
pub fn grade_summary<I>(marks: I) -> GradeSummary
where
    I: IntoIterator<Item = f64>,
{
    let mut count: usize = 0;
    let mut total: f64 = 0.0;
    for mark in marks {
        count += 1;
        total += mark;
    }

    if count == 0 {
        return GradeSummary {
            total_marks: 0.0,
            percentage: 0.0,
            grade: Grade::NotAvailable,
        };
    }

    let max_possible = (count as f64) * 100.0;
    let percentage = (total / max_possible) * 100.0;

    GradeSummary {
        total_marks: total,
        percentage,
        grade: letter_grade(percentage),
    }
}
