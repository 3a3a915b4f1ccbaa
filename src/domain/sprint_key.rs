//! Canonical sprint keys.

use crate::error::BoardError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Highest sprint number in a year; later numbers roll into the next year.
pub const MAX_SPRINT_NUMBER: u32 = 25;

pub const BACKLOG: &str = "Backlog";

/// Grouping unit shared by all teams' concurrently running sprints.
///
/// Ordering puts `Backlog` first and sprints in ascending `(year, number)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SprintKey {
    Backlog,
    Sprint { year: i32, number: u32 },
}

impl SprintKey {
    /// Build a sprint key, rolling numbers above [`MAX_SPRINT_NUMBER`] into
    /// following years. Sprint number 0 is not a sprint.
    pub fn sprint(year: i32, number: u32) -> Option<Self> {
        if number == 0 {
            return None;
        }
        let carry = (number - 1) / MAX_SPRINT_NUMBER;
        let year = year.checked_add(i32::try_from(carry).ok()?)?;
        Some(SprintKey::Sprint { year, number: (number - 1) % MAX_SPRINT_NUMBER + 1 })
    }

    pub fn is_backlog(&self) -> bool {
        matches!(self, SprintKey::Backlog)
    }

    /// The sprint after this one. Backlog has no successor.
    pub fn next(&self) -> Option<Self> {
        match *self {
            SprintKey::Backlog => None,
            SprintKey::Sprint { year, number } => SprintKey::sprint(year, number + 1),
        }
    }

    /// `count` keys following this one, in order.
    pub fn following(&self, count: usize) -> Vec<SprintKey> {
        let mut keys = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            match current.next() {
                Some(next) => {
                    keys.push(next);
                    current = next;
                }
                None => break,
            }
        }
        keys
    }
}

impl fmt::Display for SprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SprintKey::Backlog => f.write_str(BACKLOG),
            SprintKey::Sprint { year, number } => write!(f, "{year}-{number}"),
        }
    }
}

impl FromStr for SprintKey {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(BACKLOG) {
            return Ok(SprintKey::Backlog);
        }
        let invalid = || BoardError::InvalidSprintKey(s.to_string());
        let (year, number) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let number: u32 = number.parse().map_err(|_| invalid())?;
        SprintKey::sprint(year, number).ok_or_else(invalid)
    }
}

impl Serialize for SprintKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SprintKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
