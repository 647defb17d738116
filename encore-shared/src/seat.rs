use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A seat identity within a venue, derived from its row and position.
/// Rendered as `"{row}-{seat}"` (e.g. "3-12"), which is also the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId {
    pub row: u32,
    pub number: u32,
}

impl SeatId {
    pub fn new(row: u32, number: u32) -> Self {
        Self { row, number }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.number)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid seat id: {0}")]
pub struct ParseSeatIdError(String);

impl FromStr for SeatId {
    type Err = ParseSeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, number) = s
            .split_once('-')
            .ok_or_else(|| ParseSeatIdError(s.to_string()))?;
        let row: u32 = row.parse().map_err(|_| ParseSeatIdError(s.to_string()))?;
        let number: u32 = number.parse().map_err(|_| ParseSeatIdError(s.to_string()))?;
        if row == 0 || number == 0 {
            return Err(ParseSeatIdError(s.to_string()));
        }
        Ok(SeatId { row, number })
    }
}

impl Serialize for SeatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_id_roundtrip() {
        let seat = SeatId::new(3, 12);
        assert_eq!(seat.to_string(), "3-12");
        assert_eq!("3-12".parse::<SeatId>().unwrap(), seat);
    }

    #[test]
    fn test_seat_id_rejects_garbage() {
        assert!("".parse::<SeatId>().is_err());
        assert!("3".parse::<SeatId>().is_err());
        assert!("0-1".parse::<SeatId>().is_err());
        assert!("3-0".parse::<SeatId>().is_err());
        assert!("a-b".parse::<SeatId>().is_err());
    }
}
