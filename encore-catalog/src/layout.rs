use encore_shared::SeatId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single row of the seating plan. A row with `seat_count == 0` is an
/// aisle/gap: it stays in the sequence but yields no seats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueRow {
    pub row_number: u32,
    pub seat_count: u32,
}

/// A performance space and its seating plan.
///
/// Row numbers are contiguous starting at 1; editing operations keep that
/// invariant by renumbering from the ordered sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rows: Vec<VenueRow>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Venue must have at least one row")]
    NoRows,

    #[error("Seat count must be at least 1")]
    ZeroSeatCount,

    #[error("Row {0} does not exist")]
    UnknownRow(u32),
}

impl Venue {
    /// Build a venue with `row_count` rows of `seats_per_row` seats each.
    pub fn with_uniform_rows(
        name: String,
        description: String,
        location: String,
        row_count: u32,
        seats_per_row: u32,
    ) -> Result<Self, LayoutError> {
        if row_count == 0 {
            return Err(LayoutError::NoRows);
        }
        if seats_per_row == 0 {
            return Err(LayoutError::ZeroSeatCount);
        }
        let rows = (1..=row_count)
            .map(|row_number| VenueRow {
                row_number,
                seat_count: seats_per_row,
            })
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            location,
            rows,
        })
    }

    /// Build a venue from an explicit per-row seat plan. Individual rows may
    /// have 0 seats (gaps), but the plan itself must not be empty.
    pub fn with_rows(
        name: String,
        description: String,
        location: String,
        seat_counts: &[u32],
    ) -> Result<Self, LayoutError> {
        if seat_counts.is_empty() {
            return Err(LayoutError::NoRows);
        }
        let rows = seat_counts
            .iter()
            .enumerate()
            .map(|(i, &seat_count)| VenueRow {
                row_number: i as u32 + 1,
                seat_count,
            })
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            location,
            rows,
        })
    }

    /// Total seats across all rows. This is the venue's capacity.
    pub fn capacity(&self) -> u32 {
        self.rows.iter().map(|r| r.seat_count).sum()
    }

    /// Resize the plan to `row_count` rows. Surviving rows keep their seat
    /// counts; new rows get `default_seat_count`; excess rows are truncated.
    pub fn set_row_count(
        &mut self,
        row_count: u32,
        default_seat_count: u32,
    ) -> Result<(), LayoutError> {
        if row_count == 0 {
            return Err(LayoutError::NoRows);
        }
        let current = self.rows.len() as u32;
        if row_count < current {
            self.rows.truncate(row_count as usize);
        } else {
            for row_number in current + 1..=row_count {
                self.rows.push(VenueRow {
                    row_number,
                    seat_count: default_seat_count,
                });
            }
        }
        Ok(())
    }

    /// Overwrite every row's seat count with the same value.
    pub fn set_uniform_seat_count(&mut self, seat_count: u32) -> Result<(), LayoutError> {
        if seat_count == 0 {
            return Err(LayoutError::ZeroSeatCount);
        }
        for row in &mut self.rows {
            row.seat_count = seat_count;
        }
        Ok(())
    }

    /// Set a single row's seat count. 0 is allowed here: it turns the row
    /// into a gap without removing it from the sequence.
    pub fn set_row_seat_count(&mut self, row_number: u32, seat_count: u32) -> Result<(), LayoutError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.row_number == row_number)
            .ok_or(LayoutError::UnknownRow(row_number))?;
        row.seat_count = seat_count;
        Ok(())
    }

    /// Whether the seat exists in this plan.
    pub fn contains(&self, seat: SeatId) -> bool {
        self.rows
            .iter()
            .any(|r| r.row_number == seat.row && seat.number >= 1 && seat.number <= r.seat_count)
    }

    /// Iterate every seat in row order, skipping gap rows.
    pub fn seats(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.rows
            .iter()
            .flat_map(|r| (1..=r.seat_count).map(|n| SeatId::new(r.row_number, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber_stage() -> Venue {
        Venue::with_rows(
            "Chamber Stage".into(),
            "Intimate performance space for smaller productions".into(),
            "Kyustendil".into(),
            &[12, 13, 14, 13, 13, 13, 9, 9],
        )
        .unwrap()
    }

    #[test]
    fn test_capacity_matches_seat_iteration() {
        let venue = chamber_stage();
        assert_eq!(venue.capacity(), 96);
        assert_eq!(venue.seats().count() as u32, venue.capacity());
    }

    #[test]
    fn test_gap_rows_yield_no_seats() {
        let venue = Venue::with_rows("Main Stage".into(), "".into(), "".into(), &[20, 0, 20]).unwrap();
        assert_eq!(venue.capacity(), 40);
        assert!(!venue.contains(SeatId::new(2, 1)));
        assert!(venue.contains(SeatId::new(3, 20)));
        assert!(!venue.contains(SeatId::new(3, 21)));
    }

    #[test]
    fn test_row_numbers_contiguous() {
        let venue = chamber_stage();
        for (i, row) in venue.rows.iter().enumerate() {
            assert_eq!(row.row_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_grow_preserves_existing_rows() {
        let mut venue = chamber_stage();
        venue.set_row_count(10, 15).unwrap();
        assert_eq!(venue.rows.len(), 10);
        assert_eq!(venue.rows[2].seat_count, 14);
        assert_eq!(venue.rows[8].seat_count, 15);
        assert_eq!(venue.rows[9].row_number, 10);
    }

    #[test]
    fn test_shrink_truncates() {
        let mut venue = chamber_stage();
        venue.set_row_count(3, 15).unwrap();
        assert_eq!(venue.rows.len(), 3);
        assert_eq!(venue.capacity(), 12 + 13 + 14);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let mut venue = chamber_stage();
        assert_eq!(venue.set_row_count(0, 10), Err(LayoutError::NoRows));
        assert!(Venue::with_rows("x".into(), "".into(), "".into(), &[]).is_err());
        assert!(Venue::with_uniform_rows("x".into(), "".into(), "".into(), 0, 10).is_err());
        assert!(Venue::with_uniform_rows("x".into(), "".into(), "".into(), 10, 0).is_err());
    }

    #[test]
    fn test_uniform_seat_count_overwrites_all() {
        let mut venue = chamber_stage();
        venue.set_uniform_seat_count(10).unwrap();
        assert!(venue.rows.iter().all(|r| r.seat_count == 10));
        assert_eq!(venue.set_uniform_seat_count(0), Err(LayoutError::ZeroSeatCount));
    }

    #[test]
    fn test_single_row_can_become_gap() {
        let mut venue = chamber_stage();
        venue.set_row_seat_count(4, 0).unwrap();
        assert_eq!(venue.capacity(), 96 - 13);
        assert_eq!(venue.rows.len(), 8);
        assert!(venue.set_row_seat_count(99, 5).is_err());
    }
}
