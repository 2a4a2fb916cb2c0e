use crate::error::{EngineError, EngineResult};
use crate::league::table::LeagueTable;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Champion,
    Promotion,
    Safe,
    Relegation,
}

impl Zone {
    pub fn moves_up(&self) -> bool {
        matches!(self, Zone::Champion | Zone::Promotion)
    }

    pub fn moves_down(&self) -> bool {
        matches!(self, Zone::Relegation)
    }
}

/// Transient mapping of a standings position to its zone. Recomputed with
/// every standings pass; persists only as the season-rollover trigger.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneAssignment {
    pub participant_id: u32,
    pub position: u16,
    pub zone: Zone,
}

/// Quartile-based zone rules, parameterized only by tier size:
/// position 1 is champion, the rest of the top quartile promotes, the
/// bottom quartile relegates, everyone else is safe. Small tiers always
/// keep the mechanic alive: at least one relegation slot, and at least
/// one promotion slot when a position is free for it (a position that
/// qualifies for both directions relegates).
pub struct ZoneClassifier;

impl ZoneClassifier {
    pub fn classify(table: &LeagueTable) -> EngineResult<Vec<ZoneAssignment>> {
        let positions: Vec<u32> = table.rows.iter().map(|r| r.participant_id).collect();
        Self::classify_ordered(&positions)
    }

    /// Classifies a list of participant ids already in standings order
    /// (index 0 is position 1). Shared between the sports and charity
    /// ladders, each with its own size.
    pub fn classify_ordered(ordered_ids: &[u32]) -> EngineResult<Vec<ZoneAssignment>> {
        let size = ordered_ids.len();

        if size == 0 {
            return Err(EngineError::invalid_state(
                "cannot classify an empty tier",
            ));
        }

        let assignments = ordered_ids
            .iter()
            .enumerate()
            .map(|(index, &participant_id)| {
                let position = index as u16 + 1;

                ZoneAssignment {
                    participant_id,
                    position,
                    zone: Self::zone_for_position(position, size),
                }
            })
            .collect();

        Ok(assignments)
    }

    pub fn zone_for_position(position: u16, size: usize) -> Zone {
        if position == 1 {
            return Zone::Champion;
        }

        let position = position as usize;

        // Bottom quartile, never empty for size >= 2.
        let relegation_start = (size * 3 / 4) + 1;
        if position >= relegation_start {
            return Zone::Relegation;
        }

        // Top quartile after the champion; small tiers force position 2 in.
        let mut promotion_end = size.div_ceil(4);
        if size <= 4 {
            promotion_end = promotion_end.max(2);
        }
        if position <= promotion_end {
            return Zone::Promotion;
        }

        Zone::Safe
    }
}
