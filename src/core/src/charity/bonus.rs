use crate::error::EngineResult;
use crate::league::{League, Zone};
use crate::participant::ParticipantCollection;
use serde::Serialize;

/// Multiplier values in hundredths (out of 100), keeping every charity
/// computation in integer pence.
const CHAMPION_BONUS: u16 = 120; // x1.20
const PROMOTION_BONUS: u16 = 110; // x1.10
const BASE_BONUS: u16 = 100; // x1.00, no downside for relegation

/// Scalar applied to newly accrued donation amounts, derived from the
/// participant's sports-ladder zone. Upside only: the worst case is the
/// neutral x1.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusMultiplier(u16);

impl BonusMultiplier {
    pub const BASE: BonusMultiplier = BonusMultiplier(BASE_BONUS);

    pub fn from_zone(zone: Zone) -> Self {
        match zone {
            Zone::Champion => BonusMultiplier(CHAMPION_BONUS),
            Zone::Promotion => BonusMultiplier(PROMOTION_BONUS),
            Zone::Safe | Zone::Relegation => BonusMultiplier(BASE_BONUS),
        }
    }

    pub fn hundredths(&self) -> u16 {
        self.0
    }

    /// Effective pence for a raw donation amount.
    pub fn apply(&self, amount_pence: u64) -> u64 {
        amount_pence * self.0 as u64 / 100
    }

    pub fn as_f32(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for BonusMultiplier {
    fn default() -> Self {
        BonusMultiplier::BASE
    }
}

/// The coupling contract: reads the participant's current sports zone
/// and maps it to the multiplier applied to newly recorded donations.
/// Participants outside the sports ladder stay at the neutral x1.00.
pub fn compute_charity_multiplier(
    participant_id: u32,
    league: &League,
    registry: &ParticipantCollection,
) -> EngineResult<BonusMultiplier> {
    let zone = league.zone_of(participant_id, registry)?;

    Ok(zone.map(BonusMultiplier::from_zone).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_mapping() {
        assert_eq!(BonusMultiplier::from_zone(Zone::Champion).hundredths(), 120);
        assert_eq!(BonusMultiplier::from_zone(Zone::Promotion).hundredths(), 110);
        assert_eq!(BonusMultiplier::from_zone(Zone::Safe).hundredths(), 100);
        assert_eq!(BonusMultiplier::from_zone(Zone::Relegation).hundredths(), 100);
    }

    #[test]
    fn test_champion_thousand_pounds_becomes_twelve_hundred() {
        let multiplier = BonusMultiplier::from_zone(Zone::Champion);

        // £1,000.00 in pence -> £1,200.00.
        assert_eq!(multiplier.apply(100_000), 120_000);
    }

    #[test]
    fn test_no_penalty_for_relegation() {
        let multiplier = BonusMultiplier::from_zone(Zone::Relegation);

        assert_eq!(multiplier.apply(50_000), 50_000);
    }

    #[test]
    fn test_integer_rounding_truncates() {
        let multiplier = BonusMultiplier::from_zone(Zone::Promotion);

        // 33 pence * 1.10 = 36.3 -> 36, stays in integer minor units.
        assert_eq!(multiplier.apply(33), 36);
    }
}
