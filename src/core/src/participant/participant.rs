use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Which ladder an entity competes on. A tier never mixes tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionTrack {
    Sports,
    Charity,
}

/// A registered team (mosque league) or business (business league).
/// Tier membership changes only at season rollover; mid-season a
/// participant can be deactivated but never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: u32,
    pub name: String,
    pub organization: String,
    pub tier_id: u32,
    pub track: CompetitionTrack,
    pub home_venue: Option<String>,
    pub registered_at: NaiveDate,
    pub active: bool,
}

impl Participant {
    pub fn new(
        id: u32,
        name: String,
        organization: String,
        tier_id: u32,
        track: CompetitionTrack,
        home_venue: Option<String>,
        registered_at: NaiveDate,
    ) -> Self {
        Participant {
            id,
            name,
            organization,
            tier_id,
            track,
            home_venue,
            registered_at,
            active: true,
        }
    }

    /// Whole calendar months elapsed since registration.
    pub fn months_active(&self, today: NaiveDate) -> u32 {
        use chrono::Datelike;

        if today <= self.registered_at {
            return 0;
        }

        let months = (today.year() - self.registered_at.year()) * 12
            + (today.month() as i32 - self.registered_at.month() as i32);

        let months = if today.day() < self.registered_at.day() {
            months - 1
        } else {
            months
        };

        months.max(0) as u32
    }
}

#[derive(Debug, Default)]
pub struct ParticipantCollection {
    pub participants: Vec<Participant>,
}

impl ParticipantCollection {
    pub fn new(participants: Vec<Participant>) -> Self {
        ParticipantCollection { participants }
    }

    pub fn add(&mut self, participant: Participant) -> EngineResult<()> {
        if self.participants.iter().any(|p| p.id == participant.id) {
            return Err(EngineError::Configuration(format!(
                "participant id {} already registered",
                participant.id
            )));
        }

        self.participants.push(participant);

        Ok(())
    }

    pub fn by_id(&self, id: u32) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: u32) -> EngineResult<&Participant> {
        self.by_id(id)
            .ok_or_else(|| EngineError::not_found(format!("participant {}", id)))
    }

    /// Active participants of a tier in registration order. Registration
    /// order is what the scheduler rotates over, so it is load-bearing.
    pub fn with_tier(&self, tier_id: u32) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|p| p.tier_id == tier_id && p.active)
            .collect()
    }

    pub fn with_track(&self, track: CompetitionTrack) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|p| p.track == track && p.active)
            .collect()
    }

    pub fn deactivate(&mut self, id: u32) -> EngineResult<()> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found(format!("participant {}", id)))?;

        participant.active = false;

        Ok(())
    }

    /// Tier reassignment, legal only from season rollover.
    pub(crate) fn move_to_tier(&mut self, id: u32, tier_id: u32) -> EngineResult<()> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found(format!("participant {}", id)))?;

        participant.tier_id = tier_id;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: u32, name: &str, tier_id: u32) -> Participant {
        Participant::new(
            id,
            String::from(name),
            String::from("Al-Noor Mosque"),
            tier_id,
            CompetitionTrack::Sports,
            None,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut collection = ParticipantCollection::default();

        collection.add(participant(1, "Al-Noor FC", 1)).unwrap();

        let err = collection.add(participant(1, "Duplicate", 1)).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_with_tier_skips_deactivated() {
        let mut collection = ParticipantCollection::default();
        collection.add(participant(1, "Al-Noor FC", 1)).unwrap();
        collection.add(participant(2, "Crescent United", 1)).unwrap();
        collection.add(participant(3, "Unity FC", 2)).unwrap();

        collection.deactivate(2).unwrap();

        let tier_one: Vec<u32> = collection.with_tier(1).iter().map(|p| p.id).collect();
        assert_eq!(tier_one, vec![1]);
    }

    #[test]
    fn test_months_active() {
        let p = participant(1, "Al-Noor FC", 1);

        assert_eq!(p.months_active(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()), 0);
        assert_eq!(p.months_active(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()), 1);
        assert_eq!(p.months_active(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()), 2);
        assert_eq!(p.months_active(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()), 12);
    }

    #[test]
    fn test_deactivate_unknown_participant() {
        let mut collection = ParticipantCollection::default();

        let err = collection.deactivate(42).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
