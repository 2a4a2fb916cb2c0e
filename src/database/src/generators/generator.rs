use crate::loaders::DatabaseEntity;
use crate::stores::SimulationData;
use core::{
    CompetitionTrack, DateAllocation, DonationLog, League, LeagueSettings, Participant,
    ParticipantCollection, Tier,
};
use log::info;

pub struct DatabaseGenerator;

impl DatabaseGenerator {
    /// Assembles the engine aggregates from the loaded seed entities.
    pub fn generate(data: &DatabaseEntity) -> SimulationData {
        let settings = LeagueSettings {
            double_round: data.league.double_round,
            date_allocation: DateAllocation::weekly(data.league.season_start),
        };

        let mut league = League::new(
            data.league.id,
            data.league.name.clone(),
            data.league.slug.clone(),
            settings,
        );

        for tier in &data.league.tiers {
            league.add_tier(Tier::new(tier.id, tier.name.clone(), tier.level));
        }

        let mut registry = ParticipantCollection::default();

        for entity in &data.participants {
            let track = match entity.track.as_str() {
                "charity" => CompetitionTrack::Charity,
                _ => CompetitionTrack::Sports,
            };

            let participant = Participant::new(
                entity.id,
                entity.name.clone(),
                entity.organization.clone(),
                entity.tier_id,
                track,
                entity.home_venue.clone(),
                entity.registered_at,
            );

            // Seed data is static and pre-validated by the loader tests.
            registry.add(participant).unwrap();
        }

        info!(
            "🕌 generated league {}: {} tiers, {} participants",
            league.name,
            league.tiers.len(),
            registry.participants.len()
        );

        SimulationData {
            league,
            registry,
            donations: DonationLog::new(),
        }
    }
}

/// Random but plausible final scores for demo matchdays.
pub struct ScoreGenerator;

impl ScoreGenerator {
    pub fn generate() -> (u8, u8) {
        (rand::random::<u8>() % 5, rand::random::<u8>() % 4)
    }
}

/// Random fundraising period totals in pence, between £50 and £2,500.
pub struct DonationAmountGenerator;

impl DonationAmountGenerator {
    pub fn generate_pence() -> u64 {
        5_000 + rand::random::<u64>() % 245_001
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::DatabaseLoader;
    use core::SeasonState;

    #[test]
    fn test_generate_builds_league_and_registry() {
        let database = DatabaseLoader::load();
        let data = DatabaseGenerator::generate(&database);

        assert_eq!(data.league.state, SeasonState::Registration);
        assert_eq!(data.league.tiers.len(), database.league.tiers.len());
        assert_eq!(
            data.registry.participants.len(),
            database.participants.len()
        );
    }

    #[test]
    fn test_generated_league_schedules_cleanly() {
        let database = DatabaseLoader::load();
        let mut data = DatabaseGenerator::generate(&database);

        data.league.schedule_season(&data.registry).unwrap();
        assert_eq!(data.league.state, SeasonState::Scheduled);

        for tier in &data.league.tiers {
            assert!(!tier.schedule.tours.is_empty());
        }
    }

    #[test]
    fn test_donation_amounts_in_range() {
        for _ in 0..100 {
            let pence = DonationAmountGenerator::generate_pence();
            assert!((5_000..=250_000).contains(&pence));
        }
    }
}
