use core::{
    DonationLog, EngineResult, FixtureStatus, League, MatchResult, Participant,
    ParticipantCollection, ScheduleItem,
};

/// Everything the engine works on for one league: the tiered league
/// aggregate, the participant registry and the pooled donation log.
#[derive(Debug)]
pub struct SimulationData {
    pub league: League,
    pub registry: ParticipantCollection,
    pub donations: DonationLog,
}

/// Persistence boundary for the presentation layer: record lookups by
/// tier and by status, independent of the storage technology behind
/// them. The in-memory implementation below answers from the engine
/// aggregates; a relational implementation would answer from queries.
pub trait LeagueStore {
    fn participants_for_tier(&self, tier_id: u32) -> Vec<&Participant>;

    fn fixtures_for_tier(&self, tier_id: u32) -> EngineResult<Vec<&ScheduleItem>>;

    fn fixtures_with_status(&self, status: FixtureStatus) -> Vec<&ScheduleItem>;

    fn results_for_tier(&self, tier_id: u32) -> EngineResult<&[MatchResult]>;
}

pub struct InMemoryStore {
    pub data: SimulationData,
}

impl InMemoryStore {
    pub fn new(data: SimulationData) -> Self {
        InMemoryStore { data }
    }
}

impl LeagueStore for InMemoryStore {
    fn participants_for_tier(&self, tier_id: u32) -> Vec<&Participant> {
        self.data.registry.with_tier(tier_id)
    }

    fn fixtures_for_tier(&self, tier_id: u32) -> EngineResult<Vec<&ScheduleItem>> {
        let tier = self.data.league.tier(tier_id)?;

        Ok(tier.schedule.items().collect())
    }

    fn fixtures_with_status(&self, status: FixtureStatus) -> Vec<&ScheduleItem> {
        self.data
            .league
            .tiers
            .iter()
            .flat_map(|t| t.schedule.items())
            .filter(|item| item.status == status)
            .collect()
    }

    fn results_for_tier(&self, tier_id: u32) -> EngineResult<&[MatchResult]> {
        let tier = self.data.league.tier(tier_id)?;

        Ok(tier.matches.results())
    }
}
