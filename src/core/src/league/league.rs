use crate::error::{EngineError, EngineResult};
use crate::league::result::{MatchResult, MatchStorage, record_result};
use crate::league::schedule::{DateAllocation, Schedule};
use crate::league::table::LeagueTable;
use crate::league::zone::{Zone, ZoneAssignment, ZoneClassifier};
use crate::participant::ParticipantCollection;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

/// One ranked division of the league. Level 1 is the top tier; rollover
/// moves participants between adjacent levels.
#[derive(Debug)]
pub struct Tier {
    pub id: u32,
    pub name: String,
    pub level: u8,
    pub schedule: Schedule,
    pub matches: MatchStorage,
}

impl Tier {
    pub fn new(id: u32, name: String, level: u8) -> Self {
        Tier {
            id,
            name,
            level,
            schedule: Schedule::default(),
            matches: MatchStorage::new(),
        }
    }
}

/// Season lifecycle, shared by every tier of the league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonState {
    Registration,
    Scheduled,
    InProgress,
    SeasonComplete,
    Rollover,
}

#[derive(Debug, Clone)]
pub struct LeagueSettings {
    pub double_round: bool,
    pub date_allocation: DateAllocation,
}

/// One promotion or relegation applied at rollover.
#[derive(Debug, Clone, Serialize)]
pub struct TierMove {
    pub participant_id: u32,
    pub from_tier_id: u32,
    pub to_tier_id: u32,
    pub zone: Zone,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RolloverReport {
    pub season: u16,
    pub champions: Vec<(u32, u32)>,
    pub moves: Vec<TierMove>,
}

/// The league aggregate: an ordered set of tiers plus the shared season
/// state machine. All standings are derived on demand from the tiers'
/// result logs, so any read immediately after a successful record call
/// observes the new result.
#[derive(Debug)]
pub struct League {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub tiers: Vec<Tier>,
    pub settings: LeagueSettings,
    pub state: SeasonState,
    pub season: u16,
}

impl League {
    pub fn new(id: u32, name: String, slug: String, settings: LeagueSettings) -> Self {
        League {
            id,
            name,
            slug,
            tiers: Vec::new(),
            settings,
            state: SeasonState::Registration,
            season: 1,
        }
    }

    pub fn add_tier(&mut self, tier: Tier) {
        self.tiers.push(tier);
        self.tiers.sort_by_key(|t| t.level);
    }

    pub fn tier(&self, tier_id: u32) -> EngineResult<&Tier> {
        self.tiers
            .iter()
            .find(|t| t.id == tier_id)
            .ok_or_else(|| EngineError::not_found(format!("tier {}", tier_id)))
    }

    fn tier_mut(&mut self, tier_id: u32) -> EngineResult<&mut Tier> {
        self.tiers
            .iter_mut()
            .find(|t| t.id == tier_id)
            .ok_or_else(|| EngineError::not_found(format!("tier {}", tier_id)))
    }

    // ========== SCHEDULING ==========

    /// Generates fixtures for every tier in one shot. Transactional:
    /// either every tier gets its season schedule or none does.
    pub fn schedule_season(&mut self, registry: &ParticipantCollection) -> EngineResult<()> {
        if self.state != SeasonState::Registration {
            return Err(EngineError::invalid_state(format!(
                "league {} is {:?}, scheduling requires registration",
                self.slug, self.state
            )));
        }

        let mut generated = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            let participants = registry.with_tier(tier.id);

            let schedule = Schedule::generate(
                tier.id,
                &participants,
                self.settings.double_round,
                &self.settings.date_allocation,
            )?;

            generated.push((tier.id, schedule));
        }

        for (tier_id, schedule) in generated {
            let tier = self.tier_mut(tier_id)?;
            tier.schedule = schedule;
            tier.matches = MatchStorage::new();
        }

        self.state = SeasonState::Scheduled;

        info!(
            "📅 Season {} scheduled for league {}: {} tiers",
            self.season,
            self.name,
            self.tiers.len()
        );

        Ok(())
    }

    /// Mid-season regeneration of a single tier's remaining fixtures.
    pub fn reschedule_tier(
        &mut self,
        tier_id: u32,
        registry: &ParticipantCollection,
        force: bool,
    ) -> EngineResult<()> {
        let double_round = self.settings.double_round;
        let allocation = self.settings.date_allocation.clone();

        let participants = registry.with_tier(tier_id);

        let tier = self.tier_mut(tier_id)?;
        tier.schedule
            .regenerate(tier_id, &participants, double_round, &allocation, force)
    }

    // ========== RESULT RECORDING ==========

    /// Records a final score for a fixture found in any of the league's
    /// tiers, advancing the season state machine as a side effect.
    pub fn record_result(
        &mut self,
        fixture_id: &str,
        home_score: u8,
        away_score: u8,
    ) -> EngineResult<MatchResult> {
        if !matches!(self.state, SeasonState::Scheduled | SeasonState::InProgress) {
            return Err(EngineError::invalid_state(format!(
                "league {} is {:?}, results require an active season",
                self.slug, self.state
            )));
        }

        let tier = self
            .tiers
            .iter_mut()
            .find(|t| t.schedule.item_by_id(fixture_id).is_some())
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        let result = record_result(
            &mut tier.schedule,
            &mut tier.matches,
            fixture_id,
            home_score,
            away_score,
        )?;

        debug!(
            "result recorded: fixture {} {}-{}",
            fixture_id, home_score, away_score
        );

        self.state = if self.tiers.iter().all(|t| t.schedule.is_complete()) {
            info!("🏁 Season {} complete for league {}", self.season, self.name);
            SeasonState::SeasonComplete
        } else {
            SeasonState::InProgress
        };

        Ok(result)
    }

    /// Administrative postponement of a fixture in any tier.
    pub fn postpone_fixture(&mut self, fixture_id: &str) -> EngineResult<()> {
        if !matches!(self.state, SeasonState::Scheduled | SeasonState::InProgress) {
            return Err(EngineError::invalid_state(format!(
                "league {} is {:?}, postponements require an active season",
                self.slug, self.state
            )));
        }

        let tier = self
            .tiers
            .iter_mut()
            .find(|t| t.schedule.item_by_id(fixture_id).is_some())
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        tier.schedule.postpone(fixture_id)
    }

    /// Cancels a fixture outright. When the cancelled fixture was the
    /// last outstanding one, the season completes without it.
    pub fn cancel_fixture(&mut self, fixture_id: &str) -> EngineResult<()> {
        if !matches!(self.state, SeasonState::Scheduled | SeasonState::InProgress) {
            return Err(EngineError::invalid_state(format!(
                "league {} is {:?}, cancellations require an active season",
                self.slug, self.state
            )));
        }

        let tier = self
            .tiers
            .iter_mut()
            .find(|t| t.schedule.item_by_id(fixture_id).is_some())
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        tier.schedule.cancel(fixture_id)?;

        if self.tiers.iter().all(|t| t.schedule.is_complete()) {
            info!("🏁 Season {} complete for league {}", self.season, self.name);
            self.state = SeasonState::SeasonComplete;
        }

        Ok(())
    }

    // ========== STANDINGS & ZONES ==========

    pub fn compute_standings(
        &self,
        tier_id: u32,
        registry: &ParticipantCollection,
    ) -> EngineResult<LeagueTable> {
        let tier = self.tier(tier_id)?;
        let participants = registry.with_tier(tier_id);

        Ok(LeagueTable::compute(tier_id, &participants, &tier.matches))
    }

    /// Standings for every tier, computed in parallel. Safe because each
    /// tier's table is a pure function of its own result log.
    pub fn compute_all_tables(&self, registry: &ParticipantCollection) -> Vec<LeagueTable> {
        self.tiers
            .par_iter()
            .map(|tier| {
                let participants = registry.with_tier(tier.id);
                LeagueTable::compute(tier.id, &participants, &tier.matches)
            })
            .collect()
    }

    pub fn classify(
        &self,
        tier_id: u32,
        registry: &ParticipantCollection,
    ) -> EngineResult<Vec<ZoneAssignment>> {
        let table = self.compute_standings(tier_id, registry)?;
        ZoneClassifier::classify(&table)
    }

    /// Current sports zone of one participant, or `None` when they are
    /// not in any of this league's tiers.
    pub fn zone_of(
        &self,
        participant_id: u32,
        registry: &ParticipantCollection,
    ) -> EngineResult<Option<Zone>> {
        let Some(participant) = registry.by_id(participant_id) else {
            return Err(EngineError::not_found(format!(
                "participant {}",
                participant_id
            )));
        };

        if self.tiers.iter().all(|t| t.id != participant.tier_id) {
            return Ok(None);
        }

        let assignments = self.classify(participant.tier_id, registry)?;

        Ok(assignments
            .iter()
            .find(|a| a.participant_id == participant_id)
            .map(|a| a.zone))
    }

    // ========== SEASON ROLLOVER ==========

    /// Closes the season: champions and the promotion zone move up one
    /// tier, the relegation zone moves down one (no-op at the edges),
    /// schedules and result logs are cleared, and the league returns to
    /// registration for the next season.
    pub fn rollover_season(
        &mut self,
        registry: &mut ParticipantCollection,
    ) -> EngineResult<RolloverReport> {
        if self.state != SeasonState::SeasonComplete {
            return Err(EngineError::invalid_state(format!(
                "league {} is {:?}, rollover requires a complete season",
                self.slug, self.state
            )));
        }

        self.state = SeasonState::Rollover;

        let mut report = RolloverReport {
            season: self.season,
            ..RolloverReport::default()
        };

        for tier in &self.tiers {
            let participants = registry.with_tier(tier.id);
            let table = LeagueTable::compute(tier.id, &participants, &tier.matches);
            let assignments = ZoneClassifier::classify(&table)?;

            for assignment in assignments {
                if assignment.zone == Zone::Champion {
                    report.champions.push((tier.id, assignment.participant_id));
                }

                let destination = if assignment.zone.moves_up() {
                    self.tier_above(tier.level)
                } else if assignment.zone.moves_down() {
                    self.tier_below(tier.level)
                } else {
                    None
                };

                if let Some(to_tier_id) = destination {
                    report.moves.push(TierMove {
                        participant_id: assignment.participant_id,
                        from_tier_id: tier.id,
                        to_tier_id,
                        zone: assignment.zone,
                    });
                }
            }
        }

        for tier_move in &report.moves {
            registry.move_to_tier(tier_move.participant_id, tier_move.to_tier_id)?;
        }

        for tier in self.tiers.iter_mut() {
            tier.schedule = Schedule::default();
            tier.matches = MatchStorage::new();
        }

        info!(
            "🔄 Rollover for league {}: season {} closed, {} moves applied",
            self.name,
            self.season,
            report.moves.len()
        );

        self.season += 1;
        self.state = SeasonState::Registration;

        Ok(report)
    }

    fn tier_above(&self, level: u8) -> Option<u32> {
        if level <= 1 {
            return None;
        }

        self.tiers.iter().find(|t| t.level == level - 1).map(|t| t.id)
    }

    fn tier_below(&self, level: u8) -> Option<u32> {
        self.tiers.iter().find(|t| t.level == level + 1).map(|t| t.id)
    }
}
