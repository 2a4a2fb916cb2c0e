use crate::error::{EngineError, EngineResult};
use crate::league::schedule::{FixtureStatus, Schedule};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl MatchOutcome {
    pub fn letter(&self) -> char {
        match self {
            MatchOutcome::Win => 'W',
            MatchOutcome::Draw => 'D',
            MatchOutcome::Loss => 'L',
        }
    }
}

/// Final score of a completed fixture. Immutable once stored; a
/// correction is a separate administrative event, never an edit.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub fixture_id: String,
    pub tier_id: u32,
    pub round: u8,
    pub home_participant_id: u32,
    pub away_participant_id: u32,
    pub home_score: u8,
    pub away_score: u8,
    pub played_at: NaiveDateTime,
}

impl MatchResult {
    pub fn outcome_for(&self, participant_id: u32) -> Option<MatchOutcome> {
        let (scored, conceded) = if participant_id == self.home_participant_id {
            (self.home_score, self.away_score)
        } else if participant_id == self.away_participant_id {
            (self.away_score, self.home_score)
        } else {
            return None;
        };

        let outcome = match scored.cmp(&conceded) {
            Ordering::Greater => MatchOutcome::Win,
            Ordering::Equal => MatchOutcome::Draw,
            Ordering::Less => MatchOutcome::Loss,
        };

        Some(outcome)
    }
}

/// Append-only log of completed results for one tier, in recording order.
/// Standings are always derived from this log in full, never patched.
#[derive(Debug, Clone, Default)]
pub struct MatchStorage {
    results: Vec<MatchResult>,
}

impl MatchStorage {
    pub fn new() -> Self {
        MatchStorage {
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: MatchResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Highest round number with at least one recorded result.
    pub fn latest_round(&self) -> Option<u8> {
        self.results.iter().map(|r| r.round).max()
    }

    pub fn completed_round_count(&self) -> usize {
        let mut rounds: Vec<u8> = self.results.iter().map(|r| r.round).collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds.len()
    }

    /// The log with the most recent round's results removed. Used for the
    /// trend comparison against the previous standings snapshot.
    pub fn without_latest_round(&self) -> Vec<&MatchResult> {
        match self.latest_round() {
            Some(latest) => self.results.iter().filter(|r| r.round != latest).collect(),
            None => Vec::new(),
        }
    }
}

/// Records the final score of a scheduled fixture: flips the fixture to
/// `Completed` and appends the result to the tier's log.
pub fn record_result(
    schedule: &mut Schedule,
    storage: &mut MatchStorage,
    fixture_id: &str,
    home_score: u8,
    away_score: u8,
) -> EngineResult<MatchResult> {
    let item = schedule
        .item_by_id_mut(fixture_id)
        .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

    if item.status != FixtureStatus::Scheduled {
        return Err(EngineError::invalid_state(format!(
            "fixture {} is {:?}, only scheduled fixtures accept results",
            fixture_id, item.status
        )));
    }

    item.status = FixtureStatus::Completed;

    let result = MatchResult {
        fixture_id: item.id.clone(),
        tier_id: item.tier_id,
        round: item.round,
        home_participant_id: item.home_participant_id,
        away_participant_id: item.away_participant_id,
        home_score,
        away_score,
        played_at: item.date,
    };

    storage.push(result.clone());

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::schedule::DateAllocation;
    use crate::participant::{CompetitionTrack, Participant};
    use chrono::NaiveDate;

    fn schedule() -> Schedule {
        let owned: Vec<Participant> = (1..=4)
            .map(|id| {
                Participant::new(
                    id,
                    format!("Team {}", id),
                    format!("Org {}", id),
                    1,
                    CompetitionTrack::Sports,
                    None,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                )
            })
            .collect();
        let refs: Vec<&Participant> = owned.iter().collect();

        let allocation = DateAllocation::weekly(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());

        Schedule::generate(1, &refs, false, &allocation).unwrap()
    }

    #[test]
    fn test_record_result_completes_fixture() {
        let mut schedule = schedule();
        let mut storage = MatchStorage::new();

        let fixture_id = schedule.tours[0].items[0].id.clone();
        let result = record_result(&mut schedule, &mut storage, &fixture_id, 2, 1).unwrap();

        assert_eq!(result.home_score, 2);
        assert_eq!(result.away_score, 1);
        assert_eq!(
            schedule.item_by_id(&fixture_id).unwrap().status,
            FixtureStatus::Completed
        );
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_record_result_unknown_fixture() {
        let mut schedule = schedule();
        let mut storage = MatchStorage::new();

        let err = record_result(&mut schedule, &mut storage, "1-9-99-98", 1, 0).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_no_rescoring_of_completed_fixtures() {
        let mut schedule = schedule();
        let mut storage = MatchStorage::new();

        let fixture_id = schedule.tours[0].items[0].id.clone();
        record_result(&mut schedule, &mut storage, &fixture_id, 2, 1).unwrap();

        let err = record_result(&mut schedule, &mut storage, &fixture_id, 0, 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_outcome_for_each_side() {
        let mut schedule = schedule();
        let mut storage = MatchStorage::new();

        let fixture_id = schedule.tours[0].items[0].id.clone();
        let result = record_result(&mut schedule, &mut storage, &fixture_id, 3, 1).unwrap();

        assert_eq!(
            result.outcome_for(result.home_participant_id),
            Some(MatchOutcome::Win)
        );
        assert_eq!(
            result.outcome_for(result.away_participant_id),
            Some(MatchOutcome::Loss)
        );
        assert_eq!(result.outcome_for(999), None);
    }

    #[test]
    fn test_without_latest_round() {
        let mut schedule = schedule();
        let mut storage = MatchStorage::new();

        let round_one: Vec<String> =
            schedule.tours[0].items.iter().map(|i| i.id.clone()).collect();
        let round_two: Vec<String> =
            schedule.tours[1].items.iter().map(|i| i.id.clone()).collect();

        for id in &round_one {
            record_result(&mut schedule, &mut storage, id, 1, 0).unwrap();
        }
        for id in &round_two {
            record_result(&mut schedule, &mut storage, id, 2, 2).unwrap();
        }

        assert_eq!(storage.completed_round_count(), 2);
        assert_eq!(storage.latest_round(), Some(2));

        let truncated = storage.without_latest_round();
        assert_eq!(truncated.len(), round_one.len());
        assert!(truncated.iter().all(|r| r.round == 1));
    }
}
