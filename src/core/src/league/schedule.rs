use crate::error::{EngineError, EngineResult};
use crate::participant::Participant;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const DEFAULT_VENUE: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    Scheduled,
    Completed,
    Postponed,
    Cancelled,
}

/// A single fixture inside a round.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleItem {
    pub id: String,
    pub tier_id: u32,
    pub round: u8,
    pub home_participant_id: u32,
    pub away_participant_id: u32,
    pub date: NaiveDateTime,
    pub status: FixtureStatus,
    pub venue: String,
}

impl ScheduleItem {
    fn fixture_id(tier_id: u32, round: u8, home_id: u32, away_id: u32) -> String {
        format!("{}-{}-{}-{}", tier_id, round, home_id, away_id)
    }

    pub fn involves(&self, participant_id: u32) -> bool {
        self.home_participant_id == participant_id || self.away_participant_id == participant_id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleTour {
    pub num: u8,
    pub items: Vec<ScheduleItem>,
}

/// Maps round numbers to calendar dates. The scheduling algorithm itself
/// is date-agnostic; this is a configuration detail of the league.
#[derive(Debug, Clone)]
pub struct DateAllocation {
    pub season_start: NaiveDate,
    pub days_between_rounds: i64,
    pub kickoff: NaiveTime,
}

impl DateAllocation {
    pub fn weekly(season_start: NaiveDate) -> Self {
        DateAllocation {
            season_start,
            days_between_rounds: 7,
            kickoff: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
        }
    }

    pub fn date_for_round(&self, round: u8) -> NaiveDateTime {
        let date =
            self.season_start + Duration::days(self.days_between_rounds * (round as i64 - 1));

        NaiveDateTime::new(date, self.kickoff)
    }
}

/// Round-robin fixture list for one tier, grouped into numbered rounds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schedule {
    pub tours: Vec<ScheduleTour>,
}

impl Schedule {
    /// Generates a circle-method round-robin among `participants`, in the
    /// order given. Odd counts get a synthetic bye slot; fixtures against
    /// the bye are dropped, so one participant sits out each round. With
    /// `double_round` a second pass with reversed venues is appended.
    pub fn generate(
        tier_id: u32,
        participants: &[&Participant],
        double_round: bool,
        allocation: &DateAllocation,
    ) -> EngineResult<Schedule> {
        if participants.len() < 2 {
            return Err(EngineError::Configuration(format!(
                "tier {} has {} participants, need at least 2 to schedule",
                tier_id,
                participants.len()
            )));
        }

        let track = participants[0].track;
        if participants.iter().any(|p| p.track != track) {
            return Err(EngineError::Configuration(format!(
                "tier {} mixes competition tracks",
                tier_id
            )));
        }

        // Circle method: slot 0 stays fixed, the rest rotate one step per
        // round. `None` is the bye slot for odd participant counts.
        let mut slots: Vec<Option<&Participant>> = participants.iter().copied().map(Some).collect();
        if slots.len() % 2 != 0 {
            slots.push(None);
        }

        let slot_count = slots.len();
        let rounds_per_cycle = (slot_count - 1) as u8;

        let mut tours = Vec::with_capacity(if double_round {
            rounds_per_cycle as usize * 2
        } else {
            rounds_per_cycle as usize
        });

        let mut first_leg_pairs: Vec<Vec<(&Participant, &Participant)>> = Vec::new();

        for round_index in 0..rounds_per_cycle {
            let mut pairs = Vec::with_capacity(slot_count / 2);

            for i in 0..slot_count / 2 {
                let (first, second) = (slots[i], slots[slot_count - 1 - i]);

                let (Some(a), Some(b)) = (first, second) else {
                    continue;
                };

                // Alternate the fixed slot's venue so it is not at home
                // every round.
                let (home, away) = if i == 0 && round_index % 2 == 1 {
                    (b, a)
                } else {
                    (a, b)
                };

                pairs.push((home, away));
            }

            first_leg_pairs.push(pairs);

            // Rotate every slot except the first.
            let last = slots.pop().unwrap_or(None);
            slots.insert(1, last);
        }

        for (round_index, pairs) in first_leg_pairs.iter().enumerate() {
            let round = round_index as u8 + 1;
            tours.push(Self::build_tour(tier_id, round, pairs, false, allocation));
        }

        if double_round {
            for (round_index, pairs) in first_leg_pairs.iter().enumerate() {
                let round = rounds_per_cycle + round_index as u8 + 1;
                tours.push(Self::build_tour(tier_id, round, pairs, true, allocation));
            }
        }

        Ok(Schedule { tours })
    }

    fn build_tour(
        tier_id: u32,
        round: u8,
        pairs: &[(&Participant, &Participant)],
        reverse_venues: bool,
        allocation: &DateAllocation,
    ) -> ScheduleTour {
        let items = pairs
            .iter()
            .map(|&(a, b)| {
                let (home, away) = if reverse_venues { (b, a) } else { (a, b) };

                ScheduleItem {
                    id: ScheduleItem::fixture_id(tier_id, round, home.id, away.id),
                    tier_id,
                    round,
                    home_participant_id: home.id,
                    away_participant_id: away.id,
                    date: allocation.date_for_round(round),
                    status: FixtureStatus::Scheduled,
                    venue: home
                        .home_venue
                        .clone()
                        .unwrap_or_else(|| String::from(DEFAULT_VENUE)),
                }
            })
            .collect();

        ScheduleTour { num: round, items }
    }

    /// Rebuilds the schedule mid-season. Fixtures that are no longer in
    /// `Scheduled` status survive untouched; everything still pending is
    /// replaced by the freshly generated fixture for the same pairing.
    /// Refuses to run over completed fixtures unless `force` is set.
    pub fn regenerate(
        &mut self,
        tier_id: u32,
        participants: &[&Participant],
        double_round: bool,
        allocation: &DateAllocation,
        force: bool,
    ) -> EngineResult<()> {
        let has_completed = self
            .items()
            .any(|item| item.status == FixtureStatus::Completed);

        if has_completed && !force {
            return Err(EngineError::InconsistentSchedule(format!(
                "tier {} has completed fixtures, pass force to regenerate around them",
                tier_id
            )));
        }

        let fresh = Schedule::generate(tier_id, participants, double_round, allocation)?;

        let settled: Vec<ScheduleItem> = self
            .items()
            .filter(|item| item.status != FixtureStatus::Scheduled)
            .cloned()
            .collect();

        let mut matched: Vec<&str> = Vec::new();

        let mut tours: Vec<ScheduleTour> = fresh
            .tours
            .into_iter()
            .map(|tour| {
                let items = tour
                    .items
                    .into_iter()
                    .map(|item| {
                        match settled.iter().find(|s| {
                            s.round == item.round
                                && s.home_participant_id == item.home_participant_id
                                && s.away_participant_id == item.away_participant_id
                        }) {
                            Some(existing) => {
                                matched.push(existing.id.as_str());
                                existing.clone()
                            }
                            None => item,
                        }
                    })
                    .collect();

                ScheduleTour {
                    num: tour.num,
                    items,
                }
            })
            .collect();

        // Settled fixtures whose pairing the fresh generation no longer
        // produces (membership changed mid-season) stay on the books.
        for item in &settled {
            if matched.iter().any(|id| *id == item.id) {
                continue;
            }

            match tours.iter_mut().find(|t| t.num == item.round) {
                Some(tour) => tour.items.push(item.clone()),
                None => tours.push(ScheduleTour {
                    num: item.round,
                    items: vec![item.clone()],
                }),
            }
        }

        tours.sort_by_key(|t| t.num);

        self.tours = tours;

        Ok(())
    }

    pub fn items(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.tours.iter().flat_map(|t| &t.items)
    }

    pub fn item_by_id(&self, fixture_id: &str) -> Option<&ScheduleItem> {
        self.items().find(|item| item.id == fixture_id)
    }

    pub(crate) fn item_by_id_mut(&mut self, fixture_id: &str) -> Option<&mut ScheduleItem> {
        self.tours
            .iter_mut()
            .flat_map(|t| &mut t.items)
            .find(|item| item.id == fixture_id)
    }

    pub fn items_for_participant(&self, participant_id: u32) -> Vec<&ScheduleItem> {
        self.items()
            .filter(|item| item.involves(participant_id))
            .collect()
    }

    /// Takes a scheduled fixture off the calendar without settling it.
    /// A postponed fixture blocks season completion until it is either
    /// rebooked or cancelled.
    pub fn postpone(&mut self, fixture_id: &str) -> EngineResult<()> {
        let item = self
            .item_by_id_mut(fixture_id)
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        if item.status != FixtureStatus::Scheduled {
            return Err(EngineError::invalid_state(format!(
                "fixture {} is {:?}, only scheduled fixtures can be postponed",
                fixture_id, item.status
            )));
        }

        item.status = FixtureStatus::Postponed;

        Ok(())
    }

    /// Puts a postponed fixture back on the calendar at a new date.
    pub fn rebook(&mut self, fixture_id: &str, date: NaiveDateTime) -> EngineResult<()> {
        let item = self
            .item_by_id_mut(fixture_id)
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        if item.status != FixtureStatus::Postponed {
            return Err(EngineError::invalid_state(format!(
                "fixture {} is {:?}, only postponed fixtures can be rebooked",
                fixture_id, item.status
            )));
        }

        item.status = FixtureStatus::Scheduled;
        item.date = date;

        Ok(())
    }

    /// Settles a fixture without a result. A cancelled fixture no longer
    /// counts against season completion.
    pub fn cancel(&mut self, fixture_id: &str) -> EngineResult<()> {
        let item = self
            .item_by_id_mut(fixture_id)
            .ok_or_else(|| EngineError::not_found(format!("fixture {}", fixture_id)))?;

        if item.status == FixtureStatus::Completed {
            return Err(EngineError::invalid_state(format!(
                "fixture {} already has a result, completed fixtures cannot be cancelled",
                fixture_id
            )));
        }

        item.status = FixtureStatus::Cancelled;

        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        !self.tours.is_empty()
            && self.items().all(|item| {
                matches!(
                    item.status,
                    FixtureStatus::Completed | FixtureStatus::Cancelled
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::CompetitionTrack;
    use std::collections::HashSet;

    fn participants(count: u32) -> Vec<Participant> {
        (1..=count)
            .map(|id| {
                Participant::new(
                    id,
                    format!("Team {}", id),
                    format!("Org {}", id),
                    1,
                    CompetitionTrack::Sports,
                    if id == 1 {
                        Some(String::from("Central Park"))
                    } else {
                        None
                    },
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                )
            })
            .collect()
    }

    fn allocation() -> DateAllocation {
        DateAllocation::weekly(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
    }

    fn generate(count: u32, double_round: bool) -> Schedule {
        let owned = participants(count);
        let refs: Vec<&Participant> = owned.iter().collect();

        Schedule::generate(1, &refs, double_round, &allocation()).unwrap()
    }

    #[test]
    fn test_rejects_too_few_participants() {
        let owned = participants(1);
        let refs: Vec<&Participant> = owned.iter().collect();

        let err = Schedule::generate(1, &refs, false, &allocation()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_rejects_mixed_tracks() {
        let mut owned = participants(4);
        owned[2].track = CompetitionTrack::Charity;
        let refs: Vec<&Participant> = owned.iter().collect();

        let err = Schedule::generate(1, &refs, false, &allocation()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_four_teams_single_round() {
        let schedule = generate(4, false);

        assert_eq!(schedule.tours.len(), 3);
        assert_eq!(schedule.items().count(), 6);

        for tour in &schedule.tours {
            assert_eq!(tour.items.len(), 2);
        }

        for id in 1..=4 {
            assert_eq!(schedule.items_for_participant(id).len(), 3);
        }
    }

    #[test]
    fn test_no_participant_twice_in_same_round() {
        for count in 2..=9 {
            let schedule = generate(count, false);

            for tour in &schedule.tours {
                let mut seen = HashSet::new();
                for item in &tour.items {
                    assert!(seen.insert(item.home_participant_id));
                    assert!(seen.insert(item.away_participant_id));
                }
            }
        }
    }

    #[test]
    fn test_every_pair_meets_exactly_once() {
        for count in 2u32..=9 {
            let schedule = generate(count, false);

            let mut pairs = HashSet::new();
            for item in schedule.items() {
                let pair = if item.home_participant_id < item.away_participant_id {
                    (item.home_participant_id, item.away_participant_id)
                } else {
                    (item.away_participant_id, item.home_participant_id)
                };
                assert!(pairs.insert(pair), "pair {:?} scheduled twice", pair);
            }

            assert_eq!(pairs.len() as u32, count * (count - 1) / 2);
        }
    }

    #[test]
    fn test_odd_count_has_one_bye_per_round() {
        let schedule = generate(5, false);

        // 5 participants -> 5 rounds of 2 fixtures, one side resting.
        assert_eq!(schedule.tours.len(), 5);
        for tour in &schedule.tours {
            assert_eq!(tour.items.len(), 2);
        }

        for id in 1..=5 {
            assert_eq!(schedule.items_for_participant(id).len(), 4);
        }
    }

    #[test]
    fn test_double_round_reverses_venues() {
        let schedule = generate(4, true);

        assert_eq!(schedule.tours.len(), 6);
        assert_eq!(schedule.items().count(), 12);

        let mut ordered = HashSet::new();
        for item in schedule.items() {
            assert!(ordered.insert((item.home_participant_id, item.away_participant_id)));
        }

        // Every ordered pairing appears exactly once.
        assert_eq!(ordered.len(), 12);

        for id in 1..=4 {
            let items = schedule.items_for_participant(id);
            assert_eq!(items.len(), 6);

            let home = items
                .iter()
                .filter(|i| i.home_participant_id == id)
                .count();
            assert_eq!(home, 3);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate(6, true);
        let second = generate(6, true);

        let first_ids: Vec<&String> = first.items().map(|i| &i.id).collect();
        let second_ids: Vec<&String> = second.items().map(|i| &i.id).collect();

        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_venue_defaults_to_tbd() {
        let schedule = generate(4, false);

        for item in schedule.items() {
            if item.home_participant_id == 1 {
                assert_eq!(item.venue, "Central Park");
            } else {
                assert_eq!(item.venue, "TBD");
            }
        }
    }

    #[test]
    fn test_dates_follow_round_allocation() {
        let schedule = generate(4, false);

        let first = schedule.tours[0].items[0].date.date();
        let second = schedule.tours[1].items[0].date.date();

        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(second, NaiveDate::from_ymd_opt(2024, 9, 8).unwrap());
    }

    #[test]
    fn test_regenerate_refuses_completed_without_force() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        schedule.item_by_id_mut(&fixture_id).unwrap().status = FixtureStatus::Completed;

        let owned = participants(4);
        let refs: Vec<&Participant> = owned.iter().collect();

        let err = schedule
            .regenerate(1, &refs, false, &allocation(), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::InconsistentSchedule(_)));
    }

    #[test]
    fn test_regenerate_preserves_completed_fixtures() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        {
            let item = schedule.item_by_id_mut(&fixture_id).unwrap();
            item.status = FixtureStatus::Completed;
        }

        let owned = participants(4);
        let refs: Vec<&Participant> = owned.iter().collect();

        schedule
            .regenerate(1, &refs, false, &allocation(), true)
            .unwrap();

        assert_eq!(schedule.items().count(), 6);
        assert_eq!(
            schedule.item_by_id(&fixture_id).unwrap().status,
            FixtureStatus::Completed
        );
        assert_eq!(
            schedule
                .items()
                .filter(|i| i.status == FixtureStatus::Completed)
                .count(),
            1
        );
    }

    #[test]
    fn test_postpone_blocks_completion_until_rebooked() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        schedule.postpone(&fixture_id).unwrap();
        assert_eq!(
            schedule.item_by_id(&fixture_id).unwrap().status,
            FixtureStatus::Postponed
        );

        for tour in &mut schedule.tours {
            for item in &mut tour.items {
                if item.status == FixtureStatus::Scheduled {
                    item.status = FixtureStatus::Completed;
                }
            }
        }
        assert!(!schedule.is_complete());

        let new_date = allocation().date_for_round(9);
        schedule.rebook(&fixture_id, new_date).unwrap();

        let item = schedule.item_by_id(&fixture_id).unwrap();
        assert_eq!(item.status, FixtureStatus::Scheduled);
        assert_eq!(item.date, new_date);
    }

    #[test]
    fn test_cancelled_fixture_does_not_block_completion() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        for tour in &mut schedule.tours {
            for item in &mut tour.items {
                if item.id != fixture_id {
                    item.status = FixtureStatus::Completed;
                }
            }
        }
        assert!(!schedule.is_complete());

        schedule.cancel(&fixture_id).unwrap();
        assert!(schedule.is_complete());
    }

    #[test]
    fn test_completed_fixture_cannot_be_cancelled() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        schedule.item_by_id_mut(&fixture_id).unwrap().status = FixtureStatus::Completed;

        let err = schedule.cancel(&fixture_id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));

        let err = schedule.postpone(&fixture_id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_regenerate_keeps_completed_fixture_for_departed_participant() {
        let mut schedule = generate(4, false);

        let fixture_id = schedule.tours[0].items[0].id.clone();
        let departed = {
            let item = schedule.item_by_id_mut(&fixture_id).unwrap();
            item.status = FixtureStatus::Completed;
            item.home_participant_id
        };

        let owned = participants(4);
        let refs: Vec<&Participant> = owned
            .iter()
            .filter(|p| p.id != departed)
            .collect();

        schedule
            .regenerate(1, &refs, false, &allocation(), true)
            .unwrap();

        let kept = schedule.item_by_id(&fixture_id).unwrap();
        assert_eq!(kept.status, FixtureStatus::Completed);
        assert_eq!(kept.home_participant_id, departed);
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let mut schedule = generate(6, false);
        let before: Vec<String> = schedule.items().map(|i| i.id.clone()).collect();

        let owned = participants(6);
        let refs: Vec<&Participant> = owned.iter().collect();

        schedule
            .regenerate(1, &refs, false, &allocation(), false)
            .unwrap();

        let after: Vec<String> = schedule.items().map(|i| i.id.clone()).collect();
        assert_eq!(before, after);
    }
}
