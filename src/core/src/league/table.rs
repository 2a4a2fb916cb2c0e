use crate::league::result::{MatchOutcome, MatchResult, MatchStorage};
use crate::participant::Participant;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

pub const POINTS_FOR_WIN: u16 = 3;
pub const POINTS_FOR_DRAW: u16 = 1;

const FORM_LENGTH: usize = 5;

/// Movement of a row relative to the previous standings snapshot (the
/// table computed with the most recent completed round excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueTableRow {
    pub participant_id: u32,
    pub name: String,
    pub played: u8,
    pub won: u8,
    pub drawn: u8,
    pub lost: u8,
    pub goals_for: u16,
    pub goals_against: u16,
    pub goal_difference: i32,
    pub points: u16,
    /// W/D/L of the last 5 completed fixtures, oldest first, never padded.
    pub form: Vec<MatchOutcome>,
    pub trend: Trend,
    pub position: u16,
}

impl LeagueTableRow {
    fn empty(participant: &Participant) -> Self {
        LeagueTableRow {
            participant_id: participant.id,
            name: participant.name.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            form: Vec::new(),
            trend: Trend::Flat,
            position: 0,
        }
    }

    fn apply(&mut self, result: &MatchResult) {
        let Some(outcome) = result.outcome_for(self.participant_id) else {
            return;
        };

        let (scored, conceded) = if result.home_participant_id == self.participant_id {
            (result.home_score, result.away_score)
        } else {
            (result.away_score, result.home_score)
        };

        self.played += 1;
        self.goals_for += scored as u16;
        self.goals_against += conceded as u16;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;

        match outcome {
            MatchOutcome::Win => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            MatchOutcome::Draw => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            MatchOutcome::Loss => {
                self.lost += 1;
            }
        }

        self.form.push(outcome);
        if self.form.len() > FORM_LENGTH {
            self.form.remove(0);
        }
    }

    pub fn form_string(&self) -> String {
        self.form.iter().map(|o| o.letter()).collect()
    }
}

/// Standings for one tier, derived in full from the result log on every
/// call. Identical logs always produce identical tables.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueTable {
    pub tier_id: u32,
    pub rows: Vec<LeagueTableRow>,
}

impl LeagueTable {
    pub fn compute(
        tier_id: u32,
        participants: &[&Participant],
        storage: &MatchStorage,
    ) -> LeagueTable {
        let all: Vec<&MatchResult> = storage.results().iter().collect();
        let mut rows = Self::accumulate(participants, &all);

        // Fewer than two completed rounds gives the previous snapshot
        // nothing to say, so every trend stays flat.
        if storage.completed_round_count() >= 2 {
            let previous = Self::accumulate(participants, &storage.without_latest_round());
            let previous_positions: HashMap<u32, u16> = previous
                .iter()
                .map(|row| (row.participant_id, row.position))
                .collect();

            for row in rows.iter_mut() {
                if let Some(&prior) = previous_positions.get(&row.participant_id) {
                    row.trend = match row.position.cmp(&prior) {
                        std::cmp::Ordering::Less => Trend::Up,
                        std::cmp::Ordering::Greater => Trend::Down,
                        std::cmp::Ordering::Equal => Trend::Flat,
                    };
                }
            }
        }

        LeagueTable { tier_id, rows }
    }

    /// Accumulates, sorts and ranks. Sort order: points, goal difference,
    /// goals for (all descending), then name ascending as the final
    /// tie-break so the order is a strict total order.
    fn accumulate(participants: &[&Participant], results: &[&MatchResult]) -> Vec<LeagueTableRow> {
        let mut rows: HashMap<u32, LeagueTableRow> = participants
            .iter()
            .map(|p| (p.id, LeagueTableRow::empty(p)))
            .collect();

        let ordered = results
            .iter()
            .sorted_by_key(|r| r.round)
            .collect::<Vec<_>>();

        for result in ordered {
            if let Some(row) = rows.get_mut(&result.home_participant_id) {
                row.apply(result);
            }
            if let Some(row) = rows.get_mut(&result.away_participant_id) {
                row.apply(result);
            }
        }

        let mut rows: Vec<LeagueTableRow> = rows
            .into_values()
            .sorted_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then(b.goal_difference.cmp(&a.goal_difference))
                    .then(b.goals_for.cmp(&a.goals_for))
                    .then(a.name.cmp(&b.name))
            })
            .collect();

        for (index, row) in rows.iter_mut().enumerate() {
            row.position = index as u16 + 1;
        }

        rows
    }

    pub fn row_for(&self, participant_id: u32) -> Option<&LeagueTableRow> {
        self.rows.iter().find(|r| r.participant_id == participant_id)
    }

    pub fn position_of(&self, participant_id: u32) -> Option<u16> {
        self.row_for(participant_id).map(|r| r.position)
    }
}
