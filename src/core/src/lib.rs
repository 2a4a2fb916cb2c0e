pub mod charity;
pub mod error;
pub mod league;
pub mod participant;

// Re-export charity items
pub use charity::{
    BonusMultiplier, CharityTable, CharityTableRow, DonationEntry, DonationLog,
    compute_charity_multiplier, record_donation_period,
};

// Re-export error items
pub use error::{EngineError, EngineResult};

// Re-export league items
pub use league::{
    DateAllocation, FixtureStatus, League, LeagueSettings, LeagueTable, LeagueTableRow,
    MatchOutcome, MatchResult, MatchStorage, RolloverReport, Schedule, ScheduleItem, ScheduleTour,
    SeasonState, Tier, TierMove, Trend, Zone, ZoneAssignment, ZoneClassifier,
};

// Re-export participant items
pub use participant::{CompetitionTrack, Participant, ParticipantCollection};
