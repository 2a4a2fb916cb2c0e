use chrono::NaiveDate;
use serde::Deserialize;

const STATIC_LEAGUES_JSON: &str = include_str!("../data/leagues.json");

#[derive(Deserialize)]
pub struct LeagueEntity {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub double_round: bool,
    pub season_start: NaiveDate,
    pub tiers: Vec<TierEntity>,
}

#[derive(Deserialize)]
pub struct TierEntity {
    pub id: u32,
    pub name: String,
    pub level: u8,
}

#[derive(Deserialize)]
pub struct ParticipantEntity {
    pub id: u32,
    pub name: String,
    pub organization: String,
    pub tier_id: u32,
    pub track: String,
    pub home_venue: Option<String>,
    pub registered_at: NaiveDate,
}

#[derive(Deserialize)]
pub struct DatabaseEntity {
    pub league: LeagueEntity,
    pub participants: Vec<ParticipantEntity>,
}

pub struct DatabaseLoader;

impl DatabaseLoader {
    pub fn load() -> DatabaseEntity {
        serde_json::from_str(STATIC_LEAGUES_JSON).unwrap()
    }
}
