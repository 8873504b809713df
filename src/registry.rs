//! Static tournament reference data: teams, playoff paths and the drawn
//! group layout. Everything here is a load-time constant.

use std::collections::BTreeMap;

use crate::types::{Group, PlayoffPath, SlotValue, Team, TEAMS_PER_GROUP};

/// A drawn group position before playoff selections are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSeed {
    Team(&'static str),
    Playoff(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct InitialGroup {
    pub id: char,
    pub slots: [SlotSeed; TEAMS_PER_GROUP],
}

const fn team(id: &'static str, name: &'static str, flag: &'static str, rating: u16) -> Team {
    Team { id, name, flag, rating }
}

static TEAMS: &[Team] = &[
    // Group A
    team("MEX", "Mexico", "🇲🇽", 16),
    team("RSA", "South Africa", "🇿🇦", 59),
    team("KOR", "South Korea", "🇰🇷", 22),
    // Group B
    team("CAN", "Canada", "🇨🇦", 35),
    team("QAT", "Qatar", "🇶🇦", 46),
    team("SUI", "Switzerland", "🇨🇭", 17),
    // Group C
    team("BRA", "Brazil", "🇧🇷", 5),
    team("MAR", "Morocco", "🇲🇦", 13),
    team("HAI", "Haiti", "🇭🇹", 86),
    team("SCO", "Scotland", "🏴\u{e0067}\u{e0062}\u{e0073}\u{e0063}\u{e0074}\u{e007f}", 51),
    // Group D
    team("USA", "United States", "🇺🇸", 18),
    team("PAR", "Paraguay", "🇵🇾", 55),
    team("AUS", "Australia", "🇦🇺", 24),
    // Group E
    team("GER", "Germany", "🇩🇪", 11),
    team("CUW", "Curaçao", "🇨🇼", 88),
    team("CIV", "Ivory Coast", "🇨🇮", 40),
    team("ECU", "Ecuador", "🇪🇨", 27),
    // Group F
    team("NED", "Netherlands", "🇳🇱", 8),
    team("JPN", "Japan", "🇯🇵", 15),
    team("TUN", "Tunisia", "🇹🇳", 47),
    // Group G
    team("BEL", "Belgium", "🇧🇪", 6),
    team("EGY", "Egypt", "🇪🇬", 30),
    team("IRN", "Iran", "🇮🇷", 19),
    team("NZL", "New Zealand", "🇳🇿", 91),
    // Group H
    team("ESP", "Spain", "🇪🇸", 1),
    team("CPV", "Cape Verde", "🇨🇻", 65),
    team("KSA", "Saudi Arabia", "🇸🇦", 59),
    team("URU", "Uruguay", "🇺🇾", 14),
    // Group I
    team("FRA", "France", "🇫🇷", 2),
    team("SEN", "Senegal", "🇸🇳", 20),
    team("NOR", "Norway", "🇳🇴", 43),
    // Group J
    team("ARG", "Argentina", "🇦🇷", 1),
    team("ALG", "Algeria", "🇩🇿", 37),
    team("AUT", "Austria", "🇦🇹", 23),
    team("JOR", "Jordan", "🇯🇴", 64),
    // Group K
    team("POR", "Portugal", "🇵🇹", 7),
    team("UZB", "Uzbekistan", "🇺🇿", 58),
    team("COL", "Colombia", "🇨🇴", 10),
    // Group L
    team("ENG", "England", "🏴\u{e0067}\u{e0062}\u{e0065}\u{e006e}\u{e0067}\u{e007f}", 4),
    team("CRO", "Croatia", "🇭🇷", 12),
    team("GHA", "Ghana", "🇬🇭", 73),
    team("PAN", "Panama", "🇵🇦", 35),
    // UEFA Path A
    team("ITA", "Italy", "🇮🇹", 9),
    team("NIR", "Northern Ireland", "🇬🇧", 71),
    team("WAL", "Wales", "🏴\u{e0067}\u{e0062}\u{e0077}\u{e006c}\u{e0073}\u{e007f}", 29),
    team("BIH", "Bosnia & Herzegovina", "🇧🇦", 78),
    // UEFA Path B
    team("UKR", "Ukraine", "🇺🇦", 25),
    team("SWE", "Sweden", "🇸🇪", 28),
    team("POL", "Poland", "🇵🇱", 31),
    team("ALB", "Albania", "🇦🇱", 58),
    // UEFA Path C
    team("TUR", "Türkiye", "🇹🇷", 26),
    team("ROU", "Romania", "🇷🇴", 43),
    team("SVK", "Slovakia", "🇸🇰", 41),
    team("KOS", "Kosovo", "🇽🇰", 99),
    // UEFA Path D
    team("DEN", "Denmark", "🇩🇰", 21),
    team("MKD", "North Macedonia", "🇲🇰", 69),
    team("CZE", "Czechia", "🇨🇿", 45),
    team("IRL", "Ireland", "🇮🇪", 63),
    // Intercontinental 1
    team("JAM", "Jamaica", "🇯🇲", 61),
    team("NCL", "New Caledonia", "🇳🇨", 155),
    team("COD", "DR Congo", "🇨🇩", 57),
    // Intercontinental 2
    team("BOL", "Bolivia", "🇧🇴", 79),
    team("SUR", "Suriname", "🇸🇷", 136),
    team("IRQ", "Iraq", "🇮🇶", 56),
];

static PLAYOFF_PATHS: &[PlayoffPath] = &[
    PlayoffPath { key: "UEFA_A", name: "UEFA Path A", candidates: &["ITA", "NIR", "WAL", "BIH"] },
    PlayoffPath { key: "UEFA_B", name: "UEFA Path B", candidates: &["UKR", "SWE", "POL", "ALB"] },
    PlayoffPath { key: "UEFA_C", name: "UEFA Path C", candidates: &["TUR", "ROU", "SVK", "KOS"] },
    PlayoffPath { key: "UEFA_D", name: "UEFA Path D", candidates: &["DEN", "MKD", "CZE", "IRL"] },
    PlayoffPath { key: "IC_1", name: "Intercontinental 1", candidates: &["JAM", "NCL", "COD"] },
    PlayoffPath { key: "IC_2", name: "Intercontinental 2", candidates: &["BOL", "SUR", "IRQ"] },
];

use SlotSeed::{Playoff as P, Team as T};

static INITIAL_GROUPS: &[InitialGroup] = &[
    InitialGroup { id: 'A', slots: [T("MEX"), T("RSA"), T("KOR"), P("UEFA_D")] },
    InitialGroup { id: 'B', slots: [T("CAN"), P("UEFA_A"), T("QAT"), T("SUI")] },
    InitialGroup { id: 'C', slots: [T("BRA"), T("MAR"), T("HAI"), T("SCO")] },
    InitialGroup { id: 'D', slots: [T("USA"), T("PAR"), T("AUS"), P("UEFA_C")] },
    InitialGroup { id: 'E', slots: [T("GER"), T("CUW"), T("CIV"), T("ECU")] },
    InitialGroup { id: 'F', slots: [T("NED"), T("JPN"), P("UEFA_B"), T("TUN")] },
    InitialGroup { id: 'G', slots: [T("BEL"), T("EGY"), T("IRN"), T("NZL")] },
    InitialGroup { id: 'H', slots: [T("ESP"), T("CPV"), T("KSA"), T("URU")] },
    InitialGroup { id: 'I', slots: [T("FRA"), T("SEN"), P("IC_2"), T("NOR")] },
    InitialGroup { id: 'J', slots: [T("ARG"), T("ALG"), T("AUT"), T("JOR")] },
    InitialGroup { id: 'K', slots: [T("POR"), P("IC_1"), T("UZB"), T("COL")] },
    InitialGroup { id: 'L', slots: [T("ENG"), T("CRO"), T("GHA"), T("PAN")] },
];

pub fn teams() -> &'static [Team] {
    TEAMS
}

pub fn find_team(id: &str) -> Option<&'static Team> {
    TEAMS.iter().find(|team| team.id == id)
}

pub fn playoff_paths() -> &'static [PlayoffPath] {
    PLAYOFF_PATHS
}

pub fn find_playoff_path(key: &str) -> Option<&'static PlayoffPath> {
    PLAYOFF_PATHS.iter().find(|path| path.key == key)
}

pub fn initial_groups() -> &'static [InitialGroup] {
    INITIAL_GROUPS
}

/// Apply playoff selections to the drawn layout.
///
/// Groups are rebuilt from the static draw on every call; a path without a
/// selection keeps its pending placeholder.
pub fn resolve_groups(selected_winners: &BTreeMap<String, String>) -> Vec<Group> {
    INITIAL_GROUPS
        .iter()
        .map(|group| Group {
            id: group.id,
            slots: group.slots.map(|seed| match seed {
                SlotSeed::Team(id) => SlotValue::team(id),
                SlotSeed::Playoff(key) => match selected_winners.get(key) {
                    Some(winner) => SlotValue::team(winner.clone()),
                    None => SlotValue::playoff(key),
                },
            }),
        })
        .collect()
}
