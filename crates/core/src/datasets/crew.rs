//! Companions: the ordinary roster (`일반동료얻기.json`) and the special
//! companion Azizah (`아지자.json`).

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::LoadError,
    loader::{Dataset, LoadOptions},
    query::{Criteria, Ranked, SearchTerm},
};

use super::common::Protagonist;

/// How one protagonist recruits a companion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecruitRoute {
    /// Protagonist name as written in the dataset.
    pub character: String,
    /// Recruitment condition; absent when the protagonist cannot recruit.
    #[serde(default)]
    pub condition: Option<String>,
}

impl RecruitRoute {
    /// Protagonist this route belongs to, when the name is known.
    pub fn protagonist(&self) -> Option<Protagonist> {
        Protagonist::from_label(&self.character)
    }

    /// Condition text, `None` when blank.
    pub fn condition_text(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// An ordinary companion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Companion {
    /// Companion name.
    pub name: String,
    /// Recruitment route per protagonist.
    #[serde(default)]
    pub routes: Vec<RecruitRoute>,
}

impl Companion {
    /// Routes with a condition, limited to `character` when one is selected.
    pub fn routes_for<'a>(
        &'a self,
        character: Option<&'a str>,
    ) -> impl Iterator<Item = &'a RecruitRoute> + 'a {
        self.routes.iter().filter(move |route| {
            route.condition_text().is_some()
                && character.map_or(true, |selected| route.character == selected)
        })
    }

    /// One-line summary of the visible routes. With a protagonist selected
    /// the protagonist's name is omitted.
    pub fn summary(&self, character: Option<&str>) -> String {
        self.routes_for(character)
            .filter_map(|route| {
                let condition = route.condition_text()?;
                Some(match character {
                    Some(_) => condition.to_string(),
                    None => format!("{} | {}", route.character, condition),
                })
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Ranked for Companion {}

/// The loaded companion roster.
#[derive(Debug, Clone, Default)]
pub struct CrewRoster {
    companions: Arc<[Companion]>,
}

impl CrewRoster {
    /// Parse the roster document: a JSON array of companions.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let companions: Vec<Companion> =
            serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
                dataset: Self::NAME,
                source,
            })?;
        Ok(Self {
            companions: companions.into(),
        })
    }

    /// All companions in document order.
    pub fn companions(&self) -> &[Companion] {
        &self.companions
    }

    /// Shared handle to the companions, for building views.
    pub fn records(&self) -> Arc<[Companion]> {
        Arc::clone(&self.companions)
    }

    /// Number of companions.
    pub fn len(&self) -> usize {
        self.companions.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }

    /// Protagonist names appearing in any route. Known protagonists come
    /// first in cast order, unknown names follow alphabetically.
    pub fn characters(&self) -> Vec<String> {
        let mut known: Vec<Protagonist> = Vec::new();
        let mut other: Vec<&str> = Vec::new();
        for route in self.companions.iter().flat_map(|c| &c.routes) {
            match route.protagonist() {
                Some(p) if !known.contains(&p) => known.push(p),
                Some(_) => {}
                None if !other.contains(&route.character.as_str()) => {
                    other.push(&route.character)
                }
                None => {}
            }
        }
        known.sort_by_key(|p| Protagonist::ALL.iter().position(|q| q == p));
        other.sort_unstable();
        known
            .into_iter()
            .map(|p| p.label().to_string())
            .chain(other.into_iter().map(str::to_string))
            .collect()
    }
}

impl Dataset for CrewRoster {
    const NAME: &'static str = "companions";
    const FILE_NAME: &'static str = "일반동료얻기.json";

    fn parse(bytes: &[u8], _options: &LoadOptions) -> Result<Self, LoadError> {
        Self::from_slice(bytes)
    }
}

/// Active inputs of the companion search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrewCriteria {
    /// Free-text term over the companion name.
    pub term: SearchTerm,
    /// Protagonist that must appear in a route.
    pub character: Option<String>,
}

impl CrewCriteria {
    /// Criteria matching every companion.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Criteria<Companion> for CrewCriteria {
    fn term(&self) -> &SearchTerm {
        &self.term
    }

    fn matches(&self, companion: &Companion) -> bool {
        self.term.matches_any([companion.name.as_str()])
            && self.character.as_deref().map_or(true, |selected| {
                companion
                    .routes
                    .iter()
                    .any(|route| route.character == selected)
            })
    }
}

/// One step of the special companion's recruitment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Requirement {
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Typed details.
    #[serde(flatten)]
    pub kind: RequirementKind,
}

/// Typed requirement details, keyed by the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementKind {
    /// An item must be carried or equipped.
    ItemRequired {
        /// Item name.
        item: String,
        /// Whether the item must be equipped.
        #[serde(default)]
        must_be_equipped: bool,
        /// Whether the item must be carried.
        #[serde(default)]
        must_be_carried: bool,
    },
    /// A minimum amount of money.
    MoneyRequired {
        /// Minimum gold.
        money_min: u64,
    },
    /// Companions that must sail in the main fleet.
    MainFleetMembers {
        /// Companion names.
        #[serde(default)]
        required_members: Vec<String>,
        /// Extra remark.
        #[serde(default)]
        note: Option<String>,
    },
    /// An event to trigger somewhere.
    EventTrigger {
        /// Where the event happens.
        location: String,
        /// Item needed to trigger it.
        #[serde(default)]
        requires_item: Option<String>,
    },
    /// A battle to win.
    BattleEvent {
        /// Where the battle happens.
        location: String,
        /// Opposing fleet.
        opponent: String,
    },
    /// A protagonist-specific variation.
    SpecialCase {
        /// Protagonist the case applies to.
        character: String,
        /// Companions needed in that case.
        #[serde(default)]
        required_members: Vec<String>,
    },
    /// Any type not listed above.
    #[serde(other)]
    Other,
}

impl Requirement {
    /// Heading for the requirement card.
    pub fn title(&self) -> &'static str {
        match self.kind {
            RequirementKind::ItemRequired { .. } => "필수 아이템",
            RequirementKind::MoneyRequired { .. } => "필수 자금",
            RequirementKind::MainFleetMembers { .. } => "필수 동료",
            RequirementKind::EventTrigger { .. } => "이벤트 발생",
            RequirementKind::BattleEvent { .. } => "전투 이벤트",
            RequirementKind::SpecialCase { .. } | RequirementKind::Other => "특수 조건",
        }
    }

    /// Detail lines for the requirement card.
    pub fn details(&self) -> Vec<String> {
        match &self.kind {
            RequirementKind::ItemRequired {
                item,
                must_be_equipped,
                must_be_carried,
            } => vec![
                format!("필수 아이템: {item}"),
                format!(
                    "장비 여부: {}",
                    if *must_be_equipped {
                        "장비 중이어야 함"
                    } else {
                        "장비 중이면 안 됨"
                    }
                ),
                format!(
                    "소지 여부: {}",
                    if *must_be_carried {
                        "소지해야 함"
                    } else {
                        "소지하지 않아도 됨"
                    }
                ),
            ],
            RequirementKind::MoneyRequired { money_min } => {
                vec![format!("필요 자금: {}닢", group_thousands(*money_min))]
            }
            RequirementKind::MainFleetMembers {
                required_members,
                note,
            } => required_members
                .iter()
                .cloned()
                .chain(note.iter().cloned())
                .collect(),
            RequirementKind::EventTrigger {
                location,
                requires_item,
            } => {
                let mut lines = vec![format!("위치: {location}")];
                if let Some(item) = requires_item {
                    lines.push(format!("필요 아이템: {item}"));
                }
                lines
            }
            RequirementKind::BattleEvent { location, opponent } => {
                vec![format!("위치: {location}"), format!("상대: {opponent}")]
            }
            RequirementKind::SpecialCase {
                character,
                required_members,
            } => std::iter::once(format!("특수 조건: {character} 플레이 시"))
                .chain(required_members.iter().cloned())
                .collect(),
            RequirementKind::Other => Vec::new(),
        }
    }
}

/// Recruitment guide for the special companion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpecialCompanion {
    /// Requirements in the order they must be met.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Additional remarks.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Dataset for SpecialCompanion {
    const NAME: &'static str = "special companion";
    const FILE_NAME: &'static str = "아지자.json";

    fn parse(bytes: &[u8], _options: &LoadOptions) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
            dataset: Self::NAME,
            source,
        })
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
