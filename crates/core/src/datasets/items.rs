//! Item catalog (`dh4_ver4.json`) and its search criteria.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::LoadError,
    loader::{Dataset, LoadOptions},
    progress::AcquiredSet,
    query::{field_matches, Criteria, Ranked, SearchTerm},
};

use super::common::{scalar_text, ByGroup, CharacterGroup, Protagonist};

/// Kind of item. Assigned once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// 무기
    Weapon,
    /// 방어구
    Armor,
    /// 장비품
    Equipment,
    /// 선수상
    Figurehead,
    /// 여성이 동경하는 물건
    Gift,
    /// 원산물
    Specialty,
    /// 항해용품
    Supply,
}

impl Category {
    /// All categories in catalog order.
    pub const ALL: [Category; 7] = [
        Category::Weapon,
        Category::Armor,
        Category::Equipment,
        Category::Figurehead,
        Category::Gift,
        Category::Specialty,
        Category::Supply,
    ];

    /// Label used by the catalog's 종류 field.
    pub fn label(self) -> &'static str {
        match self {
            Category::Weapon => "무기",
            Category::Armor => "방어구",
            Category::Equipment => "장비품",
            Category::Figurehead => "선수상",
            Category::Gift => "여성이 동경하는 물건",
            Category::Specialty => "원산물",
            Category::Supply => "항해용품",
        }
    }

    /// Parse a 종류 label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == label.trim())
    }

    /// Category implied by an index prefix such as `item_w_012`.
    pub fn from_index(index: &str) -> Option<Self> {
        const PREFIXES: [(&str, Category); 7] = [
            ("item_w_", Category::Weapon),
            ("item_a_", Category::Armor),
            ("item_e_", Category::Equipment),
            ("item_f_", Category::Figurehead),
            ("item_g_", Category::Gift),
            ("item_p_", Category::Specialty),
            ("item_c_", Category::Supply),
        ];
        PREFIXES
            .into_iter()
            .find(|(prefix, _)| index.starts_with(prefix))
            .map(|(_, category)| category)
    }

    /// Whether results of this category are ranked by effect.
    pub fn is_ranked(self) -> bool {
        matches!(self, Category::Weapon | Category::Armor)
    }

    /// Whether the effect is shown as a separate ability text.
    pub fn has_ability_text(self) -> bool {
        matches!(self, Category::Figurehead | Category::Supply)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Effect of an item: a bare number or descriptive text.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Numeric effect value.
    Number(f64),
    /// Free text, possibly containing a number (e.g. "공격력 +35").
    Text(String),
}

static FIRST_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("failed to compile effect digit regex"));

impl Effect {
    /// Numeric value used for ranking: numbers as-is, text by its first run
    /// of digits, otherwise 0.
    pub fn value(&self) -> f64 {
        match self {
            Effect::Number(value) => *value,
            Effect::Text(text) => FIRST_DIGITS_RE
                .find(text)
                .and_then(|digits| digits.as_str().parse::<i64>().ok())
                .map(|value| value as f64)
                .unwrap_or(0.0),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(num) => num.as_f64().map(Effect::Number),
            other => scalar_text(other).map(Effect::Text),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Number(value) if value.fract() == 0.0 => write!(f, "{}", *value as i64),
            Effect::Number(value) => write!(f, "{value}"),
            Effect::Text(text) => f.write_str(text),
        }
    }
}

/// Where an item is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// One region for every protagonist (specialties).
    Fixed(String),
    /// A region per character group.
    PerGroup(ByGroup<String>),
}

impl Region {
    fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            Some(Value::Object(_)) => Some(Region::PerGroup(ByGroup::from_value(value))),
            Some(other) => scalar_text(other).map(Region::Fixed),
            None => None,
        }
    }

    /// Region names mentioned by this entry.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Region::Fixed(name) => vec![name.as_str()],
            Region::PerGroup(pair) => pair.iter().map(|(_, name)| name.as_str()).collect(),
        }
    }
}

/// Acquisition condition of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The same condition for every protagonist.
    Shared(String),
    /// A condition per character group.
    PerGroup(ByGroup<String>),
}

impl Condition {
    fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            Some(Value::Object(_)) => {
                let pair = ByGroup::from_value(value);
                (!pair.is_empty()).then_some(Condition::PerGroup(pair))
            }
            Some(other) => scalar_text(other).map(Condition::Shared),
            None => None,
        }
    }

    /// Condition that applies to protagonists of `group`.
    pub fn for_group(&self, group: CharacterGroup) -> Option<&str> {
        match self {
            Condition::Shared(text) => Some(text.as_str()),
            Condition::PerGroup(pair) => pair.get(group).map(String::as_str),
        }
    }

    /// Readable form: shared text as-is, pairs as `구: … | 신: …`.
    pub fn text(&self) -> String {
        match self {
            Condition::Shared(text) => text.clone(),
            Condition::PerGroup(pair) => pair
                .iter()
                .map(|(group, text)| format!("{}: {text}", group.short_label()))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Identity used for persistence: the index, or the name when absent.
    pub key: String,
    /// Catalog index such as `item_w_001`.
    pub index: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Kind of item.
    pub category: Category,
    /// Crew position (보직) for equipment.
    pub position: Option<String>,
    /// Effect value or text.
    pub effect: Option<Effect>,
    /// Region where the item is found.
    pub region: Option<Region>,
    /// Exact location per group.
    pub location: ByGroup<String>,
    /// Acquisition condition, shared or per group.
    pub condition: Option<Condition>,
    /// Where a specialty is used (사용처).
    pub usage: Option<String>,
    /// Location of the hostess who likes a gift (좋아하는 여급 위치).
    pub hostess_location: Option<String>,
}

impl Item {
    /// Name, falling back to the index.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.index.as_deref())
            .unwrap_or(self.key.as_str())
    }

    /// Numeric effect value, 0 when the item has none.
    pub fn effect_value(&self) -> f64 {
        self.effect.as_ref().map(Effect::value).unwrap_or(0.0)
    }

    /// Whether protagonists of `group` can obtain the item at all.
    pub fn available_in(&self, group: CharacterGroup) -> bool {
        match &self.region {
            Some(Region::Fixed(_)) => true,
            Some(Region::PerGroup(pair)) => pair.get(group).is_some(),
            None => false,
        }
    }

    /// Whether `protagonist` can obtain the item.
    ///
    /// The item must be available to the protagonist's group, and when the
    /// group's acquisition condition names specific protagonists, the
    /// selected one must be among them.
    pub fn available_to(&self, protagonist: Protagonist) -> bool {
        let group = protagonist.group();
        if !self.available_in(group) {
            return false;
        }
        match self
            .condition
            .as_ref()
            .and_then(|condition| condition.for_group(group))
        {
            Some(text) => {
                let named = Protagonist::mentioned_in(text);
                named.is_empty() || named.contains(&protagonist)
            }
            None => true,
        }
    }

    /// Protagonists named by the acquisition conditions; empty when the
    /// conditions do not restrict by protagonist.
    pub fn named_protagonists(&self) -> Vec<Protagonist> {
        let text = self.condition_text();
        Protagonist::mentioned_in(&text)
    }

    /// Acquisition condition as displayed; empty when there is none.
    pub fn condition_text(&self) -> String {
        self.condition
            .as_ref()
            .map(Condition::text)
            .unwrap_or_default()
    }

    /// Fields searched by the free-text term.
    pub fn search_fields(&self) -> impl Iterator<Item = &str> {
        self.name.as_deref().into_iter().chain(self.index.as_deref())
    }
}

impl Ranked for Item {
    fn rank(&self) -> Option<f64> {
        self.category
            .is_ranked()
            .then(|| self.effect_value())
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "인덱스", default)]
    index: Option<Value>,
    #[serde(rename = "이름", default)]
    name: Option<Value>,
    #[serde(rename = "종류", default)]
    category: Option<Value>,
    #[serde(rename = "보직", default)]
    position: Option<Value>,
    #[serde(rename = "효과", default)]
    effect: Option<Value>,
    #[serde(rename = "지역", default)]
    region: Option<Value>,
    #[serde(rename = "위치", default)]
    location: Option<Value>,
    #[serde(rename = "조건", default)]
    condition: Option<Value>,
    #[serde(rename = "사용처", default)]
    usage: Option<Value>,
    #[serde(rename = "좋아하는 여급 위치", default)]
    hostess_location: Option<Value>,
}

impl RawItem {
    fn into_item(self) -> Option<Item> {
        let index = self.index.as_ref().and_then(scalar_text);
        let name = self.name.as_ref().and_then(scalar_text);
        let key = index.clone().or_else(|| name.clone())?;

        let label = self.category.as_ref().and_then(scalar_text);
        let category = match label.as_deref() {
            Some(label) => Category::from_label(label).unwrap_or_else(|| {
                warn!(%key, label, "unknown item category, treating as equipment");
                Category::Equipment
            }),
            None => index
                .as_deref()
                .and_then(Category::from_index)
                .unwrap_or(Category::Equipment),
        };

        Some(Item {
            key,
            index,
            name,
            category,
            position: self.position.as_ref().and_then(scalar_text),
            effect: self.effect.as_ref().and_then(Effect::from_value),
            region: Region::from_value(self.region.as_ref()),
            location: ByGroup::from_value(self.location.as_ref()),
            condition: Condition::from_value(self.condition.as_ref()),
            usage: self.usage.as_ref().and_then(scalar_text),
            hostess_location: self.hostess_location.as_ref().and_then(scalar_text),
        })
    }
}

/// The loaded item catalog.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Arc<[Item]>,
    by_key: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Build a catalog from already normalised items.
    pub fn new(items: Vec<Item>) -> Self {
        let mut by_key = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if by_key.insert(item.key.clone(), idx).is_some() {
                warn!(key = %item.key, "duplicate item key; later entry wins lookups");
            }
        }
        Self {
            items: items.into(),
            by_key,
        }
    }

    /// Parse the catalog document: a JSON array of item objects.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let raw: Vec<RawItem> = serde_json::from_slice(bytes).map_err(|source| {
            LoadError::Parse {
                dataset: Self::NAME,
                source,
            }
        })?;
        let total = raw.len();
        let items: Vec<Item> = raw.into_iter().filter_map(RawItem::into_item).collect();
        if items.len() < total {
            debug!(
                dropped = total - items.len(),
                "skipped catalog entries without name or index"
            );
        }
        Ok(Self::new(items))
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Shared handle to the items, for building views.
    pub fn records(&self) -> Arc<[Item]> {
        Arc::clone(&self.items)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item with the given key.
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.by_key.get(key).and_then(|&idx| self.items.get(idx))
    }

    /// Whether an item with the given key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Keys of all items.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key.as_str())
    }

    /// Sorted distinct crew positions of equipment items.
    pub fn positions(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.category == Category::Equipment)
            .filter_map(|item| item.position.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct region names.
    pub fn regions(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.region.as_ref())
            .flat_map(|region| region.names())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Dataset for ItemCatalog {
    const NAME: &'static str = "item catalog";
    const FILE_NAME: &'static str = "dh4_ver4.json";

    fn parse(bytes: &[u8], _options: &LoadOptions) -> Result<Self, LoadError> {
        Self::from_slice(bytes)
    }
}

/// Acquired-state constraint of the item search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcquiredFilter {
    /// No constraint.
    #[default]
    All,
    /// Only items marked acquired.
    Acquired,
    /// Only items not marked acquired.
    NotAcquired,
}

impl AcquiredFilter {
    /// Next option for a cycling selector.
    pub fn cycle(self) -> Self {
        match self {
            AcquiredFilter::All => AcquiredFilter::Acquired,
            AcquiredFilter::Acquired => AcquiredFilter::NotAcquired,
            AcquiredFilter::NotAcquired => AcquiredFilter::All,
        }
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            AcquiredFilter::All => "any",
            AcquiredFilter::Acquired => "acquired",
            AcquiredFilter::NotAcquired => "not acquired",
        }
    }
}

/// Active inputs of the item search.
///
/// The setters keep dependent selections consistent: the position filter
/// only exists for equipment, and a protagonist implies its group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCriteria {
    term: SearchTerm,
    category: Option<Category>,
    position: Option<String>,
    region: Option<String>,
    group: Option<CharacterGroup>,
    protagonist: Option<Protagonist>,
    acquired: AcquiredFilter,
}

impl ItemCriteria {
    /// Criteria matching every item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text term.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// Selected category.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Selected crew position.
    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    /// Selected region.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Selected character group.
    pub fn group(&self) -> Option<CharacterGroup> {
        self.group
    }

    /// Selected protagonist.
    pub fn protagonist(&self) -> Option<Protagonist> {
        self.protagonist
    }

    /// Acquired-state constraint.
    pub fn acquired(&self) -> AcquiredFilter {
        self.acquired
    }

    /// Replace the free-text term.
    pub fn with_term(mut self, term: &str) -> Self {
        self.set_term(term);
        self
    }

    /// Replace the category constraint.
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.set_category(category);
        self
    }

    /// Replace the region constraint.
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.set_region(region);
        self
    }

    /// Replace the group constraint.
    pub fn with_group(mut self, group: Option<CharacterGroup>) -> Self {
        self.set_group(group);
        self
    }

    /// Replace the acquired-state constraint.
    pub fn with_acquired(mut self, acquired: AcquiredFilter) -> Self {
        self.acquired = acquired;
        self
    }

    /// Set the free-text term.
    pub fn set_term(&mut self, term: &str) {
        self.term = SearchTerm::new(term);
    }

    /// Set the category; leaving equipment clears the position filter.
    pub fn set_category(&mut self, category: Option<Category>) {
        if category != Some(Category::Equipment) {
            self.position = None;
        }
        self.category = category;
    }

    /// Set the crew position. Ignored unless equipment is selected.
    pub fn set_position(&mut self, position: Option<String>) -> bool {
        if position.is_some() && self.category != Some(Category::Equipment) {
            return false;
        }
        self.position = position;
        true
    }

    /// Set the region.
    pub fn set_region(&mut self, region: Option<String>) {
        self.region = region;
    }

    /// Set the group; a protagonist of another group is cleared.
    pub fn set_group(&mut self, group: Option<CharacterGroup>) {
        match group {
            None => self.protagonist = None,
            Some(group) => {
                if self
                    .protagonist
                    .is_some_and(|protagonist| protagonist.group() != group)
                {
                    self.protagonist = None;
                }
            }
        }
        self.group = group;
    }

    /// Set the protagonist; this also selects the protagonist's group.
    pub fn set_protagonist(&mut self, protagonist: Option<Protagonist>) {
        if let Some(protagonist) = protagonist {
            self.group = Some(protagonist.group());
        }
        self.protagonist = protagonist;
    }

    /// Set the acquired-state constraint.
    pub fn set_acquired(&mut self, acquired: AcquiredFilter) {
        self.acquired = acquired;
    }

    /// Whether no constraint is active.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Term constraint.
    pub fn matches_term(&self, item: &Item) -> bool {
        self.term.matches_any(item.search_fields())
    }

    /// Category and position constraints.
    pub fn matches_kind(&self, item: &Item) -> bool {
        if self.category.is_some_and(|category| category != item.category) {
            return false;
        }
        field_matches(self.position.as_deref(), item.position.as_deref())
    }

    /// Region constraint: a fixed region must equal the selection; a
    /// per-group region matches when either alternative does.
    pub fn matches_region(&self, item: &Item) -> bool {
        let Some(selected) = self.region.as_deref() else {
            return true;
        };
        match &item.region {
            Some(Region::Fixed(name)) => name == selected,
            Some(Region::PerGroup(pair)) => pair.iter().any(|(_, name)| name == selected),
            None => false,
        }
    }

    /// Group and protagonist constraints.
    pub fn matches_character(&self, item: &Item) -> bool {
        if let Some(group) = self.group {
            if !item.available_in(group) {
                return false;
            }
        }
        match self.protagonist {
            Some(protagonist) => item.available_to(protagonist),
            None => true,
        }
    }

    /// Acquired-state constraint against `acquired`.
    pub fn matches_acquired(&self, item: &Item, acquired: &AcquiredSet) -> bool {
        match self.acquired {
            AcquiredFilter::All => true,
            AcquiredFilter::Acquired => acquired.is_acquired(&item.key),
            AcquiredFilter::NotAcquired => !acquired.is_acquired(&item.key),
        }
    }

    /// Bind the criteria to an acquired set for evaluation.
    pub fn with_acquired_set<'a>(&'a self, acquired: &'a AcquiredSet) -> ItemQuery<'a> {
        ItemQuery {
            criteria: self,
            acquired,
        }
    }
}

/// [`ItemCriteria`] bound to the acquired set they are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ItemQuery<'a> {
    criteria: &'a ItemCriteria,
    acquired: &'a AcquiredSet,
}

impl Criteria<Item> for ItemQuery<'_> {
    fn term(&self) -> &SearchTerm {
        &self.criteria.term
    }

    fn matches(&self, item: &Item) -> bool {
        let criteria = self.criteria;
        criteria.matches_term(item)
            && criteria.matches_kind(item)
            && criteria.matches_region(item)
            && criteria.matches_character(item)
            && criteria.matches_acquired(item, self.acquired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"[
        {"인덱스": "item_w_001", "이름": "커틀러스", "효과": 12,
         "지역": {"구 캐릭터": "북해", "신 캐릭터": null},
         "위치": {"구 캐릭터": "런던", "신 캐릭터": null},
         "조건": {"구 캐릭터": null, "신 캐릭터": null}},
        {"인덱스": "item_a_001", "이름": "판금 갑옷", "효과": "방어력 +35",
         "지역": {"구 캐릭터": "지중해", "신 캐릭터": "지중해"},
         "조건": {"구 캐릭터": "마리아 전용", "신 캐릭터": null}},
        {"인덱스": "item_e_003", "이름": "망원경", "종류": "장비품", "보직": "항해사",
         "지역": {"구 캐릭터": null, "신 캐릭터": "인도양"}},
        {"인덱스": "item_p_010", "이름": "후추", "지역": "인도", "사용처": "향신료 교역"},
        {"이름": "이름만 있는 물건", "종류": "선수상", "효과": "돌풍 회피"},
        {"효과": 3}
    ]"#;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_slice(SAMPLE.as_bytes()).expect("sample catalog parses")
    }

    fn keys<'a>(catalog: &'a ItemCatalog, query: &ItemQuery<'_>) -> Vec<&'a str> {
        catalog
            .items()
            .iter()
            .filter(|item| query.matches(item))
            .map(|item| item.key.as_str())
            .collect()
    }

    #[test]
    fn normalises_entries() -> Result<()> {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        let saber = catalog.get("item_w_001").expect("weapon present");
        assert_eq!(saber.category, Category::Weapon);
        assert_eq!(saber.effect_value(), 12.0);
        assert_eq!(
            catalog.get("item_a_001").map(Item::effect_value),
            Some(35.0)
        );
        let nameless = catalog.get("이름만 있는 물건").expect("keyed by name");
        assert_eq!(nameless.category, Category::Figurehead);
        assert_eq!(nameless.effect_value(), 0.0);
        assert_eq!(
            catalog.get("item_p_010").and_then(|item| item.region.clone()),
            Some(Region::Fixed("인도".to_string()))
        );
        assert_eq!(catalog.positions(), vec!["항해사".to_string()]);
        assert_eq!(catalog.regions(), vec!["북해", "인도", "인도양", "지중해"]);
        Ok(())
    }

    #[test]
    fn rejects_non_array_documents() {
        let err = ItemCatalog::from_slice(br#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn empty_criteria_match_everything() {
        let catalog = catalog();
        let acquired = AcquiredSet::default();
        let criteria = ItemCriteria::new();
        assert!(criteria.is_empty());
        let query = criteria.with_acquired_set(&acquired);
        assert_eq!(keys(&catalog, &query).len(), catalog.len());
    }

    #[test]
    fn criteria_compose_with_and() {
        let catalog = catalog();
        let acquired = AcquiredSet::default();
        let term = ItemCriteria::new().with_term("item_");
        let region = ItemCriteria::new().with_region(Some("지중해".to_string()));
        let group = ItemCriteria::new().with_group(Some(CharacterGroup::Old));
        let combined = ItemCriteria::new()
            .with_term("item_")
            .with_region(Some("지중해".to_string()))
            .with_group(Some(CharacterGroup::Old));

        for item in catalog.items() {
            let expected = term.with_acquired_set(&acquired).matches(item)
                && region.with_acquired_set(&acquired).matches(item)
                && group.with_acquired_set(&acquired).matches(item);
            assert_eq!(
                combined.with_acquired_set(&acquired).matches(item),
                expected,
                "{}",
                item.key
            );
        }
        assert_eq!(
            keys(&catalog, &combined.with_acquired_set(&acquired)),
            vec!["item_a_001"]
        );
    }

    #[test]
    fn group_filter_accepts_fixed_regions() {
        let catalog = catalog();
        let acquired = AcquiredSet::default();
        let criteria = ItemCriteria::new().with_group(Some(CharacterGroup::New));
        assert_eq!(
            keys(&catalog, &criteria.with_acquired_set(&acquired)),
            vec!["item_a_001", "item_e_003", "item_p_010"]
        );
    }

    #[test]
    fn position_only_applies_to_equipment() {
        let mut criteria = ItemCriteria::new();
        assert!(!criteria.set_position(Some("항해사".to_string())));
        criteria.set_category(Some(Category::Equipment));
        assert!(criteria.set_position(Some("항해사".to_string())));
        criteria.set_category(Some(Category::Weapon));
        assert_eq!(criteria.position(), None);
    }

    #[test]
    fn protagonist_implies_group_and_condition() {
        let catalog = catalog();
        let acquired = AcquiredSet::default();
        let mut criteria = ItemCriteria::new();
        criteria.set_protagonist(Some(Protagonist::Rafael));
        assert_eq!(criteria.group(), Some(CharacterGroup::Old));
        assert_eq!(
            keys(&catalog, &criteria.with_acquired_set(&acquired)),
            vec!["item_w_001", "item_p_010"]
        );

        criteria.set_protagonist(Some(Protagonist::Maria));
        assert_eq!(
            keys(&catalog, &criteria.with_acquired_set(&acquired)),
            vec!["item_w_001", "item_a_001", "item_p_010"]
        );

        criteria.set_group(Some(CharacterGroup::New));
        assert_eq!(criteria.protagonist(), None);
    }

    #[test]
    fn acquired_filter_uses_the_set() {
        let catalog = catalog();
        let mut acquired = AcquiredSet::default();
        acquired.toggle("item_p_010");
        let criteria = ItemCriteria::new().with_acquired(AcquiredFilter::Acquired);
        assert_eq!(
            keys(&catalog, &criteria.with_acquired_set(&acquired)),
            vec!["item_p_010"]
        );
        let criteria = criteria.with_acquired(AcquiredFilter::NotAcquired);
        assert_eq!(keys(&catalog, &criteria.with_acquired_set(&acquired)).len(), 4);
    }

    #[test]
    fn shared_condition_restricts_every_group() -> Result<()> {
        let catalog = ItemCatalog::from_slice(
            r#"[{"인덱스": "item_g_004", "이름": "은 거울",
                 "지역": {"구 캐릭터": "지중해", "신 캐릭터": "동아시아"},
                 "조건": "마리아 전용",
                 "좋아하는 여급 위치": "세비야"}]"#
                .as_bytes(),
        )?;
        let mirror = catalog.get("item_g_004").expect("gift present");
        assert_eq!(
            mirror.condition,
            Some(Condition::Shared("마리아 전용".to_string()))
        );
        assert_eq!(mirror.condition_text(), "마리아 전용");
        assert_eq!(mirror.hostess_location.as_deref(), Some("세비야"));
        assert!(mirror.available_to(Protagonist::Maria));
        assert!(!mirror.available_to(Protagonist::Rafael));
        assert!(!mirror.available_to(Protagonist::Tiale));
        assert_eq!(mirror.named_protagonists(), vec![Protagonist::Maria]);
        Ok(())
    }

    #[test]
    fn keeps_usage_and_group_conditions() {
        let catalog = catalog();
        let pepper = catalog.get("item_p_010").expect("specialty present");
        assert_eq!(pepper.usage.as_deref(), Some("향신료 교역"));
        assert_eq!(pepper.condition, None);

        let armor = catalog.get("item_a_001").expect("armor present");
        assert_eq!(armor.condition_text(), "구: 마리아 전용");
        assert_eq!(
            armor
                .condition
                .as_ref()
                .and_then(|condition| condition.for_group(CharacterGroup::New)),
            None
        );
        // An all-null pair carries no condition.
        assert_eq!(catalog.get("item_w_001").and_then(|item| item.condition.clone()), None);
    }

    #[test]
    fn only_weapons_and_armor_are_ranked() {
        let catalog = catalog();
        let ranks: Vec<Option<f64>> = catalog.items().iter().map(Ranked::rank).collect();
        assert_eq!(ranks, vec![Some(12.0), Some(35.0), None, None, None]);
        assert_eq!(Effect::Number(4.0).to_string(), "4");
        assert_eq!(Effect::Number(4.5).to_string(), "4.5");
    }
}
