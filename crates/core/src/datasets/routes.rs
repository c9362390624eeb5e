//! Trade-route price table (`황금경로.json`).
//!
//! The document is a workbook export: `{ "<sheet>": { "columns": [...],
//! "data": [[...], ...] } }`. Columns are positional: region, culture, city,
//! type, commodity, development threshold, then one price per nation in
//! [`NATIONS`] order.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::LoadError,
    loader::{Dataset, LoadOptions},
    query::{field_matches, Criteria, Ranked, SearchTerm},
};

use super::common::{rounded_number, scalar_text};

/// Nations in price-column order.
pub const NATIONS: [&str; 21] = [
    "영국",
    "플랑드르",
    "독일",
    "북유럽",
    "포르투갈",
    "스페인",
    "이탈리아",
    "그리스",
    "터키",
    "이집트",
    "서아프리카",
    "동아프리카",
    "아랍",
    "인도",
    "인도차이나",
    "인도네시아",
    "중국",
    "조선",
    "일본",
    "카리브 해",
    "멕시코",
];

const DEFAULT_SHEET: &str = "Sheet1";
const PRICE_OFFSET: usize = 6;

/// One commodity offered in one city, with its sale price per nation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRoute {
    /// Sea region of the city.
    pub region: String,
    /// Cultural sphere of the city.
    pub culture: String,
    /// City offering the commodity.
    pub city: String,
    /// Commodity type.
    pub kind: String,
    /// Commodity name.
    pub commodity: String,
    /// Development level needed before the commodity appears.
    pub development: Option<i64>,
    /// Sale price per nation, indexed like [`NATIONS`].
    pub prices: Vec<Option<i64>>,
}

impl TradeRoute {
    fn from_row(row: &[Value]) -> Self {
        let text = |idx: usize| row.get(idx).and_then(scalar_text).unwrap_or_default();
        let prices = (0..NATIONS.len())
            .map(|nation| row.get(PRICE_OFFSET + nation).and_then(rounded_number))
            .collect();
        Self {
            region: text(0),
            culture: text(1),
            city: text(2),
            kind: text(3),
            commodity: text(4),
            development: row.get(5).and_then(rounded_number),
            prices,
        }
    }

    /// Price in `nation`, if that nation buys the commodity.
    pub fn price_in(&self, nation: &str) -> Option<i64> {
        let idx = NATIONS.iter().position(|name| *name == nation)?;
        self.prices.get(idx).copied().flatten()
    }

    /// Prices paired with their nation, skipping empty cells.
    pub fn priced_nations(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        NATIONS
            .iter()
            .zip(&self.prices)
            .filter_map(|(nation, price)| price.map(|price| (*nation, price)))
    }

    /// Highest price and the first nation offering it.
    pub fn best_price(&self) -> Option<(&'static str, i64)> {
        self.priced_nations()
            .fold(None, |best, (nation, price)| match best {
                Some((_, top)) if top >= price => best,
                _ => Some((nation, price)),
            })
    }

    /// Fields searched by the free-text term.
    pub fn search_fields(&self) -> [&str; 5] {
        [
            self.region.as_str(),
            self.culture.as_str(),
            self.city.as_str(),
            self.kind.as_str(),
            self.commodity.as_str(),
        ]
    }
}

impl Ranked for TradeRoute {}

/// Whether `price` reaches the high-value `threshold`.
pub fn is_high_value(price: i64, threshold: i64) -> bool {
    price >= threshold
}

#[derive(Debug, Deserialize)]
struct Sheet {
    #[serde(default)]
    columns: Vec<Value>,
    data: Vec<Vec<Value>>,
}

/// The loaded trade-route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    sheet: String,
    columns: Vec<String>,
    routes: Arc<[TradeRoute]>,
}

impl RouteTable {
    /// Parse the workbook export, reading `sheet` or, when unset, `Sheet1`
    /// or else the first sheet.
    pub fn from_slice(bytes: &[u8], sheet: Option<&str>) -> Result<Self, LoadError> {
        let parse_err = |source| LoadError::Parse {
            dataset: Self::NAME,
            source,
        };
        let mut sheets: BTreeMap<String, Value> =
            serde_json::from_slice(bytes).map_err(parse_err)?;

        let name = match sheet {
            Some(name) => name.to_string(),
            None if sheets.contains_key(DEFAULT_SHEET) => DEFAULT_SHEET.to_string(),
            None => sheets.keys().next().cloned().ok_or_else(|| LoadError::Shape {
                dataset: Self::NAME,
                reason: "workbook has no sheets".to_string(),
            })?,
        };
        let value = sheets.remove(&name).ok_or_else(|| LoadError::Shape {
            dataset: Self::NAME,
            reason: format!("sheet {name:?} not found"),
        })?;
        let sheet: Sheet = serde_json::from_value(value).map_err(parse_err)?;

        let mut routes = Vec::with_capacity(sheet.data.len());
        for (idx, row) in sheet.data.iter().enumerate() {
            if row.len() < PRICE_OFFSET {
                return Err(LoadError::Shape {
                    dataset: Self::NAME,
                    reason: format!(
                        "row {idx} has {} cells, expected at least {PRICE_OFFSET}",
                        row.len()
                    ),
                });
            }
            routes.push(TradeRoute::from_row(row));
        }
        let expected = PRICE_OFFSET + NATIONS.len();
        if !sheet.columns.is_empty() && sheet.columns.len() != expected {
            warn!(
                sheet = %name,
                columns = sheet.columns.len(),
                expected,
                "unexpected trade-route column count"
            );
        }
        debug!(sheet = %name, rows = routes.len(), "parsed trade routes");

        Ok(Self {
            columns: sheet.columns.iter().filter_map(scalar_text).collect(),
            sheet: name,
            routes: routes.into(),
        })
    }

    /// Sheet the rows came from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Column headers as exported; descriptive only.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in document order.
    pub fn routes(&self) -> &[TradeRoute] {
        &self.routes
    }

    /// Shared handle to the rows, for building views.
    pub fn records(&self) -> Arc<[TradeRoute]> {
        Arc::clone(&self.routes)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Sorted distinct regions.
    pub fn regions(&self) -> Vec<String> {
        self.facet(|route| &route.region)
    }

    /// Sorted distinct cities.
    pub fn cities(&self) -> Vec<String> {
        self.facet(|route| &route.city)
    }

    /// Sorted distinct commodity types.
    pub fn kinds(&self) -> Vec<String> {
        self.facet(|route| &route.kind)
    }

    /// Sorted distinct commodities.
    pub fn commodities(&self) -> Vec<String> {
        self.facet(|route| &route.commodity)
    }

    fn facet(&self, field: impl Fn(&TradeRoute) -> &String) -> Vec<String> {
        self.routes
            .iter()
            .map(field)
            .filter(|value| !value.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Dataset for RouteTable {
    const NAME: &'static str = "trade routes";
    const FILE_NAME: &'static str = "황금경로.json";

    fn parse(bytes: &[u8], options: &LoadOptions) -> Result<Self, LoadError> {
        Self::from_slice(bytes, options.trade_route_sheet.as_deref())
    }
}

/// Active inputs of the trade-route search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCriteria {
    /// Free-text term.
    pub term: SearchTerm,
    /// Region equality.
    pub region: Option<String>,
    /// City equality.
    pub city: Option<String>,
    /// Commodity type equality.
    pub kind: Option<String>,
    /// Commodity equality.
    pub commodity: Option<String>,
}

impl RouteCriteria {
    /// Criteria matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the free-text term.
    pub fn with_term(mut self, term: &str) -> Self {
        self.term = SearchTerm::new(term);
        self
    }

    /// Whether no constraint is active.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Criteria<TradeRoute> for RouteCriteria {
    fn term(&self) -> &SearchTerm {
        &self.term
    }

    fn matches(&self, route: &TradeRoute) -> bool {
        self.term.matches_any(route.search_fields())
            && field_matches(self.region.as_deref(), Some(route.region.as_str()))
            && field_matches(self.city.as_deref(), Some(route.city.as_str()))
            && field_matches(self.kind.as_deref(), Some(route.kind.as_str()))
            && field_matches(self.commodity.as_deref(), Some(route.commodity.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn workbook() -> Value {
        let mut lisbon = vec![
            json!("이베리아"),
            json!("서유럽"),
            json!("리스본"),
            json!("식료품"),
            json!("와인"),
            json!(120.4),
        ];
        lisbon.extend((0..NATIONS.len()).map(|n| json!(100 + n * 30)));
        let mut calicut = vec![
            json!("인도양"),
            json!("인도"),
            json!("캘리컷"),
            json!("향신료"),
            json!("후추"),
            json!(null),
            json!(480.6),
        ];
        calicut.push(json!("520"));
        json!({
            "Prices": {"columns": [], "data": []},
            "Sheet1": {"columns": ["지역", "문화권"], "data": [lisbon, calicut]}
        })
    }

    #[test]
    fn reads_positional_rows() -> Result<()> {
        let bytes = serde_json::to_vec(&workbook())?;
        let table = RouteTable::from_slice(&bytes, None)?;
        assert_eq!(table.sheet(), "Sheet1");
        assert_eq!(table.len(), 2);

        let lisbon = &table.routes()[0];
        assert_eq!(lisbon.city, "리스본");
        assert_eq!(lisbon.development, Some(120));
        assert_eq!(lisbon.price_in("영국"), Some(100));
        assert_eq!(lisbon.best_price(), Some(("멕시코", 700)));

        let calicut = &table.routes()[1];
        assert_eq!(calicut.development, None);
        assert_eq!(calicut.price_in("영국"), Some(481));
        assert_eq!(calicut.price_in("플랑드르"), Some(520));
        assert_eq!(calicut.price_in("독일"), None);
        assert_eq!(calicut.priced_nations().count(), 2);
        assert!(is_high_value(520, 500));
        assert!(!is_high_value(481, 500));
        Ok(())
    }

    #[test]
    fn honours_configured_sheet() -> Result<()> {
        let bytes = serde_json::to_vec(&workbook())?;
        let table = RouteTable::from_slice(&bytes, Some("Prices"))?;
        assert!(table.is_empty());

        let err = RouteTable::from_slice(&bytes, Some("Missing")).unwrap_err();
        assert!(matches!(err, LoadError::Shape { .. }));
        Ok(())
    }

    #[test]
    fn short_rows_reject_the_dataset() -> Result<()> {
        let doc = json!({"Sheet1": {"columns": [], "data": [["a", "b", "c"]]}});
        let err = RouteTable::from_slice(&serde_json::to_vec(&doc)?, None).unwrap_err();
        assert!(matches!(err, LoadError::Shape { .. }));
        Ok(())
    }

    #[test]
    fn facets_and_criteria() -> Result<()> {
        let table = RouteTable::from_slice(&serde_json::to_vec(&workbook())?, None)?;
        assert_eq!(table.regions(), vec!["이베리아", "인도양"]);
        assert_eq!(table.commodities(), vec!["와인", "후추"]);

        let spice = RouteCriteria {
            kind: Some("향신료".to_string()),
            ..RouteCriteria::new()
        };
        let found: Vec<&str> = table
            .routes()
            .iter()
            .filter(|route| spice.matches(route))
            .map(|route| route.city.as_str())
            .collect();
        assert_eq!(found, vec!["캘리컷"]);

        let by_term = RouteCriteria::new().with_term("서유럽");
        assert_eq!(
            table.routes().iter().filter(|r| by_term.matches(r)).count(),
            1
        );
        assert!(RouteCriteria::new().is_empty());
        Ok(())
    }
}
