//! Typed records for each dataset, their parsers and their search criteria.

mod common;
mod crew;
mod items;
mod routes;

pub use common::{ByGroup, CharacterGroup, Protagonist};
pub use crew::{
    Companion, CrewCriteria, CrewRoster, RecruitRoute, Requirement, RequirementKind,
    SpecialCompanion,
};
pub use items::{
    AcquiredFilter, Category, Condition, Effect, Item, ItemCatalog, ItemCriteria, ItemQuery,
    Region,
};
pub use routes::{is_high_value, RouteCriteria, RouteTable, TradeRoute, NATIONS};
