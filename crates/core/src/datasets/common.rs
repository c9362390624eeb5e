//! Shapes shared by several datasets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two generations of playable characters. Nested dataset fields keep
/// one alternative per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterGroup {
    /// "구 캐릭터": the original cast.
    Old,
    /// "신 캐릭터": the cast added by the expansion.
    New,
}

impl CharacterGroup {
    /// Both groups, in display order.
    pub const ALL: [CharacterGroup; 2] = [CharacterGroup::Old, CharacterGroup::New];

    /// Label used as the field key in the datasets.
    pub fn label(self) -> &'static str {
        match self {
            CharacterGroup::Old => "구 캐릭터",
            CharacterGroup::New => "신 캐릭터",
        }
    }

    /// Parse a dataset label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.label() == label.trim())
    }

    /// One-syllable prefix used in compact listings.
    pub fn short_label(self) -> &'static str {
        match self {
            CharacterGroup::Old => "구",
            CharacterGroup::New => "신",
        }
    }

    /// Protagonists belonging to this group.
    pub fn protagonists(self) -> impl Iterator<Item = Protagonist> {
        Protagonist::ALL
            .into_iter()
            .filter(move |protagonist| protagonist.group() == self)
    }
}

/// A value kept separately for each [`CharacterGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByGroup<T> {
    /// Value for the original cast.
    pub old: Option<T>,
    /// Value for the expansion cast.
    pub new: Option<T>,
}

impl<T> Default for ByGroup<T> {
    fn default() -> Self {
        Self {
            old: None,
            new: None,
        }
    }
}

impl<T> ByGroup<T> {
    /// Value for `group`, if present.
    pub fn get(&self, group: CharacterGroup) -> Option<&T> {
        match group {
            CharacterGroup::Old => self.old.as_ref(),
            CharacterGroup::New => self.new.as_ref(),
        }
    }

    /// Present values paired with their group.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterGroup, &T)> {
        CharacterGroup::ALL
            .into_iter()
            .filter_map(move |group| self.get(group).map(|value| (group, value)))
    }

    /// Whether neither group has a value.
    pub fn is_empty(&self) -> bool {
        self.old.is_none() && self.new.is_none()
    }
}

impl ByGroup<String> {
    /// Read the `{"구 캐릭터": …, "신 캐릭터": …}` shape; anything else is empty.
    pub(crate) fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self {
                old: map.get(CharacterGroup::Old.label()).and_then(scalar_text),
                new: map.get(CharacterGroup::New.label()).and_then(scalar_text),
            },
            _ => Self::default(),
        }
    }
}

/// Playable main characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protagonist {
    /// 라파엘
    Rafael,
    /// 릴
    Lil,
    /// 마리아
    Maria,
    /// 호드람
    Hodram,
    /// 교타로
    Kyotaro,
    /// 웃딘
    Uddin,
    /// 티알
    Tiale,
}

impl Protagonist {
    /// All protagonists, original cast first.
    pub const ALL: [Protagonist; 7] = [
        Protagonist::Rafael,
        Protagonist::Lil,
        Protagonist::Maria,
        Protagonist::Hodram,
        Protagonist::Kyotaro,
        Protagonist::Uddin,
        Protagonist::Tiale,
    ];

    /// Name as written in the datasets.
    pub fn label(self) -> &'static str {
        match self {
            Protagonist::Rafael => "라파엘",
            Protagonist::Lil => "릴",
            Protagonist::Maria => "마리아",
            Protagonist::Hodram => "호드람",
            Protagonist::Kyotaro => "교타로",
            Protagonist::Uddin => "웃딘",
            Protagonist::Tiale => "티알",
        }
    }

    /// Group the protagonist belongs to.
    pub fn group(self) -> CharacterGroup {
        match self {
            Protagonist::Rafael | Protagonist::Lil | Protagonist::Maria | Protagonist::Hodram => {
                CharacterGroup::Old
            }
            Protagonist::Kyotaro | Protagonist::Uddin | Protagonist::Tiale => CharacterGroup::New,
        }
    }

    /// Parse a dataset label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|protagonist| protagonist.label() == label.trim())
    }

    /// Protagonists named in free text such as an acquisition condition.
    pub fn mentioned_in(text: &str) -> Vec<Protagonist> {
        Self::ALL
            .into_iter()
            .filter(|protagonist| text.contains(protagonist.label()))
            .collect()
    }
}

/// Text of a scalar JSON value; `null`, containers and blank strings are `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(num) => num.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Whole number held by a numeric or numeric-string cell, rounded.
pub(crate) fn rounded_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(num) => num
            .as_i64()
            .or_else(|| num.as_f64().map(|float| float.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|float| float.round() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_group_pairs() {
        let value = json!({"구 캐릭터": "리스본", "신 캐릭터": null});
        let pair = ByGroup::from_value(Some(&value));
        assert_eq!(pair.get(CharacterGroup::Old).map(String::as_str), Some("리스본"));
        assert_eq!(pair.get(CharacterGroup::New), None);
        assert_eq!(pair.iter().count(), 1);
        assert!(ByGroup::from_value(Some(&json!("x"))).is_empty());
    }

    #[test]
    fn protagonists_know_their_group() {
        assert_eq!(Protagonist::Maria.group(), CharacterGroup::Old);
        assert_eq!(Protagonist::from_label("티알"), Some(Protagonist::Tiale));
        assert_eq!(CharacterGroup::New.protagonists().count(), 3);
        assert_eq!(
            Protagonist::mentioned_in("라파엘: 리스본 / 웃딘: 아덴"),
            vec![Protagonist::Rafael, Protagonist::Uddin]
        );
    }

    #[test]
    fn numbers_are_rounded() {
        assert_eq!(rounded_number(&json!(512.6)), Some(513));
        assert_eq!(rounded_number(&json!(" 40 ")), Some(40));
        assert_eq!(rounded_number(&json!(null)), None);
        assert_eq!(scalar_text(&json!(7)), Some("7".to_string()));
        assert_eq!(scalar_text(&json!("  ")), None);
    }
}
