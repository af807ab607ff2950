//! Serde adapter for maps keyed by version number.
//!
//! In memory the keys are integers; on disk they are written as strings so
//! the YAML reads `"1": [2, 3]` regardless of how a given parser treats
//! integer mapping keys.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use super::VersionNumber;

pub fn serialize<T, S>(map: &BTreeMap<VersionNumber, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<BTreeMap<VersionNumber, T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(VersionKeyedVisitor(PhantomData))
}

struct VersionKeyedVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for VersionKeyedVisitor<T> {
    type Value = BTreeMap<VersionNumber, T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping keyed by version number")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<KeyRepr, T>()? {
            let number = key.into_number().map_err(de::Error::custom)?;
            if out.insert(number, value).is_some() {
                return Err(de::Error::custom(format!("duplicate version key {number}")));
            }
        }
        Ok(out)
    }
}

/// Hand-edited files may carry either `"2":` or `2:`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum KeyRepr {
    Number(u64),
    Text(String),
}

impl KeyRepr {
    fn into_number(self) -> Result<VersionNumber, String> {
        let parsed = match self {
            KeyRepr::Number(n) => VersionNumber::try_from(n).ok(),
            KeyRepr::Text(s) => s.trim().parse::<VersionNumber>().ok(),
        };
        match parsed {
            Some(0) | None => Err("version keys must be positive integers".to_string()),
            Some(n) => Ok(n),
        }
    }
}
