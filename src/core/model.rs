use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The application payload stored in the `data` column of the single roster
/// record. Only `officers` and `keys` are guaranteed by the UI; anything else
/// the frontend adds is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterData {
    #[serde(default)]
    pub officers: Vec<Value>,
    #[serde(default)]
    pub keys: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RosterData {
    pub fn is_empty(&self) -> bool {
        self.officers.is_empty() && self.keys.is_empty() && self.extra.is_empty()
    }
}
