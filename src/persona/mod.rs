pub mod registry;

pub use registry::PersonaRegistry;

use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A judge identity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub bio: String,
    #[serde(rename = "avatar")]
    pub avatar_ref: String,
    pub gender: Gender,
    #[serde(default)]
    pub is_custom: bool,
}

/// DiceBear avatar seeded by the persona name.
pub fn avatar_for(name: &str) -> String {
    let seed: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}
