//! Store Info Model

use serde::{Deserialize, Serialize};

/// Store metadata printed on receipt headers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Tax identification number (NIF)
    #[serde(default)]
    pub nif: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    /// Free text printed under the totals
    pub footer: Option<String>,
}
