//! Read-only reference tables: EV models, county driving averages and
//! state electricity rates. Built-in data ships with the crate; any table
//! can be replaced from a CSV file at startup.

mod data;
mod loader;
mod selection;

pub use selection::{ProfileDefaults, ProfileSelection};

use crate::config::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Used when a region's state has no published rate.
pub const FALLBACK_ELECTRICITY_RATE: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceBenchmark {
    pub model: String,
    pub price: f64,
    pub mpg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvModel {
    pub make: String,
    pub model: String,
    pub label: String,
    pub battery_capacity_kwh: f64,
    pub epa_range_miles: f64,
    pub msrp: f64,
    pub ice_benchmark: IceBenchmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub fips: String,
    pub name: String,
    pub state: String,
    pub daily_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityRate {
    pub state: String,
    pub price_per_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    EvModels,
    Regions,
    ElectricityRates,
}

impl std::fmt::Display for CatalogTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CatalogTable::EvModels => "ev models",
            CatalogTable::Regions => "regions",
            CatalogTable::ElectricityRates => "electricity rates",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {table} csv: {source}")]
    Csv {
        table: CatalogTable,
        #[source]
        source: csv::Error,
    },
    #[error("invalid {table} row at line {line}: {reason}")]
    InvalidRow {
        table: CatalogTable,
        line: u64,
        reason: String,
    },
    #[error("{table} table has no rows")]
    EmptyTable { table: CatalogTable },
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error("unknown vehicle '{0}'")]
    UnknownVehicle(String),
}

impl CatalogError {
    /// Lookup misses are caller mistakes; everything else is a data problem.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            CatalogError::UnknownRegion(_) | CatalogError::UnknownVehicle(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    ev_models: Vec<EvModel>,
    regions: Vec<Region>,
    electricity_rates: Vec<ElectricityRate>,
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceCatalog {
    pub fn builtin() -> Self {
        Self {
            ev_models: data::ev_models(),
            regions: data::regions(),
            electricity_rates: data::electricity_rates(),
        }
    }

    /// Built-in tables, with each configured CSV replacing its counterpart.
    pub fn load(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        if let Some(path) = &config.ev_models_csv {
            catalog.ev_models = loader::read_path(CatalogTable::EvModels, path)?;
        }
        if let Some(path) = &config.regions_csv {
            catalog.regions = loader::read_path(CatalogTable::Regions, path)?;
        }
        if let Some(path) = &config.electricity_csv {
            catalog.electricity_rates = loader::read_path(CatalogTable::ElectricityRates, path)?;
        }
        Ok(catalog)
    }

    pub fn ev_models(&self) -> &[EvModel] {
        &self.ev_models
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn electricity_rates(&self) -> &[ElectricityRate] {
        &self.electricity_rates
    }

    pub fn region(&self, fips: &str) -> Option<&Region> {
        let fips = fips.trim();
        self.regions.iter().find(|region| region.fips == fips)
    }

    /// Matches on model name or display label, ignoring case.
    pub fn ev_model(&self, name: &str) -> Option<&EvModel> {
        let name = name.trim();
        self.ev_models.iter().find(|ev| {
            ev.model.eq_ignore_ascii_case(name) || ev.label.eq_ignore_ascii_case(name)
        })
    }

    pub fn electricity_rate(&self, state: &str) -> Option<f64> {
        let state = state.trim();
        self.electricity_rates
            .iter()
            .find(|rate| rate.state.eq_ignore_ascii_case(state))
            .map(|rate| rate.price_per_kwh)
    }

    pub fn rate_for_state(&self, state: &str) -> f64 {
        self.electricity_rate(state)
            .unwrap_or(FALLBACK_ELECTRICITY_RATE)
    }
}
