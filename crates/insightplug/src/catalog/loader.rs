use super::{CatalogError, CatalogTable, ElectricityRate, EvModel, IceBenchmark, Region};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

pub(super) fn read_path<T>(
    table: CatalogTable,
    path: &Path,
) -> Result<Vec<T>, CatalogError>
where
    T: FromCatalogRow,
{
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(table, file)
}

/// Parses one table, validating each row and reporting its line on failure.
pub(super) fn read_table<T, R>(table: CatalogTable, reader: R) -> Result<Vec<T>, CatalogError>
where
    T: FromCatalogRow,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| CatalogError::Csv { table, source })?
        .clone();

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|source| CatalogError::Csv { table, source })?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: T::Row = record
            .deserialize(Some(&headers))
            .map_err(|source| CatalogError::Csv { table, source })?;
        let entry = T::from_row(row).map_err(|reason| CatalogError::InvalidRow {
            table,
            line,
            reason,
        })?;
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(CatalogError::EmptyTable { table });
    }
    Ok(entries)
}

pub(super) trait FromCatalogRow: Sized {
    type Row: DeserializeOwned;

    fn from_row(row: Self::Row) -> Result<Self, String>;
}

#[derive(Debug, Deserialize)]
pub(super) struct EvModelRow {
    make: String,
    model: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    label: Option<String>,
    battery_capacity_kwh: f64,
    epa_range_miles: f64,
    msrp: f64,
    ice_benchmark_model: String,
    ice_benchmark_price: f64,
    ice_benchmark_mpg: f64,
}

impl FromCatalogRow for EvModel {
    type Row = EvModelRow;

    fn from_row(row: EvModelRow) -> Result<Self, String> {
        require_text("make", &row.make)?;
        require_text("model", &row.model)?;
        require_positive("battery_capacity_kwh", row.battery_capacity_kwh)?;
        require_positive("epa_range_miles", row.epa_range_miles)?;
        require_non_negative("msrp", row.msrp)?;
        require_non_negative("ice_benchmark_price", row.ice_benchmark_price)?;
        require_positive("ice_benchmark_mpg", row.ice_benchmark_mpg)?;

        let label = row
            .label
            .unwrap_or_else(|| format!("{} {}", row.make, row.model));
        Ok(EvModel {
            make: row.make,
            model: row.model,
            label,
            battery_capacity_kwh: row.battery_capacity_kwh,
            epa_range_miles: row.epa_range_miles,
            msrp: row.msrp,
            ice_benchmark: IceBenchmark {
                model: row.ice_benchmark_model,
                price: row.ice_benchmark_price,
                mpg: row.ice_benchmark_mpg,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RegionRow {
    fips: String,
    name: String,
    state: String,
    daily_miles: f64,
}

impl FromCatalogRow for Region {
    type Row = RegionRow;

    fn from_row(row: RegionRow) -> Result<Self, String> {
        require_text("fips", &row.fips)?;
        require_text("name", &row.name)?;
        require_text("state", &row.state)?;
        require_non_negative("daily_miles", row.daily_miles)?;
        Ok(Region {
            fips: row.fips,
            name: row.name,
            state: row.state.to_ascii_uppercase(),
            daily_miles: row.daily_miles,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ElectricityRow {
    state: String,
    price_per_kwh: f64,
}

impl FromCatalogRow for ElectricityRate {
    type Row = ElectricityRow;

    fn from_row(row: ElectricityRow) -> Result<Self, String> {
        require_text("state", &row.state)?;
        require_positive("price_per_kwh", row.price_per_kwh)?;
        Ok(ElectricityRate {
            state: row.state.to_ascii_uppercase(),
            price_per_kwh: row.price_per_kwh,
        })
    }
}

fn require_text(column: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{column} must not be blank"))
    } else {
        Ok(())
    }
}

fn require_positive(column: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{column} must be a positive number, got {value}"))
    }
}

fn require_non_negative(column: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{column} must not be negative, got {value}"))
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
