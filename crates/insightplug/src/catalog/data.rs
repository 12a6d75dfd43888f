use super::{ElectricityRate, EvModel, IceBenchmark, Region};

struct EvRow {
    make: &'static str,
    model: &'static str,
    battery_capacity_kwh: f64,
    epa_range_miles: f64,
    msrp: f64,
    benchmark: &'static str,
    benchmark_price: f64,
    benchmark_mpg: f64,
}

const EV_MODELS: &[EvRow] = &[
    EvRow { make: "Tesla", model: "Model 3 RWD", battery_capacity_kwh: 60.0, epa_range_miles: 272.0, msrp: 42_990.0, benchmark: "Honda Civic/Toyota Corolla", benchmark_price: 28_000.0, benchmark_mpg: 33.0 },
    EvRow { make: "Tesla", model: "Model Y RWD", battery_capacity_kwh: 75.0, epa_range_miles: 260.0, msrp: 46_990.0, benchmark: "Honda CR-V/Toyota RAV4", benchmark_price: 32_000.0, benchmark_mpg: 28.0 },
    EvRow { make: "Chevrolet", model: "Bolt EV", battery_capacity_kwh: 65.0, epa_range_miles: 259.0, msrp: 28_200.0, benchmark: "Honda Civic", benchmark_price: 28_000.0, benchmark_mpg: 33.0 },
    EvRow { make: "Chevrolet", model: "Bolt EUV", battery_capacity_kwh: 65.0, epa_range_miles: 247.0, msrp: 31_200.0, benchmark: "Honda HR-V", benchmark_price: 30_000.0, benchmark_mpg: 31.0 },
    EvRow { make: "Ford", model: "Mustang Mach-E RWD", battery_capacity_kwh: 70.0, epa_range_miles: 312.0, msrp: 42_900.0, benchmark: "Ford Escape/Toyota RAV4", benchmark_price: 34_000.0, benchmark_mpg: 27.0 },
    EvRow { make: "Ford", model: "F-150 Lightning Pro", battery_capacity_kwh: 131.0, epa_range_miles: 240.0, msrp: 56_995.0, benchmark: "Ford F-150 EcoBoost", benchmark_price: 38_000.0, benchmark_mpg: 21.0 },
    EvRow { make: "Hyundai", model: "IONIQ 6 SE RWD", battery_capacity_kwh: 53.0, epa_range_miles: 361.0, msrp: 34_950.0, benchmark: "Toyota Camry/Honda Accord", benchmark_price: 32_000.0, benchmark_mpg: 32.0 },
    EvRow { make: "Hyundai", model: "IONIQ 5 RWD", battery_capacity_kwh: 58.0, epa_range_miles: 303.0, msrp: 41_100.0, benchmark: "Honda CR-V/Mazda CX-5", benchmark_price: 33_000.0, benchmark_mpg: 28.0 },
    EvRow { make: "Kia", model: "EV6 RWD", battery_capacity_kwh: 58.0, epa_range_miles: 282.0, msrp: 41_900.0, benchmark: "Hyundai Tucson/Kia Sportage", benchmark_price: 34_000.0, benchmark_mpg: 28.0 },
    EvRow { make: "Nissan", model: "LEAF Plus", battery_capacity_kwh: 62.0, epa_range_miles: 226.0, msrp: 34_950.0, benchmark: "Honda Civic", benchmark_price: 28_000.0, benchmark_mpg: 33.0 },
    EvRow { make: "Nissan", model: "Ariya RWD", battery_capacity_kwh: 63.0, epa_range_miles: 228.0, msrp: 40_150.0, benchmark: "Toyota Camry", benchmark_price: 32_000.0, benchmark_mpg: 31.0 },
    EvRow { make: "BMW", model: "i4 eDrive40", battery_capacity_kwh: 81.0, epa_range_miles: 301.0, msrp: 59_700.0, benchmark: "BMW 440i", benchmark_price: 55_000.0, benchmark_mpg: 24.0 },
    EvRow { make: "Volkswagen", model: "ID.4 Standard", battery_capacity_kwh: 62.0, epa_range_miles: 275.0, msrp: 38_995.0, benchmark: "VW Tiguan/Honda CR-V", benchmark_price: 33_000.0, benchmark_mpg: 27.0 },
    EvRow { make: "Lucid", model: "Air Standard Range", battery_capacity_kwh: 88.0, epa_range_miles: 420.0, msrp: 69_900.0, benchmark: "BMW 7 Series/Mercedes S-Class", benchmark_price: 85_000.0, benchmark_mpg: 22.0 },
    EvRow { make: "Rivian", model: "R1S Dual Motor", battery_capacity_kwh: 135.0, epa_range_miles: 330.0, msrp: 75_750.0, benchmark: "Cadillac Escalade/Land Rover Range Rover", benchmark_price: 85_000.0, benchmark_mpg: 18.0 },
    EvRow { make: "Polestar", model: "3 Single Motor", battery_capacity_kwh: 111.0, epa_range_miles: 315.0, msrp: 73_550.0, benchmark: "Porsche Macan/BMW X5", benchmark_price: 70_000.0, benchmark_mpg: 20.0 },
];

// (fips, name, state, average daily miles)
const REGIONS: &[(&str, &str, &str, f64)] = &[
    ("36047", "Kings County (Brooklyn)", "NY", 15.4),
    ("36005", "Bronx County", "NY", 16.5),
    ("36061", "New York County (Manhattan)", "NY", 12.8),
    ("36081", "Queens County", "NY", 20.3),
    ("06075", "San Francisco County", "CA", 24.8),
    ("06037", "Los Angeles County", "CA", 32.2),
    ("48113", "Dallas County", "TX", 39.9),
    ("48201", "Harris County (Houston)", "TX", 42.5),
    ("12086", "Miami-Dade County", "FL", 31.5),
    ("17031", "Cook County (Chicago)", "IL", 30.2),
    ("53033", "King County (Seattle)", "WA", 36.5),
    ("13121", "Fulton County (Atlanta)", "GA", 38.4),
];

// Residential $/kWh, January 2026.
const ELECTRICITY_RATES: &[(&str, f64)] = &[
    ("CT", 0.2988), ("ME", 0.2742), ("MA", 0.2961), ("NH", 0.2815), ("RI", 0.2702),
    ("VT", 0.2082), ("NJ", 0.1770), ("NY", 0.2224), ("PA", 0.1810), ("IL", 0.1571),
    ("IN", 0.1494), ("MI", 0.1884), ("OH", 0.1538), ("WI", 0.1688), ("IA", 0.1331),
    ("KS", 0.1338), ("MN", 0.1473), ("MO", 0.1258), ("NE", 0.1120), ("ND", 0.1101),
    ("SD", 0.1232), ("DE", 0.1573), ("DC", 0.1645), ("FL", 0.1521), ("GA", 0.1369),
    ("MD", 0.1660), ("NC", 0.1293), ("SC", 0.1368), ("VA", 0.1426), ("WV", 0.1405),
    ("AL", 0.1463), ("KY", 0.1265), ("MS", 0.1323), ("TN", 0.1219), ("AR", 0.1225),
    ("LA", 0.1155), ("OK", 0.1208), ("TX", 0.1446), ("AZ", 0.1402), ("CO", 0.1430),
    ("ID", 0.1105), ("MT", 0.1254), ("NV", 0.1667), ("NM", 0.1385), ("UT", 0.1120),
    ("WY", 0.1146), ("CA", 0.2951), ("OR", 0.1273), ("WA", 0.1098), ("AK", 0.2390),
    ("HI", 0.4239),
];

pub(super) fn ev_models() -> Vec<EvModel> {
    EV_MODELS
        .iter()
        .map(|row| EvModel {
            make: row.make.to_string(),
            model: row.model.to_string(),
            label: format!("{} {} (2026)", row.make, row.model),
            battery_capacity_kwh: row.battery_capacity_kwh,
            epa_range_miles: row.epa_range_miles,
            msrp: row.msrp,
            ice_benchmark: IceBenchmark {
                model: row.benchmark.to_string(),
                price: row.benchmark_price,
                mpg: row.benchmark_mpg,
            },
        })
        .collect()
}

pub(super) fn regions() -> Vec<Region> {
    REGIONS
        .iter()
        .map(|(fips, name, state, daily_miles)| Region {
            fips: fips.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            daily_miles: *daily_miles,
        })
        .collect()
}

pub(super) fn electricity_rates() -> Vec<ElectricityRate> {
    ELECTRICITY_RATES
        .iter()
        .map(|(state, price_per_kwh)| ElectricityRate {
            state: state.to_string(),
            price_per_kwh: *price_per_kwh,
        })
        .collect()
}
