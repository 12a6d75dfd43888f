use crate::infra::ApiState;
use clap::Args;
use insightplug::advisor::{format_currency, AdvisorContext, ChatOutcome, ReplySource};
use insightplug::catalog::{ProfileSelection, ReferenceCatalog};
use insightplug::config::AppConfig;
use insightplug::economics::{DerivedMetrics, MileageBreakEven, SignalEngine, VehicleProfile};
use insightplug::error::AppError;

const DEFAULT_REGION: &str = "36047";
const DEFAULT_VEHICLE: &str = "Model 3 RWD";

#[derive(Args, Debug, Clone)]
pub(crate) struct SelectionArgs {
    /// County FIPS code from the catalog
    #[arg(long, default_value = DEFAULT_REGION)]
    pub(crate) region: String,
    /// EV model or catalog label
    #[arg(long, default_value = DEFAULT_VEHICLE)]
    pub(crate) vehicle: String,
    /// Override the county's average daily miles
    #[arg(long)]
    pub(crate) daily_miles: Option<f64>,
    /// Share of charging done at home, 0.0 to 1.0
    #[arg(long)]
    pub(crate) home_charging: Option<f64>,
    /// Override the state's residential electricity rate ($/kWh)
    #[arg(long)]
    pub(crate) electricity_rate: Option<f64>,
    /// Override the gasoline price ($/gal)
    #[arg(long)]
    pub(crate) gas_price: Option<f64>,
    /// Ownership years to project
    #[arg(long)]
    pub(crate) years: Option<u32>,
}

impl SelectionArgs {
    pub(crate) fn selection(&self) -> ProfileSelection {
        ProfileSelection {
            daily_miles: self.daily_miles,
            home_charging_ratio: self.home_charging,
            electricity_rate_per_kwh: self.electricity_rate,
            gas_price_per_gallon: self.gas_price,
            ownership_years: self.years,
            ..ProfileSelection::new(self.region.clone(), self.vehicle.clone())
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct SignalsArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Print the derived metrics as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Session used for request limiting
    #[arg(long, default_value = "cli")]
    pub(crate) session: String,
    /// Question for the advisor
    #[arg(required = true, num_args = 1..)]
    pub(crate) question: Vec<String>,
}

pub(crate) fn run_signals(args: SignalsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = ReferenceCatalog::load(&config.catalog)?;
    let profile = catalog.build_profile(&args.selection.selection())?;
    let metrics = SignalEngine::standard().derive(&profile)?;

    if args.json {
        let payload = serde_json::json!({ "profile": profile, "metrics": metrics });
        println!("{}", serde_json::to_string_pretty(&payload).map_err(std::io::Error::other)?);
    } else {
        println!("{}", render_signals(&profile, &metrics).join("\n"));
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = ReferenceCatalog::load(&config.catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog).map_err(std::io::Error::other)?);
    } else {
        println!("{}", render_catalog(&catalog).join("\n"));
    }
    Ok(())
}

pub(crate) async fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let state = ApiState::from_config(&config)?;
    let (profile, metrics) = state.analyze(&args.selection.selection())?;
    let context = AdvisorContext::new(&profile, &metrics);
    let question = args.question.join(" ");

    match state.chat.ask(&args.session, &question, &context).await? {
        ChatOutcome::Answered(reply) => {
            println!("{}", reply.text);
            let source = match reply.source {
                ReplySource::RuleBased => "rule-based".to_string(),
                ReplySource::Remote { provider } => provider.to_string(),
            };
            match reply.fallback {
                Some(kind) => println!("\n[{source}; remote advisor unavailable: {kind}]"),
                None => println!("\n[{source}; {}]", reply.limit.summary()),
            }
        }
        ChatOutcome::Throttled(decision) => {
            println!("Request not sent: {}", decision.summary());
        }
    }
    Ok(())
}

fn render_signals(profile: &VehicleProfile, metrics: &DerivedMetrics) -> Vec<String> {
    let vehicle = &profile.vehicle;
    let mut lines = vec![
        format!(
            "InsightPlug signals: {} {} in {}, {}",
            vehicle.make, vehicle.model, profile.region.name, profile.region.state
        ),
        format!(
            "{:.1} mi/day | gas ${:.2}/gal | electricity ${:.4}/kWh | {:.0}% home charging",
            profile.daily_miles,
            profile.gas_price_per_gallon,
            profile.electricity_rate_per_kwh,
            profile.home_charging_ratio * 100.0
        ),
        String::new(),
        "Monthly running cost".to_string(),
        format!(
            "- Gasoline ({}): {}",
            vehicle.ice_benchmark_model,
            format_currency(metrics.legacy_monthly_cost)
        ),
        format!(
            "- Electric: {} at a blended ${:.2}/kWh",
            format_currency(metrics.efficient_monthly_cost),
            metrics.blended_rate_per_kwh
        ),
        format!("- Surplus: {}", format_currency(metrics.monthly_surplus)),
        String::new(),
        format!(
            "Range use: {:.1}% of EPA range per day, charge {}",
            metrics.daily_asset_utilization_pct, metrics.charging_interval
        ),
        format!("Price gap payback: {}", metrics.break_even),
        match metrics.projection_break_even_year() {
            Some(year) => format!("EV pulls ahead in year {year}"),
            None => format!(
                "EV does not pull ahead within {} years",
                profile.ownership_years
            ),
        },
        String::new(),
        format!("{:>4}  {:>10}  {:>10}  {:>10}", "Year", "Gasoline", "Electric", "Savings"),
    ];

    lines.extend(metrics.cost_projection.iter().map(|point| {
        format!(
            "{:>4}  {:>10}  {:>10}  {:>10}",
            point.year,
            format_currency(point.legacy_cumulative),
            format_currency(point.efficient_cumulative),
            format_currency(point.cumulative_savings)
        )
    }));

    let tco = &metrics.tco;
    lines.push(String::new());
    lines.push(format!("{}-year total cost of ownership", tco.years));
    lines.push(format!(
        "- Gasoline {} | Electric {} | Savings {}",
        format_currency(tco.total_ice_cost),
        format_currency(tco.total_ev_cost),
        format_currency(tco.tco_savings)
    ));
    lines.push(match tco.break_even_miles {
        MileageBreakEven::Miles { miles } => format!("- Price gap recovered after {miles:.0} miles"),
        MileageBreakEven::Never { .. } => "- Price gap is never recovered by mileage".to_string(),
    });
    lines
}

fn render_catalog(catalog: &ReferenceCatalog) -> Vec<String> {
    let mut lines = vec![format!("EV models ({})", catalog.ev_models().len())];
    lines.extend(catalog.ev_models().iter().map(|ev| {
        format!(
            "- {}: {:.0} mi EPA, {:.1} kWh, {} vs {}",
            ev.label,
            ev.epa_range_miles,
            ev.battery_capacity_kwh,
            format_currency(ev.msrp),
            ev.ice_benchmark.model
        )
    }));

    lines.push(String::new());
    lines.push(format!("Regions ({})", catalog.regions().len()));
    lines.extend(catalog.regions().iter().map(|region| {
        format!(
            "- {} {}, {}: {:.1} mi/day, ${:.4}/kWh",
            region.fips,
            region.name,
            region.state,
            region.daily_miles,
            catalog.rate_for_state(&region.state)
        )
    }));
    lines
}
