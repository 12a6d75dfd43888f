use super::composer::{format_currency, AdvisorContext};
use crate::economics::ChargingInterval;

/// System instruction handed to a remote advisor, grounded in the user's numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorPrompt {
    pub system: String,
}

impl AdvisorPrompt {
    pub fn for_context(context: &AdvisorContext<'_>) -> Self {
        let AdvisorContext { profile, metrics } = *context;
        let interval = match metrics.charging_interval {
            ChargingInterval::Days(days) => format!("every {days} days"),
            ChargingInterval::Unlimited => "effectively never".to_string(),
        };
        let home_share = (profile.home_charging_ratio * 100.0).round();

        let system = format!(
            "You explain electric vehicle economics to a prospective buyer.\n\
             \n\
             User context:\n\
             - Region: {region}, {state}\n\
             - Vehicle: {make} {model} ({range} mi EPA range, {battery} kWh battery)\n\
             - Daily driving: {daily} miles\n\
             - Home charging: {home_share:.0}%\n\
             - Gasoline benchmark: {benchmark} ({mpg} MPG)\n\
             - Residential electricity: ${rate:.4}/kWh\n\
             \n\
             Derived signals:\n\
             - Monthly surplus: {surplus}/month\n\
             - Daily asset utilization: {utilization:.1}% of range\n\
             - Charging interval: {interval}\n\
             - Purchase incentive applied: {incentive}\n\
             \n\
             Ground every answer in these numbers. Keep replies to two or three sentences. \
             Frame the answer as educational analysis, not financial advice.",
            region = profile.region.name,
            state = profile.region.state,
            make = profile.vehicle.make,
            model = profile.vehicle.model,
            range = profile.vehicle.epa_range_miles,
            battery = profile.vehicle.battery_capacity_kwh,
            daily = profile.daily_miles,
            benchmark = profile.vehicle.ice_benchmark_model,
            mpg = profile.ice_mpg,
            rate = profile.electricity_rate_per_kwh,
            surplus = format_currency(metrics.monthly_surplus),
            utilization = metrics.daily_asset_utilization_pct,
            incentive = format_currency(profile.tax_incentive),
        );

        Self { system }
    }
}
