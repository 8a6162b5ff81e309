//! Cashflow, forecast and simulation commands

use anyhow::Result;
use chrono::NaiveDate;
use runway_core::{
    db::Database,
    models::{Decision, DecisionType, Recommendation, SimulationResult},
    simulate::format_money,
    AnalysisConfig, Planner,
};

use super::{colored_amount, resolve_user};

pub fn cmd_cashflow(db: &Database, config: &AnalysisConfig, user: &str, json: bool) -> Result<()> {
    let user = resolve_user(db, user)?;
    let rows = Planner::new(db, config).cashflow_summary(user.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No transactions for {}. Import some with:", user.name);
        println!("  runway import --file statement.csv --account ID");
        return Ok(());
    }

    println!();
    println!("📊 Monthly Cashflow for {}", user.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<8} │ {:>14} │ {:>14} │ {:>14}",
        "Month", "Income", "Expense", "Net"
    );

    for row in rows {
        println!(
            "   {:<8} │ {:>14} │ {:>14} │ {:>23}",
            row.month.to_string(),
            format_money(row.income),
            format_money(row.expense),
            colored_amount(row.net)
        );
    }

    Ok(())
}

pub fn cmd_forecast(
    db: &Database,
    config: &AnalysisConfig,
    user: &str,
    days: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    if days == 0 {
        anyhow::bail!("--days must be at least 1");
    }

    let user = resolve_user(db, user)?;
    let forecast = Planner::new(db, config).forecast(user.id, days, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    println!();
    println!(
        "🔮 Forecast for {} ({})",
        user.name,
        forecast.basis.scenario_name()
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<8} │ {:>14} │ {:>14} │ {:>14}",
        "Month", "Predicted", "Low", "High"
    );

    for point in &forecast.points {
        println!(
            "   {:<8} │ {:>14} │ {:>14} │ {:>14}",
            point.forecast_month.to_string(),
            format_money(point.predicted_cashflow),
            format_money(point.lower_bound),
            format_money(point.upper_bound)
        );
    }

    Ok(())
}

/// Decision parameters as given on the command line
pub struct SimulateArgs<'a> {
    pub user: &'a str,
    pub decision_type: &'a str,
    pub amount: f64,
    pub start: NaiveDate,
    pub months: Option<u32>,
}

pub fn cmd_simulate(
    db: &Database,
    config: &AnalysisConfig,
    args: &SimulateArgs<'_>,
    today: NaiveDate,
    json: bool,
) -> Result<SimulationResult> {
    let user = resolve_user(db, args.user)?;
    let decision_type: DecisionType = args.decision_type.parse()?;
    let decision = Decision::new(decision_type, args.amount, args.start, args.months)?;

    let result = Planner::new(db, config).simulate(user.id, &decision, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result);
    }

    let badge = match result.recommendation {
        Recommendation::Safe => "✅",
        Recommendation::Caution => "⚠️ ",
        Recommendation::Avoid => "🛑",
    };

    println!();
    println!(
        "{} {} ({}% confidence)",
        badge, result.recommendation, result.confidence
    );
    println!("   {}", result.explanation);
    println!();
    println!(
        "   Decision: {} of ${} from {}",
        decision.decision_type,
        format_money(decision.amount),
        decision.start_date
    );
    println!(
        "   Months affected: {}  Total cost: ${}",
        result.months_affected,
        format_money(result.total_cost)
    );
    println!("   ─────────────────────────────────────────────");

    for point in &result.trajectory {
        println!(
            "   {:<8} │ {:>14} │ {}",
            point.month.to_string(),
            format_money(point.simulated_cashflow),
            colored_amount(point.balance)
        );
    }

    Ok(result)
}
