use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use paynoti::{
    calculate_savings_opportunities, category_totals, detect_anomalies, dominant_currency,
    format_currency, format_date, load_transactions_csv, monthly_totals, payment_status, seed,
    spending_summary, total_monthly_spend, total_potential_savings, PaymentStore, SqliteStore,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "paynoti", version, about = "Payment and subscription analytics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import transactions from a CSV file into SQLite
    Import {
        csv: PathBuf,
        #[arg(long, env = "PAYNOTI_DB_PATH", default_value = "paynoti.db")]
        db: PathBuf,
    },
    /// Print spending analytics for a wallet
    Report {
        #[arg(long, default_value = seed::DEMO_WALLET)]
        wallet: String,
        /// SQLite database; demo data is used when omitted
        #[arg(long, env = "PAYNOTI_DB_PATH")]
        db: Option<PathBuf>,
    },
    /// Classify a due date as upcoming, due or overdue
    Status { due_date: String },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    paynoti::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Import { csv, db } => run_import(&csv, &db),
        Command::Report { wallet, db } => run_report(&wallet, db),
        Command::Status { due_date } => run_status(&due_date),
    }
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("🗄️  Import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let transactions = load_transactions_csv(csv_path)?;
    println!("✓ Loaded {} transactions from {}", transactions.len(), csv_path.display());

    let store = SqliteStore::open(db_path)?;
    let stats = store
        .import_transactions(&transactions)
        .context("Failed to insert transactions")?;
    let count = store.count_transactions()?;

    println!("✓ Inserted: {} transactions", stats.inserted);
    println!("✓ Skipped duplicates: {}", stats.duplicates);
    println!("✓ Database contains {} transactions", count);

    Ok(())
}

fn run_report(wallet: &str, db_path: Option<PathBuf>) -> Result<()> {
    let store: Box<dyn PaymentStore> = match db_path {
        Some(path) => Box::new(SqliteStore::open(&path)?),
        None => Box::new(seed::demo_memory_store()),
    };

    let transactions = store.list_transactions(wallet)?;
    let subscriptions = store.list_subscriptions(wallet)?;

    println!("📊 Spending report for {}", wallet);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Totals are summed as-is and shown in the wallet's most common currency
    let currency = dominant_currency(transactions.iter().map(|tx| tx.currency.as_str()));
    let sub_currency = dominant_currency(subscriptions.iter().map(|sub| sub.currency.as_str()));

    let summary = spending_summary(&transactions)?;
    println!("Total spent:   {}", format_currency(summary.total_spent, &currency));
    println!("Avg monthly:   {}", format_currency(summary.average_monthly, &currency));
    println!("Transactions:  {}", summary.transaction_count);

    println!("\n📅 By month");
    for month in monthly_totals(&transactions)? {
        println!(
            "  {:<10} {:>12}  ({} transactions)",
            month.month,
            format_currency(month.amount, &currency),
            month.count
        );
    }

    println!("\n🏷️  By category");
    for category in category_totals(&transactions) {
        println!(
            "  {:<14} {:>12}  {:>3}%",
            category.name,
            format_currency(category.value, &currency),
            category.percentage
        );
    }

    println!("\n🚨 Anomalies");
    if transactions.is_empty() {
        println!("  (no transactions)");
    } else {
        let anomalies = detect_anomalies(&transactions)?;
        if anomalies.is_empty() {
            println!("  none");
        }
        for anomaly in anomalies {
            println!(
                "  {} {} on {} - {}",
                anomaly.transaction.description,
                format_currency(anomaly.transaction.amount, &anomaly.transaction.currency),
                format_date(&anomaly.transaction.date)?,
                anomaly.reason
            );
        }
    }

    println!("\n💰 Subscriptions");
    let opportunities = calculate_savings_opportunities(&subscriptions);
    for opp in &opportunities {
        println!(
            "  {:<22} {:>10}/mo  save {:>8}  {}",
            opp.subscription.service_name,
            format_currency(opp.monthly_cost, &opp.subscription.currency),
            format_currency(opp.potential_savings, &opp.subscription.currency),
            opp.recommendation
        );
    }
    println!(
        "  Monthly spend {} · potential savings {}",
        format_currency(total_monthly_spend(&subscriptions), &sub_currency),
        format_currency(total_potential_savings(&opportunities), &sub_currency)
    );

    Ok(())
}

fn run_status(due_date: &str) -> Result<()> {
    let status = payment_status(due_date)?;
    println!(
        "{} is {} (as of {})",
        format_date(due_date)?,
        status.as_str(),
        Utc::now().format("%Y-%m-%d")
    );
    Ok(())
}
