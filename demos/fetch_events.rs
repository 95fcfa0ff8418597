use chrono::{Days, Utc};
use donki::{api_key_from_env, Donki, EventType, FailurePolicy, DEMO_API_KEY};
use std::env;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=debug shows cache hits and per-type filter results.
    env_logger::init();
    configure_polars_display();

    let api_key = api_key_from_env().unwrap_or_else(|| DEMO_API_KEY.to_string());
    let end = Utc::now().date_naive();
    let start = end - Days::new(30);

    let client = Donki::new()?;
    let outcome = client
        .fetch_events()
        .api_key(&api_key)
        .event_types(&EventType::ALL)
        .start(start)
        .end(end)
        .failure_policy(FailurePolicy::SkipFailed)
        .call()
        .await?;

    let Some(report) = outcome.report() else {
        if let donki::FetchOutcome::Empty(warning) = &outcome {
            println!("{warning}");
        }
        return Ok(());
    };

    println!("{}", report.events);
    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.event_type.description(), skipped.reason);
    }
    for count in &report.type_counts {
        println!("{:<28} {}", count.event_type.description(), count.count);
    }
    for daily in &report.daily_counts {
        println!("{} {} {}", daily.date, daily.event_type, daily.count);
    }

    std::fs::write("events.csv", report.to_csv()?)?;
    std::fs::write("events.xlsx", report.to_xlsx()?)?;
    std::fs::write("events.json", report.to_json()?)?;
    println!("Wrote events.csv, events.xlsx and events.json");

    Ok(())
}

fn configure_polars_display() {
    env::set_var("POLARS_FMT_MAX_COLS", "12");
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
