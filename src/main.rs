use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use zipcast_core::{App, AppError, Config, Lookup};
use zipcast_weather::ResolutionResult;

/// Look up the weather forecast for a street address.
///
/// Forecasts are cached per postal code for 30 minutes, so repeated
/// addresses in one session are answered without calling the weather API.
#[derive(Debug, Parser)]
#[command(name = "zipcast", version, about)]
struct Cli {
    /// Addresses to look up. Reads one per line from stdin when omitted.
    addresses: Vec<String>,

    /// Print each result as a JSON object
    #[arg(long)]
    json: bool,

    /// Config file (defaults to <config dir>/zipcast/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "zipcast failed");
            eprintln!("{}", report(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, validation) = Config::load_validated(cli.config.as_deref())?;
    zipcast_core::init(&config.logging.filter);
    validation.log_warnings();

    let app = App::with_config(&config)?;
    tracing::info!("zipcast started");

    if cli.addresses.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            show(&app, &line, cli.json).await?;
        }
    } else {
        for address in &cli.addresses {
            show(&app, address, cli.json).await?;
        }
    }

    Ok(())
}

/// User-facing message first, then the detail.
fn report(err: &AppError) -> String {
    format!("{}\n{err}", err.user_message())
}

async fn show(app: &App, address: &str, json: bool) -> Result<(), AppError> {
    let lookup = app.lookup(address).await;
    if json {
        let line = serde_json::to_string(&lookup).map_err(std::io::Error::from)?;
        println!("{line}");
    } else if let Some(text) = render(&lookup) {
        println!("{text}");
    }
    Ok(())
}

fn render(lookup: &Lookup) -> Option<String> {
    match lookup {
        Lookup::Empty => None,
        Lookup::NotFound { message } | Lookup::Failed { message } => Some((*message).to_string()),
        Lookup::Forecast(result) => Some(render_forecast(result)),
    }
}

fn render_forecast(result: &ResolutionResult) -> String {
    let code = result
        .postal_code
        .as_ref()
        .map(|c| c.as_str())
        .unwrap_or("?");
    let marker = if result.served_from_cache { " (cached)" } else { "" };
    let mut lines = vec![format!("Forecast for {code}{marker}")];

    if let Some(forecast) = &result.forecast {
        lines.push(format!("Current Temperature: {}°F", forecast.current_temperature()));
        lines.push(format!(
            "High: {}°F  Low: {}°F",
            forecast.high_temperature(),
            forecast.low_temperature()
        ));
        lines.extend(
            forecast
                .daily_forecast()
                .iter()
                .map(|day| format!("  {}  {}°F / {}°F", day.date, day.high, day.low)),
        );
    }

    lines.join("\n")
}
