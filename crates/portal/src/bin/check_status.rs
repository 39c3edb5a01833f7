//! Reports whether the document backend and the portal are answering.

use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::config::Config;
use std::{process::ExitCode, time::Duration};

#[derive(Debug, PartialEq, Eq)]
enum Probe {
    Up(u16),
    UnexpectedStatus(u16),
    Unreachable,
    TimedOut,
    Failed(String),
}

impl Probe {
    fn is_up(&self) -> bool {
        matches!(self, Probe::Up(_))
    }

    fn from_status(status: u16) -> Self {
        if status == 200 {
            Probe::Up(status)
        } else {
            Probe::UnexpectedStatus(status)
        }
    }

    fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Probe::TimedOut
        } else if err.is_connect() {
            Probe::Unreachable
        } else {
            Probe::Failed(err.to_string())
        }
    }

    fn describe(&self, name: &str) -> String {
        match self {
            Probe::Up(status) => format!("✅ {name}: Running (Status: {status})"),
            Probe::UnexpectedStatus(status) => {
                format!("⚠️  {name}: Running but returned status {status}")
            }
            Probe::Unreachable => format!("❌ {name}: Not running or not accessible"),
            Probe::TimedOut => format!("⏰ {name}: Timeout - service might be slow"),
            Probe::Failed(err) => format!("❌ {name}: Error - {err}"),
        }
    }
}

async fn probe(client: &reqwest::Client, url: &str) -> Probe {
    match client.get(url).send().await {
        Ok(response) => Probe::from_status(response.status().as_u16()),
        Err(err) => Probe::from_error(&err),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    let config = Config::init().context("Failed to load configuration")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")?;

    println!("🔍 Document Portal Status Check");
    println!("{}", "=".repeat(50));
    println!(
        "⏰ Check time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    let services = [
        (format!("{}/health", config.backend.base_url), "Backend API"),
        (format!("{}/api/health", config.frontend_url), "Portal"),
    ];

    let mut all_up = true;
    for (url, name) in &services {
        let outcome = probe(&client, url).await;
        println!("{}", outcome.describe(name));
        all_up &= outcome.is_up();
    }

    println!();
    println!("📊 Summary:");
    println!("{}", "-".repeat(30));

    if all_up {
        println!("🎉 All services are running successfully!");
        println!();
        println!("🌐 Access URLs:");
        println!("   • Portal: {}", config.frontend_url);
        println!("   • Backend API: {}", config.backend.base_url);
        println!("   • Portal API docs: {}/swagger-ui", config.frontend_url);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("⚠️  Some services are not running properly.");
        println!("   Please check the individual service logs.");
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_counts_as_up() {
        assert!(Probe::from_status(200).is_up());
        assert_eq!(Probe::from_status(503), Probe::UnexpectedStatus(503));
        assert!(!Probe::from_status(503).is_up());
    }

    #[test]
    fn describes_each_outcome() {
        assert!(Probe::Up(200).describe("Portal").contains("Running"));
        assert!(Probe::TimedOut.describe("Portal").contains("Timeout"));
        assert!(
            Probe::Unreachable
                .describe("Backend API")
                .contains("Not running")
        );
    }
}
