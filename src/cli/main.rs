use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use moral_machine_predictor::models::{AttributeLevel, Country};
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "mmp-cli")]
#[command(about = "Moral Machine predictor CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MMP_ENDPOINT", default_value = "http://localhost:8501")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Pedestrian (0 or 1)
    #[arg(long, default_value = "0")]
    pedped: u8,

    /// Barrier present (0 or 1)
    #[arg(long, default_value = "0")]
    barrier: u8,

    /// Crossing signal (0, 1 or 2)
    #[arg(long, default_value = "0")]
    crossingsignal: u8,

    /// Attribute level, e.g. Hoomans or Pets
    #[arg(short, long, default_value = "Hoomans")]
    attribute_level: AttributeLevel,

    /// Political review (0 or 1)
    #[arg(long, default_value = "0")]
    review_political: u8,

    /// Religious review (0 or 1)
    #[arg(long, default_value = "0")]
    review_religious: u8,
}

impl ScenarioArgs {
    fn to_json(&self, country: Option<Country>) -> Value {
        json!({
            "pedped": self.pedped,
            "barrier": self.barrier,
            "crossingsignal": self.crossingsignal,
            "attribute_level": self.attribute_level,
            "user_country_3": country,
            "review_political": self.review_political,
            "review_religious": self.review_religious,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the saved probability of one scenario
    Predict {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Respondent country
        #[arg(short, long, default_value = "USA")]
        country: Country,
    },

    /// Compare two attribute levels on the same scenario
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Respondent country
        #[arg(short, long, default_value = "USA")]
        country: Country,

        /// Attribute level to compare against
        #[arg(short = 'w', long)]
        with: AttributeLevel,
    },

    /// Saved probability of one scenario for every country
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// List the accepted field values
    Options,

    /// Show the loaded model
    Model,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    let body = match cli.command {
        Commands::Predict { scenario, country } => {
            post(&client, endpoint, "/v1/predict", scenario.to_json(Some(country))).await?
        }

        Commands::Compare {
            scenario,
            country,
            with,
        } => {
            let mut body = scenario.to_json(Some(country));
            body["attribute_level_compare"] = json!(with);
            post(&client, endpoint, "/v1/compare", body).await?
        }

        Commands::Sweep { scenario } => {
            post(&client, endpoint, "/v1/sweep", scenario.to_json(None)).await?
        }

        Commands::Options => get(&client, endpoint, "/v1/options").await?,
        Commands::Model => get(&client, endpoint, "/v1/model").await?,
        Commands::Health => get(&client, endpoint, "/health").await?,
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn get(client: &Client, endpoint: &str, path: &str) -> anyhow::Result<Value> {
    let response = client
        .get(format!("{}{}", endpoint, path))
        .send()
        .await
        .with_context(|| format!("request to {}{} failed", endpoint, path))?;
    read_body(response).await
}

async fn post(client: &Client, endpoint: &str, path: &str, body: Value) -> anyhow::Result<Value> {
    let response = client
        .post(format!("{}{}", endpoint, path))
        .json(&body)
        .send()
        .await
        .with_context(|| format!("request to {}{} failed", endpoint, path))?;
    read_body(response).await
}

async fn read_body(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("response is not JSON")?;

    if !status.is_success() {
        let message = body["error"]["message"].as_str().unwrap_or("unknown error");
        bail!("server returned {}: {}", status, message);
    }
    Ok(body)
}
