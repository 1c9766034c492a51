use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand};
use serde_json::Value;

/// Body the service returns while no link has been published.
const NOT_READY: &str = "Links not ready";

#[derive(Parser)]
#[command(name = "edgelink-cli")]
#[command(about = "Inspect a running edgelink instance", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3005")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show orchestration stage and process state
    Status,
    /// Print the decoded subscription links
    Link {
        /// Subscription path; read from /status when omitted
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/status")).send().await?;
            print_response(res).await?;
        }
        Commands::Link { path } => {
            let path = match path {
                Some(path) => format!("/{}", path.trim_start_matches('/')),
                None => {
                    let status: Value = client.get(format!("{base}/status")).send().await?.json().await?;
                    status["subscription_path"]
                        .as_str()
                        .ok_or("status response has no subscription_path")?
                        .to_string()
                }
            };

            let res = client.get(format!("{base}{path}")).send().await?;
            if !res.status().is_success() {
                eprintln!("Error: service returned status {}", res.status());
                return Ok(());
            }

            let body = res.text().await?;
            let body = body.trim();
            if body == NOT_READY {
                println!("{NOT_READY}");
                return Ok(());
            }

            let decoded = BASE64.decode(body)?;
            for line in String::from_utf8_lossy(&decoded).lines() {
                println!("{line}");
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
