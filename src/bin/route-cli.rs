use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Query a running route facade", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the facade is up
    Health,
    /// Plan a route through a named service
    Route {
        /// Provider name (yours, ecan)
        service: String,
        /// Start point as "lat,lon"
        #[arg(long)]
        origin: String,
        /// End point as "lat,lon"
        #[arg(long)]
        destination: String,
        /// Intermediate stops as "lat,lon,lat,lon,..."
        #[arg(long)]
        waypoints: Option<String>,
        #[arg(long, default_value = "car")]
        mode: String,
        #[arg(long, default_value = "fastest")]
        route_type: String,
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Plan a route through the OSRM-compatible endpoint
    Osrm {
        /// Ordered stops as "lat,lon"; repeat for each stop
        #[arg(long = "loc", required = true, num_args = 1..)]
        locations: Vec<String>,
        #[arg(long, default_value = "car")]
        mode: String,
        #[arg(short, long, default_value = "gpx")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Route {
            service,
            origin,
            destination,
            waypoints,
            mode,
            route_type,
            format,
        } => {
            let mut query = vec![
                ("origin", origin),
                ("destination", destination),
                ("mode", mode),
                ("route_type", route_type),
                ("format", format),
            ];
            if let Some(waypoints) = waypoints {
                query.push(("waypoints", waypoints));
            }
            let res = client
                .get(format!("{}/api/v1/{}", cli.url, service))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Osrm {
            locations,
            mode,
            output,
        } => {
            let mut query: Vec<(&str, String)> =
                locations.into_iter().map(|loc| ("loc", loc)).collect();
            query.push(("mode", mode));
            query.push(("output", output));
            let res = client
                .get(format!("{}/api/osrm/v1", cli.url))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: facade returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    // Pretty-print JSON, pass anything else (GPX, KML) through
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
