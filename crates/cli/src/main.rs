use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vista_agents::NavigatorAgent;
use vista_core::{CommandInput, NavigationReply, NavigatorConfig, PoiCategory};
use vista_observability::{init_tracing, AppMetrics};
use vista_routing::{OsrmClient, RoutingConfig, DEFAULT_OSRM_URL, DEFAULT_TIMEOUT_SECS};
use vista_storage::{load_catalog, MemoryStore, DEFAULT_CATALOG_PATH};

type Navigator = NavigatorAgent<OsrmClient, MemoryStore>;

#[derive(Debug, Parser)]
#[command(name = "vista")]
#[command(about = "Scenic route planner for Jeju island")]
struct Cli {
    #[arg(long, env = "VISTA_CATALOG_PATH", default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    #[arg(long, env = "VISTA_OSRM_URL", default_value = DEFAULT_OSRM_URL)]
    osrm_url: String,

    #[arg(long, env = "VISTA_ROUTING_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan and route a free-text command.
    Navigate {
        text: String,
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show intents, endpoints and waypoints without routing.
    Plan { text: String },
    Pois {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vista_cli");
    let cli = Cli::parse();

    let agent = build_agent(&cli)?;

    match cli.command {
        Command::Navigate {
            text,
            session,
            json,
        } => {
            let reply = agent
                .handle_command(CommandInput {
                    session_id: session,
                    text,
                })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                print_reply(&reply);
            }
        }
        Command::Plan { text } => {
            println!("{}", serde_json::to_string_pretty(&agent.plan(&text))?);
        }
        Command::Pois { category, query } => {
            let category = category
                .as_deref()
                .map(|raw| PoiCategory::parse(raw).with_context(|| format!("invalid --category value: {raw}")))
                .transpose()?;
            let pois = agent.catalog().search(category, query.as_deref());
            println!("{}", serde_json::to_string_pretty(&pois)?);
        }
        Command::Chat => run_chat(agent).await?,
    }

    Ok(())
}

async fn run_chat(agent: Navigator) -> Result<()> {
    let mut session_id: Option<String> = None;

    println!("VISTA navigation chat. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        match agent
            .handle_command(CommandInput {
                session_id: session_id.clone(),
                text: message.to_string(),
            })
            .await
        {
            Ok(reply) => {
                session_id = Some(reply.session_id.clone());
                print_reply(&reply);
            }
            Err(err) => println!("\nroute unavailable: {err:#}\n"),
        }
    }

    Ok(())
}

fn print_reply(reply: &NavigationReply) {
    let route = &reply.route;
    println!();
    println!("{} -> {}", route.plan.start.name, route.plan.end.name);
    println!(
        "{} | {:.1} km | scenic {:.1}/10 | ~{:.1} h",
        route.travel_style,
        route.distance / 1000.0,
        route.scenic_score,
        route.estimated_duration_hours
    );
    if route.used_fallback {
        println!("(direct fallback route)");
    }
    for line in &route.voice_guidance {
        println!("- {line}");
    }
    if !route.photo_spots.is_empty() {
        println!("Photo spots: {}", route.photo_spots.len());
    }
    for tip in &route.time_recommendations {
        println!("* {tip}");
    }
    println!();
}

fn build_agent(cli: &Cli) -> Result<Navigator> {
    let metrics = AppMetrics::shared();

    let catalog = load_catalog(&cli.catalog);
    if catalog.degraded {
        metrics.inc_degraded_catalog();
    }

    let routing = RoutingConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
        ..RoutingConfig::default()
    }
    .with_base_url(cli.osrm_url.clone());
    let routing_client = OsrmClient::new(routing)
        .with_context(|| format!("failed to configure routing client for {}", cli.osrm_url))?;

    Ok(NavigatorAgent::new(
        Arc::new(catalog.store),
        Arc::new(routing_client),
        Arc::new(MemoryStore::new()),
        NavigatorConfig::default(),
        metrics,
    ))
}
