//! tripbot CLI: chat with the travel assistant from a terminal. Config from
//! env (`.env` supported); `chat` runs a REPL session, `ask` answers one
//! message and exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_client::{EnvLlmConfig, LlmClient};
use providers::{
    CulturalApiConfig, CurrencyApiConfig, HttpCulturalProvider, HttpCurrencyProvider,
    HttpWeatherProvider, WeatherApiConfig,
};
use router::MessageRouter;
use std::io::{BufRead, Write};
use std::sync::Arc;
use trip_handlers::{
    CulturalHandler, CurrencyHandler, DestinationHandler, GeneralHandler, IntentClassifier,
    LogisticsHandler, StyleHandler, WardrobeHandler, WeatherHandler,
};
use trip_storage::{CacheStore, RateLimiter};
use tripbot_core::{ChatRequest, ChatResponse, ConversationTurn};

mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "tripbot")]
#[command(about = "Travel assistant CLI: chat session or one-off question", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session; context (destination, dates, purpose)
    /// carries over between turns.
    Chat {
        #[arg(short, long, default_value = "local")]
        user_id: String,
    },
    /// Answer a single message and exit.
    Ask {
        message: String,
        #[arg(short, long, default_value = "local")]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_file = env_or("LOG_FILE", "./tripbot.log");
    tripbot_core::logger::init_tracing(&log_file)?;

    let cli = Cli::parse();
    let router = build_router().await?;

    match cli.command {
        Commands::Chat { user_id } => run_chat(&router, &user_id).await,
        Commands::Ask { message, user_id } => {
            let mut session = Session::new(&user_id);
            let response = take_turn(&router, &mut session, &message).await;
            print_response(&response);
            Ok(())
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Builds the full dependency graph: cache store, HTTP providers, LLM client,
/// one handler per intent, and the router on top.
async fn build_router() -> Result<MessageRouter> {
    let database_url = env_or("DATABASE_URL", "sqlite://./tripbot_cache.db");
    let cache = CacheStore::new(&database_url, RateLimiter::default())
        .await
        .context("open cache store")?;

    let llm: Arc<dyn LlmClient> = Arc::new(EnvLlmConfig::from_env()?.build_client());

    let weather_config = WeatherApiConfig {
        base_url: env_or("WEATHER_API_URL", &WeatherApiConfig::default().base_url),
        api_key: std::env::var("WEATHER_API_KEY").ok(),
        ..WeatherApiConfig::default()
    };
    let cultural_config = CulturalApiConfig {
        base_url: env_or("CULTURAL_API_URL", &CulturalApiConfig::default().base_url),
        api_key: std::env::var("CULTURAL_API_KEY").ok(),
        ..CulturalApiConfig::default()
    };
    let currency_config = CurrencyApiConfig {
        base_url: env_or("CURRENCY_API_URL", &CurrencyApiConfig::default().base_url),
        api_key: std::env::var("CURRENCY_API_KEY").ok(),
        ..CurrencyApiConfig::default()
    };

    let weather = Arc::new(HttpWeatherProvider::new(weather_config, cache.clone())?);
    let cultural = Arc::new(HttpCulturalProvider::new(cultural_config, cache.clone())?);
    let currency = Arc::new(HttpCurrencyProvider::new(currency_config, cache)?);

    let general = Arc::new(GeneralHandler::new(
        weather.clone(),
        cultural.clone(),
        llm.clone(),
    ));

    Ok(
        MessageRouter::new(IntentClassifier::new(llm.clone()), general)
            .register(Arc::new(CurrencyHandler::new(currency)))
            .register(Arc::new(WeatherHandler::new(weather.clone(), llm.clone())))
            .register(Arc::new(CulturalHandler::new(cultural.clone(), llm.clone())))
            .register(Arc::new(WardrobeHandler::new(
                weather.clone(),
                cultural.clone(),
                llm.clone(),
            )))
            .register(Arc::new(StyleHandler::new(cultural.clone(), llm.clone())))
            .register(Arc::new(DestinationHandler::new(
                weather,
                cultural,
                llm.clone(),
            )))
            .register(Arc::new(LogisticsHandler::new(llm))),
    )
}

/// One routed turn: fold newly extracted trip details into the session
/// context, route, record both sides in the history.
async fn take_turn(router: &MessageRouter, session: &mut Session, message: &str) -> ChatResponse {
    session.absorb_message(message);

    let request = ChatRequest {
        message: message.to_string(),
        context: session.context.clone(),
        history: session.history.clone(),
        profile: session.profile.clone(),
    };
    let response = router.route_message(&request).await;

    session.history.push(ConversationTurn::user(message));
    session
        .history
        .push(ConversationTurn::assistant(response.message.clone()));
    response
}

async fn run_chat(router: &MessageRouter, user_id: &str) -> Result<()> {
    let mut session = Session::new(user_id);
    let stdin = std::io::stdin();

    println!("tripbot ready. Type a message, or 'quit' to exit.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        let response = take_turn(router, &mut session, message).await;
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ChatResponse) {
    println!("{}", response.message);
    if !response.quick_replies.is_empty() {
        let options: Vec<&str> = response
            .quick_replies
            .iter()
            .map(|r| r.text.as_str())
            .collect();
        println!("  [{}]", options.join(" | "));
    }
    for suggestion in &response.suggestions {
        println!("  tip: {suggestion}");
    }
}
