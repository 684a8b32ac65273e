use clap::{Parser, Subcommand};
use color_eyre::eyre::bail;
use serde_json::json;
use std::time::Duration;
use swapi_graphql::{
    graphql::{
        async_graphql::{Request, Variables},
        schema, CHARACTER_QUERY,
    },
    init_logging,
    upstream::{http::DEFAULT_BASE_URL, HttpConfig, HttpDataSource},
};
use url::Url;

/// Query the Star Wars API through GraphQL.
#[derive(Clone, Debug, Parser)]
struct Options {
    /// Root URL of the upstream REST API.
    #[clap(long, env = "SWAPI_URL", default_value = DEFAULT_BASE_URL)]
    swapi_url: Url,
    /// Timeout for each upstream request, in milliseconds.
    #[clap(long, env = "SWAPI_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Print the GraphQL schema.
    Sdl,
    /// Look up a character by name, selecting every field.
    Character { name: String },
    /// Execute a GraphQL document.
    Query { document: String },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    init_logging();
    let opt = Options::parse();

    let mut config = HttpConfig::new(opt.swapi_url);
    if let Some(ms) = opt.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    let schema = schema(HttpDataSource::new(config)?);

    let req = match opt.command {
        Command::Sdl => {
            println!("{}", schema.sdl());
            return Ok(());
        }
        Command::Character { name } => Request::new(CHARACTER_QUERY)
            .variables(Variables::from_json(json!({ "name": name }))),
        Command::Query { document } => Request::new(document),
    };

    let res = schema.execute(req).await;
    println!("{}", serde_json::to_string_pretty(&res)?);
    if !res.errors.is_empty() {
        bail!("query failed with {} error(s)", res.errors.len());
    }
    Ok(())
}
