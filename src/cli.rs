// command line interface

use crate::core::format::{CHUNK_SIZE, MESSAGE_LIMIT, format_listing};
use crate::{Bot, Error, Limits, Server, Store, Telegram, router};
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use miette::Result;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "peoplebot", about = "Look up people records from a telegram chat")]
struct Cli {
    /// database connection url
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://people.db", global = true)]
    db: String,

    /// telegram bot token
    #[arg(long, short = 't', env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// longest message the transport accepts, in characters
    #[arg(long, env = "MESSAGE_LIMIT", default_value_t = MESSAGE_LIMIT, global = true)]
    limit: usize,

    /// piece size used when a reply goes over --limit
    #[arg(long, env = "CHUNK_SIZE", default_value_t = CHUNK_SIZE, global = true)]
    chunk_size: usize,

    /// public url telegram should post updates to
    #[arg(long, env = "WEBHOOK_URL", global = true)]
    webhook_url: Option<String>,

    /// host to bind in webhook mode
    #[arg(long, default_value = "0.0.0.0", global = true)]
    host: String,

    /// port to bind in webhook mode
    #[arg(long, env = "PORT", default_value_t = 8080, global = true)]
    port: u16,

    /// hosted on render: use a webhook when a webhook url is set
    #[arg(long, env = "RENDER", value_parser = FalseyValueParser::new(), global = true)]
    render: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// long-poll telegram for updates
    Poll,

    /// receive updates through a webhook
    Webhook,

    /// run one lookup locally and print the reply
    Query {
        /// a name fragment or a document id
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// print every record
    List,
}

pub async fn run() -> Result<()> {
    let Cli {
        db,
        token,
        limit,
        chunk_size,
        webhook_url,
        host,
        port,
        render,
        command,
    } = Cli::parse();

    let limits = Limits::new(limit, chunk_size);

    let store = Store::connect(&db).await?;
    let seeded = store.initialize().await?;
    info!(%db, seeded, "store ready");

    match command {
        Some(Commands::Query { text }) => {
            let reply = router::lookup(&store, text.join(" ").trim()).await?;
            print_reply(&limits, &reply);
            Ok(())
        }

        Some(Commands::List) => {
            let people = store.list_all().await?;
            print_reply(&limits, &format_listing(&people));
            Ok(())
        }

        Some(Commands::Poll) => Ok(build_bot(token, store, limits)
            .await?
            .run_polling()
            .await?),

        Some(Commands::Webhook) => {
            let url = webhook_url.ok_or_else(|| {
                miette::miette!("webhook url required (--webhook-url or WEBHOOK_URL)")
            })?;
            let bot = build_bot(token, store, limits).await?;
            Ok(Server::run(bot, &url, &host, port).await?)
        }

        // no subcommand: pick a transport the way the hosting platform expects
        None => {
            let bot = build_bot(token, store, limits).await?;
            match (render, webhook_url) {
                (true, Some(url)) => {
                    info!("running in webhook mode");
                    Ok(Server::run(bot, &url, &host, port).await?)
                }
                (true, None) => {
                    warn!("WEBHOOK_URL not set, falling back to polling");
                    Ok(bot.run_polling().await?)
                }
                (false, _) => Ok(bot.run_polling().await?),
            }
        }
    }
}

async fn build_bot(token: Option<String>, store: Store, limits: Limits) -> Result<Bot, Error> {
    let token = token.ok_or(Error::MissingToken)?;
    Bot::connect(store, Telegram::new(&token), limits).await
}

fn print_reply(limits: &Limits, reply: &str) {
    for chunk in limits.split(reply) {
        println!("{chunk}");
    }
}
