//! reelchatctl - command-line chat client for the reelchat proxy
//!
//! Warms the proxy, opens conversations and sends messages through the same
//! orchestration a browser front end uses.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reelchat_client::{
    ChatClient, HttpProxyTransport, PollPolicy, WarmupKeeper, format_reply,
};
use reelchat_protocol::Message;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_PROXY_URL: &str = "http://localhost:8888/openai-proxy";

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "Error: {err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let policy = PollPolicy {
        max_attempts: cli.poll_attempts,
        interval: Duration::from_millis(cli.poll_interval_ms),
    };
    let transport =
        HttpProxyTransport::new(&cli.proxy_url).context("building HTTP client")?;
    let client = ChatClient::with_policy(transport, policy);

    match cli.command {
        Command::Warmup => handle_warmup(&client, &cli.proxy_url, cli.json).await,
        Command::New => handle_new(&client, cli.json).await,
        Command::Send { conversation, text } => {
            handle_send(&client, &conversation, &text, cli.json).await
        }
        Command::Chat { warmup_secs } => {
            handle_chat(Arc::new(client), Duration::from_secs(warmup_secs), cli.json).await
        }
        Command::Format { text } => {
            println!("{}", format_reply(&text));
            Ok(())
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reelchatctl",
    author,
    version,
    about = "Chat with the reelchat movie assistant through its proxy."
)]
struct Cli {
    /// Proxy URL
    #[arg(long, short = 'p', default_value = DEFAULT_PROXY_URL, env = "REELCHAT_PROXY_URL")]
    proxy_url: String,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Maximum run status checks per message
    #[arg(long, global = true, default_value_t = 60)]
    poll_attempts: u32,

    /// Delay between run status checks
    #[arg(long, global = true, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ping the proxy so the next request does not pay a cold start
    Warmup,

    /// Start a new conversation and print its ID
    New,

    /// Send one message on an existing conversation
    Send {
        /// Conversation ID returned by `new`
        conversation: String,
        /// Message text
        text: String,
    },

    /// Interactive chat session (type /quit to leave)
    Chat {
        /// Seconds between background warm-up pings
        #[arg(long, default_value_t = 240)]
        warmup_secs: u64,
    },

    /// Render assistant markdown as display HTML
    Format {
        /// Raw assistant text
        text: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reelchat_client={level},reelchatctl={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn handle_warmup(
    client: &ChatClient<HttpProxyTransport>,
    proxy_url: &str,
    json: bool,
) -> Result<()> {
    let warm = client.warmup().await;

    if json {
        println!(
            "{}",
            serde_json::json!({ "warm": warm, "proxy": proxy_url })
        );
    } else if warm {
        println!("Proxy is warm at {proxy_url}");
    }

    if !warm {
        bail!("proxy at {proxy_url} did not answer the warm-up ping");
    }
    Ok(())
}

async fn handle_new(client: &ChatClient<HttpProxyTransport>, json: bool) -> Result<()> {
    let conversation = client
        .create_conversation()
        .await
        .context("creating conversation")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
    } else {
        println!("{}", conversation.id);
    }
    Ok(())
}

async fn handle_send(
    client: &ChatClient<HttpProxyTransport>,
    conversation: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    let reply = client
        .send_message(conversation, text)
        .await
        .context("sending message")?;
    print_reply(&reply, json)
}

async fn handle_chat(
    client: Arc<ChatClient<HttpProxyTransport>>,
    warmup_period: Duration,
    json: bool,
) -> Result<()> {
    let keeper = WarmupKeeper::spawn(client.clone(), warmup_period);

    let conversation = client
        .create_conversation()
        .await
        .context("creating conversation")?;
    if !json {
        println!("Conversation {} started. Ask for a movie, /quit to leave.", conversation.id);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !json {
            print!("you> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "/quit" {
            break;
        }

        let user = Message::user(line);
        match client.send_message(&conversation.id, &user.text).await {
            Ok(reply) => print_reply(&reply, json)?,
            Err(err) if err.is_retryable() => {
                eprintln!("Error: {err}. Send the message again to retry.");
            }
            Err(err) => eprintln!("Error: {err}"),
        }
    }

    keeper.stop();
    Ok(())
}

fn print_reply(reply: &Message, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(reply)?);
    } else {
        println!("assistant> {}", reply.text);
    }
    Ok(())
}
