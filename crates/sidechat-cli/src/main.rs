mod console;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use sidechat_models::DiscussionId;
use sidechat_transport::{
    AnswerChannel, ChatEndpoints, EventChannels, SseAnswers, StreamingAnswers,
};
use sidechat_widget::{ChatWidget, WidgetConfig};

use console::ConsoleUi;

/// Terminal chat front-end for a sidechat backend.
#[derive(Parser)]
#[command(name = "sidechat", version, about)]
struct Cli {
    /// Base URL of the chat backend.
    #[arg(long, env = "SIDECHAT_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Which answer transport to run.
    #[arg(long, value_enum, default_value_t = Transport::Stream)]
    transport: Transport,

    /// Appended to every outgoing question.
    #[arg(long, env = "SIDECHAT_PROMPT_SUFFIX")]
    suffix: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transport {
    /// One chunked streaming request per question.
    Stream,
    /// Session-scoped SSE channel plus out-of-band question posts.
    Sse,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let endpoints = ChatEndpoints::new(cli.base_url);

    let channel: Box<dyn AnswerChannel> = match cli.transport {
        Transport::Stream => Box::new(StreamingAnswers::new(endpoints)),
        Transport::Sse => {
            let discussion = DiscussionId::generate();
            info!(discussion = %discussion, "starting discussion");
            let channels = EventChannels::new(endpoints);
            Box::new(SseAnswers::connect(&channels, discussion)?)
        }
    };

    let config = WidgetConfig {
        prompt_suffix: cli.suffix,
        ..WidgetConfig::default()
    };
    let mut widget = ChatWidget::new(ConsoleUi::new(), channel, config);
    widget.mount();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        widget.run_exchange(&line).await;
    }

    widget.unmount();
    Ok(())
}
