//! Chat command - Talk to the pipeline from the terminal.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use chatline_core::{ChatError, ChatSession, Exchange, Variant};

use super::PipelineArgs;

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub async fn execute(args: ChatArgs) -> Result<()> {
    let variant = Variant::from(args.pipeline.variant);
    let manager = args.pipeline.build_manager()?;
    let mut session = ChatSession::new();

    println!("💬 chatline ({}) - type 'exit' to quit", variant);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();
        if is_exit(input) {
            break;
        }

        match manager.submit(&mut session, &line).await {
            Ok(exchange) => println!("{}", format_reply(variant, &exchange)),
            Err(ChatError::EmptyInput) => continue,
            Err(e) if e.is_remote() => {
                warn!(error = %e, "reply failed");
                eprintln!("⚠️  {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Terminal rendering of one exchange's reply
fn format_reply(variant: Variant, exchange: &Exchange) -> String {
    let reply = exchange
        .reply
        .as_ref()
        .map(|t| t.content.as_str())
        .unwrap_or("...");
    if variant.tags_sentiment() {
        let sentiment = exchange.sentiment.unwrap_or_default();
        format!(
            "Assistant: {} {}\n           Sentiment: {}",
            reply,
            sentiment.emoji(),
            sentiment
        )
    } else {
        format!("Assistant: {}", reply)
    }
}
