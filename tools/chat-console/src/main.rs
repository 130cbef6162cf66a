//! Chat console: drive a conversation with a running chat service by hand.
//!
//! # Usage
//!
//! ```bash
//! # One message
//! cargo run -p chat-console -- --from +919876543210 "REGISTER Rajesh Kumar, TN01AB1234, 32ft, 25"
//!
//! # Interactive; prefix a line with `!` to tap a button (e.g. `!role_trucker`)
//! cargo run -p chat-console -- --from +919876543210
//! ```

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

mod client;

use client::{Answer, ChatClient};

#[derive(Parser)]
#[command(about = "Send chat messages to the service's test endpoint")]
struct Args {
    /// Base URL of the chat service
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// Sender phone number
    #[arg(long, default_value = "+919876543210")]
    from: String,

    /// Message to send; omit for an interactive session
    message: Option<String>,
}

fn print_answer(answer: &Answer) {
    if !answer.success {
        println!("[{} | failed]", answer.mode);
    }
    match &answer.reply {
        Some(reply) => println!("{reply}"),
        // Guided replies go out through the notifier, not the response.
        None => println!("[{} | sent via provider]", answer.mode),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ChatClient::new(&args.url, &args.from);

    if let Some(message) = args.message {
        let answer = client.send(&message).await?;
        print_answer(&answer);
        return Ok(());
    }

    println!("Chatting as {} with {} (Ctrl-D to quit)", args.from, client.url());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match client.send(line).await {
            Ok(answer) => print_answer(&answer),
            Err(e) => eprintln!("error: {e:#}"),
        }
        println!();
    }
    Ok(())
}
