mod fixture;

use std::time::Duration;

use capture_interface::IncomingMessage;
use chunk::{Chunk, ChunkConfig, ChunkEvent, ChunkSession, Settings};
use fixture::Fixture;
use futures_util::StreamExt;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(name = "replay", about = "Replay backend messages into a chunk session")]
struct Args {
    #[arg(short, long, default_value_t = Fixture::Timed)]
    fixture: Fixture,

    /// Delay between messages, in milliseconds.
    #[arg(short, long, default_value_t = 0)]
    speed: u64,

    #[arg(long)]
    translation_only: bool,

    /// Print every event the session emits.
    #[arg(long)]
    events: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    use clap::Parser;
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let messages: Vec<IncomingMessage> = serde_json::from_str(args.fixture.json())
        .expect("fixture must parse as IncomingMessage[]");
    let total = messages.len();

    let config = ChunkConfig::from_env().unwrap_or_default();
    let mut session = ChunkSession::builder()
        .config(config)
        .settings(Settings {
            translation_only_mode: args.translation_only,
            ..Settings::default()
        })
        .build();
    let mut events = session.subscribe();

    let mut stream = futures_util::stream::iter(messages);
    while let Some(message) = stream.next().await {
        session.handle_message(message).await;

        while let Ok(event) = events.try_recv() {
            if args.events {
                println!("  {}", describe(&event));
            }
        }
        if args.speed > 0 {
            tokio::time::sleep(Duration::from_millis(args.speed)).await;
        }
    }

    println!("{} messages ({} fixture)", total, args.fixture);
    for (idx, chunk) in session.chunks().iter().enumerate() {
        let marker = if idx == session.pointer() { ">" } else { " " };
        println!("{marker} {idx:>2} {}", render(chunk));
    }
}

fn render(chunk: &Chunk) -> String {
    let text: String = chunk
        .text
        .runs()
        .iter()
        .map(|run| match &run.text {
            Some(reading) => format!("{}[{}]", run.base, reading),
            None => run.base.clone(),
        })
        .collect();
    let time = chunk
        .playback_time_s
        .map(|t| format!("{t:>6.1}s"))
        .unwrap_or_else(|| "      -".to_string());

    match &chunk.translation {
        Some(translation) if translation.is_decaying() => {
            format!("{time} {text} | ({})", translation.text())
        }
        Some(translation) => format!("{time} {text} | {}", translation.text()),
        None => format!("{time} {text}"),
    }
}

fn describe(event: &ChunkEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| format!("<{e}>"))
}
