//! Interactive terminal front end for the motivator.
//!
//! Reads one feeling at a time from stdin, prints the detected emotion with
//! its verse and encouragement, then asks whether to continue.
//!
//! Configuration is read from the same environment variables as the server
//! (`AWS_*`, `MOTIVATOR_*`). Logging goes through `env_logger`; set
//! `RUST_LOG=motivator=debug` to see pipeline transitions.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use motivator::{BedrockCompletion, Motivator, MotivatorConfig};

const GREETING: &str = "How are you feeling today?";
const CONTINUE_PROMPT: &str = "Would you like to share another feeling? (yes/no)";
const LISTENING: &str = "I'm here to listen. Lay it on me.";
const FAREWELL: &str = "Thank you for chatting. May you have a blessed day!";

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn prompt_line(input: &mut impl BufRead, prompt: &str) -> io::Result<Option<String>> {
    println!("{}", prompt);
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn wants_another(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "yes" | "y")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = MotivatorConfig::from_env().context("Invalid configuration")?;
    let knowledge = config
        .load_knowledge_base()
        .context("Failed to load knowledge base")?;
    let service = BedrockCompletion::from_config(&config)
        .context("Failed to build Bedrock client")?;
    let motivator = Motivator::new(Arc::new(service), Arc::new(knowledge))
        .with_match_strategy(config.match_strategy);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut prompt = GREETING;

    // One flag per session: whether the user wants to keep going.
    loop {
        let Some(feeling) = prompt_line(&mut input, prompt)? else {
            break;
        };

        let response = motivator.get_response(&feeling).await;
        println!("\n{}\n", response.render());

        match prompt_line(&mut input, CONTINUE_PROMPT)? {
            Some(answer) if wants_another(&answer) => prompt = LISTENING,
            _ => break,
        }
    }

    println!("{}", FAREWELL);
    Ok(())
}
