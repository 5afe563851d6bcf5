//! `voxintent classify`: Single-message or interactive classification.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use voxintent_config::AppConfig;
use voxintent_core::intent::DecisionKind;
use voxintent_core::message::{Dialogue, Message};
use voxintent_intent::{Classification, IntentClassifier, Outcome};

pub async fn run(session: String, message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup instructions when a remote provider has no key
    if voxintent_providers::router::missing_api_key(&config) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    VOXINTENT_API_KEY   (generic)");
        eprintln!("    OPENAI_API_KEY      (for OpenAI direct)");
        eprintln!("    OPENROUTER_API_KEY  (for OpenRouter)");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file, globally or under [providers.{}]:", config.default_provider);
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let backend = super::build_backend(&config).ok_or("No default provider configured")?;
    let classifier = super::build_classifier(&config).with_backend(Arc::new(backend));

    if let Some(msg) = message {
        let result = classifier.detect(&session, &mut Dialogue::new(), &msg).await?;
        println!("{}", result.text);
        return Ok(());
    }

    println!();
    println!("  voxintent interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", voxintent_providers::router::default_model(&config));
    println!("  Actions:   {}", config.actions.len());
    println!("  Session:   {session}");
    println!();
    println!("  Type an utterance and press Enter. Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut dialogue = Dialogue::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"  You > ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if utterance == "exit" {
            break;
        }

        match classifier.detect(&session, &mut dialogue, utterance).await {
            Ok(result) => {
                print_result(&result);
                dialogue.push(Message::user(utterance));
                if let Some(reply) = answer_from_context(&classifier, &dialogue, &result, utterance).await {
                    println!("  Reply  > {reply}");
                    dialogue.push(Message::assistant(reply));
                }
            }
            Err(e) => eprintln!("  [Error] {e}"),
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn print_result(result: &Classification) {
    let tag = match &result.outcome {
        Outcome::Cached => "cached",
        Outcome::Classified => "fresh",
        Outcome::Degraded(_) => "degraded",
        Outcome::Passthrough => "passthrough",
    };
    println!("  Intent > {} ({tag})", result.text);
    if let Outcome::Degraded(reason) = &result.outcome {
        println!("           {reason}");
    }
}

/// For context-answer decisions, ask the backend to reply from the dialogue so far.
async fn answer_from_context(
    classifier: &IntentClassifier,
    dialogue: &Dialogue,
    result: &Classification,
    utterance: &str,
) -> Option<String> {
    let decision = result.decision.as_ref()?;
    if classifier.reserved().kind_of(&decision.function_name) != DecisionKind::ContextAnswer {
        return None;
    }

    let context: String = dialogue
        .messages
        .iter()
        .map(|m| format!("{}: {}\n", m.role, m.content))
        .collect();

    match classifier.reply_from_context(&context, utterance).await {
        Ok(reply) => Some(reply),
        Err(e) => {
            eprintln!("  [Error] {e}");
            None
        }
    }
}
