//! Prompt assembly: pure functions, no side effects.
//!
//! The system prompt is built from three parts:
//!
//! 1. **Instruction header**: output format, disambiguation rules in
//!    priority order, worked examples
//! 2. **Functions section**: one block per action in catalog order
//! 3. **Context blocks**: optional domain catalogs appended afterwards
//!    with [`compose_context`]
//!
//! The user prompt is a windowed rendering of the dialogue plus the new
//! utterance.
//!
//! Given the same catalog (same order) and reserved names, every function
//! here returns the same text.

use voxintent_core::action::ActionDescriptor;
use voxintent_core::intent::ReservedActions;
use voxintent_core::message::{Dialogue, Role};

const OUTPUT_FORMAT: &str = r#"Output format: exactly one JSON object of the shape {"function_call": {"name": "<function name>", "arguments": {...}}} and no other text."#;

const FINAL_WARNING: &str = "[FINAL WARNING] Never output natural language, emoji or explanations. Output valid JSON only, anything else breaks the system!";

/// Instruction appended to the user's words when asking for a context reply.
pub const CONTEXT_REPLY_INSTRUCTION: &str = "Using the content above, reply to the user the way a person would speak: keep it short and return the reply directly. The user now says: ";

/// Render the full system prompt for an action catalog.
pub fn build_system_prompt(actions: &[ActionDescriptor], reserved: &ReservedActions) -> String {
    let ctx = &reserved.context_answer;
    let cont = &reserved.continue_chat;
    let exit = &reserved.exit;

    let mut prompt = String::new();
    prompt.push_str(
        "You are an intent recognition assistant. Reply with JSON only; natural language replies are forbidden!\n\n",
    );
    prompt.push_str(OUTPUT_FORMAT);
    prompt.push_str("\n\n");

    prompt.push_str("[CORE RULES] (apply in this order)\n");
    prompt.push_str(&format!(
        "1. Basic information queries (time / date / lunar calendar / city) → {ctx}\n"
    ));
    prompt.push_str(&format!(
        "2. System status feedback (about to arrive / arrived / in progress / sorry, X is not registered / OK, doing X) → {cont}\n"
    ));
    prompt.push_str(&format!(
        "3. Questions about exiting (how do I exit? why did it exit?) → {cont}\n"
    ));
    prompt.push_str(&format!(
        "4. Explicit exit commands (exit the system / end the conversation / I don't want to talk anymore) → {exit}\n"
    ));
    prompt.push_str(
        "5. Smart home devices: match on the names in the device list and accept synonyms \
         (bathroom = toilet = restroom, living room = lounge, bedroom = room, study = workroom, kitchen = galley)\n",
    );
    prompt.push_str(&format!("6. Anything else without a matching function → {cont}\n\n"));

    prompt.push_str(&render_functions(actions));
    prompt.push('\n');

    prompt.push_str("Examples:\n");
    let examples = [
        ("User", "What time is it?", envelope(ctx, None)),
        (
            "User",
            "I want to end the conversation",
            envelope(exit, Some(r#"{"say_goodbye": "goodbye"}"#)),
        ),
        ("User", "Hello there", envelope(cont, None)),
        (
            "User",
            "Turn on the toilet light",
            envelope(
                "hass_set_state",
                Some(r#"{"entity_id": "light.bathroom", "state": "on"}"#),
            ),
        ),
        (
            "User",
            "Take me to the workshop",
            envelope(
                "navigate_to",
                Some(r#"{"destination": "workshop", "is_user_input": true}"#),
            ),
        ),
        ("Status notice", "About to arrive at the workshop", envelope(cont, None)),
        ("Status notice", "Arrived at the workshop", envelope(cont, None)),
        (
            "Status notice",
            "OK, navigating to the workshop for you, please wait.",
            envelope(cont, None),
        ),
        (
            "Error feedback",
            "Sorry, that place has not been registered in the system yet.",
            envelope(cont, None),
        ),
    ];
    for (speaker, text, answer) in examples {
        prompt.push_str(&format!("```\n{speaker}: {text}\nReturn: {answer}\n```\n"));
    }
    prompt.push('\n');

    prompt.push_str("Notes:\n");
    prompt.push_str("1. Return JSON only, without any other text\n");
    prompt.push_str(&format!(
        "2. First check whether the user asks for basic information (time, date, ...); if so return {} with no arguments\n",
        envelope(ctx, None)
    ));
    prompt.push_str(&format!(
        "3. Status notices from the robot (\"about to arrive\", \"arrived\", \"in progress\") return {}\n",
        envelope(cont, None)
    ));
    prompt.push_str(&format!(
        "4. Error feedback from the robot (\"sorry, X is not registered\", \"please confirm\") return {}\n",
        envelope(cont, None)
    ));
    prompt.push_str(&format!(
        "5. If no function matches, return {}\n",
        envelope(cont, None)
    ));
    prompt.push_str("6. Make sure the JSON is well-formed and contains every required field\n");
    prompt.push_str(&format!(
        "7. {ctx} takes no arguments; the answer is taken from the conversation context\n"
    ));
    prompt.push_str(&format!(
        "8. Tell user requests (\"take me to X\") apart from system feedback (\"about to arrive at X\", \"sorry, X is not registered\"): the former calls a function, the latter returns {cont}\n"
    ));
    prompt.push_str(
        "9. Sentences starting with \"sorry\", \"later\", \"I suggest\", \"I need to first\" or \"right away\" are usually system feedback, not user commands\n",
    );
    prompt.push_str(FINAL_WARNING);

    prompt
}

/// Render the functions section. An empty catalog renders only the heading.
pub fn render_functions(actions: &[ActionDescriptor]) -> String {
    let mut out = String::from("Available functions:\n");
    for action in actions {
        out.push_str(&format!("\nFunction: {}\n", action.name));
        out.push_str(&format!("Description: {}\n", action.description));
        if !action.parameters.is_empty() {
            out.push_str("Parameters:\n");
            for param in &action.parameters {
                out.push_str(&format!(
                    "- {} ({}): {}\n",
                    param.name, param.kind, param.description
                ));
            }
        }
        out.push_str("---\n");
    }
    out
}

fn envelope(name: &str, arguments: Option<&str>) -> String {
    match arguments {
        Some(args) => format!(r#"{{"function_call": {{"name": "{name}", "arguments": {args}}}}}"#),
        None => format!(r#"{{"function_call": {{"name": "{name}"}}}}"#),
    }
}

/// Render the user prompt: the last `window` turns, then the new utterance.
///
/// A window larger than the history is clipped; an empty history yields the
/// utterance line only.
pub fn build_user_prompt(dialogue: &Dialogue, utterance: &str, window: usize) -> String {
    let mut out = String::from("current dialogue:\n");
    for msg in dialogue.recent(window) {
        out.push_str(&format!("{}: {}\n", msg.role, msg.content));
    }
    out.push_str(&format!("{}: {}\n", Role::User, utterance));
    out
}

/// Append opaque context blocks to a base prompt, in order.
pub fn compose_context(base: &str, extras: &[String]) -> String {
    let mut out = String::from(base);
    for extra in extras {
        out.push('\n');
        out.push_str(extra);
    }
    out
}

/// Render the media catalog block, or `None` for an empty catalog.
pub fn render_music_block(titles: &[String]) -> Option<String> {
    if titles.is_empty() {
        return None;
    }
    Some(format!("<musicNames>\n{}\n</musicNames>", titles.join("\n")))
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Render the device catalog block, or `None` for an empty catalog.
pub fn render_device_block(devices: &[String]) -> Option<String> {
    if devices.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n[SMART HOME DEVICE LIST]\n");
    out.push_str(RULE);
    out.push_str("\n\nFormat: location,device name,entity_id\n\n");
    out.push_str("[IMPORTANT] Device name matching:\n");
    out.push_str("1. Match the location or device name the user says against the names in the list below\n");
    out.push_str("2. Never translate the user's words into another language before matching\n");
    out.push_str("   e.g. if the user says \"toilet\", do not rewrite it as \"WC\" unless the list uses that name\n");
    out.push_str("3. Synonyms are accepted:\n");
    out.push_str("   - bathroom ≈ toilet ≈ restroom ≈ WC\n");
    out.push_str("   - living room ≈ lounge ≈ sitting room\n");
    out.push_str("   - bedroom ≈ room ≈ sleeping room\n");
    out.push_str("4. Fuzzy matches are accepted:\n");
    out.push_str("   - \"the bathroom's light\" → matches \"Bathroom,Light\"\n");
    out.push_str("   - \"living room desk lamp\" → matches \"Living room,Desk lamp\"\n");
    out.push_str("   - \"turn on the toilet light\" → matches \"Bathroom,Light\"\n\n");
    out.push_str("Devices:\n");
    for device in devices {
        out.push_str(device);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    Some(out)
}
