//! Prompt construction for the narrative generator.
//!
//! Every request embeds the protagonist's own context (name, background,
//! traits, reputation), so cache keys derived from request content never
//! collide across characters.

use std::fmt::Write;

use solterra_domain::{
    Colleague, ContactMethod, DiscoveryTier, MessageTemplate, Protagonist, Stage, WorldState,
};

use crate::infrastructure::ports::{GenerationKind, GenerationRequest};

const SYSTEM_PROMPT: &str = "You are the narrative engine for Solterra, a magical dystopian world \
where the Enhanced Awareness Initiative quietly monitors every citizen and an underground network \
resists it. Keep the tone grounded and tense.";

const CONSEQUENCE_FORMAT: &str = r#"Respond with JSON in exactly this shape:
{
  "immediate": [
    {"type": "reputation|relationship|trait|stat|world_state|story_flag", "target": "name", "value": 0, "description": "what happens"}
  ],
  "delayed": [
    {"type": "event|opportunity|threat", "trigger": "what sets it off", "description": "what happens later", "timeline": "when"}
  ],
  "narrative": "2-3 sentences in second person, present tense."
}"#;

/// What the player just did, for consequence prompts.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceContext<'a> {
    pub stage: Stage,
    pub choice_type: &'a str,
    pub choice_value: &'a str,
}

pub fn consequence_request(
    protagonist: &Protagonist,
    world: &WorldState,
    choice: ChoiceContext<'_>,
) -> GenerationRequest {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "SCENE: {} ({})", choice.stage.title(), choice.stage.description());
    push_protagonist(&mut prompt, protagonist);
    push_world(&mut prompt, world);
    let _ = writeln!(
        prompt,
        "\nPLAYER CHOICE:\n- Type: {}\n- Value: {}",
        choice.choice_type, choice.choice_value
    );
    let _ = write!(prompt, "\n{CONSEQUENCE_FORMAT}");

    tracing::debug!(
        character_id = %protagonist.id,
        choice_type = choice.choice_type,
        "Built consequence prompt"
    );
    consequences(prompt)
}

pub fn discovery_request(
    protagonist: &Protagonist,
    world: &WorldState,
    tier: DiscoveryTier,
) -> GenerationRequest {
    let policy = tier.policy();
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "SCENE: {} - the protagonist investigates the anomalous routing at {} depth.",
        Stage::TechnicalInvestigation.title(),
        tier
    );
    push_protagonist(&mut prompt, protagonist);
    push_world(&mut prompt, world);
    let _ = writeln!(
        prompt,
        "\nDISCOVERY:\n- Depth: {}\n- Risk: {:?}\n- Security alert raised: {}\n- Investigation opened: {}\n- Investigation window: {}h\n- Evidence left behind: {}\n- Underground knowledge: {}\n- Learned: {}",
        tier,
        policy.risk,
        policy.security_alert_raised,
        policy.investigation_triggered,
        policy.investigation_window_hours,
        policy.evidence_left,
        policy.underground_knowledge,
        tier.knowledge_flags()
            .iter()
            .map(|f| format!("{f:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let _ = write!(
        prompt,
        "\nDo not grant knowledge stats; they are handled separately.\n{CONSEQUENCE_FORMAT}"
    );
    consequences(prompt)
}

pub fn response_request(
    protagonist: &Protagonist,
    world: &WorldState,
    method: ContactMethod,
    response_key: &str,
) -> GenerationRequest {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "SCENE: {} - the protagonist answers an underground contact reached {}.",
        Stage::BlackmailerContact.title(),
        method
    );
    push_protagonist(&mut prompt, protagonist);
    push_world(&mut prompt, world);
    let _ = writeln!(prompt, "\nREPLY CHOSEN: {response_key}");
    let _ = write!(prompt, "\n{CONSEQUENCE_FORMAT}");
    consequences(prompt)
}

/// Request for the contact's opening message, in the background's voice.
pub fn contact_message_request(
    protagonist: &Protagonist,
    method: ContactMethod,
    template: &MessageTemplate,
) -> GenerationRequest {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "An underground contact reaches the protagonist {} ({}, timing: {}). Tone: {}.",
        method,
        method.location(),
        method.timing(),
        method.tone()
    );
    push_protagonist(&mut prompt, protagonist);
    let _ = writeln!(
        prompt,
        "\nThey know: {}.\nBase the message on this draft:\n{}",
        method.knowledge_demonstrated(),
        template.render()
    );
    let _ = write!(prompt, "\nWrite only the message itself, 2-4 sentences, plain text.");
    dialogue(prompt)
}

pub fn colleague_request(
    protagonist: &Protagonist,
    colleague: &Colleague,
    interaction: &str,
    standing: i32,
) -> GenerationRequest {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "NPC:\n- Name: {}\n- Role: {}\n- Personality: {}\n- Background: {}\n- Standing with protagonist: {}",
        colleague.name,
        colleague.role,
        colleague.personality.join(", "),
        colleague.background,
        standing
    );
    push_protagonist(&mut prompt, protagonist);
    let _ = writeln!(
        prompt,
        "\nINTERACTION: {interaction}\nExample line: \"{}\"",
        colleague.canned_line(interaction)
    );
    let _ = write!(
        prompt,
        "\nWrite what {} says next. Natural speech, 2-4 sentences, no formatting.",
        colleague.name
    );

    tracing::debug!(
        character_id = %protagonist.id,
        colleague = colleague.name,
        interaction,
        "Built dialogue prompt"
    );
    dialogue(prompt)
}

fn push_protagonist(prompt: &mut String, protagonist: &Protagonist) {
    let background = protagonist
        .background
        .map(|b| b.display_name())
        .unwrap_or("Undetermined");
    let traits: Vec<&str> = protagonist.traits.iter().map(String::as_str).collect();
    let reputation: Vec<String> = protagonist
        .reputation
        .iter()
        .map(|(region, value)| format!("{}: {}", region.display_name(), value))
        .collect();

    let _ = writeln!(
        prompt,
        "\nPROTAGONIST:\n- Name: {}\n- Background: {}\n- Class: {}\n- Region: {}\n- Traits: {}\n- Reputation: {}",
        protagonist.name,
        background,
        protagonist.social_class,
        protagonist.region.display_name(),
        if traits.is_empty() { "none".to_string() } else { traits.join(", ") },
        reputation.join(", ")
    );
}

fn push_world(prompt: &mut String, world: &WorldState) {
    let _ = writeln!(
        prompt,
        "\nWORLD:\n- Surveillance influence: {}\n- Recent events: {}",
        world.surveillance_influence,
        world.global_events.len()
    );
}

fn consequences(prompt: String) -> GenerationRequest {
    GenerationRequest {
        kind: GenerationKind::Consequences,
        system_prompt: SYSTEM_PROMPT.to_string(),
        prompt,
    }
}

fn dialogue(prompt: String) -> GenerationRequest {
    GenerationRequest {
        kind: GenerationKind::Dialogue,
        system_prompt: SYSTEM_PROMPT.to_string(),
        prompt,
    }
}
