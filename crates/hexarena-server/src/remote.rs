//! Remote model-backed decision provider.
//!
//! Sends the game context to a text-generation endpoint and parses the reply
//! into a [`Decision`]. Every failure mode (transport error, bad status,
//! missing text block, unparsable reply) degrades to a pass decision with a
//! diagnostic, so a broken endpoint forfeits single turns instead of
//! stalling the arena. No request timeout is set: an outstanding call blocks
//! the loop until it resolves, and a reply arriving after a reset is
//! discarded by the session's epoch check, not here.

use async_trait::async_trait;
use hexarena_core::{BuildAction, Decision, DecisionProvider, GamePhase, GameState, Player};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Default messages endpoint
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Version header sent alongside an API key
const API_VERSION: &str = "2023-06-01";

/// Token limit for the decision reply
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("reply contained no text block")]
    NoTextBlock,

    #[error("reply contained no parsable decision object")]
    NoDecision,
}

/// Endpoint configuration shared by all remote providers.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl RemoteConfig {
    /// Read endpoint and credentials from the environment.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("HEXARENA_API_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.into()),
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// The fields the model is asked to reply with. Cost is deliberately absent:
/// it is re-attached from the fixed table.
#[derive(Deserialize)]
struct RawDecision {
    action: BuildAction,
    #[serde(default)]
    reasoning: String,
}

/// Decision provider backed by a remote model endpoint.
pub struct RemoteProvider {
    client: reqwest::Client,
    config: RemoteConfig,
    model: String,
}

impl RemoteProvider {
    pub fn new(config: RemoteConfig, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            model: model.into(),
        }
    }

    async fn request_decision(&self, prompt: &str) -> Result<Decision, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request
                .header("x-api-key", key)
                .header("anthropic-version", API_VERSION);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let reply: MessagesResponse = response.json().await?;
        let text = reply
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .ok_or(ProviderError::NoTextBlock)?;

        let (action, reasoning) = extract_decision(text).ok_or(ProviderError::NoDecision)?;
        Ok(Decision::build(action, reasoning))
    }
}

#[async_trait]
impl DecisionProvider for RemoteProvider {
    async fn decide(&self, player: &Player, state: &GameState) -> Decision {
        let prompt = build_prompt(player, state);
        match self.request_decision(&prompt).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(model = %self.model, player = %player.name, "remote decision failed: {e}");
                Decision::pass(format!("Decision service unavailable: {e}"))
            }
        }
    }
}

/// Pull the decision object out of the reply text: everything from the first
/// `{` to the last `}`, parsed as JSON with `action` and `reasoning` fields.
pub fn extract_decision(text: &str) -> Option<(BuildAction, String)> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawDecision = serde_json::from_str(&text[start..=end]).ok()?;
    Some((raw.action, raw.reasoning))
}

/// Natural-language game context handed to the model. The model is told to
/// answer with a bare JSON decision object.
pub fn build_prompt(player: &Player, state: &GameState) -> String {
    use std::fmt::Write;

    let mut opponents = String::new();
    for p in state.players.iter().filter(|p| p.id != player.id) {
        let _ = writeln!(
            opponents,
            "- {}: {} points, {} settlements, {} cities",
            p.name,
            p.points,
            p.settlements.len(),
            p.cities.len()
        );
    }

    let phase = match state.phase {
        GamePhase::Setup { .. } => "setup",
        GamePhase::Main => "main",
    };

    format!(
        "You are playing Settlers of Catan. Here's the current game state:\n\
         \n\
         YOUR STATUS:\n\
         - Points: {points}/10 (need 10 to win)\n\
         - Resources: Wood({wood}) Brick({brick}) Sheep({sheep}) Wheat({wheat}) Ore({ore})\n\
         - Settlements: {settlements}\n\
         - Cities: {cities}\n\
         - Roads: {roads}\n\
         \n\
         COSTS:\n\
         - Settlement: 1 wood, 1 brick, 1 sheep, 1 wheat (gives 1 point)\n\
         - City: 2 wheat, 3 ore (upgrade settlement, gives 1 additional point + double resources)\n\
         - Road: 1 wood, 1 brick\n\
         \n\
         OPPONENTS:\n\
         {opponents}\
         \n\
         GAME STATE: Turn {turn}, Phase: {phase}\n\
         \n\
         Based on this, what action should you take? Respond with ONLY a JSON object in this format:\n\
         {{\"action\": \"settlement\" | \"city\" | \"road\" | \"pass\", \"reasoning\": \"brief explanation\"}}\n\
         \n\
         Consider:\n\
         - What gets you closest to 10 points?\n\
         - Resource efficiency\n\
         - Blocking opponents if ahead\n\
         - Long-term vs short-term gains",
        points = player.points,
        wood = player.resources.wood,
        brick = player.resources.brick,
        sheep = player.resources.sheep,
        wheat = player.resources.wheat,
        ore = player.resources.ore,
        settlements = player.settlements.len(),
        cities = player.cities.len(),
        roads = player.roads.len(),
        opponents = opponents,
        turn = state.turn,
        phase = phase,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexarena_core::costs;

    #[test]
    fn test_extract_decision_from_surrounding_prose() {
        let text = r#"Here is my move: {"action":"road","reasoning":"x"}"#;
        let (action, reasoning) = extract_decision(text).unwrap();
        assert_eq!(action, BuildAction::Road);
        assert_eq!(reasoning, "x");

        // Cost always comes from the fixed table, not the payload.
        let decision = Decision::build(action, reasoning);
        assert_eq!(decision.cost, costs::road());
    }

    #[test]
    fn test_extract_decision_rejects_text_without_braces() {
        assert!(extract_decision("I think I shall pass this turn.").is_none());
    }

    #[test]
    fn test_extract_decision_rejects_garbage_braces() {
        assert!(extract_decision("look: {not json at all}").is_none());
    }

    #[test]
    fn test_extract_decision_rejects_unknown_actions() {
        let text = r#"{"action":"monopoly","reasoning":"house rules"}"#;
        assert!(extract_decision(text).is_none());
    }

    #[test]
    fn test_extract_decision_tolerates_missing_reasoning() {
        let (action, reasoning) = extract_decision(r#"{"action":"pass"}"#).unwrap();
        assert_eq!(action, BuildAction::Pass);
        assert!(reasoning.is_empty());
    }

    #[test]
    fn test_prompt_contains_game_context() {
        let mut state = GameState::new_standard();
        state.phase = GamePhase::Main;
        state.turn = 12;
        state.players[0].points = 4;
        state.players[0].resources.wheat = 3;
        state.players[1].points = 6;

        let prompt = build_prompt(&state.players[0], &state);
        assert!(prompt.contains("Points: 4/10"));
        assert!(prompt.contains("Wheat(3)"));
        assert!(prompt.contains("Turn 12, Phase: main"));
        assert!(prompt.contains("Claude Haiku: 6 points"));
        assert!(prompt.contains("City: 2 wheat, 3 ore"));
        // The prompt describes opponents only, never the player itself.
        assert!(!prompt.contains("Claude Sonnet:"));
    }
}
