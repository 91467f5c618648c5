//! The dialogue state machine: decides, turn by turn, what the bot says
//! next and when a text gets sent off for analysis.

use regex::Regex;

use crate::analysis::AnalysisRequest;

/// Where the confirm-then-collect-text flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    AwaitingConfirmation,
    AwaitingText,
}

/// Everything the bot decided to do in response to one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub messages: Vec<String>,
    pub request: Option<AnalysisRequest>,
}

impl TurnReply {
    fn say(message: &str) -> Self {
        Self {
            messages: vec![message.to_string()],
            request: None,
        }
    }
}

pub const GREETING_SEED: &str =
    "Hello! I'm the Text Analyzer AI. How can I assist you today?";
const GREETING_REPLY: &str =
    "Hello! It's nice to meet you. I'm the Text Analyzer AI. How can I assist you today?";
const ANALYSIS_OFFER: &str =
    "I'm here to help you analyze your text. Would you like to share a text with me for analysis?";
const DETAIL_PROMPT: &str =
    "Great! Please describe your text in as much detail as you can remember.";
const ANALYSIS_ACK: &str =
    "Thank you for sharing your text. I'll analyze it for you now.";
const DECLINE_ACK: &str =
    "Alright. If you'd like to analyze a text later, just let me know.";
pub const CLOSING_LINE: &str =
    "I hope this analysis provides some insight into your text. Is there anything else you'd like to know about the text?";

pub fn failure_message(reason: &str) -> String {
    format!(
        "I apologize, but there was an error analyzing your text: {}",
        reason
    )
}

pub struct DialogueController {
    mode: Mode,
    affirmative: Regex,
}

impl DialogueController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            // Substring match anywhere in the normalized text, so
            // "Sure, why not!" counts as a yes.
            affirmative: Regex::new(r"yes|yeah|sure|okay|ok|yep|yea")
                .expect("affirmative pattern is valid"),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
    }

    /// Consume one user utterance against the current mode. Returns `None`
    /// for blank input (no transition, nothing emitted).
    pub fn handle_utterance(&mut self, text: &str, tts_enabled: bool) -> Option<TurnReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let reply = match self.mode {
            Mode::AwaitingText => {
                self.mode = Mode::Idle;
                TurnReply {
                    messages: vec![ANALYSIS_ACK.to_string()],
                    request: Some(AnalysisRequest {
                        text: text.to_string(),
                        tts_enabled,
                    }),
                }
            }
            Mode::AwaitingConfirmation => {
                if self.affirmative.is_match(&text.to_lowercase()) {
                    self.mode = Mode::AwaitingText;
                    TurnReply::say(DETAIL_PROMPT)
                } else {
                    self.mode = Mode::Idle;
                    TurnReply::say(DECLINE_ACK)
                }
            }
            Mode::Idle => {
                let lower = text.to_lowercase();
                if lower.contains("hello") || lower.contains("hi") {
                    TurnReply::say(GREETING_REPLY)
                } else {
                    // "analyze"/"dream" keywords land here too; the
                    // original treats them identically to the fallback.
                    self.mode = Mode::AwaitingConfirmation;
                    TurnReply::say(ANALYSIS_OFFER)
                }
            }
        };

        Some(reply)
    }
}

impl Default for DialogueController {
    fn default() -> Self {
        Self::new()
    }
}
