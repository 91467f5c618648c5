//! Turns an analysis outcome into transcript entries plus any media
//! requests. Pure data-in, data-out; the UI and the media client act on
//! whatever comes back.

use crate::analysis::{AnalysisOutcome, AnalysisResult};
use crate::chat::ChatEntry;
use crate::dialogue::{failure_message, CLOSING_LINE};

/// What one analysis outcome turns into.
#[derive(Debug, Default)]
pub struct RenderedOutcome {
    pub entries: Vec<ChatEntry>,
    pub image_request: Option<String>,
    pub audio_request: Option<String>,
}

/// Total over all outcomes: missing media references simply skip the
/// corresponding request, and audio is only requested when the user's
/// playback preference was on.
pub fn render_outcome(outcome: AnalysisOutcome, tts_enabled: bool) -> RenderedOutcome {
    match outcome {
        Ok(result) => {
            let image_request = result.image_path.clone();
            let audio_request = if tts_enabled {
                result.audio_path.clone()
            } else {
                None
            };
            RenderedOutcome {
                entries: vec![
                    ChatEntry::Analysis(result),
                    ChatEntry::Bot(CLOSING_LINE.to_string()),
                ],
                image_request,
                audio_request,
            }
        }
        Err(failure) => RenderedOutcome {
            entries: vec![ChatEntry::Bot(failure_message(&failure.reason))],
            ..Default::default()
        },
    }
}

pub fn nouns_line(result: &AnalysisResult) -> String {
    result.nouns.join(", ")
}

pub fn keywords_line(result: &AnalysisResult) -> String {
    result.keywords.join(", ")
}

pub fn entities_line(result: &AnalysisResult) -> String {
    result
        .named_entities
        .iter()
        .map(|(text, label)| format!("{} ({})", text, label))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn sentiment_line(result: &AnalysisResult) -> String {
    format!("{} ({})", result.sentiment_score, result.sentiment_label)
}
