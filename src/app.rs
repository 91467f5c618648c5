use std::time::Duration;

use tokio::task::JoinHandle;

use crate::analysis::{AnalysisClient, AnalysisFailure, AnalysisOutcome, AnalysisRequest};
use crate::chat::{ChatEntry, Transcript};
use crate::config::Config;
use crate::dialogue::{DialogueController, TurnReply, GREETING_SEED};
use crate::media::MediaClient;
use crate::render::{self, render_outcome};

/// Delay before the bot's reply appears, so the composing indicator is
/// visible for a beat.
const COMPOSE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Cover,
    Chat,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,

    // Conversation state
    pub controller: DialogueController,
    pub transcript: Transcript,
    pub tts_enabled: bool,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Composing indicator ("Thinking...")
    pub composing: bool,
    pub animation_frame: u8,

    // The bot's reply is held behind a short delay; the analysis call is
    // a second, longer suspension. At most one of each is in flight.
    compose_timer: Option<JoinHandle<()>>,
    pending_reply: Option<TurnReply>,
    analysis_task: Option<JoinHandle<AnalysisOutcome>>,
    pending_tts: bool, // preference captured when the request was issued

    // External collaborators
    analysis: AnalysisClient,
    media: MediaClient,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Cover,

            controller: DialogueController::new(),
            transcript: Transcript::new(),
            tts_enabled: config.tts_enabled(),

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            composing: false,
            animation_frame: 0,

            compose_timer: None,
            pending_reply: None,
            analysis_task: None,
            pending_tts: false,

            analysis: AnalysisClient::new(config.backend_url()),
            media: MediaClient::new(config.backend_url()),
            config,
        }
    }

    /// One-time transition from the landing view to the active chat.
    pub fn enter_chat(&mut self) {
        if self.screen == Screen::Chat {
            return;
        }
        self.screen = Screen::Chat;
        self.transcript.push(ChatEntry::Bot(GREETING_SEED.to_string()));
    }

    /// Clear the transcript and the dialogue state, then re-seed the
    /// greeting. Drops anything still in flight.
    pub fn reset_chat(&mut self) {
        if let Some(timer) = self.compose_timer.take() {
            timer.abort();
        }
        if let Some(task) = self.analysis_task.take() {
            task.abort();
        }
        self.pending_reply = None;
        self.composing = false;
        self.animation_frame = 0;
        self.chat_scroll = 0;

        self.controller.reset();
        self.transcript.clear();
        self.transcript.push(ChatEntry::Bot(GREETING_SEED.to_string()));
    }

    /// Flip the audio-playback preference. Persisting it is best-effort:
    /// the in-memory flip always takes.
    pub fn toggle_tts(&mut self) {
        self.tts_enabled = !self.tts_enabled;
        self.config.tts_enabled = Some(self.tts_enabled);
        let _ = self.config.save();
    }

    /// A turn is still resolving: either the composing delay or an
    /// analysis call. New submissions are ignored until it settles.
    pub fn busy(&self) -> bool {
        self.compose_timer.is_some() || self.analysis_task.is_some()
    }

    /// Submit whatever is in the input box as one user utterance.
    pub fn submit_input(&mut self) {
        if self.busy() {
            return;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            // Whitespace-only submissions are silently ignored
            return;
        }

        let Some(reply) = self.controller.handle_utterance(&text, self.tts_enabled) else {
            return;
        };

        self.transcript.push(ChatEntry::User(text));
        self.input.clear();
        self.input_cursor = 0;

        // Show "Thinking..." and hold the reply behind a fixed delay
        self.composing = true;
        self.animation_frame = 0;
        self.pending_reply = Some(reply);
        self.compose_timer = Some(tokio::spawn(tokio::time::sleep(COMPOSE_DELAY)));

        self.scroll_to_bottom();
    }

    /// Advance the composing animation and resume any finished
    /// suspension. Called on every UI tick.
    pub async fn on_tick(&mut self) {
        if self.composing {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        if self
            .compose_timer
            .as_ref()
            .is_some_and(|timer| timer.is_finished())
        {
            if let Some(timer) = self.compose_timer.take() {
                let _ = timer.await;
            }
            self.finish_composing();
        }

        if self
            .analysis_task
            .as_ref()
            .is_some_and(|task| task.is_finished())
        {
            if let Some(task) = self.analysis_task.take() {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(AnalysisFailure::new(e.to_string())),
                };
                self.apply_outcome(outcome);
            }
        }
    }

    /// The composing delay elapsed: clear the indicator, then append the
    /// held reply. If the turn produced an analysis request, send it off
    /// and keep the indicator up for the call itself.
    fn finish_composing(&mut self) {
        self.composing = false;

        let Some(reply) = self.pending_reply.take() else {
            return;
        };

        for message in reply.messages {
            self.transcript.push(ChatEntry::Bot(message));
        }

        if let Some(request) = reply.request {
            self.spawn_analysis(request);
        }

        self.scroll_to_bottom();
    }

    fn spawn_analysis(&mut self, request: AnalysisRequest) {
        self.pending_tts = request.tts_enabled;
        self.composing = true;
        self.animation_frame = 0;

        let client = self.analysis.clone();
        self.analysis_task = Some(tokio::spawn(async move {
            client.submit(&request).await
        }));
    }

    /// Append the rendered outcome and kick off any media fetches.
    fn apply_outcome(&mut self, outcome: AnalysisOutcome) {
        self.composing = false;

        let rendered = render_outcome(outcome, self.pending_tts);
        for entry in rendered.entries {
            self.transcript.push(entry);
        }

        // Fire-and-forget: the transcript does not wait on media
        if let Some(image_path) = rendered.image_request {
            let media = self.media.clone();
            tokio::spawn(async move {
                let _ = media.fetch_image(&image_path).await;
            });
        }
        if let Some(audio_path) = rendered.audio_request {
            let media = self.media.clone();
            tokio::spawn(async move {
                let _ = media.fetch_audio(&audio_path).await;
            });
        }

        self.scroll_to_bottom();
    }

    /// Scroll the chat viewport so the newest entry (and the composing
    /// indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for entry in self.transcript.entries() {
            total_lines += entry_line_estimate(entry, wrap_width);
        }

        // Room for the "Thinking..." indicator
        total_lines += 2;

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

/// Estimate how many display lines an entry occupies at the given wrap
/// width: a role line, the wrapped content, and a trailing blank.
fn entry_line_estimate(entry: &ChatEntry, wrap_width: usize) -> u16 {
    let content_lines: Vec<String> = match entry {
        ChatEntry::User(text) | ChatEntry::Bot(text) => {
            text.lines().map(str::to_string).collect()
        }
        ChatEntry::Analysis(result) => {
            let mut lines = vec![
                format!("Nouns: {}", render::nouns_line(result)),
                format!("Keywords: {}", render::keywords_line(result)),
                format!("Named entities: {}", render::entities_line(result)),
                format!("Sentiment: {}", render::sentiment_line(result)),
            ];
            if result.image_path.is_some() {
                lines.push(String::new());
            }
            if result.audio_path.is_some() {
                lines.push(String::new());
            }
            lines
        }
    };

    let mut total: u16 = 1; // Role line ("You:" / "Bot:" / "Analysis:")
    for line in &content_lines {
        // Character count, not byte length, for proper UTF-8 handling
        let char_count = line.chars().count();
        if char_count == 0 {
            total += 1;
        } else {
            total += ((char_count / wrap_width) + 1) as u16;
        }
    }
    total + 1 // Blank line after the entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::dialogue::Mode;

    fn test_app() -> App {
        App::new(Config::new())
    }

    fn type_and_submit(app: &mut App, text: &str) {
        app.input = text.to_string();
        app.input_cursor = app.input.chars().count();
        app.submit_input();
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_chat_seeds_greeting_once() {
        let mut app = test_app();
        assert!(app.transcript.is_empty());
        app.enter_chat();
        app.enter_chat();
        assert_eq!(app.transcript.len(), 1);
        assert!(matches!(app.transcript.entries()[0], ChatEntry::Bot(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_submission_is_noop() {
        let mut app = test_app();
        app.enter_chat();
        type_and_submit(&mut app, "   ");
        assert_eq!(app.transcript.len(), 1);
        assert!(!app.busy());
        assert_eq!(app.controller.mode(), Mode::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_while_composing_is_ignored() {
        let mut app = test_app();
        app.enter_chat();
        type_and_submit(&mut app, "hello");
        assert!(app.busy());

        type_and_submit(&mut app, "hello again");
        // Second submission dropped: still just greeting + one user entry
        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.input, "hello again");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_appears_after_compose_delay() {
        let mut app = test_app();
        app.enter_chat();
        type_and_submit(&mut app, "hello");
        assert!(app.composing);
        assert_eq!(app.transcript.len(), 2);

        tokio::time::sleep(COMPOSE_DELAY + Duration::from_millis(100)).await;
        app.on_tick().await;

        assert!(!app.composing);
        assert!(!app.busy());
        assert_eq!(app.transcript.len(), 3);
        assert!(matches!(app.transcript.entries()[2], ChatEntry::Bot(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_twice_restores_preference() {
        let mut app = test_app();
        let original = app.tts_enabled;
        app.toggle_tts();
        assert_eq!(app.tts_enabled, !original);
        app.toggle_tts();
        assert_eq!(app.tts_enabled, original);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_reseeds_single_greeting() {
        let mut app = test_app();
        app.enter_chat();
        type_and_submit(&mut app, "analyze this");
        app.reset_chat();

        assert_eq!(app.transcript.len(), 1);
        assert!(matches!(app.transcript.entries()[0], ChatEntry::Bot(_)));
        assert_eq!(app.controller.mode(), Mode::Idle);
        assert!(!app.busy());
        assert!(!app.composing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_outcome_appends_analysis_and_closing() {
        let mut app = test_app();
        app.enter_chat();
        app.pending_tts = false;

        app.apply_outcome(Ok(AnalysisResult {
            nouns: vec!["fire".to_string()],
            keywords: vec![],
            named_entities: vec![],
            sentiment_score: 0.9,
            sentiment_label: "positive".to_string(),
            image_path: None,
            audio_path: None,
        }));

        assert_eq!(app.transcript.len(), 3);
        assert!(matches!(app.transcript.entries()[1], ChatEntry::Analysis(_)));
        assert!(matches!(app.transcript.entries()[2], ChatEntry::Bot(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_outcome_appends_reason() {
        let mut app = test_app();
        app.enter_chat();

        app.apply_outcome(Err(AnalysisFailure::new("timeout")));

        assert_eq!(app.transcript.len(), 2);
        match &app.transcript.entries()[1] {
            ChatEntry::Bot(text) => assert!(text.contains("timeout")),
            other => panic!("expected bot entry, got {:?}", other),
        }
        // Conversation remains usable
        assert_eq!(app.controller.mode(), Mode::Idle);
        assert!(!app.busy());
    }

    #[test]
    fn test_entry_line_estimate_wraps_long_lines() {
        let entry = ChatEntry::Bot("x".repeat(100));
        // Role line + 3 wrapped lines + trailing blank
        assert_eq!(entry_line_estimate(&entry, 40), 5);
    }
}
