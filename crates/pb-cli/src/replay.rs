use std::fs;
use std::path::Path;

use pb_core::{
    AddPatternResponse, Blocklist, BlocklistResponse, MemorySurface, PageContext, RemovePatternResponse,
    RenderSurface, ResultItem, Session, SessionConfig, StoreRequest,
};
use serde::Deserialize;

/// Scripted session: a result page, the store's initial list and a list of
/// user actions and timer ticks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub blocklist: Vec<String>,
    pub results: Vec<ResultItem>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    /// Timer tick
    Pass,
    /// Block control activated; `accepted: false` makes the store reject it
    Block {
        pattern: String,
        #[serde(default = "accepted")]
        accepted: bool,
    },
    /// Unblock control activated
    Unblock {
        pattern: String,
        #[serde(default = "accepted")]
        accepted: bool,
    },
    /// Notification link activated
    Reveal,
    /// Blocklist edited elsewhere, followed by a refresh push
    Refresh { blocklist: Vec<String> },
}

fn accepted() -> bool {
    true
}

pub struct ReplayOptions {
    pub fixture: String,
    pub verbose: bool,
}

pub fn run_replay(opts: ReplayOptions) -> Result<(), String> {
    let content = fs::read_to_string(&opts.fixture)
        .map_err(|e| format!("Failed to read '{}': {}", opts.fixture, e))?;
    let fixture: Fixture = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid fixture '{}': {}", opts.fixture, e))?;

    let mut replay = Replay::new(fixture.page_url.as_deref(), fixture.config, fixture.blocklist, fixture.results);

    let steps = if fixture.steps.is_empty() { vec![Step::Pass] } else { fixture.steps };

    println!(
        "Replaying {} steps over {} results from '{}'",
        steps.len(),
        replay.surface.items().len(),
        Path::new(&opts.fixture).file_name().unwrap_or_default().to_string_lossy()
    );

    for (idx, step) in steps.iter().enumerate() {
        let summary = replay.apply(step)?;
        println!();
        println!("[{}] {}", idx, summary);

        let log = replay.surface.take_log();
        if opts.verbose {
            for mutation in &log {
                let json = serde_json::to_string(mutation)
                    .map_err(|e| format!("Failed to serialize mutation: {}", e))?;
                println!("      {}", json);
            }
        }
        print_results(&replay.surface);
    }

    Ok(())
}

/// Session, surface and a stand-in for the blocklist store.
pub struct Replay {
    pub session: Session,
    pub surface: MemorySurface,
    store: Vec<String>,
}

impl Replay {
    pub fn new(page_url: Option<&str>, config: SessionConfig, blocklist: Vec<String>, results: Vec<ResultItem>) -> Self {
        let page = page_url.map(PageContext::from_url).unwrap_or_default();
        let mut session = Session::new(config, page);
        let store = Blocklist::from_patterns(&blocklist).iter().map(str::to_string).collect::<Vec<_>>();
        session.on_blocklist(BlocklistResponse { blocklist: Some(store.clone()) });

        Self {
            session,
            surface: MemorySurface::with_items(results),
            store,
        }
    }

    /// Apply one step and describe what happened.
    pub fn apply(&mut self, step: &Step) -> Result<String, String> {
        let summary = match step {
            Step::Pass => {
                let report = self.session.reconcile(&mut self.surface);
                if report.skipped {
                    "pass skipped (personalized filtering disabled)".to_string()
                } else {
                    format!(
                        "pass: {} writes, {} hidden, {} unresolved",
                        report.mutations(),
                        report.hidden,
                        report.unresolved
                    )
                }
            }
            Step::Block { pattern, accepted } => {
                let request = self.session.block_request(pattern);
                let response = AddPatternResponse { success: *accepted };
                if *accepted {
                    self.store_add(pattern);
                }
                match self.session.on_pattern_added(pattern, response) {
                    Ok(follow_up) => {
                        self.answer(&follow_up);
                        format!("{} -> accepted", describe(&request)?)
                    }
                    Err(e) => format!("{} -> {}", describe(&request)?, e),
                }
            }
            Step::Unblock { pattern, accepted } => {
                let request = self.session.unblock_request(pattern);
                let response = RemovePatternResponse { success: *accepted, pattern: pattern.clone() };
                if *accepted {
                    self.store_remove(pattern);
                }
                match self.session.on_pattern_removed(response, &mut self.surface) {
                    Ok(follow_up) => {
                        self.answer(&follow_up);
                        format!("{} -> accepted", describe(&request)?)
                    }
                    Err(e) => format!("{} -> {}", describe(&request)?, e),
                }
            }
            Step::Reveal => {
                let revealed = self.session.reveal_hidden(&mut self.surface);
                format!("reveal: {} results shown", revealed)
            }
            Step::Refresh { blocklist } => {
                self.store = blocklist.clone();
                if let Some(request) = self.session.on_host_message(pb_core::HostMessage::Refresh) {
                    self.answer(&request);
                }
                format!("refresh: store now has {} patterns", self.store.len())
            }
        };
        Ok(summary)
    }

    /// Play the store's side of a follow-up request.
    fn answer(&mut self, request: &StoreRequest) {
        if let StoreRequest::GetBlocklist = request {
            self.session.on_blocklist(BlocklistResponse { blocklist: Some(self.store.clone()) });
        }
    }

    fn store_add(&mut self, pattern: &str) {
        if !self.store.iter().any(|p| p == pattern) {
            self.store.push(pattern.to_string());
        }
    }

    fn store_remove(&mut self, pattern: &str) {
        self.store.retain(|p| p != pattern);
    }
}

fn describe(request: &StoreRequest) -> Result<String, String> {
    serde_json::to_string(request).map_err(|e| format!("Failed to serialize request: {}", e))
}

fn print_results(surface: &MemorySurface) {
    for item in surface.items() {
        let control = item
            .control
            .as_ref()
            .map(|c| format!("{} {}", c.kind(), c.pattern()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<5} {:<12} {:<28} {}",
            item.id.to_string(),
            item.state.as_str(),
            control,
            item.link.as_deref().unwrap_or("")
        );
    }
    println!("  notification: {:?}", surface.notification());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::{ItemId, NotificationStatus, ResultState};

    const FIXTURE: &str = r#"{
        "pageUrl": "https://www.google.com/search?q=deals",
        "blocklist": ["spam.org"],
        "results": [
            {"id": 1, "link": "http://shop.example.com/"},
            {"id": 2, "link": "http://www.spam.org/buy"},
            {"id": 3, "link": "/search?q=more", "isBookResult": true}
        ],
        "steps": [
            {"action": "pass"},
            {"action": "block", "pattern": "example.com"},
            {"action": "pass"},
            {"action": "reveal"},
            {"action": "pass"},
            {"action": "unblock", "pattern": "example.com", "accepted": false},
            {"action": "pass"}
        ]
    }"#;

    #[test]
    fn test_replay_fixture() {
        let fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
        let mut replay = Replay::new(fixture.page_url.as_deref(), fixture.config, fixture.blocklist, fixture.results);

        let mut steps = fixture.steps.iter();
        replay.apply(steps.next().unwrap()).unwrap();
        assert_eq!(replay.surface.state(ItemId(2)), ResultState::Hidden);
        assert_eq!(replay.surface.state(ItemId(3)), ResultState::Exempt);

        replay.apply(steps.next().unwrap()).unwrap();
        replay.apply(steps.next().unwrap()).unwrap();
        assert_eq!(replay.surface.state(ItemId(1)), ResultState::Hidden);
        assert_eq!(replay.session.blocklist().len(), 2);

        replay.apply(steps.next().unwrap()).unwrap();
        replay.apply(steps.next().unwrap()).unwrap();
        assert_eq!(replay.surface.state(ItemId(1)), ResultState::HiddenShown);
        assert_eq!(replay.surface.notification(), NotificationStatus::Collapsed);

        let summary = replay.apply(steps.next().unwrap()).unwrap();
        assert!(summary.contains("rejected"));
        replay.apply(steps.next().unwrap()).unwrap();
        assert_eq!(replay.surface.state(ItemId(1)), ResultState::HiddenShown);
    }

    #[test]
    fn test_refresh_step_reloads_store() {
        let results = vec![ResultItem::new(1, "http://shop.example.com/")];
        let mut replay = Replay::new(None, SessionConfig::default(), Vec::new(), results);
        replay.apply(&Step::Pass).unwrap();
        assert_eq!(replay.surface.state(ItemId(1)), ResultState::Unseen);

        replay
            .apply(&Step::Refresh { blocklist: vec!["example.com".into()] })
            .unwrap();
        replay.apply(&Step::Pass).unwrap();
        assert_eq!(replay.surface.state(ItemId(1)), ResultState::Hidden);
    }
}
