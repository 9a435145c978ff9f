mod fetch;
mod loader;
mod model;
mod parse;

use crate::config::RuntimeConfig;
use crate::net::is_connected;
use crate::open_url::open_url;
use crate::ui::{self, Selection};
use crate::util::sanitize::sanitize_for_terminal;
use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing::{error, info, warn};

pub use fetch::fetch;
pub use loader::{LoadResult, LoaderState, StoryLoader, StorySource};
pub use model::{NO_AUTHOR, Story};
pub use parse::parse_stories;

const NO_CONNECTION: &str = "No internet connection.";
const NO_STORIES: &str = "No stories found.";
const LOADING: &str = "Loading stories...";

// A failed request yields None, an unparseable document an empty list.
pub async fn fetch_story_data(request_url: &str) -> LoadResult {
    let body = match fetch(request_url).await {
        Ok(body) => body,
        Err(err) => {
            error!(error = %err, "problem making the story request");
            String::new()
        }
    };
    match parse_stories(&body) {
        Ok(stories) => {
            if let Some(s) = &stories {
                info!(count = s.len(), "stories parsed");
            }
            stories
        }
        Err(err) => {
            error!(error = %err, "problem parsing the story results");
            Some(Vec::new())
        }
    }
}

pub struct HttpStorySource {
    request_url: Option<String>,
}

impl HttpStorySource {
    pub fn new(request_url: Option<String>) -> Self {
        Self { request_url }
    }
}

#[async_trait]
impl StorySource for HttpStorySource {
    async fn load(&self) -> LoadResult {
        let url = self.request_url.as_deref()?;
        fetch_story_data(url).await
    }
}

pub async fn run(cfg: &RuntimeConfig) -> Result<()> {
    let header = cfg.header.as_deref();
    let request_url = cfg.request_url();

    if !is_connected(&request_url).await {
        warn!("no network connectivity, skipping story load");
        ui::show_message(header, NO_CONNECTION)?;
        return Ok(());
    }

    let mut loader = StoryLoader::new(HttpStorySource::new(Some(request_url)));
    loader.start();
    ui::show_status(header, LOADING);
    let stories = loader.delivered().await.flatten().unwrap_or_default();

    let shown = story_menu(cfg, &stories);
    loader.reset();
    shown
}

fn story_menu(cfg: &RuntimeConfig, stories: &[Story]) -> Result<()> {
    let header = cfg.header.as_deref();
    if stories.is_empty() {
        return ui::show_message(header, NO_STORIES);
    }

    let labels: Vec<String> = stories.iter().map(row_label).collect();
    let prompt = format!("{} - {} stories (q = quit)", cfg.topic, stories.len());
    loop {
        match ui::select(&prompt, &labels, header)? {
            Selection::Leave => break,
            Selection::Open(i) => {
                if let Some(story) = stories.get(i) {
                    if let Err(err) = open_url(story.url(), cfg.open_command.as_deref()) {
                        warn!(error = %err, url = story.url(), "failed to open story");
                    }
                }
            }
        }
    }
    Ok(())
}

fn row_label(story: &Story) -> String {
    format!(
        "{}  [{} | {} | {}]",
        sanitize_for_terminal(story.title()),
        sanitize_for_terminal(story.section()),
        sanitize_for_terminal(story.author()),
        display_date(story.publication_date()),
    )
}

fn display_date(raw: &str) -> String {
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|dt| {
            dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_else(|| sanitize_for_terminal(raw))
}
