//! Guardian search client: fetch the newest stories for a topic, parse
//! them into [`news::Story`] records and list them in the terminal.
//!
//! The pipeline lives in [`news`]: [`news::fetch()`] issues the request,
//! [`news::parse_stories`] turns the body into stories and
//! [`news::StoryLoader`] runs both off the foreground task.

pub mod config;
pub mod error;
pub mod net;
pub mod news;
pub mod open_url;
pub mod ui;
pub mod util;
