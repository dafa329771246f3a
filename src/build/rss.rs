//! RSS 2.0 feed generation.

use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use rss::validation::Validate;
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use super::paths::absolute_url;
use crate::config::SiteConfig;

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("rss validation failed: {0}")]
    Invalid(String),
}

/// Feed under construction. Items keep the order they are pushed in.
pub struct RssFeed<'a> {
    site: &'a SiteConfig,
    items: Vec<Item>,
}

impl<'a> RssFeed<'a> {
    pub fn new(site: &'a SiteConfig) -> Self {
        Self {
            site,
            items: Vec::new(),
        }
    }

    /// Add a post. `content` goes into the description verbatim.
    pub fn push(&mut self, title: &str, url_path: &str, date: &NaiveDateTime, content: &str) {
        let link = absolute_url(&self.site.base_url, url_path);
        self.items.push(
            ItemBuilder::default()
                .title(title.to_string())
                .link(Some(link.clone()))
                .guid(GuidBuilder::default().permalink(true).value(link).build())
                .description(content.to_string())
                .pub_date(pub_date(date))
                .build(),
        );
    }

    pub fn into_xml(self) -> Result<String, FeedError> {
        let channel = ChannelBuilder::default()
            .title(self.site.title.clone())
            .link(self.site.base_url.clone())
            .description(self.site.description.clone())
            .language(self.site.language.clone())
            .generator("likho".to_string())
            .items(self.items)
            .build();

        channel
            .validate()
            .map_err(|e| FeedError::Invalid(e.to_string()))?;
        Ok(channel.to_string())
    }
}

/// RFC 2822 date with a numeric zone.
///
/// Post dates are naive local times; a local time that does not exist (DST
/// gap) is emitted as UTC instead.
fn pub_date(date: &NaiveDateTime) -> String {
    match Local.from_local_datetime(date).earliest() {
        Some(local) => local.to_rfc2822(),
        None => Utc.from_utc_datetime(date).to_rfc2822(),
    }
}
