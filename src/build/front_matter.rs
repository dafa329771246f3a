//! Front matter splitting and decoding.
//!
//! A content file looks like:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-09-12
//! ---
//! Markdown body
//! ```
//!
//! Exactly two delimiter lines are accepted. Anything before the opening
//! delimiter other than whitespace, or a third delimiter anywhere in the
//! file, makes the file malformed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Long date form, e.g. `September 12, 2024 09:30`.
pub const LONG_DATE_FORMAT: &str = "%B %d, %Y %H:%M";

/// Same as [`LONG_DATE_FORMAT`] but without day padding, used when writing.
pub const LONG_DATE_OUTPUT_FORMAT: &str = "%B %-d, %Y %H:%M";

/// Short date form, e.g. `2024-09-12`.
pub const SHORT_DATE_FORMAT: &str = "%Y-%m-%d";

const DELIMITER: &str = "---";

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("malformed front matter: expected 2 '---' delimiter lines, found {found}")]
    Malformed { found: usize },

    #[error("malformed front matter: unexpected content before the opening '---'")]
    LeadingContent,

    #[error("failed to decode front matter: {0}")]
    MetadataDecode(#[from] serde_yaml::Error),

    #[error("invalid date {0:?}: expected \"January 2, 2006 15:04\" or \"2006-01-02\"")]
    InvalidDate(String),
}

impl FrontMatterError {
    /// True for the delimiter-shape failures.
    #[cfg(test)]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::LeadingContent)
    }
}

// =============================================================================
// Metadata records
// =============================================================================

/// Front matter of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unparsed; see [`parse_date`].
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
}

/// Front matter of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

// =============================================================================
// Parsing
// =============================================================================

/// The two halves of a content file, borrowed from the input.
#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    pub metadata: &'a str,
    pub body: &'a str,
}

/// Split a file into its metadata block and body.
///
/// The body starts right after the closing `---` and is returned untouched,
/// including the line break that ends the delimiter line.
pub fn split(input: &str) -> Result<Split<'_>, FrontMatterError> {
    // (start of line, end of line content without the line break)
    let mut delimiters: Vec<(usize, usize)> = Vec::with_capacity(2);
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        if line.trim() == DELIMITER {
            let content_len = line.trim_end_matches(['\n', '\r']).len();
            delimiters.push((offset, offset + content_len));
        }
        offset += line.len();
    }

    let &[(open_start, open_end), (close_start, close_end)] = delimiters.as_slice() else {
        return Err(FrontMatterError::Malformed {
            found: delimiters.len(),
        });
    };

    if !input[..open_start].trim().is_empty() {
        return Err(FrontMatterError::LeadingContent);
    }

    Ok(Split {
        metadata: &input[open_end..close_start],
        body: &input[close_end..],
    })
}

/// Split a file and decode its metadata block into `T`.
pub fn parse<T: DeserializeOwned>(input: &str) -> Result<(T, &str), FrontMatterError> {
    let Split { metadata, body } = split(input)?;
    let meta = serde_yaml::from_str(metadata)?;
    Ok((meta, body))
}

/// Parse a front matter date.
///
/// The long form is tried first, then `YYYY-MM-DD` (which yields midnight).
/// Dates carry no zone; they are naive local times.
pub fn parse_date(input: &str) -> Result<NaiveDateTime, FrontMatterError> {
    let input = input.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, LONG_DATE_FORMAT) {
        return Ok(datetime);
    }
    NaiveDate::parse_from_str(input, SHORT_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| FrontMatterError::InvalidDate(input.to_string()))
}

/// Format a date in the long form accepted by [`parse_date`].
pub fn format_long_date(datetime: &NaiveDateTime) -> String {
    datetime.format(LONG_DATE_OUTPUT_FORMAT).to_string()
}

/// Serialize metadata into a delimited front matter block.
pub fn render_front_matter<T: Serialize>(meta: &T) -> Result<String, FrontMatterError> {
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "---\ntitle: \"Hello\"\ndate: 2024-09-12\ntags: [rust, web]\n---\n\nYour content here.\n";

    #[test]
    fn test_split_returns_body_unchanged() {
        let split = split(POST).unwrap();
        assert_eq!(
            split.metadata,
            "\ntitle: \"Hello\"\ndate: 2024-09-12\ntags: [rust, web]\n"
        );
        assert_eq!(split.body, "\n\nYour content here.\n");
    }

    #[test]
    fn test_parse_post_meta() {
        let (meta, body): (PostMeta, _) = parse(POST).unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.date, "2024-09-12");
        assert_eq!(meta.tags, vec!["rust", "web"]);
        assert_eq!(meta.description, None);
        assert!(!meta.draft);
        assert!(body.contains("Your content here."));
    }

    #[test]
    fn test_crlf_delimiters() {
        let input = "---\r\ntitle: Hi\r\ndate: 2024-01-01\r\n---\r\nBody\r\n";
        let (meta, body): (PostMeta, _) = parse(input).unwrap();
        assert_eq!(meta.title, "Hi");
        assert_eq!(body, "\r\nBody\r\n");
    }

    #[test]
    fn test_leading_whitespace_is_allowed() {
        let input = "\n  \n---\ntitle: Hi\ndate: 2024-01-01\n---\nBody";
        let (meta, _): (PostMeta, _) = parse(input).unwrap();
        assert_eq!(meta.title, "Hi");
    }

    #[test]
    fn test_wrong_delimiter_count_is_malformed() {
        let cases = [
            "no front matter at all",
            "---\ntitle: Hi\n",
            "---\ntitle: Hi\n---\nbody\n---\nmore",
            "---\n---\n---\n---\n",
        ];
        for input in cases {
            let err = split(input).unwrap_err();
            assert!(err.is_malformed(), "{input:?} gave {err}");
            // Never a partial decode either
            assert!(parse::<PostMeta>(input).unwrap_err().is_malformed());
        }
    }

    #[test]
    fn test_content_before_opening_delimiter_is_malformed() {
        let input = "oops\n---\ntitle: Hi\n---\nbody";
        assert!(matches!(
            split(input),
            Err(FrontMatterError::LeadingContent)
        ));
    }

    #[test]
    fn test_metadata_decode_error() {
        let missing_title = "---\ndate: 2024-01-01\n---\nbody";
        assert!(matches!(
            parse::<PostMeta>(missing_title),
            Err(FrontMatterError::MetadataDecode(_))
        ));

        let bad_yaml = "---\ntitle: [unclosed\n---\nbody";
        assert!(matches!(
            parse::<PostMeta>(bad_yaml),
            Err(FrontMatterError::MetadataDecode(_))
        ));
    }

    #[test]
    fn test_date_fallback() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 12).unwrap();

        let short = parse_date("2024-09-12").unwrap();
        assert_eq!(short.date(), expected);

        let long = parse_date("September 12, 2024 00:00").unwrap();
        assert_eq!(long.date(), expected);
        assert_eq!(long, short);

        assert!(matches!(
            parse_date("12/09/2024"),
            Err(FrontMatterError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_long_date_keeps_time() {
        let parsed = parse_date("March 3, 2023 14:05").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2023-03-03 14:05");
        assert_eq!(format_long_date(&parsed), "March 3, 2023 14:05");
    }

    #[test]
    fn test_render_front_matter_round_trip() {
        let meta = PostMeta {
            title: "Colons: and \"quotes\"".to_string(),
            description: Some("A description".to_string()),
            date: "September 12, 2024 09:30".to_string(),
            tags: vec!["rust".to_string(), "rust".to_string(), "yaml".to_string()],
            featured_image: None,
            draft: true,
        };

        let rendered = render_front_matter(&meta).unwrap();
        let file = format!("{rendered}\nBody text\n");
        let (parsed, body): (PostMeta, _) = parse(&file).unwrap();

        assert_eq!(parsed, meta);
        assert_eq!(body, "\n\nBody text\n");
    }

    #[test]
    fn test_page_meta_optional_fields() {
        let input = "---\ntitle: About\nfeatured_image: /images/me.png\n---\n# About";
        let (meta, _): (PageMeta, _) = parse(input).unwrap();
        assert_eq!(meta.title, "About");
        assert_eq!(meta.date, None);
        assert_eq!(meta.featured_image.as_deref(), Some("/images/me.png"));
    }
}
