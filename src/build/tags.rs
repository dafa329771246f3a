//! Tag index: tag name to the posts carrying it.

use std::collections::HashMap;

use super::content::Post;

/// Posts grouped by tag.
///
/// Buckets appear in the order their tag was first seen, and posts within a
/// bucket keep the order they were given in. Tags are compared exactly as
/// written: `Rust` and `rust` are different tags, and a post listing the same
/// tag twice is added to that bucket twice.
#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    buckets: Vec<(String, Vec<&'a Post>)>,
    lookup: HashMap<String, usize>,
}

impl<'a> TagIndex<'a> {
    pub fn build<I>(posts: I) -> Self
    where
        I: IntoIterator<Item = &'a Post>,
    {
        let mut index = Self::default();
        for post in posts {
            for tag in &post.tags {
                index.insert(tag, post);
            }
        }
        index
    }

    fn insert(&mut self, tag: &str, post: &'a Post) {
        match self.lookup.get(tag) {
            Some(&slot) => self.buckets[slot].1.push(post),
            None => {
                self.lookup.insert(tag.to_string(), self.buckets.len());
                self.buckets.push((tag.to_string(), vec![post]));
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, tag: &str) -> Option<&[&'a Post]> {
        self.lookup
            .get(tag)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// Iterate `(tag, posts)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Post])> {
        self.buckets
            .iter()
            .map(|(tag, posts)| (tag.as_str(), posts.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;

    fn post(slug: &str, tags: &[&str]) -> Post {
        Post {
            title: slug.to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: String::new(),
            slug: slug.to_string(),
            featured_image: None,
            draft: false,
            source: PathBuf::new(),
        }
    }

    fn slugs(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_every_tagged_post_is_indexed() {
        let posts = vec![
            post("a", &["rust", "web"]),
            post("b", &["web"]),
            post("c", &[]),
            post("d", &["rust", "cli", "web"]),
        ];
        let index = TagIndex::build(&posts);

        for p in &posts {
            for tag in &p.tags {
                let bucket = index.get(tag).unwrap();
                assert!(bucket.iter().any(|q| q.slug == p.slug));
            }
        }

        let distinct: HashSet<&String> = posts.iter().flat_map(|p| &p.tags).collect();
        assert_eq!(index.len(), distinct.len());
    }

    #[test]
    fn test_buckets_keep_scan_order() {
        let posts = vec![
            post("b", &["web"]),
            post("a", &["rust", "web"]),
            post("c", &["rust"]),
        ];
        let index = TagIndex::build(&posts);

        let tags: Vec<&str> = index.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["web", "rust"]);
        assert_eq!(slugs(index.get("web").unwrap()), vec!["b", "a"]);
        assert_eq!(slugs(index.get("rust").unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn test_repeated_tag_on_one_post_is_not_deduplicated() {
        let posts = vec![post("a", &["rust", "rust"])];
        let index = TagIndex::build(&posts);

        assert_eq!(index.len(), 1);
        assert_eq!(slugs(index.get("rust").unwrap()), vec!["a", "a"]);
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let posts = vec![post("a", &["Rust"]), post("b", &["rust"])];
        let index = TagIndex::build(&posts);

        assert_eq!(index.len(), 2);
        assert_eq!(slugs(index.get("Rust").unwrap()), vec!["a"]);
        assert!(index.get("RUST").is_none());
    }

    #[test]
    fn test_empty_index() {
        let posts: Vec<Post> = Vec::new();
        let index = TagIndex::build(&posts);
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
    }
}
