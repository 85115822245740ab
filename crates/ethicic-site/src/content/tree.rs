//! Adjacency-list page tree with per-save revisions and a draft/publish
//! lifecycle.
//!
//! Invariants enforced here:
//! - exactly one root, whose slug is empty and which serves `/`;
//! - slugs are unique among siblings (collisions get a `-<n>` suffix);
//! - placement constraints from [`PageKind::allowed_parents`] hold for every
//!   node;
//! - deletion cascades to descendants.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blocks::{self, BlockError};
use super::fields::PageBody;
use super::kind::PageKind;

/// Identifier shared by the envelope and every per-type attribute record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PageId(pub u64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of a page's editable fields, created on each save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub seq: u32,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub body: PageBody,
}

/// One node of the page tree: common envelope plus the typed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: PageId,
    pub parent: Option<PageId>,
    pub slug: String,
    pub title: String,
    pub depth: u32,
    pub live: bool,
    pub first_published_at: Option<DateTime<Utc>>,
    pub latest_revision_at: Option<DateTime<Utc>>,
    /// Index into `revisions` of the currently published snapshot.
    pub published_revision: Option<u32>,
    pub revisions: Vec<Revision>,
    pub body: PageBody,
    children: Vec<PageId>,
}

impl PageNode {
    pub fn kind(&self) -> PageKind {
        self.body.kind()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("page {id} not found")]
    NotFound { id: PageId },
    #[error("the tree already has a root page")]
    RootExists,
    #[error("a {child} page cannot live under a {parent} page")]
    Placement { child: &'static str, parent: &'static str },
    #[error("cannot change the type of page {id} from {from} to {to}")]
    KindChange {
        id: PageId,
        from: &'static str,
        to: &'static str,
    },
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// The whole site content tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageTree {
    nodes: BTreeMap<u64, PageNode>,
    root: Option<PageId>,
    next_id: u64,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<PageId> {
        self.root
    }

    pub fn node(&self, id: PageId) -> Option<&PageNode> {
        self.nodes.get(&id.0)
    }

    fn node_mut(&mut self, id: PageId) -> Result<&mut PageNode, TreeError> {
        self.nodes.get_mut(&id.0).ok_or(TreeError::NotFound { id })
    }

    /// Create the single site root. Its slug is empty and it serves `/`.
    pub fn create_root(&mut self, title: &str, body: PageBody) -> Result<PageId, TreeError> {
        if self.root.is_some() {
            return Err(TreeError::RootExists);
        }
        let id = self.allocate();
        let node = PageNode {
            id,
            parent: None,
            slug: String::new(),
            title: title.to_string(),
            depth: 0,
            live: true,
            first_published_at: Some(Utc::now()),
            latest_revision_at: Some(Utc::now()),
            published_revision: Some(0),
            revisions: vec![Revision {
                seq: 0,
                created_at: Utc::now(),
                title: title.to_string(),
                body: body.clone(),
            }],
            body,
            children: Vec::new(),
        };
        self.nodes.insert(id.0, node);
        self.root = Some(id);
        Ok(id)
    }

    /// Create a draft page under `parent`, with a sibling-unique slug derived
    /// from the title.
    pub fn add_child(
        &mut self,
        parent: PageId,
        title: &str,
        body: PageBody,
    ) -> Result<PageId, TreeError> {
        self.add_child_with_slug(parent, title, &slugify(title), body)
    }

    /// Create a draft page under `parent` with an explicit preferred slug
    /// (imports carry legacy slugs). Collisions get a `-<n>` suffix.
    pub fn add_child_with_slug(
        &mut self,
        parent: PageId,
        title: &str,
        slug: &str,
        body: PageBody,
    ) -> Result<PageId, TreeError> {
        let parent_node = self
            .node(parent)
            .ok_or(TreeError::NotFound { id: parent })?;
        let child_kind = body.kind();
        if let Some(allowed) = child_kind.allowed_parents() {
            if !allowed.contains(&parent_node.kind()) {
                return Err(TreeError::Placement {
                    child: child_kind.label(),
                    parent: parent_node.kind().label(),
                });
            }
        }
        if let PageBody::BlogPost(post) = &body {
            blocks::validate_blocks(&post.content)?;
        }

        let depth = parent_node.depth + 1;
        let slug = self.unique_slug(parent, slug);
        let id = self.allocate();
        let title = truncate_title(title);
        let mut body = body;
        derive_on_save(&mut body);
        let node = PageNode {
            id,
            parent: Some(parent),
            slug,
            title: title.clone(),
            depth,
            live: false,
            first_published_at: None,
            latest_revision_at: Some(Utc::now()),
            published_revision: None,
            revisions: vec![Revision {
                seq: 0,
                created_at: Utc::now(),
                title,
                body: body.clone(),
            }],
            body,
            children: Vec::new(),
        };
        self.nodes.insert(id.0, node);
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Save new editable fields, pushing a revision. The page type cannot
    /// change across saves.
    pub fn save(&mut self, id: PageId, title: &str, body: PageBody) -> Result<(), TreeError> {
        let current_kind = self.node(id).ok_or(TreeError::NotFound { id })?.kind();
        if current_kind != body.kind() {
            return Err(TreeError::KindChange {
                id,
                from: current_kind.label(),
                to: body.kind().label(),
            });
        }
        if let PageBody::BlogPost(post) = &body {
            blocks::validate_blocks(&post.content)?;
        }

        let mut body = body;
        derive_on_save(&mut body);
        let title = truncate_title(title);
        let node = self.node_mut(id)?;
        let seq = node.revisions.len() as u32;
        node.revisions.push(Revision {
            seq,
            created_at: Utc::now(),
            title: title.clone(),
            body: body.clone(),
        });
        node.title = title;
        node.body = body;
        node.latest_revision_at = Some(Utc::now());
        Ok(())
    }

    /// Publish the latest revision: the published pointer moves atomically and
    /// the page goes live. First publication stamps `first_published_at`.
    pub fn publish(&mut self, id: PageId) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.published_revision = Some(node.revisions.len().saturating_sub(1) as u32);
        node.live = true;
        if node.first_published_at.is_none() {
            node.first_published_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Bulk flip of the live flag for every descendant of `parent`; used by
    /// import jobs that create records as drafts first.
    pub fn publish_descendants(&mut self, parent: PageId) -> Result<usize, TreeError> {
        let ids = self.descendant_ids(parent);
        let count = ids.len();
        for id in ids {
            self.publish(id)?;
        }
        Ok(count)
    }

    /// Delete a page and, cascading, all of its descendants. Returns the
    /// number of pages removed.
    pub fn delete(&mut self, id: PageId) -> Result<usize, TreeError> {
        let node = self.node(id).ok_or(TreeError::NotFound { id })?;
        let parent = node.parent;
        let mut doomed = self.descendant_ids(id);
        doomed.push(id);
        let count = doomed.len();
        for victim in doomed {
            self.nodes.remove(&victim.0);
        }
        match parent {
            Some(parent) => {
                self.node_mut(parent)?.children.retain(|child| *child != id);
            }
            None => self.root = None,
        }
        Ok(count)
    }

    /// Children in sibling order.
    pub fn children(&self, id: PageId) -> Vec<&PageNode> {
        self.node(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.node(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn descendant_ids(&self, id: PageId) -> Vec<PageId> {
        let mut out = Vec::new();
        let mut stack: Vec<PageId> = self
            .node(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().copied());
            }
            out.push(next);
        }
        out
    }

    /// Every page of the given kind, in id order.
    pub fn pages_of_kind(&self, kind: PageKind) -> Vec<&PageNode> {
        self.nodes
            .values()
            .filter(|node| node.kind() == kind)
            .collect()
    }

    /// First page of the given kind, if any.
    pub fn find_first(&self, kind: PageKind) -> Option<&PageNode> {
        self.nodes.values().find(|node| node.kind() == kind)
    }

    /// Slug-concatenated URL path, `/` for the root.
    pub fn url_path(&self, id: PageId) -> Option<String> {
        let mut segments = Vec::new();
        let mut cursor = self.node(id)?;
        loop {
            match cursor.parent {
                Some(parent) => {
                    segments.push(cursor.slug.clone());
                    cursor = self.node(parent)?;
                }
                None => break,
            }
        }
        if segments.is_empty() {
            return Some("/".to_string());
        }
        segments.reverse();
        Some(format!("/{}/", segments.join("/")))
    }

    /// Resolve a URL path to a page id. Trailing slashes are ignored.
    pub fn resolve(&self, path: &str) -> Option<PageId> {
        match self.resolve_prefix(path) {
            Some((id, remainder)) if remainder.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Resolve the longest page prefix of `path`, returning the page id and
    /// any unconsumed segments (index sub-routes such as `tag/<tag>`).
    pub fn resolve_prefix(&self, path: &str) -> Option<(PageId, Vec<String>)> {
        let root = self.root?;
        let mut current = root;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut consumed = 0;
        for segment in &segments {
            let next = self
                .node(current)?
                .children
                .iter()
                .copied()
                .find(|child| self.node(*child).is_some_and(|node| node.slug == *segment));
            match next {
                Some(child) => {
                    current = child;
                    consumed += 1;
                }
                None => break,
            }
        }
        let remainder = segments[consumed..]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Some((current, remainder))
    }

    /// Recompute reading time for every blog post. Without `force`, only
    /// posts whose stored value equals the historic default (5) or is unset
    /// are touched; anything else is treated as intentional. Returns the
    /// number of posts updated.
    pub fn recompute_reading_times(&mut self, force: bool) -> usize {
        let mut updated = 0;
        for node in self.nodes.values_mut() {
            if let PageBody::BlogPost(post) = &mut node.body {
                let eligible = force || matches!(post.reading_time, None | Some(5));
                if !eligible {
                    continue;
                }
                let computed =
                    blocks::reading_time_minutes(&post.excerpt, &post.content, &post.body);
                if post.reading_time != Some(computed) {
                    post.reading_time = Some(computed);
                    updated += 1;
                }
            }
        }
        updated
    }

    fn unique_slug(&self, parent: PageId, base: &str) -> String {
        let base = if base.is_empty() { "page" } else { base };
        let siblings: Vec<&str> = self
            .node(parent)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.node(*child))
                    .map(|node| node.slug.as_str())
                    .collect()
            })
            .unwrap_or_default();
        if !siblings.contains(&base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !siblings.contains(&candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Does any page of this kind exist with the given title or slug? Import
    /// jobs use this as their idempotence key.
    pub fn exists(&self, kind: PageKind, title: &str, slug: &str) -> bool {
        let title = truncate_title(title);
        self.nodes
            .values()
            .filter(|node| node.kind() == kind)
            .any(|node| node.title == title || node.slug == slug)
    }

    fn allocate(&mut self) -> PageId {
        self.next_id += 1;
        PageId(self.next_id)
    }
}

/// Lowercase the title, collapse non-alphanumerics to single hyphens, trim,
/// and cap the length (legacy slugs were capped at 50).
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    let mut capped: String = trimmed.chars().take(50).collect();
    while capped.ends_with('-') {
        capped.pop();
    }
    capped
}

/// Titles are capped at 255 characters everywhere.
pub fn truncate_title(title: &str) -> String {
    title.chars().take(255).collect()
}

/// Save-time derivations shared by create and save paths.
fn derive_on_save(body: &mut PageBody) {
    if let PageBody::BlogPost(post) = body {
        if post.reading_time.is_none() {
            post.reading_time = Some(blocks::reading_time_minutes(
                &post.excerpt,
                &post.content,
                &post.body,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fields::{
        BlogIndexFields, BlogPostFields, FaqArticleFields, HomeFields,
    };

    fn tree_with_blog() -> (PageTree, PageId, PageId) {
        let mut tree = PageTree::new();
        let root = tree
            .create_root("Ethical Capital", PageBody::Home(HomeFields::default()))
            .expect("root created");
        let blog = tree
            .add_child(root, "Blog", PageBody::BlogIndex(BlogIndexFields::default()))
            .expect("blog index created");
        tree.publish(blog).expect("blog index publishes");
        (tree, root, blog)
    }

    #[test]
    fn root_slug_is_empty_and_serves_slash() {
        let (tree, root, _) = tree_with_blog();
        assert_eq!(tree.node(root).expect("root exists").slug, "");
        assert_eq!(tree.url_path(root).expect("root path"), "/");
        assert!(PageTree::new()
            .create_root("x", PageBody::Home(HomeFields::default()))
            .is_ok());
    }

    #[test]
    fn second_root_is_rejected() {
        let (mut tree, _, _) = tree_with_blog();
        let err = tree
            .create_root("Another", PageBody::Home(HomeFields::default()))
            .expect_err("second root rejected");
        assert_eq!(err, TreeError::RootExists);
    }

    #[test]
    fn blog_posts_only_attach_under_a_blog_index() {
        let (mut tree, root, blog) = tree_with_blog();
        let err = tree
            .add_child(root, "Stray", PageBody::BlogPost(BlogPostFields::default()))
            .expect_err("post under home rejected");
        assert!(matches!(err, TreeError::Placement { .. }));

        let post = tree
            .add_child(blog, "Welcome", PageBody::BlogPost(BlogPostFields::default()))
            .expect("post under blog accepted");
        assert_eq!(tree.node(post).expect("post exists").depth, 2);
    }

    #[test]
    fn sibling_slugs_get_collision_suffixes() {
        let (mut tree, _, blog) = tree_with_blog();
        let a = tree
            .add_child(blog, "Same Title", PageBody::BlogPost(BlogPostFields::default()))
            .expect("first");
        let b = tree
            .add_child(blog, "Same Title", PageBody::BlogPost(BlogPostFields::default()))
            .expect("second");
        let c = tree
            .add_child(blog, "Same Title", PageBody::BlogPost(BlogPostFields::default()))
            .expect("third");
        assert_eq!(tree.node(a).expect("a").slug, "same-title");
        assert_eq!(tree.node(b).expect("b").slug, "same-title-2");
        assert_eq!(tree.node(c).expect("c").slug, "same-title-3");
    }

    #[test]
    fn publish_moves_the_pointer_to_the_latest_revision() {
        let (mut tree, _, blog) = tree_with_blog();
        let post = tree
            .add_child(blog, "Draft", PageBody::BlogPost(BlogPostFields::default()))
            .expect("draft created");
        assert!(!tree.node(post).expect("post").live);

        tree.save(
            post,
            "Draft",
            PageBody::BlogPost(BlogPostFields {
                body: "<p>updated</p>".into(),
                reading_time: Some(1),
                ..Default::default()
            }),
        )
        .expect("save adds revision");
        tree.publish(post).expect("publish");

        let node = tree.node(post).expect("post");
        assert!(node.live);
        assert_eq!(node.published_revision, Some(1));
        assert_eq!(node.revisions.len(), 2);
        assert!(node.first_published_at.is_some());
    }

    #[test]
    fn delete_cascades_to_descendants() {
        let (mut tree, _, blog) = tree_with_blog();
        for n in 0..3 {
            tree.add_child(
                blog,
                &format!("Post {n}"),
                PageBody::BlogPost(BlogPostFields::default()),
            )
            .expect("post created");
        }
        let removed = tree.delete(blog).expect("delete blog index");
        assert_eq!(removed, 4);
        assert_eq!(tree.pages_of_kind(PageKind::BlogPost).len(), 0);
    }

    #[test]
    fn resolve_round_trips_url_paths() {
        let (mut tree, _, blog) = tree_with_blog();
        let post = tree
            .add_child(blog, "Why We Own Farmer Mac", PageBody::BlogPost(BlogPostFields::default()))
            .expect("post created");
        let path = tree.url_path(post).expect("path");
        assert_eq!(path, "/blog/why-we-own-farmer-mac/");
        assert_eq!(tree.resolve(&path), Some(post));
        assert_eq!(tree.resolve("/blog/"), Some(blog));
        assert_eq!(tree.resolve("/blog/missing/"), None);
    }

    #[test]
    fn resolve_prefix_returns_remainder_segments() {
        let (tree, _, blog) = tree_with_blog();
        let (id, rest) = tree
            .resolve_prefix("/blog/tag/ethics/")
            .expect("prefix resolves");
        assert_eq!(id, blog);
        assert_eq!(rest, vec!["tag".to_string(), "ethics".to_string()]);
    }

    #[test]
    fn reading_time_derived_when_unset_preserved_when_set() {
        let (mut tree, _, blog) = tree_with_blog();
        let words = vec!["word"; 450].join(" ");
        let auto = tree
            .add_child(
                blog,
                "Auto",
                PageBody::BlogPost(BlogPostFields {
                    body: format!("<p>{words}</p>"),
                    ..Default::default()
                }),
            )
            .expect("auto post");
        let manual = tree
            .add_child(
                blog,
                "Manual",
                PageBody::BlogPost(BlogPostFields {
                    body: format!("<p>{words}</p>"),
                    reading_time: Some(12),
                    ..Default::default()
                }),
            )
            .expect("manual post");

        let get = |tree: &PageTree, id| match &tree.node(id).expect("node").body {
            PageBody::BlogPost(post) => post.reading_time,
            _ => unreachable!(),
        };
        assert_eq!(get(&tree, auto), Some(3));
        assert_eq!(get(&tree, manual), Some(12));
    }

    #[test]
    fn recompute_skips_intentional_values_without_force() {
        let (mut tree, _, blog) = tree_with_blog();
        let words = vec!["word"; 450].join(" ");
        let id = tree
            .add_child(
                blog,
                "Pinned",
                PageBody::BlogPost(BlogPostFields {
                    body: format!("<p>{words}</p>"),
                    reading_time: Some(12),
                    ..Default::default()
                }),
            )
            .expect("post");
        assert_eq!(tree.recompute_reading_times(false), 0);
        assert_eq!(tree.recompute_reading_times(true), 1);
        match &tree.node(id).expect("node").body {
            PageBody::BlogPost(post) => assert_eq!(post.reading_time, Some(3)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn kind_cannot_change_across_saves() {
        let (mut tree, _, blog) = tree_with_blog();
        let err = tree
            .save(blog, "Blog", PageBody::FaqArticle(FaqArticleFields::default()))
            .expect_err("kind change rejected");
        assert!(matches!(err, TreeError::KindChange { .. }));
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("What is ESG? (And why!)"), "what-is-esg-and-why");
        assert_eq!(slugify("  --  "), "");
        let long = "a".repeat(80);
        assert_eq!(slugify(&long).len(), 50);
    }

    #[test]
    fn tree_round_trips_through_json() {
        let (tree, _, _) = tree_with_blog();
        let json = serde_json::to_string(&tree).expect("tree serializes");
        let back: PageTree = serde_json::from_str(&json).expect("tree deserializes");
        assert_eq!(back.len(), tree.len());
        assert_eq!(back.root(), tree.root());
    }
}
