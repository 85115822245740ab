//! Read-side listing queries over the page tree.
//!
//! Every query here filters to live pages and never fails: an empty tree or a
//! missing index yields empty collections, not errors.

use super::fields::{
    BlogPostFields, EncyclopediaEntryFields, FaqArticleFields, FaqCategory, PageBody,
};
use super::kind::PageKind;
use super::tree::{slugify, PageNode, PageTree};

pub const FEATURED_POST_LIMIT: usize = 3;
pub const RECENT_POST_LIMIT: usize = 6;
pub const POPULAR_POST_LIMIT: usize = 5;
pub const RELATED_ENTRY_LIMIT: usize = 5;

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into page `page` (1-based). Out-of-range pages clamp to the
/// last non-empty page, matching how the legacy listing handled bad `?page=`
/// values.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Paginated<T> {
    let total = items.len();
    let per_page = per_page.max(1);
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let items = items
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();
    Paginated {
        items,
        page,
        per_page,
        total,
        total_pages,
    }
}

/// A live blog post together with its envelope.
pub type PostRef<'a> = (&'a PageNode, &'a BlogPostFields);

fn live_of_kind(tree: &PageTree, kind: PageKind) -> impl Iterator<Item = &PageNode> {
    tree.pages_of_kind(kind)
        .into_iter()
        .filter(|node| node.live)
}

/// All live blog posts, newest publish date first. Posts without a publish
/// date sort last; ties break on title so the order is stable.
pub fn blog_posts(tree: &PageTree) -> Vec<PostRef<'_>> {
    let mut posts: Vec<PostRef<'_>> = live_of_kind(tree, PageKind::BlogPost)
        .filter_map(|node| match &node.body {
            PageBody::BlogPost(fields) => Some((node, fields)),
            _ => None,
        })
        .collect();
    posts.sort_by(|(a_node, a), (b_node, b)| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| a_node.title.cmp(&b_node.title))
    });
    posts
}

/// Posts flagged featured, capped at [`FEATURED_POST_LIMIT`].
pub fn featured_posts(tree: &PageTree) -> Vec<PostRef<'_>> {
    blog_posts(tree)
        .into_iter()
        .filter(|(_, fields)| fields.featured)
        .take(FEATURED_POST_LIMIT)
        .collect()
}

/// The newest posts, capped at [`RECENT_POST_LIMIT`].
pub fn recent_posts(tree: &PageTree) -> Vec<PostRef<'_>> {
    blog_posts(tree).into_iter().take(RECENT_POST_LIMIT).collect()
}

/// Popular posts, capped at [`POPULAR_POST_LIMIT`]: newest first, with
/// reading time as the popularity tiebreaker (longer pieces rank higher,
/// missing reading times count as zero).
pub fn popular_posts(tree: &PageTree) -> Vec<PostRef<'_>> {
    let mut posts = blog_posts(tree);
    posts.sort_by(|(a_node, a), (b_node, b)| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| b.reading_time.unwrap_or(0).cmp(&a.reading_time.unwrap_or(0)))
            .then_with(|| a_node.title.cmp(&b_node.title))
    });
    posts.truncate(POPULAR_POST_LIMIT);
    posts
}

/// Posts carrying the given tag (exact, case-insensitive).
pub fn posts_by_tag<'a>(tree: &'a PageTree, tag: &str) -> Vec<PostRef<'a>> {
    blog_posts(tree)
        .into_iter()
        .filter(|(_, fields)| {
            fields
                .tags
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(tag))
        })
        .collect()
}

/// Posts by the author whose name slugifies to `slug`.
pub fn posts_by_author<'a>(tree: &'a PageTree, slug: &str) -> Vec<PostRef<'a>> {
    blog_posts(tree)
        .into_iter()
        .filter(|(_, fields)| slugify(&fields.author) == slug)
        .collect()
}

/// Distinct tags across live posts, sorted, with usage counts.
pub fn tags(tree: &PageTree) -> Vec<(String, usize)> {
    let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
    for (_, fields) in blog_posts(tree) {
        for tag in &fields.tags {
            let tag = tag.trim();
            if !tag.is_empty() {
                *counts.entry(tag.to_string()).or_default() += 1;
            }
        }
    }
    counts.into_iter().collect()
}

/// Distinct authors across live posts as `(slug, display name, post count)`,
/// sorted by slug.
pub fn authors(tree: &PageTree) -> Vec<(String, String, usize)> {
    let mut by_slug: std::collections::BTreeMap<String, (String, usize)> = Default::default();
    for (_, fields) in blog_posts(tree) {
        let name = fields.author.trim();
        if name.is_empty() {
            continue;
        }
        let entry = by_slug
            .entry(slugify(name))
            .or_insert_with(|| (name.to_string(), 0));
        entry.1 += 1;
    }
    by_slug
        .into_iter()
        .map(|(slug, (name, count))| (slug, name, count))
        .collect()
}

/// A live FAQ article together with its envelope.
pub type FaqRef<'a> = (&'a PageNode, &'a FaqArticleFields);

/// All live FAQ articles, highest priority first, then title.
pub fn faq_articles(tree: &PageTree) -> Vec<FaqRef<'_>> {
    let mut articles: Vec<FaqRef<'_>> = live_of_kind(tree, PageKind::FaqArticle)
        .filter_map(|node| match &node.body {
            PageBody::FaqArticle(fields) => Some((node, fields)),
            _ => None,
        })
        .collect();
    articles.sort_by(|(a_node, a), (b_node, b)| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a_node.title.cmp(&b_node.title))
    });
    articles
}

/// Live FAQ articles in one category, priority order.
pub fn faq_by_category(tree: &PageTree, category: FaqCategory) -> Vec<FaqRef<'_>> {
    faq_articles(tree)
        .into_iter()
        .filter(|(_, fields)| fields.category == category)
        .collect()
}

/// Categories that actually have live articles, grouped, preserving the
/// overall priority order within each group.
pub fn faq_categories(tree: &PageTree) -> Vec<(FaqCategory, Vec<FaqRef<'_>>)> {
    let mut groups: Vec<(FaqCategory, Vec<FaqRef<'_>>)> = Vec::new();
    for (node, fields) in faq_articles(tree) {
        match groups.iter_mut().find(|(cat, _)| *cat == fields.category) {
            Some((_, members)) => members.push((node, fields)),
            None => groups.push((fields.category, vec![(node, fields)])),
        }
    }
    groups
}

/// Find a live FAQ article by exact title.
pub fn faq_by_title<'a>(tree: &'a PageTree, title: &str) -> Option<FaqRef<'a>> {
    faq_articles(tree)
        .into_iter()
        .find(|(node, _)| node.title == title)
}

/// A live encyclopedia entry together with its envelope.
pub type EntryRef<'a> = (&'a PageNode, &'a EncyclopediaEntryFields);

/// All live encyclopedia entries, alphabetical by title (case-insensitive).
pub fn encyclopedia_entries(tree: &PageTree) -> Vec<EntryRef<'_>> {
    let mut entries: Vec<EntryRef<'_>> = live_of_kind(tree, PageKind::EncyclopediaEntry)
        .filter_map(|node| match &node.body {
            PageBody::EncyclopediaEntry(fields) => Some((node, fields)),
            _ => None,
        })
        .collect();
    entries.sort_by(|(a, _), (b, _)| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
    });
    entries
}

fn first_letter(title: &str) -> Option<char> {
    title
        .chars()
        .next()
        .map(|ch| ch.to_ascii_uppercase())
}

/// Entries whose title starts with `letter` (case-insensitive).
pub fn entries_by_letter(tree: &PageTree, letter: char) -> Vec<EntryRef<'_>> {
    let letter = letter.to_ascii_uppercase();
    encyclopedia_entries(tree)
        .into_iter()
        .filter(|(node, _)| first_letter(&node.title) == Some(letter))
        .collect()
}

/// True when `term` appears in `title` as a whole word (case-insensitive).
fn title_has_term(title: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let title = title.to_lowercase();
    let mut from = 0;
    while let Some(pos) = title[from..].find(term) {
        let start = from + pos;
        let end = start + term.len();
        let bounded_left = !title[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let bounded_right = !title[end..].chars().next().is_some_and(char::is_alphanumeric);
        if bounded_left && bounded_right {
            return true;
        }
        from = end;
    }
    false
}

/// Entries whose titles mention one of `entry`'s related terms, the entry
/// itself excluded, capped at [`RELATED_ENTRY_LIMIT`].
pub fn related_entries<'a>(tree: &'a PageTree, entry: &PageNode) -> Vec<EntryRef<'a>> {
    let PageBody::EncyclopediaEntry(fields) = &entry.body else {
        return Vec::new();
    };
    let terms: Vec<String> = fields
        .related_terms
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect();
    if terms.is_empty() {
        return Vec::new();
    }
    encyclopedia_entries(tree)
        .into_iter()
        .filter(|(node, _)| node.id != entry.id)
        .filter(|(node, _)| terms.iter().any(|term| title_has_term(&node.title, term)))
        .take(RELATED_ENTRY_LIMIT)
        .collect()
}

/// The sorted set of initial letters that have entries.
pub fn available_letters(tree: &PageTree) -> Vec<char> {
    let mut letters: Vec<char> = encyclopedia_entries(tree)
        .iter()
        .filter_map(|(node, _)| first_letter(&node.title))
        .collect();
    letters.sort_unstable();
    letters.dedup();
    letters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fields::{
        BlogIndexFields, BlogPostFields, EncyclopediaIndexFields, FaqIndexFields, HomeFields,
    };
    use chrono::NaiveDate;

    fn seeded_tree() -> PageTree {
        let mut tree = PageTree::new();
        let root = tree
            .create_root("Home", PageBody::Home(HomeFields::default()))
            .expect("root");
        let blog = tree
            .add_child(root, "Blog", PageBody::BlogIndex(BlogIndexFields::default()))
            .expect("blog");
        let faq = tree
            .add_child(root, "FAQ", PageBody::FaqIndex(FaqIndexFields::default()))
            .expect("faq");
        let ency = tree
            .add_child(
                root,
                "Encyclopedia",
                PageBody::EncyclopediaIndex(EncyclopediaIndexFields::default()),
            )
            .expect("encyclopedia");

        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        let posts = [
            ("Alpha", date(2024, 1, 10), vec!["ethics"], "Sloane Ortel", false),
            ("Beta", date(2024, 3, 5), vec!["ethics", "process"], "Sloane Ortel", true),
            ("Gamma", date(2023, 11, 1), vec!["process"], "Guest Author", false),
            ("Delta", None, vec![], "Sloane Ortel", false),
        ];
        for (title, publish_date, tags, author, featured) in posts {
            let id = tree
                .add_child(
                    blog,
                    title,
                    PageBody::BlogPost(BlogPostFields {
                        publish_date,
                        tags: tags.into_iter().map(String::from).collect(),
                        author: author.into(),
                        featured,
                        ..Default::default()
                    }),
                )
                .expect("post");
            tree.publish(id).expect("publish post");
        }
        // A draft never shows up in listings.
        tree.add_child(blog, "Hidden Draft", PageBody::BlogPost(BlogPostFields::default()))
            .expect("draft");

        for (title, priority, category) in [
            ("What are your fees?", 10, FaqCategory::Account),
            ("How do you screen?", 5, FaqCategory::HowWeInvest),
            ("Another account question", 10, FaqCategory::Account),
        ] {
            let id = tree
                .add_child(
                    faq,
                    title,
                    PageBody::FaqArticle(FaqArticleFields {
                        priority,
                        category,
                        ..Default::default()
                    }),
                )
                .expect("faq article");
            tree.publish(id).expect("publish faq");
        }

        for title in ["Beta Risk", "alpha generation", "Divestment"] {
            let id = tree
                .add_child(
                    ency,
                    title,
                    PageBody::EncyclopediaEntry(EncyclopediaEntryFields::default()),
                )
                .expect("entry");
            tree.publish(id).expect("publish entry");
        }

        tree
    }

    #[test]
    fn blog_posts_sort_newest_first_with_undated_last() {
        let tree = seeded_tree();
        let titles: Vec<&str> = blog_posts(&tree)
            .iter()
            .map(|(node, _)| node.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Beta", "Alpha", "Gamma", "Delta"]);
    }

    #[test]
    fn drafts_never_appear_in_listings() {
        let tree = seeded_tree();
        assert!(blog_posts(&tree)
            .iter()
            .all(|(node, _)| node.title != "Hidden Draft"));
    }

    #[test]
    fn featured_posts_are_capped() {
        let tree = seeded_tree();
        let featured = featured_posts(&tree);
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].0.title, "Beta");
    }

    #[test]
    fn tags_and_authors_aggregate_with_counts() {
        let tree = seeded_tree();
        assert_eq!(
            tags(&tree),
            vec![("ethics".to_string(), 2), ("process".to_string(), 2)]
        );
        let authors = authors(&tree);
        assert_eq!(authors.len(), 2);
        assert_eq!(
            authors[1],
            ("sloane-ortel".to_string(), "Sloane Ortel".to_string(), 3)
        );
    }

    #[test]
    fn posts_by_author_matches_slugified_name() {
        let tree = seeded_tree();
        assert_eq!(posts_by_author(&tree, "guest-author").len(), 1);
        assert_eq!(posts_by_author(&tree, "nobody").len(), 0);
    }

    #[test]
    fn faq_orders_by_priority_then_title() {
        let tree = seeded_tree();
        let titles: Vec<&str> = faq_articles(&tree)
            .iter()
            .map(|(node, _)| node.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "Another account question",
                "What are your fees?",
                "How do you screen?"
            ]
        );
    }

    #[test]
    fn faq_categories_group_only_populated_categories() {
        let tree = seeded_tree();
        let groups = faq_categories(&tree);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, FaqCategory::Account);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn encyclopedia_sorts_case_insensitively() {
        let tree = seeded_tree();
        let titles: Vec<&str> = encyclopedia_entries(&tree)
            .iter()
            .map(|(node, _)| node.title.as_str())
            .collect();
        assert_eq!(titles, vec!["alpha generation", "Beta Risk", "Divestment"]);
        assert_eq!(available_letters(&tree), vec!['A', 'B', 'D']);
        assert_eq!(entries_by_letter(&tree, 'b').len(), 1);
    }

    #[test]
    fn popular_posts_break_date_ties_on_reading_time() {
        let mut tree = PageTree::new();
        let root = tree
            .create_root("Home", PageBody::Home(HomeFields::default()))
            .expect("root");
        let blog = tree
            .add_child(root, "Blog", PageBody::BlogIndex(BlogIndexFields::default()))
            .expect("blog");
        let date = NaiveDate::from_ymd_opt(2024, 6, 1);
        for (title, reading_time) in [("Short Note", Some(2)), ("Deep Dive", Some(14)), ("No Estimate", None)] {
            let id = tree
                .add_child(
                    blog,
                    title,
                    PageBody::BlogPost(BlogPostFields {
                        publish_date: date,
                        reading_time,
                        body: "x".into(),
                        ..Default::default()
                    }),
                )
                .expect("post");
            tree.publish(id).expect("publish");
        }

        let titles: Vec<&str> = popular_posts(&tree)
            .iter()
            .map(|(node, _)| node.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Deep Dive", "Short Note", "No Estimate"]);
    }

    #[test]
    fn related_entries_match_whole_words_and_exclude_self() {
        let mut tree = PageTree::new();
        let root = tree
            .create_root("Home", PageBody::Home(HomeFields::default()))
            .expect("root");
        let ency = tree
            .add_child(
                root,
                "Encyclopedia",
                PageBody::EncyclopediaIndex(EncyclopediaIndexFields::default()),
            )
            .expect("encyclopedia");

        let mut add = |title: &str, related_terms: &str| {
            let id = tree
                .add_child(
                    ency,
                    title,
                    PageBody::EncyclopediaEntry(EncyclopediaEntryFields {
                        related_terms: related_terms.into(),
                        ..Default::default()
                    }),
                )
                .expect("entry");
            tree.publish(id).expect("publish");
            id
        };
        let divestment = add("Divestment", "screening, Exclusion");
        add("Negative Screening", "");
        add("Exclusion Lists", "");
        // Shares a prefix with "screening" but is a different word.
        add("Screenings Weekly", "");

        let node = tree.node(divestment).expect("node");
        let related: Vec<&str> = related_entries(&tree, node)
            .iter()
            .map(|(node, _)| node.title.as_str())
            .collect();
        assert_eq!(related, vec!["Exclusion Lists", "Negative Screening"]);

        // Entries without related terms relate to nothing.
        let screening = tree
            .pages_of_kind(PageKind::EncyclopediaEntry)
            .into_iter()
            .find(|node| node.title == "Negative Screening")
            .expect("entry");
        assert!(related_entries(&tree, screening).is_empty());
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items.clone(), 3, 12);
        assert_eq!(page.items, vec![25]);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let clamped = paginate(items.clone(), 99, 12);
        assert_eq!(clamped.page, 3);

        let empty = paginate(Vec::<u32>::new(), 1, 12);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
