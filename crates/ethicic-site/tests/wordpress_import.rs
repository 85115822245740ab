//! End-to-end WordPress import: a WXR export lands in the file-backed store,
//! survives a reload, and a rerun creates nothing new.

use ethicic_site::content::fields::PageBody;
use ethicic_site::content::{queries, ContentStore, PageKind};
use ethicic_site::ingest::wordpress::import_wordpress_xml;

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
     xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:wp="http://wordpress.org/export/1.2/">
  <channel>
    <item>
      <title>Why We Screen First</title>
      <dc:creator>Sloane</dc:creator>
      <content:encoded><![CDATA[<!-- wp:paragraph --><p>Read more at https://investvegan.org/our-process/ today.</p><!-- /wp:paragraph -->]]></content:encoded>
      <excerpt:encoded><![CDATA[Screening comes first.]]></excerpt:encoded>
      <wp:post_name>why-we-screen-first</wp:post_name>
      <wp:post_type>post</wp:post_type>
      <wp:status>publish</wp:status>
      <wp:post_date>2022-03-04 09:30:00</wp:post_date>
    </item>
    <item>
      <title>Divestment</title>
      <content:encoded><![CDATA[<p>Selling holdings for ethical reasons.</p>]]></content:encoded>
      <wp:post_name>divestment</wp:post_name>
      <wp:post_type>docs</wp:post_type>
      <wp:status>publish</wp:status>
      <category domain="category" nicename="glossaries"><![CDATA[Glossaries]]></category>
    </item>
    <item>
      <title>Unfinished Draft</title>
      <content:encoded><![CDATA[<p>Not ready.</p>]]></content:encoded>
      <wp:post_name>unfinished-draft</wp:post_name>
      <wp:post_type>post</wp:post_type>
      <wp:status>draft</wp:status>
    </item>
  </channel>
</rss>
"#;

#[test]
fn import_persists_reloads_and_stays_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ContentStore::new(dir.path().join("content.json"));

    let first = store
        .update(|content| Ok(import_wordpress_xml(content, EXPORT)?))
        .expect("first import");
    assert_eq!(first.created, 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.failed, 0);

    // Reload from disk: the import survived persistence.
    let content = store.load().expect("reloads");
    let posts = queries::blog_posts(&content.tree);
    assert_eq!(posts.len(), 1);
    let (node, fields) = posts[0];
    assert_eq!(node.title, "Why We Screen First");
    assert_eq!(node.slug, "why-we-screen-first");
    assert_eq!(fields.author, "Sloane");
    assert!(fields.body.contains("https://ethicic.com/process/"));
    assert!(!fields.body.contains("wp:paragraph"));
    assert_eq!(
        fields.publish_date.map(|date| date.to_string()).as_deref(),
        Some("2022-03-04")
    );

    let entries = queries::encyclopedia_entries(&content.tree);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0.title, "Divestment");

    // Drafts never become pages of any kind.
    assert!(!content.tree.exists(
        PageKind::BlogPost,
        "Unfinished Draft",
        "unfinished-draft"
    ));

    let second = store
        .update(|content| Ok(import_wordpress_xml(content, EXPORT)?))
        .expect("second import");
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, first.created + first.skipped);
}

#[test]
fn imported_posts_are_published_under_the_blog_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ContentStore::new(dir.path().join("content.json"));
    store
        .update(|content| Ok(import_wordpress_xml(content, EXPORT)?))
        .expect("imports");

    let content = store.load().expect("reloads");
    let blog = content
        .tree
        .find_first(PageKind::BlogIndex)
        .expect("blog index");
    let children = content.tree.children(blog.id);
    assert!(children
        .iter()
        .any(|node| node.live && matches!(node.body, PageBody::BlogPost(_))));
    assert_eq!(
        content.tree.resolve("/blog/why-we-screen-first/"),
        children
            .iter()
            .find(|node| node.slug == "why-we-screen-first")
            .map(|node| node.id)
    );
}
