use std::collections::HashSet;

use lectio::application::indexer::{HeadingIndexer, SourceFormat, apply_heading_ids};

fn ids(markers: &[lectio::domain::regions::SectionMarker]) -> Vec<String> {
    markers.iter().map(|marker| marker.id.to_string()).collect()
}

#[test]
fn repeated_titles_get_counter_suffixes() {
    let markers = HeadingIndexer::new("post").index_markdown("## Overview\n\n## Overview\n");

    assert_eq!(ids(&markers), ["overview", "overview-1"]);
}

#[test]
fn identifiers_are_unique_for_adversarial_input() {
    let source = [
        "## Intro",
        "## Intro",
        "## Intro 1",
        "## intro-2",
        "##",
        "## Heading 2",
        "## !!!",
        "## Intro",
    ]
    .join("\n\n");

    let markers = HeadingIndexer::new("post").index_markdown(&source);
    let unique: HashSet<String> = ids(&markers).into_iter().collect();

    assert_eq!(markers.len(), 8);
    assert_eq!(unique.len(), 8);
}

#[test]
fn markdown_and_html_front_ends_agree() {
    let markdown = "## Intro\n\n### Details & Caveats\n\n## Intro\n";
    let html = "<h2>Intro</h2><h3>Details &amp; Caveats</h3><h2>Intro</h2>";

    let indexer = HeadingIndexer::new("post");
    let from_markdown = indexer.index(markdown, SourceFormat::Markdown).expect("md");
    let from_html = indexer.index(html, SourceFormat::Html).expect("html");

    assert_eq!(from_markdown, from_html);
    assert_eq!(ids(&from_html), ["intro", "details-caveats", "intro-1"]);
}

#[test]
fn character_references_decode_the_same_in_both_front_ends() {
    let markdown = "## It&#8217;s &#x41;PI &eacute;t&eacute;\n";
    let html = "<h2>It&#8217;s &#x41;PI &eacute;t&eacute;</h2>";

    let indexer = HeadingIndexer::new("post");
    let from_markdown = indexer.index_markdown(markdown);
    let from_html = indexer.index_html(html).expect("html");

    assert_eq!(from_markdown, from_html);
    assert_eq!(from_html[0].label, "It\u{2019}s API \u{e9}t\u{e9}");
    assert_eq!(ids(&from_html), ["it-s-api-ete"]);

    let rewritten = apply_heading_ids(html, &from_html).expect("apply");
    assert!(rewritten.starts_with("<h2 id=\"it-s-api-ete\">"));
}

#[test]
fn chinese_headings_are_transliterated() {
    let markers = HeadingIndexer::new("post").index_markdown("## 基线对齐\n");

    assert_eq!(ids(&markers), ["ji-xian-dui-qi"]);
    assert_eq!(markers[0].label, "基线对齐");
}

#[test]
fn rendered_html_round_trips_through_anchor_application() {
    let html = "<article><h2>Intro</h2><p>one</p><h3></h3><h2>Intro</h2></article>";
    let markers = HeadingIndexer::new("post").index_html(html).expect("index");

    let rewritten = apply_heading_ids(html, &markers).expect("apply");

    assert_eq!(
        rewritten,
        "<article><h2 id=\"intro\">Intro</h2><p>one</p><h3 id=\"heading-1\"></h3><h2 id=\"intro-2\">Intro</h2></article>"
    );
}
