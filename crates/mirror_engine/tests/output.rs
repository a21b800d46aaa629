use chrono::{DateTime, FixedOffset};
use mirror_core::{CatalogEntry, SeriesRef};
use mirror_engine::{article_slug, build_post_document, parse_catalog, FrontMatter};
use pretty_assertions::assert_eq;

fn east8() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

#[test]
fn front_matter_precedes_the_body() {
    let front = FrontMatter {
        title: "Ownership in practice",
        created: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
        updated: DateTime::from_timestamp(1_600_003_600, 0).unwrap(),
        post_type: None,
        cover: None,
        series: None,
    };

    let doc = build_post_document(&front, east8(), "\n\nHello");
    assert_eq!(
        doc,
        "---\ntitle: 'Ownership in practice'\ndate: 2020-09-13 20:26:40\nupdated: 2020-09-13 21:26:40\n---\n\n\n\nHello"
    );
}

#[test]
fn optional_fields_are_emitted_when_present() {
    let series = SeriesRef {
        name: "Rust notes".to_string(),
        order: 3,
    };
    let front = FrontMatter {
        title: "It's here",
        created: DateTime::from_timestamp(0, 0).unwrap(),
        updated: DateTime::from_timestamp(0, 0).unwrap(),
        post_type: Some("post"),
        cover: Some("https://pic.example/c.jpg"),
        series: Some(&series),
    };

    let rendered = front.render(FixedOffset::east_opt(0).unwrap());
    assert_eq!(
        rendered,
        "---\ntitle: 'It''s here'\ndate: 1970-01-01 00:00:00\nupdated: 1970-01-01 00:00:00\ntype: 'post'\ncover: 'https://pic.example/c.jpg'\nseries: ['Rust notes']\nseries_order: 3\n---\n"
    );
}

#[test]
fn catalog_parses_plain_and_series_entries() {
    let catalog = parse_catalog(
        r#"(
            entries: [
                (url: "https://zhuanlan.zhihu.com/p/101"),
                (url: "https://zhuanlan.zhihu.com/p/102", series: Some((name: "Rust notes", order: 2))),
            ],
        )"#,
    )
    .expect("catalog parses");

    assert_eq!(
        catalog.entries,
        vec![
            CatalogEntry::new("https://zhuanlan.zhihu.com/p/101"),
            CatalogEntry::new("https://zhuanlan.zhihu.com/p/102").in_series("Rust notes", 2),
        ]
    );
    assert_eq!(
        catalog.urls().map(article_slug).collect::<Vec<_>>(),
        vec!["101", "102"]
    );
}

#[test]
fn malformed_catalog_is_rejected() {
    assert!(parse_catalog("(entries: [(link: \"x\")])").is_err());
}
