use mirror_core::{
    render_markdown, Converter, LinkRewriteTable, MarkdownConverter, MetadataError, Tag,
};
use mirror_engine::{
    decode_payload, parse_fragment, ApiJsonExtractor, ArticleExtractor, PageHtmlExtractor,
    SourceMode,
};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<!doctype html>
<html><head>
<meta property="og:image" content="https://pic.example/cover.jpg">
</head><body>
<h1 class="Post-Title">Ownership in practice</h1>
<div class="RichText ztext Post-RichText"><p>First <b>point</b>.</p><h2>Next</h2></div>
<script id="js-initialData" type="text/json">{"initialState":{"entities":{"articles":{"101":{"created":1600000000,"updated":1600003600}}}}}</script>
</body></html>"#;

#[test]
fn page_extractor_reads_title_cover_timestamps_and_body() {
    let article = PageHtmlExtractor.extract(PAGE).expect("page parses");

    assert_eq!(article.metadata.title, "Ownership in practice");
    assert_eq!(
        article.metadata.cover_url.as_deref(),
        Some("https://pic.example/cover.jpg")
    );
    assert_eq!(article.metadata.created.timestamp(), 1_600_000_000);
    assert_eq!(article.metadata.updated.timestamp(), 1_600_003_600);

    let tags: Vec<_> = article.body.children.iter().map(|c| c.tag.clone()).collect();
    assert_eq!(tags, vec![Tag::Paragraph, Tag::Heading2]);
}

#[test]
fn page_extractor_falls_back_to_column_timestamps() {
    let page = PAGE.replace(r#""articles":{"101""#, r#""columns":{"c_1""#);
    let article = PageHtmlExtractor.extract(&page).expect("column page parses");
    assert_eq!(article.metadata.created.timestamp(), 1_600_000_000);
}

#[test]
fn page_without_title_is_a_metadata_error() {
    let page = PAGE.replace("Post-Title", "Other-Title");
    let err = PageHtmlExtractor.extract(&page).unwrap_err();
    assert!(matches!(err, MetadataError::NotFound(_)));
}

#[test]
fn page_without_initial_data_is_a_metadata_error() {
    let page = PAGE.replace("js-initialData", "js-otherData");
    let err = PageHtmlExtractor.extract(&page).unwrap_err();
    assert!(matches!(err, MetadataError::NotFound(_)));
}

#[test]
fn page_without_cover_still_extracts() {
    let page = PAGE.replace("og:image", "og:description");
    let article = PageHtmlExtractor.extract(&page).expect("cover is optional");
    assert_eq!(article.metadata.cover_url, None);
}

#[test]
fn api_extractor_parses_the_content_fragment() {
    let payload = r#"{
        "title": "Borrowing",
        "content": "<p>Hi <code>x</code></p><figure><noscript><img src=\"https://pic.example/a.png\"></noscript><img src=\"data:image/svg+xml;utf8,x\" data-actualsrc=\"https://pic.example/a.png\"></figure>",
        "image_url": "",
        "created": 1600000000,
        "updated": 1600000000
    }"#;
    let article = ApiJsonExtractor.extract(payload).expect("api payload parses");

    assert_eq!(article.metadata.title, "Borrowing");
    assert_eq!(article.metadata.cover_url, None);
    let converted = MarkdownConverter.convert(&article, &LinkRewriteTable::new());
    assert!(converted.markdown_body.contains("Hi `x`"));
    assert!(converted.markdown_body.contains("![img](https://pic.example/a.png)"));
}

fn markdown_of(fragment: &str) -> String {
    render_markdown(&parse_fragment(fragment), &LinkRewriteTable::new())
}

#[test]
fn content_image_without_lazy_loading_is_kept() {
    assert_eq!(
        markdown_of(
            r#"<p>before</p><figure><img src="https://pic1.zhimg.com/v2-abc_b.png" class="content_image"/></figure><p>after</p>"#
        ),
        "\n\nbefore\n\n![img](https://pic1.zhimg.com/v2-abc_b.png)\n\nafter"
    );
}

#[test]
fn highlighted_code_fragment_becomes_a_fenced_block() {
    assert_eq!(
        markdown_of(
            r#"<div class="highlight"><pre><code class="language-cpp">int x = 1 &lt; 2;</code></pre></div>"#
        ),
        "\n\n```cpp\nint x = 1 < 2;\n```"
    );
}

#[test]
fn list_nested_inside_an_item_is_indented() {
    assert_eq!(
        markdown_of("<ul><li>a<ul><li>b</li></ul></li></ul>"),
        "\n\n- a\n\t- b\n"
    );
}

#[test]
fn api_extractor_requires_timestamps() {
    let err = ApiJsonExtractor
        .extract(r#"{"title":"t","content":"<p>x</p>","created":1}"#)
        .unwrap_err();
    assert!(matches!(err, MetadataError::NotFound(ref key) if key == "updated"));
}

#[test]
fn api_extractor_rejects_non_json() {
    let err = ApiJsonExtractor.extract("<html></html>").unwrap_err();
    assert!(matches!(err, MetadataError::Json(_)));
}

#[test]
fn source_mode_picks_the_fetch_url() {
    let entry = "https://zhuanlan.zhihu.com/p/101";
    assert_eq!(
        SourceMode::Api.source_url(entry, "https://api.example/articles/", "101"),
        "https://api.example/articles/101"
    );
    assert_eq!(SourceMode::Page.source_url(entry, "https://api.example/articles/", "101"), entry);
}

#[test]
fn decode_respects_charset_header() {
    let bytes = b"caf\xe9";
    let decoded = decode_payload(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
    assert_eq!(decoded.text, "café");
}

#[test]
fn decode_handles_utf8_bom() {
    let decoded = decode_payload(b"\xEF\xBB\xBFhello", Some("text/html")).unwrap();
    assert_eq!(decoded.text, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}
