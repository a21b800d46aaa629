//! Rich-text tree to markdown.
//!
//! A single pass over the body container. Block-level children dispatch in
//! [`render_markdown`], inline children in [`render_inline_run`]. Both treat
//! [`Tag::Unrecognized`] as a no-op so decorative markup never aborts a batch.

use crate::links::{strip_redirect, LinkRewriteTable};
use crate::metadata::{ConversionResult, ParsedArticle};
use crate::node::{DocumentNode, Tag};

/// `target` value the platform uses for links that open in a new window.
pub const NEW_WINDOW_TARGET: &str = "_blank";
const LANGUAGE_CLASS_PREFIX: &str = "language-";
const LIST_INDENT: &str = "\t";
const BLOCK_SEPARATOR: &str = "\n\n";
const FENCE: &str = "```";

pub trait Converter: Send + Sync {
    fn convert(&self, article: &ParsedArticle, links: &LinkRewriteTable) -> ConversionResult;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn convert(&self, article: &ParsedArticle, links: &LinkRewriteTable) -> ConversionResult {
        ConversionResult {
            markdown_body: render_markdown(&article.body, links),
            metadata: article.metadata.clone(),
        }
    }
}

/// Render the top-level children of the body container.
pub fn render_markdown(root: &DocumentNode, links: &LinkRewriteTable) -> String {
    let mut fragments: Vec<String> = Vec::with_capacity(root.children.len() * 2);

    for child in &root.children {
        match &child.tag {
            Tag::Paragraph => {
                fragments.push(BLOCK_SEPARATOR.to_string());
                fragments.push(render_inline_run(child, links));
            }
            Tag::Heading2 => {
                fragments.push(format!("{BLOCK_SEPARATOR}## {}", render_inline_run(child, links)));
            }
            Tag::Heading3 => {
                fragments.push(format!("{BLOCK_SEPARATOR}### {}", render_inline_run(child, links)));
            }
            Tag::Blockquote => {
                fragments.push(format!("{BLOCK_SEPARATOR}> {}", render_inline_run(child, links)));
            }
            Tag::UnorderedList => {
                fragments.push(format!(
                    "{BLOCK_SEPARATOR}{}",
                    render_unordered_list(child, 0, links)
                ));
            }
            Tag::CodeBlockContainer => {
                if let Some(block) = render_code_block(child) {
                    fragments.push(format!("{BLOCK_SEPARATOR}{block}"));
                }
            }
            Tag::Figure => {
                if let Some(image) = render_image(child) {
                    fragments.push(format!("{BLOCK_SEPARATOR}{image}"));
                }
            }
            // Link cards sit directly in the body.
            Tag::Anchor if child.attr("target") == Some(NEW_WINDOW_TARGET) => {
                fragments.push(format!("{BLOCK_SEPARATOR} - {}", render_link(child, links)));
            }
            Tag::Text => fragments.push(child.text.clone()),
            Tag::Anchor
            | Tag::ListItem
            | Tag::Bold
            | Tag::InlineCode
            | Tag::Unrecognized(_) => {}
        }
    }

    fragments.concat()
}

/// Render the inline children of a paragraph-like node.
pub fn render_inline_run(node: &DocumentNode, links: &LinkRewriteTable) -> String {
    let mut fragments: Vec<String> = Vec::with_capacity(node.children.len());

    for child in &node.children {
        match &child.tag {
            Tag::Anchor => fragments.push(render_link(child, links)),
            Tag::Bold => fragments.push(format!(" **{}** ", child.text_content())),
            Tag::InlineCode => fragments.push(format!("`{}`", child.text_content())),
            Tag::Text => fragments.push(child.text.clone()),
            Tag::Paragraph
            | Tag::Heading2
            | Tag::Heading3
            | Tag::Blockquote
            | Tag::UnorderedList
            | Tag::ListItem
            | Tag::CodeBlockContainer
            | Tag::Figure
            | Tag::Unrecognized(_) => {}
        }
    }

    fragments.concat()
}

/// Render an anchor, unwrapping redirects and applying the rewrite table.
pub fn render_link(node: &DocumentNode, links: &LinkRewriteTable) -> String {
    let text = match (node.attr("target"), node.attr("data-text")) {
        (Some(NEW_WINDOW_TARGET), Some(data_text)) if !data_text.is_empty() => {
            data_text.to_string()
        }
        _ => node.text_content(),
    };

    let Some(href) = node.attr("href") else {
        return text;
    };
    let href = strip_redirect(href);
    let target = links.resolve(&href);
    format!("[{text}]({target})")
}

/// Render list items at `depth` tabs, recursing one level per nested list.
pub fn render_unordered_list(node: &DocumentNode, depth: usize, links: &LinkRewriteTable) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for child in &node.children {
        match child.tag {
            Tag::ListItem => {
                fragments.push(format!(
                    "{}- {}\n",
                    LIST_INDENT.repeat(depth),
                    render_inline_run(child, links)
                ));
                // Sub-lists nested inside the item itself.
                for nested in child.children.iter().filter(|n| n.tag == Tag::UnorderedList) {
                    fragments.push(render_unordered_list(nested, depth + 1, links));
                }
            }
            Tag::UnorderedList => fragments.push(render_unordered_list(child, depth + 1, links)),
            _ => {}
        }
    }

    fragments.concat()
}

/// Render a highlighted code container as a fenced block.
///
/// Returns `None` when the container holds no `pre` element.
pub fn render_code_block(node: &DocumentNode) -> Option<String> {
    let pre = node.find("pre")?;
    let code = pre.find("code");

    let language = code
        .and_then(|code| code.classes().next())
        .map(|class| class.strip_prefix(LANGUAGE_CLASS_PREFIX).unwrap_or(class))
        .unwrap_or_default();
    let text = code.unwrap_or(pre).text_content();
    let newline = if text.ends_with('\n') { "" } else { "\n" };

    Some(format!("{FENCE}{language}\n{text}{newline}{FENCE}"))
}

/// Render a figure from its lazy-load fallback image.
///
/// The real url lives in `noscript > img[data-original]`; the visible `img`
/// only carries a placeholder until scripts swap it in. Figures that are not
/// lazy-loaded carry the url in a plain `img[src]`.
pub fn render_image(node: &DocumentNode) -> Option<String> {
    let fallback = node
        .find("noscript")
        .and_then(|noscript| noscript.find("img"))
        .and_then(|img| img.attr("data-original").or_else(|| img.attr("src")));

    let lazy = || {
        node.find_all("img").into_iter().find_map(|img| {
            img.attr("data-actualsrc")
                .or_else(|| img.attr("data-original"))
                .filter(|url| is_real_image_url(url))
        })
    };

    let plain = || {
        node.find_all("img")
            .into_iter()
            .find_map(|img| img.attr("src").filter(|url| is_real_image_url(url)))
    };

    fallback
        .filter(|url| is_real_image_url(url))
        .or_else(lazy)
        .or_else(plain)
        .map(|url| format!("![img]({url})"))
}

fn is_real_image_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !url.starts_with("data:")
}
