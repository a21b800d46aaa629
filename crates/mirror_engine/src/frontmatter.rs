use chrono::{DateTime, FixedOffset, Utc};
use mirror_core::SeriesRef;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header fields of one generated post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub title: &'a str,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub post_type: Option<&'a str>,
    pub cover: Option<&'a str>,
    pub series: Option<&'a SeriesRef>,
}

impl FrontMatter<'_> {
    /// Render the `---` delimited block, timestamps shown in `offset`.
    pub fn render(&self, offset: FixedOffset) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", quote(self.title)));
        out.push_str(&format!("date: {}\n", local_timestamp(self.created, offset)));
        out.push_str(&format!("updated: {}\n", local_timestamp(self.updated, offset)));
        if let Some(post_type) = self.post_type {
            out.push_str(&format!("type: {}\n", quote(post_type)));
        }
        if let Some(cover) = self.cover {
            out.push_str(&format!("cover: {}\n", quote(cover)));
        }
        if let Some(series) = self.series {
            out.push_str(&format!(
                "series: [{}]\nseries_order: {}\n",
                quote(&series.name),
                series.order
            ));
        }
        out.push_str("---\n");
        out
    }
}

/// Front matter, one blank line, then the body.
pub fn build_post_document(front_matter: &FrontMatter<'_>, offset: FixedOffset, body_markdown: &str) -> String {
    format!(
        "{front}\n{body}",
        front = front_matter.render(offset),
        body = body_markdown
    )
}

pub fn local_timestamp(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string()
}

/// YAML single-quoted scalar.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
