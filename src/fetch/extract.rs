//! Readable-content extraction: main article HTML, title, and markdown rendering.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::OnceLock;

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Title reported when a page has none.
pub const NO_TITLE: &str = "[no-title]";

const RENDER_WIDTH: usize = 100;
const MAX_CANDIDATES: usize = 20_000;

/// Main content of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadableContent {
    pub title: String,
    /// Outer HTML of the element judged to hold the main content.
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("document has no readable content")]
    Empty,
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("html conversion failed: {0}")]
    Convert(String),
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(e.to_string()))
}

fn class_or_id_lc(el: &ElementRef<'_>) -> String {
    let mut out = String::new();
    if let Some(c) = el.value().attr("class") {
        out.push_str(c);
        out.push(' ');
    }
    if let Some(i) = el.value().attr("id") {
        out.push_str(i);
    }
    out.to_ascii_lowercase()
}

fn is_boilerplate(el: &ElementRef<'_>) -> bool {
    if matches!(el.value().name(), "nav" | "header" | "footer" | "aside" | "form") {
        return true;
    }
    let s = class_or_id_lc(el);
    if s.is_empty() {
        return false;
    }
    [
        "nav", "navbar", "menu", "sidebar", "footer", "header", "banner", "cookie", "consent",
        "ads", "advert", "promo", "subscribe", "newsletter", "comment",
    ]
    .iter()
    .any(|bad| s.contains(bad))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    text: usize,
    links: usize,
}

/// Visible and in-link text lengths of every node in a document.
struct TextCounts(HashMap<NodeId, Counts>);

impl TextCounts {
    /// Single bottom-up pass over the tree.
    fn gather(doc: &Html) -> Self {
        let nodes: Vec<_> = doc.tree.root().descendants().collect();
        let mut by_node: HashMap<NodeId, Counts> = HashMap::with_capacity(nodes.len());
        // Reverse pre-order reaches every child before its parent.
        for node in nodes.iter().rev() {
            let mut counts = match node.value() {
                Node::Text(t) => Counts {
                    text: t.trim().chars().count(),
                    links: 0,
                },
                _ => node.children().fold(Counts::default(), |acc, child| {
                    let c = by_node.get(&child.id()).copied().unwrap_or_default();
                    Counts {
                        text: acc.text + c.text,
                        links: acc.links + c.links,
                    }
                }),
            };
            if matches!(node.value(), Node::Element(e) if e.name() == "a") {
                counts.links = counts.text;
            }
            by_node.insert(node.id(), counts);
        }
        Self(by_node)
    }

    fn of(&self, el: &ElementRef<'_>) -> Counts {
        self.0.get(&el.id()).copied().unwrap_or_default()
    }
}

/// Score candidates by dense non-link text, with bonuses for semantic containers.
fn score(el: &ElementRef<'_>, counts: Counts) -> Option<i64> {
    if is_boilerplate(el) {
        return None;
    }
    let Counts { text: txt, links: link_txt } = counts;
    if txt < 20 {
        return None;
    }
    let mut score = txt as i64 - 2 * link_txt as i64;
    match el.value().name() {
        "article" => score += 500,
        "main" => score += 300,
        _ => {}
    }
    if el.value().attr("role") == Some("main") {
        score += 300;
    }
    if link_txt > txt / 2 {
        score -= 500;
    }
    Some(score)
}

fn extract_title(doc: &Html) -> Result<String, ExtractError> {
    let title_sel = selector("title")?;
    let og_sel = selector(r#"meta[property="og:title"]"#)?;
    let h1_sel = selector("h1")?;

    let title = doc
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .or_else(|| {
            doc.select(&og_sel)
                .next()
                .and_then(|el| el.value().attr("content").map(str::to_string))
        })
        .or_else(|| doc.select(&h1_sel).next().map(|el| el.text().collect::<String>()))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty());
    Ok(title.unwrap_or_else(|| NO_TITLE.to_string()))
}

/// Pick the main content element of an HTML document.
///
/// Falls back to `<body>` when no container scores positively. A document with
/// no visible text at all is an error.
pub fn extract_readable(html: &str) -> Result<ReadableContent, ExtractError> {
    let doc = Html::parse_document(html);
    let title = extract_title(&doc)?;

    let candidates = selector(r#"article, main, [role="main"], section, div"#)?;
    let counts = TextCounts::gather(&doc);

    let mut best: Option<(i64, ElementRef<'_>)> = None;
    for el in doc.select(&candidates).take(MAX_CANDIDATES) {
        let Some(s) = score(&el, counts.of(&el)) else { continue };
        if s > 0 && best.as_ref().map_or(true, |(b, _)| s > *b) {
            best = Some((s, el));
        }
    }

    let content = match best {
        Some((_, el)) => el.html(),
        None => {
            let body = selector("body")?;
            let el = doc.select(&body).next().ok_or(ExtractError::Empty)?;
            if counts.of(&el).text == 0 {
                return Err(ExtractError::Empty);
            }
            el.inner_html()
        }
    };

    Ok(ReadableContent { title, html: content })
}

fn blank_runs() -> &'static Regex {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    BLANK_RUNS.get_or_init(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n").expect("valid regex"))
}

/// Render extracted HTML as markdown-flavoured plain text.
pub fn html_to_markdown(html: &str) -> Result<String, ExtractError> {
    let text = html2text::from_read(Cursor::new(html.as_bytes()), RENDER_WIDTH)
        .map_err(|e| ExtractError::Convert(e.to_string()))?;
    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(blank_runs().replace_all(&text, "\n\n").trim().to_string())
}
