//! HTML to plain text.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never page text.
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "canvas",
];

/// Elements that start a new line of text.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Reduce an HTML document to its readable text.
///
/// Script, style and head content is dropped along with comments and tags.
/// Entities are decoded by the parser. Whitespace runs collapse to a single
/// space, block elements become line breaks, and blank lines are removed.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 2);
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_styles_and_comments() {
        let html = r#"<html><head><title>T</title><style>body { color: red }</style></head>
            <body><script>var x = "hidden";</script><!-- a comment -->
            <noscript>Enable JS</noscript><p>Visible text.</p></body></html>"#;
        assert_eq!(html_to_text(html), "Visible text.");
    }

    #[test]
    fn decodes_entities() {
        let html = "<p>Fish &amp; chips &lt;3 &quot;tasty&quot; &#8212; caf&eacute;</p>";
        assert_eq!(html_to_text(html), "Fish & chips <3 \"tasty\" \u{2014} café");
    }

    #[test]
    fn collapses_whitespace_and_breaks_blocks() {
        let html = "<div>  First\n\n   paragraph   here </div><p>Second <b>bold</b>\tpart</p>\n\n<ul><li>one</li><li>two</li></ul>";
        assert_eq!(
            html_to_text(html),
            "First paragraph here\nSecond bold part\none\ntwo"
        );
    }

    #[test]
    fn inline_elements_do_not_split_words() {
        assert_eq!(html_to_text("<p>Rust<em>acean</em>s</p>"), "Rustaceans");
    }

    #[test]
    fn empty_document_is_empty() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<html><head></head><body>  </body></html>"), "");
    }
}
