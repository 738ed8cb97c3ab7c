use scraper::node::Element;
use scraper::{ElementRef, Html, Node};

/// Elements dropped with their content before static text extraction
pub const STRIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "nav", "footer", "header", "aside", "iframe",
];

/// Numeric entity that survives entity blanking (the apostrophe)
const KEPT_NUMERIC_ENTITY: &str = "&#39;";

/// The only named entities decoded to characters
const DECODED_NAMED_ENTITIES: [&str; 5] = ["&nbsp;", "&amp;", "&lt;", "&gt;", "&quot;"];

/// Plain single-line text of a whole HTML document
///
/// Drops the [`STRIPPED_TAGS`] subtrees, turns numeric entities other than
/// `&#39;` into spaces and collapses whitespace.
pub fn clean_text(html: &str) -> String {
    let document = parse_for_text(html);
    let text = collect_text(document.root_element(), &|element| {
        STRIPPED_TAGS.contains(&element.name())
    });
    normalize(&text)
}

/// Concatenates the text below `root`, skipping every subtree for which
/// `skip` returns true. Element boundaries become spaces.
pub fn collect_text(root: ElementRef, skip: &dyn Fn(&Element) -> bool) -> String {
    let mut out = String::new();
    push_text(root, skip, &mut out);
    out
}

fn push_text(element: ElementRef, skip: &dyn Fn(&Element) -> bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                out.push(' ');
                if !skip(el) {
                    if let Some(child) = ElementRef::wrap(child) {
                        push_text(child, skip, out);
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Collapses whitespace runs to one space and trims
///
/// Angle brackets decoded from `&lt;`/`&gt;` are treated as whitespace so
/// the result never looks like markup.
pub fn normalize(text: &str) -> String {
    text.replace(['<', '>'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `html` so that only `&nbsp; &amp; &lt; &gt; &quot; &#39;` decode
///
/// Other numeric entities become spaces and other named ones stay literal.
pub fn parse_for_text(html: &str) -> Html {
    Html::parse_document(&escape_named_entities(&blank_numeric_entities(html)))
}

/// Escapes the `&` of every named entity outside [`DECODED_NAMED_ENTITIES`]
fn escape_named_entities(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let named = candidate[1..].starts_with(|c: char| c.is_ascii_alphabetic());
        if named && !DECODED_NAMED_ENTITIES.iter().any(|e| candidate.starts_with(e)) {
            out.push_str("&amp;");
        } else {
            out.push('&');
        }
        rest = &candidate[1..];
    }
    out.push_str(rest);
    out
}

/// Replaces `&#NNN;` and `&#xHH;` with a space, except `&#39;`
fn blank_numeric_entities(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match numeric_entity_len(candidate) {
            Some(len) if &candidate[..len] != KEPT_NUMERIC_ENTITY => {
                out.push(' ');
                rest = &candidate[len..];
            }
            _ => {
                out.push_str("&#");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of the numeric entity at the start of `s`, including `&#` and `;`
fn numeric_entity_len(s: &str) -> Option<usize> {
    let body = &s[2..];
    let (digits, offset) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (
            hex.bytes().take_while(|b| b.is_ascii_hexdigit()).count(),
            3,
        ),
        None => (body.bytes().take_while(|b| b.is_ascii_digit()).count(), 2),
    };
    if digits == 0 || s.as_bytes().get(offset + digits) != Some(&b';') {
        return None;
    }
    Some(offset + digits + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_noise_elements_with_content() {
        let html = r#"
            <html><head><title>Soup</title><style>body { color: red; }</style></head>
            <body>
                <header>Site header</header>
                <nav><a href="/">Home</a></nav>
                <script>var secret = "leak";</script>
                <noscript>Enable JS</noscript>
                <h1>Tomato   Soup</h1>
                <p>Simmer for <b>20</b> minutes.</p>
                <aside>Popular posts</aside>
                <iframe src="https://ads.example.com">ad</iframe>
                <footer>Copyright</footer>
            </body></html>
        "#;

        let text = clean_text(html);
        assert_eq!(text, "Soup Tomato Soup Simmer for 20 minutes.");
    }

    #[test]
    fn test_decodes_common_entities() {
        let html = "<p>Salt&nbsp;&amp;&nbsp;pepper &quot;to taste&quot; isn&#39;t optional</p>";
        assert_eq!(clean_text(html), "Salt & pepper \"to taste\" isn't optional");
    }

    #[test]
    fn test_other_numeric_entities_become_spaces() {
        let html = "<p>Cook&#8212;then serve&#x2014;hot &#169; 2024</p>";
        assert_eq!(clean_text(html), "Cook then serve hot 2024");
    }

    #[test]
    fn test_other_named_entities_stay_literal() {
        let html = "<p>&copy; 2024 &eacute;t&eacute; &hellip; &amp;copy;</p>";
        assert_eq!(clean_text(html), "&copy; 2024 &eacute;t&eacute; &hellip; &copy;");
        // No semicolon: the legacy forms are not decoded either
        assert_eq!(clean_text("<p>&copy 2024 &amp; more</p>"), "&copy 2024 & more");
    }

    #[test]
    fn test_escape_named_entities() {
        assert_eq!(escape_named_entities("a &lt; b &apos;"), "a &lt; b &amp;apos;");
        assert_eq!(escape_named_entities("&nbsp;&AMP;"), "&nbsp;&amp;AMP;");
        assert_eq!(escape_named_entities("fish & chips &#39;"), "fish & chips &#39;");
        assert_eq!(escape_named_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_never_emits_angle_brackets_or_double_spaces() {
        let inputs = [
            "<p>1 &lt; 2 &gt; 0</p>",
            "<div><p>broken <b>markup</div>",
            "<p>a\n\n\tb</p><p>   c   </p>",
            "plain text with a < sign",
            "",
        ];
        for html in inputs {
            let text = clean_text(html);
            assert!(!text.contains('<') && !text.contains('>'), "{html:?} -> {text:?}");
            assert!(!text.contains("  "), "{html:?} -> {text:?}");
            assert_eq!(text, text.trim());
        }
    }

    #[test]
    fn test_blank_numeric_entities_keeps_apostrophe_and_incomplete() {
        assert_eq!(blank_numeric_entities("it&#39;s"), "it&#39;s");
        assert_eq!(blank_numeric_entities("a&#160;b"), "a b");
        assert_eq!(blank_numeric_entities("a&#xA0;b"), "a b");
        assert_eq!(blank_numeric_entities("a&#12b"), "a&#12b");
        assert_eq!(blank_numeric_entities("a&#;b"), "a&#;b");
        assert_eq!(blank_numeric_entities("&#"), "&#");
    }

    #[test]
    fn test_collect_text_skips_subtrees() {
        let document = Html::parse_fragment("<div>keep<span class=\"x\">drop</span>this</div>");
        let text = collect_text(document.root_element(), &|el| el.attr("class") == Some("x"));
        assert_eq!(normalize(&text), "keep this");
    }
}
