//! Inline markup that embeds live variables in a document body.
//!
//! A rendered variable is a pair of spans around its current value:
//!
//! ```text
//! <span query="sum(a, b)"></span>42<span type="end"></span>
//! ```
//!
//! Two older forms are still recognised and upgraded when rendered:
//! `<span id="REF"/>VALUE<span type="end"/>` and
//! `<span query="Q"/>VALUE<span type="end"/>`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::{
    functions::{EvaluationContext, compute_value},
    output::stringify,
    query::QueryParser,
    value::Value,
};

/// Encoding of a newline inside the `query` attribute.
pub const NEWLINE_ENTITY: &str = "&#10;";

static ID_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span id="([^"]+)"/>.*?<span type="end"/>"#).expect("invalid id span pattern")
});

static SELF_CLOSING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span query="([^"]+)"/>.*?<span type="end"/>"#)
        .expect("invalid self-closing span pattern")
});

static PAIRED_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span query="([^"]+?)"></span>.*?<span type="end"></span>"#)
        .expect("invalid paired span pattern")
});

/// The recognised span forms, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanFormat {
    /// `<span id="REF"/>`, a bare reference read as `get(REF)`
    Id,
    /// `<span query="Q"/>`
    SelfClosing,
    /// `<span query="Q"></span>`, the form written today
    Paired,
}

impl SpanFormat {
    pub const ALL: [SpanFormat; 3] = [SpanFormat::Id, SpanFormat::SelfClosing, SpanFormat::Paired];

    fn pattern(self) -> &'static Regex {
        match self {
            SpanFormat::Id => &ID_SPAN,
            SpanFormat::SelfClosing => &SELF_CLOSING_SPAN,
            SpanFormat::Paired => &PAIRED_SPAN,
        }
    }

    /// The query text held by a matched span.
    fn query(self, attribute: &str) -> String {
        match self {
            SpanFormat::Id => format!("get({attribute})"),
            SpanFormat::SelfClosing | SpanFormat::Paired => decode_query(attribute),
        }
    }
}

/// Escapes a query for use as an attribute value.
pub fn encode_query(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for ch in query.chars() {
        match ch {
            '&' => encoded.push_str("&amp;"),
            '"' => encoded.push_str("&quot;"),
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '\n' => encoded.push_str(NEWLINE_ENTITY),
            c => encoded.push(c),
        }
    }
    encoded
}

/// Reverses [`encode_query`].
pub fn decode_query(encoded: &str) -> String {
    encoded
        .replace(NEWLINE_ENTITY, "\n")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Builds a span showing `value` for `query`.
///
/// # Examples
///
/// ```
/// use livevars::{Value, markup::span};
///
/// assert_eq!(
///     span("get(total)", &Value::Integer(3)),
///     r#"<span query="get(total)"></span>3<span type="end"></span>"#
/// );
/// ```
pub fn span(query: &str, value: &Value) -> String {
    format!(
        r#"<span query="{}"></span>{}<span type="end"></span>"#,
        encode_query(query),
        stringify(value)
    )
}

/// Queries of every span in `text`, in format order.
pub fn queries(text: &str) -> Vec<String> {
    SpanFormat::ALL
        .iter()
        .flat_map(|format| {
            format
                .pattern()
                .captures_iter(text)
                .map(move |captures| format.query(&captures[1]))
        })
        .collect()
}

/// Recomputes every span in `text` and rewrites it in the paired form.
///
/// A span whose query does not parse or evaluates to nothing is left as it
/// is; the remaining spans are still rendered.
pub fn render(text: &str, ctx: &EvaluationContext<'_>, parser: &QueryParser) -> String {
    let mut rendered = text.to_string();
    for format in SpanFormat::ALL {
        let replaced = format
            .pattern()
            .replace_all(&rendered, |captures: &Captures<'_>| {
                rerender(format, captures, ctx, parser)
            })
            .into_owned();
        rendered = replaced;
    }
    rendered
}

fn rerender(
    format: SpanFormat,
    captures: &Captures<'_>,
    ctx: &EvaluationContext<'_>,
    parser: &QueryParser,
) -> String {
    let original = &captures[0];
    let query = format.query(&captures[1]);

    let parsed = match parser.parse(&query) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("skipping span in {}: {}", ctx.current_document, e);
            return original.to_string();
        }
    };
    match compute_value(&parsed, ctx) {
        Some(value) => span(&query, &value),
        None => {
            debug!("'{}' has no value, span left unchanged", query);
            original.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_is_reversible() {
        let query = "jsFunc(a, func = (x) => x > 1 && \"big\"\n)";
        let encoded = encode_query(query);
        assert!(!encoded.contains(['"', '<', '>', '\n']));
        assert_eq!(decode_query(&encoded), query);
    }

    #[test]
    fn ampersand_entities_survive() {
        assert_eq!(decode_query(&encode_query("&lt;")), "&lt;");
    }

    #[test]
    fn collects_queries_from_every_format() {
        let text = concat!(
            r#"<span id="a"/>1<span type="end"/> "#,
            r#"<span query="sum(a, b)"/>3<span type="end"/> "#,
            r#"<span query="get(c)"></span>x<span type="end"></span>"#,
        );
        assert_eq!(queries(text), vec!["get(a)", "sum(a, b)", "get(c)"]);
    }
}
