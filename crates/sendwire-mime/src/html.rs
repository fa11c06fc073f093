//! Converting message bodies between plain text and HTML.

/// Tags that end a line of text when stripped.
const LINE_BREAK_TAGS: &[&str] = &["br", "/p", "/div", "/li"];

/// Entities decoded by [`strip_html`].
const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&nbsp;", ' '),
];

/// Reduces an HTML-ish body to plain text.
///
/// Tags are removed; `<br>`, `</p>`, `</div>` and `</li>` become newlines.
/// Common entities are decoded in a single pass, so `&amp;lt;` yields the
/// text `&lt;`. A `<` not followed by a letter, `/` or `!` is kept as text,
/// as is an unterminated tag.
#[must_use]
pub fn strip_html(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let opens_tag = candidate[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

        match candidate.find('>') {
            Some(end) if opens_tag => {
                if is_line_break(&candidate[1..end]) {
                    text.push('\n');
                }
                rest = &candidate[end + 1..];
            }
            _ => {
                text.push('<');
                rest = &candidate[1..];
            }
        }
    }
    text.push_str(rest);

    decode_entities(&text)
}

fn is_line_break(tag: &str) -> bool {
    let tag = tag.trim().trim_end_matches('/');
    let name = tag.split_whitespace().next().unwrap_or_default();
    LINE_BREAK_TAGS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(name))
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match ENTITIES
            .iter()
            .find(|(entity, _)| candidate.starts_with(entity))
        {
            Some((entity, c)) => {
                out.push(*c);
                rest = &candidate[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Wraps a body in a minimal styled HTML document.
///
/// Each newline becomes `<br>` followed by a real line break, so long
/// bodies do not end up on one line.
#[must_use]
pub fn html_document(body: &str) -> String {
    let content = body.replace("\r\n", "\n").replace('\n', "<br>\n");

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <style>\n\
         body {{ font-family: Arial, Helvetica, sans-serif; line-height: 1.6; color: #333333; }}\n\
         .content {{ max-width: 600px; margin: 0 auto; padding: 20px; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <div class=\"content\">\n\
         {content}\n\
         </div>\n\
         </body>\n\
         </html>"
    )
}
