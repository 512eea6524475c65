//! Minimal HTML emission for rewritten markers.
//!
//! Only the pipeline's own output goes through here; author markup is never
//! re-serialized, it is either left untouched or replaced wholesale.

/// Emit an element. `None` attribute values are omitted; `body` of `None`
/// emits a void tag (`<img ...>`), `Some` emits an open/close pair.
pub(crate) fn element(tag: &str, attrs: &[(&str, Option<&str>)], body: Option<&str>) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        let Some(value) = value else { continue };
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(&mut out, value, true);
        out.push('"');
    }
    out.push('>');
    if let Some(body) = body {
        out.push_str(body);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(&mut out, value, false);
    out
}

fn escape_into(out: &mut String, value: &str, in_attr: bool) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            '\'' if in_attr => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Human-readable file size for the anchor body, binary units.
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{size:.1}{}", UNITS[unit])
    }
}
