//! HTML and plain-text projections of a `DisplayTree`.
//!
//! Every entry row carries `data-key`/`data-position` so the view can route
//! edit events back through the dispatcher.

use std::fmt::Write;

use crate::preview::{DisplayTree, Item, SectionBody};

pub fn to_html(tree: &DisplayTree) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<article class=\"resume theme-{}\" data-completeness=\"{}\">",
        tree.theme, tree.completeness
    );

    html.push_str("<header>");
    if !tree.header.name.is_empty() {
        let _ = write!(html, "<h1>{}</h1>", escape(&tree.header.name));
    }
    if !tree.header.contact.is_empty() {
        let contact: Vec<String> = tree.header.contact.iter().map(|c| escape(c)).collect();
        let _ = write!(html, "<p class=\"contact\">{}</p>", contact.join(" | "));
    }
    if !tree.header.links.is_empty() {
        html.push_str("<p class=\"links\">");
        for link in &tree.header.links {
            let link = escape(link);
            let _ = write!(html, "<a href=\"{link}\">{link}</a>");
        }
        html.push_str("</p>");
    }
    html.push_str("</header>");

    for section in &tree.sections {
        let _ = write!(
            html,
            "<section data-section=\"{}\"><h2>{}</h2>",
            section.id.as_str(),
            escape(&section.heading)
        );
        match &section.body {
            SectionBody::Text(text) => {
                let _ = write!(html, "<p>{}</p>", escape(text));
            }
            SectionBody::Items(items) => {
                html.push_str("<ul>");
                for item in items {
                    write_item(&mut html, item);
                }
                html.push_str("</ul>");
            }
            SectionBody::Tags(items) => {
                html.push_str("<p class=\"tags\">");
                for item in items {
                    let _ = write!(
                        html,
                        "<span class=\"tag\" data-key=\"{}\" data-position=\"{}\">{}</span>",
                        item.key,
                        item.position,
                        escape(&item.title)
                    );
                }
                html.push_str("</p>");
            }
        }
        html.push_str("</section>");
    }

    html.push_str("</article>");
    html
}

/// Terminal rendering. Rows are prefixed with their position and key.
pub fn to_text(tree: &DisplayTree) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} [{}] {}% complete ==",
        tree.title,
        tree.style.as_str(),
        tree.completeness
    );
    if !tree.header.name.is_empty() {
        let _ = writeln!(out, "{}", tree.header.name);
    }
    if !tree.header.contact.is_empty() {
        let _ = writeln!(out, "{}", tree.header.contact.join(" | "));
    }
    if !tree.header.links.is_empty() {
        let _ = writeln!(out, "{}", tree.header.links.join(" "));
    }

    for section in &tree.sections {
        let _ = writeln!(out, "\n{}", section.heading);
        match &section.body {
            SectionBody::Text(text) => {
                let _ = writeln!(out, "  {text}");
            }
            SectionBody::Items(items) => {
                for item in items {
                    let _ = writeln!(out, "  [{} {}] {}", item.position, item.key, item.title);
                    for line in [&item.subtitle, &item.meta, &item.body, &item.link] {
                        if !line.is_empty() {
                            let _ = writeln!(out, "      {line}");
                        }
                    }
                }
            }
            SectionBody::Tags(items) => {
                let tags: Vec<String> = items
                    .iter()
                    .map(|item| format!("[{} {}] {}", item.position, item.key, item.title))
                    .collect();
                let _ = writeln!(out, "  {}", tags.join("  "));
            }
        }
    }
    out
}

fn write_item(html: &mut String, item: &Item) {
    let _ = write!(
        html,
        "<li data-key=\"{}\" data-position=\"{}\"><h3>{}</h3>",
        item.key,
        item.position,
        escape(&item.title)
    );
    if !item.subtitle.is_empty() {
        let _ = write!(html, "<p class=\"subtitle\">{}</p>", escape(&item.subtitle));
    }
    if !item.meta.is_empty() {
        let _ = write!(html, "<p class=\"meta\">{}</p>", escape(&item.meta));
    }
    if !item.body.is_empty() {
        let _ = write!(html, "<p>{}</p>", escape(&item.body));
    }
    if !item.link.is_empty() {
        let link = escape(&item.link);
        let _ = write!(html, "<a href=\"{link}\">{link}</a>");
    }
    html.push_str("</li>");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
