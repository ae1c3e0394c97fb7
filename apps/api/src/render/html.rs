//! HTML rendering of a `RenderTree`.
//!
//! Emits a fragment where every animated element carries the
//! `animate-fadeInUp` class and an inline `animation-delay`. Styling is left
//! to the page that embeds the fragment.

use std::fmt::Write;

use crate::render::stagger::css_seconds;
use crate::render::tree::{Chip, ItemContent, RenderItem, RenderTree, SectionCard, SectionKind};

const ANIMATE: &str = "animate-fadeInUp";

pub fn render_html(tree: &RenderTree) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<div class=\"analyzed-record\">\n");

    if let Some(name) = &tree.name {
        let _ = writeln!(
            out,
            "  <h2 class=\"candidate-name {ANIMATE}\" style=\"{}\">{}</h2>",
            delay_style(name.delay),
            html_escape(&name.text)
        );
    }

    out.push_str("  <div class=\"sections\">\n");
    for card in &tree.sections {
        render_card(&mut out, card);
    }
    out.push_str("  </div>\n</div>\n");
    out
}

fn delay_style(delay: f64) -> String {
    format!("animation-delay: {}", css_seconds(delay))
}

fn render_card(out: &mut String, card: &SectionCard) {
    let _ = writeln!(
        out,
        "    <section class=\"section-card section-{} {ANIMATE}\" style=\"{}\">",
        kind_class(card.kind),
        delay_style(card.card_delay)
    );
    let _ = writeln!(
        out,
        "      <h3 class=\"{ANIMATE}\" style=\"{}\"><span class=\"emoji\">{}</span>{}</h3>",
        delay_style(card.heading_delay),
        card.emoji,
        html_escape(&card.title)
    );

    if !card.items.is_empty() {
        let list_class = match card.kind {
            SectionKind::Skills => "skill-list",
            SectionKind::Summary => "paragraphs",
            _ => "entries",
        };
        let _ = writeln!(out, "      <ul class=\"{list_class}\">");
        for item in &card.items {
            render_item(out, item);
        }
        out.push_str("      </ul>\n");
    }

    out.push_str("    </section>\n");
}

fn kind_class(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Contact => "contact",
        SectionKind::Summary => "summary",
        SectionKind::Experience => "experience",
        SectionKind::Education => "education",
        SectionKind::Skills => "skills",
        SectionKind::Projects => "projects",
        SectionKind::Custom => "custom",
    }
}

fn render_item(out: &mut String, item: &RenderItem) {
    let _ = write!(
        out,
        "        <li class=\"{ANIMATE}\" style=\"{}\">",
        delay_style(item.delay)
    );

    match &item.content {
        ItemContent::ContactLine {
            label, value, href, ..
        } => {
            let _ = write!(out, "<strong>{}</strong> ", html_escape(label));
            match href.as_deref().filter(|h| is_safe_link(h)) {
                Some(href) => {
                    let _ = write!(
                        out,
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                        html_escape(href),
                        html_escape(value)
                    );
                }
                None => out.push_str(&html_escape(value)),
            }
        }
        ItemContent::Paragraph { text } => {
            let _ = write!(out, "<p class=\"summary\">{}</p>", html_escape(text));
        }
        ItemContent::Experience(entry) => {
            let _ = write!(
                out,
                "<h4>{}</h4><p class=\"org\">{}{}</p><p class=\"dates\">{}</p>",
                html_escape(&entry.job_title),
                html_escape(&entry.company),
                location_suffix(entry.location.as_deref()),
                html_escape(&entry.dates)
            );
            bullet_list(out, &entry.responsibilities);
        }
        ItemContent::Education(entry) => {
            let _ = write!(
                out,
                "<h4>{}</h4><p class=\"org\">{}{}</p><p class=\"dates\">{}</p>",
                html_escape(&entry.degree),
                html_escape(&entry.institution),
                location_suffix(entry.location.as_deref()),
                html_escape(&entry.graduation_date)
            );
            bullet_list(out, entry.details.as_deref().unwrap_or_default());
        }
        ItemContent::SkillChip { text } => {
            let _ = write!(out, "<span class=\"chip\">{}</span>", html_escape(text));
        }
        ItemContent::SkillCategory { title } => {
            let _ = write!(out, "<h5>{}:</h5>", html_escape(title));
            chip_list(out, &item.chips);
        }
        ItemContent::Project(project) => {
            let _ = write!(out, "<h4>{}</h4>", html_escape(&project.name));
            match project.link.as_deref() {
                Some(link) if is_safe_link(link) => {
                    let _ = write!(
                        out,
                        "<p class=\"link\"><a href=\"{0}\" target=\"_blank\" rel=\"noopener noreferrer\">{0}</a></p>",
                        html_escape(link)
                    );
                }
                Some(link) => {
                    let _ = write!(out, "<p class=\"link\">{}</p>", html_escape(link));
                }
                None => {}
            }
            let _ = write!(out, "<p>{}</p>", html_escape(&project.description));
            if !item.chips.is_empty() {
                out.push_str("<strong>Technologies:</strong>");
                chip_list(out, &item.chips);
            }
        }
        ItemContent::ListItem { text } => out.push_str(&html_escape(text)),
    }

    out.push_str("</li>\n");
}

fn location_suffix(location: Option<&str>) -> String {
    match location {
        Some(loc) if !loc.is_empty() => format!(", {}", html_escape(loc)),
        _ => String::new(),
    }
}

fn bullet_list(out: &mut String, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str("<ul class=\"bullets\">");
    for line in lines {
        let _ = write!(out, "<li>{}</li>", html_escape(line));
    }
    out.push_str("</ul>");
}

fn chip_list(out: &mut String, chips: &[Chip]) {
    out.push_str("<ul class=\"chips\">");
    for chip in chips {
        let _ = write!(
            out,
            "<li class=\"chip {ANIMATE}\" style=\"{}\">{}</li>",
            delay_style(chip.delay),
            html_escape(&chip.text)
        );
    }
    out.push_str("</ul>");
}

/// Only scheme-less links and `http`, `https` or `mailto` URLs become anchors.
/// Browsers ignore whitespace and control characters inside a scheme, so
/// they are dropped before the scheme is read.
fn is_safe_link(link: &str) -> bool {
    let compact: String = link
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let Some((scheme, _)) = compact.split_once(':') else {
        return true;
    };
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    ["http", "https", "mailto"]
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{AnalyzedRecord, ContactInfo, NamedLists, ProjectEntry, Skills};
    use crate::render::tree::build_render_tree;

    #[test]
    fn test_escapes_user_text() {
        let record = AnalyzedRecord {
            name: Some("<script>alert('x')</script>".to_string()),
            ..Default::default()
        };
        let html = render_html(&build_render_tree(&record));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_name_heading_delay() {
        let record = AnalyzedRecord {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let html = render_html(&build_render_tree(&record));
        assert!(html.contains("style=\"animation-delay: 0.1s\">Ada</h2>"));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn test_card_and_chip_delays_in_markup() {
        let record = AnalyzedRecord {
            summary: Some("Builds compilers.".to_string()),
            skills: Some(Skills::Flat(vec!["Rust".to_string(), "C".to_string()])),
            ..Default::default()
        };
        let html = render_html(&build_render_tree(&record));
        // Skills is the second rendered section: card 0.15s, heading 0.3s, chips 0.3s / 0.35s.
        assert!(html.contains("section-skills animate-fadeInUp\" style=\"animation-delay: 0.15s\""));
        assert!(html.contains("style=\"animation-delay: 0.3s\"><span class=\"chip\">Rust</span>"));
        assert!(html.contains("style=\"animation-delay: 0.35s\"><span class=\"chip\">C</span>"));
    }

    #[test]
    fn test_project_renders_technologies_and_link() {
        let record = AnalyzedRecord {
            projects: vec![ProjectEntry {
                name: "Site".to_string(),
                description: "Portfolio".to_string(),
                technologies_used: Some(vec!["Rust".to_string()]),
                link: Some("https://example.com/?a=1&b=2".to_string()),
            }],
            custom_sections: NamedLists::from(vec![("Awards", vec!["Best"])]),
            ..Default::default()
        };
        let html = render_html(&build_render_tree(&record));
        assert!(html.contains("<strong>Technologies:</strong>"));
        assert!(html.contains("https://example.com/?a=1&amp;b=2"));
        assert!(html.contains("section-custom"));
    }

    #[test]
    fn test_link_schemes() {
        assert!(is_safe_link("https://example.com"));
        assert!(is_safe_link("HTTP://example.com"));
        assert!(is_safe_link("mailto:ada@example.com"));
        assert!(is_safe_link("github.com/ada"));
        assert!(is_safe_link("example.com/a:b"));
        assert!(!is_safe_link("javascript:alert(1)"));
        assert!(!is_safe_link(" JavaScript:alert(1)"));
        assert!(!is_safe_link("java\tscript:alert(1)"));
        assert!(!is_safe_link("data:text/html,<b>x</b>"));
    }

    #[test]
    fn test_script_links_render_as_text() {
        let record = AnalyzedRecord {
            contact_info: Some(ContactInfo {
                github: Some("javascript:alert(1)".to_string()),
                ..Default::default()
            }),
            projects: vec![ProjectEntry {
                name: "Site".to_string(),
                description: "Portfolio".to_string(),
                technologies_used: None,
                link: Some("JaVa\tScript:alert(2)".to_string()),
            }],
            ..Default::default()
        };
        let html = render_html(&build_render_tree(&record));
        assert!(!html.contains("<a href"));
        assert!(html.contains("<strong>GitHub:</strong> javascript:alert(1)</li>"));
        assert!(html.contains("<p class=\"link\">JaVa\tScript:alert(2)</p>"));
    }
}
