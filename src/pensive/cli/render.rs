//! Terminal output for command results.
//!
//! `render_*` functions build the text (colors included) so it can be tested;
//! `print_*` functions write it to stdout.

use colored::{ColoredString, Colorize};
use console::Term;
use pensive::api::{CmdMessage, MessageLevel};
use pensive::attachment::{AttachmentKind, AttachmentStatus};
use pensive::commands::overview::{AttachedItem, TitledItem};
use pensive::commands::{BackupFile, EntryView, Section, SectionBody, TagHits};
use pensive::config::AttachmentLayout;
use pensive::highlight::{Highlighted, MatchSegment};
use pensive::index::{index_label, letter_for};
use pensive::model::Category;
use std::time::SystemTime;
use timeago::Formatter;
use unicode_width::UnicodeWidthStr;

const DEFAULT_WIDTH: usize = 80;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_warning(text: &str) {
    println!("{}", text.yellow());
}

fn paint(line: &Highlighted, style: fn(&str) -> ColoredString) -> String {
    line.segments
        .iter()
        .map(|segment| match segment {
            MatchSegment::Plain(text) => text.clone(),
            MatchSegment::Match(text) => style(text).to_string(),
        })
        .collect()
}

fn tag_style(text: &str) -> ColoredString {
    text.blue()
}

fn hit_style(text: &str) -> ColoredString {
    text.red()
}

fn titled_line(item: &TitledItem) -> String {
    format!("{} {}", index_label(item.index), item.title)
}

fn attachment_lines(item: &AttachedItem, layout: AttachmentLayout) -> Vec<String> {
    let description = if item.description.is_empty() {
        String::new()
    } else {
        format!(" - {}", item.description)
    };
    match layout {
        AttachmentLayout::Lines => {
            let attachment = format!("        {}", item.attachment);
            vec![
                format!("{} {}{}", index_label(item.index), item.title, description),
                status_style(&item.status, &attachment).to_string(),
            ]
        }
        AttachmentLayout::Inline => {
            let mark = match (item.status.exists, item.status.kind) {
                (false, _) => "X".red(),
                (true, AttachmentKind::Url) => "→".blue(),
                (true, _) => "√".blue(),
            };
            let label = index_label(item.index);
            let open = label.trim_end_matches(']');
            vec![format!("{}|{}] {}{}", open, mark, item.title, description)]
        }
    }
}

fn status_style(status: &AttachmentStatus, text: &str) -> ColoredString {
    if status.exists {
        text.blue()
    } else {
        text.red()
    }
}

pub(super) fn render_section(section: &Section, layout: AttachmentLayout) -> String {
    let mut lines = vec![format!("{}:", section.category.name.bold())];
    match &section.body {
        SectionBody::Note(text) => {
            lines.extend(text.iter().map(|l| format!("    {}", paint(l, tag_style))));
        }
        SectionBody::Titled(items) => lines.extend(items.iter().map(titled_line)),
        SectionBody::Attached(items) => {
            for item in items {
                lines.extend(attachment_lines(item, layout));
            }
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

pub(super) fn print_sections(sections: &[Section], layout: AttachmentLayout) {
    for section in sections {
        println!("{}", render_section(section, layout));
    }
}

pub(super) fn render_entry(view: &EntryView) -> String {
    let title = view.entry.title().unwrap_or_default();
    let mut lines = vec![format!("{}:", title.bold())];
    lines.extend(view.lines.iter().map(|l| format!("    {}", paint(l, tag_style))));
    if let (Some(status), Some(attachment)) = (&view.attachment, view.entry.attachment()) {
        lines.push(format!(
            "    {}: {}",
            status.kind,
            status_style(status, attachment)
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

pub(super) fn render_category(category: &Category) -> String {
    let letter = letter_for(category.ordinal).unwrap_or('?');
    format!(
        "{} = {} ({})",
        letter.to_string().yellow(),
        category.name,
        category.format
    )
}

pub(super) fn print_categories(categories: &[Category]) {
    for category in categories {
        println!("{}", render_category(category));
    }
}

/// Lays tags out in as many columns as fit in `width`.
pub(super) fn render_tag_columns(tags: &[String], width: usize) -> Vec<String> {
    let cell = tags.iter().map(|t| t.width()).max().unwrap_or(0) + 2;
    let columns = (width / cell.max(1)).max(1);
    tags.chunks(columns)
        .map(|row| {
            row.iter()
                .map(|t| format!("{}{}", t, " ".repeat(cell - t.width())))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

pub(super) fn print_tags(tags: &[String]) {
    if tags.is_empty() {
        return;
    }
    let width = Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(DEFAULT_WIDTH);
    for row in render_tag_columns(tags, width) {
        println!("{}", row);
    }
    println!("{}", pensive::commands::tags::summary(tags.len()).dimmed());
}

/// `[tag] category(title): line`, tags and categories right-aligned.
pub(super) fn render_hits(hits: &[TagHits]) -> Vec<String> {
    let tag_width = hits.iter().map(|h| h.tag.width()).max().unwrap_or(0);
    let category_width = hits
        .iter()
        .flat_map(|h| h.hits.iter())
        .map(|hit| hit.category.width())
        .max()
        .unwrap_or(0);

    let mut out = Vec::new();
    for group in hits {
        let tag_pad = " ".repeat(tag_width - group.tag.width());
        for hit in &group.hits {
            let category_pad = " ".repeat(category_width - hit.category.width());
            let title = hit
                .title
                .as_ref()
                .map(|t| format!("({})", paint(t, hit_style)))
                .unwrap_or_default();
            let line = paint(&hit.line, hit_style);
            let line = if line.is_empty() {
                line
            } else {
                format!(": {}", line)
            };
            out.push(format!(
                "[{}{}] {}{}{}{}",
                tag_pad,
                group.tag.blue(),
                category_pad,
                hit.category,
                title,
                line
            ));
        }
    }
    out
}

pub(super) fn print_hits(hits: &[TagHits]) {
    for line in render_hits(hits) {
        println!("{}", line);
    }
}

fn age(modified: SystemTime) -> String {
    let elapsed = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    Formatter::new().convert(elapsed)
}

pub(super) fn print_backups(backups: &[BackupFile]) {
    for (i, backup) in backups.iter().enumerate() {
        println!(
            "{} {} {}",
            index_label(i),
            backup.name(),
            format!("({})", age(backup.modified)).dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pensive::commands::SearchHit;
    use pensive::model::{CategoryId, Format};

    fn plain() {
        colored::control::set_override(false);
    }

    fn category(ordinal: usize, format: Format) -> Category {
        Category {
            id: CategoryId(1),
            ordinal,
            name: "links".into(),
            format,
        }
    }

    #[test]
    fn category_line_shows_letter_or_placeholder() {
        plain();
        assert_eq!(render_category(&category(1, Format::Attached)), "B = links (2)");
        assert_eq!(render_category(&category(30, Format::Note)), "? = links (0)");
    }

    #[test]
    fn attached_section_layouts() {
        plain();
        let item = AttachedItem {
            index: 0,
            title: "Book".into(),
            description: "the book".into(),
            attachment: "https://git-scm.com".into(),
            status: AttachmentStatus {
                kind: AttachmentKind::Url,
                exists: true,
            },
        };
        let section = Section {
            category: category(1, Format::Attached),
            body: SectionBody::Attached(vec![item]),
        };
        assert_eq!(
            render_section(&section, AttachmentLayout::Lines),
            "links:\n    [0] Book - the book\n        https://git-scm.com\n"
        );
        assert_eq!(
            render_section(&section, AttachmentLayout::Inline),
            "links:\n    [0|→] Book - the book\n"
        );
    }

    #[test]
    fn hits_are_aligned() {
        plain();
        let hits = vec![
            TagHits {
                tag: "arch".into(),
                hits: vec![SearchHit {
                    category: "commands".into(),
                    title: None,
                    line: Highlighted::plain("pacman -S"),
                }],
            },
            TagHits {
                tag: "rust".into(),
                hits: vec![SearchHit {
                    category: "howtos".into(),
                    title: Some(Highlighted::plain("Cargo")),
                    line: Highlighted::plain("cargo add"),
                }],
            },
        ];
        assert_eq!(
            render_hits(&hits),
            vec![
                "[arch] commands: pacman -S",
                "[rust]   howtos(Cargo): cargo add"
            ]
        );
    }

    #[test]
    fn tags_fill_columns() {
        let tags: Vec<String> = ["a", "bb", "ccc", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(render_tag_columns(&tags, 10), vec!["a    bb", "ccc  d"]);
        assert_eq!(render_tag_columns(&tags, 1).len(), 4);
    }
}
