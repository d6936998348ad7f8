// Compiles the poll definition document into static page markup.

use log::{debug, info};

use crate::config::*;

/// Line that opens the generated poll region of the target page.
pub const POLLS_START_MARKER: &str = "<!-- POLLS START -->";
/// Line that closes the generated poll region of the target page.
pub const POLLS_END_MARKER: &str = "<!-- POLLS END -->";

const CATEGORY_LABEL: &str = "**Category:**";
const QUESTION_LABEL: &str = "**Question:**";
const OPTIONS_LABEL: &str = "**Options:**";

/// Derives the normalized internal value of an option from its display text:
/// lowercase, every non-ASCII-alphanumeric character replaced by `_`, and
/// truncated to 20 characters.
///
/// The derivation is deterministic. Regenerating a page keeps every option
/// value stable, which is what ties recorded responses back to options.
pub fn option_value(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(20)
        .collect()
}

// A section being assembled while the scanner walks the document.
#[derive(Debug, Clone)]
struct SectionAccumulator {
    number: String,
    title: Option<String>,
    category: String,
    question: String,
    options: Vec<PollOption>,
    in_options: bool,
}

impl SectionAccumulator {
    fn new(number: &str, heading_rest: &str) -> SectionAccumulator {
        let mut section = SectionAccumulator {
            number: number.to_string(),
            title: None,
            category: String::new(),
            question: String::new(),
            options: Vec::new(),
            in_options: false,
        };
        // Text after the colon of the heading is the first content of the
        // section: when non-blank it becomes the title.
        if !heading_rest.trim().is_empty() {
            section.title = Some(heading_rest.trim().to_string());
        }
        section
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if self.in_options {
            if is_option_line(trimmed) {
                if let Some(option) = parse_option_line(trimmed) {
                    self.options.push(option);
                }
                return;
            }
            // The first line that is not an option ends the list, whether it
            // is the `---` separator, a blank line or anything else.
            self.in_options = false;
        }
        if self.title.is_none() && !trimmed.is_empty() {
            self.title = Some(trimmed.to_string());
        }
        if let Some(rest) = line.strip_prefix(CATEGORY_LABEL) {
            self.category = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(QUESTION_LABEL) {
            self.question = rest.trim().to_string();
        } else if line.starts_with(OPTIONS_LABEL) {
            self.in_options = true;
        }
    }

    // A section only yields a poll when it has a question and at least one
    // parsed option. Anything else is dropped without an error.
    fn finish(self) -> Option<PollDefinition> {
        if self.question.is_empty() || self.options.is_empty() {
            debug!(
                "dropping poll section {:?}: no question or no options",
                self.number
            );
            return None;
        }
        Some(PollDefinition {
            id: format!("poll{}", self.number),
            title: self.title.unwrap_or_default(),
            category: self.category,
            question: self.question,
            options: self.options,
        })
    }
}

// `## Poll <N>:` headings. Returns the digits and the rest of the line after
// the colon.
fn poll_heading(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("## Poll ")?;
    let colon = rest.find(':')?;
    let number = &rest[..colon];
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((number, &rest[colon + 1..]))
}

fn is_option_line(trimmed: &str) -> bool {
    trimmed.starts_with("- ") && trimmed.contains('(') && trimmed.contains("%)")
}

// `- <text> (<percent>%)`. The percent group is the earliest ` (<digits>%)`
// occurrence, so trailing text after the group is tolerated and everything
// before it belongs to the option text.
fn parse_option_line(trimmed: &str) -> Option<PollOption> {
    let body = trimmed.strip_prefix("- ")?;
    let mut search = 0;
    while let Some(found) = body[search..].find(" (") {
        let open = search + found;
        let after = &body[open + 2..];
        if let Some(close) = after.find("%)") {
            let digits = &after[..close];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(percentage) = digits.parse::<u32>() {
                    let text = body[..open].trim();
                    if !text.is_empty() {
                        return Some(PollOption {
                            text: text.to_string(),
                            value: option_value(text),
                            percentage,
                        });
                    }
                }
            }
        }
        search = open + 1;
    }
    None
}

/// Parses the poll definition document into an ordered list of polls.
///
/// The document is divided into sections introduced by `## Poll <N>:`
/// headings; everything before the first heading is discarded. Sections
/// without a question or without any parsed option are silently dropped,
/// see the grammar description in [`crate::manual`].
pub fn parse_poll_definitions(document: &str) -> Vec<PollDefinition> {
    let mut polls: Vec<PollDefinition> = Vec::new();
    let mut current: Option<SectionAccumulator> = None;
    for line in document.lines() {
        if let Some((number, rest)) = poll_heading(line) {
            if let Some(section) = current.take() {
                polls.extend(section.finish());
            }
            current = Some(SectionAccumulator::new(number, rest));
        } else if let Some(section) = current.as_mut() {
            section.feed(line);
        }
        // Before the first heading: discard the line.
    }
    if let Some(section) = current.take() {
        polls.extend(section.finish());
    }
    info!(
        "parse_poll_definitions: {:?} polls parsed from the document",
        polls.len()
    );
    polls
}

/// Renders one poll into an HTML fragment.
///
/// The fragment shows the question, the category and one radio control per
/// option, grouped under the poll id so exactly one option is selectable.
/// Result bars start at `0 votes`: live counts are filled in by the page's
/// data path at runtime, not here.
pub fn render_poll(poll: &PollDefinition) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(&format!(
        r#"
                <div class="poll-card">
                    <div class="poll-header">
                        <h3 class="poll-question">{}</h3>
                        <div class="poll-meta">
                            <span class="poll-category">{}</span>
                        </div>
                    </div>
                    <div class="poll-options">"#,
        poll.question, poll.category
    ));
    for option in poll.options.iter() {
        html.push_str(&format!(
            r#"
                        <label class="poll-option">
                            <input type="radio" name="{}" value="{}">
                            <span class="option-text">{}</span>
                            <div class="option-bar">
                                <div class="option-fill" style="width: 0%"></div>
                                <span class="option-percentage">0 votes</span>
                            </div>
                        </label>"#,
            poll.id, option.value, option.text
        ));
    }
    html.push_str(&format!(
        r#"
                    </div>
                    <button class="submit-poll-btn" onclick="submitPoll('{}')">Submit Vote</button>
                </div>

"#,
        poll.id
    ));
    html
}

/// Replaces the region between the two sentinel markers of `template` with
/// the concatenation of `fragments`.
///
/// The first occurrence of each marker delimits the region; the markers
/// themselves are preserved and the replacement starts on a fresh line. When
/// either marker is missing the operation fails atomically with
/// [`MarkupErrors::MissingMarker`] and no output is produced.
pub fn splice_polls(template: &str, fragments: &[String]) -> Result<String, MarkupErrors> {
    let start = template
        .find(POLLS_START_MARKER)
        .ok_or(MarkupErrors::MissingMarker(POLLS_START_MARKER))?;
    let end = template
        .find(POLLS_END_MARKER)
        .ok_or(MarkupErrors::MissingMarker(POLLS_END_MARKER))?;

    let mut out = String::with_capacity(template.len());
    out.push_str(&template[..start + POLLS_START_MARKER.len()]);
    out.push('\n');
    for fragment in fragments.iter() {
        out.push_str(fragment);
    }
    out.push_str(&template[end..]);
    Ok(out)
}
