use crate::content::ContentNode;

/// Turns a plain-text document into paragraph nodes.
///
/// Paragraphs are separated by blank lines; the lines inside one paragraph
/// are joined with spaces and runs of whitespace collapse to one space.
pub fn parse(text: &str) -> Vec<ContentNode> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    split_into_paragraphs(text)
        .iter()
        .map(|paragraph| process_paragraph(paragraph))
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| ContentNode::leaf("p", paragraph))
        .collect()
}

/// Groups the trimmed non-blank lines of `text`; blank lines end a group
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut in_paragraph = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            in_paragraph = false;
            continue;
        }
        if !in_paragraph {
            paragraphs.push(Vec::new());
            in_paragraph = true;
        }
        if let Some(current) = paragraphs.last_mut() {
            current.push(line);
        }
    }

    paragraphs
}

/// Joins the lines of one paragraph into a single normalized line
pub fn process_paragraph(paragraph: &[&str]) -> String {
    collapse_whitespace(&paragraph.join(" "))
}

/// Collapses every run of whitespace into one space and trims the ends
pub fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapsed text of a sequence of text fragments
pub fn join_fragments<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    collapse_whitespace(&fragments.collect::<String>())
}
