use crate::content::ContentNode;
use crate::parsers::text;

#[cfg(test)]
mod basic_tests {
    use super::*;

    fn paragraphs(input: &str) -> Vec<ContentNode> {
        text::parse(input)
    }

    #[test]
    fn test_empty_text() {
        assert!(paragraphs("").is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        assert!(paragraphs("   \n   \t   \r\n   ").is_empty());
    }

    #[test]
    fn test_single_line() {
        assert_eq!(
            paragraphs("Hello, world!"),
            vec![ContentNode::leaf("p", "Hello, world!")]
        );
    }

    #[test]
    fn test_lines_of_one_paragraph_are_joined() {
        assert_eq!(
            paragraphs("Line 1\nLine 2\nLine 3"),
            vec![ContentNode::leaf("p", "Line 1 Line 2 Line 3")]
        );
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        assert_eq!(
            paragraphs("Paragraph 1.\n\n\nParagraph 2.\n\nParagraph 3."),
            vec![
                ContentNode::leaf("p", "Paragraph 1."),
                ContentNode::leaf("p", "Paragraph 2."),
                ContentNode::leaf("p", "Paragraph 3."),
            ]
        );
    }

    #[test]
    fn test_multiple_spaces_between_words() {
        assert_eq!(
            paragraphs("Hello    world!    This  \t  is    a    test."),
            vec![ContentNode::leaf("p", "Hello world! This is a test.")]
        );
    }

    #[test]
    fn test_markup_is_kept_as_text() {
        // Escaping happens at render time, not here
        assert_eq!(
            paragraphs("a <b> & c"),
            vec![ContentNode::leaf("p", "a <b> & c")]
        );
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_split_into_paragraphs() {
        assert!(text::split_into_paragraphs("").is_empty());

        let result = text::split_into_paragraphs("Line 1a\nLine 1b\n\nLine 2a\nLine 2b");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], vec!["Line 1a", "Line 1b"]);
        assert_eq!(result[1], vec!["Line 2a", "Line 2b"]);

        let result = text::split_into_paragraphs("Paragraph 1.\n\n\n\nParagraph 2.");
        assert_eq!(result, vec![vec!["Paragraph 1."], vec!["Paragraph 2."]]);
    }

    #[test]
    fn test_process_paragraph() {
        assert_eq!(
            text::process_paragraph(&["Line  1", " Line 2 ", "Line 3"]),
            "Line 1 Line 2 Line 3"
        );
        assert_eq!(text::process_paragraph(&[]), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(text::collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(text::collapse_whitespace(""), "");
        assert_eq!(text::join_fragments(["He", "llo ", " world"].into_iter()), "Hello world");
    }
}
