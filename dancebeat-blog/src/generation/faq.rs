//! FAQ schema extraction from article markdown
//!
//! Articles may end with a `## FAQ` section of `Q:`/`A:` pairs. The
//! section is optional and a malformed one simply yields no FAQ.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FaqEntry;

static FAQ_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    // Everything between the FAQ heading and the next `## ` heading (or EOF)
    Regex::new(r"(?ims)^##[ \t]+FAQ[ \t]*$(.*?)(?:^##[ \t]|\z)").unwrap()
});

static QA_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:\*\*)?Q(?:\*\*)?[.:][ \t]*(.+?)[ \t]*$\n[ \t]*(?:\*\*)?A(?:\*\*)?[.:][ \t]*(.+?)[ \t]*$")
        .unwrap()
});

/// Extract `Q:`/`A:` pairs from a `## FAQ` section, if present.
///
/// Returns `None` when no FAQ section exists or it contains no parseable
/// pairs. Never an error.
pub fn extract_faq(content: &str) -> Option<Vec<FaqEntry>> {
    let section = FAQ_SECTION_RE.captures(content)?;
    let body = &section[1];

    let entries: Vec<FaqEntry> = QA_PAIR_RE
        .captures_iter(body)
        .map(|c| FaqEntry {
            question: c[1].trim().trim_matches('*').trim().to_string(),
            answer: c[2].trim().trim_matches('*').trim().to_string(),
        })
        .filter(|e| !e.question.is_empty() && !e.answer.is_empty())
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_pairs() {
        let content = "\
# Post

Body text.

## FAQ

Q: What shoes should I wear?
A: Anything with a smooth sole works to start.

Q: Do I need a partner?
A: No, socials rotate partners constantly.
";
        let faq = extract_faq(content).expect("FAQ section should parse");
        assert_eq!(faq.len(), 2);
        assert_eq!(faq[0].question, "What shoes should I wear?");
        assert_eq!(faq[1].answer, "No, socials rotate partners constantly.");
    }

    #[test]
    fn test_bold_markers() {
        let content = "## FAQ\n**Q:** One?\n**A:** Yes.\n";
        let faq = extract_faq(content).unwrap();
        assert_eq!(faq[0].question, "One?");
        assert_eq!(faq[0].answer, "Yes.");
    }

    #[test]
    fn test_section_ends_at_next_heading() {
        let content = "## FAQ\nQ: One?\nA: Yes.\n## Outro\nQ: Two?\nA: Should not appear.";
        let faq = extract_faq(content).unwrap();
        assert_eq!(faq.len(), 1);
    }

    #[test]
    fn test_missing_section_is_none() {
        assert!(extract_faq("# Post\n\nNo FAQ here.").is_none());
    }

    #[test]
    fn test_empty_section_is_none() {
        assert!(extract_faq("## FAQ\n\nNothing structured here.").is_none());
    }
}
