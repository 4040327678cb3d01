/// Extension of `name`: the substring after the last `.`, lowercased.
/// A name without a dot has no extension.
pub fn source_extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    Some(name[idx + 1..].to_ascii_lowercase())
}

/// Removes the token matching the source file's extension from the output
/// format list (case-insensitive exact match). Order is preserved; with no
/// extension nothing is filtered.
pub fn filter_formats(source_name: Option<&str>, formats: &[String]) -> Vec<String> {
    let ext = source_name.and_then(source_extension);
    formats
        .iter()
        .filter(|format| match &ext {
            Some(ext) => !format.eq_ignore_ascii_case(ext),
            None => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn extension_is_lowercased_tail() {
        assert_eq!(source_extension("report.PDF"), Some("pdf".to_string()));
        assert_eq!(source_extension("a.b.c.TXT"), Some("txt".to_string()));
        assert_eq!(source_extension("archive"), None);
    }

    #[test]
    fn source_format_is_excluded_in_order() {
        let formats = tokens(&["docx", "md", "pdf", "txt"]);
        let presented = filter_formats(Some("report.pdf"), &formats);
        assert_eq!(presented, tokens(&["docx", "md", "txt"]));
    }

    #[test]
    fn filtering_is_case_insensitive() {
        let formats = tokens(&["MP4", "webm"]);
        let presented = filter_formats(Some("clip.mp4"), &formats);
        assert_eq!(presented, tokens(&["webm"]));
    }

    #[test]
    fn no_extension_means_no_filtering() {
        let formats = tokens(&["docx", "txt"]);
        let presented = filter_formats(Some("archive"), &formats);
        assert_eq!(presented, formats);
    }
}
