/// Fallback used when the document has no name.
pub const DEFAULT_FILENAME: &str = "curriculo.pdf";

/// Longest slug kept, in bytes. With the prefix and extension the name stays
/// well under the usual 255-byte filesystem limit.
const MAX_SLUG_BYTES: usize = 200;

/// Export filename derived from the document's full name.
///
/// The name is trimmed, whitespace runs become a single `-`, and the result is
/// lower-cased. Punctuation is kept; path separators are replaced so the name
/// always stays inside the export directory. Long names are cut on a
/// character boundary.
pub fn export_filename(full_name: &str) -> String {
    let slug = full_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .replace(['/', '\\'], "-");
    let slug = truncate_slug(&slug);
    if slug.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("curriculo-{slug}.pdf")
    }
}

fn truncate_slug(slug: &str) -> &str {
    if slug.len() <= MAX_SLUG_BYTES {
        return slug;
    }
    let mut end = MAX_SLUG_BYTES;
    while !slug.is_char_boundary(end) {
        end -= 1;
    }
    slug[..end].trim_end_matches('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_slug() {
        assert_eq!(export_filename("Max K. Silva"), "curriculo-max-k.-silva.pdf");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            export_filename("  Ana \t Maria\nSouza  "),
            "curriculo-ana-maria-souza.pdf"
        );
    }

    #[test]
    fn test_empty_name_uses_default() {
        assert_eq!(export_filename(""), DEFAULT_FILENAME);
        assert_eq!(export_filename("   "), DEFAULT_FILENAME);
    }

    #[test]
    fn test_path_separators_are_neutralized() {
        let name = export_filename("../../etc/passwd");
        assert!(!name.contains('/'));
        assert_eq!(name, "curriculo-..-..-etc-passwd.pdf");
        assert_eq!(export_filename("a\\b"), "curriculo-a-b.pdf");
    }

    #[test]
    fn test_accents_are_lowercased_and_kept() {
        assert_eq!(export_filename("JOÃO Ávila"), "curriculo-joão-ávila.pdf");
    }

    #[test]
    fn test_long_names_are_capped() {
        let name = export_filename(&"Maria ".repeat(60));
        assert!(name.len() <= MAX_SLUG_BYTES + "curriculo-.pdf".len());
        assert!(name.starts_with("curriculo-maria-maria"));
        assert!(name.ends_with("-ma.pdf"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // The leading byte puts a two-byte char across the limit.
        let name = export_filename(&format!("a{}", "ã".repeat(150)));
        let slug = name
            .strip_prefix("curriculo-")
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .unwrap();
        assert_eq!(slug, format!("a{}", "ã".repeat(99)));
    }

    #[tokio::test]
    async fn test_long_name_can_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let name = export_filename(&"Maria ".repeat(60));
        tokio::fs::write(dir.path().join(&name), b"%PDF-").await.unwrap();
    }
}
