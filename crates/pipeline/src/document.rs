//! Splitting of crawled repository documents
//!
//! A crawled `<repo>.txt` document holds a directory listing section followed
//! by a code content section.

/// Marker opening the directory listing section
pub const DIRECTORY_MARKER: &str = "### Directory Structure ###";

/// Marker opening the concatenated file contents section
pub const CODE_MARKER: &str = "### Code Content ###";

/// The two sections of a crawled repository document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlDocument {
    /// Indented listing text
    pub listing: String,
    /// Concatenated `File:` blocks
    pub code: String,
}

impl CrawlDocument {
    /// Split a crawled document into its listing and code sections.
    ///
    /// Returns `None` when the code marker is missing. The listing is the text
    /// after the last directory marker preceding the code marker (or all of
    /// it when there is no directory marker); the code is the text between
    /// the first code marker and the next one.
    pub fn split(text: &str) -> Option<Self> {
        let mut sections = text.split(CODE_MARKER);
        let head = sections.next()?;
        let code = sections.next()?;

        let listing = head.rsplit(DIRECTORY_MARKER).next().unwrap_or(head);

        Some(Self {
            listing: listing.trim().to_string(),
            code: code.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_well_formed_document() {
        let text = "Repository: demo\n### Directory Structure ###\nDirectory structure:\n└── a.py\n\n### Code Content ###\n====\nFile: a.py\n====\nprint(1)\n";
        let doc = CrawlDocument::split(text).unwrap();
        assert_eq!(doc.listing, "Directory structure:\n└── a.py");
        assert_eq!(doc.code, "====\nFile: a.py\n====\nprint(1)");
    }

    #[test]
    fn test_missing_code_marker_is_rejected() {
        assert_eq!(
            CrawlDocument::split("### Directory Structure ###\n└── a.py"),
            None
        );
    }

    #[test]
    fn test_code_stops_at_a_second_code_marker() {
        let text = "└── a.py\n### Code Content ###\nfirst\n### Code Content ###\nsecond";
        let doc = CrawlDocument::split(text).unwrap();
        assert_eq!(doc.listing, "└── a.py");
        assert_eq!(doc.code, "first");
    }
}
