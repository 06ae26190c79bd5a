//! Parsers for `svn list` output.

use crate::error::ParseError;

/// One entry of `svn list --verbose`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Last changed revision of the entry
    pub revision: u64,
    /// Entry name without the trailing `/`
    pub name: String,
}

/// Names listed by `svn list <url>/tags`, trailing slashes removed
pub fn parse_tag_listing(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_end_matches('/'))
        .filter(|name| !name.is_empty() && *name != ".")
        .map(str::to_string)
        .collect()
}

/// Parse one line of `svn list --verbose`.
///
/// The first whitespace-separated token is the revision and the last one the
/// entry name. Returns `None` for blank lines and for the `./` self entry.
pub fn parse_verbose_line(line: &str) -> Result<Option<TagEntry>, ParseError> {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };

    let revision = first
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidRevision {
            line: line.to_string(),
        })?;

    let name = tokens
        .next_back()
        .map(|token| token.trim_end_matches('/'))
        .ok_or_else(|| ParseError::InvalidRevision {
            line: line.to_string(),
        })?;

    if name == "." || name.is_empty() {
        return Ok(None);
    }

    Ok(Some(TagEntry {
        revision,
        name: name.to_string(),
    }))
}

/// Parse the whole `svn list --verbose` output
pub fn parse_verbose_listing(raw: &str) -> Result<Vec<TagEntry>, ParseError> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        if let Some(entry) = parse_verbose_line(line)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Revision at which `tag` was last changed
pub fn revision_of(entries: &[TagEntry], tag: &str) -> Result<u64, ParseError> {
    entries
        .iter()
        .find(|entry| entry.name == tag)
        .map(|entry| entry.revision)
        .ok_or_else(|| ParseError::RevisionNotFound {
            tag: tag.to_string(),
        })
}

/// Revision range for the log query following a release at `boundary`
pub fn log_range(boundary: u64) -> Result<String, ParseError> {
    let first = boundary
        .checked_add(1)
        .ok_or(ParseError::RevisionOutOfRange { revision: boundary })?;
    Ok(format!("{}:HEAD", first))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERBOSE: &str = "   2210 rfernandes            Jul 01 10:15 ./
   1893 rfernandes            Mar 12  2013 2.5.0/
   2107 andrew                Jun 04 16:40 2.8.1/
   2205 rfernandes            Jul 01 09:58 3.0.1/
";

    #[test]
    fn test_tag_listing_strips_slashes() {
        let tags = parse_tag_listing("2.5.0/\n2.8.1/\n\n3.0.1/\n");
        assert_eq!(tags, vec!["2.5.0", "2.8.1", "3.0.1"]);
    }

    #[test]
    fn test_verbose_line_first_token_is_revision() {
        let entry = parse_verbose_line("   2107 andrew   Jun 04 16:40 2.8.1/")
            .unwrap()
            .unwrap();
        assert_eq!(entry.revision, 2107);
        assert_eq!(entry.name, "2.8.1");
    }

    #[test]
    fn test_verbose_self_entry_is_skipped() {
        assert_eq!(parse_verbose_line("  2210 rf Jul 01 10:15 ./").unwrap(), None);
        assert_eq!(parse_verbose_line("   ").unwrap(), None);
    }

    #[test]
    fn test_verbose_line_without_revision() {
        let err = parse_verbose_line("svn: E170000: URL doesn't exist").unwrap_err();
        assert!(matches!(err, ParseError::InvalidRevision { .. }));
    }

    #[test]
    fn test_revision_boundary_and_range() {
        let entries = parse_verbose_listing(VERBOSE).unwrap();
        assert_eq!(entries.len(), 3);

        let boundary = revision_of(&entries, "3.0.1").unwrap();
        assert_eq!(boundary, 2205);
        assert_eq!(log_range(boundary).unwrap(), "2206:HEAD");
    }

    #[test]
    fn test_log_range_at_last_revision() {
        assert!(matches!(
            log_range(u64::MAX),
            Err(ParseError::RevisionOutOfRange { revision: u64::MAX })
        ));
        assert_eq!(log_range(u64::MAX - 1).unwrap(), format!("{}:HEAD", u64::MAX));
    }

    #[test]
    fn test_revision_of_unknown_tag() {
        let entries = parse_verbose_listing(VERBOSE).unwrap();
        assert!(matches!(
            revision_of(&entries, "9.9.9"),
            Err(ParseError::RevisionNotFound { .. })
        ));
    }
}
