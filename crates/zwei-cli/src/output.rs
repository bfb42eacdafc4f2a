//! Formatting of archive contents for test mode

use std::fmt::Write;

use zwei_dat::DatArchive;

use crate::OutputFormat;

/// Render an archive's table-of-contents as indented text
pub fn format_archive_text(archive: &DatArchive) -> String {
    let mut out = String::new();
    for group in &archive.groups {
        // Writing to String cannot fail, so we discard the result
        let _ = writeln!(
            out,
            ".{}  {} member(s), table at {}",
            group.extension,
            group.count(),
            group.table_pos
        );
        for member in &group.members {
            let _ = writeln!(
                out,
                "    {:<12}  size {:>10}  offset {:>10}",
                member.file_name(&group.extension),
                member.size,
                member.offset
            );
        }
    }
    let _ = write!(
        out,
        "{} group(s), {} member(s), {} bytes",
        archive.groups.len(),
        archive.member_count(),
        archive.payload_end()
    );
    out
}

/// Render an archive in the requested format
pub fn format_archive(archive: &DatArchive, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => format_archive_text(archive),
        OutputFormat::Json => serde_json::to_string(archive)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(archive)?,
    })
}

/// Print an archive to stdout in the requested format
pub fn print_archive(archive: &DatArchive, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", format_archive(archive, format)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use zwei_dat::{ExtensionGroup, MemberEntry};

    fn sample() -> DatArchive {
        DatArchive::new(vec![ExtensionGroup::new(
            "txt",
            20,
            vec![MemberEntry::new("readme", 4, 36)],
        )])
    }

    #[test]
    fn test_text_output() {
        let text = format_archive_text(&sample());
        assert!(text.starts_with(".txt  1 member(s), table at 20"));
        assert!(text.contains("readme.txt"));
        assert!(text.contains("offset         36"));
        assert!(text.ends_with("1 group(s), 1 member(s), 40 bytes"));
    }

    #[test]
    fn test_json_output() {
        let json = format_archive(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["groups"][0]["extension"], "txt");
        assert_eq!(value["groups"][0]["table_pos"], 20);
        assert_eq!(value["groups"][0]["count"], 1);
        assert_eq!(value["groups"][0]["members"][0]["name"], "readme");
        assert_eq!(value["groups"][0]["members"][0]["offset"], 36);

        let pretty = format_archive(&sample(), OutputFormat::JsonPretty).unwrap();
        assert!(pretty.contains('\n'));
    }
}
