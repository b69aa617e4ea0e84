/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::makefile
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Read and rewrite the two version markers of the port
    Makefile: PORTVERSION and GH_TAGNAME.

  Security / Safety Notes:
    Only the captured value tokens are replaced; every other
    byte of the Makefile is preserved as-is.

  Dependencies:
    regex (bytes API) for capture-and-replace.

  Operational Scope:
    Supplies the local VersionInfo and persists the upstream
    version before the build tool regenerates derived files.

  Revision History:
    2025-11-02 COD  Authored Makefile marker handling.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fixed, anchored patterns with explicit failure modes
    - Byte-preserving edits
============================================================*/

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::{Captures, Regex};

use crate::error::{PortError, Result};
use crate::version::VersionInfo;

fn portversion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(PORTVERSION=[\t\n\f\r ]+)([0-9]+)")
            .expect("PORTVERSION regex must compile")
    })
}

fn tagname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(GH_TAGNAME=[\t\n\f\r ]+)([0-9A-Za-z_]+)")
            .expect("GH_TAGNAME regex must compile")
    })
}

/// Read the Makefile into memory.
pub fn read_makefile(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| {
        PortError::Filesystem(format!("Failed to read {}: {err}", path.display()))
    })
}

/// Extract the local version from Makefile bytes.
///
/// The first occurrence of each marker wins.
pub fn local_version(makefile: &[u8]) -> Result<VersionInfo> {
    let raw_date = capture_value(portversion_re(), makefile, "PORTVERSION")?;
    let raw_date = std::str::from_utf8(raw_date)
        .map_err(|err| PortError::Parse(format!("PORTVERSION is not UTF-8: {err}")))?;
    let numeric_date = raw_date.parse::<u32>().map_err(|err| {
        PortError::Parse(format!("PORTVERSION `{raw_date}` is not a valid number: {err}"))
    })?;

    let tag = capture_value(tagname_re(), makefile, "GH_TAGNAME")?;
    let identifier = std::str::from_utf8(tag)
        .map_err(|err| PortError::Parse(format!("GH_TAGNAME is not UTF-8: {err}")))?;

    Ok(VersionInfo::new(numeric_date, identifier))
}

fn capture_value<'a>(re: &Regex, haystack: &'a [u8], field: &str) -> Result<&'a [u8]> {
    re.captures(haystack)
        .and_then(|caps| caps.get(2))
        .map(|value| value.as_bytes())
        .ok_or_else(|| PortError::Parse(format!("Can't find {field} in the Makefile")))
}

/// Substitute every marker value with the given version.
pub fn rewrite(makefile: &[u8], info: &VersionInfo) -> Vec<u8> {
    let tagged = replace_value(tagname_re(), makefile, info.identifier.as_bytes());
    let date = info.numeric_date.to_string();
    replace_value(portversion_re(), &tagged, date.as_bytes())
}

fn replace_value(re: &Regex, haystack: &[u8], value: &[u8]) -> Vec<u8> {
    re.replace_all(haystack, |caps: &Captures<'_>| {
        let mut out = caps[1].to_vec();
        out.extend_from_slice(value);
        out
    })
    .into_owned()
}

/// Overwrite the Makefile with `contents`.
pub fn write_makefile(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path).map_err(|err| {
        PortError::Filesystem(format!("Failed to open {} for writing: {err}", path.display()))
    })?;
    file.write_all(contents).map_err(|err| {
        PortError::Filesystem(format!("Failed to write {}: {err}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MAKEFILE: &str = "\
PORTNAME=\tohmyzsh
PORTVERSION=\t20230101
CATEGORIES=\tshells

MAINTAINER=\tports@example.org
COMMENT=\tFramework for managing zsh configuration

USE_GITHUB=\tyes
GH_TAGNAME=\t3b2f1a9c

NO_ARCH=\tyes
NO_BUILD=\tyes

.include <bsd.port.mk>
";

    #[test]
    fn reads_both_markers() {
        let info = local_version(MAKEFILE.as_bytes()).unwrap();
        assert_eq!(info, VersionInfo::new(20230101, "3b2f1a9c"));
    }

    #[test]
    fn reads_markers_regardless_of_whitespace() {
        let text = b"# header\nGH_TAGNAME=     v1_2\n\nPORTVERSION=  \t  20221224\n";
        let info = local_version(text).unwrap();
        assert_eq!(info, VersionInfo::new(20221224, "v1_2"));
    }

    #[test]
    fn missing_portversion_is_fatal() {
        let err = local_version(b"GH_TAGNAME=\tabc\n").unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
        assert!(err.to_string().contains("PORTVERSION"));
    }

    #[test]
    fn missing_tagname_is_fatal() {
        let err = local_version(b"PORTVERSION=\t20230101\n").unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
        assert!(err.to_string().contains("GH_TAGNAME"));
    }

    #[test]
    fn separator_is_ascii_whitespace_only() {
        let text = "PORTVERSION=\u{00a0}20230101\nGH_TAGNAME=\tabc\n";
        let err = local_version(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("PORTVERSION"));
    }

    #[test]
    fn marker_without_whitespace_does_not_match() {
        let err = local_version(b"PORTVERSION=20230101\nGH_TAGNAME=\tabc\n").unwrap_err();
        assert!(err.to_string().contains("PORTVERSION"));
    }

    #[test]
    fn oversized_portversion_is_fatal() {
        let err = local_version(b"PORTVERSION=\t99999999999\nGH_TAGNAME=\tabc\n").unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
    }

    #[test]
    fn values_stop_at_non_ascii_characters() {
        let text = "PORTVERSION=\t20230101\u{0661}\nGH_TAGNAME=\tabc\u{00e9}\n";
        let info = local_version(text.as_bytes()).unwrap();
        assert_eq!(info, VersionInfo::new(20230101, "abc"));

        let rewritten = rewrite(text.as_bytes(), &VersionInfo::new(20230601, "f00d"));
        assert_eq!(
            String::from_utf8(rewritten).unwrap(),
            "PORTVERSION=\t20230601\u{0661}\nGH_TAGNAME=\tf00d\u{00e9}\n"
        );
    }

    #[test]
    fn rewrite_then_read_round_trips() {
        let remote = VersionInfo::new(20230601, "0f1e2d3c4b5a69788796a5b4c3d2e1f001234567");
        let rewritten = rewrite(MAKEFILE.as_bytes(), &remote);
        assert_eq!(local_version(&rewritten).unwrap(), remote);
    }

    #[test]
    fn rewrite_only_touches_value_tokens() {
        let remote = VersionInfo::new(20230601, "cafebabe");
        let rewritten = String::from_utf8(rewrite(MAKEFILE.as_bytes(), &remote)).unwrap();
        let expected = MAKEFILE
            .replace("PORTVERSION=\t20230101", "PORTVERSION=\t20230601")
            .replace("GH_TAGNAME=\t3b2f1a9c", "GH_TAGNAME=\tcafebabe");
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn rewrite_replaces_every_occurrence() {
        let text = b"PORTVERSION=\t1\nGH_TAGNAME=\ta\n# PORTVERSION=  2\n# GH_TAGNAME= b\n";
        let rewritten = rewrite(text, &VersionInfo::new(20230601, "z"));
        assert_eq!(
            rewritten,
            b"PORTVERSION=\t20230601\nGH_TAGNAME=\tz\n# PORTVERSION=  20230601\n# GH_TAGNAME= z\n"
        );
    }

    #[test]
    fn write_makefile_overwrites_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Makefile");
        std::fs::write(&path, "a much longer original body that must vanish\n").unwrap();
        write_makefile(&path, b"PORTVERSION=\t1\n").unwrap();
        assert_eq!(read_makefile(&path).unwrap(), b"PORTVERSION=\t1\n");
    }

    #[test]
    fn read_makefile_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_makefile(&dir.path().join("Makefile")).unwrap_err();
        assert!(matches!(err, PortError::Filesystem(_)));
    }
}
