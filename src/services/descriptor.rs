//! Descriptor field lookup.
//!
//! Reads a single top-level field (e.g. `<version>`) from an XML build
//! descriptor such as a Maven `pom.xml`.

use crate::error::{DescriptorError, DescriptorResult};
use std::path::Path;

/// Looks up one top-level field in a descriptor document
pub trait FieldReader {
    /// Text of the first top-level `field`, `None` when the root has no such child
    fn read_field(&self, path: &Path, field: &str) -> DescriptorResult<Option<String>>;
}

/// [`FieldReader`] for XML descriptors.
///
/// Documents are read as UTF-8. A descriptor in any other encoding (even one
/// declared in its XML prolog, such as ISO-8859-1) fails with
/// [`DescriptorError::Io`] before parsing starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFieldReader;

impl XmlFieldReader {
    pub fn new() -> Self {
        Self
    }

    /// Same lookup on an in-memory document; `path` is only used in errors
    pub fn read_field_from_str(
        &self,
        text: &str,
        path: &Path,
        field: &str,
    ) -> DescriptorResult<Option<String>> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };

        let document = match roxmltree::Document::parse_with_options(text, options) {
            Ok(document) => document,
            Err(roxmltree::Error::NoRootNode) => {
                return Err(DescriptorError::NoRootElement(path.to_path_buf()))
            }
            Err(e) => {
                return Err(DescriptorError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let value = document
            .root_element()
            .children()
            .find(|child| child.is_element() && child.tag_name().name() == field)
            .map(|node| {
                node.descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect::<String>()
            });

        Ok(value)
    }
}

impl FieldReader for XmlFieldReader {
    fn read_field(&self, path: &Path, field: &str) -> DescriptorResult<Option<String>> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let value = self.read_field_from_str(&text, path, field)?;
        tracing::debug!("{} {} = {:?}", path.display(), field, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>org.example</groupId>
        <version>9.9.9</version>
    </parent>
    <groupId>org.example</groupId>
    <artifactId>demo</artifactId>
    <!-- bumped on release -->
    <version>1.2.3</version>
</project>
"#;

    fn read(text: &str, field: &str) -> DescriptorResult<Option<String>> {
        XmlFieldReader::new().read_field_from_str(text, Path::new("pom.xml"), field)
    }

    #[test]
    fn test_reads_top_level_field() {
        assert_eq!(read(POM, "version").unwrap(), Some("1.2.3".to_string()));
        assert_eq!(read(POM, "artifactId").unwrap(), Some("demo".to_string()));
    }

    #[test]
    fn test_nested_field_is_not_top_level() {
        let text = "<project><parent><version>2.0</version></parent></project>";
        assert_eq!(read(text, "version").unwrap(), None);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let text = "<project><version>1.<![CDATA[0]]>.<b>1</b></version></project>";
        assert_eq!(read(text, "version").unwrap(), Some("1.0.1".to_string()));
    }

    #[test]
    fn test_doctype_is_accepted() {
        let text = "<!DOCTYPE project><project><version>3</version></project>";
        assert_eq!(read(text, "version").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn test_empty_document_has_no_root() {
        assert!(matches!(read("", "version"), Err(DescriptorError::NoRootElement(_))));
    }

    #[test]
    fn test_malformed_document() {
        let err = read("<project><version>1.0</version", "version").unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn test_read_field_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pom.xml");
        std::fs::write(&path, POM).unwrap();

        let reader = XmlFieldReader::new();
        assert_eq!(
            reader.read_field(&path, "version").unwrap(),
            Some("1.2.3".to_string())
        );
        assert_eq!(reader.read_field(&path, "name").unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = XmlFieldReader::new()
            .read_field(&temp.path().join("pom.xml"), "version")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Io { .. }));
    }

    #[test]
    fn test_latin1_descriptor_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pom.xml");
        std::fs::write(
            &path,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<project><name>Caf\xe9</name><version>1.0</version></project>\n",
        )
        .unwrap();

        let err = XmlFieldReader::new().read_field(&path, "version").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::InvalidData
        ));
    }
}
