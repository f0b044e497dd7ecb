//! Coarse content-type classification for uploaded files.
//!
//! The media host accepts anything; clients only need a broad bucket to pick
//! an icon or a viewer, so the type is derived from the file extension alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Video,
    Audio,
    Archive,
    Other,
}

impl FileKind {
    /// Classify by the text after the last dot, case-insensitively. A bare
    /// `.pdf` counts as a PDF.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp") => Self::Image,
            Some("pdf") => Self::Pdf,
            Some("doc" | "docx") => Self::Word,
            Some("xls" | "xlsx") => Self::Excel,
            Some("ppt" | "pptx") => Self::PowerPoint,
            Some("mp4" | "avi" | "mov" | "wmv" | "flv" | "mkv") => Self::Video,
            Some("mp3" | "wav" | "ogg" | "flac" | "aac") => Self::Audio,
            Some("zip" | "rar" | "7z" | "tar" | "gz") => Self::Archive,
            _ => Self::Other,
        }
    }

    /// Stored and returned as `FileType`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Pdf => "application/pdf",
            Self::Word => "application/msword",
            Self::Excel => "application/vnd.ms-excel",
            Self::PowerPoint => "application/vnd.ms-powerpoint",
            Self::Video => "video/mp4",
            Self::Audio => "audio/mpeg",
            Self::Archive => "application/zip",
            Self::Other => "application/octet-stream",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("foto.JPG", "image/jpeg")]
    #[test_case("scan.webp", "image/jpeg")]
    #[test_case("apunte.pdf", "application/pdf")]
    #[test_case("tp.docx", "application/msword")]
    #[test_case("notas.xlsx", "application/vnd.ms-excel")]
    #[test_case("clase.PPTX", "application/vnd.ms-powerpoint")]
    #[test_case("clase.mkv", "video/mp4")]
    #[test_case("audio.flac", "audio/mpeg")]
    #[test_case("backup.tar.gz", "application/zip")]
    #[test_case(".pdf", "application/pdf")]
    #[test_case("Apunte Final.PDF", "application/pdf")]
    #[test_case("README", "application/octet-stream")]
    #[test_case("sin_extension.", "application/octet-stream")]
    #[test_case("script.rs", "application/octet-stream")]
    fn test_classification(name: &str, expected: &str) {
        assert_eq!(FileKind::from_file_name(name).mime_type(), expected);
    }

    #[test]
    fn test_only_final_extension_counts() {
        assert_eq!(FileKind::from_file_name("pdf.exe"), FileKind::Other);
        assert!(FileKind::from_file_name("avatar.png").is_image());
    }
}
