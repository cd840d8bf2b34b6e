//! Ordered extension table mapping file extensions to a MIME type and a
//! Gopher item character. First match wins, so configured entries are pushed
//! ahead of the built-in defaults.

pub const FALLBACK_MIME: &str = "application/octet-stream";
pub const FALLBACK_GOPHER: char = '9';

#[derive(Debug, Clone)]
pub struct MimeEntry {
    pub ext: String,
    pub mime: String,
    pub gopher: char,
}

#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    entries: Vec<MimeEntry>,
}

impl MimeTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, ext: &str, gopher: char, mime: &str) {
        self.entries.push(MimeEntry {
            ext: ext.to_ascii_lowercase(),
            mime: mime.to_string(),
            gopher,
        });
    }

    /// Append the built-in defaults after any configured entries.
    pub fn with_defaults(mut self) -> Self {
        for (ext, gopher, mime) in DEFAULT_ENTRIES {
            self.push(ext, *gopher, mime);
        }
        self
    }

    /// Look up an extension.
    ///
    /// Compares the first three bytes of the requested extension against
    /// each entry in order; the first hit wins. A miss yields
    /// `application/octet-stream` with Gopher item `9`.
    pub fn lookup(&self, ext: &str) -> (&str, char) {
        let key = prefix3(ext);
        for entry in &self.entries {
            if prefix3(&entry.ext) == key {
                return (&entry.mime, entry.gopher);
            }
        }
        (FALLBACK_MIME, FALLBACK_GOPHER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn prefix3(s: &str) -> &[u8] {
    let bytes = s.as_bytes();
    &bytes[..bytes.len().min(3)]
}

const DEFAULT_ENTRIES: &[(&str, char, &str)] = &[
    ("gmi", '0', "text/gemini"),
    ("txt", '0', "text/plain"),
    ("md", '0', "text/markdown"),
    ("htm", 'h', "text/html"),
    ("css", '0', "text/css"),
    ("xml", '0', "text/xml"),
    ("jpg", 'I', "image/jpeg"),
    ("jpe", 'I', "image/jpeg"),
    ("png", 'I', "image/png"),
    ("gif", 'g', "image/gif"),
    ("mp3", 's', "audio/mpeg"),
    ("ogg", 's', "audio/ogg"),
    ("wav", 's', "audio/wav"),
    ("pdf", '9', "application/pdf"),
    ("zip", '9', "application/zip"),
    ("cpi", '9', "application/x-cpio"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_three_characters_decide() {
        let table = MimeTable::new().with_defaults();
        assert_eq!(table.lookup("gmi"), ("text/gemini", '0'));
        // "html" and "htm" share a three-character prefix
        assert_eq!(table.lookup("html"), ("text/html", 'h'));
        assert_eq!(table.lookup("jpeg"), ("image/jpeg", 'I'));
        assert_eq!(table.lookup("cpio"), ("application/x-cpio", '9'));
    }

    #[test]
    fn miss_falls_back_to_binary() {
        let table = MimeTable::new().with_defaults();
        assert_eq!(table.lookup("xyz"), (FALLBACK_MIME, FALLBACK_GOPHER));
        assert_eq!(table.lookup(""), (FALLBACK_MIME, FALLBACK_GOPHER));
    }

    #[test]
    fn configured_entries_win_over_defaults() {
        let mut table = MimeTable::new();
        table.push("gmi", '1', "text/x-custom");
        let table = table.with_defaults();
        assert_eq!(table.lookup("gmi"), ("text/x-custom", '1'));
    }
}
