use std::fs;
use std::path::PathBuf;

/// Last successfully downloaded copy of each remote word list, so a later
/// run without network still has the full list.
pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    pub fn new() -> Option<Self> {
        let base = dirs::cache_dir()?.join("tango").join("word_lists");
        Self::with_base_dir(base)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Option<Self> {
        fs::create_dir_all(&base_dir).ok()?;
        Some(Self { base_dir })
    }

    pub fn get(&self, url: &str) -> Option<String> {
        fs::read_to_string(self.base_dir.join(Self::sanitize_key(url))).ok()
    }

    pub fn put(&self, url: &str, content: &str) -> bool {
        fs::write(self.base_dir.join(Self::sanitize_key(url)), content).is_ok()
    }

    fn sanitize_key(url: &str) -> String {
        url.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
