use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::config::Config;
use crate::store::schema::{EXPORT_VERSION, ExportData, SessionData, StudyData};

const STUDY_FILE: &str = "study_data.json";
const SESSION_FILE: &str = "session.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tango");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// `Ok(None)` when the file does not exist yet.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(data))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        debug!(file = name, bytes = json.len(), "saved");
        Ok(())
    }

    /// Study data, or a fresh default when the file is missing, unreadable,
    /// or written by another schema version.
    pub fn load_study_data(&self) -> StudyData {
        match self.load::<StudyData>(STUDY_FILE) {
            Ok(Some(data)) if !data.needs_reset() => data,
            Ok(Some(data)) => {
                warn!(
                    found = data.schema_version,
                    "study data schema mismatch, starting fresh"
                );
                StudyData::default()
            }
            Ok(None) => StudyData::default(),
            Err(err) => {
                warn!("ignoring unreadable study data: {err:#}");
                StudyData::default()
            }
        }
    }

    pub fn save_study_data(&self, data: &StudyData) -> Result<()> {
        self.save(STUDY_FILE, data)
    }

    pub fn load_session(&self) -> Option<SessionData> {
        match self.load::<SessionData>(SESSION_FILE) {
            Ok(data) => data,
            Err(err) => {
                warn!("ignoring unreadable session state: {err:#}");
                None
            }
        }
    }

    pub fn save_session(&self, data: &SessionData) -> Result<()> {
        self.save(SESSION_FILE, data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            tango_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            study: self.load_study_data(),
            session: self.load_session(),
        }
    }

    /// Transactional import: every file is staged as `.tmp` first, then each
    /// original is moved to `.bak` before the staged copy replaces it. Any
    /// failure restores what was there before.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.tango_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.tango_export_version,
                EXPORT_VERSION
            );
        }

        let mut files: Vec<(&str, String)> =
            vec![(STUDY_FILE, serde_json::to_string_pretty(&data.study)?)];
        if let Some(ref session) = data.session {
            files.push((SESSION_FILE, serde_json::to_string_pretty(session)?));
        }

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("tmp");
            let write = || -> Result<()> {
                let mut file = fs::File::create(&tmp_path)?;
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                Ok(())
            };
            if let Err(e) = write() {
                for tmp in &staged {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during staging: {e}");
            }
            staged.push(tmp_path);
        }

        // (final, backup, had_original) for rollback
        let mut committed: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let final_path = self.file_path(name);
            let bak_path = final_path.with_extension("json.bak");
            let had_original = final_path.exists();

            let step = if had_original {
                fs::rename(&final_path, &bak_path)
                    .context("backup")
                    .and_then(|_| fs::rename(&staged[i], &final_path).context("rename"))
            } else {
                fs::rename(&staged[i], &final_path).context("rename")
            };

            if let Err(e) = step {
                if had_original && bak_path.exists() {
                    let _ = fs::rename(&bak_path, &final_path);
                }
                rollback(&committed);
                for tmp in &staged[i..] {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit: {e:#}");
            }
            committed.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &committed {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }
        Ok(())
    }

    /// Remove `.bak` files left by an interrupted import. Returns true if
    /// any were found.
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in [STUDY_FILE, SESSION_FILE] {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

fn rollback(committed: &[(PathBuf, PathBuf, bool)]) {
    for (final_path, bak_path, had_original) in committed {
        if *had_original {
            let _ = fs::rename(bak_path, final_path);
        } else {
            let _ = fs::remove_file(final_path);
        }
    }
}
