use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

use crate::dedupe::Fingerprint;
use crate::models::JobListing;

/// Fingerprints of listings emitted by earlier runs.
pub struct History {
    conn: Connection,
    path: PathBuf,
}

impl History {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open history database: {}", path.display()))?;
        let history = Self {
            conn,
            path: path.to_path_buf(),
        };
        history.init()?;
        Ok(history)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobscaffold") {
            proj_dirs.data_dir().join("history.db")
        } else {
            PathBuf::from("jobscaffold-history.db")
        }
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS seen_listings (
                fingerprint TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                url TEXT NOT NULL,
                platform TEXT NOT NULL,
                first_seen_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM seen_listings WHERE fingerprint = ?1",
            [fingerprint.key()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remember a listing; returns false if it was already known.
    pub fn record(&self, listing: &JobListing, fingerprint: &Fingerprint) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO seen_listings (fingerprint, title, company, url, platform)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fingerprint.key(),
                listing.title,
                listing.company,
                listing.url,
                listing.platform.as_str()
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM seen_listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Split listings into those never emitted before and a count of the rest.
    /// Nothing is written; call `record_all` once the scaffold is on disk.
    pub fn partition_new(&self, listings: Vec<JobListing>) -> Result<(Vec<JobListing>, usize)> {
        let mut fresh = Vec::with_capacity(listings.len());
        let mut skipped = 0;
        for listing in listings {
            if self.contains(&Fingerprint::of(&listing))? {
                skipped += 1;
            } else {
                fresh.push(listing);
            }
        }
        Ok((fresh, skipped))
    }

    pub fn record_all(&self, listings: &[JobListing]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for listing in listings {
            if self.record(listing, &Fingerprint::of(listing))? {
                inserted += 1;
            }
        }
        tx.commit().context("Failed to commit listing history")?;
        Ok(inserted)
    }
}
