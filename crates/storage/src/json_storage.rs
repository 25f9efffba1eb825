//! JSON file storage implementation.
//!
//! Stores one JSON file per record in a `.kpiboard` directory:
//! `indicators/`, `fills/`, `targets/`, `sectors/`, `users/` and `audit/`.

use std::path::{Path, PathBuf};
use kpiboard_core::{
    AuditEntry, AuditEntryId, Fill, FillFilter, FillId, Indicator, IndicatorId, MonthlyTarget,
    Sector, SectorId, User, UserId, YearMonth,
};
use super::{Storage, Result};
use tokio::fs;

const KINDS: &[&str] = &["indicators", "fills", "targets", "sectors", "users", "audit"];

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the record directories under `root`.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for kind in KINDS {
            fs::create_dir_all(root.join(kind)).await?;
        }
        tracing::debug!(root = %root.display(), "opened JSON storage");

        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn indicator_path(&self, id: IndicatorId) -> PathBuf {
        self.root.join("indicators").join(format!("{}.json", id))
    }
    fn fill_path(&self, id: FillId) -> PathBuf {
        self.root.join("fills").join(format!("{}.json", id))
    }
    fn target_path(&self, indicator: IndicatorId, month: YearMonth) -> PathBuf {
        self.root.join("targets").join(format!("{}_{}.json", indicator, month))
    }
    fn sector_path(&self, id: SectorId) -> PathBuf {
        self.root.join("sectors").join(format!("{}.json", id))
    }
    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{}.json", id))
    }
    fn audit_path(&self, id: AuditEntryId) -> PathBuf {
        self.root.join("audit").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_indicator(&mut self, indicator: &Indicator) -> Result<()> {
        write_json(&self.indicator_path(indicator.id), indicator).await
    }

    async fn load_indicator(&self, id: IndicatorId) -> Result<Option<Indicator>> {
        read_json(&self.indicator_path(id)).await
    }

    async fn list_indicators(&self) -> Result<Vec<Indicator>> {
        let mut all: Vec<Indicator> = list_dir(&self.root.join("indicators")).await?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn delete_indicator(&mut self, id: IndicatorId) -> Result<()> {
        remove_if_exists(&self.indicator_path(id)).await?;

        let fills = self.list_fills(&FillFilter::for_indicator(id)).await?;
        for fill in &fills {
            remove_if_exists(&self.fill_path(fill.id)).await?;
        }
        let targets = self.list_targets(Some(id)).await?;
        for target in &targets {
            remove_if_exists(&self.target_path(id, target.month)).await?;
        }

        tracing::debug!(indicator = %id, fills = fills.len(), targets = targets.len(), "deleted indicator");
        Ok(())
    }

    async fn save_fill(&mut self, fill: &Fill) -> Result<()> {
        write_json(&self.fill_path(fill.id), fill).await
    }

    async fn list_fills(&self, filter: &FillFilter) -> Result<Vec<Fill>> {
        let all: Vec<Fill> = list_dir(&self.root.join("fills")).await?;
        let mut fills: Vec<Fill> = all.into_iter().filter(|f| filter.matches(f)).collect();
        fills.sort_by(|a, b| a.entered_at.cmp(&b.entered_at).then(a.id.cmp(&b.id)));
        Ok(fills)
    }

    async fn save_target(&mut self, target: &MonthlyTarget) -> Result<()> {
        write_json(&self.target_path(target.indicator_id, target.month), target).await
    }

    async fn list_targets(&self, indicator: Option<IndicatorId>) -> Result<Vec<MonthlyTarget>> {
        let all: Vec<MonthlyTarget> = list_dir(&self.root.join("targets")).await?;
        let mut targets: Vec<MonthlyTarget> = all
            .into_iter()
            .filter(|t| indicator.map_or(true, |id| t.indicator_id == id))
            .collect();
        targets.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(targets)
    }

    async fn delete_target(&mut self, indicator: IndicatorId, month: YearMonth) -> Result<()> {
        remove_if_exists(&self.target_path(indicator, month)).await
    }

    async fn save_sector(&mut self, sector: &Sector) -> Result<()> {
        write_json(&self.sector_path(sector.id), sector).await
    }

    async fn load_sector(&self, id: SectorId) -> Result<Option<Sector>> {
        read_json(&self.sector_path(id)).await
    }

    async fn list_sectors(&self) -> Result<Vec<Sector>> {
        let mut all: Vec<Sector> = list_dir(&self.root.join("sectors")).await?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn save_user(&mut self, user: &User) -> Result<()> {
        write_json(&self.user_path(user.id), user).await
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        read_json(&self.user_path(id)).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        list_dir(&self.root.join("users")).await
    }

    async fn append_audit(&mut self, entry: &AuditEntry) -> Result<()> {
        write_json(&self.audit_path(entry.id), entry).await
    }

    async fn list_audit(&self) -> Result<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = list_dir(&self.root.join("audit")).await?;
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }
    Ok(items)
}
