use crate::config::settings::{MatchStrategy, Settings};
use crate::core::folder;
use crate::core::matcher::{GalleryMatch, GalleryMatcher, HierarchyMatcher, SignalMatcher};
use crate::core::stats::RunStats;
use crate::domain::model::{Gallery, GalleryRef, OrphanFilter, PageRequest, Scene};
use crate::domain::ports::{Catalog, ProgressReporter};
use crate::utils::error::Result;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// 場景的顯示名稱：標題、檔名、最後才是 id
pub fn scene_label(scene: &Scene) -> String {
    scene
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .or_else(|| scene.primary_path().and_then(folder::file_name))
        .unwrap_or(scene.id.as_str())
        .to_string()
}

/// 畫廊的顯示名稱：標題、目錄名稱、最後才是 id
pub fn gallery_label(gallery: &GalleryRef) -> String {
    gallery
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .or_else(|| gallery.folder_path.as_deref().and_then(folder::file_name))
        .unwrap_or(gallery.id.as_str())
        .to_string()
}

/// 找出孤兒場景並連結到最相符的畫廊。
///
/// 一次處理一個場景；除了統計之外，場景之間不共享任何決策。
pub struct OrphanResolver<C: Catalog, P: ProgressReporter> {
    catalog: C,
    settings: Settings,
    progress: P,
    page_size: usize,
}

impl<C: Catalog, P: ProgressReporter> OrphanResolver<C, P> {
    pub fn new(catalog: C, settings: Settings, progress: P) -> Self {
        Self {
            catalog,
            settings,
            progress,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// 分頁取得全部孤兒場景；任何一頁讀取失敗都會中止
    pub async fn discover_orphans(&self) -> Result<Vec<Scene>> {
        let filter = OrphanFilter {
            exclude_organized: self.settings.exclude_organized,
        };
        let mut orphans: Vec<Scene> = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .catalog
                .find_orphan_scenes(
                    &filter,
                    PageRequest {
                        page,
                        per_page: self.page_size,
                    },
                )
                .await?;
            if page == 1 {
                tracing::info!("📋 Found {} orphan scenes", batch.count);
            }
            if batch.items.is_empty() {
                break;
            }
            orphans.extend(batch.items);
            tracing::debug!("Fetched page {} ({}/{})", page, orphans.len(), batch.count);
            if orphans.len() >= batch.count {
                break;
            }
            page += 1;
        }

        orphans.retain(|scene| filter.accepts(scene));
        Ok(orphans)
    }

    pub async fn fetch_galleries(&self) -> Result<Vec<Gallery>> {
        let mut galleries: Vec<Gallery> = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .catalog
                .find_galleries(PageRequest {
                    page,
                    per_page: self.page_size,
                })
                .await?;
            if page == 1 {
                tracing::info!("🖼️ Found {} galleries", batch.count);
            }
            if batch.items.is_empty() {
                break;
            }
            galleries.extend(batch.items);
            if galleries.len() >= batch.count {
                break;
            }
            page += 1;
        }

        Ok(galleries)
    }

    pub async fn run(&self) -> Result<RunStats> {
        tracing::info!("🚀 Starting orphan scene processing...");
        tracing::info!("⚙️ Settings: {:?}", self.settings);

        let orphans = self.discover_orphans().await?;
        let mut stats = RunStats {
            total_orphans: orphans.len(),
            ..Default::default()
        };

        if orphans.is_empty() {
            tracing::info!("No orphan scenes found!");
            stats.log_summary(self.settings.dry_run);
            return Ok(stats);
        }

        match self.settings.match_strategy {
            MatchStrategy::Hierarchy => {
                let mut matcher = HierarchyMatcher::new(&self.catalog);
                self.process_all(&mut matcher, &orphans, &mut stats).await;
            }
            MatchStrategy::Signals => {
                let galleries = self.fetch_galleries().await?;
                if galleries.is_empty() {
                    tracing::warn!("⚠️ No galleries found! Cannot assign scenes.");
                    stats.skipped = orphans.len();
                } else {
                    tracing::info!(
                        "Processing {} orphan scenes against {} galleries...",
                        orphans.len(),
                        galleries.len()
                    );
                    let mut matcher =
                        SignalMatcher::new(galleries, self.settings.signal_settings());
                    self.process_all(&mut matcher, &orphans, &mut stats).await;
                }
            }
        }

        stats.log_summary(self.settings.dry_run);
        Ok(stats)
    }

    async fn process_all<M: GalleryMatcher>(
        &self,
        matcher: &mut M,
        orphans: &[Scene],
        stats: &mut RunStats,
    ) {
        let total = orphans.len();
        for (index, scene) in orphans.iter().enumerate() {
            self.process_scene(matcher, scene, stats).await;
            self.progress.report((index + 1) as f64 / total as f64);
        }
    }

    async fn process_scene<M: GalleryMatcher>(
        &self,
        matcher: &mut M,
        scene: &Scene,
        stats: &mut RunStats,
    ) {
        if scene.files.is_empty() {
            tracing::debug!("Scene {} has no files, skipping", scene.id);
            stats.record_skipped();
            return;
        }

        match matcher.find_match(scene).await {
            Ok(Some(found)) => self.assign(scene, &found, stats).await,
            Ok(None) => {
                tracing::debug!(
                    "No matching gallery found for scene {} ('{}')",
                    scene.id,
                    scene_label(scene)
                );
                stats.record_skipped();
            }
            Err(e) => {
                tracing::warn!("❌ Gallery lookup failed for scene {}: {}", scene.id, e);
                stats.record_error();
            }
        }
    }

    async fn assign(&self, scene: &Scene, found: &GalleryMatch, stats: &mut RunStats) {
        let dry_run = self.settings.dry_run;
        tracing::info!(
            "{}Assigning scene {} ('{}') to gallery {} ('{}') by {}",
            if dry_run { "[DRY RUN] " } else { "" },
            scene.id,
            scene_label(scene),
            found.gallery.id,
            gallery_label(&found.gallery),
            found.rule
        );

        if dry_run {
            stats.record_assigned();
            return;
        }

        match self
            .catalog
            .add_scene_galleries(&scene.id, std::slice::from_ref(&found.gallery.id))
            .await
        {
            Ok(()) => stats.record_assigned(),
            Err(e) => {
                tracing::error!(
                    "Error assigning scene {} to gallery {}: {}",
                    scene.id,
                    found.gallery.id,
                    e
                );
                stats.record_error();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCatalog;
    use crate::domain::model::FileRef;
    use crate::utils::progress::NoProgress;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProgress {
        fractions: Mutex<Vec<f64>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&self, fraction: f64) {
            self.fractions.lock().unwrap().push(fraction);
        }
    }

    fn orphan(id: &str, path: &str) -> Scene {
        Scene {
            id: id.to_string(),
            files: vec![FileRef::new(path)],
            ..Default::default()
        }
    }

    #[test]
    fn test_labels_fall_back() {
        let mut scene = orphan("7", "/media/shoot/clip.mp4");
        assert_eq!(scene_label(&scene), "clip.mp4");
        scene.title = Some("Beach day".to_string());
        assert_eq!(scene_label(&scene), "Beach day");
        scene.title = Some("  ".to_string());
        scene.files.clear();
        assert_eq!(scene_label(&scene), "7");

        let mut gallery = GalleryRef {
            id: "g9".to_string(),
            title: None,
            folder_path: Some("/media/shoot/pics".to_string()),
        };
        assert_eq!(gallery_label(&gallery), "pics");
        gallery.folder_path = None;
        assert_eq!(gallery_label(&gallery), "g9");
    }

    #[tokio::test]
    async fn test_discovery_walks_every_page() {
        let mut catalog = InMemoryCatalog::new();
        for i in 0..7 {
            catalog = catalog.with_scene(orphan(&i.to_string(), &format!("/m/{}.mp4", i)));
        }
        let resolver =
            OrphanResolver::new(catalog, Settings::default(), NoProgress).with_page_size(3);

        let orphans = resolver.discover_orphans().await.unwrap();
        let ids: Vec<&str> = orphans.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn test_exclude_organized() {
        let mut organized = orphan("1", "/m/1.mp4");
        organized.organized = true;
        let catalog = InMemoryCatalog::new()
            .with_scene(organized)
            .with_scene(orphan("2", "/m/2.mp4"));
        let settings = Settings {
            exclude_organized: true,
            ..Default::default()
        };
        let resolver = OrphanResolver::new(catalog, settings, NoProgress);

        let orphans = resolver.discover_orphans().await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "2");
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_complete() {
        let catalog = InMemoryCatalog::new()
            .with_scene(orphan("1", "/m/a/1.mp4"))
            .with_scene(orphan("2", "/m/b/2.mp4"))
            .with_scene(orphan("3", "/m/c/3.mp4"));
        let resolver = OrphanResolver::new(catalog, Settings::default(), RecordingProgress::default());

        resolver.run().await.unwrap();

        let fractions = resolver.progress.fractions.lock().unwrap().clone();
        assert_eq!(fractions.len(), 3);
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(fractions.last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn test_signal_strategy_without_galleries_skips_everything() {
        let catalog = InMemoryCatalog::new()
            .with_scene(orphan("1", "/m/1.mp4"))
            .with_scene(orphan("2", "/m/2.mp4"));
        let settings = Settings {
            match_strategy: MatchStrategy::Signals,
            ..Default::default()
        };
        let resolver = OrphanResolver::new(catalog, settings, NoProgress);

        let stats = resolver.run().await.unwrap();
        assert_eq!(stats.total_orphans, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(resolver.catalog().mutation_calls(), 0);
    }

    #[tokio::test]
    async fn test_signal_strategy_assigns_by_folder() {
        let catalog = InMemoryCatalog::new()
            .with_scene(orphan("1", "/m/shoot/1.mp4"))
            .with_gallery(Gallery {
                id: "g1".to_string(),
                folder_path: Some("/m/shoot".to_string()),
                ..Default::default()
            });
        let settings = Settings {
            match_strategy: MatchStrategy::Signals,
            ..Default::default()
        };
        let resolver = OrphanResolver::new(catalog, settings, NoProgress);

        let stats = resolver.run().await.unwrap();
        assert_eq!(stats.assigned, 1);
        assert_eq!(resolver.catalog().scene("1").unwrap().gallery_ids, vec!["g1"]);
    }
}
