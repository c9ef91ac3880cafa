use orphan_gallery_linker::config::{MatchStrategy, Settings};
use orphan_gallery_linker::domain::model::{FileRef, Gallery, Scene};
use orphan_gallery_linker::utils::progress::NoProgress;
use orphan_gallery_linker::{InMemoryCatalog, OrphanResolver, RunStats};

fn scene(id: &str, path: &str) -> Scene {
    Scene {
        id: id.to_string(),
        title: Some(format!("Scene {}", id)),
        files: vec![FileRef::new(path)],
        ..Default::default()
    }
}

fn gallery(id: &str, folder_path: &str) -> Gallery {
    Gallery {
        id: id.to_string(),
        title: Some(format!("Gallery {}", id)),
        folder_path: Some(folder_path.to_string()),
        ..Default::default()
    }
}

/// 四種典型目錄配置，各一個場景
fn layout_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        // 同目錄
        .with_scene(scene("same", "/media/photoshoots/2024-03-15/video.mp4"))
        .with_gallery(gallery("g-same", "/media/photoshoots/2024-03-15"))
        .with_image("i1", "/media/photoshoots/2024-03-15/image1.jpg", &["g-same"])
        .with_image("i2", "/media/photoshoots/2024-03-15/image2.jpg", &["g-same"])
        // 直接上層
        .with_scene(scene("parent", "/media/shoots/session1/video/scene.mp4"))
        .with_gallery(gallery("g-parent", "/media/shoots/session1"))
        .with_image("i3", "/media/shoots/session1/image1.jpg", &["g-parent"])
        // 子目錄
        .with_scene(scene("child", "/media/studio/2024/march/scene.mp4"))
        .with_gallery(gallery("g-child", "/media/studio/2024/march/gallery"))
        .with_image("i4", "/media/studio/2024/march/gallery/1.jpg", &["g-child"])
        // 兄弟目錄，不應配對
        .with_scene(scene("sibling", "/media/studio/2024/april/scene.mp4"))
        .with_gallery(gallery("g-feb", "/media/studio/2024/february"))
        .with_image("i5", "/media/studio/2024/february/1.jpg", &["g-feb"])
}

#[tokio::test]
async fn test_folder_layout_scenarios() {
    let resolver = OrphanResolver::new(layout_catalog(), Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats.total_orphans, 4);
    assert_eq!(stats.assigned, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 0);

    let catalog = resolver.catalog();
    assert_eq!(catalog.scene("same").unwrap().gallery_ids, vec!["g-same"]);
    assert_eq!(catalog.scene("parent").unwrap().gallery_ids, vec!["g-parent"]);
    assert_eq!(catalog.scene("child").unwrap().gallery_ids, vec!["g-child"]);
    assert!(catalog.scene("sibling").unwrap().gallery_ids.is_empty());
}

#[tokio::test]
async fn test_second_run_finds_nothing_to_do() {
    let catalog = layout_catalog();

    let first = OrphanResolver::new(&catalog, Settings::default(), NoProgress)
        .run()
        .await
        .unwrap();
    let mutations_after_first = catalog.mutation_calls();

    let second = OrphanResolver::new(&catalog, Settings::default(), NoProgress)
        .run()
        .await
        .unwrap();

    assert_eq!(first.assigned, 3);
    assert_eq!(mutations_after_first, 3);
    // 只剩下無法配對的兄弟目錄場景
    assert_eq!(second.total_orphans, 1);
    assert_eq!(second.assigned, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(catalog.mutation_calls(), 3);
}

#[tokio::test]
async fn test_dry_run_matches_real_counts_without_mutating() {
    let dry_settings = Settings {
        dry_run: true,
        ..Default::default()
    };
    let dry = OrphanResolver::new(layout_catalog(), dry_settings, NoProgress);
    let dry_stats = dry.run().await.unwrap();

    let real = OrphanResolver::new(layout_catalog(), Settings::default(), NoProgress);
    let real_stats = real.run().await.unwrap();

    assert_eq!(dry_stats, real_stats);
    assert_eq!(dry.catalog().mutation_calls(), 0);
    assert!(dry.catalog().scene("same").unwrap().gallery_ids.is_empty());
    assert_eq!(real.catalog().mutation_calls(), 3);
}

#[tokio::test]
async fn test_mutation_failure_does_not_stop_the_batch() {
    let catalog = layout_catalog().fail_mutation_for("parent");
    let resolver = OrphanResolver::new(catalog, Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats.assigned, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.assigned + stats.errors + stats.skipped, stats.total_orphans);
    assert_eq!(resolver.catalog().scene("child").unwrap().gallery_ids, vec!["g-child"]);
}

#[tokio::test]
async fn test_scene_without_files_is_skipped() {
    let catalog = InMemoryCatalog::new().with_scene(Scene {
        id: "empty".to_string(),
        ..Default::default()
    });
    let resolver = OrphanResolver::new(catalog, Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats.total_orphans, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(resolver.catalog().image_queries(), 0);
}

#[tokio::test]
async fn test_linked_scenes_are_not_orphans() {
    let mut linked = scene("linked", "/media/photoshoots/2024-03-15/other.mp4");
    linked.gallery_ids = vec!["g-same".to_string()];
    let catalog = layout_catalog().with_scene(linked);
    let resolver = OrphanResolver::new(catalog, Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats.total_orphans, 4);
    assert_eq!(resolver.catalog().scene("linked").unwrap().gallery_ids, vec!["g-same"]);
}

#[tokio::test]
async fn test_empty_catalog() {
    let resolver = OrphanResolver::new(InMemoryCatalog::new(), Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats, RunStats::default());
}

#[tokio::test]
async fn test_image_lookup_failure_counts_as_scene_error() {
    let catalog = InMemoryCatalog::new()
        .with_scene(scene("broken", "/media/broken/video.mp4"))
        .with_scene(scene("ok", "/media/ok/video.mp4"))
        .with_gallery(gallery("g-ok", "/media/ok"))
        .with_image("i1", "/media/ok/image1.jpg", &["g-ok"])
        .fail_images_for("/media/broken");
    let resolver = OrphanResolver::new(catalog, Settings::default(), NoProgress);

    let stats = resolver.run().await.unwrap();

    assert_eq!(
        stats,
        RunStats {
            total_orphans: 2,
            assigned: 1,
            skipped: 0,
            errors: 1
        }
    );
    // 失敗的場景之後，其餘場景照常處理
    assert!(resolver.catalog().scene("broken").unwrap().gallery_ids.is_empty());
    assert_eq!(resolver.catalog().scene("ok").unwrap().gallery_ids, vec!["g-ok"]);
}

#[tokio::test]
async fn test_gallery_enumeration_walks_every_page() {
    let mut catalog = InMemoryCatalog::new();
    for i in 0..5 {
        catalog = catalog.with_gallery(gallery(&format!("g{}", i), &format!("/media/g{}", i)));
    }
    let resolver =
        OrphanResolver::new(catalog, Settings::default(), NoProgress).with_page_size(2);

    let galleries = resolver.fetch_galleries().await.unwrap();

    let ids: Vec<&str> = galleries.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g0", "g1", "g2", "g3", "g4"]);
}

#[tokio::test]
async fn test_signal_strategy_matches_gallery_on_a_later_page() {
    let mut catalog = InMemoryCatalog::new().with_scene(scene("late", "/media/g4/video.mp4"));
    for i in 0..5 {
        catalog = catalog.with_gallery(gallery(&format!("g{}", i), &format!("/media/g{}", i)));
    }
    let settings = Settings {
        match_strategy: MatchStrategy::Signals,
        ..Default::default()
    };
    let resolver = OrphanResolver::new(catalog, settings, NoProgress).with_page_size(2);

    let stats = resolver.run().await.unwrap();

    assert_eq!(stats.assigned, 1);
    assert_eq!(resolver.catalog().scene("late").unwrap().gallery_ids, vec!["g4"]);
}
