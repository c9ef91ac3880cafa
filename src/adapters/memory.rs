use crate::core::folder;
use crate::domain::model::{
    DirQuery, FileRef, Gallery, GalleryRef, Image, OrphanFilter, PageRequest, Paged, Scene,
};
use crate::domain::ports::Catalog;
use crate::utils::error::{LinkerError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    scenes: Vec<Scene>,
    galleries: Vec<Gallery>,
    images: Vec<Image>,
    plugin_settings: HashMap<String, Map<String, Value>>,
    failing_scenes: HashSet<String>,
    failing_image_dirs: HashSet<String>,
}

/// 行程內的目錄實作：保持插入順序，記錄查詢與變更次數，可指定連結變更或圖片查詢失敗。
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
    image_queries: AtomicUsize,
    mutations: AtomicUsize,
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Paged<T> {
    let start = page.page.saturating_sub(1).saturating_mul(page.per_page);
    Paged {
        count: items.len(),
        items: items.iter().skip(start).take(page.per_page).cloned().collect(),
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // 鎖不跨 await 持有
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_scene(self, scene: Scene) -> Self {
        self.lock().scenes.push(scene);
        self
    }

    pub fn with_gallery(self, gallery: Gallery) -> Self {
        self.lock().galleries.push(gallery);
        self
    }

    /// 新增一張圖片，畫廊資訊取自已加入的畫廊
    pub fn with_image(self, id: &str, path: &str, gallery_ids: &[&str]) -> Self {
        {
            let mut state = self.lock();
            let galleries = gallery_ids
                .iter()
                .map(|gallery_id| {
                    state
                        .galleries
                        .iter()
                        .find(|g| g.id == *gallery_id)
                        .map(Gallery::to_ref)
                        .unwrap_or_else(|| GalleryRef {
                            id: gallery_id.to_string(),
                            title: None,
                            folder_path: None,
                        })
                })
                .collect();
            state.images.push(Image {
                id: id.to_string(),
                title: None,
                files: vec![FileRef::new(path)],
                galleries,
            });
        }
        self
    }

    pub fn with_plugin_settings(self, plugin_id: &str, settings: Map<String, Value>) -> Self {
        self.lock()
            .plugin_settings
            .insert(plugin_id.to_string(), settings);
        self
    }

    pub fn fail_mutation_for(self, scene_id: &str) -> Self {
        self.lock().failing_scenes.insert(scene_id.to_string());
        self
    }

    /// 以該目錄為目標的圖片查詢（同目錄或子目錄查詢）一律失敗
    pub fn fail_images_for(self, dir: &str) -> Self {
        self.lock().failing_image_dirs.insert(dir.to_string());
        self
    }

    pub fn scene(&self, id: &str) -> Option<Scene> {
        self.lock().scenes.iter().find(|s| s.id == id).cloned()
    }

    pub fn image_queries(&self) -> usize {
        self.image_queries.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_orphan_scenes(
        &self,
        filter: &OrphanFilter,
        page: PageRequest,
    ) -> Result<Paged<Scene>> {
        let state = self.lock();
        let orphans: Vec<Scene> = state
            .scenes
            .iter()
            .filter(|scene| filter.accepts(scene))
            .cloned()
            .collect();
        Ok(paginate(&orphans, page))
    }

    async fn find_images(&self, query: &DirQuery) -> Result<Vec<Image>> {
        self.image_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.failing_image_dirs.contains(query.dir()) {
            return Err(LinkerError::CatalogError {
                message: format!("image query for {} rejected", query.dir()),
            });
        }
        Ok(state
            .images
            .iter()
            .filter(|image| {
                let Some(path) = image.primary_path() else {
                    return false;
                };
                let dir = folder::parent_dir(path);
                match query {
                    DirQuery::Exact(target) => dir == *target,
                    DirQuery::Under(target) => dir == *target || folder::is_descendant(&dir, target),
                }
            })
            .cloned()
            .collect())
    }

    async fn find_galleries(&self, page: PageRequest) -> Result<Paged<Gallery>> {
        Ok(paginate(&self.lock().galleries, page))
    }

    async fn add_scene_galleries(&self, scene_id: &str, gallery_ids: &[String]) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if state.failing_scenes.contains(scene_id) {
            return Err(LinkerError::MutationError {
                scene_id: scene_id.to_string(),
                message: "mutation rejected".to_string(),
            });
        }
        let scene = state
            .scenes
            .iter_mut()
            .find(|s| s.id == scene_id)
            .ok_or_else(|| LinkerError::MutationError {
                scene_id: scene_id.to_string(),
                message: "scene not found".to_string(),
            })?;
        for id in gallery_ids {
            if !scene.gallery_ids.contains(id) {
                scene.gallery_ids.push(id.clone());
            }
        }
        Ok(())
    }

    async fn plugin_settings(&self, plugin_id: &str) -> Result<Map<String, Value>> {
        Ok(self
            .lock()
            .plugin_settings
            .get(plugin_id)
            .cloned()
            .unwrap_or_default())
    }
}
