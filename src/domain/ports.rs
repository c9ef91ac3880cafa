use crate::domain::model::{DirQuery, Gallery, Image, OrphanFilter, PageRequest, Paged, Scene};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// 外部媒體目錄的窄介面：分頁讀取場景、圖片、畫廊，以及場景連結畫廊的變更
#[async_trait]
pub trait Catalog: Send + Sync {
    /// 沒有任何連結畫廊的場景
    async fn find_orphan_scenes(
        &self,
        filter: &OrphanFilter,
        page: PageRequest,
    ) -> Result<Paged<Scene>>;

    /// 依目錄條件取得全部符合的圖片，保持目錄回傳順序
    async fn find_images(&self, query: &DirQuery) -> Result<Vec<Image>>;

    async fn find_galleries(&self, page: PageRequest) -> Result<Paged<Gallery>>;

    /// 新增（不移除既有）場景的畫廊連結
    async fn add_scene_galleries(&self, scene_id: &str, gallery_ids: &[String]) -> Result<()>;

    /// 外掛設定：選項名稱對應值
    async fn plugin_settings(&self, plugin_id: &str) -> Result<Map<String, Value>>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for &C {
    async fn find_orphan_scenes(
        &self,
        filter: &OrphanFilter,
        page: PageRequest,
    ) -> Result<Paged<Scene>> {
        (**self).find_orphan_scenes(filter, page).await
    }

    async fn find_images(&self, query: &DirQuery) -> Result<Vec<Image>> {
        (**self).find_images(query).await
    }

    async fn find_galleries(&self, page: PageRequest) -> Result<Paged<Gallery>> {
        (**self).find_galleries(page).await
    }

    async fn add_scene_galleries(&self, scene_id: &str, gallery_ids: &[String]) -> Result<()> {
        (**self).add_scene_galleries(scene_id, gallery_ids).await
    }

    async fn plugin_settings(&self, plugin_id: &str) -> Result<Map<String, Value>> {
        (**self).plugin_settings(plugin_id).await
    }
}

/// 進度回報，`fraction` 介於 0.0 與 1.0
pub trait ProgressReporter: Send + Sync {
    fn report(&self, fraction: f64);
}
