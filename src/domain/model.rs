use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
}

impl FileRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub organized: bool,
    pub files: Vec<FileRef>,
    pub gallery_ids: Vec<String>,
    pub performer_ids: Vec<String>,
}

impl Scene {
    pub fn is_orphan(&self) -> bool {
        self.gallery_ids.is_empty()
    }

    pub fn primary_path(&self) -> Option<&str> {
        self.files.first().map(|f| f.path.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub folder_path: Option<String>,
    pub performer_ids: Vec<String>,
}

impl Gallery {
    pub fn to_ref(&self) -> GalleryRef {
        GalleryRef {
            id: self.id.clone(),
            title: self.title.clone(),
            folder_path: self.folder_path.clone(),
        }
    }
}

/// 圖片上帶回的精簡畫廊資訊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryRef {
    pub id: String,
    pub title: Option<String>,
    pub folder_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub title: Option<String>,
    pub files: Vec<FileRef>,
    pub galleries: Vec<GalleryRef>,
}

impl Image {
    pub fn primary_path(&self) -> Option<&str> {
        self.files.first().map(|f| f.path.as_str())
    }
}

/// 分頁查詢結果：`count` 為伺服器回報的總筆數
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub count: usize,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 從 1 開始
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanFilter {
    pub exclude_organized: bool,
}

impl OrphanFilter {
    pub fn accepts(&self, scene: &Scene) -> bool {
        scene.is_orphan() && !(self.exclude_organized && scene.organized)
    }
}

/// 依目錄查詢圖片
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirQuery {
    /// 圖片所在目錄完全等於此目錄
    Exact(String),
    /// 圖片所在目錄等於此目錄或位於其下任意深度
    Under(String),
}

impl DirQuery {
    pub fn dir(&self) -> &str {
        match self {
            DirQuery::Exact(dir) | DirQuery::Under(dir) => dir,
        }
    }
}
