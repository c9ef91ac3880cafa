use crate::core::folder;
use crate::domain::model::{DirQuery, Gallery, GalleryRef, Image, Scene};
use crate::domain::ports::Catalog;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// 產生配對的規則，僅供日誌使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    SameFolder,
    ChildFolder,
    ParentFolder,
    FolderPath,
    Performers(usize),
    Date(i64),
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::SameFolder => write!(f, "same folder"),
            MatchRule::ChildFolder => write!(f, "child folder"),
            MatchRule::ParentFolder => write!(f, "parent folder"),
            MatchRule::FolderPath => write!(f, "gallery folder path"),
            MatchRule::Performers(n) => write!(f, "{} shared performers", n),
            MatchRule::Date(days) => write!(f, "date within {} days", days),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryMatch {
    pub gallery: GalleryRef,
    pub rule: MatchRule,
}

#[async_trait]
pub trait GalleryMatcher: Send {
    /// 為一個孤兒場景找出最多一個畫廊
    async fn find_match(&mut self, scene: &Scene) -> Result<Option<GalleryMatch>>;
}

/// 依目錄階層尋找畫廊：先找同目錄的圖片，再找子目錄與直接上層目錄的圖片。
///
/// 目錄查詢結果在單次執行內快取，matcher 不可跨執行重用。
pub struct HierarchyMatcher<C: Catalog> {
    catalog: C,
    cache: HashMap<DirQuery, Vec<Image>>,
}

impl<C: Catalog> HierarchyMatcher<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            cache: HashMap::new(),
        }
    }

    async fn images(&mut self, query: DirQuery) -> Result<&[Image]> {
        if !self.cache.contains_key(&query) {
            let images = self.catalog.find_images(&query).await?;
            tracing::debug!("🔎 {:?}: {} images", query, images.len());
            self.cache.insert(query.clone(), images);
        }
        Ok(self
            .cache
            .get(&query)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}

fn first_linked_gallery<'a>(mut images: impl Iterator<Item = &'a Image>) -> Option<&'a GalleryRef> {
    images.find_map(|image| image.galleries.first())
}

#[async_trait]
impl<C: Catalog> GalleryMatcher for HierarchyMatcher<C> {
    async fn find_match(&mut self, scene: &Scene) -> Result<Option<GalleryMatch>> {
        let Some(path) = scene.primary_path() else {
            return Ok(None);
        };
        let scene_dir = folder::parent_dir(path);

        // 1. 同目錄的圖片
        let same_folder = self.images(DirQuery::Exact(scene_dir.clone())).await?;
        if let Some(gallery) = first_linked_gallery(same_folder.iter()) {
            return Ok(Some(GalleryMatch {
                gallery: gallery.clone(),
                rule: MatchRule::SameFolder,
            }));
        }

        // 2. 子目錄與直接上層目錄；已在根目錄時不再往上
        let parent = folder::parent_dir(&scene_dir);
        if parent == scene_dir {
            tracing::debug!("Scene {} sits at a root folder, nothing above it", scene.id);
            return Ok(None);
        }

        let nearby = self.images(DirQuery::Under(parent.clone())).await?;
        let mut by_dir: BTreeMap<String, Vec<&Image>> = BTreeMap::new();
        for image in nearby {
            let Some(image_path) = image.primary_path() else {
                continue;
            };
            let image_dir = folder::parent_dir(image_path);
            if folder::is_adjacent(&image_dir, &scene_dir, &parent) {
                by_dir.entry(image_dir).or_default().push(image);
            }
        }

        // 目錄依字典序走訪，只為了讓平手時的結果可重現
        for (dir, images) in &by_dir {
            if let Some(gallery) = first_linked_gallery(images.iter().copied()) {
                let rule = if *dir == scene_dir {
                    MatchRule::SameFolder
                } else if *dir == parent {
                    MatchRule::ParentFolder
                } else {
                    MatchRule::ChildFolder
                };
                return Ok(Some(GalleryMatch {
                    gallery: gallery.clone(),
                    rule,
                }));
            }
        }

        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSettings {
    pub match_by_path: bool,
    pub match_by_performers: bool,
    pub min_performer_match: usize,
    pub match_by_date: bool,
    pub date_tolerance_days: i64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            match_by_path: true,
            match_by_performers: false,
            min_performer_match: 1,
            match_by_date: false,
            date_tolerance_days: 1,
        }
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

/// 依獨立訊號比對全部畫廊，順序為：畫廊目錄相同、共同演員數、日期接近。
pub struct SignalMatcher {
    galleries: Vec<Gallery>,
    settings: SignalSettings,
}

impl SignalMatcher {
    pub fn new(galleries: Vec<Gallery>, settings: SignalSettings) -> Self {
        Self {
            galleries,
            settings,
        }
    }

    fn match_by_path(&self, scene: &Scene) -> Option<GalleryMatch> {
        if !self.settings.match_by_path {
            return None;
        }
        let scene_dir = folder::parent_dir(scene.primary_path()?);

        self.galleries
            .iter()
            .find(|gallery| {
                gallery
                    .folder_path
                    .as_deref()
                    .is_some_and(|path| folder::normalize_dir(path) == scene_dir)
            })
            .map(|gallery| GalleryMatch {
                gallery: gallery.to_ref(),
                rule: MatchRule::FolderPath,
            })
    }

    /// 共同演員最多且不少於門檻的畫廊；同數時取先出現者
    fn match_by_performers(&self, scene: &Scene) -> Option<GalleryMatch> {
        if !self.settings.match_by_performers || scene.performer_ids.is_empty() {
            return None;
        }
        let scene_performers: HashSet<&str> =
            scene.performer_ids.iter().map(String::as_str).collect();

        let mut best: Option<(&Gallery, usize)> = None;
        for gallery in &self.galleries {
            let shared = gallery
                .performer_ids
                .iter()
                .map(String::as_str)
                .collect::<HashSet<_>>()
                .intersection(&scene_performers)
                .count();
            if shared >= self.settings.min_performer_match
                && best.map_or(true, |(_, count)| shared > count)
            {
                best = Some((gallery, shared));
            }
        }

        best.map(|(gallery, shared)| GalleryMatch {
            gallery: gallery.to_ref(),
            rule: MatchRule::Performers(shared),
        })
    }

    fn match_by_date(&self, scene: &Scene) -> Option<GalleryMatch> {
        if !self.settings.match_by_date {
            return None;
        }
        let scene_date = parse_date(scene.date.as_deref())?;

        self.galleries.iter().find_map(|gallery| {
            let gallery_date = parse_date(gallery.date.as_deref())?;
            let days = (scene_date - gallery_date).num_days().abs();
            (days <= self.settings.date_tolerance_days).then(|| GalleryMatch {
                gallery: gallery.to_ref(),
                rule: MatchRule::Date(days),
            })
        })
    }
}

#[async_trait]
impl GalleryMatcher for SignalMatcher {
    async fn find_match(&mut self, scene: &Scene) -> Result<Option<GalleryMatch>> {
        Ok(self
            .match_by_path(scene)
            .or_else(|| self.match_by_performers(scene))
            .or_else(|| self.match_by_date(scene)))
    }
}
