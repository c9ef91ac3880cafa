use crate::config::ServerConnection;
use crate::core::folder;
use crate::domain::model::{
    DirQuery, FileRef, Gallery, GalleryRef, Image, OrphanFilter, PageRequest, Paged, Scene,
};
use crate::domain::ports::Catalog;
use crate::utils::error::{LinkerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

const FIND_ORPHAN_SCENES: &str = r#"
query FindOrphanScenes($filter: FindFilterType, $scene_filter: SceneFilterType) {
  findScenes(filter: $filter, scene_filter: $scene_filter) {
    count
    scenes { id title date organized files { path } performers { id } galleries { id } }
  }
}"#;

const FIND_IMAGES_BY_PATH: &str = r#"
query FindImagesByPath($filter: FindFilterType, $image_filter: ImageFilterType) {
  findImages(filter: $filter, image_filter: $image_filter) {
    count
    images { id title files { path } galleries { id title folder { path } } }
  }
}"#;

const FIND_GALLERIES: &str = r#"
query FindGalleries($filter: FindFilterType) {
  findGalleries(filter: $filter) {
    count
    galleries { id title date folder { path } performers { id } }
  }
}"#;

const LINK_SCENE_GALLERIES: &str = r#"
mutation LinkSceneGalleries($input: BulkSceneUpdateInput!) {
  bulkSceneUpdate(input: $input) { id }
}"#;

const PLUGIN_CONFIGURATION: &str = r#"
query PluginConfiguration {
  configuration { plugins }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PathNode {
    path: String,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SceneNode {
    id: String,
    title: Option<String>,
    date: Option<String>,
    #[serde(default)]
    organized: bool,
    #[serde(default)]
    files: Vec<PathNode>,
    #[serde(default)]
    performers: Vec<IdNode>,
    #[serde(default)]
    galleries: Vec<IdNode>,
}

impl From<SceneNode> for Scene {
    fn from(node: SceneNode) -> Self {
        Scene {
            id: node.id,
            title: node.title,
            date: node.date,
            organized: node.organized,
            files: node.files.into_iter().map(|f| FileRef::new(f.path)).collect(),
            gallery_ids: node.galleries.into_iter().map(|g| g.id).collect(),
            performer_ids: node.performers.into_iter().map(|p| p.id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImageGalleryNode {
    id: String,
    title: Option<String>,
    folder: Option<PathNode>,
}

#[derive(Debug, Deserialize)]
struct ImageNode {
    id: String,
    title: Option<String>,
    #[serde(default)]
    files: Vec<PathNode>,
    #[serde(default)]
    galleries: Vec<ImageGalleryNode>,
}

impl From<ImageNode> for Image {
    fn from(node: ImageNode) -> Self {
        Image {
            id: node.id,
            title: node.title,
            files: node.files.into_iter().map(|f| FileRef::new(f.path)).collect(),
            galleries: node
                .galleries
                .into_iter()
                .map(|g| GalleryRef {
                    id: g.id,
                    title: g.title,
                    folder_path: g.folder.map(|f| f.path),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GalleryNode {
    id: String,
    title: Option<String>,
    date: Option<String>,
    folder: Option<PathNode>,
    #[serde(default)]
    performers: Vec<IdNode>,
}

impl From<GalleryNode> for Gallery {
    fn from(node: GalleryNode) -> Self {
        Gallery {
            id: node.id,
            title: node.title,
            date: node.date,
            folder_path: node.folder.map(|f| f.path),
            performer_ids: node.performers.into_iter().map(|p| p.id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindScenesData {
    #[serde(rename = "findScenes")]
    find_scenes: SceneList,
}

#[derive(Debug, Deserialize)]
struct SceneList {
    count: usize,
    scenes: Vec<SceneNode>,
}

#[derive(Debug, Deserialize)]
struct FindImagesData {
    #[serde(rename = "findImages")]
    find_images: ImageList,
}

#[derive(Debug, Deserialize)]
struct ImageList {
    images: Vec<ImageNode>,
}

#[derive(Debug, Deserialize)]
struct FindGalleriesData {
    #[serde(rename = "findGalleries")]
    find_galleries: GalleryList,
}

#[derive(Debug, Deserialize)]
struct GalleryList {
    count: usize,
    galleries: Vec<GalleryNode>,
}

#[derive(Debug, Deserialize)]
struct ConfigurationData {
    configuration: ConfigurationNode,
}

#[derive(Debug, Deserialize)]
struct ConfigurationNode {
    #[serde(default)]
    plugins: Map<String, Value>,
}

/// 透過 GraphQL 存取 Stash 目錄
#[derive(Debug, Clone)]
pub struct StashClient {
    client: Client,
    endpoint: Url,
    session_cookie: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl StashClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            session_cookie: None,
            api_key: None,
            timeout: None,
        }
    }

    pub fn from_connection(connection: &ServerConnection) -> Result<Self> {
        let mut client = Self::new(connection.graphql_url()?);
        if let Some(cookie) = &connection.session_cookie {
            client = client.with_session_cookie(&cookie.name, &cookie.value);
        }
        if let Some(api_key) = connection.api_key.as_deref().filter(|k| !k.is_empty()) {
            client = client.with_api_key(api_key);
        }
        Ok(client)
    }

    pub fn with_session_cookie(mut self, name: &str, value: &str) -> Self {
        self.session_cookie = Some(format!("{}={}", name, value));
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("ApiKey", api_key);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::trace!("GraphQL response status: {}", status);
        if !status.is_success() {
            return Err(LinkerError::ApiStatusError {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body: GraphQlResponse<T> = response.json().await?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(LinkerError::CatalogError {
                message: messages.join("; "),
            });
        }
        body.data.ok_or_else(|| LinkerError::CatalogError {
            message: "response contained no data".to_string(),
        })
    }
}

/// 路徑查詢在伺服器端是子字串比對，回來的圖片要再依目錄篩一次
fn image_in(image: &Image, query: &DirQuery) -> bool {
    let Some(path) = image.primary_path() else {
        return false;
    };
    let dir = folder::parent_dir(path);
    match query {
        DirQuery::Exact(target) => dir == *target,
        DirQuery::Under(target) => dir == *target || folder::is_descendant(&dir, target),
    }
}

#[async_trait]
impl Catalog for StashClient {
    async fn find_orphan_scenes(
        &self,
        filter: &OrphanFilter,
        page: PageRequest,
    ) -> Result<Paged<Scene>> {
        let mut scene_filter = json!({
            "galleries_count": { "value": 0, "modifier": "EQUALS" }
        });
        if filter.exclude_organized {
            scene_filter["organized"] = Value::Bool(false);
        }
        let variables = json!({
            "filter": {
                "page": page.page,
                "per_page": page.per_page,
                "sort": "id",
                "direction": "ASC"
            },
            "scene_filter": scene_filter
        });

        let data: FindScenesData = self.execute(FIND_ORPHAN_SCENES, variables).await?;
        Ok(Paged {
            count: data.find_scenes.count,
            items: data.find_scenes.scenes.into_iter().map(Scene::from).collect(),
        })
    }

    async fn find_images(&self, query: &DirQuery) -> Result<Vec<Image>> {
        let variables = json!({
            "filter": { "per_page": -1, "sort": "path", "direction": "ASC" },
            "image_filter": {
                "path": { "value": folder::dir_prefix(query.dir()), "modifier": "INCLUDES" }
            }
        });

        let data: FindImagesData = self.execute(FIND_IMAGES_BY_PATH, variables).await?;
        Ok(data
            .find_images
            .images
            .into_iter()
            .map(Image::from)
            .filter(|image| image_in(image, query))
            .collect())
    }

    async fn find_galleries(&self, page: PageRequest) -> Result<Paged<Gallery>> {
        let variables = json!({
            "filter": {
                "page": page.page,
                "per_page": page.per_page,
                "sort": "id",
                "direction": "ASC"
            }
        });

        let data: FindGalleriesData = self.execute(FIND_GALLERIES, variables).await?;
        Ok(Paged {
            count: data.find_galleries.count,
            items: data
                .find_galleries
                .galleries
                .into_iter()
                .map(Gallery::from)
                .collect(),
        })
    }

    async fn add_scene_galleries(&self, scene_id: &str, gallery_ids: &[String]) -> Result<()> {
        let variables = json!({
            "input": {
                "ids": [scene_id],
                "gallery_ids": { "mode": "ADD", "ids": gallery_ids }
            }
        });

        self.execute::<Value>(LINK_SCENE_GALLERIES, variables)
            .await
            .map(|_| ())
            .map_err(|e| LinkerError::MutationError {
                scene_id: scene_id.to_string(),
                message: e.to_string(),
            })
    }

    async fn plugin_settings(&self, plugin_id: &str) -> Result<Map<String, Value>> {
        let data: ConfigurationData = self.execute(PLUGIN_CONFIGURATION, json!({})).await?;
        Ok(match data.configuration.plugins.get(plugin_id) {
            Some(Value::Object(settings)) => settings.clone(),
            _ => Map::new(),
        })
    }
}
