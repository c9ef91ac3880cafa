//! 目錄字串運算。
//!
//! 全部是純字串處理，不會碰到真實檔案系統；目錄路徑來自目錄記錄中的檔案路徑。
//! 分隔符依每條路徑各自判定：磁碟代號開頭或只含 `\` 的 Windows 路徑，`/` 與 `\` 都是分隔符；
//! 其餘一律只認 `/`，`\` 在 POSIX 上只是一般檔名字元。比較一律區分大小寫。

const POSIX_SEPARATORS: &[char] = &['/'];
const WINDOWS_SEPARATORS: &[char] = &['/', '\\'];

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_windows_path(path: &str) -> bool {
    has_drive_prefix(path) || (path.contains('\\') && !path.contains('/'))
}

/// 這條路徑認得的分隔符
fn separators(path: &str) -> &'static [char] {
    if is_windows_path(path) {
        WINDOWS_SEPARATORS
    } else {
        POSIX_SEPARATORS
    }
}

/// 組合路徑時使用的分隔符，沒有分隔符時預設 `/`
fn separator_of(path: &str) -> char {
    if path.contains('\\') && !path.contains('/') {
        '\\'
    } else {
        '/'
    }
}

fn is_root(path: &str) -> bool {
    let seps = separators(path);
    match path.len() {
        1 => path.starts_with(seps),
        // Windows 磁碟根目錄
        3 => has_drive_prefix(path) && path.ends_with(seps),
        _ => false,
    }
}

/// 去掉結尾分隔符，根目錄保持原樣
pub fn normalize_dir(path: &str) -> &str {
    if is_root(path) {
        return path;
    }
    let trimmed = path.trim_end_matches(separators(path));
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}

/// 檔案或目錄的上一層目錄。
///
/// 根目錄的上一層是它自己；沒有分隔符的相對名稱回傳 `"."`。
pub fn parent_dir(path: &str) -> String {
    let path = normalize_dir(path);
    if is_root(path) {
        return path.to_string();
    }
    match path.rfind(separators(path)) {
        None => ".".to_string(),
        Some(0) => path[..1].to_string(),
        Some(idx) => {
            let head = &path[..idx];
            if head.ends_with(':') {
                // Windows 磁碟根目錄保留分隔符，例如 `C:\`
                path[..=idx].to_string()
            } else {
                head.to_string()
            }
        }
    }
}

/// 路徑最後一段名稱
pub fn file_name(path: &str) -> Option<&str> {
    let path = normalize_dir(path);
    let name = match path.rfind(separators(path)) {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    (!name.is_empty()).then_some(name)
}

/// `dir` 是否為 `ancestor` 的嚴格子孫目錄，必須在完整的路徑段邊界上
pub fn is_descendant(dir: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() || dir.len() <= ancestor.len() || !dir.starts_with(ancestor) {
        return false;
    }
    let seps = separators(dir);
    if ancestor.ends_with(seps) {
        return true;
    }
    dir[ancestor.len()..].starts_with(seps)
}

/// 圖片目錄是否與場景目錄相鄰：同一目錄、場景目錄的任意深度子目錄，或場景的直接上層目錄。
///
/// 兄弟目錄、祖父以上的目錄，以及只共用字串前綴的目錄（`/media/session10` 對
/// `/media/session1`）都不算。
pub fn is_adjacent(image_dir: &str, scene_dir: &str, scene_parent_dir: &str) -> bool {
    image_dir == scene_dir
        || is_descendant(image_dir, scene_dir)
        || image_dir == scene_parent_dir
}

/// 目錄加上結尾分隔符，用於前綴查詢
pub fn dir_prefix(dir: &str) -> String {
    if dir.ends_with(separators(dir)) {
        dir.to_string()
    } else {
        format!("{}{}", dir, separator_of(dir))
    }
}
