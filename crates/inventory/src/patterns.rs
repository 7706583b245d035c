//! 제한 소프트웨어 목록 파일
//!
//! 목록 파일은 UTF-8 텍스트이며 한 줄에 패턴 하나입니다.
//! 앞뒤 공백은 제거되고, 빈 줄과 `#`으로 시작하는 줄은 무시됩니다.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::InventoryScannerError;

/// 목록 파일 확장자
pub const LIST_EXTENSION: &str = "txt";

/// 목록 파일 최대 크기 (1 MB)
pub const MAX_LIST_SIZE: u64 = 1024 * 1024;

/// 목록 텍스트를 패턴으로 파싱합니다.
pub fn parse_pattern_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

fn list_error(path: &Path, reason: impl Into<String>) -> InventoryScannerError {
    InventoryScannerError::PatternList {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// 목록 파일을 로드합니다.
///
/// # Errors
///
/// 파일이 없거나 읽을 수 없거나 크기 제한을 넘으면 `PatternList`
pub fn load_pattern_list(path: &Path) -> Result<Vec<String>, InventoryScannerError> {
    let metadata = std::fs::metadata(path).map_err(|e| list_error(path, e.to_string()))?;
    if metadata.len() > MAX_LIST_SIZE {
        return Err(list_error(
            path,
            format!("file size {} exceeds limit {MAX_LIST_SIZE}", metadata.len()),
        ));
    }
    let content = std::fs::read_to_string(path).map_err(|e| list_error(path, e.to_string()))?;
    let patterns = parse_pattern_list(&content);
    debug!(path = %path.display(), patterns = patterns.len(), "pattern list loaded");
    Ok(patterns)
}

/// 디렉토리의 목록 파일(`*.txt`)을 이름순으로 찾습니다.
///
/// 하위 디렉토리는 탐색하지 않습니다.
pub fn discover_pattern_lists(dir: &Path) -> Result<Vec<PathBuf>, InventoryScannerError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| InventoryScannerError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut lists: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(LIST_EXTENSION))
        })
        .collect();
    lists.sort();
    Ok(lists)
}

/// 목록 이름 또는 경로를 실제 파일 경로로 해석합니다.
///
/// 존재하는 파일 경로면 그대로, 아니면 `dir/<name>.txt`를 사용합니다.
pub fn resolve_pattern_list(dir: &Path, name_or_path: &str) -> PathBuf {
    let direct = PathBuf::from(name_or_path);
    if direct.is_file() {
        return direct;
    }
    let file_name = if Path::new(name_or_path).extension().is_some() {
        name_or_path.to_owned()
    } else {
        format!("{name_or_path}.{LIST_EXTENSION}")
    };
    dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blanks_and_comments() {
        let content = "# browsers\n  chrome  \n\n\tfirefox\n#opera\n   # indented comment\n";
        assert_eq!(parse_pattern_list(content), vec!["chrome", "firefox"]);
    }

    #[test]
    fn parse_handles_crlf() {
        assert_eq!(parse_pattern_list("teamviewer\r\nanydesk\r\n"), vec!["teamviewer", "anydesk"]);
    }

    #[test]
    fn parse_empty_content() {
        assert!(parse_pattern_list("").is_empty());
        assert!(parse_pattern_list("# only comments\n\n").is_empty());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("remote.txt");
        std::fs::write(&path, "teamviewer\nanydesk\n").expect("write");
        assert_eq!(load_pattern_list(&path).expect("load"), vec!["teamviewer", "anydesk"]);
    }

    #[test]
    fn load_missing_file_is_pattern_list_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let err = load_pattern_list(&dir.path().join("missing.txt")).expect_err("missing");
        assert!(matches!(err, InventoryScannerError::PatternList { .. }));
    }

    #[test]
    fn discover_lists_only_txt_files_sorted() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("b.txt"), "x").expect("write");
        std::fs::write(dir.path().join("a.TXT"), "x").expect("write");
        std::fs::write(dir.path().join("notes.md"), "x").expect("write");
        std::fs::create_dir(dir.path().join("sub.txt")).expect("mkdir");

        let lists = discover_pattern_lists(dir.path()).expect("discover");
        let names: Vec<String> = lists
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }

    #[test]
    fn resolve_prefers_existing_path_then_list_dir() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let file = dir.path().join("games.txt");
        std::fs::write(&file, "steam").expect("write");

        let direct = resolve_pattern_list(Path::new("ProgramList"), &file.display().to_string());
        assert_eq!(direct, file);

        let by_name = resolve_pattern_list(dir.path(), "games");
        assert_eq!(by_name, dir.path().join("games.txt"));
    }
}
