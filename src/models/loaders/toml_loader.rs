use crate::error::{AppResult, FileError};
use crate::models::catalog::{LmsCatalog, SubmissionBatch};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取并解析单个 TOML 文件
async fn read_toml<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(FileError::NotFound { path: display }.into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: display.clone(),
            source,
        })?;

    let value = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: display,
        source,
    })?;

    Ok(value)
}

/// 加载课程目录
pub async fn load_catalog(catalog_path: &Path) -> AppResult<LmsCatalog> {
    let catalog: LmsCatalog = read_toml(catalog_path).await?;
    tracing::info!(
        "成功加载课程目录: {} 个用户, {} 门课程, {} 个作业",
        catalog.users.len(),
        catalog.courses.len(),
        catalog.assignments.len()
    );
    Ok(catalog)
}

/// 从 TOML 文件加载一批待查重的作业提交
pub async fn load_submission_batch(toml_file_path: &Path) -> AppResult<SubmissionBatch> {
    let mut batch: SubmissionBatch = read_toml(toml_file_path).await?;

    // 设置文件路径
    batch.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(batch)
}

/// 从文件夹中加载所有 TOML 提交文件
///
/// 单个文件解析失败只记录警告，不影响其他文件。
pub async fn load_all_submission_files(folder_path: &str) -> AppResult<Vec<SubmissionBatch>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut batches = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    // read_dir 的顺序与平台有关
    paths.sort();

    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission_batch(&path).await {
            Ok(batch) => {
                tracing::info!("成功加载 {} 份作业提交", batch.submissions.len());
                batches.push(batch);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(batches)
}
