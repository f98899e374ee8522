use crate::models::job::{sanitize_path_component, GenerationJob};
use crate::models::lesson::StoredLesson;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载单个生成任务
pub async fn load_job(toml_file_path: &Path) -> Result<GenerationJob> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut job: GenerationJob = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    job.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(job)
}

/// 从文件夹中加载所有生成任务
///
/// 解析失败的文件只记录警告并跳过，结果按文件名排序
pub async fn load_all_jobs(folder_path: &str) -> Result<Vec<GenerationJob>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut jobs = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_job(&path).await {
            Ok(job) => jobs.push(job),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}

/// 读取已存储的课程内容：`<content_folder>/<subject>/<topic>.toml`
///
/// 文件不存在时返回 `Ok(None)`
pub async fn load_stored_lesson(
    content_folder: &str,
    subject: &str,
    topic: &str,
) -> Result<Option<StoredLesson>> {
    let path = Path::new(content_folder)
        .join(sanitize_path_component(subject))
        .join(format!("{}.toml", sanitize_path_component(topic)));

    if !fs::try_exists(&path).await.unwrap_or(false) {
        tracing::debug!("未找到已存储内容: {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("无法读取内容文件: {}", path.display()))?;

    let lesson: StoredLesson = toml::from_str(&content)
        .with_context(|| format!("无法解析内容文件: {}", path.display()))?;

    Ok(Some(lesson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lesson::ContentKind;

    #[tokio::test]
    async fn test_load_all_jobs_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            "name = \"二\"\nsubject = \"math\"\ntopic = \"fractions\"\nkind = \"mcq\"\ncount = 25\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.toml"),
            "name = \"一\"\nsubject = \"math\"\ntopic = \"algebra\"\nkind = \"notes\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "name = ").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let jobs = load_all_jobs(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].topic, "algebra");
        assert_eq!(jobs[0].kind, ContentKind::Notes);
        assert_eq!(jobs[1].count, 25);
        assert!(jobs[1].file_path.as_deref().unwrap().ends_with("b.toml"));
    }

    #[tokio::test]
    async fn test_load_all_jobs_missing_folder() {
        assert!(load_all_jobs("/no/such/jobs/folder").await.is_err());
    }

    #[tokio::test]
    async fn test_load_stored_lesson() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("physics")).unwrap();
        std::fs::write(
            dir.path().join("physics").join("optics.toml"),
            r#"
notes = "光沿直线传播"
pdf_url = "https://cdn.example.com/optics.pdf"

[[questions]]
question = "光在真空中的速度约为？"
options = ["3×10^8 m/s", "340 m/s"]
correct_answer = "3×10^8 m/s"
"#,
        )
        .unwrap();

        let folder = dir.path().to_str().unwrap();
        let lesson = load_stored_lesson(folder, "physics", "optics").await.unwrap().unwrap();
        assert_eq!(lesson.questions.len(), 1);
        assert!(lesson.video_url.is_none());

        assert!(load_stored_lesson(folder, "physics", "sound").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_stored_lesson_stays_inside_content_folder() {
        let root = tempfile::tempdir().unwrap();
        let content = root.path().join("content");
        std::fs::create_dir_all(content.join("physics")).unwrap();
        std::fs::write(root.path().join("secret.toml"), "notes = \"不应被读取\"\n").unwrap();

        let folder = content.to_str().unwrap();
        assert!(load_stored_lesson(folder, "physics", "../../secret").await.unwrap().is_none());
        assert!(load_stored_lesson(folder, "..", "secret").await.unwrap().is_none());
    }
}
