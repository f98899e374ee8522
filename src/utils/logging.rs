/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别为 info（`verbose` 时为 debug），`RUST_LOG` 可以覆盖。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n内容生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(key_count: usize, max_workers: usize, batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量内容生成模式");
    info!("🔑 可用密钥数: {}", key_count);
    info!("📊 最大 worker 数: {}", max_workers);
    info!("📦 每批题目数: {}", batch_size);
    info!("{}", "=".repeat(60));
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 记录出题批次规划
pub fn log_batch_plan(target: usize, batch_count: usize, batch_size: usize) {
    info!(
        "📦 出题计划: 目标 {} 道，共 {} 批，每批 {} 道",
        target, batch_count, batch_size
    );
}

/// 记录任务加载信息
pub fn log_jobs_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的生成任务\n", total);
}

/// 记录单个任务开始
pub fn log_job_start(job_index: usize, total: usize, name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[任务 {}/{}] 开始处理: {}", job_index, total, name);
}

/// 打印最终统计信息，并追加到日志文件
///
/// # 参数
/// - `success`: 完整交付数量
/// - `partial`: 数量不足的任务数
/// - `coming_soon`: 内容不可用的任务数
/// - `failed`: 处理出错的任务数
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    success: usize,
    partial: usize,
    coming_soon: usize,
    failed: usize,
    total: usize,
    log_file_path: &str,
) {
    let finished_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", finished_at);
    info!("{}", "=".repeat(60));
    info!("✅ 完整: {}/{}", success, total);
    info!("⚠️ 数量不足: {}", partial);
    info!("🕒 即将上线: {}", coming_soon);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));

    let summary = format!(
        "\n完成时间: {}\n完整: {}/{} | 数量不足: {} | 即将上线: {} | 失败: {}",
        finished_at, success, total, partial, coming_soon, failed
    );
    match append_log_line(log_file_path, &summary) {
        Ok(()) => info!("\n日志已保存至: {}", log_file_path),
        Err(e) => warn!("⚠️ 无法写入日志文件 {}: {:#}", log_file_path, e),
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }

    #[test]
    fn test_final_stats_appended_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let path = path.to_str().unwrap();
        init_log_file(path).unwrap();
        append_log_line(path, "[任务 1] 完整").unwrap();

        print_final_stats(1, 0, 2, 3, 6, path);

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("内容生成日志"));
        assert!(content.contains("[任务 1] 完整"));
        assert!(content.contains("失败: 3"));
        assert!(content.contains("完整: 1/6"));
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        init_log_file(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("内容生成日志"));
    }
}
