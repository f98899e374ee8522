//! 密钥池
//!
//! 从显式传入的配置中加载 API 密钥，整个操作期间只读

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// 密钥池的配置来源
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyConfig {
    #[serde(default)]
    pub api_keys: Vec<String>,
}

/// 单个 API 密钥
///
/// Display 和 Debug 都只输出脱敏后的后缀
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// 完整密钥，只在构造客户端时使用
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 脱敏后的密钥后缀，用于日志
    pub fn redacted(&self) -> String {
        let count = self.0.chars().count();
        let suffix: String = self.0.chars().skip(count.saturating_sub(4)).collect();
        format!("…{}", suffix)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.redacted())
    }
}

/// 有序、去重的密钥集合
#[derive(Debug, Clone, Default)]
pub struct KeyPool {
    keys: Vec<Credential>,
}

impl KeyPool {
    /// 加载密钥
    ///
    /// 去掉首尾空白，丢弃空项，按首次出现的顺序去重。
    /// 没有密钥时返回空池而不是报错，调用方自行决定如何处理。
    pub fn load(config: &KeyConfig) -> Self {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();

        for raw in &config.api_keys {
            let key = raw.trim();
            if key.is_empty() {
                continue;
            }
            if seen.insert(key.to_string()) {
                keys.push(Credential::new(key));
            }
        }

        if keys.is_empty() {
            warn!("⚠️ 配置中没有可用的 API 密钥");
        } else {
            debug!("已加载 {} 个 API 密钥", keys.len());
        }

        Self { keys }
    }

    pub fn keys(&self) -> &[Credential] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 按轮转规则选择密钥：`(worker + index) mod 密钥数`
    ///
    /// 池为空时返回 None
    pub fn rotated(&self, worker: usize, index: usize) -> Option<&Credential> {
        if self.keys.is_empty() {
            return None;
        }
        self.keys.get((worker + index) % self.keys.len())
    }
}
