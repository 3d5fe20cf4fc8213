//! 文件名去重服务 - 业务能力层
//!
//! 把标题变成文件名，并保证同一批次内不会重名

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// 文件扩展名
pub const MARKDOWN_EXTENSION: &str = ".md";

/// slug 最大长度
const MAX_SLUG_LEN: usize = 100;

/// 标题转成空 slug 时使用的名字
const FALLBACK_SLUG: &str = "untitled";

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("静态正则表达式"))
}

/// 把标题转换为 slug
///
/// 小写化，非 `[a-z0-9]` 的连续字符替换为单个 `-`，去掉首尾的 `-`，最长 100 个字符。
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let replaced = separator_regex().replace_all(&lowered, "-");
    let mut slug = replaced.trim_matches('-').to_string();

    // 替换后只剩 ASCII，按字节截断是安全的
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// 文件名登记表
///
/// 生命周期与一个批次相同，批次开始时清空。
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    used: HashSet<String>,
}

impl FilenameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `base_name` 预留一个唯一的文件名
    ///
    /// 依次尝试 `base.md`、`base-1.md`、`base-2.md` ……
    pub fn reserve(&mut self, base_name: &str) -> String {
        let mut filename = format!("{}{}", base_name, MARKDOWN_EXTENSION);
        let mut counter = 1;
        while self.used.contains(&filename) {
            filename = format!("{}-{}{}", base_name, counter, MARKDOWN_EXTENSION);
            counter += 1;
        }

        debug!("预留文件名: {}", filename);
        self.used.insert(filename.clone());
        filename
    }

    pub fn clear(&mut self) {
        self.used.clear();
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
