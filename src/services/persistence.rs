//! 保存服务 - 业务能力层
//!
//! 根据标题生成不重名的文件名，把 Markdown 交给存储协作方

use tracing::debug;

use crate::error::ItemError;
use crate::models::ExtractedPage;
use crate::services::filename_registry::{slugify, FilenameRegistry};
use crate::services::storage::Storage;

/// 保存服务
///
/// 持有本批次的文件名登记表和存储实现。
pub struct PersistenceStep<S: Storage> {
    registry: FilenameRegistry,
    storage: S,
}

impl<S: Storage> PersistenceStep<S> {
    pub fn new(storage: S) -> Self {
        Self {
            registry: FilenameRegistry::new(),
            storage,
        }
    }

    /// 新批次开始时清空登记表
    pub fn reset(&mut self) {
        self.registry.clear();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 保存提取结果，返回去重后的文件名
    pub async fn persist(&mut self, page: &ExtractedPage, prompt_user: bool) -> Result<String, ItemError> {
        let base_name = slugify(&page.title);
        let filename = self.registry.reserve(&base_name);

        let stored = self
            .storage
            .save(page.markdown.as_bytes(), &filename, prompt_user)
            .await
            .map_err(|e| ItemError::Persistence {
                filename: filename.clone(),
                reason: e.to_string(),
            })?;

        if stored != filename {
            debug!("文件 {} 实际保存为 {}", filename, stored);
        }
        Ok(filename)
    }
}
