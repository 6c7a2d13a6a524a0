//! 画像存储
//!
//! `ProfileStore` 只约定保存和读取，内存实现用于测试和演示，
//! 文件实现把每个玩家存成数据目录下的一个 JSON 文件。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::profile::PlayerProfile;

/// 画像存储接口
pub trait ProfileStore {
    /// 读取画像，不存在时返回 None
    fn load(&self, player_id: &str) -> Result<Option<PlayerProfile>>;

    /// 保存画像（覆盖）
    fn save(&mut self, profile: &PlayerProfile) -> Result<()>;

    /// 列出所有已保存的玩家 ID（排序后）
    fn list(&self) -> Result<Vec<String>>;

    /// 读取画像，不存在时创建并保存
    fn get_or_create(&mut self, player_id: &str) -> Result<PlayerProfile> {
        if let Some(profile) = self.load(player_id)? {
            return Ok(profile);
        }
        let profile = PlayerProfile::new(player_id);
        self.save(&profile)?;
        debug!("Created profile for {}", player_id);
        Ok(profile)
    }
}

/// 内存存储，内容以 JSON 文本保存
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    documents: HashMap<String, String>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, player_id: &str) -> Result<Option<PlayerProfile>> {
        self.documents
            .get(player_id)
            .map(|json| PlayerProfile::from_json(json).context("解析画像失败"))
            .transpose()
    }

    fn save(&mut self, profile: &PlayerProfile) -> Result<()> {
        let json = profile.to_json().context("序列化画像失败")?;
        self.documents.insert(profile.player_id.clone(), json);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// 文件存储，每个玩家一个 `<id>.json`
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    profiles_dir: PathBuf,
}

impl FileProfileStore {
    /// 使用系统数据目录下的默认位置
    pub fn new() -> Result<Self> {
        Self::with_dir(default_profiles_directory()?)
    }

    /// 使用指定目录，不存在时创建
    pub fn with_dir(profiles_dir: impl Into<PathBuf>) -> Result<Self> {
        let profiles_dir = profiles_dir.into();
        if !profiles_dir.exists() {
            fs::create_dir_all(&profiles_dir)
                .with_context(|| format!("无法创建画像目录: {:?}", profiles_dir))?;
        }
        Ok(Self { profiles_dir })
    }

    pub fn profiles_directory(&self) -> &Path {
        &self.profiles_dir
    }

    fn profile_path(&self, player_id: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.json", sanitize_filename(player_id)))
    }

    /// 删除画像，不存在时忽略
    pub fn delete(&self, player_id: &str) -> Result<()> {
        let path = self.profile_path(player_id);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("删除文件失败: {:?}", path))?;
        }
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self, player_id: &str) -> Result<Option<PlayerProfile>> {
        let path = self.profile_path(player_id);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("读取文件失败: {:?}", path))?;
        let profile = PlayerProfile::from_json(&content)
            .with_context(|| format!("解析画像文件失败: {:?}", path))?;
        Ok(Some(profile))
    }

    fn save(&mut self, profile: &PlayerProfile) -> Result<()> {
        let path = self.profile_path(&profile.player_id);
        let json = profile.to_json().context("序列化画像失败")?;
        fs::write(&path, json).with_context(|| format!("写入文件失败: {:?}", path))?;
        debug!("Saved profile {} to {:?}", profile.player_id, path);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.profiles_dir)
            .with_context(|| format!("读取画像目录失败: {:?}", self.profiles_dir))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.context("读取目录项失败")?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            // 以文件内容中的 ID 为准，跳过损坏的文件
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if let Ok(profile) = PlayerProfile::from_json(&content) {
                ids.push(profile.player_id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// 跨平台的默认画像目录
fn default_profiles_directory() -> Result<PathBuf> {
    let app_data_dir = dirs::data_dir().context("无法获取应用数据目录")?;
    Ok(app_data_dir.join("adaptive-chess").join("profiles"))
}

/// 清理文件名中的特殊字符
fn sanitize_filename(name: &str) -> String {
    let clean: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string();
    if clean.is_empty() {
        "_".to_string()
    } else {
        clean
    }
}
