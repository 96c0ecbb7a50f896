//! 应用配置加载
//!
//! 使用 `config` crate 合并多个配置源，后添加的源覆盖先添加的源，环境变量最后生效。
//! 环境变量以 `前缀__节__键` 的形式书写，例如 `LORN__CONTAINER__SEARCH_ANCESTORS=true`

use crate::logging::LoggingConfig;
use config::{Config, Environment, File, FileFormat};
use di_abstractions::ContainerConfig;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// 应用名称
    pub name: String,
    /// 根容器描述路径
    pub root: Option<String>,
    /// 容器配置
    pub container: ContainerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "lorn-application".to_string(),
            root: None,
            container: ContainerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ApplicationConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation_error("应用名称不能为空"));
        }
        self.container.validate()?;
        self.logging.validate()
    }
}

#[derive(Debug, Clone)]
struct FileSource {
    path: PathBuf,
    format: FileFormat,
    required: bool,
}

/// 配置加载器
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    files: Vec<FileSource>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加必需的 TOML 配置文件
    pub fn add_toml_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        self.add_file(path, FileFormat::Toml, true)
    }

    /// 添加必需的 JSON 配置文件
    pub fn add_json_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        self.add_file(path, FileFormat::Json, true)
    }

    /// 添加可选的配置文件，按扩展名判断格式，文件不存在时忽略
    #[must_use]
    pub fn add_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileFormat::Json,
            Some("yaml" | "yml") => FileFormat::Yaml,
            _ => FileFormat::Toml,
        };
        debug!("添加可选配置文件: {}", path.display());
        self.files.push(FileSource {
            path: path.to_path_buf(),
            format,
            required: false,
        });
        self
    }

    fn add_file<P: AsRef<Path>>(
        mut self,
        path: P,
        format: FileFormat,
        required: bool,
    ) -> ConfigResult<Self> {
        let path = path.as_ref();
        if required && !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        info!("添加配置文件: {}", path.display());
        self.files.push(FileSource {
            path: path.to_path_buf(),
            format,
            required,
        });
        Ok(self)
    }

    /// 启用环境变量配置源
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.env_prefix = Some(prefix);
        self
    }

    /// 已添加的配置文件数量
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 合并全部配置源并反序列化为 `T`
    pub fn load<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        let mut builder = Config::builder();
        for file in &self.files {
            builder = builder.add_source(
                File::from(file.path.as_path())
                    .format(file.format)
                    .required(file.required),
            );
        }
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(ConfigError::parse_error)
    }

    /// 加载并验证应用配置
    pub fn load_application(&self) -> ConfigResult<ApplicationConfig> {
        let config: ApplicationConfig = self.load()?;
        config.validate()?;
        debug!("应用配置加载完成: {}", config.name);
        Ok(config)
    }
}
