use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod logging;

/// 설정 로드 중 발생한 에러 열거
#[derive(Debug)]
pub enum ConfigError {
    /// 설정 파일, 환경 변수를 읽거나 변환하지 못함
    LoadFailed(String),

    /// 허용되지 않는 설정 값
    InvalidValue(String),

    /// 전역 로거 설정에 실패함
    LoggerInitFailed(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed(message) => write!(f, "Failed to load config, {}", message),
            ConfigError::InvalidValue(message) => write!(f, "Invalid config value, {}", message),
            ConfigError::LoggerInitFailed(message) => write!(f, "Failed to initialize logger, {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::LoadFailed(e.to_string())
    }
}

const DEF_LOAN_DAYS: u32 = 3;
const DEF_MOCK_BOOKS: usize = 10;
const DEF_MOCK_MEMBERS: usize = 5;

/// 대여 데스크 설정
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// 반납 예정일을 입력하지 않았을 때 오늘부터 며칠 뒤를 반납 예정일로 할지 설정한다.
    loan_days: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self { loan_days: DEF_LOAN_DAYS }
    }
}

impl DeskConfig {
    pub fn loan_days(&self) -> u32 {
        self.loan_days
    }
}

/// 시작 시 채워 넣을 임의 데이터 설정
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    enabled: bool,
    books: usize,
    members: usize,

    /// 설정 시 매번 같은 데이터가 만들어진다.
    seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            books: DEF_MOCK_BOOKS,
            members: DEF_MOCK_MEMBERS,
            seed: None,
        }
    }
}

impl MockConfig {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn books(&self) -> usize {
        self.books
    }

    pub fn members(&self) -> usize {
        self.members
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    desk: DeskConfig,
    mock: MockConfig,
    logger: Option<logging::Config>,
}

impl AppConfig {
    pub fn desk(&self) -> &DeskConfig {
        &self.desk
    }

    pub fn mock(&self) -> &MockConfig {
        &self.mock
    }

    pub fn logger(&self) -> Option<&logging::Config> {
        self.logger.as_ref()
    }

    pub fn set_loan_days(&mut self, days: u32) {
        self.desk.loan_days = days;
    }

    pub fn set_mock_enabled(&mut self, enabled: bool) {
        self.mock.enabled = enabled;
    }

    pub fn set_mock_seed(&mut self, seed: u64) {
        self.mock.seed = Some(seed);
    }
}

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// 실행 환경(`RUN_MODE`, 기본값 development)에 맞는 `config/{RUN_MODE}.json` 파일로 설정을 로드한다.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    load_config_from(&format!("config/{}.json", env))
}

/// 설정 파일과 `LIBRARY__` 접두사를 가진 환경 변수로 설정을 로드한다.
///
/// 설정 파일은 없어도 되며 입력되지 않은 값은 기본값을 사용한다.
/// 환경 변수는 `__`로 계층을 구분한다. (예: `LIBRARY__DESK__LOAN_DAYS=7`)
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    load_config_with(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("LIBRARY")
        .separator("__")
        .try_parsing(true)
}

fn load_config_with(path: &str, environment: config::Environment) -> Result<AppConfig, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(environment)
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    if let Some(logger) = &app_config.logger {
        logger.validate()?;
    }
    Ok(app_config)
}
