use crate::configs::ConfigError;
use serde::Deserialize;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    dir: String,
    name: String,

    /// 최대 로그 파일 개수로 로그 파일이 설정한 개수보다 커질 경우 기존의 로그파일들은 삭제 된다.
    /// 설정 되지 않을 시 로그 파일은 삭제 되지 않는다.
    keep: Option<usize>,

    /// 파일에 출력할 로그의 레벨로 지정된 로그 레벨 이상만 로깅된다.
    /// 설정하지 않을시 기본값은 DEBUG로 설정 된다.
    ///
    /// 이 값은 [`tracing::Level`]로 변환 됨으로 자세한 사항은 해당 파일을 확인
    level: Option<String>,

    /// 로깅 파일이 분리 되는 기간으로 .log 파일 하나 당 설정된 기간 동안 로그가 기록 된다.
    /// 설정 되지 않을시 기본값은 DAILY로 설정된다.
    ///
    /// 이 값은 [`rolling::Rotation`]으로 변환 됨으로 자세한 사항은 해당 파일을 확인
    rotation: Option<String>,
}

impl Config {
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            parse_level(level)?;
        }
        if let Some(rotation) = &self.rotation {
            parse_rotation(rotation)?;
        }
        Ok(())
    }
}

/// 프로그램에서 사용할 전역 로거를 설정한다.
///
/// 로그 파일 설정이 있으면 모든 로그를 JSON 형식으로 파일에 기록하고, WARN 이상은 stderr에도 출력한다.
/// 설정이 없으면 WARN 이상의 로그만 stderr로 출력한다.
/// 반환된 [`WorkerGuard`]가 drop 되면 파일 기록이 멈추므로 프로그램 종료 시까지 가지고 있어야 한다.
pub fn set_global_logging_config(c: Option<&Config>) -> Result<Option<WorkerGuard>, ConfigError> {
    let timer = LocalTime::new(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"));

    let Some(c) = c else {
        tracing_subscriber::fmt()
            .with_timer(timer)
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .try_init()
            .map_err(|e| ConfigError::LoggerInitFailed(e.to_string()))?;
        return Ok(None);
    };

    let mut file_appender = rolling::RollingFileAppender::builder()
        .filename_prefix(c.name.clone())
        .filename_suffix("log");

    file_appender = match &c.rotation {
        Some(rotation) => file_appender.rotation(parse_rotation(rotation)?),
        None => file_appender.rotation(rolling::Rotation::DAILY),
    };

    if let Some(keep) = c.keep {
        file_appender = file_appender.max_log_files(keep);
    }

    let file_appender = file_appender.build(c.dir.clone())
        .map_err(|e| ConfigError::LoggerInitFailed(e.to_string()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let writer = std::io::stderr.with_max_level(tracing::Level::WARN).and(non_blocking);

    let level = match &c.level {
        Some(level) => parse_level(level)?,
        None => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_timer(timer)
        .with_writer(writer)
        .with_max_level(level)
        .try_init()
        .map_err(|e| ConfigError::LoggerInitFailed(e.to_string()))?;

    Ok(Some(guard))
}

fn parse_rotation(s: &str) -> Result<rolling::Rotation, ConfigError> {
    match s {
        "DAILY" => Ok(rolling::Rotation::DAILY),
        "HOURLY" => Ok(rolling::Rotation::HOURLY),
        "MINUTELY" => Ok(rolling::Rotation::MINUTELY),
        "NEVER" => Ok(rolling::Rotation::NEVER),
        _ => Err(ConfigError::InvalidValue(format!(
            "로깅 파일 로테이션(rotation)은 \"DAILY\", \"HOURLY\", \"MINUTELY\", \"NEVER\"만 가능 합니다. (입력: {})", s
        ))),
    }
}

fn parse_level(l: &str) -> Result<tracing::Level, ConfigError> {
    match l {
        "TRACE" => Ok(tracing::Level::TRACE),
        "DEBUG" => Ok(tracing::Level::DEBUG),
        "INFO" => Ok(tracing::Level::INFO),
        "WARN" => Ok(tracing::Level::WARN),
        "ERROR" => Ok(tracing::Level::ERROR),
        _ => Err(ConfigError::InvalidValue(format!(
            "로그 레벨(level)은 \"TRACE\", \"DEBUG\", \"INFO\", \"WARN\", \"ERROR\"만 가능 합니다. (입력: {})", l
        ))),
    }
}
