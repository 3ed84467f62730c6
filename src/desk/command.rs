use crate::desk::{Desk, DeskError};
use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use rand::Rng;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::{BufRead, Write};

/// 명령어 해석 중 발생한 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// 따옴표가 닫히지 않음
    UnclosedQuote,

    /// 알 수 없는 명령어이거나 인자가 올바르지 않음
    Invalid(String),

    /// `--help`로 명령어 안내를 요청함
    HelpRequested(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnclosedQuote => write!(f, "Unclosed quote"),
            CommandError::Invalid(message) => write!(f, "{}", message.trim_end()),
            CommandError::HelpRequested(help) => write!(f, "{}", help.trim_end()),
        }
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Parser)]
#[command(name = "desk", no_binary_name = true, disable_help_subcommand = true)]
struct Line {
    #[command(subcommand)]
    command: DeskCommand,
}

/// 대여 데스크 명령어
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum DeskCommand {
    /// 도서 목록
    Books {
        /// 카테고리별 보기
        #[arg(long)]
        category: Option<String>,
    },
    /// 서가의 카테고리 목록
    Categories,
    /// 회원 목록
    Members,
    /// 신간 도서 등록
    AddBook {
        title: String,
        author: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// 도서 폐기
    RemoveBook { title: String },
    /// 신규 회원 등록
    Register { name: String },
    /// 회원 이름 수정
    Rename { old: String, new: String },
    /// 회원 탈퇴
    Unregister { name: String },
    /// 도서 대여 (반납 예정일 형식: YYYY-MM-DD)
    Rent {
        member: String,
        title: String,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// 도서 반납
    Return { member: String, title: String },
    /// 대출 가능한 도서 제목
    Available,
    /// 회원이 빌린 도서 제목
    Borrowed { member: String },
    /// 현재 상태를 JSON으로 출력
    Snapshot,
    /// 도서관 초기화
    Reset,
    /// 명령어 안내
    Help,
    /// 종료
    #[command(alias = "exit")]
    Quit,
}

/// 한 줄의 입력을 명령어로 해석한다. 공백이 들어간 값은 큰따옴표로 묶는다.
///
/// # Example
/// ```
/// use library_desk::desk::command::{parse, DeskCommand};
///
/// let command = parse(r#"rent 철수 "반지의 제왕" --due 2030-01-10"#).unwrap();
/// assert_eq!(command, DeskCommand::Rent {
///     member: "철수".to_owned(),
///     title: "반지의 제왕".to_owned(),
///     due: chrono::NaiveDate::from_ymd_opt(2030, 1, 10),
/// });
/// ```
pub fn parse(line: &str) -> Result<DeskCommand, CommandError> {
    let tokens = tokenize(line)?;
    Line::try_parse_from(tokens)
        .map(|line| line.command)
        .map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp => CommandError::HelpRequested(e.to_string()),
            _ => CommandError::Invalid(e.to_string()),
        })
}

/// 공백으로 인자를 나눈다. 큰따옴표로 묶인 부분은 공백이 있어도 하나의 인자가 된다.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    // 빈 따옴표("")도 인자로 취급하기 위함
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quote = !in_quote;
                pending = true;
            }
            c if c.is_whitespace() && !in_quote => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if in_quote {
        return Err(CommandError::UnclosedQuote);
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn help() -> String {
    Line::command().render_long_help().to_string()
}

/// 명령어를 실행하고 사용자에게 보여줄 메시지를 반환한다.
pub fn execute<R>(desk: &mut Desk, rng: &mut R, command: DeskCommand) -> Result<String, DeskError>
where
    R: Rng + ?Sized
{
    let message = match command {
        DeskCommand::Books { category } => {
            let rows = desk.book_rows(category.as_deref());
            if rows.is_empty() {
                "표시할 도서가 없습니다.".to_owned()
            } else {
                join_lines(rows)
            }
        }
        DeskCommand::Categories => format!(
            "서가: {}\n등록 가능: {}",
            desk.categories().join(", "),
            desk.category_options().join(", ")
        ),
        DeskCommand::Members => {
            let cards = desk.member_cards();
            if cards.is_empty() {
                "등록된 회원이 없습니다.".to_owned()
            } else {
                format!("총 회원 수: {}명\n{}", desk.member_count(), join_lines(cards))
            }
        }
        DeskCommand::AddBook { title, author, category } => {
            let row = desk.add_book(&title, &author, category.as_deref())?;
            format!("'{}' 분야의 '{}' 입고 완료!", row.category, row.title)
        }
        DeskCommand::RemoveBook { title } => {
            let book = desk.remove_book(&title)?;
            format!("'{}' 폐기 처리되었습니다.", book.title())
        }
        DeskCommand::Register { name } => {
            desk.register_member(&name)?;
            format!("'{}'님 환영합니다!", name.trim())
        }
        DeskCommand::Rename { old, new } => {
            desk.update_member(&old, &new)?;
            format!("이름이 변경되었습니다. ({} -> {})", old.trim(), new.trim())
        }
        DeskCommand::Unregister { name } => {
            desk.remove_member(&name)?;
            format!("'{}'님 탈퇴 처리되었습니다.", name.trim())
        }
        DeskCommand::Rent { member, title, due } => {
            let receipt = desk.rent_book(&member, &title, due)?;
            let mut message = format!(
                "'{}' 회원님, '{}' 대여가 완료되었습니다! (반납예정일: {})",
                receipt.member, receipt.title, receipt.due_date
            );
            if receipt.overdue {
                message.push_str(&format!("\n[알림] '{}'님, 반납일이 지났습니다! 책을 반납해주세요.", receipt.member));
            }
            message
        }
        DeskCommand::Return { member, title } => {
            desk.return_book(&member, &title)?;
            format!("'{}' 반납 완료!", title.trim())
        }
        DeskCommand::Available => {
            let titles = desk.available_titles();
            if titles.is_empty() {
                "대출 가능한 책이 없습니다.".to_owned()
            } else {
                titles.join("\n")
            }
        }
        DeskCommand::Borrowed { member } => {
            let titles = desk.borrowed_titles(&member)?;
            if titles.is_empty() {
                "대출 중인 책이 없습니다.".to_owned()
            } else {
                titles.join("\n")
            }
        }
        DeskCommand::Snapshot => desk.snapshot_json()?,
        DeskCommand::Reset => {
            desk.reset(rng);
            format!(
                "도서관을 초기화했습니다. (도서 {}권, 회원 {}명)",
                desk.library().books().len(),
                desk.member_count()
            )
        }
        DeskCommand::Help => help(),
        DeskCommand::Quit => "안녕히 가세요.".to_owned(),
    };
    Ok(message)
}

/// 입력에서 한 줄씩 명령어를 읽어 실행하고 결과를 출력한다. `quit` 또는 입력의 끝에서 멈춘다.
pub fn run<I, O, R>(desk: &mut Desk, rng: &mut R, mut input: I, mut output: O) -> io::Result<()>
where
    I: BufRead,
    O: Write,
    R: Rng + ?Sized
{
    writeln!(output, "=== 우리동네 도서관 대여 시스템 ('help' 입력 시 명령어 안내) ===")?;

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse(&line) {
            Ok(command) => command,
            Err(CommandError::HelpRequested(help)) => {
                writeln!(output, "{}", help.trim_end())?;
                continue;
            }
            Err(e) => {
                writeln!(output, "오류: {}", e)?;
                continue;
            }
        };
        let quit = command == DeskCommand::Quit;

        match execute(desk, rng, command) {
            Ok(message) => writeln!(output, "{}", message)?,
            Err(e) => writeln!(output, "오류: {}", e)?,
        }
        if quit {
            break;
        }
    }
    Ok(())
}

fn join_lines<T: Display>(items: Vec<T>) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
