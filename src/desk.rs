use crate::configs::{AppConfig, DeskConfig, MockConfig};
use crate::item::{Book, BookId, MemberId, CATEGORIES, DEFAULT_CATEGORY};
use crate::library::{Library, LibraryError};
use crate::mock;
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::{info, warn};

pub mod command;

/// 카테고리 필터에서 전체 도서를 의미하는 값
pub const ALL_CATEGORIES: &str = "전체";

const STATUS_AVAILABLE: &str = "대출 가능";
const STATUS_ON_LOAN: &str = "대출중";

/// 대여 데스크 사용 중 발생한 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// 필수 입력값이 비어 있음
    InputMissing(&'static str),

    /// 이미 같은 이름의 회원이 있음
    DuplicateMember(String),

    /// 도서관 작업 실패
    Library(LibraryError),

    /// 현재 상태를 JSON으로 변환하지 못함
    SnapshotFailed(String),
}

impl Display for DeskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeskError::InputMissing(field) => write!(f, "Input missing: {}", field),
            DeskError::DuplicateMember(name) => write!(f, "Member name already exists: {}", name),
            DeskError::Library(e) => write!(f, "{}", e),
            DeskError::SnapshotFailed(message) => write!(f, "Failed to build snapshot, {}", message),
        }
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeskError::Library(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibraryError> for DeskError {
    fn from(e: LibraryError) -> Self {
        DeskError::Library(e)
    }
}

/// 오늘 날짜를 제공한다.
pub trait Today {
    fn today(&self) -> NaiveDate;
}

impl<T> Today for T where T: Fn() -> NaiveDate {
    fn today(&self) -> NaiveDate {
        self()
    }
}

/// 로컬 시간대 기준 오늘 날짜
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 대출 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentReceipt {
    pub book: BookId,
    pub member: String,
    pub title: String,
    pub due_date: NaiveDate,

    /// 반납 예정일이 오늘이거나 이미 지났음
    pub overdue: bool,
}

/// 도서 목록 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRow {
    pub id: u64,
    pub category: String,
    pub title: String,
    pub author: String,
    pub status: &'static str,
    pub is_available: bool,
    pub due_date: Option<NaiveDate>,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().value(),
            category: book.category().to_owned(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            status: if book.is_available() { STATUS_AVAILABLE } else { STATUS_ON_LOAN },
            is_available: book.is_available(),
            due_date: book.due_date(),
        }
    }
}

impl Display for BookRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {} ({})", self.category, self.title, self.author, self.status)?;
        if let Some(due_date) = self.due_date {
            write!(f, " 반납예정: {}", due_date)?;
        }
        Ok(())
    }
}

/// 회원이 빌린 도서 한 권
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanLine {
    pub title: String,
    pub due_date: Option<NaiveDate>,
}

/// 회원 카드
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberCard {
    pub id: u64,
    pub name: String,
    pub loans: Vec<LoanLine>,
}

impl Display for MemberCard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} 님", self.name)?;
        if self.loans.is_empty() {
            return write!(f, "\n  대출 중인 책이 없습니다.");
        }
        for loan in &self.loans {
            match loan.due_date {
                Some(due_date) => write!(f, "\n  - {} (반납예정: {})", loan.title, due_date)?,
                None => write!(f, "\n  - {}", loan.title)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Snapshot {
    books: Vec<BookRow>,
    members: Vec<MemberCard>,
}

/// 대여 데스크
///
/// 하나의 [`Library`]를 소유하는 세션 상태로, 사용자의 입력을 검증한 뒤 도서관 작업을 호출하고
/// 화면에 보여줄 목록들을 만든다. 프로세스 혹은 세션마다 하나씩 만들어 필요한 곳에 전달한다.
pub struct Desk {
    library: Library,
    desk: DeskConfig,
    mock: MockConfig,
    today: Box<dyn Today>,
}

impl Desk {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_today(config, Box::new(local_today))
    }

    pub fn with_today(config: &AppConfig, today: Box<dyn Today>) -> Self {
        Self {
            library: Library::new(),
            desk: config.desk().clone(),
            mock: config.mock().clone(),
            today,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// 설정에 따라 임의의 도서와 회원을 채워 넣는다.
    pub fn seed<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized
    {
        if self.mock.enabled() {
            mock::populate(&mut self.library, rng, self.mock.books(), self.mock.members());
        }
    }

    /// 도서관을 새로 만들고 다시 임의 데이터를 채운다.
    pub fn reset<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized
    {
        self.library = Library::new();
        self.seed(rng);
        info!("도서관 초기화: 도서 {}권, 회원 {}명", self.library.books().len(), self.library.members().len());
    }

    /// 오늘부터 설정된 대출 기간이 지난 날짜
    pub fn default_due_date(&self) -> NaiveDate {
        let today = self.today.today();
        today.checked_add_days(Days::new(u64::from(self.desk.loan_days())))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Desk {

    /// 신간 도서를 입고하고 입고된 도서의 목록 한 줄을 반환한다.
    /// 카테고리를 입력하지 않으면 [`DEFAULT_CATEGORY`]로 입고된다.
    pub fn add_book(&mut self, title: &str, author: &str, category: Option<&str>) -> Result<BookRow, DeskError> {
        let title = require("title", title)?;
        let author = require("author", author)?;
        let category = category.map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let id = self.library.add_book(title, author, category);
        self.library.book(id)
            .map(BookRow::from)
            .ok_or_else(|| DeskError::Library(LibraryError::BookNotFound(title.to_owned())))
    }

    pub fn remove_book(&mut self, title: &str) -> Result<Book, DeskError> {
        let title = require("title", title)?;
        Ok(self.library.remove_book(title)?)
    }

    /// 신규 회원을 등록한다. 같은 이름의 회원이 이미 있으면 등록하지 않는다.
    pub fn register_member(&mut self, name: &str) -> Result<MemberId, DeskError> {
        let name = require("name", name)?;
        if self.library.find_member(name).is_some() {
            warn!("회원 가입 실패: 이미 존재하는 회원 이름입니다. ({})", name);
            return Err(DeskError::DuplicateMember(name.to_owned()));
        }
        Ok(self.library.register_member(name))
    }

    /// 회원 이름을 변경한다. 다른 회원이 이미 사용 중인 이름으로는 변경할 수 없다.
    pub fn update_member(&mut self, old_name: &str, new_name: &str) -> Result<MemberId, DeskError> {
        let old_name = require("name", old_name)?;
        let new_name = require("new name", new_name)?;
        if old_name != new_name && self.library.find_member(new_name).is_some() {
            warn!("회원 정보 수정 실패: 이미 존재하는 회원 이름입니다. ({})", new_name);
            return Err(DeskError::DuplicateMember(new_name.to_owned()));
        }
        Ok(self.library.update_member(old_name, new_name)?)
    }

    pub fn remove_member(&mut self, name: &str) -> Result<MemberId, DeskError> {
        let name = require("name", name)?;
        let member = self.library.remove_member(name)?;
        Ok(member.id())
    }

    /// 회원에게 도서를 대출한다.
    ///
    /// 반납 예정일을 입력하지 않으면 [`Desk::default_due_date`]를 사용한다.
    /// 반납 예정일이 오늘이거나 이미 지난 날짜여도 대출은 되며 결과의 `overdue`로 알린다.
    pub fn rent_book(&mut self, member_name: &str, title: &str, due_date: Option<NaiveDate>) -> Result<RentReceipt, DeskError> {
        let member = self.member_id(member_name)?;
        let member_name = member_name.trim();
        let title = require("title", title)?;

        let today = self.today.today();
        let due_date = due_date.unwrap_or_else(|| self.default_due_date());
        let book = self.library.rent_book(member, title, due_date)?;

        let overdue = due_date <= today;
        if overdue {
            warn!("[알림] '{}'님, '{}'의 반납일({})이 지났습니다! 책을 반납해주세요.", member_name, title, due_date);
        }

        Ok(RentReceipt {
            book,
            member: member_name.to_owned(),
            title: title.to_owned(),
            due_date,
            overdue,
        })
    }

    pub fn return_book(&mut self, member_name: &str, title: &str) -> Result<BookId, DeskError> {
        let member = self.member_id(member_name)?;
        let title = require("title", title)?;
        Ok(self.library.return_book(member, title)?)
    }

    fn member_id(&self, name: &str) -> Result<MemberId, DeskError> {
        let name = require("member", name)?;
        self.library.find_member(name)
            .map(|member| member.id())
            .ok_or_else(|| DeskError::Library(LibraryError::MemberNotFound(name.to_owned())))
    }
}

impl Desk {

    /// 도서 목록을 가져온다. 카테고리가 없거나 [`ALL_CATEGORIES`]이면 전체 도서를 가져온다.
    pub fn book_rows(&self, category: Option<&str>) -> Vec<BookRow> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);
        self.library.books().iter()
            .filter(|book| category.is_none_or(|c| book.category() == c))
            .map(BookRow::from)
            .collect()
    }

    /// 서가에 있는 도서들의 카테고리를 정렬하여 중복 없이 가져온다.
    pub fn categories(&self) -> Vec<String> {
        self.library.books().iter()
            .map(|book| book.category().to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 신간 등록 시 선택할 수 있는 카테고리 목록
    pub fn category_options(&self) -> &'static [&'static str] {
        &CATEGORIES
    }

    pub fn member_cards(&self) -> Vec<MemberCard> {
        self.library.members().iter()
            .map(|member| MemberCard {
                id: member.id().value(),
                name: member.name().to_owned(),
                loans: self.library.borrowed_books(member).iter()
                    .map(|book| LoanLine { title: book.title().to_owned(), due_date: book.due_date() })
                    .collect(),
            })
            .collect()
    }

    pub fn member_count(&self) -> usize {
        self.library.members().len()
    }

    /// 대출 가능한 도서의 제목
    pub fn available_titles(&self) -> Vec<String> {
        self.library.books().iter()
            .filter(|book| book.is_available())
            .map(|book| book.title().to_owned())
            .collect()
    }

    /// 회원이 빌린 도서의 제목
    pub fn borrowed_titles(&self, member_name: &str) -> Result<Vec<String>, DeskError> {
        let member = self.member_id(member_name)?;
        let titles = self.library.member(member)
            .map(|member| {
                self.library.borrowed_books(member).iter()
                    .map(|book| book.title().to_owned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(titles)
    }

    /// 현재 도서와 회원 목록을 JSON으로 변환한다.
    pub fn snapshot_json(&self) -> Result<String, DeskError> {
        let snapshot = Snapshot {
            books: self.book_rows(None),
            members: self.member_cards(),
        };
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| DeskError::SnapshotFailed(e.to_string()))
    }
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DeskError> {
    let value = value.trim();
    if value.is_empty() {
        warn!("{}을(를) 입력해주세요.", field);
        return Err(DeskError::InputMissing(field));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn desk() -> Desk {
        Desk::with_today(&AppConfig::default(), Box::new(|| date(2030, 1, 1)))
    }

    #[test]
    fn rent_without_due_date_uses_loan_days() {
        let mut desk = desk();
        desk.add_book("T1", "A1", Some("Fiction")).unwrap();
        desk.register_member("Alice").unwrap();

        let receipt = desk.rent_book("Alice", "T1", None).unwrap();

        assert_eq!(receipt.due_date, date(2030, 1, 4));
        assert!(!receipt.overdue);
    }

    #[test]
    fn rent_with_configured_loan_days() {
        let mut config = AppConfig::default();
        config.set_loan_days(14);
        let mut desk = Desk::with_today(&config, Box::new(|| date(2030, 1, 1)));
        desk.add_book("T1", "A1", None).unwrap();
        desk.register_member("Alice").unwrap();

        let receipt = desk.rent_book("Alice", "T1", None).unwrap();

        assert_eq!(receipt.due_date, date(2030, 1, 15));
    }

    #[test]
    fn rent_with_past_due_date_is_flagged_overdue() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.register_member("Alice").unwrap();

        let receipt = desk.rent_book("Alice", "T1", Some(date(2030, 1, 1))).unwrap();

        assert!(receipt.overdue);
        assert!(!desk.library().books()[0].is_available());
    }

    #[test]
    fn rent_for_unknown_member() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();

        let result = desk.rent_book("Nobody", "T1", None);

        assert_eq!(result, Err(DeskError::Library(LibraryError::MemberNotFound("Nobody".to_owned()))));
    }

    #[test]
    fn add_book_requires_title_and_author() {
        let mut desk = desk();

        assert_eq!(desk.add_book("  ", "A1", None), Err(DeskError::InputMissing("title")));
        assert_eq!(desk.add_book("T1", "", None), Err(DeskError::InputMissing("author")));
        assert!(desk.library().books().is_empty());
    }

    #[test]
    fn add_book_defaults_category() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.add_book("T2", "A2", Some(" ")).unwrap();

        assert!(desk.library().books().iter().all(|book| book.category() == DEFAULT_CATEGORY));
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut desk = desk();
        desk.register_member("철수").unwrap();

        assert_eq!(desk.register_member("철수"), Err(DeskError::DuplicateMember("철수".to_owned())));
        assert_eq!(desk.register_member(""), Err(DeskError::InputMissing("name")));
        assert_eq!(desk.member_count(), 1);
    }

    #[test]
    fn update_rejects_name_of_other_member() {
        let mut desk = desk();
        desk.register_member("철수").unwrap();
        desk.register_member("영희").unwrap();

        assert_eq!(desk.update_member("철수", "영희"), Err(DeskError::DuplicateMember("영희".to_owned())));
        assert!(desk.update_member("철수", "철수").is_ok());
        assert!(desk.update_member("철수", "민수").is_ok());
        assert!(desk.library().find_member("민수").is_some());
    }

    #[test]
    fn book_rows_filter_by_category() {
        let mut desk = desk();
        desk.add_book("코스모스", "칼 세이건", Some("과학")).unwrap();
        desk.add_book("데미안", "헤르만 헤세", Some("문학")).unwrap();
        desk.add_book("침묵의 봄", "레이첼 카슨", Some("과학")).unwrap();

        let science: Vec<String> = desk.book_rows(Some("과학")).into_iter().map(|r| r.title).collect();

        assert_eq!(science, vec!["코스모스", "침묵의 봄"]);
        assert_eq!(desk.book_rows(Some(ALL_CATEGORIES)).len(), 3);
        assert_eq!(desk.book_rows(None).len(), 3);
        assert_eq!(desk.categories(), vec!["과학".to_owned(), "문학".to_owned()]);
    }

    #[test]
    fn rows_and_cards_reflect_loans() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.add_book("T2", "A2", None).unwrap();
        desk.register_member("Alice").unwrap();
        desk.rent_book("Alice", "T2", Some(date(2030, 1, 10))).unwrap();

        let rows = desk.book_rows(None);
        assert_eq!(rows[0].status, STATUS_AVAILABLE);
        assert_eq!(rows[1].status, STATUS_ON_LOAN);
        assert_eq!(rows[1].to_string(), "[기타] T2 - A2 (대출중) 반납예정: 2030-01-10");

        let cards = desk.member_cards();
        assert_eq!(cards[0].loans, vec![LoanLine { title: "T2".to_owned(), due_date: Some(date(2030, 1, 10)) }]);

        assert_eq!(desk.available_titles(), vec!["T1".to_owned()]);
        assert_eq!(desk.borrowed_titles("Alice").unwrap(), vec!["T2".to_owned()]);
    }

    #[test]
    fn snapshot_contains_books_and_members() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.register_member("Alice").unwrap();
        desk.rent_book("Alice", "T1", Some(date(2030, 1, 10))).unwrap();

        let json: serde_json::Value = serde_json::from_str(&desk.snapshot_json().unwrap()).unwrap();

        assert_eq!(json["books"][0]["title"], "T1");
        assert_eq!(json["books"][0]["is_available"], false);
        assert_eq!(json["books"][0]["due_date"], "2030-01-10");
        assert_eq!(json["members"][0]["loans"][0]["title"], "T1");
    }

    #[test]
    fn reset_rebuilds_library_with_mock_data() {
        let mut desk = desk();
        desk.register_member("Alice").unwrap();

        desk.reset(&mut StdRng::seed_from_u64(3));

        assert!(desk.library().find_member("Alice").is_none());
        assert_eq!(desk.library().books().len(), 10);
        assert_eq!(desk.member_count(), 5);
    }

    #[test]
    fn seed_is_skipped_when_mock_disabled() {
        let mut config = AppConfig::default();
        config.set_mock_enabled(false);
        let mut desk = Desk::with_today(&config, Box::new(|| date(2030, 1, 1)));

        desk.seed(&mut StdRng::seed_from_u64(3));

        assert!(desk.library().books().is_empty());
        assert_eq!(desk.member_count(), 0);
    }

    #[test]
    fn add_book_returns_stored_row() {
        let mut desk = desk();

        let row = desk.add_book(" 데미안 ", "헤르만 헤세", Some(" 문학 ")).unwrap();
        let defaulted = desk.add_book("T1", "A1", None).unwrap();

        assert_eq!(row.id, 1);
        assert_eq!(row.title, "데미안");
        assert_eq!(row.category, "문학");
        assert!(row.is_available);
        assert_eq!(defaulted.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn member_names_are_trimmed_for_every_operation() {
        let mut desk = desk();
        desk.register_member("Alice").unwrap();

        assert!(desk.update_member(" Alice", "Alice").is_ok());
        assert_eq!(
            desk.rent_book(" Alice ", "x", None),
            Err(DeskError::Library(LibraryError::BookNotFound("x".to_owned())))
        );
        desk.add_book("T1", "A1", None).unwrap();
        let receipt = desk.rent_book(" Alice ", "T1", None).unwrap();
        assert_eq!(receipt.member, "Alice");
        desk.return_book("Alice", "T1").unwrap();

        assert!(desk.remove_member(" Alice ").is_ok());
        assert_eq!(desk.member_count(), 0);
    }

    #[test]
    fn update_unknown_member() {
        let mut desk = desk();
        desk.register_member("철수").unwrap();

        let result = desk.update_member("민수", "지은");

        assert_eq!(result, Err(DeskError::Library(LibraryError::MemberNotFound("민수".to_owned()))));
        assert!(desk.library().find_member("철수").is_some());
        assert_eq!(desk.update_member("", "지은"), Err(DeskError::InputMissing("name")));
    }

    #[test]
    fn remove_member_paths() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.register_member("Carol").unwrap();
        desk.register_member("Dana").unwrap();
        desk.rent_book("Dana", "T1", None).unwrap();

        assert!(desk.remove_member("Carol").is_ok());
        assert_eq!(
            desk.remove_member("Dana"),
            Err(DeskError::Library(LibraryError::OutstandingLoans { name: "Dana".to_owned(), count: 1 }))
        );
        assert_eq!(
            desk.remove_member("Erin"),
            Err(DeskError::Library(LibraryError::MemberNotFound("Erin".to_owned())))
        );
        assert_eq!(desk.remove_member("  "), Err(DeskError::InputMissing("name")));
        assert_eq!(desk.member_count(), 1);
    }

    #[test]
    fn remove_book_paths() {
        let mut desk = desk();
        desk.add_book("T1", "A1", None).unwrap();
        desk.add_book("T2", "A2", None).unwrap();
        desk.register_member("Alice").unwrap();
        desk.rent_book("Alice", "T2", None).unwrap();

        let removed = desk.remove_book(" T1 ").unwrap();
        assert_eq!(removed.title(), "T1");
        assert_eq!(
            desk.remove_book("T2"),
            Err(DeskError::Library(LibraryError::BookOnLoan("T2".to_owned())))
        );
        assert_eq!(
            desk.remove_book("T9"),
            Err(DeskError::Library(LibraryError::BookNotFound("T9".to_owned())))
        );
        assert_eq!(desk.remove_book(""), Err(DeskError::InputMissing("title")));
        assert_eq!(desk.available_titles(), Vec::<String>::new());
        assert_eq!(desk.library().books().len(), 1);
    }

    #[test]
    fn category_options_include_default() {
        let desk = desk();

        assert!(desk.category_options().contains(&DEFAULT_CATEGORY));
        assert_eq!(desk.category_options().len(), 10);
    }
}
