use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

/// 카테고리를 지정하지 않고 입고한 도서의 카테고리
pub const DEFAULT_CATEGORY: &str = "기타";

/// 신간 등록 시 선택할 수 있는 카테고리 목록
pub const CATEGORIES: [&str; 10] = [
    "문학", "판타지", "인문", "과학", "경제/경영", "자기계발", "역사", "기술/IT", "만화", DEFAULT_CATEGORY,
];

/// 도서 식별자
///
/// 제목은 중복될 수 있고 바뀔 수 있으므로 도서관에 입고될 때 한번 부여된 뒤 바뀌지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(u64);

impl BookId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// 회원 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(u64);

impl MemberId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// 대출 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loan {
    borrower: MemberId,
    due_date: NaiveDate,
}

impl Loan {
    pub fn new(borrower: MemberId, due_date: NaiveDate) -> Self {
        Self { borrower, due_date }
    }

    pub fn borrower(&self) -> MemberId {
        self.borrower
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

/// 도서
///
/// 대출 여부와 반납 예정일은 [`Loan`] 하나로 관리된다.
/// 대출 정보가 없으면 대출 가능한 상태이고 반납 예정일도 없다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    category: String,
    loan: Option<Loan>,
}

impl Book {
    pub fn new(id: BookId, title: &str, author: &str, category: &str) -> Self {
        Self {
            id,
            title: title.to_owned(),
            author: author.to_owned(),
            category: category.to_owned(),
            loan: None,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_available(&self) -> bool {
        self.loan.is_none()
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.loan.map(|loan| loan.due_date())
    }

    pub fn borrower(&self) -> Option<MemberId> {
        self.loan.map(|loan| loan.borrower())
    }

    pub(crate) fn lend(&mut self, borrower: MemberId, due_date: NaiveDate) {
        self.loan = Some(Loan::new(borrower, due_date));
    }

    pub(crate) fn take_back(&mut self) -> Option<Loan> {
        self.loan.take()
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BOOK [{}] by {}", self.title, self.author)
    }
}

/// 회원
///
/// 빌린 도서는 도서관 서가의 도서를 식별자로만 가리킨다. 실제 도서 정보는 [`crate::library::Library`]를 통해 얻는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    name: String,
    // 빌린 순서대로 쌓인다.
    borrowed: Vec<BookId>,
}

impl Member {
    pub fn new(id: MemberId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            borrowed: Vec::new(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn borrowed(&self) -> &[BookId] {
        &self.borrowed
    }

    pub fn has_loans(&self) -> bool {
        !self.borrowed.is_empty()
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    pub(crate) fn push_borrowed(&mut self, book: BookId) {
        self.borrowed.push(book);
    }

    pub(crate) fn remove_borrowed(&mut self, book: BookId) -> bool {
        match self.borrowed.iter().position(|id| *id == book) {
            Some(index) => {
                self.borrowed.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MEMBER [{}]", self.name)
    }
}
