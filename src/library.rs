use crate::item::{Book, BookId, Member, MemberId};
use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// 도서관 작업 중 발생한 에러 열거
///
/// 실패한 작업은 도서관의 상태를 바꾸지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// 서가에 해당 제목의 도서가 없음
    BookNotFound(String),

    /// 회원 명부에 해당 회원이 없음
    MemberNotFound(String),

    /// 도서가 이미 대출 중임
    BookUnavailable(String),

    /// 대출 중인 도서는 폐기할 수 없음
    BookOnLoan(String),

    /// 반납하지 않은 도서가 있어 탈퇴할 수 없음
    OutstandingLoans { name: String, count: usize },

    /// 회원이 해당 제목의 도서를 빌린 적이 없음
    NotBorrowed { member: String, title: String },
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::BookNotFound(title) => write!(f, "Book not found: {}", title),
            LibraryError::MemberNotFound(name) => write!(f, "Member not found: {}", name),
            LibraryError::BookUnavailable(title) => write!(f, "Book is already on loan: {}", title),
            LibraryError::BookOnLoan(title) => write!(f, "Book on loan cannot be removed: {}", title),
            LibraryError::OutstandingLoans { name, count } => {
                write!(f, "Member {} has {} outstanding loan(s)", name, count)
            }
            LibraryError::NotBorrowed { member, title } => {
                write!(f, "Member {} never borrowed {}", member, title)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// 도서관
///
/// 서가(catalog)와 회원 명부(roster)를 가지고 있으며 모든 상태 변경은 이곳에서만 일어난다.
/// 서가와 명부는 등록된 순서를 유지하며, 제목/이름으로 찾을 때는 먼저 등록된 것이 선택된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    books: Vec<Book>,
    members: Vec<Member>,

    // 마지막으로 부여한 식별자
    last_book_id: u64,
    last_member_id: u64,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            members: Vec::new(),
            last_book_id: 0,
            last_member_id: 0,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id() == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id() == id)
    }

    /// 제목이 일치하는 첫번째 도서를 찾는다.
    pub fn find_book(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.title() == title)
    }

    /// 이름이 일치하는 첫번째 회원을 찾는다.
    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name() == name)
    }

    /// 회원이 빌린 도서들을 빌린 순서대로 가져온다.
    pub fn borrowed_books(&self, member: &Member) -> Vec<&Book> {
        member.borrowed().iter()
            .filter_map(|id| self.book(*id))
            .collect()
    }
}

impl Library {

    /// 새 도서를 서가에 입고한다. 입고된 도서는 대출 가능한 상태로 시작한다.
    ///
    /// # Example
    /// ```
    /// use library_desk::item::BookId;
    /// use library_desk::library::Library;
    ///
    /// let mut library = Library::new();
    /// let id = library.add_book("어린왕자", "생텍쥐페리", "문학");
    ///
    /// assert_eq!(id, BookId::new(1));
    /// let book = library.book(id).unwrap();
    /// assert!(book.is_available());
    /// assert_eq!(book.due_date(), None);
    /// ```
    pub fn add_book(&mut self, title: &str, author: &str, category: &str) -> BookId {
        self.last_book_id += 1;
        let id = BookId::new(self.last_book_id);

        self.books.push(Book::new(id, title, author, category));
        info!("입고 완료: '{}' 책이 도서관에 들어왔습니다. (id: {}, 카테고리: {})", title, id, category);
        id
    }

    /// 제목이 일치하는 첫번째 도서를 서가에서 폐기한다.
    ///
    /// 대출 중인 도서는 회원의 대출 목록에 남아있으므로 폐기하지 않는다.
    pub fn remove_book(&mut self, title: &str) -> Result<Book, LibraryError> {
        let index = self.books.iter()
            .position(|book| book.title() == title)
            .ok_or_else(|| {
                warn!("폐기 실패: '{}' 책을 찾을 수 없습니다.", title);
                LibraryError::BookNotFound(title.to_owned())
            })?;

        if let Some(borrower) = self.books[index].borrower() {
            warn!("폐기 실패: '{}' 책은 {} 회원이 대출 중입니다.", title, borrower);
            return Err(LibraryError::BookOnLoan(title.to_owned()));
        }

        let book = self.books.remove(index);
        info!("폐기 완료: '{}' 책을 도서관에서 치웠습니다. (id: {})", title, book.id());
        Ok(book)
    }

    /// 회원을 등록한다. 이름의 중복 여부는 호출하는 쪽에서 확인해야 한다.
    pub fn register_member(&mut self, name: &str) -> MemberId {
        self.last_member_id += 1;
        let id = MemberId::new(self.last_member_id);

        self.members.push(Member::new(id, name));
        info!("회원 가입: '{}' 님이 등록되었습니다. (id: {})", name, id);
        id
    }

    /// 이름이 일치하는 첫번째 회원의 이름을 변경한다.
    pub fn update_member(&mut self, old_name: &str, new_name: &str) -> Result<MemberId, LibraryError> {
        let member = self.members.iter_mut()
            .find(|member| member.name() == old_name)
            .ok_or_else(|| {
                warn!("회원 정보 수정 실패: '{}' 님을 찾을 수 없습니다.", old_name);
                LibraryError::MemberNotFound(old_name.to_owned())
            })?;

        member.rename(new_name);
        info!("회원 정보 수정: '{}' 님의 이름이 '{}'(으)로 변경되었습니다.", old_name, new_name);
        Ok(member.id())
    }

    /// 이름이 일치하는 첫번째 회원을 탈퇴 처리한다. 반납하지 않은 도서가 있으면 탈퇴할 수 없다.
    pub fn remove_member(&mut self, name: &str) -> Result<Member, LibraryError> {
        let index = self.members.iter()
            .position(|member| member.name() == name)
            .ok_or_else(|| {
                warn!("회원 탈퇴 실패: '{}' 님을 찾을 수 없습니다.", name);
                LibraryError::MemberNotFound(name.to_owned())
            })?;

        let count = self.members[index].borrowed().len();
        if count > 0 {
            warn!("회원 탈퇴 실패: '{}' 님이 반납하지 않은 책이 {}권 있습니다.", name, count);
            return Err(LibraryError::OutstandingLoans { name: name.to_owned(), count });
        }

        let member = self.members.remove(index);
        info!("회원 탈퇴: '{}' 님이 탈퇴했습니다. (id: {})", name, member.id());
        Ok(member)
    }

    /// 제목이 일치하는 첫번째 도서를 회원에게 대출한다.
    ///
    /// 반납 예정일이 지난 날짜여도 검증하지 않는다.
    pub fn rent_book(&mut self, member: MemberId, title: &str, due_date: NaiveDate) -> Result<BookId, LibraryError> {
        let member_index = self.member_index(member)?;

        let book = self.books.iter_mut()
            .find(|book| book.title() == title)
            .ok_or_else(|| {
                warn!("대출 실패: '{}' 책을 찾을 수 없습니다.", title);
                LibraryError::BookNotFound(title.to_owned())
            })?;

        if !book.is_available() {
            warn!("대출 실패: '{}' 책은 이미 대출 중입니다.", title);
            return Err(LibraryError::BookUnavailable(title.to_owned()));
        }

        book.lend(member, due_date);
        let book_id = book.id();

        let member = &mut self.members[member_index];
        member.push_borrowed(book_id);
        info!("대출 성공: '{}' 님이 '{}'을(를) 빌렸습니다. (반납일: {})", member.name(), title, due_date);
        Ok(book_id)
    }

    /// 회원이 빌린 도서 중 제목이 일치하는 첫번째 도서를 반납 받는다.
    ///
    /// 다른 회원이 빌린 도서는 이 회원을 통해 반납할 수 없다.
    pub fn return_book(&mut self, member: MemberId, title: &str) -> Result<BookId, LibraryError> {
        let member_index = self.member_index(member)?;

        let borrowed = self.members[member_index].borrowed().iter()
            .filter_map(|id| self.books.iter().position(|book| book.id() == *id))
            .find(|index| self.books[*index].title() == title);

        let Some(book_index) = borrowed else {
            let name = self.members[member_index].name().to_owned();
            warn!("반납 실패: '{}' 님이 '{}'을(를) 빌린 적이 없습니다.", name, title);
            return Err(LibraryError::NotBorrowed { member: name, title: title.to_owned() });
        };

        let book = &mut self.books[book_index];
        book.take_back();
        let book_id = book.id();

        let member = &mut self.members[member_index];
        member.remove_borrowed(book_id);
        info!("반납 완료: '{}'이(가) 반납되었습니다. (회원: {})", title, member.name());
        Ok(book_id)
    }

    fn member_index(&self, id: MemberId) -> Result<usize, LibraryError> {
        let index = self.members.iter().position(|member| member.id() == id);
        debug!("회원 조회: {} -> {:?}", id, index);
        index.ok_or_else(|| {
            warn!("{} 회원을 찾을 수 없습니다.", id);
            LibraryError::MemberNotFound(id.to_string())
        })
    }
}
