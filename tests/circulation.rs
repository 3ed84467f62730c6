use chrono::NaiveDate;
use library_desk::library::{Library, LibraryError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn rent_then_return_restores_book() {
    let mut library = Library::new();
    library.add_book("T1", "A1", "Fiction");
    let alice = library.register_member("Alice");

    library.rent_book(alice, "T1", date(2030, 1, 10)).unwrap();

    let book = library.find_book("T1").unwrap();
    assert!(!book.is_available());
    assert_eq!(book.due_date(), Some(date(2030, 1, 10)));
    let member = library.member(alice).unwrap();
    let titles: Vec<&str> = library.borrowed_books(member).iter().map(|b| b.title()).collect();
    assert_eq!(titles, vec!["T1"]);

    library.return_book(alice, "T1").unwrap();

    let book = library.find_book("T1").unwrap();
    assert!(book.is_available());
    assert_eq!(book.due_date(), None);
    assert!(library.member(alice).unwrap().borrowed().is_empty());
}

#[test]
fn second_rental_of_same_title_fails() {
    let mut library = Library::new();
    library.add_book("T1", "A1", "Fiction");
    let alice = library.register_member("Alice");
    let bob = library.register_member("Bob");
    library.rent_book(alice, "T1", date(2030, 1, 10)).unwrap();
    let before = library.clone();

    let result = library.rent_book(bob, "T1", date(2030, 1, 12));

    assert_eq!(result, Err(LibraryError::BookUnavailable("T1".to_owned())));
    assert_eq!(library, before);
    assert_eq!(library.find_book("T1").and_then(|b| b.borrower()), Some(alice));
    assert_eq!(library.member(alice).unwrap().borrowed().len(), 1);
    assert!(library.member(bob).unwrap().borrowed().is_empty());
}

#[test]
fn member_removal_depends_on_outstanding_loans() {
    let mut library = Library::new();
    library.add_book("T1", "A1", "Fiction");

    library.register_member("Carol");
    assert!(library.remove_member("Carol").is_ok());
    assert!(library.find_member("Carol").is_none());

    let dana = library.register_member("Dana");
    library.rent_book(dana, "T1", date(2030, 1, 10)).unwrap();

    let result = library.remove_member("Dana");

    assert_eq!(result, Err(LibraryError::OutstandingLoans { name: "Dana".to_owned(), count: 1 }));
    assert!(library.find_member("Dana").is_some());
}

#[test]
fn remove_unknown_member_fails() {
    let mut library = Library::new();
    library.register_member("Erin");

    let result = library.remove_member("Frank");

    assert_eq!(result, Err(LibraryError::MemberNotFound("Frank".to_owned())));
    assert_eq!(library.members().len(), 1);
}

#[test]
fn returned_book_can_be_rented_by_another_member() {
    let mut library = Library::new();
    library.add_book("T1", "A1", "Fiction");
    let alice = library.register_member("Alice");
    let bob = library.register_member("Bob");

    library.rent_book(alice, "T1", date(2030, 1, 10)).unwrap();
    library.return_book(alice, "T1").unwrap();
    library.rent_book(bob, "T1", date(2030, 2, 1)).unwrap();

    assert_eq!(library.find_book("T1").and_then(|b| b.borrower()), Some(bob));
    assert!(library.return_book(alice, "T1").is_err());
}

#[test]
fn renamed_member_keeps_loans() {
    let mut library = Library::new();
    library.add_book("T1", "A1", "Fiction");
    let alice = library.register_member("Alice");
    library.rent_book(alice, "T1", date(2030, 1, 10)).unwrap();

    library.update_member("Alice", "Alicia").unwrap();

    assert!(library.find_member("Alice").is_none());
    assert_eq!(library.find_member("Alicia").map(|m| m.id()), Some(alice));
    assert!(library.return_book(alice, "T1").is_ok());
}
