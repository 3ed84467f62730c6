//! 우리동네 도서관 대여 시스템
//!
//! 도서 서가와 회원 명부, 그리고 둘 사이의 대출/반납을 관리한다.

pub mod configs;
pub mod desk;
pub mod item;
pub mod library;
pub mod mock;
