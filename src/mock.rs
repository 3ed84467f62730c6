use crate::library::Library;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

/// 임의 데이터로 서가에 꽂을 도서 (제목, 저자, 카테고리)
const SHELF: [(&str, &str, &str); 19] = [
    ("해리포터", "J.K.롤링", "판타지"),
    ("반지의 제왕", "톨킨", "판타지"),
    ("어린왕자", "생텍쥐페리", "문학"),
    ("데미안", "헤르만 헤세", "문학"),
    ("코스모스", "칼 세이건", "과학"),
    ("사피엔스", "유발 하라리", "인문"),
    ("채식주의자", "한강", "문학"),
    ("소년이 온다", "한강", "문학"),
    ("부자 아빠 가난한 아빠", "로버트 기요사키", "경제/경영"),
    ("트렌드 코리아 2024", "김난도", "경제/경영"),
    ("돈의 심리학", "모건 하우절", "경제/경영"),
    ("미움받을 용기", "기시미 이치로", "자기계발"),
    ("아주 작은 습관의 힘", "제임스 클리어", "자기계발"),
    ("침묵의 봄", "레이첼 카슨", "과학"),
    ("이기적 유전자", "리처드 도킨스", "과학"),
    ("파이썬 코딩 도장", "남재윤", "기술/IT"),
    ("점프 투 파이썬", "박응용", "기술/IT"),
    ("슬램덩크", "이노우에 다케히코", "만화"),
    ("원피스", "오다 에이치로", "만화"),
];

/// 임의 데이터로 가입시킬 회원 이름
const NAMES: [&str; 6] = ["철수", "영희", "민수", "지은", "혜진", "준호"];

/// 도서관에 임의의 도서와 회원을 채워 넣는다.
///
/// 도서와 회원 모두 중복을 허용하여 뽑기 때문에 같은 제목의 도서나 같은 이름의 회원이 여럿 등록될 수 있다.
pub fn populate<R>(library: &mut Library, rng: &mut R, books: usize, members: usize)
where
    R: Rng + ?Sized
{
    info!("[자동 생성] 책을 서가에 꽂고 있습니다... ({}권)", books);
    for _ in 0..books {
        if let Some((title, author, category)) = SHELF.choose(rng) {
            library.add_book(title, author, category);
        }
    }

    info!("[자동 생성] 회원들을 모집하고 있습니다... ({}명)", members);
    for _ in 0..members {
        if let Some(name) = NAMES.choose(rng) {
            library.register_member(name);
        }
    }
}
