use clap::Parser;
use library_desk::configs;
use library_desk::desk::{command, Desk};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "library-desk", version, about = "우리동네 도서관 대여 시스템")]
struct Cli {
    /// 임의 데이터를 채우지 않고 빈 도서관으로 시작한다.
    #[arg(long)]
    no_mock: bool,

    /// 임의 데이터 생성에 사용할 시드
    #[arg(long)]
    seed: Option<u64>,

    /// 반납 예정일을 입력하지 않았을 때의 대출 기간(일)
    #[arg(long)]
    loan_days: Option<u32>,
}

fn main() -> ExitCode {
    configs::load_dotenv();
    let cli = Cli::parse();

    let mut config = match configs::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.no_mock {
        config.set_mock_enabled(false);
    }
    if let Some(seed) = cli.seed {
        config.set_mock_seed(seed);
    }
    if let Some(days) = cli.loan_days {
        config.set_loan_days(days);
    }

    let _guard = match configs::logging::set_global_logging_config(config.logger()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = match config.mock().seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut desk = Desk::new(&config);
    desk.seed(&mut rng);
    info!("도서관 시스템 시작: 도서 {}권, 회원 {}명", desk.library().books().len(), desk.member_count());

    let stdin = io::stdin();
    if let Err(e) = command::run(&mut desk, &mut rng, stdin.lock(), io::stdout()) {
        error!("입출력 오류로 종료합니다. {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
