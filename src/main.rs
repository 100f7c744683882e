use std::path::PathBuf;

use ahu_psychro_toolbox::{app, config};
use clap::Parser;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "데이터센터 AHU 습공기 설계 계산기", long_about = None)]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, short, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// 로그를 debug 수준으로 출력한다
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<app::Command>,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    if let Err(err) = try_run(cli) {
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = config::load_or_default_at(&cli.config)?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        cfg.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = cli.command.unwrap_or(app::Command::Interactive);
    app::run(&mut cfg, command)?;
    Ok(())
}
