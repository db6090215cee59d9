use clap::Parser;

use sigmai::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = sigmai::run(cli).await;
    std::process::exit(exit_code as i32);
}
