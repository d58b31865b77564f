// src/main.rs

use sigbridge::{cli, exit_status, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("sigbridge error: {err:?}");
        std::process::exit(2);
    }

    match run(args).await {
        Ok(None) => {}
        Ok(Some(outcome)) => {
            match outcome.exit_code {
                Some(code) => println!("worker exited with code {code}"),
                None => println!("worker terminated by signal"),
            }
            let status = exit_status(&outcome);
            if status == 0 {
                println!("signature captured: {}", outcome.result.message);
            } else {
                eprintln!("capture failed: {}", outcome.result.message);
            }
            std::process::exit(status);
        }
        Err(err) => {
            eprintln!("sigbridge error [{}]: {err}", err.kind());
            std::process::exit(2);
        }
    }
}
