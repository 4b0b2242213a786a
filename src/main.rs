use std::process::ExitCode;

use heapinspect::config::{Config, Invocation, USAGE};
use heapinspect::inspect::{InspectError, Inspector};
use heapinspect::report::PageReport;
use heapinspect::storage::{FileSource, PageId};
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    log_init::init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(Invocation::Inspect(config)) => config,
        Ok(Invocation::Help) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` if some page in `--all` mode failed.
async fn run(config: &Config) -> Result<bool, InspectError> {
    let source = FileSource::open(config.file.clone()).await?;
    info!("inspecting {}", source.path().display());
    let inspector = Inspector::new(source).with_decode_rows(config.demo);

    if !config.all {
        let page = inspector.inspect(PageId::new(config.page)).await?;
        print!("{}", PageReport(&page));
        return Ok(true);
    }

    let mut ok = true;
    for (n, result) in inspector.inspect_all().await.into_iter().enumerate() {
        if n > 0 {
            println!();
        }
        match result {
            Ok(page) => print!("{}", PageReport(&page)),
            Err(e) => {
                eprintln!("error: {e}");
                ok = false;
            }
        }
    }
    Ok(ok)
}
