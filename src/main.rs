use std::path::PathBuf;
use std::process::ExitCode;

use structview::{options::Options, Viewer, DEFAULT_SERVICE_URL};

const USAGE: &str = "Usage: structview <GENE_ID> [--service-url URL] \
                     [--options FILE] [--testing]";

struct Args {
    gene_id: String,
    service_url: String,
    options: Option<PathBuf>,
    testing: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut gene_id = None;
    let mut service_url = DEFAULT_SERVICE_URL.to_owned();
    let mut options = None;
    let mut testing = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--service-url" => {
                service_url = args
                    .next()
                    .ok_or_else(|| "--service-url needs a value".to_owned())?;
            }
            "--options" => {
                options = Some(PathBuf::from(
                    args.next()
                        .ok_or_else(|| "--options needs a value".to_owned())?,
                ));
            }
            "--testing" => testing = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {flag}"));
            }
            _ if gene_id.is_none() => gene_id = Some(arg),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }

    Ok(Args {
        gene_id: gene_id.ok_or_else(|| "missing GENE_ID".to_owned())?,
        service_url,
        options,
        testing,
    })
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let options = match &args.options {
        Some(path) => match Options::load(path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    let result = Viewer::builder()
        .with_gene(args.gene_id)
        .with_service_url(args.service_url)
        .with_options(options)
        .with_testing(args.testing)
        .build()
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
