#![forbid(unsafe_code)]

use std::env;
use std::process;

use artview::session::{self, ReportFormat};
use artview::{Opts, logging};
use artview_panels::{component_catalog, modes_for};

fn main() {
    let opts = Opts::parse();
    let config = match opts.resolve_config(|key| env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("artview: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = logging::init(&config.log) {
        eprintln!("artview: logging disabled: {e}");
    }

    if opts.list_modes {
        let components = component_catalog();
        for mode in modes_for(&config).iter() {
            let status = match mode.resolve(&components) {
                Ok(_) => String::new(),
                Err(e) => format!(" (invalid: {e})"),
            };
            println!("{:<14} {}{status}", mode.name, mode.description);
        }
        return;
    }
    if opts.print_config {
        match config.to_json_pretty() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("artview: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let plan = opts.plan(&config);
    let report = match session::run(&config, &plan) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            eprintln!("artview: {e}");
            process::exit(1);
        }
    };
    match opts.report {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => match report.to_json_pretty() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("artview: {e}");
                process::exit(1);
            }
        },
    }
}
