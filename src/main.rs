/*
 *  main.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Process entry: arguments, logging, wiring, single-shot or loop
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use paperweather::config::{self, CliOptions};
use paperweather::display::open_display;
use paperweather::i18n::I18n;
use paperweather::layout::LayoutEngine;
use paperweather::weather::{OpenWeatherProvider, WeatherSource};
use paperweather::{AppError, BUILD_DATE, RefreshController};

/// Waits for SIGINT, SIGTERM or SIGHUP.
#[cfg(unix)]
async fn signal_handler() {
    let (mut sigint, mut sigterm, mut sighup) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    ) {
        (Ok(i), Ok(t), Ok(h)) => (i, t, h),
        _ => {
            error!("cannot install signal handlers, loop will only stop when killed");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
}

#[cfg(not(unix))]
async fn signal_handler() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl-C received. Initiating graceful shutdown.");
    }
}

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Configuration file (JSON, or YAML by extension)")
            .required(false))
        .arg(Arg::new("loop")
            .short('l')
            .long("loop")
            .action(ArgAction::SetTrue)
            .help("Keep refreshing every refresh_interval_minutes until signalled")
            .required(false))
        .arg(Arg::new("debug")
            .short('v')
            .long("debug")
            .alias("verbose")
            .action(ArgAction::SetTrue)
            .help("Enable debug log level")
            .required(false))
        .arg(Arg::new("simulate")
            .long("simulate")
            .action(ArgAction::SetTrue)
            .help("Write PNG images instead of driving the panel")
            .required(false))
        .arg(Arg::new("output-dir")
            .long("output-dir")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Directory for simulation images")
            .required(false))
        .arg(Arg::new("dump-config")
            .long("dump-config")
            .action(ArgAction::SetTrue)
            .help("Print the effective configuration as JSON and exit")
            .required(false))
        .after_help("PaperWeather:\
            \n\tCurrent conditions and a five day outlook\
            \n\ton a black/white/red e-paper panel.\
            \n\n\tWithout a panel the frames land in --output-dir as PNG.")
}

async fn run(matches: &clap::ArgMatches) -> Result<(), AppError> {
    let options = CliOptions {
        config: matches.get_one::<PathBuf>("config").cloned(),
        simulate: matches.get_flag("simulate"),
        output_dir: matches.get_one::<PathBuf>("output-dir").cloned(),
    };
    let cfg = config::load(&options)?;

    if matches.get_flag("dump-config") {
        match serde_json::to_string_pretty(&cfg) {
            Ok(s) => println!("{}", s),
            Err(e) => error!("cannot serialise configuration: {}", e),
        }
        return Ok(());
    }

    let layout = cfg.layout_spec()?;
    let i18n = I18n::load(&cfg.locale_dir, &cfg.locale);
    let provider = OpenWeatherProvider::new(&cfg)?;
    let source = WeatherSource::new(provider, cfg.source_policy());
    let sink = open_display(&cfg.display)?;
    info!("displaying on {} ({} regions, locale {})", sink.name(), layout.regions().len(), i18n.locale());

    let mut controller = RefreshController::new(source, LayoutEngine::new(i18n), layout, sink, cfg.refresh_interval());

    if matches.get_flag("loop") {
        let cycles = controller.run_loop(signal_handler()).await;
        info!("stopped after {} refresh cycles", cycles);
    } else {
        let report = controller.run_once().await.into_result()?;
        info!("single refresh finished in {:?}{}", report.final_state, if report.stale { " (stale)" } else { "" });
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    let debug_enabled = matches.get_flag("debug");

    env_logger::Builder::from_env(Env::default().default_filter_or(if debug_enabled { "debug" } else { "info" }))
        .format_timestamp_secs()
        .init();

    info!("{} - weather at a glance", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    match run(&matches).await.context("refresh failed") {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
