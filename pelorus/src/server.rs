// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use clap::Parser;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::bridge::NmeaBridge;
use crate::broker::Broker;
use crate::config::Config;
use crate::datamodel::DataModel;
use crate::error::{Error, ErrorKind};
use crate::log::init_log;
use crate::source::{NmeaTcpSource, SOURCE_CHANNEL_CAPACITY};

const DEFAULT_CONFIG: &str = "/etc/pelorus/pelorus.toml";

#[derive(Debug, Parser)]
#[command(name = "pelorus", about = "Marine instrumentation gateway", version)]
struct CommandLine {
    /// Specify config file path.
    #[arg(short, long, value_name = "config_file")]
    config: Option<PathBuf>,

    /// Test config file syntax and exit.
    #[arg(short, long)]
    test: bool,

    /// Notify a running gateway to reload its config.
    #[arg(short, long)]
    reload: bool,
}

/// Entry point of the gateway daemon.
///
/// # Errors
///
/// Returns error if the config is unreadable or invalid, or bring-up of
/// any component fails.
pub fn run_server() -> Result<(), Error> {
    let command_line = CommandLine::parse();

    let config_file = command_line
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config_content = std::fs::read_to_string(&config_file)?;
    let config: Config = toml::from_str(&config_content).map_err(|err| {
        Error::from_string(
            ErrorKind::ConfigError,
            format!("Invalid config file {}, err: {err}", config_file.display()),
        )
    })?;

    if command_line.test {
        config.validate()?;
        println!("The configuration file {} syntax is Ok", config_file.display());
        return Ok(());
    }

    let mut server = ServerContext::new(config);

    if command_line.reload {
        return server.reload();
    }

    server.config.validate()?;
    init_log(server.config.log())?;

    let runtime = Runtime::new()?;
    server.run_loop(&runtime)
}

/// ServerContext manages the lifetime of the data model, the broker and
/// the NMEA sources.
#[derive(Debug)]
pub struct ServerContext {
    config: Config,
}

impl ServerContext {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Notify a running gateway process to reload config by sending
    /// `SIGUSR1`.
    ///
    /// # Errors
    ///
    /// Returns error if the pid file is unreadable or the signal cannot
    /// be delivered.
    #[cfg(unix)]
    pub fn reload(&mut self) -> Result<(), Error> {
        let mut fd = File::open(self.config.general().pid_file())?;
        let mut pid_str = String::new();
        fd.read_to_string(&mut pid_str)?;
        let pid = pid_str.trim().parse::<i32>().map_err(|err| {
            Error::from_string(
                ErrorKind::PidError,
                format!(
                    "Failed to parse pid {pid_str} from file {}, err: {err:?}",
                    self.config.general().pid_file().display()
                ),
            )
        })?;
        unsafe {
            nc::kill(pid, nc::SIGUSR1).map_err(|errno| {
                Error::from_string(
                    ErrorKind::KernelError,
                    format!("Failed to notify process {pid}, got {}", nc::strerror(errno)),
                )
            })?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn reload(&mut self) -> Result<(), Error> {
        Err(Error::new(
            ErrorKind::KernelError,
            "Config reload is only supported on unix",
        ))
    }

    fn write_pid(&self) -> Result<(), Error> {
        let pid = std::process::id();
        let mut fd = File::create(self.config.general().pid_file())?;
        write!(fd, "{pid}")?;
        Ok(())
    }

    /// Build the data model, bridges, sources and broker, then park on
    /// the shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns error if any component fails to come up.
    pub fn run_loop(&mut self, runtime: &Runtime) -> Result<(), Error> {
        self.write_pid()?;

        runtime.block_on(async {
            let model = DataModel::new(self.config.mqtt().max_clients());

            let bridge = Arc::new(NmeaBridge::new(&model)?);
            for source_config in self.config.nmea_sources() {
                let (sender, receiver) = mpsc::channel(SOURCE_CHANNEL_CAPACITY);
                let source = NmeaTcpSource::new(source_config, sender);
                tokio::spawn(source.run_loop());
                tokio::spawn(Arc::clone(&bridge).run_loop(receiver));
            }

            let broker = Broker::bind(
                self.config.mqtt(),
                self.config.general().sys_interval(),
                &model,
            )
            .await?;
            tokio::spawn(broker.run_loop());

            tokio::signal::ctrl_c().await?;
            log::info!("Shutting down");
            Ok(())
        })
    }
}
