//! SOME/IP ECU tester.
//!
//! Reads its configuration from the environment (`CONFIG_PATH`,
//! `VEHICLE_TYPE`, `LOG_*`), loads the part addresses and builds the tester
//! for the configured vehicle. Each `<part> <fields.toml>` argument pair is
//! then sent as one request:
//!
//! ```text
//! someip-tester tbox cases/ping.toml mdc cases/version.toml
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use someip_tester::config::{Environment, Part, Parts};
use someip_tester::transport::TcpTransceiver;
use someip_tester::{logging, Allocator, Result, Tester};
use tracing::{error, info};

fn run(environment: Environment, args: &[String]) -> Result<()> {
    let parts = Parts::load(&environment.config_path)?;
    let tester = Tester::new(
        environment,
        parts,
        Arc::new(Allocator::new()),
        TcpTransceiver::new(),
    )?;

    let local = SocketAddr::from(([0, 0, 0, 0], 0));
    for pair in args.chunks(2) {
        let [part, path] = pair else {
            error!(argument = %pair[0], "missing field file for part");
            continue;
        };
        let part: Part = part.parse()?;
        let fields = tester.load_fields(path)?;
        let response = tester.request(local, part, &[&fields])?;
        info!(%part, %path, return_code = ?response.return_code(), "case done");
    }
    Ok(())
}

fn main() -> ExitCode {
    let environment = match Environment::from_env() {
        Ok(environment) => environment,
        Err(err) => {
            eprintln!("someip-tester: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&environment) {
        eprintln!("someip-tester: {err}");
        return ExitCode::FAILURE;
    }
    let _span = logging::root_span(&environment).entered();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(environment, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "tester failed");
            ExitCode::FAILURE
        }
    }
}
