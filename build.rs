// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: configuration file path
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .default_value("rehome.toml")
        .help("Configuration file path")
}

fn build_cli() -> Command {
    Command::new("rehome")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Rehome Contributors")
        .about("Migrate embedded resources out of content records into an object store")
        .subcommand_required(false)
        .subcommand(
            Command::new("run")
                .about("Run the migration against the configured stores")
                .arg(config_arg())
                .arg(
                    Arg::new("no_progress")
                        .long("no-progress")
                        .action(clap::ArgAction::SetTrue)
                        .help("Disable the progress bar"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("List migratable references without changing anything")
                .arg(config_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("rehome.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
