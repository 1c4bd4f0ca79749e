// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("schemamig")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Schemamig Contributors")
        .about("Declarative MySQL schema migration from a JSON Hyper-Schema document")
        .subcommand_required(false)
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .value_name("FILE")
                .help("Hyper-Schema source file, JSON format"),
        )
        .arg(
            Arg::new("yaml")
                .short('y')
                .long("yaml")
                .value_name("FILE")
                .help("Hyper-Schema source file, YAML format"),
        )
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .value_name("FILE")
                .help("Persisted state snapshot file"),
        )
        .arg(
            Arg::new("database")
                .short('d')
                .long("database")
                .value_name("FILE")
                .default_value("./database.yml")
                .help("Database configuration file"),
        )
        .arg(
            Arg::new("environment")
                .short('e')
                .long("environment")
                .value_name("ENV")
                .default_value("default")
                .help("Environment name within the database configuration"),
        )
        .arg(
            Arg::new("seed")
                .short('S')
                .long("seed")
                .value_name("FILE")
                .default_value("seed.yml")
                .help("Seed data file"),
        )
        .subcommand(Command::new("run").about("Compute and apply the migration plan"))
        .subcommand(Command::new("plan").about("Compute and print the migration plan"))
        .subcommand(Command::new("init").about("Create the target database if it doesn't exist"))
        .subcommand(Command::new("seed").about("Load seed data into the database"))
        .subcommand(Command::new("wait").about("Wait for the database to accept connections"))
}

fn main() {
    let out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return,
    };

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer: Vec<u8> = Vec::new();
    if man.render(&mut buffer).is_ok() {
        let _ = fs::write(out_dir.join("schemamig.1"), buffer);
    }

    println!("cargo:rerun-if-changed=build.rs");
}
