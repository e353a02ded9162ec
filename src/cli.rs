use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "netreach")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Connectivity tracking and host reachability probing")]
pub struct Cli {
    /// Write the default configuration file
    #[arg(long = "init")]
    pub init: bool,

    /// Validate the configuration file
    #[arg(short = 'c', long = "check")]
    pub check: bool,

    /// Print the effective configuration
    #[arg(long = "print")]
    pub print: bool,

    /// Check once whether HOST is reachable
    #[arg(short = 'p', long = "probe", value_name = "HOST")]
    pub probe: Option<String>,

    /// Read JSON Lines connectivity snapshots from stdin and emit results
    #[arg(short = 'w', long = "watch")]
    pub watch: bool,

    /// Host to monitor while watching (overrides the config file)
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
