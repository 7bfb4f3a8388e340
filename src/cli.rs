use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sshcheck")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "SSH-driven monitoring checks for Nagios-compatible pollers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Updates { ssh, .. } => ssh.verbose,
            Commands::Disks { ssh, .. } => ssh.verbose,
        }
    }
}

/// Connection flags shared by every check.
#[derive(Args, Debug)]
pub struct SshOpts {
    /// Hostname to connect to
    ///
    /// Not marked required: its absence must be reported as UNKNOWN with
    /// exit 3, not as a usage error with clap's exit code.
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// SSH private key file
    #[arg(short = 'i', long = "ssh-key", default_value = "~/.ssh/id_rsa")]
    pub ssh_key: String,

    /// SSH port to connect to
    #[arg(short, long, default_value_t = 22)]
    pub port: u16,

    /// Remote user to log in as
    #[arg(short, long, default_value = "shinken")]
    pub user: String,

    /// Passphrase for the SSH key
    #[arg(short = 'P', long)]
    pub passphrase: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count pending package updates on the remote host
    Updates {
        #[command(flatten)]
        ssh: SshOpts,

        /// Warning threshold (pending update count)
        #[arg(short, long, default_value = "1")]
        warning: String,

        /// Critical threshold (pending update count)
        #[arg(short, long, default_value = "10")]
        critical: String,

        /// Only count security updates
        #[arg(short, long)]
        security: bool,
    },

    /// Check disk usage of mounted filesystems on the remote host
    Disks {
        #[command(flatten)]
        ssh: SshOpts,

        /// Warning threshold, in percent of disk space used
        #[arg(short, long, default_value = "75%")]
        warning: String,

        /// Critical threshold, in percent of disk space used
        #[arg(short, long, default_value = "90%")]
        critical: String,

        /// Display unit for sizes (B, KB, MB, GB, TB)
        #[arg(short = 'U', long, default_value = "GB")]
        unit: String,

        /// Only check mount points matching this regex
        #[arg(short = 'm', long)]
        mounts: Option<String>,

        /// Skip mount points matching this regex
        #[arg(short = 'x', long)]
        exclude: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_defaults() {
        let cli = Cli::try_parse_from(["sshcheck", "updates", "-H", "db1"]).unwrap();
        match cli.command {
            Commands::Updates { ssh, warning, critical, security } => {
                assert_eq!(ssh.hostname.as_deref(), Some("db1"));
                assert_eq!(ssh.port, 22);
                assert_eq!(ssh.user, "shinken");
                assert_eq!(ssh.ssh_key, "~/.ssh/id_rsa");
                assert_eq!(warning, "1");
                assert_eq!(critical, "10");
                assert!(!security);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn disks_defaults() {
        let cli = Cli::try_parse_from(["sshcheck", "disks", "-H", "web1"]).unwrap();
        match cli.command {
            Commands::Disks { warning, critical, unit, mounts, exclude, .. } => {
                assert_eq!(warning, "75%");
                assert_eq!(critical, "90%");
                assert_eq!(unit, "GB");
                assert!(mounts.is_none());
                assert!(exclude.is_none());
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn hostname_is_optional_at_parse_time() {
        // The missing-hostname diagnosis happens later, with exit 3.
        let cli = Cli::try_parse_from(["sshcheck", "updates"]).unwrap();
        match cli.command {
            Commands::Updates { ssh, .. } => assert!(ssh.hostname.is_none()),
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn short_flags_match_plugin_convention() {
        let cli = Cli::try_parse_from([
            "sshcheck", "disks", "-H", "web1", "-p", "2222", "-u", "nagios", "-i",
            "/etc/keys/poller", "-P", "sekrit", "-w", "80%", "-c", "95%", "-U", "MB", "-m",
            "^/data", "-x", "tmp",
        ])
        .unwrap();
        match cli.command {
            Commands::Disks { ssh, warning, critical, unit, mounts, exclude } => {
                assert_eq!(ssh.port, 2222);
                assert_eq!(ssh.user, "nagios");
                assert_eq!(ssh.ssh_key, "/etc/keys/poller");
                assert_eq!(ssh.passphrase.as_deref(), Some("sekrit"));
                assert_eq!(warning, "80%");
                assert_eq!(critical, "95%");
                assert_eq!(unit, "MB");
                assert_eq!(mounts.as_deref(), Some("^/data"));
                assert_eq!(exclude.as_deref(), Some("tmp"));
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn security_flag_parses() {
        let cli = Cli::try_parse_from(["sshcheck", "updates", "-H", "db1", "-s"]).unwrap();
        match cli.command {
            Commands::Updates { security, .. } => assert!(security),
            _ => panic!("wrong subcommand"),
        }
    }
}
