//! unixcall CLI - kernel feature report and Capsicum rights inspection

use clap::{Parser, Subcommand};
use unixcall_sys::rights::parse_right;
use unixcall_sys::{CapRights, check};

#[derive(Parser)]
#[command(name = "unixcall")]
#[command(author, version, about = "Inspect kernel features and capability rights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected kernel features
    Info,

    /// Encode or decode capability rights sets
    Rights {
        #[command(subcommand)]
        command: RightsCommand,
    },
}

#[derive(Subcommand)]
enum RightsCommand {
    /// Print the words of the set holding the named rights
    Encode {
        /// Right names, e.g. `read lookup` or `CAP_WRITE`
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the rights held by a set given as hex words
    Decode {
        /// The set's words, e.g. `0x0200000000000401 0x0400000000000000`
        #[arg(required = true, num_args = 1..=2)]
        words: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unixcall=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info => info()?,
        Commands::Rights { command } => match command {
            RightsCommand::Encode { names } => {
                let rights = encode(&names)?;
                let [w0, w1] = *rights.words();
                println!("{w0:#018x} {w1:#018x}");
                println!("{rights}");
            }
            RightsCommand::Decode { words } => {
                let rights = decode(&words)?;
                println!("{rights}");
            }
        },
    }

    Ok(())
}

fn info() -> Result<(), Box<dyn std::error::Error>> {
    let info = check().map_err(Clone::clone)?;
    let (major, minor, patch) = info.release;
    println!("system:          {} {}", info.sysname, info.machine);
    println!("release:         {major}.{minor}.{patch}");
    println!("capsicum:        {}", yes_no(info.capsicum));
    println!("capability mode: {}", yes_no(info.capability_mode));
    println!("sysv shm:        {}", yes_no(info.sysv_shm));
    tracing::debug!(?info, "system info");
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn encode(names: &[String]) -> Result<CapRights, Box<dyn std::error::Error>> {
    let rights = names
        .iter()
        .map(|name| parse_right(name).ok_or_else(|| format!("unknown right {name:?}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CapRights::init(&rights)?)
}

fn decode(words: &[String]) -> Result<CapRights, Box<dyn std::error::Error>> {
    let mut parsed = [0u64; 2];
    for (slot, word) in parsed.iter_mut().zip(words) {
        *slot = parse_hex(word).ok_or_else(|| format!("invalid hex word {word:?}"))?;
    }
    if words.len() < 2 {
        parsed[1] = CapRights::empty().words()[1];
    }
    let rights = CapRights::from_words(parsed);
    if !rights.is_valid() {
        tracing::warn!(?rights, "decoded set is not a valid rights set");
    }
    Ok(rights)
}

fn parse_hex(s: &str) -> Option<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
        .replace('_', "");
    u64::from_str_radix(&digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use unixcall_sys::rights::{CAP_LOOKUP, CAP_READ, CAP_WRITE};

    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x10"), Some(16));
        assert_eq!(parse_hex("0X0200_0000_0000_0001"), Some(0x0200_0000_0000_0001));
        assert_eq!(parse_hex("ff"), Some(255));
        assert_eq!(parse_hex("0xzz"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn encode_then_decode() {
        let rights = encode(&["read".into(), "CAP_LOOKUP".into()]).unwrap();
        let words: Vec<String> = rights.words().iter().map(|w| format!("{w:#x}")).collect();
        let decoded = decode(&words).unwrap();
        assert_eq!(decoded, rights);
        assert!(decoded.is_set(&[CAP_READ, CAP_LOOKUP]).unwrap());
        assert!(!decoded.is_set(&[CAP_WRITE]).unwrap());
    }

    #[test]
    fn encode_rejects_unknown_name() {
        assert!(encode(&["teleport".into()]).is_err());
    }

    #[test]
    fn decode_fills_missing_second_word() {
        let decoded = decode(&["0x0200000000000001".into()]).unwrap();
        assert!(decoded.is_valid());
        assert!(decoded.is_set(&[CAP_READ]).unwrap());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
