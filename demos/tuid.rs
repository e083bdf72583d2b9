//! Simple command that prints one or '-n count' TUID strings, '-l' for the long form

use std::{env, io, io::Write, process::ExitCode};

#[derive(Debug, Default)]
struct Options {
    count: Option<usize>,
    long: bool,
}

fn main() -> io::Result<ExitCode> {
    let opts = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(opts) => opts,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-n count] [-l]",
                    program.as_deref().unwrap_or("tuid")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    match tuid::NodeId::from_env() {
        Ok(Some(node_id)) => tuid::set_node_id(node_id),
        Ok(None) => {}
        Err(err) => {
            eprintln!("Error: {}: {}", tuid::NodeId::ENV_VAR, err);
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..opts.count.unwrap_or(1) {
        if opts.long {
            writeln!(buf, "{}", tuid::tuid_long())?;
        } else {
            writeln!(buf, "{}", tuid::tuid())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-l" => {
                if opts.long {
                    return Err("option 'l' given more than once".to_owned());
                }
                opts.long = true;
            }
            "-n" => {
                if opts.count.is_some() {
                    return Err("option 'n' given more than once".to_owned());
                }
                let Some(n_arg) = args.next() else {
                    return Err("argument to option 'n' missing".to_owned());
                };
                let Ok(c) = n_arg.parse() else {
                    return Err(format!("invalid argument to option 'n': '{}'", n_arg));
                };
                opts.count.replace(c);
            }
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        }
    }
    Ok(opts)
}
