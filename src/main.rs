use std::path::PathBuf;
use std::process::ExitCode;

use railway::runner::{self, ArgvItem, RunConfig};

fn print_usage() {
    println!("Usage: railway <program>.rail.json [options]");
    println!();
    println!("Options:");
    println!("  -n <int>          Push an integer onto argv");
    println!("  -f32 <file>       Push an array of f32 values read from <file> onto argv");
    println!("  -f64 <file>       Push an array of f64 values read from <file> onto argv");
    println!("  -i32 <file>       Push an array of i32 values read from <file> onto argv");
    println!("  -i64 <file>       Push an array of i64 values read from <file> onto argv");
    println!("  -threads <N>      Thread pool size used to run 'main' (default: 1)");
}

fn parse_args(args: &[String]) -> Result<(PathBuf, RunConfig), String> {
    if args.is_empty() {
        return Err("missing <program>.rail.json argument".to_string());
    }
    let path = PathBuf::from(&args[0]);
    let mut config = RunConfig { argv_items: Vec::new(), threads: 1 };
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut next = || -> Result<&str, String> {
            i += 1;
            args.get(i).map(|s| s.as_str()).ok_or_else(|| format!("'{flag}' requires an argument"))
        };
        match flag {
            "-n" => {
                let v = next()?;
                let n: i64 = v.parse().map_err(|_| format!("'-n' expects an integer, got '{v}'"))?;
                config.argv_items.push(ArgvItem::Int(n));
            }
            "-f32" => config.argv_items.push(ArgvItem::F32File(next()?.to_string())),
            "-f64" => config.argv_items.push(ArgvItem::F64File(next()?.to_string())),
            "-i32" => config.argv_items.push(ArgvItem::I32File(next()?.to_string())),
            "-i64" => config.argv_items.push(ArgvItem::I64File(next()?.to_string())),
            "-threads" => {
                let v = next()?;
                config.threads = v.parse().map_err(|_| format!("'-threads' expects an integer, got '{v}'"))?;
            }
            other => return Err(format!("unrecognized option '{other}'")),
        }
        i += 1;
    }
    Ok((path, config))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match runner::run_file(&path, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
