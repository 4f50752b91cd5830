use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use b3dc_ast::codegen::Mode;
use b3dc_core::{lex, parse, render_program, CompilerConfig, Token};

/// Compiles the b3d math DSL into a C `.inc` file of `b3d_*` functions.
#[derive(Parser, Debug)]
#[command(version, about = "Compiles the b3d math DSL to C", long_about = None)]
struct Args {
    /// The DSL source file, given positionally.
    #[arg(conflicts_with = "dsl", value_name = "FILE")]
    file: Option<PathBuf>,

    /// The DSL source file, given as a flag. Defaults to `src/math.dsl`.
    #[arg(long, value_name = "FILE")]
    dsl: Option<PathBuf>,

    /// Destination for the generated C. Defaults to standard output.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Appended to every generated function's name, after `b3d_<name>`.
    #[arg(long, default_value = "", value_name = "TEXT")]
    suffix: String,

    /// Arithmetic lowering target.
    #[arg(long, default_value = "float", value_name = "float|fixed")]
    mode: String,

    /// Print the first 50 tokens and a per-function summary before emitting C.
    #[arg(long)]
    debug: bool,

    /// Force ANSI color in parse-error diagnostics.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI color in parse-error diagnostics.
    #[arg(long)]
    no_color: bool,
}

const DEFAULT_DSL_PATH: &str = "src/math.dsl";

fn main() -> ExitCode {
    let args = Args::parse();

    let dsl_path = args
        .file
        .clone()
        .or_else(|| args.dsl.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DSL_PATH));

    let source = match fs::read_to_string(&dsl_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading {}: {e}", dsl_path.display());
            return ExitCode::from(1);
        }
    };

    let mode: Mode = match args.mode.parse() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let config = CompilerConfig {
        mode,
        suffix: args.suffix.clone(),
    };

    let tokens = lex(&source);
    if args.debug {
        print_token_dump(&tokens);
    }

    let funcs = match parse(&tokens) {
        Ok(f) => f,
        Err(e) => {
            report_parse_error(&e, &dsl_path, &source, args.color, args.no_color);
            return ExitCode::from(2);
        }
    };

    if args.debug {
        print_function_summary(&funcs);
    }

    let source_name = dsl_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dsl_path.display().to_string());
    let generated = render_program(&funcs, &source_name, &config);

    match args.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, generated) {
                eprintln!("error writing {}: {e}", path.display());
                return ExitCode::from(1);
            }
        }
        None => print!("{generated}"),
    }

    ExitCode::SUCCESS
}

/// `--debug`: the first 50 tokens, one per line, as `<line>:<col> <KIND> "<text>"`.
fn print_token_dump(tokens: &[Token]) {
    println!("-- tokens ({} total, first 50 shown) --", tokens.len());
    for tok in tokens.iter().take(50) {
        let kind: &'static str = tok.kind.into();
        println!("{}:{} {kind} {:?}", tok.line, tok.col, tok.text);
    }
    println!();
}

/// `--debug`: name, parameter names, and inferred return type for each
/// parsed function.
fn print_function_summary(funcs: &[b3dc_ast::expr::FuncDef]) {
    println!("-- functions --");
    for f in funcs {
        let params: Vec<&str> = f.params.iter().map(|p| p.name.as_str()).collect();
        println!("{}({}) -> {}", f.name, params.join(", "), f.return_type);
    }
    println!();
}

fn report_parse_error(
    err: &b3dc_core::CompileError,
    path: &std::path::Path,
    source: &str,
    color: bool,
    no_color: bool,
) {
    let source_name = path.display().to_string();
    let report = err.to_report(&source_name, source, color && !no_color);
    let mut buf = Vec::new();
    if report
        .write((source_name.as_str(), ariadne::Source::from(source)), &mut buf)
        .is_ok()
    {
        eprint!("{}", String::from_utf8_lossy(&buf));
    } else {
        eprintln!("{}: {err}", path.display());
    }
}
