use std::env;
use std::fs;
use std::path::Path;

use quiz_model::ParseResult;
use quiz_parser::{export, format_detect, parse_with_config, ParserConfig};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!(
        "Usage:\n\
         quiz-parse parse FILE [--config LIMITS.toml] [--encoding LABEL] [--pretty]\n\
         \x20                     [--export-txt OUT] [--export-docx OUT]\n\
         quiz-parse detect FILE\n\
         \n\
         Notes: FILE may be .docx, .xlsx, .xls or .txt; the result is printed to stdout as JSON.\n\
         Logging goes to stderr and follows RUST_LOG (default: info).\n"
    );
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

struct ParseArgs {
    file: String,
    config: ParserConfig,
    pretty: bool,
    export_txt: Option<String>,
    export_docx: Option<String>,
}

fn parse_args(mut tail: Vec<String>) -> Result<ParseArgs, String> {
    if tail.is_empty() || tail[0].starts_with('-') {
        return Err("parse requires a FILE argument".into());
    }
    let file = tail.remove(0);
    let mut config = ParserConfig::default();
    let mut encoding: Option<String> = None;
    let mut pretty = false;
    let mut export_txt = None;
    let mut export_docx = None;

    let mut i = 0;
    while i < tail.len() {
        match tail[i].as_str() {
            "--config" => {
                let path = tail.get(i + 1).ok_or("--config requires path")?;
                let text = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
                config = ParserConfig::from_toml_str(&text).map_err(|e| e.to_string())?;
                i += 2;
            }
            "--encoding" => { encoding = Some(tail.get(i + 1).ok_or("--encoding requires label")?.clone()); i += 2; }
            "--export-txt" => { export_txt = Some(tail.get(i + 1).ok_or("--export-txt requires path")?.clone()); i += 2; }
            "--export-docx" => { export_docx = Some(tail.get(i + 1).ok_or("--export-docx requires path")?.clone()); i += 2; }
            "--pretty" => { pretty = true; i += 1; }
            other => return Err(format!("unknown option {other}")),
        }
    }
    // --encoding wins over the config file
    if encoding.is_some() {
        config.text_encoding = encoding;
        config.validate().map_err(|e| e.to_string())?;
    }
    Ok(ParseArgs { file, config, pretty, export_txt, export_docx })
}

fn do_parse(tail: Vec<String>) -> Result<bool, String> {
    let args = parse_args(tail)?;
    let bytes = fs::read(&args.file).map_err(|e| format!("failed to read {}: {e}", args.file))?;
    let filename = Path::new(&args.file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.clone());

    let result: ParseResult = parse_with_config(&bytes, &filename, &args.config);
    let json = (if args.pretty { result.to_json_pretty() } else { result.to_json() })
        .map_err(|e| format!("failed to serialize result: {e}"))?;
    println!("{json}");

    if let Some(out) = &args.export_txt {
        fs::write(out, export::to_plain_text(&result.questions)).map_err(|e| format!("failed to write {out}: {e}"))?;
        tracing::info!(path = %out, "wrote plain-text export");
    }
    if let Some(out) = &args.export_docx {
        let bytes = export::to_docx(&result.questions).map_err(|e| e.to_string())?;
        fs::write(out, bytes).map_err(|e| format!("failed to write {out}: {e}"))?;
        tracing::info!(path = %out, "wrote docx export");
    }
    Ok(result.success)
}

fn do_detect(tail: Vec<String>) -> Result<bool, String> {
    let file = tail.first().ok_or("detect requires a FILE argument")?;
    let bytes = fs::read(file).map_err(|e| format!("failed to read {file}: {e}"))?;
    match format_detect::detect_format(file, &bytes) {
        Ok(format) => { println!("{}", format.name()); Ok(true) }
        Err(e) => { println!("{e}"); Ok(false) }
    }
}

fn main() {
    init_logging();
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { print_usage(); return; }
    let cmd = args.remove(0);
    let res = match cmd.as_str() {
        "parse" => do_parse(args),
        "detect" => do_detect(args),
        _ => { print_usage(); return; }
    };
    match res {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(2);
        }
    }
}
